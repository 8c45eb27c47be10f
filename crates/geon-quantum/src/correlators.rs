//! Pauli and Majorana correlators, Wick factorization, cumulant norms.
//!
//! The Gaussianity probe uses Jordan–Wigner Majorana operators adapted to
//! the ZZ-coupled chains built here:
//!
//!   γ_{2j}   = (∏_{k<j} X_k) Z_j
//!   γ_{2j+1} = (∏_{k<j} X_k) Y_j
//!
//! With this convention X_j = i γ_{2j} γ_{2j+1} and Z_j Z_{j+1} =
//! i γ_{2j+1} γ_{2j+2}, so the TFIM is quadratic and its exact ground
//! state satisfies Wick's theorem; interacting models do not.

use geon_math::{C64, CMat, CVec};
use rand::Rng;

use crate::error::{GeonError, Result};
use crate::operators::{self, OperatorKind};

/// ⟨ψ|O|ψ⟩ for a Hermitian operator (real part; imaginary is roundoff).
pub fn expectation(state: &CVec, op: &OperatorKind) -> f64 {
    state.dotc(&op.matvec(state)).re
}

/// Tr(ρ·O).
pub fn expectation_rho(rho: &CMat, op: &CMat) -> C64 {
    (rho * op).trace()
}

/// Connected two-point Pauli correlator ⟨A_i B_j⟩ − ⟨A_i⟩⟨B_j⟩.
pub fn connected_two_point(
    state: &CVec,
    op_a: &CMat,
    site_a: usize,
    op_b: &CMat,
    site_b: usize,
) -> Result<f64> {
    let l = crate::state::sites_of(state)?;
    let ab = operators::two_site_operator(op_a, site_a, op_b, site_b, l)?;
    let a = operators::site_operator(op_a, site_a, l)?;
    let b = operators::site_operator(op_b, site_b, l)?;
    Ok(expectation(state, &ab) - expectation(state, &a) * expectation(state, &b))
}

/// Dense product of per-site 2×2 factors in site order.
fn dense_chain(factors: &[CMat]) -> CMat {
    let mut acc = CMat::identity(1, 1);
    for f in factors {
        acc = acc.kronecker(f);
    }
    acc
}

/// Jordan–Wigner Majorana operator γ_index on an l-site register.
///
/// Valid indices are 0..2l; the matrices are dense, for use on the small
/// registers where density matrices live.
pub fn majorana(index: usize, l: usize) -> Result<CMat> {
    if index >= 2 * l {
        return Err(GeonError::InvalidSite {
            site: index,
            sites: 2 * l,
        });
    }
    let j = index / 2;
    let head = if index % 2 == 0 {
        operators::pauli_z()
    } else {
        operators::pauli_y()
    };

    let mut factors = Vec::with_capacity(l);
    for k in 0..l {
        if k < j {
            factors.push(operators::pauli_x());
        } else if k == j {
            factors.push(head.clone());
        } else {
            factors.push(operators::identity2());
        }
    }
    Ok(dense_chain(&factors))
}

/// Two-point Majorana function G(a,b) = Tr(ρ γ_a γ_b).
pub fn majorana_two_point(rho: &CMat, a: usize, b: usize) -> Result<C64> {
    let l = register_sites(rho)?;
    let ga = majorana(a, l)?;
    let gb = majorana(b, l)?;
    Ok(expectation_rho(rho, &(ga * gb)))
}

/// Deviation of ⟨γ_a γ_b γ_c γ_d⟩ from its Wick (Gaussian) factorization
/// ⟨ab⟩⟨cd⟩ − ⟨ac⟩⟨bd⟩ + ⟨ad⟩⟨bc⟩. Vanishes identically for Gaussian
/// (free-fermion) states; the magnitude is a Gaussianity-breaking measure.
pub fn four_point_cumulant(rho: &CMat, indices: [usize; 4]) -> Result<C64> {
    let l = register_sites(rho)?;
    let [a, b, c, d] = indices;

    let gammas: Vec<CMat> = [a, b, c, d]
        .iter()
        .map(|&i| majorana(i, l))
        .collect::<Result<_>>()?;

    let quartic = &gammas[0] * &gammas[1] * &gammas[2] * &gammas[3];
    let g4 = expectation_rho(rho, &quartic);

    let g = |x: &CMat, y: &CMat| expectation_rho(rho, &(x * y));
    let wick = g(&gammas[0], &gammas[1]) * g(&gammas[2], &gammas[3])
        - g(&gammas[0], &gammas[2]) * g(&gammas[1], &gammas[3])
        + g(&gammas[0], &gammas[3]) * g(&gammas[1], &gammas[2]);

    Ok(g4 - wick)
}

/// RMS Wick deviation over `n_samples` random 4-tuples of Majorana indices.
///
/// The generator is supplied by the caller, so a fixed seed reproduces the
/// same sample set — audits of the Gaussianity score are replayable.
pub fn cumulant_norm<R: Rng>(rho: &CMat, n_samples: usize, rng: &mut R) -> Result<f64> {
    let l = register_sites(rho)?;
    if 2 * l < 4 {
        return Err(GeonError::InvalidSubsystem(
            "cumulant norm needs at least two sites".into(),
        ));
    }
    if n_samples == 0 {
        return Ok(0.0);
    }

    // Precompute the Majorana set once per call.
    let gammas: Vec<CMat> = (0..2 * l).map(|i| majorana(i, l)).collect::<Result<_>>()?;

    let mut sum_sq = 0.0;
    for _ in 0..n_samples {
        let idx = sample_distinct_four(2 * l, rng);
        let quartic = &gammas[idx[0]] * &gammas[idx[1]] * &gammas[idx[2]] * &gammas[idx[3]];
        let g4 = expectation_rho(rho, &quartic);

        let g = |x: usize, y: usize| expectation_rho(rho, &(&gammas[x] * &gammas[y]));
        let wick = g(idx[0], idx[1]) * g(idx[2], idx[3]) - g(idx[0], idx[2]) * g(idx[1], idx[3])
            + g(idx[0], idx[3]) * g(idx[1], idx[2]);

        sum_sq += (g4 - wick).norm_sqr();
    }
    Ok((sum_sq / n_samples as f64).sqrt())
}

/// RMS Wick deviation sampled inside a subsystem of a pure state: the
/// reduced density matrix of `sites` is formed and probed in place.
pub fn subsystem_cumulant_norm<R: Rng>(
    state: &CVec,
    sites: &[usize],
    n_samples: usize,
    rng: &mut R,
) -> Result<f64> {
    let rho = crate::rdm::reduced_density_matrix(state, sites)?;
    cumulant_norm(&rho, n_samples, rng)
}

/// Four distinct indices in 0..n, by rejection.
fn sample_distinct_four<R: Rng>(n: usize, rng: &mut R) -> [usize; 4] {
    let mut out = [0usize; 4];
    let mut filled = 0;
    while filled < 4 {
        let candidate = rng.gen_range(0..n);
        if !out[..filled].contains(&candidate) {
            out[filled] = candidate;
            filled += 1;
        }
    }
    out
}

fn register_sites(rho: &CMat) -> Result<usize> {
    let dim = rho.nrows();
    if dim == 0 || !dim.is_power_of_two() || rho.ncols() != dim {
        return Err(GeonError::DimensionMismatch {
            expected: dim.next_power_of_two().max(2),
            found: dim,
        });
    }
    Ok(dim.trailing_zeros() as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hamiltonian::{Hamiltonian, SpinModel};
    use crate::solver::SpectralSolver;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pure_density(state: &CVec) -> CMat {
        state * state.adjoint()
    }

    #[test]
    fn test_majorana_anticommutation() {
        let l = 3;
        for a in 0..2 * l {
            for b in 0..2 * l {
                let ga = majorana(a, l).unwrap();
                let gb = majorana(b, l).unwrap();
                let anti = &ga * &gb + &gb * &ga;
                let expected = if a == b {
                    CMat::identity(1 << l, 1 << l) * C64::new(2.0, 0.0)
                } else {
                    CMat::zeros(1 << l, 1 << l)
                };
                assert!(
                    (anti - expected).norm() < 1e-12,
                    "anticommutator ({a},{b})"
                );
            }
        }
    }

    #[test]
    fn test_transverse_field_is_majorana_bilinear() {
        // X_j = i γ_{2j} γ_{2j+1}.
        let l = 3;
        for j in 0..l {
            let x = crate::operators::site_operator(&crate::operators::pauli_x(), j, l)
                .unwrap()
                .to_dense()
                .unwrap();
            let bilinear =
                majorana(2 * j, l).unwrap() * majorana(2 * j + 1, l).unwrap() * C64::new(0.0, 1.0);
            assert!((x - bilinear).norm() < 1e-12, "site {j}");
        }
    }

    #[test]
    fn test_tfim_ground_state_is_gaussian() {
        // Free-fermion regression anchor: the exact TFIM ground state
        // satisfies Wick's theorem to machine precision.
        let ham = Hamiltonian::build(SpinModel::Tfim { h: 1.0 }, 4).unwrap();
        let mut solver = SpectralSolver::new();
        let gs = solver.ground_state(&ham).unwrap();
        let rho = pure_density(&gs.state);

        let dev = four_point_cumulant(&rho, [0, 1, 2, 3]).unwrap();
        assert!(dev.norm() < 1e-10, "Wick deviation = {}", dev.norm());
    }

    #[test]
    fn test_chaotic_ground_state_breaks_gaussianity() {
        let ham = Hamiltonian::build(SpinModel::Chaotic { h: 1.05, g: 0.5 }, 4).unwrap();
        let mut solver = SpectralSolver::new();
        let gs = solver.ground_state(&ham).unwrap();
        let rho = pure_density(&gs.state);

        let mut rng = StdRng::seed_from_u64(42);
        let norm = cumulant_norm(&rho, 50, &mut rng).unwrap();
        assert!(norm > 1e-6, "interacting model should break Wick: {norm}");
    }

    #[test]
    fn test_cumulant_norm_reproducible() {
        let ham = Hamiltonian::build(SpinModel::Xxz { delta: 0.5 }, 4).unwrap();
        let mut solver = SpectralSolver::new();
        let gs = solver.ground_state(&ham).unwrap();
        let rho = pure_density(&gs.state);

        let a = cumulant_norm(&rho, 20, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = cumulant_norm(&rho, 20, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b, "same seed must reproduce the same estimate");
    }

    #[test]
    fn test_maximally_mixed_subsystem_is_gaussian() {
        // Half the Bell ladder reduces to I/2^k, whose Majorana moments
        // factorize trivially: zero cumulant.
        let psi = crate::state::bell_ladder_state(6).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let norm = subsystem_cumulant_norm(&psi, &[0, 1, 2], 30, &mut rng).unwrap();
        assert!(norm < 1e-10, "maximally mixed should be Gaussian: {norm}");
    }

    #[test]
    fn test_connected_correlator_product_state() {
        // |0000⟩ is a product state: connected ZZ correlator vanishes.
        let psi = crate::state::computational_basis_state(4, 0).unwrap();
        let c = connected_two_point(
            &psi,
            &crate::operators::pauli_z(),
            0,
            &crate::operators::pauli_z(),
            2,
        )
        .unwrap();
        assert!(c.abs() < 1e-12, "connected correlator = {c}");
    }

    #[test]
    fn test_connected_correlator_bell_pair() {
        // Paired sites of the Bell ladder have ⟨Z₀Z₂⟩ = 1, ⟨Z⟩ = 0.
        let psi = crate::state::bell_ladder_state(4).unwrap();
        let c = connected_two_point(
            &psi,
            &crate::operators::pauli_z(),
            0,
            &crate::operators::pauli_z(),
            2,
        )
        .unwrap();
        assert!((c - 1.0).abs() < 1e-10, "connected correlator = {c}");
    }
}
