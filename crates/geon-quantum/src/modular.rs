//! Modular-flow structure probes.
//!
//! The modular Hamiltonian K = −log ρ generates a one-parameter unitary
//! flow e^{isK} in the modular parameter s (a structural parameter, not
//! physical time). These functionals measure how compatibly the flows of
//! overlapping regions act:
//!
//! - compatibility C(A,B|ρ) = exp(−‖[K_A, K_B]‖ / (‖K_A‖·‖K_B‖)), with
//!   C → 1 for commuting (geometric) generators and C → 0 for modular chaos
//! - flowed commutator norms Γ(s) = ‖[K_A(s), K_B(s)]‖ under a shared
//!   reference flow, whose growth rate is the instability diagnostic
//! - the causal asymmetry Δ_AB(s) = χ_A→B(s) − χ_B→A(s) of response kernels

use geon_math::{C64, CMat, commutator, expm, linear_fit};

use crate::error::{GeonError, Result};

/// Modular flow unitary e^{isK}.
pub fn modular_flow(h_mod: &CMat, s: f64) -> CMat {
    expm(&(h_mod * C64::new(0.0, s)))
}

/// Restrict a modular generator to the leading `overlap_dim` block.
fn overlap_block(h: &CMat, overlap_dim: usize) -> Result<CMat> {
    if overlap_dim == 0 || overlap_dim > h.nrows() {
        return Err(GeonError::DimensionMismatch {
            expected: h.nrows(),
            found: overlap_dim,
        });
    }
    Ok(h.view((0, 0), (overlap_dim, overlap_dim)).into_owned())
}

/// Compatibility functional C(A,B|ρ) of two modular generators on their
/// shared sector.
///
/// The commutator norm is scaled by both operator norms, so C is invariant
/// under rescaling either generator. Vanishing generators are trivially
/// compatible (C = 1).
pub fn compatibility(h_mod_a: &CMat, h_mod_b: &CMat, overlap_dim: usize) -> Result<f64> {
    let a = overlap_block(h_mod_a, overlap_dim)?;
    let b = overlap_block(h_mod_b, overlap_dim)?;

    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a < 1e-12 || norm_b < 1e-12 {
        return Ok(1.0);
    }

    let rel = commutator(&a, &b).norm() / (norm_a * norm_b);
    Ok((-rel).exp())
}

/// ‖[K_A(s), K_B(s)]‖ with both generators conjugated by the shared
/// reference flow U(s) = e^{isK_ref}.
///
/// The shared flow is what exposes the mismatch instability relative to
/// the state of the larger region; flowing each generator by itself would
/// leave the commutator norm constant.
pub fn flowed_commutator_norm(h_a: &CMat, h_b: &CMat, h_ref: &CMat, s: f64) -> f64 {
    let u = modular_flow(h_ref, s);
    let h_a_s = &u * h_a * u.adjoint();
    let h_b_s = &u * h_b * u.adjoint();
    commutator(&h_a_s, &h_b_s).norm()
}

/// Response kernel χ_A→B(s) = ‖[K_B(s), K_A]‖: how far the reference flow
/// carries B's generator out of A's commutant.
pub fn modular_response_kernel(h_a: &CMat, h_b: &CMat, h_ref: &CMat, s: f64) -> f64 {
    let u = modular_flow(h_ref, s);
    let h_b_s = &u * h_b * u.adjoint();
    commutator(&h_b_s, h_a).norm()
}

/// Δ_AB(s) = χ_A→B(s) − χ_B→A(s) on a grid of flow parameters.
///
/// A stable positive tail indicates A-before-B precedence; a stable
/// negative tail the inverse; neither means the pair is unordered.
pub fn causal_asymmetry(h_a: &CMat, h_b: &CMat, h_ref: &CMat, s_grid: &[f64]) -> Vec<f64> {
    s_grid
        .iter()
        .map(|&s| {
            modular_response_kernel(h_a, h_b, h_ref, s)
                - modular_response_kernel(h_b, h_a, h_ref, s)
        })
        .collect()
}

/// Modular Lyapunov estimate: the tail slope of log Γ(s).
///
/// Fits the last `tail` points of (s, log(Γ + 1e-12)); returns 0 when the
/// grid is too short to take a tail.
pub fn modular_lyapunov(s_grid: &[f64], norms: &[f64], tail: usize) -> f64 {
    assert_eq!(s_grid.len(), norms.len(), "grid/norm length mismatch");
    if s_grid.len() < tail.max(2) {
        return 0.0;
    }
    let start = s_grid.len() - tail;
    let xs = &s_grid[start..];
    let ys: Vec<f64> = norms[start..].iter().map(|&g| (g + 1e-12).ln()).collect();
    let (slope, _) = linear_fit(xs, &ys);
    slope
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entanglement::modular_hamiltonian;
    use crate::rdm::reduced_density_matrix;
    use crate::state::random_state;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_modular_flow_is_unitary() {
        let mut rng = StdRng::seed_from_u64(19);
        let psi = random_state(4, &mut rng);
        let rho = reduced_density_matrix(&psi, &[0, 1]).unwrap();
        let k = modular_hamiltonian(&rho);

        let u = modular_flow(&k, 0.8);
        let prod = &u * u.adjoint();
        assert!((prod - CMat::identity(4, 4)).norm() < 1e-10);
    }

    #[test]
    fn test_modular_flow_fixes_its_own_state() {
        // ρ commutes with e^{isK} when K = −log ρ.
        let mut rng = StdRng::seed_from_u64(21);
        let psi = random_state(4, &mut rng);
        let rho = reduced_density_matrix(&psi, &[0, 1]).unwrap();
        let k = modular_hamiltonian(&rho);

        let u = modular_flow(&k, 1.3);
        let flowed = &u * &rho * u.adjoint();
        assert!((flowed - rho).norm() < 1e-9);
    }

    #[test]
    fn test_compatibility_of_commuting_generators() {
        // Diagonal generators commute: C = 1 exactly.
        let a = CMat::from_fn(4, 4, |i, j| {
            if i == j {
                C64::new(1.0 + i as f64, 0.0)
            } else {
                C64::new(0.0, 0.0)
            }
        });
        let b = CMat::from_fn(4, 4, |i, j| {
            if i == j {
                C64::new(2.0 - i as f64, 0.0)
            } else {
                C64::new(0.0, 0.0)
            }
        });
        let c = compatibility(&a, &b, 4).unwrap();
        assert!((c - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_compatibility_decreases_for_noncommuting() {
        let x = crate::operators::pauli_x();
        let z = crate::operators::pauli_z();
        let c = compatibility(&x, &z, 2).unwrap();
        assert!(c < 1.0 - 1e-3, "σx, σz should score below 1: {c}");
        assert!(c > 0.0);
    }

    #[test]
    fn test_compatibility_trivial_for_zero_generator() {
        let zero = CMat::zeros(2, 2);
        let z = crate::operators::pauli_z();
        assert!((compatibility(&zero, &z, 2).unwrap() - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_flowed_commutator_zero_for_commuting_pair() {
        // Commuting generators stay commuting under any shared flow.
        let a = CMat::identity(4, 4) * C64::new(0.7, 0.0);
        let b = CMat::identity(4, 4) * C64::new(-1.2, 0.0);
        let x2 = crate::operators::pauli_x().kronecker(&crate::operators::identity2());
        for s in [0.0, 0.5, 2.0] {
            assert!(flowed_commutator_norm(&a, &b, &x2, s) < 1e-10);
        }
    }

    #[test]
    fn test_causal_asymmetry_antisymmetric() {
        let mut rng = StdRng::seed_from_u64(33);
        let psi = random_state(4, &mut rng);
        let rho_a = reduced_density_matrix(&psi, &[0, 1]).unwrap();
        let rho_b = reduced_density_matrix(&psi, &[1, 2]).unwrap();
        let rho_ref = reduced_density_matrix(&psi, &[0, 2]).unwrap();

        let ka = modular_hamiltonian(&rho_a);
        let kb = modular_hamiltonian(&rho_b);
        let kr = modular_hamiltonian(&rho_ref);

        let grid = [0.0, 0.5, 1.0];
        let dab = causal_asymmetry(&ka, &kb, &kr, &grid);
        let dba = causal_asymmetry(&kb, &ka, &kr, &grid);
        for (x, y) in dab.iter().zip(dba.iter()) {
            assert!((x + y).abs() < 1e-10, "Δ_AB must equal −Δ_BA");
        }
    }

    #[test]
    fn test_modular_lyapunov_recovers_exponential_rate() {
        let s_grid: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
        let rate = 0.8;
        let norms: Vec<f64> = s_grid.iter().map(|&s| 0.01 * (rate * s).exp()).collect();
        let lam = modular_lyapunov(&s_grid, &norms, 5);
        assert!((lam - rate).abs() < 1e-6, "λ_mod = {lam}");
    }
}
