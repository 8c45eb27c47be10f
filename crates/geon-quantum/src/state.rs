//! State-vector construction and perturbation.
//!
//! States are unit-norm complex vectors of length 2^L, with site i mapped
//! to bit L−1−i of the basis index (site 0 is the most significant bit,
//! matching the Kronecker order of the operator builder).

use geon_math::{C64, CVec};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{GeonError, Result};
use crate::operators::{self, OperatorKind};

/// Number of sites encoded by a state vector of this length.
///
/// Errors if the length is not a power of two.
pub fn sites_of(state: &CVec) -> Result<usize> {
    let dim = state.len();
    if dim == 0 || !dim.is_power_of_two() {
        return Err(GeonError::DimensionMismatch {
            expected: dim.next_power_of_two().max(2),
            found: dim,
        });
    }
    Ok(dim.trailing_zeros() as usize)
}

/// Normalize in place; no-op on the zero vector.
pub fn normalize(state: &mut CVec) {
    let norm = state.norm();
    if norm > 0.0 {
        *state *= C64::new(1.0 / norm, 0.0);
    }
}

/// |index⟩ on an l-site chain.
pub fn computational_basis_state(l: usize, index: usize) -> Result<CVec> {
    let dim = 1usize << l;
    if index >= dim {
        return Err(GeonError::InvalidSubsystem(format!(
            "basis index {index} out of range for dimension {dim}"
        )));
    }
    let mut psi = CVec::zeros(dim);
    psi[index] = C64::new(1.0, 0.0);
    Ok(psi)
}

/// Haar-like random state: normalized complex Gaussian vector.
pub fn random_state<R: Rng>(l: usize, rng: &mut R) -> CVec {
    let dim = 1usize << l;
    let mut psi = CVec::from_fn(dim, |_, _| {
        C64::new(rng.sample(StandardNormal), rng.sample(StandardNormal))
    });
    normalize(&mut psi);
    psi
}

/// Product of long-range Bell pairs bridging the half-chains: site i is
/// maximally entangled with site i + L/2. Every mirrored configuration of
/// the first half-chain enters with equal amplitude.
///
/// Requires even L.
pub fn bell_ladder_state(l: usize) -> Result<CVec> {
    if l == 0 || l % 2 != 0 {
        return Err(GeonError::InvalidSubsystem(format!(
            "bell ladder needs an even chain, got L={l}"
        )));
    }
    let half = l / 2;
    let dim = 1usize << l;
    let mut psi = CVec::zeros(dim);

    for config in 0..(1usize << half) {
        // Site s of the first half carries bit half−1−s of `config`;
        // mirror it onto site s + half.
        let mut index = 0usize;
        for s in 0..half {
            let bit = (config >> (half - 1 - s)) & 1;
            index |= bit << (l - 1 - s);
            index |= bit << (l - 1 - (s + half));
        }
        psi[index] = C64::new(1.0, 0.0);
    }

    normalize(&mut psi);
    Ok(psi)
}

/// State perturbation |ψ'⟩ ∝ |ψ⟩ + ε·O_site|ψ⟩, renormalized.
pub fn perturb_state(state: &CVec, op2x2: &geon_math::CMat, site: usize, epsilon: f64) -> Result<CVec> {
    let l = sites_of(state)?;
    let op = operators::site_operator(op2x2, site, l)?;
    let mut perturbed = state + op.matvec(state) * C64::new(epsilon, 0.0);
    normalize(&mut perturbed);
    Ok(perturbed)
}

/// Apply a full-space operator and renormalize (scrambling probes).
pub fn apply_normalized(state: &CVec, op: &OperatorKind) -> Result<CVec> {
    if op.dim() != state.len() {
        return Err(GeonError::DimensionMismatch {
            expected: op.dim(),
            found: state.len(),
        });
    }
    let mut out = op.matvec(state);
    normalize(&mut out);
    Ok(out)
}
