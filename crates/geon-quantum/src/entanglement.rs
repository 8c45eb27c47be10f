//! Entanglement and modular functionals of reduced density matrices.
//!
//! - von Neumann entropy (natural-log units)
//! - mutual information I(A:B) = S(A) + S(B) − S(A∪B)
//! - modular Hamiltonian −log ρ
//! - relative entropy D(ρ‖σ) = Tr(ρ log ρ) − Tr(ρ log σ)
//! - entanglement-spectrum level-spacing statistics
//!
//! Eigenvalues below [`EIGEN_FLOOR`] are dropped (entropy) or clipped
//! (logarithms). This is a controlled regularization: results within a few
//! decades of the floor are low-confidence, not exact.

use geon_math::{C64, CMat, CVec};

use crate::diag;
use crate::error::Result;
use crate::rdm;

/// Eigenvalue floor for logarithms of density matrices.
pub const EIGEN_FLOOR: f64 = 1e-12;

/// Von Neumann entropy −Σ λ ln λ over eigenvalues above the floor.
pub fn entropy(rho: &CMat) -> f64 {
    let mut s = 0.0;
    for ev in diag::eigenvalues(rho) {
        if ev > EIGEN_FLOOR {
            s -= ev * ev.ln();
        }
    }
    s
}

/// Entanglement entropy of a subsystem of a pure state.
pub fn subsystem_entropy(state: &CVec, subsystem: &[usize]) -> Result<f64> {
    Ok(entropy(&rdm::reduced_density_matrix(state, subsystem)?))
}

/// Mutual information I(A:B) = S(A) + S(B) − S(A∪B).
///
/// A and B are expected disjoint; shared sites are deduplicated in the
/// union so overlapping input degrades gracefully instead of crashing.
pub fn mutual_information(state: &CVec, a: &[usize], b: &[usize]) -> Result<f64> {
    let s_a = subsystem_entropy(state, a)?;
    let s_b = subsystem_entropy(state, b)?;

    let mut union: Vec<usize> = a.iter().chain(b.iter()).copied().collect();
    union.sort_unstable();
    union.dedup();
    let s_ab = subsystem_entropy(state, &union)?;

    Ok(s_a + s_b - s_ab)
}

/// Modular Hamiltonian K = −log ρ, via eigendecomposition with eigenvalues
/// clipped to the floor. Hermitian by construction.
pub fn modular_hamiltonian(rho: &CMat) -> CMat {
    let eig = rho.clone().symmetric_eigen();
    let n = rho.nrows();

    let log_diag = CMat::from_fn(n, n, |i, j| {
        if i == j {
            C64::new(eig.eigenvalues[i].max(EIGEN_FLOOR).ln(), 0.0)
        } else {
            C64::new(0.0, 0.0)
        }
    });

    -(&eig.eigenvectors * log_diag * eig.eigenvectors.adjoint())
}

/// Relative entropy D(ρ_p‖ρ_0) = Tr(ρ_p log ρ_p) − Tr(ρ_p log ρ_0).
///
/// Non-negative for valid density matrices; a violation beyond −1e-9 is a
/// numerical bug, not physics, and is logged at warn level.
pub fn relative_entropy(rho_p: &CMat, rho_0: &CMat) -> f64 {
    // Tr(ρ_p log ρ_p) from the eigenvalues alone.
    let mut tr_p_log_p = 0.0;
    for ev in diag::eigenvalues(rho_p) {
        if ev > EIGEN_FLOOR {
            tr_p_log_p += ev * ev.ln();
        }
    }

    // log ρ_0 as a matrix, eigenvalues clipped at the floor.
    let log_rho_0 = -modular_hamiltonian(rho_0);
    let tr_p_log_0 = (rho_p * log_rho_0).trace().re;

    let d = tr_p_log_p - tr_p_log_0;
    if d < -1e-9 {
        log::warn!("relative entropy positivity violated: D = {d:.3e}");
    }
    d
}

/// Mean consecutive-spacing ratio r̄ = ⟨min(sᵢ, sᵢ₊₁)/max(sᵢ, sᵢ₊₁)⟩ of a
/// sorted level sequence. Poisson statistics give r̄ ≈ 0.386, Wigner-Dyson
/// r̄ ≈ 0.53; degenerate spacings are skipped.
pub fn level_spacing_ratio(levels: &[f64]) -> f64 {
    if levels.len() < 3 {
        return 0.0;
    }
    let spacings: Vec<f64> = levels.windows(2).map(|w| w[1] - w[0]).collect();

    let mut sum = 0.0;
    let mut count = 0usize;
    for pair in spacings.windows(2) {
        let max = pair[0].max(pair[1]);
        if max < EIGEN_FLOOR {
            continue;
        }
        sum += pair[0].min(pair[1]) / max;
        count += 1;
    }
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// r̄ statistic of the entanglement spectrum {−ln λ} of a density matrix.
pub fn entanglement_spectrum_ratio(rho: &CMat) -> f64 {
    let mut levels: Vec<f64> = diag::eigenvalues(rho)
        .into_iter()
        .filter(|&ev| ev > EIGEN_FLOOR)
        .map(|ev| -ev.ln())
        .collect();
    levels.sort_by(|a, b| a.partial_cmp(b).unwrap());
    level_spacing_ratio(&levels)
}
