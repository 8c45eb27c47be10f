//! Lanczos eigensolver for large sparse Hamiltonians.
//!
//! Finds the k lowest eigenpairs of a Hermitian operator using the Lanczos
//! algorithm with full reorthogonalization, touching the operator only
//! through matrix-vector products. This is the path for chains past the
//! dense threshold, where the 2^L×2^L matrix is never materialized.

use geon_math::{C64, CVec, RMat};

use crate::diag::Spectrum;
use crate::error::{GeonError, Result};

/// Lanczos with full reorthogonalization.
///
/// Builds a real tridiagonal matrix from the Krylov subspace of `matvec`,
/// then diagonalizes it for approximate eigenpairs. For a Hermitian
/// operator the recursion coefficients are real even though the Krylov
/// vectors are complex.
///
/// # Arguments
/// * `matvec` — computes H|v⟩
/// * `dim` — Hilbert-space dimension
/// * `n_eigenvalues` — number of lowest eigenpairs wanted
/// * `max_iter` — Krylov dimension cap
/// * `tol` — convergence tolerance on eigenvalue change
///
/// Errors with `NonConvergence` if the eigenvalues have not settled within
/// `tol` by the iteration cap; the solver falls back to the dense path.
pub fn lanczos<F>(
    matvec: F,
    dim: usize,
    n_eigenvalues: usize,
    max_iter: usize,
    tol: f64,
) -> Result<Spectrum>
where
    F: Fn(&CVec) -> CVec,
{
    let m = max_iter.min(dim);
    let k = n_eigenvalues.min(m);

    // Krylov vectors (kept for reorthogonalization and eigenvector recovery)
    let mut q_vecs: Vec<CVec> = Vec::with_capacity(m + 1);

    // Tridiagonal elements
    let mut alpha: Vec<f64> = Vec::with_capacity(m);
    let mut beta: Vec<f64> = Vec::with_capacity(m);

    // Deterministic starting vector (golden-ratio hash, no RNG dependency)
    let mut q = CVec::zeros(dim);
    for i in 0..dim {
        q[i] = C64::new(((i as f64 + 1.0) * 0.618033988749895).fract() - 0.5, 0.0);
    }
    let norm = q.norm();
    q *= C64::new(1.0 / norm, 0.0);
    q_vecs.push(q);

    let mut prev_eigenvalues = vec![f64::MAX; k];

    for j in 0..m {
        // w = H·q_j
        let mut w = matvec(&q_vecs[j]);

        // α_j = Re(q_j† w); imaginary part is roundoff for Hermitian H
        let a = q_vecs[j].dotc(&w).re;
        alpha.push(a);

        w -= &q_vecs[j] * C64::new(a, 0.0);
        if j > 0 {
            w -= &q_vecs[j - 1] * C64::new(beta[j - 1], 0.0);
        }

        // Full reorthogonalization (crucial for numerical stability)
        for qi in &q_vecs {
            let overlap = qi.dotc(&w);
            w -= qi * overlap;
        }

        let b = w.norm();

        // Check for convergence periodically
        if (j + 1) % 10 == 0 || j == m - 1 || b < 1e-14 {
            let spec = tridiagonal_eigenvalues(&alpha, &beta, k);
            let max_change = spec
                .iter()
                .zip(prev_eigenvalues.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0f64, f64::max);

            if max_change < tol {
                log::debug!(
                    "lanczos converged at iteration {} (change={max_change:.2e})",
                    j + 1
                );
                return Ok(recover_eigenvectors(&alpha, &beta, &q_vecs, k));
            }
            prev_eigenvalues = spec;
        }

        if b < 1e-14 {
            // Invariant subspace: the Krylov space is exact from here on.
            log::debug!("lanczos: invariant subspace at iteration {}", j + 1);
            return Ok(recover_eigenvectors(&alpha, &beta, &q_vecs, k));
        }

        beta.push(b);
        let q_next = &w * C64::new(1.0 / b, 0.0);
        q_vecs.push(q_next);
    }

    if m == dim {
        // The Krylov space spans the full Hilbert space: exact regardless
        // of the settling test.
        return Ok(recover_eigenvectors(&alpha, &beta, &q_vecs, k));
    }
    Err(GeonError::NonConvergence { iterations: m })
}

fn tridiagonal(alpha: &[f64], beta: &[f64]) -> RMat {
    let m = alpha.len();
    let mut t = RMat::zeros(m, m);
    for i in 0..m {
        t[(i, i)] = alpha[i];
        if i > 0 {
            t[(i, i - 1)] = beta[i - 1];
            t[(i - 1, i)] = beta[i - 1];
        }
    }
    t
}

/// k lowest eigenvalues of the current tridiagonal matrix.
fn tridiagonal_eigenvalues(alpha: &[f64], beta: &[f64], k: usize) -> Vec<f64> {
    let eig = tridiagonal(alpha, beta).symmetric_eigen();
    let mut vals: Vec<f64> = eig.eigenvalues.iter().copied().collect();
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
    vals.truncate(k);
    vals
}

/// Recover Ritz vectors from the Krylov basis and tridiagonal eigenvectors.
fn recover_eigenvectors(alpha: &[f64], beta: &[f64], q_vecs: &[CVec], k: usize) -> Spectrum {
    let m = alpha.len();
    let eig = tridiagonal(alpha, beta).symmetric_eigen();

    let mut indexed: Vec<(usize, f64)> = eig
        .eigenvalues
        .iter()
        .enumerate()
        .map(|(i, &e)| (i, e))
        .collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let n = k.min(indexed.len());
    let dim = q_vecs[0].len();
    let n_q = q_vecs.len().min(m);

    let mut energies = Vec::with_capacity(n);
    let mut states = Vec::with_capacity(n);

    for &(idx, eval) in indexed.iter().take(n) {
        energies.push(eval);

        // Ritz vector in the original space: Σ_j s_j q_j
        let mut v = CVec::zeros(dim);
        for j in 0..n_q {
            let coeff = eig.eigenvectors[(j, idx)];
            v += &q_vecs[j] * C64::new(coeff, 0.0);
        }
        let norm = v.norm();
        if norm > 1e-15 {
            v *= C64::new(1.0 / norm, 0.0);
        }
        states.push(v);
    }

    Spectrum { energies, states }
}
