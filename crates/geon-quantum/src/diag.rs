//! Dense eigendecomposition for small Hamiltonians and density matrices.
//!
//! Uses nalgebra's `SymmetricEigen`, which handles Hermitian complex
//! matrices with real eigenvalues. Suitable up to a few thousand dimensions;
//! larger systems go through the Lanczos path.

use geon_math::{CMat, CVec};

/// Eigenvalues and eigenstates from diagonalization.
#[derive(Debug, Clone)]
pub struct Spectrum {
    /// Eigenvalues in ascending order.
    pub energies: Vec<f64>,
    /// Corresponding eigenstates (columns of the unitary matrix).
    pub states: Vec<CVec>,
}

impl Spectrum {
    /// Ground state energy.
    pub fn ground_energy(&self) -> f64 {
        self.energies[0]
    }

    /// Ground state vector.
    pub fn ground_state(&self) -> &CVec {
        &self.states[0]
    }

    /// Spectral gap (E_1 − E_0).
    pub fn gap(&self) -> f64 {
        if self.energies.len() < 2 {
            return 0.0;
        }
        self.energies[1] - self.energies[0]
    }
}

/// Diagonalize a Hermitian matrix.
///
/// If `n_lowest` is `Some(n)`, only the `n` lowest eigenvalues/states are
/// returned (still computed via full diagonalization).
pub fn diagonalize(h: &CMat, n_lowest: Option<usize>) -> Spectrum {
    let eig = h.clone().symmetric_eigen();

    // Sort by eigenvalue.
    let mut indexed: Vec<(usize, f64)> = eig
        .eigenvalues
        .iter()
        .enumerate()
        .map(|(i, &e)| (i, e))
        .collect();
    indexed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let n = match n_lowest {
        Some(n) => n.min(indexed.len()),
        None => indexed.len(),
    };

    let energies: Vec<f64> = indexed[..n].iter().map(|&(_, e)| e).collect();
    let states: Vec<CVec> = indexed[..n]
        .iter()
        .map(|&(i, _)| eig.eigenvectors.column(i).into_owned())
        .collect();

    Spectrum { energies, states }
}

/// Sorted eigenvalues of a Hermitian matrix (no eigenvectors kept).
pub fn eigenvalues(h: &CMat) -> Vec<f64> {
    let mut vals: Vec<f64> = h
        .clone()
        .symmetric_eigen()
        .eigenvalues
        .iter()
        .copied()
        .collect();
    vals.sort_by(|a, b| a.partial_cmp(b).unwrap());
    vals
}
