//! Exact many-body kernel for entanglement-geometry diagnostics.
//!
//! Builds spin-chain Hamiltonians as explicit operator sums over the full
//! 2^L tensor-product Hilbert space, diagonalizes them, and derives the
//! entanglement and modular quantities the geometric diagnostics consume:
//! reduced density matrices, entropies, mutual information, modular
//! Hamiltonians, relative entropies, Wick-deviation norms, level-spacing
//! statistics, and exact unitary time evolution.
//!
//! # Modules
//!
//! - [`operators`]: Single- and two-site operators via Kronecker products
//! - [`sparse`]: CSR storage for chains past the dense threshold
//! - [`hamiltonian`]: TFIM / XXZ / Chaotic model factory (periodic chains)
//! - [`diag`]: Dense Hermitian eigendecomposition
//! - [`lanczos`]: Sparse iterative eigensolver with reorthogonalization
//! - [`solver`]: Ground-state solver with policy and memoization context
//! - [`state`]: State construction, normalization, perturbation
//! - [`rdm`]: Partial-trace engine for arbitrary subsystems
//! - [`entanglement`]: Entropy, mutual information, modular/relative entropy
//! - [`correlators`]: Pauli/Majorana correlators and cumulant norms
//! - [`modular`]: Modular flow, compatibility, causal asymmetry
//! - [`evolve`]: Exact evolution with conservation audits

pub mod correlators;
pub mod diag;
pub mod entanglement;
pub mod error;
pub mod evolve;
pub mod hamiltonian;
pub mod lanczos;
pub mod modular;
pub mod operators;
pub mod rdm;
pub mod solver;
pub mod sparse;
pub mod state;

pub use diag::Spectrum;
pub use error::{GeonError, Result};
pub use evolve::{ConservationReport, Propagator};
pub use hamiltonian::{Hamiltonian, SpinModel};
pub use operators::OperatorKind;
pub use rdm::reduced_density_matrix;
pub use solver::{GroundState, SolverPolicy, SpectralSolver};
