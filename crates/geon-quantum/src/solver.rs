//! Ground-state solver with an explicit memoization context.
//!
//! Small systems (dimension ≤ `SolverPolicy::dense_dim_limit`) go straight
//! to the dense eigensolver, which cannot fail to converge. Larger systems
//! try Lanczos first and fall back to the dense path if the iteration does
//! not settle — the fallback is bounded by the dense-path site limit.
//!
//! The cache is owned by the solver instance, not process-global, so tests
//! and independent scans construct isolated solvers. Keys quantize the
//! coupling constants to 1e-9, and entries are inserted once and never
//! mutated: the cache is purely a function of its key.

use std::collections::HashMap;

use geon_math::CVec;

use crate::diag::{self, Spectrum};
use crate::error::Result;
use crate::hamiltonian::{Hamiltonian, SpinModel};
use crate::lanczos;

/// Size and convergence policy for the spectral solver.
#[derive(Debug, Clone)]
pub struct SolverPolicy {
    /// Largest dimension sent to the dense eigensolver unconditionally.
    pub dense_dim_limit: usize,
    /// Lanczos Krylov-dimension cap.
    pub lanczos_max_iter: usize,
    /// Lanczos eigenvalue-settling tolerance.
    pub lanczos_tol: f64,
}

impl Default for SolverPolicy {
    fn default() -> Self {
        Self {
            dense_dim_limit: 1 << 10,
            lanczos_max_iter: 300,
            lanczos_tol: 1e-10,
        }
    }
}

/// Ground-state energy and vector.
#[derive(Debug, Clone)]
pub struct GroundState {
    pub energy: f64,
    pub state: CVec,
}

/// Coupling constants quantized for cache keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ModelKey {
    Tfim { h: i64 },
    Xxz { delta: i64 },
    Chaotic { h: i64, g: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    model: ModelKey,
    sites: usize,
}

fn quantize(x: f64) -> i64 {
    (x * 1e9).round() as i64
}

impl CacheKey {
    fn for_hamiltonian(ham: &Hamiltonian) -> CacheKey {
        let model = match ham.model {
            SpinModel::Tfim { h } => ModelKey::Tfim { h: quantize(h) },
            SpinModel::Xxz { delta } => ModelKey::Xxz {
                delta: quantize(delta),
            },
            SpinModel::Chaotic { h, g } => ModelKey::Chaotic {
                h: quantize(h),
                g: quantize(g),
            },
        };
        CacheKey {
            model,
            sites: ham.sites,
        }
    }
}

/// Eigensolver frontend owning the ground-state cache.
#[derive(Debug, Default)]
pub struct SpectralSolver {
    pub policy: SolverPolicy,
    cache: HashMap<CacheKey, GroundState>,
}

impl SpectralSolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: SolverPolicy) -> Self {
        Self {
            policy,
            cache: HashMap::new(),
        }
    }

    /// Number of memoized ground states.
    pub fn cached_states(&self) -> usize {
        self.cache.len()
    }

    /// Lowest eigenpair of `ham`, memoized by (model, couplings, L).
    pub fn ground_state(&mut self, ham: &Hamiltonian) -> Result<GroundState> {
        let key = CacheKey::for_hamiltonian(ham);
        if let Some(gs) = self.cache.get(&key) {
            return Ok(gs.clone());
        }
        let gs = self.compute_ground_state(ham)?;
        self.cache.insert(key, gs.clone());
        Ok(gs)
    }

    /// All eigenvalues of `ham`, ascending. Dense path only.
    pub fn spectrum(&self, ham: &Hamiltonian) -> Result<Vec<f64>> {
        Ok(diag::eigenvalues(&ham.dense()?))
    }

    /// Full eigenbasis of `ham`, for gap and exact-evolution use.
    /// Dense path only.
    pub fn eigenbasis(&self, ham: &Hamiltonian) -> Result<Spectrum> {
        Ok(diag::diagonalize(&ham.dense()?, None))
    }

    fn compute_ground_state(&self, ham: &Hamiltonian) -> Result<GroundState> {
        if ham.dim() <= self.policy.dense_dim_limit {
            let spec = diag::diagonalize(&ham.dense()?, Some(1));
            return Ok(GroundState {
                energy: spec.ground_energy(),
                state: spec.states.into_iter().next().expect("nonempty spectrum"),
            });
        }

        match lanczos::lanczos(
            |v| ham.matvec(v),
            ham.dim(),
            1,
            self.policy.lanczos_max_iter,
            self.policy.lanczos_tol,
        ) {
            Ok(spec) => Ok(GroundState {
                energy: spec.ground_energy(),
                state: spec.states.into_iter().next().expect("nonempty spectrum"),
            }),
            Err(err) => {
                log::warn!(
                    "lanczos failed for {} L={} ({err}); falling back to dense",
                    ham.model.name(),
                    ham.sites
                );
                let spec = diag::diagonalize(&ham.dense()?, Some(1));
                Ok(GroundState {
                    energy: spec.ground_energy(),
                    state: spec.states.into_iter().next().expect("nonempty spectrum"),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geon_math::C64;

    #[test]
    fn test_ground_state_tfim_small_field() {
        // h → 0: classical Ising, E₀ → −L.
        let ham = Hamiltonian::build(SpinModel::Tfim { h: 0.01 }, 6).unwrap();
        let mut solver = SpectralSolver::new();
        let gs = solver.ground_state(&ham).unwrap();
        assert!(
            (gs.energy - (-6.0)).abs() < 0.01,
            "E₀ = {}, expected ≈ −6",
            gs.energy
        );
    }

    #[test]
    fn test_ground_state_is_normalized_eigenvector() {
        let ham = Hamiltonian::build(SpinModel::Xxz { delta: 0.5 }, 5).unwrap();
        let mut solver = SpectralSolver::new();
        let gs = solver.ground_state(&ham).unwrap();

        assert!((gs.state.norm() - 1.0).abs() < 1e-9);
        let residual = (ham.matvec(&gs.state) - &gs.state * C64::new(gs.energy, 0.0)).norm();
        assert!(residual < 1e-8, "eigenvector residual: {residual}");
    }

    #[test]
    fn test_cache_hit_returns_same_state() {
        let ham = Hamiltonian::build(SpinModel::Tfim { h: 1.0 }, 4).unwrap();
        let mut solver = SpectralSolver::new();
        let a = solver.ground_state(&ham).unwrap();
        assert_eq!(solver.cached_states(), 1);

        // A rebuilt Hamiltonian with identical couplings hits the same key.
        let ham2 = Hamiltonian::build(SpinModel::Tfim { h: 1.0 }, 4).unwrap();
        let b = solver.ground_state(&ham2).unwrap();
        assert_eq!(solver.cached_states(), 1);
        assert!((a.energy - b.energy).abs() < 1e-15);
        assert!((&a.state - &b.state).norm() < 1e-15);
    }

    #[test]
    fn test_cache_distinguishes_couplings() {
        let mut solver = SpectralSolver::new();
        for h in [0.5, 1.0, 1.5] {
            let ham = Hamiltonian::build(SpinModel::Tfim { h }, 4).unwrap();
            solver.ground_state(&ham).unwrap();
        }
        assert_eq!(solver.cached_states(), 3);
    }

    #[test]
    fn test_spectrum_sorted_and_complete() {
        let ham = Hamiltonian::build(SpinModel::Chaotic { h: 1.05, g: 0.5 }, 4).unwrap();
        let solver = SpectralSolver::new();
        let spectrum = solver.spectrum(&ham).unwrap();
        assert_eq!(spectrum.len(), 16);
        for w in spectrum.windows(2) {
            assert!(w[0] <= w[1] + 1e-12);
        }
    }

    #[test]
    fn test_eigenbasis_gap_positive_for_tfim() {
        // Paramagnetic phase (h > 1): finite gap.
        let ham = Hamiltonian::build(SpinModel::Tfim { h: 2.0 }, 6).unwrap();
        let solver = SpectralSolver::new();
        let basis = solver.eigenbasis(&ham).unwrap();
        assert!(basis.gap() > 0.1, "gap = {}", basis.gap());
    }

    #[test]
    fn test_lanczos_policy_path_matches_dense() {
        // Force the Lanczos path on a small system by shrinking the dense
        // limit, then compare against the unconstrained solver.
        let ham = Hamiltonian::build(SpinModel::Tfim { h: 1.0 }, 6).unwrap();

        let mut dense_solver = SpectralSolver::new();
        let reference = dense_solver.ground_state(&ham).unwrap();

        let mut lanczos_solver = SpectralSolver::with_policy(SolverPolicy {
            dense_dim_limit: 16,
            ..SolverPolicy::default()
        });
        let gs = lanczos_solver.ground_state(&ham).unwrap();

        assert!(
            (gs.energy - reference.energy).abs() < 1e-8,
            "lanczos={}, dense={}",
            gs.energy,
            reference.energy
        );
    }
}
