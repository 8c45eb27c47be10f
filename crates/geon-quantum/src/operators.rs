//! Full-space operators on a chain of two-level sites.
//!
//! Operators are L-fold Kronecker products of single-site 2×2 generators,
//! assembled in site order 0..L−1 (site 0 is the leftmost factor, i.e. the
//! most significant bit of a basis index). Identity runs are collapsed into
//! a single factor so only one product per non-identity site is taken.
//!
//! Below [`DENSE_SITE_LIMIT`] sites the result is a dense matrix for solver
//! speed; above it, CSR keeps memory proportional to the non-zero count.

use geon_math::{C64, CMat, CVec};

use crate::error::{GeonError, Result};
use crate::sparse::CsrMatrix;

/// Largest chain built densely; 2^10 × 2^10 is the dense-solver sweet spot.
pub const DENSE_SITE_LIMIT: usize = 10;

/// Hard bound on any dense code path (full eigenbasis, exact evolution,
/// dense solver fallback). Densifying past 2^12 exhausts memory long
/// before it finishes, so the bound fails fast instead.
pub const DENSE_PATH_SITE_LIMIT: usize = 12;

/// 2×2 identity.
pub fn identity2() -> CMat {
    CMat::identity(2, 2)
}

/// Pauli σx.
pub fn pauli_x() -> CMat {
    CMat::from_row_slice(
        2,
        2,
        &[
            C64::new(0.0, 0.0),
            C64::new(1.0, 0.0),
            C64::new(1.0, 0.0),
            C64::new(0.0, 0.0),
        ],
    )
}

/// Pauli σy.
pub fn pauli_y() -> CMat {
    CMat::from_row_slice(
        2,
        2,
        &[
            C64::new(0.0, 0.0),
            C64::new(0.0, -1.0),
            C64::new(0.0, 1.0),
            C64::new(0.0, 0.0),
        ],
    )
}

/// Pauli σz.
pub fn pauli_z() -> CMat {
    CMat::from_row_slice(
        2,
        2,
        &[
            C64::new(1.0, 0.0),
            C64::new(0.0, 0.0),
            C64::new(0.0, 0.0),
            C64::new(-1.0, 0.0),
        ],
    )
}

/// A 2^L×2^L operator, dense or CSR depending on chain length.
#[derive(Debug, Clone)]
pub enum OperatorKind {
    Dense(CMat),
    Sparse(CsrMatrix),
}

impl OperatorKind {
    /// Zero operator for an `l`-site chain, in the representation the
    /// builder would pick for that length.
    pub fn zeros(l: usize) -> OperatorKind {
        let dim = 1 << l;
        if l > DENSE_SITE_LIMIT {
            OperatorKind::Sparse(CsrMatrix::zeros(dim))
        } else {
            OperatorKind::Dense(CMat::zeros(dim, dim))
        }
    }

    /// Hilbert-space dimension.
    pub fn dim(&self) -> usize {
        match self {
            OperatorKind::Dense(m) => m.nrows(),
            OperatorKind::Sparse(m) => m.nrows,
        }
    }

    pub fn is_sparse(&self) -> bool {
        matches!(self, OperatorKind::Sparse(_))
    }

    /// y = A·x.
    pub fn matvec(&self, x: &CVec) -> CVec {
        match self {
            OperatorKind::Dense(m) => m * x,
            OperatorKind::Sparse(m) => m.matvec(x),
        }
    }

    /// self += c·other.
    ///
    /// Panics if the two operands use different representations; the
    /// factory always builds terms uniformly for a given chain length.
    pub fn add_scaled(&mut self, other: &OperatorKind, c: C64) {
        match (self, other) {
            (OperatorKind::Dense(a), OperatorKind::Dense(b)) => *a += b * c,
            (OperatorKind::Sparse(a), OperatorKind::Sparse(b)) => *a = a.add_scaled(b, c),
            _ => panic!("mixed dense/sparse operator representations"),
        }
    }

    /// ‖A − A†‖ (Frobenius).
    pub fn hermiticity_residual(&self) -> f64 {
        match self {
            OperatorKind::Dense(m) => geon_math::hermiticity_residual(m),
            OperatorKind::Sparse(m) => m.add_scaled(&m.adjoint(), C64::new(-1.0, 0.0)).norm(),
        }
    }

    /// Densify. Errors with `SizeLimit` beyond the dense-path bound so a
    /// 2^20-dimension operator is never materialized by accident.
    pub fn to_dense(&self) -> Result<CMat> {
        let limit = 1 << DENSE_PATH_SITE_LIMIT;
        if self.dim() > limit {
            return Err(GeonError::SizeLimit {
                dim: self.dim(),
                limit,
            });
        }
        Ok(match self {
            OperatorKind::Dense(m) => m.clone(),
            OperatorKind::Sparse(m) => m.to_dense(),
        })
    }
}

/// Kronecker chain with the given non-identity factors, sorted by site.
/// Identity gaps are inserted as single 2^gap blocks.
fn kron_chain(l: usize, factors: &[(usize, &CMat)], sparse: bool) -> OperatorKind {
    if sparse {
        let mut acc = CsrMatrix::identity(1);
        let mut next_site = 0;
        for &(site, op) in factors {
            let gap = site - next_site;
            if gap > 0 {
                acc = acc.kron(&CsrMatrix::identity(1 << gap));
            }
            acc = acc.kron(&CsrMatrix::from_dense(op));
            next_site = site + 1;
        }
        if next_site < l {
            acc = acc.kron(&CsrMatrix::identity(1 << (l - next_site)));
        }
        OperatorKind::Sparse(acc)
    } else {
        let mut acc = CMat::identity(1, 1);
        let mut next_site = 0;
        for &(site, op) in factors {
            let gap = site - next_site;
            if gap > 0 {
                acc = acc.kronecker(&CMat::identity(1 << gap, 1 << gap));
            }
            acc = acc.kronecker(op);
            next_site = site + 1;
        }
        if next_site < l {
            let tail = l - next_site;
            acc = acc.kronecker(&CMat::identity(1 << tail, 1 << tail));
        }
        OperatorKind::Dense(acc)
    }
}

fn check_site(site: usize, l: usize) -> Result<()> {
    if site >= l {
        return Err(GeonError::InvalidSite { site, sites: l });
    }
    Ok(())
}

/// `op2x2` acting on `site`, identity elsewhere, on an `l`-site chain.
pub fn site_operator(op2x2: &CMat, site: usize, l: usize) -> Result<OperatorKind> {
    assert_eq!(op2x2.nrows(), 2, "single-site generator must be 2×2");
    assert_eq!(op2x2.ncols(), 2, "single-site generator must be 2×2");
    check_site(site, l)?;
    Ok(kron_chain(l, &[(site, op2x2)], l > DENSE_SITE_LIMIT))
}

/// Product of two single-site operators at distinct sites.
///
/// The factors act on disjoint tensor slots, so the result is independent
/// of argument order.
pub fn two_site_operator(
    op_a: &CMat,
    site_a: usize,
    op_b: &CMat,
    site_b: usize,
    l: usize,
) -> Result<OperatorKind> {
    check_site(site_a, l)?;
    check_site(site_b, l)?;
    if site_a == site_b {
        return Err(GeonError::InvalidSite {
            site: site_b,
            sites: l,
        });
    }
    let factors = if site_a < site_b {
        [(site_a, op_a), (site_b, op_b)]
    } else {
        [(site_b, op_b), (site_a, op_a)]
    };
    Ok(kron_chain(l, &factors, l > DENSE_SITE_LIMIT))
}
