//! Dense complex linear-algebra primitives for the geon kernel.
//!
//! Thin aliases over nalgebra plus the handful of matrix functionals the
//! quantum modules share: hermiticity residuals, commutators, the matrix
//! exponential, and a least-squares line fit for scaling analyses.

use nalgebra as na;
use num_complex::Complex;

/// Complex scalar.
pub type C64 = Complex<f64>;
/// Dynamic complex matrix.
pub type CMat = na::DMatrix<C64>;
/// Dynamic complex vector.
pub type CVec = na::DVector<C64>;
/// Dynamic real matrix.
pub type RMat = na::DMatrix<f64>;
/// Dynamic real vector.
pub type RVec = na::DVector<f64>;

/// ‖M − M†‖ (Frobenius). Zero for Hermitian matrices.
pub fn hermiticity_residual(m: &CMat) -> f64 {
    (m - m.adjoint()).norm()
}

/// Commutator [A, B] = AB − BA.
pub fn commutator(a: &CMat, b: &CMat) -> CMat {
    a * b - b * a
}

/// Matrix exponential by scaling and squaring with a Taylor kernel.
///
/// The argument is scaled by 2^s until its norm is below 1/2, the series
/// is summed to machine tolerance, and the result squared s times. Adequate
/// for the operator norms that arise from bounded lattice Hamiltonians and
/// modular generators.
pub fn expm(a: &CMat) -> CMat {
    let n = a.nrows();
    assert_eq!(n, a.ncols(), "expm requires a square matrix");

    let norm = a.norm();
    let s = if norm > 0.5 {
        (norm / 0.5).log2().ceil() as u32
    } else {
        0
    };
    let scale = C64::new(1.0 / f64::powi(2.0, s as i32), 0.0);
    let scaled = a * scale;

    // Taylor series: I + A + A²/2! + ...
    let mut result = CMat::identity(n, n);
    let mut term = CMat::identity(n, n);
    for k in 1..64 {
        term = &term * &scaled * C64::new(1.0 / k as f64, 0.0);
        result += &term;
        if term.norm() < 1e-16 * result.norm() {
            break;
        }
    }

    for _ in 0..s {
        result = &result * &result;
    }
    result
}

/// Least-squares fit y ≈ slope·x + intercept. Returns (slope, intercept).
///
/// Panics if the inputs have unequal length or fewer than two points.
pub fn linear_fit(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    assert_eq!(xs.len(), ys.len(), "linear_fit: length mismatch");
    assert!(xs.len() >= 2, "linear_fit: need at least two points");

    let n = xs.len() as f64;
    let sx: f64 = xs.iter().sum();
    let sy: f64 = ys.iter().sum();
    let sxx: f64 = xs.iter().map(|x| x * x).sum();
    let sxy: f64 = xs.iter().zip(ys.iter()).map(|(x, y)| x * y).sum();

    let denom = n * sxx - sx * sx;
    let slope = (n * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / n;
    (slope, intercept)
}
