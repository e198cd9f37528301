//! Dense eigenvalue problems
//!
//! Eigenvalues come from the Hessenberg/QR iteration in [`qr`]; eigenvectors
//! are recovered one at a time by inverse iteration, since the callers only
//! ever need a handful of modes out of the full spectrum.

pub mod hessenberg;
pub mod qr;

pub use hessenberg::hessenberg;
pub use qr::eigenvalues;

use crate::direct::{lu_factorize, lu_solve_matrix};
use crate::error::{LinalgError, Result};
use ndarray::{Array1, Array2};
use num_complex::Complex64;

const INVERSE_ITERATIONS: usize = 8;

/// Right eigenvector of `a` for the eigenvalue `lambda`
///
/// Inverse iteration on `a - (λ + δ)I`, where `δ` is a small relative offset
/// that keeps the shifted matrix factorisable. The result has unit 2-norm.
pub fn eigenvector(a: &Array2<Complex64>, lambda: Complex64) -> Result<Array1<Complex64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let scale = a.iter().map(|z| z.norm()).fold(lambda.norm(), f64::max);
    let scale = if scale > 0.0 { scale } else { 1.0 };

    let mut offset = scale * 1e-10;
    let lu = loop {
        let mut shifted = a.clone();
        let shift = lambda + Complex64::new(offset, offset);
        for i in 0..n {
            shifted[[i, i]] -= shift;
        }
        match lu_factorize(&shifted) {
            Ok(lu) => break lu,
            Err(LinalgError::SingularMatrix) if offset < scale * 1e-4 => offset *= 10.0,
            Err(e) => return Err(e),
        }
    };

    let mut x = Array1::from_elem(n, Complex64::new(1.0 / (n as f64).sqrt(), 0.0));
    for _ in 0..INVERSE_ITERATIONS {
        let y = lu.solve(&x)?;
        let norm = y.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(LinalgError::SingularMatrix);
        }
        let y = y.mapv(|z| z / norm);

        // fix the phase on the largest entry so successive iterates compare
        let pivot = y
            .iter()
            .copied()
            .fold(Complex64::new(0.0, 0.0), |acc, z| {
                if z.norm() > acc.norm() {
                    z
                } else {
                    acc
                }
            });
        let phase = pivot.conj() / pivot.norm();
        let y = y.mapv(|z| z * phase);

        let change = y
            .iter()
            .zip(x.iter())
            .map(|(a, b)| (a - b).norm_sqr())
            .sum::<f64>()
            .sqrt();
        x = y;
        if change < 1e-12 {
            break;
        }
    }

    Ok(x)
}

/// Solution of the generalised problem `a x = λ b x`
///
/// Holds the reduced matrix `b⁻¹a` so that eigenvectors can be requested
/// lazily for the eigenvalues of interest.
#[derive(Debug, Clone)]
pub struct GeneralizedEigen {
    /// Eigenvalues in deflation order
    pub values: Array1<Complex64>,
    reduced: Array2<Complex64>,
}

impl GeneralizedEigen {
    /// Eigenvector for `values[index]`
    pub fn vector(&self, index: usize) -> Result<Array1<Complex64>> {
        let lambda = self
            .values
            .get(index)
            .copied()
            .ok_or(LinalgError::DimensionMismatch {
                expected: self.values.len(),
                got: index,
            })?;
        eigenvector(&self.reduced, lambda)
    }
}

/// Eigenvalues of `a x = λ b x` for non-singular `b`
///
/// The spectrum of `b⁻¹a` comes from LAPACK `geev` under the
/// `ndarray-linalg` feature and from the shifted QR iteration otherwise.
pub fn eig_generalized(a: &Array2<Complex64>, b: &Array2<Complex64>) -> Result<GeneralizedEigen> {
    if a.dim() != b.dim() {
        return Err(LinalgError::DimensionMismatch {
            expected: a.nrows(),
            got: b.nrows(),
        });
    }
    let reduced = lu_solve_matrix(b, a)?;

    #[cfg(feature = "ndarray-linalg")]
    let values = {
        use ndarray_linalg::Eig;
        let (values, _) = reduced
            .eig()
            .map_err(|_| LinalgError::NoConvergence { iterations: 0 })?;
        values
    };

    #[cfg(not(feature = "ndarray-linalg"))]
    let values = eigenvalues(&reduced)?;

    Ok(GeneralizedEigen { values, reduced })
}
