//! Eigenvalue problems in the complex frequency
//!
//! - [`eig_linearised`]: quasi-static estimate of EFIE poles from the
//!   generalised problem `S v = -s² L v`
//! - [`eig_newton`]: refinement of a single pole of a nonlinear matrix
//!   function `Z(s)` by Newton's method (nonlinear inverse iteration)

use crate::error::{OpenModesError, Result};
use linalg::{eig_generalized, lu_factorize, LinalgError};
use log::debug;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Eigenvalues below this fraction of the largest are the static null space
const NULL_SPACE_THRESHOLD: f64 = 1e-10;

/// Relative step of the central difference when no derivative is available
const FINITE_DIFFERENCE_STEP: f64 = 1e-6;

/// Linearised pole estimates
///
/// Solves `S v = -s² L v`, drops the static solutions, takes the root with
/// `Im s ≥ 0` and sorts by `Im s`. `modes` indexes into that sorted list.
/// Returns the selected frequencies and their eigenvectors as columns.
pub fn eig_linearised(
    l: &Array2<Complex64>,
    s_mat: &Array2<Complex64>,
    modes: &[usize],
) -> Result<(Array1<Complex64>, Array2<Complex64>)> {
    let eig = eig_generalized(s_mat, l)?;
    let max_abs = eig.values.iter().map(|z| z.norm()).fold(0.0, f64::max);

    let mut dynamic: Vec<(usize, Complex64)> = eig
        .values
        .iter()
        .enumerate()
        .filter(|(_, lambda)| lambda.norm() >= NULL_SPACE_THRESHOLD * max_abs)
        .map(|(idx, &lambda)| {
            let s = (-lambda).sqrt();
            (idx, if s.im < 0.0 { -s } else { s })
        })
        .collect();
    dynamic.sort_by(|a, b| a.1.im.total_cmp(&b.1.im));
    debug!(
        "{} of {} linearised eigenvalues are non-static",
        dynamic.len(),
        eig.values.len()
    );

    let mut s_out = Array1::zeros(modes.len());
    let mut vr = Array2::zeros((l.nrows(), modes.len()));
    for (col, &mode) in modes.iter().enumerate() {
        let &(idx, s) = dynamic.get(mode).ok_or_else(|| {
            OpenModesError::InvalidParameters(format!(
                "mode {} requested but only {} non-static modes exist",
                mode,
                dynamic.len()
            ))
        })?;
        s_out[col] = s;
        vr.column_mut(col).assign(&eig.vector(idx)?);
    }
    Ok((s_out, vr))
}

/// Controls for [`eig_newton`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewtonOptions {
    /// Relative change in the eigenvalue at which to stop
    pub lambda_tol: f64,
    /// Iteration budget
    pub max_iter: usize,
}

impl Default for NewtonOptions {
    fn default() -> Self {
        Self {
            lambda_tol: 1e-6,
            max_iter: 200,
        }
    }
}

/// Result of a Newton search
#[derive(Debug, Clone)]
pub struct NewtonResult {
    /// Converged eigenvalue
    pub eigval: Complex64,
    /// Eigenvector, normalised so its largest initial element is one
    pub eigvec: Array1<Complex64>,
    /// Iterations performed
    pub iter_count: usize,
    /// Last eigenvalue update
    pub delta: Complex64,
}

/// Find `λ` and `x` with `T(λ) x = 0` starting from an estimate
///
/// `func` returns `T(λ)` and, when available, `T'(λ)`; otherwise the
/// derivative is taken by central differences. The normalisation
/// `uᴴx = 1` uses the unit vector on the largest element of `x0`.
pub fn eig_newton<F>(
    mut func: F,
    lambda_0: Complex64,
    x0: &Array1<Complex64>,
    options: &NewtonOptions,
) -> Result<NewtonResult>
where
    F: FnMut(Complex64) -> Result<(Array2<Complex64>, Option<Array2<Complex64>>)>,
{
    let weight = x0
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.norm().total_cmp(&b.1.norm()))
        .map(|(idx, _)| idx)
        .ok_or_else(|| OpenModesError::InvalidParameters("empty eigenvector estimate".to_string()))?;
    if x0[weight].norm() == 0.0 {
        return Err(OpenModesError::InvalidParameters(
            "eigenvector estimate is zero".to_string(),
        ));
    }

    let mut lambda = lambda_0;
    let mut x = x0 / x0[weight];
    let mut delta = Complex64::new(0.0, 0.0);

    for iter in 0..options.max_iter {
        let (t, dt) = func(lambda)?;
        let dt = match dt {
            Some(dt) => dt,
            None => {
                let h = FINITE_DIFFERENCE_STEP * lambda.norm().max(f64::MIN_POSITIVE);
                let (t_plus, _) = func(lambda + h)?;
                let (t_minus, _) = func(lambda - h)?;
                (t_plus - t_minus) / (2.0 * h)
            }
        };

        let lu = match lu_factorize(&t) {
            Ok(lu) => lu,
            Err(LinalgError::SingularMatrix) => {
                // T(λ) is exactly singular, so λ is an eigenvalue
                debug!("Newton iteration hit an exactly singular matrix at iteration {}", iter);
                return Ok(NewtonResult {
                    eigval: lambda,
                    eigvec: x,
                    iter_count: iter,
                    delta,
                });
            }
            Err(e) => return Err(e.into()),
        };
        let w = lu.solve(&dt.dot(&x))?;

        if w[weight].norm() == 0.0 {
            return Err(OpenModesError::NoConvergence {
                iterations: iter,
                context: "Newton update has zero weight".to_string(),
            });
        }
        delta = x[weight] / w[weight];
        lambda -= delta;
        x = &w / w[weight];

        debug!("Newton iteration {}: λ = {}, |Δ| = {:e}", iter, lambda, delta.norm());
        if delta.norm() <= options.lambda_tol * lambda.norm() {
            return Ok(NewtonResult {
                eigval: lambda,
                eigvec: x,
                iter_count: iter + 1,
                delta,
            });
        }
    }

    Err(OpenModesError::NoConvergence {
        iterations: options.max_iter,
        context: format!("Newton eigenvalue search from {}", lambda_0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn test_linearised_diagonal() {
        // s² l + s_mat = 0 with l = 1 gives s = ±j sqrt(s_mat)
        let l = Array2::from_diag(&Array1::from_elem(3, c(1.0, 0.0)));
        let s_mat = Array2::from_diag(&Array1::from(vec![c(9.0, 0.0), c(0.0, 0.0), c(4.0, 0.0)]));
        let (s, vr) = eig_linearised(&l, &s_mat, &[0, 1]).unwrap();
        assert_relative_eq!(s[0].im, 2.0, epsilon = 1e-10);
        assert_relative_eq!(s[1].im, 3.0, epsilon = 1e-10);
        assert_relative_eq!(s[0].re, 0.0, epsilon = 1e-10);
        // static mode excluded
        assert!(eig_linearised(&l, &s_mat, &[2]).is_err());
        assert_relative_eq!(vr[[2, 0]].norm(), 1.0, epsilon = 1e-8);
    }

    fn quadratic(lambda: Complex64) -> Array2<Complex64> {
        // T(λ) = λ² I - diag(1, 4, 9) + small coupling
        let mut t = Array2::from_shape_fn((3, 3), |(i, j)| if i == j { c(0.0, 0.0) } else { c(0.01, 0.0) });
        for i in 0..3 {
            t[[i, i]] = lambda * lambda - c(((i + 1) * (i + 1)) as f64, 0.0);
        }
        t
    }

    /// `‖T(λ) x‖ / (max|T| ‖x‖)`, finite even where `T(λ)` is singular
    fn relative_residual(lambda: Complex64, x: &Array1<Complex64>) -> f64 {
        let t = quadratic(lambda);
        let norm = |v: &Array1<Complex64>| v.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        let scale = t.iter().map(|z| z.norm()).fold(0.0, f64::max);
        norm(&t.dot(x)) / (scale * norm(x))
    }

    #[test]
    fn test_newton_with_derivative() {
        let x0 = Array1::from(vec![c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)]);
        let res = eig_newton(
            |lambda| {
                let dt = Array2::from_diag(&Array1::from_elem(3, lambda * 2.0));
                Ok((quadratic(lambda), Some(dt)))
            },
            c(2.1, 0.05),
            &x0,
            &NewtonOptions {
                lambda_tol: 1e-10,
                max_iter: 50,
            },
        )
        .unwrap();
        assert_relative_eq!(res.eigval.re, 2.0, epsilon = 1e-2);
        assert!(relative_residual(res.eigval, &res.eigvec) < 1e-8);
        assert_relative_eq!(res.eigvec[1].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_newton_finite_difference() {
        let x0 = Array1::from(vec![c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)]);
        let res = eig_newton(
            |lambda| Ok((quadratic(lambda), None)),
            c(2.9, 0.0),
            &x0,
            &NewtonOptions {
                lambda_tol: 1e-10,
                max_iter: 50,
            },
        )
        .unwrap();
        assert_relative_eq!(res.eigval.re, 3.0, epsilon = 1e-2);
        assert_relative_eq!(res.eigval.im, 0.0, epsilon = 1e-8);
        assert!(relative_residual(res.eigval, &res.eigvec) < 1e-8);
    }

    #[test]
    fn test_newton_budget() {
        let x0 = Array1::from(vec![c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)]);
        let res = eig_newton(
            |lambda| Ok((quadratic(lambda), None)),
            c(10.0, 3.0),
            &x0,
            &NewtonOptions {
                lambda_tol: 1e-14,
                max_iter: 1,
            },
        );
        assert!(matches!(res, Err(OpenModesError::NoConvergence { .. })));
    }
}
