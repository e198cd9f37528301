//! Gauss-Legendre quadrature on `[-1, 1]`
//!
//! Nodes are found by Newton iteration on the Legendre recurrence, starting
//! from the Chebyshev-like estimate `cos(π(i + 3/4)/(n + 1/2))`.

use crate::error::{OpenModesError, Result};
use std::f64::consts::PI;

const NEWTON_TOLERANCE: f64 = 1e-15;
const NEWTON_MAX_ITER: usize = 100;

/// Gauss-Legendre abscissas and weights of order `n`
///
/// Returns `(points, weights)` with points ascending in `[-1, 1]`.
pub fn gauss_legendre(n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if n == 0 {
        return Err(OpenModesError::InvalidParameters(
            "Gauss-Legendre order must be at least 1".to_string(),
        ));
    }

    let mut points = vec![0.0; n];
    let mut weights = vec![0.0; n];
    let m = n.div_ceil(2);

    for i in 0..m {
        let mut x = (PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
        let mut dp = 0.0;

        for _ in 0..NEWTON_MAX_ITER {
            let (p, d) = legendre_with_derivative(n, x);
            dp = d;
            let dx = p / d;
            x -= dx;
            if dx.abs() < NEWTON_TOLERANCE {
                break;
            }
        }
        let (_, d) = legendre_with_derivative(n, x);
        if d.is_finite() {
            dp = d;
        }

        let w = 2.0 / ((1.0 - x * x) * dp * dp);
        points[i] = -x;
        points[n - 1 - i] = x;
        weights[i] = w;
        weights[n - 1 - i] = w;
    }

    Ok((points, weights))
}

/// `P_n(x)` and `P_n'(x)` by the three-term recurrence
fn legendre_with_derivative(n: usize, x: f64) -> (f64, f64) {
    let mut p0 = 1.0;
    let mut p1 = x;
    if n == 0 {
        return (1.0, 0.0);
    }
    for k in 2..=n {
        let kf = k as f64;
        let p2 = ((2.0 * kf - 1.0) * x * p1 - (kf - 1.0) * p0) / kf;
        p0 = p1;
        p1 = p2;
    }
    let deriv = n as f64 * (x * p1 - p0) / (x * x - 1.0);
    (p1, deriv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weights_sum_to_two() {
        for n in [1, 2, 5, 12, 33] {
            let (_, w) = gauss_legendre(n).unwrap();
            let sum: f64 = w.iter().sum();
            assert_relative_eq!(sum, 2.0, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_known_two_point_rule() {
        let (x, w) = gauss_legendre(2).unwrap();
        assert_relative_eq!(x[0], -1.0 / 3.0_f64.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(x[1], 1.0 / 3.0_f64.sqrt(), epsilon = 1e-15);
        assert_relative_eq!(w[0], 1.0, epsilon = 1e-14);
    }

    #[test]
    fn test_polynomial_exactness() {
        // n points integrate degree 2n-1 exactly
        let n = 6;
        let (x, w) = gauss_legendre(n).unwrap();
        for degree in 0..(2 * n) {
            let integral: f64 = x
                .iter()
                .zip(w.iter())
                .map(|(&xi, &wi)| wi * xi.powi(degree as i32))
                .sum();
            let exact = if degree % 2 == 0 {
                2.0 / (degree as f64 + 1.0)
            } else {
                0.0
            };
            assert_relative_eq!(integral, exact, epsilon = 1e-13);
        }
    }

    #[test]
    fn test_order_zero_rejected() {
        assert!(gauss_legendre(0).is_err());
    }
}
