//! Free-space Green's function and its smooth remainders
//!
//! `G(R) = exp(-γR) / (4πR)` with `γ = s/c`. Expanding the exponential,
//! `exp(-γR)/R = Σ_m (-γ)^m R^(m-1) / m!`; the even terms `m = 2k` are the
//! non-smooth ones (`R^-1`, `R`, `R^3`, …) and are the ones extracted for
//! analytic integration. Everything left over is the "remainder".

use crate::constants::{C, PI4, REMAINDER_SERIES_LIMIT};
use num_complex::Complex64;

/// Maximum number of series terms for the small-argument remainder
const MAX_SERIES_TERMS: usize = 40;

/// Coefficients `γ^(2k) / (2k)! / 4π` of the extracted terms `R^(2k-1)`
pub fn singular_coefficients(gamma: Complex64, num_terms: usize) -> Vec<Complex64> {
    let mut coeffs = Vec::with_capacity(num_terms);
    let mut c = Complex64::new(1.0 / PI4, 0.0);
    for k in 0..num_terms {
        if k > 0 {
            let m = (2 * k) as f64;
            c *= gamma * gamma / (m * (m - 1.0));
        }
        coeffs.push(c);
    }
    coeffs
}

/// Full Green's function `exp(-γR) / (4πR)`
#[inline]
pub fn green(gamma: Complex64, r: f64) -> Complex64 {
    (-gamma * r).exp() / (PI4 * r)
}

/// Frequency derivative `∂G/∂s = -exp(-γR) / (4πc)`
#[inline]
pub fn green_ds(gamma: Complex64, r: f64) -> Complex64 {
    -(-gamma * r).exp() / (PI4 * C)
}

/// Radial factor `f(R)` of the gradient, `∇G = (r - r') f(R)`
#[inline]
pub fn green_gradient_factor(gamma: Complex64, r: f64) -> Complex64 {
    -(-gamma * r).exp() * (1.0 + gamma * r) / (PI4 * r * r * r)
}

/// `G` minus its first `num_terms` extracted terms
///
/// Finite at `R = 0` (where it equals `-γ/4π`) whenever `num_terms ≥ 1`.
pub fn green_remainder(gamma: Complex64, r: f64, num_terms: usize) -> Complex64 {
    if num_terms == 0 {
        return green(gamma, r);
    }
    let x = gamma * r;
    if x.norm() >= REMAINDER_SERIES_LIMIT {
        let mut value = green(gamma, r);
        let mut r_pow = 1.0 / r;
        for c in singular_coefficients(gamma, num_terms) {
            value -= c * r_pow;
            r_pow *= r * r;
        }
        value
    } else {
        // Σ_m (-γ)^m R^(m-1) / m! over the terms not extracted
        let mut sum = Complex64::new(0.0, 0.0);
        let mut term = -gamma; // (-γ)^m / m! for m = 1
        let mut r_pow = 1.0; // R^(m-1)
        for m in 1..MAX_SERIES_TERMS {
            let extracted = m % 2 == 0 && m / 2 < num_terms;
            if !extracted {
                let contribution = term * r_pow;
                sum += contribution;
                if m > 2 * num_terms && contribution.norm() <= f64::EPSILON * sum.norm() {
                    break;
                }
            }
            term *= -gamma / (m + 1) as f64;
            r_pow *= r;
        }
        sum / PI4
    }
}

/// Radial factor of the gradient remainder, `∇(G - extracted) = (r - r') f(R)`
///
/// Returns zero at `R = 0`, where `r - r'` vanishes.
pub fn green_gradient_remainder(gamma: Complex64, r: f64, num_terms: usize) -> Complex64 {
    if r == 0.0 {
        return Complex64::new(0.0, 0.0);
    }
    if num_terms == 0 {
        return green_gradient_factor(gamma, r);
    }
    let x = gamma * r;
    if x.norm() >= REMAINDER_SERIES_LIMIT {
        let mut value = green_gradient_factor(gamma, r);
        // ∇R^n = n R^(n-2) (r - r')
        for (k, c) in singular_coefficients(gamma, num_terms).into_iter().enumerate() {
            let n = 2 * k as i32 - 1;
            value -= c * (n as f64) * r.powi(n - 2);
        }
        value
    } else {
        // Σ_m (-γ)^m (m-1) R^(m-3) / m! over the terms not extracted
        let mut sum = Complex64::new(0.0, 0.0);
        let mut term = gamma * gamma / 2.0; // m = 2
        let mut r_pow = 1.0 / r; // R^(m-3)
        for m in 2..MAX_SERIES_TERMS {
            let extracted = m % 2 == 0 && m / 2 < num_terms;
            if !extracted {
                let contribution = term * ((m - 1) as f64) * r_pow;
                sum += contribution;
                if m > 2 * num_terms && contribution.norm() <= f64::EPSILON * sum.norm() {
                    break;
                }
            }
            term *= -gamma / (m + 1) as f64;
            r_pow *= r;
        }
        sum / PI4
    }
}
