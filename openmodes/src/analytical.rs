//! Closed-form reference solutions
//!
//! Spherical Bessel functions are computed by recurrence: Miller's downward
//! recurrence for `j_n`, which is unstable upwards once `n > x`, and the
//! stable upward recurrence for `y_n`.

use crate::constants::{C, ETA_0};
use std::f64::consts::PI;

/// Multipole orders kept in the Mie series
const MIE_TERMS: usize = 40;

/// `j_n(x)` for `n = 0..order`
pub fn spherical_bessel_j(order: usize, x: f64) -> Vec<f64> {
    let mut result = vec![0.0; order];
    if order == 0 {
        return result;
    }
    if x.abs() < 1e-15 {
        result[0] = 1.0;
        return result;
    }

    let start_n = order + (x.abs() as usize) + 20;
    let mut values = vec![0.0; start_n + 2];
    values[start_n] = 1e-30;

    // j_{n-1} = (2n+1)/x j_n - j_{n+1}
    for k in (0..start_n).rev() {
        values[k] = (2 * k + 3) as f64 / x * values[k + 1] - values[k + 2];
    }

    let scale = (x.sin() / x) / values[0];
    for (out, v) in result.iter_mut().zip(values.iter()) {
        *out = v * scale;
    }
    result
}

/// `y_n(x)` for `n = 0..order`, `x > 0`
pub fn spherical_bessel_y(order: usize, x: f64) -> Vec<f64> {
    let mut result = vec![0.0; order];
    if order == 0 {
        return result;
    }
    let (sin_x, cos_x) = x.sin_cos();
    result[0] = -cos_x / x;
    if order > 1 {
        result[1] = -cos_x / (x * x) - sin_x / x;
    }
    for n in 2..order {
        result[n] = (2 * n - 1) as f64 / x * result[n - 1] - result[n - 2];
    }
    result
}

/// Extinction of a perfectly conducting sphere
///
/// Kerker's form of the Mie series, `σ = 2π/k² Σ (2n+1) Re(a_n + b_n)`,
/// returned as `σ / η₀` so that it matches `Re(V_Eᴴ I)` for a unit
/// amplitude plane wave.
pub fn sphere_extinction_pec(freqs: &[f64], radius: f64) -> Vec<f64> {
    freqs
        .iter()
        .map(|&f| {
            let x = 2.0 * PI * f / C * radius;
            let jn = spherical_bessel_j(MIE_TERMS + 1, x);
            let yn = spherical_bessel_y(MIE_TERMS + 1, x);

            let mut sum = 0.0;
            for n in 1..=MIE_TERMS {
                let nf = n as f64;
                let jnp = jn[n - 1] - (nf + 1.0) / x * jn[n];
                let ynp = yn[n - 1] - (nf + 1.0) / x * yn[n];

                // h_n^(2) = j_n - i y_n
                let (h_re, h_im) = (jn[n], -yn[n]);
                let (hp_re, hp_im) = (jnp, -ynp);

                let a_num = x * jnp + jn[n];
                let (a_den_re, a_den_im) = (x * hp_re + h_re, x * hp_im + h_im);
                let a_re = a_num * a_den_re / (a_den_re * a_den_re + a_den_im * a_den_im);
                let b_re = jn[n] * h_re / (h_re * h_re + h_im * h_im);

                sum += (2.0 * nf + 1.0) * (a_re + b_re);
            }
            2.0 * PI * sum / (x * x) * radius * radius / ETA_0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bessel_low_orders() {
        let x = 1.3_f64;
        let j = spherical_bessel_j(3, x);
        let y = spherical_bessel_y(3, x);
        assert_relative_eq!(j[0], x.sin() / x, epsilon = 1e-14);
        assert_relative_eq!(j[1], x.sin() / (x * x) - x.cos() / x, epsilon = 1e-13);
        assert_relative_eq!(y[1], -x.cos() / (x * x) - x.sin() / x, epsilon = 1e-14);

        let j2 = (3.0 / (x * x) - 1.0) * x.sin() / x - 3.0 * x.cos() / (x * x);
        assert_relative_eq!(j[2], j2, epsilon = 1e-13);
    }

    #[test]
    fn test_wronskian() {
        // j_n y_{n-1} - j_{n-1} y_n = 1/x²
        let x = 2.5;
        let j = spherical_bessel_j(10, x);
        let y = spherical_bessel_y(10, x);
        for n in 1..10 {
            assert_relative_eq!(j[n] * y[n - 1] - j[n - 1] * y[n], 1.0 / (x * x), max_relative = 1e-10);
        }
    }

    #[test]
    fn test_extinction_limits() {
        let radius = 5e-3;
        let ext = sphere_extinction_pec(&[1e9, 5e9, 2e11], radius);
        assert!(ext.iter().all(|&e| e > 0.0));
        // optical limit: σ → 2πa²
        let optical = 2.0 * PI * radius * radius / ETA_0;
        assert_relative_eq!(ext[2], optical, max_relative = 0.05);
        // Rayleigh regime grows as f⁴
        assert!(ext[0] < ext[1]);
    }
}
