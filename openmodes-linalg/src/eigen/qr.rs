//! Shifted QR iteration on an upper Hessenberg matrix

use super::hessenberg::hessenberg;
use crate::error::{LinalgError, Result};
use log::debug;
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Sweeps allowed per eigenvalue before giving up
const MAX_SWEEPS_PER_EIGENVALUE: usize = 30;

/// Plane rotation `[c, s; -conj(s), c]` with real `c`
#[derive(Debug, Clone, Copy)]
struct Givens {
    c: f64,
    s: Complex64,
}

impl Givens {
    /// Rotation mapping `(x, y)` onto `(r, 0)`
    fn zeroing(x: Complex64, y: Complex64) -> Self {
        let x_abs = x.norm();
        let y_abs = y.norm();
        let nrm = x_abs.hypot(y_abs);
        if y_abs == 0.0 || nrm == 0.0 {
            Self {
                c: 1.0,
                s: Complex64::new(0.0, 0.0),
            }
        } else if x_abs == 0.0 {
            Self {
                c: 0.0,
                s: y.conj() / y_abs,
            }
        } else {
            Self {
                c: x_abs / nrm,
                s: (x / x_abs) * y.conj() / nrm,
            }
        }
    }
}

/// Eigenvalue of the trailing 2×2 block closest to its last diagonal entry
fn wilkinson_shift(h: &Array2<Complex64>, hi: usize) -> Complex64 {
    let a = h[[hi - 1, hi - 1]];
    let b = h[[hi - 1, hi]];
    let c = h[[hi, hi - 1]];
    let d = h[[hi, hi]];

    let half_trace = (a + d) * 0.5;
    let half_diff = (a - d) * 0.5;
    let disc = (half_diff * half_diff + b * c).sqrt();
    let mu1 = half_trace + disc;
    let mu2 = half_trace - disc;

    if (mu1 - d).norm() <= (mu2 - d).norm() {
        mu1
    } else {
        mu2
    }
}

/// One shifted QR sweep on the active block `lo..=hi`
fn qr_sweep(h: &mut Array2<Complex64>, lo: usize, hi: usize, shift: Complex64) {
    for k in lo..=hi {
        h[[k, k]] -= shift;
    }

    let mut rotations = Vec::with_capacity(hi - lo);
    for k in lo..hi {
        let g = Givens::zeroing(h[[k, k]], h[[k + 1, k]]);
        for j in k..=hi {
            let t1 = h[[k, j]];
            let t2 = h[[k + 1, j]];
            h[[k, j]] = t1 * g.c + g.s * t2;
            h[[k + 1, j]] = -g.s.conj() * t1 + t2 * g.c;
        }
        rotations.push(g);
    }

    for (offset, g) in rotations.iter().enumerate() {
        let k = lo + offset;
        let last_row = (k + 2).min(hi);
        for i in lo..=last_row {
            let t1 = h[[i, k]];
            let t2 = h[[i, k + 1]];
            h[[i, k]] = t1 * g.c + t2 * g.s.conj();
            h[[i, k + 1]] = -t1 * g.s + t2 * g.c;
        }
    }

    for k in lo..=hi {
        h[[k, k]] += shift;
    }
}

/// Eigenvalues of a general complex square matrix
///
/// The matrix is reduced to Hessenberg form and deflated from the bottom
/// with Wilkinson-shifted QR sweeps. Eigenvalues are returned in the order
/// they deflate.
pub fn eigenvalues(a: &Array2<Complex64>) -> Result<Array1<Complex64>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }
    if n == 0 {
        return Ok(Array1::zeros(0));
    }

    let mut h = hessenberg(a);
    let mut values = Vec::with_capacity(n);
    let budget = MAX_SWEEPS_PER_EIGENVALUE * n;
    let mut total_sweeps = 0;
    let mut sweeps_since_deflation = 0;
    let mut hi = n - 1;

    loop {
        if hi == 0 {
            values.push(h[[0, 0]]);
            break;
        }

        let mut lo = hi;
        while lo > 0 {
            let scale = h[[lo - 1, lo - 1]].norm() + h[[lo, lo]].norm();
            let sub = h[[lo, lo - 1]].norm();
            if sub <= f64::EPSILON * scale || sub < f64::MIN_POSITIVE {
                h[[lo, lo - 1]] = Complex64::new(0.0, 0.0);
                break;
            }
            lo -= 1;
        }

        if lo == hi {
            values.push(h[[hi, hi]]);
            hi -= 1;
            sweeps_since_deflation = 0;
            continue;
        }

        total_sweeps += 1;
        sweeps_since_deflation += 1;
        if total_sweeps > budget {
            return Err(LinalgError::NoConvergence {
                iterations: total_sweeps,
            });
        }

        let shift = if sweeps_since_deflation % 10 == 0 {
            debug!("exceptional shift at row {} after {} sweeps", hi, sweeps_since_deflation);
            h[[hi, hi]] + h[[hi, hi - 1]].norm() * 0.75
        } else {
            wilkinson_shift(&h, hi)
        };

        qr_sweep(&mut h, lo, hi, shift);
    }

    debug!("QR converged for n = {} in {} sweeps", n, total_sweeps);
    Ok(Array1::from(values))
}
