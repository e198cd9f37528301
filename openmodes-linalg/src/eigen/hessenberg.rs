//! Householder reduction to upper Hessenberg form

use ndarray::Array2;
use num_complex::Complex64;

/// Reduce a square complex matrix to upper Hessenberg form by a unitary
/// similarity transform.
///
/// Entries below the first subdiagonal are set to exactly zero.
pub fn hessenberg(a: &Array2<Complex64>) -> Array2<Complex64> {
    let n = a.nrows();
    let mut h = a.clone();
    if n < 3 {
        return h;
    }

    let mut v = vec![Complex64::new(0.0, 0.0); n];

    for k in 0..(n - 2) {
        let len = n - k - 1;
        let x_norm = (0..len)
            .map(|i| h[[k + 1 + i, k]].norm_sqr())
            .sum::<f64>()
            .sqrt();
        if x_norm == 0.0 {
            continue;
        }

        let x0 = h[[k + 1, k]];
        let phase = if x0.norm() > 0.0 {
            x0 / x0.norm()
        } else {
            Complex64::new(1.0, 0.0)
        };
        let alpha = -phase * x_norm;

        for i in 0..len {
            v[i] = h[[k + 1 + i, k]];
        }
        v[0] -= alpha;
        let v_norm = v[..len].iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if v_norm == 0.0 {
            continue;
        }
        for vi in v[..len].iter_mut() {
            *vi /= v_norm;
        }

        // H <- (I - 2vv^H) H
        for j in k..n {
            let mut dot = Complex64::new(0.0, 0.0);
            for i in 0..len {
                dot += v[i].conj() * h[[k + 1 + i, j]];
            }
            dot *= 2.0;
            for i in 0..len {
                h[[k + 1 + i, j]] -= v[i] * dot;
            }
        }

        // H <- H (I - 2vv^H)
        for i in 0..n {
            let mut dot = Complex64::new(0.0, 0.0);
            for j in 0..len {
                dot += h[[i, k + 1 + j]] * v[j];
            }
            dot *= 2.0;
            for j in 0..len {
                h[[i, k + 1 + j]] -= dot * v[j].conj();
            }
        }

        for i in (k + 2)..n {
            h[[i, k]] = Complex64::new(0.0, 0.0);
        }
    }

    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_matrix() -> Array2<Complex64> {
        Array2::from_shape_fn((5, 5), |(i, j)| {
            Complex64::new(
                ((i * 7 + j * 3) % 5) as f64 - 1.5,
                ((i + 2 * j) % 3) as f64 * 0.5,
            )
        })
    }

    #[test]
    fn test_hessenberg_structure() {
        let h = hessenberg(&test_matrix());
        for i in 0..5 {
            for j in 0..5 {
                if i > j + 1 {
                    assert_eq!(h[[i, j]], Complex64::new(0.0, 0.0));
                }
            }
        }
    }

    #[test]
    fn test_hessenberg_similarity_invariants() {
        let a = test_matrix();
        let h = hessenberg(&a);

        let trace_a: Complex64 = (0..5).map(|i| a[[i, i]]).sum();
        let trace_h: Complex64 = (0..5).map(|i| h[[i, i]]).sum();
        assert_relative_eq!(trace_a.re, trace_h.re, epsilon = 1e-12);
        assert_relative_eq!(trace_a.im, trace_h.im, epsilon = 1e-12);

        let frob_a: f64 = a.iter().map(|z| z.norm_sqr()).sum();
        let frob_h: f64 = h.iter().map(|z| z.norm_sqr()).sum();
        assert_relative_eq!(frob_a, frob_h, max_relative = 1e-12);
    }
}
