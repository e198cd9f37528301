//! Analytic integrals of `R^n` over a flat triangle
//!
//! Hänninen, Taskinen and Sarvas, "Singularity subtraction integral
//! formulae for surface integral equations with RWG, rooftop and hybrid
//! basis functions", PIER 63 (2006). With the observer `r` at height `h`
//! above the source plane and `ρ` its projection, every integral reduces to
//! edge line integrals `I_L^n` and the solid-angle terms `β`.

use crate::constants::GEOMETRIC_TOLERANCE;
use crate::geometry::{add, cross_product, distance, dot_product, normalize, scale, sub, Vec3};

/// Integrals over a source triangle for the powers `n = -1, 1, 3, …`
#[derive(Debug, Clone, PartialEq)]
pub struct FaceIntegrals {
    /// `∫ R^n dS'`
    pub scalar: Vec<f64>,
    /// `∫ r' R^n dS'`
    pub vector: Vec<Vec3>,
    /// `∫ ∇R^n dS'`, gradient with respect to the observer
    pub gradient: Vec<Vec3>,
}

/// Geometry of one source edge relative to the observer
struct EdgeTerms {
    /// In-plane outward normal of the edge
    m_hat: Vec3,
    /// Signed distance from `ρ` to the edge line
    t0: f64,
    /// `I_L^n` for `n = -1, 1, 3, …, 2·num_terms + 1`
    line: Vec<f64>,
    /// Solid-angle contribution
    beta: f64,
}

/// Integrate `R^n`, `r' R^n` and `∇R^n` over a triangle
///
/// `num_terms` powers are returned, `n = 2k - 1` for `k = 0..num_terms`.
pub fn face_integrals_hanninen(source_nodes: &[Vec3; 3], num_terms: usize, r: &Vec3) -> FaceIntegrals {
    let [v0, v1, v2] = source_nodes;
    let (n_hat, _) = normalize(&cross_product(&sub(v1, v0), &sub(v2, v0)));
    let h = dot_product(&sub(r, v0), &n_hat);
    let abs_h = h.abs();
    let rho = sub(r, &scale(&n_hat, h));

    let size = distance(v0, v1).max(distance(v1, v2)).max(distance(v2, v0));
    let tol = GEOMETRIC_TOLERANCE * size;

    // line integrals are needed two powers beyond the highest surface term
    let num_line = num_terms + 1;
    let edges: Vec<EdgeTerms> = (0..3)
        .map(|i| {
            let a = &source_nodes[i];
            let b = &source_nodes[(i + 1) % 3];
            edge_terms(a, b, r, &rho, &n_hat, abs_h, num_line, tol)
        })
        .collect();

    let beta_sum: f64 = edges.iter().map(|e| e.beta).sum();

    let mut scalar = Vec::with_capacity(num_terms);
    for k in 0..num_terms {
        let edge_sum: f64 = edges.iter().map(|e| e.t0 * e.line[k]).sum();
        let value = if k == 0 {
            edge_sum - abs_h * beta_sum
        } else {
            let n = (2 * k - 1) as f64;
            (n * h * h * scalar[k - 1] + edge_sum) / (n + 2.0)
        };
        scalar.push(value);
    }

    let vector = (0..num_terms)
        .map(|k| {
            let n = 2.0 * k as f64 - 1.0;
            let mut acc = [0.0; 3];
            for e in &edges {
                acc = add(&acc, &scale(&e.m_hat, e.line[k + 1]));
            }
            add(&scale(&rho, scalar[k]), &scale(&acc, 1.0 / (n + 2.0)))
        })
        .collect();

    let sign_h = if abs_h > tol { h.signum() } else { 0.0 };
    let gradient = (0..num_terms)
        .map(|k| {
            let mut g = if k == 0 {
                scale(&n_hat, -sign_h * beta_sum)
            } else {
                let n = (2 * k - 1) as f64;
                scale(&n_hat, n * h * scalar[k - 1])
            };
            for e in &edges {
                g = sub(&g, &scale(&e.m_hat, e.line[k]));
            }
            g
        })
        .collect();

    FaceIntegrals {
        scalar,
        vector,
        gradient,
    }
}

#[allow(clippy::too_many_arguments)]
fn edge_terms(
    a: &Vec3,
    b: &Vec3,
    r: &Vec3,
    rho: &Vec3,
    n_hat: &Vec3,
    abs_h: f64,
    num_line: usize,
    tol: f64,
) -> EdgeTerms {
    let (l_hat, _) = normalize(&sub(b, a));
    let m_hat = cross_product(&l_hat, n_hat);
    let s_plus = dot_product(&sub(b, rho), &l_hat);
    let s_minus = dot_product(&sub(a, rho), &l_hat);
    let t0 = dot_product(&sub(a, rho), &m_hat);
    let r0_sq = t0 * t0 + abs_h * abs_h;
    let r_plus = distance(r, b);
    let r_minus = distance(r, a);
    let on_edge_line = r0_sq.sqrt() <= tol;

    let mut line = Vec::with_capacity(num_line + 1);
    let log_term = if on_edge_line && s_minus < 0.0 && s_plus > 0.0 {
        // observer on the edge itself: the term is multiplied by t0 = 0
        0.0
    } else if s_plus > 0.0 {
        ((r_plus + s_plus) / (r_minus + s_minus)).ln()
    } else {
        ((r_minus - s_minus) / (r_plus - s_plus)).ln()
    };
    line.push(log_term);
    for k in 1..=num_line {
        let n = (2 * k - 1) as i32;
        let nf = n as f64;
        let value = (s_plus * r_plus.powi(n) - s_minus * r_minus.powi(n)
            + nf * r0_sq * line[k - 1])
            / (nf + 1.0);
        line.push(value);
    }

    let beta = if on_edge_line {
        0.0
    } else {
        (t0 * s_plus / (r0_sq + abs_h * r_plus)).atan()
            - (t0 * s_minus / (r0_sq + abs_h * r_minus)).atan()
    };

    EdgeTerms {
        m_hat,
        t0,
        line,
        beta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{barycentric_point, triangle_area};
    use crate::integration::TriangleRule;
    use approx::assert_relative_eq;

    const TRI: [Vec3; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.3, 0.8, 0.0]];

    /// Brute-force integral of `f(r')` with a high-order product rule
    fn brute_force<F: Fn(&Vec3) -> f64>(f: F) -> f64 {
        let rule = TriangleRule::new(79).unwrap();
        let area = triangle_area(&TRI);
        rule.iter()
            .map(|(b, w)| w * f(&barycentric_point(&TRI, b)))
            .sum::<f64>()
            * area
    }

    #[test]
    fn test_scalar_terms_off_plane() {
        let r = [0.3, 0.2, 0.4];
        let res = face_integrals_hanninen(&TRI, 3, &r);
        for (k, &value) in res.scalar.iter().enumerate() {
            let n = 2 * k as i32 - 1;
            let expected = brute_force(|rp| distance(&r, rp).powi(n));
            assert_relative_eq!(value, expected, max_relative = 1e-10);
        }
    }

    #[test]
    fn test_vector_and_gradient_terms() {
        let r = [0.3, 0.2, 0.4];
        let res = face_integrals_hanninen(&TRI, 2, &r);
        for c in 0..3 {
            let expected = brute_force(|rp| rp[c] * distance(&r, rp));
            assert_relative_eq!(res.vector[1][c], expected, epsilon = 1e-10);

            let expected = brute_force(|rp| -(r[c] - rp[c]) / distance(&r, rp).powi(3));
            assert_relative_eq!(res.gradient[0][c], expected, epsilon = 1e-8);

            let expected = brute_force(|rp| (r[c] - rp[c]) / distance(&r, rp));
            assert_relative_eq!(res.gradient[1][c], expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_projection_outside_below_plane() {
        let r = [1.5, -0.7, -0.3];
        let res = face_integrals_hanninen(&TRI, 1, &r);
        let expected = brute_force(|rp| 1.0 / distance(&r, rp));
        assert_relative_eq!(res.scalar[0], expected, max_relative = 1e-10);
    }

    #[test]
    fn test_in_plane_observer() {
        // inside the triangle the 1/R integral is finite and the normal
        // component of the gradient vanishes
        let r = [0.4, 0.3, 0.0];
        let res = face_integrals_hanninen(&TRI, 1, &r);
        assert!(res.scalar[0].is_finite());
        assert!(res.scalar[0] > 0.0);
        assert_eq!(res.gradient[0][2], 0.0);
    }
}
