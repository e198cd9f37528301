//! Double integrals over touching triangle pairs
//!
//! Ylä-Oijala and Taskinen, "Calculation of CFIE impedance matrix elements
//! with RWG and n×RWG functions", IEEE Trans. AP 51 (2003): the inner
//! (source) integral is done analytically by [`face_integrals_hanninen`],
//! the outer (observer) integral numerically.

use super::hanninen::face_integrals_hanninen;
use crate::geometry::{barycentric_point, cross_product, dot_product, scale, sub, triangle_area, Vec3};
use crate::integration::TriangleRule;

/// `3 × 3` block indexed by observer vertex `i` and source vertex `j`
pub type VertexBlock = [[f64; 3]; 3];

/// Singular double integrals for one observer/source triangle pair
///
/// Index `k` runs over the powers `R^(2k-1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct SingularFacePair {
    /// `∫∫ R^n`
    pub phi: Vec<f64>,
    /// `∫∫ (r - p_i)·(r' - q_j) R^n`
    pub a: Vec<VertexBlock>,
    /// `∫∫ (r - p_i)·(∇R^n × (r' - q_j))`
    pub t: Vec<VertexBlock>,
    /// `∫∫ (r - p_i)·(n̂_p × (∇R^n × (r' - q_j)))`
    pub n: Vec<VertexBlock>,
}

/// Integrate the extracted singular terms over a pair of triangles
///
/// `observer_normal` is the unit normal of the observer triangle, used by
/// the n×-tested MFIE terms.
pub fn face_integrals_yla_oijala(
    source_nodes: &[Vec3; 3],
    rule: &TriangleRule,
    observer_nodes: &[Vec3; 3],
    observer_normal: &Vec3,
    num_terms: usize,
) -> SingularFacePair {
    let mut phi = vec![0.0; num_terms];
    let mut a = vec![[[0.0; 3]; 3]; num_terms];
    let mut t = vec![[[0.0; 3]; 3]; num_terms];
    let mut n = vec![[[0.0; 3]; 3]; num_terms];

    let area = triangle_area(observer_nodes);

    for (bary, weight) in rule.iter() {
        let r = barycentric_point(observer_nodes, bary);
        let w = weight * area;
        let inner = face_integrals_hanninen(source_nodes, num_terms, &r);

        let rel_p: Vec<Vec3> = observer_nodes.iter().map(|p| sub(&r, p)).collect();
        let rel_q: Vec<Vec3> = source_nodes.iter().map(|q| sub(&r, q)).collect();

        for k in 0..num_terms {
            let scalar = inner.scalar[k];
            let vector = inner.vector[k];
            let grad = inner.gradient[k];
            phi[k] += w * scalar;

            for j in 0..3 {
                // ∫ (r' - q_j) R^n dS'
                let source_vec = sub(&vector, &scale(&source_nodes[j], scalar));
                // ∇R^n × (r' - q_j) integrates to (∫∇R^n) × (r - q_j)
                let grad_cross = cross_product(&grad, &rel_q[j]);
                let n_cross = cross_product(observer_normal, &grad_cross);
                for i in 0..3 {
                    a[k][i][j] += w * dot_product(&rel_p[i], &source_vec);
                    t[k][i][j] += w * dot_product(&rel_p[i], &grad_cross);
                    n[k][i][j] += w * dot_product(&rel_p[i], &n_cross);
                }
            }
        }
    }

    SingularFacePair { phi, a, t, n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::arcioni::arcioni_singular;
    use approx::assert_relative_eq;

    const TRI: [Vec3; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.3, 0.8, 0.0]];

    #[test]
    fn test_self_term_matches_arcioni() {
        let rule = TriangleRule::new(8).unwrap();
        let res = face_integrals_yla_oijala(&TRI, &rule, &TRI, &[0.0, 0.0, 1.0], 2);
        assert_relative_eq!(res.phi[0], arcioni_singular(&TRI), max_relative = 1e-3);

        // coplanar self pair: MFIE terms vanish
        for i in 0..3 {
            for j in 0..3 {
                assert!(res.t[0][i][j].abs() < 1e-12);
                assert!(res.n[0][i][j].abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_a_block_reciprocity() {
        // A is reciprocal: swapping observer and source transposes the block
        let other: [Vec3; 3] = [[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.5, -0.2, 0.7]];
        let rule = TriangleRule::new(12).unwrap();
        let normal = [0.0, 0.0, 1.0];
        let pq = face_integrals_yla_oijala(&TRI, &rule, &other, &normal, 1);
        let qp = face_integrals_yla_oijala(&other, &rule, &TRI, &normal, 1);
        assert_relative_eq!(pq.phi[0], qp.phi[0], max_relative = 1e-3);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(pq.a[0][i][j], qp.a[0][j][i], epsilon = 1e-3);
            }
        }
    }
}
