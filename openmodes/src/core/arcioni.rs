//! Closed-form self integral of `1/R` over a triangle
//!
//! Arcioni, Bressan and Perregrini, "On the evaluation of the double surface
//! integrals arising in the application of the boundary integral method to
//! 3-D problems", IEEE Trans. MTT 45 (1997).

use crate::geometry::{distance, triangle_area, Vec3};

/// `∫_T ∫_T 1/|r - r'| dS dS'` for a single triangle
pub fn arcioni_singular(nodes: &[Vec3; 3]) -> f64 {
    let a = distance(&nodes[1], &nodes[2]);
    let b = distance(&nodes[2], &nodes[0]);
    let c = distance(&nodes[0], &nodes[1]);
    let area = triangle_area(nodes);

    let term = |x: f64, y: f64, z: f64| {
        (((x + y) * (x + y) - z * z) / (y * y - (x - z) * (x - z))).ln() / x
    };

    4.0 * area * area / 3.0 * (term(a, b, c) + term(b, c, a) + term(c, a, b))
}
