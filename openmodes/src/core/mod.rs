//! Numerical kernels
//!
//! - **threads**: worker pool used by every kernel
//! - **green**: Green's function, its frequency derivative and smooth remainders
//! - **hanninen**: analytic integrals of `R^n` over a source triangle
//! - **yla_oijala**: touching face-pair integrals of the extracted terms
//! - **arcioni**: closed-form self integral of `1/R`
//! - **efie** / **mfie**: face-pair arrays of the two integral equations

pub mod arcioni;
pub mod efie;
pub mod green;
pub mod hanninen;
pub mod mfie;
pub mod threads;
pub mod yla_oijala;

pub use arcioni::arcioni_singular;
pub use efie::{z_efie_faces_mutual, z_efie_faces_self, EfieFaceArrays, EfieSingular};
pub use hanninen::{face_integrals_hanninen, FaceIntegrals};
pub use mfie::{z_mfie_faces_mutual, z_mfie_faces_self, MfieForm};
pub use threads::{get_threads, set_threads};
pub use yla_oijala::{face_integrals_yla_oijala, SingularFacePair, VertexBlock};

use crate::geometry::{barycentric_point, cross_product, normalize, sub, triangle_area, triangle_vertices, Vec3};
use crate::integration::TriangleRule;
use ndarray::Array2;

/// Quadrature points of one face with weights scaled by its area
pub(crate) type FacePoints = Vec<(Vec3, f64)>;

pub(crate) fn face_quadrature(
    nodes: &Array2<f64>,
    polygons: &[[usize; 3]],
    rule: &TriangleRule,
) -> Vec<FacePoints> {
    polygons
        .iter()
        .map(|poly| {
            let vertices = triangle_vertices(nodes, poly);
            let area = triangle_area(&vertices);
            rule.iter()
                .map(|(bary, w)| (barycentric_point(&vertices, bary), w * area))
                .collect()
        })
        .collect()
}

/// Unit normal by the right-hand rule on the node order
pub(crate) fn face_normal(vertices: &[Vec3; 3]) -> Vec3 {
    let [v0, v1, v2] = vertices;
    normalize(&cross_product(&sub(v1, v0), &sub(v2, v0))).0
}
