//! MFIE face-pair integrals
//!
//! The kernel is `∇G × (r' - q_j)`, which at every point pair equals
//! `∇G × (r - q_j)` since `∇G` is parallel to `r - r'`. Two testing forms
//! are supported:
//!
//! - **Tangential**: `T_pq[i][j] = ∫∫ (r - p_i)·(∇G × (r' - q_j))`
//! - **n×**: `N_pq[i][j] = ∫∫ (r - p_i)·(n̂_p × (∇G × (r' - q_j)))`
//!
//! A flat triangle sees no field from its own current, so `p == q` entries
//! of the self arrays are left at zero.

use super::green::{green_gradient_factor, green_gradient_remainder, singular_coefficients};
use super::yla_oijala::VertexBlock;
use super::{face_normal, face_quadrature, FacePoints};
use crate::constants::C;
use crate::geometry::{cross_product, dot_product, sub, triangle_vertices, Vec3};
use crate::integration::TriangleRule;
use crate::parallel::parallel_map_indexed;
use crate::sparse::Csr;
use ndarray::{Array2, Array4};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Testing form of the MFIE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MfieForm {
    /// Tested with `n̂ × f_m`
    #[default]
    NCross,
    /// Tested with `f_m` directly
    Tangential,
}

type ComplexVec = [Complex64; 3];
type ComplexBlock = [[Complex64; 3]; 3];

const ZERO: Complex64 = Complex64::new(0.0, 0.0);

fn complex_cross(a: &ComplexVec, b: &Vec3) -> ComplexVec {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn real_cross_complex(a: &Vec3, b: &ComplexVec) -> ComplexVec {
    [
        b[2] * a[1] - b[1] * a[2],
        b[0] * a[2] - b[2] * a[0],
        b[1] * a[0] - b[0] * a[1],
    ]
}

fn complex_dot(a: &Vec3, b: &ComplexVec) -> Complex64 {
    b[0] * a[0] + b[1] * a[1] + b[2] * a[2]
}

/// Numerical double integral of the MFIE kernel with radial factor `f(R)`
fn integrate_pair<F: Fn(f64) -> Complex64>(
    obs: &FacePoints,
    src: &FacePoints,
    obs_nodes: &[Vec3; 3],
    src_nodes: &[Vec3; 3],
    normal: Option<&Vec3>,
    factor: F,
) -> ComplexBlock {
    let mut out = [[ZERO; 3]; 3];
    for (r, wo) in obs {
        // D = Σ w' f(R) (r - r')
        let mut d = [ZERO; 3];
        for (rp, ws) in src {
            let diff = sub(r, rp);
            let len = dot_product(&diff, &diff).sqrt();
            let f = factor(len) * *ws;
            for k in 0..3 {
                d[k] += f * diff[k];
            }
        }
        for (j, q) in src_nodes.iter().enumerate() {
            let mut kernel = complex_cross(&d, &sub(r, q));
            if let Some(n_hat) = normal {
                kernel = real_cross_complex(n_hat, &kernel);
            }
            for (i, p) in obs_nodes.iter().enumerate() {
                out[i][j] += complex_dot(&sub(r, p), &kernel) * *wo;
            }
        }
    }
    out
}

fn pack(rows: Vec<Vec<ComplexBlock>>, num_src: usize) -> Array4<Complex64> {
    let mut out = Array4::zeros((rows.len(), num_src, 3, 3));
    for (p, row) in rows.into_iter().enumerate() {
        for (q, block) in row.into_iter().enumerate() {
            for i in 0..3 {
                for j in 0..3 {
                    out[[p, q, i, j]] = block[i][j];
                }
            }
        }
    }
    out
}

/// MFIE face-pair array of a part with itself
///
/// Touching pairs in `singular` use the gradient remainder numerically and
/// add the extracted terms; `singular` must hold the arrays matching `form`.
pub fn z_mfie_faces_self(
    nodes: &Array2<f64>,
    polygons: &[[usize; 3]],
    s: Complex64,
    rule: &TriangleRule,
    form: MfieForm,
    singular: Option<&Csr<Vec<VertexBlock>>>,
) -> Array4<Complex64> {
    let gamma = s / C;
    let points = face_quadrature(nodes, polygons, rule);
    let num_faces = polygons.len();

    let rows = parallel_map_indexed(num_faces, |p| {
        let obs_nodes = triangle_vertices(nodes, &polygons[p]);
        let n_hat = face_normal(&obs_nodes);
        let normal = (form == MfieForm::NCross).then_some(&n_hat);

        (0..num_faces)
            .map(|q| {
                if q == p {
                    return [[ZERO; 3]; 3];
                }
                let src_nodes = triangle_vertices(nodes, &polygons[q]);
                match singular.and_then(|csr| csr.get(p, q)) {
                    Some(terms) => {
                        let num_terms = terms.len();
                        let mut block = integrate_pair(
                            &points[p],
                            &points[q],
                            &obs_nodes,
                            &src_nodes,
                            normal,
                            |r| green_gradient_remainder(gamma, r, num_terms),
                        );
                        for (k, c) in singular_coefficients(gamma, num_terms).into_iter().enumerate() {
                            for i in 0..3 {
                                for j in 0..3 {
                                    block[i][j] += c * terms[k][i][j];
                                }
                            }
                        }
                        block
                    }
                    None => integrate_pair(
                        &points[p],
                        &points[q],
                        &obs_nodes,
                        &src_nodes,
                        normal,
                        |r| green_gradient_factor(gamma, r),
                    ),
                }
            })
            .collect::<Vec<_>>()
    });

    pack(rows, num_faces)
}

/// MFIE face-pair array between two non-touching parts
pub fn z_mfie_faces_mutual(
    nodes_o: &Array2<f64>,
    polygons_o: &[[usize; 3]],
    nodes_s: &Array2<f64>,
    polygons_s: &[[usize; 3]],
    s: Complex64,
    rule: &TriangleRule,
    form: MfieForm,
) -> Array4<Complex64> {
    let gamma = s / C;
    let points_o = face_quadrature(nodes_o, polygons_o, rule);
    let points_s = face_quadrature(nodes_s, polygons_s, rule);

    let rows = parallel_map_indexed(polygons_o.len(), |p| {
        let obs_nodes = triangle_vertices(nodes_o, &polygons_o[p]);
        let n_hat = face_normal(&obs_nodes);
        let normal = (form == MfieForm::NCross).then_some(&n_hat);
        polygons_s
            .iter()
            .enumerate()
            .map(|(q, poly)| {
                let src_nodes = triangle_vertices(nodes_s, poly);
                integrate_pair(&points_o[p], &points_s[q], &obs_nodes, &src_nodes, normal, |r| {
                    green_gradient_factor(gamma, r)
                })
            })
            .collect::<Vec<_>>()
    });

    pack(rows, polygons_s.len())
}
