//! EFIE face-pair integrals
//!
//! For every observer face `p` and source face `q` these kernels return
//! `A_pq[i][j] = ∫∫ (r - p_i)·(r' - q_j) G dS dS'` and
//! `φ_pq = ∫∫ G dS dS'`, from which the vector and scalar potential
//! matrices of any RWG-like basis can be assembled.

use super::green::{green, green_ds, green_remainder, singular_coefficients};
use super::yla_oijala::VertexBlock;
use super::{face_quadrature, FacePoints};
use crate::constants::C;
use crate::error::{OpenModesError, Result};
use crate::geometry::{distance, dot_product, sub, triangle_vertices, Vec3};
use crate::integration::TriangleRule;
use crate::parallel::parallel_map_indexed;
use crate::sparse::Csr;
use ndarray::{Array2, Array4};
use num_complex::Complex64;

/// Extracted EFIE singular terms of one touching face pair
#[derive(Debug, Clone, PartialEq)]
pub struct EfieSingular {
    /// `∫∫ R^(2k-1)`
    pub phi: Vec<f64>,
    /// `∫∫ (r - p_i)·(r' - q_j) R^(2k-1)`
    pub a: Vec<VertexBlock>,
}

/// Face-pair arrays of the EFIE kernel
#[derive(Debug, Clone)]
pub struct EfieFaceArrays {
    /// `A_pq[i][j]`, shape `(P, Q, 3, 3)`
    pub a: Array4<Complex64>,
    /// `φ_pq`, shape `(P, Q)`
    pub phi: Array2<Complex64>,
    /// `∂A/∂s`, when requested
    pub da: Option<Array4<Complex64>>,
    /// `∂φ/∂s`, when requested
    pub dphi: Option<Array2<Complex64>>,
}

type ComplexBlock = [[Complex64; 3]; 3];

/// Accumulated pair integral in a form independent of the vertex choice
///
/// Positions are taken relative to the first vertex of each face, so the
/// moments stay well conditioned however far the pair is from the origin.
#[derive(Debug, Clone, Copy)]
struct PairMoments {
    obs_origin: Vec3,
    src_origin: Vec3,
    /// `Σ w g`
    g: Complex64,
    /// `Σ w g (r - o)`
    g_r: [Complex64; 3],
    /// `Σ w g (r' - o')`
    g_rp: [Complex64; 3],
    /// `Σ w g (r - o)·(r' - o')`
    g_r_rp: Complex64,
}

impl PairMoments {
    fn integrate<F: Fn(f64) -> Complex64>(
        obs: &FacePoints,
        src: &FacePoints,
        obs_nodes: &[Vec3; 3],
        src_nodes: &[Vec3; 3],
        kernel: F,
    ) -> Self {
        let zero = Complex64::new(0.0, 0.0);
        let mut m = Self {
            obs_origin: obs_nodes[0],
            src_origin: src_nodes[0],
            g: zero,
            g_r: [zero; 3],
            g_rp: [zero; 3],
            g_r_rp: zero,
        };
        for (r, wo) in obs {
            let r_local = sub(r, &m.obs_origin);
            for (rp, ws) in src {
                let rp_local = sub(rp, &m.src_origin);
                let g = kernel(distance(r, rp)) * (wo * ws);
                m.g += g;
                for k in 0..3 {
                    m.g_r[k] += g * r_local[k];
                    m.g_rp[k] += g * rp_local[k];
                }
                m.g_r_rp += g * dot_product(&r_local, &rp_local);
            }
        }
        m
    }

    /// `∫∫ (r - p_i)·(r' - q_j) g`
    fn block(&self, obs_nodes: &[Vec3; 3], src_nodes: &[Vec3; 3]) -> ComplexBlock {
        let mut out = [[Complex64::new(0.0, 0.0); 3]; 3];
        for (i, p) in obs_nodes.iter().enumerate() {
            let p = sub(p, &self.obs_origin);
            for (j, q) in src_nodes.iter().enumerate() {
                let q = sub(q, &self.src_origin);
                let r_q: Complex64 = (0..3).map(|k| self.g_r[k] * q[k]).sum();
                let p_rp: Complex64 = (0..3).map(|k| self.g_rp[k] * p[k]).sum();
                out[i][j] = self.g_r_rp - r_q - p_rp + self.g * dot_product(&p, &q);
            }
        }
        out
    }
}

/// One observer row of face-pair results
struct EfieRow {
    a: Vec<ComplexBlock>,
    phi: Vec<Complex64>,
    da: Vec<ComplexBlock>,
    dphi: Vec<Complex64>,
}

fn pack(rows: Vec<EfieRow>, num_src: usize, derivatives: bool) -> EfieFaceArrays {
    let num_obs = rows.len();
    let mut a = Array4::zeros((num_obs, num_src, 3, 3));
    let mut phi = Array2::zeros((num_obs, num_src));
    let mut da = derivatives.then(|| Array4::zeros((num_obs, num_src, 3, 3)));
    let mut dphi = derivatives.then(|| Array2::zeros((num_obs, num_src)));

    for (p, row) in rows.into_iter().enumerate() {
        for q in 0..num_src {
            phi[[p, q]] = row.phi[q];
            for i in 0..3 {
                for j in 0..3 {
                    a[[p, q, i, j]] = row.a[q][i][j];
                }
            }
            if let (Some(da), Some(dphi)) = (da.as_mut(), dphi.as_mut()) {
                dphi[[p, q]] = row.dphi[q];
                for i in 0..3 {
                    for j in 0..3 {
                        da[[p, q, i, j]] = row.da[q][i][j];
                    }
                }
            }
        }
    }

    EfieFaceArrays { a, phi, da, dphi }
}

/// EFIE face-pair arrays of a part with itself
///
/// Pairs present in `singular` (faces sharing at least one node) use the
/// smooth remainder of `G` numerically plus the pre-integrated singular
/// terms; all other pairs integrate `G` directly. Every face must have its
/// self pair in `singular`, since `G` is unbounded on coincident faces.
pub fn z_efie_faces_self(
    nodes: &Array2<f64>,
    polygons: &[[usize; 3]],
    s: Complex64,
    rule: &TriangleRule,
    singular: &Csr<EfieSingular>,
    derivatives: bool,
) -> Result<EfieFaceArrays> {
    let num_faces = polygons.len();
    if let Some(p) = (0..num_faces).find(|&p| singular.get(p, p).is_none()) {
        return Err(OpenModesError::InvalidParameters(format!(
            "no singular terms for the self pair of face {p}"
        )));
    }

    let gamma = s / C;
    let points = face_quadrature(nodes, polygons, rule);

    let rows = parallel_map_indexed(num_faces, |p| {
        let obs_nodes = triangle_vertices(nodes, &polygons[p]);
        let mut row = EfieRow {
            a: Vec::with_capacity(num_faces),
            phi: Vec::with_capacity(num_faces),
            da: Vec::new(),
            dphi: Vec::new(),
        };

        for q in 0..num_faces {
            let src_nodes = triangle_vertices(nodes, &polygons[q]);
            let extracted = singular.get(p, q);

            let (mut block, mut phi) = match extracted {
                Some(terms) => {
                    let num_terms = terms.phi.len();
                    let m = PairMoments::integrate(&points[p], &points[q], &obs_nodes, &src_nodes, |r| {
                        green_remainder(gamma, r, num_terms)
                    });
                    (m.block(&obs_nodes, &src_nodes), m.g)
                }
                None => {
                    let m = PairMoments::integrate(&points[p], &points[q], &obs_nodes, &src_nodes, |r| {
                        green(gamma, r)
                    });
                    (m.block(&obs_nodes, &src_nodes), m.g)
                }
            };

            if let Some(terms) = extracted {
                let coeffs = singular_coefficients(gamma, terms.phi.len());
                for (k, &c) in coeffs.iter().enumerate() {
                    phi += c * terms.phi[k];
                    for i in 0..3 {
                        for j in 0..3 {
                            block[i][j] += c * terms.a[k][i][j];
                        }
                    }
                }
            }

            row.a.push(block);
            row.phi.push(phi);

            if derivatives {
                let m = PairMoments::integrate(&points[p], &points[q], &obs_nodes, &src_nodes, |r| {
                    green_ds(gamma, r)
                });
                row.da.push(m.block(&obs_nodes, &src_nodes));
                row.dphi.push(m.g);
            }
        }
        row
    });

    Ok(pack(rows, num_faces, derivatives))
}

/// EFIE face-pair arrays between two non-touching parts
pub fn z_efie_faces_mutual(
    nodes_o: &Array2<f64>,
    polygons_o: &[[usize; 3]],
    nodes_s: &Array2<f64>,
    polygons_s: &[[usize; 3]],
    s: Complex64,
    rule: &TriangleRule,
    derivatives: bool,
) -> EfieFaceArrays {
    let gamma = s / C;
    let points_o = face_quadrature(nodes_o, polygons_o, rule);
    let points_s = face_quadrature(nodes_s, polygons_s, rule);

    let rows = parallel_map_indexed(polygons_o.len(), |p| {
        let obs_nodes = triangle_vertices(nodes_o, &polygons_o[p]);
        let mut row = EfieRow {
            a: Vec::with_capacity(polygons_s.len()),
            phi: Vec::with_capacity(polygons_s.len()),
            da: Vec::new(),
            dphi: Vec::new(),
        };
        for (q, poly_s) in polygons_s.iter().enumerate() {
            let src_nodes = triangle_vertices(nodes_s, poly_s);
            let m = PairMoments::integrate(&points_o[p], &points_s[q], &obs_nodes, &src_nodes, |r| {
                green(gamma, r)
            });
            row.a.push(m.block(&obs_nodes, &src_nodes));
            row.phi.push(m.g);
            if derivatives {
                let m = PairMoments::integrate(&points_o[p], &points_s[q], &obs_nodes, &src_nodes, |r| {
                    green_ds(gamma, r)
                });
                row.da.push(m.block(&obs_nodes, &src_nodes));
                row.dphi.push(m.g);
            }
        }
        row
    });

    pack(rows, polygons_s.len(), derivatives)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators::rectangular_plate;
    use crate::operator::{singular_impedance_rwg, IntegrationOptions};
    use crate::sparse::MultiSparse;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_mutual_far_field_limit() {
        // two small triangles far apart: φ ≈ A_p A_q G(d)
        let nodes_o = array![[0.0, 0.0, 0.0], [1e-3, 0.0, 0.0], [0.0, 1e-3, 0.0]];
        let nodes_s = array![[1.0, 0.0, 0.0], [1.001, 0.0, 0.0], [1.0, 1e-3, 0.0]];
        let rule = TriangleRule::new(4).unwrap();
        let s = Complex64::new(0.0, 2.0 * std::f64::consts::PI * 1e8);
        let res = z_efie_faces_mutual(&nodes_o, &[[0, 1, 2]], &nodes_s, &[[0, 1, 2]], s, &rule, true);

        let area = 0.5e-6;
        let expected = green(s / C, 1.0) * area * area;
        assert_relative_eq!(res.phi[[0, 0]].re, expected.re, max_relative = 1e-2);
        assert_relative_eq!(res.phi[[0, 0]].im, expected.im, max_relative = 1e-2);

        let dphi = res.dphi.unwrap()[[0, 0]];
        let expected = green_ds(s / C, 1.0) * area * area;
        assert_relative_eq!(dphi.re, expected.re, max_relative = 1e-2);
    }

    #[test]
    fn test_mutual_blocks_translation_invariant() {
        let nodes_o = array![[0.0, 0.0, 0.0], [1e-3, 0.0, 0.0], [0.0, 1e-3, 0.0]];
        let nodes_s = array![[1e-2, 0.0, 0.0], [1.1e-2, 0.0, 0.0], [1e-2, 1e-3, 1e-3]];
        let offset = array![1e4, -2e4, 5e3];
        let far_o = &nodes_o + &offset;
        let far_s = &nodes_s + &offset;

        let rule = TriangleRule::new(5).unwrap();
        let s = Complex64::new(0.0, 2.0 * std::f64::consts::PI * 1e9);
        let near = z_efie_faces_mutual(&nodes_o, &[[0, 1, 2]], &nodes_s, &[[0, 1, 2]], s, &rule, false);
        let far = z_efie_faces_mutual(&far_o, &[[0, 1, 2]], &far_s, &[[0, 1, 2]], s, &rule, false);

        let scale = near.a.iter().map(|z| z.norm()).fold(0.0, f64::max);
        assert!(scale > 0.0);
        for (a_near, a_far) in near.a.iter().zip(far.a.iter()) {
            assert!((a_near - a_far).norm() <= 1e-6 * scale);
        }
        assert_relative_eq!(near.phi[[0, 0]].re, far.phi[[0, 0]].re, max_relative = 1e-6);
    }

    #[test]
    fn test_self_requires_singular_terms() {
        let mesh = rectangular_plate(1e-2, 1e-2, 2, 2).unwrap();
        let rule = TriangleRule::new(4).unwrap();
        let s = Complex64::new(0.0, 1e9);
        let empty: Csr<EfieSingular> = MultiSparse::new().to_csr();
        let res = z_efie_faces_self(mesh.nodes(), mesh.polygons(), s, &rule, &empty, false);
        assert!(matches!(res, Err(OpenModesError::InvalidParameters(_))));
    }

    #[test]
    fn test_self_arrays_reciprocal() {
        let mesh = rectangular_plate(1e-2, 1e-2, 2, 2).unwrap();
        let opts = IntegrationOptions::default();
        let singular = singular_impedance_rwg(
            &mesh,
            opts.num_singular_terms,
            opts.rel_tol,
            opts.singular_rule_order,
        )
        .unwrap();
        let rule = TriangleRule::new(4).unwrap();
        let s = Complex64::new(1e7, 2.0 * std::f64::consts::PI * 1e9);
        let res = z_efie_faces_self(mesh.nodes(), mesh.polygons(), s, &rule, &singular.t_efie, false)
            .unwrap();
        let n = mesh.num_triangles();
        assert!(res.da.is_none());
        assert!(res.phi.iter().all(|z| z.re.is_finite() && z.im.is_finite()));
        assert!(res.a.iter().all(|z| z.re.is_finite() && z.im.is_finite()));

        for p in 0..n {
            for q in 0..n {
                // touching pairs carry extracted terms with their own tolerance
                if singular.t_efie.get(p, q).is_some() {
                    continue;
                }
                let diff = (res.phi[[p, q]] - res.phi[[q, p]]).norm();
                assert!(diff <= 1e-10 * res.phi[[p, q]].norm());
                let scale = (0..3)
                    .flat_map(|i| (0..3).map(move |j| (i, j)))
                    .map(|(i, j)| res.a[[p, q, i, j]].norm())
                    .fold(0.0, f64::max);
                for i in 0..3 {
                    for j in 0..3 {
                        let diff = (res.a[[p, q, i, j]] - res.a[[q, p, j, i]]).norm();
                        assert!(diff <= 1e-9 * scale);
                    }
                }
            }
        }
    }
}
