//! Divergence-conforming RWG basis functions
//!
//! Rao, Wilton and Glisson, IEEE Trans. AP 30 (1982). One function per
//! interior edge. On its positive triangle the function is
//! `l/(2A+) (r - v+)`, on the negative one `-l/(2A-) (r - v-)`, where `v±`
//! is the vertex opposite the edge.

use crate::error::Result;
use crate::geometry::{
    barycentric_point, cross_product, dot_product, normalize, sub, triangle_area,
    triangle_vertices, Vec3,
};
use crate::helpers::ObjectId;
use crate::integration::TriangleRule;
use crate::mesh::TriangularSurfaceMesh;
use log::{debug, warn};
use ndarray::{Array1, Array2};
use num_complex::Complex64;

/// Contribution of one basis function to one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceTerm {
    /// Index of the basis function
    pub basis: usize,
    /// Local index (0..3) of the free vertex within the triangle
    pub vertex: usize,
    /// Coefficient of `(r - v)`
    pub coefficient: f64,
    /// Surface divergence, constant over the triangle
    pub divergence: f64,
}

/// One RWG function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RwgFunction {
    /// Index into the mesh's edge list
    pub edge: usize,
    /// Edge length
    pub length: f64,
    /// Positive triangle and free vertex
    pub plus: (usize, usize),
    /// Negative triangle and free vertex
    pub minus: (usize, usize),
}

/// RWG basis on a triangular mesh
#[derive(Debug, Clone)]
pub struct DivRwgBasis {
    mesh_id: ObjectId,
    functions: Vec<RwgFunction>,
    faces: Vec<Vec<FaceTerm>>,
}

/// Local index of the vertex of `poly` not on the edge `(a, b)`
fn free_vertex(poly: &[usize; 3], edge: &[usize; 2]) -> Option<usize> {
    poly.iter().position(|n| *n != edge[0] && *n != edge[1])
}

impl DivRwgBasis {
    /// Build the basis for a mesh
    ///
    /// Boundary edges carry no function. Edges shared by more than two
    /// triangles are skipped with a warning.
    pub fn new(mesh: &TriangularSurfaceMesh) -> Self {
        let areas = mesh.areas();
        let polygons = mesh.polygons();
        let mut functions = Vec::new();
        let mut faces: Vec<Vec<FaceTerm>> = vec![Vec::new(); mesh.num_triangles()];
        let mut non_manifold = 0;

        for (edge_idx, edge) in mesh.edges().iter().enumerate() {
            match edge.triangles.len() {
                2 => {}
                1 => continue,
                _ => {
                    non_manifold += 1;
                    continue;
                }
            }
            let (tp, tm) = (edge.triangles[0], edge.triangles[1]);
            let (Some(vp), Some(vm)) = (
                free_vertex(&polygons[tp], &edge.nodes),
                free_vertex(&polygons[tm], &edge.nodes),
            ) else {
                continue;
            };

            let a = mesh.nodes().row(edge.nodes[0]);
            let b = mesh.nodes().row(edge.nodes[1]);
            let length = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2))
                .sqrt();

            let basis = functions.len();
            faces[tp].push(FaceTerm {
                basis,
                vertex: vp,
                coefficient: length / (2.0 * areas[tp]),
                divergence: length / areas[tp],
            });
            faces[tm].push(FaceTerm {
                basis,
                vertex: vm,
                coefficient: -length / (2.0 * areas[tm]),
                divergence: -length / areas[tm],
            });
            functions.push(RwgFunction {
                edge: edge_idx,
                length,
                plus: (tp, vp),
                minus: (tm, vm),
            });
        }

        if non_manifold > 0 {
            warn!(
                "Skipped {} non-manifold edges while building RWG basis",
                non_manifold
            );
        }
        debug!(
            "RWG basis with {} functions on {} triangles",
            functions.len(),
            mesh.num_triangles()
        );

        Self {
            mesh_id: mesh.id(),
            functions,
            faces,
        }
    }

    /// Id of the mesh this basis was built on
    pub fn mesh_id(&self) -> ObjectId {
        self.mesh_id
    }

    /// Number of basis functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// True if the mesh has no interior edges
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// The basis functions
    pub fn functions(&self) -> &[RwgFunction] {
        &self.functions
    }

    /// Basis contributions on each triangle
    pub fn faces(&self) -> &[Vec<FaceTerm>] {
        &self.faces
    }

    /// Gram matrix `∫ f_m · f_n dS`
    pub fn gram_matrix(&self, mesh: &TriangularSurfaceMesh) -> Result<Array2<f64>> {
        self.face_quadratic_form(mesh, |_, u, v| dot_product(u, v))
    }

    /// Rotated Gram matrix `∫ (n̂ × f_m) · f_n dS`
    pub fn gram_matrix_ncross(&self, mesh: &TriangularSurfaceMesh) -> Result<Array2<f64>> {
        self.face_quadratic_form(mesh, |n, u, v| dot_product(&cross_product(n, u), v))
    }

    /// Assemble `∫ q(n̂, r - v_i, r - v_j)` over shared triangles
    ///
    /// The integrand is quadratic in `r`, so a degree 2 rule is exact.
    fn face_quadratic_form<F>(&self, mesh: &TriangularSurfaceMesh, q: F) -> Result<Array2<f64>>
    where
        F: Fn(&Vec3, &Vec3, &Vec3) -> f64,
    {
        let n = self.len();
        let mut gram = Array2::zeros((n, n));
        let areas = mesh.areas();
        let normals = mesh.normals();
        let rule = TriangleRule::new(2)?;

        for (t, terms) in self.faces.iter().enumerate() {
            let verts = triangle_vertices(mesh.nodes(), &mesh.polygons()[t]);
            let mut local = [[0.0; 3]; 3];
            for (bary, w) in rule.iter() {
                let r = barycentric_point(&verts, bary);
                let rel: Vec<Vec3> = verts.iter().map(|v| sub(&r, v)).collect();
                for i in 0..3 {
                    for j in 0..3 {
                        local[i][j] += w * q(&normals[t], &rel[i], &rel[j]);
                    }
                }
            }
            for tm in terms {
                for tn in terms {
                    gram[[tm.basis, tn.basis]] +=
                        areas[t] * tm.coefficient * tn.coefficient * local[tm.vertex][tn.vertex];
                }
            }
        }

        Ok(gram)
    }

    /// Project a vector field onto the basis: `V_m = ∫ f_m · F(r) dS`
    ///
    /// `nodes` are the (possibly transformed) node positions of the part.
    pub fn weight_field<F>(
        &self,
        nodes: &Array2<f64>,
        mesh: &TriangularSurfaceMesh,
        rule: &TriangleRule,
        field: F,
    ) -> Array1<Complex64>
    where
        F: Fn(&Vec3, usize) -> [Complex64; 3],
    {
        let mut out = Array1::zeros(self.len());
        for (t, terms) in self.faces.iter().enumerate() {
            if terms.is_empty() {
                continue;
            }
            let verts = triangle_vertices(nodes, &mesh.polygons()[t]);
            let area = triangle_area(&verts);
            let mut local = [Complex64::new(0.0, 0.0); 3];
            for (bary, w) in rule.iter() {
                let r = barycentric_point(&verts, bary);
                let f = field(&r, t);
                for (i, v) in verts.iter().enumerate() {
                    let rel = sub(&r, v);
                    local[i] += (f[0] * rel[0] + f[1] * rel[1] + f[2] * rel[2]) * (w * area);
                }
            }
            for term in terms {
                out[term.basis] += local[term.vertex] * term.coefficient;
            }
        }
        out
    }

    /// Unit normals of the triangles of a node set
    pub fn face_normals(nodes: &Array2<f64>, mesh: &TriangularSurfaceMesh) -> Vec<Vec3> {
        mesh.polygons()
            .iter()
            .map(|poly| {
                let v = triangle_vertices(nodes, poly);
                normalize(&cross_product(&sub(&v[1], &v[0]), &sub(&v[2], &v[0]))).0
            })
            .collect()
    }
}
