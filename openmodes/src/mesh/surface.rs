//! Triangular surface meshes

use crate::error::{OpenModesError, Result};
use crate::geometry::{
    cross_product, distance, normalize, row3, sub, triangle_area, triangle_vertices, Vec3,
};
use crate::helpers::{equivalence, ObjectId};
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Relative area below which a triangle is considered degenerate
const DEGENERATE_AREA_RATIO: f64 = 1e-12;

/// An edge of the mesh with the triangles attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Node indices, ascending
    pub nodes: [usize; 2],
    /// Triangles containing this edge, ascending
    pub triangles: Vec<usize>,
}

/// A surface made of flat triangles
///
/// Meshes are immutable after construction. Each one carries an
/// [`ObjectId`] which keys the caches of basis functions and singular
/// integrals, so two meshes with identical geometry built separately do not
/// share cached results.
#[derive(Debug, Clone)]
pub struct TriangularSurfaceMesh {
    id: ObjectId,
    nodes: Array2<f64>,
    polygons: Vec<[usize; 3]>,
    edges: OnceLock<Vec<Edge>>,
    sharing_nodes: OnceLock<Vec<Vec<usize>>>,
}

impl TriangularSurfaceMesh {
    /// Build a mesh from an `N × 3` node array and triangle connectivity
    ///
    /// Rejects out-of-range node indices, repeated nodes within a triangle
    /// and triangles of (numerically) zero area.
    pub fn new(nodes: Array2<f64>, polygons: Vec<[usize; 3]>) -> Result<Self> {
        if nodes.ncols() != 3 {
            return Err(OpenModesError::Mesh(format!(
                "nodes must have 3 columns, got {}",
                nodes.ncols()
            )));
        }
        if polygons.is_empty() {
            return Err(OpenModesError::Mesh("mesh has no triangles".to_string()));
        }

        let num_nodes = nodes.nrows();
        for (t, poly) in polygons.iter().enumerate() {
            if let Some(&bad) = poly.iter().find(|&&n| n >= num_nodes) {
                return Err(OpenModesError::Mesh(format!(
                    "triangle {} references node {} but only {} nodes exist",
                    t, bad, num_nodes
                )));
            }
            if poly[0] == poly[1] || poly[1] == poly[2] || poly[0] == poly[2] {
                return Err(OpenModesError::Mesh(format!(
                    "triangle {} repeats a node: {:?}",
                    t, poly
                )));
            }
            let verts = triangle_vertices(&nodes, poly);
            let longest = (0..3)
                .map(|k| distance(&verts[k], &verts[(k + 1) % 3]))
                .fold(0.0, f64::max);
            if triangle_area(&verts) <= DEGENERATE_AREA_RATIO * longest * longest {
                return Err(OpenModesError::Mesh(format!(
                    "triangle {} is degenerate (zero area)",
                    t
                )));
            }
        }

        Ok(Self {
            id: ObjectId::new(),
            nodes,
            polygons,
            edges: OnceLock::new(),
            sharing_nodes: OnceLock::new(),
        })
    }

    /// Unique id of this mesh
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Node coordinates, one row per node
    pub fn nodes(&self) -> &Array2<f64> {
        &self.nodes
    }

    /// Triangle connectivity
    pub fn polygons(&self) -> &[[usize; 3]] {
        &self.polygons
    }

    /// Number of nodes
    pub fn num_nodes(&self) -> usize {
        self.nodes.nrows()
    }

    /// Number of triangles
    pub fn num_triangles(&self) -> usize {
        self.polygons.len()
    }

    /// Vertices of triangle `t`
    pub fn vertices(&self, t: usize) -> [Vec3; 3] {
        triangle_vertices(&self.nodes, &self.polygons[t])
    }

    /// Area of every triangle
    pub fn areas(&self) -> Vec<f64> {
        (0..self.num_triangles())
            .map(|t| triangle_area(&self.vertices(t)))
            .collect()
    }

    /// Unit normal of every triangle, right-handed with respect to node order
    pub fn normals(&self) -> Vec<Vec3> {
        (0..self.num_triangles())
            .map(|t| {
                let v = self.vertices(t);
                normalize(&cross_product(&sub(&v[1], &v[0]), &sub(&v[2], &v[0]))).0
            })
            .collect()
    }

    /// Centroid of every triangle
    pub fn centroids(&self) -> Vec<Vec3> {
        (0..self.num_triangles())
            .map(|t| {
                let v = self.vertices(t);
                [
                    (v[0][0] + v[1][0] + v[2][0]) / 3.0,
                    (v[0][1] + v[1][1] + v[2][1]) / 3.0,
                    (v[0][2] + v[1][2] + v[2][2]) / 3.0,
                ]
            })
            .collect()
    }

    /// All unique edges, sorted by node pair
    pub fn edges(&self) -> &[Edge] {
        self.edges.get_or_init(|| {
            let mut map: BTreeMap<[usize; 2], Vec<usize>> = BTreeMap::new();
            for (t, poly) in self.polygons.iter().enumerate() {
                for k in 0..3 {
                    let a = poly[k];
                    let b = poly[(k + 1) % 3];
                    map.entry([a.min(b), a.max(b)]).or_default().push(t);
                }
            }
            map.into_iter()
                .map(|(nodes, triangles)| Edge { nodes, triangles })
                .collect()
        })
    }

    /// For each node, the triangles which contain it (ascending)
    pub fn triangles_sharing_nodes(&self) -> &[Vec<usize>] {
        self.sharing_nodes.get_or_init(|| {
            let mut sharing = vec![Vec::new(); self.num_nodes()];
            for (t, poly) in self.polygons.iter().enumerate() {
                for &n in poly {
                    sharing[n].push(t);
                }
            }
            sharing
        })
    }

    /// Triangles sharing at least one node with triangle `t`, itself included
    pub fn touching_triangles(&self, t: usize) -> BTreeSet<usize> {
        let sharing = self.triangles_sharing_nodes();
        self.polygons[t]
            .iter()
            .flat_map(|&n| sharing[n].iter().copied())
            .collect()
    }

    /// True when every edge is shared by exactly two triangles
    pub fn closed_surface(&self) -> bool {
        self.edges().iter().all(|e| e.triangles.len() == 2)
    }

    /// Length of the shortest edge
    pub fn shortest_edge(&self) -> f64 {
        self.edges()
            .iter()
            .map(|e| distance(&row3(&self.nodes, e.nodes[0]), &row3(&self.nodes, e.nodes[1])))
            .fold(f64::INFINITY, f64::min)
    }

    /// Largest distance between any two nodes
    pub fn max_distance(&self) -> f64 {
        let n = self.num_nodes();
        let mut max_dist: f64 = 0.0;
        for i in 0..n {
            let ri = row3(&self.nodes, i);
            for j in (i + 1)..n {
                max_dist = max_dist.max(distance(&ri, &row3(&self.nodes, j)));
            }
        }
        max_dist
    }

    /// Groups of triangles connected through shared edges
    pub fn connected_components(&self) -> Vec<BTreeSet<usize>> {
        let mut relations: Vec<(usize, usize)> =
            (0..self.num_triangles()).map(|t| (t, t)).collect();
        for edge in self.edges() {
            for pair in edge.triangles.windows(2) {
                relations.push((pair[0], pair[1]));
            }
        }
        equivalence(&relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn square() -> TriangularSurfaceMesh {
        let nodes = array![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0]
        ];
        TriangularSurfaceMesh::new(nodes, vec![[0, 1, 2], [0, 2, 3]]).unwrap()
    }

    #[test]
    fn test_square_geometry() {
        let mesh = square();
        let areas = mesh.areas();
        assert_relative_eq!(areas[0], 0.5);
        assert_relative_eq!(areas[1], 0.5);
        for n in mesh.normals() {
            assert_relative_eq!(n[2], 1.0);
        }
        assert_eq!(mesh.edges().len(), 5);
        assert!(!mesh.closed_surface());
        assert_relative_eq!(mesh.shortest_edge(), 1.0);
        assert_relative_eq!(mesh.max_distance(), 2.0_f64.sqrt());
    }

    #[test]
    fn test_shared_edge_and_sharing_nodes() {
        let mesh = square();
        let shared: Vec<&Edge> = mesh
            .edges()
            .iter()
            .filter(|e| e.triangles.len() == 2)
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].nodes, [0, 2]);

        let sharing = mesh.triangles_sharing_nodes();
        assert_eq!(sharing[0], vec![0, 1]);
        assert_eq!(sharing[1], vec![0]);
        assert_eq!(mesh.touching_triangles(0).len(), 2);
    }

    #[test]
    fn test_invalid_meshes_rejected() {
        let nodes = array![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let collinear = TriangularSurfaceMesh::new(nodes.clone(), vec![[0, 1, 2]]);
        assert!(matches!(collinear, Err(OpenModesError::Mesh(_))));

        let out_of_range = TriangularSurfaceMesh::new(nodes.clone(), vec![[0, 1, 3]]);
        assert!(matches!(out_of_range, Err(OpenModesError::Mesh(_))));

        let repeated = TriangularSurfaceMesh::new(nodes, vec![[0, 1, 1]]);
        assert!(matches!(repeated, Err(OpenModesError::Mesh(_))));
    }

    #[test]
    fn test_connected_components() {
        let nodes = array![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [5.0, 0.0, 0.0],
            [6.0, 0.0, 0.0],
            [5.0, 1.0, 0.0]
        ];
        let mesh = TriangularSurfaceMesh::new(nodes, vec![[0, 1, 2], [3, 4, 5]]).unwrap();
        let components = mesh.connected_components();
        assert_eq!(components.len(), 2);
        assert_ne!(mesh.id(), square().id());
    }
}
