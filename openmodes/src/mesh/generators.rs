//! Mesh generators for canonical test geometries
//!
//! Spheres for validation against the Mie series, and the flat plates and
//! (split) rings that make up typical metamaterial resonators.

use super::surface::TriangularSurfaceMesh;
use crate::error::{OpenModesError, Result};
use ndarray::Array2;
use std::collections::HashMap;
use std::f64::consts::PI;

fn to_mesh(vertices: Vec<[f64; 3]>, faces: Vec<[usize; 3]>) -> Result<TriangularSurfaceMesh> {
    let mut nodes = Array2::zeros((vertices.len(), 3));
    for (i, v) in vertices.iter().enumerate() {
        for k in 0..3 {
            nodes[[i, k]] = v[k];
        }
    }
    TriangularSurfaceMesh::new(nodes, faces)
}

/// Generate an icosphere mesh (subdivided icosahedron)
///
/// More uniform element sizes than a UV-sphere. Normals point outwards.
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `subdivisions` - Number of subdivision iterations (0 = icosahedron with
///   20 faces, each level multiplies the face count by 4)
pub fn icosphere(radius: f64, subdivisions: usize) -> Result<TriangularSurfaceMesh> {
    if radius <= 0.0 {
        return Err(OpenModesError::InvalidParameters(format!(
            "sphere radius must be positive, got {}",
            radius
        )));
    }

    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;

    let mut vertices: Vec<[f64; 3]> = vec![
        [-1.0, phi, 0.0],
        [1.0, phi, 0.0],
        [-1.0, -phi, 0.0],
        [1.0, -phi, 0.0],
        [0.0, -1.0, phi],
        [0.0, 1.0, phi],
        [0.0, -1.0, -phi],
        [0.0, 1.0, -phi],
        [phi, 0.0, -1.0],
        [phi, 0.0, 1.0],
        [-phi, 0.0, -1.0],
        [-phi, 0.0, 1.0],
    ];

    for v in &mut vertices {
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        v[0] /= len;
        v[1] /= len;
        v[2] /= len;
    }

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut new_faces = Vec::with_capacity(faces.len() * 4);
        let mut edge_midpoints: HashMap<(usize, usize), usize> = HashMap::new();

        for face in &faces {
            let [v0, v1, v2] = *face;
            let m01 = midpoint_on_sphere(&mut vertices, &mut edge_midpoints, v0, v1);
            let m12 = midpoint_on_sphere(&mut vertices, &mut edge_midpoints, v1, v2);
            let m20 = midpoint_on_sphere(&mut vertices, &mut edge_midpoints, v2, v0);

            new_faces.push([v0, m01, m20]);
            new_faces.push([v1, m12, m01]);
            new_faces.push([v2, m20, m12]);
            new_faces.push([m01, m12, m20]);
        }

        faces = new_faces;
    }

    let vertices = vertices
        .iter()
        .map(|v| [v[0] * radius, v[1] * radius, v[2] * radius])
        .collect();

    to_mesh(vertices, faces)
}

/// Get or create the midpoint of an edge, projected onto the unit sphere
fn midpoint_on_sphere(
    vertices: &mut Vec<[f64; 3]>,
    cache: &mut HashMap<(usize, usize), usize>,
    v0: usize,
    v1: usize,
) -> usize {
    let key = if v0 < v1 { (v0, v1) } else { (v1, v0) };

    if let Some(&idx) = cache.get(&key) {
        return idx;
    }

    let mid = [
        (vertices[v0][0] + vertices[v1][0]) / 2.0,
        (vertices[v0][1] + vertices[v1][1]) / 2.0,
        (vertices[v0][2] + vertices[v1][2]) / 2.0,
    ];
    let len = (mid[0] * mid[0] + mid[1] * mid[1] + mid[2] * mid[2]).sqrt();

    let idx = vertices.len();
    vertices.push([mid[0] / len, mid[1] / len, mid[2] / len]);
    cache.insert(key, idx);

    idx
}

/// Generate a flat rectangular plate in the xy-plane, centred at the origin
///
/// Each of the `nx × ny` cells is split into two triangles; normals point
/// along +z.
pub fn rectangular_plate(
    length: f64,
    width: f64,
    nx: usize,
    ny: usize,
) -> Result<TriangularSurfaceMesh> {
    if length <= 0.0 || width <= 0.0 || nx == 0 || ny == 0 {
        return Err(OpenModesError::InvalidParameters(format!(
            "invalid plate: {} x {} with {} x {} divisions",
            length, width, nx, ny
        )));
    }

    let mut vertices = Vec::with_capacity((nx + 1) * (ny + 1));
    for j in 0..=ny {
        for i in 0..=nx {
            vertices.push([
                -0.5 * length + length * i as f64 / nx as f64,
                -0.5 * width + width * j as f64 / ny as f64,
                0.0,
            ]);
        }
    }

    let idx = |i: usize, j: usize| j * (nx + 1) + i;
    let mut faces = Vec::with_capacity(2 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            faces.push([idx(i, j), idx(i + 1, j), idx(i + 1, j + 1)]);
            faces.push([idx(i, j), idx(i + 1, j + 1), idx(i, j + 1)]);
        }
    }

    to_mesh(vertices, faces)
}

/// Generate a flat annulus in the xy-plane, centred at the origin
pub fn ring(
    inner_radius: f64,
    outer_radius: f64,
    n_radial: usize,
    n_angular: usize,
) -> Result<TriangularSurfaceMesh> {
    annular_sector(inner_radius, outer_radius, 0.0, n_radial, n_angular)
}

/// Generate a flat split ring in the xy-plane
///
/// The gap of `gap_degrees` is centred on the +x axis.
pub fn split_ring(
    inner_radius: f64,
    outer_radius: f64,
    gap_degrees: f64,
    n_radial: usize,
    n_angular: usize,
) -> Result<TriangularSurfaceMesh> {
    if gap_degrees <= 0.0 || gap_degrees >= 360.0 {
        return Err(OpenModesError::InvalidParameters(format!(
            "split ring gap must lie in (0, 360) degrees, got {}",
            gap_degrees
        )));
    }
    annular_sector(inner_radius, outer_radius, gap_degrees, n_radial, n_angular)
}

/// Annular sector spanning `360 - gap` degrees; a zero gap closes the ring
fn annular_sector(
    inner_radius: f64,
    outer_radius: f64,
    gap_degrees: f64,
    n_radial: usize,
    n_angular: usize,
) -> Result<TriangularSurfaceMesh> {
    if inner_radius <= 0.0 || outer_radius <= inner_radius || n_radial == 0 || n_angular < 3 {
        return Err(OpenModesError::InvalidParameters(format!(
            "invalid ring: radii {} to {}, {} radial and {} angular divisions",
            inner_radius, outer_radius, n_radial, n_angular
        )));
    }

    let closed = gap_degrees == 0.0;
    let gap = gap_degrees.to_radians();
    let start = 0.5 * gap;
    let span = 2.0 * PI - gap;
    let n_theta = if closed { n_angular } else { n_angular + 1 };

    let mut vertices = Vec::with_capacity(n_theta * (n_radial + 1));
    for a in 0..n_theta {
        let theta = start + span * a as f64 / n_angular as f64;
        let (sin, cos) = theta.sin_cos();
        for r in 0..=n_radial {
            let rho = inner_radius + (outer_radius - inner_radius) * r as f64 / n_radial as f64;
            vertices.push([rho * cos, rho * sin, 0.0]);
        }
    }

    let idx = |a: usize, r: usize| (a % n_theta) * (n_radial + 1) + r;
    let mut faces = Vec::with_capacity(2 * n_angular * n_radial);
    for a in 0..n_angular {
        for r in 0..n_radial {
            faces.push([idx(a, r), idx(a, r + 1), idx(a + 1, r + 1)]);
            faces.push([idx(a, r), idx(a + 1, r + 1), idx(a + 1, r)]);
        }
    }

    to_mesh(vertices, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_icosphere_counts_and_closure() {
        let mesh = icosphere(1.0, 1).unwrap();
        assert_eq!(mesh.num_nodes(), 42);
        assert_eq!(mesh.num_triangles(), 80);
        assert!(mesh.closed_surface());
        assert_eq!(mesh.connected_components().len(), 1);
    }

    #[test]
    fn test_icosphere_normals_outward() {
        let mesh = icosphere(2.0, 2).unwrap();
        for (n, c) in mesh.normals().iter().zip(mesh.centroids()) {
            let dot = n[0] * c[0] + n[1] * c[1] + n[2] * c[2];
            assert!(dot > 0.0);
        }
        let total: f64 = mesh.areas().iter().sum();
        // inscribed polyhedron is slightly smaller than the sphere
        assert!(total < 4.0 * PI * 4.0);
        assert!(total > 0.95 * 4.0 * PI * 4.0);
    }

    #[test]
    fn test_plate_area_and_normals() {
        let mesh = rectangular_plate(10e-3, 2e-3, 10, 2).unwrap();
        assert_eq!(mesh.num_triangles(), 40);
        let total: f64 = mesh.areas().iter().sum();
        assert_relative_eq!(total, 20e-6, max_relative = 1e-12);
        for n in mesh.normals() {
            assert_relative_eq!(n[2], 1.0);
        }
    }

    #[test]
    fn test_ring_topology() {
        let closed = ring(4e-3, 5e-3, 1, 24).unwrap();
        assert_eq!(closed.num_nodes(), 48);
        assert_eq!(closed.connected_components().len(), 1);
        for n in closed.normals() {
            assert_relative_eq!(n[2], 1.0, epsilon = 1e-12);
        }

        let split = split_ring(4e-3, 5e-3, 20.0, 1, 24).unwrap();
        assert_eq!(split.num_nodes(), 50);
        assert_eq!(split.num_triangles(), 48);
        assert!(split_ring(4e-3, 5e-3, 0.0, 1, 24).is_err());
    }
}
