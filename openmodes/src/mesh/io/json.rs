//! JSON mesh format
//!
//! ```json
//! { "nodes": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "polygons": [[0, 1, 2]] }
//! ```

use crate::error::Result;
use crate::mesh::TriangularSurfaceMesh;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Serializable mesh geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshData {
    /// Node coordinates
    pub nodes: Vec<[f64; 3]>,
    /// Triangle connectivity (zero-based)
    pub polygons: Vec<[usize; 3]>,
}

impl From<&TriangularSurfaceMesh> for MeshData {
    fn from(mesh: &TriangularSurfaceMesh) -> Self {
        Self {
            nodes: mesh
                .nodes()
                .rows()
                .into_iter()
                .map(|r| [r[0], r[1], r[2]])
                .collect(),
            polygons: mesh.polygons().to_vec(),
        }
    }
}

impl MeshData {
    /// Validate and build a mesh
    pub fn into_mesh(self) -> Result<TriangularSurfaceMesh> {
        let mut nodes = Array2::zeros((self.nodes.len(), 3));
        for (i, p) in self.nodes.iter().enumerate() {
            for k in 0..3 {
                nodes[[i, k]] = p[k];
            }
        }
        TriangularSurfaceMesh::new(nodes, self.polygons)
    }
}

/// Read a mesh from a JSON file
pub fn read_json(path: impl AsRef<Path>) -> Result<TriangularSurfaceMesh> {
    let content = fs::read_to_string(path)?;
    let data: MeshData = serde_json::from_str(&content)?;
    data.into_mesh()
}

/// Write a mesh to a JSON file
pub fn write_json(mesh: &TriangularSurfaceMesh, path: impl AsRef<Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(&MeshData::from(mesh))?;
    fs::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators::rectangular_plate;

    #[test]
    fn test_json_preserves_geometry_but_not_identity() {
        let mesh = rectangular_plate(1.0, 1.0, 2, 2).unwrap();
        let json = serde_json::to_string(&MeshData::from(&mesh)).unwrap();
        let back: MeshData = serde_json::from_str(&json).unwrap();
        let rebuilt = back.into_mesh().unwrap();

        assert_eq!(rebuilt.polygons(), mesh.polygons());
        assert_eq!(rebuilt.nodes(), mesh.nodes());
        assert_ne!(rebuilt.id(), mesh.id());
    }

    #[test]
    fn test_invalid_json_mesh() {
        let data: MeshData =
            serde_json::from_str(r#"{"nodes": [[0,0,0],[1,0,0]], "polygons": [[0,1,2]]}"#)
                .unwrap();
        assert!(data.into_mesh().is_err());
    }
}
