//! Mesh input/output
//!
//! - `gmsh`: Gmsh MSH 2.2 ASCII reader
//! - `json`: serde-based JSON format

pub mod gmsh;
pub mod json;

pub use gmsh::{read_msh, read_msh_parts};
pub use json::{read_json, write_json, MeshData};

use crate::error::{OpenModesError, Result};
use crate::mesh::TriangularSurfaceMesh;
use std::path::Path;

/// Read a mesh, choosing the format from the file extension
pub fn read_mesh(path: impl AsRef<Path>) -> Result<TriangularSurfaceMesh> {
    let path = path.as_ref();
    match path.extension().and_then(|e| e.to_str()) {
        Some("msh") => read_msh(path),
        Some("json") => read_json(path),
        other => Err(OpenModesError::Mesh(format!(
            "unsupported mesh file extension {:?} for {}",
            other,
            path.display()
        ))),
    }
}
