//! Surface meshes
//!
//! - `surface`: the triangular surface mesh and its derived quantities
//! - `generators`: spheres, plates and rings
//! - `io`: Gmsh and JSON readers/writers

pub mod generators;
pub mod io;
pub mod surface;

pub use generators::{icosphere, rectangular_plate, ring, split_ring};
pub use io::read_mesh;
pub use surface::{Edge, TriangularSurfaceMesh};
