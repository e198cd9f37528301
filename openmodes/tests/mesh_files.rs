//! Reading meshes from disk and placing them in a simulation

use openmodes::mesh::io::{read_msh_parts, write_json};
use openmodes::mesh::{icosphere, read_mesh};
use openmodes::operator::{EfieOperator, IntegrationOptions};
use openmodes::{OpenModesError, Simulation};
use std::fs;
use std::path::PathBuf;

/// Tetrahedron surface (physical tag 1) and a detached triangle (tag 2)
const TETRA_MSH: &str = "$MeshFormat
2.2 0 8
$EndMeshFormat
$Nodes
7
1 0 0 0
2 1 0 0
3 0 1 0
4 0 0 1
5 5 0 0
6 6 0 0
7 5 1 0
$EndNodes
$Elements
6
1 2 2 1 1 1 3 2
2 2 2 1 1 1 2 4
3 2 2 1 1 2 3 4
4 2 2 1 1 1 4 3
5 1 2 9 9 5 6
6 2 2 2 2 5 6 7
$EndElements
";

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("openmodes_{}_{}", std::process::id(), name))
}

#[test]
fn test_read_msh_by_physical_tag() {
    let path = temp_path("tetra.msh");
    fs::write(&path, TETRA_MSH).unwrap();

    let whole = read_mesh(&path).unwrap();
    assert_eq!(whole.num_triangles(), 5);
    assert_eq!(whole.num_nodes(), 7);
    assert_eq!(whole.connected_components().len(), 2);

    let parts = read_msh_parts(&path).unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0].num_triangles(), 4);
    assert!(parts[0].closed_surface());
    assert_eq!(parts[1].num_triangles(), 1);
    assert!(!parts[1].closed_surface());

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_json_mesh_through_simulation() {
    let path = temp_path("sphere.json");
    let sphere = icosphere(1e-2, 1).unwrap();
    write_json(&sphere, &path).unwrap();

    let mut sim = Simulation::with_operator(Box::new(EfieOperator::new(IntegrationOptions::default())));
    let mesh = sim.load_mesh(&path).unwrap();
    assert_eq!(mesh.num_triangles(), sphere.num_triangles());
    assert_ne!(mesh.id(), sphere.id());

    let id = sim.place_part(mesh);
    assert_eq!(sim.part(id).unwrap().basis().len(), 120);

    fs::remove_file(&path).unwrap();
}

#[test]
fn test_unsupported_mesh_files() {
    let path = temp_path("mesh.stl");
    assert!(matches!(read_mesh(&path), Err(OpenModesError::Mesh(_))));

    let path = temp_path("new_format.msh");
    fs::write(&path, "$MeshFormat\n4.1 0 8\n$EndMeshFormat\n").unwrap();
    assert!(matches!(read_mesh(&path), Err(OpenModesError::Mesh(_))));
    fs::remove_file(&path).unwrap();

    let missing = temp_path("missing.msh");
    assert!(matches!(read_mesh(&missing), Err(OpenModesError::Io(_))));
}
