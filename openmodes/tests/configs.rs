//! The shipped example configurations load and validate

use openmodes::config::MeshConfig;
use openmodes::mesh::io::write_json;
use openmodes::mesh::rectangular_plate;
use openmodes::operator::OperatorKind;
use openmodes::SimulationConfig;
use std::fs;
use std::path::PathBuf;

fn config_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("configs").join(name)
}

#[test]
fn test_shipped_configs_validate() {
    for name in ["srr.json", "sphere_cfie.json", "coupled_plates.json"] {
        let config = SimulationConfig::from_file(config_path(name)).unwrap();
        config.validate().unwrap_or_else(|e| panic!("{}: {}", name, e));
        for part in &config.geometry {
            part.mesh.build().unwrap();
        }
    }
}

#[test]
fn test_coupled_plates_config() {
    let config = SimulationConfig::from_file(config_path("coupled_plates.json")).unwrap();
    assert_eq!(config.geometry.len(), 2);
    assert_eq!(config.operator, OperatorKind::Efie);
    assert_eq!(config.sweep.frequencies().len(), 31);
    assert_eq!(config.threads, Some(4));

    let source = config.source.to_source().unwrap();
    // p_inc = 1 W/m² gives |E| = sqrt(2 η₀)
    let e_norm: f64 = source.e_inc().iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
    assert!((e_norm - (2.0 * openmodes::constants::ETA_0).sqrt()).abs() < 1e-9);
}

#[test]
fn test_round_trip_through_file() {
    let config = SimulationConfig::from_file(config_path("srr.json")).unwrap();
    let path = std::env::temp_dir().join(format!("openmodes_{}_srr.json", std::process::id()));
    config.to_file(&path).unwrap();
    let back = SimulationConfig::from_file(&path).unwrap();
    assert_eq!(back.poles, config.poles);
    assert_eq!(back.integration, config.integration);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_mesh_path_relative_to_config_file() {
    let dir = std::env::temp_dir().join(format!("openmodes_{}_relative", std::process::id()));
    fs::create_dir_all(dir.join("meshes")).unwrap();
    let plate = rectangular_plate(1e-2, 5e-3, 2, 1).unwrap();
    write_json(&plate, dir.join("meshes").join("plate.json")).unwrap();
    fs::write(
        dir.join("run.json"),
        r#"{"geometry": [{"mesh": {"type": "file", "path": "meshes/plate.json"}}]}"#,
    )
    .unwrap();

    // loaded from outside the config directory, the mesh is still found
    let config = SimulationConfig::from_file(dir.join("run.json")).unwrap();
    assert_eq!(
        config.geometry[0].mesh,
        MeshConfig::File {
            path: dir.join("meshes").join("plate.json")
        }
    );
    let mesh = config.geometry[0].mesh.build().unwrap();
    assert_eq!(mesh.num_triangles(), plate.num_triangles());

    fs::remove_dir_all(&dir).unwrap();
}
