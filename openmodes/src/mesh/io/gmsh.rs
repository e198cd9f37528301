//! Reader for Gmsh MSH 2.2 ASCII files
//!
//! Only 3-node triangles (element type 2) are kept. Triangles are grouped
//! by their physical tag so that each physical surface becomes one mesh;
//! nodes not used by any triangle are dropped.

use crate::error::{OpenModesError, Result};
use crate::mesh::TriangularSurfaceMesh;
use log::{debug, info};
use ndarray::Array2;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Gmsh element type code of a 3-node triangle
const GMSH_TRIANGLE: usize = 2;

/// Read all triangles from a `.msh` file into a single mesh
pub fn read_msh(path: impl AsRef<Path>) -> Result<TriangularSurfaceMesh> {
    let content = fs::read_to_string(path.as_ref())?;
    let parsed = parse_msh(&content)?;
    let triangles: Vec<[usize; 3]> = parsed.triangles.into_values().flatten().collect();
    let mesh = build_mesh(&parsed.nodes, &triangles)?;
    info!(
        "Loaded {} triangles from {}",
        mesh.num_triangles(),
        path.as_ref().display()
    );
    Ok(mesh)
}

/// Read a `.msh` file, producing one mesh per physical tag
pub fn read_msh_parts(path: impl AsRef<Path>) -> Result<Vec<TriangularSurfaceMesh>> {
    let content = fs::read_to_string(path.as_ref())?;
    let parsed = parse_msh(&content)?;
    parsed
        .triangles
        .values()
        .map(|triangles| build_mesh(&parsed.nodes, triangles))
        .collect()
}

struct ParsedMsh {
    nodes: HashMap<usize, [f64; 3]>,
    /// Triangles in Gmsh node ids, keyed by physical tag
    triangles: BTreeMap<usize, Vec<[usize; 3]>>,
}

fn mesh_error(msg: impl Into<String>) -> OpenModesError {
    OpenModesError::Mesh(msg.into())
}

fn parse_field<T: std::str::FromStr>(token: Option<&str>, what: &str) -> Result<T> {
    token
        .ok_or_else(|| mesh_error(format!("missing {}", what)))?
        .parse()
        .map_err(|_| mesh_error(format!("invalid {}", what)))
}

fn parse_msh(content: &str) -> Result<ParsedMsh> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    let mut nodes = HashMap::new();
    let mut triangles: BTreeMap<usize, Vec<[usize; 3]>> = BTreeMap::new();
    let mut seen_format = false;

    while let Some(line) = lines.next() {
        match line {
            "$MeshFormat" => {
                let header = lines
                    .next()
                    .ok_or_else(|| mesh_error("truncated $MeshFormat section"))?;
                let mut fields = header.split_whitespace();
                let version: f64 = parse_field(fields.next(), "format version")?;
                let file_type: usize = parse_field(fields.next(), "file type")?;
                if version >= 3.0 || version < 2.0 {
                    return Err(mesh_error(format!(
                        "MSH format version {} not supported, save as version 2.2",
                        version
                    )));
                }
                if file_type != 0 {
                    return Err(mesh_error("binary MSH files are not supported"));
                }
                seen_format = true;
            }
            "$Nodes" => {
                let count: usize = parse_field(lines.next(), "node count")?;
                for _ in 0..count {
                    let row = lines.next().ok_or_else(|| mesh_error("truncated $Nodes"))?;
                    let mut f = row.split_whitespace();
                    let id: usize = parse_field(f.next(), "node id")?;
                    let x: f64 = parse_field(f.next(), "node x")?;
                    let y: f64 = parse_field(f.next(), "node y")?;
                    let z: f64 = parse_field(f.next(), "node z")?;
                    nodes.insert(id, [x, y, z]);
                }
            }
            "$Elements" => {
                let count: usize = parse_field(lines.next(), "element count")?;
                for _ in 0..count {
                    let row = lines
                        .next()
                        .ok_or_else(|| mesh_error("truncated $Elements"))?;
                    let f: Vec<&str> = row.split_whitespace().collect();
                    let elem_type: usize = parse_field(f.get(1).copied(), "element type")?;
                    if elem_type != GMSH_TRIANGLE {
                        continue;
                    }
                    let num_tags: usize = parse_field(f.get(2).copied(), "tag count")?;
                    let physical = if num_tags > 0 {
                        parse_field(f.get(3).copied(), "physical tag")?
                    } else {
                        0
                    };
                    let first = 3 + num_tags;
                    let tri = [
                        parse_field(f.get(first).copied(), "triangle node")?,
                        parse_field(f.get(first + 1).copied(), "triangle node")?,
                        parse_field(f.get(first + 2).copied(), "triangle node")?,
                    ];
                    triangles.entry(physical).or_default().push(tri);
                }
            }
            other if other.starts_with("$End") => {}
            other if other.starts_with('$') => {
                debug!("Skipping MSH section {}", other);
                let end = format!("$End{}", &other[1..]);
                for l in lines.by_ref() {
                    if l == end {
                        break;
                    }
                }
            }
            _ => {}
        }
    }

    if !seen_format {
        return Err(mesh_error("missing $MeshFormat header"));
    }
    if triangles.is_empty() {
        return Err(mesh_error("file contains no triangles"));
    }

    Ok(ParsedMsh { nodes, triangles })
}

/// Renumber the used Gmsh node ids to a contiguous range
fn build_mesh(
    nodes: &HashMap<usize, [f64; 3]>,
    triangles: &[[usize; 3]],
) -> Result<TriangularSurfaceMesh> {
    let mut renumber: BTreeMap<usize, usize> = BTreeMap::new();
    for tri in triangles {
        for &n in tri {
            if !nodes.contains_key(&n) {
                return Err(mesh_error(format!("element references unknown node {}", n)));
            }
            renumber.entry(n).or_insert(0);
        }
    }
    for (new_idx, value) in renumber.values_mut().enumerate() {
        *value = new_idx;
    }

    let mut node_array = Array2::zeros((renumber.len(), 3));
    for (gmsh_id, &idx) in &renumber {
        let p = nodes[gmsh_id];
        for k in 0..3 {
            node_array[[idx, k]] = p[k];
        }
    }

    let polygons = triangles
        .iter()
        .map(|t| [renumber[&t[0]], renumber[&t[1]], renumber[&t[2]]])
        .collect();

    TriangularSurfaceMesh::new(node_array, polygons)
}
