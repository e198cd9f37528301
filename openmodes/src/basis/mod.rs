//! Basis functions on surface meshes
//!
//! Bases only depend on mesh topology and edge lengths, so they are shared
//! between all parts built from the same mesh through [`basis_for`].

pub mod rwg;

pub use rwg::{DivRwgBasis, FaceTerm, RwgFunction};

use crate::helpers::ObjectId;
use crate::mesh::TriangularSurfaceMesh;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

static BASIS_CACHE: LazyLock<Mutex<HashMap<ObjectId, Arc<DivRwgBasis>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// The RWG basis of a mesh, built on first use
pub fn basis_for(mesh: &TriangularSurfaceMesh) -> Arc<DivRwgBasis> {
    if let Ok(cache) = BASIS_CACHE.lock() {
        if let Some(basis) = cache.get(&mesh.id()) {
            return Arc::clone(basis);
        }
    }

    let basis = Arc::new(DivRwgBasis::new(mesh));
    if let Ok(mut cache) = BASIS_CACHE.lock() {
        cache.insert(mesh.id(), Arc::clone(&basis));
    }
    basis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators::rectangular_plate;

    #[test]
    fn test_basis_cached_per_mesh() {
        let mesh = rectangular_plate(1.0, 1.0, 2, 2).unwrap();
        let a = basis_for(&mesh);
        let b = basis_for(&mesh);
        assert!(Arc::ptr_eq(&a, &b));

        let other = rectangular_plate(1.0, 1.0, 2, 2).unwrap();
        assert!(!Arc::ptr_eq(&a, &basis_for(&other)));
    }
}
