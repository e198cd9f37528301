//! Singular terms of touching face pairs
//!
//! For every observer face `p` and every face `q` sharing at least one node
//! with it, the extracted terms `R^(2k-1)` are integrated once per mesh and
//! stored in sparse arrays. They depend only on the mesh shape, not on
//! frequency or placement, so they are cached for the whole process.

use crate::core::efie::EfieSingular;
use crate::core::face_normal;
use crate::core::yla_oijala::{face_integrals_yla_oijala, VertexBlock};
use crate::error::{OpenModesError, Result};
use crate::helpers::ObjectId;
use crate::integration::TriangleRule;
use crate::mesh::TriangularSurfaceMesh;
use crate::parallel::parallel_map_indexed;
use crate::sparse::{Csr, MultiSparse};
use log::info;
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

/// Sparse singular terms of one mesh
#[derive(Debug, Clone)]
pub struct SingularTerms {
    /// EFIE `phi` and `A` terms, including the self pairs
    pub t_efie: Csr<EfieSingular>,
    /// Tangential MFIE terms, without the self pairs
    pub t_mfie: Csr<Vec<VertexBlock>>,
    /// n× MFIE terms, without the self pairs
    pub n_mfie: Csr<Vec<VertexBlock>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    mesh: ObjectId,
    rel_tol_bits: u64,
    num_terms: usize,
    rule_order: usize,
}

static CACHE: LazyLock<Mutex<HashMap<CacheKey, Arc<SingularTerms>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Singular terms of an RWG discretised mesh
///
/// Entries are only reused for an identical request: a cached result of
/// higher accuracy is never returned for a lower accuracy request, which
/// keeps results reproducible.
pub fn singular_impedance_rwg(
    mesh: &TriangularSurfaceMesh,
    num_terms: usize,
    rel_tol: f64,
    rule_order: usize,
) -> Result<Arc<SingularTerms>> {
    if num_terms == 0 {
        return Err(OpenModesError::InvalidParameters(
            "at least one singular term must be extracted".to_string(),
        ));
    }
    if !(rel_tol > 0.0 && rel_tol.is_finite()) {
        return Err(OpenModesError::InvalidParameters(format!(
            "relative tolerance must be positive, got {}",
            rel_tol
        )));
    }

    let key = CacheKey {
        mesh: mesh.id(),
        rel_tol_bits: rel_tol.to_bits(),
        num_terms,
        rule_order,
    };
    if let Some(terms) = CACHE.lock().ok().and_then(|cache| cache.get(&key).cloned()) {
        return Ok(terms);
    }

    info!(
        "Integrating singular terms for mesh {}, with {} terms, relative tolerance {:e}",
        mesh.id(),
        num_terms,
        rel_tol
    );

    let rule = TriangleRule::new(rule_order)?;
    let rows = parallel_map_indexed(mesh.num_triangles(), |p| {
        let observer = mesh.vertices(p);
        let normal = face_normal(&observer);
        mesh.touching_triangles(p)
            .into_iter()
            .map(|q| {
                let source = mesh.vertices(q);
                (q, face_integrals_yla_oijala(&source, &rule, &observer, &normal, num_terms))
            })
            .collect::<Vec<_>>()
    });

    let mut t_efie = MultiSparse::new();
    let mut t_mfie = MultiSparse::new();
    let mut n_mfie = MultiSparse::new();
    for (p, row) in rows.into_iter().enumerate() {
        for (q, res) in row {
            if q != p {
                t_mfie.insert(p, q, res.t);
                n_mfie.insert(p, q, res.n);
            }
            t_efie.insert(
                p,
                q,
                EfieSingular {
                    phi: res.phi,
                    a: res.a,
                },
            );
        }
    }

    let terms = Arc::new(SingularTerms {
        t_efie: t_efie.to_csr(),
        t_mfie: t_mfie.to_csr(),
        n_mfie: n_mfie.to_csr(),
    });
    if let Ok(mut cache) = CACHE.lock() {
        cache.insert(key, Arc::clone(&terms));
    }
    Ok(terms)
}
