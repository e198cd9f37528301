//! Mapping face-pair arrays onto RWG basis pairs

use crate::basis::DivRwgBasis;
use ndarray::{Array2, Array4};
use num_complex::Complex64;

/// `Σ c_m c_n X_pq[i][j]` over the faces of every basis pair
pub(crate) fn vector_terms(
    basis_o: &DivRwgBasis,
    basis_s: &DivRwgBasis,
    faces: &Array4<Complex64>,
) -> Array2<Complex64> {
    let mut out = Array2::zeros((basis_o.len(), basis_s.len()));
    for (p, terms_o) in basis_o.faces().iter().enumerate() {
        for (q, terms_s) in basis_s.faces().iter().enumerate() {
            for tm in terms_o {
                for tn in terms_s {
                    out[[tm.basis, tn.basis]] +=
                        faces[[p, q, tm.vertex, tn.vertex]] * (tm.coefficient * tn.coefficient);
                }
            }
        }
    }
    out
}

/// `Σ d_m d_n φ_pq` over the faces of every basis pair
pub(crate) fn scalar_terms(
    basis_o: &DivRwgBasis,
    basis_s: &DivRwgBasis,
    phi: &Array2<Complex64>,
) -> Array2<Complex64> {
    let mut out = Array2::zeros((basis_o.len(), basis_s.len()));
    for (p, terms_o) in basis_o.faces().iter().enumerate() {
        for (q, terms_s) in basis_s.faces().iter().enumerate() {
            for tm in terms_o {
                for tn in terms_s {
                    out[[tm.basis, tn.basis]] += phi[[p, q]] * (tm.divergence * tn.divergence);
                }
            }
        }
    }
    out
}
