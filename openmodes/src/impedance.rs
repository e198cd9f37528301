//! Impedance matrices
//!
//! An [`ImpedanceMatrix`] is the interaction of one observer part with one
//! source part. EFIE matrices keep their inductive and capacitive parts
//! separate so that they can be re-evaluated at nearby frequencies and
//! linearised for pole estimation. [`ImpedanceParts`] holds the blocks of
//! every part pair of a simulation.

use crate::error::{OpenModesError, Result};
use crate::parts::{PartId, SinglePart};
use linalg::{eigenvalues, eigenvector, lu_solve};
use ndarray::{s, Array1, Array2};
use num_complex::Complex64;
use std::collections::HashMap;

/// Impedance matrix between two parts
#[derive(Debug, Clone)]
pub enum ImpedanceMatrix {
    /// `Z = sL + S/s`
    Efie {
        /// Complex frequency of evaluation
        s: Complex64,
        /// Vector potential (inductive) part
        l: Array2<Complex64>,
        /// Scalar potential (capacitive) part
        s_mat: Array2<Complex64>,
        /// `∂L/∂s`
        dl: Option<Array2<Complex64>>,
        /// `∂S/∂s`
        ds: Option<Array2<Complex64>>,
    },
    /// Any other operator
    Generic {
        z: Array2<Complex64>,
        dz: Option<Array2<Complex64>>,
    },
}

impl ImpedanceMatrix {
    /// The matrix `Z`
    pub fn value(&self) -> Array2<Complex64> {
        match self {
            Self::Efie { s, l, s_mat, .. } => l * *s + s_mat / *s,
            Self::Generic { z, .. } => z.clone(),
        }
    }

    /// `dZ/ds`, if it was calculated
    ///
    /// For the EFIE, `dZ/ds = L + s ∂L/∂s - S/s² + (∂S/∂s)/s`.
    pub fn frequency_derivative(&self) -> Option<Array2<Complex64>> {
        match self {
            Self::Efie {
                s,
                l,
                s_mat,
                dl: Some(dl),
                ds: Some(ds),
            } => Some(l + &(dl * *s) - &(s_mat / (*s * *s)) + &(ds / *s)),
            Self::Efie { .. } => None,
            Self::Generic { dz, .. } => dz.clone(),
        }
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::Efie { l, .. } => l.dim(),
            Self::Generic { z, .. } => z.dim(),
        }
    }

    /// The block seen from the other side, for reciprocal operators
    pub fn transpose(&self) -> Self {
        let t = |m: &Array2<Complex64>| m.t().to_owned();
        match self {
            Self::Efie {
                s,
                l,
                s_mat,
                dl,
                ds,
            } => Self::Efie {
                s: *s,
                l: t(l),
                s_mat: t(s_mat),
                dl: dl.as_ref().map(t),
                ds: ds.as_ref().map(t),
            },
            Self::Generic { z, dz } => Self::Generic {
                z: t(z),
                dz: dz.as_ref().map(t),
            },
        }
    }

    /// Solve `Z x = v`
    pub fn solve(&self, v: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        Ok(lu_solve(&self.value(), v)?)
    }
}

/// Impedance blocks of all part pairs
#[derive(Debug, Clone)]
pub struct ImpedanceParts {
    s: Complex64,
    parts_o: Vec<(PartId, usize)>,
    parts_s: Vec<(PartId, usize)>,
    blocks: HashMap<(PartId, PartId), ImpedanceMatrix>,
}

fn part_sizes(parts: &[SinglePart]) -> Vec<(PartId, usize)> {
    parts.iter().map(|p| (p.id(), p.basis().len())).collect()
}

impl ImpedanceParts {
    pub(crate) fn new(
        s: Complex64,
        parts_o: &[SinglePart],
        parts_s: &[SinglePart],
        blocks: HashMap<(PartId, PartId), ImpedanceMatrix>,
    ) -> Self {
        Self {
            s,
            parts_o: part_sizes(parts_o),
            parts_s: part_sizes(parts_s),
            blocks,
        }
    }

    /// Complex frequency of evaluation
    pub fn s(&self) -> Complex64 {
        self.s
    }

    /// The block for one observer and one source part
    pub fn block(&self, part_o: PartId, part_s: PartId) -> Result<&ImpedanceMatrix> {
        self.blocks
            .get(&(part_o, part_s))
            .ok_or_else(|| OpenModesError::UnknownPart(format!("{} / {}", part_o, part_s)))
    }

    /// Full matrix with blocks in part order
    pub fn combined(&self) -> Array2<Complex64> {
        self.combine(|m| Some(m.value()))
            .unwrap_or_else(|| Array2::zeros((0, 0)))
    }

    /// Full `dZ/ds`, if every block carries it
    pub fn combined_derivative(&self) -> Option<Array2<Complex64>> {
        self.combine(ImpedanceMatrix::frequency_derivative)
    }

    fn combine<F>(&self, f: F) -> Option<Array2<Complex64>>
    where
        F: Fn(&ImpedanceMatrix) -> Option<Array2<Complex64>>,
    {
        let rows: usize = self.parts_o.iter().map(|(_, n)| n).sum();
        let cols: usize = self.parts_s.iter().map(|(_, n)| n).sum();
        let mut out = Array2::zeros((rows, cols));

        let mut row = 0;
        for (id_o, n_o) in &self.parts_o {
            let mut col = 0;
            for (id_s, n_s) in &self.parts_s {
                let block = f(self.blocks.get(&(*id_o, *id_s))?)?;
                out.slice_mut(s![row..row + n_o, col..col + n_s])
                    .assign(&block);
                col += n_s;
            }
            row += n_o;
        }
        Some(out)
    }

    /// Solve `Z x = v` for the combined system
    pub fn solve(&self, v: &Array1<Complex64>) -> Result<Array1<Complex64>> {
        let z = self.combined();
        if z.nrows() != v.len() {
            return Err(OpenModesError::InvalidParameters(format!(
                "source vector has {} entries, impedance has {} rows",
                v.len(),
                z.nrows()
            )));
        }
        Ok(lu_solve(&z, v)?)
    }

    /// The `num` eigenvalues of `Z` with the smallest magnitude and their
    /// eigenvectors as columns
    pub fn eigenmodes(&self, num: usize) -> Result<(Array1<Complex64>, Array2<Complex64>)> {
        let z = self.combined();
        let values = eigenvalues(&z)?;
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| values[a].norm().total_cmp(&values[b].norm()));
        order.truncate(num);

        let mut vectors = Array2::zeros((z.nrows(), order.len()));
        for (col, &idx) in order.iter().enumerate() {
            vectors.column_mut(col).assign(&eigenvector(&z, values[idx])?);
        }
        let selected = order.iter().map(|&i| values[i]).collect();
        Ok((selected, vectors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn efie() -> ImpedanceMatrix {
        ImpedanceMatrix::Efie {
            s: c(0.0, 2.0),
            l: array![[c(1.0, 0.0), c(0.5, 0.0)], [c(0.2, 0.0), c(2.0, 0.0)]],
            s_mat: array![[c(4.0, 0.0), c(0.0, 0.0)], [c(1.0, 0.0), c(8.0, 0.0)]],
            dl: Some(Array2::zeros((2, 2))),
            ds: Some(Array2::zeros((2, 2))),
        }
    }

    #[test]
    fn test_efie_value_and_derivative() {
        let z = efie();
        let value = z.value();
        // sL + S/s with s = 2j
        assert_relative_eq!(value[[0, 0]].im, 2.0 - 2.0, epsilon = 1e-12);
        assert_relative_eq!(value[[1, 1]].im, 4.0 - 4.0, epsilon = 1e-12);
        assert_relative_eq!(value[[0, 1]].im, 1.0, epsilon = 1e-12);

        // L - S/s² with constant L, S
        let dz = z.frequency_derivative().unwrap();
        assert_relative_eq!(dz[[0, 0]].re, 1.0 + 1.0, epsilon = 1e-12);
        assert_relative_eq!(dz[[1, 0]].re, 0.2 + 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_transpose_and_solve() {
        let z = efie();
        let zt = z.transpose();
        assert_eq!(zt.value(), z.value().t().to_owned());

        let v = array![c(1.0, 0.0), c(0.0, 1.0)];
        let x = z.solve(&v).unwrap();
        let back = z.value().dot(&x);
        assert_relative_eq!((back[0] - v[0]).norm(), 0.0, epsilon = 1e-12);
        assert_relative_eq!((back[1] - v[1]).norm(), 0.0, epsilon = 1e-12);

        let generic = ImpedanceMatrix::Generic {
            z: z.value(),
            dz: None,
        };
        assert!(generic.frequency_derivative().is_none());
        assert_eq!(generic.shape(), (2, 2));
    }
}
