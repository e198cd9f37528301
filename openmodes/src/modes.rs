//! Modes found on a part

use crate::error::{OpenModesError, Result};
use crate::parts::PartId;
use ndarray::{concatenate, Array1, Array2, Axis};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Poles and their current distributions on one part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modes {
    /// Part the modes belong to
    pub part: PartId,
    /// Complex frequencies of the poles
    pub s: Array1<Complex64>,
    /// Currents, one column per mode
    pub vr: Array2<Complex64>,
}

impl Modes {
    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// A subset of modes in the given order
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(OpenModesError::InvalidParameters(format!(
                "mode {} out of range, {} modes available",
                bad,
                self.len()
            )));
        }
        Ok(Self {
            part: self.part,
            s: indices.iter().map(|&i| self.s[i]).collect(),
            vr: self.vr.select(Axis(1), indices),
        })
    }

    /// Append the conjugate pair of every mode
    ///
    /// Poles of a real system come in pairs `s`, `s*` with conjugate
    /// currents.
    pub fn add_conjugates(&self) -> Self {
        let s_conj = self.s.mapv(|z| z.conj());
        let vr_conj = self.vr.mapv(|z| z.conj());
        Self {
            part: self.part,
            s: concatenate![Axis(0), self.s, s_conj],
            vr: concatenate![Axis(1), self.vr, vr_conj],
        }
    }

    /// Frequencies in Hz, `s / 2π`
    pub fn frequencies_hz(&self) -> Array1<Complex64> {
        self.s.mapv(|s| s / (2.0 * std::f64::consts::PI))
    }
}
