//! Incident fields

use crate::constants::{C, ETA_0};
use crate::error::{OpenModesError, Result};
use crate::geometry::{dot_product, normalize, Vec3};
use num_complex::Complex64;

/// Complex field vector at a point
pub type FieldVector = [Complex64; 3];

/// A field that can excite the structure
pub trait SourceField: Send + Sync {
    /// Incident electric field at `r` for complex frequency `s`
    fn electric_field(&self, r: &Vec3, s: Complex64) -> FieldVector;

    /// Incident magnetic field at `r` for complex frequency `s`
    fn magnetic_field(&self, r: &Vec3, s: Complex64) -> FieldVector;
}

/// A plane wave `E(r) = E₀ ê exp(-γ k̂·r)`
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneWaveSource {
    e_inc: FieldVector,
    k_hat: Vec3,
}

impl PlaneWaveSource {
    /// Plane wave with the given polarisation vector and direction
    ///
    /// `e_inc` is used as given (amplitude included); `k_hat` is
    /// normalised. The two must be orthogonal.
    pub fn new(e_inc: FieldVector, k_hat: Vec3) -> Result<Self> {
        let (k_hat, k_len) = normalize(&k_hat);
        if k_len == 0.0 {
            return Err(OpenModesError::InvalidParameters(
                "propagation direction must be non-zero".to_string(),
            ));
        }
        let e_norm = e_inc.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        if e_norm == 0.0 {
            return Err(OpenModesError::InvalidParameters(
                "incident field must be non-zero".to_string(),
            ));
        }
        let projection: Complex64 = (0..3).map(|k| e_inc[k] * k_hat[k]).sum();
        if projection.norm() > 1e-10 * e_norm {
            return Err(OpenModesError::InvalidParameters(
                "incident field must be orthogonal to the propagation direction".to_string(),
            ));
        }
        Ok(Self { e_inc, k_hat })
    }

    /// Plane wave scaled to carry power density `p_inc` (W/m²)
    ///
    /// `|E₀| = sqrt(2 η₀ p_inc)`.
    pub fn with_power(e_inc: FieldVector, k_hat: Vec3, p_inc: f64) -> Result<Self> {
        if p_inc <= 0.0 {
            return Err(OpenModesError::InvalidParameters(format!(
                "incident power must be positive, got {}",
                p_inc
            )));
        }
        let wave = Self::new(e_inc, k_hat)?;
        let e_norm = wave.e_inc.iter().map(|z| z.norm_sqr()).sum::<f64>().sqrt();
        let amplitude = (2.0 * ETA_0 * p_inc).sqrt() / e_norm;
        Ok(Self {
            e_inc: wave.e_inc.map(|z| z * amplitude),
            k_hat: wave.k_hat,
        })
    }

    /// Polarisation vector including amplitude
    pub fn e_inc(&self) -> &FieldVector {
        &self.e_inc
    }

    /// Unit propagation direction
    pub fn k_hat(&self) -> &Vec3 {
        &self.k_hat
    }

    fn phase(&self, r: &Vec3, s: Complex64) -> Complex64 {
        (-s / C * dot_product(&self.k_hat, r)).exp()
    }
}

impl SourceField for PlaneWaveSource {
    fn electric_field(&self, r: &Vec3, s: Complex64) -> FieldVector {
        let phase = self.phase(r, s);
        self.e_inc.map(|e| e * phase)
    }

    fn magnetic_field(&self, r: &Vec3, s: Complex64) -> FieldVector {
        let e = self.electric_field(r, s);
        let k = &self.k_hat;
        [
            (e[2] * k[1] - e[1] * k[2]) / ETA_0,
            (e[0] * k[2] - e[2] * k[0]) / ETA_0,
            (e[1] * k[0] - e[0] * k[1]) / ETA_0,
        ]
    }
}
