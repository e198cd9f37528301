//! Combined field integral equation
//!
//! `Z = α Z_EFIE + (1 - α) η₀ Z_MFIE` with the tangentially tested MFIE,
//! which removes the interior resonances of both equations on closed
//! surfaces.

use super::efie::EfieOperator;
use super::mfie::MfieOperator;
use super::{IntegrationOptions, Operator};
use crate::constants::ETA_0;
use crate::core::MfieForm;
use crate::error::{OpenModesError, Result};
use crate::impedance::ImpedanceMatrix;
use crate::parts::SinglePart;
use crate::sources::SourceField;
use ndarray::Array1;
use num_complex::Complex64;

/// CFIE operator on RWG bases
#[derive(Debug, Clone)]
pub struct CfieOperator {
    efie: EfieOperator,
    mfie: MfieOperator,
    alpha: f64,
}

impl CfieOperator {
    /// `alpha` weights the EFIE and must lie in `[0, 1]`
    pub fn new(integration: IntegrationOptions, alpha: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(OpenModesError::InvalidParameters(format!(
                "CFIE weight must lie in [0, 1], got {}",
                alpha
            )));
        }
        Ok(Self {
            efie: EfieOperator::new(integration.clone()),
            mfie: MfieOperator::new(integration, MfieForm::Tangential),
            alpha,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Operator for CfieOperator {
    fn integration(&self) -> &IntegrationOptions {
        self.efie.integration()
    }

    fn reciprocal(&self) -> bool {
        false
    }

    fn gives_frequency_derivative(&self) -> bool {
        false
    }

    fn impedance_single_parts(
        &self,
        s: Complex64,
        part_o: &SinglePart,
        part_s: &SinglePart,
        _frequency_derivatives: bool,
    ) -> Result<ImpedanceMatrix> {
        let z_e = self.efie.impedance_single_parts(s, part_o, part_s, false)?.value();
        let z_m = self.mfie.impedance_single_parts(s, part_o, part_s, false)?.value();
        Ok(ImpedanceMatrix::Generic {
            z: z_e * self.alpha + z_m * ((1.0 - self.alpha) * ETA_0),
            dz: None,
        })
    }

    fn source_single_part(
        &self,
        source: &dyn SourceField,
        s: Complex64,
        part: &SinglePart,
        extinction_field: bool,
    ) -> Result<Array1<Complex64>> {
        let v_e = self.efie.source_single_part(source, s, part, extinction_field)?;
        if extinction_field {
            return Ok(v_e);
        }
        let v_m = self.mfie.source_single_part(source, s, part, false)?;
        Ok(v_e * self.alpha + v_m * ((1.0 - self.alpha) * ETA_0))
    }
}
