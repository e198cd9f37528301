//! Integral operators
//!
//! An [`Operator`] turns placed parts into impedance matrices and incident
//! fields into source vectors. The pole search built on top of it is shared
//! by all operators.
//!
//! - **efie**: electric field integral equation (reciprocal, gives `dZ/ds`)
//! - **mfie**: magnetic field integral equation, n× or tangential testing
//! - **cfie**: combination of the two
//! - **singularities**: cached singular terms of touching face pairs

mod assembly;
pub mod cfie;
pub mod efie;
pub mod mfie;
pub mod singularities;

pub use cfie::CfieOperator;
pub use efie::EfieOperator;
pub use mfie::MfieOperator;
pub use singularities::{singular_impedance_rwg, SingularTerms};

use crate::core::MfieForm;
use crate::eig::{eig_linearised, eig_newton, NewtonOptions};
use crate::error::{OpenModesError, Result};
use crate::impedance::{ImpedanceMatrix, ImpedanceParts};
use crate::integration::TriangleRule;
use crate::modes::Modes;
use crate::parts::SinglePart;
use crate::sources::SourceField;
use log::info;
use ndarray::{Array1, Array2};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f64::consts::PI;

/// Quadrature settings shared by all operators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationOptions {
    /// Degree of the rule used for regular face pairs and source vectors
    #[serde(default = "default_rule_order")]
    pub rule_order: usize,
    /// Degree of the outer rule for touching face pairs
    #[serde(default = "default_singular_rule_order")]
    pub singular_rule_order: usize,
    /// Number of terms `R^(2k-1)` integrated analytically
    #[serde(default = "default_num_singular_terms")]
    pub num_singular_terms: usize,
    /// Requested relative accuracy of the singular integrals
    #[serde(default = "default_rel_tol")]
    pub rel_tol: f64,
}

fn default_rule_order() -> usize {
    5
}

fn default_singular_rule_order() -> usize {
    20
}

fn default_num_singular_terms() -> usize {
    2
}

fn default_rel_tol() -> f64 {
    1e-10
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            rule_order: default_rule_order(),
            singular_rule_order: default_singular_rule_order(),
            num_singular_terms: default_num_singular_terms(),
            rel_tol: default_rel_tol(),
        }
    }
}

impl IntegrationOptions {
    /// The regular rule
    pub fn rule(&self) -> Result<TriangleRule> {
        TriangleRule::new(self.rule_order)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rule_order == 0 || self.singular_rule_order == 0 {
            return Err(OpenModesError::InvalidParameters(
                "integration rule orders must be at least 1".to_string(),
            ));
        }
        if self.num_singular_terms == 0 {
            return Err(OpenModesError::InvalidParameters(
                "at least one singular term must be extracted".to_string(),
            ));
        }
        if !(self.rel_tol > 0.0 && self.rel_tol < 1.0) {
            return Err(OpenModesError::InvalidParameters(format!(
                "relative tolerance must lie in (0, 1), got {}",
                self.rel_tol
            )));
        }
        Ok(())
    }
}

/// Which operator to build
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorKind {
    #[default]
    Efie,
    Mfie {
        #[serde(default)]
        form: MfieForm,
    },
    Cfie {
        #[serde(default = "default_alpha")]
        alpha: f64,
    },
}

fn default_alpha() -> f64 {
    0.5
}

/// Build an operator from its description
pub fn build_operator(kind: &OperatorKind, integration: IntegrationOptions) -> Result<Box<dyn Operator>> {
    integration.validate()?;
    Ok(match kind {
        OperatorKind::Efie => Box::new(EfieOperator::new(integration)),
        OperatorKind::Mfie { form } => Box::new(MfieOperator::new(integration, *form)),
        OperatorKind::Cfie { alpha } => Box::new(CfieOperator::new(integration, *alpha)?),
    })
}

/// Controls for the pole search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoleOptions {
    /// Normalise currents with the Gram matrix
    #[serde(default = "default_use_gram")]
    pub use_gram: bool,
    /// Relative tolerance on the pole location
    #[serde(default = "default_pole_rel_tol")]
    pub rel_tol: f64,
    /// Newton iteration budget per pole
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
}

fn default_use_gram() -> bool {
    true
}

fn default_pole_rel_tol() -> f64 {
    1e-6
}

fn default_max_iter() -> usize {
    200
}

impl Default for PoleOptions {
    fn default() -> Self {
        Self {
            use_gram: default_use_gram(),
            rel_tol: default_pole_rel_tol(),
            max_iter: default_max_iter(),
        }
    }
}

/// An integral operator discretised with RWG functions
pub trait Operator: Send + Sync {
    /// Quadrature settings
    fn integration(&self) -> &IntegrationOptions;

    /// True when `Z_os = Z_soᵀ`
    fn reciprocal(&self) -> bool;

    /// True when [`Operator::impedance_single_parts`] can supply `dZ/ds`
    fn gives_frequency_derivative(&self) -> bool;

    /// Impedance of one observer part and one source part
    fn impedance_single_parts(
        &self,
        s: Complex64,
        part_o: &SinglePart,
        part_s: &SinglePart,
        frequency_derivatives: bool,
    ) -> Result<ImpedanceMatrix>;

    /// Source vector of one part
    ///
    /// With `extinction_field` the incident electric field is tested
    /// directly, so that `V_Eᴴ I` gives the extinguished power.
    fn source_single_part(
        &self,
        source: &dyn SourceField,
        s: Complex64,
        part: &SinglePart,
        extinction_field: bool,
    ) -> Result<Array1<Complex64>>;

    /// Impedance blocks of all part pairs
    fn impedance(
        &self,
        s: Complex64,
        parts_o: &[SinglePart],
        parts_s: &[SinglePart],
        frequency_derivatives: bool,
    ) -> Result<ImpedanceParts> {
        let mut blocks: HashMap<_, ImpedanceMatrix> = HashMap::new();
        for part_o in parts_o {
            for part_s in parts_s {
                let block = match blocks.get(&(part_s.id(), part_o.id())) {
                    Some(mirror) if self.reciprocal() => mirror.transpose(),
                    _ => self.impedance_single_parts(s, part_o, part_s, frequency_derivatives)?,
                };
                blocks.insert((part_o.id(), part_s.id()), block);
            }
        }
        Ok(ImpedanceParts::new(s, parts_o, parts_s, blocks))
    }

    /// Source vectors of several parts, concatenated in part order
    fn source_vector(
        &self,
        source: &dyn SourceField,
        s: Complex64,
        parts: &[SinglePart],
        extinction_field: bool,
    ) -> Result<Array1<Complex64>> {
        let mut out = Vec::new();
        for part in parts {
            let v = self.source_single_part(source, s, part, extinction_field)?;
            out.extend(v.iter().copied());
        }
        Ok(Array1::from(out))
    }

    /// Gram matrix of a part's basis
    fn gram_matrix(&self, part: &SinglePart) -> Result<Array2<f64>> {
        part.basis().gram_matrix(part.mesh())
    }

    /// Quasi-static pole estimates from the linearised EFIE
    fn estimate_poles(&self, s_start: Complex64, modes: &[usize], part: &SinglePart) -> Result<Modes> {
        let efie = EfieOperator::new(self.integration().clone());
        match efie.impedance_single_parts(s_start, part, part, false)? {
            ImpedanceMatrix::Efie { l, s_mat, .. } => {
                let (s, vr) = eig_linearised(&l, &s_mat, modes)?;
                Ok(Modes {
                    part: part.id(),
                    s,
                    vr,
                })
            }
            ImpedanceMatrix::Generic { .. } => Err(OpenModesError::InvalidParameters(
                "linearised estimate needs separate L and S matrices".to_string(),
            )),
        }
    }

    /// Refine estimated poles by Newton iteration
    fn refine_poles(&self, estimates: &Modes, part: &SinglePart, options: &PoleOptions) -> Result<Modes> {
        if estimates.part != part.id() {
            return Err(OpenModesError::UnknownPart(format!(
                "estimates belong to {}, not {}",
                estimates.part,
                part.id()
            )));
        }
        info!("Finding poles for part {}", part.id());

        let gram = if options.use_gram {
            Some(self.gram_matrix(part)?)
        } else {
            None
        };
        let derivatives = self.gives_frequency_derivative();
        let newton = NewtonOptions {
            lambda_tol: options.rel_tol,
            max_iter: options.max_iter,
        };

        let mut s_out = Array1::zeros(estimates.len());
        let mut vr = Array2::zeros(estimates.vr.dim());
        for mode in 0..estimates.len() {
            let res = eig_newton(
                |s| {
                    let z = self.impedance_single_parts(s, part, part, derivatives)?;
                    Ok((z.value(), z.frequency_derivative()))
                },
                estimates.s[mode],
                &estimates.vr.column(mode).to_owned(),
                &newton,
            )?;

            let lin_hz = estimates.s[mode] / (2.0 * PI);
            let nl_hz = res.eigval / (2.0 * PI);
            info!(
                "Converged after {} iterations\n{:+.4e} {:+.4e}j (linearised solution)\n{:+.4e} {:+.4e}j (nonlinear solution)",
                res.iter_count, lin_hz.re, lin_hz.im, nl_hz.re, nl_hz.im
            );

            let j = res.eigvec;
            let norm = match &gram {
                Some(g) => {
                    let gj = g.mapv(|x| Complex64::new(x, 0.0)).dot(&j);
                    j.dot(&gj).sqrt()
                }
                None => j.iter().map(|z| z * z).sum::<Complex64>().sqrt(),
            };
            s_out[mode] = res.eigval;
            vr.column_mut(mode).assign(&(j / norm));
        }

        Ok(Modes {
            part: part.id(),
            s: s_out,
            vr,
        })
    }

    /// Estimate and refine poles of a part
    fn poles(
        &self,
        s_start: Complex64,
        modes: &[usize],
        part: &SinglePart,
        options: &PoleOptions,
    ) -> Result<Modes> {
        let estimates = self.estimate_poles(s_start, modes, part)?;
        self.refine_poles(&estimates, part, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators::rectangular_plate;
    use std::sync::Arc;

    fn two_plates() -> Vec<SinglePart> {
        let mesh = Arc::new(rectangular_plate(4e-3, 2e-3, 2, 1).unwrap());
        let a = SinglePart::new(Arc::clone(&mesh));
        let mut b = SinglePart::new(mesh);
        b.translate([0.0, 0.0, 3e-3]);
        vec![a, b]
    }

    fn options() -> IntegrationOptions {
        IntegrationOptions {
            rule_order: 3,
            singular_rule_order: 4,
            ..IntegrationOptions::default()
        }
    }

    #[test]
    fn test_efie_reciprocal_blocks() {
        let parts = two_plates();
        let op = EfieOperator::new(options());
        let s = Complex64::new(0.0, 2.0 * PI * 5e9);
        let z = op.impedance(s, &parts, &parts, false).unwrap();

        let full = z.combined();
        assert_eq!(full.nrows(), 2 * parts[0].basis().len());

        // the mirrored block was transposed, and matches a direct evaluation
        let direct = op
            .impedance_single_parts(s, &parts[1], &parts[0], false)
            .unwrap()
            .value();
        let reused = z.block(parts[1].id(), parts[0].id()).unwrap().value();
        let scale = direct.iter().map(|z| z.norm()).fold(0.0, f64::max);
        for (a, b) in direct.iter().zip(reused.iter()) {
            assert!((a - b).norm() <= 1e-9 * scale);
        }
    }

    #[test]
    fn test_operator_kind_serde() {
        let kind: OperatorKind = serde_json::from_str(r#"{"type": "cfie"}"#).unwrap();
        assert_eq!(kind, OperatorKind::Cfie { alpha: 0.5 });
        let kind: OperatorKind = serde_json::from_str(r#"{"type": "mfie", "form": "tangential"}"#).unwrap();
        assert_eq!(
            kind,
            OperatorKind::Mfie {
                form: MfieForm::Tangential
            }
        );
        assert!(build_operator(&OperatorKind::Cfie { alpha: 1.5 }, options()).is_err());
        let op = build_operator(&OperatorKind::default(), options()).unwrap();
        assert!(op.reciprocal());
        assert!(op.gives_frequency_derivative());
    }

    #[test]
    fn test_integration_validation() {
        assert!(IntegrationOptions::default().validate().is_ok());
        let bad = IntegrationOptions {
            num_singular_terms: 0,
            ..IntegrationOptions::default()
        };
        assert!(bad.validate().is_err());
        let opts: IntegrationOptions = serde_json::from_str(r#"{"rule_order": 7}"#).unwrap();
        assert_eq!(opts.rule_order, 7);
        assert_eq!(opts.num_singular_terms, 2);
        // touching pairs use the highest tabulated Dunavant rule
        assert_eq!(opts.singular_rule_order, 20);
        assert_eq!(opts.rule().unwrap().len(), 13);
    }
}
