//! Magnetic field integral equation
//!
//! Valid for closed perfectly conducting surfaces only. Two testing
//! procedures are available, see [`MfieForm`]:
//!
//! - n×: `Z = ½ Gram - N`, `V = ∫ f_m·(n̂ × H)`
//! - tangential: `Z = ½ Gram_n× - T`, `V = ∫ f_m·H`

use super::assembly::vector_terms;
use super::singularities::singular_impedance_rwg;
use super::{IntegrationOptions, Operator};
use crate::basis::DivRwgBasis;
use crate::core::{z_mfie_faces_mutual, z_mfie_faces_self, MfieForm};
use crate::error::Result;
use crate::impedance::ImpedanceMatrix;
use crate::parts::SinglePart;
use crate::sources::SourceField;
use log::warn;
use ndarray::Array1;
use num_complex::Complex64;

/// MFIE operator on RWG bases
#[derive(Debug, Clone, Default)]
pub struct MfieOperator {
    integration: IntegrationOptions,
    form: MfieForm,
}

impl MfieOperator {
    pub fn new(integration: IntegrationOptions, form: MfieForm) -> Self {
        Self { integration, form }
    }

    pub fn form(&self) -> MfieForm {
        self.form
    }
}

impl Operator for MfieOperator {
    fn integration(&self) -> &IntegrationOptions {
        &self.integration
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
        let rule = self.integration.rule()?;
        let basis_o = part_o.basis();
        let basis_s = part_s.basis();
        let nodes_o = part_o.transformed_nodes();

        let z = if part_o.id() == part_s.id() {
            if !part_o.mesh().closed_surface() {
                warn!("MFIE applied to part {} which is not a closed surface", part_o.id());
            }
            let singular = singular_impedance_rwg(
                part_o.mesh(),
                self.integration.num_singular_terms,
                self.integration.rel_tol,
                self.integration.singular_rule_order,
            )?;
            let extracted = match self.form {
                MfieForm::NCross => &singular.n_mfie,
                MfieForm::Tangential => &singular.t_mfie,
            };
            let faces = z_mfie_faces_self(
                &nodes_o,
                part_o.mesh().polygons(),
                s,
                &rule,
                self.form,
                Some(extracted),
            );
            let gram = match self.form {
                MfieForm::NCross => basis_o.gram_matrix(part_o.mesh())?,
                MfieForm::Tangential => basis_o.gram_matrix_ncross(part_o.mesh())?,
            };
            gram.mapv(|g| Complex64::new(0.5 * g, 0.0)) - vector_terms(&basis_o, &basis_s, &faces)
        } else {
            let faces = z_mfie_faces_mutual(
                &nodes_o,
                part_o.mesh().polygons(),
                &part_s.transformed_nodes(),
                part_s.mesh().polygons(),
                s,
                &rule,
                self.form,
            );
            -vector_terms(&basis_o, &basis_s, &faces)
        };

        Ok(ImpedanceMatrix::Generic { z, dz: None })
    }

    fn source_single_part(
        &self,
        source: &dyn SourceField,
        s: Complex64,
        part: &SinglePart,
        extinction_field: bool,
    ) -> Result<Array1<Complex64>> {
        let rule = self.integration.rule()?;
        let nodes = part.transformed_nodes();
        let basis = part.basis();
        if extinction_field {
            return Ok(basis.weight_field(&nodes, part.mesh(), &rule, |r, _| source.electric_field(r, s)));
        }
        Ok(match self.form {
            MfieForm::Tangential => {
                basis.weight_field(&nodes, part.mesh(), &rule, |r, _| source.magnetic_field(r, s))
            }
            MfieForm::NCross => {
                let normals = DivRwgBasis::face_normals(&nodes, part.mesh());
                basis.weight_field(&nodes, part.mesh(), &rule, |r, t| {
                    let h = source.magnetic_field(r, s);
                    let n = &normals[t];
                    [
                        h[2] * n[1] - h[1] * n[2],
                        h[0] * n[2] - h[2] * n[0],
                        h[1] * n[0] - h[0] * n[1],
                    ]
                })
            }
        })
    }
}
