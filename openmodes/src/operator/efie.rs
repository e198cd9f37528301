//! Electric field integral equation
//!
//! `Z = sL + S/s` with `L = μ₀ ∫∫ f_m·f_n G` and
//! `S = (1/ε₀) ∫∫ (∇·f_m)(∇'·f_n) G`, tested with `f_m` against the
//! incident electric field.

use super::assembly::{scalar_terms, vector_terms};
use super::singularities::singular_impedance_rwg;
use super::{IntegrationOptions, Operator};
use crate::constants::{EPSILON_0, MU_0};
use crate::core::{z_efie_faces_mutual, z_efie_faces_self};
use crate::error::Result;
use crate::impedance::ImpedanceMatrix;
use crate::parts::SinglePart;
use crate::sources::SourceField;
use log::debug;
use ndarray::Array1;
use num_complex::Complex64;

/// EFIE operator on RWG bases
#[derive(Debug, Clone, Default)]
pub struct EfieOperator {
    integration: IntegrationOptions,
}

impl EfieOperator {
    pub fn new(integration: IntegrationOptions) -> Self {
        Self { integration }
    }
}

impl Operator for EfieOperator {
    fn integration(&self) -> &IntegrationOptions {
        &self.integration
    }

    fn reciprocal(&self) -> bool {
        true
    }

    fn gives_frequency_derivative(&self) -> bool {
        true
    }

    fn impedance_single_parts(
        &self,
        s: Complex64,
        part_o: &SinglePart,
        part_s: &SinglePart,
        frequency_derivatives: bool,
    ) -> Result<ImpedanceMatrix> {
        let rule = self.integration.rule()?;
        let basis_o = part_o.basis();
        let basis_s = part_s.basis();
        let nodes_o = part_o.transformed_nodes();

        let faces = if part_o.id() == part_s.id() {
            let singular = singular_impedance_rwg(
                part_o.mesh(),
                self.integration.num_singular_terms,
                self.integration.rel_tol,
                self.integration.singular_rule_order,
            )?;
            z_efie_faces_self(
                &nodes_o,
                part_o.mesh().polygons(),
                s,
                &rule,
                &singular.t_efie,
                frequency_derivatives,
            )?
        } else {
            z_efie_faces_mutual(
                &nodes_o,
                part_o.mesh().polygons(),
                &part_s.transformed_nodes(),
                part_s.mesh().polygons(),
                s,
                &rule,
                frequency_derivatives,
            )
        };
        debug!(
            "EFIE block {} x {} at s = {}",
            basis_o.len(),
            basis_s.len(),
            s
        );

        let l = vector_terms(&basis_o, &basis_s, &faces.a) * MU_0;
        let s_mat = scalar_terms(&basis_o, &basis_s, &faces.phi) / EPSILON_0;
        let dl = faces
            .da
            .as_ref()
            .map(|da| vector_terms(&basis_o, &basis_s, da) * MU_0);
        let ds = faces
            .dphi
            .as_ref()
            .map(|dphi| scalar_terms(&basis_o, &basis_s, dphi) / EPSILON_0);

        Ok(ImpedanceMatrix::Efie {
            s,
            l,
            s_mat,
            dl,
            ds,
        })
    }

    fn source_single_part(
        &self,
        source: &dyn SourceField,
        s: Complex64,
        part: &SinglePart,
        _extinction_field: bool,
    ) -> Result<Array1<Complex64>> {
        let rule = self.integration.rule()?;
        let nodes = part.transformed_nodes();
        Ok(part
            .basis()
            .weight_field(&nodes, part.mesh(), &rule, |r, _| source.electric_field(r, s)))
    }
}
