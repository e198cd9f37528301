//! A simulation: placed parts, one operator and the analyses run on them

use crate::config::SimulationConfig;
use crate::core::set_threads;
use crate::error::{OpenModesError, Result};
use crate::impedance::ImpedanceParts;
use crate::mesh::{read_mesh, TriangularSurfaceMesh};
use crate::modes::Modes;
use crate::operator::{build_operator, Operator, PoleOptions};
use crate::parts::{PartId, SinglePart};
use crate::sources::SourceField;
use log::{debug, info};
use ndarray::Array1;
use num_complex::Complex64;
use std::f64::consts::PI;
use std::path::Path;
use std::sync::Arc;

/// Parts sharing one integral operator
pub struct Simulation {
    operator: Box<dyn Operator>,
    parts: Vec<SinglePart>,
}

impl Simulation {
    /// Build the operator, configure threads and place the configured parts
    pub fn new(config: &SimulationConfig) -> Result<Self> {
        config.validate()?;
        if let Some(n) = config.threads {
            set_threads(n)?;
        }
        let operator = build_operator(&config.operator, config.integration.clone())?;
        let mut sim = Self::with_operator(operator);

        for part_config in &config.geometry {
            let mesh = Arc::new(part_config.mesh.build()?);
            let id = sim.place_part(mesh);
            let part = sim.part_mut(id)?;
            for rot in &part_config.rotations {
                part.rotate(rot.axis, rot.degrees)?;
            }
            part.translate(part_config.translation);
        }
        Ok(sim)
    }

    /// An empty simulation using `operator`
    pub fn with_operator(operator: Box<dyn Operator>) -> Self {
        Self {
            operator,
            parts: Vec::new(),
        }
    }

    /// Read a mesh file (`.msh` or `.json`)
    pub fn load_mesh(&self, path: impl AsRef<Path>) -> Result<Arc<TriangularSurfaceMesh>> {
        let path = path.as_ref();
        let mesh = read_mesh(path)?;
        info!(
            "Loaded {} with {} nodes and {} triangles",
            path.display(),
            mesh.num_nodes(),
            mesh.num_triangles()
        );
        Ok(Arc::new(mesh))
    }

    /// Place a mesh at the origin and return the new part's id
    pub fn place_part(&mut self, mesh: Arc<TriangularSurfaceMesh>) -> PartId {
        let part = SinglePart::new(mesh);
        let id = part.id();
        debug!("Placed part {} with {} basis functions", id, part.basis().len());
        self.parts.push(part);
        id
    }

    pub fn part(&self, id: PartId) -> Result<&SinglePart> {
        self.parts
            .iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| OpenModesError::UnknownPart(id.to_string()))
    }

    /// Mutable access for moving a part
    pub fn part_mut(&mut self, id: PartId) -> Result<&mut SinglePart> {
        self.parts
            .iter_mut()
            .find(|p| p.id() == id)
            .ok_or_else(|| OpenModesError::UnknownPart(id.to_string()))
    }

    pub fn parts(&self) -> &[SinglePart] {
        &self.parts
    }

    pub fn operator(&self) -> &dyn Operator {
        self.operator.as_ref()
    }

    /// Total number of unknowns
    pub fn num_unknowns(&self) -> usize {
        self.parts.iter().map(|p| p.basis().len()).sum()
    }

    fn require_parts(&self) -> Result<()> {
        if self.parts.is_empty() {
            return Err(OpenModesError::InvalidParameters(
                "simulation has no parts".to_string(),
            ));
        }
        Ok(())
    }

    /// Impedance of all parts at complex frequency `s`
    pub fn impedance(&self, s: Complex64) -> Result<ImpedanceParts> {
        self.require_parts()?;
        self.operator.impedance(s, &self.parts, &self.parts, false)
    }

    /// Source vector of all parts, in part order
    pub fn source_vector(
        &self,
        source: &dyn SourceField,
        s: Complex64,
        extinction_field: bool,
    ) -> Result<Array1<Complex64>> {
        self.require_parts()?;
        self.operator
            .source_vector(source, s, &self.parts, extinction_field)
    }

    /// `(index, s = 2πj f)` for each real frequency
    pub fn iter_freqs<'a>(&self, freqs: &'a [f64]) -> impl Iterator<Item = (usize, Complex64)> + 'a {
        freqs
            .iter()
            .enumerate()
            .map(|(idx, &f)| (idx, Complex64::new(0.0, 2.0 * PI * f)))
    }

    /// Linearised pole estimates of one part near `s_start`
    pub fn estimate_poles(&self, s_start: Complex64, modes: &[usize], part: PartId) -> Result<Modes> {
        let part = self.part(part)?;
        self.operator.estimate_poles(s_start, modes, part)
    }

    /// Refine estimates to the poles of the full operator
    pub fn refine_poles(&self, estimates: &Modes, options: &PoleOptions) -> Result<Modes> {
        let part = self.part(estimates.part)?;
        self.operator.refine_poles(estimates, part, options)
    }

    /// Extinction `V_Eᴴ Z⁻¹ V` at each frequency
    ///
    /// `V_E` tests the incident electric field directly. For a unit
    /// amplitude plane wave the real part is the extinction cross section
    /// divided by `η₀`.
    pub fn extinction(&self, source: &dyn SourceField, freqs: &[f64]) -> Result<Vec<Complex64>> {
        self.require_parts()?;
        let mut out = Vec::with_capacity(freqs.len());
        for (idx, s) in self.iter_freqs(freqs) {
            info!("Frequency {} of {}: {:.4e} Hz", idx + 1, freqs.len(), freqs[idx]);
            let z = self.impedance(s)?;
            let v = self.source_vector(source, s, false)?;
            let v_e = self.source_vector(source, s, true)?;
            let current = z.solve(&v)?;
            let ext: Complex64 = v_e
                .iter()
                .zip(current.iter())
                .map(|(a, b)| a.conj() * b)
                .sum();
            out.push(ext);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::generators::rectangular_plate;
    use crate::operator::{EfieOperator, IntegrationOptions};

    fn simulation() -> Simulation {
        Simulation::with_operator(Box::new(EfieOperator::new(IntegrationOptions::default())))
    }

    #[test]
    fn test_place_and_move_parts() {
        let mut sim = simulation();
        let mesh = Arc::new(rectangular_plate(4e-3, 1e-3, 4, 1).unwrap());
        let a = sim.place_part(Arc::clone(&mesh));
        let b = sim.place_part(mesh);
        assert_ne!(a, b);
        assert_eq!(sim.parts().len(), 2);

        sim.part_mut(b).unwrap().translate([0.0, 2e-3, 0.0]);
        assert_eq!(sim.part(b).unwrap().translation(), [0.0, 2e-3, 0.0]);
        assert_eq!(sim.part(a).unwrap().translation(), [0.0; 3]);
        assert_eq!(sim.num_unknowns(), 2 * sim.part(a).unwrap().basis().len());

        let stranger = SinglePart::new(Arc::new(rectangular_plate(1.0, 1.0, 1, 1).unwrap()));
        assert!(sim.part(stranger.id()).is_err());
    }

    #[test]
    fn test_iter_freqs() {
        let sim = simulation();
        let freqs = [1e9, 2e9];
        let s: Vec<_> = sim.iter_freqs(&freqs).collect();
        assert_eq!(s.len(), 2);
        assert_eq!(s[1].0, 1);
        assert_eq!(s[1].1.re, 0.0);
        assert!((s[1].1.im - 2.0 * PI * 2e9).abs() < 1e-3);
    }

    #[test]
    fn test_empty_simulation_rejected() {
        let sim = simulation();
        assert!(sim.impedance(Complex64::new(0.0, 1e9)).is_err());
    }

    #[test]
    fn test_from_config() {
        let json = r#"{
            "geometry": [
                {"mesh": {"type": "plate", "length": 4e-3, "width": 1e-3, "nx": 4, "ny": 1}},
                {"mesh": {"type": "plate", "length": 4e-3, "width": 1e-3, "nx": 4, "ny": 1},
                 "translation": [0, 0, 2e-3]}
            ]
        }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        let sim = Simulation::new(&config).unwrap();
        assert_eq!(sim.parts().len(), 2);
        assert_eq!(sim.parts()[1].translation(), [0.0, 0.0, 2e-3]);

        let z = sim.impedance(Complex64::new(0.0, 2.0 * PI * 1e9)).unwrap();
        let n = sim.num_unknowns();
        assert_eq!(z.combined().dim(), (n, n));
    }
}
