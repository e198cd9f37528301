//! JSON configuration for a simulation run

use crate::error::{OpenModesError, Result};
use crate::geometry::Vec3;
use crate::mesh::{icosphere, read_mesh, rectangular_plate, ring, split_ring, TriangularSurfaceMesh};
use crate::operator::{IntegrationOptions, OperatorKind, PoleOptions};
use crate::sources::PlaneWaveSource;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Complete simulation configuration loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Parts placed in the simulation
    pub geometry: Vec<PartConfig>,
    /// Integral operator
    #[serde(default)]
    pub operator: OperatorKind,
    /// Quadrature settings
    #[serde(default)]
    pub integration: IntegrationOptions,
    /// Frequency sweep for extinction
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Incident plane wave
    #[serde(default)]
    pub source: SourceConfig,
    /// Pole search
    #[serde(default)]
    pub poles: PoleConfig,
    /// Worker threads, all available when absent
    #[serde(default)]
    pub threads: Option<usize>,
}

/// One placed part
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartConfig {
    /// Where the mesh comes from
    pub mesh: MeshConfig,
    /// Rotations applied in order, before the translation
    #[serde(default)]
    pub rotations: Vec<RotationConfig>,
    /// Translation (m)
    #[serde(default)]
    pub translation: Vec3,
}

/// Mesh source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshConfig {
    /// A `.msh` or `.json` file
    File { path: PathBuf },
    /// Icosphere
    Sphere {
        radius: f64,
        #[serde(default = "default_subdivisions")]
        subdivisions: usize,
    },
    /// Flat rectangle in the xy-plane
    Plate {
        length: f64,
        width: f64,
        nx: usize,
        ny: usize,
    },
    /// Flat annulus
    Ring {
        inner_radius: f64,
        outer_radius: f64,
        n_radial: usize,
        n_angular: usize,
    },
    /// Annulus with a gap on the +x axis
    SplitRing {
        inner_radius: f64,
        outer_radius: f64,
        gap_degrees: f64,
        n_radial: usize,
        n_angular: usize,
    },
}

fn default_subdivisions() -> usize {
    2
}

impl MeshConfig {
    /// Read or generate the mesh
    pub fn build(&self) -> Result<TriangularSurfaceMesh> {
        match self {
            MeshConfig::File { path } => read_mesh(path),
            MeshConfig::Sphere {
                radius,
                subdivisions,
            } => icosphere(*radius, *subdivisions),
            MeshConfig::Plate {
                length,
                width,
                nx,
                ny,
            } => rectangular_plate(*length, *width, *nx, *ny),
            MeshConfig::Ring {
                inner_radius,
                outer_radius,
                n_radial,
                n_angular,
            } => ring(*inner_radius, *outer_radius, *n_radial, *n_angular),
            MeshConfig::SplitRing {
                inner_radius,
                outer_radius,
                gap_degrees,
                n_radial,
                n_angular,
            } => split_ring(
                *inner_radius,
                *outer_radius,
                *gap_degrees,
                *n_radial,
                *n_angular,
            ),
        }
    }
}

/// Rotation about an axis through the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    pub axis: Vec3,
    pub degrees: f64,
}

/// Linear frequency sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// First frequency (Hz)
    #[serde(default = "default_start_hz")]
    pub start_hz: f64,
    /// Last frequency (Hz)
    #[serde(default = "default_stop_hz")]
    pub stop_hz: f64,
    /// Number of points
    #[serde(default = "default_num_freqs")]
    pub num_freqs: usize,
}

fn default_start_hz() -> f64 {
    1e9
}

fn default_stop_hz() -> f64 {
    10e9
}

fn default_num_freqs() -> usize {
    10
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            start_hz: default_start_hz(),
            stop_hz: default_stop_hz(),
            num_freqs: default_num_freqs(),
        }
    }
}

impl SweepConfig {
    /// Equally spaced frequencies including both ends
    pub fn frequencies(&self) -> Vec<f64> {
        match self.num_freqs {
            0 => Vec::new(),
            1 => vec![self.start_hz],
            n => {
                let step = (self.stop_hz - self.start_hz) / (n - 1) as f64;
                (0..n).map(|i| self.start_hz + step * i as f64).collect()
            }
        }
    }
}

/// Incident plane wave, real polarisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Polarisation vector, amplitude included
    #[serde(default = "default_e_inc")]
    pub e_inc: Vec3,
    /// Propagation direction
    #[serde(default = "default_k_hat")]
    pub k_hat: Vec3,
    /// Incident power density (W/m²), rescales `e_inc` when given
    #[serde(default)]
    pub p_inc: Option<f64>,
}

fn default_e_inc() -> Vec3 {
    [1.0, 0.0, 0.0]
}

fn default_k_hat() -> Vec3 {
    [0.0, 0.0, 1.0]
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            e_inc: default_e_inc(),
            k_hat: default_k_hat(),
            p_inc: None,
        }
    }
}

impl SourceConfig {
    /// Build the plane wave
    pub fn to_source(&self) -> Result<PlaneWaveSource> {
        let e_inc = self.e_inc.map(|x| Complex64::new(x, 0.0));
        match self.p_inc {
            Some(p_inc) => PlaneWaveSource::with_power(e_inc, self.k_hat, p_inc),
            None => PlaneWaveSource::new(e_inc, self.k_hat),
        }
    }
}

/// Where to look for poles and how hard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoleConfig {
    /// Frequency at which the linearised estimate is made (Hz)
    #[serde(default = "default_pole_frequency")]
    pub frequency_hz: f64,
    /// Mode indices, in order of increasing resonant frequency
    #[serde(default = "default_modes")]
    pub modes: Vec<usize>,
    #[serde(flatten)]
    pub options: PoleOptions,
}

fn default_pole_frequency() -> f64 {
    1e9
}

fn default_modes() -> Vec<usize> {
    vec![0]
}

impl Default for PoleConfig {
    fn default() -> Self {
        Self {
            frequency_hz: default_pole_frequency(),
            modes: default_modes(),
            options: PoleOptions::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    ///
    /// Relative mesh file paths are taken relative to the directory of the
    /// configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let mut config: SimulationConfig = serde_json::from_str(&contents)?;
        if let Some(base) = path.parent() {
            config.resolve_mesh_paths(base);
        }
        Ok(config)
    }

    /// Prefix every relative mesh file path with `base`
    pub fn resolve_mesh_paths(&mut self, base: &Path) {
        for part in &mut self.geometry {
            if let MeshConfig::File { path } = &mut part.mesh {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    /// Save configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check parameter ranges without building anything
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(OpenModesError::InvalidParameters(msg));

        if self.geometry.is_empty() {
            return invalid("at least one part is required".to_string());
        }
        for part in &self.geometry {
            for rot in &part.rotations {
                if rot.axis.iter().all(|&x| x == 0.0) {
                    return invalid("rotation axis must be non-zero".to_string());
                }
            }
        }
        self.integration.validate()?;
        if let OperatorKind::Cfie { alpha } = self.operator {
            if !(0.0..=1.0).contains(&alpha) {
                return invalid(format!("CFIE alpha must lie in [0, 1], got {}", alpha));
            }
        }

        let sweep = &self.sweep;
        if sweep.num_freqs == 0 || sweep.start_hz <= 0.0 || sweep.stop_hz < sweep.start_hz {
            return invalid(format!(
                "invalid sweep: {} points from {} to {} Hz",
                sweep.num_freqs, sweep.start_hz, sweep.stop_hz
            ));
        }

        let poles = &self.poles;
        if poles.frequency_hz <= 0.0 {
            return invalid(format!(
                "pole search frequency must be positive, got {}",
                poles.frequency_hz
            ));
        }
        if poles.modes.is_empty() || poles.options.max_iter == 0 || poles.options.rel_tol <= 0.0 {
            return invalid("pole search needs modes, iterations and a positive tolerance".to_string());
        }

        if self.threads == Some(0) {
            return invalid("thread count must be at least 1".to_string());
        }

        self.source.to_source().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "geometry": [{"mesh": {"type": "sphere", "radius": 0.005}}]
    }"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config: SimulationConfig = serde_json::from_str(MINIMAL).unwrap();
        assert_eq!(config.operator, OperatorKind::Efie);
        assert_eq!(config.integration, IntegrationOptions::default());
        assert_eq!(config.poles.modes, vec![0]);
        assert!(config.poles.options.use_gram);
        assert_eq!(
            config.geometry[0].mesh,
            MeshConfig::Sphere {
                radius: 0.005,
                subdivisions: 2
            }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config() {
        let json = r#"{
            "geometry": [
                {"mesh": {"type": "split_ring", "inner_radius": 3e-3, "outer_radius": 4e-3,
                          "gap_degrees": 30, "n_radial": 1, "n_angular": 12},
                 "rotations": [{"axis": [0, 0, 1], "degrees": 90}],
                 "translation": [0, 0, 1e-3]}
            ],
            "operator": {"type": "cfie", "alpha": 0.3},
            "sweep": {"start_hz": 1e9, "stop_hz": 3e9, "num_freqs": 3},
            "source": {"e_inc": [0, 1, 0], "k_hat": [1, 0, 0], "p_inc": 1.0},
            "poles": {"frequency_hz": 2e9, "modes": [0, 2], "max_iter": 50},
            "threads": 2
        }"#;
        let config: SimulationConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.operator, OperatorKind::Cfie { alpha: 0.3 });
        assert_eq!(config.sweep.frequencies(), vec![1e9, 2e9, 3e9]);
        assert_eq!(config.poles.options.max_iter, 50);
        assert_eq!(config.geometry[0].rotations[0].degrees, 90.0);
        assert_eq!(config.threads, Some(2));
        assert!(config.validate().is_ok());
        assert!(config.geometry[0].mesh.build().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let mut config: SimulationConfig = serde_json::from_str(MINIMAL).unwrap();
        config.source.e_inc = [0.0, 0.0, 1.0];
        assert!(config.validate().is_err());

        let mut config: SimulationConfig = serde_json::from_str(MINIMAL).unwrap();
        config.sweep.num_freqs = 0;
        assert!(config.validate().is_err());

        let mut config: SimulationConfig = serde_json::from_str(MINIMAL).unwrap();
        config.threads = Some(0);
        assert!(config.validate().is_err());

        let mut config: SimulationConfig = serde_json::from_str(MINIMAL).unwrap();
        config.geometry.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_mesh_paths() {
        let json = r#"{
            "geometry": [
                {"mesh": {"type": "file", "path": "meshes/plate.msh"}},
                {"mesh": {"type": "file", "path": "/abs/ring.msh"}},
                {"mesh": {"type": "sphere", "radius": 0.005}}
            ]
        }"#;
        let mut config: SimulationConfig = serde_json::from_str(json).unwrap();
        let base = Path::new("/data/runs");
        config.resolve_mesh_paths(base);
        assert_eq!(
            config.geometry[0].mesh,
            MeshConfig::File {
                path: PathBuf::from("/data/runs/meshes/plate.msh")
            }
        );
        assert_eq!(
            config.geometry[1].mesh,
            MeshConfig::File {
                path: PathBuf::from("/abs/ring.msh")
            }
        );
        assert!(matches!(config.geometry[2].mesh, MeshConfig::Sphere { .. }));
    }

    #[test]
    fn test_single_frequency_sweep() {
        let sweep = SweepConfig {
            start_hz: 5e9,
            stop_hz: 5e9,
            num_freqs: 1,
        };
        assert_eq!(sweep.frequencies(), vec![5e9]);
    }
}
