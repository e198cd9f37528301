//! # OpenModes: eigenmodes of open electromagnetic resonators
//!
//! Method of moments solver for perfectly conducting surfaces discretised
//! with RWG basis functions. Finds the complex resonant frequencies (poles)
//! of metamaterial elements and antennas and computes their response to
//! plane waves.
//!
//! ## Features
//!
//! - EFIE, MFIE and CFIE operators with singularity subtraction
//! - Linearised pole estimates refined by nonlinear Newton iteration
//! - Parallel assembly with Rayon (`parallel` feature, on by default)
//! - Gmsh and JSON meshes, plus generated spheres, plates and rings
//! - Mie series reference for validation
//!
//! ## Example
//!
//! ```no_run
//! use openmodes::mesh::icosphere;
//! use openmodes::operator::{EfieOperator, IntegrationOptions};
//! use openmodes::sources::PlaneWaveSource;
//! use openmodes::Simulation;
//! use num_complex::Complex64;
//! use std::sync::Arc;
//!
//! let mut sim = Simulation::with_operator(Box::new(EfieOperator::new(IntegrationOptions::default())));
//! sim.place_part(Arc::new(icosphere(5e-3, 1)?));
//!
//! let wave = PlaneWaveSource::new(
//!     [Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0), Complex64::new(0.0, 0.0)],
//!     [0.0, 0.0, 1.0],
//! )?;
//! let extinction = sim.extinction(&wave, &[10e9])?;
//! println!("{:?}", extinction);
//! # Ok::<(), openmodes::OpenModesError>(())
//! ```

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

pub mod analytical;
pub mod basis;
pub mod config;
pub mod constants;
pub mod core;
pub mod eig;
pub mod error;
pub mod geometry;
pub mod helpers;
pub mod impedance;
pub mod integration;
pub mod mesh;
pub mod modes;
pub mod operator;
pub mod parallel;
pub mod parts;
pub mod simulation;
pub mod sources;
pub mod sparse;

pub use config::SimulationConfig;
pub use error::{OpenModesError, Result};
pub use integration::dunavant;
pub use modes::Modes;
pub use parts::{PartId, SinglePart};
pub use simulation::Simulation;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (set during build)
pub const GIT_HASH: &str = env!("GIT_HASH");
