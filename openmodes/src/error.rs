//! Error type for the solver crate

use thiserror::Error;

/// Errors raised while building meshes, assembling operators or searching
/// for poles
#[derive(Error, Debug)]
pub enum OpenModesError {
    /// Invalid or unsupported mesh data
    #[error("Mesh error: {0}")]
    Mesh(String),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON input
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failure inside the dense solvers
    #[error("Linear algebra error: {0}")]
    Linalg(#[from] linalg::LinalgError),

    /// A parameter outside its admissible range
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// An iterative search exhausted its budget
    #[error("No convergence after {iterations} iterations: {context}")]
    NoConvergence {
        /// Iterations performed
        iterations: usize,
        /// What was being iterated
        context: String,
    },

    /// A part id that does not belong to the simulation
    #[error("Unknown part: {0}")]
    UnknownPart(String),
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, OpenModesError>;
