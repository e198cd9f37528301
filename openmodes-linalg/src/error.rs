//! Error type shared by the dense solvers

use thiserror::Error;

/// Errors raised by factorisations and eigenvalue iterations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// A pivot (or the matrix as a whole) is numerically zero
    #[error("Matrix is singular or nearly singular")]
    SingularMatrix,

    /// Operand shapes are incompatible
    #[error("Matrix dimensions mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Expected dimension
        expected: usize,
        /// Dimension actually supplied
        got: usize,
    },

    /// The QR iteration did not deflate within its budget
    #[error("Eigenvalue iteration failed to converge after {iterations} sweeps")]
    NoConvergence {
        /// Number of sweeps performed
        iterations: usize,
    },
}

/// Result alias for this crate
pub type Result<T> = std::result::Result<T, LinalgError>;
