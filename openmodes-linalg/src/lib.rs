//! Dense complex linear algebra for OpenModes
//!
//! The eigenmode solver works on small to medium dense impedance matrices
//! (a few thousand unknowns at most), so everything here is plain
//! `ndarray` code by default. The optional `ndarray-linalg` feature hands
//! [`lu_solve`] and [`eig_generalized`] to LAPACK instead.
//!
//! - **Direct**: LU factorisation with partial pivoting
//! - **Eigen**: Hessenberg reduction, shifted QR, inverse iteration and the
//!   generalised problem `a x = λ b x`
//!
//! ## Example
//!
//! ```rust
//! use linalg::{eigenvalues, lu_solve};
//! use ndarray::array;
//! use num_complex::Complex64;
//!
//! let a = array![
//!     [Complex64::new(2.0, 0.0), Complex64::new(0.0, 1.0)],
//!     [Complex64::new(0.0, -1.0), Complex64::new(2.0, 0.0)],
//! ];
//! let b = array![Complex64::new(1.0, 0.0), Complex64::new(0.0, 0.0)];
//!
//! let x = lu_solve(&a, &b).unwrap();
//! assert_eq!(x.len(), 2);
//!
//! let values = eigenvalues(&a).unwrap();
//! assert_eq!(values.len(), 2);
//! ```

pub mod direct;
pub mod eigen;
pub mod error;
pub mod traits;

pub use direct::{lu_factorize, lu_solve, lu_solve_matrix, LuFactorization};
pub use eigen::{eig_generalized, eigenvalues, eigenvector, hessenberg, GeneralizedEigen};
pub use error::{LinalgError, Result};
pub use traits::{ComplexField, SolveField};
