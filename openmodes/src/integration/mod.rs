//! Numerical quadrature
//!
//! - `gauss`: Gauss-Legendre rules on `[-1, 1]`
//! - `dunavant`: symmetric rules on triangles

pub mod dunavant;
pub mod gauss;

pub use dunavant::{dunavant_order_num, dunavant_rule, TriangleRule};
pub use gauss::gauss_legendre;
