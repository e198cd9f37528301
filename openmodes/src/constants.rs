//! Physical and numerical constants
//!
//! SI units throughout. `EPSILON_0` is derived from the exact speed of light
//! and the classical value of `MU_0`.

use std::f64::consts::PI;

/// Speed of light in vacuum (m/s)
pub const C: f64 = 299_792_458.0;

/// Vacuum permeability (H/m)
pub const MU_0: f64 = 4.0e-7 * PI;

/// Vacuum permittivity (F/m)
pub const EPSILON_0: f64 = 1.0 / (MU_0 * C * C);

/// Wave impedance of free space (Ω)
pub const ETA_0: f64 = MU_0 * C;

/// 4π
pub const PI4: f64 = 4.0 * PI;

/// 2π
pub const PI2: f64 = 2.0 * PI;

/// `|γR|` above which the smooth Green's-function remainder is computed by
/// direct subtraction rather than by its power series
pub const REMAINDER_SERIES_LIMIT: f64 = 0.5;

/// Relative size below which geometric quantities are treated as zero
pub const GEOMETRIC_TOLERANCE: f64 = 1.0e-12;

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_free_space_relations() {
        assert_relative_eq!(1.0 / (MU_0 * EPSILON_0).sqrt(), C, max_relative = 1e-12);
        assert_relative_eq!(ETA_0, 376.730313, max_relative = 1e-6);
    }
}
