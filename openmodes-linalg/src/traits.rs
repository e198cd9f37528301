//! Scalar abstraction for the dense solvers
//!
//! [`ComplexField`] lets the LU and eigenvalue routines run on both the
//! complex impedance matrices and the real Gram matrices.

use num_complex::Complex64;
use num_traits::{Float, FromPrimitive, NumAssign, One, Zero};
use std::fmt::Debug;
use std::ops::Neg;

/// Scalar types usable by the dense routines in this crate.
///
/// Implemented for `Complex64` (impedance matrices) and `f64` (Gram
/// matrices, geometric quantities).
pub trait ComplexField:
    NumAssign + Clone + Copy + Send + Sync + Debug + Zero + One + Neg<Output = Self> + 'static
{
    /// The real number type underlying this field
    type Real: Float + NumAssign + FromPrimitive + Send + Sync + Debug + 'static;

    /// Complex conjugate
    fn conj(&self) -> Self;

    /// Squared magnitude |z|²
    fn norm_sqr(&self) -> Self::Real;

    /// Magnitude |z|
    fn norm(&self) -> Self::Real {
        self.norm_sqr().sqrt()
    }

    /// Create from a real value
    fn from_real(r: Self::Real) -> Self;

    /// Real part
    fn re(&self) -> Self::Real;

    /// Multiplicative inverse (1/z)
    fn inv(&self) -> Self;

    /// Square root (principal branch)
    fn sqrt(&self) -> Self;
}

/// Scalars accepted by [`lu_solve`](crate::lu_solve)
///
/// With the `ndarray-linalg` feature the solve goes through LAPACK, so the
/// scalar must also be a LAPACK type.
#[cfg(feature = "ndarray-linalg")]
pub trait SolveField: ComplexField + ndarray_linalg::Lapack {}

#[cfg(feature = "ndarray-linalg")]
impl<T: ComplexField + ndarray_linalg::Lapack> SolveField for T {}

/// Scalars accepted by [`lu_solve`](crate::lu_solve)
#[cfg(not(feature = "ndarray-linalg"))]
pub trait SolveField: ComplexField {}

#[cfg(not(feature = "ndarray-linalg"))]
impl<T: ComplexField> SolveField for T {}

impl ComplexField for Complex64 {
    type Real = f64;

    #[inline]
    fn conj(&self) -> Self {
        Complex64::conj(self)
    }

    #[inline]
    fn norm_sqr(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        Complex64::new(r, 0.0)
    }

    #[inline]
    fn re(&self) -> f64 {
        self.re
    }

    #[inline]
    fn inv(&self) -> Self {
        let denom = self.norm_sqr();
        Complex64::new(self.re / denom, -self.im / denom)
    }

    #[inline]
    fn sqrt(&self) -> Self {
        Complex64::sqrt(*self)
    }
}

impl ComplexField for f64 {
    type Real = f64;

    #[inline]
    fn conj(&self) -> Self {
        *self
    }

    #[inline]
    fn norm_sqr(&self) -> f64 {
        *self * *self
    }

    #[inline]
    fn from_real(r: f64) -> Self {
        r
    }

    #[inline]
    fn re(&self) -> f64 {
        *self
    }

    #[inline]
    fn inv(&self) -> Self {
        1.0 / *self
    }

    #[inline]
    fn sqrt(&self) -> Self {
        f64::sqrt(*self)
    }
}
