//! LU decomposition with partial pivoting
//!
//! Used for the impedance-matrix solves, for the inverse-iteration steps of
//! the pole search and for reducing generalised eigenproblems.

use crate::error::{LinalgError, Result};
use crate::traits::{ComplexField, SolveField};
use ndarray::{Array1, Array2};
#[cfg(feature = "ndarray-linalg")]
use ndarray_linalg::Solve;
use num_traits::{Float, FromPrimitive, One, Zero};

/// LU factorisation result
///
/// `lu` holds U on and above the diagonal and the unit-lower factor L below
/// it. Row `i` of the factorised matrix is row `pivots[i]` of the input.
#[derive(Debug, Clone)]
pub struct LuFactorization<T: ComplexField> {
    /// Combined L and U factors
    pub lu: Array2<T>,
    /// Row permutation applied during elimination
    pub pivots: Vec<usize>,
    /// Matrix dimension
    pub n: usize,
    /// Number of row swaps (sign of the permutation)
    swaps: usize,
}

impl<T: ComplexField> LuFactorization<T> {
    /// Solve `A x = b`
    pub fn solve(&self, b: &Array1<T>) -> Result<Array1<T>> {
        if b.len() != self.n {
            return Err(LinalgError::DimensionMismatch {
                expected: self.n,
                got: b.len(),
            });
        }

        let mut x: Array1<T> = Array1::from_iter(self.pivots.iter().map(|&p| b[p]));

        for i in 0..self.n {
            let mut acc = x[i];
            for j in 0..i {
                acc -= self.lu[[i, j]] * x[j];
            }
            x[i] = acc;
        }

        for i in (0..self.n).rev() {
            let mut acc = x[i];
            for j in (i + 1)..self.n {
                acc -= self.lu[[i, j]] * x[j];
            }
            let u_ii = self.lu[[i, i]];
            if u_ii.norm() == T::Real::zero() {
                return Err(LinalgError::SingularMatrix);
            }
            x[i] = acc * u_ii.inv();
        }

        Ok(x)
    }

    /// Solve `A X = B` column by column
    pub fn solve_matrix(&self, b: &Array2<T>) -> Result<Array2<T>> {
        if b.nrows() != self.n {
            return Err(LinalgError::DimensionMismatch {
                expected: self.n,
                got: b.nrows(),
            });
        }
        let mut out = Array2::zeros(b.raw_dim());
        for (col, rhs) in b.columns().into_iter().enumerate() {
            let x = self.solve(&rhs.to_owned())?;
            out.column_mut(col).assign(&x);
        }
        Ok(out)
    }

    /// Determinant of the factorised matrix
    pub fn determinant(&self) -> T {
        let mut det = T::one();
        for i in 0..self.n {
            det *= self.lu[[i, i]];
        }
        if self.swaps % 2 == 1 {
            -det
        } else {
            det
        }
    }

    /// Explicit inverse
    pub fn inverse(&self) -> Result<Array2<T>> {
        self.solve_matrix(&Array2::from_diag_elem(self.n, T::one()))
    }
}

/// Compute the LU factorisation of a square matrix
///
/// A pivot is treated as zero when it falls below `n·ε` times the largest
/// entry of the input.
pub fn lu_factorize<T: ComplexField>(a: &Array2<T>) -> Result<LuFactorization<T>> {
    let n = a.nrows();
    if n != a.ncols() {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let scale = a
        .iter()
        .map(|v| v.norm())
        .fold(T::Real::zero(), |acc, v| acc.max(v));
    let n_real = T::Real::from_usize(n.max(1)).unwrap_or_else(T::Real::one);
    let tiny = scale * n_real * T::Real::epsilon();

    let mut lu = a.clone();
    let mut pivots: Vec<usize> = (0..n).collect();
    let mut swaps = 0;

    for k in 0..n {
        let mut max_val = lu[[k, k]].norm();
        let mut max_row = k;
        for i in (k + 1)..n {
            let val = lu[[i, k]].norm();
            if val > max_val {
                max_val = val;
                max_row = i;
            }
        }

        if max_val <= tiny {
            return Err(LinalgError::SingularMatrix);
        }

        if max_row != k {
            for j in 0..n {
                lu.swap([k, j], [max_row, j]);
            }
            pivots.swap(k, max_row);
            swaps += 1;
        }

        let pivot_inv = lu[[k, k]].inv();
        for i in (k + 1)..n {
            let mult = lu[[i, k]] * pivot_inv;
            lu[[i, k]] = mult;
            if mult.norm() == T::Real::zero() {
                continue;
            }
            for j in (k + 1)..n {
                let update = mult * lu[[k, j]];
                lu[[i, j]] -= update;
            }
        }
    }

    Ok(LuFactorization {
        lu,
        pivots,
        n,
        swaps,
    })
}

/// Solve `A x = b` by LU decomposition
///
/// Uses LAPACK `getrf`/`getrs` when the `ndarray-linalg` feature is on and
/// the in-crate factorisation otherwise.
pub fn lu_solve<T: SolveField>(a: &Array2<T>, b: &Array1<T>) -> Result<Array1<T>> {
    #[cfg(feature = "ndarray-linalg")]
    {
        if a.nrows() != a.ncols() || b.len() != a.nrows() {
            return Err(LinalgError::DimensionMismatch {
                expected: a.nrows(),
                got: if a.nrows() != a.ncols() { a.ncols() } else { b.len() },
            });
        }
        a.solve_into(b.clone()).map_err(|_| LinalgError::SingularMatrix)
    }

    #[cfg(not(feature = "ndarray-linalg"))]
    {
        let factorization = lu_factorize(a)?;
        factorization.solve(b)
    }
}

/// Solve `A X = B` by LU decomposition
pub fn lu_solve_matrix<T: ComplexField>(a: &Array2<T>, b: &Array2<T>) -> Result<Array2<T>> {
    lu_factorize(a)?.solve_matrix(b)
}
