//! Direct solvers

pub mod lu;

pub use lu::{lu_factorize, lu_solve, lu_solve_matrix, LuFactorization};
