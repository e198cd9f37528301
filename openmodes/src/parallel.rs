//! Portable parallel iteration
//!
//! With the `parallel` feature the helpers run on rayon, inside the pool
//! configured by [`crate::core::set_threads`]. Without it they fall back to
//! sequential iteration with the same signatures.
//!
//! ```ignore
//! use crate::parallel::parallel_map_indexed;
//!
//! let squares: Vec<usize> = parallel_map_indexed(100, |i| i * i);
//! ```

use crate::core::threads::install;

/// Check if parallel processing is available
#[inline]
pub fn is_parallel_available() -> bool {
    cfg!(feature = "parallel")
}

/// Parallel map over a range of indices
#[cfg(feature = "parallel")]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    U: Send,
    F: Fn(usize) -> U + Sync + Send,
{
    use rayon::prelude::*;
    install(|| (0..count).into_par_iter().map(f).collect())
}

#[cfg(not(feature = "parallel"))]
pub fn parallel_map_indexed<U, F>(count: usize, f: F) -> Vec<U>
where
    F: Fn(usize) -> U,
{
    install(|| (0..count).map(f).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_map_indexed() {
        let result = parallel_map_indexed(5, |i| i * i);
        assert_eq!(result, vec![0, 1, 4, 9, 16]);
    }
}
