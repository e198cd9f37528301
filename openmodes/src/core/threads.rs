//! Worker pool shared by the integration kernels

use crate::error::{OpenModesError, Result};
use log::info;

#[cfg(feature = "parallel")]
use std::sync::{Arc, LazyLock, RwLock};

#[cfg(feature = "parallel")]
static POOL: LazyLock<RwLock<Option<Arc<rayon::ThreadPool>>>> = LazyLock::new(|| RwLock::new(None));

/// Set the number of worker threads used by all kernels
///
/// Replaces any previously configured pool. `n` must be at least 1.
#[cfg(feature = "parallel")]
pub fn set_threads(n: usize) -> Result<()> {
    if n == 0 {
        return Err(OpenModesError::InvalidParameters(
            "thread count must be at least 1".to_string(),
        ));
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(n)
        .build()
        .map_err(|e| OpenModesError::InvalidParameters(e.to_string()))?;
    let mut guard = POOL
        .write()
        .map_err(|_| OpenModesError::InvalidParameters("thread pool lock poisoned".to_string()))?;
    *guard = Some(Arc::new(pool));
    info!("Using {} worker threads", n);
    Ok(())
}

#[cfg(not(feature = "parallel"))]
pub fn set_threads(n: usize) -> Result<()> {
    if n == 0 {
        return Err(OpenModesError::InvalidParameters(
            "thread count must be at least 1".to_string(),
        ));
    }
    info!("Built without the parallel feature, ignoring request for {} threads", n);
    Ok(())
}

/// Number of worker threads the kernels will use
#[cfg(feature = "parallel")]
pub fn get_threads() -> usize {
    POOL.read()
        .ok()
        .and_then(|guard| guard.as_ref().map(|pool| pool.current_num_threads()))
        .unwrap_or_else(rayon::current_num_threads)
}

#[cfg(not(feature = "parallel"))]
pub fn get_threads() -> usize {
    1
}

/// Run `op` inside the configured pool, or the global one if none was set
#[cfg(feature = "parallel")]
pub(crate) fn install<R, F>(op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    let pool = POOL.read().ok().and_then(|guard| guard.clone());
    match pool {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn install<R, F>(op: F) -> R
where
    F: FnOnce() -> R,
{
    op()
}
