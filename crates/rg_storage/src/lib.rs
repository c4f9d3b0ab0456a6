use rg_core::{Error, FeedCache, Result};
use std::sync::Arc;

pub mod backends;

pub use backends::*;

/// Names accepted by [`create_cache`].
pub const BACKENDS: &[&str] = &["memory"];

/// Builds the process-wide feed cache for the named backend.
pub fn create_cache(backend: &str) -> Result<Arc<dyn FeedCache>> {
    match backend {
        "memory" => Ok(Arc::new(MemoryCache::new())),
        other => Err(Error::Config(format!(
            "unsupported cache backend `{}` (available: {})",
            other,
            BACKENDS.join(", ")
        ))),
    }
}
