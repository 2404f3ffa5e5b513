//! Library-facing error types.
//!
//! The pipeline stages themselves are total: unknown IPA symbols are
//! dropped, not rejected. The one place that genuinely fails is loading a
//! phoneme table asset, so that boundary gets a real typed error instead of
//! threading `anyhow` through the whole crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read phoneme table asset: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse phoneme table asset: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("phoneme table asset defines no entries")]
    Empty,
}
