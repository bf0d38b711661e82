//! Crate-wide error type.
//!
//! Configuration failures are recoverable (§7: "reject at load time; no
//! analysis runs") and are reported through [`crate::config::error::ConfigError`]
//! instead of this type. Everything here is either an I/O boundary error or
//! an internal-bug class that the analysis treats as fatal (§7).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::error::ConfigError),

    /// An internal invariant was violated (e.g. `field_map` requested of a
    /// non-representative, or `members` requested of a stale reference
    /// after finalization). §7 calls this "a programmer bug; fatal" — the
    /// caller should treat it as unrecoverable rather than retry.
    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl AnalysisError {
    pub fn internal(msg: impl Into<String>) -> Self {
        AnalysisError::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
