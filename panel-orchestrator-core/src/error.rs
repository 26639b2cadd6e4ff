//! Unified error type definition

use serde::Serialize;
use thiserror::Error;

// Re-export library error type
pub use panel_orchestrator_client::ClientError;

/// Core layer error type
///
/// Only *fatal* conditions surface as `CoreError`: malformed input before
/// the run, and remote failures outside the per-item recovery path
/// (authentication, snapshot prefetch). Per-item creation failures are
/// handled inside the stage runner and never abort the pipeline.
#[derive(Error, Debug, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum CoreError {
    /// Migration input is unreadable, not a list, or missing required fields
    #[error("Invalid migration input: {0}")]
    InvalidInput(String),

    /// Remote client error (converted from the client library)
    #[error("{0}")]
    Client(#[from] ClientError),
}

impl CoreError {
    /// Whether it is expected behavior (user input, resource state), used
    /// for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error`
    /// when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::InvalidInput(_) => true,
            Self::Client(e) => e.is_expected(),
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
