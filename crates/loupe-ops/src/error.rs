//! Error types for lens operations.

use thiserror::Error;

/// Error type for lens operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// An operation ran before the state it needs existed, e.g. extracting
    /// before an output was prepared or a source stored.
    #[error("lens session not ready: {0}")]
    NotReady(String),

    /// The requested region does not fit the prepared output.
    #[error("region out of bounds: {0}")]
    RegionOutOfBounds(String),

    /// A buffer-level failure from loupe-core.
    #[error(transparent)]
    Core(#[from] loupe_core::Error),
}

/// Result type for lens operations.
pub type OpsResult<T> = Result<T, OpsError>;
