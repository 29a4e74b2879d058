//! Error types for loupe-core operations.
//!
//! The [`Error`] enum covers the failure modes of buffer management:
//! geometry validation, caller-supplied buffer length checks, and
//! allocation failures. All of these are precondition-style errors; none
//! are transient, so there is no retry taxonomy.
//!
//! # Usage
//!
//! ```rust
//! use loupe_core::{Error, Result};
//!
//! fn check_dims(width: u32, height: u32) -> Result<()> {
//!     if width == 0 || height == 0 {
//!         return Err(Error::invalid_dimensions(width, height, "zero extent"));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing lens image buffers.
///
/// Uses [`thiserror`] for [`std::error::Error`] and [`std::fmt::Display`]
/// implementations.
#[derive(Debug, Error)]
pub enum Error {
    /// Width or height is unusable (zero, or large enough to overflow the
    /// byte-length computation).
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Why the dimensions were rejected
        reason: String,
    },

    /// A caller-supplied pixel buffer does not match the declared geometry.
    ///
    /// Checked before any byte is copied, so a mismatched store never reads
    /// past the caller's buffer.
    #[error("buffer size mismatch: expected {expected} bytes, got {got}")]
    BufferSizeMismatch {
        /// Bytes implied by the declared width and height
        expected: usize,
        /// Bytes actually supplied
        got: usize,
    },

    /// Memory for a replacement buffer could not be reserved.
    ///
    /// Surfaced as a distinct fatal kind; the previous buffer generation is
    /// left untouched when this is returned.
    #[error("failed to allocate {requested} bytes: {reason}")]
    AllocationFailed {
        /// Bytes requested
        requested: usize,
        /// Failure reason
        reason: String,
    },
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::BufferSizeMismatch`] error.
    #[inline]
    pub fn buffer_size_mismatch(expected: usize, got: usize) -> Self {
        Self::BufferSizeMismatch { expected, got }
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(requested: usize, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            requested,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this is a geometry error.
    #[inline]
    pub fn is_geometry_error(&self) -> bool {
        matches!(self, Self::InvalidDimensions { .. })
    }

    /// Returns `true` if this is an allocation error.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }
}
