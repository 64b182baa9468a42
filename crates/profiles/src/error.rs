//! Error types for profile algorithms.

use thiserror::Error;

/// Errors raised by interpolation and vertical-profile primitives.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// An argument has an invalid value (empty slice, bad length, …).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl ProfileError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
}

/// Result type for profile operations.
pub type Result<T> = std::result::Result<T, ProfileError>;
