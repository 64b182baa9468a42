//! Error types for variable derivation.

use thiserror::Error;

/// Errors raised by the conversion registry and the resolver.
#[derive(Error, Debug)]
pub enum DerivationError {
    /// The requested variable is not present and no conversion chain can
    /// produce it.
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// An argument has an invalid value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A conversion was registered with an invalid name.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Error from the underlying data model.
    #[error(transparent)]
    Product(#[from] product_common::ProductError),

    /// Unit coercion of a source or result failed.
    #[error(transparent)]
    Unit(#[from] units::UnitError),

    /// A conversion's compute function rejected its inputs.
    #[error(transparent)]
    Profile(#[from] profiles::ProfileError),

    /// Formatting failure while rendering the conversion tree.
    #[error("format error: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Result type for derivation operations.
pub type Result<T> = std::result::Result<T, DerivationError>;
