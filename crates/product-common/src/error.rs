//! Error types for the product data model.

use thiserror::Error;

/// Errors raised by the product and variable data model.
///
/// Every fallible operation in the workspace surfaces one of these kinds
/// (possibly wrapped by a higher-level crate error). Callers can attach an
/// annotation by wrapping the message; the inner cause always comes first.
#[derive(Error, Debug)]
pub enum ProductError {
    /// A referenced file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// Underlying I/O failure (open, read, write, close).
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An argument has an invalid value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An index argument is out of range.
    #[error("invalid index: {0}")]
    InvalidIndex(String),

    /// A name argument is empty or malformed.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// Data does not match the expected format.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A date/time value could not be interpreted.
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),

    /// An operation was applied to data of an unsupported type.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// The number of dimensions does not match.
    #[error("incorrect number of dimensions: {0}")]
    ArrayRankMismatch(String),

    /// An array access is out of bounds.
    #[error("array index out of bounds: {0}")]
    ArrayOutOfBounds(String),

    /// A variable is not present and could not be derived.
    #[error("variable not found: {0}")]
    VariableNotFound(String),

    /// Unit parsing or conversion failed.
    #[error("unit conversion error: {0}")]
    UnitConversion(String),

    /// The product violates a structural invariant.
    #[error("product error: {0}")]
    Product(String),

    /// The operation resulted in an empty product.
    #[error("no data: {0}")]
    NoData(String),

    /// The product type is not supported by this operation.
    #[error("unsupported product: {0}")]
    UnsupportedProduct(String),
}

impl ProductError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an InvalidType error.
    pub fn invalid_type(msg: impl Into<String>) -> Self {
        Self::InvalidType(msg.into())
    }

    /// Create a Product error.
    pub fn product(msg: impl Into<String>) -> Self {
        Self::Product(msg.into())
    }

    /// Create a VariableNotFound error.
    pub fn variable_not_found(msg: impl Into<String>) -> Self {
        Self::VariableNotFound(msg.into())
    }
}

/// Result type for product data model operations.
pub type Result<T> = std::result::Result<T, ProductError>;
