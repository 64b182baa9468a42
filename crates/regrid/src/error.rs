//! Error types for the regridding engine.

use thiserror::Error;

/// Errors that can occur during vertical regridding and smoothing.
#[derive(Error, Debug)]
pub enum RegridError {
    /// Error from the underlying data model.
    #[error(transparent)]
    Product(#[from] product_common::ProductError),

    /// Deriving an axis, bounds or kernel variable failed.
    #[error(transparent)]
    Derivation(#[from] derivation::DerivationError),

    /// Unit coercion failed.
    #[error(transparent)]
    Unit(#[from] units::UnitError),

    /// An interpolation kernel rejected its inputs.
    #[error(transparent)]
    Profile(#[from] profiles::ProfileError),

    /// An argument has an invalid value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialized collocation data has an invalid format.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Importing a matching product failed.
    #[error("import error: {0}")]
    Import(String),

    /// A CSV vertical-grid file could not be parsed.
    #[error("csv parse error: {0}")]
    CsvParse(String),

    /// The operation has no data to work on.
    #[error("no data: {0}")]
    NoData(String),

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegridError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a CsvParse error.
    pub fn csv_parse(msg: impl Into<String>) -> Self {
        Self::CsvParse(msg.into())
    }
}

/// Result type for regrid operations.
pub type Result<T> = std::result::Result<T, RegridError>;
