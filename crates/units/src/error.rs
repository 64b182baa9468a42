//! Error types for unit parsing and conversion.

use thiserror::Error;

/// Errors that can occur while parsing or converting units.
#[derive(Error, Debug)]
pub enum UnitError {
    /// The unit string could not be parsed.
    #[error("could not parse unit '{0}'")]
    Parse(String),

    /// The two units measure different quantities.
    #[error("cannot convert from unit '{from}' to unit '{to}'")]
    Incompatible { from: String, to: String },

    /// The variable has no unit to convert from.
    #[error("variable '{0}' has no unit")]
    NoUnit(String),

    /// Unit conversion was applied to non-numeric data.
    #[error("invalid type: {0}")]
    InvalidType(String),
}

/// Result type for unit operations.
pub type Result<T> = std::result::Result<T, UnitError>;
