//! Error types for ingestion options.

use thiserror::Error;

/// Errors raised while parsing or validating ingestion options.
#[derive(Error, Debug)]
pub enum IngestionError {
    /// General ingestion failure.
    #[error("ingestion error: {0}")]
    Ingestion(String),

    /// The option string violates the `name=value;...` grammar.
    #[error("ingestion option syntax error: {0}")]
    OptionSyntax(String),

    /// The option name is not known to the reader.
    #[error("invalid ingestion option: {0}")]
    InvalidOption(String),

    /// The option value is not valid for this option.
    #[error("invalid ingestion option value: {0}")]
    InvalidOptionValue(String),
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
