//! Ingestion option parsing and validation.
//!
//! Readers accept a semicolon-separated `name=value` option string that
//! tunes what gets ingested (spectral band, time window, ...). This
//! crate parses that string into [`IngestionOptions`], serializes it
//! back losslessly, and validates parsed options against a reader's
//! [`OptionDefinition`] table.

pub mod definitions;
pub mod error;
pub mod options;

pub use definitions::{
    parse_datetime_value, validate_options, OptionDefinition, OptionValueType,
};
pub use error::{IngestionError, Result};
pub use options::IngestionOptions;
