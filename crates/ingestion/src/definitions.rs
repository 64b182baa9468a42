//! Option definitions: which options a reader accepts and what values
//! they may take.

use chrono::{DateTime, Utc};

use crate::error::{IngestionError, Result};
use crate::options::IngestionOptions;

/// The value type an option accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OptionValueType {
    /// Any string value.
    #[default]
    Str,
    /// A signed integer.
    Int,
    /// A floating-point number.
    Float,
    /// An RFC 3339 date/time, e.g. `2024-01-01T00:00:00Z`.
    DateTime,
}

/// Definition of one ingestion option a reader accepts.
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    name: String,
    description: String,
    value_type: OptionValueType,
    allowed_values: Option<Vec<String>>,
}

impl OptionDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            value_type: OptionValueType::Str,
            allowed_values: None,
        }
    }

    /// Restrict the option to an explicit value set.
    pub fn with_allowed_values(mut self, values: &[&str]) -> Self {
        self.allowed_values = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Require values to parse as the given type.
    pub fn with_value_type(mut self, value_type: OptionValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn validate_value(&self, value: &str) -> Result<()> {
        if let Some(allowed) = &self.allowed_values {
            if !allowed.iter().any(|a| a == value) {
                return Err(IngestionError::InvalidOptionValue(format!(
                    "value '{}' is not valid for option '{}' (allowed: {})",
                    value,
                    self.name,
                    allowed.join(", ")
                )));
            }
        }
        let ok = match self.value_type {
            OptionValueType::Str => true,
            OptionValueType::Int => value.parse::<i64>().is_ok(),
            OptionValueType::Float => value.parse::<f64>().is_ok(),
            OptionValueType::DateTime => DateTime::parse_from_rfc3339(value).is_ok(),
        };
        if !ok {
            return Err(IngestionError::InvalidOptionValue(format!(
                "value '{}' of option '{}' is not a valid {}",
                value,
                self.name,
                match self.value_type {
                    OptionValueType::Str => "string",
                    OptionValueType::Int => "integer",
                    OptionValueType::Float => "number",
                    OptionValueType::DateTime => "date/time",
                }
            )));
        }
        Ok(())
    }
}

/// Validate parsed options against a reader's definitions.
///
/// Unknown names are rejected with `InvalidOption`; values outside an
/// option's allowed set or failing its type check with
/// `InvalidOptionValue`.
pub fn validate_options(
    options: &IngestionOptions,
    definitions: &[OptionDefinition],
) -> Result<()> {
    for (name, value) in options.iter() {
        let definition = definitions
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| {
                IngestionError::InvalidOption(format!("option '{}' is not supported", name))
            })?;
        definition.validate_value(value)?;
    }
    Ok(())
}

/// Parse an option value as an RFC 3339 date/time in UTC.
pub fn parse_datetime_value(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            IngestionError::InvalidOptionValue(format!("invalid date/time '{}': {}", value, e))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definitions() -> Vec<OptionDefinition> {
        vec![
            OptionDefinition::new("band", "spectral band to ingest")
                .with_allowed_values(&["uv", "vis", "nir"]),
            OptionDefinition::new("max_hour", "last forecast hour")
                .with_value_type(OptionValueType::Int),
            OptionDefinition::new("start", "start of the ingestion window")
                .with_value_type(OptionValueType::DateTime),
        ]
    }

    #[test]
    fn test_valid_options_pass() {
        let options =
            IngestionOptions::parse("band=uv;max_hour=48;start=2024-01-01T00:00:00Z").unwrap();
        validate_options(&options, &definitions()).unwrap();
    }

    #[test]
    fn test_unknown_option_rejected() {
        let options = IngestionOptions::parse("unknown=1").unwrap();
        assert!(matches!(
            validate_options(&options, &definitions()),
            Err(IngestionError::InvalidOption(_))
        ));
    }

    #[test]
    fn test_value_outside_allowed_set_rejected() {
        let options = IngestionOptions::parse("band=ir").unwrap();
        assert!(matches!(
            validate_options(&options, &definitions()),
            Err(IngestionError::InvalidOptionValue(_))
        ));
    }

    #[test]
    fn test_bad_typed_values_rejected() {
        let options = IngestionOptions::parse("max_hour=soon").unwrap();
        assert!(matches!(
            validate_options(&options, &definitions()),
            Err(IngestionError::InvalidOptionValue(_))
        ));
        let options = IngestionOptions::parse("start=yesterday").unwrap();
        assert!(matches!(
            validate_options(&options, &definitions()),
            Err(IngestionError::InvalidOptionValue(_))
        ));
    }

    #[test]
    fn test_parse_datetime_value() {
        let parsed = parse_datetime_value("2024-06-15T12:30:00Z").unwrap();
        assert_eq!(parsed.timezone(), Utc);
        assert!(parse_datetime_value("not-a-time").is_err());
    }
}
