//! Element type tags for variable storage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type of a variable's data buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Int8,
    Int16,
    Int32,
    Float32,
    Float64,
    Str,
}

impl DataType {
    /// The canonical lowercase name of this type.
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int8 => "int8",
            DataType::Int16 => "int16",
            DataType::Int32 => "int32",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Str => "string",
        }
    }

    /// Whether values of this type can take part in numeric operations.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, DataType::Str)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_type_names() {
        assert_eq!(DataType::Int8.name(), "int8");
        assert_eq!(DataType::Float64.name(), "float64");
        assert_eq!(DataType::Str.name(), "string");
    }

    #[test]
    fn test_string_is_not_numeric() {
        assert!(DataType::Float32.is_numeric());
        assert!(DataType::Int16.is_numeric());
        assert!(!DataType::Str.is_numeric());
    }
}
