//! Loading fixed vertical grids from CSV files.
//!
//! The format is a header line `name [unit]` followed by one decimal
//! number per line. Only `altitude` and `pressure` grids are accepted.

use std::path::Path;

use product_common::{DimensionKind, Variable};

use crate::error::{RegridError, Result};

/// Parse a vertical grid from CSV text.
pub fn parse_vertical_grid(text: &str) -> Result<Variable> {
    let mut lines = text.lines();
    let header = lines
        .next()
        .ok_or_else(|| RegridError::csv_parse("missing header line"))?;

    let mut tokens = header.split_whitespace();
    let name = tokens
        .next()
        .ok_or_else(|| RegridError::csv_parse("missing grid name in header"))?;
    if name != "altitude" && name != "pressure" {
        return Err(RegridError::CsvParse(format!(
            "unsupported grid name '{}' (expected 'altitude' or 'pressure')",
            name
        )));
    }
    let unit = tokens
        .next()
        .ok_or_else(|| RegridError::csv_parse("missing unit in header"))?;
    let unit = unit
        .strip_prefix('[')
        .and_then(|u| u.strip_suffix(']'))
        .ok_or_else(|| {
            RegridError::CsvParse(format!("unit '{}' is not bracketed", unit))
        })?;
    if let Some(extra) = tokens.next() {
        return Err(RegridError::CsvParse(format!(
            "unexpected token '{}' in header",
            extra
        )));
    }

    let mut values = Vec::new();
    for (number, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: f64 = line.parse().map_err(|_| {
            RegridError::CsvParse(format!("line {}: invalid number '{}'", number + 2, line))
        })?;
        values.push(value);
    }
    if values.is_empty() {
        return Err(RegridError::csv_parse("grid has no values"));
    }

    let length = values.len();
    let variable = Variable::from_f64(name, &[(DimensionKind::Vertical, length)], values)?
        .with_unit(unit);
    Ok(variable)
}

/// Read a vertical grid from a CSV file.
pub fn read_vertical_grid(path: impl AsRef<Path>) -> Result<Variable> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            RegridError::Product(product_common::ProductError::FileNotFound(
                path.display().to_string(),
            ))
        } else {
            RegridError::Io(e)
        }
    })?;
    parse_vertical_grid(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_altitude_grid() {
        let grid = parse_vertical_grid("altitude [km]\n0.5\n1.5\n2.5\n").unwrap();
        assert_eq!(grid.name(), "altitude");
        assert_eq!(grid.unit(), Some("km"));
        assert!(grid.has_dimension_types(&[DimensionKind::Vertical]));
        assert_eq!(grid.data().as_f64_slice().unwrap(), &[0.5, 1.5, 2.5]);
    }

    #[test]
    fn test_reject_unknown_name() {
        assert!(matches!(
            parse_vertical_grid("temperature [K]\n200\n"),
            Err(RegridError::CsvParse(_))
        ));
    }

    #[test]
    fn test_reject_unbracketed_unit() {
        assert!(matches!(
            parse_vertical_grid("altitude km\n1.0\n"),
            Err(RegridError::CsvParse(_))
        ));
    }

    #[test]
    fn test_reject_bad_number() {
        assert!(matches!(
            parse_vertical_grid("pressure [hPa]\n1000\nxyz\n"),
            Err(RegridError::CsvParse(_))
        ));
    }

    #[test]
    fn test_reject_empty_grid() {
        assert!(matches!(
            parse_vertical_grid("pressure [hPa]\n"),
            Err(RegridError::CsvParse(_))
        ));
    }
}
