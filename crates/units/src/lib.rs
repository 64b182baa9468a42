//! Unit-string parsing and conversion for product variables.
//!
//! Units are parsed into scaled products of base quantities (length,
//! mass, time, temperature, angle) with SI-prefix support, so that
//! `hPa` ⇄ `Pa`, `km` ⇄ `m`, `ppmv` ⇄ `ppbv` and friends convert by
//! dimensional analysis rather than by a pair table. The variable-level
//! entry points operate on `product_common::Variable` in place.

pub mod error;
pub mod unit;

pub use error::{Result, UnitError};
pub use unit::{parse_unit, Converter, Unit};

use product_common::Variable;

/// Whether a conversion between the two unit strings exists.
pub fn can_convert(from: &str, to: &str) -> bool {
    Converter::new(from, to).is_ok()
}

/// Convert a single value between units.
pub fn convert_value(from: &str, to: &str, value: f64) -> Result<f64> {
    Ok(Converter::new(from, to)?.apply(value))
}

/// Whether the variable's unit equals `unit` after normalization.
///
/// Two spellings match when they parse to equivalent units (`"Pa"` and
/// `"Pa"`, but also `"deg"` and `"degree"`). Unparseable units fall back
/// to literal string comparison. A variable without a unit never matches.
pub fn variable_has_unit(variable: &Variable, unit: &str) -> bool {
    let Some(own) = variable.unit() else {
        return false;
    };
    match (parse_unit(own), parse_unit(unit)) {
        (Ok(a), Ok(b)) => a.is_equivalent_to(&b),
        _ => own == unit,
    }
}

/// Convert a variable's data to the given unit in place.
///
/// A conversion that parses to the identity is a no-op. The variable's
/// unit string is updated to the destination spelling. Errors with
/// `NoUnit` when the variable carries no unit and `InvalidType` for
/// string-typed data.
pub fn convert_variable(variable: &mut Variable, unit: &str) -> Result<()> {
    let own = variable
        .unit()
        .ok_or_else(|| UnitError::NoUnit(variable.name().to_string()))?
        .to_string();
    let converter = Converter::new(&own, unit)?;
    if converter.is_identity() {
        variable.set_unit(Some(unit.to_string()));
        return Ok(());
    }
    if !variable.data_type().is_numeric() {
        return Err(UnitError::InvalidType(format!(
            "cannot convert unit of string variable '{}'",
            variable.name()
        )));
    }
    for i in 0..variable.data().len() {
        let value = variable
            .data()
            .get_f64(i)
            .map_err(|e| UnitError::InvalidType(e.to_string()))?;
        variable
            .data_mut()
            .set_f64(i, converter.apply(value))
            .map_err(|e| UnitError::InvalidType(e.to_string()))?;
    }
    variable.set_unit(Some(unit.to_string()));
    Ok(())
}
