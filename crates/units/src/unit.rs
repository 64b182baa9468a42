//! Unit expressions as scaled products of base quantities.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::error::{Result, UnitError};

/// Number of base quantities tracked by the dimensional analysis:
/// length, mass, time, temperature, angle.
const NUM_BASE: usize = 5;

const DEG_TO_RAD: f64 = std::f64::consts::PI / 180.0;

/// A parsed unit: a linear map into base-SI quantities.
///
/// A value `v` in this unit equals `v * scale + offset` in the coherent
/// SI unit of the same dimension vector. Offsets appear only for plain
/// temperature units and are rejected inside compound expressions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unit {
    scale: f64,
    offset: f64,
    dims: [i8; NUM_BASE],
}

impl Unit {
    const fn base(scale: f64, dims: [i8; NUM_BASE]) -> Self {
        Self {
            scale,
            offset: 0.0,
            dims,
        }
    }

    const fn with_offset(scale: f64, offset: f64, dims: [i8; NUM_BASE]) -> Self {
        Self {
            scale,
            offset,
            dims,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn is_dimensionless(&self) -> bool {
        self.dims.iter().all(|&d| d == 0)
    }

    /// Whether the two units measure the same quantity.
    pub fn commensurable_with(&self, other: &Unit) -> bool {
        self.dims == other.dims
    }

    /// Whether converting between the two units is the identity.
    pub fn is_equivalent_to(&self, other: &Unit) -> bool {
        self.commensurable_with(other)
            && self.offset == other.offset
            && (self.scale - other.scale).abs() <= 1e-12 * self.scale.abs().max(other.scale.abs())
    }
}

static SYMBOLS: Lazy<HashMap<&'static str, Unit>> = Lazy::new(|| {
    // Dimension order: [length, mass, time, temperature, angle]
    let mut table = HashMap::new();
    table.insert("1", Unit::base(1.0, [0, 0, 0, 0, 0]));
    table.insert("m", Unit::base(1.0, [1, 0, 0, 0, 0]));
    table.insert("g", Unit::base(1.0e-3, [0, 1, 0, 0, 0]));
    table.insert("s", Unit::base(1.0, [0, 0, 1, 0, 0]));
    table.insert("min", Unit::base(60.0, [0, 0, 1, 0, 0]));
    table.insert("h", Unit::base(3600.0, [0, 0, 1, 0, 0]));
    table.insert("day", Unit::base(86400.0, [0, 0, 1, 0, 0]));
    table.insert("K", Unit::base(1.0, [0, 0, 0, 1, 0]));
    table.insert("degC", Unit::with_offset(1.0, 273.15, [0, 0, 0, 1, 0]));
    table.insert("Pa", Unit::base(1.0, [-1, 1, -2, 0, 0]));
    table.insert("bar", Unit::base(1.0e5, [-1, 1, -2, 0, 0]));
    table.insert("rad", Unit::base(1.0, [0, 0, 0, 0, 1]));
    table.insert("deg", Unit::base(DEG_TO_RAD, [0, 0, 0, 0, 1]));
    table.insert("degree", Unit::base(DEG_TO_RAD, [0, 0, 0, 0, 1]));
    table.insert("degree_north", Unit::base(DEG_TO_RAD, [0, 0, 0, 0, 1]));
    table.insert("degree_east", Unit::base(DEG_TO_RAD, [0, 0, 0, 0, 1]));
    // Counting units are dimensionless; a mole is Avogadro's number of
    // molecules, a Dobson unit is a fixed column number density.
    table.insert("molec", Unit::base(1.0, [0, 0, 0, 0, 0]));
    table.insert("mol", Unit::base(6.02214076e23, [0, 0, 0, 0, 0]));
    table.insert("DU", Unit::base(2.6867811e20, [-2, 0, 0, 0, 0]));
    table.insert("ppmv", Unit::base(1.0e-6, [0, 0, 0, 0, 0]));
    table.insert("ppbv", Unit::base(1.0e-9, [0, 0, 0, 0, 0]));
    table.insert("%", Unit::base(1.0e-2, [0, 0, 0, 0, 0]));
    table
});

fn prefix_factor(c: char) -> Option<f64> {
    match c {
        'n' => Some(1.0e-9),
        'u' => Some(1.0e-6),
        'm' => Some(1.0e-3),
        'c' => Some(1.0e-2),
        'd' => Some(1.0e-1),
        'h' => Some(1.0e2),
        'k' => Some(1.0e3),
        'M' => Some(1.0e6),
        'G' => Some(1.0e9),
        'T' => Some(1.0e12),
        _ => None,
    }
}

/// Resolve a bare symbol, trying an exact match before an SI prefix.
fn resolve_symbol(symbol: &str) -> Option<Unit> {
    if let Some(unit) = SYMBOLS.get(symbol) {
        return Some(*unit);
    }
    let mut chars = symbol.chars();
    let first = chars.next()?;
    let rest = chars.as_str();
    if rest.is_empty() {
        return None;
    }
    let factor = prefix_factor(first)?;
    let base = SYMBOLS.get(rest)?;
    if base.offset != 0.0 {
        return None;
    }
    Some(Unit::base(factor * base.scale, base.dims))
}

/// Split a term like `m2`, `s-1`, or `m^-3` into symbol and exponent.
fn split_term(term: &str) -> Option<(&str, i32)> {
    let bytes = term.as_bytes();
    let mut split = bytes.len();
    while split > 0 && (bytes[split - 1].is_ascii_digit()) {
        split -= 1;
    }
    if split > 0 && (bytes[split - 1] == b'-' || bytes[split - 1] == b'+') && split < bytes.len() {
        split -= 1;
    }
    let mut symbol = &term[..split];
    let exponent_str = &term[split..];
    if let Some(stripped) = symbol.strip_suffix('^') {
        symbol = stripped;
    }
    if symbol.is_empty() {
        // A bare number such as "1" is itself the symbol.
        return Some((term, 1));
    }
    let exponent = if exponent_str.is_empty() {
        1
    } else {
        exponent_str.parse::<i32>().ok()?
    };
    Some((symbol, exponent))
}

/// Parse a unit string into a [`Unit`].
///
/// Terms multiply when separated by whitespace, `.` or `*`; everything
/// after a `/` divides. Exponents are trailing signed integers with an
/// optional `^`. Parentheses are ignored (with the division convention
/// above they do not change the result for the grammar accepted here).
pub fn parse_unit(text: &str) -> Result<Unit> {
    let cleaned: String = text
        .chars()
        .map(|c| if c == '(' || c == ')' { ' ' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(UnitError::Parse(text.to_string()));
    }

    let mut result = Unit::base(1.0, [0; NUM_BASE]);
    let mut in_denominator = false;
    let mut num_terms = 0usize;
    let mut has_offset = false;

    for part in cleaned.split(|c: char| c.is_whitespace() || c == '.' || c == '*') {
        if part.is_empty() {
            continue;
        }
        for (i, term) in part.split('/').enumerate() {
            if i > 0 {
                in_denominator = true;
            }
            if term.is_empty() {
                continue;
            }
            let (symbol, exponent) =
                split_term(term).ok_or_else(|| UnitError::Parse(text.to_string()))?;
            let unit = resolve_symbol(symbol).ok_or_else(|| UnitError::Parse(text.to_string()))?;
            let exponent = if in_denominator { -exponent } else { exponent };
            if unit.offset != 0.0 {
                has_offset = true;
                if exponent != 1 {
                    return Err(UnitError::Parse(text.to_string()));
                }
                result.offset = unit.offset;
            }
            result.scale *= unit.scale.powi(exponent);
            for d in 0..NUM_BASE {
                result.dims[d] += unit.dims[d] * exponent as i8;
            }
            num_terms += 1;
        }
    }

    if num_terms == 0 {
        return Err(UnitError::Parse(text.to_string()));
    }
    // Offset units such as degC are only meaningful on their own.
    if has_offset && num_terms > 1 {
        return Err(UnitError::Parse(text.to_string()));
    }
    Ok(result)
}

/// An affine conversion between two commensurable units.
#[derive(Debug, Clone, Copy)]
pub struct Converter {
    scale: f64,
    offset: f64,
}

impl Converter {
    /// Build the converter from source to destination unit strings.
    pub fn new(from: &str, to: &str) -> Result<Converter> {
        let src = parse_unit(from)?;
        let dst = parse_unit(to)?;
        if !src.commensurable_with(&dst) {
            return Err(UnitError::Incompatible {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        Ok(Converter {
            scale: src.scale / dst.scale,
            offset: (src.offset - dst.offset) / dst.scale,
        })
    }

    /// Whether applying this converter is the identity.
    pub fn is_identity(&self) -> bool {
        self.offset == 0.0 && (self.scale - 1.0).abs() <= 1e-12
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        value * self.scale + self.offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_symbols() {
        assert!(parse_unit("m").is_ok());
        assert!(parse_unit("hPa").is_ok());
        assert!(parse_unit("molec/m2").is_ok());
        assert!(parse_unit("ug/g").is_ok());
        assert!(parse_unit("not_a_unit").is_err());
        assert!(parse_unit("").is_err());
    }

    #[test]
    fn test_exponents() {
        let per_m3 = parse_unit("m-3").unwrap();
        let per_m3_slash = parse_unit("1/m3").unwrap();
        assert!(per_m3.is_equivalent_to(&per_m3_slash));

        let m2 = parse_unit("m^2").unwrap();
        let km2 = parse_unit("km2").unwrap();
        let c = Converter::new("km2", "m^2").unwrap();
        assert!((c.apply(1.0) - 1.0e6).abs() < 1e-3);
        assert!(m2.commensurable_with(&km2));
    }

    #[test]
    fn test_hpa_to_pa() {
        let c = Converter::new("hPa", "Pa").unwrap();
        assert!((c.apply(1013.25) - 101325.0).abs() < 1e-6);
    }

    #[test]
    fn test_celsius_offset() {
        let c = Converter::new("degC", "K").unwrap();
        assert!((c.apply(0.0) - 273.15).abs() < 1e-9);
        let back = Converter::new("K", "degC").unwrap();
        assert!((back.apply(273.15) - 0.0).abs() < 1e-9);
        // Offset units are rejected inside compound expressions.
        assert!(parse_unit("degC/m").is_err());
    }

    #[test]
    fn test_incompatible_units() {
        assert!(matches!(
            Converter::new("m", "s"),
            Err(UnitError::Incompatible { .. })
        ));
    }

    #[test]
    fn test_dobson_units() {
        let c = Converter::new("DU", "molec/m2").unwrap();
        assert!((c.apply(1.0) - 2.6867811e20).abs() < 1e12);
    }

    #[test]
    fn test_dimensionless_one() {
        let one = parse_unit("1").unwrap();
        assert!(one.is_dimensionless());
        let c = Converter::new("%", "1").unwrap();
        assert!((c.apply(50.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_mixing_ratio() {
        let c = Converter::new("ppmv", "ppbv").unwrap();
        assert!((c.apply(1.0) - 1000.0).abs() < 1e-9);
        let d = Converter::new("ug/g", "1").unwrap();
        assert!((d.apply(1.0) - 1.0e-6).abs() < 1e-18);
    }
}
