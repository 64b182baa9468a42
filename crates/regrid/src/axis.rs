//! Helpers shared by the regridding paths: axis derivation, log-space
//! transforms and NaN-padding bookkeeping.

use derivation::{get_derived_variable, ConversionRegistry, DerivationError};
use product_common::{DataType, DimensionKind, Product, ProductError, Variable};

use crate::error::{RegridError, Result};

/// Length of a vertical column up to its NaN padding: the index after
/// the last non-NaN value. Padded columns are the wire format for
/// per-sample variable-length grids; every loop uses this instead of
/// recomputing its own notion of "valid length".
pub fn unpadded_len(row: &[f64]) -> usize {
    row.iter().rposition(|v| !v.is_nan()).map_or(0, |i| i + 1)
}

/// Whether interpolation along this axis happens in log space.
pub(crate) fn is_pressure_axis(name: &str) -> bool {
    name == "pressure"
}

/// Transform axis values to natural log, in place.
pub(crate) fn ln_values(values: &mut [f64]) {
    for value in values.iter_mut() {
        *value = value.ln();
    }
}

/// Borrow a variable's data as `&[f64]`.
pub(crate) fn f64_values(variable: &Variable) -> Result<&[f64]> {
    variable.data().as_f64_slice().ok_or_else(|| {
        RegridError::Product(ProductError::invalid_type(format!(
            "expected float64 data in variable '{}'",
            variable.name()
        )))
    })
}

/// Derive the source axis for a fixed-grid regrid: prefer the 1-D
/// `{vertical}` form, fall back to the 2-D `{time, vertical}` form.
pub(crate) fn derive_source_axis(
    registry: &ConversionRegistry,
    product: &Product,
    name: &str,
    unit: &str,
) -> Result<Variable> {
    match get_derived_variable(registry, product, name, Some(unit), &[DimensionKind::Vertical]) {
        Ok(mut axis) => {
            axis.convert_data_type(DataType::Float64)?;
            Ok(axis)
        }
        Err(DerivationError::VariableNotFound(_)) => {
            let mut axis = get_derived_variable(
                registry,
                product,
                name,
                Some(unit),
                &[DimensionKind::Time, DimensionKind::Vertical],
            )?;
            axis.convert_data_type(DataType::Float64)?;
            Ok(axis)
        }
        Err(error) => Err(error.into()),
    }
}

/// Read the `collocation_index` variable of a product as ids.
pub(crate) fn read_collocation_ids(product: &Product, expected_len: usize) -> Result<Vec<i64>> {
    let variable = product.get("collocation_index").ok_or_else(|| {
        RegridError::Product(ProductError::variable_not_found(
            "product has no 'collocation_index' variable",
        ))
    })?;
    if !variable.has_dimension_types(&[DimensionKind::Time]) {
        return Err(RegridError::Product(ProductError::product(
            "'collocation_index' must be a {time} variable",
        )));
    }
    let mut ids = Vec::with_capacity(expected_len);
    for i in 0..expected_len {
        ids.push(variable.data().get_f64(i).map_err(RegridError::Product)? as i64);
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpadded_len() {
        assert_eq!(unpadded_len(&[1.0, 2.0, 3.0]), 3);
        assert_eq!(unpadded_len(&[1.0, 2.0, f64::NAN]), 2);
        assert_eq!(unpadded_len(&[f64::NAN, 2.0, f64::NAN, f64::NAN]), 2);
        assert_eq!(unpadded_len(&[f64::NAN, f64::NAN]), 0);
        assert_eq!(unpadded_len(&[]), 0);
    }
}
