//! Per-variable resample classification.

use product_common::{DataType, DimensionKind, Variable};

/// How the regridder treats a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResampleCategory {
    /// No vertical dimension: left untouched.
    Skip,
    /// Cannot be meaningfully resampled: dropped with a warning.
    Remove,
    /// Level quantity: pointwise linear interpolation.
    Linear,
    /// Column quantity: interval (layer-overlap) interpolation.
    Interval,
}

/// Classify a variable by its structure and name.
///
/// Variables without a vertical axis are skipped. Variables with more
/// than one vertical axis (covariances, averaging kernels), string data,
/// an `_uncertainty`/`_avk` name suffix, or a vertical axis that is not
/// the last axis cannot be resampled and are removed. Of the remainder,
/// names containing `_column_` are column quantities resampled by layer
/// overlap; everything else is interpolated pointwise.
pub fn resample_category(variable: &Variable) -> ResampleCategory {
    let vertical_axes = variable.count_dimension(DimensionKind::Vertical);
    if vertical_axes == 0 {
        return ResampleCategory::Skip;
    }
    if vertical_axes > 1 {
        return ResampleCategory::Remove;
    }
    if variable.data_type() == DataType::Str {
        return ResampleCategory::Remove;
    }
    let name = variable.name();
    if name.ends_with("_uncertainty") || name.ends_with("_avk") {
        return ResampleCategory::Remove;
    }
    let vertical_is_last = variable
        .dimensions()
        .last()
        .map(|d| d.kind == DimensionKind::Vertical)
        .unwrap_or(false);
    if !vertical_is_last {
        return ResampleCategory::Remove;
    }
    if name.contains("_column_") {
        ResampleCategory::Interval
    } else {
        ResampleCategory::Linear
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use product_common::Variable;

    fn var(name: &str, dims: &[(DimensionKind, usize)]) -> Variable {
        Variable::new(name, DataType::Float64, dims).unwrap()
    }

    #[test]
    fn test_no_vertical_is_skip() {
        let v = var("latitude", &[(DimensionKind::Time, 2)]);
        assert_eq!(resample_category(&v), ResampleCategory::Skip);
    }

    #[test]
    fn test_two_vertical_axes_is_remove() {
        let v = var(
            "temperature_covariance",
            &[
                (DimensionKind::Time, 2),
                (DimensionKind::Vertical, 3),
                (DimensionKind::Vertical, 3),
            ],
        );
        assert_eq!(resample_category(&v), ResampleCategory::Remove);
    }

    #[test]
    fn test_suffix_heuristics() {
        let dims = [(DimensionKind::Time, 2), (DimensionKind::Vertical, 3)];
        assert_eq!(
            resample_category(&var("o3_uncertainty", &dims)),
            ResampleCategory::Remove
        );
        assert_eq!(
            resample_category(&var("o3_avk", &dims)),
            ResampleCategory::Remove
        );
        assert_eq!(
            resample_category(&var("o3_column_number_density", &dims)),
            ResampleCategory::Interval
        );
        assert_eq!(
            resample_category(&var("temperature", &dims)),
            ResampleCategory::Linear
        );
    }

    #[test]
    fn test_string_data_is_remove() {
        let v = Variable::new(
            "label",
            DataType::Str,
            &[(DimensionKind::Vertical, 3)],
        )
        .unwrap();
        assert_eq!(resample_category(&v), ResampleCategory::Remove);
    }

    #[test]
    fn test_vertical_not_last_is_remove() {
        let v = var(
            "altitude_bounds",
            &[
                (DimensionKind::Time, 2),
                (DimensionKind::Vertical, 3),
                (DimensionKind::Independent, 2),
            ],
        );
        assert_eq!(resample_category(&v), ResampleCategory::Remove);
    }
}
