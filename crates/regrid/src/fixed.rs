//! Regridding onto a fixed vertical axis.

use tracing::{debug, warn};

use derivation::{get_derived_variable, ConversionRegistry};
use product_common::{DataType, DimensionKind, Product, ProductError, Variable};
use profiles::interpolate::{interpolate_intervals, interpolate_linear};
use profiles::vertical::{altitude_bounds_from_altitude, pressure_bounds_from_pressure};

use crate::axis::{derive_source_axis, f64_values, is_pressure_axis, ln_values, unpadded_len};
use crate::category::{resample_category, ResampleCategory};
use crate::error::{RegridError, Result};

/// Layer bounds for a fixed target grid, in the axis's linear space.
fn target_bounds_for(name: &str, values: &[f64]) -> Result<Vec<f64>> {
    let mut bounds = vec![0.0; 2 * values.len()];
    if is_pressure_axis(name) {
        pressure_bounds_from_pressure(values, &mut bounds)?;
    } else {
        altitude_bounds_from_altitude(values, &mut bounds)?;
    }
    Ok(bounds)
}

/// Deferred mutation of the product, applied once every replacement
/// buffer has been computed so a failure leaves the product unchanged.
enum Action {
    Remove(String),
    Replace(Variable),
}

/// Resample every resamplable variable of `product` onto the fixed
/// vertical axis `target_axis` (a 1-D `{vertical}` variable with a
/// unit).
///
/// The source axis with the same name is derived from the product,
/// preferring the 1-D form and falling back to `{time, vertical}`.
/// Level quantities interpolate pointwise (in log space for pressure
/// axes), `_column_` quantities by layer overlap; variables that cannot
/// be resampled are dropped with a warning. Afterwards the axis
/// variable is replaced by a copy of `target_axis` and the product's
/// vertical length is the target length.
pub fn regrid_vertical_with_axis(
    registry: &ConversionRegistry,
    product: &mut Product,
    target_axis: &Variable,
) -> Result<()> {
    if !target_axis.has_dimension_types(&[DimensionKind::Vertical]) {
        return Err(RegridError::invalid_argument(
            "target axis must be a 1-D {vertical} variable",
        ));
    }
    let unit = target_axis.unit().ok_or_else(|| {
        RegridError::invalid_argument("target axis has no unit")
    })?;

    let mut target = target_axis.clone();
    target.convert_data_type(DataType::Float64)?;
    let target_values = f64_values(&target)?.to_vec();
    let n_target = target_values.len();
    let pressure = is_pressure_axis(target.name());
    let mut target_interp = target_values.clone();
    if pressure {
        ln_values(&mut target_interp);
    }

    let source_axis = derive_source_axis(registry, product, target.name(), unit)?;
    let axis_time_dependent = source_axis.num_dimensions() == 2;
    let source_values = f64_values(&source_axis)?.to_vec();
    let source_vertical_len = source_axis
        .dimensions()
        .last()
        .map(|d| d.length)
        .unwrap_or(0);
    if source_vertical_len == 0 {
        return Err(RegridError::NoData(
            "source axis has no vertical levels".to_string(),
        ));
    }
    let time_len = if axis_time_dependent {
        product.dimension_length(DimensionKind::Time).ok_or_else(|| {
            RegridError::Product(ProductError::product("product has no time dimension"))
        })?
    } else {
        1
    };

    // Derived lazily, only when a column quantity is present.
    let mut target_bounds: Option<Vec<f64>> = None;
    let mut source_bounds: Option<Vec<f64>> = None;

    let mut actions: Vec<Action> = Vec::new();
    let mut axis_buffer = vec![0.0; source_vertical_len];

    for variable in product.variables() {
        if variable.name() == target.name() {
            continue;
        }
        let category = resample_category(variable);
        match category {
            ResampleCategory::Skip => continue,
            ResampleCategory::Remove => {
                actions.push(Action::Remove(variable.name().to_string()));
                continue;
            }
            ResampleCategory::Linear | ResampleCategory::Interval => {}
        }

        let mut working = variable.clone();
        working.convert_data_type(DataType::Float64)?;
        if axis_time_dependent && working.count_dimension(DimensionKind::Time) == 0 {
            working.add_dimension(0, DimensionKind::Time, time_len)?;
        }

        let Some(last) = working.dimensions().last().copied() else {
            continue;
        };
        let nv = last.length;
        if nv == 0 {
            continue;
        }
        let values = f64_values(&working)?;
        let total_blocks = values.len() / nv;
        let blocks_per_time = if axis_time_dependent {
            total_blocks / time_len
        } else {
            total_blocks
        };

        if category == ResampleCategory::Interval {
            if target_bounds.is_none() {
                target_bounds = Some(target_bounds_for(target.name(), &target_values)?);
            }
            if source_bounds.is_none() {
                let bounds_name = format!("{}_bounds", target.name());
                let bounds_dims: &[DimensionKind] = if axis_time_dependent {
                    &[
                        DimensionKind::Time,
                        DimensionKind::Vertical,
                        DimensionKind::Independent,
                    ]
                } else {
                    &[DimensionKind::Vertical, DimensionKind::Independent]
                };
                let mut bounds = get_derived_variable(
                    registry,
                    product,
                    &bounds_name,
                    Some(unit),
                    bounds_dims,
                )?;
                bounds.convert_data_type(DataType::Float64)?;
                source_bounds = Some(f64_values(&bounds)?.to_vec());
            }
        }

        let mut output = vec![f64::NAN; total_blocks * n_target];
        for block in 0..total_blocks {
            let t = if axis_time_dependent {
                block / blocks_per_time
            } else {
                0
            };
            let axis_row = if axis_time_dependent {
                &source_values[t * source_vertical_len..(t + 1) * source_vertical_len]
            } else {
                &source_values[..]
            };
            let n_src = unpadded_len(axis_row);
            if n_src == 0 {
                continue;
            }
            let row = &values[block * nv..block * nv + n_src];
            let out = &mut output[block * n_target..(block + 1) * n_target];

            match category {
                ResampleCategory::Linear => {
                    let axis_src: &[f64] = if pressure {
                        axis_buffer[..n_src].copy_from_slice(&axis_row[..n_src]);
                        ln_values(&mut axis_buffer[..n_src]);
                        &axis_buffer[..n_src]
                    } else {
                        &axis_row[..n_src]
                    };
                    interpolate_linear(axis_src, row, &target_interp, false, out)?;
                }
                ResampleCategory::Interval => {
                    // Bounds interpolate on the linear axis even when the
                    // pointwise path uses log space.
                    let (Some(sb), Some(tb)) = (source_bounds.as_ref(), target_bounds.as_ref())
                    else {
                        continue;
                    };
                    let sb_row = &sb[t * 2 * source_vertical_len
                        ..t * 2 * source_vertical_len + 2 * n_src];
                    interpolate_intervals(sb_row, row, tb, out)?;
                }
                _ => {}
            }
        }

        // Same shape, vertical axis replaced by the target length.
        let out_dims: Vec<(DimensionKind, usize)> = working
            .dimensions()
            .iter()
            .map(|d| {
                if d.kind == DimensionKind::Vertical {
                    (d.kind, n_target)
                } else {
                    (d.kind, d.length)
                }
            })
            .collect();
        let mut replacement = Variable::from_f64(working.name(), &out_dims, output)?;
        replacement.set_unit(working.unit().map(str::to_string));
        actions.push(Action::Replace(replacement));
    }

    // Commit: every replacement buffer exists, so the product cannot be
    // left half-regridded by a failure above.
    for action in actions {
        match action {
            Action::Remove(name) => {
                warn!("removing variable '{}': cannot be regridded", name);
                product.remove_variable(&name)?;
            }
            Action::Replace(variable) => {
                product.replace_variable(variable)?;
            }
        }
    }

    debug!(
        "regridded product onto fixed {} axis with {} levels",
        target.name(),
        n_target
    );
    if product.has_variable(target.name()) {
        product.replace_variable(target_axis.clone())?;
    } else {
        product.add_variable(target_axis.clone())?;
    }
    Ok(())
}
