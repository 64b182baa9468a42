//! Regridding and smoothing against a collocated matching product.
//!
//! Every sample of the product is resampled onto the per-sample vertical
//! grid of its collocation match, importing match products lazily (only
//! the most recent one is kept). Selected species can additionally be
//! smoothed with the match's averaging kernels and a priori profiles.

use std::collections::HashMap;

use tracing::{debug, warn};

use derivation::{get_derived_variable, ConversionRegistry, DerivationError};
use product_common::{DataType, DimensionKind, Product, ProductError, Variable};
use profiles::interpolate::{interpolate_intervals, interpolate_linear};

use crate::axis::{f64_values, is_pressure_axis, ln_values, read_collocation_ids, unpadded_len};
use crate::category::{resample_category, ResampleCategory};
use crate::collocation::{CollocationPair, CollocationResult};
use crate::error::{RegridError, Result};
use crate::import::ProductImporter;

/// State tied to the currently loaded match product. Dropped and rebuilt
/// whenever the collocation pairs move to another file.
struct MatchState {
    filename: String,
    product: Product,
    /// Target axis rows, log-transformed for pressure axes.
    grid_values: Vec<f64>,
    grid_vertical_len: usize,
    collocation_ids: Vec<i64>,
    /// Target layer bounds, derived lazily for column quantities.
    target_bounds: Option<Vec<f64>>,
    /// Averaging kernel and optional a priori per smoothed species.
    kernels: HashMap<String, (Variable, Option<Variable>)>,
}

fn load_match_state(
    registry: &ConversionRegistry,
    importer: &dyn ProductImporter,
    pair: &CollocationPair,
    axis_name: &str,
    axis_unit: &str,
) -> Result<MatchState> {
    let filename = &pair.metadata_b.filename;
    debug!("importing match product '{}'", filename);
    let product = importer
        .import(filename)
        .map_err(|e| RegridError::Import(format!("{}: {}", filename, e)))?;

    let mut grid = get_derived_variable(
        registry,
        &product,
        axis_name,
        Some(axis_unit),
        &[DimensionKind::Time, DimensionKind::Vertical],
    )?;
    grid.convert_data_type(DataType::Float64)?;
    let grid_vertical_len = grid.dimensions().last().map(|d| d.length).unwrap_or(0);
    let mut grid_values = f64_values(&grid)?.to_vec();
    if is_pressure_axis(axis_name) {
        ln_values(&mut grid_values);
    }

    let match_time_len = product
        .dimension_length(DimensionKind::Time)
        .ok_or_else(|| {
            RegridError::Product(ProductError::product(format!(
                "match product '{}' has no time dimension",
                filename
            )))
        })?;
    let collocation_ids = read_collocation_ids(&product, match_time_len)?;

    Ok(MatchState {
        filename: filename.clone(),
        product,
        grid_values,
        grid_vertical_len,
        collocation_ids,
        target_bounds: None,
        kernels: HashMap::new(),
    })
}

/// Resample every resamplable variable of `product` onto the per-sample
/// vertical grid of its collocation match, optionally smoothing the
/// named species with the match's averaging kernels.
///
/// `axis_name`/`axis_unit` name the vertical axis quantity shared by
/// both sides (for `pressure` the pointwise interpolation runs in log
/// space). The collocation result is filtered to this product's source
/// identifier and scanned by collocation id; match products are imported
/// lazily through `importer`, keeping only the most recent one.
///
/// On return the product's vertical axis length is the maximum match
/// grid length, with shorter columns NaN-padded.
pub fn regrid_vertical_with_collocated_product(
    registry: &ConversionRegistry,
    product: &mut Product,
    axis_name: &str,
    axis_unit: &str,
    collocations: &CollocationResult,
    importer: &dyn ProductImporter,
    smooth_species: &[String],
) -> Result<()> {
    let source_id = product
        .source_product()
        .ok_or_else(|| {
            RegridError::invalid_argument("product has no source product identifier")
        })?
        .to_string();
    let mut pairs = collocations.filtered_for_source_a(&source_id);
    if pairs.is_empty() {
        return Err(RegridError::NoData(format!(
            "no collocation pairs for source product '{}'",
            source_id
        )));
    }
    pairs.sort_by_collocation_index();

    let mut n_max = 0usize;
    for pair in pairs.pairs() {
        let length = pair
            .metadata_b
            .dimension_length(DimensionKind::Vertical)
            .ok_or_else(|| {
                RegridError::Product(ProductError::product(format!(
                    "collocation metadata for '{}' has no vertical length",
                    pair.metadata_b.filename
                )))
            })?;
        n_max = n_max.max(length);
    }
    if n_max == 0 {
        return Err(RegridError::NoData(
            "matching products have no vertical levels".to_string(),
        ));
    }

    let time_len = product
        .dimension_length(DimensionKind::Time)
        .ok_or_else(|| {
            RegridError::Product(ProductError::product("product has no time dimension"))
        })?;
    let pressure = is_pressure_axis(axis_name);

    // Drop what cannot be resampled and broadcast time-independent
    // vertical variables; reverse order keeps removal indices stable.
    let names: Vec<String> = product
        .variables()
        .iter()
        .rev()
        .map(|v| v.name().to_string())
        .collect();
    for name in names {
        let Some(variable) = product.get(&name) else {
            continue;
        };
        match resample_category(variable) {
            ResampleCategory::Skip => {}
            ResampleCategory::Remove => {
                warn!("removing variable '{}': cannot be regridded", name);
                product.remove_variable(&name)?;
            }
            ResampleCategory::Linear | ResampleCategory::Interval => {
                if let Some(variable) = product.get_mut(&name) {
                    variable.convert_data_type(DataType::Float64)?;
                    if variable.count_dimension(DimensionKind::Time) == 0 {
                        variable.add_dimension(0, DimensionKind::Time, time_len)?;
                    }
                }
            }
        }
    }

    // Snapshot the source axis before any sample row is overwritten.
    let mut grid_a = get_derived_variable(
        registry,
        product,
        axis_name,
        Some(axis_unit),
        &[DimensionKind::Time, DimensionKind::Vertical],
    )?;
    grid_a.convert_data_type(DataType::Float64)?;
    let nv_orig = grid_a.dimensions().last().map(|d| d.length).unwrap_or(0);
    if nv_orig == 0 {
        return Err(RegridError::NoData(
            "source axis has no vertical levels".to_string(),
        ));
    }
    let mut grid_a_values = f64_values(&grid_a)?.to_vec();
    if pressure {
        ln_values(&mut grid_a_values);
    }

    let plan: Vec<(String, ResampleCategory)> = product
        .variables()
        .iter()
        .map(|v| (v.name().to_string(), resample_category(v)))
        .collect();

    // Source-side layer bounds are derived up front (from the product's
    // still-unmodified state) when any column quantity is present.
    let source_bounds: Option<Vec<f64>> =
        if plan.iter().any(|(_, c)| *c == ResampleCategory::Interval) {
            let mut bounds = get_derived_variable(
                registry,
                product,
                &format!("{}_bounds", axis_name),
                Some(axis_unit),
                &[
                    DimensionKind::Time,
                    DimensionKind::Vertical,
                    DimensionKind::Independent,
                ],
            )?;
            bounds.convert_data_type(DataType::Float64)?;
            Some(f64_values(&bounds)?.to_vec())
        } else {
            None
        };

    if n_max > nv_orig {
        product.resize_dimension(DimensionKind::Vertical, n_max)?;
    }
    let padded_len = product
        .dimension_length(DimensionKind::Vertical)
        .unwrap_or(n_max);

    let collocation_ids = read_collocation_ids(product, time_len)?;

    let mut state: Option<MatchState> = None;
    let mut scratch = vec![f64::NAN; padded_len.max(n_max)];
    let mut smooth_buffer = vec![f64::NAN; padded_len.max(n_max)];
    let mut source_buffer = vec![0.0; nv_orig];

    for i in 0..time_len {
        let id = collocation_ids[i];
        let pair = pairs.find_pair(id).ok_or_else(|| {
            RegridError::Product(ProductError::product(format!(
                "no collocation pair with id {}",
                id
            )))
        })?;

        let reload = state
            .as_ref()
            .map_or(true, |s| s.filename != pair.metadata_b.filename);
        if reload {
            state = Some(load_match_state(
                registry, importer, pair, axis_name, axis_unit,
            )?);
        }
        let current = state.as_mut().ok_or_else(|| {
            RegridError::invalid_argument("no match product loaded")
        })?;

        let j = current
            .collocation_ids
            .iter()
            .position(|&b| b == id)
            .ok_or_else(|| {
                RegridError::Product(ProductError::product(format!(
                    "match product '{}' has no sample with collocation index {}",
                    current.filename, id
                )))
            })?;

        let axis_row = &grid_a_values[i * nv_orig..(i + 1) * nv_orig];
        let n_src = unpadded_len(axis_row);
        let target_row = &current.grid_values
            [j * current.grid_vertical_len..(j + 1) * current.grid_vertical_len];
        let n_tgt = unpadded_len(target_row);
        if n_tgt > padded_len {
            return Err(RegridError::Product(ProductError::product(format!(
                "match grid of '{}' has {} levels, product axis holds {}",
                current.filename, n_tgt, padded_len
            ))));
        }

        for (name, category) in &plan {
            if *category == ResampleCategory::Skip {
                continue;
            }

            if *category == ResampleCategory::Interval && current.target_bounds.is_none() {
                let mut bounds = get_derived_variable(
                    registry,
                    &current.product,
                    &format!("{}_bounds", axis_name),
                    Some(axis_unit),
                    &[
                        DimensionKind::Time,
                        DimensionKind::Vertical,
                        DimensionKind::Independent,
                    ],
                )?;
                bounds.convert_data_type(DataType::Float64)?;
                current.target_bounds = Some(f64_values(&bounds)?.to_vec());
            }

            let smooth = smooth_species.iter().any(|s| s == name);
            if smooth && !current.kernels.contains_key(name.as_str()) {
                let variable_unit = product
                    .get(name)
                    .and_then(|v| v.unit())
                    .map(str::to_string);
                let mut avk = get_derived_variable(
                    registry,
                    &current.product,
                    &format!("{}_avk", name),
                    None,
                    &[
                        DimensionKind::Time,
                        DimensionKind::Vertical,
                        DimensionKind::Vertical,
                    ],
                )?;
                avk.convert_data_type(DataType::Float64)?;
                let apriori = match get_derived_variable(
                    registry,
                    &current.product,
                    &format!("{}_apriori", name),
                    variable_unit.as_deref(),
                    &[DimensionKind::Time, DimensionKind::Vertical],
                ) {
                    Ok(mut apriori) => {
                        apriori.convert_data_type(DataType::Float64)?;
                        Some(apriori)
                    }
                    Err(DerivationError::VariableNotFound(_)) => None,
                    Err(error) => return Err(error.into()),
                };
                current.kernels.insert(name.clone(), (avk, apriori));
            }

            let variable = product.get_mut(name).ok_or_else(|| {
                RegridError::Product(ProductError::variable_not_found(name.clone()))
            })?;
            let nv = variable
                .dimensions()
                .last()
                .map(|d| d.length)
                .unwrap_or(0);
            if nv == 0 {
                continue;
            }
            let total_blocks = variable.num_elements() / nv;
            let blocks_per_time = total_blocks / time_len;
            let name_for_error = variable.name().to_string();
            let data = variable.data_mut().as_f64_slice_mut().ok_or_else(|| {
                RegridError::Product(ProductError::invalid_type(format!(
                    "expected float64 data in variable '{}'",
                    name_for_error
                )))
            })?;

            for m in 0..blocks_per_time {
                let offset = (i * blocks_per_time + m) * nv;
                let row = &mut data[offset..offset + nv];

                if n_src == 0 || n_tgt == 0 {
                    // Fully padded column on either side: no support.
                    for value in row.iter_mut() {
                        *value = f64::NAN;
                    }
                    continue;
                }

                match category {
                    ResampleCategory::Linear => {
                        source_buffer[..n_src].copy_from_slice(&row[..n_src]);
                        interpolate_linear(
                            &axis_row[..n_src],
                            &source_buffer[..n_src],
                            &target_row[..n_tgt],
                            false,
                            &mut scratch[..n_tgt],
                        )?;
                    }
                    ResampleCategory::Interval => {
                        let (Some(sb), Some(tb)) =
                            (source_bounds.as_ref(), current.target_bounds.as_ref())
                        else {
                            continue;
                        };
                        let sb_row =
                            &sb[i * 2 * nv_orig..i * 2 * nv_orig + 2 * n_src];
                        let tb_row = &tb[j * 2 * current.grid_vertical_len
                            ..j * 2 * current.grid_vertical_len + 2 * n_tgt];
                        source_buffer[..n_src].copy_from_slice(&row[..n_src]);
                        interpolate_intervals(
                            sb_row,
                            &source_buffer[..n_src],
                            tb_row,
                            &mut scratch[..n_tgt],
                        )?;
                    }
                    _ => {}
                }

                if smooth {
                    if let Some((avk, apriori)) = current.kernels.get(name.as_str()) {
                        let lb = avk
                            .dimensions()
                            .last()
                            .map(|d| d.length)
                            .unwrap_or(0);
                        let avk_data = f64_values(avk)?;
                        let apriori_data = match apriori {
                            Some(a) => Some(f64_values(a)?),
                            None => None,
                        };
                        let base = j * lb * lb;
                        let at = |data: Option<&[f64]>, c: usize| -> f64 {
                            let value = data.map_or(0.0, |a| a[j * lb + c]);
                            if value.is_nan() {
                                0.0
                            } else {
                                value
                            }
                        };
                        for r in 0..n_tgt {
                            let mut sum = 0.0;
                            for c in 0..n_tgt {
                                let term = scratch[c] - at(apriori_data, c);
                                // NaN inputs contribute zero.
                                if !term.is_nan() {
                                    sum += avk_data[base + r * lb + c] * term;
                                }
                            }
                            smooth_buffer[r] = sum + at(apriori_data, r);
                        }
                        scratch[..n_tgt].copy_from_slice(&smooth_buffer[..n_tgt]);
                    }
                }

                row[..n_tgt].copy_from_slice(&scratch[..n_tgt]);
                for value in &mut row[n_tgt..] {
                    *value = f64::NAN;
                }
            }
        }
    }

    // The regridded columns live on grids no longer than the widest
    // match grid; drop any excess padding.
    if product
        .dimension_length(DimensionKind::Vertical)
        .map_or(false, |l| l > n_max)
    {
        product.resize_dimension(DimensionKind::Vertical, n_max)?;
    }
    Ok(())
}
