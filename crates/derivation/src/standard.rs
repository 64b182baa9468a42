//! The standard conversion set.
//!
//! Registrations follow the physics in the `profiles` crate: ideal-gas
//! scaling between mixing ratio and number density, exact geopotential
//! relations, layer-bound construction and partial-column integration.
//! Within one output name the exact retrievals are registered before the
//! model-based approximations; the resolver's insertion-order tie-break
//! turns that into a preference.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicBool, Ordering};

use product_common::{DataType, DimensionKind, ProductError, Variable};
use profiles::vertical::{
    altitude_bounds_from_altitude, altitude_from_gph, column_from_partial_column,
    gph_from_altitude, gph_from_pressure, number_density_per_vmr, pressure_bounds_from_pressure,
};

use crate::conversion::Conversion;
use crate::error::{DerivationError, Result};
use crate::registry::{ConversionRegistry, ConversionRegistryBuilder};

static MODEL_APPROXIMATIONS: AtomicBool = AtomicBool::new(true);

/// Enable or disable the model-based approximation conversions
/// process-wide (they are enabled by default).
pub fn set_model_approximations_enabled(enabled: bool) {
    MODEL_APPROXIMATIONS.store(enabled, Ordering::Relaxed);
}

/// Whether model-based approximation conversions are currently enabled.
pub fn model_approximations_enabled() -> bool {
    MODEL_APPROXIMATIONS.load(Ordering::Relaxed)
}

fn values<'v>(variable: &'v Variable) -> Result<&'v [f64]> {
    variable.data().as_f64_slice().ok_or_else(|| {
        DerivationError::Product(ProductError::invalid_type(format!(
            "expected float64 data in variable '{}'",
            variable.name()
        )))
    })
}

fn values_mut(variable: &mut Variable) -> Result<&mut [f64]> {
    let name = variable.name().to_string();
    variable.data_mut().as_f64_slice_mut().ok_or_else(|| {
        DerivationError::Product(ProductError::invalid_type(format!(
            "expected float64 data in variable '{}'",
            name
        )))
    })
}

const TIME_VERTICAL: [DimensionKind; 2] = [DimensionKind::Time, DimensionKind::Vertical];
const VERTICAL_BOUNDS: [DimensionKind; 2] = [DimensionKind::Vertical, DimensionKind::Independent];
const TIME_VERTICAL_BOUNDS: [DimensionKind; 3] = [
    DimensionKind::Time,
    DimensionKind::Vertical,
    DimensionKind::Independent,
];

fn register_all(builder: &mut ConversionRegistryBuilder) -> Result<()> {
    // number density from volume mixing ratio (ideal gas)
    builder.register(
        Conversion::new(
            "number_density",
            DataType::Float64,
            Some("molec/m3"),
            &TIME_VERTICAL,
            Box::new(|output, sources| {
                let vmr = values(sources[0])?;
                let pressure = values(sources[1])?;
                let temperature = values(sources[2])?;
                let out = values_mut(output)?;
                for i in 0..out.len() {
                    out[i] = vmr[i] * number_density_per_vmr(pressure[i], temperature[i]);
                }
                Ok(())
            }),
        )
        .with_source("volume_mixing_ratio", DataType::Float64, Some("ppmv"), &TIME_VERTICAL)
        .with_source("pressure", DataType::Float64, Some("hPa"), &TIME_VERTICAL)
        .with_source("temperature", DataType::Float64, Some("K"), &TIME_VERTICAL)
        .with_note("ideal gas law at the measured pressure and temperature"),
    )?;

    // volume mixing ratio from number density (inverse)
    builder.register(
        Conversion::new(
            "volume_mixing_ratio",
            DataType::Float64,
            Some("ppmv"),
            &TIME_VERTICAL,
            Box::new(|output, sources| {
                let density = values(sources[0])?;
                let pressure = values(sources[1])?;
                let temperature = values(sources[2])?;
                let out = values_mut(output)?;
                for i in 0..out.len() {
                    out[i] = density[i] / number_density_per_vmr(pressure[i], temperature[i]);
                }
                Ok(())
            }),
        )
        .with_source("number_density", DataType::Float64, Some("molec/m3"), &TIME_VERTICAL)
        .with_source("pressure", DataType::Float64, Some("hPa"), &TIME_VERTICAL)
        .with_source("temperature", DataType::Float64, Some("K"), &TIME_VERTICAL)
        .with_note("ideal gas law at the measured pressure and temperature"),
    )?;

    // altitude from geopotential height and latitude (exact)
    builder.register(
        Conversion::new(
            "altitude",
            DataType::Float64,
            Some("m"),
            &TIME_VERTICAL,
            Box::new(|output, sources| {
                let num_vertical = output.dimensions()[1].length;
                let gph = values(sources[0])?;
                let latitude = values(sources[1])?;
                let out = values_mut(output)?;
                for (i, &lat) in latitude.iter().enumerate() {
                    for j in 0..num_vertical {
                        let index = i * num_vertical + j;
                        out[index] = altitude_from_gph(gph[index], lat);
                    }
                }
                Ok(())
            }),
        )
        .with_source("gph", DataType::Float64, Some("m"), &TIME_VERTICAL)
        .with_source("latitude", DataType::Float64, Some("degree_north"), &[DimensionKind::Time]),
    )?;

    // geopotential height from altitude and latitude (exact)
    builder.register(
        Conversion::new(
            "gph",
            DataType::Float64,
            Some("m"),
            &TIME_VERTICAL,
            Box::new(|output, sources| {
                let num_vertical = output.dimensions()[1].length;
                let altitude = values(sources[0])?;
                let latitude = values(sources[1])?;
                let out = values_mut(output)?;
                for (i, &lat) in latitude.iter().enumerate() {
                    for j in 0..num_vertical {
                        let index = i * num_vertical + j;
                        out[index] = gph_from_altitude(altitude[index], lat);
                    }
                }
                Ok(())
            }),
        )
        .with_source("altitude", DataType::Float64, Some("m"), &TIME_VERTICAL)
        .with_source("latitude", DataType::Float64, Some("degree_north"), &[DimensionKind::Time]),
    )?;

    // geopotential height from pressure alone (model-based fallback)
    builder.register(
        Conversion::new(
            "gph",
            DataType::Float64,
            Some("m"),
            &TIME_VERTICAL,
            Box::new(|output, sources| {
                let pressure = values(sources[0])?;
                let out = values_mut(output)?;
                for i in 0..out.len() {
                    out[i] = gph_from_pressure(pressure[i]);
                }
                Ok(())
            }),
        )
        .with_source("pressure", DataType::Float64, Some("hPa"), &TIME_VERTICAL)
        .with_enabled(Box::new(model_approximations_enabled))
        .with_note("model-based approximation using the standard atmosphere"),
    )?;

    // layer bounds from level profiles, 1-D and 2-D variants
    builder.register(
        Conversion::new(
            "altitude_bounds",
            DataType::Float64,
            Some("m"),
            &VERTICAL_BOUNDS,
            Box::new(|output, sources| {
                let altitude = values(sources[0])?;
                let out = values_mut(output)?;
                altitude_bounds_from_altitude(altitude, out)?;
                Ok(())
            }),
        )
        .with_independent_length(2)
        .with_source("altitude", DataType::Float64, Some("m"), &[DimensionKind::Vertical])
        .with_note("layer bounds from adjacent level midpoints"),
    )?;

    builder.register(
        Conversion::new(
            "altitude_bounds",
            DataType::Float64,
            Some("m"),
            &TIME_VERTICAL_BOUNDS,
            Box::new(|output, sources| {
                let num_vertical = output.dimensions()[1].length;
                let altitude = values(sources[0])?;
                let out = values_mut(output)?;
                if num_vertical == 0 {
                    return Ok(());
                }
                for (row, bounds) in altitude
                    .chunks_exact(num_vertical)
                    .zip(out.chunks_exact_mut(2 * num_vertical))
                {
                    altitude_bounds_from_altitude(row, bounds)?;
                }
                Ok(())
            }),
        )
        .with_independent_length(2)
        .with_source("altitude", DataType::Float64, Some("m"), &TIME_VERTICAL)
        .with_note("layer bounds from adjacent level midpoints"),
    )?;

    builder.register(
        Conversion::new(
            "pressure_bounds",
            DataType::Float64,
            Some("hPa"),
            &VERTICAL_BOUNDS,
            Box::new(|output, sources| {
                let pressure = values(sources[0])?;
                let out = values_mut(output)?;
                pressure_bounds_from_pressure(pressure, out)?;
                Ok(())
            }),
        )
        .with_independent_length(2)
        .with_source("pressure", DataType::Float64, Some("hPa"), &[DimensionKind::Vertical])
        .with_note("layer bounds from geometric means of adjacent levels"),
    )?;

    builder.register(
        Conversion::new(
            "pressure_bounds",
            DataType::Float64,
            Some("hPa"),
            &TIME_VERTICAL_BOUNDS,
            Box::new(|output, sources| {
                let num_vertical = output.dimensions()[1].length;
                let pressure = values(sources[0])?;
                let out = values_mut(output)?;
                if num_vertical == 0 {
                    return Ok(());
                }
                for (row, bounds) in pressure
                    .chunks_exact(num_vertical)
                    .zip(out.chunks_exact_mut(2 * num_vertical))
                {
                    pressure_bounds_from_pressure(row, bounds)?;
                }
                Ok(())
            }),
        )
        .with_independent_length(2)
        .with_source("pressure", DataType::Float64, Some("hPa"), &TIME_VERTICAL)
        .with_note("layer bounds from geometric means of adjacent levels"),
    )?;

    // total column from number density and layer thickness
    builder.register(
        Conversion::new(
            "column_number_density",
            DataType::Float64,
            Some("molec/m2"),
            &[DimensionKind::Time],
            Box::new(|output, sources| {
                let density = values(sources[0])?;
                let bounds = values(sources[1])?;
                let out = values_mut(output)?;
                if out.is_empty() {
                    return Ok(());
                }
                let num_vertical = density.len() / out.len();
                let mut partial = vec![0.0; num_vertical];
                for (i, column) in out.iter_mut().enumerate() {
                    for j in 0..num_vertical {
                        let level = i * num_vertical + j;
                        let thickness = (bounds[2 * level + 1] - bounds[2 * level]).abs();
                        partial[j] = density[level] * thickness;
                    }
                    *column = column_from_partial_column(&partial);
                }
                Ok(())
            }),
        )
        .with_source("number_density", DataType::Float64, Some("molec/m3"), &TIME_VERTICAL)
        .with_source_independent(
            "altitude_bounds",
            DataType::Float64,
            Some("m"),
            &TIME_VERTICAL_BOUNDS,
            2,
        )
        .with_note("partial columns integrated over the vertical axis, NaN levels ignored"),
    )?;

    Ok(())
}

/// A builder pre-loaded with the standard conversion set, for callers
/// that want to extend it before freezing.
pub fn standard_builder() -> Result<ConversionRegistryBuilder> {
    let mut builder = ConversionRegistryBuilder::new();
    register_all(&mut builder)?;
    Ok(builder)
}

static STANDARD: Lazy<ConversionRegistry> = Lazy::new(|| {
    let mut builder = ConversionRegistryBuilder::new();
    register_all(&mut builder).expect("standard conversion names are valid");
    builder.build()
});

/// The frozen standard registry, built once on first use.
pub fn standard_registry() -> &'static ConversionRegistry {
    &STANDARD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_contents() {
        let registry = standard_registry();
        assert!(registry.lookup("number_density").is_some());
        assert!(registry.lookup("volume_mixing_ratio").is_some());
        assert_eq!(registry.lookup("gph").map(|l| l.len()), Some(2));
        assert_eq!(registry.lookup("altitude_bounds").map(|l| l.len()), Some(2));
        assert!(registry.lookup("column_number_density").is_some());
    }

    #[test]
    fn test_exact_gph_registered_before_model_approximation() {
        let registry = standard_registry();
        let gph = registry.lookup("gph").unwrap();
        assert!(gph[0].note().is_none());
        assert!(gph[1].note().unwrap().contains("model-based"));
    }
}
