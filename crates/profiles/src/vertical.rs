//! Vertical-profile physics primitives.
//!
//! Conversions between altitude, pressure and geopotential height,
//! layer-bound construction, column integration and covariance
//! transforms. Profiles are dense `f64` slices ordered along the
//! vertical axis; the barometric walks handle both surface-to-space and
//! space-to-surface orderings.

use crate::error::{ProfileError, Result};
use crate::interpolate::interpolate_intervals;

/// Standard temperature [K].
pub const STD_TEMPERATURE: f64 = 273.15;
/// Standard pressure [hPa].
pub const STD_PRESSURE: f64 = 1013.25;
/// Molar gas constant [J mol-1 K-1].
pub const MOLAR_GAS: f64 = 8.314472;
/// Air number density at standard temperature and pressure [molec m-3].
pub const STD_AIR_DENSITY: f64 = 2.6867811e25;
/// Gravitational acceleration at 45 degrees latitude [m s-2].
pub const GRAV_ACCEL_45LAT: f64 = 9.80665;
/// Mean molar mass of wet air [g mol-1].
pub const MEAN_MOLAR_MASS_WET_AIR: f64 = 28.94;
/// Molar mass of dry air [g mol-1].
pub const MOLAR_MASS_DRY_AIR: f64 = 28.9644;
/// Molar mass of water vapour [g mol-1].
pub const MOLAR_MASS_H2O: f64 = 18.0153;
/// Top-of-atmosphere altitude used to clamp layer bounds [m].
pub const TOA_ALTITUDE: f64 = 1.0e5;

const WGS84_SEMI_MAJOR: f64 = 6378137.0;
const WGS84_SEMI_MINOR: f64 = 6356752.3142;

/// Gravitational acceleration at the surface for a latitude
/// [degree_north], from the WGS84 normal gravity formula [m s-2].
pub fn gravity_at_surface(latitude: f64) -> f64 {
    let sin2 = latitude.to_radians().sin().powi(2);
    9.7803253359 * (1.0 + 0.00193185265241 * sin2) / (1.0 - 0.00669437999013 * sin2).sqrt()
}

/// Local curvature radius of the surface at a latitude [m].
pub fn local_curvature_radius(latitude: f64) -> f64 {
    let phi = latitude.to_radians();
    let cos2 = phi.cos().powi(2);
    let sin2 = phi.sin().powi(2);
    1.0 / (cos2 / (WGS84_SEMI_MAJOR * WGS84_SEMI_MAJOR)
        + sin2 / (WGS84_SEMI_MINOR * WGS84_SEMI_MINOR))
        .sqrt()
}

/// Gravitational acceleration at a latitude [degree_north] and altitude
/// [m], using the inverse-square falloff from the surface value [m s-2].
pub fn gravity_at_height(latitude: f64, altitude: f64) -> f64 {
    let radius = local_curvature_radius(latitude);
    gravity_at_surface(latitude) * (radius / (radius + altitude)).powi(2)
}

/// Molar mass of humid air for a given H2O mass mixing ratio [ug/g],
/// in [g mol-1].
pub fn molar_mass_wet_air(h2o_mmr: f64) -> f64 {
    let q = h2o_mmr * 1.0e-6;
    1.0 / ((1.0 - q) / MOLAR_MASS_DRY_AIR + q / MOLAR_MASS_H2O)
}

/// Construct layer boundaries from a level profile.
///
/// `bounds` is a `[num_levels, 2]` row-major buffer of lower/upper
/// boundaries. Interior boundaries lie at the midpoints between adjacent
/// levels; the outermost boundaries extend by half the edge spacing and
/// are clamped so the profile does not drop below the surface or exceed
/// the top of the atmosphere (unless the profile itself already does).
pub fn altitude_bounds_from_altitude(altitude: &[f64], bounds: &mut [f64]) -> Result<()> {
    let n = altitude.len();
    if n < 2 {
        return Err(ProfileError::invalid_argument(
            "altitude profile needs at least 2 levels",
        ));
    }
    if bounds.len() != 2 * n {
        return Err(ProfileError::invalid_argument(format!(
            "bounds buffer length {} does not match {} levels",
            bounds.len(),
            n
        )));
    }

    bounds[0] = altitude[0] - 0.5 * (altitude[1] - altitude[0]).abs();
    for k in 0..n - 1 {
        let average = 0.5 * (altitude[k] + altitude[k + 1]);
        bounds[2 * k + 1] = average;
        bounds[2 * (k + 1)] = average;
    }
    bounds[2 * n - 1] = altitude[n - 1] + 0.5 * (altitude[n - 1] - altitude[n - 2]).abs();

    if altitude[0] < altitude[n - 1] {
        // ascending
        if bounds[0] < 0.0 && altitude[0] >= 0.0 {
            bounds[0] = 0.0;
        }
        if bounds[2 * n - 1] > TOA_ALTITUDE && altitude[n - 1] < TOA_ALTITUDE {
            bounds[2 * n - 1] = TOA_ALTITUDE;
        }
    } else {
        // descending
        if bounds[2 * n - 1] < 0.0 && altitude[n - 1] >= 0.0 {
            bounds[2 * n - 1] = 0.0;
        }
        if bounds[0] > TOA_ALTITUDE && altitude[0] < TOA_ALTITUDE {
            bounds[0] = TOA_ALTITUDE;
        }
    }

    Ok(())
}

/// Construct pressure layer boundaries from a pressure level profile.
///
/// Pressure varies exponentially with height, so interior boundaries are
/// geometric means of adjacent levels and edge boundaries extend by the
/// edge ratio.
pub fn pressure_bounds_from_pressure(pressure: &[f64], bounds: &mut [f64]) -> Result<()> {
    let n = pressure.len();
    if n < 2 {
        return Err(ProfileError::invalid_argument(
            "pressure profile needs at least 2 levels",
        ));
    }
    if bounds.len() != 2 * n {
        return Err(ProfileError::invalid_argument(format!(
            "bounds buffer length {} does not match {} levels",
            bounds.len(),
            n
        )));
    }

    bounds[0] = pressure[0] * (pressure[0] / pressure[1]).sqrt();
    for k in 0..n - 1 {
        let average = (pressure[k] * pressure[k + 1]).sqrt();
        bounds[2 * k + 1] = average;
        bounds[2 * (k + 1)] = average;
    }
    bounds[2 * n - 1] = pressure[n - 1] * (pressure[n - 1] / pressure[n - 2]).sqrt();
    Ok(())
}

/// Integrate a partial-column profile into a total column.
///
/// NaN contributions are ignored; the result is NaN only when every
/// contribution is NaN.
pub fn column_from_partial_column(partial_column: &[f64]) -> f64 {
    let mut column = 0.0;
    let mut empty = true;
    for &value in partial_column {
        if !value.is_nan() {
            column += value;
            empty = false;
        }
    }
    if empty {
        f64::NAN
    } else {
        column
    }
}

/// Integrate a partial-column uncertainty profile into a total column
/// uncertainty (quadratic sum, NaN contributions ignored).
pub fn column_uncertainty_from_partial_column_uncertainty(partial_uncertainty: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut empty = true;
    for &value in partial_uncertainty {
        if !value.is_nan() {
            sum += value * value;
            empty = false;
        }
    }
    if empty {
        f64::NAN
    } else {
        sum.sqrt()
    }
}

fn check_square(name: &str, matrix: &[f64], n: usize) -> Result<()> {
    if matrix.len() != n * n {
        return Err(ProfileError::invalid_argument(format!(
            "{} has {} elements, expected {}x{}",
            name,
            matrix.len(),
            n,
            n
        )));
    }
    Ok(())
}

/// Per-level scale factor between volume mixing ratio [ppmv] and number
/// density [molec m-3] at the given pressure [hPa] and temperature [K].
pub fn number_density_per_vmr(pressure: f64, temperature: f64) -> f64 {
    1.0e-6 * STD_AIR_DENSITY * (STD_TEMPERATURE / temperature) * (pressure / STD_PRESSURE)
}

/// Convert a volume mixing ratio covariance matrix [(ppmv)^2] to a
/// number density covariance matrix [(molec/m3)^2].
pub fn nd_cov_from_vmr_cov(
    vmr_covariance: &[f64],
    pressure: &[f64],
    temperature: &[f64],
    nd_covariance: &mut [f64],
) -> Result<()> {
    let n = pressure.len();
    if temperature.len() != n {
        return Err(ProfileError::invalid_argument(
            "pressure and temperature profiles have different lengths",
        ));
    }
    check_square("vmr covariance", vmr_covariance, n)?;
    check_square("nd covariance", nd_covariance, n)?;
    for i in 0..n {
        let ci = number_density_per_vmr(pressure[i], temperature[i]);
        for j in 0..n {
            let cj = number_density_per_vmr(pressure[j], temperature[j]);
            nd_covariance[i * n + j] = ci * cj * vmr_covariance[i * n + j];
        }
    }
    Ok(())
}

/// Convert a number density covariance matrix [(molec/m3)^2] to a volume
/// mixing ratio covariance matrix [(ppmv)^2]. Exact inverse of
/// [`nd_cov_from_vmr_cov`] for fixed pressure and temperature.
pub fn vmr_cov_from_nd_cov(
    nd_covariance: &[f64],
    pressure: &[f64],
    temperature: &[f64],
    vmr_covariance: &mut [f64],
) -> Result<()> {
    let n = pressure.len();
    if temperature.len() != n {
        return Err(ProfileError::invalid_argument(
            "pressure and temperature profiles have different lengths",
        ));
    }
    check_square("nd covariance", nd_covariance, n)?;
    check_square("vmr covariance", vmr_covariance, n)?;
    for i in 0..n {
        let ci = 1.0 / number_density_per_vmr(pressure[i], temperature[i]);
        for j in 0..n {
            let cj = 1.0 / number_density_per_vmr(pressure[j], temperature[j]);
            vmr_covariance[i * n + j] = ci * cj * nd_covariance[i * n + j];
        }
    }
    Ok(())
}

/// Convert a density covariance matrix to a partial-column covariance
/// matrix using layer thicknesses from the altitude bounds `[n, 2]`.
pub fn partial_column_cov_from_density_cov(
    altitude_bounds: &[f64],
    density_covariance: &[f64],
    partial_column_covariance: &mut [f64],
) -> Result<()> {
    let n = altitude_bounds.len() / 2;
    if altitude_bounds.len() != 2 * n || n == 0 {
        return Err(ProfileError::invalid_argument(
            "altitude bounds must be a non-empty [n,2] buffer",
        ));
    }
    check_square("density covariance", density_covariance, n)?;
    check_square("partial column covariance", partial_column_covariance, n)?;
    for i in 0..n {
        let dzi = (altitude_bounds[2 * i + 1] - altitude_bounds[2 * i]).abs();
        for j in 0..n {
            let dzj = (altitude_bounds[2 * j + 1] - altitude_bounds[2 * j]).abs();
            partial_column_covariance[i * n + j] = density_covariance[i * n + j] * dzi * dzj;
        }
    }
    Ok(())
}

/// Regrid a density profile to a partial-column profile on a target
/// layer grid, using interval interpolation.
///
/// NaN densities contribute zero; a target column is NaN only when no
/// source layer overlaps it or every source value was NaN.
pub fn partial_column_from_density(
    source_altitude_bounds: &[f64],
    source_density: &[f64],
    target_altitude_bounds: &[f64],
    target_partial_column: &mut [f64],
) -> Result<()> {
    let n = source_density.len();
    if source_altitude_bounds.len() != 2 * n {
        return Err(ProfileError::invalid_argument(
            "source bounds do not match source density length",
        ));
    }

    for value in target_partial_column.iter_mut() {
        *value = f64::NAN;
    }

    let valid = source_density.iter().filter(|v| !v.is_nan()).count();
    if valid == 0 {
        return Ok(());
    }

    let mut source_profile = vec![0.0; n];
    for k in 0..n {
        let dz = (source_altitude_bounds[2 * k + 1] - source_altitude_bounds[2 * k]).abs();
        if !source_density[k].is_nan() {
            source_profile[k] = source_density[k] * dz;
        }
    }

    interpolate_intervals(
        source_altitude_bounds,
        &source_profile,
        target_altitude_bounds,
        target_partial_column,
    )
}

/// Convert geopotential height [m] to altitude [m] at a latitude
/// [degree_north].
pub fn altitude_from_gph(gph: f64, latitude: f64) -> f64 {
    let g0 = GRAV_ACCEL_45LAT;
    let gsurf = gravity_at_surface(latitude);
    let rsurf = local_curvature_radius(latitude);
    g0 * rsurf * gph / (gsurf * rsurf - g0 * gph)
}

/// Convert altitude [m] to geopotential height [m] at a latitude
/// [degree_north].
pub fn gph_from_altitude(altitude: f64, latitude: f64) -> f64 {
    let g0 = GRAV_ACCEL_45LAT;
    let gsurf = gravity_at_surface(latitude);
    let rsurf = local_curvature_radius(latitude);
    gsurf / g0 * rsurf * altitude / (altitude + rsurf)
}

/// Convert a pressure value [hPa] to a geopotential height [m] using
/// standard-atmosphere values. A coarse model-based approximation; use
/// only when no measured temperature profile is available.
pub fn gph_from_pressure(pressure: f64) -> f64 {
    ((STD_TEMPERATURE * MOLAR_GAS) / (MEAN_MOLAR_MASS_WET_AIR * GRAV_ACCEL_45LAT))
        * (STD_PRESSURE / pressure).ln()
        * 1.0e3
}

fn profile_args_valid(len: usize, temperature: Option<&[f64]>, h2o_mmr: Option<&[f64]>) -> Result<()> {
    if len == 0 {
        return Err(ProfileError::invalid_argument("profile is empty"));
    }
    if let Some(t) = temperature {
        if t.len() != len {
            return Err(ProfileError::invalid_argument(
                "temperature profile length mismatch",
            ));
        }
    }
    if let Some(q) = h2o_mmr {
        if q.len() != len {
            return Err(ProfileError::invalid_argument(
                "humidity profile length mismatch",
            ));
        }
    }
    Ok(())
}

/// Convert a pressure profile [hPa] to an altitude profile [m].
///
/// Integrates the hydrostatic relation upward from the surface. When the
/// temperature profile is absent the standard temperature is used; when
/// the humidity profile [ug/g] is absent the mean molar mass of wet air
/// is used. The walk runs surface-to-space regardless of the storage
/// order of the vertical axis.
#[allow(clippy::too_many_arguments)]
pub fn altitude_profile_from_pressure(
    pressure: &[f64],
    temperature: Option<&[f64]>,
    h2o_mmr: Option<&[f64]>,
    surface_pressure: f64,
    surface_height: f64,
    latitude: f64,
    altitude: &mut [f64],
) -> Result<()> {
    let n = pressure.len();
    profile_args_valid(n, temperature, h2o_mmr)?;
    if altitude.len() != n {
        return Err(ProfileError::invalid_argument("output length mismatch"));
    }

    let surface_height = surface_height * 1.0e-3;
    let mut prev_z = 0.0;
    let mut prev_p = 0.0;
    let mut prev_t = 0.0;
    let mut prev_molar_mass = 0.0;

    for i in 0..n {
        // The axis may run space-to-surface; always walk up from the surface.
        let k = if pressure[0] < pressure[n - 1] { n - 1 - i } else { i };

        let p = pressure[k];
        let t = temperature.map_or(STD_TEMPERATURE, |t| t[k]);
        let molar_mass = h2o_mmr.map_or(MEAN_MOLAR_MASS_WET_AIR, |q| molar_mass_wet_air(q[k]));

        let z = if i == 0 {
            surface_height
                + ((t * MOLAR_GAS) / (molar_mass * gravity_at_surface(latitude)))
                    * (surface_pressure / p).ln()
        } else {
            prev_z
                + ((prev_t + t) / (molar_mass + prev_molar_mass))
                    * (MOLAR_GAS / gravity_at_height(latitude, prev_z * 1.0e3))
                    * (prev_p / p).ln()
        };

        altitude[k] = z * 1.0e3;

        prev_p = p;
        prev_molar_mass = molar_mass;
        prev_t = t;
        prev_z = z;
    }
    Ok(())
}

/// Convert an altitude profile [m] to a pressure profile [hPa] by
/// integrating the hydrostatic relation upward from the surface.
#[allow(clippy::too_many_arguments)]
pub fn pressure_profile_from_altitude(
    altitude: &[f64],
    temperature: Option<&[f64]>,
    h2o_mmr: Option<&[f64]>,
    surface_pressure: f64,
    surface_height: f64,
    latitude: f64,
    pressure: &mut [f64],
) -> Result<()> {
    let n = altitude.len();
    profile_args_valid(n, temperature, h2o_mmr)?;
    if pressure.len() != n {
        return Err(ProfileError::invalid_argument("output length mismatch"));
    }

    let mut prev_z = 0.0;
    let mut prev_p = 0.0;
    let mut prev_t = 0.0;
    let mut prev_molar_mass = 0.0;
    let mut prev_g = 0.0;

    for i in 0..n {
        let k = if altitude[0] > altitude[n - 1] { n - 1 - i } else { i };

        let z = altitude[k];
        let t = temperature.map_or(STD_TEMPERATURE, |t| t[k]);
        let molar_mass = h2o_mmr.map_or(MEAN_MOLAR_MASS_WET_AIR, |q| molar_mass_wet_air(q[k]));
        let g = gravity_at_height(latitude, z);

        let p = if i == 0 {
            let g_surface = gravity_at_surface(latitude);
            surface_pressure
                * (-((g + g_surface) * molar_mass * 1.0e-3 * (z - surface_height))
                    / (2.0 * t * MOLAR_GAS))
                    .exp()
        } else {
            prev_p
                * (-((g + prev_g) * (molar_mass + prev_molar_mass) * 1.0e-3 * (z - prev_z))
                    / (2.0 * (t + prev_t) * MOLAR_GAS))
                    .exp()
        };

        pressure[k] = p;

        prev_g = g;
        prev_p = p;
        prev_molar_mass = molar_mass;
        prev_t = t;
        prev_z = z;
    }
    Ok(())
}

/// Convert a pressure profile [hPa] to a geopotential height profile [m].
pub fn gph_profile_from_pressure(
    pressure: &[f64],
    temperature: Option<&[f64]>,
    h2o_mmr: Option<&[f64]>,
    surface_pressure: f64,
    surface_height: f64,
    gph: &mut [f64],
) -> Result<()> {
    let n = pressure.len();
    profile_args_valid(n, temperature, h2o_mmr)?;
    if gph.len() != n {
        return Err(ProfileError::invalid_argument("output length mismatch"));
    }

    let surface_height = surface_height * 1.0e-3;
    let mut prev_z = 0.0;
    let mut prev_p = 0.0;
    let mut prev_t = 0.0;
    let mut prev_molar_mass = 0.0;

    for i in 0..n {
        let k = if pressure[0] < pressure[n - 1] { n - 1 - i } else { i };

        let p = pressure[k];
        let t = temperature.map_or(STD_TEMPERATURE, |t| t[k]);
        let molar_mass = h2o_mmr.map_or(MEAN_MOLAR_MASS_WET_AIR, |q| molar_mass_wet_air(q[k]));

        let z = if i == 0 {
            surface_height
                + ((t * MOLAR_GAS) / (molar_mass * GRAV_ACCEL_45LAT)) * (surface_pressure / p).ln()
        } else {
            prev_z
                + ((prev_t + t) / (molar_mass + prev_molar_mass)) * (MOLAR_GAS / GRAV_ACCEL_45LAT)
                    * (prev_p / p).ln()
        };

        gph[k] = z * 1.0e3;

        prev_p = p;
        prev_molar_mass = molar_mass;
        prev_t = t;
        prev_z = z;
    }
    Ok(())
}

/// Convert a geopotential height profile [m] to a pressure profile [hPa].
pub fn pressure_profile_from_gph(
    gph: &[f64],
    temperature: Option<&[f64]>,
    h2o_mmr: Option<&[f64]>,
    surface_pressure: f64,
    surface_height: f64,
    pressure: &mut [f64],
) -> Result<()> {
    let n = gph.len();
    profile_args_valid(n, temperature, h2o_mmr)?;
    if pressure.len() != n {
        return Err(ProfileError::invalid_argument("output length mismatch"));
    }

    let mut prev_z = 0.0;
    let mut prev_p = 0.0;
    let mut prev_t = 0.0;
    let mut prev_molar_mass = 0.0;

    for i in 0..n {
        let k = if gph[0] > gph[n - 1] { n - 1 - i } else { i };

        let z = gph[k];
        let t = temperature.map_or(STD_TEMPERATURE, |t| t[k]);
        let molar_mass = h2o_mmr.map_or(MEAN_MOLAR_MASS_WET_AIR, |q| molar_mass_wet_air(q[k]));

        let p = if i == 0 {
            surface_pressure
                * (-(GRAV_ACCEL_45LAT * molar_mass * 1.0e-3 * (z - surface_height))
                    / (t * MOLAR_GAS))
                    .exp()
        } else {
            prev_p
                * (-(GRAV_ACCEL_45LAT * (molar_mass + prev_molar_mass) * 1.0e-3 * (z - prev_z))
                    / ((t + prev_t) * MOLAR_GAS))
                    .exp()
        };

        pressure[k] = p;

        prev_p = p;
        prev_molar_mass = molar_mass;
        prev_t = t;
        prev_z = z;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_altitude_bounds_midpoints() {
        let altitude = [1000.0, 2000.0, 3000.0];
        let mut bounds = [0.0; 6];
        altitude_bounds_from_altitude(&altitude, &mut bounds).unwrap();
        assert_eq!(bounds, [500.0, 1500.0, 1500.0, 2500.0, 2500.0, 3500.0]);
    }

    #[test]
    fn test_altitude_bounds_midpoint_identity() {
        // The midpoint of the bounds of an interior level equals
        // (profile[k-1] + 2*profile[k] + profile[k+1]) / 4.
        let altitude = [0.0, 700.0, 1800.0, 4500.0];
        let mut bounds = [0.0; 8];
        altitude_bounds_from_altitude(&altitude, &mut bounds).unwrap();
        for k in 1..3 {
            let midpoint = 0.5 * (bounds[2 * k] + bounds[2 * k + 1]);
            let expected = (altitude[k - 1] + 2.0 * altitude[k] + altitude[k + 1]) / 4.0;
            assert!((midpoint - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_altitude_bounds_clamped_at_ground() {
        let altitude = [100.0, 500.0];
        let mut bounds = [0.0; 4];
        altitude_bounds_from_altitude(&altitude, &mut bounds).unwrap();
        // Lower edge would be -100 without the surface clamp.
        assert_eq!(bounds[0], 0.0);
    }

    #[test]
    fn test_altitude_bounds_needs_two_levels() {
        let mut bounds = [0.0; 2];
        assert!(altitude_bounds_from_altitude(&[1.0], &mut bounds).is_err());
    }

    #[test]
    fn test_column_from_partial_column_ignores_nan() {
        assert_eq!(
            column_from_partial_column(&[f64::NAN, 2.0, 3.0, f64::NAN]),
            5.0
        );
        assert!(column_from_partial_column(&[f64::NAN, f64::NAN]).is_nan());
        assert_eq!(column_from_partial_column(&[1.0, 2.0, 3.0]), 6.0);
    }

    #[test]
    fn test_column_uncertainty_is_quadratic() {
        let result = column_uncertainty_from_partial_column_uncertainty(&[3.0, 4.0]);
        assert!((result - 5.0).abs() < 1e-12);
        assert!(
            column_uncertainty_from_partial_column_uncertainty(&[f64::NAN, f64::NAN]).is_nan()
        );
    }

    #[test]
    fn test_cov_round_trip_is_exact() {
        let pressure = [1000.0, 500.0, 100.0];
        let temperature = [290.0, 250.0, 220.0];
        let vmr_cov = [1.0, 0.5, 0.1, 0.5, 2.0, 0.3, 0.1, 0.3, 4.0];
        let mut nd_cov = [0.0; 9];
        let mut back = [0.0; 9];
        nd_cov_from_vmr_cov(&vmr_cov, &pressure, &temperature, &mut nd_cov).unwrap();
        vmr_cov_from_nd_cov(&nd_cov, &pressure, &temperature, &mut back).unwrap();
        for (a, b) in vmr_cov.iter().zip(back.iter()) {
            assert!((a - b).abs() < 1e-9 * a.abs().max(1.0));
        }
    }

    #[test]
    fn test_partial_column_from_density() {
        // Uniform density 2.0 /m3 over layers of thickness 1000 m.
        let src_bounds = [0.0, 1000.0, 1000.0, 2000.0];
        let density = [2.0, 2.0];
        let tgt_bounds = [0.0, 2000.0];
        let mut out = [0.0; 1];
        partial_column_from_density(&src_bounds, &density, &tgt_bounds, &mut out).unwrap();
        assert!((out[0] - 4000.0).abs() < 1e-9);
    }

    #[test]
    fn test_partial_column_all_nan_density() {
        let src_bounds = [0.0, 1.0];
        let density = [f64::NAN];
        let tgt_bounds = [0.0, 1.0];
        let mut out = [0.0; 1];
        partial_column_from_density(&src_bounds, &density, &tgt_bounds, &mut out).unwrap();
        assert!(out[0].is_nan());
    }

    #[test]
    fn test_gph_altitude_round_trip() {
        let latitude = 52.0;
        for altitude in [0.0, 1500.0, 12000.0, 40000.0] {
            let gph = gph_from_altitude(altitude, latitude);
            let back = altitude_from_gph(gph, latitude);
            assert!((back - altitude).abs() < 1e-6 * altitude.max(1.0));
        }
    }

    #[test]
    fn test_pressure_altitude_walks_are_consistent() {
        // pressure -> altitude -> pressure should reproduce the input.
        let pressure = [1000.0, 700.0, 500.0, 300.0, 100.0];
        let temperature = [288.0, 270.0, 255.0, 230.0, 210.0];
        let mut altitude = [0.0; 5];
        altitude_profile_from_pressure(
            &pressure,
            Some(&temperature),
            None,
            1013.25,
            0.0,
            45.0,
            &mut altitude,
        )
        .unwrap();
        assert!(altitude.windows(2).all(|w| w[1] > w[0]));

        let mut back = [0.0; 5];
        pressure_profile_from_altitude(
            &altitude,
            Some(&temperature),
            None,
            1013.25,
            0.0,
            45.0,
            &mut back,
        )
        .unwrap();
        for (p, b) in pressure.iter().zip(back.iter()) {
            assert!((p - b).abs() / p < 0.02, "{} vs {}", p, b);
        }
    }

    #[test]
    fn test_gph_from_pressure_standard_surface() {
        // Standard pressure maps to zero geopotential height.
        assert!(gph_from_pressure(STD_PRESSURE).abs() < 1e-9);
        assert!(gph_from_pressure(500.0) > 0.0);
    }

    #[test]
    fn test_gravity_varies_with_latitude() {
        assert!(gravity_at_surface(0.0) < gravity_at_surface(90.0));
        let g45 = gravity_at_surface(45.0);
        assert!((g45 - 9.806).abs() < 0.01);
        assert!(gravity_at_height(45.0, 10000.0) < g45);
    }
}
