//! Interpolation kernels and vertical-profile physics.
//!
//! This crate holds the numerical primitives used by the regridding
//! engine and the standard derived-variable conversions:
//!
//! - [`interpolate`]: pointwise linear interpolation and interval
//!   (layer-overlap) interpolation with the seven-case overlap
//!   classifier
//! - [`vertical`]: altitude/pressure/geopotential-height conversions,
//!   layer-bound construction, column integration and covariance
//!   transforms
//!
//! All kernels operate on dense `f64` slices and use NaN as the missing
//! value: column sums ignore NaN contributions, and interpolation writes
//! NaN outside the source support instead of failing.

pub mod error;
pub mod interpolate;
pub mod vertical;

pub use error::{ProfileError, Result};
pub use interpolate::{
    determine_overlap, interpolate_intervals, interpolate_linear, OverlapScenario,
};
