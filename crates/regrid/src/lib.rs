//! Vertical regridding and averaging-kernel smoothing.
//!
//! Resamples every resamplable variable of a product onto a new vertical
//! grid, either a fixed grid ([`regrid_vertical_with_axis`], typically
//! loaded from a CSV file via [`read_vertical_grid`]) or the per-sample
//! grid of a collocated matching product
//! ([`regrid_vertical_with_collocated_product`]), which can also apply
//! averaging-kernel smoothing with a priori profiles to selected
//! species.
//!
//! Each variable falls into one [`ResampleCategory`]: level quantities
//! interpolate pointwise (in log space for pressure axes), `_column_`
//! quantities by layer overlap, variables without a vertical axis are
//! left alone, and everything else is dropped with a warning. All
//! interpolation happens in `float64`; NaN marks both missing values and
//! the padding of per-sample variable-length columns.

pub mod axis;
pub mod category;
pub mod collocation;
pub mod csv_grid;
pub mod error;
pub mod fixed;
pub mod import;
pub mod matched;

pub use axis::unpadded_len;
pub use category::{resample_category, ResampleCategory};
pub use collocation::{CollocationPair, CollocationResult, MatchMetadata};
pub use csv_grid::{parse_vertical_grid, read_vertical_grid};
pub use error::{RegridError, Result};
pub use fixed::regrid_vertical_with_axis;
pub use import::{InMemoryImporter, ProductImporter};
pub use matched::regrid_vertical_with_collocated_product;
