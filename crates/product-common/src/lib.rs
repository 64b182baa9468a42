//! Core data model for atmospheric remote-sensing products.
//!
//! A *product* is an ordered collection of *variables*: named, typed,
//! unit-carrying tensors whose axes are labeled with shared dimension
//! kinds (time, vertical, spectral, latitude, longitude, independent).
//! This crate provides:
//!
//! - The closed [`DimensionKind`] and [`DataType`] enumerations
//! - [`ArrayData`], the tagged dense storage over concrete element types
//! - [`Variable`] with type coercion, broadcast, and resize operations
//! - [`Product`] with the per-kind dimension-length invariant
//! - [`ProductError`], the error taxonomy shared across the workspace
//!
//! Unit conversion is deliberately not implemented here; the `units`
//! crate operates on variables through their public API.

pub mod array;
pub mod data_type;
pub mod dimension;
pub mod error;
pub mod product;
pub mod variable;

pub use array::ArrayData;
pub use data_type::DataType;
pub use dimension::{Dimension, DimensionKind, MAX_RANK};
pub use error::{ProductError, Result};
pub use product::Product;
pub use variable::Variable;
