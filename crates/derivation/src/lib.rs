//! Conversion registry and derived-variable resolver.
//!
//! Variables that a product does not hold directly can often be derived
//! from the ones it does: number density from mixing ratio, layer bounds
//! from level profiles, a total column from partial columns. This crate
//! provides the declarative registry of such conversions and the
//! recursive resolver that plans and executes a chain of them for a
//! requested `(name, unit, dimension signature)`.
//!
//! The registry is assembled through [`ConversionRegistryBuilder`] and
//! frozen before use; [`standard_registry`] exposes the built-in set.
//! Resolution entry points are [`get_derived_variable`],
//! [`get_derived_variable_with_type`] and [`add_derived_variable`];
//! [`format_conversions`] renders what is derivable for a product.

pub mod conversion;
pub mod error;
pub mod printer;
pub mod registry;
pub mod resolver;
pub mod standard;

pub use conversion::{ComputeFn, Conversion, EnabledFn, SourceSpec, MAX_SOURCE_VARIABLES};
pub use error::{DerivationError, Result};
pub use printer::{format_conversion, format_conversions};
pub use registry::{ConversionRegistry, ConversionRegistryBuilder};
pub use resolver::{add_derived_variable, get_derived_variable, get_derived_variable_with_type};
pub use standard::{
    model_approximations_enabled, set_model_approximations_enabled, standard_builder,
    standard_registry,
};
