//! The derived-variable resolver: planner and executor.
//!
//! Given a product and a goal `(name, unit, dimension kinds)`, the
//! planner searches the registry for a conversion whose source
//! requirements are recursively satisfiable from the product, then the
//! executor materializes the chain. Candidates are tried strictly in
//! registration order and the first plannable one wins, so registration
//! order encodes domain preference.
//!
//! Cycle prevention uses a per-name skip mask with one bit per rank
//! (number of dimensions): a conversion that is already on the recursion
//! stack at the same rank is invisible further down. The mask bit is
//! held through a scoped helper so early returns cannot leak it.

use tracing::debug;

use product_common::{DimensionKind, ProductError, DataType, Product, Variable};

use crate::conversion::{Conversion, SourceSpec};
use crate::error::{DerivationError, Result};
use crate::registry::ConversionRegistry;

/// A resolution goal: the signature the caller asked for.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Goal<'g> {
    pub name: &'g str,
    pub dimensions: &'g [DimensionKind],
    pub independent_length: Option<usize>,
}

/// A resolved source: borrowed straight from the product when no
/// coercion was needed, owned otherwise. Owned temporaries are dropped
/// when the conversion completes, on both success and failure paths.
enum Source<'p> {
    Borrowed(&'p Variable),
    Owned(Variable),
}

impl Source<'_> {
    fn as_variable(&self) -> &Variable {
        match self {
            Source::Borrowed(v) => v,
            Source::Owned(v) => v,
        }
    }
}

pub(crate) struct Planner<'a> {
    registry: &'a ConversionRegistry,
    product: &'a Product,
    skip: Vec<u16>,
}

impl<'a> Planner<'a> {
    pub(crate) fn new(registry: &'a ConversionRegistry, product: &'a Product) -> Self {
        Self {
            registry,
            product,
            skip: vec![0; registry.num_variables()],
        }
    }

    pub(crate) fn registry(&self) -> &'a ConversionRegistry {
        self.registry
    }

    pub(crate) fn product(&self) -> &'a Product {
        self.product
    }

    pub(crate) fn skip_set(&self, index: usize, rank: usize) -> bool {
        self.skip[index] & (1 << rank) != 0
    }

    pub(crate) fn set_skip(&mut self, index: usize, rank: usize) {
        self.skip[index] |= 1 << rank;
    }

    pub(crate) fn clear_skip(&mut self, index: usize, rank: usize) {
        self.skip[index] &= !(1 << rank);
    }

    /// Run `f` with the skip bit for `(index, rank)` set, restoring it on
    /// exit regardless of how `f` returns.
    pub(crate) fn with_skip<T>(
        &mut self,
        index: usize,
        rank: usize,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.set_skip(index, rank);
        let result = f(self);
        self.clear_skip(index, rank);
        result
    }

    /// Planning only: can this source requirement be satisfied, either
    /// directly from the product or through a conversion chain?
    pub(crate) fn find_source(&mut self, spec: &SourceSpec) -> bool {
        let product = self.product;
        if let Some(variable) = product.get(spec.name()) {
            if variable.has_dimension_types_with_length(spec.dimensions(), spec.independent_length())
            {
                return true;
            }
        }
        let registry = self.registry;
        let Some(index) = registry.name_index(spec.name()) else {
            return false;
        };
        for conversion in registry.conversions_at(index) {
            if !conversion.is_enabled() {
                continue;
            }
            let rank = conversion.num_dimensions();
            if self.skip_set(index, rank) {
                continue;
            }
            if !conversion.matches_dimensions(spec.dimensions(), spec.independent_length()) {
                continue;
            }
            let satisfiable = self.with_skip(index, rank, |planner| {
                conversion
                    .sources()
                    .iter()
                    .all(|source| planner.find_source(source))
            });
            if satisfiable {
                return true;
            }
        }
        false
    }

    /// Find the first plannable conversion for the goal and execute it.
    pub(crate) fn find_and_execute(&mut self, goal: &Goal<'_>) -> Result<Variable> {
        let registry = self.registry;
        if let Some(index) = registry.name_index(goal.name) {
            for conversion in registry.conversions_at(index) {
                if !conversion.is_enabled() {
                    continue;
                }
                let rank = conversion.num_dimensions();
                if self.skip_set(index, rank) {
                    continue;
                }
                if !conversion.matches_dimensions(goal.dimensions, goal.independent_length) {
                    continue;
                }
                let plannable = self.with_skip(index, rank, |planner| {
                    conversion
                        .sources()
                        .iter()
                        .all(|source| planner.find_source(source))
                });
                if !plannable {
                    continue;
                }
                debug!(
                    "deriving '{}' from {} source variable(s)",
                    goal.name,
                    conversion.sources().len()
                );
                // Keep the skip bit set during execution so recursive
                // derivation of sources cannot re-enter this conversion
                // at the same rank.
                return self.with_skip(index, rank, |planner| {
                    planner.perform_conversion(conversion)
                });
            }
        }
        Err(DerivationError::VariableNotFound(format!(
            "could not derive variable '{}'",
            goal.name
        )))
    }

    /// Resolve one source requirement for execution, coercing to the
    /// declared unit and data type where needed.
    fn get_source(&mut self, spec: &SourceSpec) -> Result<Source<'a>> {
        let product = self.product;
        if let Some(variable) = product.get(spec.name()) {
            if variable.has_dimension_types(spec.dimensions()) {
                let needs_unit = spec
                    .unit()
                    .is_some_and(|unit| !units::variable_has_unit(variable, unit));
                let needs_type = variable.data_type() != spec.data_type();
                if !needs_unit && !needs_type {
                    return Ok(Source::Borrowed(variable));
                }
                // Coerce on a copy; variables in the product are never
                // mutated by the resolver.
                let mut copy = variable.clone();
                if let Some(unit) = spec.unit() {
                    if needs_unit {
                        units::convert_variable(&mut copy, unit)?;
                    }
                }
                if copy.data_type() != spec.data_type() {
                    copy.convert_data_type(spec.data_type())?;
                }
                return Ok(Source::Owned(copy));
            }
        }

        let goal = Goal {
            name: spec.name(),
            dimensions: spec.dimensions(),
            independent_length: spec.independent_length(),
        };
        let mut variable = self.find_and_execute(&goal)?;
        if let Some(unit) = spec.unit() {
            if !units::variable_has_unit(&variable, unit) {
                units::convert_variable(&mut variable, unit)?;
            }
        }
        if variable.data_type() != spec.data_type() {
            variable.convert_data_type(spec.data_type())?;
        }
        Ok(Source::Owned(variable))
    }

    /// Execute a conversion whose sources the planner has declared
    /// satisfiable: resolve the sources in order, allocate the output
    /// with the declared shape, and run the compute function.
    fn perform_conversion(&mut self, conversion: &Conversion) -> Result<Variable> {
        let mut sources: Vec<Source<'a>> = Vec::with_capacity(conversion.sources().len());
        for spec in conversion.sources() {
            sources.push(self.get_source(spec)?);
        }

        let mut shape = Vec::with_capacity(conversion.num_dimensions());
        for &kind in conversion.dimensions() {
            let length = if kind == DimensionKind::Independent {
                conversion.independent_length().ok_or_else(|| {
                    DerivationError::InvalidArgument(format!(
                        "conversion for '{}' declares an independent axis without a length",
                        conversion.name()
                    ))
                })?
            } else {
                self.product.dimension_length(kind).ok_or_else(|| {
                    DerivationError::Product(ProductError::product(format!(
                        "product has no length for {} dimension",
                        kind
                    )))
                })?
            };
            shape.push((kind, length));
        }
        let mut output = Variable::new(conversion.name(), conversion.data_type(), &shape)?;
        output.set_unit(conversion.unit().map(str::to_string));

        let refs: Vec<&Variable> = sources.iter().map(Source::as_variable).collect();
        (conversion.compute())(&mut output, &refs)?;
        Ok(output)
    }
}

/// Retrieve a variable from a product, deriving it when necessary.
///
/// If the product already holds a variable with the requested name and
/// dimension kinds, a deep copy is returned (unit-converted when `unit`
/// is given). Otherwise the registry is searched for a conversion chain;
/// the first plannable candidate in registration order is executed.
/// The element type of the result is preserved; use
/// [`get_derived_variable_with_type`] to also coerce the type.
///
/// Fails with `VariableNotFound` when no chain exists; unit-conversion
/// and compute errors are propagated with their cause first.
pub fn get_derived_variable(
    registry: &ConversionRegistry,
    product: &Product,
    name: &str,
    unit: Option<&str>,
    dimensions: &[DimensionKind],
) -> Result<Variable> {
    if name.is_empty() {
        return Err(DerivationError::InvalidArgument(
            "name of variable to be derived is empty".to_string(),
        ));
    }

    if let Some(variable) = product.get(name) {
        if variable.has_dimension_types(dimensions) {
            let mut copy = variable.clone();
            if let Some(unit) = unit {
                if !units::variable_has_unit(&copy, unit) {
                    units::convert_variable(&mut copy, unit)?;
                }
            }
            return Ok(copy);
        }
    }

    let mut planner = Planner::new(registry, product);
    let goal = Goal {
        name,
        dimensions,
        independent_length: None,
    };
    let mut variable = planner.find_and_execute(&goal)?;
    if let Some(unit) = unit {
        if !units::variable_has_unit(&variable, unit) {
            units::convert_variable(&mut variable, unit)?;
        }
    }
    Ok(variable)
}

/// Like [`get_derived_variable`], but also coerces the element type.
pub fn get_derived_variable_with_type(
    registry: &ConversionRegistry,
    product: &Product,
    name: &str,
    data_type: DataType,
    unit: Option<&str>,
    dimensions: &[DimensionKind],
) -> Result<Variable> {
    let mut variable = get_derived_variable(registry, product, name, unit, dimensions)?;
    variable.convert_data_type(data_type)?;
    Ok(variable)
}

/// Ensure the product contains a variable with the requested signature.
///
/// If a variable with the right name and dimensions is already present
/// it is only unit-converted in place (when `unit` is given). Otherwise
/// the variable is derived, any same-named variable with different
/// dimensions is removed, and the result is added to the product.
pub fn add_derived_variable(
    registry: &ConversionRegistry,
    product: &mut Product,
    name: &str,
    unit: Option<&str>,
    dimensions: &[DimensionKind],
) -> Result<()> {
    let present_with_dims = product
        .get(name)
        .map(|v| v.has_dimension_types(dimensions))
        .unwrap_or(false);
    if present_with_dims {
        if let Some(unit) = unit {
            if let Some(variable) = product.get_mut(name) {
                if !units::variable_has_unit(variable, unit) {
                    units::convert_variable(variable, unit)?;
                }
            }
        }
        return Ok(());
    }

    let variable = get_derived_variable(registry, product, name, unit, dimensions)?;
    if product.has_variable(name) {
        product.remove_variable(name)?;
    }
    product.add_variable(variable)?;
    Ok(())
}
