//! Ordered collections of variables over shared named dimensions.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::dimension::DimensionKind;
use crate::error::{ProductError, Result};
use crate::variable::Variable;

/// A named collection of variables that share per-kind dimension lengths.
///
/// Variables are kept in insertion order and are unique by name. For every
/// non-independent dimension kind present in any variable, the product
/// records a single length which all variables must agree with; the
/// `Independent` kind carries per-variable lengths and is exempt.
#[derive(Debug, Clone, Default)]
pub struct Product {
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
    dimension_lengths: HashMap<DimensionKind, usize>,
    source_product: Option<String>,
    datetime_start: Option<DateTime<Utc>>,
    datetime_stop: Option<DateTime<Utc>>,
}

impl Product {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the source product this data was ingested from.
    pub fn source_product(&self) -> Option<&str> {
        self.source_product.as_deref()
    }

    pub fn set_source_product(&mut self, source: impl Into<String>) {
        self.source_product = Some(source.into());
    }

    /// Start of the time coverage, if known.
    pub fn datetime_start(&self) -> Option<DateTime<Utc>> {
        self.datetime_start
    }

    /// End of the time coverage, if known.
    pub fn datetime_stop(&self) -> Option<DateTime<Utc>> {
        self.datetime_stop
    }

    pub fn set_time_coverage(&mut self, start: DateTime<Utc>, stop: DateTime<Utc>) {
        self.datetime_start = Some(start);
        self.datetime_stop = Some(stop);
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in insertion order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        match self.index.get(name) {
            Some(&i) => Some(&mut self.variables[i]),
            None => None,
        }
    }

    /// The shared length of a dimension kind, if any variable uses it.
    pub fn dimension_length(&self, kind: DimensionKind) -> Option<usize> {
        self.dimension_lengths.get(&kind).copied()
    }

    /// Add a variable, enforcing name uniqueness and dimension lengths.
    ///
    /// For every non-independent axis the length must match the product's
    /// recorded length for that kind; the first variable to use a kind
    /// establishes it.
    pub fn add_variable(&mut self, variable: Variable) -> Result<()> {
        if self.index.contains_key(variable.name()) {
            return Err(ProductError::InvalidName(format!(
                "product already contains a variable named '{}'",
                variable.name()
            )));
        }
        for dim in variable.dimensions() {
            if !dim.kind.is_shared() {
                continue;
            }
            match self.dimension_lengths.get(&dim.kind) {
                Some(&length) if length != dim.length => {
                    return Err(ProductError::Product(format!(
                        "variable '{}' has {} dimension of length {}, product has length {}",
                        variable.name(),
                        dim.kind,
                        dim.length,
                        length
                    )));
                }
                _ => {}
            }
        }
        for dim in variable.dimensions() {
            if dim.kind.is_shared() {
                self.dimension_lengths.entry(dim.kind).or_insert(dim.length);
            }
        }
        self.index
            .insert(variable.name().to_string(), self.variables.len());
        self.variables.push(variable);
        Ok(())
    }

    /// Remove a variable by name, preserving the order of the survivors.
    pub fn remove_variable(&mut self, name: &str) -> Result<Variable> {
        let position = *self.index.get(name).ok_or_else(|| {
            ProductError::VariableNotFound(format!("product has no variable '{}'", name))
        })?;
        let variable = self.variables.remove(position);
        self.rebuild_index();
        self.recompute_dimension_lengths();
        Ok(variable)
    }

    /// Replace the same-named variable in place.
    ///
    /// The replacement may change shape; dimension lengths are recomputed
    /// afterwards with no cross-variable consistency check, so a sequence
    /// of replacements may pass through transiently inconsistent states.
    /// Use `verify` to check the final state.
    pub fn replace_variable(&mut self, variable: Variable) -> Result<()> {
        let position = *self.index.get(variable.name()).ok_or_else(|| {
            ProductError::VariableNotFound(format!(
                "product has no variable '{}'",
                variable.name()
            ))
        })?;
        self.variables[position] = variable;
        self.recompute_dimension_lengths();
        Ok(())
    }

    /// Resize every axis of the given kind on every variable, and update
    /// the product's recorded length.
    pub fn resize_dimension(&mut self, kind: DimensionKind, new_length: usize) -> Result<()> {
        for variable in &mut self.variables {
            let axes: Vec<usize> = variable
                .dimensions()
                .iter()
                .enumerate()
                .filter(|(_, d)| d.kind == kind)
                .map(|(i, _)| i)
                .collect();
            for axis in axes {
                variable.resize_dimension(axis, new_length)?;
            }
        }
        self.recompute_dimension_lengths();
        Ok(())
    }

    /// Check the structural invariants: unique names, element counts that
    /// match the shape, and per-kind dimension lengths consistent across
    /// all variables.
    pub fn verify(&self) -> Result<()> {
        let mut seen: HashMap<&str, ()> = HashMap::new();
        for variable in &self.variables {
            if seen.insert(variable.name(), ()).is_some() {
                return Err(ProductError::Product(format!(
                    "duplicate variable name '{}'",
                    variable.name()
                )));
            }
            if variable.data().len() != variable.num_elements() {
                return Err(ProductError::Product(format!(
                    "variable '{}' has {} elements, shape requires {}",
                    variable.name(),
                    variable.data().len(),
                    variable.num_elements()
                )));
            }
            for dim in variable.dimensions() {
                if !dim.kind.is_shared() {
                    continue;
                }
                let expected = self.dimension_lengths.get(&dim.kind).copied();
                if expected != Some(dim.length) {
                    return Err(ProductError::Product(format!(
                        "variable '{}' has {} dimension of length {}, product records {:?}",
                        variable.name(),
                        dim.kind,
                        dim.length,
                        expected
                    )));
                }
            }
        }
        Ok(())
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .variables
            .iter()
            .enumerate()
            .map(|(i, v)| (v.name().to_string(), i))
            .collect();
    }

    fn recompute_dimension_lengths(&mut self) {
        self.dimension_lengths.clear();
        for variable in &self.variables {
            for dim in variable.dimensions() {
                if dim.kind.is_shared() {
                    self.dimension_lengths.entry(dim.kind).or_insert(dim.length);
                }
            }
        }
    }
}
