//! The conversion registry: per-name ordered lists of conversions.
//!
//! A registry is assembled once through the builder and then frozen; the
//! resolver only ever sees the immutable form, so concurrent resolution
//! over disjoint products is safe by construction.

use std::collections::HashMap;

use crate::conversion::Conversion;
use crate::error::{DerivationError, Result};

/// Mutable registry under construction.
#[derive(Debug, Default)]
pub struct ConversionRegistryBuilder {
    names: Vec<String>,
    by_name: HashMap<String, usize>,
    conversions: Vec<Vec<Conversion>>,
}

impl ConversionRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a conversion to the list for its output name.
    ///
    /// Conversions are never removed, and the position within the
    /// per-name list is the resolver's tie-break order.
    pub fn register(&mut self, conversion: Conversion) -> Result<()> {
        if conversion.name().is_empty() {
            return Err(DerivationError::InvalidName(
                "conversion output name is empty".to_string(),
            ));
        }
        let index = match self.by_name.get(conversion.name()) {
            Some(&index) => index,
            None => {
                let index = self.names.len();
                self.names.push(conversion.name().to_string());
                self.by_name.insert(conversion.name().to_string(), index);
                self.conversions.push(Vec::new());
                index
            }
        };
        self.conversions[index].push(conversion);
        Ok(())
    }

    /// Freeze into an immutable registry.
    pub fn build(self) -> ConversionRegistry {
        ConversionRegistry {
            names: self.names,
            by_name: self.by_name,
            conversions: self.conversions,
        }
    }
}

/// Immutable registry shared by reference with the resolver.
#[derive(Debug)]
pub struct ConversionRegistry {
    names: Vec<String>,
    by_name: HashMap<String, usize>,
    conversions: Vec<Vec<Conversion>>,
}

impl ConversionRegistry {
    /// Number of distinct output variable names.
    pub fn num_variables(&self) -> usize {
        self.names.len()
    }

    /// Output variable names in registration order.
    pub fn variable_names(&self) -> &[String] {
        &self.names
    }

    /// The ordered conversion list for an output name.
    pub fn lookup(&self, name: &str) -> Option<&[Conversion]> {
        self.by_name.get(name).map(|&i| self.conversions[i].as_slice())
    }

    /// All conversions, grouped by name in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Conversion> {
        self.conversions.iter().flatten()
    }

    pub(crate) fn name_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub(crate) fn conversions_at(&self, index: usize) -> &[Conversion] {
        &self.conversions[index]
    }
}
