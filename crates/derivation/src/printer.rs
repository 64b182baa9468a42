//! Rendering of conversions and conversion trees.
//!
//! `format_conversions` mirrors the planner: for a given product it
//! renders each currently applicable conversion with its chosen
//! sub-plans indented below it, suppressing cycles with the same skip
//! mask the resolver uses. Rendering returns a `String`; callers decide
//! where it goes.

use std::fmt::Write as _;

use product_common::Product;

use crate::conversion::{Conversion, SourceSpec};
use crate::error::{DerivationError, Result};
use crate::registry::ConversionRegistry;
use crate::resolver::Planner;

/// Render a single conversion the way the registry dump shows it.
pub fn format_conversion(conversion: &Conversion) -> String {
    let mut out = String::new();
    out.push_str(&conversion.signature());
    if conversion.sources().is_empty() {
        out.push_str("\n  derived without input variables\n");
    } else {
        out.push_str(" from\n");
        for spec in conversion.sources() {
            out.push_str("  ");
            out.push_str(&spec.signature());
            out.push('\n');
        }
    }
    if let Some(note) = conversion.note() {
        let _ = writeln!(out, "  note: {}", note);
    }
    out.push('\n');
    out
}

struct TreePrinter<'a> {
    planner: Planner<'a>,
    out: String,
}

impl<'a> TreePrinter<'a> {
    fn write_indent(&mut self, indent: usize) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
    }

    /// Render the source list of a conversion, recursing into the
    /// sub-plan chosen for each source that is not already present.
    fn print_conversion(&mut self, conversion: &'a Conversion, indent: usize) -> Result<()> {
        if conversion.sources().is_empty() {
            writeln!(self.out)?;
            self.write_indent(indent);
            writeln!(self.out, "derived without input variables")?;
        } else {
            writeln!(self.out, " from")?;
            for spec in conversion.sources() {
                self.write_indent(indent);
                self.out.push_str(&spec.signature());
                let product = self.planner.product();
                let present = product
                    .get(spec.name())
                    .map(|v| v.has_dimension_types(spec.dimensions()))
                    .unwrap_or(false);
                if present {
                    writeln!(self.out)?;
                } else if let Err(error) = self.find_and_print(spec, indent) {
                    // A sub-plan failing to render is reported inline and
                    // rendering continues with the next source.
                    writeln!(self.out)?;
                    self.write_indent(indent);
                    writeln!(self.out, "ERROR: {}", error)?;
                }
            }
        }
        if let Some(note) = conversion.note() {
            self.write_indent(indent);
            writeln!(self.out, "note: {}", note)?;
        }
        Ok(())
    }

    /// Find the conversion the planner would choose for this source and
    /// render it one level deeper.
    fn find_and_print(&mut self, spec: &'a SourceSpec, indent: usize) -> Result<()> {
        let registry = self.planner.registry();
        if let Some(index) = registry.name_index(spec.name()) {
            for conversion in registry.conversions_at(index) {
                if !conversion.is_enabled() {
                    continue;
                }
                let rank = conversion.num_dimensions();
                if self.planner.skip_set(index, rank) {
                    continue;
                }
                if !conversion.matches_dimensions(spec.dimensions(), None) {
                    continue;
                }
                let plannable = self.planner.with_skip(index, rank, |planner| {
                    conversion
                        .sources()
                        .iter()
                        .all(|source| planner.find_source(source))
                });
                if !plannable {
                    continue;
                }
                self.planner.set_skip(index, rank);
                let result = self.print_conversion(conversion, indent + 1);
                self.planner.clear_skip(index, rank);
                return result;
            }
        }
        Err(DerivationError::VariableNotFound(format!(
            "could not derive variable '{}'",
            spec.name()
        )))
    }
}

/// Render the registry, or the conversions applicable to a product.
///
/// With `product` absent every registered (and enabled) conversion is
/// listed, grouped per output name. With a product, each conversion that
/// is currently applicable - given what the product holds or can
/// recursively derive - is rendered as a tree of its chosen sub-plans.
pub fn format_conversions(
    registry: &ConversionRegistry,
    product: Option<&Product>,
) -> Result<String> {
    let Some(product) = product else {
        let mut out = String::new();
        for index in 0..registry.num_variables() {
            let conversions = registry.conversions_at(index);
            if conversions.is_empty() {
                continue;
            }
            out.push_str("============================================================\n");
            for conversion in conversions {
                if !conversion.is_enabled() {
                    continue;
                }
                out.push_str(&format_conversion(conversion));
            }
        }
        return Ok(out);
    };

    let mut printer = TreePrinter {
        planner: Planner::new(registry, product),
        out: String::new(),
    };
    for index in 0..registry.num_variables() {
        for conversion in registry.conversions_at(index) {
            if !conversion.is_enabled() {
                continue;
            }
            // A variable that already exists with these dimensions needs
            // no conversion; skip its candidates entirely.
            let present = product
                .get(conversion.name())
                .map(|v| v.has_dimension_types(conversion.dimensions()))
                .unwrap_or(false);
            if present {
                continue;
            }
            let rank = conversion.num_dimensions();
            let plannable = printer.planner.with_skip(index, rank, |planner| {
                conversion
                    .sources()
                    .iter()
                    .all(|source| planner.find_source(source))
            });
            if !plannable {
                continue;
            }
            printer.out.push_str(&conversion.signature());
            printer.planner.set_skip(index, rank);
            let result = printer.print_conversion(conversion, 1);
            printer.planner.clear_skip(index, rank);
            result?;
            writeln!(printer.out)?;
            // Only the first applicable candidate per name is shown.
            break;
        }
    }
    Ok(printer.out)
}
