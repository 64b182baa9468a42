//! Conversion descriptors: declarative rules producing one variable from
//! zero or more source variables.

use std::fmt;
use std::fmt::Write as _;

use product_common::{DataType, DimensionKind, Variable};

use crate::error::Result;

/// Maximum number of source variables a conversion may declare.
pub const MAX_SOURCE_VARIABLES: usize = 8;

/// Pure function computing the output variable from its resolved sources.
///
/// Sources arrive in declared order, already coerced to the declared
/// data type and unit. The output is pre-allocated with the declared
/// shape and unit; the function fills its data.
pub type ComputeFn = Box<dyn Fn(&mut Variable, &[&Variable]) -> Result<()> + Send + Sync>;

/// Dynamic capability gate: a disabled conversion is invisible to the
/// resolver.
pub type EnabledFn = Box<dyn Fn() -> bool + Send + Sync>;

/// Requirement on one source variable of a conversion.
#[derive(Debug, Clone)]
pub struct SourceSpec {
    name: String,
    data_type: DataType,
    unit: Option<String>,
    dimensions: Vec<DimensionKind>,
    independent_length: Option<usize>,
}

impl SourceSpec {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn dimensions(&self) -> &[DimensionKind] {
        &self.dimensions
    }

    pub fn independent_length(&self) -> Option<usize> {
        self.independent_length
    }

    /// Render as `name {dims} [unit] (type)`.
    pub fn signature(&self) -> String {
        signature(
            &self.name,
            &self.dimensions,
            self.independent_length,
            self.unit.as_deref(),
            self.data_type,
        )
    }
}

/// A registered rule that derives one variable from source variables.
///
/// Built with [`Conversion::new`] and the builder methods, then handed to
/// the registry. The declared output signature (name, type, unit,
/// dimension kinds, independent length) is what the resolver matches
/// goals against.
pub struct Conversion {
    name: String,
    data_type: DataType,
    unit: Option<String>,
    dimensions: Vec<DimensionKind>,
    independent_length: Option<usize>,
    sources: Vec<SourceSpec>,
    enabled: Option<EnabledFn>,
    note: Option<String>,
    compute: ComputeFn,
}

impl Conversion {
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        unit: Option<&str>,
        dimensions: &[DimensionKind],
        compute: ComputeFn,
    ) -> Self {
        Self {
            name: name.into(),
            data_type,
            unit: unit.map(str::to_string),
            dimensions: dimensions.to_vec(),
            independent_length: None,
            sources: Vec::new(),
            enabled: None,
            note: None,
            compute,
        }
    }

    /// Declare the length of the output's independent axes.
    pub fn with_independent_length(mut self, length: usize) -> Self {
        self.independent_length = Some(length);
        self
    }

    /// Append a source requirement. Sources are resolved in declared
    /// order; at most [`MAX_SOURCE_VARIABLES`] may be added.
    pub fn with_source(
        mut self,
        name: impl Into<String>,
        data_type: DataType,
        unit: Option<&str>,
        dimensions: &[DimensionKind],
    ) -> Self {
        assert!(
            self.sources.len() < MAX_SOURCE_VARIABLES,
            "conversion for '{}' exceeds {} source variables",
            self.name,
            MAX_SOURCE_VARIABLES
        );
        self.sources.push(SourceSpec {
            name: name.into(),
            data_type,
            unit: unit.map(str::to_string),
            dimensions: dimensions.to_vec(),
            independent_length: None,
        });
        self
    }

    /// Append a source requirement with a required independent length.
    pub fn with_source_independent(
        mut self,
        name: impl Into<String>,
        data_type: DataType,
        unit: Option<&str>,
        dimensions: &[DimensionKind],
        independent_length: usize,
    ) -> Self {
        assert!(
            self.sources.len() < MAX_SOURCE_VARIABLES,
            "conversion for '{}' exceeds {} source variables",
            self.name,
            MAX_SOURCE_VARIABLES
        );
        self.sources.push(SourceSpec {
            name: name.into(),
            data_type,
            unit: unit.map(str::to_string),
            dimensions: dimensions.to_vec(),
            independent_length: Some(independent_length),
        });
        self
    }

    /// Gate this conversion behind a dynamic capability check.
    pub fn with_enabled(mut self, enabled: EnabledFn) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Attach a free-form description of the conversion's basis.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn dimensions(&self) -> &[DimensionKind] {
        &self.dimensions
    }

    pub fn num_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    pub fn independent_length(&self) -> Option<usize> {
        self.independent_length
    }

    pub fn sources(&self) -> &[SourceSpec] {
        &self.sources
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn compute(&self) -> &ComputeFn {
        &self.compute
    }

    /// Whether the capability gate (if any) is currently open.
    pub fn is_enabled(&self) -> bool {
        self.enabled.as_ref().map_or(true, |f| f())
    }

    /// Whether the output signature matches the requested dimension kinds
    /// and, when requested, independent length.
    pub fn matches_dimensions(
        &self,
        dimensions: &[DimensionKind],
        independent_length: Option<usize>,
    ) -> bool {
        if self.dimensions.len() != dimensions.len() {
            return false;
        }
        for (own, &requested) in self.dimensions.iter().zip(dimensions) {
            if *own != requested {
                return false;
            }
            if requested == DimensionKind::Independent {
                if let Some(length) = independent_length {
                    if self.independent_length != Some(length) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Render the output as `name {dims} [unit] (type)`.
    pub fn signature(&self) -> String {
        signature(
            &self.name,
            &self.dimensions,
            self.independent_length,
            self.unit.as_deref(),
            self.data_type,
        )
    }
}

impl fmt::Debug for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversion")
            .field("name", &self.name)
            .field("data_type", &self.data_type)
            .field("unit", &self.unit)
            .field("dimensions", &self.dimensions)
            .field("independent_length", &self.independent_length)
            .field("sources", &self.sources)
            .field("note", &self.note)
            .finish_non_exhaustive()
    }
}

fn signature(
    name: &str,
    dimensions: &[DimensionKind],
    independent_length: Option<usize>,
    unit: Option<&str>,
    data_type: DataType,
) -> String {
    let mut out = String::new();
    out.push_str(name);
    if !dimensions.is_empty() {
        out.push_str(" {");
        for (i, kind) in dimensions.iter().enumerate() {
            let _ = write!(out, "{}", kind);
            if *kind == DimensionKind::Independent {
                if let Some(length) = independent_length {
                    let _ = write!(out, "({})", length);
                }
            }
            if i + 1 < dimensions.len() {
                out.push(',');
            }
        }
        out.push('}');
    }
    if let Some(unit) = unit {
        let _ = write!(out, " [{}]", unit);
    }
    let _ = write!(out, " ({})", data_type);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_compute() -> ComputeFn {
        Box::new(|_, _| Ok(()))
    }

    #[test]
    fn test_signature_rendering() {
        let conversion = Conversion::new(
            "altitude_bounds",
            DataType::Float64,
            Some("m"),
            &[
                DimensionKind::Time,
                DimensionKind::Vertical,
                DimensionKind::Independent,
            ],
            noop_compute(),
        )
        .with_independent_length(2);
        assert_eq!(
            conversion.signature(),
            "altitude_bounds {time,vertical,independent(2)} [m] (float64)"
        );
    }

    #[test]
    fn test_matches_dimensions() {
        let conversion = Conversion::new(
            "x",
            DataType::Float64,
            None,
            &[DimensionKind::Vertical, DimensionKind::Independent],
            noop_compute(),
        )
        .with_independent_length(2);
        let dims = [DimensionKind::Vertical, DimensionKind::Independent];
        assert!(conversion.matches_dimensions(&dims, None));
        assert!(conversion.matches_dimensions(&dims, Some(2)));
        assert!(!conversion.matches_dimensions(&dims, Some(3)));
        assert!(!conversion.matches_dimensions(&[DimensionKind::Vertical], None));
    }

    #[test]
    fn test_enabled_gate() {
        let conversion = Conversion::new("x", DataType::Float64, None, &[], noop_compute())
            .with_enabled(Box::new(|| false));
        assert!(!conversion.is_enabled());
        let open = Conversion::new("y", DataType::Float64, None, &[], noop_compute());
        assert!(open.is_enabled());
    }
}
