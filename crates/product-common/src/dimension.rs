//! Dimension kinds shared by all product variables.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of dimensions a variable may carry.
pub const MAX_RANK: usize = 8;

/// Symbolic axis label for a variable dimension.
///
/// All variables of a product share the same length per kind, with one
/// exception: `Independent` denotes a fixed small-length axis whose length
/// participates in type identity (e.g. layer bounds have an independent
/// axis of length 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionKind {
    Time,
    Vertical,
    Spectral,
    Latitude,
    Longitude,
    Independent,
}

impl DimensionKind {
    /// All dimension kinds, in canonical order.
    pub const ALL: [DimensionKind; 6] = [
        DimensionKind::Time,
        DimensionKind::Vertical,
        DimensionKind::Spectral,
        DimensionKind::Latitude,
        DimensionKind::Longitude,
        DimensionKind::Independent,
    ];

    /// The canonical lowercase name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            DimensionKind::Time => "time",
            DimensionKind::Vertical => "vertical",
            DimensionKind::Spectral => "spectral",
            DimensionKind::Latitude => "latitude",
            DimensionKind::Longitude => "longitude",
            DimensionKind::Independent => "independent",
        }
    }

    /// Whether this kind shares its length product-wide.
    ///
    /// Independent axes carry their own per-variable length; every other
    /// kind must agree with the product's dimension table.
    pub fn is_shared(&self) -> bool {
        !matches!(self, DimensionKind::Independent)
    }
}

impl fmt::Display for DimensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One axis of a variable: its kind and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimension {
    pub kind: DimensionKind,
    pub length: usize,
}

impl Dimension {
    pub fn new(kind: DimensionKind, length: usize) -> Self {
        Self { kind, length }
    }
}
