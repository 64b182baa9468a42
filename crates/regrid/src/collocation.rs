//! Collocation tables: which sample of product A matches which sample
//! of product B.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use product_common::DimensionKind;

use crate::error::{RegridError, Result};

/// Metadata of the matching (B-side) product of a collocation pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchMetadata {
    /// File the matching product can be imported from.
    pub filename: String,
    /// Identifier of the matching product.
    pub source_product: String,
    /// Per-kind dimension lengths of the matching product.
    pub dimension_lengths: Vec<(DimensionKind, usize)>,
    /// Time coverage of the matching product, if known.
    #[serde(default)]
    pub datetime_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub datetime_stop: Option<DateTime<Utc>>,
}

impl MatchMetadata {
    /// The matching product's length for a dimension kind.
    pub fn dimension_length(&self, kind: DimensionKind) -> Option<usize> {
        self.dimension_lengths
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|&(_, length)| length)
    }
}

/// One collocated sample pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollocationPair {
    /// Unique pair identifier; products carry it in their
    /// `collocation_index` variable.
    pub collocation_index: i64,
    /// Identifier of the A-side source product.
    pub source_product_a: String,
    /// Sample index within the A-side product.
    pub index_a: usize,
    /// Sample index within the B-side product.
    pub index_b: usize,
    /// Metadata of the B-side product.
    pub metadata_b: MatchMetadata,
}

/// An ordered set of collocation pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollocationResult {
    pairs: Vec<CollocationPair>,
}

impl CollocationResult {
    pub fn new(pairs: Vec<CollocationPair>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[CollocationPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Shallow copy restricted to pairs whose A side matches `source`.
    pub fn filtered_for_source_a(&self, source: &str) -> CollocationResult {
        CollocationResult {
            pairs: self
                .pairs
                .iter()
                .filter(|pair| pair.source_product_a == source)
                .cloned()
                .collect(),
        }
    }

    /// Sort pairs by collocation id for linear scanning.
    pub fn sort_by_collocation_index(&mut self) {
        self.pairs.sort_by_key(|pair| pair.collocation_index);
    }

    /// Find the pair with the given collocation id.
    pub fn find_pair(&self, collocation_index: i64) -> Option<&CollocationPair> {
        self.pairs
            .iter()
            .find(|pair| pair.collocation_index == collocation_index)
    }

    /// Parse a collocation result from its JSON serialization.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| RegridError::InvalidFormat(e.to_string()))
    }

    /// Read a collocation result from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| RegridError::InvalidFormat(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(id: i64, source_a: &str) -> CollocationPair {
        CollocationPair {
            collocation_index: id,
            source_product_a: source_a.to_string(),
            index_a: 0,
            index_b: 0,
            metadata_b: MatchMetadata {
                filename: "match.dat".to_string(),
                source_product: "B".to_string(),
                dimension_lengths: vec![(DimensionKind::Time, 4), (DimensionKind::Vertical, 7)],
                datetime_start: None,
                datetime_stop: None,
            },
        }
    }

    #[test]
    fn test_filter_and_sort() {
        let mut result = CollocationResult::new(vec![pair(3, "a"), pair(1, "a"), pair(2, "b")]);
        let mut filtered = result.filtered_for_source_a("a");
        filtered.sort_by_collocation_index();
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.pairs()[0].collocation_index, 1);
        assert_eq!(filtered.pairs()[1].collocation_index, 3);
        assert!(filtered.find_pair(3).is_some());
        assert!(filtered.find_pair(2).is_none());

        result.sort_by_collocation_index();
        assert_eq!(result.pairs()[0].collocation_index, 1);
    }

    #[test]
    fn test_json_round_trip() {
        let result = CollocationResult::new(vec![pair(5, "a")]);
        let text = result.to_json().unwrap();
        let back = CollocationResult::from_json(&text).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.pairs()[0].collocation_index, 5);
        assert_eq!(
            back.pairs()[0].metadata_b.dimension_length(DimensionKind::Vertical),
            Some(7)
        );
    }
}
