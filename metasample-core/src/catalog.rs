//! Partition catalog and relation records.
//!
//! The catalog is plain data: an ordered list of category records and a map
//! of named relation records. It is loaded once, validated, and then handed
//! to whichever sampler needs it.

use crate::error::{Result, SamplingError};
use crate::model::CategoryId;
use crate::rules::GenerationRule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One category (partition) record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpec {
    pub id: CategoryId,
    #[serde(default)]
    pub size: u64,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<GenerationRule>,
}

/// One named relation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationRecord {
    #[serde(rename = "type")]
    pub kind: String,
}

impl RelationRecord {
    /// Selection weight carried by an `"x-y"` type tag; `y` when it parses,
    /// 1.0 otherwise.
    pub fn weight(&self) -> f64 {
        self.kind
            .split('-')
            .nth(1)
            .and_then(|part| part.trim().parse::<f64>().ok())
            .filter(|weight| weight.is_finite() && *weight > 0.0)
            .unwrap_or(1.0)
    }
}

/// A validated catalog document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "partitions")]
    pub categories: Vec<CategorySpec>,
    #[serde(rename = "mrs", default)]
    pub relations: BTreeMap<String, RelationRecord>,
}

impl Catalog {
    /// Build a catalog from records and validate it.
    pub fn new(
        categories: Vec<CategorySpec>,
        relations: BTreeMap<String, RelationRecord>,
    ) -> Result<Self> {
        let catalog = Catalog {
            categories,
            relations,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate a JSON catalog document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)
            .map_err(|e| SamplingError::config(format!("malformed catalog: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read, parse and validate a JSON catalog file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SamplingError::config(format!("cannot read catalog {}: {e}", path.display()))
        })?;
        Self::from_json_str(&json)
    }

    /// Check the invariants every sampler relies on.
    pub fn validate(&self) -> Result<()> {
        if self.categories.is_empty() {
            return Err(SamplingError::config("catalog declares no partitions"));
        }

        for (index, category) in self.categories.iter().enumerate() {
            if category.id != index + 1 {
                return Err(SamplingError::config(format!(
                    "partition ids must be contiguous from 1: position {} has id {}",
                    index + 1,
                    category.id
                )));
            }
            if !category.weight.is_finite() || category.weight <= 0.0 {
                return Err(SamplingError::config(format!(
                    "partition {} has non-positive weight {}",
                    category.id, category.weight
                )));
            }
            if let Some(rule) = &category.rule {
                rule.validate()?;
            }
        }

        for (name, record) in &self.relations {
            if name.trim().is_empty() {
                return Err(SamplingError::config("relation record with an empty name"));
            }
            if record.kind.trim().is_empty() {
                return Err(SamplingError::config(format!(
                    "relation {name} has an empty type"
                )));
            }
        }

        Ok(())
    }

    /// Weights in category id order.
    pub fn weights(&self) -> Vec<f64> {
        self.categories.iter().map(|c| c.weight).collect()
    }

    /// Look up a category by its 1-based id.
    pub fn category(&self, id: CategoryId) -> Option<&CategorySpec> {
        id.checked_sub(1).and_then(|index| self.categories.get(index))
    }

    /// Relation names in sorted order.
    pub fn relation_names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }
}
