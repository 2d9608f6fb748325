//! Test inputs and metamorphic groups.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based category identifier.
pub type CategoryId = usize;

/// A single generated test input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleInput<T> {
    pub value: T,
    /// Category the value was drawn from; `None` for pure random generation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
}

impl<T> SampleInput<T> {
    /// An input that belongs to no category.
    pub fn uncategorized(value: T) -> Self {
        SampleInput {
            value,
            category: None,
        }
    }

    /// An input drawn from `category`.
    pub fn in_category(value: T, category: CategoryId) -> Self {
        SampleInput {
            value,
            category: Some(category),
        }
    }

    /// A follow-up input that inherits this input's category.
    pub fn derive<U>(&self, value: U) -> SampleInput<U> {
        SampleInput {
            value,
            category: self.category,
        }
    }

    pub fn map<U, F>(self, f: F) -> SampleInput<U>
    where
        F: FnOnce(T) -> U,
    {
        SampleInput {
            value: f(self.value),
            category: self.category,
        }
    }
}

impl<T: fmt::Display> fmt::Display for SampleInput<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category {
            Some(category) => write!(f, "{} [P{}]", self.value, category),
            None => write!(f, "{}", self.value),
        }
    }
}

/// One concrete (source, follow-up) instance of a metamorphic relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairedSample<T> {
    pub relation_id: String,
    #[serde(default)]
    pub description: String,
    pub source: SampleInput<T>,
    pub follow_up: SampleInput<T>,
}

impl<T> PairedSample<T> {
    pub fn new(
        relation_id: impl Into<String>,
        description: impl Into<String>,
        source: SampleInput<T>,
        follow_up: SampleInput<T>,
    ) -> Self {
        PairedSample {
            relation_id: relation_id.into(),
            description: description.into(),
            source,
            follow_up,
        }
    }
}

impl<T: fmt::Display> fmt::Display for PairedSample<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: source={}, follow-up={}",
            self.relation_id, self.source, self.follow_up
        )
    }
}
