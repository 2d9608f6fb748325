//! Building a finite domain of metamorphic groups and summarising it.

use crate::error::{Result, SamplingError};
use crate::model::{CategoryId, PairedSample};
use crate::relation::RelationRegistry;
use crate::strategy::InputStrategy;
use rand::RngCore;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Over-provisioning applied on top of the minimum per-cell source count.
const SOURCE_SLACK: f64 = 1.5;

/// Sources needed so each (relation, category) cell is likely to receive at
/// least `min_per_cell` groups.
pub fn suggested_source_count(categories: usize, relations: usize, min_per_cell: usize) -> usize {
    (min_per_cell as f64 * categories as f64 * relations as f64 * SOURCE_SLACK).ceil() as usize
}

/// Expands generated source inputs through a relation registry.
#[derive(Debug)]
pub struct DomainBuilder<'r, T> {
    registry: &'r RelationRegistry<T>,
}

impl<'r, T: Clone> DomainBuilder<'r, T> {
    pub fn new(registry: &'r RelationRegistry<T>) -> Self {
        DomainBuilder { registry }
    }

    /// Generate `source_count` sources with `strategy` and collect every
    /// group the applicable relations build, in source order.
    pub fn build<S>(
        &self,
        strategy: &S,
        source_count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<PairedSample<T>>>
    where
        S: InputStrategy<T> + ?Sized,
    {
        if self.registry.is_empty() {
            return Err(SamplingError::config("no relations registered"));
        }

        let sources = strategy.generate(source_count, rng)?;
        let mut domain = Vec::new();
        for source in &sources {
            domain.extend(self.registry.groups_for(source, rng));
        }

        debug!(
            strategy = strategy.name(),
            sources = sources.len(),
            groups = domain.len(),
            "domain built"
        );
        Ok(domain)
    }
}

/// Relation × category group counts for a domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainStatistics {
    cells: BTreeMap<(String, CategoryId), usize>,
    relations: BTreeSet<String>,
    categories: BTreeSet<CategoryId>,
}

impl DomainStatistics {
    /// Sources without a category are counted under category 0.
    pub fn from_domain<T>(domain: &[PairedSample<T>]) -> Self {
        let mut stats = DomainStatistics::default();
        for pair in domain {
            let category = pair.source.category.unwrap_or(0);
            stats.relations.insert(pair.relation_id.clone());
            stats.categories.insert(category);
            *stats
                .cells
                .entry((pair.relation_id.clone(), category))
                .or_insert(0) += 1;
        }
        stats
    }

    pub fn count(&self, relation: &str, category: CategoryId) -> usize {
        self.cells
            .get(&(relation.to_string(), category))
            .copied()
            .unwrap_or(0)
    }

    pub fn relation_total(&self, relation: &str) -> usize {
        self.cells
            .iter()
            .filter(|((r, _), _)| r == relation)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn category_total(&self, category: CategoryId) -> usize {
        self.cells
            .iter()
            .filter(|((_, c), _)| *c == category)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn total(&self) -> usize {
        self.cells.values().sum()
    }

    pub fn relations(&self) -> impl Iterator<Item = &str> {
        self.relations.iter().map(String::as_str)
    }

    pub fn categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.categories.iter().copied()
    }

    /// Number of non-empty cells.
    pub fn populated_cells(&self) -> usize {
        self.cells.len()
    }
}

impl fmt::Display for DomainStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "| MR |")?;
        for category in &self.categories {
            write!(f, " P{} |", category)?;
        }
        writeln!(f, " Total |")?;

        write!(f, "|----|")?;
        for _ in &self.categories {
            write!(f, "----|")?;
        }
        writeln!(f, "-------|")?;

        for relation in &self.relations {
            write!(f, "| {} |", relation)?;
            for &category in &self.categories {
                write!(f, " {} |", self.count(relation, category))?;
            }
            writeln!(f, " {} |", self.relation_total(relation))?;
        }

        write!(f, "| Total |")?;
        for &category in &self.categories {
            write!(f, " {} |", self.category_total(category))?;
        }
        write!(f, " {} |", self.total())
    }
}
