//! Partition-weighted balanced allocation.
//!
//! Each step picks the category with the lowest sampling rate
//! (`selected / weight`), draws one value from that category's rule and
//! updates its rate. On equal rates the heavier category wins, and on equal
//! weights the lower id wins.

use crate::catalog::Catalog;
use crate::error::{Result, SamplingError};
use crate::model::{CategoryId, SampleInput};
use crate::rules::ValueRule;
use crate::strategy::InputStrategy;
use rand::RngCore;
use std::fmt;
use tracing::{debug, trace};

type BoxedRule<T> = Box<dyn ValueRule<T> + Send + Sync>;

/// A category with its weight and generation rule.
pub struct Category<T> {
    pub id: CategoryId,
    pub weight: f64,
    rule: BoxedRule<T>,
}

impl<T> Category<T> {
    pub fn new<R>(id: CategoryId, weight: f64, rule: R) -> Self
    where
        R: ValueRule<T> + Send + Sync + 'static,
    {
        Category {
            id,
            weight,
            rule: Box::new(rule),
        }
    }

    /// Whether `value` satisfies this category's rule.
    pub fn contains(&self, value: &T) -> bool {
        self.rule.contains(value)
    }
}

impl<T> fmt::Debug for Category<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Category")
            .field("id", &self.id)
            .field("weight", &self.weight)
            .finish_non_exhaustive()
    }
}

/// Per-call selection counters. Never outlives one `generate` call.
struct SamplingState {
    counts: Vec<u64>,
    rates: Vec<f64>,
}

impl SamplingState {
    fn new(categories: usize) -> Self {
        SamplingState {
            counts: vec![0; categories],
            rates: vec![0.0; categories],
        }
    }

    fn record(&mut self, index: usize, weight: f64) {
        self.counts[index] += 1;
        self.rates[index] = self.counts[index] as f64 / weight;
    }
}

/// Balanced allocator over a fixed set of categories.
#[derive(Debug)]
pub struct PartitionAllocator<T> {
    categories: Vec<Category<T>>,
}

impl PartitionAllocator<i64> {
    /// Build an integer allocator from a catalog whose partitions all carry a rule.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self> {
        catalog.validate()?;
        let categories = catalog
            .categories
            .iter()
            .map(|spec| {
                let rule = spec.rule.clone().ok_or_else(|| {
                    SamplingError::config(format!(
                        "partition {} has no generation rule",
                        spec.id
                    ))
                })?;
                Ok(Category::new(spec.id, spec.weight, rule))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(categories)
    }
}

impl<T> PartitionAllocator<T> {
    pub fn new(categories: Vec<Category<T>>) -> Result<Self> {
        if categories.is_empty() {
            return Err(SamplingError::config("allocator needs at least one category"));
        }
        for (index, category) in categories.iter().enumerate() {
            if category.id != index + 1 {
                return Err(SamplingError::config(format!(
                    "category ids must be contiguous from 1: position {} has id {}",
                    index + 1,
                    category.id
                )));
            }
            if !category.weight.is_finite() || category.weight <= 0.0 {
                return Err(SamplingError::config(format!(
                    "category {} has non-positive weight {}",
                    category.id, category.weight
                )));
            }
        }
        Ok(PartitionAllocator { categories })
    }

    pub fn categories(&self) -> &[Category<T>] {
        &self.categories
    }

    /// Draw a single value from one category's rule.
    pub fn generate_in_category(
        &self,
        id: CategoryId,
        rng: &mut dyn RngCore,
    ) -> Result<SampleInput<T>> {
        let category = id
            .checked_sub(1)
            .and_then(|index| self.categories.get(index))
            .ok_or(SamplingError::InvalidCategory {
                id,
                categories: self.categories.len(),
            })?;
        Ok(SampleInput::in_category(category.rule.draw(rng), id))
    }

    /// Category sequence `generate(count)` would follow. Needs no randomness.
    pub fn allocation_order(&self, count: usize) -> Vec<CategoryId> {
        let mut state = SamplingState::new(self.categories.len());
        (0..count)
            .map(|_| {
                let index = self.lowest_rate_index(&state);
                state.record(index, self.categories[index].weight);
                index + 1
            })
            .collect()
    }

    /// Count and share per category for a generated batch.
    pub fn statistics(&self, inputs: &[SampleInput<T>]) -> AllocationStatistics {
        let mut counts = vec![0usize; self.categories.len()];
        for input in inputs {
            if let Some(slot) = input
                .category
                .and_then(|id| id.checked_sub(1))
                .and_then(|index| counts.get_mut(index))
            {
                *slot += 1;
            }
        }

        let total = inputs.len();
        let shares = counts
            .into_iter()
            .enumerate()
            .map(|(index, count)| CategoryShare {
                id: index + 1,
                count,
                percentage: if total > 0 {
                    100.0 * count as f64 / total as f64
                } else {
                    0.0
                },
            })
            .collect();

        AllocationStatistics { total, shares }
    }

    fn lowest_rate_index(&self, state: &SamplingState) -> usize {
        let mut selected = 0;
        let mut lowest = f64::INFINITY;
        for (index, &rate) in state.rates.iter().enumerate() {
            if rate < lowest {
                lowest = rate;
                selected = index;
            } else if rate == lowest && self.categories[index].weight > self.categories[selected].weight
            {
                selected = index;
            }
        }
        selected
    }
}

impl<T> InputStrategy<T> for PartitionAllocator<T> {
    fn name(&self) -> &'static str {
        "partition"
    }

    fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<SampleInput<T>>> {
        debug!(count, categories = self.categories.len(), "partition generate");
        let mut state = SamplingState::new(self.categories.len());
        let mut inputs = Vec::with_capacity(count);

        for _ in 0..count {
            let index = self.lowest_rate_index(&state);
            let input = self.generate_in_category(index + 1, rng)?;
            state.record(index, self.categories[index].weight);
            trace!(category = index + 1, rate = state.rates[index], "allocated");
            inputs.push(input);
        }

        Ok(inputs)
    }
}

/// Share of one category in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub id: CategoryId,
    pub count: usize,
    pub percentage: f64,
}

/// Balance summary for a generated batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationStatistics {
    pub total: usize,
    pub shares: Vec<CategoryShare>,
}

impl AllocationStatistics {
    pub fn count(&self, id: CategoryId) -> Option<usize> {
        self.shares.iter().find(|s| s.id == id).map(|s| s.count)
    }
}

impl fmt::Display for AllocationStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total test cases: {}", self.total)?;
        for share in &self.shares {
            writeln!(
                f,
                "  P{}: {} ({:.2}%)",
                share.id, share.count, share.percentage
            )?;
        }
        Ok(())
    }
}
