//! Partition-balanced selection over a domain of metamorphic groups.
//!
//! The domain is grouped into cells keyed by (source category, relation id).
//! Each cell carries a weight: its category weight times its relation weight.
//! Each step picks the cell with the lowest `selected / weight` rate and draws
//! one group from it uniformly. Equal rates go to the heavier cell, then to
//! the first cell in key order.

use crate::catalog::Catalog;
use crate::error::{Result, SamplingError};
use crate::model::{CategoryId, PairedSample};
use crate::strategy::PairStrategy;
use rand::{Rng, RngCore};
use std::collections::BTreeMap;
use tracing::debug;

/// Rates closer than this count as equal.
const RATE_TOLERANCE: f64 = 1e-9;

/// Key of one domain cell. Sources without a category fall in category 0.
pub type CellKey = (CategoryId, String);

#[derive(Debug, Clone)]
struct Cell {
    members: Vec<usize>,
    weight: f64,
}

/// Balanced sampler over (category, relation) cells.
#[derive(Debug, Clone)]
pub struct PartitionPairSampler<'a, T> {
    domain: &'a [PairedSample<T>],
    cells: BTreeMap<CellKey, Cell>,
}

impl<'a, T> PartitionPairSampler<'a, T> {
    /// Every cell weighs 1.0, so selection cycles through the cells.
    pub fn new(domain: &'a [PairedSample<T>]) -> Self {
        Self::with_weights(domain, |_| Some(1.0), |_| 1.0)
    }

    /// Cell weights from a catalog: partition weight times the relation's
    /// type weight (1.0 for relations the catalog does not name).
    ///
    /// Cells whose category the catalog does not declare are never selected.
    pub fn from_catalog(domain: &'a [PairedSample<T>], catalog: &Catalog) -> Self {
        Self::with_weights(
            domain,
            |category| catalog.category(category).map(|spec| spec.weight),
            |relation| {
                catalog
                    .relations
                    .get(relation)
                    .map_or(1.0, |record| record.weight())
            },
        )
    }

    /// Build cells with caller-supplied weights. A category weighed `None`
    /// drops its cells.
    pub fn with_weights<C, R>(
        domain: &'a [PairedSample<T>],
        category_weight: C,
        relation_weight: R,
    ) -> Self
    where
        C: Fn(CategoryId) -> Option<f64>,
        R: Fn(&str) -> f64,
    {
        let mut members: BTreeMap<CellKey, Vec<usize>> = BTreeMap::new();
        for (index, pair) in domain.iter().enumerate() {
            let key = (pair.source.category.unwrap_or(0), pair.relation_id.clone());
            members.entry(key).or_default().push(index);
        }

        let cells = members
            .into_iter()
            .filter_map(|(key, members)| {
                let weight = category_weight(key.0)? * relation_weight(&key.1);
                (weight.is_finite() && weight > 0.0).then_some((key, Cell { members, weight }))
            })
            .collect();
        PartitionPairSampler { domain, cells }
    }

    /// Cells in iteration order with their sizes.
    pub fn cell_sizes(&self) -> impl Iterator<Item = (&CellKey, usize)> {
        self.cells.iter().map(|(key, cell)| (key, cell.members.len()))
    }

    pub fn cell_weight(&self, key: &CellKey) -> Option<f64> {
        self.cells.get(key).map(|cell| cell.weight)
    }

    /// Cell holding domain index `index`.
    pub fn cell_of(&self, index: usize) -> Option<&CellKey> {
        self.cells
            .iter()
            .find(|(_, cell)| cell.members.contains(&index))
            .map(|(key, _)| key)
    }
}

/// Index of the lowest rate; near-equal rates prefer the larger weight, then
/// the lower index.
fn lowest_rate(rates: &[f64], weights: &[f64]) -> Option<usize> {
    let lowest = rates.iter().copied().fold(f64::INFINITY, f64::min);
    let mut chosen: Option<usize> = None;
    for (cell, &rate) in rates.iter().enumerate() {
        if (rate - lowest).abs() >= RATE_TOLERANCE {
            continue;
        }
        match chosen {
            Some(best) if weights[cell] - weights[best] < RATE_TOLERANCE => {}
            _ => chosen = Some(cell),
        }
    }
    chosen
}

impl<'a, T: Clone> PairStrategy<T> for PartitionPairSampler<'a, T> {
    fn name(&self) -> &'static str {
        "balanced"
    }

    fn domain(&self) -> &[PairedSample<T>] {
        self.domain
    }

    /// Draws are with replacement inside a cell.
    fn select_indices(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<usize>> {
        if count > self.domain.len() {
            return Err(SamplingError::SampleSizeExceeded {
                requested: count,
                available: self.domain.len(),
            });
        }
        debug!(count, cells = self.cells.len(), "balanced generate");

        let cells: Vec<&Cell> = self.cells.values().collect();
        let weights: Vec<f64> = cells.iter().map(|cell| cell.weight).collect();
        let mut selected_counts = vec![0usize; cells.len()];
        let mut rates = vec![0.0f64; cells.len()];
        let mut selected = Vec::with_capacity(count);

        for _ in 0..count {
            let Some(cell) = lowest_rate(&rates, &weights) else {
                debug!(selected = selected.len(), "balanced has no weighted cells");
                break;
            };

            let members = &cells[cell].members;
            selected.push(members[rng.gen_range(0..members.len())]);
            selected_counts[cell] += 1;
            rates[cell] = selected_counts[cell] as f64 / weights[cell];
        }

        Ok(selected)
    }
}
