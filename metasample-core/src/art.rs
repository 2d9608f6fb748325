//! Adaptive random testing over raw values.
//!
//! Each round draws a fixed-size pool of random candidates and keeps the one
//! whose nearest already-accepted value is furthest away (the maximin rule).
//! Ties go to the candidate drawn first.

use crate::data::SamplerConfig;
use crate::error::{Result, SamplingError};
use crate::model::SampleInput;
use crate::projection::{NumericProjection, Projection};
use crate::rules::{SignedMagnitude, ValueRule};
use crate::strategy::InputStrategy;
use rand::RngCore;
use tracing::{debug, trace};

/// One ART round: the minimum distance of every candidate and the winner.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionRound {
    pub min_distances: Vec<f64>,
    pub chosen: usize,
}

impl SelectionRound {
    /// Minimum distance of the accepted candidate, if `chosen` is in range.
    pub fn chosen_distance(&self) -> Option<f64> {
        self.min_distances.get(self.chosen).copied()
    }
}

/// Adaptive candidate selector.
#[derive(Debug, Clone)]
pub struct AdaptiveRandomGenerator<R, P> {
    rule: R,
    projection: P,
    candidate_pool_size: usize,
}

impl AdaptiveRandomGenerator<SignedMagnitude, NumericProjection> {
    /// Signed integers in `-max_magnitude..=max_magnitude`, distance `|a - b|`.
    pub fn signed(config: &SamplerConfig) -> Result<Self> {
        Self::new(
            SignedMagnitude::new(config.max_magnitude),
            NumericProjection,
            config,
        )
    }
}

impl<R, P> AdaptiveRandomGenerator<R, P> {
    pub fn new(rule: R, projection: P, config: &SamplerConfig) -> Result<Self> {
        config.validate()?;
        Ok(AdaptiveRandomGenerator {
            rule,
            projection,
            candidate_pool_size: config.candidate_pool_size,
        })
    }

    pub fn candidate_pool_size(&self) -> usize {
        self.candidate_pool_size
    }

    /// Generate `count` values and record how every round was decided.
    pub fn generate_traced<T>(
        &self,
        count: usize,
        rng: &mut dyn RngCore,
    ) -> Result<(Vec<SampleInput<T>>, Vec<SelectionRound>)>
    where
        R: ValueRule<T>,
        P: Projection<T>,
    {
        if count < 1 {
            return Err(SamplingError::InvalidArgument {
                message: "ART needs a count of at least 1".to_string(),
            });
        }
        debug!(count, pool = self.candidate_pool_size, "art generate");

        let mut accepted = Vec::with_capacity(count);
        let mut coordinates = Vec::with_capacity(count);
        let mut rounds = Vec::with_capacity(count.saturating_sub(1));

        let first = self.rule.draw(rng);
        coordinates.push(self.projection.project(&first));
        accepted.push(SampleInput::uncategorized(first));

        while accepted.len() < count {
            let mut candidates = Vec::with_capacity(self.candidate_pool_size);
            let mut min_distances = Vec::with_capacity(self.candidate_pool_size);
            for _ in 0..self.candidate_pool_size {
                let candidate = self.rule.draw(rng);
                min_distances.push(min_distance(
                    self.projection.project(&candidate),
                    &coordinates,
                ));
                candidates.push(candidate);
            }

            let chosen = maximin_index(&min_distances);
            trace!(chosen, distance = min_distances[chosen], "art round");

            let winner = candidates.swap_remove(chosen);
            coordinates.push(self.projection.project(&winner));
            accepted.push(SampleInput::uncategorized(winner));
            rounds.push(SelectionRound {
                min_distances,
                chosen,
            });
        }

        Ok((accepted, rounds))
    }
}

impl<T, R, P> InputStrategy<T> for AdaptiveRandomGenerator<R, P>
where
    R: ValueRule<T>,
    P: Projection<T>,
{
    fn name(&self) -> &'static str {
        "art"
    }

    fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<SampleInput<T>>> {
        self.generate_traced(count, rng).map(|(inputs, _)| inputs)
    }
}

/// Distance from `point` to the nearest of `accepted`.
pub fn min_distance(point: f64, accepted: &[f64]) -> f64 {
    accepted
        .iter()
        .map(|&other| (point - other).abs())
        .fold(f64::INFINITY, f64::min)
}

/// Index of the largest value; the earliest index wins on ties.
pub fn maximin_index(min_distances: &[f64]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::NEG_INFINITY;
    for (index, &distance) in min_distances.iter().enumerate() {
        if distance > best_distance {
            best_distance = distance;
            best = index;
        }
    }
    best
}
