//! Incremental-partition adaptive selection over metamorphic groups (MT-ART).
//!
//! The domain is split into equal-width buckets over the projected source
//! coordinate. Every iteration draws one candidate from each of up to
//! `candidates_per_iteration` uncovered buckets, scores the candidates
//! against a short window of recent selections, accepts the best one and
//! retires its bucket.

use crate::data::SamplerConfig;
use crate::error::{Result, SamplingError};
use crate::model::PairedSample;
use crate::projection::{manhattan, Projection};
use crate::strategy::PairStrategy;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

/// Equal-width buckets over the projected source coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct Buckets {
    members: Vec<Vec<usize>>,
    min: f64,
    step: f64,
}

impl Buckets {
    /// Split `coordinates` into `count` buckets spanning their `[min, max]`.
    ///
    /// Bucket `i` holds the indices whose coordinate lies in
    /// `[min + i * step, min + (i + 1) * step)`; the maximum lands in the
    /// last bucket.
    pub fn build(coordinates: &[f64], count: usize) -> Self {
        let count = count.max(1);
        let mut members = vec![Vec::new(); count];
        if coordinates.is_empty() {
            return Buckets {
                members,
                min: 0.0,
                step: 1.0,
            };
        }

        let min = coordinates.iter().copied().fold(f64::INFINITY, f64::min);
        let max = coordinates.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let step = if count > 1 {
            (max - min) / count as f64
        } else {
            1.0
        };

        let mut buckets = Buckets {
            members: Vec::new(),
            min,
            step,
        };
        for (index, &coordinate) in coordinates.iter().enumerate() {
            members[buckets.index_of(coordinate, count)].push(index);
        }
        buckets.members = members;
        buckets
    }

    fn index_of(&self, coordinate: f64, count: usize) -> usize {
        if self.step <= 0.0 || !self.step.is_finite() {
            return 0;
        }
        // NaN and negative offsets saturate to 0.
        let raw = ((coordinate - self.min) / self.step) as usize;
        raw.min(count - 1)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.iter().all(Vec::is_empty)
    }

    /// Domain indices held by bucket `bucket`.
    pub fn members(&self, bucket: usize) -> &[usize] {
        &self.members[bucket]
    }

    /// Bucket holding domain index `index`.
    pub fn bucket_of(&self, index: usize) -> Option<usize> {
        self.members
            .iter()
            .position(|members| members.contains(&index))
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

/// FIFO buffer of the most recent (source, follow-up) coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RecencyWindow {
    entries: VecDeque<(f64, f64)>,
    capacity: usize,
}

impl RecencyWindow {
    pub fn new(capacity: usize) -> Self {
        RecencyWindow {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append an entry, evicting the oldest once over capacity.
    pub fn push(&mut self, entry: (f64, f64)) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.entries.iter()
    }

    /// Diversity score of a candidate at `point`.
    ///
    /// Average Manhattan distance to the window plus `internal_weight` times
    /// the distance between the candidate's own coordinates. An empty window
    /// scores every candidate as `+inf`.
    pub fn score(&self, point: (f64, f64), internal_weight: f64) -> f64 {
        if self.entries.is_empty() {
            return f64::INFINITY;
        }
        let total: f64 = self.entries.iter().map(|&entry| manhattan(point, entry)).sum();
        let average = total / self.entries.len() as f64;
        average + internal_weight * (point.0 - point.1).abs()
    }
}

/// One MT-ART iteration: every candidate drawn and which one was accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct MtArtIteration {
    /// `(domain index, bucket, score)` in draw order.
    pub candidates: Vec<(usize, usize, f64)>,
    pub chosen: usize,
}

impl MtArtIteration {
    /// Score of the accepted candidate, if `chosen` is in range.
    pub fn chosen_score(&self) -> Option<f64> {
        self.candidates.get(self.chosen).map(|&(_, _, score)| score)
    }
}

/// MT-ART sampler over a fixed domain.
#[derive(Debug, Clone)]
pub struct MtArtSampler<'a, T, P> {
    domain: &'a [PairedSample<T>],
    projection: P,
    config: SamplerConfig,
}

impl<'a, T, P> MtArtSampler<'a, T, P>
where
    P: Projection<T>,
{
    pub fn new(domain: &'a [PairedSample<T>], projection: P, config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        Ok(MtArtSampler {
            domain,
            projection,
            config,
        })
    }

    fn coordinates(&self, pair: &PairedSample<T>) -> (f64, f64) {
        (
            self.projection.project(&pair.source.value),
            self.projection.project(&pair.follow_up.value),
        )
    }

    /// Buckets a request of `samples` selections would use.
    pub fn buckets_for(&self, samples: usize) -> Buckets {
        let sources: Vec<f64> = self
            .domain
            .iter()
            .map(|pair| self.projection.project(&pair.source.value))
            .collect();
        Buckets::build(&sources, self.config.partition_count(samples))
    }

    /// Select up to `samples` indices, returning them with their bucket.
    ///
    /// Fewer than `samples` come back when the uncovered non-empty buckets
    /// run out first.
    pub fn select_with_buckets(
        &self,
        samples: usize,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<(usize, usize)>> {
        self.select_traced(samples, rng).map(|(selected, _)| selected)
    }

    /// Like [`select_with_buckets`](Self::select_with_buckets), also
    /// recording how every iteration was decided.
    pub fn select_traced(
        &self,
        samples: usize,
        rng: &mut dyn RngCore,
    ) -> Result<(Vec<(usize, usize)>, Vec<MtArtIteration>)> {
        if samples > self.domain.len() {
            return Err(SamplingError::SampleSizeExceeded {
                requested: samples,
                available: self.domain.len(),
            });
        }
        if samples == 0 || self.domain.is_empty() {
            return Ok((Vec::new(), Vec::new()));
        }

        let buckets = self.buckets_for(samples);
        debug!(
            samples,
            domain = self.domain.len(),
            buckets = buckets.len(),
            step = buckets.step(),
            "mtart generate"
        );

        let mut covered: HashSet<usize> = HashSet::new();
        let mut window = RecencyWindow::new(self.config.recency_window);
        let mut selected = Vec::with_capacity(samples);
        let mut iterations = Vec::with_capacity(samples);

        for _ in 0..samples {
            let mut available: Vec<usize> = (0..buckets.len())
                .filter(|bucket| !covered.contains(bucket) && !buckets.members(*bucket).is_empty())
                .collect();
            if available.is_empty() {
                debug!(selected = selected.len(), "mtart buckets exhausted");
                break;
            }

            available.shuffle(rng);
            available.truncate(self.config.candidates_per_iteration);

            let mut candidates = Vec::with_capacity(available.len());
            let mut chosen = 0;
            for bucket in available {
                let members = buckets.members(bucket);
                let index = members[rng.gen_range(0..members.len())];
                let score = window.score(
                    self.coordinates(&self.domain[index]),
                    self.config.internal_distance_weight,
                );
                if candidates
                    .get(chosen)
                    .map_or(false, |&(_, _, best)| score > best)
                {
                    chosen = candidates.len();
                }
                candidates.push((index, bucket, score));
            }

            let (index, bucket, score) = candidates[chosen];
            trace!(index, bucket, score, "mtart accepted");
            window.push(self.coordinates(&self.domain[index]));
            covered.insert(bucket);
            selected.push((index, bucket));
            iterations.push(MtArtIteration { candidates, chosen });
        }

        Ok((selected, iterations))
    }
}

impl<'a, T, P> PairStrategy<T> for MtArtSampler<'a, T, P>
where
    T: Clone,
    P: Projection<T>,
{
    fn name(&self) -> &'static str {
        "mtart"
    }

    fn domain(&self) -> &[PairedSample<T>] {
        self.domain
    }

    fn select_indices(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<usize>> {
        Ok(self
            .select_with_buckets(count, rng)?
            .into_iter()
            .map(|(index, _)| index)
            .collect())
    }
}
