//! Core data types: seeds, the seeded random stream and sampler configuration.

use crate::error::{Result, SamplingError};
use rand::{RngCore, SeedableRng};
use std::fmt;

/// Splittable random seed for deterministic sampling.
///
/// Seeds can be split to create independent random streams, so repeated
/// experiment runs can each get their own reproducible source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(pub u64, pub u64);

impl Seed {
    /// Create a new seed from a single value.
    pub fn from_u64(value: u64) -> Self {
        let state = splitmix64_mix(value);
        let gamma = mix_gamma(state);
        Seed(state, gamma)
    }

    /// Split a seed into two independent seeds.
    /// Uses SplitMix64 splitting strategy for independence.
    pub fn split(self) -> (Self, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        let new_gamma = mix_gamma(output);

        (Seed(new_state, gamma), Seed(output, new_gamma))
    }

    /// Split off `count` independent seeds, one per repetition.
    pub fn split_n(self, count: usize) -> Vec<Seed> {
        let mut seeds = Vec::with_capacity(count);
        let mut current = self;
        for _ in 0..count {
            let (this, next) = current.split();
            seeds.push(this);
            current = next;
        }
        seeds
    }

    /// Generate the next random value and advance the seed.
    pub fn next_u64(self) -> (u64, Self) {
        let Seed(state, gamma) = self;
        let new_state = state.wrapping_add(gamma);
        let output = splitmix64_mix(new_state);
        (output, Seed(new_state, gamma))
    }

    /// Generate a random seed from the thread-local generator.
    pub fn random() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        Seed::from_u64(rng.gen())
    }

    /// Turn the seed into a mutable random stream.
    pub fn rng(self) -> SeedRng {
        SeedRng { seed: self }
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({}, {})", self.0, self.1)
    }
}

/// A `RngCore` stream driven by a [`Seed`].
///
/// Every sampler takes `&mut dyn RngCore`, so any `rand` generator works;
/// this one exists so that a `u64` seed on the command line reproduces a run
/// exactly.
#[derive(Debug, Clone)]
pub struct SeedRng {
    seed: Seed,
}

impl SeedRng {
    /// The seed the stream will use for its next draw.
    pub fn seed(&self) -> Seed {
        self.seed
    }
}

impl RngCore for SeedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let (value, next) = self.seed.next_u64();
        self.seed = next;
        value
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for SeedRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Seed::from_u64(u64::from_le_bytes(seed)).rng()
    }

    fn seed_from_u64(state: u64) -> Self {
        Seed::from_u64(state).rng()
    }
}

/// Largest accepted MT-ART bucket multiplier.
pub const MAX_PARTITION_MULTIPLIER: f64 = 1000.0;

/// Tunable constants shared by the samplers.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerConfig {
    /// Candidates drawn per ART round.
    pub candidate_pool_size: usize,

    /// Candidate buckets inspected per MT-ART iteration.
    pub candidates_per_iteration: usize,

    /// Capacity of the MT-ART recency window.
    pub recency_window: usize,

    /// MT-ART bucket count as a multiple of the requested sample count.
    pub partition_multiplier: f64,

    /// Weight of the source/follow-up separation bonus in MT-ART scoring.
    pub internal_distance_weight: f64,

    /// Largest magnitude produced by the signed-magnitude raw value rule.
    pub max_magnitude: i64,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        SamplerConfig {
            candidate_pool_size: 10,
            candidates_per_iteration: 5,
            recency_window: 5,
            partition_multiplier: 1.5,
            internal_distance_weight: 0.001,
            max_magnitude: 999_999_999,
        }
    }
}

impl SamplerConfig {
    /// Set the ART candidate pool size.
    pub fn with_candidate_pool_size(mut self, size: usize) -> Self {
        self.candidate_pool_size = size;
        self
    }

    /// Set the number of MT-ART candidates per iteration.
    pub fn with_candidates_per_iteration(mut self, count: usize) -> Self {
        self.candidates_per_iteration = count;
        self
    }

    /// Set the recency window capacity.
    pub fn with_recency_window(mut self, capacity: usize) -> Self {
        self.recency_window = capacity;
        self
    }

    /// Set the bucket multiplier.
    pub fn with_partition_multiplier(mut self, multiplier: f64) -> Self {
        self.partition_multiplier = multiplier;
        self
    }

    /// Set the internal distance weight.
    pub fn with_internal_distance_weight(mut self, weight: f64) -> Self {
        self.internal_distance_weight = weight;
        self
    }

    /// Set the raw value magnitude bound.
    pub fn with_max_magnitude(mut self, max: i64) -> Self {
        self.max_magnitude = max;
        self
    }

    /// Number of MT-ART buckets for a request of `samples` selections.
    ///
    /// Never more than `samples * MAX_PARTITION_MULTIPLIER`, whatever the
    /// multiplier holds.
    pub fn partition_count(&self, samples: usize) -> usize {
        let multiplier = self.partition_multiplier.min(MAX_PARTITION_MULTIPLIER);
        ((samples as f64 * multiplier).round() as usize).max(1)
    }

    /// Reject settings no sampler can run with.
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: &str| {
            Err(SamplingError::InvalidConfiguration {
                message: message.to_string(),
            })
        };

        if self.candidate_pool_size == 0 {
            return invalid("candidate pool size must be at least 1");
        }
        if self.candidates_per_iteration == 0 {
            return invalid("candidates per iteration must be at least 1");
        }
        if self.recency_window == 0 {
            return invalid("recency window must hold at least 1 entry");
        }
        if !self.partition_multiplier.is_finite() || self.partition_multiplier <= 0.0 {
            return invalid("partition multiplier must be a positive finite number");
        }
        if self.partition_multiplier > MAX_PARTITION_MULTIPLIER {
            return invalid("partition multiplier must not exceed 1000");
        }
        if !self.internal_distance_weight.is_finite() || self.internal_distance_weight < 0.0 {
            return invalid("internal distance weight must be a non-negative finite number");
        }
        if self.max_magnitude < 0 {
            return invalid("max magnitude must not be negative");
        }
        Ok(())
    }
}

/// SplitMix64 mixing function for high-quality output.
fn splitmix64_mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

/// Generate a good gamma value for SplitMix64 splitting.
fn mix_gamma(mut z: u64) -> u64 {
    z = splitmix64_mix(z);
    // Ensure gamma is odd for maximal period
    (z | 1).wrapping_mul(0x9e3779b97f4a7c15)
}
