//! Uniform without-replacement sampling from a finite domain.

use crate::error::{Result, SamplingError};
use crate::model::PairedSample;
use crate::strategy::PairStrategy;
use rand::{Rng, RngCore};
use std::collections::HashSet;
use tracing::debug;

/// Draw distinct domain entries uniformly at random.
#[derive(Debug, Clone)]
pub struct UniformSampler<'a, T> {
    domain: &'a [PairedSample<T>],
}

impl<'a, T> UniformSampler<'a, T> {
    pub fn new(domain: &'a [PairedSample<T>]) -> Self {
        UniformSampler { domain }
    }

    pub fn domain_size(&self) -> usize {
        self.domain.len()
    }
}

impl<'a, T: Clone> PairStrategy<T> for UniformSampler<'a, T> {
    fn name(&self) -> &'static str {
        "uniform"
    }

    fn domain(&self) -> &[PairedSample<T>] {
        self.domain
    }

    /// Asking for exactly the domain size returns every index in domain
    /// order; asking for more is an error.
    fn select_indices(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<usize>> {
        let size = self.domain.len();
        if count > size {
            return Err(SamplingError::SampleSizeExceeded {
                requested: count,
                available: size,
            });
        }
        if count == size {
            return Ok((0..size).collect());
        }

        debug!(count, domain = size, "uniform generate");
        let mut seen = HashSet::with_capacity(count);
        let mut selected = Vec::with_capacity(count);
        while selected.len() < count {
            let index = rng.gen_range(0..size);
            if seen.insert(index) {
                selected.push(index);
            }
        }
        Ok(selected)
    }
}
