//! Pure random input generation, the baseline every other strategy is
//! compared against.

use crate::data::SamplerConfig;
use crate::error::Result;
use crate::model::SampleInput;
use crate::rules::{SignedMagnitude, ValueRule};
use crate::strategy::InputStrategy;
use rand::RngCore;

/// Independent draws from a single rule, with no category attached.
#[derive(Debug, Clone)]
pub struct RandomInputGenerator<R> {
    rule: R,
}

impl RandomInputGenerator<SignedMagnitude> {
    /// The same signed-magnitude rule ART draws its candidates from.
    pub fn signed(config: &SamplerConfig) -> Result<Self> {
        config.validate()?;
        Ok(RandomInputGenerator::new(SignedMagnitude::new(
            config.max_magnitude,
        )))
    }
}

impl<R> RandomInputGenerator<R> {
    pub fn new(rule: R) -> Self {
        RandomInputGenerator { rule }
    }
}

impl<T, R> InputStrategy<T> for RandomInputGenerator<R>
where
    R: ValueRule<T>,
{
    fn name(&self) -> &'static str {
        "random"
    }

    fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<SampleInput<T>>> {
        Ok((0..count)
            .map(|_| SampleInput::uncategorized(self.rule.draw(rng)))
            .collect())
    }
}
