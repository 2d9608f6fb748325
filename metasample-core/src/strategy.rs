//! Strategy traits shared by the samplers.
//!
//! Input strategies produce fresh test inputs; pair strategies choose from a
//! finite, pre-built domain of metamorphic groups. A driver can hold either
//! kind behind a trait object and swap strategies per experiment.

use crate::error::Result;
use crate::model::{PairedSample, SampleInput};
use rand::RngCore;

/// A strategy that generates test inputs.
pub trait InputStrategy<T> {
    /// Short name used in reports.
    fn name(&self) -> &'static str;

    /// Generate `count` inputs in selection order.
    fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<SampleInput<T>>>;
}

/// A strategy that selects metamorphic groups from a finite domain.
pub trait PairStrategy<T: Clone> {
    /// Short name used in reports.
    fn name(&self) -> &'static str;

    /// The domain this strategy selects from.
    fn domain(&self) -> &[PairedSample<T>];

    /// Choose up to `count` domain indices in selection order.
    fn select_indices(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<usize>>;

    /// Choose up to `count` groups in selection order.
    fn generate(&self, count: usize, rng: &mut dyn RngCore) -> Result<Vec<PairedSample<T>>> {
        let domain = self.domain();
        Ok(self
            .select_indices(count, rng)?
            .into_iter()
            .map(|index| domain[index].clone())
            .collect())
    }
}
