//! Uniform sampling properties

use crate::{arbitrary_seed, check};
use metasample::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn domain(size: usize) -> Vec<PairedSample<String>> {
    (0..size)
        .map(|i| {
            PairedSample::new(
                "MR2",
                "prefix",
                SampleInput::uncategorized(i.to_string()),
                SampleInput::uncategorized(format!("+{}", i)),
            )
        })
        .collect()
}

/// Property: a request never repeats a domain index
pub fn test_distinct_indices() {
    let sizes = (1usize..120).prop_flat_map(|size| (Just(size), 0..=size));
    check(128, (arbitrary_seed(), sizes), |(seed, (size, count))| {
        let domain = domain(size);
        let sampler = UniformSampler::new(&domain);
        let picks = sampler.select_indices(count, &mut seed.rng()).unwrap();
        prop_assert_eq!(picks.len(), count);
        prop_assert!(picks.iter().all(|&i| i < size));
        let unique: HashSet<_> = picks.iter().collect();
        prop_assert_eq!(unique.len(), count);
        Ok(())
    });
}

/// Asking for more pairs than the domain holds is an error
pub fn test_oversized_request_rejected() {
    let domain = domain(10);
    let sampler = UniformSampler::new(&domain);
    assert!(sampler.generate(11, &mut Seed::from_u64(1).rng()).is_err());
    assert_eq!(
        sampler.generate(10, &mut Seed::from_u64(1).rng()).unwrap(),
        domain
    );
}
