//! MT-ART pair sampling properties

use crate::{arbitrary_seed, check};
use metasample::*;
use proptest::prelude::*;
use std::collections::HashSet;

fn domain(values: &[i64]) -> Vec<PairedSample<i64>> {
    values
        .iter()
        .map(|&v| {
            PairedSample::new(
                "MR1",
                "sign symmetry",
                SampleInput::uncategorized(v),
                SampleInput::uncategorized(-v),
            )
        })
        .collect()
}

fn domain_and_request() -> impl Strategy<Value = (Vec<i64>, usize)> {
    prop::collection::vec(-10_000i64..10_000, 1..80).prop_flat_map(|values| {
        let len = values.len();
        (Just(values), 0..=len)
    })
}

/// Property: one pick per uncovered bucket, and as many picks as the request
/// and the non-empty buckets allow
pub fn test_selection_bounded_by_buckets() {
    check(
        128,
        (arbitrary_seed(), domain_and_request()),
        |(seed, (values, samples))| {
            let domain = domain(&values);
            let sampler =
                MtArtSampler::new(&domain, NumericProjection, SamplerConfig::default()).unwrap();
            let picks = sampler.select_with_buckets(samples, &mut seed.rng()).unwrap();

            let buckets = sampler.buckets_for(samples);
            let non_empty = (0..buckets.len())
                .filter(|&b| !buckets.members(b).is_empty())
                .count();
            let expected = if samples == 0 { 0 } else { samples.min(non_empty) };
            prop_assert_eq!(picks.len(), expected);

            let mut seen_buckets = HashSet::new();
            for &(index, bucket) in &picks {
                prop_assert!(index < domain.len());
                prop_assert_eq!(buckets.bucket_of(index), Some(bucket));
                prop_assert!(seen_buckets.insert(bucket), "bucket {} picked twice", bucket);
            }
            Ok(())
        },
    );
}

/// Asking for more pairs than the domain holds is an error
pub fn test_oversized_request_rejected() {
    let domain = domain(&[1, 2, 3]);
    let sampler = MtArtSampler::new(&domain, NumericProjection, SamplerConfig::default()).unwrap();
    let result = sampler.generate(4, &mut Seed::from_u64(9).rng());
    assert!(matches!(
        result,
        Err(SamplingError::SampleSizeExceeded {
            requested: 4,
            available: 3
        })
    ));
}

/// Property: the same seed yields the same selection
pub fn test_deterministic_per_seed() {
    check(
        64,
        (arbitrary_seed(), domain_and_request()),
        |(seed, (values, samples))| {
            let domain = domain(&values);
            let sampler =
                MtArtSampler::new(&domain, NumericProjection, SamplerConfig::default()).unwrap();
            let first = sampler.select_indices(samples, &mut seed.rng()).unwrap();
            let second = sampler.select_indices(samples, &mut seed.rng()).unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        },
    );
}

/// Property: every iteration accepts the first candidate with the highest
/// diversity score, and the accepted pair is the one returned
pub fn test_accepts_first_best_candidate() {
    check(
        128,
        (arbitrary_seed(), domain_and_request()),
        |(seed, (values, samples))| {
            let domain = domain(&values);
            let sampler =
                MtArtSampler::new(&domain, NumericProjection, SamplerConfig::default()).unwrap();
            let (picks, iterations) = sampler.select_traced(samples, &mut seed.rng()).unwrap();
            prop_assert_eq!(picks.len(), iterations.len());

            for (iteration, &pick) in iterations.iter().zip(&picks) {
                prop_assert!(!iteration.candidates.is_empty());
                let best = iteration
                    .candidates
                    .iter()
                    .map(|&(_, _, score)| score)
                    .fold(f64::NEG_INFINITY, f64::max);
                let first_best = iteration
                    .candidates
                    .iter()
                    .position(|&(_, _, score)| score == best)
                    .unwrap();
                prop_assert_eq!(iteration.chosen, first_best);
                let (index, bucket, _) = iteration.candidates[iteration.chosen];
                prop_assert_eq!((index, bucket), pick);
            }
            Ok(())
        },
    );
}
