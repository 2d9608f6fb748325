//! Adaptive random generation properties

use crate::{arbitrary_seed, check};
use metasample::*;
use proptest::prelude::*;

fn generator() -> AdaptiveRandomGenerator<SignedMagnitude, NumericProjection> {
    AdaptiveRandomGenerator::signed(&SamplerConfig::default()).expect("default config is valid")
}

/// Property: the same seed yields the same sequence
pub fn test_deterministic_per_seed() {
    let art = generator();
    check(64, (arbitrary_seed(), 1usize..30), |(seed, count)| {
        let first: Vec<SampleInput<i64>> = art.generate(count, &mut seed.rng()).unwrap();
        let second: Vec<SampleInput<i64>> = art.generate(count, &mut seed.rng()).unwrap();
        prop_assert_eq!(first.len(), count);
        prop_assert_eq!(first, second);
        Ok(())
    });
}

/// Property: every round accepts the first candidate with the largest
/// nearest-neighbour distance
pub fn test_rounds_pick_maximin() {
    let art = generator();
    check(64, (arbitrary_seed(), 2usize..25), |(seed, count)| {
        let (inputs, rounds) = art.generate_traced::<i64>(count, &mut seed.rng()).unwrap();
        prop_assert_eq!(rounds.len(), count - 1);

        for (round, accepted) in rounds.iter().zip(inputs.iter().skip(1)) {
            prop_assert_eq!(round.min_distances.len(), art.candidate_pool_size());
            let best = round
                .min_distances
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(round.chosen_distance(), Some(best));
            let first_best = round
                .min_distances
                .iter()
                .position(|&d| d == best)
                .unwrap();
            prop_assert_eq!(round.chosen, first_best);
            prop_assert!(accepted.category.is_none());
        }
        Ok(())
    });
}

/// Property: values never exceed the configured magnitude
pub fn test_values_within_magnitude() {
    check(
        64,
        (arbitrary_seed(), 1i64..1_000, 1usize..40),
        |(seed, max, count)| {
            let config = SamplerConfig::default().with_max_magnitude(max);
            let art = AdaptiveRandomGenerator::signed(&config).unwrap();
            let inputs: Vec<SampleInput<i64>> = art.generate(count, &mut seed.rng()).unwrap();
            for input in &inputs {
                prop_assert!(input.value.abs() <= max, "{} exceeds {}", input.value, max);
            }
            Ok(())
        },
    );
}

/// A count of zero is an argument error, not an empty sequence
pub fn test_zero_count_rejected() {
    let art = generator();
    let result: metasample::Result<Vec<SampleInput<i64>>> =
        art.generate(0, &mut Seed::from_u64(0).rng());
    assert!(matches!(result, Err(SamplingError::InvalidArgument { .. })));
}
