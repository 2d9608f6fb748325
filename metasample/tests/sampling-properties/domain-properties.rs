//! Domain building and balanced pair sampling properties

use crate::{arbitrary_seed, check};
use metasample::*;
use proptest::prelude::*;
use rand::RngCore;
use std::collections::HashMap;

/// Sign flip.
struct Negate;

impl MetamorphicRelation<i64> for Negate {
    fn id(&self) -> &str {
        "MR1"
    }

    fn description(&self) -> &str {
        "sign symmetry"
    }

    fn is_applicable(&self, _source: &SampleInput<i64>) -> bool {
        true
    }

    fn follow_ups(&self, source: &SampleInput<i64>, _rng: &mut dyn RngCore) -> Vec<SampleInput<i64>> {
        vec![source.derive(-source.value)]
    }
}

/// Drop the last digit of multi-digit values.
struct Truncate;

impl MetamorphicRelation<i64> for Truncate {
    fn id(&self) -> &str {
        "MR3"
    }

    fn description(&self) -> &str {
        "truncation"
    }

    fn is_applicable(&self, source: &SampleInput<i64>) -> bool {
        source.value.abs() >= 10
    }

    fn follow_ups(&self, source: &SampleInput<i64>, _rng: &mut dyn RngCore) -> Vec<SampleInput<i64>> {
        vec![source.derive(source.value / 10)]
    }
}

fn registry() -> RelationRegistry<i64> {
    let mut registry = RelationRegistry::new();
    registry
        .register(Negate)
        .and_then(|r| r.register(Truncate))
        .expect("relation ids are unique");
    registry
}

fn allocator() -> PartitionAllocator<i64> {
    PartitionAllocator::new(vec![
        Category::new(1, 9.0, GenerationRule::Range { min: 1, max: 9 }),
        Category::new(2, 90.0, GenerationRule::Range { min: 10, max: 99 }),
        Category::new(3, 90.0, GenerationRule::Range { min: -99, max: -10 }),
    ])
    .expect("ids are contiguous")
}

/// Property: the cross table accounts for every group exactly once
pub fn test_statistics_match_domain() {
    let registry = registry();
    let allocator = allocator();
    check(64, (arbitrary_seed(), 1usize..60), |(seed, sources)| {
        let domain = DomainBuilder::new(&registry)
            .build(&allocator, sources, &mut seed.rng())
            .unwrap();
        let stats = DomainStatistics::from_domain(&domain);

        prop_assert_eq!(stats.total(), domain.len());
        prop_assert_eq!(stats.relation_total("MR1"), sources);
        prop_assert_eq!(stats.count("MR3", 1), 0);
        let per_category: usize = stats.categories().map(|c| stats.category_total(c)).sum();
        prop_assert_eq!(per_category, domain.len());
        Ok(())
    });
}

/// Property: under category weights, no cell was last picked while its rate
/// sat above another cell's final rate
pub fn test_balanced_rates_stay_level() {
    let registry = registry();
    let allocator = allocator();
    check(64, (arbitrary_seed(), 1usize..40), |(seed, sources)| {
        let mut rng = seed.rng();
        let domain = DomainBuilder::new(&registry)
            .build(&allocator, sources, &mut rng)
            .unwrap();
        let weight = |category: CategoryId| {
            allocator
                .categories()
                .iter()
                .find(|c| c.id == category)
                .map(|c| c.weight)
        };
        let sampler = PartitionPairSampler::with_weights(&domain, weight, |_| 1.0);
        let picks = sampler.select_indices(domain.len(), &mut rng).unwrap();

        let mut per_cell: HashMap<CellKey, usize> = HashMap::new();
        for index in picks {
            let cell = sampler.cell_of(index).unwrap().clone();
            *per_cell.entry(cell).or_insert(0) += 1;
        }
        let rate = |cell: &CellKey, taken: usize| taken as f64 / sampler.cell_weight(cell).unwrap();
        for (a, _) in sampler.cell_sizes() {
            let taken_a = per_cell.get(a).copied().unwrap_or(0);
            if taken_a == 0 {
                continue;
            }
            for (b, _) in sampler.cell_sizes() {
                let taken_b = per_cell.get(b).copied().unwrap_or(0);
                prop_assert!(rate(a, taken_a - 1) <= rate(b, taken_b) + 1e-9);
            }
        }
        Ok(())
    });
}

/// Property: with equal weights the balanced sampler cycles through cells,
/// so per-cell counts differ by at most one
pub fn test_balanced_equal_weights_cycle() {
    let registry = registry();
    let allocator = allocator();
    check(64, (arbitrary_seed(), 1usize..40), |(seed, sources)| {
        let mut rng = seed.rng();
        let domain = DomainBuilder::new(&registry)
            .build(&allocator, sources, &mut rng)
            .unwrap();
        let sampler = PartitionPairSampler::new(&domain);
        let picks = sampler.select_indices(domain.len(), &mut rng).unwrap();

        let mut per_cell: HashMap<CellKey, usize> = HashMap::new();
        for index in picks {
            let cell = sampler.cell_of(index).unwrap().clone();
            *per_cell.entry(cell).or_insert(0) += 1;
        }
        let counts: Vec<usize> = sampler
            .cell_sizes()
            .map(|(cell, _)| per_cell.get(cell).copied().unwrap_or(0))
            .collect();
        let most = counts.iter().copied().max().unwrap_or(0);
        let least = counts.iter().copied().min().unwrap_or(0);
        prop_assert!(most - least <= 1);
        Ok(())
    });
}

/// Every strategy can be driven through its trait object
pub fn test_strategy_objects() {
    let config = SamplerConfig::default();
    let inputs: Vec<Box<dyn InputStrategy<i64>>> = vec![
        Box::new(AdaptiveRandomGenerator::signed(&config).unwrap()),
        Box::new(RandomInputGenerator::signed(&config).unwrap()),
        Box::new(allocator()),
    ];
    let names: Vec<_> = inputs.iter().map(|s| s.name()).collect();
    assert_eq!(names, vec!["art", "random", "partition"]);

    let registry = registry();
    let mut rng = Seed::from_u64(5).rng();
    let domain = DomainBuilder::new(&registry)
        .build(inputs[2].as_ref(), 30, &mut rng)
        .unwrap();

    let pairs: Vec<Box<dyn PairStrategy<i64> + '_>> = vec![
        Box::new(MtArtSampler::new(&domain, NumericProjection, config.clone()).unwrap()),
        Box::new(UniformSampler::new(&domain)),
        Box::new(PartitionPairSampler::new(&domain)),
    ];
    for strategy in &pairs {
        let picked = strategy.generate(8, &mut rng).unwrap();
        assert!(!picked.is_empty(), "{} picked nothing", strategy.name());
        assert!(picked.len() <= 8);
    }
}
