//! Partition-weighted allocation properties

use crate::{arbitrary_seed, check};
use metasample::*;
use proptest::prelude::*;

/// Digit-count partitions for a signed 32-bit input: 1-2, 3-8 and 9 digits,
/// positive then negative, weighted by partition size.
const CATALOG: &str = r#"{
    "partitions": [
        {"id": 1, "size": 99, "weight": 99,
         "rule": {"kind": "digits", "min_digits": 1, "max_digits": 2}},
        {"id": 2, "size": 999999, "weight": 1000000,
         "rule": {"kind": "digits", "min_digits": 3, "max_digits": 8}},
        {"id": 3, "size": 900000000, "weight": 900000000,
         "rule": {"kind": "digits", "min_digits": 9, "max_digits": 9}},
        {"id": 4, "size": 99, "weight": 99,
         "rule": {"kind": "digits", "min_digits": 1, "max_digits": 2, "negative": true}},
        {"id": 5, "size": 999999, "weight": 1000000,
         "rule": {"kind": "digits", "min_digits": 3, "max_digits": 8, "negative": true}},
        {"id": 6, "size": 900000000, "weight": 900000000,
         "rule": {"kind": "digits", "min_digits": 9, "max_digits": 9, "negative": true}}
    ],
    "mrs": {"MR1": {"type": "sign"}, "MR3": {"type": "truncation"}}
}"#;

fn equal_weights(categories: usize) -> PartitionAllocator<i64> {
    let categories = (1..=categories)
        .map(|id| {
            let low = id as i64 * 100;
            Category::new(
                id,
                1.0,
                GenerationRule::Range {
                    min: low,
                    max: low + 99,
                },
            )
        })
        .collect();
    PartitionAllocator::new(categories).expect("ids are contiguous")
}

/// The first pass visits categories heaviest first, ties broken by position
pub fn test_end_to_end_order() {
    let allocator = PartitionAllocator::from_catalog(
        &Catalog::from_json_str(CATALOG).expect("catalog parses"),
    )
    .expect("every partition has a rule");

    assert_eq!(allocator.allocation_order(6), vec![3, 6, 2, 5, 1, 4]);

    let inputs = allocator.generate(6, &mut Seed::from_u64(42).rng()).unwrap();
    let categories: Vec<_> = inputs.iter().map(|i| i.category).collect();
    assert_eq!(
        categories,
        vec![Some(3), Some(6), Some(2), Some(5), Some(1), Some(4)]
    );
}

/// Property: equal weights never let two categories drift more than one apart
pub fn test_equal_weights_balance() {
    check(64, (1usize..9, 0usize..200), |(categories, count)| {
        let allocator = equal_weights(categories);
        let order = allocator.allocation_order(count);
        let mut counts = vec![0usize; categories];
        for id in order {
            counts[id - 1] += 1;
        }
        let max = counts.iter().max().copied().unwrap_or(0);
        let min = counts.iter().min().copied().unwrap_or(0);
        prop_assert!(max - min <= 1, "unbalanced counts {:?}", counts);
        Ok(())
    });
}

/// Property: each generated value satisfies the rule of the category it is
/// labelled with
pub fn test_values_respect_rules() {
    check(64, (arbitrary_seed(), 1usize..9, 1usize..60), |(seed, categories, count)| {
        let allocator = equal_weights(categories);
        let inputs = allocator.generate(count, &mut seed.rng()).unwrap();
        prop_assert_eq!(inputs.len(), count);
        for input in &inputs {
            let id = input.category.unwrap();
            let category = &allocator.categories()[id - 1];
            prop_assert!(category.contains(&input.value));
        }
        let stats = allocator.statistics(&inputs);
        prop_assert_eq!(stats.total, count);
        Ok(())
    });
}

/// A catalog on disk drives the allocator and its report
pub fn test_catalog_allocator() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, CATALOG).unwrap();

    let catalog = Catalog::from_path(&path).unwrap();
    assert_eq!(catalog.relation_names().collect::<Vec<_>>(), vec!["MR1", "MR3"]);

    let allocator = PartitionAllocator::from_catalog(&catalog).unwrap();
    let inputs = allocator.generate(12, &mut Seed::from_u64(7).rng()).unwrap();
    let report = allocator.statistics(&inputs).to_string();
    assert!(report.starts_with("Total test cases: 12"));
    assert!(report.contains("P3: 4 (33.33%)"));
}
