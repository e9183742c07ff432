//! Statistical false positive checks
//!
//! The occupancy bound keeps each tier's fill ratio under the target, so
//! the observed rate over disjoint unknown values stays near or below it.

use adaptive_bloom::{AdaptiveBloomFilter, FilterConfig, GrowthMode};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

const SEEDS: [u64; 4] = [1, 42, 1337, 0xDEAD_BEEF];

fn observed_fpr(mode: GrowthMode, target_fpr: f64, seed: u64) -> f64 {
    let mut filter = AdaptiveBloomFilter::<i32>::new(FilterConfig {
        target_fpr,
        initial_capacity: 1000,
        growth_mode: mode,
        seed: Some(seed),
        ..Default::default()
    })
    .unwrap();

    // Shuffle a disjoint split of 0..2000 into known and unknown values
    let mut rng = StdRng::seed_from_u64(seed);
    let mut values: Vec<i32> = (0..2000).collect();
    values.shuffle(&mut rng);
    let (known, unknown) = values.split_at(1000);

    for v in known {
        filter.add(v).unwrap();
    }

    let false_positives = unknown
        .iter()
        .filter(|&&v| filter.contains(&v).unwrap())
        .count();
    false_positives as f64 / unknown.len() as f64
}

#[test]
fn test_multi_tier_fpr_bounded_at_one_percent() {
    for seed in SEEDS {
        let fpr = observed_fpr(GrowthMode::MultiTier, 0.01, seed);
        assert!(fpr <= 0.03, "seed {}: observed FPR {} exceeds 3%", seed, fpr);
    }
}

#[test]
fn test_rehash_fpr_bounded_at_one_percent() {
    for seed in SEEDS {
        let fpr = observed_fpr(GrowthMode::Rehash, 0.01, seed);
        assert!(fpr <= 0.03, "seed {}: observed FPR {} exceeds 3%", seed, fpr);
    }
}

#[test]
fn test_multi_tier_fpr_bounded_at_ten_percent() {
    for seed in SEEDS {
        let fpr = observed_fpr(GrowthMode::MultiTier, 0.1, seed);
        assert!(fpr <= 0.15, "seed {}: observed FPR {} exceeds 15%", seed, fpr);
    }
}

#[test]
fn test_multi_tier_fpr_bounded_at_tenth_of_percent() {
    for seed in SEEDS {
        let fpr = observed_fpr(GrowthMode::MultiTier, 0.001, seed);
        assert!(fpr <= 0.005, "seed {}: observed FPR {} exceeds 0.5%", seed, fpr);
    }
}

#[test]
fn test_no_false_negatives_after_bulk_insert() {
    let mut filter = AdaptiveBloomFilter::<String>::new(FilterConfig {
        target_fpr: 0.01,
        growth_mode: GrowthMode::MultiTier,
        seed: Some(7),
        ..Default::default()
    })
    .unwrap();
    let elements: Vec<String> = (0..1000).map(|i| format!("address_{:04x}", i)).collect();

    for elem in &elements {
        filter.add(elem).unwrap();
    }

    for elem in &elements {
        assert!(filter.contains(elem).unwrap(), "False negative for {}", elem);
    }
}
