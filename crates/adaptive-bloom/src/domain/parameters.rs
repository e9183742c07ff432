//! Occupancy-driven capacity policy
//!
//! The false positive rate is approximated by the fraction of bits that
//! would be set after the next insertion in the worst case:
//!
//! - available = capacity - set_bits - k
//! - ratio     = 1 - available / capacity
//! - insert allowed while ratio < target_fpr
//!
//! This is deliberately not the textbook `(1 - e^(-kn/m))^k` formula.
//! Growth doubles the capacity (clamped to the ceiling) until an empty tier
//! of that size satisfies the same bound.

use crate::error::FilterError;

use super::bit_tier::BitTier;

/// Capacity multiplier applied per growth step
pub const GROWTH_FACTOR: usize = 2;

/// Worst-case occupancy ratio after the next insertion
///
/// Formula: `1 - (capacity - set_bits - k) / capacity`
pub fn occupancy_ratio(capacity: usize, set_bits: usize, hash_count: usize) -> f64 {
    let capacity = capacity as f64;
    let available = capacity - set_bits as f64 - hash_count as f64;
    1.0 - available / capacity
}

/// Compute the capacity of the next tier
///
/// Doubles `current` (clamped to `ceiling`) until an empty tier of the
/// candidate size keeps the occupancy ratio below `target_fpr`.
///
/// # Errors
/// `CapacityExhausted` if the bound still fails once the candidate has been
/// clamped to `ceiling`.
pub fn next_capacity(
    current: usize,
    hash_count: usize,
    target_fpr: f64,
    ceiling: usize,
) -> Result<usize, FilterError> {
    let mut candidate = current.max(1);
    loop {
        candidate = candidate.saturating_mul(GROWTH_FACTOR).min(ceiling);
        if occupancy_ratio(candidate, 0, hash_count) < target_fpr {
            return Ok(candidate);
        }
        if candidate >= ceiling {
            return Err(FilterError::CapacityExhausted {
                target_fpr,
                max_capacity: ceiling,
            });
        }
    }
}

/// Decides whether a tier can take another insertion and how far to grow
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapacityPolicy {
    target_fpr: f64,
    max_capacity: usize,
}

impl CapacityPolicy {
    pub fn new(target_fpr: f64, max_capacity: usize) -> Self {
        Self {
            target_fpr,
            max_capacity,
        }
    }

    /// True while the tier's worst-case ratio stays below the target
    pub fn can_insert(&self, tier: &BitTier, hash_count: usize) -> bool {
        occupancy_ratio(tier.capacity(), tier.set_bits(), hash_count) < self.target_fpr
    }

    /// Next capacity after a tier of `current` bits is exhausted
    pub fn next_capacity(&self, current: usize, hash_count: usize) -> Result<usize, FilterError> {
        next_capacity(current, hash_count, self.target_fpr, self.max_capacity)
    }

    pub fn target_fpr(&self) -> f64 {
        self.target_fpr
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }
}
