//! Tier collection and growth strategies
//!
//! - `Rehash`: exactly one tier. Growth allocates a larger tier, copies each
//!   set bit `i` to `(i * 2) % new_capacity` and drops the old tier. The remap
//!   is approximate since values are not retained: it can only add false
//!   positives, and values added earlier may no longer test positive.
//! - `MultiTier`: growth appends an empty tier and writes move to it. Earlier
//!   tiers are never touched again.

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

use super::bit_tier::BitTier;
use super::parameters::CapacityPolicy;

/// Stride used when remapping bits into a rehashed tier
pub const REMAP_STRIDE: usize = 2;

/// How the filter grows once the write target is exhausted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthMode {
    /// Replace the single tier with a larger one
    #[default]
    Rehash,
    /// Append a new tier, keeping old tiers frozen
    MultiTier,
}

/// State of the write target right before a growth step
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthEvent {
    pub mode: GrowthMode,
    pub capacity: usize,
    pub set_bits: usize,
    pub tier_count: usize,
}

/// Result of a growth step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthOutcome {
    pub mode: GrowthMode,
    pub previous_capacity: usize,
    pub new_capacity: usize,
    /// Set bits carried into the new write target (0 for an appended tier)
    pub carried_bits: usize,
    pub tier_count: usize,
    /// Index of the new write target
    pub write_target: usize,
}

/// Ordered tiers; the last one is the write target
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TierSet {
    tiers: Vec<BitTier>,
}

impl TierSet {
    /// Start with a single empty tier
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            tiers: vec![BitTier::new(initial_capacity)],
        }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn tiers(&self) -> &[BitTier] {
        &self.tiers
    }

    /// Index of the tier receiving writes
    pub fn write_target_index(&self) -> usize {
        self.tiers.len() - 1
    }

    pub fn write_target(&self) -> &BitTier {
        &self.tiers[self.write_target_index()]
    }

    pub fn write_target_mut(&mut self) -> &mut BitTier {
        let index = self.write_target_index();
        &mut self.tiers[index]
    }

    /// Append a tier and make it the write target
    pub fn append(&mut self, tier: BitTier) -> usize {
        self.tiers.push(tier);
        self.write_target_index()
    }

    /// Replace every tier with `tier`
    pub fn replace(&mut self, tier: BitTier) -> usize {
        self.tiers.clear();
        self.tiers.push(tier);
        0
    }
}

impl GrowthMode {
    /// Grow `tiers` once the write target can no longer take insertions
    ///
    /// # Errors
    /// `CapacityExhausted` when the policy cannot find a larger capacity that
    /// honors the target rate. Nothing is modified in that case.
    pub fn grow(
        self,
        tiers: &mut TierSet,
        policy: &CapacityPolicy,
        hash_count: usize,
    ) -> Result<GrowthOutcome, FilterError> {
        match self {
            GrowthMode::Rehash => rehash(tiers, policy, hash_count),
            GrowthMode::MultiTier => append_tier(tiers, policy, hash_count),
        }
    }
}

fn rehash(
    tiers: &mut TierSet,
    policy: &CapacityPolicy,
    hash_count: usize,
) -> Result<GrowthOutcome, FilterError> {
    let old = tiers.write_target();
    let previous_capacity = old.capacity();
    let new_capacity = policy.next_capacity(previous_capacity, hash_count)?;
    if new_capacity <= previous_capacity {
        return Err(FilterError::CapacityExhausted {
            target_fpr: policy.target_fpr(),
            max_capacity: policy.max_capacity(),
        });
    }

    let remapped = remap_tier(old, new_capacity)?;
    let carried_bits = remapped.set_bits();
    let write_target = tiers.replace(remapped);

    Ok(GrowthOutcome {
        mode: GrowthMode::Rehash,
        previous_capacity,
        new_capacity,
        carried_bits,
        tier_count: tiers.len(),
        write_target,
    })
}

fn append_tier(
    tiers: &mut TierSet,
    policy: &CapacityPolicy,
    hash_count: usize,
) -> Result<GrowthOutcome, FilterError> {
    let previous_capacity = tiers.write_target().capacity();
    let new_capacity = policy.next_capacity(previous_capacity, hash_count)?;
    let write_target = tiers.append(BitTier::new(new_capacity));

    Ok(GrowthOutcome {
        mode: GrowthMode::MultiTier,
        previous_capacity,
        new_capacity,
        carried_bits: 0,
        tier_count: tiers.len(),
        write_target,
    })
}

/// Copy set bits of `old` into a fresh tier: `i -> (i * 2) % new_capacity`
pub fn remap_tier(old: &BitTier, new_capacity: usize) -> Result<BitTier, FilterError> {
    let mut tier = BitTier::new(new_capacity);
    for index in old.iter_set() {
        let target = (index as u64 * REMAP_STRIDE as u64 % new_capacity as u64) as usize;
        tier.try_set(target)?;
    }
    Ok(tier)
}
