//! Adaptive Bloom filter engine
//!
//! INVARIANTS:
//! - No false negatives: once `add(v)` returns `Ok`, `contains(v)` is true
//!   until a rehash replaces the tier
//! - Growth happens only when the write target fails the capacity policy
//! - Tier bits only go from unset to set
//!
//! `add` follows a retry loop: if the value is present it is a no-op; if
//! the write target has room the positions are written; otherwise the
//! filter grows and the loop starts over against the grown tiers. The loop
//! ends because every growth step either makes room or fails with
//! `CapacityExhausted`.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::FilterError;
use crate::metrics::{AddOutcome, FilterObserver, NoOpObserver, TracingObserver};

use super::bit_tier::BitTier;
use super::config::FilterConfig;
use super::growth::{GrowthEvent, GrowthMode, GrowthOutcome, TierSet};
use super::hash_functions::{base_hash, timestamp_seed, HashChain};
use super::parameters::CapacityPolicy;

/// Probabilistic set that grows its capacity as it fills up
///
/// False positives are possible, false negatives are not (see the module
/// docs for the rehash caveat).
pub struct AdaptiveBloomFilter<T: ?Sized> {
    config: FilterConfig,
    tiers: TierSet,
    chain: HashChain,
    policy: CapacityPolicy,
    observer: Arc<dyn FilterObserver>,
    _marker: PhantomData<fn(&T)>,
}

impl<T: Hash + ?Sized> AdaptiveBloomFilter<T> {
    /// Create a filter from a configuration
    ///
    /// Logs through `tracing` when `config.log_operations` is set.
    pub fn new(config: FilterConfig) -> Result<Self, FilterError> {
        let observer = default_observer(&config);
        Self::with_observer(config, observer)
    }

    /// Create a filter reporting to `observer`
    pub fn with_observer(
        config: FilterConfig,
        observer: Arc<dyn FilterObserver>,
    ) -> Result<Self, FilterError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(timestamp_seed);
        let chain = HashChain::seeded(config.hash_count, seed);
        Self::from_parts(config, chain, observer)
    }

    /// Create a filter with a caller-supplied hash chain
    ///
    /// The stored `hash_count` is replaced by the chain's length. Logs
    /// through `tracing` when `config.log_operations` is set.
    pub fn with_hash_chain(config: FilterConfig, chain: HashChain) -> Result<Self, FilterError> {
        let observer = default_observer(&config);
        Self::with_hash_chain_and_observer(config, chain, observer)
    }

    /// Create a filter with a caller-supplied hash chain reporting to `observer`
    pub fn with_hash_chain_and_observer(
        mut config: FilterConfig,
        chain: HashChain,
        observer: Arc<dyn FilterObserver>,
    ) -> Result<Self, FilterError> {
        if chain.is_empty() {
            return Err(FilterError::InvalidParameters(
                "hash chain needs at least one function".to_string(),
            ));
        }
        config.hash_count = chain.len();
        Self::from_parts(config, chain, observer)
    }

    fn from_parts(
        config: FilterConfig,
        chain: HashChain,
        observer: Arc<dyn FilterObserver>,
    ) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(Self {
            tiers: TierSet::new(config.initial_capacity),
            policy: CapacityPolicy::new(config.target_fpr, config.max_capacity),
            config,
            chain,
            observer,
            _marker: PhantomData,
        })
    }

    /// Test if a value might be in the filter
    ///
    /// Returns:
    /// - `Ok(true)` if the value might be in the set (could be false positive)
    /// - `Ok(false)` if the value is definitely not in the set
    pub fn contains(&self, value: &T) -> Result<bool, FilterError> {
        let found = self.lookup(base_hash(value))?;
        self.observer.on_lookup(found);
        Ok(found)
    }

    /// Insert a value
    ///
    /// # Errors
    /// - `CapacityExhausted` if the filter would have to grow past its
    ///   maximum capacity
    /// - `IndexOutOfRange` if a custom hash function breaks its contract
    pub fn add(&mut self, value: &T) -> Result<(), FilterError> {
        self.observer.before_add();
        let hash = base_hash(value);
        loop {
            if self.lookup(hash)? {
                self.observer.after_add(AddOutcome::AlreadyPresent);
                return Ok(());
            }

            if self.has_room() {
                let tier = self.tiers.write_target_index();
                let new_bits = self.write(hash)?;
                self.observer.after_add(AddOutcome::Inserted { new_bits, tier });
                return Ok(());
            }

            self.grow()?;
        }
    }

    /// Report whether the value was present, adding it if it was not
    ///
    /// The return value reflects the state before this call.
    /// Counts as a single lookup for observers.
    pub fn contains_or_add(&mut self, value: &T) -> Result<bool, FilterError> {
        let existed = self.contains(value)?;
        if !existed {
            self.add(value)?;
        }
        Ok(existed)
    }

    /// True if the write target can take another insertion without growing
    pub fn has_room(&self) -> bool {
        self.policy.can_insert(self.tiers.write_target(), self.chain.len())
    }

    /// Membership test without observer notification
    fn lookup(&self, hash: u64) -> Result<bool, FilterError> {
        for tier in self.tiers.tiers() {
            if self.all_set(tier, hash)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn all_set(&self, tier: &BitTier, hash: u64) -> Result<bool, FilterError> {
        for position in self.chain.positions_for_hash(hash, tier.capacity())? {
            if !tier.is_set(position)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn write(&mut self, hash: u64) -> Result<usize, FilterError> {
        let tier = self.tiers.write_target_mut();
        let positions = self.chain.positions_for_hash(hash, tier.capacity())?;
        let mut new_bits = 0;
        for position in positions {
            if tier.try_set(position)? {
                new_bits += 1;
            }
        }
        Ok(new_bits)
    }

    fn grow(&mut self) -> Result<GrowthOutcome, FilterError> {
        let target = self.tiers.write_target();
        let event = GrowthEvent {
            mode: self.config.growth_mode,
            capacity: target.capacity(),
            set_bits: target.set_bits(),
            tier_count: self.tiers.len(),
        };
        self.observer.before_growth(&event);

        let outcome = self
            .config
            .growth_mode
            .grow(&mut self.tiers, &self.policy, self.chain.len())?;

        self.observer.after_growth(&outcome);
        Ok(outcome)
    }
}

impl<T: ?Sized> AdaptiveBloomFilter<T> {
    /// All tiers, oldest first
    pub fn tiers(&self) -> &[BitTier] {
        self.tiers.tiers()
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    /// Capacity of the write target in bits
    pub fn capacity(&self) -> usize {
        self.tiers.write_target().capacity()
    }

    /// Set bits in the write target
    pub fn set_bits(&self) -> usize {
        self.tiers.write_target().set_bits()
    }

    /// Occupancy of the write target
    pub fn occupancy(&self) -> f64 {
        self.tiers.write_target().occupancy()
    }

    /// Bits allocated across all tiers
    pub fn total_capacity(&self) -> usize {
        self.tiers.tiers().iter().map(BitTier::capacity).sum()
    }

    /// Number of hash functions (k)
    pub fn hash_count(&self) -> usize {
        self.chain.len()
    }

    pub fn growth_mode(&self) -> GrowthMode {
        self.config.growth_mode
    }

    pub fn target_fpr(&self) -> f64 {
        self.config.target_fpr
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }
}

fn default_observer(config: &FilterConfig) -> Arc<dyn FilterObserver> {
    if config.log_operations {
        Arc::new(TracingObserver)
    } else {
        Arc::new(NoOpObserver)
    }
}

impl<T: ?Sized> fmt::Debug for AdaptiveBloomFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdaptiveBloomFilter")
            .field("growth_mode", &self.config.growth_mode)
            .field("target_fpr", &self.config.target_fpr)
            .field("tiers", &self.tiers.len())
            .field("capacity", &self.capacity())
            .field("set_bits", &self.set_bits())
            .field("hash_count", &self.chain.len())
            .finish()
    }
}
