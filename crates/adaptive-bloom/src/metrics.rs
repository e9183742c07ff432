//! Observer hooks, metrics and tracing for filter operations
//!
//! The filter engine reports to a `FilterObserver` at fixed points: every
//! caller-facing membership query, before and after every add, and before
//! and after every growth step. Lookups made internally by `add` are not
//! reported. Observers are a side channel only and never change results.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use adaptive_bloom::{AdaptiveBloomFilter, FilterConfig, FilterMetrics};
//!
//! let metrics = Arc::new(FilterMetrics::new());
//! let mut filter = AdaptiveBloomFilter::with_observer(FilterConfig::default(), metrics.clone())?;
//! filter.add(&42u64)?;
//!
//! assert_eq!(metrics.snapshot().inserts, 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info, trace};

use crate::domain::{GrowthEvent, GrowthMode, GrowthOutcome};

/// What an `add` call did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOutcome {
    /// The value already tested positive; nothing was written
    AlreadyPresent,
    /// Positions were written to the write target
    Inserted {
        /// Bits that flipped from unset to set
        new_bits: usize,
        /// Tier that received the write
        tier: usize,
    },
}

/// Trait for custom observers
///
/// Implement this trait to integrate with external metrics or logging
/// systems.
pub trait FilterObserver: Send + Sync {
    /// Record a membership query from `contains` or `contains_or_add`
    fn on_lookup(&self, found: bool);

    /// Called when `add` starts
    fn before_add(&self);

    /// Called when `add` finishes successfully
    fn after_add(&self, outcome: AddOutcome);

    /// Called when the write target is exhausted, before any tier changes
    fn before_growth(&self, event: &GrowthEvent);

    /// Called once the tier collection has grown
    fn after_growth(&self, outcome: &GrowthOutcome);
}

/// No-op observer for when instrumentation is disabled
#[derive(Clone, Copy, Debug, Default)]
pub struct NoOpObserver;

impl FilterObserver for NoOpObserver {
    fn on_lookup(&self, _: bool) {}
    fn before_add(&self) {}
    fn after_add(&self, _: AddOutcome) {}
    fn before_growth(&self, _: &GrowthEvent) {}
    fn after_growth(&self, _: &GrowthOutcome) {}
}

/// Observer that emits `tracing` events
///
/// Installed when `FilterConfig::log_operations` is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl FilterObserver for TracingObserver {
    fn on_lookup(&self, found: bool) {
        trace!(found, "Bloom filter lookup");
    }

    fn before_add(&self) {
        trace!("Adding value to bloom filter");
    }

    fn after_add(&self, outcome: AddOutcome) {
        match outcome {
            AddOutcome::AlreadyPresent => debug!("Value already present in bloom filter"),
            AddOutcome::Inserted { new_bits, tier } => {
                debug!(new_bits, tier, "Value added to bloom filter")
            }
        }
    }

    fn before_growth(&self, event: &GrowthEvent) {
        debug!(
            mode = ?event.mode,
            capacity = event.capacity,
            set_bits = event.set_bits,
            tiers = event.tier_count,
            "Bloom filter is full, scaling up"
        );
    }

    fn after_growth(&self, outcome: &GrowthOutcome) {
        info!(
            mode = ?outcome.mode,
            previous_capacity = outcome.previous_capacity,
            new_capacity = outcome.new_capacity,
            carried_bits = outcome.carried_bits,
            tiers = outcome.tier_count,
            "Bloom filter scaled up"
        );
    }
}

/// Metrics collector for filter operations
///
/// Thread-safe counters, shareable between filters through an `Arc`.
#[derive(Debug, Default)]
pub struct FilterMetrics {
    /// Total lookups performed (including those made by `add`)
    pub lookups_performed: AtomicU64,
    /// Lookups that tested positive
    pub lookups_positive: AtomicU64,
    /// Adds that wrote to a tier
    pub inserts: AtomicU64,
    /// Adds that found the value already present
    pub duplicate_adds: AtomicU64,
    /// Bits flipped by inserts
    pub bits_set: AtomicU64,
    /// Rehash growth steps
    pub rehashes: AtomicU64,
    /// Multi-tier growth steps
    pub tiers_appended: AtomicU64,
    /// Bits allocated by growth steps
    pub bits_allocated: AtomicU64,
}

impl FilterMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lookups_performed: self.lookups_performed.load(Ordering::Relaxed),
            lookups_positive: self.lookups_positive.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            duplicate_adds: self.duplicate_adds.load(Ordering::Relaxed),
            bits_set: self.bits_set.load(Ordering::Relaxed),
            rehashes: self.rehashes.load(Ordering::Relaxed),
            tiers_appended: self.tiers_appended.load(Ordering::Relaxed),
            bits_allocated: self.bits_allocated.load(Ordering::Relaxed),
        }
    }

    /// Total growth steps of either kind
    pub fn growths(&self) -> u64 {
        self.rehashes.load(Ordering::Relaxed) + self.tiers_appended.load(Ordering::Relaxed)
    }

    /// Ratio of positive lookups to total lookups
    ///
    /// Includes true positives, so this is only an upper bound on the
    /// false positive rate.
    pub fn observed_positive_rate(&self) -> f64 {
        let total = self.lookups_performed.load(Ordering::Relaxed);
        let positive = self.lookups_positive.load(Ordering::Relaxed);
        if total > 0 {
            positive as f64 / total as f64
        } else {
            0.0
        }
    }

    /// Reset all counters
    pub fn reset(&self) {
        self.lookups_performed.store(0, Ordering::Relaxed);
        self.lookups_positive.store(0, Ordering::Relaxed);
        self.inserts.store(0, Ordering::Relaxed);
        self.duplicate_adds.store(0, Ordering::Relaxed);
        self.bits_set.store(0, Ordering::Relaxed);
        self.rehashes.store(0, Ordering::Relaxed);
        self.tiers_appended.store(0, Ordering::Relaxed);
        self.bits_allocated.store(0, Ordering::Relaxed);
    }
}

impl FilterObserver for FilterMetrics {
    fn on_lookup(&self, found: bool) {
        self.lookups_performed.fetch_add(1, Ordering::Relaxed);
        if found {
            self.lookups_positive.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn before_add(&self) {}

    fn after_add(&self, outcome: AddOutcome) {
        match outcome {
            AddOutcome::AlreadyPresent => {
                self.duplicate_adds.fetch_add(1, Ordering::Relaxed);
            }
            AddOutcome::Inserted { new_bits, .. } => {
                self.inserts.fetch_add(1, Ordering::Relaxed);
                self.bits_set.fetch_add(new_bits as u64, Ordering::Relaxed);
            }
        }
    }

    fn before_growth(&self, _: &GrowthEvent) {}

    fn after_growth(&self, outcome: &GrowthOutcome) {
        match outcome.mode {
            GrowthMode::Rehash => self.rehashes.fetch_add(1, Ordering::Relaxed),
            GrowthMode::MultiTier => self.tiers_appended.fetch_add(1, Ordering::Relaxed),
        };
        self.bits_allocated
            .fetch_add(outcome.new_capacity as u64, Ordering::Relaxed);
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub lookups_performed: u64,
    pub lookups_positive: u64,
    pub inserts: u64,
    pub duplicate_adds: u64,
    pub bits_set: u64,
    pub rehashes: u64,
    pub tiers_appended: u64,
    pub bits_allocated: u64,
}
