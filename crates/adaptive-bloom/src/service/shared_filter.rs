//! Thread-safe filter service
//!
//! Wraps the filter engine in a `parking_lot::RwLock`:
//! - `contains` takes the read lock. Tier bits only go from unset to set,
//!   so concurrent readers are safe as long as no growth is in flight.
//! - `add` and `contains_or_add` take the write lock for the whole
//!   contains -> capacity check -> grow -> write sequence. A rehash replaces
//!   the tier, so readers must never observe it half done.

use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::domain::{AdaptiveBloomFilter, FilterConfig};
use crate::error::FilterError;
use crate::metrics::FilterObserver;

/// Adaptive Bloom filter that can be shared between threads
pub struct SharedBloomFilter<T: ?Sized> {
    inner: RwLock<AdaptiveBloomFilter<T>>,
}

impl<T: Hash + ?Sized> SharedBloomFilter<T> {
    /// Create a new shared filter
    pub fn new(config: FilterConfig) -> Result<Self, FilterError> {
        Ok(Self::from_filter(AdaptiveBloomFilter::new(config)?))
    }

    /// Create a new shared filter reporting to `observer`
    pub fn with_observer(
        config: FilterConfig,
        observer: Arc<dyn FilterObserver>,
    ) -> Result<Self, FilterError> {
        Ok(Self::from_filter(AdaptiveBloomFilter::with_observer(
            config, observer,
        )?))
    }

    /// Test if a value might be in the filter (read lock)
    pub fn contains(&self, value: &T) -> Result<bool, FilterError> {
        self.inner.read().contains(value)
    }

    /// Insert a value (write lock)
    pub fn add(&self, value: &T) -> Result<(), FilterError> {
        self.inner.write().add(value)
    }

    /// Report prior membership and add if absent, atomically (write lock)
    pub fn contains_or_add(&self, value: &T) -> Result<bool, FilterError> {
        self.inner.write().contains_or_add(value)
    }
}

impl<T: ?Sized> SharedBloomFilter<T> {
    /// Wrap an existing filter
    pub fn from_filter(filter: AdaptiveBloomFilter<T>) -> Self {
        Self {
            inner: RwLock::new(filter),
        }
    }

    /// Read access to the underlying filter for inspection
    ///
    /// Writers block while the guard is held.
    pub fn read(&self) -> RwLockReadGuard<'_, AdaptiveBloomFilter<T>> {
        self.inner.read()
    }

    pub fn tier_count(&self) -> usize {
        self.inner.read().tier_count()
    }

    /// Capacity of the write target in bits
    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    /// Unwrap the underlying filter
    pub fn into_inner(self) -> AdaptiveBloomFilter<T> {
        self.inner.into_inner()
    }
}
