//! # Adaptive Bloom
//!
//! Approximate-membership filter that grows its own capacity as it fills.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): Pure filter logic, no I/O
//!   - `HashChain`: Salted position functions shared by every tier
//!   - `BitTier`: Fixed-size bit array with a live set-bit count
//!   - `CapacityPolicy`: Occupancy check and next-capacity computation
//!   - `GrowthMode`: `Rehash` (replace the tier) or `MultiTier` (append)
//!   - `AdaptiveBloomFilter`: contains / add / contains_or_add
//!   - `FilterConfig`: Configuration with validation
//!   - `FilterConfigBuilder`: Fluent builder for configuration
//!
//! - **Service Layer** (`service/`): Shared access
//!   - `SharedBloomFilter`: `RwLock` wrapper for concurrent callers
//!
//! - **Metrics** (`metrics`): Observer hooks, counters and `tracing` output
//!
//! ## Invariants
//!
//! - **No false negatives**: if `add(v)` returned `Ok`, `contains(v)` is
//!   true (in `Rehash` mode, until the next rehash)
//! - **Occupancy bound**: a tier only takes an insertion while
//!   `1 - (capacity - set_bits - k) / capacity < target_fpr`
//! - **Monotonic tiers**: bits are never cleared
//!
//! ## Usage Example
//!
//! ```ignore
//! use adaptive_bloom::{AdaptiveBloomFilter, FilterConfigBuilder, GrowthMode};
//!
//! let config = FilterConfigBuilder::new()
//!     .target_fpr(0.01)
//!     .initial_capacity(1000)
//!     .growth_mode(GrowthMode::MultiTier)
//!     .build()?;
//!
//! let mut filter = AdaptiveBloomFilter::<str>::new(config)?;
//! filter.add("0xABCD")?;
//!
//! assert!(filter.contains("0xABCD")?);
//! assert!(!filter.contains_or_add("0xBEEF")?);
//! ```

pub mod domain;
pub mod error;
pub mod metrics;
pub mod service;

// Re-exports for convenience
pub use domain::{
    AdaptiveBloomFilter, BitTier, CapacityPolicy, FilterConfig, FilterConfigBuilder, GrowthMode,
    GrowthOutcome, HashChain, HashFunction,
};
pub use error::FilterError;
pub use metrics::{
    AddOutcome, FilterMetrics, FilterObserver, MetricsSnapshot, NoOpObserver, TracingObserver,
};
pub use service::SharedBloomFilter;
