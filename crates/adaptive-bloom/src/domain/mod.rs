//! Domain Layer - Pure filter logic
//!
//! This layer contains:
//! - Hash chain (salted position functions)
//! - Bit tiers and the tier collection
//! - Occupancy-based capacity policy
//! - Growth strategies (rehash, multi-tier)
//! - Configuration
//! - The filter engine
//!
//! RULES:
//! - No I/O operations
//! - No async code
//! - No locking; see `service` for shared access

pub mod bit_tier;
pub mod bloom_filter;
pub mod config;
pub mod growth;
pub mod hash_functions;
pub mod parameters;

pub use bit_tier::BitTier;
pub use bloom_filter::AdaptiveBloomFilter;
pub use config::{
    FilterConfig, FilterConfigBuilder, DEFAULT_HASH_COUNT, DEFAULT_INITIAL_CAPACITY,
    DEFAULT_MAX_CAPACITY, DEFAULT_TARGET_FPR, MAX_ADDRESSABLE_CAPACITY, MAX_HASH_COUNT,
};
pub use growth::{GrowthEvent, GrowthMode, GrowthOutcome, TierSet};
pub use hash_functions::{
    HashChain, HashFunction, IdentityHash, Murmur3Salted, SaltedAdder, SaltedMultiplier,
};
pub use parameters::{next_capacity, occupancy_ratio, CapacityPolicy};
