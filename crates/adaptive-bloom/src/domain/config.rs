//! Filter configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use adaptive_bloom::domain::{FilterConfigBuilder, GrowthMode};
//!
//! let config = FilterConfigBuilder::new()
//!     .target_fpr(0.01)
//!     .initial_capacity(1000)
//!     .growth_mode(GrowthMode::MultiTier)
//!     .build()
//!     .expect("Valid config");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

use super::growth::GrowthMode;

/// Largest tier size the filter will address
pub const MAX_ADDRESSABLE_CAPACITY: usize = i32::MAX as usize - 1;

/// Upper bound on the hash chain length
pub const MAX_HASH_COUNT: usize = 32;

pub const DEFAULT_TARGET_FPR: f64 = 0.1;
pub const DEFAULT_INITIAL_CAPACITY: usize = 1000;
pub const DEFAULT_MAX_CAPACITY: usize = 1 << 30;
pub const DEFAULT_HASH_COUNT: usize = 3;

/// Filter configuration, immutable for the lifetime of a filter
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Target false positive rate, strictly between 0 and 1
    pub target_fpr: f64,
    /// Size of the first tier in bits
    pub initial_capacity: usize,
    /// Ceiling for any single tier
    pub max_capacity: usize,
    pub growth_mode: GrowthMode,
    /// Number of hash functions (k)
    pub hash_count: usize,
    /// Seed for the hash salts; the construction time is used when unset
    pub seed: Option<u64>,
    /// Install a `TracingObserver` when no observer is injected
    pub log_operations: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            target_fpr: DEFAULT_TARGET_FPR,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_capacity: DEFAULT_MAX_CAPACITY,
            growth_mode: GrowthMode::Rehash,
            hash_count: DEFAULT_HASH_COUNT,
            seed: None,
            log_operations: false,
        }
    }
}

impl FilterConfig {
    /// Create a new configuration with validation
    pub fn new(
        target_fpr: f64,
        initial_capacity: usize,
        max_capacity: usize,
        growth_mode: GrowthMode,
    ) -> Result<Self, FilterError> {
        let config = Self {
            target_fpr,
            initial_capacity,
            max_capacity,
            growth_mode,
            ..Default::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration from JSON
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self, FilterError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FilterError::SerializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all parameters
    pub fn validate(&self) -> Result<(), FilterError> {
        // Also rejects NaN
        if !(self.target_fpr > 0.0 && self.target_fpr < 1.0) {
            return Err(FilterError::InvalidFPR {
                fpr: self.target_fpr,
            });
        }

        if self.initial_capacity == 0 {
            return Err(FilterError::InvalidParameters(
                "initial_capacity cannot be 0".to_string(),
            ));
        }

        if self.max_capacity > MAX_ADDRESSABLE_CAPACITY {
            return Err(FilterError::InvalidParameters(format!(
                "max_capacity {} exceeds addressable range {}",
                self.max_capacity, MAX_ADDRESSABLE_CAPACITY
            )));
        }

        if self.initial_capacity > self.max_capacity {
            return Err(FilterError::InitialCapacityTooLarge {
                initial: self.initial_capacity,
                max: self.max_capacity,
            });
        }

        if self.hash_count == 0 || self.hash_count > MAX_HASH_COUNT {
            return Err(FilterError::InvalidParameters(format!(
                "hash_count must be between 1 and {}",
                MAX_HASH_COUNT
            )));
        }

        Ok(())
    }

    /// Builder-style method to set the target rate
    pub fn with_target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = fpr;
        self
    }

    /// Builder-style method to set the growth mode
    pub fn with_growth_mode(mut self, mode: GrowthMode) -> Self {
        self.growth_mode = mode;
        self
    }

    /// Builder-style method to fix the hash seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder-style method to toggle diagnostic logging
    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.log_operations = enabled;
        self
    }
}

/// Builder for FilterConfig with validation
#[derive(Default)]
pub struct FilterConfigBuilder {
    target_fpr: Option<f64>,
    initial_capacity: Option<usize>,
    max_capacity: Option<usize>,
    growth_mode: Option<GrowthMode>,
    hash_count: Option<usize>,
    seed: Option<u64>,
    log_operations: Option<bool>,
}

impl FilterConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set target false positive rate as a ratio in (0, 1)
    pub fn target_fpr(mut self, fpr: f64) -> Self {
        self.target_fpr = Some(fpr);
        self
    }

    /// Set target false positive rate as a percentage in (0, 100)
    pub fn target_fpr_percent(mut self, percent: f64) -> Self {
        self.target_fpr = Some(percent / 100.0);
        self
    }

    /// Set the size of the first tier in bits
    pub fn initial_capacity(mut self, bits: usize) -> Self {
        self.initial_capacity = Some(bits);
        self
    }

    /// Set the ceiling for any single tier in bits
    pub fn max_capacity(mut self, bits: usize) -> Self {
        self.max_capacity = Some(bits);
        self
    }

    pub fn growth_mode(mut self, mode: GrowthMode) -> Self {
        self.growth_mode = Some(mode);
        self
    }

    /// Set the number of hash functions (1 to 32)
    pub fn hash_count(mut self, k: usize) -> Self {
        self.hash_count = Some(k);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn log_operations(mut self, enabled: bool) -> Self {
        self.log_operations = Some(enabled);
        self
    }

    /// Build the FilterConfig, validating all parameters
    pub fn build(self) -> Result<FilterConfig, FilterError> {
        let config = self.build_unchecked();
        config.validate()?;
        Ok(config)
    }

    /// Build without validation
    pub fn build_unchecked(self) -> FilterConfig {
        let defaults = FilterConfig::default();

        FilterConfig {
            target_fpr: self.target_fpr.unwrap_or(defaults.target_fpr),
            initial_capacity: self.initial_capacity.unwrap_or(defaults.initial_capacity),
            max_capacity: self.max_capacity.unwrap_or(defaults.max_capacity),
            growth_mode: self.growth_mode.unwrap_or(defaults.growth_mode),
            hash_count: self.hash_count.unwrap_or(defaults.hash_count),
            seed: self.seed.or(defaults.seed),
            log_operations: self.log_operations.unwrap_or(defaults.log_operations),
        }
    }
}
