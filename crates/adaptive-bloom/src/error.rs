//! Error types for the adaptive Bloom filter

use thiserror::Error;

/// Errors that can occur while configuring or operating a filter
#[derive(Clone, Debug, Error, PartialEq)]
pub enum FilterError {
    #[error("Invalid false positive rate: {fpr} (must be strictly between 0 and 1)")]
    InvalidFPR { fpr: f64 },

    #[error("Initial capacity exceeds maximum: {initial} > {max}")]
    InitialCapacityTooLarge { initial: usize, max: usize },

    #[error("Invalid filter parameters: {0}")]
    InvalidParameters(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The target false positive rate cannot be honored even at the
    /// maximum capacity. The filter must not be grown any further.
    #[error("Capacity exhausted: false positive rate {target_fpr} cannot be honored within {max_capacity} bits")]
    CapacityExhausted { target_fpr: f64, max_capacity: usize },

    /// A hash function produced an index outside the tier it addresses.
    #[error("Bit index out of range: {index} >= {capacity}")]
    IndexOutOfRange { index: usize, capacity: usize },
}

impl FilterError {
    /// True for errors raised eagerly while validating a configuration
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FilterError::InvalidFPR { .. }
                | FilterError::InitialCapacityTooLarge { .. }
                | FilterError::InvalidParameters(_)
                | FilterError::SerializationError(_)
        )
    }
}
