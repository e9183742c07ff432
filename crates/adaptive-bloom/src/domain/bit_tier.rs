//! Bit tier: one fixed-size bit array plus its live set-bit count
//!
//! INVARIANTS:
//! - `set_bits` always equals the number of set positions
//! - Bits only ever go from unset to set, so `set_bits` never decreases

use bitvec::prelude::*;

use crate::error::FilterError;

/// A fixed-capacity bit array, the unit of storage growth
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitTier {
    /// Bit array storing the tier state
    bits: BitVec<u64, Lsb0>,
    /// Number of set bits
    set_bits: usize,
}

impl BitTier {
    /// Create an all-unset tier of `capacity` bits
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "tier capacity must be positive");
        Self {
            bits: bitvec![u64, Lsb0; 0; capacity],
            set_bits: 0,
        }
    }

    /// Check whether the bit at `index` is set
    pub fn is_set(&self, index: usize) -> Result<bool, FilterError> {
        self.check_bounds(index)?;
        Ok(self.bits[index])
    }

    /// Set the bit at `index`
    ///
    /// Returns `true` if the bit was previously unset. Setting an already
    /// set bit is a no-op and returns `false`.
    pub fn try_set(&mut self, index: usize) -> Result<bool, FilterError> {
        self.check_bounds(index)?;
        if self.bits[index] {
            return Ok(false);
        }
        self.bits.set(index, true);
        self.set_bits += 1;
        Ok(true)
    }

    /// Fraction of bits set: `set_bits / capacity`
    pub fn occupancy(&self) -> f64 {
        self.set_bits as f64 / self.capacity() as f64
    }

    /// Size of the tier in bits
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Number of bits currently set
    pub fn set_bits(&self) -> usize {
        self.set_bits
    }

    /// Indices of all set bits, ascending
    pub fn iter_set(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Raw backing words
    pub fn as_raw_slice(&self) -> &[u64] {
        self.bits.as_raw_slice()
    }

    fn check_bounds(&self, index: usize) -> Result<(), FilterError> {
        if index >= self.capacity() {
            return Err(FilterError::IndexOutOfRange {
                index,
                capacity: self.capacity(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tier_is_empty() {
        let tier = BitTier::new(100);

        assert_eq!(tier.capacity(), 100);
        assert_eq!(tier.set_bits(), 0);
        assert_eq!(tier.occupancy(), 0.0);
        assert_eq!(tier.iter_set().count(), 0);
    }

    #[test]
    fn test_try_set_flips_once() {
        let mut tier = BitTier::new(64);

        assert_eq!(tier.try_set(7), Ok(true), "First set should flip the bit");
        assert_eq!(tier.try_set(7), Ok(false), "Second set should be a no-op");
        assert_eq!(tier.set_bits(), 1, "Count must only move once per bit");
        assert_eq!(tier.is_set(7), Ok(true));
        assert_eq!(tier.is_set(8), Ok(false));
    }

    #[test]
    fn test_set_bits_matches_population() {
        let mut tier = BitTier::new(1000);
        for i in (0..1000).step_by(7) {
            tier.try_set(i).unwrap();
        }
        for i in (0..1000).step_by(14) {
            tier.try_set(i).unwrap();
        }

        assert_eq!(tier.set_bits(), tier.iter_set().count());
        assert_eq!(tier.set_bits(), 143);
    }

    #[test]
    fn test_out_of_range_index_is_rejected() {
        let mut tier = BitTier::new(10);

        assert_eq!(
            tier.is_set(10),
            Err(FilterError::IndexOutOfRange {
                index: 10,
                capacity: 10
            })
        );
        assert!(matches!(
            tier.try_set(11),
            Err(FilterError::IndexOutOfRange { index: 11, .. })
        ));
        assert_eq!(tier.set_bits(), 0, "Failed set must not change the count");
    }

    #[test]
    fn test_occupancy_is_fraction_of_capacity() {
        let mut tier = BitTier::new(8);
        tier.try_set(0).unwrap();
        tier.try_set(5).unwrap();

        assert_eq!(tier.occupancy(), 0.25);
        assert_eq!(tier.iter_set().collect::<Vec<_>>(), vec![0, 5]);
    }
}
