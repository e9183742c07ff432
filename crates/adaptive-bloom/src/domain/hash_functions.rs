//! Hash chain for the adaptive Bloom filter
//!
//! A value is hashed once with SipHash-1-3 (fixed keys) into a 64-bit base
//! hash. Each function in the chain then mixes the base hash with its own
//! salt and reduces the result into `[0, capacity)` via `abs(raw % capacity)`.
//!
//! Salts are drawn once per chain from a seed (the construction timestamp
//! unless one is configured), so two filters do not share bit patterns but
//! one filter always maps a value to the same positions for a given capacity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use siphasher::sip::SipHasher13;

use crate::error::FilterError;

/// A single position-generating function of the chain
pub trait HashFunction: fmt::Debug + Send + Sync {
    /// Map a value's base hash onto an index in `[0, capacity)`
    fn position(&self, base_hash: u64, capacity: usize) -> usize;
}

/// Compute the base hash of a value
pub fn base_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = SipHasher13::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Reduce a raw hash into range: `abs(raw % capacity)`
pub fn reduce(raw: i64, capacity: usize) -> usize {
    (raw % capacity as i64).unsigned_abs() as usize
}

/// Seed derived from the current wall-clock time
pub fn timestamp_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn prepare(base_hash: u64, reverse: bool) -> i64 {
    if reverse {
        base_hash.reverse_bits() as i64
    } else {
        base_hash as i64
    }
}

/// Uses the base hash unchanged
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityHash;

impl HashFunction for IdentityHash {
    fn position(&self, base_hash: u64, capacity: usize) -> usize {
        reduce(base_hash as i64, capacity)
    }
}

/// `base + salt`, optionally on the bit-reversed base hash
#[derive(Clone, Copy, Debug)]
pub struct SaltedAdder {
    salt: i64,
    reverse: bool,
}

impl SaltedAdder {
    pub fn new(salt: i64, reverse: bool) -> Self {
        Self { salt, reverse }
    }
}

impl HashFunction for SaltedAdder {
    fn position(&self, base_hash: u64, capacity: usize) -> usize {
        reduce(prepare(base_hash, self.reverse).wrapping_add(self.salt), capacity)
    }
}

/// `base * salt`, optionally on the bit-reversed base hash
///
/// The salt is forced odd so the product keeps the low bits of the base hash.
#[derive(Clone, Copy, Debug)]
pub struct SaltedMultiplier {
    salt: i64,
    reverse: bool,
}

impl SaltedMultiplier {
    pub fn new(salt: i64, reverse: bool) -> Self {
        Self {
            salt: salt | 1,
            reverse,
        }
    }
}

impl HashFunction for SaltedMultiplier {
    fn position(&self, base_hash: u64, capacity: usize) -> usize {
        reduce(prepare(base_hash, self.reverse).wrapping_mul(self.salt), capacity)
    }
}

/// MurmurHash3 (x86, 32-bit) of the base hash bytes, seeded with the salt
#[derive(Clone, Copy, Debug)]
pub struct Murmur3Salted {
    seed: u32,
}

impl Murmur3Salted {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }
}

impl HashFunction for Murmur3Salted {
    fn position(&self, base_hash: u64, capacity: usize) -> usize {
        let bytes = base_hash.to_le_bytes();
        let mut cursor = Cursor::new(&bytes[..]);
        let hash = murmur3::murmur3_32(&mut cursor, self.seed).unwrap_or(0);
        reduce(hash as i64, capacity)
    }
}

/// Built-in function for slot `slot` of a generated chain
fn builtin(slot: usize, rng: &mut StdRng) -> Box<dyn HashFunction> {
    match slot % 5 {
        0 => Box::new(SaltedMultiplier::new(rng.gen(), false)),
        1 => Box::new(SaltedMultiplier::new(rng.gen(), true)),
        2 => Box::new(SaltedAdder::new(rng.gen(), true)),
        3 => Box::new(Murmur3Salted::new(rng.gen())),
        _ => Box::new(SaltedAdder::new(rng.gen(), false)),
    }
}

/// Fixed, ordered set of hash functions shared by every tier
#[derive(Debug)]
pub struct HashChain {
    functions: Vec<Box<dyn HashFunction>>,
}

impl HashChain {
    /// Build a chain of `count` built-in functions salted from the clock
    pub fn new(count: usize) -> Self {
        Self::seeded(count, timestamp_seed())
    }

    /// Build a chain of `count` built-in functions salted from `seed`
    ///
    /// The first three are multiplier, reversed multiplier and reversed
    /// adder; longer chains continue with murmur3 and a plain adder.
    pub fn seeded(count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let functions = (0..count.max(1)).map(|slot| builtin(slot, &mut rng)).collect();
        Self { functions }
    }

    /// Build a chain from caller-supplied functions
    pub fn from_functions(functions: Vec<Box<dyn HashFunction>>) -> Result<Self, FilterError> {
        if functions.is_empty() {
            return Err(FilterError::InvalidParameters(
                "hash chain needs at least one function".to_string(),
            ));
        }
        Ok(Self { functions })
    }

    /// Number of functions (k)
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Compute the k positions of `value` for a tier of `capacity` bits
    pub fn positions<T: Hash + ?Sized>(
        &self,
        value: &T,
        capacity: usize,
    ) -> Result<Vec<usize>, FilterError> {
        self.positions_for_hash(base_hash(value), capacity)
    }

    /// Compute positions from an already computed base hash
    ///
    /// Fails with `IndexOutOfRange` if a function breaks its contract.
    pub fn positions_for_hash(
        &self,
        base_hash: u64,
        capacity: usize,
    ) -> Result<Vec<usize>, FilterError> {
        self.functions
            .iter()
            .map(|function| {
                let index = function.position(base_hash, capacity);
                if index >= capacity {
                    Err(FilterError::IndexOutOfRange { index, capacity })
                } else {
                    Ok(index)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Overflowing;

    impl HashFunction for Overflowing {
        fn position(&self, _: u64, capacity: usize) -> usize {
            capacity
        }
    }

    #[test]
    fn test_base_hash_deterministic() {
        assert_eq!(base_hash("wallet_0x1234"), base_hash("wallet_0x1234"));
        assert_eq!(base_hash(&42u64), base_hash(&42u64));
        assert_ne!(base_hash(&42u64), base_hash(&43u64));
    }

    #[test]
    fn test_reduce_takes_absolute_remainder() {
        assert_eq!(reduce(25, 10), 5);
        assert_eq!(reduce(-25, 10), 5);
        assert_eq!(reduce(i64::MIN, 7), (i64::MIN % 7).unsigned_abs() as usize);
        assert!(reduce(i64::MIN, 1000) < 1000);
    }

    #[test]
    fn test_chain_positions_deterministic() {
        let chain = HashChain::seeded(3, 7);

        let first = chain.positions(&12345u32, 1000).unwrap();
        let second = chain.positions(&12345u32, 1000).unwrap();

        assert_eq!(first, second, "Same value and capacity must map to same positions");
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_positions_within_bounds() {
        let chain = HashChain::seeded(8, 99);

        for capacity in [1usize, 2, 10, 1000, 65_536] {
            for value in 0..200u64 {
                for pos in chain.positions(&value, capacity).unwrap() {
                    assert!(pos < capacity, "Position {} should be < {}", pos, capacity);
                }
            }
        }
    }

    #[test]
    fn test_different_seeds_different_positions() {
        let chain1 = HashChain::seeded(3, 1);
        let chain2 = HashChain::seeded(3, 2);

        let differing = (0..50u64)
            .filter(|v| {
                chain1.positions(v, 10_000).unwrap() != chain2.positions(v, 10_000).unwrap()
            })
            .count();

        assert!(differing > 40, "Re-seeded chains should diverge, {} of 50 differed", differing);
    }

    #[test]
    fn test_reversed_variant_diverges() {
        let plain = SaltedAdder::new(17, false);
        let reversed = SaltedAdder::new(17, true);

        let differing = (0..100u64)
            .map(|v| base_hash(&v))
            .filter(|&h| plain.position(h, 4096) != reversed.position(h, 4096))
            .count();

        assert!(differing > 90, "Bit reversal should decorrelate positions");
    }

    #[test]
    fn test_multiplier_salt_forced_odd() {
        let mul = SaltedMultiplier::new(10, false);
        // base hash 1 times an odd salt is odd
        assert_eq!(mul.position(1, 2), 1);
    }

    #[test]
    fn test_murmur3_seed_changes_output() {
        let a = Murmur3Salted::new(0);
        let b = Murmur3Salted::new(1);
        let h = base_hash("element");

        assert_eq!(a.position(h, 1 << 20), a.position(h, 1 << 20));
        assert_ne!(a.position(h, 1 << 20), b.position(h, 1 << 20));
    }

    #[test]
    fn test_hash_uniformity() {
        let chain = HashChain::seeded(3, 2024);
        let m = 1000;
        let mut counts = vec![0usize; 10];

        for i in 0..1000u32 {
            for pos in chain.positions(&i, m).unwrap() {
                counts[pos / 100] += 1;
            }
        }

        // 1000 values * 3 functions / 10 buckets
        let expected = 300;
        for (i, count) in counts.iter().enumerate() {
            assert!(
                *count >= expected / 2 && *count <= expected * 3 / 2,
                "Bucket {} has {} entries, expected ~{}",
                i,
                count,
                expected
            );
        }
    }

    #[test]
    fn test_custom_chain_out_of_range_detected() {
        let chain = HashChain::from_functions(vec![Box::new(IdentityHash), Box::new(Overflowing)])
            .unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.positions("x", 16),
            Err(FilterError::IndexOutOfRange {
                index: 16,
                capacity: 16
            })
        );
    }

    #[test]
    fn test_empty_chain_rejected() {
        let result = HashChain::from_functions(Vec::new());
        assert!(matches!(result, Err(FilterError::InvalidParameters(_))));
    }

    #[test]
    fn test_zero_count_builds_single_function() {
        let chain = HashChain::seeded(0, 5);
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
    }
}
