//! Fisher-Yates index shuffle
//!
//! Produces a uniformly random permutation of `0..n` from a seeded
//! xoshiro256++ generator. Seeding is explicit so tests can pin the order.

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seed derived from wall-clock time
///
/// Mixed with `salt` so that workers started in the same instant still get
/// independent sequences.
pub fn clock_seed(salt: u64) -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    nanos ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Seeded permutation generator
pub struct IndexShuffle {
    rng: Xoshiro256PlusPlus,
}

impl IndexShuffle {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// Shuffle `items` in place
    ///
    /// For i from n-1 down to 1, draw j uniformly from [0, i] and swap.
    pub fn shuffle_in_place<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            items.swap(i, j);
        }
    }

    /// Permutation of `0..n`
    pub fn shuffle(&mut self, n: usize) -> Vec<u64> {
        let mut indices: Vec<u64> = (0..n as u64).collect();
        self.shuffle_in_place(&mut indices);
        indices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_permutation(v: &[u64]) -> bool {
        let mut sorted = v.to_vec();
        sorted.sort_unstable();
        sorted.iter().enumerate().all(|(i, &x)| x == i as u64)
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut shuffle = IndexShuffle::with_seed(42);
        for n in 1..200 {
            let perm = shuffle.shuffle(n);
            assert_eq!(perm.len(), n);
            assert!(is_permutation(&perm), "n={} not a permutation", n);
        }
    }

    #[test]
    fn test_shuffle_small() {
        let mut shuffle = IndexShuffle::with_seed(clock_seed(0));
        assert!(shuffle.shuffle(0).is_empty());
        assert_eq!(shuffle.shuffle(1), vec![0]);
    }

    #[test]
    fn test_shuffle_seeded_deterministic() {
        let a = IndexShuffle::with_seed(12345).shuffle(1000);
        let b = IndexShuffle::with_seed(12345).shuffle(1000);
        assert_eq!(a, b);
    }

    #[test]
    fn test_shuffle_actually_permutes() {
        let perm = IndexShuffle::with_seed(7).shuffle(1000);
        let identity: Vec<u64> = (0..1000).collect();
        assert_ne!(perm, identity);
    }

    #[test]
    fn test_shuffle_first_position_coverage() {
        // Every value should land in slot 0 for some seed.
        let n = 8;
        let mut seen = vec![false; n];
        for seed in 0..2000 {
            let perm = IndexShuffle::with_seed(seed).shuffle(n);
            seen[perm[0] as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_clock_seed_salted() {
        assert_ne!(clock_seed(1), clock_seed(2));
    }
}
