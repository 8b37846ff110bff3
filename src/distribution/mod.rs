//! Offset sequences
//!
//! An access loop visits block-aligned byte offsets covering `[0, length)`
//! with a stride of one unit. Sequential ordering visits them in increasing
//! order; random ordering visits a Fisher-Yates permutation of the same set, so
//! every offset is touched exactly once per pass.
//!
//! Sequences are built once, before timing starts, and then iterated by the
//! worker. Working in block numbers keeps every offset aligned to the unit
//! size, which direct IO requires.
//!
//! # Example
//!
//! ```
//! use fsprobe::distribution::OffsetSequence;
//!
//! let seq = OffsetSequence::sequential(4, 4096);
//! assert_eq!(seq.iter().collect::<Vec<_>>(), vec![0, 4096, 8192, 12288]);
//!
//! let rand = OffsetSequence::shuffled(4, 4096, 42);
//! let mut offsets: Vec<u64> = rand.iter().collect();
//! offsets.sort_unstable();
//! assert_eq!(offsets, vec![0, 4096, 8192, 12288]);
//! ```

pub mod shuffle;

use crate::config::workload::{AccessSpec, Ordering};
use shuffle::{clock_seed, IndexShuffle};

/// Precomputed block order for one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetSequence {
    blocks: Vec<u64>,
    unit_size: u64,
}

impl OffsetSequence {
    /// Identity order: 0, unit, 2*unit, ...
    pub fn sequential(block_count: u64, unit_size: usize) -> Self {
        Self {
            blocks: (0..block_count).collect(),
            unit_size: unit_size as u64,
        }
    }

    /// Permuted order from a seeded shuffle
    pub fn shuffled(block_count: u64, unit_size: usize, seed: u64) -> Self {
        let blocks = IndexShuffle::with_seed(seed).shuffle(block_count as usize);
        Self {
            blocks,
            unit_size: unit_size as u64,
        }
    }

    /// Build the sequence a spec calls for
    ///
    /// Random ordering uses the spec's seed, or a clock-derived one salted
    /// with `salt` (the worker id in pool runs).
    pub fn for_spec(spec: &AccessSpec, salt: u64) -> Self {
        match spec.ordering() {
            Ordering::Sequential => Self::sequential(spec.block_count(), spec.unit_size()),
            Ordering::Random => {
                let seed = spec
                    .seed()
                    .map(|s| s.wrapping_add(salt))
                    .unwrap_or_else(|| clock_seed(salt));
                Self::shuffled(spec.block_count(), spec.unit_size(), seed)
            }
        }
    }

    /// Byte offsets in visit order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        let unit = self.unit_size;
        self.blocks.iter().map(move |&b| b * unit)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn unit_size(&self) -> u64 {
        self.unit_size
    }
}
