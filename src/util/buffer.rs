//! Aligned buffers and random fill
//!
//! This module provides memory-aligned buffers required for O_DIRECT transfers
//! and the random fill used to keep written data incompressible.

use crate::error::{BenchError, BenchResult};
use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::alloc::{alloc_zeroed, dealloc, Layout};

/// Fill `buf` with pseudo-random bytes over the full range 0..=255
///
/// Not cryptographically secure. Seeded from OS entropy.
pub fn fill_random(buf: &mut [u8]) {
    let mut rng = Xoshiro256PlusPlus::from_entropy();
    rng.fill_bytes(buf);
}

/// Deterministic variant of [`fill_random`]
pub fn fill_random_seeded(buf: &mut [u8], seed: u64) {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    rng.fill_bytes(buf);
}

/// Memory-aligned, zero-initialized heap buffer
pub struct AlignedBuffer {
    ptr: *mut u8,
    size: usize,
    alignment: usize,
    layout: Layout,
}

impl AlignedBuffer {
    /// Allocate `size` bytes aligned to `alignment`
    ///
    /// # Errors
    ///
    /// `Config` if `size` is 0 or `alignment` is not a power of two,
    /// `Alloc` if the allocator returns null.
    pub fn new(size: usize, alignment: usize) -> BenchResult<Self> {
        if !alignment.is_power_of_two() {
            return Err(BenchError::config(format!(
                "alignment must be a power of 2, got {}",
                alignment
            )));
        }
        if size == 0 {
            return Err(BenchError::config("buffer size must be greater than 0"));
        }

        let layout = Layout::from_size_align(size, alignment)
            .map_err(|e| BenchError::config(format!("invalid buffer layout: {}", e)))?;

        // SAFETY: layout has a non-zero size.
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            return Err(BenchError::Alloc {
                size,
                align: alignment,
            });
        }

        Ok(AlignedBuffer {
            ptr,
            size,
            alignment,
            layout,
        })
    }

    #[inline(always)]
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr
    }

    #[inline(always)]
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is a live allocation of `size` initialized bytes.
        unsafe { std::slice::from_raw_parts(self.ptr, self.size) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is a live allocation of `size` bytes owned by self.
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.size) }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    #[inline(always)]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        (self.ptr as usize) % self.alignment == 0
    }

    /// Fill with random bytes
    pub fn fill_random(&mut self) {
        fill_random(self.as_mut_slice());
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with exactly this layout.
        unsafe {
            dealloc(self.ptr, self.layout);
        }
    }
}

// AlignedBuffer is Send because it owns its memory
unsafe impl Send for AlignedBuffer {}
