//! Anonymous memory medium
//!
//! A private anonymous mapping used to measure raw memory copy throughput with
//! the same access loop as the storage media. The kernel backs a fresh mapping
//! with nothing until a page is first touched, so the first pass over a cold
//! region pays for page faults; [`HeapMedium::touch`] pre-faults every page to
//! measure the hot case instead.

use super::{clamp_copy, Medium, MediumKind};
use crate::error::{BenchError, BenchResult};
use std::ptr;

/// Anonymous-memory medium
pub struct HeapMedium {
    addr: *mut u8,
    size: usize,
}

// Safety: HeapMedium owns the mapping exclusively; the pointer is valid until
// drop and is never shared.
unsafe impl Send for HeapMedium {}

impl HeapMedium {
    /// Map a cold region of `length` bytes
    ///
    /// # Errors
    ///
    /// `Config` if `length` is 0, `Alloc` if the mapping fails.
    pub fn new(length: usize) -> BenchResult<Self> {
        if length == 0 {
            return Err(BenchError::config("memory region must be larger than 0 bytes"));
        }

        // SAFETY: anonymous mapping, no descriptor involved; the result is
        // checked against MAP_FAILED before use.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                length,
                libc::PROT_READ | libc::PROT_WRITE,
                libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
                -1,
                0,
            )
        };
        if addr == libc::MAP_FAILED {
            return Err(BenchError::Alloc {
                size: length,
                align: page_size(),
            });
        }

        Ok(Self {
            addr: addr as *mut u8,
            size: length,
        })
    }

    /// Map and pre-fault every page
    pub fn hot(length: usize) -> BenchResult<Self> {
        let mut medium = Self::new(length)?;
        medium.touch();
        Ok(medium)
    }

    /// Write every byte so no page fault happens inside a timed loop
    pub fn touch(&mut self) {
        self.as_mut_slice().fill(0);
    }

    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: addr/size describe a live read-write mapping owned by self.
        unsafe { std::slice::from_raw_parts(self.addr, self.size) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as in as_slice; &mut self guarantees exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.addr, self.size) }
    }
}

impl Medium for HeapMedium {
    fn len(&self) -> u64 {
        self.size as u64
    }

    fn alignment(&self) -> usize {
        1
    }

    fn kind(&self) -> MediumKind {
        MediumKind::Heap
    }

    #[inline(always)]
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> BenchResult<usize> {
        let n = clamp_copy(self.size, offset, buf.len());
        if n == 0 {
            return Ok(0);
        }
        let start = offset as usize;
        buf[..n].copy_from_slice(&self.as_slice()[start..start + n]);
        Ok(n)
    }

    #[inline(always)]
    fn write_at(&mut self, buf: &[u8], offset: u64) -> BenchResult<usize> {
        let n = clamp_copy(self.size, offset, buf.len());
        if n == 0 {
            return Ok(0);
        }
        let start = offset as usize;
        self.as_mut_slice()[start..start + n].copy_from_slice(&buf[..n]);
        Ok(n)
    }
}

impl Drop for HeapMedium {
    fn drop(&mut self) {
        // SAFETY: addr/size came from a successful mmap.
        unsafe {
            libc::munmap(self.addr as *mut libc::c_void, self.size);
        }
    }
}

fn page_size() -> usize {
    // SAFETY: sysconf has no memory-safety preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size > 0 {
        size as usize
    } else {
        4096
    }
}
