//! Backing media for access loops
//!
//! A medium is the thing a benchmark moves bytes to and from. Different media
//! use different kernel interfaces (read/write syscalls, O_DIRECT, mmap +
//! memcpy, io_uring, plain heap memory), but the access loop drives all of them
//! through the [`Medium`] trait and stays agnostic to the mechanism.
//!
//! # Media
//!
//! - **File** ([`sync::FileMedium`]): file descriptor driven with
//!   `read`/`write`/`lseek`; optional O_DIRECT
//! - **Mapped** ([`mmap::MappedMedium`]): shared mapping of a file or DAX device
//! - **Heap** ([`heap::HeapMedium`]): anonymous memory, optionally pre-touched
//! - **io_uring** ([`io_uring::UringMedium`]): positioned reads/writes through a
//!   ring at queue depth 1 (feature `io_uring`)
//!
//! # Transfer contract
//!
//! Every call performs exactly one transfer and reports how many bytes moved.
//! Media never retry: a short count is returned as-is and the caller treats it
//! as fatal, because a retried transfer would distort the measurement.

use crate::error::BenchResult;
use std::fmt;

/// Backing store for an access loop
///
/// Media must be `Send` so a pool can move each one into its own worker
/// thread. They are not shared between threads.
pub trait Medium: Send {
    /// Total addressable length in bytes
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Required alignment of buffers, offsets, and transfer sizes
    fn alignment(&self) -> usize;

    fn kind(&self) -> MediumKind;

    /// Copy up to `buf.len()` bytes at `offset` into `buf`
    ///
    /// Returns the number of bytes actually transferred.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> BenchResult<usize>;

    /// Copy `buf` to `offset`
    ///
    /// Returns the number of bytes actually transferred.
    fn write_at(&mut self, buf: &[u8], offset: u64) -> BenchResult<usize>;

    /// Reset to offset 0 before a new pass
    ///
    /// Descriptor media seek back to the start; address-based media have no
    /// position and keep the default no-op.
    fn rewind(&mut self) -> BenchResult<()> {
        Ok(())
    }
}

/// Medium flavor, used for labels and logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediumKind {
    File,
    DirectFile,
    Mapped,
    Heap,
    Uring,
}

impl fmt::Display for MediumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediumKind::File => write!(f, "file"),
            MediumKind::DirectFile => write!(f, "direct-file"),
            MediumKind::Mapped => write!(f, "mmap"),
            MediumKind::Heap => write!(f, "heap"),
            MediumKind::Uring => write!(f, "io_uring"),
        }
    }
}

/// How a file-backed medium is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl OpenMode {
    pub(crate) fn readable(self) -> bool {
        matches!(self, OpenMode::ReadOnly | OpenMode::ReadWrite)
    }

    pub(crate) fn writable(self) -> bool {
        matches!(self, OpenMode::WriteOnly | OpenMode::ReadWrite)
    }
}

/// Default buffer alignment for media without a hard requirement
pub const DEFAULT_ALIGNMENT: usize = 512;

/// Clamp a copy of `len` bytes at `offset` to a region of `size` bytes
///
/// Shared by the address-based media: copies past the end are cut short and
/// the caller sees the short count.
#[inline(always)]
pub(crate) fn clamp_copy(size: usize, offset: u64, len: usize) -> usize {
    let offset = offset as usize;
    if offset >= size {
        0
    } else {
        len.min(size - offset)
    }
}

pub mod heap;
pub mod mmap;
pub mod sync;

#[cfg(feature = "io_uring")]
pub mod io_uring;
