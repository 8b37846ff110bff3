//! io_uring medium
//!
//! A file medium that issues positioned reads and writes through an io_uring
//! instance. The access loop is synchronous, so every transfer is pushed,
//! submitted, and reaped before the next one (queue depth 1). This keeps the
//! measurement comparable with the syscall medium while exercising the ring.
//!
//! # Requirements
//!
//! - Linux kernel 5.1 or later
//! - `io_uring` feature enabled in Cargo.toml (on by default)
//!
//! # Example
//!
//! ```no_run
//! use fsprobe::engine::io_uring::smoke_test;
//!
//! let echoed = smoke_test("/tmp/uring_test.txt")?;
//! assert_eq!(echoed, b"Hello io_uring!\n");
//! # Ok::<(), fsprobe::error::BenchError>(())
//! ```

use super::{Medium, MediumKind, OpenMode, DEFAULT_ALIGNMENT};
use crate::error::{BenchError, BenchResult};
use io_uring::{cqueue, opcode, types, IoUring};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// Ring entries; one transfer is in flight at a time
const RING_ENTRIES: u32 = 8;

/// Greeting written and read back by [`smoke_test`]
pub const SMOKE_MESSAGE: &[u8] = b"Hello io_uring!\n";

/// io_uring-backed file medium
pub struct UringMedium {
    ring: IoUring,
    file: File,
    size: u64,
    next_user_data: u64,
}

impl UringMedium {
    /// Open `path` and set up a ring
    ///
    /// # Errors
    ///
    /// `Io` if the open, fstat, or ring setup fails.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, create: bool) -> BenchResult<Self> {
        let file = OpenOptions::new()
            .read(mode.readable())
            .write(mode.writable())
            .create(create)
            .mode(0o644)
            .open(path.as_ref())
            .map_err(|source| BenchError::Io { op: "open", source })?;

        let size = file
            .metadata()
            .map_err(|source| BenchError::Io { op: "fstat", source })?
            .len();

        let ring = IoUring::new(RING_ENTRIES)
            .map_err(|source| BenchError::Io { op: "io_uring_setup", source })?;

        Ok(Self {
            ring,
            file,
            size,
            next_user_data: 0,
        })
    }

    /// Submit one prepared entry and wait for its completion
    fn complete_one(&mut self, entry: io_uring::squeue::Entry, op: &'static str) -> BenchResult<usize> {
        // SAFETY: the buffer referenced by `entry` outlives this call because
        // we block until the matching completion has been reaped.
        unsafe {
            self.ring.submission().push(&entry).map_err(|_| BenchError::Io {
                op,
                source: std::io::Error::from_raw_os_error(libc::EBUSY),
            })?;
        }

        self.ring
            .submit_and_wait(1)
            .map_err(|source| BenchError::Io { op, source })?;

        let cqe: cqueue::Entry = self.ring.completion().next().ok_or_else(|| BenchError::Io {
            op,
            source: std::io::Error::from_raw_os_error(libc::EIO),
        })?;

        let result = cqe.result();
        if result < 0 {
            return Err(BenchError::Io {
                op,
                source: std::io::Error::from_raw_os_error(-result),
            });
        }
        Ok(result as usize)
    }

    fn user_data(&mut self) -> u64 {
        self.next_user_data = self.next_user_data.wrapping_add(1);
        self.next_user_data
    }
}

impl Medium for UringMedium {
    fn len(&self) -> u64 {
        self.size
    }

    fn alignment(&self) -> usize {
        DEFAULT_ALIGNMENT
    }

    fn kind(&self) -> MediumKind {
        MediumKind::Uring
    }

    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> BenchResult<usize> {
        let user_data = self.user_data();
        let entry = opcode::Read::new(
            types::Fd(self.file.as_raw_fd()),
            buf.as_mut_ptr(),
            buf.len() as u32,
        )
        .offset(offset)
        .build()
        .user_data(user_data);

        self.complete_one(entry, "io_uring read")
    }

    fn write_at(&mut self, buf: &[u8], offset: u64) -> BenchResult<usize> {
        let user_data = self.user_data();
        let entry = opcode::Write::new(
            types::Fd(self.file.as_raw_fd()),
            buf.as_ptr(),
            buf.len() as u32,
        )
        .offset(offset)
        .build()
        .user_data(user_data);

        let n = self.complete_one(entry, "io_uring write")?;
        self.size = self.size.max(offset + n as u64);
        Ok(n)
    }
}

/// Write a greeting through the ring, read it back, and return what was read
///
/// Creates `path` if needed. Succeeds only if the bytes read back equal the
/// bytes written.
pub fn smoke_test(path: impl AsRef<Path>) -> BenchResult<Vec<u8>> {
    let mut medium = UringMedium::open(path, OpenMode::ReadWrite, true)?;

    let written = medium.write_at(SMOKE_MESSAGE, 0)?;
    if written != SMOKE_MESSAGE.len() {
        return Err(BenchError::ShortTransfer {
            offset: 0,
            expected: SMOKE_MESSAGE.len(),
            actual: written,
        });
    }

    let mut buf = vec![0u8; 4096];
    let read = medium.read_at(&mut buf, 0)?;
    buf.truncate(read);

    if buf != SMOKE_MESSAGE {
        return Err(BenchError::ShortTransfer {
            offset: 0,
            expected: SMOKE_MESSAGE.len(),
            actual: read,
        });
    }

    Ok(buf)
}
