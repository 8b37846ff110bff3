//! Descriptor-based file medium
//!
//! Drives a regular file (or block device) with plain `read`/`write` syscalls
//! on the descriptor's implicit position, the way a simple benchmark loop
//! does. The medium tracks the current position and only issues an `lseek`
//! when the next offset differs from it, so a sequential pass is a pure stream
//! of reads or writes while a random pass seeks before every transfer.
//!
//! # Direct IO
//!
//! Opening with `direct = true` adds `O_DIRECT`. The page cache is bypassed,
//! and buffers, offsets, and transfer sizes must be multiples of the logical
//! block size reported by [`Medium::alignment`].
//!
//! # Example
//!
//! ```no_run
//! use fsprobe::engine::{Medium, OpenMode};
//! use fsprobe::engine::sync::FileMedium;
//!
//! let mut medium = FileMedium::open("/tmp/testfile.dat", OpenMode::ReadOnly, false)?;
//! let mut buf = vec![0u8; 4096];
//! let n = medium.read_at(&mut buf, 0)?;
//! assert_eq!(n, 4096);
//! # Ok::<(), fsprobe::error::BenchError>(())
//! ```

use super::{Medium, MediumKind, OpenMode, DEFAULT_ALIGNMENT};
use crate::error::{BenchError, BenchResult};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;

/// File medium using read/write/lseek
pub struct FileMedium {
    file: File,
    size: u64,
    /// Current descriptor position
    position: u64,
    direct: bool,
    /// Logical block size (direct IO) or the default alignment
    alignment: usize,
}

impl FileMedium {
    /// Open an existing file
    ///
    /// # Errors
    ///
    /// `Io` if the open or the metadata query fails.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, direct: bool) -> BenchResult<Self> {
        let mut options = OpenOptions::new();
        options.read(mode.readable()).write(mode.writable());
        if direct {
            options.custom_flags(libc::O_DIRECT);
        }

        let file = options
            .open(path.as_ref())
            .map_err(|source| BenchError::Io { op: "open", source })?;

        let size = file
            .metadata()
            .map_err(|source| BenchError::Io { op: "fstat", source })?
            .len();

        let alignment = if direct {
            logical_block_size(&file)
        } else {
            DEFAULT_ALIGNMENT
        };

        Ok(Self {
            file,
            size,
            position: 0,
            direct,
            alignment,
        })
    }

    fn seek_to(&mut self, offset: u64) -> BenchResult<()> {
        if offset == self.position {
            return Ok(());
        }
        // SAFETY: lseek only requires a valid descriptor, which `file` owns.
        let result = unsafe {
            libc::lseek(self.file.as_raw_fd(), offset as libc::off_t, libc::SEEK_SET)
        };
        if result < 0 {
            return Err(BenchError::last_os("lseek"));
        }
        self.position = offset;
        Ok(())
    }
}

impl Medium for FileMedium {
    fn len(&self) -> u64 {
        self.size
    }

    fn alignment(&self) -> usize {
        self.alignment
    }

    fn kind(&self) -> MediumKind {
        if self.direct {
            MediumKind::DirectFile
        } else {
            MediumKind::File
        }
    }

    #[inline(always)]
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> BenchResult<usize> {
        self.seek_to(offset)?;
        // SAFETY: buf is a valid writable region of buf.len() bytes.
        let result = unsafe {
            libc::read(
                self.file.as_raw_fd(),
                buf.as_mut_ptr() as *mut libc::c_void,
                buf.len(),
            )
        };
        if result < 0 {
            return Err(BenchError::last_os("read"));
        }
        let n = result as usize;
        self.position += n as u64;
        Ok(n)
    }

    #[inline(always)]
    fn write_at(&mut self, buf: &[u8], offset: u64) -> BenchResult<usize> {
        self.seek_to(offset)?;
        // SAFETY: buf is a valid readable region of buf.len() bytes.
        let result = unsafe {
            libc::write(
                self.file.as_raw_fd(),
                buf.as_ptr() as *const libc::c_void,
                buf.len(),
            )
        };
        if result < 0 {
            return Err(BenchError::last_os("write"));
        }
        let n = result as usize;
        self.position += n as u64;
        if self.position > self.size {
            self.size = self.position;
        }
        Ok(n)
    }

    fn rewind(&mut self) -> BenchResult<()> {
        // Force a real seek: the tracked position is only a cache.
        self.position = u64::MAX;
        self.seek_to(0)
    }
}

/// O_DIRECT alignment for files under `path`
///
/// `path` may be a directory; its filesystem's block size is reported the
/// same way [`FileMedium::open`] would for a file created inside it.
pub fn direct_alignment(path: impl AsRef<Path>) -> BenchResult<usize> {
    let file = File::open(path.as_ref()).map_err(|source| BenchError::Io { op: "open", source })?;
    Ok(logical_block_size(&file))
}

/// Logical block size for O_DIRECT alignment
///
/// Tries the BLKSSZGET ioctl (block devices), then `st_blksize` (regular
/// files), and falls back to 512.
fn logical_block_size(file: &File) -> usize {
    let fd = file.as_raw_fd();

    let mut block_size: libc::c_int = 0;
    // SAFETY: BLKSSZGET writes a single c_int into block_size.
    let result = unsafe { libc::ioctl(fd, libc::BLKSSZGET, &mut block_size) };
    if result == 0 && block_size > 0 {
        return block_size as usize;
    }

    // SAFETY: fstat writes into a zeroed stat struct we own.
    let mut stat: libc::stat = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::fstat(fd, &mut stat) };
    if result == 0 {
        let blksize = stat.st_blksize as usize;
        if blksize >= DEFAULT_ALIGNMENT && blksize.is_power_of_two() {
            return blksize;
        }
    }

    DEFAULT_ALIGNMENT
}
