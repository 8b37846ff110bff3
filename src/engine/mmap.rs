//! Memory-mapped medium
//!
//! Maps a file or device (for example a DAX character device such as
//! `/dev/dax0.0`) into the address space with `MAP_SHARED` and moves data with
//! `memcpy`. Offsets are plain address arithmetic: there is no position and no
//! syscall in the hot path.
//!
//! Device files usually report a size of 0, so the mapping length can be
//! given explicitly; otherwise the file size is used.

use super::{clamp_copy, Medium, MediumKind, OpenMode};
use crate::error::{BenchError, BenchResult};
use std::fs::OpenOptions;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::ptr;

/// Shared mapping of a file or device
pub struct MappedMedium {
    addr: *mut u8,
    size: usize,
    writable: bool,
}

// Safety: MappedMedium owns the mapping and is only used by one thread at a
// time. The pointer is valid until drop.
unsafe impl Send for MappedMedium {}

impl MappedMedium {
    /// Map `path`
    ///
    /// `length = None` maps the whole file. `ReadOnly` maps with `PROT_READ`,
    /// anything else with `PROT_READ | PROT_WRITE`.
    ///
    /// # Errors
    ///
    /// `Io` if open, fstat, or mmap fails; `Config` if the length is 0.
    pub fn open(path: impl AsRef<Path>, mode: OpenMode, length: Option<u64>) -> BenchResult<Self> {
        // A shared writable mapping needs a descriptor opened read-write.
        let writable = mode.writable();
        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(path.as_ref())
            .map_err(|source| BenchError::Io { op: "open", source })?;

        let size: u64 = match length {
            Some(len) => len,
            None => file
                .metadata()
                .map_err(|source| BenchError::Io { op: "fstat", source })?
                .len(),
        };
        let size = size as usize;

        if size == 0 {
            return Err(BenchError::config(format!(
                "cannot map zero-length region: {}",
                path.as_ref().display()
            )));
        }

        let prot = if writable {
            libc::PROT_READ | libc::PROT_WRITE
        } else {
            libc::PROT_READ
        };

        // SAFETY: fd is valid for the duration of the call; the kernel keeps
        // its own reference to the file once the mapping exists.
        let addr = unsafe {
            libc::mmap(
                ptr::null_mut(),
                size,
                prot,
                libc::MAP_SHARED,
                file.as_raw_fd(),
                0,
            )
        };

        if addr == libc::MAP_FAILED {
            return Err(BenchError::last_os("mmap"));
        }

        Ok(Self {
            addr: addr as *mut u8,
            size,
            writable,
        })
    }

}

impl Medium for MappedMedium {
    fn len(&self) -> u64 {
        self.size as u64
    }

    fn alignment(&self) -> usize {
        1
    }

    fn kind(&self) -> MediumKind {
        MediumKind::Mapped
    }

    #[inline(always)]
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> BenchResult<usize> {
        let n = clamp_copy(self.size, offset, buf.len());
        if n == 0 {
            return Ok(0);
        }
        // SAFETY: [offset, offset + n) lies inside the mapping and buf holds
        // at least n bytes; the regions cannot overlap.
        unsafe {
            ptr::copy_nonoverlapping(self.addr.add(offset as usize), buf.as_mut_ptr(), n);
        }
        Ok(n)
    }

    #[inline(always)]
    fn write_at(&mut self, buf: &[u8], offset: u64) -> BenchResult<usize> {
        if !self.writable {
            return Err(BenchError::Io {
                op: "mmap write",
                source: std::io::Error::from_raw_os_error(libc::EACCES),
            });
        }
        let n = clamp_copy(self.size, offset, buf.len());
        if n == 0 {
            return Ok(0);
        }
        // SAFETY: as in read_at, with the mapping as destination.
        unsafe {
            ptr::copy_nonoverlapping(buf.as_ptr(), self.addr.add(offset as usize), n);
        }
        Ok(n)
    }
}

impl Drop for MappedMedium {
    fn drop(&mut self) {
        // SAFETY: addr/size came from a successful mmap.
        unsafe {
            libc::munmap(self.addr as *mut libc::c_void, self.size);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mapped_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map.dat");
        let data: Vec<u8> = (0..16384u32).map(|i| (i % 256) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        let mut medium = MappedMedium::open(&path, OpenMode::ReadOnly, None).unwrap();
        assert_eq!(medium.len(), 16384);

        let mut buf = vec![0u8; 4096];
        assert_eq!(medium.read_at(&mut buf, 8192).unwrap(), 4096);
        assert_eq!(&buf[..], &data[8192..12288]);
    }

    #[test]
    fn test_mapped_write_visible_in_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map_rw.dat");
        std::fs::write(&path, vec![0u8; 8192]).unwrap();

        {
            let mut medium = MappedMedium::open(&path, OpenMode::ReadWrite, None).unwrap();
            assert_eq!(medium.write_at(&[7u8; 4096], 4096).unwrap(), 4096);
        }

        let contents = std::fs::read(&path).unwrap();
        assert!(contents[..4096].iter().all(|&b| b == 0));
        assert!(contents[4096..].iter().all(|&b| b == 7));
    }

    #[test]
    fn test_mapped_readonly_rejects_write() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map_ro.dat");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let mut medium = MappedMedium::open(&path, OpenMode::ReadOnly, None).unwrap();
        assert!(medium.write_at(&[1u8; 16], 0).is_err());
    }

    #[test]
    fn test_mapped_zero_length_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("empty.dat");
        std::fs::write(&path, b"").unwrap();

        let result = MappedMedium::open(&path, OpenMode::ReadOnly, None);
        assert!(matches!(result, Err(BenchError::Config(_))));
    }

    #[test]
    fn test_mapped_read_past_end_is_short() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map_short.dat");
        std::fs::write(&path, vec![0u8; 6144]).unwrap();

        let mut medium = MappedMedium::open(&path, OpenMode::ReadOnly, None).unwrap();
        let mut buf = vec![0u8; 4096];
        assert_eq!(medium.read_at(&mut buf, 4096).unwrap(), 2048);
    }

    #[test]
    fn test_mapped_access_beyond_end_returns_zero() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("map_beyond.dat");
        std::fs::write(&path, vec![0u8; 4096]).unwrap();

        let mut medium = MappedMedium::open(&path, OpenMode::ReadWrite, None).unwrap();
        let mut buf = vec![0u8; 4096];
        assert_eq!(medium.read_at(&mut buf, 10_000).unwrap(), 0);
        assert_eq!(medium.write_at(&buf, 10_000).unwrap(), 0);
        assert_eq!(medium.read_at(&mut buf, u64::MAX).unwrap(), 0);
    }
}
