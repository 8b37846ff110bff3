//! Test file creation and cleanup
//!
//! Benchmarks run against files filled with random data so that reads hit
//! real blocks rather than holes. Files are written in fixed-size chunks from
//! an aligned buffer, optionally with `O_DIRECT`.
//!
//! # Example
//!
//! ```no_run
//! use fsprobe::target::file::TestFile;
//!
//! // 1 GiB written in 4 KiB chunks, removed when `file` goes out of scope
//! let file = TestFile::create("/mnt/test/fs_testfile.dat", 1 << 30, 4096, false)?;
//! println!("{}", file.path().display());
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::output::text::format_duration;
use crate::util::buffer::AlignedBuffer;
use crate::Result;
use anyhow::Context;
use std::fs::OpenOptions;
use std::os::unix::fs::{FileExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Buffer alignment for file creation; satisfies O_DIRECT on common devices
const CREATE_ALIGNMENT: usize = 4096;

/// Create or truncate `path` and fill it with `size` bytes of random data
///
/// Data is written in `chunk`-byte blocks. With `direct`, the file is opened
/// with `O_DIRECT`, so `chunk` must also satisfy the device's alignment.
///
/// # Errors
///
/// Fails if `chunk` is 0, `size` is not a multiple of `chunk`, or any open
/// or write fails. A write that transfers fewer than `chunk` bytes is an
/// error.
pub fn create_test_file(path: &Path, size: u64, chunk: usize, direct: bool) -> Result<()> {
    if chunk == 0 {
        anyhow::bail!("chunk size must be greater than zero");
    }
    if size % chunk as u64 != 0 {
        anyhow::bail!(
            "file size {} is not a multiple of the chunk size {}",
            size,
            chunk
        );
    }

    tracing::info!(path = %path.display(), size, "creating test file");
    let start = Instant::now();

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true).mode(0o644);
    if direct {
        options.custom_flags(libc::O_DIRECT);
    }
    let file = options
        .open(path)
        .with_context(|| format!("Failed to create test file: {}", path.display()))?;

    let mut buffer = AlignedBuffer::new(chunk, CREATE_ALIGNMENT)
        .context("Failed to allocate file creation buffer")?;

    let mut offset = 0u64;
    while offset < size {
        buffer.fill_random();
        let written = file
            .write_at(buffer.as_slice(), offset)
            .with_context(|| format!("write failed: path={}, offset={}", path.display(), offset))?;
        if written != chunk {
            anyhow::bail!(
                "short write while creating {}: {} of {} bytes at offset {}",
                path.display(),
                written,
                chunk,
                offset
            );
        }
        offset += chunk as u64;
    }

    tracing::debug!(
        path = %path.display(),
        elapsed = %format_duration(start.elapsed()),
        "test file created"
    );
    Ok(())
}

/// Remove `path` if it exists
///
/// Returns whether a file was removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "removed test file");
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove test file: {}", path.display())),
    }
}

/// A created test file, removed on drop
#[derive(Debug)]
pub struct TestFile {
    path: PathBuf,
    size: u64,
}

impl TestFile {
    /// Create and fill the file; see [`create_test_file`]
    pub fn create(path: impl Into<PathBuf>, size: u64, chunk: usize, direct: bool) -> Result<Self> {
        let path = path.into();
        create_test_file(&path, size, chunk, direct)?;
        Ok(Self { path, size })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Drop for TestFile {
    fn drop(&mut self) {
        if let Err(e) = remove_if_exists(&self.path) {
            tracing::warn!("{:#}", e);
        }
    }
}
