//! Benchmark target files
//!
//! Multi-job suites give every worker its own file, named
//! `{base}_{i}.dat`. [`create_job_files`] creates them in parallel and hands
//! back [`TestFile`] guards that delete the files when dropped.

pub mod file;

pub use file::{create_test_file, remove_if_exists, TestFile};

use crate::Result;
use rayon::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Path of job `index`'s file: `{base}_{index}.dat`
///
/// # Examples
///
/// ```
/// use fsprobe::target::job_file_path;
/// use std::path::Path;
///
/// let path = job_file_path(Path::new("/mnt/nufs/fs_testfile"), 3);
/// assert_eq!(path, Path::new("/mnt/nufs/fs_testfile_3.dat"));
/// ```
pub fn job_file_path(base: &Path, index: usize) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(format!("_{}.dat", index));
    PathBuf::from(name)
}

/// Create `count` job files of `size` bytes in parallel
///
/// Returned guards are ordered by job index. If any creation fails, files
/// already created are removed as their guards drop.
pub fn create_job_files(base: &Path, count: usize, size: u64, chunk: usize, direct: bool) -> Result<Vec<TestFile>> {
    tracing::info!(count, size, base = %base.display(), "creating job files");

    (0..count)
        .into_par_iter()
        .map(|i| TestFile::create(job_file_path(base, i), size, chunk, direct))
        .collect()
}
