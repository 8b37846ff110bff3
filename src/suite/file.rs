//! Single-file suites: basic, direct, mixed, iosize

use super::{apply_config, creation_chunk, measure, sentence_label, test_spec, SuiteResult, GIB, KIB};
use crate::config::workload::{AccessSpec, Direction, Ordering, TestType};
use crate::config::SuiteConfig;
use crate::engine::sync::FileMedium;
use crate::engine::OpenMode;
use crate::output::text::{format_bytes, print_banner};
use crate::target::TestFile;
use crate::Result;
use anyhow::Context;
use std::path::Path;

const TEST_FILE: &str = "fs_testfile.dat";
const DEFAULT_FILE_SIZE: u64 = GIB;
pub(crate) const DEFAULT_IO_SIZE: usize = 4096;

/// Write ratios measured by the mixed suite
pub const MIX_RATIOS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// IO sizes measured by the iosize suite
pub const IOSIZE_SIZES: [usize; 4] = [KIB as usize, 2 * KIB as usize, 4 * KIB as usize, 8 * KIB as usize];

/// Buffered seq/rand read/write over one file, 10 passes each
pub fn basic(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    four_patterns(config, false, config.repeat_or(10))
}

/// Same as `basic` with `O_DIRECT`, one pass each
pub fn direct(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    four_patterns(config, true, config.repeat_or(1))
}

fn four_patterns(config: &SuiteConfig, direct: bool, repeat: u32) -> Result<Vec<SuiteResult>> {
    let size = config.file_size_or(DEFAULT_FILE_SIZE);
    let io_size = config.io_size_or(DEFAULT_IO_SIZE);

    println!("Creating test file of size {} bytes...", size);
    let file = TestFile::create(config.path(TEST_FILE), size, io_size, direct)?;

    TestType::ALL
        .iter()
        .map(|&test| -> Result<SuiteResult> {
            let m = run_file_test(config, file.path(), test, size, io_size, repeat, direct)?;
            let result = SuiteResult::from_measurement(sentence_label(test), Some(test), io_size, &m);
            result.report();
            Ok(result)
        })
        .collect()
}

/// Random offsets, each transfer a write with probability `ratio`
pub fn mixed(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    let size = config.file_size_or(DEFAULT_FILE_SIZE);
    let io_size = config.io_size_or(DEFAULT_IO_SIZE);
    let repeat = config.repeat_or(10);

    println!("Creating test file of size {} bytes...", size);
    let file = TestFile::create(config.path(TEST_FILE), size, io_size, false)?;

    let mut results = Vec::with_capacity(MIX_RATIOS.len());
    for write_ratio in MIX_RATIOS {
        let spec = AccessSpec::new(size, io_size, Direction::Mixed { write_ratio }, Ordering::Random, repeat)?;
        let spec = apply_config(config, spec);

        let medium = FileMedium::open(file.path(), OpenMode::ReadWrite, false)
            .with_context(|| format!("Failed to open {}", file.path().display()))?;
        let m = measure(medium, spec)?;

        let label = format!("Read/Write mix ratio {:.2}/{:.2}", 1.0 - write_ratio, write_ratio);
        let result = SuiteResult::from_measurement(label, None, io_size, &m);
        result.report();
        results.push(result);
    }

    println!("Test finished. Cleaning up...");
    Ok(results)
}

/// Four patterns at each IO size over one buffered file
pub fn iosize(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    let size = config.file_size_or(DEFAULT_FILE_SIZE);
    let sizes = config.io_sizes_or(&IOSIZE_SIZES);
    let repeat = config.repeat_or(10);
    let path = config.path(TEST_FILE);

    println!("Starting performance tests on file: {}", path.display());
    let chunk = creation_chunk(size, sizes.iter().copied().min().unwrap_or(DEFAULT_IO_SIZE));
    let file = TestFile::create(path, size, chunk, false)?;

    let mut results = Vec::with_capacity(sizes.len() * TestType::ALL.len());
    for io_size in sizes {
        print_banner(&format!("IO size: {} ({})", io_size, format_bytes(io_size as u64)));
        for test in TestType::ALL {
            let m = run_file_test(config, file.path(), test, size, io_size, repeat, false)?;
            let label = format!("IO size {} {}", io_size, sentence_label(test));
            let result = SuiteResult::from_measurement(label, Some(test), io_size, &m);
            result.report();
            results.push(result);
        }
    }

    println!("Performance tests completed.");
    Ok(results)
}

/// Open `path` for `test` and run one access loop over it
pub(crate) fn run_file_test(
    config: &SuiteConfig,
    path: &Path,
    test: TestType,
    length: u64,
    io_size: usize,
    repeat: u32,
    direct: bool,
) -> Result<crate::stats::Measurement> {
    let mode = if test.is_write() {
        OpenMode::WriteOnly
    } else {
        OpenMode::ReadOnly
    };
    let medium = FileMedium::open(path, mode, direct)
        .with_context(|| format!("Failed to open {} for {}", path.display(), test))?;
    let spec = test_spec(config, test, length, io_size, repeat)?;
    measure(medium, spec).with_context(|| format!("{} on {}", test, path.display()))
}
