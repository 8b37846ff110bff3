//! Memory suites: mapped device or file, then anonymous memory
//!
//! The mapped half measures in-place `memcpy` to and from a shared mapping,
//! typically of a DAX device. The anonymous half runs the same four patterns
//! over heap regions, first cold (every page faulted inside the loop) and
//! then hot (pre-touched).

use super::{creation_chunk, measure, test_spec, SuiteResult, GIB};
use crate::config::workload::TestType;
use crate::config::SuiteConfig;
use crate::engine::heap::HeapMedium;
use crate::engine::mmap::MappedMedium;
use crate::engine::OpenMode;
use crate::output::text::{format_bytes, print_banner};
use crate::target::TestFile;
use crate::Result;
use anyhow::Context;
use std::path::Path;

const MAP_FILE: &str = "fs_mmap.dat";
/// Length mapped from a device when no size is given
const DEFAULT_DEVICE_LENGTH: u64 = 3 * GIB;
const DEFAULT_FILE_LENGTH: u64 = GIB;
const DEFAULT_IO_SIZE: usize = 4096;

/// Mapped seq/rand read/write, then heap cold and hot
pub fn mmap(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    let io_size = config.io_size_or(DEFAULT_IO_SIZE);
    let repeat = config.repeat_or(1);

    let mut results = Vec::with_capacity(12);

    // The guard keeps a created file alive until the mapped tests finish
    let (length, _file) = match &config.device {
        Some(device) => {
            let length = config.file_size_or(DEFAULT_DEVICE_LENGTH);
            print_banner(&format!("Mapping {} of {}", format_bytes(length), device.display()));
            results.extend(mapped_tests(config, device, length, io_size, repeat)?);
            (length, None)
        }
        None => {
            let length = config.file_size_or(DEFAULT_FILE_LENGTH);
            let file = TestFile::create(config.path(MAP_FILE), length, creation_chunk(length, io_size), false)?;
            print_banner(&format!("Mapping {} of {}", format_bytes(length), file.path().display()));
            results.extend(mapped_tests(config, file.path(), length, io_size, repeat)?);
            (length, Some(file))
        }
    };

    let heap_len = usize::try_from(length).context("memory test length exceeds the address space")?;
    for hot in [false, true] {
        print_banner(if hot {
            "Anonymous memory, pre-touched"
        } else {
            "Anonymous memory, each page first touched inside the loop"
        });
        for test in TestType::ALL {
            let medium = if hot {
                HeapMedium::hot(heap_len)?
            } else {
                HeapMedium::new(heap_len)?
            };
            let m = measure(medium, test_spec(config, test, length, io_size, repeat)?)?;
            let label = format!("Anonymous {} ({})", heap_label(test), if hot { "hot" } else { "cold" });
            let result = SuiteResult::from_measurement(label, Some(test), io_size, &m);
            result.report();
            results.push(result);
        }
    }

    Ok(results)
}

fn mapped_tests(config: &SuiteConfig, path: &Path, length: u64, io_size: usize, repeat: u32) -> Result<Vec<SuiteResult>> {
    TestType::ALL
        .iter()
        .map(|&test| -> Result<SuiteResult> {
            let mode = if test.is_write() {
                OpenMode::ReadWrite
            } else {
                OpenMode::ReadOnly
            };
            let medium = MappedMedium::open(path, mode, Some(length))
                .with_context(|| format!("Failed to map {}", path.display()))?;
            let m = measure(medium, test_spec(config, test, length, io_size, repeat)?)?;

            let result = SuiteResult::from_measurement(mapped_label(test), Some(test), io_size, &m);
            result.report();
            Ok(result)
        })
        .collect()
}

fn mapped_label(test: TestType) -> &'static str {
    match test {
        TestType::SeqRead => "Seq Mmap Read",
        TestType::SeqWrite => "Seq Mmap Write",
        TestType::RandRead => "Rand Mmap Read",
        TestType::RandWrite => "Rand Mmap Write",
    }
}

fn heap_label(test: TestType) -> &'static str {
    match test {
        TestType::SeqRead => "seq read",
        TestType::SeqWrite => "seq write",
        TestType::RandRead => "rand read",
        TestType::RandWrite => "rand write",
    }
}
