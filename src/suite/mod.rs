//! Benchmark suites
//!
//! A suite sets up its test files, runs a fixed series of access loops, prints
//! one throughput line per loop to stdout, and cleans up. Every suite returns
//! its results so callers (and tests) can inspect them.
//!
//! | Suite     | Medium                  | Jobs          | Patterns                    |
//! |-----------|-------------------------|---------------|-----------------------------|
//! | `basic`   | buffered file           | 1             | four test types, repeat 10  |
//! | `direct`  | `O_DIRECT` file         | 1             | four test types, repeat 1   |
//! | `mixed`   | buffered file           | 1             | random, five write ratios   |
//! | `iosize`  | buffered file           | 1             | four test types per size    |
//! | `threads` | buffered per-job files  | `jobs`        | four test types             |
//! | `sweep`   | buffered per-job files  | 1..`jobs_max` | four test types per size    |
//! | `mmap`    | mapping, then heap      | 1             | four test types, cold/hot   |
//! | `uring`   | io_uring file           | 1             | round trip, four test types |

pub mod file;
pub mod jobs;
pub mod memory;
#[cfg(feature = "io_uring")]
pub mod uring;

use crate::config::cli::Suite;
use crate::config::workload::{AccessSpec, TestType};
use crate::config::SuiteConfig;
use crate::engine::Medium;
use crate::output::text::{self, throughput_line};
use crate::stats::{Measurement, PoolMeasurement};
use crate::worker::AccessPattern;
use crate::Result;
use anyhow::Context;

pub const KIB: u64 = 1024;
pub const MIB: u64 = 1024 * KIB;
pub const GIB: u64 = 1024 * MIB;

/// Chunk size used to fill large test files
pub const CREATE_CHUNK: usize = 4 * MIB as usize;

/// One printed measurement
#[derive(Debug, Clone, PartialEq)]
pub struct SuiteResult {
    /// Text before "throughput:" in the output line
    pub label: String,
    pub test_type: Option<TestType>,
    pub jobs: usize,
    pub io_size: usize,
    pub bytes: u64,
    pub elapsed_ns: u64,
    pub throughput_mb_s: f64,
}

impl SuiteResult {
    pub fn from_measurement(label: impl Into<String>, test_type: Option<TestType>, io_size: usize, m: &Measurement) -> Self {
        Self {
            label: label.into(),
            test_type,
            jobs: 1,
            io_size,
            bytes: m.bytes,
            elapsed_ns: m.elapsed_ns,
            throughput_mb_s: m.throughput_mb_s(),
        }
    }

    pub fn from_pool(label: impl Into<String>, test_type: TestType, io_size: usize, m: &PoolMeasurement) -> Self {
        Self {
            label: label.into(),
            test_type: Some(test_type),
            jobs: m.job_count(),
            io_size,
            bytes: m.total_bytes(),
            elapsed_ns: m.elapsed_ns,
            throughput_mb_s: m.throughput_mb_s(),
        }
    }

    pub fn run_time_s(&self) -> f64 {
        self.elapsed_ns as f64 / 1e9
    }

    pub fn line(&self) -> String {
        throughput_line(&self.label, self.throughput_mb_s)
    }

    /// Print the throughput line to stdout
    pub fn report(&self) {
        text::report(&self.label, self.throughput_mb_s);
    }
}

/// Run `suite` with `config`
pub fn run(suite: Suite, config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    tracing::info!(%suite, dir = %config.dir.display(), "starting suite");

    let results = match suite {
        Suite::Basic => file::basic(config),
        Suite::Direct => file::direct(config),
        Suite::Mixed => file::mixed(config),
        Suite::Iosize => file::iosize(config),
        Suite::Threads => jobs::threads(config),
        Suite::Sweep => jobs::sweep(config),
        Suite::Mmap => memory::mmap(config),
        Suite::Uring => run_uring(config),
    }
    .with_context(|| format!("{} suite failed", suite))?;

    tracing::info!(%suite, measurements = results.len(), "suite finished");
    Ok(results)
}

#[cfg(feature = "io_uring")]
fn run_uring(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    uring::uring(config)
}

#[cfg(not(feature = "io_uring"))]
fn run_uring(_config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    anyhow::bail!("fsprobe was built without the io_uring feature")
}

/// Spec for one of the fixed test types, with the config's seed and think time
pub(crate) fn test_spec(config: &SuiteConfig, test: TestType, length: u64, unit: usize, repeat: u32) -> Result<AccessSpec> {
    let spec = AccessSpec::for_test(test, length, unit, repeat)?;
    Ok(apply_config(config, spec))
}

pub(crate) fn apply_config(config: &SuiteConfig, mut spec: AccessSpec) -> AccessSpec {
    if let Some(seed) = config.seed {
        spec = spec.with_seed(seed);
    }
    if let Some(think_time) = config.think_time() {
        spec = spec.with_think_time(think_time);
    }
    spec
}

/// Build and run a single access loop
pub(crate) fn measure<M: Medium>(medium: M, spec: AccessSpec) -> Result<Measurement> {
    let mut pattern = AccessPattern::new(medium, spec)?;
    Ok(pattern.run()?)
}

/// "Sequential read" style label used by the single-file suites
pub(crate) fn sentence_label(test: TestType) -> &'static str {
    match test {
        TestType::SeqRead => "Sequential read",
        TestType::SeqWrite => "Sequential write",
        TestType::RandRead => "Random read",
        TestType::RandWrite => "Random write",
    }
}

/// Size of the chunks used to fill a file of `size` bytes
///
/// Large chunks when they divide the file, otherwise `fallback`.
pub(crate) fn creation_chunk(size: u64, fallback: usize) -> usize {
    if size >= CREATE_CHUNK as u64 && size % CREATE_CHUNK as u64 == 0 {
        CREATE_CHUNK
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_result_line() {
        let m = Measurement {
            elapsed_ns: 2_000_000_000,
            bytes: 512 * MIB,
            transfers: 131_072,
            bytes_read: 512 * MIB,
            bytes_written: 0,
        };
        let result = SuiteResult::from_measurement("Sequential read", Some(TestType::SeqRead), 4096, &m);
        assert_eq!(result.line(), "Sequential read throughput: 256.00 MB/s");
        assert_eq!(result.run_time_s(), 2.0);
        assert_eq!(result.jobs, 1);
    }

    #[test]
    fn test_creation_chunk() {
        assert_eq!(creation_chunk(256 * MIB, 4096), CREATE_CHUNK);
        assert_eq!(creation_chunk(MIB, 4096), 4096);
        assert_eq!(creation_chunk(6 * MIB, 8192), 8192);
    }

    #[test]
    fn test_apply_config_sets_seed_and_think_time() {
        let config = SuiteConfig {
            seed: Some(9),
            think_time_us: Some(5),
            ..SuiteConfig::default()
        };
        let spec = test_spec(&config, TestType::RandRead, 8192, 4096, 1).unwrap();
        assert_eq!(spec.seed(), Some(9));
        assert!(spec.think_time().is_some());
    }
}
