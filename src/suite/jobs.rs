//! Multi-job suites: threads and sweep
//!
//! Each job owns one file, `{dir}/fs_testfile_{i}.dat`, and runs the same
//! access spec on its own thread. Files are created once, up front, and
//! reused for every measurement.

use super::{creation_chunk, test_spec, SuiteResult, KIB, MIB};
use crate::config::workload::TestType;
use crate::config::SuiteConfig;
use crate::engine::sync::FileMedium;
use crate::engine::OpenMode;
use crate::output::csv::{CsvLog, CsvRow};
use crate::output::text::print_banner;
use crate::target::{create_job_files, TestFile};
use crate::worker::pool::WorkerPool;
use crate::Result;
use anyhow::Context;

const FILE_BASE: &str = "fs_testfile";
const DEFAULT_FILE_SIZE: u64 = 256 * MIB;

/// IO sizes measured by the sweep suite
pub const SWEEP_IO_SIZES: [usize; 5] = [
    KIB as usize,
    2 * KIB as usize,
    4 * KIB as usize,
    8 * KIB as usize,
    2 * MIB as usize,
];

/// Job counts 1, 2, 4, ... up to and including `max` when it is a power of two
pub fn job_counts(max: usize) -> Vec<usize> {
    std::iter::successors(Some(1usize), |&n| n.checked_mul(2))
        .take_while(|&n| n <= max)
        .collect()
}

/// `jobs` workers, one IO size, four patterns
pub fn threads(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    let size = config.file_size_or(DEFAULT_FILE_SIZE);
    let io_size = config.io_size_or(4 * KIB as usize);
    let repeat = config.repeat_or(10);
    let jobs = config.jobs;

    let files = create_job_files(&config.path(FILE_BASE), jobs, size, creation_chunk(size, io_size), false)?;
    let names: Vec<String> = files.iter().map(|f| f.path().display().to_string()).collect();
    println!("test files: {}", names.join(" "));

    println!("=======Start test=======");
    let mut results = Vec::with_capacity(TestType::ALL.len());
    for test in TestType::ALL {
        let result = run_jobs(config, &files[..jobs], test, size, io_size, repeat)?;
        result.report();
        results.push(result);
    }
    println!("=======Test finished=======");

    Ok(results)
}

/// Job count x IO size sweep, every measurement appended to the CSV log
pub fn sweep(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    let size = config.file_size_or(DEFAULT_FILE_SIZE);
    let io_sizes = config.io_sizes_or(&SWEEP_IO_SIZES);
    let repeat = config.repeat_or(5);
    let jobs_max = config.jobs_max;
    let counts = job_counts(jobs_max);

    let mut log = CsvLog::create(&config.csv)?;

    print_banner(&format!(
        "Starting performance tests on files with max {} threads...\nIO sizes to test: {}",
        jobs_max,
        io_sizes.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" ")
    ));

    let fallback_chunk = io_sizes.iter().copied().min().unwrap_or(4 * KIB as usize);
    let files = create_job_files(&config.path(FILE_BASE), jobs_max, size, creation_chunk(size, fallback_chunk), false)?;

    println!("=======Start test=======");
    let mut results = Vec::with_capacity(counts.len() * io_sizes.len() * TestType::ALL.len());
    for &jobs in &counts {
        println!("\n====== Testing with {} threads ======", jobs);
        for &io_size in &io_sizes {
            println!("\n--- Testing with IO size: {} bytes, {} threads ---", io_size, jobs);
            for test in TestType::ALL {
                let result = run_jobs(config, &files[..jobs], test, size, io_size, repeat)?;
                println!("{}", result.line());

                log.append(&CsvRow {
                    file_size: size,
                    io_size,
                    thread_count: jobs,
                    test_type: test,
                    run_time_s: result.run_time_s(),
                    throughput_mb_s: result.throughput_mb_s,
                })?;
                results.push(result);
            }
        }
    }
    println!("=======Test finished=======");

    tracing::info!(rows = log.rows(), path = %log.path().display(), "CSV log written");
    Ok(results)
}

/// Run `test` on every file in `files` concurrently
fn run_jobs(
    config: &SuiteConfig,
    files: &[TestFile],
    test: TestType,
    length: u64,
    io_size: usize,
    repeat: u32,
) -> Result<SuiteResult> {
    let mode = if test.is_write() {
        OpenMode::WriteOnly
    } else {
        OpenMode::ReadOnly
    };

    let media = files
        .iter()
        .map(|f| {
            FileMedium::open(f.path(), mode, false)
                .with_context(|| format!("Failed to open {} for {}", f.path().display(), test))
        })
        .collect::<Result<Vec<_>>>()?;

    let spec = test_spec(config, test, length, io_size, repeat)?;
    let m = WorkerPool::from_media(media, &spec)?
        .run()
        .with_context(|| format!("{} with {} jobs, IO size {}", test, files.len(), io_size))?;

    let label = format!(
        "IO Size {} , {} jobs, test type: {},",
        io_size,
        files.len(),
        test
    );
    Ok(SuiteResult::from_pool(label, test, io_size, &m))
}
