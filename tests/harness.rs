//! End-to-end checks through the public API

use fsprobe::config::cli::{Cli, Suite};
use fsprobe::config::workload::{AccessSpec, Direction, Ordering, TestType, ThinkTime, ThinkTimeMode};
use fsprobe::config::{self, validator, SuiteConfig};
use fsprobe::distribution::shuffle::IndexShuffle;
use fsprobe::engine::heap::HeapMedium;
use fsprobe::engine::sync::FileMedium;
use fsprobe::engine::OpenMode;
use fsprobe::output::text::throughput_mb_s;
use fsprobe::suite;
use fsprobe::target::{create_test_file, TestFile};
use fsprobe::worker::pool::WorkerPool;
use fsprobe::{AccessPattern, BenchError};
use clap::Parser;
use std::time::Duration;
use tempfile::TempDir;

const UNIT: usize = 4096;

#[test]
fn write_then_read_returns_written_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("rt.dat");
    create_test_file(&path, (UNIT * 4) as u64, UNIT, false).unwrap();

    for ordering in [Ordering::Sequential, Ordering::Random] {
        let spec = AccessSpec::new((UNIT * 4) as u64, UNIT, Direction::Write, ordering, 1)
            .unwrap()
            .with_seed(21);
        let medium = FileMedium::open(&path, OpenMode::WriteOnly, false).unwrap();
        let mut writer = AccessPattern::new(medium, spec.clone()).unwrap();
        let block = writer.buffer().to_vec();
        assert_eq!(writer.run().unwrap().bytes, 16384);
        drop(writer);

        let spec = AccessSpec::new((UNIT * 4) as u64, UNIT, Direction::Read, ordering, 1)
            .unwrap()
            .with_seed(21);
        let medium = FileMedium::open(&path, OpenMode::ReadOnly, false).unwrap();
        let mut reader = AccessPattern::new(medium, spec).unwrap();
        let mut mismatches = 0;
        reader
            .run_inspect(|_, data| {
                if data != block.as_slice() {
                    mismatches += 1;
                }
            })
            .unwrap();
        assert_eq!(mismatches, 0);

        let expected: Vec<u8> = block.iter().copied().cycle().take(UNIT * 4).collect();
        assert_eq!(std::fs::read(&path).unwrap(), expected);
    }
}

#[test]
fn pool_of_four_moves_four_lengths() {
    let length = (UNIT * 64) as u64;
    let spec = AccessSpec::new(length, UNIT, Direction::Read, Ordering::Random, 1).unwrap();
    let media = (0..4).map(|_| HeapMedium::hot(UNIT * 64).unwrap()).collect();

    let m = WorkerPool::from_media(media, &spec).unwrap().run().unwrap();
    assert_eq!(m.total_bytes(), 4 * length);
    assert_eq!(m.job_count(), 4);
}

#[test]
fn shuffle_is_permutation_for_all_small_n() {
    let mut shuffle = IndexShuffle::with_seed(1234);
    for n in 1..200usize {
        let mut v = shuffle.shuffle(n);
        v.sort_unstable();
        assert_eq!(v, (0..n as u64).collect::<Vec<_>>());
    }
}

#[test]
fn think_time_never_increases_throughput() {
    let spec = AccessSpec::new((UNIT * 4) as u64, UNIT, Direction::Write, Ordering::Sequential, 1).unwrap();
    let base = AccessPattern::new(HeapMedium::hot(UNIT * 4).unwrap(), spec.clone())
        .unwrap()
        .run()
        .unwrap();

    let delayed = AccessPattern::new(
        HeapMedium::hot(UNIT * 4).unwrap(),
        spec.with_think_time(ThinkTime {
            duration: Duration::from_millis(1),
            mode: ThinkTimeMode::Sleep,
        }),
    )
    .unwrap()
    .run()
    .unwrap();

    assert!(base.throughput_mb_s() > 0.0);
    assert!(delayed.throughput_mb_s() <= base.throughput_mb_s());
    assert_eq!(
        delayed.throughput_mb_s(),
        throughput_mb_s(delayed.bytes, delayed.elapsed_ns)
    );
}

#[test]
fn unaligned_length_rejected() {
    let result = AccessSpec::new(10_000, UNIT, Direction::Read, Ordering::Sequential, 1);
    assert!(matches!(result, Err(BenchError::Config(_))));
}

#[test]
fn basic_suite_from_cli_arguments() {
    let temp_dir = TempDir::new().unwrap();
    let dir = temp_dir.path().to_str().unwrap();

    let cli = Cli::try_parse_from([
        "fsprobe",
        "basic",
        "--dir",
        dir,
        "--file-size",
        "128k",
        "--repeat",
        "2",
        "--seed",
        "8",
    ])
    .unwrap();
    cli.validate().unwrap();

    let config = config::load(&cli).unwrap();
    validator::validate_config(cli.suite, &config).unwrap();

    let results = suite::run(cli.suite, &config).unwrap();
    assert_eq!(results.len(), 4);
    let types: Vec<TestType> = results.iter().filter_map(|r| r.test_type).collect();
    assert_eq!(types, TestType::ALL);
    assert!(results.iter().all(|r| r.bytes == 2 * 128 * 1024));
}

#[test]
fn suite_error_names_the_failing_operation() {
    let temp_dir = TempDir::new().unwrap();
    let config = SuiteConfig {
        dir: temp_dir.path().join("missing"),
        file_size: Some(64 * 1024),
        ..SuiteConfig::default()
    };

    let err = suite::run(Suite::Mixed, &config).unwrap_err();
    let chain = format!("{:#}", err);
    assert!(chain.contains("mixed suite failed"));
    assert!(chain.contains("Failed to create test file"));
}

#[test]
fn test_file_guard_cleans_up() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("guard.dat");
    {
        let file = TestFile::create(&path, 8192, 4096, false).unwrap();
        assert_eq!(std::fs::metadata(file.path()).unwrap().len(), 8192);
    }
    assert!(!path.exists());
}
