//! io_uring suite
//!
//! First a round trip: a greeting written at offset 0 through the ring must
//! come back unchanged. Then the four patterns over a test file with every
//! transfer going through the ring at queue depth 1.

use super::{creation_chunk, measure, test_spec, SuiteResult, MIB};
use crate::config::workload::TestType;
use crate::config::SuiteConfig;
use crate::engine::io_uring::{smoke_test, UringMedium};
use crate::engine::OpenMode;
use crate::target::{remove_if_exists, TestFile};
use crate::Result;
use anyhow::Context;

const SMOKE_FILE: &str = "test.txt";
const TEST_FILE: &str = "fs_uring.dat";
const DEFAULT_FILE_SIZE: u64 = 256 * MIB;
const DEFAULT_IO_SIZE: usize = 4096;

pub fn uring(config: &SuiteConfig) -> Result<Vec<SuiteResult>> {
    let smoke_path = config.path(SMOKE_FILE);
    remove_if_exists(&smoke_path)?;
    let echoed = smoke_test(&smoke_path).context("io_uring round trip failed")?;
    print!("Read: {}", String::from_utf8_lossy(&echoed));
    remove_if_exists(&smoke_path)?;

    let size = config.file_size_or(DEFAULT_FILE_SIZE);
    let io_size = config.io_size_or(DEFAULT_IO_SIZE);
    let repeat = config.repeat_or(1);
    let file = TestFile::create(config.path(TEST_FILE), size, creation_chunk(size, io_size), false)?;

    TestType::ALL
        .iter()
        .map(|&test| -> Result<SuiteResult> {
            let mode = if test.is_write() {
                OpenMode::WriteOnly
            } else {
                OpenMode::ReadOnly
            };
            let medium = UringMedium::open(file.path(), mode, false)
                .with_context(|| format!("Failed to open {} with io_uring", file.path().display()))?;
            let m = measure(medium, test_spec(config, test, size, io_size, repeat)?)?;

            let label = format!("io_uring {}", test.to_string().to_lowercase());
            let result = SuiteResult::from_measurement(label, Some(test), io_size, &m);
            result.report();
            Ok(result)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suite::KIB;
    use tempfile::TempDir;

    #[test]
    fn test_uring_suite() {
        if ::io_uring::IoUring::new(8).is_err() {
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let config = SuiteConfig {
            dir: temp_dir.path().to_path_buf(),
            file_size: Some(64 * KIB),
            ..SuiteConfig::default()
        };

        let results = uring(&config).unwrap();
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].label, "io_uring sequential read");
        assert!(results.iter().all(|r| r.bytes == 64 * KIB));
        assert!(!temp_dir.path().join(SMOKE_FILE).exists());
    }
}
