//! Configuration validation
//!
//! Checks run before any file is created, so a bad setting fails fast
//! instead of after minutes of test file setup.

use super::cli::Suite;
use super::SuiteConfig;
use crate::engine::sync::direct_alignment;
use crate::engine::DEFAULT_ALIGNMENT;
use crate::suite::file::DEFAULT_IO_SIZE;
use anyhow::{Context, Result};

/// Largest accepted job count
pub const MAX_JOBS: usize = 4096;

/// Validate complete configuration for `suite`
pub fn validate_config(suite: Suite, config: &SuiteConfig) -> Result<()> {
    validate_sizes(config)?;
    validate_jobs(config)?;

    if config.repeat == Some(0) {
        anyhow::bail!("repeat must be at least 1");
    }

    match suite {
        Suite::Mmap if config.device.is_some() => {}
        _ => validate_dir(config)?,
    }

    if suite == Suite::Direct {
        validate_direct(config)?;
    }

    Ok(())
}

/// The transfer size must be a multiple of the test directory's block size
///
/// Otherwise the test file is written in full before the first transfer is
/// rejected.
pub fn validate_direct(config: &SuiteConfig) -> Result<()> {
    let io_size = config.io_size.unwrap_or(DEFAULT_IO_SIZE as u64);
    if io_size % DEFAULT_ALIGNMENT as u64 != 0 {
        anyhow::bail!(
            "direct IO requires io_size to be a multiple of {} bytes, got {}",
            DEFAULT_ALIGNMENT,
            io_size
        );
    }

    let alignment = direct_alignment(&config.dir)
        .with_context(|| format!("Failed to query block size of {}", config.dir.display()))?;
    if io_size % alignment as u64 != 0 {
        anyhow::bail!(
            "direct IO on {} requires io_size to be a multiple of its {} byte block size, got {}",
            config.dir.display(),
            alignment,
            io_size
        );
    }
    Ok(())
}

/// Validate file and transfer sizes
pub fn validate_sizes(config: &SuiteConfig) -> Result<()> {
    if config.file_size == Some(0) {
        anyhow::bail!("file_size must be greater than zero");
    }
    if config.io_size == Some(0) {
        anyhow::bail!("io_size must be greater than zero");
    }

    if let (Some(file_size), Some(io_size)) = (config.file_size, config.io_size) {
        if io_size > file_size {
            anyhow::bail!("io_size ({}) exceeds file_size ({})", io_size, file_size);
        }
        if file_size % io_size != 0 {
            anyhow::bail!(
                "file_size ({}) must be a multiple of io_size ({})",
                file_size,
                io_size
            );
        }
    }

    if let Some(sizes) = &config.io_sizes {
        if sizes.is_empty() {
            anyhow::bail!("io_sizes must not be empty");
        }
        for &size in sizes {
            if size == 0 {
                anyhow::bail!("io_sizes entries must be greater than zero");
            }
            if let Some(file_size) = config.file_size {
                if file_size % size != 0 {
                    anyhow::bail!(
                        "file_size ({}) must be a multiple of every io size, {} does not divide it",
                        file_size,
                        size
                    );
                }
            }
        }
    }

    Ok(())
}

/// Validate job counts
pub fn validate_jobs(config: &SuiteConfig) -> Result<()> {
    if config.jobs == 0 || config.jobs > MAX_JOBS {
        anyhow::bail!("jobs must be between 1 and {}, got {}", MAX_JOBS, config.jobs);
    }
    if config.jobs_max == 0 || config.jobs_max > MAX_JOBS {
        anyhow::bail!("jobs_max must be between 1 and {}, got {}", MAX_JOBS, config.jobs_max);
    }
    Ok(())
}

/// The test directory must exist
pub fn validate_dir(config: &SuiteConfig) -> Result<()> {
    if !config.dir.is_dir() {
        anyhow::bail!("test directory does not exist: {}", config.dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> SuiteConfig {
        SuiteConfig {
            dir: dir.path().to_path_buf(),
            ..SuiteConfig::default()
        }
    }

    #[test]
    fn test_default_config_valid() {
        let temp_dir = TempDir::new().unwrap();
        validate_config(Suite::Basic, &config_in(&temp_dir)).unwrap();
    }

    #[test]
    fn test_rejects_partial_block() {
        let temp_dir = TempDir::new().unwrap();
        let config = SuiteConfig {
            file_size: Some(10_000),
            io_size: Some(4096),
            ..config_in(&temp_dir)
        };
        assert!(validate_config(Suite::Basic, &config).is_err());
    }

    #[test]
    fn test_rejects_zero_values() {
        let temp_dir = TempDir::new().unwrap();
        for config in [
            SuiteConfig { file_size: Some(0), ..config_in(&temp_dir) },
            SuiteConfig { io_size: Some(0), ..config_in(&temp_dir) },
            SuiteConfig { repeat: Some(0), ..config_in(&temp_dir) },
            SuiteConfig { jobs: 0, ..config_in(&temp_dir) },
            SuiteConfig { jobs_max: 0, ..config_in(&temp_dir) },
            SuiteConfig { io_sizes: Some(vec![]), ..config_in(&temp_dir) },
        ] {
            assert!(validate_config(Suite::Sweep, &config).is_err());
        }
    }

    #[test]
    fn test_io_sizes_must_divide_file_size() {
        let temp_dir = TempDir::new().unwrap();
        let config = SuiteConfig {
            file_size: Some(1 << 20),
            io_sizes: Some(vec![1024, 3000]),
            ..config_in(&temp_dir)
        };
        assert!(validate_config(Suite::Iosize, &config).is_err());
    }

    #[test]
    fn test_direct_requires_aligned_io_size() {
        let temp_dir = TempDir::new().unwrap();
        let config = SuiteConfig {
            io_size: Some(1000),
            ..config_in(&temp_dir)
        };
        assert!(validate_config(Suite::Direct, &config).is_err());
        assert!(validate_config(Suite::Basic, &config).is_ok());
    }

    #[test]
    fn test_direct_io_size_checked_against_dir_block_size() {
        let temp_dir = TempDir::new().unwrap();
        let alignment = direct_alignment(temp_dir.path()).unwrap() as u64;

        let aligned = SuiteConfig {
            io_size: Some(alignment),
            file_size: Some(alignment * 16),
            ..config_in(&temp_dir)
        };
        assert!(validate_config(Suite::Direct, &aligned).is_ok());

        if alignment > DEFAULT_ALIGNMENT as u64 {
            let small = SuiteConfig {
                io_size: Some(DEFAULT_ALIGNMENT as u64),
                file_size: Some(alignment * 16),
                ..config_in(&temp_dir)
            };
            let err = validate_config(Suite::Direct, &small).unwrap_err();
            assert!(err.to_string().contains("block size"));
            assert!(validate_config(Suite::Basic, &small).is_ok());
        }
    }

    #[test]
    fn test_missing_dir() {
        let config = SuiteConfig {
            dir: PathBuf::from("/nonexistent/fsprobe"),
            ..SuiteConfig::default()
        };
        assert!(validate_config(Suite::Basic, &config).is_err());

        // A device-backed mmap run does not touch the directory
        let config = SuiteConfig {
            device: Some(PathBuf::from("/dev/dax0.0")),
            ..config
        };
        assert!(validate_config(Suite::Mmap, &config).is_ok());
    }
}
