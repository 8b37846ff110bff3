//! TOML configuration file parsing

use super::cli::Cli;
use super::cli_convert::{parse_size, parse_time_us};
use super::workload::ThinkTimeMode;
use super::SuiteConfig;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<SuiteConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<SuiteConfig> {
    let config: SuiteConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Merge CLI arguments with TOML configuration (CLI takes precedence)
pub fn merge_cli_with_config(cli: &Cli, mut config: SuiteConfig) -> Result<SuiteConfig> {
    if let Some(dir) = &cli.dir {
        config.dir = dir.clone();
    }
    if let Some(size) = &cli.file_size {
        config.file_size = Some(parse_size(size).context("Invalid --file-size")?);
    }
    if let Some(size) = &cli.io_size {
        config.io_size = Some(parse_size(size).context("Invalid --io-size")?);
    }
    if let Some(repeat) = cli.repeat {
        config.repeat = Some(repeat);
    }
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
    if let Some(jobs_max) = cli.jobs_max {
        config.jobs_max = jobs_max;
    }
    if let Some(csv) = &cli.csv {
        config.csv = csv.clone();
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(device) = &cli.device {
        config.device = Some(device.clone());
    }
    if let Some(think) = &cli.think_time {
        config.think_time_us = Some(parse_time_us(think).context("Invalid --think-time")?);
    }
    if cli.spin {
        config.think_mode = ThinkTimeMode::Spin;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_parse_toml_string() {
        let config = parse_toml_string(
            r#"
            dir = "/mnt/nufs"
            file_size = "256M"
            io_size = 4096
            io_sizes = ["1k", "2k", 4096]
            repeat = 5
            jobs_max = 16
            csv = "sweep.csv"
            seed = 7
            think_time_us = 100
            think_mode = "Spin"
            "#,
        )
        .unwrap();

        assert_eq!(config.dir, PathBuf::from("/mnt/nufs"));
        assert_eq!(config.file_size, Some(256 * 1024 * 1024));
        assert_eq!(config.io_size, Some(4096));
        assert_eq!(config.io_sizes, Some(vec![1024, 2048, 4096]));
        assert_eq!(config.repeat, Some(5));
        assert_eq!(config.jobs, 4);
        assert_eq!(config.jobs_max, 16);
        assert_eq!(config.csv, PathBuf::from("sweep.csv"));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.think_mode, ThinkTimeMode::Spin);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = parse_toml_string("").unwrap();
        assert_eq!(config, SuiteConfig::default());
    }

    #[test]
    fn test_bad_size_string_rejected() {
        assert!(parse_toml_string("file_size = \"lots\"").is_err());
    }

    #[test]
    fn test_unknown_file_reports_path() {
        let err = parse_toml_file(Path::new("/nonexistent/fsprobe.toml")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/fsprobe.toml"));
    }

    #[test]
    fn test_cli_overrides_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("suite.toml");
        std::fs::write(&path, "file_size = \"1G\"\nrepeat = 3\njobs = 2\n").unwrap();

        let cli = Cli::try_parse_from([
            "fsprobe",
            "threads",
            "--config",
            path.to_str().unwrap(),
            "--file-size",
            "64M",
            "--think-time",
            "1ms",
        ])
        .unwrap();

        let config = crate::config::load(&cli).unwrap();
        assert_eq!(config.file_size, Some(64 * 1024 * 1024));
        assert_eq!(config.repeat, Some(3));
        assert_eq!(config.jobs, 2);
        assert_eq!(config.think_time_us, Some(1000));
        assert_eq!(config.think_mode, ThinkTimeMode::Sleep);
    }

    #[test]
    fn test_invalid_cli_size() {
        let cli = Cli::try_parse_from(["fsprobe", "basic", "--io-size", "4q"]).unwrap();
        assert!(merge_cli_with_config(&cli, SuiteConfig::default()).is_err());
    }
}
