//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Every suite reads its settings from one [`SuiteConfig`]; fields left unset
//! fall back to the suite's own defaults.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use cli::Cli;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use workload::{ThinkTime, ThinkTimeMode};

/// Settings shared by all suites
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuiteConfig {
    /// Directory holding the test files
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Bytes per test file; accepts "256M" style strings in TOML
    #[serde(default, deserialize_with = "deserialize_opt_size")]
    pub file_size: Option<u64>,
    /// Transfer size for single-size suites
    #[serde(default, deserialize_with = "deserialize_opt_size")]
    pub io_size: Option<u64>,
    /// Transfer sizes for the sweep and iosize suites
    #[serde(default, deserialize_with = "deserialize_opt_size_list")]
    pub io_sizes: Option<Vec<u64>>,
    /// Passes per measurement
    #[serde(default)]
    pub repeat: Option<u32>,
    /// Job count for the threads suite
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Largest job count for the sweep suite
    #[serde(default = "default_jobs_max")]
    pub jobs_max: usize,
    /// Sweep CSV log
    #[serde(default = "default_csv")]
    pub csv: PathBuf,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Device mapped by the mmap suite instead of a test file
    #[serde(default)]
    pub device: Option<PathBuf>,
    /// Per-transfer delay in microseconds
    #[serde(default)]
    pub think_time_us: Option<u64>,
    #[serde(default = "default_think_mode")]
    pub think_mode: ThinkTimeMode,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_jobs() -> usize {
    4
}

fn default_jobs_max() -> usize {
    64
}

fn default_csv() -> PathBuf {
    PathBuf::from("performance_log.csv")
}

fn default_think_mode() -> ThinkTimeMode {
    ThinkTimeMode::Sleep
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            file_size: None,
            io_size: None,
            io_sizes: None,
            repeat: None,
            jobs: default_jobs(),
            jobs_max: default_jobs_max(),
            csv: default_csv(),
            seed: None,
            device: None,
            think_time_us: None,
            think_mode: default_think_mode(),
        }
    }
}

impl SuiteConfig {
    /// `name` inside the test directory
    pub fn path(&self, name: impl AsRef<Path>) -> PathBuf {
        self.dir.join(name)
    }

    pub fn file_size_or(&self, default: u64) -> u64 {
        self.file_size.unwrap_or(default)
    }

    pub fn io_size_or(&self, default: usize) -> usize {
        self.io_size.map(|s| s as usize).unwrap_or(default)
    }

    pub fn io_sizes_or(&self, default: &[usize]) -> Vec<usize> {
        match &self.io_sizes {
            Some(sizes) => sizes.iter().map(|&s| s as usize).collect(),
            None => default.to_vec(),
        }
    }

    pub fn repeat_or(&self, default: u32) -> u32 {
        self.repeat.unwrap_or(default)
    }

    pub fn think_time(&self) -> Option<ThinkTime> {
        self.think_time_us.map(|us| ThinkTime {
            duration: Duration::from_micros(us),
            mode: self.think_mode,
        })
    }
}

/// Build the effective configuration: TOML file (if any), then CLI overrides
pub fn load(cli: &Cli) -> anyhow::Result<SuiteConfig> {
    let base = match &cli.config {
        Some(path) => toml::parse_toml_file(path)?,
        None => SuiteConfig::default(),
    };
    toml::merge_cli_with_config(cli, base)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Bytes(u64),
    Text(String),
}

impl SizeValue {
    fn into_bytes<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            SizeValue::Bytes(n) => Ok(n),
            SizeValue::Text(s) => cli_convert::parse_size(&s).map_err(|e| E::custom(format!("{:#}", e))),
        }
    }
}

fn deserialize_opt_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<SizeValue>::deserialize(deserializer)?
        .map(SizeValue::into_bytes)
        .transpose()
}

fn deserialize_opt_size_list<'de, D>(deserializer: D) -> Result<Option<Vec<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<SizeValue>>::deserialize(deserializer)?
        .map(|values| values.into_iter().map(SizeValue::into_bytes).collect::<Result<Vec<u64>, D::Error>>())
        .transpose()
}
