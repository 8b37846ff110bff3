//! CLI argument parsing using clap

use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

/// Benchmark suite to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Suite {
    /// Buffered read/write on one file, four patterns
    Basic,
    /// O_DIRECT read/write on one file, four patterns
    Direct,
    /// Random offsets with a per-transfer read/write mix
    Mixed,
    /// Job count x IO size sweep over per-job files, logged to CSV
    Sweep,
    /// Fixed job count and IO size over per-job files
    Threads,
    /// IO size sweep on one buffered file
    Iosize,
    /// Mapped device or file, then anonymous memory cold and hot
    Mmap,
    /// io_uring round trip and throughput
    Uring,
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suite::Basic => "basic",
            Suite::Direct => "direct",
            Suite::Mixed => "mixed",
            Suite::Sweep => "sweep",
            Suite::Threads => "threads",
            Suite::Iosize => "iosize",
            Suite::Mmap => "mmap",
            Suite::Uring => "uring",
        };
        write!(f, "{}", name)
    }
}

/// fsprobe - storage IO throughput microbenchmarks
#[derive(Parser, Debug)]
#[command(name = "fsprobe")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suite to run
    #[arg(value_enum)]
    pub suite: Suite,

    /// TOML file with suite settings; command-line values override it
    #[arg(short = 'c', long, env = "FSPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory for test files
    #[arg(short = 'D', long)]
    pub dir: Option<PathBuf>,

    /// Size of each test file (e.g., 1G, 256M)
    #[arg(short = 's', long)]
    pub file_size: Option<String>,

    /// Transfer size for single-size suites (e.g., 4k, 2M)
    #[arg(short = 'b', long)]
    pub io_size: Option<String>,

    /// Passes over the file per measurement
    #[arg(short = 'n', long)]
    pub repeat: Option<u32>,

    /// Job count for the threads suite
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Largest job count for the sweep suite
    #[arg(long)]
    pub jobs_max: Option<usize>,

    /// CSV log path for the sweep suite
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Seed for offsets and read/write selection (default: clock)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Device to map for the mmap suite (e.g., /dev/dax0.0)
    #[arg(long)]
    pub device: Option<PathBuf>,

    /// Delay after every transfer (e.g., 100us, 1ms)
    #[arg(long)]
    pub think_time: Option<String>,

    /// Busy-wait for the think time instead of sleeping
    #[arg(long)]
    pub spin: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate CLI arguments that do not depend on the TOML file
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.repeat == Some(0) {
            anyhow::bail!("repeat must be at least 1");
        }
        if self.jobs == Some(0) {
            anyhow::bail!("jobs must be at least 1");
        }
        if self.jobs_max == Some(0) {
            anyhow::bail!("jobs_max must be at least 1");
        }
        if self.spin && self.think_time.is_none() {
            anyhow::bail!("--spin requires --think-time");
        }
        Ok(())
    }
}
