//! fsprobe - storage IO throughput microbenchmarks
//!
//! fsprobe measures how fast a storage stack moves data under fixed, simple
//! access patterns: sequential and random reads and writes of a constant
//! transfer size over a file, a raw device, a memory mapping, or anonymous
//! memory, from one thread or many.
//!
//! # Architecture
//!
//! - **Media** ([`engine`]): file descriptors (buffered or `O_DIRECT`),
//!   shared mappings, heap regions, io_uring
//! - **Access loop** ([`worker`]): one unit transfer per precomputed offset,
//!   timed with fenced monotonic clock reads
//! - **Pools** ([`worker::pool`]): one scoped thread per job, wall-clock
//!   aggregate throughput
//! - **Suites** ([`suite`]): fixed measurement series printed as
//!   `"<label> throughput: N.NN MB/s"`

pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod output;
pub mod stats;
pub mod suite;
pub mod target;
pub mod util;
pub mod worker;

// Re-export commonly used types
pub use config::SuiteConfig;
pub use engine::Medium;
pub use error::{BenchError, BenchResult};
pub use worker::AccessPattern;

/// Result type used by suites and the CLI
pub type Result<T> = anyhow::Result<T>;
