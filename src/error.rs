//! Error types for the benchmark core
//!
//! Every failure inside a benchmark run is fatal to that run: a retried or
//! partially completed transfer would make the throughput figure meaningless.
//! The core reports failures as [`BenchError`] so callers (and tests) can
//! inspect them; the drivers wrap them with `anyhow` context.

use thiserror::Error;

/// Errors produced by the harness core
#[derive(Debug, Error)]
pub enum BenchError {
    /// Invariant violated before any IO started
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An open/map/seek/read/write call failed
    #[error("{op} failed")]
    Io {
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A transfer moved fewer bytes than requested
    #[error("short transfer at offset {offset}: expected {expected} bytes, got {actual}")]
    ShortTransfer {
        offset: u64,
        expected: usize,
        actual: usize,
    },

    /// Buffer or index allocation failed
    #[error("failed to allocate {size} bytes (alignment {align})")]
    Alloc { size: usize, align: usize },

    /// A worker in a pool run failed
    #[error("worker {id} failed")]
    Worker {
        id: usize,
        #[source]
        source: Box<BenchError>,
    },
}

impl BenchError {
    /// Build an `Io` error from the current `errno`
    pub(crate) fn last_os(op: &'static str) -> Self {
        BenchError::Io {
            op,
            source: std::io::Error::last_os_error(),
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        BenchError::Config(msg.into())
    }
}

/// Result alias for the harness core
pub type BenchResult<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_transfer_message() {
        let err = BenchError::ShortTransfer {
            offset: 8192,
            expected: 4096,
            actual: 100,
        };
        assert_eq!(
            err.to_string(),
            "short transfer at offset 8192: expected 4096 bytes, got 100"
        );
    }

    #[test]
    fn test_worker_error_keeps_source() {
        let err = BenchError::Worker {
            id: 3,
            source: Box::new(BenchError::config("bad")),
        };
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "invalid configuration: bad");
    }
}
