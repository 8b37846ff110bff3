//! Run measurements
//!
//! A [`Measurement`] is what one access loop produces: monotonic elapsed time
//! and the bytes it moved. Pool runs add a [`WorkerResult`] per thread and
//! aggregate them into a [`PoolMeasurement`] whose elapsed time is the
//! wall-clock span of the whole pool, not the sum of per-worker times.

use crate::output::text::throughput_mb_s;
use std::time::Duration;

/// Result of a single access loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Measurement {
    /// Monotonic nanoseconds spent inside the timed loop
    pub elapsed_ns: u64,
    /// Total bytes transferred
    pub bytes: u64,
    /// Number of unit transfers
    pub transfers: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
}

impl Measurement {
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns)
    }

    /// Mean throughput in MB/s (1 MB = 1,048,576 bytes)
    pub fn throughput_mb_s(&self) -> f64 {
        throughput_mb_s(self.bytes, self.elapsed_ns)
    }
}

/// Bytes moved by one pool worker, written once by the worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerResult {
    pub worker_id: usize,
    pub bytes: u64,
    /// The worker's own loop time; informational only
    pub elapsed_ns: u64,
}

/// Aggregate of a pool run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolMeasurement {
    /// Wall-clock span from before the first spawn to after the last join
    pub elapsed_ns: u64,
    pub workers: Vec<WorkerResult>,
}

impl PoolMeasurement {
    pub fn job_count(&self) -> usize {
        self.workers.len()
    }

    /// Sum of per-worker bytes
    pub fn total_bytes(&self) -> u64 {
        self.workers.iter().map(|w| w.bytes).sum()
    }

    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns)
    }

    pub fn throughput_mb_s(&self) -> f64 {
        throughput_mb_s(self.total_bytes(), self.elapsed_ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measurement_throughput() {
        let m = Measurement {
            elapsed_ns: 1_000_000_000,
            bytes: 10 * 1_048_576,
            transfers: 2560,
            bytes_read: 10 * 1_048_576,
            bytes_written: 0,
        };
        assert_eq!(m.throughput_mb_s(), 10.0);
        assert_eq!(m.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn test_pool_measurement_aggregates() {
        let pool = PoolMeasurement {
            elapsed_ns: 2_000_000_000,
            workers: (0..4)
                .map(|id| WorkerResult {
                    worker_id: id,
                    bytes: 1_048_576,
                    elapsed_ns: 1_500_000_000,
                })
                .collect(),
        };
        assert_eq!(pool.job_count(), 4);
        assert_eq!(pool.total_bytes(), 4 * 1_048_576);
        // Uses the wall-clock span, not the per-worker times
        assert_eq!(pool.throughput_mb_s(), 2.0);
    }
}
