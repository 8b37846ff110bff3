//! Concurrent access loops
//!
//! [`WorkerPool`] runs one [`AccessPattern`] per OS thread, each against its
//! own medium. Threads are scoped, so patterns are borrowed rather than moved
//! and remain available to the caller afterwards. Joining is the only
//! synchronization point; workers share no mutable state.

use super::AccessPattern;
use crate::config::workload::AccessSpec;
use crate::engine::Medium;
use crate::error::{BenchError, BenchResult};
use crate::stats::{PoolMeasurement, WorkerResult};
use crate::util::clock::FencedInstant;

/// A fixed set of access loops run in parallel
pub struct WorkerPool<M: Medium> {
    patterns: Vec<AccessPattern<M>>,
}

impl<M: Medium> WorkerPool<M> {
    /// Build a pool from prepared patterns; worker id = position
    pub fn new(patterns: Vec<AccessPattern<M>>) -> BenchResult<Self> {
        if patterns.is_empty() {
            return Err(BenchError::config("worker pool needs at least one job"));
        }
        Ok(Self { patterns })
    }

    /// One job per medium, all sharing `spec`
    ///
    /// Worker `i` gets offsets and a generator seeded from the spec seed plus
    /// `i`, or from the clock when the spec has no seed.
    pub fn from_media(media: Vec<M>, spec: &AccessSpec) -> BenchResult<Self> {
        let patterns = media
            .into_iter()
            .enumerate()
            .map(|(id, medium)| AccessPattern::for_worker(id, medium, spec.clone()))
            .collect::<BenchResult<Vec<_>>>()?;
        Self::new(patterns)
    }

    pub fn job_count(&self) -> usize {
        self.patterns.len()
    }

    /// Run every job on its own thread and aggregate
    ///
    /// Elapsed time is the wall-clock span from before the first spawn to
    /// after the last join. All threads are joined before any result is
    /// inspected; the first failure in worker-id order is returned.
    pub fn run(&mut self) -> BenchResult<PoolMeasurement> {
        let job_count = self.patterns.len();
        warn_if_oversubscribed(job_count);
        tracing::debug!(jobs = job_count, "spawning workers");

        let start = FencedInstant::now();

        let outcomes: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .patterns
                .iter_mut()
                .map(|pattern| scope.spawn(move || pattern.run()))
                .collect();

            handles.into_iter().map(|handle| handle.join()).collect::<Vec<_>>()
        });

        let end = FencedInstant::now();

        let mut workers = Vec::with_capacity(job_count);
        for (id, outcome) in outcomes.into_iter().enumerate() {
            let measurement = match outcome {
                Ok(Ok(m)) => m,
                Ok(Err(e)) => {
                    return Err(BenchError::Worker {
                        id,
                        source: Box::new(e),
                    })
                }
                Err(panic) => std::panic::resume_unwind(panic),
            };
            workers.push(WorkerResult {
                worker_id: id,
                bytes: measurement.bytes,
                elapsed_ns: measurement.elapsed_ns,
            });
        }

        Ok(PoolMeasurement {
            elapsed_ns: end.nanos_since(start),
            workers,
        })
    }
}

/// Warn when more jobs than CPUs will compete for cores
///
/// Returns true if oversubscribed.
pub fn warn_if_oversubscribed(job_count: usize) -> bool {
    let cpu_count = num_cpus::get();
    if job_count > cpu_count {
        tracing::warn!(
            jobs = job_count,
            cpus = cpu_count,
            "job count exceeds CPU count; expect context switching overhead"
        );
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::workload::{Direction, Ordering};
    use crate::engine::heap::HeapMedium;
    use crate::engine::sync::FileMedium;
    use crate::engine::OpenMode;
    use tempfile::TempDir;

    const LEN: usize = 4096 * 32;

    #[test]
    fn test_pool_aggregates_bytes() {
        let spec = AccessSpec::new(LEN as u64, 4096, Direction::Write, Ordering::Random, 1)
            .unwrap()
            .with_seed(5);
        let media = (0..4).map(|_| HeapMedium::new(LEN).unwrap()).collect();

        let mut pool = WorkerPool::from_media(media, &spec).unwrap();
        assert_eq!(pool.job_count(), 4);

        let m = pool.run().unwrap();
        assert_eq!(m.job_count(), 4);
        assert_eq!(m.total_bytes(), 4 * LEN as u64);
        for (id, w) in m.workers.iter().enumerate() {
            assert_eq!(w.worker_id, id);
            assert_eq!(w.bytes, LEN as u64);
            assert!(w.elapsed_ns <= m.elapsed_ns);
        }
        assert!(m.throughput_mb_s() > 0.0);
    }

    #[test]
    fn test_pool_over_files() {
        let temp_dir = TempDir::new().unwrap();
        let media: Vec<FileMedium> = (0..2)
            .map(|i| {
                let path = temp_dir.path().join(format!("job_{}.dat", i));
                std::fs::write(&path, vec![0u8; LEN]).unwrap();
                FileMedium::open(&path, OpenMode::ReadOnly, false).unwrap()
            })
            .collect();

        let spec = AccessSpec::new(LEN as u64, 8192, Direction::Read, Ordering::Sequential, 2).unwrap();
        let m = WorkerPool::from_media(media, &spec).unwrap().run().unwrap();
        assert_eq!(m.total_bytes(), 2 * 2 * LEN as u64);
    }

    #[test]
    fn test_pool_reports_first_failing_worker() {
        let spec = AccessSpec::new(LEN as u64, 4096, Direction::Read, Ordering::Sequential, 1).unwrap();
        let temp_dir = TempDir::new().unwrap();

        let media: Vec<FileMedium> = (0..3)
            .map(|i| {
                let path = temp_dir.path().join(format!("job_{}.dat", i));
                std::fs::write(&path, vec![0u8; LEN]).unwrap();
                FileMedium::open(&path, OpenMode::ReadOnly, false).unwrap()
            })
            .collect();
        let mut pool = WorkerPool::from_media(media, &spec).unwrap();

        // Truncate worker 1's file after validation so its loop comes up short
        std::fs::OpenOptions::new()
            .write(true)
            .open(temp_dir.path().join("job_1.dat"))
            .unwrap()
            .set_len(4096)
            .unwrap();

        match pool.run() {
            Err(BenchError::Worker { id, source }) => {
                assert_eq!(id, 1);
                assert!(matches!(*source, BenchError::ShortTransfer { .. }));
            }
            other => panic!("expected worker error, got {:?}", other.map(|m| m.total_bytes())),
        }
    }

    #[test]
    fn test_empty_pool_rejected() {
        let result = WorkerPool::<HeapMedium>::new(Vec::new());
        assert!(matches!(result, Err(BenchError::Config(_))));
    }

    #[test]
    fn test_warn_if_oversubscribed() {
        let cpus = num_cpus::get();
        assert!(!warn_if_oversubscribed(cpus));
        assert!(warn_if_oversubscribed(cpus + 1));
    }
}
