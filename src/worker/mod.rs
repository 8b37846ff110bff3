//! Access loop execution
//!
//! This module implements [`AccessPattern`], the core execution unit. It owns
//! one medium, one transfer buffer, and a precomputed offset sequence, and
//! runs the timed loop described by an [`AccessSpec`].
//!
//! # Lifecycle
//!
//! 1. **Creation**: `AccessPattern::new()` validates the spec against the
//!    medium, allocates an aligned buffer, fills it with random data for write
//!    runs, and builds the offset sequence. All of this happens before timing.
//! 2. **Execution**: `run()` performs `repeat` passes over the offsets, one
//!    unit-sized transfer per offset, bracketed by fenced clock reads.
//! 3. **Result**: a [`Measurement`] with elapsed nanoseconds and bytes moved.
//!
//! Any failed or short transfer aborts the run. Nothing is retried.
//!
//! # Example
//!
//! ```
//! use fsprobe::config::workload::{AccessSpec, Direction, Ordering};
//! use fsprobe::engine::heap::HeapMedium;
//! use fsprobe::worker::AccessPattern;
//!
//! let spec = AccessSpec::new(4096 * 16, 4096, Direction::Write, Ordering::Random, 2)?;
//! let medium = HeapMedium::new(4096 * 16)?;
//! let mut pattern = AccessPattern::new(medium, spec)?;
//!
//! let measurement = pattern.run()?;
//! assert_eq!(measurement.bytes, 4096 * 16 * 2);
//! # Ok::<(), fsprobe::error::BenchError>(())
//! ```

pub mod pool;

use crate::config::workload::{AccessSpec, Direction, ThinkTime, ThinkTimeMode};
use crate::distribution::shuffle::clock_seed;
use crate::distribution::OffsetSequence;
use crate::engine::{Medium, MediumKind, DEFAULT_ALIGNMENT};
use crate::error::{BenchError, BenchResult};
use crate::stats::Measurement;
use crate::util::buffer::AlignedBuffer;
use crate::util::clock::FencedInstant;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

/// Timed access loop over one medium
pub struct AccessPattern<M: Medium> {
    /// Worker id; salts the generators in pool runs
    id: usize,
    medium: M,
    spec: AccessSpec,
    offsets: OffsetSequence,
    buffer: AlignedBuffer,
    /// Read/write selection for mixed runs
    rng: Xoshiro256PlusPlus,
}

impl<M: Medium> AccessPattern<M> {
    /// Build a pattern with offsets derived from the spec
    pub fn new(medium: M, spec: AccessSpec) -> BenchResult<Self> {
        Self::for_worker(0, medium, spec)
    }

    /// Build a pattern for pool worker `id`
    ///
    /// Each worker gets independently seeded generators.
    pub fn for_worker(id: usize, medium: M, spec: AccessSpec) -> BenchResult<Self> {
        let offsets = OffsetSequence::for_spec(&spec, id as u64);
        Self::with_offsets(id, medium, spec, offsets)
    }

    /// Build a pattern with a caller-supplied offset sequence
    ///
    /// # Errors
    ///
    /// `Config` when the medium is shorter than the spec's length, the
    /// sequence does not match the spec, or the unit size violates the
    /// medium's alignment requirement.
    pub fn with_offsets(
        id: usize,
        medium: M,
        spec: AccessSpec,
        offsets: OffsetSequence,
    ) -> BenchResult<Self> {
        if medium.len() < spec.length() {
            return Err(BenchError::config(format!(
                "{} medium holds {} bytes, access length is {}",
                medium.kind(),
                medium.len(),
                spec.length()
            )));
        }
        if offsets.len() as u64 != spec.block_count() || offsets.unit_size() != spec.unit_size() as u64 {
            return Err(BenchError::config(format!(
                "offset sequence ({} x {}) does not match spec ({} x {})",
                offsets.len(),
                offsets.unit_size(),
                spec.block_count(),
                spec.unit_size()
            )));
        }

        let alignment = medium.alignment();
        if medium.kind() == MediumKind::DirectFile && spec.unit_size() % alignment != 0 {
            return Err(BenchError::config(format!(
                "unit size {} is not a multiple of the direct IO block size {}",
                spec.unit_size(),
                alignment
            )));
        }

        let mut buffer = AlignedBuffer::new(spec.unit_size(), alignment.max(DEFAULT_ALIGNMENT))?;
        if !matches!(spec.direction(), Direction::Read) {
            buffer.fill_random();
        }

        let seed = spec
            .seed()
            .map(|s| s.wrapping_add(id as u64).rotate_left(17))
            .unwrap_or_else(|| clock_seed(id as u64 + 1));

        Ok(Self {
            id,
            medium,
            spec,
            offsets,
            buffer,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        })
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn spec(&self) -> &AccessSpec {
        &self.spec
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    /// Transfer buffer: the source of writes, the destination of reads
    pub fn buffer(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    /// Run the timed loop
    pub fn run(&mut self) -> BenchResult<Measurement> {
        self.run_inspect(|_, _| {})
    }

    /// Run the timed loop, handing every completed read to `inspect`
    ///
    /// `inspect(offset, data)` runs inside the timed region; keep it cheap or
    /// use it only for verification runs.
    pub fn run_inspect<F>(&mut self, mut inspect: F) -> BenchResult<Measurement>
    where
        F: FnMut(u64, &[u8]),
    {
        let unit = self.spec.unit_size();
        let think_time = self.spec.think_time();
        let direction = self.spec.direction();
        let mut m = Measurement::default();

        tracing::debug!(
            worker = self.id,
            medium = %self.medium.kind(),
            length = self.spec.length(),
            unit,
            ordering = %self.spec.ordering(),
            repeat = self.spec.repeat(),
            "starting access loop"
        );

        let start = FencedInstant::now();

        for _ in 0..self.spec.repeat() {
            self.medium.rewind()?;

            for offset in self.offsets.iter() {
                let is_write = match direction {
                    Direction::Read => false,
                    Direction::Write => true,
                    Direction::Mixed { write_ratio } => self.rng.gen::<f64>() < write_ratio,
                };

                let n = if is_write {
                    self.medium.write_at(self.buffer.as_slice(), offset)?
                } else {
                    let n = self.medium.read_at(self.buffer.as_mut_slice(), offset)?;
                    if n == unit {
                        inspect(offset, self.buffer.as_slice());
                    }
                    n
                };

                if n != unit {
                    return Err(BenchError::ShortTransfer {
                        offset,
                        expected: unit,
                        actual: n,
                    });
                }

                if is_write {
                    m.bytes_written += n as u64;
                } else {
                    m.bytes_read += n as u64;
                }
                m.transfers += 1;

                if let Some(ref think) = think_time {
                    apply_think_time(think);
                }
            }
        }

        let end = FencedInstant::now();

        m.elapsed_ns = end.nanos_since(start);
        m.bytes = m.bytes_read + m.bytes_written;

        tracing::debug!(
            worker = self.id,
            bytes = m.bytes,
            elapsed_ns = m.elapsed_ns,
            "access loop finished"
        );

        Ok(m)
    }
}

/// Delay after a transfer
fn apply_think_time(think: &ThinkTime) {
    match think.mode {
        ThinkTimeMode::Sleep => std::thread::sleep(think.duration),
        ThinkTimeMode::Spin => {
            let start = FencedInstant::now();
            while start.elapsed() < think.duration {
                std::hint::spin_loop();
            }
        }
    }
}
