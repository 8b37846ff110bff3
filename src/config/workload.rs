//! Access pattern definition structures

use crate::error::{BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Transfer direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub enum Direction {
    /// Medium -> buffer
    Read,
    /// Buffer -> medium
    Write,
    /// Each transfer is a write with probability `write_ratio`, a read otherwise
    Mixed { write_ratio: f64 },
}

/// Offset ordering
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Ordering {
    Sequential,
    Random,
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordering::Sequential => write!(f, "Sequential"),
            Ordering::Random => write!(f, "Random"),
        }
    }
}

/// Think time mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ThinkTimeMode {
    Sleep,
    Spin,
}

/// Artificial delay applied after every transfer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThinkTime {
    pub duration: Duration,
    pub mode: ThinkTimeMode,
}

/// The four fixed test types every file suite runs
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TestType {
    SeqRead,
    SeqWrite,
    RandRead,
    RandWrite,
}

impl TestType {
    pub const ALL: [TestType; 4] = [
        TestType::SeqRead,
        TestType::SeqWrite,
        TestType::RandRead,
        TestType::RandWrite,
    ];

    pub fn direction(self) -> Direction {
        match self {
            TestType::SeqRead | TestType::RandRead => Direction::Read,
            TestType::SeqWrite | TestType::RandWrite => Direction::Write,
        }
    }

    pub fn ordering(self) -> Ordering {
        match self {
            TestType::SeqRead | TestType::SeqWrite => Ordering::Sequential,
            TestType::RandRead | TestType::RandWrite => Ordering::Random,
        }
    }

    pub fn is_write(self) -> bool {
        matches!(self.direction(), Direction::Write)
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestType::SeqRead => write!(f, "Sequential Read"),
            TestType::SeqWrite => write!(f, "Sequential Write"),
            TestType::RandRead => write!(f, "Random Read"),
            TestType::RandWrite => write!(f, "Random Write"),
        }
    }
}

/// Immutable description of one timed access loop
///
/// Construction enforces `length % unit_size == 0` so the last block is never
/// silently truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessSpec {
    length: u64,
    unit_size: usize,
    direction: Direction,
    ordering: Ordering,
    repeat: u32,
    think_time: Option<ThinkTime>,
    seed: Option<u64>,
}

impl AccessSpec {
    /// Validate and build a spec
    ///
    /// # Errors
    ///
    /// `Config` when `unit_size` is 0, `length` is 0 or not a multiple of
    /// `unit_size`, `repeat` is 0, or a mixed write ratio is outside [0, 1].
    pub fn new(
        length: u64,
        unit_size: usize,
        direction: Direction,
        ordering: Ordering,
        repeat: u32,
    ) -> BenchResult<Self> {
        if unit_size == 0 {
            return Err(BenchError::config("unit size must be greater than 0"));
        }
        if length == 0 {
            return Err(BenchError::config("length must be greater than 0"));
        }
        if length % unit_size as u64 != 0 {
            return Err(BenchError::config(format!(
                "length {} is not a multiple of unit size {}",
                length, unit_size
            )));
        }
        if repeat == 0 {
            return Err(BenchError::config("repeat count must be at least 1"));
        }
        if let Direction::Mixed { write_ratio } = direction {
            if !(0.0..=1.0).contains(&write_ratio) {
                return Err(BenchError::config(format!(
                    "write ratio must be within [0, 1], got {}",
                    write_ratio
                )));
            }
        }

        Ok(Self {
            length,
            unit_size,
            direction,
            ordering,
            repeat,
            think_time: None,
            seed: None,
        })
    }

    /// Shorthand for one of the four fixed test types
    pub fn for_test(test: TestType, length: u64, unit_size: usize, repeat: u32) -> BenchResult<Self> {
        Self::new(length, unit_size, test.direction(), test.ordering(), repeat)
    }

    pub fn with_think_time(mut self, think_time: ThinkTime) -> Self {
        self.think_time = Some(think_time);
        self
    }

    /// Pin the generator used for shuffling and mixed-op selection
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn unit_size(&self) -> usize {
        self.unit_size
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn ordering(&self) -> Ordering {
        self.ordering
    }

    pub fn repeat(&self) -> u32 {
        self.repeat
    }

    pub fn think_time(&self) -> Option<ThinkTime> {
        self.think_time
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Number of unit-sized blocks in one pass
    pub fn block_count(&self) -> u64 {
        self.length / self.unit_size as u64
    }

    /// Bytes moved by a complete run
    pub fn total_bytes(&self) -> u64 {
        self.length * self.repeat as u64
    }
}
