//! Fenced monotonic clock
//!
//! Timestamps come straight from `clock_gettime(CLOCK_MONOTONIC)`. Each read is
//! bracketed by a sequentially consistent fence so neither the compiler nor the
//! CPU can move work from inside a timed region across the timestamp.

use std::sync::atomic::{fence, Ordering};
use std::time::Duration;

/// Nanosecond timestamp from `CLOCK_MONOTONIC`
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FencedInstant {
    nanos: u64,
}

impl FencedInstant {
    /// Read the monotonic clock with a full barrier on both sides
    #[inline(always)]
    pub fn now() -> Self {
        let mut ts = libc::timespec {
            tv_sec: 0,
            tv_nsec: 0,
        };

        fence(Ordering::SeqCst);
        // SAFETY: clock_gettime only writes into the timespec we own.
        // CLOCK_MONOTONIC is always available on Linux.
        unsafe {
            libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
        }
        fence(Ordering::SeqCst);

        let nanos = (ts.tv_sec as u64) * 1_000_000_000 + (ts.tv_nsec as u64);

        Self { nanos }
    }

    /// Raw nanosecond value
    #[inline(always)]
    pub fn as_nanos(&self) -> u64 {
        self.nanos
    }

    /// Nanoseconds elapsed between `earlier` and `self` (0 if `earlier` is later)
    #[inline(always)]
    pub fn nanos_since(&self, earlier: FencedInstant) -> u64 {
        self.nanos.saturating_sub(earlier.nanos)
    }

    #[inline(always)]
    pub fn duration_since(&self, earlier: FencedInstant) -> Duration {
        Duration::from_nanos(self.nanos_since(earlier))
    }

    /// Elapsed time since this instant
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        Self::now().duration_since(*self)
    }
}
