//! Low-level helpers: aligned buffers and the fenced monotonic clock

pub mod buffer;
pub mod clock;
