//! Result output: stdout throughput lines and the CSV log

pub mod csv;
pub mod text;
