//! Human-readable throughput output

use std::time::Duration;

const BYTES_PER_MB: f64 = 1_048_576.0;
const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// Throughput in MB/s: bytes / (elapsed_ns / 1e9) / 1,048,576
///
/// Returns 0.0 when no time elapsed instead of infinity.
///
/// # Examples
///
/// ```
/// use fsprobe::output::text::throughput_mb_s;
///
/// assert_eq!(throughput_mb_s(1_048_576, 1_000_000_000), 1.0);
/// assert_eq!(throughput_mb_s(1_048_576, 0), 0.0);
/// ```
pub fn throughput_mb_s(bytes: u64, elapsed_ns: u64) -> f64 {
    if elapsed_ns == 0 {
        return 0.0;
    }
    bytes as f64 / (elapsed_ns as f64 / NANOS_PER_SECOND) / BYTES_PER_MB
}

/// `"<label> throughput: 123.45 MB/s"`
pub fn throughput_line(label: &str, mb_s: f64) -> String {
    format!("{} throughput: {:.2} MB/s", label, mb_s)
}

/// Print a throughput line to stdout
pub fn report(label: &str, mb_s: f64) {
    println!("{}", throughput_line(label, mb_s));
}

/// Format a byte count with binary units (e.g. "256.00 MiB")
pub fn format_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;

    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GiB", b / GB)
    } else if b >= MB {
        format!("{:.2} MiB", b / MB)
    } else if b >= KB {
        format!("{:.2} KiB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Format a duration in human-readable form
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use fsprobe::output::text::format_duration;
///
/// assert_eq!(format_duration(Duration::from_nanos(500)), "500ns");
/// assert_eq!(format_duration(Duration::from_micros(2500)), "2.50ms");
/// assert_eq!(format_duration(Duration::from_secs(5)), "5.00s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();

    if nanos < 1_000 {
        format!("{}ns", nanos)
    } else if nanos < 1_000_000 {
        format!("{:.2}us", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.2}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", nanos as f64 / 1_000_000_000.0)
    }
}

/// Section banner used between suite phases
pub fn print_banner(title: &str) {
    println!("==============================================================");
    println!("{}", title);
    println!("==============================================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throughput_mb_s() {
        // 10 MiB in 10s
        assert_eq!(throughput_mb_s(10 * 1_048_576, 10_000_000_000), 1.0);
        // 1 GiB in half a second
        assert_eq!(throughput_mb_s(1 << 30, 500_000_000), 2048.0);
    }

    #[test]
    fn test_throughput_zero_elapsed() {
        assert_eq!(throughput_mb_s(4096, 0), 0.0);
    }

    #[test]
    fn test_throughput_positive_for_transfer() {
        assert!(throughput_mb_s(4096, 1) > 0.0);
    }

    #[test]
    fn test_throughput_line() {
        assert_eq!(
            throughput_line("Sequential read", 1234.567),
            "Sequential read throughput: 1234.57 MB/s"
        );
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(4096), "4.00 KiB");
        assert_eq!(format_bytes(256 * 1_048_576), "256.00 MiB");
        assert_eq!(format_bytes(3 << 30), "3.00 GiB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_nanos(1500)), "1.50us");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    }
}
