//! CSV result log
//!
//! One row per sweep measurement, appended as the suite runs so a partial log
//! survives an aborted sweep. Suitable for pandas, R, or a spreadsheet.

use crate::config::workload::TestType;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Column header, first line of every log
pub const CSV_HEADER: &str = "file_size,io_size,thread_count,test_type,run_time_s,throughput_MB_s";

/// One measured configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CsvRow {
    pub file_size: u64,
    pub io_size: usize,
    pub thread_count: usize,
    pub test_type: TestType,
    pub run_time_s: f64,
    pub throughput_mb_s: f64,
}

/// Append-only CSV writer
pub struct CsvLog {
    path: PathBuf,
    writer: BufWriter<File>,
    rows: usize,
}

impl CsvLog {
    /// Create (or truncate) `path` and write the header row
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)
            .with_context(|| format!("Failed to create CSV log: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "{}", CSV_HEADER)?;
        writer.flush()?;

        tracing::debug!(path = %path.display(), "created CSV log");
        Ok(Self { path, writer, rows: 0 })
    }

    /// Append one row and flush it
    ///
    /// The test type column holds the pattern label with spaces, e.g.
    /// `Sequential Read`.
    pub fn append(&mut self, row: &CsvRow) -> Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{:.6},{:.2}",
            row.file_size, row.io_size, row.thread_count, row.test_type, row.run_time_s, row.throughput_mb_s
        )
        .with_context(|| format!("Failed to append to CSV log: {}", self.path.display()))?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    /// Rows appended so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_csv_header_only() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");

        let log = CsvLog::create(&path).unwrap();
        assert_eq!(log.rows(), 0);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, format!("{}\n", CSV_HEADER));
    }

    #[test]
    fn test_csv_append_rows() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("results.csv");

        let mut log = CsvLog::create(&path).unwrap();
        log.append(&CsvRow {
            file_size: 268_435_456,
            io_size: 4096,
            thread_count: 4,
            test_type: TestType::RandWrite,
            run_time_s: 1.5,
            throughput_mb_s: 682.666,
        })
        .unwrap();
        log.append(&CsvRow {
            file_size: 268_435_456,
            io_size: 2_097_152,
            thread_count: 1,
            test_type: TestType::SeqRead,
            run_time_s: 0.25,
            throughput_mb_s: 1024.0,
        })
        .unwrap();
        assert_eq!(log.rows(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "268435456,4096,4,Random Write,1.500000,682.67");
        assert_eq!(lines[2], "268435456,2097152,1,Sequential Read,0.250000,1024.00");
    }

    #[test]
    fn test_csv_create_fails_in_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("results.csv");
        assert!(CsvLog::create(&path).is_err());
    }
}
