//! Append-only CSV output
//!
//! The file is opened, appended to, flushed and closed on every call. The
//! header is written by whichever call finds the file missing, so repeated
//! crawls into the same path keep adding rows under a single header.

use crate::article::{ArticleRecord, CSV_HEADER};
use crate::output::traits::{OutputResult, RecordSink};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;

/// CSV file sink
#[derive(Debug, Clone)]
pub struct CsvSink {
    path: PathBuf,
    rows_written: u64,
}

impl CsvSink {
    /// Creates a sink for `path`, creating missing parent directories
    pub fn create(path: impl Into<PathBuf>) -> OutputResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            rows_written: 0,
        })
    }

    /// Rows appended through this sink
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl RecordSink for CsvSink {
    fn append_records(&mut self, records: &[ArticleRecord]) -> OutputResult<()> {
        let write_header = !self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        if write_header {
            writer.write_record(CSV_HEADER)?;
        }
        for record in records {
            writer.write_record(record.to_row())?;
        }
        writer.flush()?;

        self.rows_written += records.len() as u64;
        tracing::trace!(
            path = %self.path.display(),
            rows = records.len(),
            header = write_header,
            "Appended rows"
        );
        Ok(())
    }
}
