//! Output sink trait and errors
//!
//! Sinks receive every accepted window's records as soon as the window is
//! accepted, so partial progress survives a failed crawl.

use crate::article::ArticleRecord;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Append-only destination for accepted records
pub trait RecordSink {
    /// Appends one window's records
    ///
    /// Implementations must make the records durable before returning.
    fn append_records(&mut self, records: &[ArticleRecord]) -> OutputResult<()>;
}

/// In-memory sink
impl RecordSink for Vec<ArticleRecord> {
    fn append_records(&mut self, records: &[ArticleRecord]) -> OutputResult<()> {
        self.extend_from_slice(records);
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn append_records(&mut self, records: &[ArticleRecord]) -> OutputResult<()> {
        (**self).append_records(records)
    }
}
