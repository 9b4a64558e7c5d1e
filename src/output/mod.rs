//! Output module for crawl results
//!
//! This module handles:
//! - The `RecordSink` trait accepted windows are written through
//! - The append-only CSV sink
//! - Crawl statistics and the end-of-run report

mod csv_sink;
pub mod stats;
mod traits;

pub use csv_sink::CsvSink;
pub use stats::{print_statistics, CrawlStats};
pub use traits::{OutputError, OutputResult, RecordSink};

use crate::range::{TimeRange, FILE_DATE_FORMAT};
use std::path::{Path, PathBuf};

/// Builds the conventional output path
///
/// `<directory>/GDELT_<name>_<from>_<to>.csv`, with dates as `YYYY-MM-DD`.
///
/// # Examples
///
/// ```
/// use gdelt_harvest::output::default_output_path;
/// use gdelt_harvest::range::{parse_timestamp, TimeRange};
/// use std::path::Path;
///
/// let range = TimeRange::new(
///     parse_timestamp("2019-03-01").unwrap(),
///     parse_timestamp("2023-03-01").unwrap(),
/// )
/// .unwrap();
/// let path = default_output_path(Path::new("results"), "bitcoin", &range);
/// assert_eq!(path, Path::new("results/GDELT_bitcoin_2019-03-01_2023-03-01.csv"));
/// ```
pub fn default_output_path(directory: &Path, name: &str, range: &TimeRange) -> PathBuf {
    directory.join(format!(
        "GDELT_{}_{}_{}.csv",
        name,
        range.from().format(FILE_DATE_FORMAT),
        range.to().format(FILE_DATE_FORMAT)
    ))
}
