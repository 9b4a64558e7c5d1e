//! Crawl statistics
//!
//! Counters collected while a crawl runs, and the report printed when it
//! finishes.

use std::path::Path;

/// Per-run crawl counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// API calls issued (one per window, retries excluded)
    pub requests: u64,

    /// Windows that were bisected
    pub splits: u64,

    /// Windows whose results were written
    pub accepted_ranges: u64,

    /// Accepted windows that hit the cap (possibly incomplete)
    pub truncated_ranges: u64,

    /// Records written to the sink
    pub records_written: u64,

    /// Deepest bisection level reached
    pub max_depth: u32,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of accepted windows that may be missing records, in percent
    pub fn truncation_rate(&self) -> f64 {
        if self.accepted_ranges == 0 {
            return 0.0;
        }
        (self.truncated_ranges as f64 / self.accepted_ranges as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
/// * `output` - Where the records went
pub fn print_statistics(stats: &CrawlStats, output: &Path) {
    println!("=== Crawl Statistics ===\n");

    println!("  API calls: {}", stats.requests);
    println!("  Windows split: {}", stats.splits);
    println!("  Windows saved: {}", stats.accepted_ranges);
    println!("  Deepest split: {}", stats.max_depth);
    println!("  Records written: {}", stats.records_written);

    if stats.truncated_ranges > 0 {
        println!(
            "  Possibly incomplete windows: {} ({:.1}%)",
            stats.truncated_ranges,
            stats.truncation_rate()
        );
    }
    println!();

    println!("Done. Saved to {}", output.display());
}
