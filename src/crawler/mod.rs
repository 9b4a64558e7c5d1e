//! Crawler module for GDELT article collection
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic
//! - Repair and decoding of malformed responses
//! - Window splitting and scheduling
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
pub mod sanitizer;
mod scheduler;

pub use coordinator::{run_crawl, Crawler};
pub use fetcher::{
    build_http_client, ApiClient, ReqwestTransport, RetryPolicy, Transport, TransportResponse,
};
pub use parser::{parse_articles, SEEN_DATE_FORMAT};
pub use scheduler::{PendingRange, SplitDecision, SplitPolicy, WorkStack};

use crate::query::Query;
use crate::range::{Frequency, TimeRange};
use std::path::PathBuf;
use std::time::Duration;

/// How a crawl partitions its time range
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Bisect windows that hit the cap until they don't (or can't)
    #[default]
    Recursive,

    /// One call per fixed-frequency bucket, no re-splitting
    Iterative(Frequency),
}

/// Everything one crawl run needs besides configuration
#[derive(Debug, Clone)]
pub struct CrawlJob {
    /// What to search for
    pub query: Query,

    /// Overall window
    pub range: TimeRange,

    /// Partitioning strategy
    pub strategy: Strategy,

    /// CSV file to append to
    pub output: PathBuf,

    /// Sleep before every API call
    pub request_delay: Duration,
}
