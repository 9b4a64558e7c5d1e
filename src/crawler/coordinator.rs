//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the two crawl loops:
//! - Recursive: cap-driven bisection over an explicit work stack
//! - Iterative: one call per fixed-frequency bucket, no re-splitting
//!
//! Both write each accepted window to the sink before fetching the next one.

use crate::article::ArticleRecord;
use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, ApiClient, ReqwestTransport, RetryPolicy, Transport};
use crate::crawler::parser::parse_articles;
use crate::crawler::scheduler::{SplitDecision, SplitPolicy, WorkStack};
use crate::crawler::{CrawlJob, Strategy};
use crate::output::{CrawlStats, CsvSink, RecordSink};
use crate::query::{ApiRequest, Query};
use crate::range::{plan_buckets, TimeRange};
use crate::HarvestError;
use chrono::Duration;
use std::time::Instant;

/// Main crawler structure
///
/// Owns the HTTP client and the sink for the duration of one crawl run.
pub struct Crawler<T, S> {
    client: ApiClient<T>,
    sink: S,
    endpoint: String,
    policy: SplitPolicy,
    max_repairs: usize,
    stats: CrawlStats,
}

impl<T: Transport, S: RecordSink> Crawler<T, S> {
    /// Creates a crawler
    ///
    /// # Arguments
    ///
    /// * `client` - The HTTP client to issue calls with
    /// * `sink` - Where accepted records go
    /// * `config` - Endpoint, cap, split granularity and repair budget
    pub fn new(client: ApiClient<T>, sink: S, config: &Config) -> Self {
        Self {
            client,
            sink,
            endpoint: config.api.endpoint.clone(),
            policy: SplitPolicy::new(
                config.api.max_records,
                Duration::try_seconds(config.crawler.min_interval_secs).unwrap_or(Duration::MAX),
            ),
            max_repairs: config.crawler.max_repairs,
            stats: CrawlStats::new(),
        }
    }

    /// Runs a crawl with the given strategy
    pub async fn run(
        &mut self,
        query: &Query,
        range: TimeRange,
        strategy: Strategy,
    ) -> Result<(), HarvestError> {
        match strategy {
            Strategy::Recursive => self.crawl_recursive(query, range).await,
            Strategy::Iterative(frequency) => {
                let buckets = plan_buckets(&range, frequency, self.policy.min_interval())?;
                self.crawl_iterative(query, &buckets).await
            }
        }
    }

    /// Exhaustive crawl of `range`
    ///
    /// Fetches the whole window; whenever a result reaches the cap the window
    /// is bisected and both halves are fetched instead, down to the minimum
    /// interval. Results below the cap are written immediately.
    pub async fn crawl_recursive(
        &mut self,
        query: &Query,
        range: TimeRange,
    ) -> Result<(), HarvestError> {
        let request = ApiRequest::new(&self.endpoint, query, self.policy.cap(), true);
        let mut stack = WorkStack::new(range);

        while let Some(pending) = stack.pop() {
            let records = self.fetch_window(&request, &pending.range).await?;
            let count = records.len();

            match self.policy.decide(&pending.range, count) {
                SplitDecision::Split(left, right) => {
                    tracing::info!("{} {}, halving", pending.range, count);
                    self.stats.splits += 1;
                    stack.push_children(&pending, left, right);
                    self.stats.max_depth = stack.deepest();
                }
                SplitDecision::AcceptTruncated => {
                    tracing::warn!(
                        "{} {}, window too short to split; saving possibly incomplete result",
                        pending.range,
                        count
                    );
                    self.stats.truncated_ranges += 1;
                    self.save(&records)?;
                }
                SplitDecision::Accept => {
                    tracing::info!("{} {}, saving", pending.range, count);
                    self.save(&records)?;
                }
            }
        }

        Ok(())
    }

    /// Fixed-bucket crawl
    ///
    /// One call per bucket. Buckets that reach the cap are saved as they are;
    /// the records beyond the cap are lost.
    pub async fn crawl_iterative(
        &mut self,
        query: &Query,
        buckets: &[TimeRange],
    ) -> Result<(), HarvestError> {
        let request = ApiRequest::new(&self.endpoint, query, self.policy.cap(), false);

        for bucket in buckets {
            let records = self.fetch_window(&request, bucket).await?;
            let count = records.len();

            if count >= self.policy.cap() {
                tracing::warn!("{} {}, bucket hit the cap; saving anyway", bucket, count);
                self.stats.truncated_ranges += 1;
            } else {
                tracing::info!("{} {}, saving", bucket, count);
            }
            self.save(&records)?;
        }

        Ok(())
    }

    /// Statistics collected so far
    pub fn stats(&self) -> &CrawlStats {
        &self.stats
    }

    /// Ends the run, shutting down the HTTP client
    pub fn finish(self) -> (CrawlStats, S) {
        self.client.shutdown();
        (self.stats, self.sink)
    }

    async fn fetch_window(
        &mut self,
        request: &ApiRequest,
        range: &TimeRange,
    ) -> Result<Vec<ArticleRecord>, HarvestError> {
        let url = request.url_for(range)?;
        tracing::debug!("Requesting {}", url);

        self.stats.requests += 1;
        let body = self.client.get(&url).await?;
        parse_articles(&body, self.max_repairs)
    }

    fn save(&mut self, records: &[ArticleRecord]) -> Result<(), HarvestError> {
        self.sink.append_records(records)?;
        self.stats.accepted_ranges += 1;
        self.stats.records_written += records.len() as u64;
        Ok(())
    }
}

/// Runs a complete crawl against the real API
///
/// This function orchestrates the entire crawl process:
///
/// 1. Build the pooled HTTP client and retry policy
/// 2. Open the CSV sink (creating its directory)
/// 3. Run the selected strategy, appending each accepted window
/// 4. Shut the client down and return the statistics
///
/// # Arguments
///
/// * `job` - What to crawl and where to write it
/// * `config` - The loaded configuration
///
/// # Returns
///
/// * `Ok(CrawlStats)` - Crawl completed successfully
/// * `Err(HarvestError)` - Crawl aborted; rows written so far stay on disk
///
/// # Example
///
/// ```no_run
/// use gdelt_harvest::config::Config;
/// use gdelt_harvest::crawler::{run_crawl, CrawlJob, Strategy};
/// use gdelt_harvest::query::Query;
/// use gdelt_harvest::range::{parse_timestamp, TimeRange};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let job = CrawlJob {
///     query: Query::parse("bitcoin", "eng")?,
///     range: TimeRange::new(parse_timestamp("2021-01-01")?, parse_timestamp("2021-02-01")?)?,
///     strategy: Strategy::Recursive,
///     output: "results/bitcoin.csv".into(),
///     request_delay: Duration::from_millis(500),
/// };
/// run_crawl(&job, &Config::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(job: &CrawlJob, config: &Config) -> Result<CrawlStats, HarvestError> {
    let http = build_http_client(&config.http)?;
    let client = ApiClient::new(
        ReqwestTransport::new(http),
        RetryPolicy::from_config(&config.http),
        job.request_delay,
    );
    let sink = CsvSink::create(&job.output)?;

    let start_time = Instant::now();
    let mut crawler = Crawler::new(client, sink, config);
    let outcome = crawler.run(&job.query, job.range, job.strategy).await;
    let (stats, _sink) = crawler.finish();

    match outcome {
        Ok(()) => {
            tracing::info!(
                "Crawl completed: {} calls, {} records in {:?}",
                stats.requests,
                stats.records_written,
                start_time.elapsed()
            );
            Ok(stats)
        }
        Err(e) => {
            tracing::error!(
                "Crawl aborted after {} calls ({} records saved): {}",
                stats.requests,
                stats.records_written,
                e
            );
            Err(e)
        }
    }
}
