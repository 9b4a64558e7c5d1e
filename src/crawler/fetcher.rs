//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the pooled HTTP client
//! - The `Transport` seam that tests replace with fakes
//! - Retry with exponential backoff on transient failures
//! - The fixed courtesy delay before every request

use crate::config::HttpConfig;
use crate::{FetchError, TransportError};
use reqwest::header::RETRY_AFTER;
use reqwest::Client;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, warn};
use url::Url;

/// A raw HTTP response
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Parsed `Retry-After` header, when given in seconds
    pub retry_after: Option<Duration>,

    /// Response body
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// A 200 response with the given body
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Something that can perform a single GET request
///
/// Implementations perform exactly one attempt; retrying is the job of
/// [`ApiClient`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError>;
}

/// Production transport backed by one pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, TransportError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.bytes().await?.to_vec();

        Ok(TransportResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Builds the HTTP client shared by every request of a crawl
///
/// The pool keeps a single idle connection since requests are strictly
/// sequential.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(1)
        .gzip(true)
        .brotli(true)
        .build()
}

/// When and how long to retry
///
/// | Condition | Action |
/// |-----------|--------|
/// | Status in `retry_statuses` | Retry after backoff (or `Retry-After` on 429/503) |
/// | Transport error | Retry after backoff |
/// | Other non-2xx status | Fail immediately |
/// | Budget spent | Fail with `RetriesExhausted` |
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Backoff multiplier in seconds
    pub backoff_factor: f64,

    /// Upper bound for one sleep
    pub max_backoff: Duration,

    /// Statuses worth retrying
    pub retry_statuses: Vec<u16>,
}

impl RetryPolicy {
    pub fn from_config(config: &HttpConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_factor: config.backoff_factor,
            max_backoff: config.max_backoff(),
            retry_statuses: config.retry_statuses.clone(),
        }
    }

    /// A policy that never sleeps, for tests and local mocks
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff_factor: 0.0,
            max_backoff: Duration::ZERO,
            retry_statuses: vec![429, 500, 502, 503, 504],
        }
    }

    pub fn is_retryable(&self, status: u16) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Sleep before retry number `retry` (1-based)
    ///
    /// The first retry is immediate; after that the delay is
    /// `backoff_factor * 2^(retry - 1)` seconds, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(31) as i32;
        let secs = self.backoff_factor * 2f64.powi(exponent);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Sleep before retry number `retry` after the given response
    ///
    /// A `Retry-After` value on 429/503 replaces the computed backoff.
    pub fn delay_for(&self, retry: u32, response: Option<&TransportResponse>) -> Duration {
        match response {
            Some(r) if matches!(r.status, 429 | 503) && r.retry_after.is_some() => r
                .retry_after
                .unwrap_or_default()
                .min(self.max_backoff),
            _ => self.backoff(retry),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}

/// The crawl's HTTP client
///
/// Owns the transport (and so the connection pool) for the lifetime of one
/// crawl run. Requests are strictly sequential.
#[derive(Debug)]
pub struct ApiClient<T> {
    transport: T,
    policy: RetryPolicy,
    request_delay: Duration,
    requests_sent: u64,
    attempts_made: u64,
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client
    ///
    /// # Arguments
    ///
    /// * `transport` - Performs single attempts
    /// * `policy` - Retry policy
    /// * `request_delay` - Sleep before every logical request
    pub fn new(transport: T, policy: RetryPolicy, request_delay: Duration) -> Self {
        Self {
            transport,
            policy,
            request_delay,
            requests_sent: 0,
            attempts_made: 0,
        }
    }

    /// Logical requests issued so far
    pub fn requests_sent(&self) -> u64 {
        self.requests_sent
    }

    /// HTTP attempts made so far, retries included
    pub fn attempts_made(&self) -> u64 {
        self.attempts_made
    }

    /// Fetches a URL, retrying transient failures
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - Body of the first successful response
    /// * `Err(FetchError)` - Non-retryable status, or retries exhausted
    pub async fn get(&mut self, url: &Url) -> Result<Vec<u8>, FetchError> {
        if !self.request_delay.is_zero() {
            sleep(self.request_delay).await;
        }
        self.requests_sent += 1;

        let total_t0 = Instant::now();
        let mut retry = 0u32;

        loop {
            self.attempts_made += 1;
            let outcome = self.transport.get(url).await;

            let (last_error, response) = match outcome {
                Ok(response) if response.is_success() => {
                    debug!(
                        status = response.status,
                        bytes = response.body.len(),
                        retries = retry,
                        "GET succeeded"
                    );
                    return Ok(response.body);
                }
                Ok(response) if self.policy.is_retryable(response.status) => {
                    (format!("HTTP {}", response.status), Some(response))
                }
                Ok(response) => {
                    error!(status = response.status, %url, "Non-retryable HTTP status");
                    return Err(FetchError::Status {
                        url: url.to_string(),
                        status: response.status,
                    });
                }
                Err(e) => (e.to_string(), None),
            };

            retry += 1;
            if retry > self.policy.max_retries {
                error!(
                    attempts = retry,
                    elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                    error = %last_error,
                    "GET exhausted retries"
                );
                return Err(FetchError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: retry,
                    last_error,
                });
            }

            let delay = self.policy.delay_for(retry, response.as_ref());
            warn!(
                retry,
                max = self.policy.max_retries,
                ?delay,
                error = %last_error,
                "GET failed; backing off"
            );
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
    }

    /// Ends the client's lifetime, releasing the transport and its pool
    pub fn shutdown(self) -> T {
        debug!(
            requests = self.requests_sent,
            attempts = self.attempts_made,
            "HTTP client shut down"
        );
        self.transport
    }
}
