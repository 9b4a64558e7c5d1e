use serde::Deserialize;
use std::time::Duration;

/// GDELT DOC 2.0 endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.gdeltproject.org/api/v2/doc/doc";

/// Records returned by one `ArtList` call at most
pub const API_RECORD_CAP: usize = 250;

/// GDELT refuses searches over windows shorter than 30 minutes
pub const MIN_INTERVAL_SECS: i64 = 1800;

/// Main configuration structure for gdelt-harvest
///
/// Every section and field has a default, so an empty file (or no file at
/// all) yields a working configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub http: HttpConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Target API configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApiConfig {
    /// DOC API endpoint
    pub endpoint: String,

    /// Value sent as `maxrecords`, also the truncation threshold
    pub max_records: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            max_records: API_RECORD_CAP,
        }
    }
}

/// HTTP client and retry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Retries after the first attempt before giving up
    pub max_retries: u32,

    /// Backoff multiplier in seconds
    pub backoff_factor: f64,

    /// Upper bound for a single backoff sleep
    pub max_backoff_secs: u64,

    /// Statuses that are retried
    pub retry_statuses: Vec<u16>,

    /// Whole-request timeout
    pub request_timeout_secs: u64,

    /// Connection establishment timeout
    pub connect_timeout_secs: u64,

    /// User-Agent header value
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: 12,
            backoff_factor: 4.0,
            max_backoff_secs: 120,
            retry_statuses: vec![429, 500, 502, 503, 504],
            request_timeout_secs: 60,
            connect_timeout_secs: 10,
            user_agent: format!("gdelt-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    pub fn max_backoff(&self) -> Duration {
        Duration::from_secs(self.max_backoff_secs)
    }
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Sleep before every API call (seconds)
    pub request_delay_secs: f64,

    /// Shortest window the splitter may produce (seconds)
    pub min_interval_secs: i64,

    /// Byte deletions the response sanitizer may attempt per payload
    pub max_repairs: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            request_delay_secs: 0.5,
            min_interval_secs: MIN_INTERVAL_SECS,
            max_repairs: 512,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for derived output file names
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "results".to_string(),
        }
    }
}
