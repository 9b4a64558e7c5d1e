//! gdelt-harvest: a rate-limit aware GDELT article collector
//!
//! This crate walks the GDELT DOC 2.0 article search over long time spans,
//! splitting the requested window until no single response is cut off by the
//! API's per-request record cap, and appends the results to a CSV file.

pub mod article;
pub mod config;
pub mod crawler;
pub mod output;
pub mod query;
pub mod range;

use thiserror::Error;

/// Main error type for gdelt-harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Malformed response: {0}")]
    Sanitize(#[from] SanitizeError),

    #[error("Unexpected response shape: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("Invalid seendate '{value}': {source}")]
    SeenDate {
        value: String,
        source: chrono::ParseError,
    },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while validating user input, before any request is sent
#[derive(Debug, Error)]
pub enum InputError {
    #[error("No keywords given")]
    EmptyKeywords,

    #[error("Invalid timestamp '{0}': expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    Timestamp(String),

    #[error("Invalid time range: from {from} must be before to {to}")]
    Range { from: String, to: String },

    #[error("Invalid frequency '{0}': expected <n><unit> with unit one of W, D, H, min, T, S")]
    Frequency(String),

    #[error("Frequency {0} is shorter than the minimum interval of {1} seconds")]
    FrequencyTooShort(String, i64),

    #[error("Invalid delay {0}: must be a finite, non-negative number of seconds")]
    Delay(f64),
}

/// Errors raised by the HTTP layer once its retry policy gives up
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Gave up on {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Transport-level failures, retried by the HTTP client
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("{0}")]
    Other(String),
}

/// Errors raised when a response body cannot be turned into JSON
#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("Gave up after {repairs} repairs ({message}); payload starts with {snippet:?}")]
    Exhausted {
        repairs: usize,
        message: String,
        snippet: String,
    },

    #[error("Cannot repair payload ({message}); payload starts with {snippet:?}")]
    Unrepairable { message: String, snippet: String },
}

/// Result type alias for gdelt-harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for input validation
pub type InputResult<T> = std::result::Result<T, InputError>;

// Re-export commonly used types
pub use article::ArticleRecord;
pub use config::Config;
pub use crawler::{CrawlJob, Strategy};
pub use query::Query;
pub use range::{Frequency, TimeRange};
