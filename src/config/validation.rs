use crate::config::types::{ApiConfig, Config, CrawlerConfig, HttpConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Largest accepted split granularity: one year
const MAX_INTERVAL_SECS: i64 = 366 * 86_400;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_api_config(&config.api)?;
    validate_http_config(&config.http)?;
    validate_crawler_config(&config.crawler)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the API section
fn validate_api_config(config: &ApiConfig) -> Result<(), ConfigError> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

    if !matches!(endpoint.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(format!(
            "Endpoint '{}' must use http or https",
            config.endpoint
        )));
    }

    if config.max_records < 1 || config.max_records > 250 {
        return Err(ConfigError::Validation(format!(
            "max_records must be between 1 and 250, got {}",
            config.max_records
        )));
    }

    Ok(())
}

/// Validates the HTTP section
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if !config.backoff_factor.is_finite() || config.backoff_factor < 0.0 {
        return Err(ConfigError::Validation(format!(
            "backoff_factor must be a finite, non-negative number, got {}",
            config.backoff_factor
        )));
    }

    if let Some(status) = config
        .retry_statuses
        .iter()
        .find(|s| !(100..=599).contains(*s))
    {
        return Err(ConfigError::Validation(format!(
            "retry_statuses contains invalid HTTP status {}",
            status
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the crawler section
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if !config.request_delay_secs.is_finite() || config.request_delay_secs < 0.0 {
        return Err(ConfigError::Validation(format!(
            "request_delay_secs must be a finite, non-negative number, got {}",
            config.request_delay_secs
        )));
    }

    if !(1..=MAX_INTERVAL_SECS).contains(&config.min_interval_secs) {
        return Err(ConfigError::Validation(format!(
            "min_interval_secs must be between 1 and {}, got {}",
            MAX_INTERVAL_SECS,
            config.min_interval_secs
        )));
    }

    if config.max_repairs < 1 {
        return Err(ConfigError::Validation(
            "max_repairs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the output section
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}
