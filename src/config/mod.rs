//! Configuration module for gdelt-harvest
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file. Command-line flags override values loaded here.
//!
//! # Example
//!
//! ```no_run
//! use gdelt_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Splitting down to {}s windows", config.crawler.min_interval_secs);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ApiConfig, Config, CrawlerConfig, HttpConfig, OutputConfig, API_RECORD_CAP, DEFAULT_ENDPOINT,
    MIN_INTERVAL_SECS,
};

// Re-export parser functions
pub use parser::{load_config, load_config_or_default, parse_config};
