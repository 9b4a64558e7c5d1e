//! `ArtList` response decoding
//!
//! This module handles:
//! - Running raw bodies through the sanitizer
//! - Decoding the article list
//! - Normalizing GDELT items into `ArticleRecord`s

use crate::article::ArticleRecord;
use crate::crawler::sanitizer::sanitize;
use crate::HarvestError;
use chrono::NaiveDateTime;
use serde::Deserialize;

/// Format of GDELT's `seendate` field
pub const SEEN_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Top-level `ArtList` document
///
/// GDELT answers `{}` when nothing matched, hence the default.
#[derive(Debug, Deserialize)]
struct ArtListResponse {
    #[serde(default)]
    articles: Vec<RawArticle>,
}

/// One article as GDELT sends it
#[derive(Debug, Deserialize)]
struct RawArticle {
    url: String,
    #[serde(default)]
    url_mobile: Option<String>,
    title: String,
    seendate: String,
    #[serde(default)]
    socialimage: Option<String>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    sourcecountry: Option<String>,
}

/// Decodes a response body into normalized records
///
/// # Arguments
///
/// * `body` - Raw response bytes
/// * `max_repairs` - Repair budget handed to the sanitizer
///
/// # Returns
///
/// * `Ok(Vec<ArticleRecord>)` - Records in response order
/// * `Err(HarvestError)` - Unrepairable payload, unexpected shape, or bad `seendate`
pub fn parse_articles(body: &[u8], max_repairs: usize) -> Result<Vec<ArticleRecord>, HarvestError> {
    let sanitized = sanitize(body, max_repairs)?;
    if sanitized.repairs > 0 {
        tracing::debug!("Repaired payload by deleting {} bytes", sanitized.repairs);
    }

    let response: ArtListResponse = serde_json::from_value(sanitized.value)?;
    response.articles.into_iter().map(normalize_article).collect()
}

fn normalize_article(raw: RawArticle) -> Result<ArticleRecord, HarvestError> {
    let seen_at = NaiveDateTime::parse_from_str(&raw.seendate, SEEN_DATE_FORMAT).map_err(|source| {
        HarvestError::SeenDate {
            value: raw.seendate.clone(),
            source,
        }
    })?;

    Ok(ArticleRecord {
        url: raw.url,
        mobile_url: raw.url_mobile.unwrap_or_default(),
        title: raw.title,
        seen_at,
        image_url: raw.socialimage.unwrap_or_default(),
        domain: raw.domain.unwrap_or_default(),
        language: raw.language.unwrap_or_default(),
        source_country: raw.sourcecountry.unwrap_or_default(),
    })
}
