//! Article records produced by the crawler
//!
//! One `ArticleRecord` is built per item of a GDELT `ArtList` response and
//! written to the output as one CSV row.

use chrono::NaiveDateTime;

/// Column header of the output file, in row order
pub const CSV_HEADER: [&str; 8] = [
    "Link",
    "Mobile Link",
    "Title",
    "Date",
    "Image",
    "Domain",
    "Language",
    "Country",
];

/// Format of the `Date` column (also used for log lines)
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A normalized article returned by the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    /// Canonical article URL
    pub url: String,

    /// Mobile URL, empty when GDELT has none
    pub mobile_url: String,

    /// Article title
    pub title: String,

    /// When GDELT first saw the article (UTC)
    pub seen_at: NaiveDateTime,

    /// Social sharing image, empty when absent
    pub image_url: String,

    /// Publishing domain
    pub domain: String,

    /// Article language as reported by GDELT (e.g. "English")
    pub language: String,

    /// Source country as reported by GDELT
    pub source_country: String,
}

impl ArticleRecord {
    /// Returns the `Date` column value
    pub fn date_string(&self) -> String {
        self.seen_at.format(DATE_FORMAT).to_string()
    }

    /// Returns the record as CSV fields in [`CSV_HEADER`] order
    pub fn to_row(&self) -> [String; 8] {
        [
            self.url.clone(),
            self.mobile_url.clone(),
            self.title.clone(),
            self.date_string(),
            self.image_url.clone(),
            self.domain.clone(),
            self.language.clone(),
            self.source_country.clone(),
        ]
    }
}
