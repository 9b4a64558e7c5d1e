//! Query handling for the GDELT DOC API
//!
//! This module turns the user's keyword expression into the API's query
//! grammar and renders per-window request URLs.

mod encode;
mod request;

pub use encode::{encode_keywords, percent_encode};
pub use request::ApiRequest;

use crate::{InputError, InputResult};

/// Default `sourcelang` filter
pub const DEFAULT_LANGUAGE: &str = "eng";

/// An immutable search: ordered keywords plus a source language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    keywords: Vec<String>,
    language: String,
}

impl Query {
    /// Parses a keyword expression
    ///
    /// Commas separate alternatives (OR); spaces inside a term are kept and
    /// end up as a phrase. Terms are kept verbatim, including surrounding
    /// whitespace, to stay byte-compatible with existing result files.
    ///
    /// # Examples
    ///
    /// ```
    /// use gdelt_harvest::query::Query;
    ///
    /// let query = Query::parse("war,peace", "eng").unwrap();
    /// assert_eq!(query.keywords(), &["war".to_string(), "peace".to_string()]);
    /// ```
    pub fn parse(expression: &str, language: &str) -> InputResult<Self> {
        if expression.trim().is_empty() {
            return Err(InputError::EmptyKeywords);
        }

        Ok(Self {
            keywords: expression.split(',').map(str::to_string).collect(),
            language: language.to_string(),
        })
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Encoded keyword expression, without the language filter
    pub fn encoded_keywords(&self) -> String {
        encode_keywords(&self.keywords)
    }

    /// Value of the `query` parameter, before URL normalization
    pub fn api_fragment(&self) -> String {
        format!(
            "{}%20sourcelang:{}",
            self.encoded_keywords(),
            self.language
        )
    }
}
