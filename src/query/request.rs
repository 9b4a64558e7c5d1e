//! Request URL construction for `ArtList` calls

use crate::query::Query;
use crate::range::TimeRange;
use url::Url;

/// The part of an API request that stays fixed for a whole crawl
///
/// Only the time window changes between calls; everything else is rendered
/// once into `base`.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    base: String,
}

impl ApiRequest {
    /// Builds the request template
    ///
    /// # Arguments
    ///
    /// * `endpoint` - DOC API endpoint
    /// * `query` - The encoded keywords and language
    /// * `max_records` - Value of `maxrecords`
    /// * `sort_by_date` - Adds `sort=DateAsc` (used by the recursive strategy)
    pub fn new(endpoint: &str, query: &Query, max_records: usize, sort_by_date: bool) -> Self {
        let sort = if sort_by_date { "&sort=DateAsc" } else { "" };
        let base = format!(
            "{}?query={}&mode=ArtList&maxrecords={}{}&format=json",
            endpoint,
            query.api_fragment(),
            max_records,
            sort
        );
        Self { base }
    }

    /// Returns the URL for one window
    ///
    /// `Url::parse` escapes the literal quotes and spaces of the keyword
    /// grammar while keeping existing percent escapes.
    pub fn url_for(&self, range: &TimeRange) -> Result<Url, url::ParseError> {
        Url::parse(&format!(
            "{}&startdatetime={}&enddatetime={}",
            self.base,
            range.gdelt_start(),
            range.gdelt_end()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range::parse_timestamp;

    fn window() -> TimeRange {
        TimeRange::new(
            parse_timestamp("2020-01-01").unwrap(),
            parse_timestamp("2020-01-02 12:00:00").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_recursive_request_url() {
        let query = Query::parse("war,peace", "eng").unwrap();
        let request = ApiRequest::new("https://api.gdeltproject.org/api/v2/doc/doc", &query, 250, true);
        let url = request.url_for(&window()).unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.gdeltproject.org/api/v2/doc/doc?query=(%22war%22%20OR%20%22peace%22)%20sourcelang:eng&mode=ArtList&maxrecords=250&sort=DateAsc&format=json&startdatetime=20200101000000&enddatetime=20200102120000"
        );
    }

    #[test]
    fn test_iterative_request_has_no_sort() {
        let query = Query::parse("war", "eng").unwrap();
        let request = ApiRequest::new("https://api.gdeltproject.org/api/v2/doc/doc", &query, 250, false);
        let url = request.url_for(&window()).unwrap();

        assert!(!url.as_str().contains("sort="));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("query".to_string(), "war sourcelang:eng".to_string())));
        assert!(pairs.contains(&("mode".to_string(), "ArtList".to_string())));
        assert!(pairs.contains(&("format".to_string(), "json".to_string())));
        assert!(pairs.contains(&("startdatetime".to_string(), "20200101000000".to_string())));
        assert!(pairs.contains(&("enddatetime".to_string(), "20200102120000".to_string())));
    }

    #[test]
    fn test_quoted_phrase_decodes_to_phrase_search() {
        let query = Query::parse("climate change", "fra").unwrap();
        let request = ApiRequest::new("http://localhost/doc", &query, 250, true);
        let url = request.url_for(&window()).unwrap();

        let query_value = url
            .query_pairs()
            .find(|(k, _)| k == "query")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(query_value, "\"climate change\" sourcelang:fra");
    }
}
