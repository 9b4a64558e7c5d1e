//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the GDELT DOC API and run the
//! full crawl cycle end-to-end, down to the CSV file on disk.

use gdelt_harvest::config::Config;
use gdelt_harvest::crawler::{run_crawl, CrawlJob, Strategy};
use gdelt_harvest::query::Query;
use gdelt_harvest::range::{parse_timestamp, Frequency, TimeRange};
use gdelt_harvest::{FetchError, HarvestError};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockBuilder, MockServer, ResponseTemplate};

const API_PATH: &str = "/api/v2/doc/doc";
const HEADER: &str = "Link,Mobile Link,Title,Date,Image,Domain,Language,Country";

/// Creates a test configuration pointing at the mock server, with no
/// backoff between retries
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.api.endpoint = format!("{}{}", server.uri(), API_PATH);
    config.http.backoff_factor = 0.0;
    config
}

fn create_job(from: &str, to: &str, strategy: Strategy, output: &Path) -> CrawlJob {
    CrawlJob {
        query: Query::parse("election", "eng").unwrap(),
        range: TimeRange::new(parse_timestamp(from).unwrap(), parse_timestamp(to).unwrap())
            .unwrap(),
        strategy,
        output: output.to_path_buf(),
        request_delay: Duration::ZERO,
    }
}

/// An `ArtList` payload with `n` articles seen on `day` (YYYYMMDD)
fn art_list(day: &str, n: usize) -> serde_json::Value {
    let articles: Vec<_> = (0..n)
        .map(|i| {
            json!({
                "url": format!("https://news.example/{}/{}", day, i),
                "url_mobile": format!("https://m.news.example/{}/{}", day, i),
                "title": format!("Story {}", i),
                "seendate": format!("{}T{:02}{:02}00Z", day, (i / 60) % 24, i % 60),
                "socialimage": "",
                "domain": "news.example",
                "language": "English",
                "sourcecountry": "United States"
            })
        })
        .collect();
    json!({ "articles": articles })
}

fn window(start: &str, end: &str) -> MockBuilder {
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("startdatetime", start))
        .and(query_param("enddatetime", end))
}

fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_full_window_at_cap_splits_into_two_days() {
    let server = MockServer::start().await;

    window("20200101000000", "20200103000000")
        .respond_with(ResponseTemplate::new(200).set_body_json(art_list("20200101", 250)))
        .expect(1)
        .mount(&server)
        .await;
    window("20200101000000", "20200102000000")
        .respond_with(ResponseTemplate::new(200).set_body_json(art_list("20200101", 120)))
        .expect(1)
        .mount(&server)
        .await;
    window("20200102000000", "20200103000000")
        .respond_with(ResponseTemplate::new(200).set_body_json(art_list("20200102", 130)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("results").join("election.csv");
    let config = create_test_config(&server);
    let job = create_job("2020-01-01", "2020-01-03", Strategy::Recursive, &output);

    let stats = run_crawl(&job, &config).await.unwrap();

    assert_eq!(stats.requests, 3);
    assert_eq!(stats.splits, 1);
    assert_eq!(stats.records_written, 250);

    let lines = read_lines(&output);
    assert_eq!(lines.len(), 251);
    assert_eq!(lines[0], HEADER);
    // Day one is written before day two
    assert!(lines[1].starts_with("https://news.example/20200101/0,"));
    assert!(lines[121].starts_with("https://news.example/20200102/0,"));
    assert!(lines[1].contains(",2020-01-01 00:00:00,"));
}

#[tokio::test]
async fn test_recursive_requests_are_sorted_by_date() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .and(query_param("sort", "DateAsc"))
        .and(query_param("mode", "ArtList"))
        .and(query_param("maxrecords", "250"))
        .and(query_param("format", "json"))
        .and(query_param("query", "election sourcelang:eng"))
        .respond_with(ResponseTemplate::new(200).set_body_json(art_list("20200101", 3)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let job = create_job("2020-01-01", "2020-01-02", Strategy::Recursive, &output);

    let stats = run_crawl(&job, &create_test_config(&server)).await.unwrap();
    assert_eq!(stats.records_written, 3);
}

#[tokio::test]
async fn test_iterative_crawl_one_call_per_day() {
    let server = MockServer::start().await;

    window("20200101000000", "20200101235959")
        .respond_with(ResponseTemplate::new(200).set_body_json(art_list("20200101", 250)))
        .expect(1)
        .mount(&server)
        .await;
    window("20200102000000", "20200102235959")
        .respond_with(ResponseTemplate::new(200).set_body_json(art_list("20200102", 10)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let job = create_job(
        "2020-01-01",
        "2020-01-02",
        Strategy::Iterative(Frequency::default()),
        &output,
    );

    let stats = run_crawl(&job, &create_test_config(&server)).await.unwrap();

    assert_eq!(stats.requests, 2);
    assert_eq!(stats.splits, 0);
    assert_eq!(stats.truncated_ranges, 1);
    assert_eq!(read_lines(&output).len(), 261);

    let requests = server.received_requests().await.unwrap();
    assert!(requests
        .iter()
        .all(|r| !r.url.query_pairs().any(|(k, _)| k == "sort")));
}

#[tokio::test]
async fn test_second_run_appends_without_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(art_list("20200101", 4)))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let config = create_test_config(&server);
    let job = create_job("2020-01-01", "2020-01-02", Strategy::Recursive, &output);

    run_crawl(&job, &config).await.unwrap();
    run_crawl(&job, &config).await.unwrap();

    let lines = read_lines(&output);
    assert_eq!(lines.len(), 9);
    assert_eq!(lines.iter().filter(|l| l.as_str() == HEADER).count(), 1);
}

#[tokio::test]
async fn test_empty_result_still_writes_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let job = create_job("2020-01-01", "2020-01-02", Strategy::Recursive, &output);

    let stats = run_crawl(&job, &create_test_config(&server)).await.unwrap();

    assert_eq!(stats.records_written, 0);
    assert_eq!(read_lines(&output), vec![HEADER.to_string()]);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;

    // Mounted first, so it answers until its budget runs out
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(art_list("20200101", 5)))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let job = create_job("2020-01-01", "2020-01-02", Strategy::Recursive, &output);

    let stats = run_crawl(&job, &create_test_config(&server)).await.unwrap();

    assert_eq!(stats.requests, 1);
    assert_eq!(stats.records_written, 5);
}

#[tokio::test]
async fn test_retries_exhausted_aborts_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let mut config = create_test_config(&server);
    config.http.max_retries = 2;
    let job = create_job("2020-01-01", "2020-01-02", Strategy::Recursive, &output);

    let result = run_crawl(&job, &config).await;

    match result {
        Err(HarvestError::Fetch(FetchError::RetriesExhausted { attempts, .. })) => {
            assert_eq!(attempts, 3)
        }
        other => panic!("expected RetriesExhausted, got {:?}", other),
    }
    assert!(!output.exists());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let job = create_job("2020-01-01", "2020-01-02", Strategy::Recursive, &output);

    let result = run_crawl(&job, &create_test_config(&server)).await;
    assert!(matches!(
        result,
        Err(HarvestError::Fetch(FetchError::Status { status: 404, .. }))
    ));
}

#[tokio::test]
async fn test_malformed_payload_is_repaired() {
    let server = MockServer::start().await;

    let body: &[u8] = b"{\"articles\": [{\"url\": \"https://news.example/a\", \
        \"title\": \"Split\ntitle with C:\\path and a \x01stray byte\", \
        \"seendate\": \"20200101T083000Z\", \"domain\": \"news.example\"}]}";
    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let job = create_job("2020-01-01", "2020-01-02", Strategy::Recursive, &output);

    let stats = run_crawl(&job, &create_test_config(&server)).await.unwrap();
    assert_eq!(stats.records_written, 1);

    let lines = read_lines(&output);
    assert_eq!(
        lines[1],
        "https://news.example/a,,Splittitle with C:\\path and a stray byte,2020-01-01 08:30:00,,news.example,,"
    );
}

#[tokio::test]
async fn test_truncated_payload_aborts_crawl() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(API_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"articles\": [{\"url\""))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.csv");
    let job = create_job("2020-01-01", "2020-01-02", Strategy::Recursive, &output);

    let result = run_crawl(&job, &create_test_config(&server)).await;
    assert!(matches!(result, Err(HarvestError::Sanitize(_))));
}
