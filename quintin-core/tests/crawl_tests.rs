// Tests for crawl orchestration and the crawl summary

use quintin_core::crawl::{CrawlOptions, execute_crawl, extract_url_path, generate_crawl_summary};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// URL Path Extraction Tests
// ============================================================================

#[test]
fn test_extract_url_path_root() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
    assert_eq!(extract_url_path("http://example.com"), "/");
}

#[test]
fn test_extract_url_path_nested() {
    assert_eq!(extract_url_path("http://example.com/lore/kings"), "/lore/kings");
}

#[test]
fn test_extract_url_path_with_query_and_fragment() {
    assert_eq!(extract_url_path("http://example.com/stew?key=value#top"), "/stew");
}

#[test]
fn test_extract_url_path_with_port() {
    assert_eq!(extract_url_path("http://localhost:3000/menu"), "/menu");
}

#[test]
fn test_extract_url_path_with_trailing_slash() {
    assert_eq!(extract_url_path("http://example.com/lore/"), "/lore/");
}

#[test]
fn test_extract_url_path_invalid_url() {
    let url = "not a valid url";
    // Should return original string for invalid URLs
    assert_eq!(extract_url_path(url), url);
}

// ============================================================================
// Crawl Execution Tests
// ============================================================================

async fn lore_site() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(
                    r#"<html><head><title>Sordia</title></head><body>
                        <a href="/taverns">Taverns</a>
                        <a href="/missing">Missing</a>
                    </body></html>"#,
                ),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/taverns"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<title>Taverns</title><p>The Sunken Tankard</p>"),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_execute_crawl_reports_progress() {
    let server = lore_site().await;

    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let callback = Arc::new(move |url: String| {
        seen_clone.lock().unwrap().push(url);
    });

    let report = execute_crawl(CrawlOptions::new(server.uri()), Some(callback))
        .await
        .unwrap();

    assert_eq!(report.pages_recorded(), 2);
    assert_eq!(report.pages_failed(), 1);
    assert_eq!(seen.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_execute_crawl_honours_page_cap() {
    let server = lore_site().await;

    let mut options = CrawlOptions::new(server.uri());
    options.max_pages = Some(1);

    let report = execute_crawl(options, None).await.unwrap();

    assert_eq!(report.visited.len(), 1);
    assert_eq!(report.unvisited, 2);
}

#[tokio::test]
async fn test_execute_crawl_rejects_bad_seed() {
    let result = execute_crawl(CrawlOptions::new("mailto:quintin@example.test"), None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_summary_lists_pages_and_failures() {
    let server = lore_site().await;
    let report = execute_crawl(CrawlOptions::new(server.uri()), None)
        .await
        .unwrap();

    let summary = generate_crawl_summary(&report);

    assert!(summary.contains("Pages recorded: 2"));
    assert!(summary.contains("Pages failed: 1"));
    assert!(summary.contains("200 /taverns  Taverns"));
    assert!(summary.contains("ERR /missing"));
    assert!(summary.contains("404"));
    assert!(!summary.contains("Left unvisited"));
}
