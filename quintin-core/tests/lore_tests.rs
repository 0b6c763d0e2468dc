// Tests for lore index loading and snippet fetching

use quintin_core::lore::{LoreError, LoreIndex};
use quintin_scanner::Crawler;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LONG_A: &str = "The Sunken Tankard was raised on the bones of a drowned galleon.";
const LONG_B: &str = "Quintin has poured ale there since before the second flood came.";

fn index_for(server: &MockServer) -> LoreIndex {
    LoreIndex::from_json(&format!(
        r#"{{"tankard": "{0}/tankard", "flood": "{0}/flood"}}"#,
        server.uri()
    ))
    .unwrap()
}

#[test]
fn test_load_from_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, r#"{{"stew": "https://lore.test/stew", "kings": "https://lore.test/kings"}}"#)?;

    let index = LoreIndex::load(file.path())?;

    assert_eq!(index.len(), 2);
    assert_eq!(index.topics().collect::<Vec<_>>(), vec!["kings", "stew"]);
    Ok(())
}

#[test]
fn test_load_missing_file() {
    let result = LoreIndex::load(std::path::Path::new("/definitely/not/here.json"));
    assert!(matches!(result, Err(LoreError::Io(_))));
}

#[tokio::test]
async fn test_fetch_lore_returns_long_paragraphs_only() {
    let server = MockServer::start().await;
    let body = format!(
        "<html><head><title>Tankard</title></head><body><h1>Tankard</h1><p>{}</p><p>{}</p><p>short</p></body></html>",
        LONG_A, LONG_B
    );
    Mock::given(method("GET"))
        .and(path("/tankard"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let index = index_for(&server);
    let crawler = Crawler::new().unwrap();
    let mut rng = StdRng::seed_from_u64(42);

    let snippet = index.fetch_lore(&crawler, "Tankard", &mut rng).await.unwrap();

    let parts: Vec<&str> = snippet.split("\n\n").collect();
    assert_eq!(parts.len(), 2);
    assert!(parts.contains(&LONG_A));
    assert!(parts.contains(&LONG_B));
    assert!(!snippet.contains("short"));
}

#[tokio::test]
async fn test_fetch_lore_unknown_topic() {
    let server = MockServer::start().await;
    let index = index_for(&server);
    let crawler = Crawler::new().unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let err = index.fetch_lore(&crawler, "dragons", &mut rng).await.unwrap_err();

    assert!(matches!(err, LoreError::UnknownTopic(ref t) if t == "dragons"));
    assert_eq!(err.to_string(), "No entry found for 'dragons' in the lore index.");
}

#[tokio::test]
async fn test_fetch_lore_bad_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flood"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let index = index_for(&server);
    let crawler = Crawler::new().unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let err = index.fetch_lore(&crawler, "flood", &mut rng).await.unwrap_err();

    assert!(matches!(err, LoreError::Status { status: 503, .. }));
    assert_eq!(err.to_string(), "Couldn't load flood lore: 503");
}

#[tokio::test]
async fn test_fetch_lore_requires_ok_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tankard"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let index = index_for(&server);
    let crawler = Crawler::new().unwrap();
    let mut rng = StdRng::seed_from_u64(1);

    let err = index.fetch_lore(&crawler, "Tankard", &mut rng).await.unwrap_err();

    assert!(matches!(err, LoreError::Status { status: 204, ref topic } if topic == "tankard"));
}
