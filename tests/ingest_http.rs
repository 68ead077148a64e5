// tests/ingest_http.rs
use mockito::Matcher;
use std::time::Duration;
use tsml_meetings::ingest::fetch_feed;
use tsml_meetings::ingest::providers::{JsonFileProvider, TsmlHttpProvider};
use tsml_meetings::ingest::types::FeedProvider;

const BODY: &str = r#"[{"name":"A","day":1,"conference_url":"https://zoom.us/j/1"},{"name":"B"}]"#;

fn provider(feed_url: String, proxy_url: Option<String>) -> TsmlHttpProvider {
    TsmlHttpProvider::new(feed_url, proxy_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn direct_fetch_decodes_records() {
    let mut server = mockito::Server::new_async().await;
    let m = server
        .mock("GET", "/tsml-cache.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(BODY)
        .create_async()
        .await;

    let p = provider(format!("{}/tsml-cache.json", server.url()), None);
    let feed = fetch_feed(&p).await.unwrap();
    assert_eq!(feed.len(), 2);
    assert_eq!(feed.records[0].display_name(), "A");
    m.assert_async().await;
}

#[tokio::test]
async fn proxy_receives_feed_url_as_query() {
    let mut server = mockito::Server::new_async().await;
    let target = "https://www.example.org/wp-content/tsml-cache.json";
    let m = server
        .mock("GET", "/api/proxy")
        .match_query(Matcher::UrlEncoded("url".into(), target.into()))
        .with_status(200)
        .with_body(BODY)
        .create_async()
        .await;

    let p = provider(target.to_string(), Some(format!("{}/api/proxy", server.url())));
    let raw = p.fetch_raw().await.unwrap();
    assert_eq!(raw.len(), 2);
    m.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_fatal() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/feed.json")
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let p = provider(format!("{}/feed.json", server.url()), None);
    let err = fetch_feed(&p).await.unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("502"), "{msg}");
    assert!(msg.contains("tsml-http"), "{msg}");
}

#[tokio::test]
async fn object_body_is_rejected() {
    let mut server = mockito::Server::new_async().await;
    let _m = server
        .mock("GET", "/feed.json")
        .with_status(200)
        .with_body(r#"{"error":"rate limited"}"#)
        .create_async()
        .await;

    let p = provider(format!("{}/feed.json", server.url()), None);
    let msg = format!("{:#}", fetch_feed(&p).await.unwrap_err());
    assert!(msg.contains("not an array (got object)"), "{msg}");
}

#[tokio::test]
async fn empty_feed_is_fatal() {
    let p = JsonFileProvider::from_fixture("[]");
    let msg = format!("{:#}", fetch_feed(&p).await.unwrap_err());
    assert!(msg.contains("no meetings data received"), "{msg}");
}

#[tokio::test]
async fn file_provider_reads_from_disk() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("feed.json");
    std::fs::write(&path, include_str!("fixtures/tsml_sample.json")).unwrap();

    let feed = fetch_feed(&JsonFileProvider::from_path(&path)).await.unwrap();
    assert_eq!(feed.raw.len(), 8);
    assert_eq!(feed.records.len(), 7);

    let missing = JsonFileProvider::from_path(tmp.path().join("nope.json"));
    assert!(fetch_feed(&missing).await.is_err());
}
