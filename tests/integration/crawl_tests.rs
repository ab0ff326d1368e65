//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from configuration to files on disk.

use std::path::Path;
use std::sync::Arc;
use sumi_scribe::config::{parse_config, FetchConfig};
use sumi_scribe::crawler::{crawl, CrawlPhase, CrawlSettings, Coordinator, Seed};
use sumi_scribe::fetch::HttpEngine;
use sumi_scribe::output::FailureKind;
use sumi_scribe::ScribeError;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn engine() -> Arc<HttpEngine> {
    let config = FetchConfig {
        request_timeout_secs: 5,
        connect_timeout_secs: 2,
        ..FetchConfig::default()
    };
    Arc::new(HttpEngine::new(&config).expect("Failed to build HTTP engine"))
}

fn settings(seed: Seed, out: &Path) -> CrawlSettings {
    CrawlSettings {
        output_dir: out.to_path_buf(),
        max_concurrency: 4,
        ..CrawlSettings::new(seed)
    }
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<h1>Home</h1>
           <a href="/page1">Page 1</a>
           <a href="/page2">Page 2</a>
           <a href="https://external.example.org/elsewhere">External</a>"#,
    )
    .await;
    mount_page(&mock_server, "/page1", "<h1>Page One</h1><p>First page.</p>").await;
    mount_page(&mock_server, "/page2", "<h1>Page Two</h1><p>Second page.</p>").await;

    let config = parse_config(&format!(
        r#"
[seed]
domain = "{}/"

[crawler]
max-concurrency = 2

[fetch]
request-timeout-secs = 5

[output]
directory = "{}"
"#,
        base_url,
        out.path().display()
    ))
    .expect("Failed to parse config");

    let summary = crawl(config, Some("hash".to_string()), CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(summary.phase, CrawlPhase::Completed);
    assert_eq!(summary.succeeded(), 3);
    assert!(summary.is_clean());
    assert_eq!(summary.config_hash.as_deref(), Some("hash"));

    for name in ["index.md", "page1.md", "page2.md"] {
        assert!(out.path().join(name).exists(), "{} was not written", name);
    }

    let page1 = std::fs::read_to_string(out.path().join("page1.md")).unwrap();
    assert!(page1.starts_with(&format!("---\nURL: {}/page1\n---\n\n", base_url)));
    assert!(page1.contains("Page One"));
}

#[tokio::test]
async fn test_out_of_scope_links_not_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/docs/",
        r#"<a href="/docs/intro">Intro</a><a href="/blog/post">Blog</a>"#,
    )
    .await;
    mount_page(&mock_server, "/docs/intro", "<p>Intro</p>").await;
    Mock::given(method("GET"))
        .and(path("/blog/post"))
        .respond_with(html("<p>Blog</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(
        settings(Seed::Domain(format!("{}/docs/", base_url)), out.path()),
        engine(),
    )
    .unwrap();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.succeeded(), 2);
    assert!(out.path().join("docs.md").exists());
    assert!(out.path().join("docs_intro.md").exists());
}

#[tokio::test]
async fn test_failed_page_is_reported() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/good">Good</a><a href="/broken">Broken</a>"#,
    )
    .await;
    mount_page(&mock_server, "/good", "<p>Fine</p>").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(
        settings(Seed::Domain(format!("{}/", base_url)), out.path()),
        engine(),
    )
    .unwrap();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.phase, CrawlPhase::Completed);
    assert_eq!(summary.succeeded(), 2);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.failures[0].url, format!("{}/broken", base_url));
    assert_eq!(summary.failures[0].kind, FailureKind::PageFetch);
    assert_eq!(summary.failures[0].reason, "HTTP 500");
    assert!(!out.path().join("broken.md").exists());
}

#[tokio::test]
async fn test_list_mode_fetches_each_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<p>A</p><a href="/c">C</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<p>B</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html("<p>C</p>"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let urls = vec![
        format!("{}/a", base_url),
        format!("{}/a#section", base_url),
        format!("{}/b", base_url),
    ];
    let mut coordinator =
        Coordinator::new(settings(Seed::List(urls), out.path()), engine()).unwrap();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.succeeded(), 2);
    assert!(out.path().join("a.md").exists());
    assert!(out.path().join("b.md").exists());
}

#[tokio::test]
async fn test_seed_not_found_fails_early() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(
        settings(Seed::Domain(format!("{}/", base_url)), out.path()),
        engine(),
    )
    .unwrap();
    let result = coordinator.run().await;

    match result {
        Err(ScribeError::SeedFetch { reason, .. }) => assert_eq!(reason, "HTTP 404"),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("crawl should fail when the seed is missing"),
    }
    assert_eq!(coordinator.phase(), CrawlPhase::FailedEarly);
}

#[tokio::test]
async fn test_cache_bypass_headers_sent() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/fresh"))
        .and(header("cache-control", "no-cache"))
        .and(header("pragma", "no-cache"))
        .respond_with(html("<p>Fresh</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(
        settings(Seed::List(vec![format!("{}/fresh", base_url)]), out.path()),
        engine(),
    )
    .unwrap();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert!(summary.is_clean());
    assert!(out.path().join("fresh.md").exists());
}

#[tokio::test]
async fn test_non_html_page_is_a_failure() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"))
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(
        settings(Seed::List(vec![format!("{}/logo.png", base_url)]), out.path()),
        engine(),
    )
    .unwrap();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.failed(), 1);
    assert!(summary.failures[0]
        .reason
        .starts_with("unsupported content type"));
}

#[tokio::test]
async fn test_textless_seed_still_crawls_its_links() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let out = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        r#"<script>document.title = "app";</script><a href="/a"></a><a href="/b"></a>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<h1>Page A</h1>"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("<h1>Page B</h1>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(
        settings(Seed::Domain(format!("{}/", base_url)), out.path()),
        engine(),
    )
    .unwrap();
    let summary = coordinator.run().await.expect("Crawl failed");

    assert_eq!(summary.phase, CrawlPhase::Completed);
    assert!(out.path().join("a.md").exists());
    assert!(out.path().join("b.md").exists());
    assert!(summary
        .failures
        .iter()
        .all(|f| f.kind == FailureKind::EmptyContent));
}
