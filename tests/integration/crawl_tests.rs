//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for both the sitemap host and the
//! reader API, and run the full crawl cycle against a temporary output root.

use serde_json::json;
use sitemap_reader::config::{Config, CrawlConfig, OutputConfig, ReaderConfig};
use sitemap_reader::crawler::{run_crawl, Coordinator, ReaderClient};
use sitemap_reader::output::parse_document;
use sitemap_reader::{CrawlerError, RunState};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing both collaborators at `server`
fn create_test_config(server: &MockServer, target: &str, root: &Path) -> Config {
    Config {
        reader: ReaderConfig {
            endpoint: Some(format!("{}/", server.uri())),
            retry_count: 0,
            request_timeout: 5,
            ..ReaderConfig::default()
        },
        crawl: CrawlConfig {
            target: target.to_string(),
            start_index: 1,
            min_delay: 0.0,
            max_delay: 0.0,
            crawler_timeout: 0,
            live_report: false,
        },
        output: OutputConfig {
            root: root.display().to_string(),
            directory: "site".to_string(),
        },
        knowledge_base: None,
    }
}

fn sitemap(urls: &[&str]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
"#,
    );
    for url in urls {
        xml.push_str(&format!("  <url><loc>{}</loc></url>\n", url));
    }
    xml.push_str("  <url><loc>   </loc></url>\n</urlset>\n");
    xml
}

async fn mount_sitemap(server: &MockServer, urls: &[&str]) -> String {
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(sitemap(urls)))
        .mount(server)
        .await;
    format!("{}/sitemap.xml", server.uri())
}

fn reader_page(url: &str, title: &str, content: &str) -> serde_json::Value {
    json!({
        "code": 200,
        "data": {"title": title, "content": content, "url": url}
    })
}

async fn mount_page(server: &MockServer, url: &str, title: &str) {
    Mock::given(method("POST"))
        .and(path("/"))
        .and(body_json(json!({"url": url})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reader_page(url, title, &format!("# {}", title))),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_from_sitemap() {
    let server = MockServer::start().await;
    let target = mount_sitemap(
        &server,
        &[
            "https://www.example.com/",
            "https://www.example.com/docs/intro",
            "https://www.example.com/blog",
        ],
    )
    .await;

    mount_page(&server, "https://www.example.com/", "Home").await;
    mount_page(&server, "https://www.example.com/blog", "Blog").await;

    // First answer is a cached render; the forced fresh request gets new content
    let mut cached = reader_page("https://www.example.com/docs/intro", "Intro", "old text");
    cached["warning"] = json!("This is a cached snapshot of the page");
    Mock::given(method("POST"))
        .and(body_json(json!({"url": "https://www.example.com/docs/intro"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(cached))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_json(json!({"url": "https://www.example.com/docs/intro"})))
        .and(header("x-no-cache", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reader_page(
            "https://www.example.com/docs/intro",
            "Intro",
            "fresh text",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&server, &target, tmp.path());

    let report = run_crawl(config, "test-hash").await.unwrap().expect("crawl ran");

    assert_eq!(report.succeeded.len(), 3);
    assert!(report.failed.is_empty());
    assert_eq!(report.summary.status, RunState::Completed);

    let site = tmp.path().join("site");
    let intro = fs::read_to_string(site.join("example.com_docs_intro.md")).unwrap();
    let doc = parse_document(&intro);
    assert_eq!(doc.title(), Some("Intro"));
    assert_eq!(doc.get("domain"), Some("example.com"));
    assert_eq!(doc.get("source_url"), Some("https://www.example.com/docs/intro"));
    assert_eq!(doc.body, "fresh text");

    assert!(site.join("example.com_index.md").is_file());
    assert!(site.join("example.com_blog.md").is_file());
    assert!(!site.join("failed_urls.txt").exists());

    let summary = fs::read_to_string(site.join("crawl_summary.txt")).unwrap();
    assert!(summary.contains("Status: completed\n"));
    assert!(summary.contains("Config hash: test-hash\n"));
    assert!(summary.contains("Total URLs processed: 3\n"));
    assert!(summary.contains("Success rate: 100.0%\n"));
}

#[tokio::test]
async fn test_sitemap_failure_aborts_before_fetching() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let target = format!("{}/sitemap.xml", server.uri());
    let config = create_test_config(&server, &target, tmp.path());

    let result = run_crawl(config, "hash").await;

    assert!(matches!(result, Err(CrawlerError::Sitemap(_))));
    assert!(!tmp.path().join("site").exists());
}

#[tokio::test]
async fn test_malformed_sitemap_aborts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<urlset><url>"))
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let target = format!("{}/sitemap.xml", server.uri());
    let result = run_crawl(create_test_config(&server, &target, tmp.path()), "hash").await;

    assert!(matches!(result, Err(CrawlerError::Sitemap(_))));
}

#[tokio::test]
async fn test_empty_sitemap_writes_nothing() {
    let server = MockServer::start().await;
    let target = mount_sitemap(&server, &[]).await;

    let tmp = TempDir::new().unwrap();
    let result = run_crawl(create_test_config(&server, &target, tmp.path()), "hash").await;

    assert!(result.unwrap().is_none());
    assert!(!tmp.path().join("site").exists());
}

#[tokio::test]
async fn test_single_page_target() {
    let server = MockServer::start().await;
    mount_page(&server, "https://docs.example.org/guide/", "Guide").await;

    let tmp = TempDir::new().unwrap();
    let config = create_test_config(&server, "https://docs.example.org/guide/", tmp.path());

    let report = run_crawl(config, "hash").await.unwrap().expect("crawl ran");

    assert_eq!(report.succeeded, vec!["https://docs.example.org/guide/"]);
    assert!(tmp.path().join("site/docs.example.org_guide.md").is_file());
}

#[tokio::test]
async fn test_failed_urls_report_after_retries() {
    let server = MockServer::start().await;
    let target = mount_sitemap(
        &server,
        &["https://example.com/ok", "https://example.com/broken"],
    )
    .await;
    mount_page(&server, "https://example.com/ok", "Ok").await;
    Mock::given(method("POST"))
        .and(body_json(json!({"url": "https://example.com/broken"})))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &target, tmp.path());
    config.reader.retry_count = 1;

    let reader = ReaderClient::new(&config.reader)
        .unwrap()
        .with_backoff(Duration::from_millis(10), Duration::from_millis(10));
    let report = Coordinator::new(config, "hash")
        .unwrap()
        .with_reader(reader)
        .run()
        .await
        .unwrap()
        .expect("crawl ran");

    assert_eq!(report.succeeded, vec!["https://example.com/ok"]);
    assert_eq!(report.failed, vec!["https://example.com/broken"]);

    let failed = fs::read_to_string(tmp.path().join("site/failed_urls.txt")).unwrap();
    assert!(failed.starts_with("# Failed URLs Report\nGenerated: "));
    assert!(failed.contains("Total failed: 1\n\nhttps://example.com/broken\n"));

    let summary = fs::read_to_string(tmp.path().join("site/crawl_summary.txt")).unwrap();
    assert!(summary.contains("Success rate: 50.0%\n"));
}

#[tokio::test]
async fn test_duplicate_titles_grouped_and_reported() {
    let server = MockServer::start().await;
    let target = mount_sitemap(
        &server,
        &[
            "https://example.com/a",
            "https://example.com/b",
            "https://example.com/c",
        ],
    )
    .await;
    mount_page(&server, "https://example.com/a", "A").await;
    mount_page(&server, "https://example.com/b", "A").await;
    mount_page(&server, "https://example.com/c", "B").await;

    let tmp = TempDir::new().unwrap();
    let report = run_crawl(create_test_config(&server, &target, tmp.path()), "hash")
        .await
        .unwrap()
        .expect("crawl ran");

    let duplicates = report.summary.duplicates.expect("duplicate pass ran");
    assert_eq!(duplicates.unique, 1);
    assert_eq!(duplicates.duplicate_files(), 2);
    assert_eq!(duplicates.groups["A"].moved, 2);

    let site = tmp.path().join("site");
    assert!(site.join("a/example.com_a.md").is_file());
    assert!(site.join("a/example.com_b.md").is_file());
    assert!(site.join("example.com_c.md").is_file());

    let summary = fs::read_to_string(site.join("crawl_summary.txt")).unwrap();
    assert!(summary.contains("Unique pages: 1\n"));
    assert!(summary.contains("Duplicate files: 2\n"));
}

#[tokio::test]
async fn test_start_index_at_end_processes_one_url() {
    let server = MockServer::start().await;
    let target = mount_sitemap(
        &server,
        &["https://example.com/1", "https://example.com/2", "https://example.com/3"],
    )
    .await;
    mount_page(&server, "https://example.com/3", "Three").await;

    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &target, tmp.path());
    config.crawl.start_index = 3;

    let report = run_crawl(config, "hash").await.unwrap().expect("crawl ran");

    assert_eq!(report.succeeded, vec!["https://example.com/3"]);
    assert_eq!(report.summary.start_index, 3);
    assert_eq!(report.summary.total_urls, 3);
}

#[tokio::test]
async fn test_start_index_past_end_aborts() {
    let server = MockServer::start().await;
    let target = mount_sitemap(&server, &["https://example.com/1"]).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &target, tmp.path());
    config.crawl.start_index = 2;

    let result = run_crawl(config, "hash").await;

    assert!(matches!(
        result,
        Err(CrawlerError::InvalidStartIndex { index: 2, total: 1 })
    ));
}

#[tokio::test]
async fn test_dry_run_plan_lists_pending_urls() {
    let server = MockServer::start().await;
    let target = mount_sitemap(
        &server,
        &["https://example.com/1", "https://example.com/2"],
    )
    .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    let mut config = create_test_config(&server, &target, tmp.path());
    config.crawl.start_index = 2;

    let urls = Coordinator::new(config, "hash").unwrap().plan().await.unwrap();

    assert_eq!(urls, vec!["https://example.com/2"]);
}
