//! Integration tests for the knowledge-base importer
//!
//! Output files are produced by the crawler's own writer so the frontmatter
//! contract between the two halves is exercised end to end.

use serde_json::json;
use sitemap_reader::config::parse_config;
use sitemap_reader::crawler::PageRecord;
use sitemap_reader::knowledge_base::{Importer, KnowledgeBaseClient};
use sitemap_reader::output::ContentWriter;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DATASET: &str = "ds-1";

fn write_pages(dir: &Path) {
    let writer = ContentWriter::new(dir);
    let pages = [
        PageRecord::new(
            "https://example.com/a",
            "https://example.com/a",
            "Page A",
            "# A\n\nFirst page",
            1_700_000_000,
        )
        .with_description("About A"),
        PageRecord::new(
            "https://example.com/b",
            "https://example.com/b",
            "Page B",
            "# B",
            1_700_000_100,
        ),
        PageRecord::new(
            "https://example.com/broken",
            "https://example.com/broken",
            "Broken",
            "# Broken",
            1_700_000_200,
        ),
        PageRecord::new(
            "https://example.com/empty",
            "https://example.com/empty",
            "Empty",
            "",
            1_700_000_300,
        ),
    ];
    for page in &pages {
        writer.write(page).unwrap();
    }
}

async fn mount_existing_fields(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/datasets/{}/metadata", DATASET)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "doc_metadata": [
                {"id": "f-url", "name": "source_url", "type": "string"},
                {"id": "f-domain", "name": "domain", "type": "string"},
                {"id": "f-date", "name": "crawl_date", "type": "time"},
                {"id": "f-desc", "name": "description", "type": "string"}
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_created(server: &MockServer, name: &str, id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/datasets/{}/document/create-by-text", DATASET)))
        .and(body_partial_json(json!({"name": name})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "document": {"id": id, "name": name}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_import_directory_replaces_skips_and_collects_failures() {
    let server = MockServer::start().await;
    mount_existing_fields(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/datasets/{}/documents", DATASET)))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"id": "old-a", "name": "Page A"}],
            "has_more": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/v1/datasets/{}/documents/old-a", DATASET)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    mount_created(&server, "Page A", "doc-a").await;
    mount_created(&server, "Page B", "doc-b").await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/datasets/{}/document/create-by-text", DATASET)))
        .and(body_partial_json(json!({"name": "Broken"})))
        .respond_with(ResponseTemplate::new(500).set_body_string("indexing queue full"))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/v1/datasets/{}/documents/metadata", DATASET)))
        .and(header("authorization", "Bearer kb-key"))
        .and(body_partial_json(json!({"operation_data": [{"document_id": "doc-a"}]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": "success"})))
        .expect(1)
        .mount(&server)
        .await;
    // Metadata failures do not fail the file
    Mock::given(method("POST"))
        .and(path(format!("/v1/datasets/{}/documents/metadata", DATASET)))
        .and(body_partial_json(json!({"operation_data": [{"document_id": "doc-b"}]})))
        .respond_with(ResponseTemplate::new(400))
        .expect(1)
        .mount(&server)
        .await;

    let tmp = TempDir::new().unwrap();
    write_pages(tmp.path());

    let mut client = KnowledgeBaseClient::new(&server.uri(), "kb-key").unwrap();
    client.set_dataset(DATASET);
    let fields = client.ensure_metadata_fields(true).await.unwrap();
    assert_eq!(fields.len(), 4);

    let summary = Importer::new(&client, fields)
        .with_pause(Duration::ZERO)
        .import_directory(tmp.path())
        .await
        .unwrap();

    assert_eq!(
        summary.imported,
        vec![
            tmp.path().join("example.com_a.md"),
            tmp.path().join("example.com_b.md"),
        ]
    );
    assert_eq!(summary.skipped, vec![tmp.path().join("example.com_empty.md")]);
    assert_eq!(summary.failed.len(), 1);
    assert_eq!(summary.failed[0].0, tmp.path().join("example.com_broken.md"));
    assert!(summary.failed[0].1.contains("500"));
}

#[tokio::test]
async fn test_language_field_created_outside_eu_mode() {
    let server = MockServer::start().await;
    mount_existing_fields(&server).await;
    Mock::given(method("POST"))
        .and(path(format!("/v1/datasets/{}/metadata", DATASET)))
        .and(body_partial_json(json!({"name": "language", "type": "string"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "f-lang", "name": "language", "type": "string"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = KnowledgeBaseClient::new(&server.uri(), "kb-key")
        .unwrap()
        .with_dataset(DATASET);
    let fields = client.ensure_metadata_fields(false).await.unwrap();

    assert_eq!(fields.get("language").map(String::as_str), Some("f-lang"));
    assert_eq!(fields.len(), 5);
}

#[tokio::test]
async fn test_create_dataset_then_configure_retrieval() {
    let server = MockServer::start().await;

    let config = parse_config(&format!(
        r#"
[crawl]
target = "https://example.com/sitemap.xml"

[knowledge-base]
base-url = "{}"
api-key = "kb-key"
name = "Example Docs"
search-method = "hybrid_search"
weights = 0.7
"#,
        server.uri()
    ))
    .unwrap();
    let kb = config.knowledge_base.expect("knowledge-base section");

    Mock::given(method("POST"))
        .and(path("/v1/datasets"))
        .and(body_partial_json(json!({"name": "Example Docs"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "ds-new", "name": "Example Docs"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/v1/datasets/ds-new"))
        .and(body_partial_json(json!({
            "retrieval_model": {
                "search_method": "hybrid_search",
                "reranking_mode": "weighted_score",
                "weights": {
                    "vector_setting": {"vector_weight": 0.7},
                    "keyword_setting": {"keyword_weight": 0.3}
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "ds-new"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = KnowledgeBaseClient::new(&kb.base_url, "kb-key").unwrap();
    let id = client.create_dataset(&kb).await.unwrap();
    client.update_retrieval_model(&id, &kb).await.unwrap();

    assert_eq!(id, "ds-new");
}

#[tokio::test]
async fn test_import_missing_directory_fails() {
    let client = KnowledgeBaseClient::new("http://127.0.0.1:1", "kb-key")
        .unwrap()
        .with_dataset(DATASET);
    let tmp = TempDir::new().unwrap();

    let result = Importer::new(&client, Default::default())
        .import_directory(&tmp.path().join("missing"))
        .await;

    assert!(result.is_err());
}
