//! Integration tests for the REST content-API client.
//!
//! These verify the wire behavior against mock HTTP servers: pagination,
//! 404-as-empty child listings, malformed-record skipping, and attachment
//! byte downloads.

use confex_core::{ApiError, Attachment, ContentApi, ContentKind, Credentials, RestClient};
use serde_json::{Value, json};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> RestClient {
    let base = Url::parse(&server.uri()).expect("mock server URI parses");
    let credentials = Credentials {
        username: "user@example.net".to_string(),
        api_token: "token".to_string(),
    };
    RestClient::new(&base, &credentials)
}

fn page_json(id: &str, title: &str) -> Value {
    json!({"id": id, "type": "page", "title": title})
}

#[tokio::test]
async fn content_info_resolves_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_json("42", "Runbook")))
        .mount(&server)
        .await;

    let info = client_for(&server).content_info("42").await.expect("resolves");

    assert_eq!(info.kind, ContentKind::Page);
    assert_eq!(info.id, "42");
    assert_eq!(info.title, "Runbook");
}

#[tokio::test]
async fn content_info_not_found_is_http_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/404404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = client_for(&server).content_info("404404").await;

    assert!(matches!(result, Err(ApiError::HttpStatus { status: 404, .. })));
}

#[tokio::test]
async fn content_info_without_title_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "9", "type": "page"})))
        .mount(&server)
        .await;

    let result = client_for(&server).content_info("9").await;

    assert!(matches!(result, Err(ApiError::MalformedRecord { .. })));
}

#[tokio::test]
async fn space_info_resolves_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/space/ENG"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"key": "ENG", "name": "Engineering"})),
        )
        .mount(&server)
        .await;

    let space = client_for(&server).space_info("ENG").await.expect("resolves");

    assert_eq!(space.kind, ContentKind::Space);
    assert_eq!(space.id, "ENG");
    assert_eq!(space.title, "Engineering");
}

#[tokio::test]
async fn space_pages_drains_pagination() {
    let server = MockServer::start().await;

    // First batch: a full page of 25 results.
    let first: Vec<Value> = (0..25).map(|i| page_json(&format!("p{i}"), &format!("Page {i}"))).collect();
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content"))
        .and(query_param("spaceKey", "ENG"))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": first})))
        .mount(&server)
        .await;

    // Second batch: a short page ends the listing.
    let second: Vec<Value> = (25..28).map(|i| page_json(&format!("p{i}"), &format!("Page {i}"))).collect();
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content"))
        .and(query_param("spaceKey", "ENG"))
        .and(query_param("start", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": second})))
        .mount(&server)
        .await;

    let pages = client_for(&server).space_pages("ENG").await.expect("lists");

    assert_eq!(pages.len(), 28);
    assert_eq!(pages[0].id, "p0");
    assert_eq!(pages[27].id, "p27");
}

#[tokio::test]
async fn space_pages_skips_malformed_records() {
    let server = MockServer::start().await;
    let results = json!({"results": [
        page_json("1", "Good"),
        {"type": "page", "title": "No Id"},
        {"id": "3", "type": "comment", "title": "Wrong Kind"},
        page_json("4", "Also Good"),
    ]});
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results))
        .mount(&server)
        .await;

    let pages = client_for(&server).space_pages("ENG").await.expect("lists");

    let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4"]);
}

#[tokio::test]
async fn child_content_lists_pages_then_folders() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/10/child/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [page_json("11", "Child Page")]})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/10/child/folder"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"results": [{"id": "12", "type": "folder", "title": "Child Folder"}]}),
        ))
        .mount(&server)
        .await;

    let children = client_for(&server).child_content("10").await.expect("lists");

    assert_eq!(children.len(), 2);
    assert_eq!(children[0].kind, ContentKind::Page);
    assert_eq!(children[1].kind, ContentKind::Folder);
}

#[tokio::test]
async fn child_content_treats_404_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/10/child/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"results": [page_json("11", "Only Page")]})),
        )
        .mount(&server)
        .await;
    // Folders endpoint missing entirely: e.g. a plain page parent.
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/10/child/folder"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let children = client_for(&server).child_content("10").await.expect("lists");

    assert_eq!(children.len(), 1);
    assert_eq!(children[0].id, "11");
}

#[tokio::test]
async fn ancestors_come_back_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/30"))
        .and(query_param("expand", "ancestors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "30", "type": "page", "title": "Leaf",
            "ancestors": [page_json("1", "Root"), page_json("2", "Middle")]
        })))
        .mount(&server)
        .await;

    let chain = client_for(&server).ancestors("30").await.expect("lists");

    let titles: Vec<&str> = chain.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["Root", "Middle"]);
}

#[tokio::test]
async fn page_body_prefers_rendered_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "5", "type": "page", "title": "T",
            "body": {
                "view": {"value": "<p>rendered</p>"},
                "storage": {"value": "<p>storage</p>"}
            }
        })))
        .mount(&server)
        .await;

    let body = client_for(&server).page_body("5").await.expect("fetches");

    assert_eq!(body, "<p>rendered</p>");
}

#[tokio::test]
async fn page_body_falls_back_to_storage_format() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "5", "type": "page", "title": "T",
            "body": {"storage": {"value": "<p>storage only</p>"}}
        })))
        .mount(&server)
        .await;

    let body = client_for(&server).page_body("5").await.expect("fetches");

    assert_eq!(body, "<p>storage only</p>");
}

#[tokio::test]
async fn attachments_parse_metadata_and_skip_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/7/child/attachment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [
            {
                "id": "a1", "title": "design.png",
                "extensions": {"fileSize": 2048},
                "_links": {"download": "/download/attachments/7/design.png"}
            },
            {"id": "a2", "title": "no-download-link.txt"}
        ]})))
        .mount(&server)
        .await;

    let attachments = client_for(&server).attachments("7").await.expect("lists");

    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].filename, "design.png");
    assert_eq!(attachments[0].size_bytes, 2048);
}

#[tokio::test]
async fn attachments_404_means_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/7/child/attachment"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let attachments = client_for(&server).attachments("7").await.expect("lists");

    assert!(attachments.is_empty());
}

#[tokio::test]
async fn fetch_attachment_downloads_bytes_via_wiki_prefix() {
    let server = MockServer::start().await;
    let content = b"binary attachment content".to_vec();
    Mock::given(method("GET"))
        .and(path("/wiki/download/attachments/7/design.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .mount(&server)
        .await;

    let attachment = Attachment {
        id: "a1".to_string(),
        filename: "design.png".to_string(),
        size_bytes: content.len() as u64,
        download_ref: "/download/attachments/7/design.png".to_string(),
    };
    let bytes = client_for(&server)
        .fetch_attachment(&attachment)
        .await
        .expect("downloads");

    assert_eq!(bytes, content);
}

#[tokio::test]
async fn fetch_attachment_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wiki/download/attachments/7/gone.png"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let attachment = Attachment {
        id: "a1".to_string(),
        filename: "gone.png".to_string(),
        size_bytes: 0,
        download_ref: "/download/attachments/7/gone.png".to_string(),
    };
    let result = client_for(&server).fetch_attachment(&attachment).await;

    assert!(matches!(result, Err(ApiError::HttpStatus { status: 403, .. })));
}
