//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML config → ApiClient → Paginator → HTTP requests

use july_paging::pagination::PaginatorState;
use july_paging::resources::{CommentFilter, KnowledgeFilter, Label, Topic, TopicFilter};
use july_paging::{ApiClient, ClientConfig, ListView};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn envelope(items: Value, page: u32, next_page: Option<u32>) -> Value {
    json!({
        "code": 0,
        "msg": "ok",
        "data": {
            "items": items,
            "current_page": page,
            "next_page": next_page,
            "total_page": 2,
            "total_count": 3
        }
    })
}

fn client_for(server: &MockServer) -> ApiClient {
    let config = ClientConfig {
        base_url: server.uri(),
        page_size: 2,
        ..ClientConfig::default()
    };
    ApiClient::from_config(&config).unwrap()
}

// ============================================================================
// Paging Tests
// ============================================================================

#[tokio::test]
async fn test_topic_feed_until_exhausted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .and(query_param("page", "1"))
        .and(query_param("size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": "A", "content": "first"}, {"id": "B", "content": "second"}]),
            1,
            Some(2),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": "C", "content": "third"}]),
            2,
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let topics = client.paginator(&TopicFilter::default()).unwrap();

    let first = topics.fetch_more().await.unwrap();
    assert!(first.has_more);
    let mut view = ListView::new(&first);
    assert_eq!(view.remove(0).as_deref(), Some("A"));

    let second = topics.fetch_more().await.unwrap();
    assert!(!second.has_more);
    let ids: Vec<&str> = second.items.iter().map(|t: &Topic| t.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);

    view.refresh(&second);
    let visible: Vec<&str> = view.items().map(|t| t.id.as_str()).collect();
    assert_eq!(visible, vec!["B", "C"]);

    // Exhausted: no third request (verified by `expect` on drop)
    let again = topics.fetch_more().await.unwrap();
    assert_eq!(again.len(), 3);
    assert_eq!(topics.state(), PaginatorState::Exhausted);
}

#[tokio::test]
async fn test_filter_reset_refetches_first_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/comment"))
        .and(query_param("topic_id", "t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": 1, "content": "加油"}]),
            1,
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comment"))
        .and(query_param("topic_id", "t2"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": 7, "content": "抱抱"}, {"id": 8, "content": "晚安"}]),
            1,
            Some(2),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let filter = CommentFilter {
        topic_id: Some("t1".into()),
        user_id: None,
    };
    let comments = client.paginator(&filter).unwrap();

    let snapshot = comments.fetch_more().await.unwrap();
    assert_eq!(snapshot.items[0].id, "1");
    assert!(!snapshot.has_more);

    let mut query = july_paging::QueryParams::new();
    query.insert("topic_id".into(), "t2".into());
    comments.reset(query).unwrap();

    let snapshot = comments.fetch_more().await.unwrap();
    let ids: Vec<_> = snapshot.items.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids, vec!["7", "8"]);
    assert!(snapshot.has_more);
}

// ============================================================================
// Failure Tests
// ============================================================================

#[tokio::test]
async fn test_server_error_then_retry_same_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": "A"}]),
            1,
            None,
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let topics = client.paginator(&TopicFilter::default()).unwrap();

    let err = topics.fetch_more().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(topics.state(), PaginatorState::Failed);
    assert!(topics.is_empty());

    let snapshot = topics.fetch_more().await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(topics.state(), PaginatorState::Exhausted);
}

#[tokio::test]
async fn test_application_error_code_is_transient() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1000,
            "msg": "服务器未知错误"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let topics = client.paginator(&TopicFilter::default()).unwrap();

    let err = topics.fetch_more().await.unwrap_err();
    assert!(err.is_transient());
    assert!(err.to_string().contains("1000"));
    assert_eq!(topics.state(), PaginatorState::Failed);
}

#[tokio::test]
async fn test_not_found_fails_and_retries_same_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such route"))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": "A"}]),
            1,
            None,
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let topics = client.paginator(&TopicFilter::default()).unwrap();

    let err = topics.fetch_more().await.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(topics.state(), PaginatorState::Failed);

    let snapshot = topics.fetch_more().await.unwrap();
    assert_eq!(snapshot.len(), 1);
}

#[tokio::test]
async fn test_http_retries_stay_inside_one_fetch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([{"id": "A"}, {"id": "B"}]),
            1,
            Some(2),
        )))
        .mount(&mock_server)
        .await;

    let yaml = format!(
        "base_url: {}\npage_size: 2\nhttp:\n  max_retries: 1\n  initial_backoff_ms: 1\n  max_backoff_ms: 5\n",
        mock_server.uri()
    );
    let config = ClientConfig::from_yaml_str(&yaml).unwrap();
    let client = ApiClient::from_config(&config).unwrap();
    let topics = client.paginator(&TopicFilter::default()).unwrap();

    let snapshot = topics.fetch_more().await.unwrap();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.has_more);
}

// ============================================================================
// Config and Cache Tests
// ============================================================================

#[tokio::test]
async fn test_config_file_drives_knowledge_search() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2/mind/knowledge"))
        .and(query_param("keyword", "焦虑"))
        .and(query_param("page", "1"))
        .and(query_param("size", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            json!([
                {"id": 1, "title": "呼吸", "tags": "[\"stress\"]"},
                {"id": 2, "title": "冥想", "tags": ["calm"]},
                {"id": 3, "title": "散步"}
            ]),
            1,
            Some(2),
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "base_url: {}/v2\nresources:\n  knowledge:\n    page_size: 3",
        mock_server.uri()
    )
    .unwrap();

    let config = ClientConfig::load(file.path()).unwrap();
    let client = ApiClient::from_config(&config).unwrap();
    let knowledge = client
        .paginator(&KnowledgeFilter::default().keyword("焦虑"))
        .unwrap();

    let snapshot = knowledge.fetch_more().await.unwrap();
    assert_eq!(snapshot.len(), 3);
    assert_eq!(snapshot.items[0].tags, vec!["stress"]);
    assert!(snapshot.has_more);
}

#[tokio::test]
async fn test_labels_fetched_once() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/label"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "msg": "ok",
            "data": [
                {"id": 1, "name": "开心", "color": "#FFB800"},
                {"id": 2, "name": "平静", "color": "#337559"}
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let first = client.labels(None).await.unwrap();
    let second = client.labels(None).await.unwrap();
    let names: Vec<_> = first.iter().map(|l: &Label| l.name.as_str()).collect();
    assert_eq!(names, vec!["开心", "平静"]);
    assert_eq!(first, second);
}

#[test]
fn test_shipped_config_is_valid() {
    let config = ClientConfig::from_yaml_str(include_str!("../july-paging.yaml")).unwrap();
    assert_eq!(
        config.page_size_for(july_paging::ResourceKind::Knowledge),
        16
    );
    assert_eq!(
        config.page_size_for(july_paging::ResourceKind::CustomAffirmation),
        50
    );
}
