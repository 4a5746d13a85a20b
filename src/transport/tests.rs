//! Tests for the transport module

use super::*;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use crate::types::QueryParams;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Endpoint Tests
// ============================================================================

#[test]
fn test_endpoint_display_includes_fixed_params() {
    let endpoint = Endpoint::new("/star")
        .unwrap()
        .with_param("interaction_type", "HUG")
        .with_param("user_id", "u1");

    assert_eq!(endpoint.path(), "/star");
    assert_eq!(endpoint.fixed_query().len(), 2);
    assert_eq!(endpoint.to_string(), "/star?interaction_type=HUG&user_id=u1");
}

#[test]
fn test_endpoint_rejects_malformed_paths() {
    assert!(Endpoint::new("").unwrap_err().is_configuration());
    assert!(Endpoint::new("   ").unwrap_err().is_configuration());
    assert!(Endpoint::new("/topic?user_id=1")
        .unwrap_err()
        .is_configuration());
    assert!(matches!(
        Endpoint::new("http://").unwrap_err(),
        Error::InvalidUrl(_)
    ));
    assert!(Endpoint::new("https://api.example.com/v2/topic").is_ok());
}

#[test]
fn test_list_request_display() {
    let mut query = QueryParams::new();
    query.insert("size".into(), "10".into());
    query.insert("page".into(), "3".into());
    let request = ListRequest::new("/comment", query);

    assert_eq!(request.to_string(), "/comment?page=3&size=10");
    assert_eq!(request.param("page"), Some("3"));
    assert_eq!(request.param("keyword"), None);
}

// ============================================================================
// Envelope Tests
// ============================================================================

#[test]
fn test_decode_paginated_envelope() {
    let decoder = EnvelopeDecoder::default();
    let body = json!({
        "code": 0,
        "msg": "ok",
        "data": {
            "items": [{"id": 1}, {"id": 2}],
            "current_page": 1,
            "next_page": 2,
            "total_page": 3
        }
    });

    let page = decoder.decode(&body.to_string()).unwrap();
    assert_eq!(page.items, vec![json!({"id": 1}), json!({"id": 2})]);
    assert_eq!(page.has_next, Some(true));
    assert_eq!(page.raw, body);
}

#[test]
fn test_decode_last_page_has_null_next() {
    let decoder = EnvelopeDecoder::default();
    let body = r#"{"code": 0, "data": {"items": [], "next_page": null}}"#;

    let page = decoder.decode(body).unwrap();
    assert!(page.is_empty());
    assert_eq!(page.has_next, Some(false));
}

#[test]
fn test_decode_without_continuation_field() {
    let decoder = EnvelopeDecoder::default();
    let body = r#"{"code": 0, "data": {"items": [{"id": "a"}], "total_count": 1}}"#;

    let page = decoder.decode(body).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.has_next, None);
}

#[test]
fn test_decode_array_payload() {
    let decoder = EnvelopeDecoder::default();
    let body = r#"{"code": 0, "data": [{"id": 1, "name": "开心"}]}"#;

    let page = decoder.decode(body).unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.has_next, None);
}

#[test]
fn test_decode_application_error() {
    let decoder = EnvelopeDecoder::default();
    let body = r#"{"code": 1000, "msg": "服务器未知错误"}"#;

    let err = decoder.decode(body).unwrap_err();
    assert!(matches!(err, Error::Api { code: 1000, ref message } if message == "服务器未知错误"));
    assert!(err.is_transient());
}

#[test]
fn test_decode_string_code() {
    let decoder = EnvelopeDecoder::default();
    assert!(decoder
        .decode(r#"{"code": "0", "data": {"items": []}}"#)
        .is_ok());
    assert!(matches!(
        decoder.decode(r#"{"code": "7", "msg": 3}"#),
        Err(Error::Api { code: 7, ref message }) if message == "3"
    ));
}

#[test]
fn test_decode_malformed_bodies() {
    let decoder = EnvelopeDecoder::default();

    assert!(matches!(decoder.decode("<html>"), Err(Error::Decode { .. })));
    assert!(matches!(
        decoder.decode(r#"{"code": 0, "data": {"items": "nope"}}"#),
        Err(Error::Decode { .. })
    ));
    assert!(matches!(
        decoder.decode(r#"{"code": 0, "data": {"total": 3}}"#),
        Err(Error::Decode { .. })
    ));
    assert!(matches!(
        decoder.decode(r#"{"code": 0, "data": 42}"#),
        Err(Error::Decode { .. })
    ));
    assert!(matches!(
        decoder.decode(r#"{"code": true, "data": []}"#),
        Err(Error::Decode { .. })
    ));
}

#[test]
fn test_decode_bare_layout_with_nested_items() {
    let config = EnvelopeConfig {
        items_field: "result.rows".to_string(),
        has_next_field: Some("result.more".to_string()),
        ..EnvelopeConfig::bare()
    };
    let decoder = EnvelopeDecoder::new(config);
    let body = r#"{"result": {"rows": [1, 2, 3], "more": false}}"#;

    let page = decoder.decode(body).unwrap();
    assert_eq!(page.items, vec![json!(1), json!(2), json!(3)]);
    assert_eq!(page.has_next, Some(false));
}

#[test]
fn test_envelope_config_validation() {
    assert!(EnvelopeConfig::default().validate().is_ok());
    assert!(EnvelopeConfig::bare().validate().is_ok());

    let no_codes = EnvelopeConfig {
        success_codes: vec![],
        ..EnvelopeConfig::default()
    };
    assert!(no_codes.validate().unwrap_err().is_configuration());

    let no_items = EnvelopeConfig {
        items_field: String::new(),
        ..EnvelopeConfig::default()
    };
    assert!(no_items.validate().is_err());
}

#[test]
fn test_envelope_config_yaml_defaults() {
    let config: EnvelopeConfig = serde_yaml::from_str("success_codes: [0, 200]").unwrap();
    assert_eq!(config.success_codes, vec![0, 200]);
    assert_eq!(config.code_field, "code");
    assert_eq!(config.has_next_field.as_deref(), Some("next_page"));
}

// ============================================================================
// HttpListTransport Tests
// ============================================================================

fn transport_for(server: &MockServer) -> HttpListTransport {
    let config = HttpClientConfig::new(Url::parse(&server.uri()).unwrap());
    HttpListTransport::new(
        Arc::new(HttpClient::new(config).unwrap()),
        EnvelopeDecoder::default(),
    )
}

#[tokio::test]
async fn test_http_transport_fetches_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mind/knowledge"))
        .and(query_param("category", "sleep"))
        .and(query_param("page", "1"))
        .and(query_param("size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": {"items": [{"id": 1}, {"id": 2}], "next_page": 2}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);
    let mut query = QueryParams::new();
    query.insert("category".into(), "sleep".into());
    query.insert("page".into(), "1".into());
    query.insert("size".into(), "2".into());

    let page = transport
        .fetch_page(&ListRequest::new("/mind/knowledge", query))
        .await
        .unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.has_next, Some(true));
}

#[tokio::test]
async fn test_http_transport_maps_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/topic"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/comment"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1002,
            "msg": "资源不存在"
        })))
        .mount(&mock_server)
        .await;

    let transport = transport_for(&mock_server);

    let err = transport
        .fetch_page(&ListRequest::new("/topic", QueryParams::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));
    assert!(err.is_transient());

    let err = transport
        .fetch_page(&ListRequest::new("/comment", QueryParams::new()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Api { code: 1002, .. }));
}
