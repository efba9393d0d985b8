//! A wiremock stand-in for a BlackLab server that answers from the bundled
//! fixtures, with the run-specific fields changed the way a live server
//! would change them.

#![allow(dead_code)]

use blackcheck::HarnessConfig;
use std::path::PathBuf;
use std::time::Duration;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PREFIX: &str = "/blacklab-server";
/// Matches any `user:test-index-<n>` index path segment.
pub const INDEX_SEGMENT: &str = r"user:test-index-\d+";

pub fn fixture_root() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures"))
}

pub fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture_root().join(name)).unwrap()
}

pub fn config_for(server: &MockServer) -> HarnessConfig {
    HarnessConfig {
        base_url: format!("{}{}", server.uri(), PREFIX),
        username: "user".to_string(),
        password: "secret".to_string(),
        fixture_root: fixture_root(),
        request_timeout: Duration::from_secs(5),
        ..HarnessConfig::default()
    }
}

pub fn index_path(suffix: &str) -> String {
    format!("^{}/{}{}$", PREFIX, INDEX_SEGMENT, suffix)
}

pub fn json(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/json")
}

pub fn xml(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "application/xml")
}

/// Document listing as a live server returns it: different timings and
/// index name, same documents.
pub fn live_index_content() -> String {
    let mut value: serde_json::Value =
        serde_json::from_str(&fixture_text("expected-index-content.json")).unwrap();
    value["summary"]["searchTime"] = serde_json::json!(17);
    value["summary"]["countTime"] = serde_json::json!(15);
    value["summary"]["searchParam"]["indexname"] = serde_json::json!("user:test-index-4821");
    serde_json::to_string(&value).unwrap()
}

pub fn live_index_metadata() -> String {
    let mut value: serde_json::Value =
        serde_json::from_str(&fixture_text("expected-index-metadata.json")).unwrap();
    value["indexName"] = serde_json::json!("user:test-index-4821");
    value["displayName"] = serde_json::json!("test-index-4821");
    value["versionInfo"]["timeCreated"] = serde_json::json!("2026-10-17 08:00:00");
    value["versionInfo"]["timeModified"] = serde_json::json!("2026-10-17 08:00:01");
    serde_json::to_string(&value).unwrap()
}

pub fn live_query_result() -> String {
    fixture_text("expected-query-result.xml")
        .replace("<searchTime>7</searchTime>", "<searchTime>31</searchTime>")
        .replace("<countTime>6</countTime>", "<countTime>29</countTime>")
        .replace("user:test-index-0", "user:test-index-4821")
}

pub fn empty_query_result() -> String {
    "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<blacklabResponse>\n  <summary>\n    <searchTime>2</searchTime>\n    <numberOfHits>0</numberOfHits>\n  </summary>\n  <hits>\n  </hits>\n  <docInfos>\n  </docInfos>\n</blacklabResponse>\n".to_string()
}

/// Mount every endpoint a full scenario run touches, answering as a healthy
/// server would.
pub async fn mount_healthy(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("{}/", PREFIX)))
        .respond_with(json(r#"{"blacklabBuildTime":"x","blacklabVersion":"3.0.1"}"#.to_string()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/input-formats", PREFIX)))
        .respond_with(json(r#"{"code":"SUCCESS","message":"Format added."}"#.to_string()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!("{}/", PREFIX)))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_raw(r#"{"code":"SUCCESS","message":"Index created"}"#, "application/json"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(index_path("/status")))
        .respond_with(json(r#"{"status":"available"}"#.to_string()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(index_path("/docs")))
        .respond_with(json(r#"{"code":"SUCCESS","message":"Data added succesfully."}"#.to_string()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(index_path("/docs")))
        .respond_with(json(live_index_content()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(index_path("/")))
        .respond_with(json(live_index_metadata()))
        .mount(server)
        .await;
    Mock::given(method("DELETE"))
        .and(path_regex(index_path("")))
        .respond_with(json(r#"{"code":"SUCCESS","message":"Index deleted"}"#.to_string()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(index_path("/hits/")))
        .and(query_param("filter", "section:(\"Payment\")"))
        .respond_with(xml(empty_query_result()))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(index_path("/hits/")))
        .respond_with(xml(live_query_result()))
        .mount(server)
        .await;
}

pub async fn start_healthy() -> MockServer {
    let server = MockServer::start().await;
    mount_healthy(&server).await;
    server
}
