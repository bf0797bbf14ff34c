// SPDX-License-Identifier: PMPL-1.0-or-later
//! Integration tests for auditbot
//!
//! HTTP collaborators (text analysis, catalog fetch) are served by wiremock;
//! no real network calls are made.

use async_trait::async_trait;
use auditbot::analysis::{OpenAiAnalyzer, TextAnalyzer};
use auditbot::api::{self, AppState};
use auditbot::audit::{perform_accessibility_audit, AuditOptions, DEFAULT_MAX_DEPTH};
use auditbot::config::{AnalysisConfig, AuditConfig, DesignSystemConfig};
use auditbot::design_system::{CatalogFetcher, DesignSystem, HttpCatalogFetcher};
use auditbot::report::{generate_report, OutputFormat};
use auditbot::scanner::{self, FrameAudit};
use auditbot::service::{AuditResults, AuditService};
use auditbot::store::models::TeamConfig;
use auditbot::store::{InMemoryAuditHistory, InMemoryTeamConfigStore, TeamConfigStore};
use auditbot::{AuditRequest, Error, IssueType, Severity, WcagLevel};
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{bearer_token, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load(name: &str) -> auditbot::ElementNode {
    scanner::load_frame(&Path::new("tests/fixtures").join(name), DEFAULT_MAX_DEPTH).expect("fixture parses")
}

/// Helper to build an analysis config pointing at the mock server
fn analysis_config(server_url: &str) -> AnalysisConfig {
    AnalysisConfig {
        endpoint: format!("{}/v1/chat/completions", server_url),
        api_key: Some("test-key".to_string()),
        ..AnalysisConfig::default()
    }
}

fn chat_response(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]
    })
}

struct NoCatalog;

#[async_trait]
impl CatalogFetcher for NoCatalog {
    async fn fetch(&self, url: &str) -> auditbot::Result<DesignSystem> {
        Err(Error::CatalogFetch(format!("{} unreachable", url)))
    }
}

struct Consistent;

#[async_trait]
impl TextAnalyzer for Consistent {
    async fn analyze(&self, _system: &str, _user: &str) -> auditbot::Result<String> {
        Ok("No issues found".to_string())
    }
}

fn stub_service(teams: HashMap<String, TeamConfig>) -> AuditService {
    AuditService::new(
        Arc::new(InMemoryTeamConfigStore::new(teams)),
        Arc::new(NoCatalog),
        Arc::new(Consistent),
        Arc::new(InMemoryAuditHistory::default()),
    )
}

// ============================================================================
// Rule checks over fixtures
// ============================================================================

#[test]
fn test_accessible_fixture_is_clean() {
    let frame = load("accessible_frame.json");
    let report = perform_accessibility_audit(&frame, &AuditOptions::default(), &[]);

    assert!(
        report.issues.is_empty(),
        "Accessible fixture should have no issues, got {:?}",
        report.issues.iter().map(|i| &i.message).collect::<Vec<_>>()
    );
    assert_eq!(report.element_count, 6);
}

#[test]
fn test_inaccessible_fixture_findings() {
    let frame = load("inaccessible_frame.json");
    let report = perform_accessibility_audit(&frame, &AuditOptions::default(), &[]);

    let found: Vec<_> = report
        .issues
        .iter()
        .map(|i| (i.element.as_str(), i.issue_type.clone(), i.severity))
        .collect();
    assert_eq!(
        found,
        vec![
            ("Fine print", IssueType::Contrast, Severity::Error),
            ("Fine print", IssueType::TextSize, Severity::Warning),
            ("Close button", IssueType::TouchTarget, Severity::Error),
            ("Rectangle 12", IssueType::AltText, Severity::Error),
            ("Legacy", IssueType::Visibility, Severity::Info),
            ("Legacy", IssueType::Visibility, Severity::Warning),
            ("Old caption", IssueType::TextSize, Severity::Warning),
        ]
    );
    assert_eq!(report.summary.errors, 3);
    assert_eq!(report.summary.warnings, 3);
    assert_eq!(report.summary.info, 1);
    assert_eq!(report.element_count, 6);
    assert!(report.issues[0].message.starts_with("Low contrast ratio: 2.85:1"));
}

#[test]
fn test_aaa_is_stricter_than_aa() {
    let frame = load("accessible_frame.json");
    let aaa = perform_accessibility_audit(&frame, &AuditOptions::with_level(WcagLevel::AAA), &[]);
    let aa = perform_accessibility_audit(&frame, &AuditOptions::default(), &[]);
    assert!(aaa.issues.len() >= aa.issues.len());
}

#[test]
fn test_directory_scan_and_sarif() {
    let frames = scanner::collect_frames(Path::new("tests/fixtures"), DEFAULT_MAX_DEPTH).expect("scan fixtures");
    assert_eq!(frames.len(), 2);

    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let service = stub_service(HashMap::new());
    let audits: Vec<FrameAudit> = frames
        .into_iter()
        .map(|source| {
            let request = AuditRequest {
                audit_type: Some("accessibility".to_string()),
                frame_data: Some(source.frame),
                ..AuditRequest::default()
            };
            FrameAudit {
                path: source.path,
                envelope: rt.block_on(service.run(&request)).expect("audit runs"),
            }
        })
        .collect();

    let sarif = generate_report(&audits, OutputFormat::Sarif);
    let parsed: serde_json::Value = serde_json::from_str(&sarif).expect("valid SARIF");
    let results = parsed["runs"][0]["results"].as_array().expect("results array");
    assert_eq!(results.len(), 7);
    assert!(results
        .iter()
        .all(|r| r["locations"][0]["physicalLocation"]["artifactLocation"]["uri"]
            .as_str()
            .unwrap()
            .ends_with("inaccessible_frame.json")));
}

// ============================================================================
// Text-analysis client
// ============================================================================

#[tokio::test]
async fn test_openai_analyzer_sends_chat_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("test-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "max_tokens": 300,
            "messages": [{"role": "system", "content": "sys"}, {"role": "user", "content": "usr"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("  Use brand.500  ")))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(&analysis_config(&server.uri())).expect("client builds");
    let answer = analyzer.analyze("sys", "usr").await.expect("analysis succeeds");
    assert_eq!(answer, "Use brand.500");
}

#[tokio::test]
async fn test_openai_analyzer_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let analyzer = OpenAiAnalyzer::new(&analysis_config(&server.uri())).expect("client builds");
    let err = analyzer.analyze("sys", "usr").await.unwrap_err();
    assert!(matches!(err, Error::Analysis(ref msg) if msg.contains("429")));
}

// ============================================================================
// Catalog fetcher
// ============================================================================

#[tokio::test]
async fn test_http_catalog_fetcher_parses_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .and(header("user-agent", "Figma-Design-System-Audit/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><style>--brand-color: #0055cc;</style><h1>Button</h1><h2>Card</h2>\
             <p>Keep focus rings visible for keyboard users.</p></html>",
        ))
        .mount(&server)
        .await;

    let fetcher = HttpCatalogFetcher::new(&DesignSystemConfig::default()).expect("client builds");
    let system = fetcher
        .fetch(&format!("{}/docs", server.uri()))
        .await
        .expect("fetch succeeds");

    assert_eq!(system.name, "Custom Design System");
    assert_eq!(system.components, vec!["Button", "Card"]);
    assert_eq!(system.tokens.colors["brand-color"], "#0055cc");
    assert!(system.guidelines.iter().any(|g| g.category == "keyboard"));
}

#[tokio::test]
async fn test_http_catalog_fetcher_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpCatalogFetcher::new(&DesignSystemConfig::default()).expect("client builds");
    let err = fetcher.fetch(&format!("{}/missing", server.uri())).await.unwrap_err();
    assert!(matches!(err, Error::CatalogFetch(ref msg) if msg.starts_with("404")));
}

// ============================================================================
// Design-system audit end to end
// ============================================================================

#[tokio::test]
async fn test_design_system_audit_with_mocked_collaborators() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/ds"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Button</h1><h1>Modal</h1>"))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response("Corner radius should be 8px")),
        )
        .expect(5)
        .mount(&server)
        .await;

    let mut teams = HashMap::new();
    teams.insert(
        "core".to_string(),
        TeamConfig {
            design_system_url: Some(format!("{}/ds", server.uri())),
            design_system_text: Some("8px grid everywhere".to_string()),
            ..TeamConfig::default()
        },
    );

    let service = AuditService::new(
        Arc::new(InMemoryTeamConfigStore::new(teams)),
        Arc::new(HttpCatalogFetcher::new(&DesignSystemConfig::default()).unwrap()),
        Arc::new(OpenAiAnalyzer::new(&analysis_config(&server.uri())).unwrap()),
        Arc::new(InMemoryAuditHistory::default()),
    );

    let request = AuditRequest {
        audit_type: Some("design-system".to_string()),
        frame_data: Some(load("inaccessible_frame.json")),
        team_id: Some("core".to_string()),
        ..AuditRequest::default()
    };
    let envelope = service.run(&request).await.expect("audit runs");

    let AuditResults::DesignSystem(report) = envelope.results else {
        panic!("expected design-system results");
    };
    // Root plus its four direct children; grandchildren are not analyzed
    let elements: Vec<_> = report.issues.iter().map(|i| i.element.as_str()).collect();
    assert_eq!(elements, vec!["Promo", "Fine print", "Close button", "Rectangle 12", "Legacy"]);
    assert!(report.issues.iter().all(|i| i.issue_type == IssueType::DesignSystem));

    let catalog = report.design_system.expect("catalog fetched");
    assert_eq!(catalog.component_count, 2);
    let config = report.config.expect("config reported");
    assert!(!config.has_custom_rules);
}

#[tokio::test]
async fn test_catalog_failure_still_uses_text_guidelines() {
    let mut teams = HashMap::new();
    teams.insert(
        "core".to_string(),
        TeamConfig {
            design_system_url: Some("https://chakra-ui.com/docs".to_string()),
            design_system_text: Some("Buttons are pill shaped".to_string()),
            ..TeamConfig::default()
        },
    );

    let request = AuditRequest {
        audit_type: Some("design-system".to_string()),
        frame_data: Some(load("accessible_frame.json")),
        team_id: Some("core".to_string()),
        ..AuditRequest::default()
    };
    let envelope = stub_service(teams).run(&request).await.expect("audit runs");

    let AuditResults::DesignSystem(report) = envelope.results else {
        panic!("expected design-system results");
    };
    assert!(report.design_system.is_none());
    assert!(report.issues.is_empty());
    assert_eq!(
        report.config.and_then(|c| c.url).as_deref(),
        Some("https://chakra-ui.com/docs")
    );
}

// ============================================================================
// HTTP API
// ============================================================================

async fn call(app: axum::Router, method: &str, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, value)
}

fn app() -> axum::Router {
    api::router(AppState {
        service: stub_service(HashMap::new()),
    })
}

#[tokio::test]
async fn test_api_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_api_missing_fields() {
    let (status, body) = call(app(), "POST", "/api/audit", r#"{"auditType": "accessibility"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields: auditType, frameData");
}

#[tokio::test]
async fn test_api_invalid_audit_type() {
    let (status, body) =
        call(app(), "POST", "/api/audit", r#"{"auditType": "seo", "frameData": {}}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid audit type. Use: accessibility, design-system, or both");
}

#[tokio::test]
async fn test_api_accessibility_audit() {
    let request = serde_json::json!({
        "auditType": "accessibility",
        "frameData": {
            "type": "TEXT",
            "name": "Fine print",
            "fontSize": 10,
            "fills": [{"type": "SOLID", "color": {"r": 0, "g": 0, "b": 0}, "visible": true}],
            "background": [{"type": "SOLID", "color": {"r": 0.1, "g": 0.1, "b": 0.1}, "visible": true}]
        },
        "customRules": [{"type": "wcagLevel", "value": "AAA"}]
    });

    let (status, body) = call(app(), "POST", "/api/audit", &request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["auditType"], "accessibility");
    assert_eq!(body["results"]["wcagLevel"], "AAA");
    assert_eq!(body["results"]["elementCount"], 1);
    assert_eq!(body["results"]["summary"]["errors"], 1);
    assert_eq!(body["results"]["summary"]["warnings"], 1);
    assert_eq!(body["results"]["issues"][0]["type"], "contrast");
}

#[tokio::test]
async fn test_api_both_without_team_config() {
    let request = serde_json::json!({
        "auditType": "both",
        "frameData": {"name": "Empty", "type": "FRAME"},
        "teamId": "nobody"
    });

    let (status, body) = call(app(), "POST", "/api/audit", &request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["combined"].as_array().unwrap().len(), 1);
    assert_eq!(body["results"]["designSystem"]["issues"][0]["type"], "configuration");
    assert!(body["results"]["designSystem"]["designSystem"].is_null());
}

#[tokio::test]
async fn test_api_save_team_config() {
    let (status, body) = call(app(), "PUT", "/api/teams/core/config", r#"{}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("designSystemUrl"));

    let (status, _) = call(
        app(),
        "PUT",
        "/api/teams/core/config",
        r#"{"design_system_url": "javascript:alert(1)"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        app(),
        "PUT",
        "/api/teams/core/config",
        r#"{"design_system_text": "Use the 8px grid", "accessibility_level": "AAA"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["teamId"], "core");
}

/// A single chain of frames, `depth` levels below the root
fn chain_frame(depth: usize) -> String {
    let mut frame = r#"{"name": "leaf", "type": "FRAME"}"#.to_string();
    for level in (0..depth).rev() {
        frame = format!(
            r#"{{"name": "level {}", "type": "FRAME", "children": [{}]}}"#,
            level, frame
        );
    }
    frame
}

#[tokio::test]
async fn test_api_deep_frame_is_cut_at_max_depth() {
    for depth in [63, 64, 65, 100, 3000] {
        let body = format!(r#"{{"auditType": "accessibility", "frameData": {}}}"#, chain_frame(depth));
        let (status, body) = call(app(), "POST", "/api/audit", &body).await;
        assert_eq!(status, StatusCode::OK, "depth {}", depth);
        let expected = depth.min(DEFAULT_MAX_DEPTH) + 1;
        assert_eq!(body["results"]["elementCount"], expected, "depth {}", depth);
    }
}

#[tokio::test]
async fn test_api_max_depth_follows_config() {
    let service = stub_service(HashMap::new()).with_defaults(AuditConfig {
        max_depth: 150,
        ..AuditConfig::default()
    });
    let app = api::router(AppState { service });

    let body = format!(r#"{{"auditType": "accessibility", "frameData": {}}}"#, chain_frame(200));
    let (status, body) = call(app, "POST", "/api/audit", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["elementCount"], 151);
}

#[tokio::test]
async fn test_api_null_geometry_degrades_gracefully() {
    let request = serde_json::json!({
        "auditType": "accessibility",
        "frameData": {"name": "x", "type": "FRAME", "x": null, "width": null, "visible": null},
        "wcagLevel": "aaa"
    });

    let (status, body) = call(app(), "POST", "/api/audit", &request.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"]["elementCount"], 1);
    assert_eq!(body["results"]["wcagLevel"], "AAA");
}

#[tokio::test]
async fn test_api_save_team_config_camel_case() {
    let store = Arc::new(InMemoryTeamConfigStore::default());
    let service = AuditService::new(
        store.clone(),
        Arc::new(NoCatalog),
        Arc::new(Consistent),
        Arc::new(InMemoryAuditHistory::default()),
    );
    let app = api::router(AppState { service });

    let (status, body) = call(
        app,
        "PUT",
        "/api/teams/web/config",
        r#"{"designSystemUrl": "https://mui.com/material-ui/", "accessibilityLevel": "AAA",
            "customRules": [{"type": "naming", "condition": {"namePattern": "^[A-Z]"}}]}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["teamId"], "web");

    let saved = store.get("web").await.unwrap().expect("config saved");
    assert_eq!(saved.design_system_url.as_deref(), Some("https://mui.com/material-ui/"));
    assert_eq!(saved.accessibility_level, Some(WcagLevel::AAA));
    assert!(saved.has_custom_rules());
}
