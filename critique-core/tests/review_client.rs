//! Review client behaviour against a mock backend.

use critique_core::api::{ApiFlavor, ClientOptions, ReviewClient};
use critique_core::error::{ApiError, UNKNOWN_ERROR};
use critique_core::models::MODELS_LOAD_FAILED;
use critique_core::render::{Block, ResultRenderer};
use critique_core::types::{ReviewPayload, ReviewRequest, SourceLanguage, ToolOutput};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, flavor: ApiFlavor) -> ReviewClient {
    ReviewClient::new(&ClientOptions {
        base_url: server.uri(),
        flavor,
        request_timeout: None,
    })
    .unwrap()
}

fn sample_request() -> ReviewRequest {
    ReviewRequest {
        code: "print(1)".into(),
        language: SourceLanguage::Python,
        model: "gpt-4".into(),
        response_language: "en".into(),
    }
}

#[tokio::test]
async fn review_posts_all_four_fields_and_renders_heading() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .and(body_json(json!({
            "code": "print(1)",
            "language": "python",
            "model": "gpt-4",
            "response_language": "en"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": "# OK\n"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap();
    assert_eq!(payload, ReviewPayload::Text("# OK\n".into()));

    let rendered = ResultRenderer::default().render(&payload);
    assert!(rendered.to_html().contains("<h1>OK</h1>"));
}

#[tokio::test]
async fn object_result_is_kept_structured() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "result": {"issues": [{"line": 1, "message": "unused"}]}
        })))
        .mount(&server)
        .await;

    let payload = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap();
    assert!(matches!(payload, ReviewPayload::Structured(_)), "{payload:?}");
}

#[tokio::test]
async fn success_false_surfaces_server_error_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": "Model quota exhausted"
        })))
        .mount(&server)
        .await;

    let err = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)), "{err:?}");
    assert_eq!(err.to_string(), "Model quota exhausted");
}

#[tokio::test]
async fn success_false_without_error_uses_default_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": false})))
        .mount(&server)
        .await;

    let err = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap_err();
    assert_eq!(err.to_string(), UNKNOWN_ERROR);
}

#[tokio::test]
async fn non_string_error_is_stringified_not_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "error": {"code": 42, "reason": "quota"}
        })))
        .mount(&server)
        .await;

    let err = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)), "{err:?}");
    assert_eq!(err.to_string(), r#"{"code":42,"reason":"quota"}"#);
}

#[tokio::test]
async fn null_result_renders_as_json_null() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "result": null})),
        )
        .mount(&server)
        .await;

    let payload = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap();
    assert_eq!(payload, ReviewPayload::Structured(serde_json::Value::Null));
    let rendered = ResultRenderer::default().render(&payload);
    match &rendered.blocks[0] {
        Block::Markdown { source, .. } => assert_eq!(source, "null"),
        other => panic!("expected markdown block, got {other:?}"),
    }
}

#[tokio::test]
async fn non_2xx_message_contains_status_and_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "success": false,
            "error": "Missing code"
        })))
        .mount(&server)
        .await;

    let err = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "Server error: 400 - Missing code");
}

#[tokio::test]
async fn non_2xx_with_non_json_body_still_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap_err();
    assert_eq!(err.to_string(), "Server error: 502");
}

#[tokio::test]
async fn malformed_success_body_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server, ApiFlavor::Modern).review(&sample_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Malformed(_)), "{err:?}");
}

#[tokio::test]
async fn transport_failure_is_reported() {
    // Start then drop a server so its port is closed.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let client = ReviewClient::new(&ClientOptions {
        base_url: uri,
        flavor: ApiFlavor::Modern,
        request_timeout: None,
    })
    .unwrap();

    let err = client.review(&sample_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    assert_eq!(client.load_models().await.selected().label, MODELS_LOAD_FAILED);
    assert!(!client.ping().await);
}

#[tokio::test]
async fn models_are_loaded_with_default_selected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "default_model": "gpt-4",
            "models": [
                {"id": "mock", "name": "Mock model", "is_default": false},
                {"id": "gpt-4", "name": "GPT-4", "is_default": false}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let selector = client(&server, ApiFlavor::Modern).load_models().await;
    assert_eq!(selector.options().len(), 2);
    assert_eq!(selector.selected_model(), Some("gpt-4"));
}

#[tokio::test]
async fn models_error_payload_becomes_placeholder() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/models"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "error": "registry unavailable"
        })))
        .mount(&server)
        .await;

    let selector = client(&server, ApiFlavor::Modern).load_models().await;
    assert!(selector.is_placeholder());
    assert_eq!(selector.selected().label, "registry unavailable");
}

#[tokio::test]
async fn server_url_with_path_prefix_is_respected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reviewer/api/ping"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReviewClient::new(&ClientOptions {
        base_url: format!("{}/reviewer", server.uri()),
        flavor: ApiFlavor::Legacy,
        request_timeout: None,
    })
    .unwrap();
    assert!(client.ping().await);
}

#[tokio::test]
async fn legacy_review_sends_code_and_language_only() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .and(body_json(json!({"code": "print(1)", "language": "python"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ml_suggestions": "Looks fine.",
            "static_analysis": [
                {"tool": "pylint", "output": "{\"score\": 10}"},
                {"tool": "bandit", "output": "<b>no issues</b>"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let payload = client(&server, ApiFlavor::Legacy).review(&sample_request()).await.unwrap();
    assert_eq!(
        payload,
        ReviewPayload::StaticAnalysis {
            suggestions: Some("Looks fine.".into()),
            entries: vec![
                ToolOutput { tool: "pylint".into(), output: "{\"score\": 10}".into() },
                ToolOutput { tool: "bandit".into(), output: "<b>no issues</b>".into() },
            ],
        }
    );

    let rendered = ResultRenderer::default().render(&payload);
    assert_eq!(rendered.blocks.len(), 3);
    assert!(matches!(&rendered.blocks[1], Block::Tool { json: true, .. }));
    let html = rendered.to_html();
    assert!(html.contains("&lt;b&gt;no issues&lt;/b&gt;"), "{html}");
    assert!(!html.contains("<b>"), "{html}");
}

#[tokio::test]
async fn legacy_error_status_uses_error_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/review"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "analyzer crashed"})))
        .mount(&server)
        .await;

    let err = client(&server, ApiFlavor::Legacy).review(&sample_request()).await.unwrap_err();
    assert_eq!(err.to_string(), "Server error: 500 - analyzer crashed");
}

#[test]
fn invalid_base_url_is_rejected() {
    let err = ReviewClient::new(&ClientOptions {
        base_url: "not a url".into(),
        flavor: ApiFlavor::Modern,
        request_timeout: None,
    })
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidUrl(_)));
}
