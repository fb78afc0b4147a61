// HTTP surface tests against the router, no sockets

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use writing_tools::api::{build_router, AppState};
use writing_tools::services::providers::{ChatResult, CompletionService, ProviderError};

/// Completion backend that answers every prompt with the same canned reply.
struct FakeCompleter {
    reply: Option<String>,
}

#[async_trait]
impl CompletionService for FakeCompleter {
    async fn complete(&self, _system: &str, _user: &str) -> Result<ChatResult, ProviderError> {
        match &self.reply {
            Some(content) => Ok(ChatResult {
                content: content.clone(),
                latency_ms: 1,
                reasoning: None,
            }),
            None => Err(ProviderError::ApiError {
                status: 503,
                message: "unavailable".to_string(),
            }),
        }
    }

    fn label(&self) -> String {
        "fake:test".to_string()
    }
}

fn app_without_model() -> Router {
    build_router(AppState::default())
}

fn app_with_reply(reply: Option<&str>) -> Router {
    let completer: Arc<dyn CompletionService> = Arc::new(FakeCompleter {
        reply: reply.map(str::to_string),
    });
    build_router(AppState::new(Some(completer)))
}

struct Reply {
    status: StatusCode,
    allow_origin: Option<String>,
    json: Value,
}

async fn send(app: Router, method: &str, uri: &str, body: &str) -> Reply {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("origin", "http://localhost:5173")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let allow_origin = resp
        .headers()
        .get("access-control-allow-origin")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    Reply {
        status,
        allow_origin,
        json: serde_json::from_slice(&bytes).unwrap_or(Value::Null),
    }
}

async fn post(app: Router, uri: &str, body: &str) -> Reply {
    send(app, "POST", uri, body).await
}

#[tokio::test]
async fn test_health_reports_model_state() {
    let reply = send(app_without_model(), "GET", "/api/health", "").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["status"], "ok");
    assert_eq!(reply.json["modelConfigured"], false);

    let reply = send(app_with_reply(Some("{}")), "GET", "/api/health", "").await;
    assert_eq!(reply.json["modelConfigured"], true);
}

#[tokio::test]
async fn test_detect_without_key_is_local_and_conservative() {
    let reply = post(
        app_without_model(),
        "/api/detect",
        r#"{"text": "Furthermore, therefore, consequently, hence this is true."}"#,
    )
    .await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["engine"], "local");
    assert_eq!(reply.json["aiGenerated"], 20);
    assert!(reply.json["humanWritten"].as_u64().unwrap() >= 70);
    assert_eq!(reply.json["language"], "en");
    assert!(reply.json["requestId"].as_str().is_some());
    assert!(reply.json["detailedAnalysis"].is_object());
    assert_eq!(reply.allow_origin.as_deref(), Some("*"));
}

#[tokio::test]
async fn test_missing_or_blank_text_is_400() {
    for body in [r#"{}"#, r#"{"text": "   "}"#] {
        let reply = post(app_without_model(), "/api/detect", body).await;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(reply.json["error"].as_str().unwrap().contains("text"));
    }
}

#[tokio::test]
async fn test_malformed_json_body_is_400() {
    let reply = post(app_without_model(), "/api/paraphrase", "{not json").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json["error"].is_string());
}

#[tokio::test]
async fn test_required_fields_per_tool() {
    let reply = post(app_without_model(), "/api/citation", r#"{"authors": ["Jane Smith"]}"#).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json["error"].as_str().unwrap().contains("title"));

    let reply = post(app_without_model(), "/api/translate", r#"{"text": "hello"}"#).await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json["error"].as_str().unwrap().contains("targetLanguage"));
}

#[tokio::test]
async fn test_every_tool_falls_back_locally() {
    let cases = [
        ("/api/paraphrase", r#"{"text": "This is a big problem.", "mode": "standard"}"#, "paraphrasedText"),
        ("/api/grammar", r#"{"text": "i think alot of it."}"#, "correctedText"),
        ("/api/summarize", r#"{"text": "One point here. Another point there.", "length": "short"}"#, "summary"),
        ("/api/plagiarism", r#"{"text": "A short text."}"#, "originalityScore"),
        ("/api/humanize", r#"{"text": "Furthermore, it is done.", "tone": "casual"}"#, "humanizedText"),
        ("/api/citation", r#"{"title": "The Art of Code", "authors": ["Jane Smith"], "year": "2020"}"#, "citation"),
        ("/api/translate", r#"{"text": "hello world", "targetLanguage": "es"}"#, "translatedText"),
    ];

    for (uri, body, field) in cases {
        let reply = post(app_without_model(), uri, body).await;
        assert_eq!(reply.status, StatusCode::OK, "{uri}");
        assert_eq!(reply.json["engine"], "local", "{uri}");
        assert!(!reply.json[field].is_null(), "{uri} missing {field}");

        // A failing provider lands on the same fallback
        let reply = post(app_with_reply(None), uri, body).await;
        assert_eq!(reply.status, StatusCode::OK, "{uri}");
        assert_eq!(reply.json["engine"], "local", "{uri}");
    }
}

#[tokio::test]
async fn test_local_tool_outputs() {
    let reply = post(
        app_without_model(),
        "/api/grammar",
        r#"{"text": "i think alot of it."}"#,
    )
    .await;
    assert_eq!(reply.json["correctedText"], "I think a lot of it.");
    assert_eq!(reply.json["issues"].as_array().unwrap().len(), 2);

    let reply = post(
        app_without_model(),
        "/api/translate",
        r#"{"text": "hello world", "targetLanguage": "Spanish"}"#,
    )
    .await;
    assert_eq!(reply.json["translatedText"], "hola mundo");
    assert_eq!(reply.json["targetLanguage"], "es");

    let reply = post(
        app_without_model(),
        "/api/citation",
        r#"{"title": "The Art of Code", "authors": ["Jane Smith"], "year": "2020", "sourceType": "book", "publisher": "Tech Press"}"#,
    )
    .await;
    assert_eq!(reply.json["citation"], "Smith, J. (2020). The Art of Code. Tech Press.");
    assert_eq!(reply.json["inTextCitation"], "(Smith, 2020)");
    assert_eq!(reply.json["style"], "apa");
}

#[tokio::test]
async fn test_detect_with_model_reply_is_clamped() {
    let app = app_with_reply(Some(
        r#"Here you go: {"aiGenerated": 60, "aiRefined": 10, "humanWritten": 30, "sentences": [{"text": "Plain text.", "aiProbability": 95, "patterns": ["formal"]}]}"#,
    ));
    let reply = post(app, "/api/detect", r#"{"text": "Plain text."}"#).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json["engine"], "model");
    assert_eq!(reply.json["aiGenerated"], 25);
    assert_eq!(reply.json["aiRefined"], 4);
    assert_eq!(reply.json["humanWritten"], 80);
    assert_eq!(reply.json["sentences"][0]["highlighted"], true);
    assert_eq!(reply.json["highlightedText"], "***Plain text.***");
}

#[tokio::test]
async fn test_detect_with_unusable_model_reply_falls_back() {
    for reply in [None, Some("I cannot help with that.")] {
        let app = app_with_reply(reply);
        let resp = post(app, "/api/detect", r#"{"text": "Plain text."}"#).await;
        assert_eq!(resp.status, StatusCode::OK);
        assert_eq!(resp.json["engine"], "local");
        assert_eq!(resp.json["humanWritten"], 100);
    }
}

#[tokio::test]
async fn test_tool_uses_model_reply() {
    let app = app_with_reply(Some(r#"{"paraphrasedText": "  A reworded line.  ", "changes": []}"#));
    let reply = post(app, "/api/paraphrase", r#"{"text": "An original line."}"#).await;
    assert_eq!(reply.json["engine"], "model");
    assert_eq!(reply.json["paraphrasedText"], "A reworded line.");
    assert_eq!(reply.json["mode"], "standard");

    // Valid JSON but an empty answer is treated as unusable
    let app = app_with_reply(Some(r#"{"paraphrasedText": ""}"#));
    let reply = post(app, "/api/paraphrase", r#"{"text": "An original line."}"#).await;
    assert_eq!(reply.json["engine"], "local");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let reply = post(app_without_model(), "/api/nope", "{}").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.json["error"], "Not found");
}
