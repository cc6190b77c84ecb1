//! HTTP-level tests of the mutation server router.

use std::fs;

use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use regex::Regex;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use vedit_cli::edit::EditService;
use vedit_cli::server::{AppState, OriginPolicy, router};
use vedit_config::VeditConfig;

const KEY: &str = "test-key";
const ORIGIN: &str = "http://localhost:3000";

fn app(temp: &TempDir) -> axum::Router {
    fs::create_dir_all(temp.path().join("src/components")).unwrap();
    fs::write(
        temp.path().join("src/components/Card.jsx"),
        "export const Card = () => <div className=\"p-2\">Card</div>;\n",
    )
    .unwrap();

    let mut config = VeditConfig::default();
    config.project.root = temp.path().to_path_buf();
    config.vcs.enabled = false;
    let origins = OriginPolicy::new(vec![Regex::new(r"^http://localhost(:\d+)?$").unwrap()]);
    router(AppState::new(EditService::new(&config), KEY, origins))
}

fn edit_request(key: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/edit-file")
        .header("content-type", "application/json")
        .header("origin", ORIGIN);
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ping() {
    let temp = TempDir::new().unwrap();
    let response = app(&temp)
        .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["time"].is_string());
}

#[tokio::test]
async fn test_missing_or_wrong_key_is_unauthorized() {
    let temp = TempDir::new().unwrap();
    let changes = json!({ "changes": [{ "type": "className" }] });

    for key in [None, Some("wrong")] {
        let response = app(&temp).oneshot(edit_request(key, changes.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()["access-control-allow-origin"], ORIGIN);
        assert_eq!(json_body(response).await, json!({ "error": "Unauthorized" }));
    }
}

#[tokio::test]
async fn test_empty_batch_is_bad_request() {
    let temp = TempDir::new().unwrap();
    let response = app(&temp)
        .oneshot(edit_request(Some(KEY), json!({ "changes": [] })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "No changes provided" }));
}

#[tokio::test]
async fn test_edit_applied() {
    let temp = TempDir::new().unwrap();
    let response = app(&temp)
        .oneshot(edit_request(
            Some(KEY),
            json!({
                "changes": [{
                    "type": "className",
                    "fileName": "Card",
                    "lineNumber": 1,
                    "component": "div",
                    "className": "p-4 rounded"
                }]
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["edits"][0]["file"], "/src/components/Card.jsx");
    assert_eq!(body["edits"][0]["oldData"], "p-2");
    assert!(body.get("rejectedChanges").is_none());

    let source = fs::read_to_string(temp.path().join("src/components/Card.jsx")).unwrap();
    assert!(source.contains("className=\"p-4 rounded\""));
}

#[tokio::test]
async fn test_preflight() {
    let temp = TempDir::new().unwrap();
    let preflight = |origin: &'static str| {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/edit-file")
            .header("origin", origin)
            .body(Body::empty())
            .unwrap()
    };

    let allowed = app(&temp).oneshot(preflight(ORIGIN)).await.unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
    assert_eq!(allowed.headers()["access-control-allow-origin"], ORIGIN);
    assert_eq!(allowed.headers()["access-control-allow-methods"], "POST, OPTIONS");

    let refused = app(&temp).oneshot(preflight("http://evil.test")).await.unwrap();
    assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    assert!(refused.headers().get("access-control-allow-origin").is_none());
}
