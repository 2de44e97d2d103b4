//! Integration Test: ディスパッチ
//!
//! ルーター経由でエンドポイントを呼び出し、障害がリクエスト単位に閉じることを確認する。

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use faas::api;
use faas::config::{ExecutionConfig, ReconcileConfig};
use tower::ServiceExt;

use crate::support::faas::{
    create_test_app, create_test_state_with, create_test_state_with_reconcile, MemoryPackageManager,
};

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_empty_endpoint_for_non_get_root() {
    let (app, _) = create_test_app().await;

    let response = app.oneshot(request("POST", "/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "Empty endpoint.");
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let (app, _) = create_test_app().await;

    let response = app.oneshot(request("GET", "/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_string(response).await, "No such endpoint.");
}

#[tokio::test]
async fn test_default_handler_responds() {
    let (app, state) = create_test_app().await;
    state
        .endpoints
        .create("hello", &faas::common::types::Endpoint::default_code("hello"))
        .await
        .unwrap();

    let response = app.oneshot(request("GET", "/hello/extra")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "Hello hello!");
}

#[tokio::test]
async fn test_throwing_handler_then_healthy_handler() {
    let (app, state) = create_test_app().await;
    state
        .endpoints
        .create(
            "broken",
            "module.exports = (req, res, secrets) => { throw new Error(secrets.TOKEN); };",
        )
        .await
        .unwrap();
    state
        .endpoints
        .create("ok", "module.exports = (req, res) => res.status(201).json({ ok: true });")
        .await
        .unwrap();
    state.secrets.set("TOKEN", "do-not-leak").await.unwrap();

    let response = app.clone().oneshot(request("GET", "/broken")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert_eq!(body, "Internal server error.");
    assert!(!body.contains("do-not-leak"));

    let response = app.oneshot(request("GET", "/ok")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
    assert_eq!(body_string(response).await, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_request_details_reach_handler() {
    let (app, state) = create_test_app().await;
    state
        .endpoints
        .create(
            "echo",
            r#"module.exports = (req, res) => res.json({
                method: req.method,
                path: req.path,
                url: req.originalUrl,
                q: req.query.q,
                header: req.headers['x-custom'],
                body: req.body
            });"#,
        )
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/echo/sub?q=1")
                .header("X-Custom", "yes")
                .body(Body::from("hi"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["method"], "POST");
    assert_eq!(json["path"], "/echo/sub");
    assert_eq!(json["url"], "/echo/sub?q=1");
    assert_eq!(json["q"], "1");
    assert_eq!(json["header"], "yes");
    assert_eq!(json["body"], "hi");
}

#[tokio::test]
async fn test_timeout_when_configured() {
    let execution = ExecutionConfig {
        timeout: Some(Duration::from_millis(100)),
        loop_iteration_limit: None,
    };
    let state =
        create_test_state_with(Arc::new(MemoryPackageManager::default()), execution).await;
    state
        .endpoints
        .create(
            "spin",
            "module.exports = () => { var end = Date.now() + 1000; while (Date.now() < end) {} };",
        )
        .await
        .unwrap();
    let app = api::create_app(state);

    let response = app.oneshot(request("GET", "/spin")).await.unwrap();
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body_string(response).await, "Endpoint timed out.");
}

#[tokio::test]
async fn test_handler_requires_installed_package() {
    let packages = tempfile::TempDir::new().unwrap();
    let package = packages.path().join("node_modules").join("left-pad");
    std::fs::create_dir_all(&package).unwrap();
    std::fs::write(
        package.join("package.json"),
        r#"{"name":"left-pad","main":"main.js"}"#,
    )
    .unwrap();
    std::fs::write(
        package.join("main.js"),
        "module.exports = (s, n, c) => String(c || ' ').repeat(Math.max(0, n - String(s).length)) + s;",
    )
    .unwrap();

    let reconcile = ReconcileConfig {
        packages_dir: packages.path().to_path_buf(),
        ..ReconcileConfig::default()
    };
    let state = create_test_state_with_reconcile(
        Arc::new(MemoryPackageManager::default()),
        ExecutionConfig::default(),
        &reconcile,
    )
    .await;
    state
        .endpoints
        .create(
            "pad",
            "const pad = require('left-pad');\nmodule.exports = (req, res) => res.send(pad(req.query.v, 5, '0'));",
        )
        .await
        .unwrap();
    state
        .endpoints
        .create("missing", "const x = require('not-installed');\nmodule.exports = (req, res) => res.end();")
        .await
        .unwrap();
    let app = api::create_app(state);

    let response = app.clone().oneshot(request("GET", "/pad?v=42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "00042");

    let response = app.oneshot(request("GET", "/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_string(response).await, "Internal server error.");
}
