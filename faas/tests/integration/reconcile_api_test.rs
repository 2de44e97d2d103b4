//! Integration Test: パッケージ同期の手動トリガー

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use faas::api::{self, RECONCILE_PATH};
use tower::ServiceExt;

use crate::support::faas::{create_test_state, MemoryPackageManager};

fn trigger() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(RECONCILE_PATH)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_trigger_installs_missing_packages() {
    let manager = Arc::new(MemoryPackageManager::with_installed(&["alpha-core"]));
    let state = create_test_state(manager.clone()).await;
    state.packages.add("alpha").await.unwrap();
    state.packages.add("beta").await.unwrap();
    let app = api::create_app(state);

    let response = app.oneshot(trigger()).await.unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let report: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(report["installed"], serde_json::json!(["beta"]));
    assert_eq!(report["satisfied"], serde_json::json!(["alpha"]));
    assert_eq!(manager.install_calls(), vec!["beta"]);
}

#[tokio::test]
async fn test_trigger_during_pass_is_conflict() {
    let manager = Arc::new(MemoryPackageManager {
        install_delay: Duration::from_millis(300),
        ..MemoryPackageManager::default()
    });
    let state = create_test_state(manager.clone()).await;
    state.packages.add("slow").await.unwrap();
    let app = api::create_app(state);

    let first = tokio::spawn(app.clone().oneshot(trigger()));
    tokio::time::sleep(Duration::from_millis(50)).await;

    let response = app.oneshot(trigger()).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.status(), StatusCode::ACCEPTED);
    assert_eq!(manager.install_calls(), vec!["slow"]);
}

#[tokio::test]
async fn test_reserved_prefix_cannot_shadow_admin_route() {
    let manager = Arc::new(MemoryPackageManager::default());
    let state = create_test_state(manager).await;
    assert!(state.endpoints.create("_faas", "code").await.is_err());
}
