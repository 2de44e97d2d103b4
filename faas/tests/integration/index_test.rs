//! Integration Test: フロントページ

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use faas::api::index::EndpointIndex;
use tower::ServiceExt;

use crate::support::faas::create_test_app;

#[tokio::test]
async fn test_index_lists_endpoint_names() {
    let (app, state) = create_test_app().await;
    state.endpoints.create("beta", "code").await.unwrap();
    state.endpoints.create("alpha", "code").await.unwrap();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let index: EndpointIndex = serde_json::from_slice(&body).unwrap();
    assert_eq!(index.endpoints, vec!["alpha", "beta"]);
}

#[tokio::test]
async fn test_index_empty() {
    let (app, _) = create_test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json, serde_json::json!({ "endpoints": [] }));
}
