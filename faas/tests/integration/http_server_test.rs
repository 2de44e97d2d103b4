//! Integration Test: 実ポートでのHTTP疎通

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::net::TcpListener;

use crate::support::faas::{create_test_state, spawn_test_faas, MemoryPackageManager};

#[tokio::test]
async fn test_endpoint_over_http() {
    let (server, state) = spawn_test_faas().await;
    state
        .endpoints
        .create(
            "greet",
            "module.exports = async (req, res) => { res.set('X-Handler', 'greet').send('hi ' + (req.query.name || 'there')); };",
        )
        .await
        .unwrap();
    let client = Client::new();

    let response = client
        .get(server.url("/greet?name=faas"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-handler"], "greet");
    assert_eq!(response.text().await.unwrap(), "hi faas");

    let response = client.delete(server.url("/missing")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.text().await.unwrap(), "No such endpoint.");

    server.stop().await;
}

#[tokio::test]
async fn test_removed_endpoint_is_unknown() {
    let (server, state) = spawn_test_faas().await;
    state.endpoints.create("temp", "module.exports = (q, s) => s.end('x');").await.unwrap();
    let client = Client::new();

    let response = client.get(server.url("/temp")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    state.endpoints.remove("temp").await.unwrap();
    let response = client.get(server.url("/temp")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    server.stop().await;
}

#[tokio::test]
async fn test_serve_stops_when_shutdown_requested() {
    let state = create_test_state(Arc::new(MemoryPackageManager::default())).await;
    let shutdown = state.shutdown.clone();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(faas::server::serve(listener, state));

    let response = Client::new()
        .get(format!("http://{addr}/"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    shutdown.request_shutdown();
    tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .expect("server did not stop after shutdown request")
        .unwrap()
        .unwrap();
}
