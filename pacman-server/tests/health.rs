use axum_test::TestServer;
use pretty_assertions::assert_eq;

mod common;
use common::test_router;

#[tokio::test]
async fn root_route_responds() {
    let server = TestServer::new(test_router()).unwrap();
    let response = server.get("/").await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn health_route_reports_ready() {
    let server = TestServer::new(test_router()).unwrap();
    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 200);
    let body: serde_json::Value = response.json();
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn create_room_route_returns_a_joinable_room_code() {
    let server = TestServer::new(test_router()).unwrap();
    let response = server.post("/rooms").await;
    assert_eq!(response.status_code(), 201);
    let body: serde_json::Value = response.json();
    let room_code = body["roomCode"].as_str().expect("roomCode is a string");
    assert_eq!(room_code.len(), 4);
}
