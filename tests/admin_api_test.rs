//! Control API contract tests: status codes and body shapes.

use axum::http::StatusCode;
use serde_json::json;

mod common;

async fn spawn_admin_proxy() -> common::TestProxy {
    let backend = common::start_mock_backend("ok").await;
    common::spawn_proxy(&[backend], "round-robin", 100, 10.0, None).await
}

#[tokio::test]
async fn create_returns_201_with_record() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    let res = client
        .post(proxy.url("/clients"))
        .query(&[("client_id", "u1")])
        .json(&json!({ "capacity": 3, "refill_rate": 1.5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["client_id"], "u1");
    assert_eq!(body["capacity"], 3);
    assert_eq!(body["refill_rate"], 1.5);
    assert_eq!(body["message"], "Client created successfully");

    proxy.stop();
}

#[tokio::test]
async fn create_without_client_id_is_400() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    let res = client
        .post(proxy.url("/clients"))
        .json(&json!({ "capacity": 3, "refill_rate": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], 400);
    assert_eq!(body["message"], "client_id is required");

    proxy.stop();
}

#[tokio::test]
async fn create_with_malformed_body_is_400() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    let res = client
        .post(proxy.url("/clients"))
        .query(&[("client_id", "u1")])
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Invalid request body");

    proxy.stop();
}

#[tokio::test]
async fn get_unknown_client_is_404() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    let res = client
        .get(proxy.url("/clients/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], 404);
    assert_eq!(body["message"], "Client not found");

    proxy.stop();
}

#[tokio::test]
async fn get_after_create_returns_record() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    client
        .post(proxy.url("/clients"))
        .query(&[("client_id", "u1")])
        .json(&json!({ "capacity": 7, "refill_rate": 0.5 }))
        .send()
        .await
        .unwrap();

    let res = client.get(proxy.url("/clients/u1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["client_id"], "u1");
    assert_eq!(body["capacity"], 7);
    assert_eq!(body["refill_rate"], 0.5);
    assert!(body.get("message").is_none());

    proxy.stop();
}

#[tokio::test]
async fn update_unknown_client_is_404() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    let res = client
        .put(proxy.url("/clients/ghost"))
        .json(&json!({ "capacity": 1, "refill_rate": 0.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    proxy.stop();
}

#[tokio::test]
async fn update_changes_record() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    client
        .post(proxy.url("/clients"))
        .query(&[("client_id", "u1")])
        .json(&json!({ "capacity": 3, "refill_rate": 1.0 }))
        .send()
        .await
        .unwrap();

    let res = client
        .put(proxy.url("/clients/u1"))
        .json(&json!({ "capacity": 9, "refill_rate": 2.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Client updated successfully");

    let res = client.get(proxy.url("/clients/u1")).send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["capacity"], 9);
    assert_eq!(body["refill_rate"], 2.0);

    proxy.stop();
}

#[tokio::test]
async fn delete_unknown_client_is_404() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    let res = client
        .delete(proxy.url("/clients/ghost"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    proxy.stop();
}

#[tokio::test]
async fn delete_removes_client() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    client
        .post(proxy.url("/clients"))
        .query(&[("client_id", "u1")])
        .json(&json!({ "capacity": 3, "refill_rate": 1.0 }))
        .send()
        .await
        .unwrap();

    let res = client
        .delete(proxy.url("/clients/u1"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Client deleted successfully");

    let res = client.get(proxy.url("/clients/u1")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    proxy.stop();
}

#[tokio::test]
async fn list_returns_all_clients() {
    let proxy = spawn_admin_proxy().await;
    let client = common::test_client();

    for (id, capacity) in [("u1", 1), ("u2", 2)] {
        client
            .post(proxy.url("/clients"))
            .query(&[("client_id", id)])
            .json(&json!({ "capacity": capacity, "refill_rate": 1.0 }))
            .send()
            .await
            .unwrap();
    }

    let res = client.get(proxy.url("/clients")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let mut body: Vec<serde_json::Value> = res.json().await.unwrap();
    body.sort_by_key(|record| record["client_id"].as_str().unwrap().to_string());

    assert_eq!(body.len(), 2);
    assert_eq!(body[0]["client_id"], "u1");
    assert_eq!(body[0]["capacity"], 1);
    assert_eq!(body[1]["client_id"], "u2");
    assert_eq!(body[1]["capacity"], 2);

    proxy.stop();
}
