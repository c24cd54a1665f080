//! Router-level tests that never touch a live store.
//!
//! The MongoDB driver connects lazily, so a router built over an unreachable
//! connection string happily serves every request the service rejects before
//! its first store call.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use mongodb::Client;
use tower::ServiceExt;

use taskboard::api::{app, AppState};
use taskboard::{Config, TaskStore};

async fn test_app() -> Router {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        mongodb_uri: "mongodb://127.0.0.1:1/?connectTimeoutMS=100&serverSelectionTimeoutMS=100"
            .to_string(),
        db_name: "taskboard-test".to_string(),
        collection_name: "tasks".to_string(),
    };
    let client = Client::with_uri_str(&config.mongodb_uri)
        .await
        .expect("connection string should parse");
    let store = TaskStore::with_client(&client, &config.db_name, &config.collection_name);
    app(Arc::new(AppState { config, store }))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn with_json_body(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn home_route_reports_liveness() {
    let response = test_app().await.oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body[..], b"Task service is running");
}

#[tokio::test]
async fn malformed_identifiers_are_rejected_before_the_store() {
    let app = test_app().await;

    for id in ["xyz", "507f1f77bcf86cd79943901", "507f1f77bcf86cd79943901g"] {
        let requests = vec![
            get(&format!("/browse-tasks/{id}")),
            get(&format!("/tasks/{id}")),
            get(&format!("/tasks/{id}/bids")),
            with_json_body("POST", &format!("/tasks/{id}/bid"), ""),
            with_json_body("PUT", &format!("/tasks/{id}"), r#"{"title":"x"}"#),
            Request::builder()
                .method("DELETE")
                .uri(format!("/tasks/{id}"))
                .body(Body::empty())
                .unwrap(),
        ];
        for request in requests {
            let uri = request.uri().clone();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::BAD_REQUEST,
                "{uri} with id {id:?}"
            );
        }
    }
}

#[tokio::test]
async fn missing_user_email_is_rejected() {
    let app = test_app().await;

    let response = app.clone().oneshot(get("/my-posted-task")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(get("/my-posted-task?userEmail="))
        .await
        .unwrap();
    // An empty value still identifies a (vacuous) owner filter; only the
    // absent parameter is a validation error.
    assert_ne!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_rejects_non_object_bodies() {
    let app = test_app().await;

    for body in [r#"["fix sink"]"#, r#""fix sink""#, "42"] {
        let response = app
            .clone()
            .oneshot(with_json_body("POST", "/add-task", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body:?}");
    }
}

#[tokio::test]
async fn replace_rejects_a_body_with_nothing_to_apply() {
    let app = test_app().await;

    // Only the immutable identifier in the body: nothing left to set.
    let response = app
        .clone()
        .oneshot(with_json_body(
            "PUT",
            "/tasks/507f1f77bcf86cd799439011",
            r#"{"_id":"ffffffffffffffffffffffff"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(with_json_body(
            "PUT",
            "/tasks/507f1f77bcf86cd799439011",
            r#"["not","an","object"]"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
