use std::sync::Arc;

use authdemo::{
    app::build_app,
    auth::store::CredentialStore,
    config::{AppConfig, Environment},
    state::AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

async fn test_state() -> AppState {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("open in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    let config = Arc::new(AppConfig {
        database_url: "sqlite::memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        environment: Environment::Development,
    });
    AppState::from_parts(CredentialStore::new(pool), config)
}

async fn test_app() -> Router {
    build_app(test_state().await)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

#[tokio::test]
async fn health_reports_ok() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["env"], json!("development"));
}

#[tokio::test]
async fn register_returns_created_with_public_user() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "name": "Alice", "email": "alice@example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["user"]["email"], json!("alice@example.com"));
    assert_eq!(body["user"]["name"], json!("Alice"));
    assert!(body["user"]["id"].is_i64());
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn register_with_missing_fields_is_bad_request() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "email": "alice@example.com" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let app = test_app().await;
    let first = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "name": "A", "email": "dup@x.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "name": "B", "email": "dup@x.com", "password": "secret2" }),
        ))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = body_json(second).await;
    assert_eq!(body["error"], json!("Email already registered"));

    // the first credentials still log in
    let login = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "dup@x.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_round_trip_returns_the_registered_user() {
    let app = test_app().await;
    let registered = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "name": "Bob", "email": "Bob@Example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(registered.status(), StatusCode::CREATED);
    let registered = body_json(registered).await;

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "bob@example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["user"]["id"], registered["user"]["id"]);
    assert_eq!(body["user"]["email"], json!("bob@example.com"));
}

#[tokio::test]
async fn bad_credentials_are_unauthorized_and_uniform() {
    let app = test_app().await;
    app.clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({ "name": "Carol", "email": "carol@example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();

    let wrong_password = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "carol@example.com", "password": "not-it" }),
        ))
        .await
        .unwrap();
    let unknown_email = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "ghost@example.com", "password": "secret1" }),
        ))
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);

    let wrong_body = body_json(wrong_password).await;
    let unknown_body = body_json(unknown_email).await;
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"], json!("Invalid credentials"));
}

#[tokio::test]
async fn login_with_missing_password_is_bad_request() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json("/api/auth/login", json!({ "email": "x@y.com" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn seeded_demo_account_can_log_in() {
    let state = test_state().await;
    state.auth.ensure_seeded().await.expect("seed");
    let app = build_app(state);

    let response = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "admin@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], json!("admin@example.com"));
}
