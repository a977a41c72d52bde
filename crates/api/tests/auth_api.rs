//! Integration tests for registration, login, and token enforcement.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::*;

#[sqlx::test(migrations = "../db/migrations")]
async fn register_returns_token_and_user(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/auth/register",
        serde_json::json!({
            "name": "Reader One",
            "email": "reader@example.com",
            "password": "test_password_123!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert!(json["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(json["user"]["name"], "Reader One");
    assert_eq!(json["user"]["email"], "reader@example.com");
    assert!(json["user"]["id"].as_i64().is_some());
    // Password material never leaves the server.
    assert!(json["user"].get("passwordHash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_duplicate_email_conflicts(pool: PgPool) {
    let app = build_test_app(pool);
    register_user(app.clone(), "First", "dup@example.com").await;

    let response = post_json(
        app,
        "/api/auth/register",
        serde_json::json!({
            "name": "Second",
            "email": "dup@example.com",
            "password": "another_password_1!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let json = body_json(response).await;
    assert_eq!(json["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_email_is_normalized(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/auth/register",
        serde_json::json!({
            "name": "Mixed Case",
            "email": "Mixed.Case@Example.COM",
            "password": "test_password_123!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["user"]["email"], "mixed.case@example.com");

    // Login with the original casing still works.
    let response = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({
            "email": "MIXED.CASE@example.com",
            "password": "test_password_123!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn register_rejects_weak_input(pool: PgPool) {
    let app = build_test_app(pool);

    // Password shorter than the minimum.
    let response = post_json(
        app.clone(),
        "/api/auth/register",
        serde_json::json!({
            "name": "Shorty",
            "email": "short@example.com",
            "password": "short",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Name too short after trimming.
    let response = post_json(
        app,
        "/api/auth/register",
        serde_json::json!({
            "name": " a ",
            "email": "name@example.com",
            "password": "test_password_123!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_round_trip(pool: PgPool) {
    let app = build_test_app(pool);
    register_user(app.clone(), "Login User", "login@example.com").await;

    let response = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({
            "email": "login@example.com",
            "password": "test_password_123!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(json["user"]["email"], "login@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_wrong_password_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);
    register_user(app.clone(), "Login User", "login@example.com").await;

    let response = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({
            "email": "login@example.com",
            "password": "not_the_password_1!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_unknown_email_is_unauthorized(pool: PgPool) {
    let app = build_test_app(pool);

    // Same status and message as a wrong password: no account probing.
    let response = post_json(
        app,
        "/api/auth/login",
        serde_json::json!({
            "email": "nobody@example.com",
            "password": "test_password_123!",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid credentials");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn mutations_require_a_token(pool: PgPool) {
    let app = build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/books",
        serde_json::json!({ "title": "No Token" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(
        app,
        "/api/books",
        serde_json::json!({ "title": "Bad Token" }),
        "not-a-real-jwt",
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reads_are_public(pool: PgPool) {
    let app = build_test_app(pool);

    let response = get(app, "/api/books").await;
    assert_eq!(response.status(), StatusCode::OK);
}
