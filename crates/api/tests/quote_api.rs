//! Integration tests for book quotes and the favorites feed.

mod common;

use axum::http::StatusCode;
use axum::Router;
use sqlx::PgPool;

use common::*;

async fn create_quote(app: Router, token: &str, book_id: i64, text: &str) -> i64 {
    let response = post_json_auth(
        app,
        &format!("/api/books/{book_id}/quotes"),
        serde_json::json!({ "text": text }),
        token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn quote_crud(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Quotable").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/quotes"),
        serde_json::json!({ "text": "It was a dark and stormy night.", "page": 1 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let quote_id = json["id"].as_i64().unwrap();
    assert_eq!(json["text"], "It was a dark and stormy night.");
    assert_eq!(json["page"], 1);
    // New quotes start unfavorited.
    assert_eq!(json["favorite"], false);

    let json = body_json(get(app.clone(), &format!("/api/books/{book_id}/quotes")).await).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/quotes/{quote_id}"),
        serde_json::json!({ "text": "Revised.", "favorite": true }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["text"], "Revised.");
    assert_eq!(json["favorite"], true);
    // Absent page is left alone.
    assert_eq!(json["page"], 1);

    // Explicit null clears the page.
    let json = body_json(
        patch_json_auth(
            app.clone(),
            &format!("/api/books/{book_id}/quotes/{quote_id}"),
            serde_json::json!({ "page": null }),
            &token,
        )
        .await,
    )
    .await;
    assert_eq!(json["page"], serde_json::Value::Null);

    let response = delete_auth(
        app.clone(),
        &format!("/api/books/{book_id}/quotes/{quote_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The second delete is a 404, not a silent no-op.
    let response = delete_auth(
        app,
        &format!("/api/books/{book_id}/quotes/{quote_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn quote_validation(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Quotable").await;

    let response = post_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/quotes"),
        serde_json::json!({ "text": "   " }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/quotes"),
        serde_json::json!({ "text": "Negative.", "page": -3 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Quotes are addressed through their book; a wrong parent is a 404.
    let other = create_book(app.clone(), &token, "Other").await;
    let quote_id = create_quote(app.clone(), &token, book_id, "Anchored.").await;
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/books/{other}/quotes/{quote_id}"),
        serde_json::json!({ "favorite": true }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app,
        "/api/books/999999/quotes",
        serde_json::json!({ "text": "Ghost book." }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn favorites_feed_tracks_the_flag(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Quotable").await;
    let quote_id = create_quote(app.clone(), &token, book_id, "Keep this one.").await;
    create_quote(app.clone(), &token, book_id, "Not this one.").await;

    // Empty until something is favorited.
    let json = body_json(get(app.clone(), "/api/books/quotes/favorites").await).await;
    assert_eq!(json, serde_json::json!([]));

    patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/quotes/{quote_id}"),
        serde_json::json!({ "favorite": true }),
        &token,
    )
    .await;

    let json = body_json(get(app.clone(), "/api/books/quotes/favorites").await).await;
    let feed = json.as_array().unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["quoteId"], quote_id);
    assert_eq!(feed[0]["bookId"], book_id);
    assert_eq!(feed[0]["bookTitle"], "Quotable");
    assert_eq!(feed[0]["text"], "Keep this one.");

    // Unfavoriting removes it again.
    patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/quotes/{quote_id}"),
        serde_json::json!({ "favorite": false }),
        &token,
    )
    .await;
    let json = body_json(get(app, "/api/books/quotes/favorites").await).await;
    assert_eq!(json, serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn favorites_feed_clamps_limit(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Quotable").await;

    for i in 0..3 {
        let quote_id = create_quote(app.clone(), &token, book_id, &format!("Quote {i}")).await;
        patch_json_auth(
            app.clone(),
            &format!("/api/books/{book_id}/quotes/{quote_id}"),
            serde_json::json!({ "favorite": true }),
            &token,
        )
        .await;
    }

    let json = body_json(get(app.clone(), "/api/books/quotes/favorites?limit=2").await).await;
    assert_eq!(json.as_array().unwrap().len(), 2);

    // Nonsense limits clamp instead of erroring.
    let json = body_json(get(app, "/api/books/quotes/favorites?limit=-5").await).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}
