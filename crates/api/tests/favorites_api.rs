//! Integration tests for the favorites lists.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::*;

#[sqlx::test(migrations = "../db/migrations")]
async fn favorite_books_round_trip(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let fantasy = system_tag_id(&pool, "genres", "Fantasy").await;

    let response = post_json_auth(
        app.clone(),
        "/api/books",
        serde_json::json!({ "title": "Keeper", "genres": [fantasy] }),
        &token,
    )
    .await;
    let book_id = body_json(response).await["id"].as_i64().unwrap();

    let json = body_json(get_auth(app.clone(), "/api/favorites", &token).await).await;
    assert_eq!(json, serde_json::json!([]));

    let response = post_auth(app.clone(), &format!("/api/favorites/{book_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Idempotent re-add.
    let response = post_auth(app.clone(), &format!("/api/favorites/{book_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Full entities come back, tags included.
    let json = body_json(get_auth(app.clone(), "/api/favorites", &token).await).await;
    let books = json.as_array().unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Keeper");
    assert_eq!(books[0]["genres"], serde_json::json!([fantasy]));

    let response = delete_auth(app.clone(), &format!("/api/favorites/{book_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Idempotent removal.
    let response = delete_auth(app.clone(), &format!("/api/favorites/{book_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app, "/api/favorites", &token).await).await;
    assert_eq!(json, serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn favorite_sagas_round_trip(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Volume One").await;

    let response = post_json_auth(
        app.clone(),
        "/api/sagas",
        serde_json::json!({ "title": "Saved Saga", "books": [book_id] }),
        &token,
    )
    .await;
    let saga_id = body_json(response).await["id"].as_i64().unwrap();

    let response = post_auth(
        app.clone(),
        &format!("/api/favorites/sagas/{saga_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app.clone(), "/api/favorites/sagas", &token).await).await;
    let sagas = json.as_array().unwrap();
    assert_eq!(sagas.len(), 1);
    assert_eq!(sagas[0]["title"], "Saved Saga");
    assert_eq!(sagas[0]["books"], serde_json::json!([book_id]));

    let response = delete_auth(
        app.clone(),
        &format!("/api/favorites/sagas/{saga_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get_auth(app, "/api/favorites/sagas", &token).await).await;
    assert_eq!(json, serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn favorites_are_scoped_and_validated(pool: PgPool) {
    let app = build_test_app(pool);
    let alice = register_user(app.clone(), "Alice", "alice@example.com").await;
    let bob = register_user(app.clone(), "Bob", "bob@example.com").await;
    let book_id = create_book(app.clone(), &alice, "Shared Shelf").await;

    // Unknown targets are 404.
    let response = post_auth(app.clone(), "/api/favorites/999999", &alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = post_auth(app.clone(), "/api/favorites/sagas/999999", &alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Alice's favorites never leak into Bob's list.
    post_auth(app.clone(), &format!("/api/favorites/{book_id}"), &alice).await;
    let json = body_json(get_auth(app.clone(), "/api/favorites", &bob).await).await;
    assert_eq!(json, serde_json::json!([]));

    // Deleting the book drops it from the favorites list too.
    delete_auth(app.clone(), &format!("/api/books/{book_id}"), &alice).await;
    let json = body_json(get_auth(app, "/api/favorites", &alice).await).await;
    assert_eq!(json, serde_json::json!([]));
}
