//! Integration tests for the `/sagas` resource and the book/saga
//! membership endpoints.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::*;

#[sqlx::test(migrations = "../db/migrations")]
async fn create_saga_with_members(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let b1 = create_book(app.clone(), &token, "Volume One").await;
    let b2 = create_book(app.clone(), &token, "Volume Two").await;

    let response = post_json_auth(
        app.clone(),
        "/api/sagas",
        serde_json::json!({
            "title": "The Trilogy",
            "authors": ["A. Author"],
            "books": [b1, b2],
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["title"], "The Trilogy");
    let mut books: Vec<i64> = json["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_i64().unwrap())
        .collect();
    books.sort();
    assert_eq!(books, [b1, b2]);

    // Unknown member ids fail the whole create.
    let response = post_json_auth(
        app,
        "/api/sagas",
        serde_json::json!({ "title": "Broken", "books": [b1, 999999] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn get_saga_populates_members(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let b1 = create_book(app.clone(), &token, "Volume One").await;

    let response = post_json_auth(
        app.clone(),
        "/api/sagas",
        serde_json::json!({ "title": "The Trilogy", "books": [b1] }),
        &token,
    )
    .await;
    let saga_id = body_json(response).await["id"].as_i64().unwrap();

    let json = body_json(get(app.clone(), &format!("/api/sagas/{saga_id}")).await).await;
    assert_eq!(json["books"], serde_json::json!([b1]));

    let json = body_json(get(app, &format!("/api/sagas/{saga_id}?populate=1")).await).await;
    assert_eq!(json["books"][0]["id"], b1);
    assert_eq!(json["books"][0]["title"], "Volume One");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn set_book_saga_keeps_both_sides_consistent(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Wanderer").await;
    let saga_a = create_saga(app.clone(), &token, "Saga A").await;
    let saga_b = create_saga(app.clone(), &token, "Saga B").await;

    // Assign: the response carries the populated saga.
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/saga"),
        serde_json::json!({ "saga": saga_a }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["saga"]["id"], saga_a);
    assert_eq!(json["saga"]["title"], "Saga A");

    // The saga's member list reflects the assignment.
    let json = body_json(get(app.clone(), &format!("/api/sagas/{saga_a}")).await).await;
    assert_eq!(json["books"], serde_json::json!([book_id]));

    // Reassignment moves the membership, it does not accumulate.
    patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/saga"),
        serde_json::json!({ "saga": saga_b }),
        &token,
    )
    .await;
    let json = body_json(get(app.clone(), &format!("/api/sagas/{saga_a}")).await).await;
    assert_eq!(json["books"], serde_json::json!([]));
    let json = body_json(get(app.clone(), &format!("/api/sagas/{saga_b}")).await).await;
    assert_eq!(json["books"], serde_json::json!([book_id]));

    // Clearing via DELETE empties both sides.
    let response = delete_auth(app.clone(), &format!("/api/books/{book_id}/saga"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let json = body_json(get(app.clone(), &format!("/api/books/{book_id}")).await).await;
    assert_eq!(json["saga"], serde_json::Value::Null);
    let json = body_json(get(app.clone(), &format!("/api/sagas/{saga_b}")).await).await;
    assert_eq!(json["books"], serde_json::json!([]));

    // `{"saga": null}` through the PATCH clears as well.
    patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/saga"),
        serde_json::json!({ "saga": saga_a }),
        &token,
    )
    .await;
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/saga"),
        serde_json::json!({ "saga": null }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(get(app, &format!("/api/books/{book_id}")).await).await;
    assert_eq!(json["saga"], serde_json::Value::Null);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn set_saga_rejects_missing_target(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Wanderer").await;

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/saga"),
        serde_json::json!({ "saga": 999999 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing book with a valid target is a 404.
    let saga_id = create_saga(app.clone(), &token, "Saga").await;
    let response = patch_json_auth(
        app,
        "/api/books/999999/saga",
        serde_json::json!({ "saga": saga_id }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn saga_side_membership_leaves_book_pointer_alone(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Loose Volume").await;
    let saga_id = create_saga(app.clone(), &token, "Collection").await;

    let uri = format!("/api/sagas/{saga_id}/books/{book_id}");
    let response = post_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Idempotent re-add.
    let response = post_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let json = body_json(get(app.clone(), &format!("/api/sagas/{saga_id}")).await).await;
    assert_eq!(json["books"], serde_json::json!([book_id]));

    // The book's own pointer stays untouched.
    let json = body_json(get(app.clone(), &format!("/api/books/{book_id}")).await).await;
    assert_eq!(json["saga"], serde_json::Value::Null);

    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Removing an absent member is a no-op.
    let response = delete_auth(app.clone(), &uri, &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Unknown saga or book is a 404.
    let response = post_auth(app.clone(), &format!("/api/sagas/999999/books/{book_id}"), &token)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = post_auth(app, &format!("/api/sagas/{saga_id}/books/999999"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn saga_side_membership_survives_reassignment(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Shared Volume").await;
    let saga_a = create_saga(app.clone(), &token, "Saga A").await;
    let saga_b = create_saga(app.clone(), &token, "Saga B").await;

    // Saga-side-only membership in B, no book-side pointer.
    let response = post_auth(
        app.clone(),
        &format!("/api/sagas/{saga_b}/books/{book_id}"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Assigning the book's own pointer to A must not touch B's set.
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/saga"),
        serde_json::json!({ "saga": saga_a }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(get(app.clone(), &format!("/api/sagas/{saga_b}")).await).await;
    assert_eq!(json["books"], serde_json::json!([book_id]));

    // Clearing the pointer removes only A's membership.
    let response = delete_auth(app.clone(), &format!("/api/books/{book_id}/saga"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let json = body_json(get(app.clone(), &format!("/api/sagas/{saga_a}")).await).await;
    assert_eq!(json["books"], serde_json::json!([]));
    let json = body_json(get(app, &format!("/api/sagas/{saga_b}")).await).await;
    assert_eq!(json["books"], serde_json::json!([book_id]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn update_saga_replaces_member_list(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let b1 = create_book(app.clone(), &token, "Volume One").await;
    let b2 = create_book(app.clone(), &token, "Volume Two").await;

    let response = post_json_auth(
        app.clone(),
        "/api/sagas",
        serde_json::json!({ "title": "The Trilogy", "books": [b1] }),
        &token,
    )
    .await;
    let saga_id = body_json(response).await["id"].as_i64().unwrap();

    // Empty patch body is rejected.
    let response = patch_json_auth(
        app.clone(),
        &format!("/api/sagas/{saga_id}"),
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/sagas/{saga_id}"),
        serde_json::json!({ "books": [b2] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["books"], serde_json::json!([b2]));

    let response = patch_json_auth(
        app,
        &format!("/api/sagas/{saga_id}"),
        serde_json::json!({ "title": "Renamed Trilogy" }),
        &token,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["title"], "Renamed Trilogy");
    // Members untouched by an unrelated patch.
    assert_eq!(json["books"], serde_json::json!([b2]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn list_sagas_filters_and_paginates(pool: PgPool) {
    let app = build_test_app(pool.clone());
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let fantasy = system_tag_id(&pool, "genres", "Fantasy").await;

    post_json_auth(
        app.clone(),
        "/api/sagas",
        serde_json::json!({ "title": "Dragon Cycle", "genres": [fantasy] }),
        &token,
    )
    .await;
    create_saga(app.clone(), &token, "Summer Duet").await;

    let json = body_json(get(app.clone(), "/api/sagas?q=dragon").await).await;
    assert_eq!(json["total"], 1);
    assert_eq!(json["items"][0]["title"], "Dragon Cycle");

    let json = body_json(get(app.clone(), &format!("/api/sagas?genres={fantasy}")).await).await;
    assert_eq!(json["total"], 1);

    let json = body_json(get(app.clone(), "/api/sagas?sort=title").await).await;
    assert_eq!(json["items"][0]["title"], "Dragon Cycle");
    assert_eq!(json["page"], 1);

    let json = body_json(get(app, "/api/sagas?sort=-title").await).await;
    assert_eq!(json["items"][0]["title"], "Summer Duet");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_saga_detaches_books(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "Volume One").await;
    let saga_id = create_saga(app.clone(), &token, "Doomed Saga").await;

    patch_json_auth(
        app.clone(),
        &format!("/api/books/{book_id}/saga"),
        serde_json::json!({ "saga": saga_id }),
        &token,
    )
    .await;

    let response = delete_auth(app.clone(), &format!("/api/sagas/{saga_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The book survives with its pointer cleared.
    let json = body_json(get(app.clone(), &format!("/api/books/{book_id}")).await).await;
    assert_eq!(json["saga"], serde_json::Value::Null);

    let response = get(app, &format!("/api/sagas/{saga_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
