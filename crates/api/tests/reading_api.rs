//! Integration tests for the append-only reading log.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;

use common::*;

#[sqlx::test(migrations = "../db/migrations")]
async fn entries_are_logged_and_listed_newest_first(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "In Progress").await;

    let response = post_json_auth(
        app.clone(),
        "/api/reading",
        serde_json::json!({
            "book": book_id,
            "date": "2026-08-01",
            "pagesRead": 40,
            "minutes": 55,
            "progress": 20,
            "note": "train ride",
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["book"], book_id);
    assert_eq!(json["pagesRead"], 40);
    assert_eq!(json["note"], "train ride");

    // A sparse entry is fine; every tracking field is optional.
    let response = post_json_auth(
        app.clone(),
        "/api/reading",
        serde_json::json!({ "book": book_id, "date": "2026-08-03" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get_auth(app.clone(), "/api/reading", &token).await).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["date"], "2026-08-03");
    assert_eq!(entries[1]["date"], "2026-08-01");
    assert_eq!(entries[0]["pagesRead"], serde_json::Value::Null);

    // The log is caller-scoped.
    let other = register_user(app.clone(), "Other", "other@example.com").await;
    let json = body_json(get_auth(app.clone(), "/api/reading", &other).await).await;
    assert_eq!(json, serde_json::json!([]));

    let response = get(app, "/api/reading").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn entry_validation(pool: PgPool) {
    let app = build_test_app(pool);
    let token = register_user(app.clone(), "Reader", "reader@example.com").await;
    let book_id = create_book(app.clone(), &token, "In Progress").await;

    let bad_bodies = [
        serde_json::json!({ "book": book_id, "date": "2026-08-01", "pagesRead": -1 }),
        serde_json::json!({ "book": book_id, "date": "2026-08-01", "minutes": -10 }),
        serde_json::json!({ "book": book_id, "date": "2026-08-01", "progress": 101 }),
        serde_json::json!({ "book": book_id, "date": "2026-08-01", "progress": -1 }),
        serde_json::json!({ "book": 999999, "date": "2026-08-01" }),
    ];
    for body in bad_bodies {
        let response = post_json_auth(app.clone(), "/api/reading", body.clone(), &token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
    }

    // Progress boundaries are inclusive.
    for progress in [0, 100] {
        let response = post_json_auth(
            app.clone(),
            "/api/reading",
            serde_json::json!({ "book": book_id, "date": "2026-08-01", "progress": progress }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
