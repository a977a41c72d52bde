//! Route definitions for reviews.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::reviews;
use crate::state::AppState;

/// Review routes mounted at `/reviews`.
///
/// ```text
/// GET    /by-book/{bookId}   -> list_by_book (public)
/// POST   /                   -> create_review
/// PATCH  /{id}               -> update_review
/// DELETE /{id}               -> delete_review
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/by-book/{book_id}", get(reviews::list_by_book))
        .route("/", post(reviews::create_review))
        .route(
            "/{id}",
            patch(reviews::update_review).delete(reviews::delete_review),
        )
}
