//! Route definitions for the caller's saved books and sagas.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::favorites;
use crate::state::AppState;

/// Favorites routes mounted at `/favorites`.
///
/// ```text
/// GET    /                    -> list_books
/// POST   /{bookId}            -> add_book
/// DELETE /{bookId}            -> remove_book
/// GET    /sagas               -> list_sagas
/// POST   /sagas/{sagaId}      -> add_saga
/// DELETE /sagas/{sagaId}      -> remove_saga
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::list_books))
        .route("/sagas", get(favorites::list_sagas))
        .route(
            "/sagas/{saga_id}",
            post(favorites::add_saga).delete(favorites::remove_saga),
        )
        .route(
            "/{book_id}",
            post(favorites::add_book).delete(favorites::remove_book),
        )
}
