//! Route definitions for sagas and their member/tag sub-resources.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sagas;
use crate::state::AppState;

/// Saga routes mounted at `/sagas`.
///
/// ```text
/// GET    /                        -> list_sagas
/// POST   /                        -> create_saga
/// GET    /{id}                    -> get_saga
/// PATCH  /{id}                    -> update_saga
/// DELETE /{id}                    -> delete_saga
/// POST   /{id}/books/{bookId}     -> add_book
/// DELETE /{id}/books/{bookId}     -> remove_book
/// POST   /{id}/{catKey}/{tagId}   -> attach_tag
/// DELETE /{id}/{catKey}/{tagId}   -> detach_tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sagas::list_sagas).post(sagas::create_saga))
        .route(
            "/{id}",
            get(sagas::get_saga)
                .patch(sagas::update_saga)
                .delete(sagas::delete_saga),
        )
        .route(
            "/{id}/books/{book_id}",
            post(sagas::add_book).delete(sagas::remove_book),
        )
        .route(
            "/{id}/{cat_key}/{tag_id}",
            post(sagas::attach_tag).delete(sagas::detach_tag),
        )
}
