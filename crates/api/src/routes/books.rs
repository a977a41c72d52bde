//! Route definitions for books, their quotes, and their tag/saga
//! sub-resources.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{books, quotes};
use crate::state::AppState;

/// Book routes mounted at `/books`.
///
/// The static `/quotes/favorites` segment takes priority over `/{id}`, and
/// the static `/{id}/quotes/...` segment over `/{id}/{catKey}/{tagId}`, so
/// the granular tag routes never shadow the quote routes.
///
/// ```text
/// GET    /                        -> list_books
/// POST   /                        -> create_book
/// GET    /quotes/favorites        -> favorite_quotes
/// GET    /{id}                    -> get_book
/// PATCH  /{id}                    -> update_book
/// DELETE /{id}                    -> delete_book
/// PATCH  /{id}/status             -> update_status
/// PATCH  /{id}/release            -> update_release
/// PATCH  /{id}/saga               -> set_saga
/// DELETE /{id}/saga               -> clear_saga
/// GET    /{id}/quotes             -> list_quotes
/// POST   /{id}/quotes             -> create_quote
/// PATCH  /{id}/quotes/{qid}       -> update_quote
/// DELETE /{id}/quotes/{qid}       -> delete_quote
/// POST   /{id}/{catKey}/{tagId}   -> attach_tag
/// DELETE /{id}/{catKey}/{tagId}   -> detach_tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(books::list_books).post(books::create_book))
        .route("/quotes/favorites", get(quotes::favorite_quotes))
        .route(
            "/{id}",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        .route("/{id}/status", patch(books::update_status))
        .route("/{id}/release", patch(books::update_release))
        .route("/{id}/saga", patch(books::set_saga).delete(books::clear_saga))
        .route(
            "/{id}/quotes",
            get(quotes::list_quotes).post(quotes::create_quote),
        )
        .route(
            "/{id}/quotes/{qid}",
            patch(quotes::update_quote).delete(quotes::delete_quote),
        )
        .route(
            "/{id}/{cat_key}/{tag_id}",
            post(books::attach_tag).delete(books::detach_tag),
        )
}
