//! Route definitions for the tag catalog.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// Tag catalog routes mounted at `/tags`.
///
/// ```text
/// GET    /categories   -> list_categories
/// POST   /             -> create_tag
/// DELETE /{id}         -> delete_tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(tags::list_categories))
        .route("/", post(tags::create_tag))
        .route("/{id}", delete(tags::delete_tag))
}
