//! Route definitions for the reading log.

use axum::routing::get;
use axum::Router;

use crate::handlers::reading;
use crate::state::AppState;

/// Reading log routes mounted at `/reading`.
///
/// ```text
/// GET  /   -> list_entries
/// POST /   -> create_entry
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(reading::list_entries).post(reading::create_entry))
}
