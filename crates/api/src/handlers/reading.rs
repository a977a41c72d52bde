//! Handlers for the append-only reading log.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use shelflog_core::error::CoreError;
use shelflog_db::models::reading_entry::{CreateReadingEntry, ReadingEntry};
use shelflog_db::repositories::{BookRepo, ReadingRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/reading
///
/// The caller's entries, newest date first.
pub async fn list_entries(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<ReadingEntry>>> {
    let entries = ReadingRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(entries))
}

/// POST /api/reading
pub async fn create_entry(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateReadingEntry>,
) -> AppResult<(StatusCode, Json<ReadingEntry>)> {
    if matches!(input.pages_read, Some(p) if p < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "pagesRead must not be negative".into(),
        )));
    }
    if matches!(input.minutes, Some(m) if m < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "minutes must not be negative".into(),
        )));
    }
    if matches!(input.progress, Some(p) if !(0..=100).contains(&p)) {
        return Err(AppError::Core(CoreError::Validation(
            "progress must be between 0 and 100".into(),
        )));
    }

    if !BookRepo::exists(&state.pool, input.book).await? {
        return Err(AppError::BadRequest("Book does not exist".into()));
    }

    let entry = ReadingRepo::create(&state.pool, user.user_id, &input).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
