//! Handlers for the caller's saved books and sagas.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shelflog_core::error::CoreError;
use shelflog_core::taxonomy::EntityKind;
use shelflog_core::types::DbId;
use shelflog_db::models::book::BookView;
use shelflog_db::models::saga::SagaView;
use shelflog_db::repositories::{BookRepo, FavoriteRepo, SagaRepo, TagRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/favorites
///
/// The caller's saved books as full entities (references left as ids).
pub async fn list_books(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<BookView>>> {
    let books = FavoriteRepo::books_for(&state.pool, user.user_id).await?;
    let ids: Vec<DbId> = books.iter().map(|b| b.id).collect();
    let tags = TagRepo::tags_for_entities(&state.pool, EntityKind::Book, &ids).await?;
    let views = books
        .into_iter()
        .map(|book| BookView::assemble(book, &tags, None, false))
        .collect();
    Ok(Json(views))
}

/// GET /api/favorites/sagas
pub async fn list_sagas(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<SagaView>>> {
    let sagas = FavoriteRepo::sagas_for(&state.pool, user.user_id).await?;
    let ids: Vec<DbId> = sagas.iter().map(|s| s.id).collect();
    let tags = TagRepo::tags_for_entities(&state.pool, EntityKind::Saga, &ids).await?;
    let members = SagaRepo::members_for(&state.pool, &ids).await?;
    let views = sagas
        .into_iter()
        .map(|saga| SagaView::assemble(saga, &tags, &members, false))
        .collect();
    Ok(Json(views))
}

/// POST /api/favorites/:bookId
///
/// Idempotent set-add; only an unknown book fails (404).
pub async fn add_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(book_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !BookRepo::exists(&state.pool, book_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Book",
            id: book_id,
        }));
    }
    FavoriteRepo::add_book(&state.pool, user.user_id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/favorites/:bookId
///
/// Idempotent set-remove.
pub async fn remove_book(
    State(state): State<AppState>,
    user: AuthUser,
    Path(book_id): Path<DbId>,
) -> AppResult<StatusCode> {
    FavoriteRepo::remove_book(&state.pool, user.user_id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/favorites/sagas/:sagaId
pub async fn add_saga(
    State(state): State<AppState>,
    user: AuthUser,
    Path(saga_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SagaRepo::exists(&state.pool, saga_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Saga",
            id: saga_id,
        }));
    }
    FavoriteRepo::add_saga(&state.pool, user.user_id, saga_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/favorites/sagas/:sagaId
pub async fn remove_saga(
    State(state): State<AppState>,
    user: AuthUser,
    Path(saga_id): Path<DbId>,
) -> AppResult<StatusCode> {
    FavoriteRepo::remove_saga(&state.pool, user.user_id, saga_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
