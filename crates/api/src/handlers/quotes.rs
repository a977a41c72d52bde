//! Handlers for book quotes, addressed only through their parent book,
//! plus the cross-book favorites feed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use shelflog_core::error::CoreError;
use shelflog_core::types::DbId;
use shelflog_db::models::quote::{CreateQuote, FavoriteQuote, Quote, UpdateQuote};
use shelflog_db::repositories::{BookRepo, QuoteRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Default number of quotes in the favorites feed.
const DEFAULT_FAVORITES_LIMIT: i64 = 20;

/// Maximum number of quotes in the favorites feed.
const MAX_FAVORITES_LIMIT: i64 = 100;

/// Query parameters for `GET /books/quotes/favorites`.
#[derive(Debug, Default, Deserialize)]
pub struct FavoritesQuery {
    pub limit: Option<i64>,
}

async fn ensure_book_exists(state: &AppState, book_id: DbId) -> AppResult<()> {
    if !BookRepo::exists(&state.pool, book_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Book",
            id: book_id,
        }));
    }
    Ok(())
}

fn quote_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Quote",
        id,
    })
}

fn validate_page(page: Option<i32>) -> AppResult<()> {
    if matches!(page, Some(p) if p < 0) {
        return Err(AppError::Core(CoreError::Validation(
            "Page must not be negative".into(),
        )));
    }
    Ok(())
}

/// GET /api/books/:id/quotes
pub async fn list_quotes(
    State(state): State<AppState>,
    Path(book_id): Path<DbId>,
) -> AppResult<Json<Vec<Quote>>> {
    ensure_book_exists(&state, book_id).await?;
    let quotes = QuoteRepo::list_for_book(&state.pool, book_id).await?;
    Ok(Json(quotes))
}

/// POST /api/books/:id/quotes
pub async fn create_quote(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(book_id): Path<DbId>,
    Json(input): Json<CreateQuote>,
) -> AppResult<(StatusCode, Json<Quote>)> {
    let text = input.text.trim();
    if text.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Quote text must not be empty".into(),
        )));
    }
    validate_page(input.page)?;
    ensure_book_exists(&state, book_id).await?;

    let quote = QuoteRepo::create(&state.pool, book_id, text, input.page).await?;
    Ok((StatusCode::CREATED, Json(quote)))
}

/// PATCH /api/books/:id/quotes/:qid
pub async fn update_quote(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((book_id, quote_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateQuote>,
) -> AppResult<Json<Quote>> {
    if let Some(text) = &input.text {
        if text.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Quote text must not be empty".into(),
            )));
        }
    }
    if let Some(page) = input.page {
        validate_page(page)?;
    }

    let quote = QuoteRepo::update(&state.pool, book_id, quote_id, &input)
        .await?
        .ok_or_else(|| quote_not_found(quote_id))?;
    Ok(Json(quote))
}

/// DELETE /api/books/:id/quotes/:qid
///
/// Deleting the same quote twice is 404 the second time, not a no-op.
pub async fn delete_quote(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((book_id, quote_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !QuoteRepo::delete(&state.pool, book_id, quote_id).await? {
        return Err(quote_not_found(quote_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/books/quotes/favorites
///
/// Newest favorite quotes across all books.
pub async fn favorite_quotes(
    State(state): State<AppState>,
    Query(query): Query<FavoritesQuery>,
) -> AppResult<Json<Vec<FavoriteQuote>>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_FAVORITES_LIMIT)
        .clamp(1, MAX_FAVORITES_LIMIT);
    let quotes = QuoteRepo::favorites(&state.pool, limit).await?;
    Ok(Json(quotes))
}
