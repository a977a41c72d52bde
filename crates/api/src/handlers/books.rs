//! Handlers for the `/books` resource: CRUD with filtering, pagination,
//! and reference population, plus the granular tag / saga / status
//! endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::Query;
use serde::Deserialize;
use shelflog_core::error::CoreError;
use shelflog_core::status::BookStatus;
use shelflog_core::taxonomy::{CategoryKey, EntityKind};
use shelflog_core::types::DbId;
use shelflog_db::models::book::{
    Book, BookFilter, BookView, CreateBook, SetSaga, UpdateBook, UpdateRelease, UpdateStatus,
};
use shelflog_db::pagination::{clamp_limit, clamp_page};
use shelflog_db::repositories::{BookRepo, SagaRepo, TagRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::tagging;
use crate::middleware::auth::AuthUser;
use crate::response::Paginated;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /books`. The four category filters are
/// repeatable (`?genres=1&genres=2`), which is why this uses
/// `axum_extra`'s `Query`.
#[derive(Debug, Default, Deserialize)]
pub struct ListBooksQuery {
    pub q: Option<String>,
    pub status: Option<BookStatus>,
    #[serde(default)]
    pub genres: Vec<DbId>,
    #[serde(default)]
    pub tropes: Vec<DbId>,
    #[serde(default)]
    pub triggers: Vec<DbId>,
    #[serde(default)]
    pub ages: Vec<DbId>,
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub populate: Option<String>,
}

/// Query parameters for single-entity reads.
#[derive(Debug, Default, Deserialize)]
pub struct PopulateQuery {
    pub populate: Option<String>,
}

/// Population is opted into with exactly the string `"1"`; any other value
/// leaves references as bare ids.
pub fn is_populated(populate: &Option<String>) -> bool {
    populate.as_deref() == Some("1")
}

// ---------------------------------------------------------------------------
// View assembly
// ---------------------------------------------------------------------------

/// Shape a single book for the wire, loading its tag attachments and (when
/// populating) the saga projection.
pub async fn book_view(state: &AppState, book: Book, populate: bool) -> AppResult<BookView> {
    let tags = TagRepo::tags_for_entity(&state.pool, EntityKind::Book, book.id).await?;
    let saga = match (populate, book.saga_id) {
        (true, Some(saga_id)) => SagaRepo::find_summary(&state.pool, saga_id).await?,
        _ => None,
    };
    Ok(BookView::assemble(book, &tags, saga, populate))
}

/// Shape a page of books, batching the tag and saga lookups.
async fn book_views(
    state: &AppState,
    books: Vec<Book>,
    populate: bool,
) -> AppResult<Vec<BookView>> {
    let ids: Vec<DbId> = books.iter().map(|b| b.id).collect();
    let tags = TagRepo::tags_for_entities(&state.pool, EntityKind::Book, &ids).await?;

    let sagas = if populate {
        let saga_ids: Vec<DbId> = books.iter().filter_map(|b| b.saga_id).collect();
        SagaRepo::summaries_for(&state.pool, &saga_ids).await?
    } else {
        Vec::new()
    };

    Ok(books
        .into_iter()
        .map(|book| {
            let saga = book
                .saga_id
                .and_then(|id| sagas.iter().find(|s| s.id == id).cloned());
            BookView::assemble(book, &tags, saga, populate)
        })
        .collect())
}

/// 400 unless the referenced saga exists. Missing saga targets are a
/// validation failure, not a 404: the book is the addressed resource.
async fn ensure_saga_target(state: &AppState, saga_id: DbId) -> AppResult<()> {
    if !SagaRepo::exists(&state.pool, saga_id).await? {
        return Err(AppError::BadRequest("Saga does not exist".into()));
    }
    Ok(())
}

fn book_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Book", id })
}

// ---------------------------------------------------------------------------
// CRUD handlers
// ---------------------------------------------------------------------------

/// GET /api/books
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> AppResult<Json<Paginated<BookView>>> {
    let page = clamp_page(query.page);
    let limit = clamp_limit(query.limit);
    let populate = is_populated(&query.populate);

    let filter = BookFilter {
        q: query.q,
        status: query.status,
        genres: query.genres,
        tropes: query.tropes,
        triggers: query.triggers,
        ages: query.ages,
    };

    let (books, total) =
        BookRepo::list(&state.pool, &filter, query.sort.as_deref(), page, limit).await?;
    let items = book_views(&state, books, populate).await?;

    Ok(Json(Paginated::new(items, total, page, limit)))
}

/// GET /api/books/:id
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(query): Query<PopulateQuery>,
) -> AppResult<Json<BookView>> {
    let book = BookRepo::find(&state.pool, id)
        .await?
        .ok_or_else(|| book_not_found(id))?;
    let view = book_view(&state, book, is_populated(&query.populate)).await?;
    Ok(Json(view))
}

/// POST /api/books
pub async fn create_book(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookView>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Title is required".into(),
        )));
    }

    tagging::validate_category_lists(
        &state,
        &[
            (CategoryKey::Genres, &input.genres),
            (CategoryKey::Tropes, &input.tropes),
            (CategoryKey::Triggers, &input.triggers),
            (CategoryKey::Ages, &input.ages),
        ],
    )
    .await?;

    if let Some(saga_id) = input.saga {
        ensure_saga_target(&state, saga_id).await?;
    }

    let book = BookRepo::create(&state.pool, &input).await?;
    let view = book_view(&state, book, false).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PATCH /api/books/:id
///
/// Whitelisted partial update. A body with no recognized field is 400.
pub async fn update_book(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBook>,
) -> AppResult<Json<BookView>> {
    if input.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "No updatable fields provided".into(),
        )));
    }
    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Title must not be empty".into(),
            )));
        }
    }

    tagging::validate_category_lists(&state, &input.category_lists()).await?;

    if let Some(Some(saga_id)) = input.saga {
        ensure_saga_target(&state, saga_id).await?;
    }

    let book = BookRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| book_not_found(id))?;
    let view = book_view(&state, book, false).await?;
    Ok(Json(view))
}

/// DELETE /api/books/:id
pub async fn delete_book(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !BookRepo::delete(&state.pool, id).await? {
        return Err(book_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Granular updates
// ---------------------------------------------------------------------------

/// PATCH /api/books/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateStatus>,
) -> AppResult<Json<BookView>> {
    let book = BookRepo::update_status(&state.pool, id, input.status.as_str())
        .await?
        .ok_or_else(|| book_not_found(id))?;
    let view = book_view(&state, book, false).await?;
    Ok(Json(view))
}

/// PATCH /api/books/:id/release
pub async fn update_release(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateRelease>,
) -> AppResult<Json<BookView>> {
    let book = BookRepo::update_release(&state.pool, id, input.release_date)
        .await?
        .ok_or_else(|| book_not_found(id))?;
    let view = book_view(&state, book, false).await?;
    Ok(Json(view))
}

/// PATCH /api/books/:id/saga
///
/// Assign or clear the book's saga, keeping `books.saga_id` and the
/// saga-side member sets consistent in one transaction. Responds with the
/// book, saga populated.
pub async fn set_saga(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<SetSaga>,
) -> AppResult<Json<BookView>> {
    if let Some(saga_id) = input.saga {
        ensure_saga_target(&state, saga_id).await?;
    }

    let book = BookRepo::set_saga(&state.pool, id, input.saga)
        .await?
        .ok_or_else(|| book_not_found(id))?;
    let view = book_view(&state, book, true).await?;
    Ok(Json(view))
}

/// DELETE /api/books/:id/saga
pub async fn clear_saga(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    BookRepo::set_saga(&state.pool, id, None)
        .await?
        .ok_or_else(|| book_not_found(id))?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tag attachment
// ---------------------------------------------------------------------------

/// POST /api/books/:id/:catKey/:tagId
pub async fn attach_tag(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((id, cat_key, tag_id)): Path<(DbId, String, DbId)>,
) -> AppResult<StatusCode> {
    tagging::attach_tag(&state, EntityKind::Book, id, &cat_key, tag_id).await
}

/// DELETE /api/books/:id/:catKey/:tagId
pub async fn detach_tag(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((id, cat_key, tag_id)): Path<(DbId, String, DbId)>,
) -> AppResult<StatusCode> {
    tagging::detach_tag(&state, EntityKind::Book, id, &cat_key, tag_id).await
}
