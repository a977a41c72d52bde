//! Handlers for the `/sagas` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::Query;
use serde::Deserialize;
use shelflog_core::error::CoreError;
use shelflog_core::taxonomy::{CategoryKey, EntityKind};
use shelflog_core::types::DbId;
use shelflog_db::models::saga::{CreateSaga, Saga, SagaFilter, SagaView, UpdateSaga};
use shelflog_db::pagination::{clamp_limit, clamp_page};
use shelflog_db::repositories::{BookRepo, SagaRepo, TagRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::books::{is_populated, PopulateQuery};
use crate::handlers::tagging;
use crate::middleware::auth::AuthUser;
use crate::response::Paginated;
use crate::state::AppState;

/// Query parameters for `GET /sagas`. Category filters are repeatable.
#[derive(Debug, Default, Deserialize)]
pub struct ListSagasQuery {
    pub q: Option<String>,
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

/// Shape a single saga for the wire.
async fn saga_view(state: &AppState, saga: Saga, populate: bool) -> AppResult<SagaView> {
    let tags = TagRepo::tags_for_entity(&state.pool, EntityKind::Saga, saga.id).await?;
    let members = SagaRepo::members_for(&state.pool, &[saga.id]).await?;
    Ok(SagaView::assemble(saga, &tags, &members, populate))
}

/// Shape a page of sagas, batching the tag and member lookups.
async fn saga_views(
    state: &AppState,
    sagas: Vec<Saga>,
    populate: bool,
) -> AppResult<Vec<SagaView>> {
    let ids: Vec<DbId> = sagas.iter().map(|s| s.id).collect();
    let tags = TagRepo::tags_for_entities(&state.pool, EntityKind::Saga, &ids).await?;
    let members = SagaRepo::members_for(&state.pool, &ids).await?;

    Ok(sagas
        .into_iter()
        .map(|saga| SagaView::assemble(saga, &tags, &members, populate))
        .collect())
}

/// 400 unless every id in a `books` member list names an existing book.
async fn validate_member_books(state: &AppState, book_ids: &[DbId]) -> AppResult<()> {
    if book_ids.is_empty() {
        return Ok(());
    }
    let mut distinct = book_ids.to_vec();
    distinct.sort_unstable();
    distinct.dedup();
    let found = BookRepo::count_existing(&state.pool, &distinct).await?;
    if found as usize != distinct.len() {
        return Err(AppError::BadRequest(
            "One or more book ids do not exist".into(),
        ));
    }
    Ok(())
}

fn saga_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Saga", id })
}

// ---------------------------------------------------------------------------
// CRUD handlers
// ---------------------------------------------------------------------------

/// GET /api/sagas
pub async fn list_sagas(
    State(state): State<AppState>,
    Query(query): Query<ListSagasQuery>,
) -> AppResult<Json<Paginated<SagaView>>> {
    let page = clamp_page(query.page);
    let limit = clamp_limit(query.limit);
    let populate = is_populated(&query.populate);

    let filter = SagaFilter {
        q: query.q,
        genres: query.genres,
        tropes: query.tropes,
        triggers: query.triggers,
        ages: query.ages,
    };

    let (sagas, total) =
        SagaRepo::list(&state.pool, &filter, query.sort.as_deref(), page, limit).await?;
    let items = saga_views(&state, sagas, populate).await?;

    Ok(Json(Paginated::new(items, total, page, limit)))
}

/// GET /api/sagas/:id
pub async fn get_saga(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(query): Query<PopulateQuery>,
) -> AppResult<Json<SagaView>> {
    let saga = SagaRepo::find(&state.pool, id)
        .await?
        .ok_or_else(|| saga_not_found(id))?;
    let view = saga_view(&state, saga, is_populated(&query.populate)).await?;
    Ok(Json(view))
}

/// POST /api/sagas
pub async fn create_saga(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<CreateSaga>,
) -> AppResult<(StatusCode, Json<SagaView>)> {
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
    validate_member_books(&state, &input.books).await?;

    let saga = SagaRepo::create(&state.pool, &input).await?;
    let view = saga_view(&state, saga, false).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// PATCH /api/sagas/:id
///
/// Whitelisted partial update. A body with no recognized field is 400.
pub async fn update_saga(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSaga>,
) -> AppResult<Json<SagaView>> {
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
    if let Some(books) = &input.books {
        validate_member_books(&state, books).await?;
    }

    let saga = SagaRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| saga_not_found(id))?;
    let view = saga_view(&state, saga, false).await?;
    Ok(Json(view))
}

/// DELETE /api/sagas/:id
pub async fn delete_saga(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SagaRepo::delete(&state.pool, id).await? {
        return Err(saga_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Member set (saga side only)
// ---------------------------------------------------------------------------

/// POST /api/sagas/:id/books/:bookId
///
/// Adds the book to this saga's member set without touching the book's own
/// `saga` pointer; the asymmetry with `PATCH /books/:id/saga` is
/// deliberate.
pub async fn add_book(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((id, book_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !SagaRepo::exists(&state.pool, id).await? {
        return Err(saga_not_found(id));
    }
    if !BookRepo::exists(&state.pool, book_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Book",
            id: book_id,
        }));
    }

    SagaRepo::add_book(&state.pool, id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/sagas/:id/books/:bookId
pub async fn remove_book(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((id, book_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if !SagaRepo::exists(&state.pool, id).await? {
        return Err(saga_not_found(id));
    }

    SagaRepo::remove_book(&state.pool, id, book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tag attachment
// ---------------------------------------------------------------------------

/// POST /api/sagas/:id/:catKey/:tagId
pub async fn attach_tag(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((id, cat_key, tag_id)): Path<(DbId, String, DbId)>,
) -> AppResult<StatusCode> {
    tagging::attach_tag(&state, EntityKind::Saga, id, &cat_key, tag_id).await
}

/// DELETE /api/sagas/:id/:catKey/:tagId
pub async fn detach_tag(
    State(state): State<AppState>,
    _user: AuthUser,
    Path((id, cat_key, tag_id)): Path<(DbId, String, DbId)>,
) -> AppResult<StatusCode> {
    tagging::detach_tag(&state, EntityKind::Saga, id, &cat_key, tag_id).await
}
