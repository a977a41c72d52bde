//! Handlers for the tag catalog (`/tags`).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use shelflog_core::error::CoreError;
use shelflog_core::taxonomy::CategoryKey;
use shelflog_core::types::DbId;
use shelflog_db::models::tag::{CategoryWithTags, CreateTag, Tag};
use shelflog_db::repositories::TagRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/tags/categories
///
/// The fixed categories, each with the tags visible to the caller (shared
/// system tags plus the caller's own).
pub async fn list_categories(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<Vec<CategoryWithTags>>> {
    let categories = TagRepo::list_categories_with_tags(&state.pool, user.user_id).await?;
    Ok(Json(categories))
}

/// POST /api/tags
///
/// Create a tag owned by the caller. An unknown category key is 404, an
/// empty name 400, and a duplicate `(name, category, owner)` 409.
pub async fn create_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateTag>,
) -> AppResult<(StatusCode, Json<Tag>)> {
    let key = CategoryKey::parse(&input.category_key).ok_or_else(|| {
        AppError::NotFound(format!("Unknown tag category: {}", input.category_key))
    })?;

    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Tag name must not be empty".into(),
        )));
    }

    let category = TagRepo::find_category(&state.pool, key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Unknown tag category: {key}")))?;

    // Duplicate (name, category, owner) violates uq_tags_name_category_owner,
    // which classify_sqlx_error maps to 409.
    let tag = TagRepo::create(&state.pool, name, category.id, user.user_id).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// DELETE /api/tags/:id
///
/// Delete one of the caller's own tags. System tags and other users' tags
/// are indistinguishable from missing ones: both 404. Attachment rows on
/// books and sagas cascade with the tag.
pub async fn delete_tag(
    State(state): State<AppState>,
    user: AuthUser,
    Path(tag_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = TagRepo::delete_owned(&state.pool, tag_id, user.user_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Tag",
            id: tag_id,
        }));
    }
    Ok(StatusCode::NO_CONTENT)
}
