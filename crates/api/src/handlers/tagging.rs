//! Shared entity-tagging logic.
//!
//! Books and sagas share identical tagging semantics, so the granular
//! attach/detach handlers and the bulk tag-array validation live here,
//! parameterized by [`EntityKind`].

use std::collections::BTreeSet;

use axum::http::StatusCode;
use shelflog_core::error::CoreError;
use shelflog_core::taxonomy::{CategoryKey, EntityKind};
use shelflog_core::types::DbId;
use shelflog_db::repositories::{BookRepo, SagaRepo, TagRepo};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Parse a `catKey` path segment, rejecting anything outside the taxonomy.
pub fn parse_category(cat_key: &str) -> AppResult<CategoryKey> {
    CategoryKey::parse(cat_key)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown tag category: {cat_key}")))
}

/// 404 unless the entity exists.
async fn ensure_entity_exists(
    state: &AppState,
    kind: EntityKind,
    entity_id: DbId,
) -> AppResult<()> {
    let exists = match kind {
        EntityKind::Book => BookRepo::exists(&state.pool, entity_id).await?,
        EntityKind::Saga => SagaRepo::exists(&state.pool, entity_id).await?,
    };
    if !exists {
        return Err(AppError::Core(CoreError::NotFound {
            entity: kind.entity_name(),
            id: entity_id,
        }));
    }
    Ok(())
}

/// Attach a tag to an entity under a category path segment.
///
/// Rejects a bad category key and a tag that is missing or belongs to a
/// different category with 400, a missing entity with 404. The attach
/// itself is an idempotent set-add.
pub async fn attach_tag(
    state: &AppState,
    kind: EntityKind,
    entity_id: DbId,
    cat_key: &str,
    tag_id: DbId,
) -> AppResult<StatusCode> {
    let key = parse_category(cat_key)?;

    if TagRepo::find_in_category(&state.pool, tag_id, key)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(
            "Tag does not belong to this category".into(),
        ));
    }

    ensure_entity_exists(state, kind, entity_id).await?;

    TagRepo::attach(&state.pool, kind, entity_id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Detach a tag from an entity. Detaching a tag that was never attached is
/// a successful no-op; only a bad category key (400) or a missing entity
/// (404) fail.
pub async fn detach_tag(
    state: &AppState,
    kind: EntityKind,
    entity_id: DbId,
    cat_key: &str,
    tag_id: DbId,
) -> AppResult<StatusCode> {
    parse_category(cat_key)?;
    ensure_entity_exists(state, kind, entity_id).await?;

    TagRepo::detach(&state.pool, kind, entity_id, tag_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Validate the tag-id arrays of a bulk create/patch payload: every id must
/// name an existing tag of the declared category. The same rule the
/// granular attach enforces, applied to whole arrays.
pub async fn validate_category_lists(
    state: &AppState,
    lists: &[(CategoryKey, &Vec<DbId>)],
) -> AppResult<()> {
    for (key, tag_ids) in lists {
        if tag_ids.is_empty() {
            continue;
        }
        let distinct: BTreeSet<DbId> = tag_ids.iter().copied().collect();
        let ids: Vec<DbId> = distinct.iter().copied().collect();
        let found = TagRepo::count_in_category(&state.pool, &ids, *key).await?;
        if found as usize != distinct.len() {
            return Err(AppError::BadRequest(format!(
                "One or more tag ids are not '{key}' tags"
            )));
        }
    }
    Ok(())
}
