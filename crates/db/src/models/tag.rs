//! Tag catalog models: categories, tags, and entity-tag attachment rows.

use serde::{Deserialize, Serialize};
use shelflog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `tag_categories` table. Fixed set of four, seeded by
/// migration and immutable afterward.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagCategory {
    pub id: DbId,
    pub name: String,
    pub key: String,
}

/// A row from the `tags` table. `owner_id = NULL` marks a shared system
/// tag; otherwise the tag is private to its owner.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub category_id: DbId,
    pub owner_id: Option<DbId>,
    pub created_at: Timestamp,
}

/// Lean `{id, name}` projection used when expanding tag references.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagInfo {
    pub id: DbId,
    pub name: String,
}

/// One tag attached to one entity, with the category key needed to slot it
/// into the right per-category list.
#[derive(Debug, Clone, FromRow)]
pub struct EntityTagRow {
    pub entity_id: DbId,
    pub tag_id: DbId,
    pub name: String,
    pub category_key: String,
}

/// A category together with the tags visible to one user.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryWithTags {
    pub id: DbId,
    pub name: String,
    pub key: String,
    pub tags: Vec<Tag>,
}

/// Request body for `POST /api/tags`. The category key stays a raw string
/// here: an unknown key is a 404 at the handler level, not a 422 from
/// deserialization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTag {
    pub name: String,
    pub category_key: String,
}
