//! Repository for the `tag_categories`, `tags`, and `entity_tags` tables.
//!
//! Covers the tag catalog (fixed categories, system + per-user tags) and
//! the shared entity-tagging operations used by both books and sagas.

use shelflog_core::taxonomy::{CategoryKey, EntityKind};
use shelflog_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::tag::{CategoryWithTags, EntityTagRow, Tag, TagCategory};

/// Column list for `tags` queries.
const TAG_COLUMNS: &str = "id, name, category_id, owner_id, created_at";

/// Provides catalog CRUD and entity-tag attachment operations.
pub struct TagRepo;

impl TagRepo {
    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    /// List the fixed categories, sorted by display name.
    pub async fn list_categories(pool: &PgPool) -> Result<Vec<TagCategory>, sqlx::Error> {
        sqlx::query_as::<_, TagCategory>("SELECT id, name, key FROM tag_categories ORDER BY name")
            .fetch_all(pool)
            .await
    }

    /// List every category with the tags visible to `user_id`: shared
    /// system tags (owner NULL) plus the user's own, sorted by name.
    pub async fn list_categories_with_tags(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<CategoryWithTags>, sqlx::Error> {
        let categories = Self::list_categories(pool).await?;

        let query = format!(
            "SELECT {TAG_COLUMNS} FROM tags \
             WHERE owner_id IS NULL OR owner_id = $1 \
             ORDER BY name"
        );
        let tags = sqlx::query_as::<_, Tag>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;

        Ok(categories
            .into_iter()
            .map(|c| {
                let tags = tags.iter().filter(|t| t.category_id == c.id).cloned().collect();
                CategoryWithTags {
                    id: c.id,
                    name: c.name,
                    key: c.key,
                    tags,
                }
            })
            .collect())
    }

    /// Find a category by its stable key.
    pub async fn find_category(
        pool: &PgPool,
        key: CategoryKey,
    ) -> Result<Option<TagCategory>, sqlx::Error> {
        sqlx::query_as::<_, TagCategory>("SELECT id, name, key FROM tag_categories WHERE key = $1")
            .bind(key.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Create a user-owned tag in the given category.
    ///
    /// A duplicate `(name, category, owner)` triple surfaces as a unique
    /// violation on `uq_tags_name_category_owner`, which the API layer
    /// maps to 409.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        category_id: DbId,
        owner_id: DbId,
    ) -> Result<Tag, sqlx::Error> {
        let query = format!(
            "INSERT INTO tags (name, category_id, owner_id) \
             VALUES ($1, $2, $3) \
             RETURNING {TAG_COLUMNS}"
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(name)
            .bind(category_id)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Delete a tag, but only if `owner_id` owns it. System tags (owner
    /// NULL) never match. Attachment rows cascade.
    ///
    /// Returns `true` if a tag was deleted.
    pub async fn delete_owned(
        pool: &PgPool,
        tag_id: DbId,
        owner_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1 AND owner_id = $2")
            .bind(tag_id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find a tag by id, constrained to the given category.
    ///
    /// Returns `None` when the tag does not exist *or* belongs to another
    /// category — callers treat both as "tag does not belong to category".
    pub async fn find_in_category(
        pool: &PgPool,
        tag_id: DbId,
        key: CategoryKey,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!(
            "SELECT t.{} FROM tags t \
             JOIN tag_categories c ON c.id = t.category_id \
             WHERE t.id = $1 AND c.key = $2",
            TAG_COLUMNS.replace(", ", ", t.")
        );
        sqlx::query_as::<_, Tag>(&query)
            .bind(tag_id)
            .bind(key.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Count how many of `tag_ids` exist in the given category. Used to
    /// validate the raw id arrays accepted by bulk create/patch.
    pub async fn count_in_category(
        pool: &PgPool,
        tag_ids: &[DbId],
        key: CategoryKey,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(DISTINCT t.id) FROM tags t \
             JOIN tag_categories c ON c.id = t.category_id \
             WHERE t.id = ANY($1) AND c.key = $2",
        )
        .bind(tag_ids)
        .bind(key.as_str())
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Entity-tag attachment (shared by books and sagas)
    // -----------------------------------------------------------------------

    /// Attach a tag to an entity. Idempotent: attaching an already-present
    /// tag is a successful no-op.
    pub async fn attach(
        pool: &PgPool,
        kind: EntityKind,
        entity_id: DbId,
        tag_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO entity_tags (entity_kind, entity_id, tag_id) \
             VALUES ($1, $2, $3) \
             ON CONFLICT DO NOTHING",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Detach a tag from an entity. Idempotent: detaching an absent tag is
    /// a successful no-op.
    pub async fn detach(
        pool: &PgPool,
        kind: EntityKind,
        entity_id: DbId,
        tag_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "DELETE FROM entity_tags \
             WHERE entity_kind = $1 AND entity_id = $2 AND tag_id = $3",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(tag_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// All tags attached to one entity, with their category keys.
    pub async fn tags_for_entity(
        pool: &PgPool,
        kind: EntityKind,
        entity_id: DbId,
    ) -> Result<Vec<EntityTagRow>, sqlx::Error> {
        sqlx::query_as::<_, EntityTagRow>(
            "SELECT et.entity_id, t.id AS tag_id, t.name, c.key AS category_key \
             FROM entity_tags et \
             JOIN tags t ON t.id = et.tag_id \
             JOIN tag_categories c ON c.id = t.category_id \
             WHERE et.entity_kind = $1 AND et.entity_id = $2 \
             ORDER BY t.name",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .fetch_all(pool)
        .await
    }

    /// All tags attached to any of the given entities. Used to assemble a
    /// page of views with a single query.
    pub async fn tags_for_entities(
        pool: &PgPool,
        kind: EntityKind,
        entity_ids: &[DbId],
    ) -> Result<Vec<EntityTagRow>, sqlx::Error> {
        sqlx::query_as::<_, EntityTagRow>(
            "SELECT et.entity_id, t.id AS tag_id, t.name, c.key AS category_key \
             FROM entity_tags et \
             JOIN tags t ON t.id = et.tag_id \
             JOIN tag_categories c ON c.id = t.category_id \
             WHERE et.entity_kind = $1 AND et.entity_id = ANY($2) \
             ORDER BY t.name",
        )
        .bind(kind.as_str())
        .bind(entity_ids)
        .fetch_all(pool)
        .await
    }

    /// Replace an entity's tag set for one category with `tag_ids`,
    /// leaving the other categories untouched. Runs on the caller's open
    /// transaction so bulk updates stay atomic.
    pub async fn replace_category_tags(
        conn: &mut PgConnection,
        kind: EntityKind,
        entity_id: DbId,
        key: CategoryKey,
        tag_ids: &[DbId],
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "DELETE FROM entity_tags et \
             USING tags t, tag_categories c \
             WHERE et.tag_id = t.id AND t.category_id = c.id \
               AND et.entity_kind = $1 AND et.entity_id = $2 AND c.key = $3",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(key.as_str())
        .execute(&mut *conn)
        .await?;

        sqlx::query(
            "INSERT INTO entity_tags (entity_kind, entity_id, tag_id) \
             SELECT $1, $2, tag_id FROM unnest($3::bigint[]) AS tag_id \
             ON CONFLICT DO NOTHING",
        )
        .bind(kind.as_str())
        .bind(entity_id)
        .bind(tag_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
