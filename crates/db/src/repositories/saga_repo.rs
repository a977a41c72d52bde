//! Repository for the `sagas` table and the saga side of membership.

use shelflog_core::taxonomy::{CategoryKey, EntityKind};
use shelflog_core::types::DbId;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::models::saga::{CreateSaga, Saga, SagaBookRow, SagaFilter, SagaSummary, UpdateSaga};
use crate::repositories::TagRepo;

/// Column list for `sagas` queries.
const SAGA_COLUMNS: &str = "id, title, authors, created_at, updated_at";

fn order_clause(sort: Option<&str>) -> &'static str {
    match sort.unwrap_or("-createdAt") {
        "createdAt" => "s.created_at ASC",
        "title" => "s.title ASC",
        "-title" => "s.title DESC",
        _ => "s.created_at DESC",
    }
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a SagaFilter) {
    if let Some(q) = &filter.q {
        builder.push(" AND s.title ILIKE ").push_bind(format!("%{q}%"));
    }
    for (_, tag_ids) in filter.category_filters() {
        if !tag_ids.is_empty() {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM entity_tags et \
                     WHERE et.entity_kind = 'saga' AND et.entity_id = s.id \
                       AND et.tag_id = ANY(",
                )
                .push_bind(tag_ids.clone())
                .push("))");
        }
    }
}

/// Provides CRUD, filtered listing, and member-set operations.
pub struct SagaRepo;

impl SagaRepo {
    /// Insert a saga with its tag attachments and initial member set, in
    /// one transaction. Ids are validated by the caller beforehand.
    pub async fn create(pool: &PgPool, input: &CreateSaga) -> Result<Saga, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO sagas (title, authors) VALUES ($1, $2) RETURNING {SAGA_COLUMNS}"
        );
        let saga = sqlx::query_as::<_, Saga>(&query)
            .bind(&input.title)
            .bind(&input.authors)
            .fetch_one(&mut *tx)
            .await?;

        if !input.books.is_empty() {
            replace_members(&mut tx, saga.id, &input.books).await?;
        }

        let lists = [
            (CategoryKey::Genres, &input.genres),
            (CategoryKey::Tropes, &input.tropes),
            (CategoryKey::Triggers, &input.triggers),
            (CategoryKey::Ages, &input.ages),
        ];
        for (key, tag_ids) in lists {
            if !tag_ids.is_empty() {
                TagRepo::replace_category_tags(&mut tx, EntityKind::Saga, saga.id, key, tag_ids)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(saga)
    }

    /// Find a saga by id.
    pub async fn find(pool: &PgPool, id: DbId) -> Result<Option<Saga>, sqlx::Error> {
        let query = format!("SELECT {SAGA_COLUMNS} FROM sagas WHERE id = $1");
        sqlx::query_as::<_, Saga>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a saga with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM sagas WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Lean `{id, title}` projection, for populating a book's saga field.
    pub async fn find_summary(pool: &PgPool, id: DbId) -> Result<Option<SagaSummary>, sqlx::Error> {
        sqlx::query_as::<_, SagaSummary>("SELECT id, title FROM sagas WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lean projections for a set of sagas, for populating a page of books.
    pub async fn summaries_for(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<SagaSummary>, sqlx::Error> {
        sqlx::query_as::<_, SagaSummary>("SELECT id, title FROM sagas WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// One page of sagas matching the filter, plus the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: &SagaFilter,
        sort: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Saga>, i64), sqlx::Error> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM sagas s WHERE TRUE");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let columns = format!("s.{}", SAGA_COLUMNS.replace(", ", ", s."));
        let mut query = QueryBuilder::new(format!("SELECT {columns} FROM sagas s WHERE TRUE"));
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY ")
            .push(order_clause(sort))
            .push(", s.id");
        query
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind((page - 1) * limit);
        let items = query.build_query_as::<Saga>().fetch_all(pool).await?;

        Ok((items, total))
    }

    /// Apply a whitelisted partial update, replacing the tag set of every
    /// category present in the patch and, when `books` is present, the
    /// whole member set. Returns `None` if the saga does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSaga,
    ) -> Result<Option<Saga>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE sagas SET updated_at = now()");
        if let Some(title) = &input.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(authors) = &input.authors {
            query.push(", authors = ").push_bind(authors);
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {SAGA_COLUMNS}"));

        let Some(saga) = query
            .build_query_as::<Saga>()
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(books) = &input.books {
            replace_members(&mut tx, id, books).await?;
        }
        for (key, tag_ids) in input.category_lists() {
            TagRepo::replace_category_tags(&mut tx, EntityKind::Saga, id, key, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(saga))
    }

    /// Delete a saga: detach its tags, null out the pointer on any book
    /// that referenced it, and drop the row. Member rows cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM entity_tags WHERE entity_kind = $1 AND entity_id = $2")
            .bind(EntityKind::Saga.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE books SET saga_id = NULL, updated_at = now() WHERE saga_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM sagas WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Member set
    // -----------------------------------------------------------------------

    /// Add a book to the saga's member set only; `books.saga_id` is left
    /// alone. Idempotent.
    pub async fn add_book(pool: &PgPool, saga_id: DbId, book_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO saga_books (saga_id, book_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(saga_id)
        .bind(book_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Remove a book from the saga's member set only. Idempotent.
    pub async fn remove_book(
        pool: &PgPool,
        saga_id: DbId,
        book_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM saga_books WHERE saga_id = $1 AND book_id = $2")
            .bind(saga_id)
            .bind(book_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Member rows (joined with book summary fields) for a set of sagas.
    pub async fn members_for(
        pool: &PgPool,
        saga_ids: &[DbId],
    ) -> Result<Vec<SagaBookRow>, sqlx::Error> {
        sqlx::query_as::<_, SagaBookRow>(
            "SELECT sb.saga_id, b.id AS book_id, b.title, b.authors \
             FROM saga_books sb \
             JOIN books b ON b.id = sb.book_id \
             WHERE sb.saga_id = ANY($1) \
             ORDER BY b.title",
        )
        .bind(saga_ids)
        .fetch_all(pool)
        .await
    }
}

/// Replace the saga's member set with `book_ids`. Saga-side only:
/// `books.saga_id` is not touched.
async fn replace_members(
    conn: &mut PgConnection,
    saga_id: DbId,
    book_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM saga_books WHERE saga_id = $1")
        .bind(saga_id)
        .execute(&mut *conn)
        .await?;
    sqlx::query(
        "INSERT INTO saga_books (saga_id, book_id) \
         SELECT $1, book_id FROM unnest($2::bigint[]) AS book_id \
         ON CONFLICT DO NOTHING",
    )
    .bind(saga_id)
    .bind(book_ids)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
