//! Repository for the `books` table and the book side of saga membership.

use shelflog_core::taxonomy::{CategoryKey, EntityKind};
use shelflog_core::types::DbId;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::models::book::{Book, BookFilter, CreateBook, UpdateBook};
use crate::repositories::TagRepo;

/// Column list for `books` queries.
const BOOK_COLUMNS: &str =
    "id, title, authors, status, saga_id, release_date, avg_rating, created_at, updated_at";

/// Map a client sort token to an ORDER BY clause. Unknown tokens fall back
/// to newest-first.
fn order_clause(sort: Option<&str>) -> &'static str {
    match sort.unwrap_or("-createdAt") {
        "createdAt" => "b.created_at ASC",
        "title" => "b.title ASC",
        "-title" => "b.title DESC",
        "avgRating" => "b.avg_rating ASC",
        "-avgRating" => "b.avg_rating DESC",
        _ => "b.created_at DESC",
    }
}

/// Append the filter's WHERE conditions. Shared between the count and the
/// page query so the two always agree.
fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a BookFilter) {
    if let Some(q) = &filter.q {
        builder.push(" AND b.title ILIKE ").push_bind(format!("%{q}%"));
    }
    if let Some(status) = filter.status {
        builder.push(" AND b.status = ").push_bind(status.as_str());
    }
    // OR within a category (ANY), AND across categories (one EXISTS each).
    for (_, tag_ids) in filter.category_filters() {
        if !tag_ids.is_empty() {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM entity_tags et \
                     WHERE et.entity_kind = 'book' AND et.entity_id = b.id \
                       AND et.tag_id = ANY(",
                )
                .push_bind(tag_ids.clone())
                .push("))");
        }
    }
}

/// Provides CRUD, filtered listing, and saga-assignment operations.
pub struct BookRepo;

impl BookRepo {
    /// Insert a book with its tag attachments and (optionally) its saga
    /// assignment, in one transaction. Tag ids and the saga id are
    /// validated by the caller beforehand.
    pub async fn create(pool: &PgPool, input: &CreateBook) -> Result<Book, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO books (title, authors, status, saga_id, release_date) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {BOOK_COLUMNS}"
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&input.title)
            .bind(&input.authors)
            .bind(input.status.as_str())
            .bind(input.saga)
            .bind(input.release_date)
            .fetch_one(&mut *tx)
            .await?;

        if input.saga.is_some() {
            sync_membership(&mut tx, book.id, None, input.saga).await?;
        }

        let lists = [
            (CategoryKey::Genres, &input.genres),
            (CategoryKey::Tropes, &input.tropes),
            (CategoryKey::Triggers, &input.triggers),
            (CategoryKey::Ages, &input.ages),
        ];
        for (key, tag_ids) in lists {
            if !tag_ids.is_empty() {
                TagRepo::replace_category_tags(&mut tx, EntityKind::Book, book.id, key, tag_ids)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Find a book by id.
    pub async fn find(pool: &PgPool, id: DbId) -> Result<Option<Book>, sqlx::Error> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = $1");
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether a book with this id exists.
    pub async fn exists(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM books WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// How many of the given ids name an existing book. Used to validate
    /// member lists in bulk payloads.
    pub async fn count_existing(pool: &PgPool, ids: &[DbId]) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(DISTINCT id) FROM books WHERE id = ANY($1)")
            .bind(ids)
            .fetch_one(pool)
            .await
    }

    /// One page of books matching the filter, plus the total match count.
    pub async fn list(
        pool: &PgPool,
        filter: &BookFilter,
        sort: Option<&str>,
        page: i64,
        limit: i64,
    ) -> Result<(Vec<Book>, i64), sqlx::Error> {
        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM books b WHERE TRUE");
        push_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

        let columns = format!("b.{}", BOOK_COLUMNS.replace(", ", ", b."));
        let mut query = QueryBuilder::new(format!("SELECT {columns} FROM books b WHERE TRUE"));
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY ")
            .push(order_clause(sort))
            .push(", b.id");
        query
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind((page - 1) * limit);
        let items = query.build_query_as::<Book>().fetch_all(pool).await?;

        Ok((items, total))
    }

    /// Apply a whitelisted partial update, replacing the tag set of every
    /// category present in the patch and keeping saga membership in step,
    /// all in one transaction. Returns `None` if the book does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBook,
    ) -> Result<Option<Book>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous_saga = if input.saga.is_some() {
            current_saga(&mut tx, id).await?.flatten()
        } else {
            None
        };

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE books SET updated_at = now()");
        if let Some(title) = &input.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(authors) = &input.authors {
            query.push(", authors = ").push_bind(authors);
        }
        if let Some(status) = input.status {
            query.push(", status = ").push_bind(status.as_str());
        }
        if let Some(saga) = input.saga {
            query.push(", saga_id = ").push_bind(saga);
        }
        if let Some(release_date) = input.release_date {
            query.push(", release_date = ").push_bind(release_date);
        }
        query.push(" WHERE id = ").push_bind(id);
        query.push(format!(" RETURNING {BOOK_COLUMNS}"));

        let Some(book) = query
            .build_query_as::<Book>()
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(saga) = input.saga {
            sync_membership(&mut tx, id, previous_saga, saga).await?;
        }
        for (key, tag_ids) in input.category_lists() {
            TagRepo::replace_category_tags(&mut tx, EntityKind::Book, id, key, tag_ids).await?;
        }

        tx.commit().await?;
        Ok(Some(book))
    }

    /// Set the book's reading status.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books SET status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {BOOK_COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Set or clear the book's release date.
    pub async fn update_release(
        pool: &PgPool,
        id: DbId,
        release_date: Option<chrono::NaiveDate>,
    ) -> Result<Option<Book>, sqlx::Error> {
        let query = format!(
            "UPDATE books SET release_date = $2, updated_at = now() \
             WHERE id = $1 RETURNING {BOOK_COLUMNS}"
        );
        sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(release_date)
            .fetch_optional(pool)
            .await
    }

    /// Assign the book to a saga (or clear the assignment with `None`),
    /// keeping `books.saga_id` and the saga-side member sets consistent in
    /// one transaction. Returns `None` if the book does not exist.
    pub async fn set_saga(
        pool: &PgPool,
        id: DbId,
        saga: Option<DbId>,
    ) -> Result<Option<Book>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(previous) = current_saga(&mut tx, id).await? else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE books SET saga_id = $2, updated_at = now() \
             WHERE id = $1 RETURNING {BOOK_COLUMNS}"
        );
        let book = sqlx::query_as::<_, Book>(&query)
            .bind(id)
            .bind(saga)
            .fetch_one(&mut *tx)
            .await?;

        sync_membership(&mut tx, id, previous, saga).await?;

        tx.commit().await?;
        Ok(Some(book))
    }

    /// Delete a book and its tag attachments. Quotes, reviews, reading
    /// entries, membership, and favorites cascade through foreign keys;
    /// `entity_tags` has no FK to books and is cleared explicitly.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM entity_tags WHERE entity_kind = $1 AND entity_id = $2")
            .bind(EntityKind::Book.as_str())
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

/// The book's current `saga_id`, or `None` if the book does not exist.
async fn current_saga(
    conn: &mut PgConnection,
    book_id: DbId,
) -> Result<Option<Option<DbId>>, sqlx::Error> {
    sqlx::query_scalar::<_, Option<DbId>>("SELECT saga_id FROM books WHERE id = $1")
        .bind(book_id)
        .fetch_optional(&mut *conn)
        .await
}

/// Remove the book from its previous saga's member set and, when
/// assigning, add it to the new saga's. Memberships added through the
/// saga-side endpoints are left alone. Runs on the caller's open
/// transaction.
async fn sync_membership(
    conn: &mut PgConnection,
    book_id: DbId,
    previous: Option<DbId>,
    next: Option<DbId>,
) -> Result<(), sqlx::Error> {
    if let Some(previous_id) = previous {
        sqlx::query("DELETE FROM saga_books WHERE book_id = $1 AND saga_id = $2")
            .bind(book_id)
            .bind(previous_id)
            .execute(&mut *conn)
            .await?;
    }
    if let Some(saga_id) = next {
        sqlx::query(
            "INSERT INTO saga_books (saga_id, book_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(saga_id)
        .bind(book_id)
        .execute(&mut *conn)
        .await?;
    }
    Ok(())
}
