//! Repository for the `book_quotes` table.
//!
//! Every operation is scoped to the parent book: a quote id is only
//! meaningful together with its book id.

use shelflog_core::types::DbId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::quote::{FavoriteQuote, Quote, UpdateQuote};

/// Column list for `book_quotes` queries.
const QUOTE_COLUMNS: &str = "id, book_id, text, page, favorite, created_at, updated_at";

/// Provides quote CRUD and the cross-book favorites feed.
pub struct QuoteRepo;

impl QuoteRepo {
    /// A book's quotes, newest first.
    pub async fn list_for_book(pool: &PgPool, book_id: DbId) -> Result<Vec<Quote>, sqlx::Error> {
        let query = format!(
            "SELECT {QUOTE_COLUMNS} FROM book_quotes \
             WHERE book_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Quote>(&query)
            .bind(book_id)
            .fetch_all(pool)
            .await
    }

    /// Insert a quote. New quotes always start un-favorited.
    pub async fn create(
        pool: &PgPool,
        book_id: DbId,
        text: &str,
        page: Option<i32>,
    ) -> Result<Quote, sqlx::Error> {
        let query = format!(
            "INSERT INTO book_quotes (book_id, text, page) \
             VALUES ($1, $2, $3) \
             RETURNING {QUOTE_COLUMNS}"
        );
        sqlx::query_as::<_, Quote>(&query)
            .bind(book_id)
            .bind(text)
            .bind(page)
            .fetch_one(pool)
            .await
    }

    /// Apply a partial update to a quote within its book. Returns `None`
    /// when the quote does not exist under that book.
    pub async fn update(
        pool: &PgPool,
        book_id: DbId,
        quote_id: DbId,
        input: &UpdateQuote,
    ) -> Result<Option<Quote>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE book_quotes SET updated_at = now()");
        if let Some(text) = &input.text {
            query.push(", text = ").push_bind(text);
        }
        if let Some(page) = input.page {
            query.push(", page = ").push_bind(page);
        }
        if let Some(favorite) = input.favorite {
            query.push(", favorite = ").push_bind(favorite);
        }
        query.push(" WHERE id = ").push_bind(quote_id);
        query.push(" AND book_id = ").push_bind(book_id);
        query.push(format!(" RETURNING {QUOTE_COLUMNS}"));

        query.build_query_as::<Quote>().fetch_optional(pool).await
    }

    /// Delete a quote within its book. Returns `false` when nothing
    /// matched (already deleted, or wrong book).
    pub async fn delete(
        pool: &PgPool,
        book_id: DbId,
        quote_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM book_quotes WHERE id = $1 AND book_id = $2")
            .bind(quote_id)
            .bind(book_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Newest favorite quotes across all books.
    pub async fn favorites(pool: &PgPool, limit: i64) -> Result<Vec<FavoriteQuote>, sqlx::Error> {
        sqlx::query_as::<_, FavoriteQuote>(
            "SELECT b.id AS book_id, b.title AS book_title, \
                    q.id AS quote_id, q.text, q.page, q.created_at \
             FROM book_quotes q \
             JOIN books b ON b.id = q.book_id \
             WHERE q.favorite \
             ORDER BY q.created_at DESC, q.id DESC \
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
