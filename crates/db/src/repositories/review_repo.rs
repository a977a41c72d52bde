//! Repository for the `reviews` table.
//!
//! Every mutation recomputes the book's `avg_rating` in the same
//! transaction, so the denormalized value can never drift from the rows.

use shelflog_core::types::DbId;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};

use crate::models::review::{CreateReview, Review, ReviewUserRow, UpdateReview};

/// Column list for `reviews` queries.
const REVIEW_COLUMNS: &str =
    "id, user_id, book_id, rating, title, body, spoiler, created_at, updated_at";

/// Provides review CRUD with synchronous rating aggregation.
pub struct ReviewRepo;

impl ReviewRepo {
    /// A book's reviews, newest first, joined with each author's name.
    pub async fn list_for_book(
        pool: &PgPool,
        book_id: DbId,
    ) -> Result<Vec<ReviewUserRow>, sqlx::Error> {
        sqlx::query_as::<_, ReviewUserRow>(
            "SELECT r.id, r.user_id, u.name AS user_name, r.book_id, r.rating, \
                    r.title, r.body, r.spoiler, r.created_at, r.updated_at \
             FROM reviews r \
             JOIN users u ON u.id = r.user_id \
             WHERE r.book_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC",
        )
        .bind(book_id)
        .fetch_all(pool)
        .await
    }

    /// Insert a review and refresh the book's average. A second review for
    /// the same `(user, book)` violates `uq_reviews_user_book`, which the
    /// API layer maps to 409.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateReview,
    ) -> Result<Review, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO reviews (user_id, book_id, rating, title, body, spoiler) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {REVIEW_COLUMNS}"
        );
        let review = sqlx::query_as::<_, Review>(&query)
            .bind(user_id)
            .bind(input.book)
            .bind(input.rating)
            .bind(&input.title)
            .bind(&input.body)
            .bind(input.spoiler)
            .fetch_one(&mut *tx)
            .await?;

        recompute_avg(&mut tx, review.book_id).await?;

        tx.commit().await?;
        Ok(review)
    }

    /// Apply a partial update to the caller's own review and refresh the
    /// book's average. Returns `None` when the review does not exist or
    /// belongs to someone else.
    pub async fn update(
        pool: &PgPool,
        review_id: DbId,
        user_id: DbId,
        input: &UpdateReview,
    ) -> Result<Option<Review>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE reviews SET updated_at = now()");
        if let Some(rating) = input.rating {
            query.push(", rating = ").push_bind(rating);
        }
        if let Some(title) = &input.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(body) = &input.body {
            query.push(", body = ").push_bind(body);
        }
        if let Some(spoiler) = input.spoiler {
            query.push(", spoiler = ").push_bind(spoiler);
        }
        query.push(" WHERE id = ").push_bind(review_id);
        query.push(" AND user_id = ").push_bind(user_id);
        query.push(format!(" RETURNING {REVIEW_COLUMNS}"));

        let Some(review) = query
            .build_query_as::<Review>()
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        recompute_avg(&mut tx, review.book_id).await?;

        tx.commit().await?;
        Ok(Some(review))
    }

    /// Delete the caller's own review and refresh the book's average.
    /// Returns `false` when the review does not exist or belongs to
    /// someone else.
    pub async fn delete(
        pool: &PgPool,
        review_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let book_id: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM reviews WHERE id = $1 AND user_id = $2 RETURNING book_id",
        )
        .bind(review_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(book_id) = book_id else {
            return Ok(false);
        };

        recompute_avg(&mut tx, book_id).await?;

        tx.commit().await?;
        Ok(true)
    }
}

/// Full recompute in a single UPDATE: the average over all remaining
/// reviews, 0 when there are none.
async fn recompute_avg(conn: &mut PgConnection, book_id: DbId) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE books \
         SET avg_rating = COALESCE((SELECT AVG(rating) FROM reviews WHERE book_id = $1), 0), \
             updated_at = now() \
         WHERE id = $1",
    )
    .bind(book_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
