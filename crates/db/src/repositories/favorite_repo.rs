//! Repository for the per-user favorite sets (books and sagas).

use shelflog_core::types::DbId;
use sqlx::PgPool;

use crate::models::book::Book;
use crate::models::saga::Saga;

/// Provides the saved-entity sets. All mutations are idempotent.
pub struct FavoriteRepo;

impl FavoriteRepo {
    /// The caller's saved books, most recently created book first.
    pub async fn books_for(pool: &PgPool, user_id: DbId) -> Result<Vec<Book>, sqlx::Error> {
        sqlx::query_as::<_, Book>(
            "SELECT b.id, b.title, b.authors, b.status, b.saga_id, b.release_date, \
                    b.avg_rating, b.created_at, b.updated_at \
             FROM favorite_books f \
             JOIN books b ON b.id = f.book_id \
             WHERE f.user_id = $1 \
             ORDER BY b.created_at DESC, b.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// The caller's saved sagas.
    pub async fn sagas_for(pool: &PgPool, user_id: DbId) -> Result<Vec<Saga>, sqlx::Error> {
        sqlx::query_as::<_, Saga>(
            "SELECT s.id, s.title, s.authors, s.created_at, s.updated_at \
             FROM favorite_sagas f \
             JOIN sagas s ON s.id = f.saga_id \
             WHERE f.user_id = $1 \
             ORDER BY s.created_at DESC, s.id DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Save a book. Idempotent set-add.
    pub async fn add_book(pool: &PgPool, user_id: DbId, book_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO favorite_books (user_id, book_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(book_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Un-save a book. Idempotent set-remove.
    pub async fn remove_book(
        pool: &PgPool,
        user_id: DbId,
        book_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM favorite_books WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Save a saga. Idempotent set-add.
    pub async fn add_saga(pool: &PgPool, user_id: DbId, saga_id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO favorite_sagas (user_id, saga_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(saga_id)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Un-save a saga. Idempotent set-remove.
    pub async fn remove_saga(
        pool: &PgPool,
        user_id: DbId,
        saga_id: DbId,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM favorite_sagas WHERE user_id = $1 AND saga_id = $2")
            .bind(user_id)
            .bind(saga_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
