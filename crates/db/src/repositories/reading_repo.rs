//! Repository for the append-only `reading_entries` table.

use shelflog_core::types::DbId;
use sqlx::PgPool;

use crate::models::reading_entry::{CreateReadingEntry, ReadingEntry};

/// Column list for `reading_entries` queries.
const ENTRY_COLUMNS: &str =
    "id, user_id, book_id, date, pages_read, minutes, progress, note, created_at";

/// Provides the reading log operations. Entries are never updated or
/// aggregated; the log is a plain journal.
pub struct ReadingRepo;

impl ReadingRepo {
    /// The caller's entries, newest date first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<ReadingEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM reading_entries \
             WHERE user_id = $1 \
             ORDER BY date DESC, created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ReadingEntry>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Append an entry. Range checks on the optional counters are enforced
    /// both here (API 400) and by table CHECK constraints.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateReadingEntry,
    ) -> Result<ReadingEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO reading_entries (user_id, book_id, date, pages_read, minutes, progress, note) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, ReadingEntry>(&query)
            .bind(user_id)
            .bind(input.book)
            .bind(input.date)
            .bind(input.pages_read)
            .bind(input.minutes)
            .bind(input.progress)
            .bind(&input.note)
            .fetch_one(pool)
            .await
    }
}
