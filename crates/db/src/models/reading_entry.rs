//! Reading-log models. The log is append-only; nothing aggregates it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shelflog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `reading_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingEntry {
    pub id: DbId,
    #[serde(rename = "user")]
    pub user_id: DbId,
    #[serde(rename = "book")]
    pub book_id: DbId,
    pub date: NaiveDate,
    pub pages_read: Option<i32>,
    pub minutes: Option<i32>,
    pub progress: Option<i32>,
    pub note: Option<String>,
    pub created_at: Timestamp,
}

/// Request body for `POST /api/reading`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReadingEntry {
    pub book: DbId,
    pub date: NaiveDate,
    pub pages_read: Option<i32>,
    pub minutes: Option<i32>,
    pub progress: Option<i32>,
    pub note: Option<String>,
}
