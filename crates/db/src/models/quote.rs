//! Quote models. Quotes belong to exactly one book and are only ever
//! addressed through it.

use serde::{Deserialize, Serialize};
use shelflog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::serde_util::double_option;

/// A row from the `book_quotes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: DbId,
    pub book_id: DbId,
    pub text: String,
    pub page: Option<i32>,
    pub favorite: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for `POST /api/books/:id/quotes`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuote {
    pub text: String,
    pub page: Option<i32>,
}

/// Request body for `PATCH /api/books/:id/quotes/:qid`. Partial update;
/// `page` distinguishes "absent" (keep) from explicit `null` (clear).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuote {
    pub text: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub page: Option<Option<i32>>,
    pub favorite: Option<bool>,
}

/// Cross-book projection for the favorite-quotes feed.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteQuote {
    pub book_id: DbId,
    pub book_title: String,
    pub quote_id: DbId,
    pub text: String,
    pub page: Option<i32>,
    pub created_at: Timestamp,
}
