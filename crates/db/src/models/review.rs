//! Review models. At most one review per `(user, book)` pair; every
//! mutation triggers a recompute of the book's average rating.

use serde::{Deserialize, Serialize};
use shelflog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::user::UserSummary;

/// A row from the `reviews` table. The wire names for the reference
/// fields are `user` and `book` (bare ids).
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: DbId,
    #[serde(rename = "user")]
    pub user_id: DbId,
    #[serde(rename = "book")]
    pub book_id: DbId,
    pub rating: f64,
    pub title: String,
    pub body: String,
    pub spoiler: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Flat row for the by-book listing, joined with the author's name.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewUserRow {
    pub id: DbId,
    pub user_id: DbId,
    pub user_name: String,
    pub book_id: DbId,
    pub rating: f64,
    pub title: String,
    pub body: String,
    pub spoiler: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Wire shape of a review in the by-book listing: author expanded to
/// `{id, name}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithUser {
    pub id: DbId,
    pub user: UserSummary,
    pub book: DbId,
    pub rating: f64,
    pub title: String,
    pub body: String,
    pub spoiler: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ReviewUserRow> for ReviewWithUser {
    fn from(row: ReviewUserRow) -> Self {
        ReviewWithUser {
            id: row.id,
            user: UserSummary {
                id: row.user_id,
                name: row.user_name,
            },
            book: row.book_id,
            rating: row.rating,
            title: row.title,
            body: row.body,
            spoiler: row.spoiler,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Request body for `POST /api/reviews`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReview {
    pub book: DbId,
    pub rating: f64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub spoiler: bool,
}

/// Request body for `PATCH /api/reviews/:id`. The referenced book is
/// immutable after creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateReview {
    pub rating: Option<f64>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub spoiler: Option<bool>,
}
