//! Book model, DTOs, list filter, and the wire-facing view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shelflog_core::status::BookStatus;
use shelflog_core::taxonomy::CategoryKey;
use shelflog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::saga::SagaSummary;
use super::serde_util::double_option;
use super::tag::{EntityTagRow, TagInfo};

/// A row from the `books` table. Tag lists and saga membership live in
/// junction tables; responses are shaped through [`BookView`].
#[derive(Debug, Clone, FromRow)]
pub struct Book {
    pub id: DbId,
    pub title: String,
    pub authors: Vec<String>,
    pub status: String,
    pub saga_id: Option<DbId>,
    pub release_date: Option<NaiveDate>,
    pub avg_rating: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lean `{id, title, authors}` projection used when expanding a saga's
/// member list.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookSummary {
    pub id: DbId,
    pub title: String,
    pub authors: Vec<String>,
}

/// A tag reference in a response: bare id, or `{id, name}` when the
/// request asked for `populate=1`.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TagRef {
    Id(DbId),
    Expanded(TagInfo),
}

/// A saga reference in a book response: bare id or lean projection.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum SagaRef {
    Id(DbId),
    Expanded(SagaSummary),
}

/// Wire shape of a book: the row's scalar fields plus the four
/// per-category tag lists and the saga reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookView {
    pub id: DbId,
    pub title: String,
    pub authors: Vec<String>,
    pub status: String,
    pub genres: Vec<TagRef>,
    pub tropes: Vec<TagRef>,
    pub triggers: Vec<TagRef>,
    pub ages: Vec<TagRef>,
    pub saga: Option<SagaRef>,
    pub release_date: Option<NaiveDate>,
    pub avg_rating: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BookView {
    /// Shape a book row for the wire.
    ///
    /// `tags` are the book's attachment rows; `saga` is the expanded
    /// projection to use when populating (`None` falls back to the bare
    /// `saga_id`). When `populate` is false every reference is a bare id.
    pub fn assemble(
        book: Book,
        tags: &[EntityTagRow],
        saga: Option<SagaSummary>,
        populate: bool,
    ) -> Self {
        let pick = |key: CategoryKey| -> Vec<TagRef> {
            tags.iter()
                .filter(|t| t.entity_id == book.id && t.category_key == key.as_str())
                .map(|t| {
                    if populate {
                        TagRef::Expanded(TagInfo {
                            id: t.tag_id,
                            name: t.name.clone(),
                        })
                    } else {
                        TagRef::Id(t.tag_id)
                    }
                })
                .collect()
        };

        let saga_ref = match (populate, saga, book.saga_id) {
            (true, Some(s), _) => Some(SagaRef::Expanded(s)),
            (_, _, Some(id)) => Some(SagaRef::Id(id)),
            _ => None,
        };

        BookView {
            genres: pick(CategoryKey::Genres),
            tropes: pick(CategoryKey::Tropes),
            triggers: pick(CategoryKey::Triggers),
            ages: pick(CategoryKey::Ages),
            saga: saga_ref,
            id: book.id,
            title: book.title,
            authors: book.authors,
            status: book.status,
            release_date: book.release_date,
            avg_rating: book.avg_rating,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

/// Request body for `POST /api/books`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub status: BookStatus,
    #[serde(default)]
    pub genres: Vec<DbId>,
    #[serde(default)]
    pub tropes: Vec<DbId>,
    #[serde(default)]
    pub triggers: Vec<DbId>,
    #[serde(default)]
    pub ages: Vec<DbId>,
    pub saga: Option<DbId>,
    pub release_date: Option<NaiveDate>,
}

/// Request body for `PATCH /api/books/:id`. Only whitelisted fields;
/// `saga` and `release_date` distinguish "absent" from "explicit null".
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub status: Option<BookStatus>,
    pub genres: Option<Vec<DbId>>,
    pub tropes: Option<Vec<DbId>>,
    pub triggers: Option<Vec<DbId>>,
    pub ages: Option<Vec<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub saga: Option<Option<DbId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub release_date: Option<Option<NaiveDate>>,
}

impl UpdateBook {
    /// True when the body carried none of the whitelisted fields.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_none()
            && self.status.is_none()
            && self.genres.is_none()
            && self.tropes.is_none()
            && self.triggers.is_none()
            && self.ages.is_none()
            && self.saga.is_none()
            && self.release_date.is_none()
    }

    /// Tag lists present in the patch, paired with their category.
    pub fn category_lists(&self) -> Vec<(CategoryKey, &Vec<DbId>)> {
        [
            (CategoryKey::Genres, &self.genres),
            (CategoryKey::Tropes, &self.tropes),
            (CategoryKey::Triggers, &self.triggers),
            (CategoryKey::Ages, &self.ages),
        ]
        .into_iter()
        .filter_map(|(key, list)| list.as_ref().map(|l| (key, l)))
        .collect()
    }
}

/// Request body for `PATCH /api/books/:id/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatus {
    pub status: BookStatus,
}

/// Request body for `PATCH /api/books/:id/release`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRelease {
    pub release_date: Option<NaiveDate>,
}

/// Request body for `PATCH /api/books/:id/saga`. `{"saga": null}` and an
/// absent field both clear the assignment, matching the delete endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SetSaga {
    #[serde(default)]
    pub saga: Option<DbId>,
}

/// Database-facing filter for the book listing, built by the handler from
/// query parameters.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub q: Option<String>,
    pub status: Option<BookStatus>,
    pub genres: Vec<DbId>,
    pub tropes: Vec<DbId>,
    pub triggers: Vec<DbId>,
    pub ages: Vec<DbId>,
}

impl BookFilter {
    /// The four per-category id filters (OR within a category, AND across).
    pub fn category_filters(&self) -> [(CategoryKey, &Vec<DbId>); 4] {
        [
            (CategoryKey::Genres, &self.genres),
            (CategoryKey::Tropes, &self.tropes),
            (CategoryKey::Triggers, &self.triggers),
            (CategoryKey::Ages, &self.ages),
        ]
    }
}
