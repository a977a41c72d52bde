//! Saga model, DTOs, and the wire-facing view.

use serde::{Deserialize, Serialize};
use shelflog_core::taxonomy::CategoryKey;
use shelflog_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::book::{BookSummary, TagRef};
use super::tag::{EntityTagRow, TagInfo};

/// A row from the `sagas` table.
#[derive(Debug, Clone, FromRow)]
pub struct Saga {
    pub id: DbId,
    pub title: String,
    pub authors: Vec<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Lean `{id, title}` projection used when populating a book's saga.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SagaSummary {
    pub id: DbId,
    pub title: String,
}

/// One saga-side membership row joined with the book's summary fields.
#[derive(Debug, Clone, FromRow)]
pub struct SagaBookRow {
    pub saga_id: DbId,
    pub book_id: DbId,
    pub title: String,
    pub authors: Vec<String>,
}

/// A member-book reference: bare id, or `{id, title, authors}` when
/// populating.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BookRef {
    Id(DbId),
    Expanded(BookSummary),
}

/// Wire shape of a saga: scalar fields plus the four per-category tag
/// lists and the member-book list.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SagaView {
    pub id: DbId,
    pub title: String,
    pub authors: Vec<String>,
    pub genres: Vec<TagRef>,
    pub tropes: Vec<TagRef>,
    pub triggers: Vec<TagRef>,
    pub ages: Vec<TagRef>,
    pub books: Vec<BookRef>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SagaView {
    /// Shape a saga row for the wire. `tags` and `members` are attachment
    /// rows for any number of sagas; only this saga's rows are used.
    pub fn assemble(
        saga: Saga,
        tags: &[EntityTagRow],
        members: &[SagaBookRow],
        populate: bool,
    ) -> Self {
        let pick = |key: CategoryKey| -> Vec<TagRef> {
            tags.iter()
                .filter(|t| t.entity_id == saga.id && t.category_key == key.as_str())
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

        let books = members
            .iter()
            .filter(|m| m.saga_id == saga.id)
            .map(|m| {
                if populate {
                    BookRef::Expanded(BookSummary {
                        id: m.book_id,
                        title: m.title.clone(),
                        authors: m.authors.clone(),
                    })
                } else {
                    BookRef::Id(m.book_id)
                }
            })
            .collect();

        SagaView {
            genres: pick(CategoryKey::Genres),
            tropes: pick(CategoryKey::Tropes),
            triggers: pick(CategoryKey::Triggers),
            ages: pick(CategoryKey::Ages),
            books,
            id: saga.id,
            title: saga.title,
            authors: saga.authors,
            created_at: saga.created_at,
            updated_at: saga.updated_at,
        }
    }
}

/// Request body for `POST /api/sagas`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaga {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub genres: Vec<DbId>,
    #[serde(default)]
    pub tropes: Vec<DbId>,
    #[serde(default)]
    pub triggers: Vec<DbId>,
    #[serde(default)]
    pub ages: Vec<DbId>,
    #[serde(default)]
    pub books: Vec<DbId>,
}

/// Request body for `PATCH /api/sagas/:id`. Whitelisted fields only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSaga {
    pub title: Option<String>,
    pub authors: Option<Vec<String>>,
    pub genres: Option<Vec<DbId>>,
    pub tropes: Option<Vec<DbId>>,
    pub triggers: Option<Vec<DbId>>,
    pub ages: Option<Vec<DbId>>,
    pub books: Option<Vec<DbId>>,
}

impl UpdateSaga {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.authors.is_none()
            && self.genres.is_none()
            && self.tropes.is_none()
            && self.triggers.is_none()
            && self.ages.is_none()
            && self.books.is_none()
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

/// Database-facing filter for the saga listing.
#[derive(Debug, Clone, Default)]
pub struct SagaFilter {
    pub q: Option<String>,
    pub genres: Vec<DbId>,
    pub tropes: Vec<DbId>,
    pub triggers: Vec<DbId>,
    pub ages: Vec<DbId>,
}

impl SagaFilter {
    pub fn category_filters(&self) -> [(CategoryKey, &Vec<DbId>); 4] {
        [
            (CategoryKey::Genres, &self.genres),
            (CategoryKey::Tropes, &self.tropes),
            (CategoryKey::Triggers, &self.triggers),
            (CategoryKey::Ages, &self.ages),
        ]
    }
}
