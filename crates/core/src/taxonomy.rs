//! The fixed tag taxonomy: four categories partitioning all tags.
//!
//! Categories are seeded once by migration and never user-created. Every tag
//! belongs to exactly one category, and an entity's per-category tag lists
//! may only reference tags of the matching category.

use serde::{Deserialize, Serialize};

/// Stable key of a tag category. The wire representation is the lowercase
/// key used in URLs (`/api/books/{id}/{catKey}/{tagId}`) and query filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKey {
    Genres,
    Tropes,
    Triggers,
    Ages,
}

impl CategoryKey {
    /// All recognized category keys, in display order.
    pub const ALL: [CategoryKey; 4] = [
        CategoryKey::Genres,
        CategoryKey::Tropes,
        CategoryKey::Triggers,
        CategoryKey::Ages,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CategoryKey::Genres => "genres",
            CategoryKey::Tropes => "tropes",
            CategoryKey::Triggers => "triggers",
            CategoryKey::Ages => "ages",
        }
    }

    /// Parse a path/query token into a category key.
    ///
    /// Returns `None` for anything outside the four recognized values;
    /// callers turn that into a validation error.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "genres" => Some(CategoryKey::Genres),
            "tropes" => Some(CategoryKey::Tropes),
            "triggers" => Some(CategoryKey::Triggers),
            "ages" => Some(CategoryKey::Ages),
            _ => None,
        }
    }
}

impl std::fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of entity that can carry tags (and the value stored in the
/// `entity_tags.entity_kind` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Book,
    Saga,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Book => "book",
            EntityKind::Saga => "saga",
        }
    }

    /// Entity name used in not-found error messages.
    pub fn entity_name(self) -> &'static str {
        match self {
            EntityKind::Book => "Book",
            EntityKind::Saga => "Saga",
        }
    }
}
