//! Reading status of a book.

use serde::{Deserialize, Serialize};

/// Where a book sits in the reader's pipeline.
///
/// Stored as TEXT in the database using the kebab-case wire form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BookStatus {
    #[default]
    ToRead,
    Reading,
    Finished,
    Abandoned,
    Upcoming,
    Wishlist,
}

impl BookStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookStatus::ToRead => "to-read",
            BookStatus::Reading => "reading",
            BookStatus::Finished => "finished",
            BookStatus::Abandoned => "abandoned",
            BookStatus::Upcoming => "upcoming",
            BookStatus::Wishlist => "wishlist",
        }
    }
}

impl std::fmt::Display for BookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
