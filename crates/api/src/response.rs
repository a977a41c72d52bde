//! Shared response types for API handlers.

use serde::Serialize;
use shelflog_db::pagination::page_count;

/// Standard paginated listing envelope:
/// `{ "items": [...], "total", "page", "limit", "pages" }`.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl<T: Serialize> Paginated<T> {
    /// Build the envelope, deriving `pages` from `total` and `limit`.
    pub fn new(items: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        Paginated {
            items,
            total,
            page,
            limit,
            pages: page_count(total, limit),
        }
    }
}
