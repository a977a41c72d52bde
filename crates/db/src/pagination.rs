//! Clamping helpers for paginated list queries.
//!
//! Repositories clamp caller-supplied page/limit values rather than
//! rejecting them, so handlers never see out-of-range pagination.

/// Default page size for book/saga listings.
pub const DEFAULT_LIMIT: i64 = 12;

/// Maximum page size for book/saga listings.
pub const MAX_LIMIT: i64 = 50;

/// Clamp a 1-based page number.
pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Clamp a page size into `1..=MAX_LIMIT`, defaulting to [`DEFAULT_LIMIT`].
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Number of pages needed for `total` rows at `limit` rows per page.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total == 0 {
        0
    } else {
        (total + limit - 1) / limit
    }
}
