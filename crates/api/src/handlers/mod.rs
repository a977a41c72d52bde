//! HTTP request handlers, one module per resource.

pub mod auth;
pub mod books;
pub mod favorites;
pub mod quotes;
pub mod reading;
pub mod reviews;
pub mod sagas;
pub mod tags;
pub mod tagging;
