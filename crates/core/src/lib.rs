//! Domain types shared by the database and API crates.

pub mod error;
pub mod status;
pub mod taxonomy;
pub mod types;
