//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Multi-step sequences
//! (saga reassignment, tag-list replacement on bulk updates) run inside
//! a single transaction.

pub mod book_repo;
pub mod favorite_repo;
pub mod quote_repo;
pub mod reading_repo;
pub mod review_repo;
pub mod saga_repo;
pub mod tag_repo;
pub mod user_repo;

pub use book_repo::BookRepo;
pub use favorite_repo::FavoriteRepo;
pub use quote_repo::QuoteRepo;
pub use reading_repo::ReadingRepo;
pub use review_repo::ReviewRepo;
pub use saga_repo::SagaRepo;
pub use tag_repo::TagRepo;
pub use user_repo::UserRepo;
