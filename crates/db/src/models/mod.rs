//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//! - Where relevant, a view struct shaping the wire response (camelCase,
//!   relation fields either bare ids or expanded projections)

pub mod book;
pub mod quote;
pub mod reading_entry;
pub mod review;
pub mod saga;
pub mod tag;
pub mod user;

pub(crate) mod serde_util {
    use serde::{Deserialize, Deserializer};

    /// Deserialize into `Some(inner)` so a PATCH body can distinguish an
    /// absent field (`None`) from an explicit `null` (`Some(None)`).
    pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(de).map(Some)
    }
}
