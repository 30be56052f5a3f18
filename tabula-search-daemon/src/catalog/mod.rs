//! Catalog metadata store
//!
//! SQLite-backed storage for the searchable catalog entities.

mod queries;
mod store;

pub use queries::CatalogStats;
pub use store::CatalogDb;
