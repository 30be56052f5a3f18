//! Shared types for tabula-search
//!
//! This crate contains the types shared between the daemon executable and
//! client tooling: catalog resource records, paged result sets, and the
//! search query model that round-trips through `/search` URLs.

mod query;
mod resource;
mod results;

pub use query::{
    DerivedQuery, SEARCH_PATH, SearchOptions, SearchQuery, derive_query, derive_query_detailed,
    page_url,
};
pub use resource::{
    CatalogSnapshot, DashboardResource, ResourceType, SelectableTab, TableResource, UserResource,
};
pub use results::{PageView, RESULTS_PER_PAGE, ResourceResults, ResultSet};
