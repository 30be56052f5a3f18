//! Search backend abstraction layer
//!
//! Each resource type is searched independently, so backends expose one
//! paged search per resource type and the coordinator can fan the three
//! requests out concurrently.

mod coordinator;
mod sqlite_backend;
mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use coordinator::SearchCoordinator;
pub use sqlite_backend::SqliteSearchBackend;
pub use store::{AggregateResults, SearchStore, StoreSnapshot};

use async_trait::async_trait;
use thiserror::Error;

use tabula_search_core::{
    DashboardResource, ResourceResults, ResourceType, ResultSet, TableResource, UserResource,
};

/// Search backend errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request timed out")]
    Timeout,

    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Trait for search backends.
///
/// Backends must be Send + Sync for use across async tasks. Catalog
/// queries are fast, so implementations may run them inline on the
/// runtime; slow transports belong behind their own timeout (the
/// coordinator applies one per request regardless).
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Paged table search
    async fn search_tables(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<TableResource>, SearchError>;

    /// Paged user search
    async fn search_users(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<UserResource>, SearchError>;

    /// Paged dashboard search
    async fn search_dashboards(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<DashboardResource>, SearchError>;

    /// Search exactly one resource type
    async fn search_one(
        &self,
        resource: ResourceType,
        term: &str,
        page_index: usize,
    ) -> Result<ResourceResults, SearchError> {
        match resource {
            ResourceType::Table => Ok(ResourceResults::Table(
                self.search_tables(term, page_index).await?,
            )),
            ResourceType::User => Ok(ResourceResults::User(
                self.search_users(term, page_index).await?,
            )),
            ResourceType::Dashboard => Ok(ResourceResults::Dashboard(
                self.search_dashboards(term, page_index).await?,
            )),
        }
    }

    /// Backend name for logging/status
    fn name(&self) -> &'static str;
}
