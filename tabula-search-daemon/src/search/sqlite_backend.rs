//! SQLite-based search backend
//!
//! Wraps the catalog database to implement the SearchBackend trait.

use async_trait::async_trait;

use tabula_search_core::{DashboardResource, ResultSet, TableResource, UserResource};

use super::{SearchBackend, SearchError};
use crate::catalog::CatalogDb;

/// Search backend over the local catalog database
pub struct SqliteSearchBackend {
    db: CatalogDb,
}

impl SqliteSearchBackend {
    pub fn new(db: CatalogDb) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SearchBackend for SqliteSearchBackend {
    async fn search_tables(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<TableResource>, SearchError> {
        self.db
            .search_tables(term, page_index)
            .map_err(SearchError::from)
    }

    async fn search_users(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<UserResource>, SearchError> {
        self.db
            .search_users(term, page_index)
            .map_err(SearchError::from)
    }

    async fn search_dashboards(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<DashboardResource>, SearchError> {
        self.db
            .search_dashboards(term, page_index)
            .map_err(SearchError::from)
    }

    fn name(&self) -> &'static str {
        "sqlite"
    }
}
