//! Test doubles for the search layer

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use tabula_search_core::{
    DashboardResource, ResourceType, ResultSet, TableResource, UserResource,
};

use super::{SearchBackend, SearchCoordinator, SearchError, SearchStore};

/// Scripted backend: every search returns a one-row result set echoing the
/// term and page index. One resource type can be made to fail, and the
/// dashboard request for a chosen term can be parked on a gate so tests can
/// control completion order.
pub(crate) struct ScriptedBackend {
    fail: Option<ResourceType>,
    hold_term: Option<String>,
    started: Arc<Notify>,
    release: Arc<Notify>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    pub fn ok() -> Self {
        Self {
            fail: None,
            hold_term: None,
            started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(resource: ResourceType) -> Self {
        Self {
            fail: Some(resource),
            ..Self::ok()
        }
    }

    pub fn holding(term: &str) -> Self {
        Self {
            hold_term: Some(term.to_string()),
            ..Self::ok()
        }
    }

    /// Notified once the held dashboard request has been entered
    pub fn started(&self) -> Arc<Notify> {
        self.started.clone()
    }

    /// Notify to let the held dashboard request proceed
    pub fn release(&self) -> Arc<Notify> {
        self.release.clone()
    }

    /// Shared per-request call counter
    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }

    async fn enter(&self, resource: ResourceType, term: &str) -> Result<(), SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if resource == ResourceType::Dashboard
            && self.hold_term.as_deref() == Some(term)
        {
            self.started.notify_one();
            self.release.notified().await;
        }
        if self.fail == Some(resource) {
            return Err(SearchError::Backend(anyhow::anyhow!("scripted failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchBackend for ScriptedBackend {
    async fn search_tables(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<TableResource>, SearchError> {
        self.enter(ResourceType::Table, term).await?;
        Ok(ResultSet {
            results: vec![TableResource {
                key: format!("hive://core/{}", term),
                name: term.to_string(),
                schema: "core".to_string(),
                database: "hive".to_string(),
                description: None,
                last_updated: None,
            }],
            page_index,
            total_results: 1,
        })
    }

    async fn search_users(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<UserResource>, SearchError> {
        self.enter(ResourceType::User, term).await?;
        Ok(ResultSet {
            results: vec![UserResource {
                key: term.to_string(),
                display_name: term.to_string(),
                email: format!("{}@example.com", term),
                team: None,
            }],
            page_index,
            total_results: 1,
        })
    }

    async fn search_dashboards(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<DashboardResource>, SearchError> {
        self.enter(ResourceType::Dashboard, term).await?;
        Ok(ResultSet {
            results: vec![DashboardResource {
                key: format!("mode/{}", term),
                name: term.to_string(),
                group: "Core".to_string(),
                description: None,
                url: None,
            }],
            page_index,
            total_results: 1,
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Coordinator + fresh store over a scripted backend
pub(crate) fn test_coordinator(
    backend: ScriptedBackend,
) -> (Arc<SearchCoordinator>, Arc<SearchStore>) {
    let store = Arc::new(SearchStore::new());
    let coordinator = Arc::new(SearchCoordinator::new(
        Arc::new(backend),
        store.clone(),
        Duration::from_secs(5),
    ));
    (coordinator, store)
}

/// Coordinator over an existing store, for staging multi-step scenarios
pub(crate) fn test_coordinator_with_store(
    backend: ScriptedBackend,
    store: Arc<SearchStore>,
) -> Arc<SearchCoordinator> {
    Arc::new(SearchCoordinator::new(
        Arc::new(backend),
        store,
        Duration::from_secs(5),
    ))
}

/// Coordinator with a custom request timeout
pub(crate) fn test_coordinator_with_timeout(
    backend: ScriptedBackend,
    request_timeout: Duration,
) -> (Arc<SearchCoordinator>, Arc<SearchStore>) {
    let store = Arc::new(SearchStore::new());
    let coordinator = Arc::new(SearchCoordinator::new(
        Arc::new(backend),
        store.clone(),
        request_timeout,
    ));
    (coordinator, store)
}
