//! Aggregate and single-resource search orchestration
//!
//! `search_all` fans one request out per resource type, joins on all three,
//! and commits the merged result in one store transition; any failure
//! discards the partial successes of the others. Every store-writing
//! operation is generation-stamped, so a superseded request can never
//! overwrite a newer one.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, warn};

use tabula_search_core::{ResourceType, SearchOptions, SelectableTab};

use super::store::{AggregateResults, SearchStore};
use super::{SearchBackend, SearchError};

/// Orchestrates backend searches and store updates
pub struct SearchCoordinator {
    backend: Arc<dyn SearchBackend>,
    store: Arc<SearchStore>,
    generation: AtomicU64,
    request_timeout: Duration,
}

impl SearchCoordinator {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        store: Arc<SearchStore>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            store,
            generation: AtomicU64::new(0),
            request_timeout,
        }
    }

    /// Issue an aggregate search across all resource types.
    ///
    /// The three requests run concurrently and the join waits for all of
    /// them. The merged result is applied only if no newer operation was
    /// issued while this one was in flight.
    pub async fn search_all(
        &self,
        term: &str,
        options: SearchOptions,
        selected_tab: SelectableTab,
    ) -> Result<(), SearchError> {
        let token = self.next_generation();
        self.store.set_loading();

        let outcome = tokio::try_join!(
            self.with_timeout(self.backend.search_tables(term, options.table_index)),
            self.with_timeout(self.backend.search_users(term, options.user_index)),
            self.with_timeout(self.backend.search_dashboards(term, options.dashboard_index)),
        );

        match outcome {
            Ok((tables, users, dashboards)) => {
                if !self.is_current(token) {
                    debug!(term, token, "Dropping superseded aggregate search result");
                    return Ok(());
                }
                debug!(
                    term,
                    tab = %selected_tab,
                    tables = tables.total_results,
                    users = users.total_results,
                    dashboards = dashboards.total_results,
                    "Aggregate search complete"
                );
                self.store.apply_all(AggregateResults {
                    term: term.to_string(),
                    selected_tab,
                    tables,
                    users,
                    dashboards,
                });
                Ok(())
            }
            Err(err) => {
                warn!(term, error = %err, "Aggregate search failed, discarding partial results");
                if self.is_current(token) {
                    self.store.fail_all();
                }
                Err(err)
            }
        }
    }

    /// Issue a single-resource search for one page of one resource type
    pub async fn search_resource(
        &self,
        resource: ResourceType,
        term: &str,
        page_index: usize,
    ) -> Result<(), SearchError> {
        let token = self.next_generation();
        self.store.set_loading();

        let outcome = self
            .with_timeout(self.backend.search_one(resource, term, page_index))
            .await;

        match outcome {
            Ok(results) => {
                if !self.is_current(token) {
                    debug!(%resource, term, token, "Dropping superseded resource search result");
                    return Ok(());
                }
                debug!(
                    %resource,
                    term,
                    page_index,
                    total = results.total_results(),
                    "Resource search complete"
                );
                self.store.apply_one(results);
                Ok(())
            }
            Err(err) => {
                warn!(%resource, term, error = %err, "Resource search failed");
                if self.is_current(token) {
                    self.store.fail_one(resource);
                }
                Err(err)
            }
        }
    }

    async fn with_timeout<T>(
        &self,
        fut: impl Future<Output = Result<T, SearchError>>,
    ) -> Result<T, SearchError> {
        match timeout(self.request_timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout),
        }
    }

    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, token: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == token
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::{
        ScriptedBackend, test_coordinator, test_coordinator_with_store,
        test_coordinator_with_timeout,
    };

    #[tokio::test]
    async fn aggregate_success_replaces_all_three_sets() {
        let (coordinator, store) = test_coordinator(ScriptedBackend::ok());

        coordinator
            .search_all(
                "employee",
                SearchOptions::for_active_tab(2, SelectableTab::User),
                SelectableTab::User,
            )
            .await
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.search_term, "employee");
        assert!(!snapshot.is_loading);
        assert_eq!(snapshot.tables.page_index, 0);
        assert_eq!(snapshot.users.page_index, 2);
        assert_eq!(snapshot.dashboards.page_index, 0);
        assert_eq!(snapshot.tables.total_results, 1);
    }

    #[tokio::test]
    async fn failed_fan_out_discards_partial_successes() {
        let (coordinator, store) = test_coordinator(ScriptedBackend::ok());

        // Seed the store with an earlier successful aggregate.
        coordinator
            .search_all("old", SearchOptions::default(), SelectableTab::Table)
            .await
            .unwrap();
        assert_eq!(store.snapshot().search_term, "old");

        let failing = test_coordinator_with_store(
            ScriptedBackend::failing(ResourceType::Dashboard),
            store.clone(),
        );
        let err = failing
            .search_all("new", SearchOptions::default(), SelectableTab::Table)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Backend(_)));

        // No partial merge: tables and users succeeded but are discarded too.
        let snapshot = store.snapshot();
        assert_eq!(snapshot.search_term, "");
        assert_eq!(snapshot.tables.total_results, 0);
        assert_eq!(snapshot.users.total_results, 0);
        assert_eq!(snapshot.dashboards.total_results, 0);
        assert!(!snapshot.is_loading);
    }

    #[tokio::test]
    async fn superseded_aggregate_is_dropped() {
        let backend = ScriptedBackend::holding("old");
        let started = backend.started();
        let release = backend.release();
        let (coordinator, store) = test_coordinator(backend);

        let slow = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .search_all("old", SearchOptions::default(), SelectableTab::Table)
                    .await
            })
        };

        // Wait until the first aggregate is parked in the backend, then run
        // a newer one to completion.
        started.notified().await;
        coordinator
            .search_all("new", SearchOptions::default(), SelectableTab::Table)
            .await
            .unwrap();
        assert_eq!(store.snapshot().search_term, "new");

        // Let the stale aggregate finish; its result must be dropped.
        release.notify_one();
        slow.await.unwrap().unwrap();
        assert_eq!(store.snapshot().search_term, "new");
        assert_eq!(store.snapshot().tables.results[0].name, "new");
    }

    #[tokio::test]
    async fn single_resource_success_updates_only_its_slot() {
        let (coordinator, store) = test_coordinator(ScriptedBackend::ok());

        coordinator
            .search_all("employee", SearchOptions::default(), SelectableTab::Table)
            .await
            .unwrap();

        coordinator
            .search_resource(ResourceType::User, "employee", 2)
            .await
            .unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.search_term, "employee");
        assert_eq!(snapshot.users.page_index, 2);
        // The other slots keep the aggregate's results.
        assert_eq!(snapshot.tables.page_index, 0);
        assert_eq!(snapshot.tables.total_results, 1);
        assert_eq!(snapshot.dashboards.total_results, 1);
    }

    #[tokio::test]
    async fn single_resource_failure_leaves_other_types_untouched() {
        let (coordinator, store) = test_coordinator(ScriptedBackend::ok());
        coordinator
            .search_all("employee", SearchOptions::default(), SelectableTab::Table)
            .await
            .unwrap();

        let failing = test_coordinator_with_store(
            ScriptedBackend::failing(ResourceType::User),
            store.clone(),
        );
        let err = failing
            .search_resource(ResourceType::User, "employee", 1)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Backend(_)));

        let snapshot = store.snapshot();
        assert_eq!(snapshot.users.total_results, 0);
        assert_eq!(snapshot.tables.total_results, 1);
        assert_eq!(snapshot.dashboards.total_results, 1);
        assert_eq!(snapshot.search_term, "employee");
    }

    #[tokio::test]
    async fn timed_out_request_fails_the_whole_aggregate() {
        let backend = ScriptedBackend::holding("slow");
        let (coordinator, store) =
            test_coordinator_with_timeout(backend, Duration::from_millis(20));

        let err = coordinator
            .search_all("slow", SearchOptions::default(), SelectableTab::Table)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Timeout));
        assert_eq!(store.snapshot().search_term, "");
    }
}
