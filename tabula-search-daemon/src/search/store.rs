//! Results store shared between the coordinator and the IPC layer
//!
//! Holds the current term, the loading flag, and one result set per
//! resource type. An aggregate success replaces all three sets in a single
//! transition; a single-resource success replaces exactly one slot. The two
//! write scopes touch disjoint state, so they cannot partially overwrite
//! each other.

use std::sync::RwLock;

use tracing::debug;

use tabula_search_core::{
    DashboardResource, ResourceResults, ResourceType, ResultSet, SelectableTab, TableResource,
    UserResource,
};

/// Combined outcome of an aggregate search, applied in one transition
#[derive(Debug, Clone)]
pub struct AggregateResults {
    pub term: String,
    pub selected_tab: SelectableTab,
    pub tables: ResultSet<TableResource>,
    pub users: ResultSet<UserResource>,
    pub dashboards: ResultSet<DashboardResource>,
}

/// Point-in-time copy of the store contents
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub search_term: String,
    pub is_loading: bool,
    pub tables: ResultSet<TableResource>,
    pub users: ResultSet<UserResource>,
    pub dashboards: ResultSet<DashboardResource>,
}

#[derive(Default)]
struct StoreState {
    search_term: String,
    is_loading: bool,
    tables: ResultSet<TableResource>,
    users: ResultSet<UserResource>,
    dashboards: ResultSet<DashboardResource>,
}

/// Externally owned search results store
#[derive(Default)]
pub struct SearchStore {
    state: RwLock<StoreState>,
}

impl SearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read().unwrap();
        StoreSnapshot {
            search_term: state.search_term.clone(),
            is_loading: state.is_loading,
            tables: state.tables.clone(),
            users: state.users.clone(),
            dashboards: state.dashboards.clone(),
        }
    }

    /// The term the current results were fetched for
    pub fn search_term(&self) -> String {
        self.state.read().unwrap().search_term.clone()
    }

    /// Page index currently held for a resource type
    pub fn page_index_for(&self, resource: ResourceType) -> usize {
        let state = self.state.read().unwrap();
        match resource {
            ResourceType::Table => state.tables.page_index,
            ResourceType::User => state.users.page_index,
            ResourceType::Dashboard => state.dashboards.page_index,
        }
    }

    pub(crate) fn set_loading(&self) {
        self.state.write().unwrap().is_loading = true;
    }

    /// Aggregate success: replace the term and all three result sets at once
    pub(crate) fn apply_all(&self, results: AggregateResults) {
        debug!(term = %results.term, tab = %results.selected_tab, "Replacing all result sets");
        let mut state = self.state.write().unwrap();
        state.search_term = results.term;
        state.tables = results.tables;
        state.users = results.users;
        state.dashboards = results.dashboards;
        state.is_loading = false;
    }

    /// Aggregate failure: discard everything, including partial successes
    pub(crate) fn fail_all(&self) {
        let mut state = self.state.write().unwrap();
        *state = StoreState::default();
    }

    /// Single-resource success: replace exactly one slot
    pub(crate) fn apply_one(&self, results: ResourceResults) {
        let mut state = self.state.write().unwrap();
        match results {
            ResourceResults::Table(set) => state.tables = set,
            ResourceResults::User(set) => state.users = set,
            ResourceResults::Dashboard(set) => state.dashboards = set,
        }
        state.is_loading = false;
    }

    /// Single-resource failure: reset that slot, leave the rest untouched
    pub(crate) fn fail_one(&self, resource: ResourceType) {
        let mut state = self.state.write().unwrap();
        match resource {
            ResourceType::Table => state.tables = ResultSet::empty(),
            ResourceType::User => state.users = ResultSet::empty(),
            ResourceType::Dashboard => state.dashboards = ResultSet::empty(),
        }
        state.is_loading = false;
    }
}
