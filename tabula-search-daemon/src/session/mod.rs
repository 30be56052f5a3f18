//! Search page session
//!
//! Keeps three surfaces consistent: the navigation location (a `/search`
//! query string), the session's selected tab, and the results store.
//! Handlers return the navigation updates they would apply, so URL rewrites
//! are explicit values rather than hidden side effects.

use std::sync::Arc;

use tracing::debug;

use tabula_search_core::{
    ResourceType, SearchOptions, SelectableTab, derive_query, derive_query_detailed, page_url,
};

use crate::search::{SearchCoordinator, SearchError, SearchStore};

/// How a navigation update should be applied to the location history
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    /// Append a new history entry
    Push,
    /// Rewrite the current entry in place
    Replace,
}

/// A canonical location the client should move to
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct NavigationUpdate {
    pub url: String,
    pub kind: NavigationKind,
}

/// Session state for one search page
pub struct SearchSession {
    coordinator: Arc<SearchCoordinator>,
    store: Arc<SearchStore>,
    selected_tab: SelectableTab,
    current_location: Option<String>,
}

impl SearchSession {
    pub fn new(coordinator: Arc<SearchCoordinator>, store: Arc<SearchStore>) -> Self {
        Self {
            coordinator,
            store,
            selected_tab: SelectableTab::default(),
            current_location: None,
        }
    }

    pub fn selected_tab(&self) -> SelectableTab {
        self.selected_tab
    }

    /// Route a navigation event: the first one mounts the page, later ones
    /// are treated as location changes.
    pub async fn on_location_change(
        &mut self,
        location: &str,
    ) -> Result<Option<NavigationUpdate>, SearchError> {
        if self.current_location.is_none() {
            self.on_mount(location).await
        } else {
            self.on_navigate(location).await.map(|_| None)
        }
    }

    /// First navigation: canonicalize the URL and run the initial search.
    ///
    /// If the coerced tab or page index differs from what was literally in
    /// the URL, one Replace navigation rewrites the location to canonical
    /// form.
    pub async fn on_mount(
        &mut self,
        location: &str,
    ) -> Result<Option<NavigationUpdate>, SearchError> {
        let derived = derive_query_detailed(location, self.selected_tab);
        let query = derived.query;
        self.selected_tab = query.selected_tab;

        let update = if derived.was_canonical {
            self.current_location = Some(location.to_string());
            None
        } else {
            let canonical = page_url(&query.term, query.selected_tab, query.page_index);
            self.current_location = Some(canonical.clone());
            Some(NavigationUpdate {
                url: canonical,
                kind: NavigationKind::Replace,
            })
        };

        if !query.term.is_empty() {
            let options = SearchOptions::for_active_tab(query.page_index, query.selected_tab);
            self.coordinator
                .search_all(&query.term, options, query.selected_tab)
                .await?;
        }

        Ok(update)
    }

    /// Location change: refetch only when the term actually changed, so
    /// pagination-driven URL updates never trigger a redundant aggregate.
    pub async fn on_navigate(&mut self, location: &str) -> Result<(), SearchError> {
        if self.current_location.as_deref() == Some(location) {
            return Ok(());
        }
        self.current_location = Some(location.to_string());

        let query = derive_query(location, self.selected_tab);
        self.selected_tab = query.selected_tab;

        let previous_term = self.store.search_term();
        if query.term != previous_term {
            let options = SearchOptions::for_active_tab(query.page_index, query.selected_tab);
            self.coordinator
                .search_all(&query.term, options, query.selected_tab)
                .await?;
        } else {
            debug!(term = %query.term, "Location change without term change, skipping refetch");
        }
        Ok(())
    }

    /// Pagination change for the currently selected tab
    pub async fn on_page_change(
        &mut self,
        page_index: usize,
    ) -> Result<NavigationUpdate, SearchError> {
        let term = self.store.search_term();
        self.coordinator
            .search_resource(self.selected_tab.as_resource(), &term, page_index)
            .await?;

        let url = page_url(&term, self.selected_tab, page_index);
        self.current_location = Some(url.clone());
        Ok(NavigationUpdate {
            url,
            kind: NavigationKind::Push,
        })
    }

    /// Tab change: dashboards are not selectable and keep the current tab.
    ///
    /// The pushed URL carries the page index already held for the target
    /// tab, so switching tabs never resets pagination. No fetch is issued;
    /// the resulting location change carries the same term.
    pub fn on_tab_change(&mut self, requested: ResourceType) -> NavigationUpdate {
        let tab = SelectableTab::coerce(Some(requested), self.selected_tab);
        self.selected_tab = tab;

        let term = self.store.search_term();
        let page_index = self.store.page_index_for(tab.as_resource());
        let url = page_url(&term, tab, page_index);
        self.current_location = Some(url.clone());
        NavigationUpdate {
            url,
            kind: NavigationKind::Push,
        }
    }
}
