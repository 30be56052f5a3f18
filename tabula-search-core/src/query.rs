//! Search query derivation and canonical `/search` URLs
//!
//! The query string is the source of truth for navigation state. Parsing is
//! forgiving: missing or malformed parameters fall back to defaults, and an
//! unselectable tab request keeps the current tab. Serialization always
//! produces the canonical parameter order.

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceType, SelectableTab};

/// Path portion of every search URL
pub const SEARCH_PATH: &str = "/search";

/// Normalized navigation state for the search page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub page_index: usize,
    pub selected_tab: SelectableTab,
}

/// A derived query plus whether the raw parameters already matched the
/// canonical form (tab and page index tokens literally present and equal)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedQuery {
    pub query: SearchQuery,
    pub was_canonical: bool,
}

/// Raw query parameters as they appear in the URL
#[derive(Debug, Default, Deserialize)]
struct RawParams {
    #[serde(rename = "searchTerm")]
    search_term: Option<String>,
    #[serde(rename = "pageIndex")]
    page_index: Option<String>,
    #[serde(rename = "selectedTab")]
    selected_tab: Option<String>,
}

/// Canonical query parameters, in canonical order
#[derive(Serialize)]
struct CanonicalParams<'a> {
    #[serde(rename = "searchTerm")]
    search_term: &'a str,
    #[serde(rename = "selectedTab")]
    selected_tab: &'a str,
    #[serde(rename = "pageIndex")]
    page_index: usize,
}

/// Derive the normalized query from a raw location.
///
/// `current_tab` is what tab coercion falls back to when the requested tab
/// is absent, unknown, or not selectable. Pure: the same inputs always
/// yield the same query.
pub fn derive_query(raw_location: &str, current_tab: SelectableTab) -> SearchQuery {
    derive_query_detailed(raw_location, current_tab).query
}

/// Like [`derive_query`], but also reports whether the location needs to be
/// rewritten to its canonical form.
pub fn derive_query_detailed(raw_location: &str, current_tab: SelectableTab) -> DerivedQuery {
    let raw: RawParams =
        serde_urlencoded::from_str(query_part(raw_location)).unwrap_or_default();

    let term = raw.search_term.unwrap_or_default();
    let page_index = raw
        .page_index
        .as_deref()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0);
    let requested = raw
        .selected_tab
        .as_deref()
        .and_then(|s| s.parse::<ResourceType>().ok());
    let selected_tab = SelectableTab::coerce(requested, current_tab);

    let tab_canonical = raw.selected_tab.as_deref() == Some(selected_tab.as_resource().as_str());
    let index_canonical = raw.page_index.as_deref() == Some(page_index.to_string().as_str());

    DerivedQuery {
        query: SearchQuery {
            term,
            page_index,
            selected_tab,
        },
        was_canonical: tab_canonical && index_canonical,
    }
}

/// Canonical URL for a search page state:
/// `/search?searchTerm=<term>&selectedTab=<tab>&pageIndex=<n>`
pub fn page_url(term: &str, tab: SelectableTab, page_index: usize) -> String {
    let params = CanonicalParams {
        search_term: term,
        selected_tab: tab.as_resource().as_str(),
        page_index,
    };
    // Three flat string/integer fields; serialization cannot fail.
    let query = serde_urlencoded::to_string(&params).expect("urlencode search params");
    format!("{}?{}", SEARCH_PATH, query)
}

/// Per-resource-type page indexes for an aggregate search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub table_index: usize,
    pub user_index: usize,
    pub dashboard_index: usize,
}

impl SearchOptions {
    /// Page indexes for an aggregate search where only the active tab keeps
    /// its cursor. The other resource types stay on their first page, so a
    /// tab switch or page change never perturbs their pagination.
    pub fn for_active_tab(page_index: usize, tab: SelectableTab) -> Self {
        let mut options = SearchOptions::default();
        match tab {
            SelectableTab::Table => options.table_index = page_index,
            SelectableTab::User => options.user_index = page_index,
        }
        options
    }

    pub fn index_for(&self, resource: ResourceType) -> usize {
        match resource {
            ResourceType::Table => self.table_index,
            ResourceType::User => self.user_index,
            ResourceType::Dashboard => self.dashboard_index,
        }
    }
}

/// Strip the `/search` path and leading `?` so both full URLs and bare
/// query strings parse.
fn query_part(raw_location: &str) -> &str {
    let raw = raw_location.strip_prefix(SEARCH_PATH).unwrap_or(raw_location);
    raw.strip_prefix('?').unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_params_fall_back_to_defaults() {
        let derived = derive_query_detailed("", SelectableTab::User);
        assert_eq!(
            derived.query,
            SearchQuery {
                term: String::new(),
                page_index: 0,
                selected_tab: SelectableTab::User,
            }
        );
        assert!(!derived.was_canonical);
    }

    #[test]
    fn malformed_params_fall_back_to_defaults() {
        let query = derive_query(
            "searchTerm=&pageIndex=abc&selectedTab=chart",
            SelectableTab::Table,
        );
        assert_eq!(query.term, "");
        assert_eq!(query.page_index, 0);
        assert_eq!(query.selected_tab, SelectableTab::Table);
    }

    #[test]
    fn negative_page_index_is_clamped_to_zero() {
        let query = derive_query("searchTerm=hive&pageIndex=-3", SelectableTab::Table);
        assert_eq!(query.page_index, 0);
    }

    #[test]
    fn dashboard_tab_request_retains_current_tab() {
        let query = derive_query(
            "searchTerm=hive&selectedTab=dashboard&pageIndex=1",
            SelectableTab::User,
        );
        assert_eq!(query.selected_tab, SelectableTab::User);
    }

    #[test]
    fn canonical_location_is_recognized() {
        let derived = derive_query_detailed(
            "/search?searchTerm=hive&selectedTab=user&pageIndex=2",
            SelectableTab::Table,
        );
        assert!(derived.was_canonical);
        assert_eq!(derived.query.selected_tab, SelectableTab::User);
        assert_eq!(derived.query.page_index, 2);
    }

    #[test]
    fn rewritten_params_are_flagged_non_canonical() {
        // coerced tab differs from the literal token
        let derived = derive_query_detailed(
            "searchTerm=hive&selectedTab=dashboard&pageIndex=2",
            SelectableTab::Table,
        );
        assert!(!derived.was_canonical);

        // page index token differs from its normalized form
        let derived = derive_query_detailed(
            "searchTerm=hive&selectedTab=table&pageIndex=02",
            SelectableTab::Table,
        );
        assert!(!derived.was_canonical);
    }

    #[test]
    fn page_url_has_canonical_shape() {
        assert_eq!(
            page_url("employee", SelectableTab::User, 2),
            "/search?searchTerm=employee&selectedTab=user&pageIndex=2"
        );
    }

    #[test]
    fn url_round_trips_through_derive_query() {
        for term in ["employee", "data platform", "a&b=c", "100%", ""] {
            for tab in [SelectableTab::Table, SelectableTab::User] {
                for page_index in [0, 1, 7] {
                    let url = page_url(term, tab, page_index);
                    let query = derive_query(&url, SelectableTab::Table);
                    assert_eq!(query.term, term, "url: {}", url);
                    assert_eq!(query.selected_tab, tab, "url: {}", url);
                    assert_eq!(query.page_index, page_index, "url: {}", url);
                }
            }
        }
    }

    #[test]
    fn options_keep_only_the_active_tab_cursor() {
        assert_eq!(
            SearchOptions::for_active_tab(2, SelectableTab::User),
            SearchOptions {
                table_index: 0,
                user_index: 2,
                dashboard_index: 0,
            }
        );
        assert_eq!(
            SearchOptions::for_active_tab(5, SelectableTab::Table).index_for(ResourceType::Table),
            5
        );
        assert_eq!(
            SearchOptions::for_active_tab(5, SelectableTab::Table)
                .index_for(ResourceType::Dashboard),
            0
        );
    }
}
