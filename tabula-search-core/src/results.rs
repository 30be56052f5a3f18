//! Paged search results and the derived page view

use serde::{Deserialize, Serialize};

use crate::resource::{DashboardResource, ResourceType, TableResource, UserResource};

/// Results per page, shared by URL math, page view math, and the backend's
/// LIMIT/OFFSET paging. These must agree or the out-of-range check misfires.
pub const RESULTS_PER_PAGE: usize = 10;

/// One page of search results for a single resource type.
///
/// Result sets are replaced wholesale on every fetch completion, never
/// mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSet<T> {
    pub results: Vec<T>,
    pub page_index: usize,
    pub total_results: usize,
}

impl<T> ResultSet<T> {
    pub fn empty() -> Self {
        Self {
            results: Vec::new(),
            page_index: 0,
            total_results: 0,
        }
    }
}

impl<T> Default for ResultSet<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// The payload of a single-resource fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resource", rename_all = "lowercase")]
pub enum ResourceResults {
    Table(ResultSet<TableResource>),
    User(ResultSet<UserResource>),
    Dashboard(ResultSet<DashboardResource>),
}

impl ResourceResults {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            ResourceResults::Table(_) => ResourceType::Table,
            ResourceResults::User(_) => ResourceType::User,
            ResourceResults::Dashboard(_) => ResourceType::Dashboard,
        }
    }

    pub fn total_results(&self) -> usize {
        match self {
            ResourceResults::Table(set) => set.total_results,
            ResourceResults::User(set) => set.total_results,
            ResourceResults::Dashboard(set) => set.total_results,
        }
    }
}

/// What the results pane should show for one result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageView {
    /// Nothing has been searched yet
    Empty,
    /// A term was searched and nothing matched
    NoResults,
    /// The page cursor points past the last result
    OutOfRange,
    /// A renderable page, with 1-based start/end positions
    Page {
        start_index: usize,
        end_index: usize,
        total_results: usize,
    },
}

impl PageView {
    /// Select the branch for one result set.
    ///
    /// "No results" and "out of range" are user-facing states, not
    /// failures; both leave the caller with nothing to render but a
    /// message.
    pub fn resolve(term: &str, page_index: usize, total_results: usize) -> PageView {
        if total_results == 0 {
            if term.is_empty() {
                return PageView::Empty;
            }
            return PageView::NoResults;
        }

        let start_index = RESULTS_PER_PAGE * page_index + 1;
        if start_index > total_results {
            return PageView::OutOfRange;
        }

        let end_index = (RESULTS_PER_PAGE * (page_index + 1)).min(total_results);
        PageView::Page {
            start_index,
            end_index,
            total_results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_results_branch_requires_a_term() {
        assert_eq!(PageView::resolve("employee", 0, 0), PageView::NoResults);
        assert_eq!(PageView::resolve("", 0, 0), PageView::Empty);
    }

    #[test]
    fn out_of_range_when_page_starts_past_total() {
        // page 3 of 25 results at 10 per page starts at 31
        assert_eq!(PageView::resolve("employee", 3, 25), PageView::OutOfRange);
    }

    #[test]
    fn page_bounds_are_one_based_and_clamped() {
        assert_eq!(
            PageView::resolve("employee", 2, 25),
            PageView::Page {
                start_index: 21,
                end_index: 25,
                total_results: 25,
            }
        );
        assert_eq!(
            PageView::resolve("employee", 0, 25),
            PageView::Page {
                start_index: 1,
                end_index: 10,
                total_results: 25,
            }
        );
    }

    #[test]
    fn last_fully_occupied_page_is_in_range() {
        assert_eq!(
            PageView::resolve("employee", 1, 20),
            PageView::Page {
                start_index: 11,
                end_index: 20,
                total_results: 20,
            }
        );
        assert_eq!(PageView::resolve("employee", 2, 20), PageView::OutOfRange);
    }
}
