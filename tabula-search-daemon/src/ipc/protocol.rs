//! IPC protocol definitions

use serde::{Deserialize, Serialize};

use tabula_search_core::{
    DashboardResource, ResourceType, ResultSet, SelectableTab, TableResource, UserResource,
};

use crate::catalog::CatalogStats;
use crate::config::Config;
use crate::search::StoreSnapshot;
use crate::session::NavigationUpdate;

/// Request message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Drive the session with a navigation event (a raw `/search` URL or
    /// bare query string)
    Navigate { location: String },

    /// Search a term from the first page of the currently selected tab
    Search { term: String },

    /// Change the page index of the currently selected tab
    Page { index: usize },

    /// Switch the selected tab
    Tab { resource: ResourceType },

    /// Current session and store state
    Show,

    /// Get index status
    Status,

    /// Import a catalog snapshot file into the index
    Import {
        path: String,
        /// Clear existing entities before importing
        #[serde(default)]
        replace: bool,
    },

    /// Get current configuration
    GetConfig,

    /// Reload configuration from disk
    ReloadConfig,
}

/// Response message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Session and store state after handling a request
    State {
        /// Navigation the client should apply, if any
        location: Option<NavigationUpdate>,
        search_term: String,
        selected_tab: SelectableTab,
        is_loading: bool,
        tables: ResultSet<TableResource>,
        users: ResultSet<UserResource>,
        dashboards: ResultSet<DashboardResource>,
    },

    /// Status response
    Status {
        backend: String,
        tables: u64,
        users: u64,
        dashboards: u64,
        database_size_bytes: u64,
    },

    /// Config response
    Config {
        request_timeout_ms: u64,
        log_level: String,
        socket_path: String,
        db_path: String,
    },

    /// Success response
    Ok { message: String },

    /// Error response
    Error { message: String },
}

impl Response {
    /// Create an OK response
    pub fn ok(message: impl Into<String>) -> Self {
        Response::Ok {
            message: message.into(),
        }
    }

    /// Create an error response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    /// Create a state response from a store snapshot
    pub fn state(
        location: Option<NavigationUpdate>,
        selected_tab: SelectableTab,
        snapshot: StoreSnapshot,
    ) -> Self {
        Response::State {
            location,
            search_term: snapshot.search_term,
            selected_tab,
            is_loading: snapshot.is_loading,
            tables: snapshot.tables,
            users: snapshot.users,
            dashboards: snapshot.dashboards,
        }
    }

    /// Create a status response
    pub fn status(stats: &CatalogStats, backend: &str) -> Self {
        Response::Status {
            backend: backend.to_string(),
            tables: stats.tables,
            users: stats.users,
            dashboards: stats.dashboards,
            database_size_bytes: stats.database_size_bytes,
        }
    }

    /// Create a config response
    pub fn config(config: &Config) -> Self {
        Response::Config {
            request_timeout_ms: config.search.request_timeout_ms,
            log_level: config.service.log_level.clone(),
            socket_path: config.socket_path().to_string_lossy().to_string(),
            db_path: config.db_path.to_string_lossy().to_string(),
        }
    }
}

/// State response for the IPC client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateResponse {
    pub location: Option<NavigationUpdate>,
    pub search_term: String,
    pub selected_tab: SelectableTab,
    pub is_loading: bool,
    pub tables: ResultSet<TableResource>,
    pub users: ResultSet<UserResource>,
    pub dashboards: ResultSet<DashboardResource>,
}

/// Status response for the IPC client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub backend: String,
    pub tables: u64,
    pub users: u64,
    pub dashboards: u64,
    pub database_size_bytes: u64,
}

/// Config response for the IPC client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub request_timeout_ms: u64,
    pub log_level: String,
    pub socket_path: String,
    pub db_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_use_snake_case_tags() {
        let json = serde_json::to_string(&Request::Navigate {
            location: "/search?searchTerm=hive".to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"navigate""#));

        let parsed: Request =
            serde_json::from_str(r#"{"type":"tab","resource":"user"}"#).unwrap();
        assert!(matches!(
            parsed,
            Request::Tab {
                resource: ResourceType::User
            }
        ));
    }

    #[test]
    fn state_response_round_trips() {
        let response = Response::state(None, SelectableTab::User, StoreSnapshot::default());
        let json = serde_json::to_string(&response).unwrap();
        let parsed: Response = serde_json::from_str(&json).unwrap();
        match parsed {
            Response::State {
                selected_tab,
                search_term,
                ..
            } => {
                assert_eq!(selected_tab, SelectableTab::User);
                assert_eq!(search_term, "");
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }
}
