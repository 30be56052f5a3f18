//! Catalog resource types
//!
//! A catalog entity is one of three resource types. Tables and users have
//! their own tabs on the search page; dashboards are indexed and searched
//! but never independently selectable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category of searchable catalog entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Table,
    User,
    Dashboard,
}

impl ResourceType {
    /// Every resource type, in fan-out order
    pub const ALL: [ResourceType; 3] = [
        ResourceType::Table,
        ResourceType::User,
        ResourceType::Dashboard,
    ];

    /// The token used in URLs and the IPC protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Table => "table",
            ResourceType::User => "user",
            ResourceType::Dashboard => "dashboard",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(ResourceType::Table),
            "user" => Ok(ResourceType::User),
            "dashboard" => Ok(ResourceType::Dashboard),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

/// A tab the search page can actually land on.
///
/// This is deliberately a two-variant enum rather than a default branch:
/// requesting the dashboard tab is a no-op that retains the current
/// selection, and the type makes that restriction impossible to bypass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectableTab {
    #[default]
    Table,
    User,
}

impl SelectableTab {
    /// Coerce a requested resource type into a selectable tab, retaining
    /// `current` when the request is absent or not selectable.
    pub fn coerce(requested: Option<ResourceType>, current: SelectableTab) -> SelectableTab {
        match requested {
            Some(ResourceType::Table) => SelectableTab::Table,
            Some(ResourceType::User) => SelectableTab::User,
            Some(ResourceType::Dashboard) | None => current,
        }
    }

    pub fn as_resource(self) -> ResourceType {
        match self {
            SelectableTab::Table => ResourceType::Table,
            SelectableTab::User => ResourceType::User,
        }
    }
}

impl std::fmt::Display for SelectableTab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_resource().as_str())
    }
}

/// Indexed table record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableResource {
    pub key: String,
    pub name: String,
    pub schema: String,
    pub database: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Indexed user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResource {
    pub key: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub team: Option<String>,
}

/// Indexed dashboard record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResource {
    pub key: String,
    pub name: String,
    pub group: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Catalog entities imported into the index in one batch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub tables: Vec<TableResource>,
    #[serde(default)]
    pub users: Vec<UserResource>,
    #[serde(default)]
    pub dashboards: Vec<DashboardResource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_keeps_selectable_tabs() {
        let tab = SelectableTab::coerce(Some(ResourceType::User), SelectableTab::Table);
        assert_eq!(tab, SelectableTab::User);

        let tab = SelectableTab::coerce(Some(ResourceType::Table), SelectableTab::User);
        assert_eq!(tab, SelectableTab::Table);
    }

    #[test]
    fn coerce_retains_current_for_dashboard_or_missing() {
        let tab = SelectableTab::coerce(Some(ResourceType::Dashboard), SelectableTab::User);
        assert_eq!(tab, SelectableTab::User);

        let tab = SelectableTab::coerce(None, SelectableTab::Table);
        assert_eq!(tab, SelectableTab::Table);
    }

    #[test]
    fn resource_type_tokens_round_trip() {
        for resource in ResourceType::ALL {
            assert_eq!(resource.as_str().parse::<ResourceType>(), Ok(resource));
        }
        assert!("chart".parse::<ResourceType>().is_err());
    }

    #[test]
    fn snapshot_accepts_partial_payloads() {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(r#"{"users": [{"key": "u1", "display_name": "Jo", "email": "jo@example.com"}]}"#)
                .unwrap();
        assert!(snapshot.tables.is_empty());
        assert_eq!(snapshot.users.len(), 1);
        assert_eq!(snapshot.users[0].team, None);
    }
}
