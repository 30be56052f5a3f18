//! Catalog database handle and schema

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::info;

/// Catalog database wrapper shared across the daemon
#[derive(Clone)]
pub struct CatalogDb {
    conn: Arc<Mutex<Connection>>,
    db_path: Option<String>,
}

impl CatalogDb {
    /// Open (or create) the catalog database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory: {:?}", parent))?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {:?}", path))?;

        // WAL keeps searches readable while an import is running
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: Some(path.to_string_lossy().to_string()),
        })
    }

    /// In-memory database for tests
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            db_path: None,
        })
    }

    /// Initialize the database schema
    pub fn init_schema(&self) -> Result<()> {
        self.connection().execute_batch(SCHEMA_SQL)?;
        info!("Catalog schema initialized");
        Ok(())
    }

    /// Get a connection handle
    pub fn connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    /// Get database file size in bytes
    pub fn size_bytes(&self) -> Result<u64> {
        match &self.db_path {
            Some(path) => Ok(std::fs::metadata(path)?.len()),
            None => Ok(0),
        }
    }
}

/// SQL schema for the catalog.
/// One table per resource type; LIKE queries over the name and description
/// columns are fast enough at catalog scale, so no FTS virtual tables.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS tables (
    id INTEGER PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    schema_name TEXT NOT NULL,
    database_name TEXT NOT NULL,
    description TEXT,
    last_updated TEXT
);

CREATE INDEX IF NOT EXISTS idx_tables_name ON tables(name);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    display_name TEXT NOT NULL,
    email TEXT NOT NULL,
    team TEXT
);

CREATE INDEX IF NOT EXISTS idx_users_display_name ON users(display_name);

CREATE TABLE IF NOT EXISTS dashboards (
    id INTEGER PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    name TEXT NOT NULL,
    dash_group TEXT NOT NULL,
    description TEXT,
    url TEXT
);

CREATE INDEX IF NOT EXISTS idx_dashboards_name ON dashboards(name);
"#;
