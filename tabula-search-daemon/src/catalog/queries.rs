//! Catalog query operations
//!
//! Search uses LIKE patterns over the name and description columns, with a
//! COUNT(*) total so paging stays consistent with RESULTS_PER_PAGE.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::params;

use tabula_search_core::{
    CatalogSnapshot, DashboardResource, RESULTS_PER_PAGE, ResultSet, TableResource, UserResource,
};

use super::CatalogDb;

/// Per-type entity counts and database size
#[derive(Debug, Clone)]
pub struct CatalogStats {
    pub tables: u64,
    pub users: u64,
    pub dashboards: u64,
    pub database_size_bytes: u64,
}

impl CatalogDb {
    /// Upsert a snapshot of catalog entities in one transaction
    pub fn import_snapshot(&self, snapshot: &CatalogSnapshot) -> Result<()> {
        let mut conn = self.connection();
        let tx = conn.transaction()?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO tables (key, name, schema_name, database_name, description, last_updated)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT(key) DO UPDATE SET
                    name = excluded.name,
                    schema_name = excluded.schema_name,
                    database_name = excluded.database_name,
                    description = excluded.description,
                    last_updated = excluded.last_updated
                "#,
            )?;
            for table in &snapshot.tables {
                stmt.execute(params![
                    table.key,
                    table.name,
                    table.schema,
                    table.database,
                    table.description,
                    table.last_updated.map(|t| t.to_rfc3339()),
                ])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO users (key, display_name, email, team)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(key) DO UPDATE SET
                    display_name = excluded.display_name,
                    email = excluded.email,
                    team = excluded.team
                "#,
            )?;
            for user in &snapshot.users {
                stmt.execute(params![user.key, user.display_name, user.email, user.team])?;
            }
        }

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO dashboards (key, name, dash_group, description, url)
                VALUES (?1, ?2, ?3, ?4, ?5)
                ON CONFLICT(key) DO UPDATE SET
                    name = excluded.name,
                    dash_group = excluded.dash_group,
                    description = excluded.description,
                    url = excluded.url
                "#,
            )?;
            for dashboard in &snapshot.dashboards {
                stmt.execute(params![
                    dashboard.key,
                    dashboard.name,
                    dashboard.group,
                    dashboard.description,
                    dashboard.url,
                ])?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Paged table search
    pub fn search_tables(&self, term: &str, page_index: usize) -> Result<ResultSet<TableResource>> {
        if term.is_empty() {
            return Ok(empty_page(page_index));
        }

        let conn = self.connection();
        let like = like_pattern(term);

        let total_results = count_matches(
            &conn,
            "SELECT COUNT(*) FROM tables WHERE name LIKE ?1 OR description LIKE ?1",
            &like,
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT key, name, schema_name, database_name, description, last_updated
            FROM tables
            WHERE name LIKE ?1 OR description LIKE ?1
            ORDER BY name, key
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let results = stmt
            .query_map(
                params![like, RESULTS_PER_PAGE as i64, (page_index * RESULTS_PER_PAGE) as i64],
                row_to_table,
            )?
            .filter_map(|r| r.ok())
            .collect();

        Ok(ResultSet {
            results,
            page_index,
            total_results,
        })
    }

    /// Paged user search
    pub fn search_users(&self, term: &str, page_index: usize) -> Result<ResultSet<UserResource>> {
        if term.is_empty() {
            return Ok(empty_page(page_index));
        }

        let conn = self.connection();
        let like = like_pattern(term);

        let total_results = count_matches(
            &conn,
            "SELECT COUNT(*) FROM users WHERE display_name LIKE ?1 OR email LIKE ?1",
            &like,
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT key, display_name, email, team
            FROM users
            WHERE display_name LIKE ?1 OR email LIKE ?1
            ORDER BY display_name, key
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let results = stmt
            .query_map(
                params![like, RESULTS_PER_PAGE as i64, (page_index * RESULTS_PER_PAGE) as i64],
                row_to_user,
            )?
            .filter_map(|r| r.ok())
            .collect();

        Ok(ResultSet {
            results,
            page_index,
            total_results,
        })
    }

    /// Paged dashboard search
    pub fn search_dashboards(
        &self,
        term: &str,
        page_index: usize,
    ) -> Result<ResultSet<DashboardResource>> {
        if term.is_empty() {
            return Ok(empty_page(page_index));
        }

        let conn = self.connection();
        let like = like_pattern(term);

        let total_results = count_matches(
            &conn,
            "SELECT COUNT(*) FROM dashboards WHERE name LIKE ?1 OR description LIKE ?1",
            &like,
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT key, name, dash_group, description, url
            FROM dashboards
            WHERE name LIKE ?1 OR description LIKE ?1
            ORDER BY name, key
            LIMIT ?2 OFFSET ?3
            "#,
        )?;
        let results = stmt
            .query_map(
                params![like, RESULTS_PER_PAGE as i64, (page_index * RESULTS_PER_PAGE) as i64],
                row_to_dashboard,
            )?
            .filter_map(|r| r.ok())
            .collect();

        Ok(ResultSet {
            results,
            page_index,
            total_results,
        })
    }

    /// Per-type entity counts
    pub fn stats(&self) -> Result<CatalogStats> {
        let conn = self.connection();

        let tables: u64 = conn.query_row("SELECT COUNT(*) FROM tables", [], |row| row.get(0))?;
        let users: u64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let dashboards: u64 =
            conn.query_row("SELECT COUNT(*) FROM dashboards", [], |row| row.get(0))?;

        drop(conn);

        Ok(CatalogStats {
            tables,
            users,
            dashboards,
            database_size_bytes: self.size_bytes().unwrap_or(0),
        })
    }

    /// Clear all catalog entities
    pub fn clear_all(&self) -> Result<()> {
        let conn = self.connection();
        conn.execute_batch("DELETE FROM tables; DELETE FROM users; DELETE FROM dashboards;")?;
        Ok(())
    }
}

fn like_pattern(term: &str) -> String {
    format!("%{}%", term)
}

fn empty_page<T>(page_index: usize) -> ResultSet<T> {
    ResultSet {
        results: Vec::new(),
        page_index,
        total_results: 0,
    }
}

fn count_matches(conn: &rusqlite::Connection, sql: &str, like: &str) -> Result<usize> {
    let total: i64 = conn.query_row(sql, params![like], |row| row.get(0))?;
    Ok(total as usize)
}

fn row_to_table(row: &rusqlite::Row) -> rusqlite::Result<TableResource> {
    let last_updated: Option<String> = row.get(5)?;
    Ok(TableResource {
        key: row.get(0)?,
        name: row.get(1)?,
        schema: row.get(2)?,
        database: row.get(3)?,
        description: row.get(4)?,
        last_updated: last_updated
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|dt| dt.with_timezone(&Utc)),
    })
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<UserResource> {
    Ok(UserResource {
        key: row.get(0)?,
        display_name: row.get(1)?,
        email: row.get(2)?,
        team: row.get(3)?,
    })
}

fn row_to_dashboard(row: &rusqlite::Row) -> rusqlite::Result<DashboardResource> {
    Ok(DashboardResource {
        key: row.get(0)?,
        name: row.get(1)?,
        group: row.get(2)?,
        description: row.get(3)?,
        url: row.get(4)?,
    })
}
