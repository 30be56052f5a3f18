//! Tabula Search - catalog search service
//!
//! A daemon + CLI serving tabbed, paginated search over the catalog's
//! tables, users, and dashboards. The daemon keeps `/search` URLs, the
//! selected tab, and the results store in sync, and fans aggregate
//! searches out across all three resource types concurrently.

mod catalog;
mod config;
mod ipc;
mod search;
mod session;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tabula_search_core::{PageView, ResourceType, ResultSet, SelectableTab};

use crate::catalog::CatalogDb;
use crate::config::Config;
use crate::ipc::{IpcClient, IpcServer, StateResponse};
use crate::search::{SearchBackend, SearchCoordinator, SearchStore, SqliteSearchBackend};
use crate::session::{NavigationKind, SearchSession};

/// Tabula Search - catalog search service
#[derive(Parser)]
#[command(name = "tabula-search")]
#[command(version = "0.1.0")]
#[command(about = "Catalog search over tables, users, and dashboards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the search service daemon
    Daemon,

    /// Search the catalog for a term
    Search {
        /// Search term
        term: String,
    },

    /// Drive the session with a raw `/search` URL or query string
    Goto {
        /// Location, e.g. "/search?searchTerm=hive&selectedTab=table&pageIndex=0"
        location: String,
    },

    /// Jump to a page of the currently selected tab
    Page {
        /// Zero-based page index
        index: usize,
    },

    /// Switch the selected tab (table or user; dashboard is not selectable)
    Tab {
        /// Resource type to select
        resource: ResourceType,
    },

    /// Show the current search results
    Show,

    /// Show index status
    Status,

    /// Import a catalog snapshot (JSON) into the index
    Import {
        /// Path to the snapshot file
        path: String,

        /// Clear existing entities before importing
        #[arg(long)]
        replace: bool,
    },

    /// Show current configuration
    Config,

    /// Reload the daemon's configuration from disk
    ReloadConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Daemon => {
            let config = Config::load()?;
            init_logging(&config.service.log_level);
            info!("Starting tabula-search daemon...");
            run_daemon(config).await?;
        }
        command => {
            init_logging("warn");
            run_client_command(command).await?;
        }
    }

    Ok(())
}

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();
}

/// Run the main daemon process
async fn run_daemon(config: Config) -> Result<()> {
    info!(
        "Configuration loaded: timeout={}ms, db={:?}",
        config.search.request_timeout_ms, config.db_path
    );

    let db = CatalogDb::open(&config.db_path)?;
    db.init_schema()?;
    info!("Catalog database initialized");

    let backend = Arc::new(SqliteSearchBackend::new(db.clone()));
    let backend_name = backend.name();
    info!("Search backend: {}", backend_name);

    let store = Arc::new(SearchStore::new());
    let coordinator = Arc::new(SearchCoordinator::new(
        backend,
        store.clone(),
        config.request_timeout(),
    ));
    let session = SearchSession::new(coordinator, store.clone());

    // The IPC server blocks until shutdown
    let server = IpcServer::new(db, config, store, session, backend_name);
    server.run().await
}

/// Dispatch a CLI subcommand through the IPC client
async fn run_client_command(command: Commands) -> Result<()> {
    let client = IpcClient::connect();

    match command {
        Commands::Daemon => unreachable!("handled in main"),
        Commands::Search { term } => print_state(&client.search(&term).await?),
        Commands::Goto { location } => print_state(&client.navigate(&location).await?),
        Commands::Page { index } => print_state(&client.page(index).await?),
        Commands::Tab { resource } => print_state(&client.tab(resource).await?),
        Commands::Show => print_state(&client.show().await?),
        Commands::Status => show_status(&client).await?,
        Commands::Import { path, replace } => import_snapshot(&client, &path, replace).await?,
        Commands::Config => show_config(&client).await?,
        Commands::ReloadConfig => println!("{}", client.reload_config().await?),
    }

    Ok(())
}

/// Render a state response the way the search page lays it out: tab
/// headers with totals, and the selected tab's content resolved through
/// the page view.
fn print_state(state: &StateResponse) {
    if let Some(nav) = &state.location {
        let kind = match nav.kind {
            NavigationKind::Push => "push",
            NavigationKind::Replace => "replace",
        };
        println!("Location ({}): {}", kind, nav.url);
    }

    println!("Search term: \"{}\"", state.search_term);
    println!("Selected tab: {}", state.selected_tab);
    if state.is_loading {
        println!("(loading)");
    }
    println!();

    println!("Tables ({})", state.tables.total_results);
    if state.selected_tab == SelectableTab::Table {
        print_tab(&state.search_term, &state.tables, "table", |table| {
            match &table.description {
                Some(description) => format!(
                    "{}.{} [{}] - {}",
                    table.schema, table.name, table.database, description
                ),
                None => format!("{}.{} [{}]", table.schema, table.name, table.database),
            }
        });
    }

    println!("Users ({})", state.users.total_results);
    if state.selected_tab == SelectableTab::User {
        print_tab(&state.search_term, &state.users, "user", |user| {
            format!("{} <{}>", user.display_name, user.email)
        });
    }

    // Dashboards are searched but have no selectable tab; count only.
    println!("Dashboards ({})", state.dashboards.total_results);
}

fn print_tab<T>(term: &str, set: &ResultSet<T>, label: &str, render: impl Fn(&T) -> String) {
    match PageView::resolve(term, set.page_index, set.total_results) {
        PageView::Empty => {}
        PageView::NoResults => {
            println!(
                "  Your search - \"{}\" - did not match any {} results",
                term, label
            );
        }
        PageView::OutOfRange => {
            println!("  Page index out of bounds for available results");
        }
        PageView::Page {
            start_index,
            end_index,
            total_results,
        } => {
            println!("  {}-{} of {} results", start_index, end_index, total_results);
            for item in &set.results {
                println!("    {}", render(item));
            }
        }
    }
}

/// Show index status via IPC client
async fn show_status(client: &IpcClient) -> Result<()> {
    let status = client.status().await?;

    println!("Tabula Search Status");
    println!("====================");
    println!("Backend:          {}", status.backend);
    println!("Tables:           {}", status.tables);
    println!("Users:            {}", status.users);
    println!("Dashboards:       {}", status.dashboards);
    println!("Database size:    {} KB", status.database_size_bytes / 1_000);

    Ok(())
}

/// Import a catalog snapshot via IPC client
async fn import_snapshot(client: &IpcClient, path: &str, replace: bool) -> Result<()> {
    // The daemon resolves the path, so send it absolute
    let absolute = std::fs::canonicalize(path)
        .with_context(|| format!("Snapshot file not found: {}", path))?;
    let message = client.import(&absolute.to_string_lossy(), replace).await?;
    println!("{}", message);

    Ok(())
}

/// Show current configuration via IPC client
async fn show_config(client: &IpcClient) -> Result<()> {
    let config = client.get_config().await?;

    println!("Tabula Search Configuration");
    println!("===========================");
    println!("Request timeout:  {} ms", config.request_timeout_ms);
    println!("Log level:        {}", config.log_level);
    println!("Socket path:      {}", config.socket_path);
    println!("Database path:    {}", config.db_path);

    Ok(())
}
