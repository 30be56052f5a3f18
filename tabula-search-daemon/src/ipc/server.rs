//! IPC server implementation

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tracing::{debug, info, warn};

use tabula_search_core::{CatalogSnapshot, page_url};

use super::protocol::{Request, Response};
use crate::catalog::CatalogDb;
use crate::config::Config;
use crate::search::SearchStore;
use crate::session::{NavigationUpdate, SearchSession};

/// IPC server for handling client requests
pub struct IpcServer {
    db: CatalogDb,
    config: Mutex<Config>,
    store: Arc<SearchStore>,
    session: tokio::sync::Mutex<SearchSession>,
    backend_name: &'static str,
}

impl IpcServer {
    /// Create a new IPC server
    pub fn new(
        db: CatalogDb,
        config: Config,
        store: Arc<SearchStore>,
        session: SearchSession,
        backend_name: &'static str,
    ) -> Self {
        Self {
            db,
            config: Mutex::new(config),
            store,
            session: tokio::sync::Mutex::new(session),
            backend_name,
        }
    }

    /// Run the IPC server (blocks until the process exits)
    pub async fn run(&self) -> Result<()> {
        let socket_path = self.config.lock().unwrap().socket_path();

        // Remove a stale socket from a previous run
        if socket_path.exists() {
            std::fs::remove_file(&socket_path)?;
        }

        let listener = UnixListener::bind(&socket_path)
            .with_context(|| format!("Failed to bind IPC socket: {:?}", socket_path))?;
        info!("IPC server listening on {:?}", socket_path);

        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&socket_path, std::fs::Permissions::from_mode(0o660))?;
        }

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let mut reader = BufReader::new(stream);
                    let mut line = String::new();

                    match reader.read_line(&mut line).await {
                        Ok(0) => continue, // Connection closed
                        Ok(_) => {
                            debug!("Received request: {}", line.trim());

                            let response = match serde_json::from_str::<Request>(&line) {
                                Ok(request) => self.handle_request(request).await,
                                Err(e) => Response::error(format!("Invalid request: {}", e)),
                            };

                            let response_json = serde_json::to_string(&response)?;
                            let mut writer = reader.into_inner();
                            writer.write_all(response_json.as_bytes()).await?;
                            writer.write_all(b"\n").await?;
                            writer.flush().await?;
                        }
                        Err(e) => {
                            warn!("Error reading from socket: {}", e);
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Handle a single request
    async fn handle_request(&self, request: Request) -> Response {
        match request {
            Request::Navigate { location } => {
                let mut session = self.session.lock().await;
                match session.on_location_change(&location).await {
                    Ok(update) => self.state_response(&session, update),
                    Err(e) => Response::error(format!("Search failed: {}", e)),
                }
            }

            Request::Search { term } => {
                let mut session = self.session.lock().await;
                let location = page_url(&term, session.selected_tab(), 0);
                match session.on_location_change(&location).await {
                    Ok(update) => self.state_response(&session, update),
                    Err(e) => Response::error(format!("Search failed: {}", e)),
                }
            }

            Request::Page { index } => {
                let mut session = self.session.lock().await;
                match session.on_page_change(index).await {
                    Ok(update) => self.state_response(&session, Some(update)),
                    Err(e) => Response::error(format!("Search failed: {}", e)),
                }
            }

            Request::Tab { resource } => {
                let mut session = self.session.lock().await;
                let update = session.on_tab_change(resource);
                self.state_response(&session, Some(update))
            }

            Request::Show => {
                let session = self.session.lock().await;
                self.state_response(&session, None)
            }

            Request::Status => match self.db.stats() {
                Ok(stats) => Response::status(&stats, self.backend_name),
                Err(e) => Response::error(format!("Failed to get stats: {}", e)),
            },

            Request::Import { path, replace } => match self.import_snapshot_file(&path, replace) {
                Ok((tables, users, dashboards)) => Response::ok(format!(
                    "Imported {} tables, {} users, {} dashboards",
                    tables, users, dashboards
                )),
                Err(e) => Response::error(format!("Import failed: {}", e)),
            },

            Request::GetConfig => {
                let config = self.config.lock().unwrap();
                Response::config(&config)
            }

            Request::ReloadConfig => match Config::load() {
                Ok(new_config) => {
                    *self.config.lock().unwrap() = new_config;
                    Response::ok("Configuration reloaded")
                }
                Err(e) => Response::error(format!("Failed to reload config: {}", e)),
            },
        }
    }

    fn state_response(
        &self,
        session: &SearchSession,
        location: Option<NavigationUpdate>,
    ) -> Response {
        Response::state(location, session.selected_tab(), self.store.snapshot())
    }

    fn import_snapshot_file(&self, path: &str, replace: bool) -> Result<(usize, usize, usize)> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path))?;
        let snapshot: CatalogSnapshot =
            serde_json::from_str(&contents).context("Invalid catalog snapshot")?;

        if replace {
            self.db.clear_all()?;
        }
        self.db.import_snapshot(&snapshot)?;
        info!(
            "Imported catalog snapshot: {} tables, {} users, {} dashboards",
            snapshot.tables.len(),
            snapshot.users.len(),
            snapshot.dashboards.len()
        );

        Ok((
            snapshot.tables.len(),
            snapshot.users.len(),
            snapshot.dashboards.len(),
        ))
    }
}
