//! IPC client for communicating with the daemon

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use tabula_search_core::ResourceType;

use super::protocol::{ConfigResponse, Request, Response, StateResponse, StatusResponse};

/// IPC client for communicating with the tabula-search daemon
pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    /// Client against the default socket path
    pub fn connect() -> Self {
        Self {
            socket_path: super::default_socket_path(),
        }
    }

    /// Send a request and receive a response
    async fn send_request(&self, request: &Request) -> Result<Response> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .context("Failed to connect to tabula-search daemon. Is it running?")?;

        let request_json = serde_json::to_string(request)?;

        let (reader, mut writer) = stream.into_split();

        writer.write_all(request_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;

        let mut reader = BufReader::new(reader);
        let mut line = String::new();
        reader.read_line(&mut line).await?;

        let response: Response = serde_json::from_str(&line)?;
        Ok(response)
    }

    /// Drive the session with a navigation event
    pub async fn navigate(&self, location: &str) -> Result<StateResponse> {
        let request = Request::Navigate {
            location: location.to_string(),
        };
        expect_state(self.send_request(&request).await?)
    }

    /// Search a term from the first page of the currently selected tab
    pub async fn search(&self, term: &str) -> Result<StateResponse> {
        let request = Request::Search {
            term: term.to_string(),
        };
        expect_state(self.send_request(&request).await?)
    }

    /// Change the page index of the currently selected tab
    pub async fn page(&self, index: usize) -> Result<StateResponse> {
        let request = Request::Page { index };
        expect_state(self.send_request(&request).await?)
    }

    /// Switch the selected tab
    pub async fn tab(&self, resource: ResourceType) -> Result<StateResponse> {
        let request = Request::Tab { resource };
        expect_state(self.send_request(&request).await?)
    }

    /// Fetch the current session and store state
    pub async fn show(&self) -> Result<StateResponse> {
        expect_state(self.send_request(&Request::Show).await?)
    }

    /// Get index status
    pub async fn status(&self) -> Result<StatusResponse> {
        match self.send_request(&Request::Status).await? {
            Response::Status {
                backend,
                tables,
                users,
                dashboards,
                database_size_bytes,
            } => Ok(StatusResponse {
                backend,
                tables,
                users,
                dashboards,
                database_size_bytes,
            }),
            Response::Error { message } => bail!("Status failed: {}", message),
            _ => bail!("Unexpected response type"),
        }
    }

    /// Import a catalog snapshot file
    pub async fn import(&self, path: &str, replace: bool) -> Result<String> {
        let request = Request::Import {
            path: path.to_string(),
            replace,
        };
        match self.send_request(&request).await? {
            Response::Ok { message } => Ok(message),
            Response::Error { message } => bail!("Import failed: {}", message),
            _ => bail!("Unexpected response type"),
        }
    }

    /// Get configuration
    pub async fn get_config(&self) -> Result<ConfigResponse> {
        match self.send_request(&Request::GetConfig).await? {
            Response::Config {
                request_timeout_ms,
                log_level,
                socket_path,
                db_path,
            } => Ok(ConfigResponse {
                request_timeout_ms,
                log_level,
                socket_path,
                db_path,
            }),
            Response::Error { message } => bail!("Get config failed: {}", message),
            _ => bail!("Unexpected response type"),
        }
    }

    /// Reload configuration from disk
    pub async fn reload_config(&self) -> Result<String> {
        match self.send_request(&Request::ReloadConfig).await? {
            Response::Ok { message } => Ok(message),
            Response::Error { message } => bail!("Reload failed: {}", message),
            _ => bail!("Unexpected response type"),
        }
    }
}

fn expect_state(response: Response) -> Result<StateResponse> {
    match response {
        Response::State {
            location,
            search_term,
            selected_tab,
            is_loading,
            tables,
            users,
            dashboards,
        } => Ok(StateResponse {
            location,
            search_term,
            selected_tab,
            is_loading,
            tables,
            users,
            dashboards,
        }),
        Response::Error { message } => bail!("Search failed: {}", message),
        _ => bail!("Unexpected response type"),
    }
}
