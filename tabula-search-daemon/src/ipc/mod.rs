//! IPC (Inter-Process Communication) module
//!
//! Handles communication between the daemon and clients over a Unix domain
//! socket, one JSON-line request/response per connection.

mod client;
mod protocol;
mod server;

pub use client::IpcClient;
pub use protocol::*;
pub use server::IpcServer;

use std::path::PathBuf;

/// Default IPC socket path (XDG runtime dir, falling back to /tmp)
pub fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        PathBuf::from(runtime_dir).join("tabula-search.sock")
    } else {
        PathBuf::from("/tmp/tabula-search.sock")
    }
}
