//! Server state shared by every session

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::registry::{ClientCounter, HiddenRegistry};
use crate::server::shutdown::ShutdownCoordinator;

/// Handles to the shared actors plus the configuration, cloned into each session.
#[derive(Debug, Clone)]
pub struct ServerState {
    pub config: Arc<ServerConfig>,
    pub hidden: HiddenRegistry,
    pub counter: ClientCounter,
    pub shutdown: ShutdownCoordinator,
}

impl ServerState {
    pub fn server_root(&self) -> PathBuf {
        self.config.server_root_path()
    }
}
