use log::{error, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::ShareServerError;
use crate::registry::{ClientCounter, HiddenRegistry};
use crate::server::listener::{run_control_listener, run_data_listener};
use crate::server::shutdown::ShutdownCoordinator;
use crate::server::state::ServerState;

/// The file-sharing server: both listeners and the shared state behind them.
pub struct Server {
    data_listener: TcpListener,
    control_listener: TcpListener,
    state: ServerState,
}

impl Server {
    /// Binds both ports and starts the registry and counter tasks.
    pub async fn bind(config: ServerConfig) -> Result<Self, ShareServerError> {
        let data_listener = bind_listener(&config.data_socket()).await?;
        let control_listener = bind_listener(&config.control_socket()).await?;

        let (hidden, _) = HiddenRegistry::spawn(config.registry_queue_depth);
        let (counter, _) = ClientCounter::spawn();
        let shutdown = ShutdownCoordinator::new(config.shutdown_grace());

        info!(
            "Server listening on {} (control {}), serving {}",
            data_listener.local_addr()?,
            control_listener.local_addr()?,
            config.server_root
        );

        Ok(Self {
            data_listener,
            control_listener,
            state: ServerState {
                config: Arc::new(config),
                hidden,
                counter,
                shutdown,
            },
        })
    }

    pub fn data_addr(&self) -> io::Result<SocketAddr> {
        self.data_listener.local_addr()
    }

    pub fn control_addr(&self) -> io::Result<SocketAddr> {
        self.control_listener.local_addr()
    }

    /// Handle on the shutdown state, e.g. to stop the server from outside.
    pub fn shutdown(&self) -> ShutdownCoordinator {
        self.state.shutdown.clone()
    }

    /// Runs both accept loops until shutdown.
    ///
    /// Data sessions still open when this returns were either abandoned by a
    /// timed-out drain or are about to notice the shutdown flag.
    pub async fn run(self) {
        let Self {
            data_listener,
            control_listener,
            state,
        } = self;

        let control = tokio::spawn(run_control_listener(control_listener, state.clone()));
        run_data_listener(data_listener, state).await;

        if let Err(e) = control.await {
            error!("Control listener task failed: {}", e);
        }
        info!("Server stopped");
    }
}

async fn bind_listener(addr: &str) -> Result<TcpListener, ShareServerError> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            Err(e.into())
        }
    }
}
