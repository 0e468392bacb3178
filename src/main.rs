//! File-sharing server - Entry Point
//!
//! Shares a directory over a line-based TCP protocol, with a second port for
//! the control client that hides files and shuts the server down.

use fileshare_server::utils::logging::setup_logging;
use fileshare_server::{Server, ServerConfig};
use log::{error, info};

#[tokio::main]
async fn main() {
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            // Logging is not configured yet
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    setup_logging(&config.log_level);
    info!("Launching file-sharing server...");

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    server.run().await;
}
