//! Accept loops
//!
//! One loop per port. Both stop as soon as shutdown is signalled, dropping
//! their listener so later connection attempts are refused.

use log::{debug, error, info};
use tokio::net::TcpListener;

use crate::server::state::ServerState;
use crate::session::{ControlSession, DataSession};

/// Accepts data clients, each served concurrently in its own task.
pub async fn run_data_listener(listener: TcpListener, state: ServerState) {
    loop {
        let accepted = tokio::select! {
            biased;
            _ = state.shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, addr)) => {
                // Counted before spawning so a drain cannot miss it
                let session = DataSession::new(stream, addr, state.clone());
                tokio::spawn(session.run());
            }
            Err(e) => {
                if state.shutdown.is_shutting_down() {
                    break;
                }
                error!("Error accepting connection: {}", e);
            }
        }
    }

    info!("Main listener shutting down");
    if let Ok(addr) = listener.local_addr() {
        debug!("Stopped listening on {}", addr);
    }
}

/// Accepts control clients one at a time; each runs to completion before the
/// next accept. Stops after a session that ended in shutdown.
pub async fn run_control_listener(listener: TcpListener, state: ServerState) {
    loop {
        let accepted = tokio::select! {
            biased;
            _ = state.shutdown.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((stream, addr)) => {
                ControlSession::new(stream, addr, state.clone()).run().await;
                if state.shutdown.is_shutting_down() {
                    break;
                }
            }
            Err(e) => {
                if state.shutdown.is_shutting_down() {
                    break;
                }
                error!("Control accept error: {}", e);
            }
        }
    }

    info!("Control listener shutting down");
    if let Ok(addr) = listener.local_addr() {
        debug!("Stopped listening on control port {}", addr);
    }
}
