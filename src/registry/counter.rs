//! Module `counter`
//!
//! Counts connected data clients for the logs. Deltas are queued without
//! waiting and applied in arrival order by a single task; nobody reads the
//! total back.

use log::{info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle to the client counter task.
#[derive(Debug, Clone)]
pub struct ClientCounter {
    sender: mpsc::UnboundedSender<i64>,
}

impl ClientCounter {
    /// Starts the counter task. The join handle yields the final total once
    /// every handle (and every `ConnectedClient`) is gone.
    pub fn spawn() -> (Self, JoinHandle<i64>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_counter(receiver));
        (Self { sender }, handle)
    }

    pub fn adjust(&self, delta: i64) {
        if self.sender.send(delta).is_err() {
            warn!("Client counter stopped, dropping delta {}", delta);
        }
    }

    /// Counts one client in; it is counted out when the guard drops.
    pub fn connect(&self) -> ConnectedClient {
        self.adjust(1);
        ConnectedClient {
            counter: self.clone(),
        }
    }
}

/// A counted client connection.
#[derive(Debug)]
pub struct ConnectedClient {
    counter: ClientCounter,
}

impl Drop for ConnectedClient {
    fn drop(&mut self) {
        self.counter.adjust(-1);
    }
}

async fn run_counter(mut receiver: mpsc::UnboundedReceiver<i64>) -> i64 {
    let mut total = 0i64;
    while let Some(delta) = receiver.recv().await {
        total += delta;
        info!("Connected clients: {}", total);
    }
    total
}
