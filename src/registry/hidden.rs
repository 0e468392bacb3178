//! Module `hidden`
//!
//! The hidden registry: the set of filenames kept out of listings and
//! downloads. A single task owns the set and serves requests from a queue
//! in arrival order; sessions only ever hold a cloneable handle to it.

use log::{debug, info};
use std::collections::HashSet;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::ShareServerError;

/// Requests served by the registry task. Each carries its reply channel.
#[derive(Debug)]
enum HiddenRequest {
    Hide {
        filename: String,
        reply: oneshot::Sender<()>,
    },
    Reveal {
        filename: String,
        reply: oneshot::Sender<bool>,
    },
    IsHidden {
        filename: String,
        reply: oneshot::Sender<bool>,
    },
    Snapshot {
        reply: oneshot::Sender<HashSet<String>>,
    },
}

/// Handle to the hidden registry task.
///
/// The task stops once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct HiddenRegistry {
    sender: mpsc::Sender<HiddenRequest>,
}

impl HiddenRegistry {
    /// Starts the registry task with an empty set.
    pub fn spawn(queue_depth: usize) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(queue_depth.max(1));
        let handle = tokio::spawn(run_registry(receiver));
        (Self { sender }, handle)
    }

    /// Hides `filename`. Hiding an already hidden name is a no-op.
    pub async fn hide(&self, filename: &str) -> Result<(), ShareServerError> {
        let filename = filename.to_string();
        self.request(|reply| HiddenRequest::Hide { filename, reply })
            .await
    }

    /// Reveals `filename`, returning whether it was hidden.
    pub async fn reveal(&self, filename: &str) -> Result<bool, ShareServerError> {
        let filename = filename.to_string();
        self.request(|reply| HiddenRequest::Reveal { filename, reply })
            .await
    }

    pub async fn is_hidden(&self, filename: &str) -> Result<bool, ShareServerError> {
        let filename = filename.to_string();
        self.request(|reply| HiddenRequest::IsHidden { filename, reply })
            .await
    }

    /// Returns a copy of the hidden set as of the moment the request is served.
    pub async fn snapshot(&self) -> Result<HashSet<String>, ShareServerError> {
        self.request(|reply| HiddenRequest::Snapshot { reply }).await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HiddenRequest,
    ) -> Result<T, ShareServerError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(build(reply))
            .await
            .map_err(|_| ShareServerError::RegistryUnavailable)?;
        response
            .await
            .map_err(|_| ShareServerError::RegistryUnavailable)
    }
}

async fn run_registry(mut receiver: mpsc::Receiver<HiddenRequest>) {
    let mut hidden: HashSet<String> = HashSet::new();

    while let Some(request) = receiver.recv().await {
        match request {
            HiddenRequest::Hide { filename, reply } => {
                if hidden.insert(filename.clone()) {
                    info!("File hidden: {}", filename);
                } else {
                    debug!("File already hidden: {}", filename);
                }
                let _ = reply.send(());
            }
            HiddenRequest::Reveal { filename, reply } => {
                let was_hidden = hidden.remove(&filename);
                if was_hidden {
                    info!("File revealed: {}", filename);
                }
                let _ = reply.send(was_hidden);
            }
            HiddenRequest::IsHidden { filename, reply } => {
                let _ = reply.send(hidden.contains(&filename));
            }
            HiddenRequest::Snapshot { reply } => {
                let _ = reply.send(hidden.clone());
            }
        }
    }

    debug!("Hidden registry stopped ({} names hidden)", hidden.len());
}
