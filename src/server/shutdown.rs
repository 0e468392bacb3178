//! Module `shutdown`
//!
//! Process-wide shutdown state: a one-shot cancellation flag observed by the
//! listeners and by data sessions at their idle-timeout tick, plus the count
//! of data sessions still running. Nothing is aborted from here; sessions
//! leave on their own once they notice the flag.

use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// How a drain ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainOutcome {
    Drained,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    active: Arc<watch::Sender<usize>>,
    grace: Duration,
}

impl ShutdownCoordinator {
    /// `grace` is the pause between signalling and waiting in `drain`.
    pub fn new(grace: Duration) -> Self {
        let (active, _) = watch::channel(0usize);
        Self {
            token: CancellationToken::new(),
            active: Arc::new(active),
            grace,
        }
    }

    /// Flips the state to "shutting down". Later calls do nothing.
    pub fn signal(&self) {
        if !self.token.is_cancelled() {
            info!("Shutdown signalled");
        }
        self.token.cancel();
    }

    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once shutdown has been signalled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }

    /// Registers a running data session until the ticket is dropped.
    pub fn track_session(&self) -> SessionTicket {
        self.active.send_modify(|active| *active += 1);
        SessionTicket {
            active: Arc::clone(&self.active),
        }
    }

    pub fn active_sessions(&self) -> usize {
        *self.active.borrow()
    }

    /// Signals shutdown, then waits for running data sessions to finish.
    ///
    /// Returns after the grace pause once the count reaches zero, or when
    /// `timeout` elapses, whichever comes first.
    pub async fn drain(&self, timeout: Duration) -> DrainOutcome {
        self.signal();
        tokio::time::sleep(self.grace).await;

        info!(
            "Waiting for {} client(s) to disconnect...",
            self.active_sessions()
        );

        let mut receiver = self.active.subscribe();
        let waited = tokio::time::timeout(timeout, async move {
            receiver.wait_for(|active| *active == 0).await.is_ok()
        })
        .await;

        match waited {
            Ok(_) => {
                info!("All clients disconnected");
                DrainOutcome::Drained
            }
            Err(_) => {
                warn!(
                    "Timeout waiting for clients to disconnect, {} still active",
                    self.active_sessions()
                );
                DrainOutcome::TimedOut
            }
        }
    }
}

/// Membership of one data session in the active count.
#[derive(Debug)]
pub struct SessionTicket {
    active: Arc<watch::Sender<usize>>,
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.active
            .send_modify(|active| *active = active.saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> ShutdownCoordinator {
        ShutdownCoordinator::new(Duration::from_millis(10))
    }

    #[test]
    fn test_signal_is_idempotent() {
        let shutdown = coordinator();
        assert!(!shutdown.is_shutting_down());
        shutdown.signal();
        shutdown.signal();
        assert!(shutdown.is_shutting_down());
    }

    #[test]
    fn test_signal_is_shared_between_clones() {
        let shutdown = coordinator();
        let other = shutdown.clone();
        other.signal();
        assert!(shutdown.is_shutting_down());
    }

    #[test]
    fn test_tickets_track_active_sessions() {
        let shutdown = coordinator();
        let first = shutdown.track_session();
        let second = shutdown.track_session();
        assert_eq!(shutdown.active_sessions(), 2);
        drop(first);
        assert_eq!(shutdown.active_sessions(), 1);
        drop(second);
        assert_eq!(shutdown.active_sessions(), 0);
    }

    #[tokio::test]
    async fn test_drain_without_sessions() {
        let shutdown = coordinator();
        let outcome = shutdown.drain(Duration::from_secs(1)).await;
        assert_eq!(outcome, DrainOutcome::Drained);
        assert!(shutdown.is_shutting_down());
    }

    #[tokio::test]
    async fn test_drain_waits_for_sessions() {
        let shutdown = coordinator();
        let ticket = shutdown.track_session();

        let watcher = shutdown.clone();
        let session = tokio::spawn(async move {
            watcher.cancelled().await;
            tokio::time::sleep(Duration::from_millis(50)).await;
            drop(ticket);
        });

        let outcome = shutdown.drain(Duration::from_secs(5)).await;
        assert_eq!(outcome, DrainOutcome::Drained);
        assert_eq!(shutdown.active_sessions(), 0);
        session.await.unwrap();
    }

    #[tokio::test]
    async fn test_drain_times_out() {
        let shutdown = coordinator();
        let _stuck = shutdown.track_session();

        let outcome = shutdown.drain(Duration::from_millis(50)).await;
        assert_eq!(outcome, DrainOutcome::TimedOut);
        assert_eq!(shutdown.active_sessions(), 1);
    }
}
