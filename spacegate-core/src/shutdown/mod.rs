//! Graceful shutdown coordinator

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info, warn};

/// Shutdown signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Graceful,
    Immediate,
}

/// Shutdown state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    ShuttingDown,
    Shutdown,
}

/// Graceful shutdown coordinator
///
/// The server waits on [`ShutdownCoordinator::wait_for_shutdown`] to stop
/// accepting connections, then gets [`ShutdownCoordinator::drain_timeout`]
/// to finish in-flight requests.
pub struct ShutdownCoordinator {
    state: Arc<RwLock<ShutdownState>>,
    shutdown_tx: broadcast::Sender<ShutdownSignal>,
    timeout: Duration,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new(timeout: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(16);

        Self {
            state: Arc::new(RwLock::new(ShutdownState::Running)),
            shutdown_tx,
            timeout,
        }
    }

    /// How long in-flight work may run after shutdown starts
    pub fn drain_timeout(&self) -> Duration {
        self.timeout
    }

    /// Subscribe to shutdown notifications
    pub fn subscribe(&self) -> broadcast::Receiver<ShutdownSignal> {
        self.shutdown_tx.subscribe()
    }

    /// Initiate graceful shutdown
    pub async fn shutdown(&self) {
        let mut state = self.state.write().await;
        if *state != ShutdownState::Running {
            warn!("Shutdown already in progress");
            return;
        }

        info!("Initiating graceful shutdown");
        *state = ShutdownState::ShuttingDown;
        drop(state);

        // No receivers just means nobody is listening yet
        if self.shutdown_tx.send(ShutdownSignal::Graceful).is_err() {
            warn!("No subscribers for shutdown signal");
        }
    }

    /// Initiate immediate shutdown
    pub async fn shutdown_immediately(&self) {
        warn!("Initiating immediate shutdown");

        let mut state = self.state.write().await;
        *state = ShutdownState::Shutdown;
        drop(state);

        if self.shutdown_tx.send(ShutdownSignal::Immediate).is_err() {
            warn!("No subscribers for immediate shutdown signal");
        }
    }

    /// Mark the drain as finished
    pub async fn complete(&self) {
        *self.state.write().await = ShutdownState::Shutdown;
        info!("Shutdown complete");
    }

    /// Check if shutdown is in progress
    pub async fn is_shutting_down(&self) -> bool {
        self.state().await != ShutdownState::Running
    }

    /// Get current state
    pub async fn state(&self) -> ShutdownState {
        *self.state.read().await
    }

    /// Wait for shutdown signal; returns at once if shutdown already began
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.subscribe();
        if self.is_shutting_down().await {
            return;
        }
        if let Err(e) = rx.recv().await {
            error!("Shutdown channel error: {}", e);
        }
    }
}

/// Install signal handlers for graceful shutdown
#[cfg(unix)]
pub fn install_signal_handlers(coordinator: Arc<ShutdownCoordinator>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let (mut sigterm, mut sigint) =
            match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                (Ok(term), Ok(int)) => (term, int),
                (Err(e), _) | (_, Err(e)) => {
                    error!("Failed to install signal handlers: {}", e);
                    return;
                }
            };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
        coordinator.shutdown().await;
    });
}

/// Install signal handlers for graceful shutdown (Windows)
#[cfg(windows)]
pub fn install_signal_handlers(coordinator: Arc<ShutdownCoordinator>) {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            return;
        }
        info!("Received Ctrl+C");
        coordinator.shutdown().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_coordinator() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(100));

        assert_eq!(coordinator.state().await, ShutdownState::Running);

        coordinator.shutdown().await;
        assert_eq!(coordinator.state().await, ShutdownState::ShuttingDown);

        coordinator.complete().await;
        assert_eq!(coordinator.state().await, ShutdownState::Shutdown);
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_wakes_waiter() {
        let coordinator = Arc::new(ShutdownCoordinator::new(Duration::from_millis(100)));

        let waiter = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move { coordinator.wait_for_shutdown().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        coordinator.shutdown().await;

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_after_shutdown_returns_immediately() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(100));
        coordinator.shutdown().await;

        tokio::time::timeout(Duration::from_millis(100), coordinator.wait_for_shutdown())
            .await
            .expect("should not block");
    }

    #[tokio::test]
    async fn test_second_shutdown_is_ignored() {
        let coordinator = ShutdownCoordinator::new(Duration::from_millis(100));
        let mut rx = coordinator.subscribe();

        coordinator.shutdown().await;
        coordinator.shutdown().await;

        assert_eq!(rx.recv().await.unwrap(), ShutdownSignal::Graceful);
        assert!(rx.try_recv().is_err());
    }
}
