//! Graceful shutdown handling
//!
//! A cloneable [`ShutdownSignal`] is handed to the HTTP server and any
//! background task; OS signals (SIGTERM, SIGINT) trigger it once.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{error, info, warn};

/// Shutdown signal that can be cloned and shared across tasks
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: broadcast::Sender<()>,
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub fn trigger(&self) {
        if !self.triggered.swap(true, Ordering::SeqCst) {
            info!("🛑 Shutdown signal triggered");
            let _ = self.sender.send(());
        }
    }

    /// Resolves once [`trigger`](Self::trigger) has been called, including
    /// when it was called before this future was created.
    pub async fn wait(&self) {
        let mut rx = self.sender.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Listen for OS shutdown signals (SIGTERM, SIGINT)
pub async fn listen_for_shutdown_signals(shutdown: ShutdownSignal) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Failed to install signal handlers");
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("📡 Received SIGTERM signal"),
            _ = sigint.recv() => info!("📡 Received SIGINT signal (Ctrl+C)"),
        }

        shutdown.trigger();
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            return;
        }
        info!("📡 Received Ctrl+C signal");
        shutdown.trigger();
    }
}

/// Graceful shutdown coordinator
pub struct ShutdownCoordinator {
    signal: ShutdownSignal,
    timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            signal: ShutdownSignal::new(),
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    pub fn signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn start_signal_listener(&self) {
        let signal = self.signal.clone();
        tokio::spawn(async move {
            listen_for_shutdown_signals(signal).await;
        });
    }

    /// Wait for `task` to finish, giving up after the configured timeout.
    pub async fn drain<F>(&self, task: F) -> bool
    where
        F: std::future::Future<Output = ()>,
    {
        match tokio::time::timeout(self.timeout, task).await {
            Ok(()) => true,
            Err(_) => {
                warn!(
                    timeout_secs = self.timeout.as_secs(),
                    "⚠️ Graceful shutdown timed out"
                );
                false
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(30)
    }
}
