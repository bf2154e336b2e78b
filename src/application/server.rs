use crate::error::{NestrsError, Result};
use std::net::SocketAddr;
use tokio::signal;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle to a running HTTP server
///
/// Dropping the handle leaves the server running until the runtime stops;
/// call [`Server::shutdown`] to stop it gracefully.
pub struct Server {
    local_addr: SocketAddr,
    shutdown_tx: oneshot::Sender<()>,
    task: JoinHandle<std::io::Result<()>>,
}

impl Server {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown_tx: oneshot::Sender<()>,
        task: JoinHandle<std::io::Result<()>>,
    ) -> Self {
        Self {
            local_addr,
            shutdown_tx,
            task,
        }
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown...");
        // The task may already have exited; its result is reported below.
        let _ = self.shutdown_tx.send(());

        self.task
            .await
            .map_err(|err| NestrsError::Internal(format!("server task failed: {err}")))??;

        tracing::info!("Server stopped");
        Ok(())
    }
}

/// Completes when Ctrl+C or SIGTERM is received
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
