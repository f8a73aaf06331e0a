//! axum implementation of the embedded server contract.

use crate::{ServerInfo, build_router};

use hs_supervisor::{
    EmbeddedServer, EmbeddedServerError, EmbeddedServerFactory, EmbeddedServerResult,
};

use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Creates [`AxumEmbeddedServer`]s listening on a fixed interface.
#[derive(Debug, Clone, Copy)]
pub struct AxumServerFactory {
    host: IpAddr,
}

impl AxumServerFactory {
    pub fn new(host: IpAddr) -> Self {
        Self { host }
    }
}

#[async_trait]
impl EmbeddedServerFactory for AxumServerFactory {
    async fn create(&self, port: u16) -> EmbeddedServerResult<Box<dyn EmbeddedServer>> {
        debug!("Creating embedded server for {}:{port}", self.host);
        Ok(Box::new(AxumEmbeddedServer::new(SocketAddr::new(
            self.host, port,
        ))))
    }
}

/// One axum listener plus the task serving it.
///
/// Nothing is bound until [`EmbeddedServer::start`]. Dropping the instance
/// aborts the serving task, which closes the listener.
pub struct AxumEmbeddedServer {
    addr: SocketAddr,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<io::Result<()>>>,
}

impl AxumEmbeddedServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            local_addr: None,
            shutdown_tx: None,
            task: None,
        }
    }

    /// Actual bound address, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn is_serving(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

#[async_trait]
impl EmbeddedServer for AxumEmbeddedServer {
    fn port(&self) -> u16 {
        self.local_addr.unwrap_or(self.addr).port()
    }

    async fn start(&mut self, non_blocking: bool) -> EmbeddedServerResult<()> {
        if self.task.is_some() {
            return Err(EmbeddedServerError::start(format!(
                "already serving on {}",
                self.local_addr.unwrap_or(self.addr)
            )));
        }

        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|e| EmbeddedServerError::bind(self.addr, e))?;

        // Port 0 resolves to the OS-assigned one here
        let local_addr = listener
            .local_addr()
            .map_err(|e| EmbeddedServerError::bind(self.addr, e))?;
        self.local_addr = Some(local_addr);
        info!("Embedded server listening on {local_addr}");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = build_router(ServerInfo::new(local_addr.port()));

        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    // A dropped sender also means stop
                    let _ = shutdown_rx.await;
                    debug!("Embedded server draining connections");
                })
                .await
        });
        self.shutdown_tx = Some(shutdown_tx);

        if non_blocking {
            self.task = Some(task);
            return Ok(());
        }

        match task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(EmbeddedServerError::start(e.to_string())),
            Err(e) => Err(EmbeddedServerError::start(format!(
                "serving task failed: {e}"
            ))),
        }
    }

    async fn stop(&mut self, grace_period: Duration, force_timeout: Duration) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        let Some(mut task) = self.task.take() else {
            debug!("Stop on an embedded server that never started");
            return;
        };

        // Both durations are measured from the stop request
        let outcome = match timeout(grace_period, &mut task).await {
            Ok(outcome) => Some(outcome),
            Err(_) => {
                debug!("Grace period of {grace_period:?} elapsed with connections open");
                let remaining = force_timeout.saturating_sub(grace_period);
                timeout(remaining, &mut task).await.ok()
            }
        };

        match outcome {
            Some(Ok(Ok(()))) => info!("Embedded server on port {} stopped", self.port()),
            Some(Ok(Err(e))) => error!("Embedded server ended with error: {e}"),
            Some(Err(e)) => error!("Embedded server task failed: {e}"),
            None => {
                warn!(
                    "Embedded server on port {} did not stop within {force_timeout:?}; aborting",
                    self.port()
                );
                task.abort();
            }
        }
    }
}

impl Drop for AxumEmbeddedServer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
