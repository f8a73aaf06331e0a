//! Fire-and-forget command surface over the supervisor.

use crate::{LifecycleSupervisor, RunningState, StatusSubscription};

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A start/stop request as delivered by the UI or an external trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerAction {
    Start { port: u16 },
    Stop,
}

impl ServerAction {
    pub const START_SERVER: &'static str = "START_SERVER";
    pub const STOP_SERVER: &'static str = "STOP_SERVER";

    /// Decode an action name plus optional port extra.
    ///
    /// A missing or unparsable port falls back to `default_port`.
    /// Unknown actions yield `None`.
    pub fn parse(action: &str, port_extra: Option<&str>, default_port: u16) -> Option<Self> {
        match action.trim() {
            Self::START_SERVER => {
                let port = port_extra
                    .and_then(|p| p.trim().parse().ok())
                    .unwrap_or(default_port);
                Some(Self::Start { port })
            }
            Self::STOP_SERVER => Some(Self::Stop),
            _ => None,
        }
    }
}

enum ServiceCommand {
    Action {
        action: ServerAction,
        ack: oneshot::Sender<()>,
    },
    Shutdown {
        ack: oneshot::Sender<()>,
    },
}

/// Lets a caller optionally wait until its command has been processed.
///
/// Dropping the ticket does not cancel the command.
pub struct CommandTicket {
    ack_rx: oneshot::Receiver<()>,
}

impl CommandTicket {
    /// Wait for the command to run. `false` if the service had already shut down.
    pub async fn settled(self) -> bool {
        self.ack_rx.await.is_ok()
    }
}

/// Queues start/stop commands for a single consumer task.
///
/// Callers never get a success/failure result; outcomes are observed
/// through [`ServerService::subscribe`]. The supervisor outlives any UI
/// that issues commands, and [`ServerService::shutdown`] is the hook for
/// host-process teardown.
pub struct ServerService {
    supervisor: Arc<LifecycleSupervisor>,
    command_tx: mpsc::UnboundedSender<ServiceCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl ServerService {
    /// Spawn the command consumer on the current runtime.
    pub fn spawn(supervisor: Arc<LifecycleSupervisor>) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(Self::run(supervisor.clone(), command_rx));

        Self {
            supervisor,
            command_tx,
            worker: Mutex::new(Some(worker)),
        }
    }

    async fn run(
        supervisor: Arc<LifecycleSupervisor>,
        mut command_rx: mpsc::UnboundedReceiver<ServiceCommand>,
    ) {
        info!("Server service started");

        while let Some(command) = command_rx.recv().await {
            match command {
                ServiceCommand::Action { action, ack } => {
                    debug!("Processing {action:?}");
                    match action {
                        ServerAction::Start { port } => supervisor.start_server(port).await,
                        ServerAction::Stop => supervisor.stop_server().await,
                    }
                    let _ = ack.send(());
                }
                ServiceCommand::Shutdown { ack } => {
                    supervisor.shutdown().await;
                    let _ = ack.send(());
                    break;
                }
            }
        }

        info!("Server service stopped");
    }

    pub fn dispatch(&self, action: ServerAction) -> CommandTicket {
        let (ack, ack_rx) = oneshot::channel();

        if self
            .command_tx
            .send(ServiceCommand::Action { action, ack })
            .is_err()
        {
            warn!("Server service is shut down; dropping {action:?}");
        }

        CommandTicket { ack_rx }
    }

    pub fn start_server(&self, port: u16) -> CommandTicket {
        self.dispatch(ServerAction::Start { port })
    }

    pub fn stop_server(&self) -> CommandTicket {
        self.dispatch(ServerAction::Stop)
    }

    pub fn current_state(&self) -> RunningState {
        self.supervisor.current_state()
    }

    pub fn subscribe(&self) -> StatusSubscription {
        self.supervisor.subscribe()
    }

    pub fn supervisor(&self) -> &Arc<LifecycleSupervisor> {
        &self.supervisor
    }

    /// Process everything already queued, then force a final stop.
    pub async fn shutdown(&self) {
        let (ack, ack_rx) = oneshot::channel();

        let acknowledged = self
            .command_tx
            .send(ServiceCommand::Shutdown { ack })
            .is_ok()
            && ack_rx.await.is_ok();

        // The worker is gone; make sure no server outlives us anyway.
        if !acknowledged {
            self.supervisor.shutdown().await;
        }

        if let Some(worker) = self.worker.lock().await.take()
            && let Err(e) = worker.await
        {
            warn!("Server service worker ended abnormally: {e}");
        }
    }
}
