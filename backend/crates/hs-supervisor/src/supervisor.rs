//! Single authority over the embedded server's lifecycle.

use crate::status_update::{STOPPED_MESSAGE, failed_message, running_message, server_url};
use crate::{
    AddressResolver, EmbeddedServer, EmbeddedServerFactory, EmbeddedServerResult, RunningState,
    StatusBroadcaster, StatusSubscription, StatusUpdate,
};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(1000);
const DEFAULT_FORCE_TIMEOUT: Duration = Duration::from_millis(2000);

/// Durations handed to [`EmbeddedServer::stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StopPolicy {
    pub grace_period: Duration,
    pub force_timeout: Duration,
}

impl StopPolicy {
    pub fn new(grace_period: Duration, force_timeout: Duration) -> Self {
        Self {
            grace_period,
            force_timeout,
        }
    }

    /// Upper bound on how long a stop can take.
    pub fn deadline(&self) -> Duration {
        self.grace_period.max(self.force_timeout)
    }
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_PERIOD, DEFAULT_FORCE_TIMEOUT)
    }
}

/// Owns the embedded server handle and publishes every transition.
///
/// Responsibilities:
/// - Serialize start/stop so at most one handle ever exists
/// - Tear the previous handle down before creating a new one
/// - Convert collaborator failures into a `Stopped` transition plus status text
/// - Force a final stop on teardown
pub struct LifecycleSupervisor {
    factory: Arc<dyn EmbeddedServerFactory>,
    resolver: Arc<dyn AddressResolver>,
    stop_policy: StopPolicy,
    handle: Mutex<Option<Box<dyn EmbeddedServer>>>,
    broadcaster: StatusBroadcaster,
    torn_down: AtomicBool,
}

impl LifecycleSupervisor {
    pub fn new(
        factory: Arc<dyn EmbeddedServerFactory>,
        resolver: Arc<dyn AddressResolver>,
        stop_policy: StopPolicy,
    ) -> Self {
        Self {
            factory,
            resolver,
            stop_policy,
            handle: Mutex::new(None),
            broadcaster: StatusBroadcaster::new(),
            torn_down: AtomicBool::new(false),
        }
    }

    /// Start a server on `port`, replacing any running one.
    ///
    /// Never fails: the outcome is published as `Running` or as `Stopped`
    /// with the failure reason in the status text.
    pub async fn start_server(&self, port: u16) {
        let mut slot = self.handle.lock().await;

        if self.torn_down.load(Ordering::SeqCst) {
            warn!("Ignoring start on port {port}: supervisor already torn down");
            return;
        }

        // Stop first so the old instance releases its port.
        if self.teardown(&mut slot).await {
            self.publish(RunningState::Stopped, String::from(STOPPED_MESSAGE));
        }

        match self.launch(port).await {
            Ok(server) => {
                let bound_port = server.port();
                *slot = Some(server);

                let address = self.resolver.local_address();
                info!("Embedded server started on port {bound_port}");
                self.publish(
                    RunningState::Running { port: bound_port },
                    running_message(address, bound_port),
                );
            }
            Err(e) => {
                error!("Failed to start embedded server on port {port}: {e}");
                self.publish(RunningState::Stopped, failed_message(&e.reason()));
            }
        }
    }

    /// Stop the running server, if any. Always publishes `Stopped`.
    pub async fn stop_server(&self) {
        let mut slot = self.handle.lock().await;

        if !self.teardown(&mut slot).await {
            debug!("Stop requested with no running server");
        }

        self.publish(RunningState::Stopped, String::from(STOPPED_MESSAGE));
    }

    /// Final stop for host-process teardown. Later starts are ignored.
    pub async fn shutdown(&self) {
        let mut slot = self.handle.lock().await;

        if self.torn_down.swap(true, Ordering::SeqCst) {
            debug!("Supervisor already torn down");
            return;
        }

        info!("Tearing down lifecycle supervisor");
        self.teardown(&mut slot).await;
        self.publish(RunningState::Stopped, String::from(STOPPED_MESSAGE));
    }

    /// Last published state. Never waits on the command path.
    pub fn current_state(&self) -> RunningState {
        self.broadcaster.latest().state
    }

    pub fn latest_status(&self) -> StatusUpdate {
        self.broadcaster.latest()
    }

    pub fn subscribe(&self) -> StatusSubscription {
        self.broadcaster.subscribe()
    }

    /// Observers currently attached to the status stream.
    pub fn observer_count(&self) -> usize {
        self.broadcaster.subscriber_count()
    }

    pub fn stop_policy(&self) -> StopPolicy {
        self.stop_policy
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down.load(Ordering::SeqCst)
    }

    /// URL of the running server as shown to the user.
    pub fn server_url(&self) -> Option<String> {
        self.current_state()
            .port()
            .map(|port| server_url(self.resolver.local_address(), port))
    }

    async fn launch(&self, port: u16) -> EmbeddedServerResult<Box<dyn EmbeddedServer>> {
        let mut server = self.factory.create(port).await?;
        server.start(true).await?;
        Ok(server)
    }

    /// Stop and clear the handle. Returns whether one existed.
    async fn teardown(&self, slot: &mut Option<Box<dyn EmbeddedServer>>) -> bool {
        let Some(mut server) = slot.take() else {
            return false;
        };

        // The handle is gone from the slot; if this future is dropped
        // mid-stop the server is aborted and `Stopped` must still go out.
        let mut on_cancel = StoppedOnCancel::arm(&self.broadcaster);

        let port = server.port();
        info!(
            "Stopping embedded server on port {port} (grace {:?}, force timeout {:?})",
            self.stop_policy.grace_period, self.stop_policy.force_timeout
        );
        server
            .stop(self.stop_policy.grace_period, self.stop_policy.force_timeout)
            .await;
        info!("Embedded server on port {port} stopped");

        on_cancel.disarm();
        true
    }

    fn publish(&self, state: RunningState, message: String) {
        let update = self.broadcaster.publish(state, message);
        info!("Server state -> {} ({})", update.state, update.message);
    }
}

/// Publishes `Stopped` if dropped while still armed.
struct StoppedOnCancel<'a> {
    broadcaster: &'a StatusBroadcaster,
    armed: bool,
}

impl<'a> StoppedOnCancel<'a> {
    fn arm(broadcaster: &'a StatusBroadcaster) -> Self {
        Self {
            broadcaster,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for StoppedOnCancel<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!("Stop was cancelled; the embedded server was aborted");
            self.broadcaster
                .publish(RunningState::Stopped, String::from(STOPPED_MESSAGE));
        }
    }
}

impl Drop for LifecycleSupervisor {
    fn drop(&mut self) {
        if let Some(server) = self.handle.get_mut() {
            warn!(
                "Supervisor dropped while port {} was still served; aborting it",
                server.port()
            );
        }
    }
}
