//! Notification rendering with a foreground → dismissible → silent ladder.

use crate::{PresentationResult, StatusSubscription, StatusUpdate};

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The host's notification mechanism.
pub trait NotificationSink: Send + Sync {
    /// Privileged, non-dismissible form that also keeps the host alive.
    fn present_ongoing(&self, message: &str) -> PresentationResult<()>;

    /// Plain form the user can dismiss.
    fn present_dismissible(&self, message: &str) -> PresentationResult<()>;
}

/// Which rung of the ladder ended up showing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationOutcome {
    Ongoing,
    Dismissible,
    /// Both forms failed; nothing was shown
    Suppressed,
}

/// Renders status updates through a [`NotificationSink`].
///
/// Never reports failure to its caller. It has no access to the
/// supervisor's state, so it cannot change it either.
pub struct StatusPresenter {
    sink: Arc<dyn NotificationSink>,
    foreground: bool,
}

impl StatusPresenter {
    /// `foreground = false` skips the ongoing form entirely.
    pub fn new(sink: Arc<dyn NotificationSink>, foreground: bool) -> Self {
        Self { sink, foreground }
    }

    pub fn present(&self, update: &StatusUpdate) -> PresentationOutcome {
        // Stopped always uses the dismissible form.
        if update.state.is_running() && self.foreground {
            match self.sink.present_ongoing(&update.message) {
                Ok(()) => return PresentationOutcome::Ongoing,
                Err(e) => {
                    warn!("Ongoing notification unavailable, falling back to dismissible: {e}");
                }
            }
        }

        match self.sink.present_dismissible(&update.message) {
            Ok(()) => PresentationOutcome::Dismissible,
            Err(e) => {
                warn!("Notification suppressed: {e}");
                PresentationOutcome::Suppressed
            }
        }
    }

    /// Present every update from `subscription` until the broadcaster goes away.
    ///
    /// The replayed initial value is skipped; nothing has happened yet.
    pub fn attach(self: Arc<Self>, mut subscription: StatusSubscription) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!("Status presenter attached as observer {}", subscription.id());

            while let Some(update) = subscription.recv().await {
                if update.is_initial() {
                    continue;
                }

                let outcome = self.present(&update);
                debug!("Presented #{} as {outcome:?}", update.sequence);
            }

            debug!("Status presenter detached");
        })
    }
}
