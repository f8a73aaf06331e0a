//! Optional live view of the status stream, attached on demand.

use hs_supervisor::{StatusSubscription, StatusUpdate};

use tokio::task::JoinHandle;
use tracing::debug;

/// One console line per update.
pub fn format_update(update: &StatusUpdate) -> String {
    format!(
        "#{} {}: {}",
        update.sequence, update.state, update.message
    )
}

/// Mirrors the status stream to stdout while watching.
///
/// Watching and unwatching attach and detach a broadcaster observer, the
/// same way a UI screen does when it is created and torn down.
#[derive(Default)]
pub struct StatusView {
    watcher: Option<Watcher>,
}

struct Watcher {
    observer_id: u64,
    task: JoinHandle<()>,
}

impl StatusView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    /// Start printing updates from `subscription`, beginning with the
    /// replayed latest value. Returns `None` if already watching.
    pub fn watch(&mut self, mut subscription: StatusSubscription) -> Option<u64> {
        if self.watcher.is_some() {
            return None;
        }

        let observer_id = subscription.id();
        let task = tokio::spawn(async move {
            while let Some(update) = subscription.recv().await {
                println!("{}", format_update(&update));
            }
        });

        debug!("Status view attached as observer {observer_id}");
        self.watcher = Some(Watcher { observer_id, task });
        Some(observer_id)
    }

    /// Stop printing. The subscription detaches once the task is gone.
    pub fn unwatch(&mut self) -> Option<u64> {
        let watcher = self.watcher.take()?;
        watcher.task.abort();
        debug!("Status view observer {} detached", watcher.observer_id);
        Some(watcher.observer_id)
    }
}

impl Drop for StatusView {
    fn drop(&mut self) {
        self.unwatch();
    }
}
