//! Terminal rendering of status notifications.

use crate::ForegroundLock;

use hs_supervisor::{NotificationSink, PresentationError, PresentationResult};

use std::io::{Stdout, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Prints notifications as terminal lines.
///
/// The ongoing form must take the [`ForegroundLock`] first; while another
/// live process holds it, promotion is denied and the presenter falls back
/// to the dismissible form. Showing a dismissible notification gives the
/// slot back.
pub struct TerminalNotifier<W: Write + Send = Stdout> {
    title: String,
    lock_dir: PathBuf,
    foreground: Mutex<Option<ForegroundLock>>,
    out: Mutex<W>,
}

impl TerminalNotifier<Stdout> {
    pub fn stdout(title: impl Into<String>, lock_dir: &Path) -> Self {
        Self::new(title, lock_dir, std::io::stdout())
    }
}

impl<W: Write + Send> TerminalNotifier<W> {
    pub fn new(title: impl Into<String>, lock_dir: &Path, out: W) -> Self {
        Self {
            title: title.into(),
            lock_dir: lock_dir.to_path_buf(),
            foreground: Mutex::new(None),
            out: Mutex::new(out),
        }
    }

    /// Whether this notifier currently owns the foreground slot.
    pub fn holds_foreground(&self) -> bool {
        guard(&self.foreground).is_some()
    }

    /// Consume the notifier and hand back its writer.
    pub fn into_writer(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, ongoing: bool, message: &str) -> PresentationResult<()> {
        let mut out = guard(&self.out);
        let marker = if ongoing { " (ongoing)" } else { "" };
        writeln!(out, "[{}]{marker} {message}", self.title)
            .and_then(|()| out.flush())
            .map_err(|e| PresentationError::notification_failed(e.to_string()))
    }
}

impl<W: Write + Send> NotificationSink for TerminalNotifier<W> {
    fn present_ongoing(&self, message: &str) -> PresentationResult<()> {
        {
            let mut foreground = guard(&self.foreground);
            match foreground.as_mut() {
                Some(lock) => lock
                    .update(message)
                    .map_err(|e| PresentationError::foreground_denied(e.to_string()))?,
                None => {
                    let lock = ForegroundLock::acquire(&self.lock_dir, message)
                        .map_err(|e| PresentationError::foreground_denied(e.to_string()))?;
                    debug!("Foreground lock taken at {}", lock.path().display());
                    *foreground = Some(lock);
                }
            }
        }

        self.emit(true, message)
    }

    fn present_dismissible(&self, message: &str) -> PresentationResult<()> {
        if guard(&self.foreground).take().is_some() {
            debug!("Foreground lock released");
        }

        self.emit(false, message)
    }
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
