//! Terminal host for the supervised embedded HTTP server.
//!
//! Stands in for the platform shell: a line-oriented console plays the UI,
//! the terminal plays the notification area, and a lock file under the
//! config directory plays the single foreground slot.

pub mod cli;
pub mod console;
pub mod error;
pub mod host;
pub mod lock;
pub mod logging;
pub mod notifier;
pub mod status_view;

#[cfg(test)]
mod tests;

pub use cli::Cli;
pub use console::{Console, ConsoleCommand};
pub use error::{HostError, HostResult};
pub use host::run;
pub use lock::ForegroundLock;
pub use notifier::TerminalNotifier;
pub use status_view::StatusView;
