//! Lifecycle supervision for a single embedded HTTP server.
//!
//! [`LifecycleSupervisor`] owns the server handle and serializes start/stop.
//! [`StatusBroadcaster`] fans every transition out to any number of
//! observers and replays the latest value to late subscribers.
//! [`StatusPresenter`] turns transitions into user-visible notifications,
//! falling back from the ongoing form to the dismissible one.
//! [`ServerService`] is the fire-and-forget command surface used by the UI.

pub mod address;
pub mod broadcaster;
pub mod embedded;
pub mod error;
pub mod presentation;
pub mod running_state;
pub mod service;
pub mod status_update;
pub mod supervisor;

pub use address::{AddressResolver, FixedAddressResolver, LocalAddressResolver};
pub use broadcaster::{StatusBroadcaster, StatusSubscription};
pub use embedded::{EmbeddedServer, EmbeddedServerFactory};
pub use error::{EmbeddedServerError, EmbeddedServerResult, PresentationError, PresentationResult};
pub use presentation::{NotificationSink, PresentationOutcome, StatusPresenter};
pub use running_state::RunningState;
pub use service::{CommandTicket, ServerAction, ServerService};
pub use status_update::StatusUpdate;
pub use supervisor::{LifecycleSupervisor, StopPolicy};

#[cfg(test)]
mod tests;
