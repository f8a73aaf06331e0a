//! Contract consumed from the embedded HTTP server.

use crate::EmbeddedServerResult;

use std::time::Duration;

use async_trait::async_trait;

/// Builds server instances bound to a port.
#[async_trait]
pub trait EmbeddedServerFactory: Send + Sync {
    async fn create(&self, port: u16) -> EmbeddedServerResult<Box<dyn EmbeddedServer>>;
}

/// A single embedded server instance.
///
/// Dropping an instance must release its listener; implementations abort
/// any serving task they spawned.
#[async_trait]
pub trait EmbeddedServer: Send {
    /// Port the instance is bound to (the OS-assigned one once started with port 0).
    fn port(&self) -> u16;

    /// Start serving. With `non_blocking` the call returns once the listener is bound.
    async fn start(&mut self, non_blocking: bool) -> EmbeddedServerResult<()>;

    /// Best-effort stop: drain for `grace_period`, abort at `force_timeout`.
    async fn stop(&mut self, grace_period: Duration, force_timeout: Duration);
}
