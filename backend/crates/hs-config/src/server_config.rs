use crate::{ConfigError, ConfigErrorResult, DEFAULT_AUTO_START, DEFAULT_HOST, DEFAULT_PORT};

use std::net::IpAddr;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface the embedded server binds to
    pub host: String,
    /// Port used when the UI does not supply a parsable one
    pub port: u16,
    /// Start the embedded server as soon as the host comes up
    pub auto_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from(DEFAULT_HOST),
            port: DEFAULT_PORT,
            auto_start: DEFAULT_AUTO_START,
        }
    }
}

impl ServerConfig {
    /// Parsed bind address.
    pub fn host_addr(&self) -> ConfigErrorResult<IpAddr> {
        self.host.parse().map_err(|_| {
            ConfigError::server(format!(
                "server.host must be an IP address, got '{}'",
                self.host
            ))
        })
    }

    // The port is passed through untouched; the embedded server reports
    // unusable ports when it tries to bind.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.host_addr()?;
        Ok(())
    }
}
