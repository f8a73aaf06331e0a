mod config;
mod error;
mod log_level;
mod logging_config;
mod notification_config;
mod server_config;
mod shutdown_config;

#[cfg(test)]
mod tests;

pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use notification_config::NotificationConfig;
pub use server_config::ServerConfig;
pub use shutdown_config::ShutdownConfig;

pub const CONFIG_DIR_ENV: &str = "HS_CONFIG_DIR";
pub const CONFIG_DIR_NAME: &str = ".hs";
pub const CONFIG_FILENAME: &str = "config.toml";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_AUTO_START: bool = false;
const DEFAULT_GRACE_PERIOD_MS: u64 = 1000;
const DEFAULT_FORCE_TIMEOUT_MS: u64 = 2000;
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "logs";
const DEFAULT_LOG_COLORED: bool = true;
const DEFAULT_NOTIFICATION_TITLE: &str = "HTTP Server";
const DEFAULT_NOTIFICATION_FOREGROUND: bool = true;
