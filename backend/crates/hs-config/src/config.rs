use crate::{
    CONFIG_DIR_ENV, CONFIG_DIR_NAME, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    LoggingConfig, NotificationConfig, ServerConfig, ShutdownConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub shutdown: ShutdownConfig,
    pub logging: LoggingConfig,
    pub notification: NotificationConfig,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. Check for HS_CONFIG_DIR env var, else use ./.hs/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply HS_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(&config_dir)
    }

    /// Same as [`Config::load`] but rooted at an explicit directory.
    pub fn load_from(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: HS_CONFIG_DIR env var > ./.hs/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(CONFIG_DIR_NAME))
    }

    /// Validate all configuration.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.shutdown.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Absolute log directory for a given config directory.
    pub fn log_dir(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.logging.dir)
    }

    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} (auto_start: {})",
            self.server.host, self.server.port, self.server.auto_start
        );
        info!(
            "  shutdown: grace={}ms, force_timeout={}ms",
            self.shutdown.grace_period_ms, self.shutdown.force_timeout_ms
        );
        info!(
            "  logging: {} in {} (colored: {})",
            self.logging.level, self.logging.dir, self.logging.colored
        );
        info!(
            "  notification: '{}' (foreground: {})",
            self.notification.title, self.notification.foreground
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("HS_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("HS_SERVER_PORT", &mut self.server.port);
        Self::apply_env_bool("HS_SERVER_AUTO_START", &mut self.server.auto_start);

        // Shutdown
        Self::apply_env_parse(
            "HS_SHUTDOWN_GRACE_PERIOD_MS",
            &mut self.shutdown.grace_period_ms,
        );
        Self::apply_env_parse(
            "HS_SHUTDOWN_FORCE_TIMEOUT_MS",
            &mut self.shutdown.force_timeout_ms,
        );

        // Logging
        Self::apply_env_parse("HS_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_string("HS_LOG_DIR", &mut self.logging.dir);
        Self::apply_env_bool("HS_LOG_COLORED", &mut self.logging.colored);

        // Notification
        Self::apply_env_string("HS_NOTIFICATION_TITLE", &mut self.notification.title);
        Self::apply_env_bool(
            "HS_NOTIFICATION_FOREGROUND",
            &mut self.notification.foreground,
        );
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }
}
