use hs_config::ConfigError;

use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Configuration error: {source} {location}")]
    Config {
        #[source]
        source: ConfigError,
        location: ErrorLocation,
    },

    #[error("Foreground slot held by PID {pid} (lock file: {path}) {location}")]
    ForegroundHeld {
        path: PathBuf,
        pid: u32,
        location: ErrorLocation,
    },

    #[error("Failed to acquire lock at {path}: {source} {location}")]
    LockAcquisition {
        path: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to encode lock info: {source} {location}")]
    LockEncoding {
        #[source]
        source: serde_json::Error,
        location: ErrorLocation,
    },

    #[error("Logging setup failed: {message} {location}")]
    Logging {
        message: String,
        location: ErrorLocation,
    },

    #[error("Failed to register signal handlers: {source} {location}")]
    Signal {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("IO error: {source} {location}")]
    Io {
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },
}

impl HostError {
    #[track_caller]
    pub fn logging<S: Into<String>>(message: S) -> Self {
        Self::Logging {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Error plus recovery hint, as printed when the host fails to run.
    pub fn user_message(&self) -> String {
        format!("Error: {self}\nHint: {}", self.recovery_hint())
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Config { .. } => {
                "Configuration file has invalid settings. \
                   Fix config.toml or delete it to use defaults."
            }
            Self::ForegroundHeld { .. } => {
                "Another host instance is holding the foreground slot. \
                   Stop it or run this one with a different --config-dir."
            }
            Self::LockAcquisition { .. } => {
                "Unable to create lock file. \
                   Check file permissions in the config directory."
            }
            Self::Logging { .. } => {
                "Unable to set up logging. \
                   Check that the log directory is writable."
            }
            _ => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<ConfigError> for HostError {
    #[track_caller]
    fn from(source: ConfigError) -> Self {
        Self::Config {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<std::io::Error> for HostError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;
