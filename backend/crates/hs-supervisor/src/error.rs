use std::net::SocketAddr;
use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

/// Failures raised by the embedded server collaborator.
#[derive(Error, Debug)]
pub enum EmbeddedServerError {
    #[error("Failed to bind {addr}: {source} {location}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Failed to create embedded server on port {port}: {message} {location}")]
    Create {
        port: u16,
        message: String,
        location: ErrorLocation,
    },

    #[error("Embedded server failed to start: {message} {location}")]
    Start {
        message: String,
        location: ErrorLocation,
    },
}

impl EmbeddedServerError {
    #[track_caller]
    pub fn bind(addr: SocketAddr, source: std::io::Error) -> Self {
        Self::Bind {
            addr,
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn create<S: Into<String>>(port: u16, message: S) -> Self {
        Self::Create {
            port,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn start<S: Into<String>>(message: S) -> Self {
        Self::Start {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// User-facing reason, without the source location.
    pub fn reason(&self) -> String {
        match self {
            Self::Bind { addr, source, .. } => format!("cannot bind {addr}: {source}"),
            Self::Create { message, .. } | Self::Start { message, .. } => message.clone(),
        }
    }
}

/// Failures raised while showing a notification.
#[derive(Error, Debug)]
pub enum PresentationError {
    #[error("Foreground promotion denied: {reason} {location}")]
    ForegroundDenied {
        reason: String,
        location: ErrorLocation,
    },

    #[error("Notification failed: {message} {location}")]
    NotificationFailed {
        message: String,
        location: ErrorLocation,
    },
}

impl PresentationError {
    #[track_caller]
    pub fn foreground_denied<S: Into<String>>(reason: S) -> Self {
        Self::ForegroundDenied {
            reason: reason.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn notification_failed<S: Into<String>>(message: S) -> Self {
        Self::NotificationFailed {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type EmbeddedServerResult<T> = std::result::Result<T, EmbeddedServerError>;
pub type PresentationResult<T> = std::result::Result<T, PresentationError>;
