use crate::RunningState;

use std::net::{IpAddr, SocketAddr};

pub const IDLE_MESSAGE: &str = "Server not started";
pub const STOPPED_MESSAGE: &str = "Server stopped";

/// One published transition: the state plus the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Publication order; 0 is the initial value nobody published
    pub sequence: u64,
    pub state: RunningState,
    pub message: String,
}

impl StatusUpdate {
    pub fn initial() -> Self {
        Self {
            sequence: 0,
            state: RunningState::Stopped,
            message: String::from(IDLE_MESSAGE),
        }
    }

    pub fn is_initial(&self) -> bool {
        self.sequence == 0
    }
}

/// `http://<address>:<port>`, bracketing IPv6 addresses.
pub fn server_url(address: IpAddr, port: u16) -> String {
    format!("http://{}", SocketAddr::new(address, port))
}

pub fn running_message(address: IpAddr, port: u16) -> String {
    format!("Server running on {}", server_url(address, port))
}

pub fn failed_message(reason: &str) -> String {
    format!("Failed to start server: {reason}")
}
