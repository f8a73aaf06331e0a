use std::fmt;

/// Whether the embedded server is up, and on which port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunningState {
    /// No server handle exists
    Stopped,
    /// A server handle exists and is bound to `port`
    Running { port: u16 },
}

impl RunningState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    pub fn port(&self) -> Option<u16> {
        match self {
            Self::Running { port } => Some(*port),
            Self::Stopped => None,
        }
    }
}

impl fmt::Display for RunningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Running { port } => write!(f, "running (port {port})"),
        }
    }
}
