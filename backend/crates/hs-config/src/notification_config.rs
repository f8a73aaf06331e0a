use crate::{DEFAULT_NOTIFICATION_FOREGROUND, DEFAULT_NOTIFICATION_TITLE};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub title: String,
    /// Try to hold the ongoing (foreground) notification while running
    pub foreground: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: String::from(DEFAULT_NOTIFICATION_TITLE),
            foreground: DEFAULT_NOTIFICATION_FOREGROUND,
        }
    }
}
