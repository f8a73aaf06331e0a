//! Logging setup with file rotation.

use crate::{HostError, HostResult};

use hs_config::LoggingConfig;

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "hs-host";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

/// Setup logging with console and rotating file output.
///
/// # Log Layers
/// - Console: human-readable, colored unless `logging.colored = false`
/// - File: plain text, daily rotation, 7-day retention
///
/// `RUST_LOG` wins over the configured level when set. Records from the
/// `log` crate are bridged in as well.
pub fn setup_logging(config: &LoggingConfig, logs_dir: &Path) -> HostResult<()> {
    std::fs::create_dir_all(logs_dir)?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(config.colored);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(logs_dir)
        .map_err(|e| HostError::logging(e.to_string()))?;

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| HostError::logging(e.to_string()))?;

    Ok(())
}

/// Filter used when `RUST_LOG` is unset.
pub fn default_directives(config: &LoggingConfig) -> String {
    // hyper and friends are noisy at debug
    format!("{},hyper=warn,tower_http=info", config.level.as_directive())
}

/// Path of the file being written today. The appender rolls over on UTC dates.
pub fn current_log_path(logs_dir: &Path) -> PathBuf {
    let today = chrono::Utc::now().format("%Y-%m-%d");
    logs_dir.join(format!("{LOG_FILE_PREFIX}.{today}.{LOG_FILE_SUFFIX}"))
}
