//! Lock file standing in for the single foreground slot.

use crate::{HostError, HostResult};

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::panic::Location;
use std::path::{Path, PathBuf};

use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

pub const LOCK_FILENAME: &str = "foreground.lock";
#[cfg(unix)]
const LOCK_FILE_MODE: u32 = 0o600; // Owner read/write only

/// Held while this process shows the ongoing notification.
///
/// The file contains JSON with the PID, start time and the status text on
/// display, so a stale lock from a crashed process can be told apart from a
/// live holder.
pub struct ForegroundLock {
    path: PathBuf,
    file: Option<File>,
    started_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub started_at: String,
    pub message: String,
}

impl ForegroundLock {
    /// Try to take the foreground slot.
    ///
    /// Fails if another live process holds it. A lock left behind by a dead
    /// process is removed and acquisition succeeds.
    #[track_caller]
    pub fn acquire(dir: &Path, message: &str) -> HostResult<Self> {
        let path = dir.join(LOCK_FILENAME);

        if path.exists()
            && let Ok(existing) = Self::read_info(&path)
        {
            if Self::is_process_running(existing.pid) {
                return Err(HostError::ForegroundHeld {
                    path,
                    pid: existing.pid,
                    location: ErrorLocation::from(Location::caller()),
                });
            }
            tracing::info!(
                "Removing stale foreground lock (PID {} not running)",
                existing.pid
            );
            std::fs::remove_file(&path).ok();
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(LOCK_FILE_MODE);

        let file = options
            .open(&path)
            .map_err(|e| HostError::LockAcquisition {
                path: path.clone(),
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        let mut lock = Self {
            path,
            file: Some(file),
            started_at: chrono::Utc::now().to_rfc3339(),
        };
        lock.update(message)?;

        Ok(lock)
    }

    /// Rewrite the lock with the status text now on display.
    pub fn update(&mut self, message: &str) -> HostResult<()> {
        let info = LockInfo {
            pid: std::process::id(),
            started_at: self.started_at.clone(),
            message: message.to_string(),
        };

        let content =
            serde_json::to_string_pretty(&info).map_err(|e| HostError::LockEncoding {
                source: e,
                location: ErrorLocation::from(Location::caller()),
            })?;

        if let Some(ref mut file) = self.file {
            file.set_len(0)?;
            file.seek(SeekFrom::Start(0))?;
            file.write_all(content.as_bytes())?;
            file.sync_all()?;
        }

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read lock info from an existing file.
    pub fn read_info(path: &Path) -> Result<LockInfo, std::io::Error> {
        let mut file = File::open(path)?;
        let mut content = String::new();
        file.read_to_string(&mut content)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    #[cfg(unix)]
    fn is_process_running(pid: u32) -> bool {
        let Ok(pid) = libc::pid_t::try_from(pid) else {
            return false;
        };
        // kill(pid, 0) returns 0 if process exists, -1 otherwise
        pid > 0 && unsafe { libc::kill(pid, 0) == 0 }
    }

    // No cheap liveness probe here; leftover locks are treated as stale.
    #[cfg(not(unix))]
    fn is_process_running(pid: u32) -> bool {
        pid == std::process::id()
    }

    /// Give up the slot. Also runs on drop.
    pub fn release(&mut self) {
        if self.file.take().is_some() {
            std::fs::remove_file(&self.path).ok();
        }
    }
}

impl Drop for ForegroundLock {
    fn drop(&mut self) {
        self.release();
    }
}
