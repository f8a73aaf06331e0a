use crate::ForegroundLock;
use crate::HostError;
use crate::lock::{LOCK_FILENAME, LockInfo};

use tempfile::TempDir;

#[test]
fn given_free_slot_when_acquire_then_file_written_with_our_pid() {
    // Given
    let dir = TempDir::new().unwrap();

    // When
    let lock = ForegroundLock::acquire(dir.path(), "Server running").unwrap();

    // Then
    let info = ForegroundLock::read_info(lock.path()).unwrap();
    assert_eq!(info.pid, std::process::id());
    assert_eq!(info.message, "Server running");
}

#[test]
fn given_held_by_live_process_when_acquire_then_denied() {
    // Given
    let dir = TempDir::new().unwrap();
    let _held = ForegroundLock::acquire(dir.path(), "first").unwrap();

    // When
    let result = ForegroundLock::acquire(dir.path(), "second");

    // Then
    match result {
        Err(HostError::ForegroundHeld { pid, .. }) => assert_eq!(pid, std::process::id()),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("second acquisition should be denied"),
    }
}

#[test]
fn given_stale_lock_from_dead_process_when_acquire_then_taken_over() {
    // Given
    let dir = TempDir::new().unwrap();
    let stale = LockInfo {
        pid: i32::MAX as u32,
        started_at: String::from("2020-01-01T00:00:00Z"),
        message: String::from("left behind"),
    };
    std::fs::write(
        dir.path().join(LOCK_FILENAME),
        serde_json::to_string(&stale).unwrap(),
    )
    .unwrap();

    // When
    let lock = ForegroundLock::acquire(dir.path(), "fresh").unwrap();

    // Then
    let info = ForegroundLock::read_info(lock.path()).unwrap();
    assert_eq!(info.pid, std::process::id());
    assert_eq!(info.message, "fresh");
}

#[test]
fn given_held_lock_when_updated_then_start_time_kept_and_message_replaced() {
    // Given
    let dir = TempDir::new().unwrap();
    let mut lock = ForegroundLock::acquire(dir.path(), "a much longer first message").unwrap();
    let before = ForegroundLock::read_info(lock.path()).unwrap();

    // When
    lock.update("short").unwrap();

    // Then
    let after = ForegroundLock::read_info(lock.path()).unwrap();
    assert_eq!(after.message, "short");
    assert_eq!(after.started_at, before.started_at);
}

#[test]
fn given_held_lock_when_dropped_then_file_removed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(LOCK_FILENAME);

    let lock = ForegroundLock::acquire(dir.path(), "running").unwrap();
    assert!(path.exists());
    drop(lock);

    assert!(!path.exists());
    assert!(ForegroundLock::acquire(dir.path(), "again").is_ok());
}
