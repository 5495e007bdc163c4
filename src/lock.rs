use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs::{self, File, OpenOptions};
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, SystemTime};

use crate::error::AppError;

pub const LOCK_DIR: &str = "/tmp/mediastow-locks";

#[derive(Debug, Serialize, Deserialize)]
struct LockOwner {
    pid: u32,
    hostname: String,
    started_at: SystemTime,
    command: String,
    roots: Vec<PathBuf>,
}

impl LockOwner {
    fn current(roots: Vec<PathBuf>) -> Self {
        Self {
            pid: process::id(),
            hostname: hostname::get().map_or_else(
                |_| "unknown".to_string(),
                |h| h.to_string_lossy().into_owned(),
            ),
            started_at: SystemTime::now(),
            command: std::env::args().collect::<Vec<_>>().join(" "),
            roots,
        }
    }

    fn read(lock_path: &Path) -> Option<Self> {
        let contents = fs::read_to_string(lock_path).ok()?;
        serde_json::from_str(&contents).ok()
    }
}

/// Exclusive claim on a set of source roots for the duration of one pass.
///
/// The lock file is unlocked and removed on drop.
pub struct RunLockGuard {
    lock_path: PathBuf,
    lock_file: File,
}

impl RunLockGuard {
    /// Same roots in any order map to the same lock file
    fn lock_path_for(lock_dir: &Path, roots: &[&Path]) -> PathBuf {
        let mut sorted = roots.to_vec();
        sorted.sort();

        let mut hasher = DefaultHasher::new();
        for root in sorted {
            root.hash(&mut hasher);
        }

        lock_dir.join(format!("lock-{:016x}.lock", hasher.finish()))
    }

    pub fn acquire(roots: &[&Path]) -> Result<Self, AppError> {
        Self::acquire_in(Path::new(LOCK_DIR), roots)
    }

    /// Non-blocking: fails with [`AppError::RunLocked`] if another process holds it
    pub fn acquire_in(lock_dir: &Path, roots: &[&Path]) -> Result<Self, AppError> {
        fs::create_dir_all(lock_dir).map_err(|e| AppError::LockError {
            message: format!("Failed to create lock directory {}: {e}", lock_dir.display()),
        })?;

        let lock_path = Self::lock_path_for(lock_dir, roots);
        if lock_path.exists() {
            remove_if_stale(&lock_path);
        }

        let mut lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .read(true)
            .open(&lock_path)
            .map_err(|e| AppError::LockError {
                message: format!("Failed to open lock file {}: {e}", lock_path.display()),
            })?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(match LockOwner::read(&lock_path) {
                Some(owner) => AppError::RunLocked {
                    owner_pid: owner.pid,
                    owner_host: owner.hostname,
                    locked_for: SystemTime::now()
                        .duration_since(owner.started_at)
                        .unwrap_or_default(),
                },
                None => AppError::RunLocked {
                    owner_pid: 0,
                    owner_host: "unknown".to_string(),
                    locked_for: Duration::ZERO,
                },
            });
        }

        let owner = LockOwner::current(roots.iter().map(|r| r.to_path_buf()).collect());
        lock_file.set_len(0).ok();
        lock_file
            .write_all(serde_json::to_string(&owner)?.as_bytes())
            .map_err(|e| AppError::LockError {
                message: format!("Failed to write lock owner: {e}"),
            })?;
        lock_file.sync_all().ok();

        Ok(Self {
            lock_path,
            lock_file,
        })
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for RunLockGuard {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
        if let Err(e) = fs::remove_file(&self.lock_path) {
            tracing::warn!(
                "Failed to remove lock file {}: {e}",
                self.lock_path.display()
            );
        }
    }
}

/// Delete a lock file left behind by a process that no longer exists
fn remove_if_stale(lock_path: &Path) {
    let Ok(file) = OpenOptions::new().write(true).read(true).open(lock_path) else {
        return;
    };
    if file.try_lock_exclusive().is_err() {
        return;
    }

    match LockOwner::read(lock_path) {
        Some(owner) if !is_process_alive(owner.pid) => {
            tracing::warn!(
                "Removing stale lock from dead process {} ({}) at {}",
                owner.pid,
                owner.hostname,
                lock_path.display()
            );
            let _ = file.unlock();
            drop(file);
            fs::remove_file(lock_path).ok();
        }
        _ => {
            let _ = file.unlock();
        }
    }
}

#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    // Signal 0 only checks for existence
    i32::try_from(pid).is_ok_and(|raw| kill(Pid::from_raw(raw), None).is_ok())
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    true
}
