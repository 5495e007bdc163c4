use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Required path is missing: {}", path.display())]
    MissingRoot { path: PathBuf },

    #[error("Staging area is locked by process {owner_pid} on {owner_host} for {locked_for:?}")]
    RunLocked {
        owner_pid: u32,
        owner_host: String,
        locked_for: Duration,
    },

    #[error("Failed to acquire lock: {message}")]
    LockError { message: String },

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_root_display() {
        let err = AppError::MissingRoot {
            path: PathBuf::from("/mnt/complete/Series"),
        };
        assert_eq!(
            err.to_string(),
            "Required path is missing: /mnt/complete/Series"
        );
    }

    #[test]
    fn test_from_io() {
        let err: AppError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
