use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("Failed to read hook input from stdin: {0}")]
    Stdin(std::io::Error),

    #[error("Malformed hook input (expected a JSON object): {0}")]
    InvalidPayload(serde_json::Error),

    #[error("Cannot determine log directory (no cwd in hook input and no log_dir configured)")]
    NoLogDir,

    #[error("{0}")]
    Append(#[from] AppendError),
}

#[derive(Debug, Error)]
pub(crate) enum AppendError {
    #[error("Failed to serialize log record: {0}")]
    Serialize(serde_json::Error),

    #[error("Failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to lock {}: {source}", .path.display())]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to append to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to sync {}: {source}", .path.display())]
    Sync {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub(crate) enum GitError {
    #[error("git not found in PATH")]
    NotFound,

    #[error("Failed to run git: {0}")]
    Spawn(std::io::Error),

    #[error("Failed to wait for git: {0}")]
    Wait(std::io::Error),

    #[error("git {command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("git error: {0}")]
    Failed(String),
}
