//! Atomic JSONL appender
//!
//! Appends one record per line to a log file that several independent
//! processes may be writing at the same time. The only synchronization is an
//! advisory exclusive lock on the file itself, held for
//! write-flush-sync and released on every exit path.
//!
//! Lock acquisition blocks without a timeout. Writers are short-lived hook
//! processes and the OS drops the lock when a holder exits, so a stuck holder
//! is an accepted risk.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;
use serde::Serialize;

use crate::error::AppendError;

/// How the appender excludes other writers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AppendMode {
    /// Exclusive advisory lock around each append
    Locking,
    /// No inter-process exclusion; relies on a single append write per record
    BestEffort,
}

impl AppendMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            AppendMode::Locking => "locking",
            AppendMode::BestEffort => "best-effort",
        }
    }
}

/// Append strategy, chosen once at startup
pub(crate) trait AppendStrategy: Send + Sync {
    fn mode(&self) -> AppendMode;

    /// Append `line` (which must not contain a newline) plus a terminator
    fn append_line(&self, path: &Path, line: &str) -> Result<(), AppendError>;
}

/// Box type for dynamic dispatch
pub(crate) type BoxedAppender = Box<dyn AppendStrategy>;

/// Appends under an exclusive `flock`/`LockFileEx` lock
#[derive(Debug, Default)]
pub(crate) struct LockingAppend;

impl AppendStrategy for LockingAppend {
    fn mode(&self) -> AppendMode {
        AppendMode::Locking
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), AppendError> {
        let file = open_for_append(path)?;
        let guard = LockGuard::acquire(&file, path)?;
        write_and_sync(&file, path, line)?;
        guard.release();
        Ok(())
    }
}

/// Reduced-safety mode for platforms without advisory locks
#[derive(Debug, Default)]
pub(crate) struct BestEffortAppend;

impl AppendStrategy for BestEffortAppend {
    fn mode(&self) -> AppendMode {
        AppendMode::BestEffort
    }

    fn append_line(&self, path: &Path, line: &str) -> Result<(), AppendError> {
        let file = open_for_append(path)?;
        write_and_sync(&file, path, line)
    }
}

/// Whether this platform has advisory file locks
pub(crate) fn locking_supported() -> bool {
    cfg!(any(unix, windows))
}

/// Pick the append strategy for this process
pub(crate) fn select_appender(disable_lock: bool) -> BoxedAppender {
    if !disable_lock && locking_supported() {
        Box::new(LockingAppend)
    } else {
        Box::new(BestEffortAppend)
    }
}

/// Serialize `record` as compact JSON and append it as one line.
///
/// `serde_json` escapes control characters inside strings, so the output is
/// always exactly one line.
pub(crate) fn append_record<T: Serialize + ?Sized>(
    appender: &dyn AppendStrategy,
    path: &Path,
    record: &T,
) -> Result<(), AppendError> {
    let line = serde_json::to_string(record).map_err(AppendError::Serialize)?;
    debug_assert!(!line.contains('\n'));
    appender.append_line(path, &line)
}

fn open_for_append(path: &Path) -> Result<File, AppendError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        // create_dir_all tolerates another process creating the same directory
        fs::create_dir_all(parent).map_err(|source| AppendError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| AppendError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn write_and_sync(file: &File, path: &Path, line: &str) -> Result<(), AppendError> {
    let mut writer = file;
    let mut buf = Vec::with_capacity(line.len() + 1);
    buf.extend_from_slice(line.as_bytes());
    buf.push(b'\n');

    writer.write_all(&buf).map_err(|source| AppendError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| AppendError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    file.sync_all().map_err(|source| AppendError::Sync {
        path: path.to_path_buf(),
        source,
    })
}

/// Holds the exclusive lock; unlocks on drop
struct LockGuard<'a> {
    file: &'a File,
}

impl<'a> LockGuard<'a> {
    fn acquire(file: &'a File, path: &Path) -> Result<Self, AppendError> {
        FileExt::lock_exclusive(file).map_err(|source| AppendError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { file })
    }

    fn release(self) {
        drop(self);
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(self.file) {
            // Closing the descriptor releases it anyway
            tracing::debug!("unlock failed: {e}");
        }
    }
}
