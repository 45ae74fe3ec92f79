//! Best-effort git metadata lookup
//!
//! Every failure here is non-fatal: the caller logs the event without
//! `git_metadata`.

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::core::{GitMetadata, format_timestamp};
use crate::error::GitError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `git <args>` in `cwd`, killing it after `timeout`
fn run_git(cwd: &Path, args: &[&str], timeout: Duration) -> Result<String, GitError> {
    if !cwd.is_dir() {
        return Err(GitError::Failed(format!("{} is not a directory", cwd.display())));
    }

    let mut child = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GitError::NotFound
            } else {
                GitError::Spawn(e)
            }
        })?;

    // Drain both pipes while waiting so a chatty command cannot fill one and stall
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    // A timeout too large to represent means no deadline
    let deadline = Instant::now().checked_add(timeout);
    let status = loop {
        match child.try_wait().map_err(GitError::Wait)? {
            Some(status) => break status,
            None if deadline.is_some_and(|d| Instant::now() >= d) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(GitError::Timeout {
                    command: args.join(" "),
                    secs: timeout.as_secs(),
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    if status.success() {
        Ok(collect(stdout).trim().to_string())
    } else {
        Err(GitError::Failed(collect(stderr).trim().to_string()))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut out = String::new();
            let _ = pipe.read_to_string(&mut out);
            out
        })
    })
}

fn collect(reader: Option<JoinHandle<String>>) -> String {
    reader.and_then(|h| h.join().ok()).unwrap_or_default()
}

/// Current commit and branch of the repository containing `cwd`.
///
/// Returns `None` when no commit hash is available. A detached HEAD or a
/// failed branch query only drops `branch`.
pub(crate) fn collect_git_metadata(
    cwd: &Path,
    timeout: Duration,
    captured_at: DateTime<Utc>,
) -> Option<GitMetadata> {
    let base_commit = match run_git(cwd, &["rev-parse", "HEAD"], timeout) {
        Ok(hash) if !hash.is_empty() => hash,
        Ok(_) => return None,
        Err(e @ GitError::Failed(_)) => {
            debug!("no git metadata for {}: {e}", cwd.display());
            return None;
        }
        Err(e) => {
            warn!("Could not capture git metadata: {e}");
            return None;
        }
    };

    let branch = match run_git(cwd, &["branch", "--show-current"], timeout) {
        Ok(branch) if !branch.is_empty() => Some(branch),
        Ok(_) => None,
        Err(e) => {
            debug!("git branch lookup failed: {e}");
            None
        }
    };

    Some(GitMetadata {
        base_commit,
        branch,
        timestamp: format_timestamp(captured_at),
    })
}
