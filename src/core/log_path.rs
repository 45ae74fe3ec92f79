//! Log file path derivation
//!
//! Maps `(session_id, cwd)` to the session's JSONL file. The mapping is a pure
//! function of its inputs and the configuration; it never reads the process
//! working directory.

use std::path::{Component, Path, PathBuf};

use crate::consts::{APP_NAME, DEFAULT_LANES, LOGS_DIR};
use crate::error::AppError;

use super::identity::SessionId;

/// Experiment lane found in a working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Lane {
    pub(crate) name: String,
    /// Directory containing the lane directory
    pub(crate) experiment_root: PathBuf,
}

#[derive(Debug, Clone)]
pub(crate) struct LogPathResolver {
    log_dir: Option<PathBuf>,
    lanes: Vec<String>,
    fallback_dir: Option<PathBuf>,
}

impl LogPathResolver {
    pub(crate) fn new(log_dir: Option<PathBuf>, lanes: Option<Vec<String>>) -> Self {
        let lanes = lanes.unwrap_or_else(|| DEFAULT_LANES.iter().map(|s| s.to_string()).collect());
        Self {
            log_dir,
            lanes,
            fallback_dir: dirs::data_local_dir().map(|d| d.join(APP_NAME).join(LOGS_DIR)),
        }
    }

    /// Override the directory used when neither cwd nor log_dir is known
    #[cfg(test)]
    pub(crate) fn with_fallback_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.fallback_dir = dir;
        self
    }

    /// First path component of `cwd` naming a configured lane
    pub(crate) fn detect_lane(&self, cwd: &Path) -> Option<Lane> {
        let mut root = PathBuf::new();
        for component in cwd.components() {
            if let Component::Normal(name) = component
                && let Some(lane) = self.lanes.iter().find(|l| name == l.as_str())
            {
                return Some(Lane {
                    name: lane.clone(),
                    experiment_root: root,
                });
            }
            root.push(component.as_os_str());
        }
        None
    }

    /// Path of the log file for this session.
    ///
    /// Base directory: configured `log_dir`, else `<experiment root>/logs` for
    /// a lane, else `<cwd>/logs`, else the platform data directory. A lane adds
    /// a `<lane>/` subdirectory. A relative `cwd` is ignored.
    pub(crate) fn resolve(
        &self,
        session: &SessionId,
        cwd: Option<&Path>,
    ) -> Result<PathBuf, AppError> {
        let cwd = cwd.filter(|c| c.is_absolute());
        let lane = cwd.and_then(|c| self.detect_lane(c));

        let mut dir = match (&self.log_dir, &lane, cwd) {
            (Some(dir), _, _) => dir.clone(),
            (None, Some(lane), _) => lane.experiment_root.join(LOGS_DIR),
            (None, None, Some(cwd)) => cwd.join(LOGS_DIR),
            (None, None, None) => self.fallback_dir.clone().ok_or(AppError::NoLogDir)?,
        };
        if let Some(lane) = &lane {
            dir.push(&lane.name);
        }
        Ok(dir.join(format!("session_{}.jsonl", session.file_component())))
    }
}
