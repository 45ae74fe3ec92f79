//! CLI argument definitions
//!
//! Hook arguments and configuration merging logic.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::Config;
use crate::consts::DEFAULT_GIT_TIMEOUT_SECS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum EventKind {
    /// Session started (captures git metadata)
    Start,
    /// Session ended
    End,
}

impl EventKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::End => "end",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "session-capture")]
#[command(
    about = "Record session start/end events to per-session JSONL logs",
    long_about = "Record session start/end events to per-session JSONL logs.\n\n\
                  Reads the hook payload (JSON with session_id, transcript_path, cwd, reason) \
                  from stdin and appends one record to the session's log file.",
    version
)]
pub(crate) struct Cli {
    /// Lifecycle event to record
    #[arg(value_enum, ignore_case = true)]
    pub(crate) event: EventKind,

    /// Directory for session logs (default: <project>/logs)
    #[arg(long, value_name = "DIR")]
    pub(crate) log_dir: Option<PathBuf>,

    /// Config file to use instead of the default locations
    #[arg(long, value_name = "FILE")]
    pub(crate) config: Option<PathBuf>,

    /// Skip git metadata capture on start
    #[arg(long)]
    pub(crate) no_git: bool,

    /// Timeout for each git command
    #[arg(long, value_name = "SECS")]
    pub(crate) git_timeout: Option<u64>,

    /// Append without the file lock (reduced-safety mode)
    #[arg(long)]
    pub(crate) no_lock: bool,

    /// Experiment lane directory name (repeatable; default: model_a, model_b)
    #[arg(long = "lane", value_name = "NAME")]
    pub(crate) lanes: Vec<String>,

    /// Only print errors
    #[arg(short, long)]
    pub(crate) quiet: bool,

    /// Enable debug output
    #[arg(long)]
    pub(crate) debug: bool,
}

impl Cli {
    /// Merge config file values into CLI (CLI args take precedence)
    pub(crate) fn with_config(mut self, config: &Config) -> Self {
        // Boolean flags: config only applies if CLI left them at false
        if !self.no_git && config.no_git {
            self.no_git = true;
        }
        if !self.no_lock && config.no_lock {
            self.no_lock = true;
        }
        if !self.quiet && config.quiet {
            self.quiet = true;
        }
        if !self.debug && config.debug {
            self.debug = true;
        }

        if self.log_dir.is_none() {
            self.log_dir = config.log_dir.clone();
        }
        if self.git_timeout.is_none() {
            self.git_timeout = config.git_timeout_secs;
        }
        if self.lanes.is_empty()
            && let Some(lanes) = &config.lanes
        {
            self.lanes = lanes.clone();
        }

        self
    }

    pub(crate) fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout.unwrap_or(DEFAULT_GIT_TIMEOUT_SECS))
    }

    /// Configured lanes, or `None` to use the defaults
    pub(crate) fn lanes(&self) -> Option<Vec<String>> {
        if self.lanes.is_empty() {
            None
        } else {
            Some(self.lanes.clone())
        }
    }
}
