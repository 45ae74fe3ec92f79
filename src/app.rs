use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::cli::{Cli, EventKind};
use crate::core::{
    AppendStrategy, EventContext, LogPathResolver, LogRecord, append_record, build_session_end,
    build_session_start, resolve_session_id, select_appender,
};
use crate::error::AppError;
use crate::utils::collect_git_metadata;

/// Hook payload read from stdin. Unknown fields are ignored.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct HookInput {
    #[serde(default)]
    pub(crate) session_id: Option<String>,
    #[serde(default)]
    pub(crate) transcript_path: Option<String>,
    #[serde(default)]
    pub(crate) cwd: Option<String>,
    #[serde(default)]
    pub(crate) reason: Option<String>,
}

pub(crate) fn read_hook_input(mut input: impl Read) -> Result<HookInput, AppError> {
    let mut raw = String::new();
    input.read_to_string(&mut raw).map_err(AppError::Stdin)?;
    let value: serde_json::Value = serde_json::from_str(&raw).map_err(AppError::InvalidPayload)?;
    // Structs also deserialize from arrays; only an object is a valid payload
    if !value.is_object() {
        return Err(AppError::InvalidPayload(serde::de::Error::custom(format!(
            "expected an object, got {value}"
        ))));
    }
    serde_json::from_value(value).map_err(AppError::InvalidPayload)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Collaborators for one capture, selected once per process
pub(crate) struct CaptureContext<'a> {
    pub(crate) appender: &'a dyn AppendStrategy,
    pub(crate) paths: &'a LogPathResolver,
    /// `None` disables git metadata capture
    pub(crate) git_timeout: Option<Duration>,
}

#[derive(Debug)]
pub(crate) struct Captured {
    pub(crate) path: PathBuf,
    pub(crate) record: LogRecord,
}

/// Build the record for `kind` and append it to the session's log file
pub(crate) fn capture_event(
    kind: EventKind,
    input: &HookInput,
    ctx: &CaptureContext<'_>,
    clock: impl Fn() -> DateTime<Utc>,
) -> Result<Captured, AppError> {
    let session = resolve_session_id(input.session_id.as_deref());
    if session.is_minted() {
        debug!("no usable session_id, using {}", session.id);
    }

    let cwd = non_empty(&input.cwd);
    // A relative cwd would resolve against this process's directory
    let cwd_path = cwd.map(Path::new).filter(|c| c.is_absolute());
    if cwd.is_some() && cwd_path.is_none() {
        debug!("ignoring relative cwd {:?} for log path and git", cwd);
    }
    let lane = cwd_path.and_then(|c| ctx.paths.detect_lane(c));
    let event = EventContext {
        session: &session,
        transcript_path: non_empty(&input.transcript_path),
        cwd,
        lane: lane.as_ref().map(|l| l.name.as_str()),
    };

    let record = match kind {
        EventKind::Start => {
            let git_metadata = match (ctx.git_timeout, cwd_path) {
                (Some(timeout), Some(cwd)) => collect_git_metadata(cwd, timeout, clock()),
                _ => None,
            };
            build_session_start(&event, git_metadata, clock())
        }
        EventKind::End => build_session_end(&event, input.reason.as_deref(), clock()),
    };

    let path = ctx.paths.resolve(&session.id, cwd_path)?;
    append_record(ctx.appender, &path, &record)?;
    debug!(
        "appended {} to {} ({})",
        kind.as_str(),
        path.display(),
        ctx.appender.mode().as_str()
    );

    Ok(Captured { path, record })
}

#[derive(Debug)]
pub(crate) enum RunOutcome {
    Logged(Captured),
    /// The log write failed; the hook itself still succeeds
    NotLogged(AppError),
}

/// Read the payload and capture the event.
///
/// Only unreadable or malformed input is an error. Failing to write the log
/// is reported as `NotLogged`: logging must never fail the session it observes.
pub(crate) fn run(cli: &Cli, input: impl Read) -> Result<RunOutcome, AppError> {
    let input = read_hook_input(input)?;

    let appender = select_appender(cli.no_lock);
    let paths = LogPathResolver::new(cli.log_dir.clone(), cli.lanes());
    let ctx = CaptureContext {
        appender: appender.as_ref(),
        paths: &paths,
        git_timeout: (!cli.no_git).then(|| cli.git_timeout()),
    };

    match capture_event(cli.event, &input, &ctx, Utc::now) {
        Ok(captured) => Ok(RunOutcome::Logged(captured)),
        Err(e) => Ok(RunOutcome::NotLogged(e)),
    }
}

/// Run the hook and map the outcome to the process exit code
pub(crate) fn execute(cli: &Cli, input: impl Read) -> ExitCode {
    match run(cli, input) {
        Ok(RunOutcome::Logged(captured)) => {
            if !cli.quiet
                && let Some(git) = &captured.record.git_metadata
            {
                println!(
                    "[OK] Captured git metadata: {} on {}",
                    git.short_commit(),
                    git.branch.as_deref().unwrap_or("(detached)")
                );
            }
            ExitCode::SUCCESS
        }
        Ok(RunOutcome::NotLogged(e)) => {
            eprintln!("Warning: session {} not logged: {e}", cli.event.as_str());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("[ERROR] Session {}: {e}", cli.event.as_str());
            ExitCode::FAILURE
        }
    }
}
