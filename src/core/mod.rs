//! Core module - session identity, record assembly and the atomic appender

mod appender;
mod identity;
mod log_path;
mod record;

#[cfg(test)]
pub(crate) use appender::AppendMode;
pub(crate) use appender::{AppendStrategy, append_record, select_appender};
pub(crate) use identity::resolve_session_id;
pub(crate) use log_path::LogPathResolver;
pub(crate) use record::{
    EventContext, GitMetadata, LogRecord, RecordType, build_session_end, build_session_start,
    format_timestamp,
};
