//! Log record assembly
//!
//! Builds `session_start` / `session_end` records from explicit context.
//! Absent optional fields are omitted from the output, never written as null.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::identity::ResolvedSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum RecordType {
    SessionStart,
    SessionEnd,
}

/// Source-control state captured at session start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct GitMetadata {
    pub(crate) base_commit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) branch: Option<String>,
    /// When the metadata was captured
    pub(crate) timestamp: String,
}

impl GitMetadata {
    /// First 8 characters of the commit hash
    pub(crate) fn short_commit(&self) -> &str {
        self.base_commit.get(..8).unwrap_or(&self.base_commit)
    }
}

/// One line of a session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct LogRecord {
    #[serde(rename = "type")]
    pub(crate) kind: RecordType,
    pub(crate) timestamp: String,
    pub(crate) session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) original_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) transcript_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) git_metadata: Option<GitMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) lane: Option<String>,
}

/// Caller-provided context shared by both event kinds
#[derive(Debug, Clone, Copy)]
pub(crate) struct EventContext<'a> {
    pub(crate) session: &'a ResolvedSession,
    pub(crate) transcript_path: Option<&'a str>,
    pub(crate) cwd: Option<&'a str>,
    pub(crate) lane: Option<&'a str>,
}

/// ISO-8601 UTC timestamp with microseconds, e.g. `2026-02-06T10:00:00.123456+00:00`
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

fn base_record(kind: RecordType, ctx: &EventContext<'_>, now: DateTime<Utc>) -> LogRecord {
    LogRecord {
        kind,
        timestamp: format_timestamp(now),
        session_id: ctx.session.id.as_str().to_string(),
        original_session_id: ctx.session.original.clone(),
        transcript_path: ctx.transcript_path.map(str::to_string),
        cwd: ctx.cwd.map(str::to_string),
        git_metadata: None,
        reason: None,
        lane: ctx.lane.map(str::to_string),
    }
}

pub(crate) fn build_session_start(
    ctx: &EventContext<'_>,
    git_metadata: Option<GitMetadata>,
    now: DateTime<Utc>,
) -> LogRecord {
    LogRecord {
        git_metadata,
        ..base_record(RecordType::SessionStart, ctx, now)
    }
}

/// A missing reason is logged as an empty string
pub(crate) fn build_session_end(
    ctx: &EventContext<'_>,
    reason: Option<&str>,
    now: DateTime<Utc>,
) -> LogRecord {
    LogRecord {
        reason: Some(reason.unwrap_or_default().to_string()),
        ..base_record(RecordType::SessionEnd, ctx, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::resolve_session_id;
    use serde_json::{Value, json};

    fn fixed_now() -> DateTime<Utc> {
        "2026-02-06T10:00:00.5Z".parse().unwrap()
    }

    #[test]
    fn timestamp_is_utc_iso8601_with_micros() {
        assert_eq!(format_timestamp(fixed_now()), "2026-02-06T10:00:00.500000+00:00");
    }

    #[test]
    fn session_start_serializes_in_field_order() {
        let session = resolve_session_id(Some("abc-123"));
        let ctx = EventContext {
            session: &session,
            transcript_path: Some("/tmp/t.jsonl"),
            cwd: Some("/work/proj"),
            lane: None,
        };
        let git = GitMetadata {
            base_commit: "0123456789abcdef".to_string(),
            branch: Some("main".to_string()),
            timestamp: "2026-02-06T10:00:00.400000+00:00".to_string(),
        };
        let record = build_session_start(&ctx, Some(git), fixed_now());
        let line = serde_json::to_string(&record).unwrap();
        assert_eq!(
            line,
            r#"{"type":"session_start","timestamp":"2026-02-06T10:00:00.500000+00:00","session_id":"abc-123","transcript_path":"/tmp/t.jsonl","cwd":"/work/proj","git_metadata":{"base_commit":"0123456789abcdef","branch":"main","timestamp":"2026-02-06T10:00:00.400000+00:00"}}"#
        );
    }

    #[test]
    fn absent_fields_are_omitted_not_null() {
        let session = resolve_session_id(Some("s1"));
        let ctx = EventContext {
            session: &session,
            transcript_path: None,
            cwd: None,
            lane: None,
        };
        for record in [
            build_session_start(&ctx, None, fixed_now()),
            build_session_end(&ctx, None, fixed_now()),
        ] {
            let v: Value = serde_json::to_value(&record).unwrap();
            let obj = v.as_object().unwrap();
            assert!(obj.values().all(|v| !v.is_null()), "{v}");
            assert!(!obj.contains_key("transcript_path"));
            assert!(!obj.contains_key("cwd"));
            assert!(!obj.contains_key("git_metadata"));
            assert!(!obj.contains_key("original_session_id"));
            assert!(!obj.contains_key("lane"));
        }
    }

    #[test]
    fn session_end_carries_reason() {
        let session = resolve_session_id(Some("s1"));
        let ctx = EventContext {
            session: &session,
            transcript_path: None,
            cwd: Some("/w"),
            lane: Some("model_a"),
        };
        let v = serde_json::to_value(build_session_end(&ctx, Some("logout"), fixed_now())).unwrap();
        assert_eq!(v["type"], json!("session_end"));
        assert_eq!(v["reason"], json!("logout"));
        assert_eq!(v["lane"], json!("model_a"));
        assert!(v.get("git_metadata").is_none());

        let v = serde_json::to_value(build_session_end(&ctx, None, fixed_now())).unwrap();
        assert_eq!(v["reason"], json!(""));
    }

    #[test]
    fn minted_session_records_original_value() {
        let session = resolve_session_id(Some("unknown"));
        let ctx = EventContext {
            session: &session,
            transcript_path: None,
            cwd: None,
            lane: None,
        };
        let record = build_session_start(&ctx, None, fixed_now());
        assert!(record.session_id.starts_with("fallback_"));
        assert_eq!(record.original_session_id.as_deref(), Some("unknown"));
    }

    #[test]
    fn record_parses_back() {
        let session = resolve_session_id(Some("s2"));
        let ctx = EventContext {
            session: &session,
            transcript_path: Some("/t"),
            cwd: None,
            lane: None,
        };
        let record = build_session_end(&ctx, Some("clear"), fixed_now());
        let line = serde_json::to_string(&record).unwrap();
        let parsed: LogRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn short_commit_handles_short_hashes() {
        let git = GitMetadata {
            base_commit: "abc".to_string(),
            branch: None,
            timestamp: String::new(),
        };
        assert_eq!(git.short_commit(), "abc");
        let git = GitMetadata {
            base_commit: "0123456789".to_string(),
            ..git
        };
        assert_eq!(git.short_commit(), "01234567");
    }
}
