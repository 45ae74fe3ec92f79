//! Session identity resolution
//!
//! Normalizes the session ID supplied by the hook caller. Missing or sentinel
//! IDs are replaced by a freshly minted one so that two anonymous sessions
//! never share a log file.

use std::fmt;

use uuid::Uuid;

use crate::consts::{FALLBACK_PREFIX, FALLBACK_SUFFIX_LEN, UNKNOWN};

/// A resolved, non-empty, non-sentinel session identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SessionId(String);

impl SessionId {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    /// File-name-safe rendering of the ID.
    ///
    /// Bytes outside `[A-Za-z0-9._-]` are written as `%XX`, and an ID made only
    /// of dots has its dots escaped too. The mapping is injective (`%` is itself
    /// escaped), never yields a path separator and never yields `.` or `..`.
    pub(crate) fn file_component(&self) -> String {
        let all_dots = self.0.bytes().all(|b| b == b'.');
        let mut out = String::with_capacity(self.0.len());
        for b in self.0.bytes() {
            let keep = b.is_ascii_alphanumeric()
                || b == b'-'
                || b == b'_'
                || (b == b'.' && !all_dots);
            if keep {
                out.push(b as char);
            } else {
                out.push_str(&format!("%{b:02X}"));
            }
        }
        out
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of resolving the caller's candidate ID
#[derive(Debug, Clone)]
pub(crate) struct ResolvedSession {
    pub(crate) id: SessionId,
    /// Raw caller value, kept only when it was non-empty but replaced (the sentinel)
    pub(crate) original: Option<String>,
    minted: bool,
}

impl ResolvedSession {
    pub(crate) fn is_minted(&self) -> bool {
        self.minted
    }
}

/// Resolve a caller-supplied session ID.
///
/// A non-empty candidate other than the `"unknown"` sentinel is returned
/// unchanged. Anything else gets a new `fallback_xxxxxxxx` ID that lives for
/// this invocation only.
pub(crate) fn resolve_session_id(candidate: Option<&str>) -> ResolvedSession {
    match candidate {
        Some(raw) if !raw.is_empty() && raw != UNKNOWN => ResolvedSession {
            id: SessionId(raw.to_string()),
            original: None,
            minted: false,
        },
        other => ResolvedSession {
            id: mint_fallback_id(),
            original: other.filter(|raw| !raw.is_empty()).map(str::to_string),
            minted: true,
        },
    }
}

/// Mint a fallback ID from 32 bits of a v4 UUID (OS CSPRNG backed)
pub(crate) fn mint_fallback_id() -> SessionId {
    let hex = Uuid::new_v4().simple().to_string();
    SessionId(format!("{FALLBACK_PREFIX}{}", &hex[..FALLBACK_SUFFIX_LEN]))
}
