/// Sentinel the hook boundary sends when it has no session ID
pub(crate) const UNKNOWN: &str = "unknown";

/// Prefix marking session IDs minted locally instead of supplied by the caller
pub(crate) const FALLBACK_PREFIX: &str = "fallback_";

/// Number of hex characters in a minted session ID suffix (32 bits)
pub(crate) const FALLBACK_SUFFIX_LEN: usize = 8;

/// Experiment lanes recognised in the working directory when none are configured
pub(crate) const DEFAULT_LANES: &[&str] = &["model_a", "model_b"];

/// Directory name for session logs under a project or experiment root
pub(crate) const LOGS_DIR: &str = "logs";

/// Application directory name used for config and data paths
pub(crate) const APP_NAME: &str = "session-capture";

/// Default timeout for each git subprocess, in seconds
pub(crate) const DEFAULT_GIT_TIMEOUT_SECS: u64 = 10;

/// Environment variable holding a tracing filter directive
pub(crate) const LOG_ENV: &str = "SESSION_CAPTURE_LOG";
