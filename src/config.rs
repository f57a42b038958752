//! Environment configuration

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;
/// CVV, the Brazilian emotional-support line
pub const DEFAULT_CRISIS_LINE: &str = "188";
/// Conversations untouched this long are evicted (30 minutes)
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    /// Directory of extra `*.json` flow documents
    pub flows_dir: Option<PathBuf>,
    pub crisis_line: String,
    /// Telephony webhook; when unset, dialing is left to the client
    pub dial_webhook: Option<String>,
    pub idle_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            flows_dir: None,
            crisis_line: DEFAULT_CRISIS_LINE.to_string(),
            dial_webhook: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port: non_empty("ACOLHE_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            flows_dir: non_empty("ACOLHE_FLOWS_DIR").map(PathBuf::from),
            crisis_line: non_empty("ACOLHE_CRISIS_LINE")
                .unwrap_or_else(|| DEFAULT_CRISIS_LINE.to_string()),
            dial_webhook: non_empty("ACOLHE_DIAL_WEBHOOK"),
            idle_timeout: non_empty("ACOLHE_IDLE_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(DEFAULT_IDLE_TIMEOUT, Duration::from_secs),
        }
    }
}
