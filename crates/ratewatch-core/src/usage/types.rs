//! Rate-limit snapshot types produced by a [`SnapshotSource`](super::SnapshotSource).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One tracked usage period (the 5-hour session window or the weekly window)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageWindow {
    /// How much of the window's wall-clock duration has elapsed (0-100)
    pub time_percent: f64,
    /// How much of the window's quota has been consumed (0-100)
    pub used_percent: f64,
    /// When the window resets
    pub reset_time: DateTime<Utc>,
    /// Window length in minutes, when the log reports it
    pub window_minutes: Option<u64>,
    /// The reset time has already passed; the numbers above are stale.
    ///
    /// Stale values are kept for diagnostics but never displayed.
    pub outdated: bool,
}

/// Token counters as reported by the agent session log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenCount {
    pub input_tokens: u64,
    pub cached_input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_output_tokens: u64,
    pub total_tokens: u64,
}

/// One immutable sample of rate-limit state.
///
/// Built fresh for every update cycle and dropped after rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateLimitSnapshot {
    /// Short-duration session window (5 hours)
    pub primary: Option<UsageWindow>,
    /// Long-duration aggregate window (weekly)
    pub secondary: Option<UsageWindow>,
    /// Cumulative usage for the session
    pub total_usage: TokenCount,
    /// Usage of the most recent turn
    pub last_usage: TokenCount,
    /// Reference time the derived percentages were computed against
    pub current_time: DateTime<Utc>,
}

/// Outcome of a data-acquisition attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult {
    pub found: bool,
    pub data: Option<RateLimitSnapshot>,
    pub error: Option<String>,
}

impl FetchResult {
    /// A successful fetch carrying a snapshot
    pub fn found(data: RateLimitSnapshot) -> Self {
        Self {
            found: true,
            data: Some(data),
            error: None,
        }
    }

    /// No usable data, with a human-readable reason
    pub fn not_found(reason: impl Into<String>) -> Self {
        Self {
            found: false,
            data: None,
            error: Some(reason.into()),
        }
    }

    /// The snapshot, only when `found` is set and data is present
    pub fn into_snapshot(self) -> Result<RateLimitSnapshot, Option<String>> {
        match (self.found, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self.error),
        }
    }
}

/// Errors raised while acquiring usage data
#[derive(Debug, Error)]
pub enum UsageError {
    /// Reading a session log failed
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A rate-limit event was present but malformed
    #[error("malformed rate limit event: {0}")]
    Parse(String),

    /// No sessions directory could be determined
    #[error("no sessions directory configured and no home directory found")]
    NoSessionsDir,

    /// The blocking scan task panicked or was cancelled
    #[error("session scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> RateLimitSnapshot {
        RateLimitSnapshot {
            primary: None,
            secondary: None,
            total_usage: TokenCount::default(),
            last_usage: TokenCount::default(),
            current_time: Utc::now(),
        }
    }

    #[test]
    fn test_found_yields_snapshot() {
        let data = snapshot();
        let result = FetchResult::found(data.clone());
        assert_eq!(result.into_snapshot(), Ok(data));
    }

    #[test]
    fn test_found_without_data_is_error_path() {
        let result = FetchResult {
            found: true,
            data: None,
            error: None,
        };
        assert_eq!(result.into_snapshot(), Err(None));
    }

    #[test]
    fn test_not_found_with_data_is_error_path() {
        let result = FetchResult {
            found: false,
            data: Some(snapshot()),
            error: Some("stale".to_string()),
        };
        assert_eq!(result.into_snapshot(), Err(Some("stale".to_string())));
    }
}
