//! Data acquisition: locate the newest agent session log and read its rate limits.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Utc;
use futures_util::future::BoxFuture;
use tracing::{debug, info, warn};

use super::parser::parse_session_log;
use super::types::{FetchResult, UsageError};

/// How many of the newest log files are inspected before giving up
const DEFAULT_MAX_FILES: usize = 5;

/// Anything that can produce a [`FetchResult`] on demand.
///
/// `Err` is reserved for unexpected failures; "no data yet" is a
/// `FetchResult::not_found`.
pub trait SnapshotSource: Send + Sync {
    fn fetch_snapshot(&self) -> BoxFuture<'_, Result<FetchResult, UsageError>>;
}

/// Reads rate limits from JSONL session logs under a sessions directory
#[derive(Debug, Clone)]
pub struct SessionLogSource {
    sessions_dir: PathBuf,
    max_files: usize,
}

impl SessionLogSource {
    /// Create a source rooted at `sessions_dir`
    pub fn new(sessions_dir: impl Into<PathBuf>) -> Self {
        Self {
            sessions_dir: sessions_dir.into(),
            max_files: DEFAULT_MAX_FILES,
        }
    }

    /// Source for the default location (`~/.codex/sessions`)
    pub fn from_home() -> Result<Self, UsageError> {
        let home = dirs::home_dir().ok_or(UsageError::NoSessionsDir)?;
        Ok(Self::new(home.join(".codex").join("sessions")))
    }

    /// Limit how many recent log files are searched
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files.max(1);
        self
    }

    /// Directory being scanned
    pub fn sessions_dir(&self) -> &Path {
        &self.sessions_dir
    }

    /// Blocking scan, newest file first
    fn scan(&self) -> Result<FetchResult, UsageError> {
        if !self.sessions_dir.is_dir() {
            return Ok(FetchResult::not_found(format!(
                "Sessions directory not found: {}",
                self.sessions_dir.display()
            )));
        }

        let mut files = Vec::new();
        collect_logs(&self.sessions_dir, &mut files)?;
        if files.is_empty() {
            return Ok(FetchResult::not_found("No session logs found"));
        }
        files.sort_by(|a, b| b.1.cmp(&a.1));

        let now = Utc::now();
        for (path, _) in files.iter().take(self.max_files) {
            // Logs may be mid-write; a cut multi-byte tail must not hide earlier lines
            let bytes = match std::fs::read(path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Skipping unreadable session log {}: {}", path.display(), e);
                    continue;
                }
            };
            let text = String::from_utf8_lossy(&bytes);
            if let Some(snapshot) = parse_session_log(&text, now) {
                debug!("Rate limits read from {}", path.display());
                return Ok(FetchResult::found(snapshot));
            }
        }

        info!(
            "No rate limit events in the {} newest session logs",
            self.max_files.min(files.len())
        );
        Ok(FetchResult::not_found(
            "No rate limit data found in recent session logs",
        ))
    }
}

impl SnapshotSource for SessionLogSource {
    fn fetch_snapshot(&self) -> BoxFuture<'_, Result<FetchResult, UsageError>> {
        let source = self.clone();
        Box::pin(async move { tokio::task::spawn_blocking(move || source.scan()).await? })
    }
}

/// Recursively gather `*.jsonl` files with their modification times
fn collect_logs(dir: &Path, out: &mut Vec<(PathBuf, SystemTime)>) -> Result<(), UsageError> {
    let io_err = |source| UsageError::Io {
        path: dir.display().to_string(),
        source,
    };

    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if meta.is_dir() {
            collect_logs(&path, out)?;
        } else if path.extension().is_some_and(|ext| ext == "jsonl") {
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            out.push((path, modified));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    const EVENT: &str = r#"{"timestamp":"2025-09-01T10:00:00Z","payload":{"type":"token_count","info":{"total_token_usage":{"total_tokens":900}},"rate_limits":{"primary":{"used_percent":61.0,"window_minutes":300,"resets_in_seconds":600}}}}"#;

    fn touch_older(path: &Path, secs: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(secs))
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_dir_is_not_found() {
        let source = SessionLogSource::new("/nonexistent/ratewatch/sessions");
        let result = source.fetch_snapshot().await.unwrap();
        assert!(!result.found);
        assert!(result.error.unwrap().contains("not found"));
    }

    #[tokio::test]
    async fn test_empty_dir_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = SessionLogSource::new(dir.path())
            .fetch_snapshot()
            .await
            .unwrap();
        assert!(!result.found);
        assert_eq!(result.error.as_deref(), Some("No session logs found"));
    }

    #[tokio::test]
    async fn test_reads_nested_log() {
        let dir = tempfile::tempdir().unwrap();
        let day = dir.path().join("2025").join("09").join("01");
        fs::create_dir_all(&day).unwrap();
        fs::write(day.join("rollout-a.jsonl"), EVENT).unwrap();
        fs::write(day.join("notes.txt"), "ignored").unwrap();

        let result = SessionLogSource::new(dir.path())
            .fetch_snapshot()
            .await
            .unwrap();
        assert!(result.found);
        let snapshot = result.data.unwrap();
        assert_eq!(snapshot.primary.unwrap().used_percent, 61.0);
        assert_eq!(snapshot.total_usage.total_tokens, 900);
    }

    #[tokio::test]
    async fn test_falls_back_to_older_log() {
        let dir = tempfile::tempdir().unwrap();
        let older = dir.path().join("older.jsonl");
        let newer = dir.path().join("newer.jsonl");
        fs::write(&older, EVENT).unwrap();
        fs::write(&newer, r#"{"payload":{"type":"session_meta"}}"#).unwrap();
        touch_older(&older, 3600);

        let result = SessionLogSource::new(dir.path())
            .fetch_snapshot()
            .await
            .unwrap();
        assert!(result.found);
    }

    #[tokio::test]
    async fn test_max_files_limits_search() {
        let dir = tempfile::tempdir().unwrap();
        let older = dir.path().join("older.jsonl");
        let newer = dir.path().join("newer.jsonl");
        fs::write(&older, EVENT).unwrap();
        fs::write(&newer, "{}").unwrap();
        touch_older(&older, 3600);

        let result = SessionLogSource::new(dir.path())
            .with_max_files(1)
            .fetch_snapshot()
            .await
            .unwrap();
        assert!(!result.found);
    }

    #[tokio::test]
    async fn test_truncated_utf8_tail_keeps_earlier_event() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = EVENT.as_bytes().to_vec();
        bytes.extend_from_slice(b"\n{\"payload\":{\"type\":\"token_count\",\"note\":\"caf");
        bytes.push(0xC3);
        fs::write(dir.path().join("a.jsonl"), bytes).unwrap();

        let result = SessionLogSource::new(dir.path())
            .fetch_snapshot()
            .await
            .unwrap();
        assert!(result.found);
        assert_eq!(result.data.unwrap().primary.unwrap().used_percent, 61.0);
    }

    #[tokio::test]
    async fn test_out_of_range_event_does_not_fail_scan() {
        let dir = tempfile::tempdir().unwrap();
        let bad = r#"{"payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":1.0,"window_minutes":18446744073709551615,"resets_in_seconds":9223372036854775807}}}}"#;
        fs::write(dir.path().join("a.jsonl"), format!("{}\n{}\n", EVENT, bad)).unwrap();

        let result = SessionLogSource::new(dir.path())
            .fetch_snapshot()
            .await
            .unwrap();
        assert!(result.found);
        assert_eq!(result.data.unwrap().primary.unwrap().used_percent, 61.0);
    }
}
