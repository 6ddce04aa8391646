//! Parse rate-limit events out of agent session logs (JSON lines).

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::Deserialize;

use super::types::{RateLimitSnapshot, TokenCount, UsageWindow};

/// Session window length used when the log omits `window_minutes`
const DEFAULT_PRIMARY_WINDOW_MINUTES: u64 = 5 * 60;
/// Weekly window length used when the log omits `window_minutes`
const DEFAULT_SECONDARY_WINDOW_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Deserialize)]
struct LogLine {
    timestamp: Option<DateTime<Utc>>,
    payload: Option<EventPayload>,
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(rename = "type")]
    kind: String,
    info: Option<TokenInfo>,
    rate_limits: Option<RawRateLimits>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenInfo {
    total_token_usage: TokenCount,
    last_token_usage: TokenCount,
}

#[derive(Debug, Deserialize)]
struct RawRateLimits {
    primary: Option<RawWindow>,
    secondary: Option<RawWindow>,
}

#[derive(Debug, Deserialize)]
struct RawWindow {
    used_percent: f64,
    window_minutes: Option<u64>,
    /// Absolute reset time in unix seconds (newer logs)
    resets_at: Option<i64>,
    /// Reset time relative to the event timestamp (older logs)
    resets_in_seconds: Option<i64>,
}

/// Find the most recent `token_count` event with rate limits in a session log.
///
/// Expected line shape:
/// ```text
/// {"timestamp":"2025-09-01T10:00:00Z","type":"event_msg","payload":{"type":"token_count",
///  "info":{"total_token_usage":{...},"last_token_usage":{...}},
///  "rate_limits":{"primary":{"used_percent":12.0,"window_minutes":300,"resets_in_seconds":3600},
///                 "secondary":{...}}}}
/// ```
///
/// Lines that are not JSON or not rate-limit events are skipped, so a partially
/// written trailing line does not hide an earlier complete event.
pub fn parse_session_log(text: &str, now: DateTime<Utc>) -> Option<RateLimitSnapshot> {
    text.lines()
        .rev()
        .filter(|line| line.contains("\"token_count\""))
        .filter_map(|line| serde_json::from_str::<LogLine>(line).ok())
        .find_map(|line| snapshot_from_line(line, now))
}

fn snapshot_from_line(line: LogLine, now: DateTime<Utc>) -> Option<RateLimitSnapshot> {
    let payload = line.payload?;
    if payload.kind != "token_count" {
        return None;
    }
    let limits = payload.rate_limits?;
    let event_time = line.timestamp.unwrap_or(now);
    let info = payload.info.unwrap_or_default();

    Some(RateLimitSnapshot {
        primary: optional_window(
            limits.primary,
            DEFAULT_PRIMARY_WINDOW_MINUTES,
            event_time,
            now,
        )?,
        secondary: optional_window(
            limits.secondary,
            DEFAULT_SECONDARY_WINDOW_MINUTES,
            event_time,
            now,
        )?,
        total_usage: info.total_token_usage,
        last_usage: info.last_token_usage,
        current_time: now,
    })
}

/// Outer `None`: a value is out of range and the whole event is unusable.
/// Inner `None`: the window is absent or carries no reset time.
fn optional_window(
    raw: Option<RawWindow>,
    default_minutes: u64,
    event_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<Option<UsageWindow>> {
    match raw {
        Some(w) if w.resets_at.is_some() || w.resets_in_seconds.is_some() => {
            let window = build_window(&w, default_minutes, event_time, now);
            if window.is_none() {
                tracing::debug!("Rate limit window out of range, skipping event");
            }
            window.map(Some)
        }
        Some(_) => {
            tracing::debug!("Rate limit window without reset time, skipping");
            Some(None)
        }
        None => Some(None),
    }
}

/// Derive reset time, elapsed-time percentage and staleness for one window
fn build_window(
    raw: &RawWindow,
    default_minutes: u64,
    event_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<UsageWindow> {
    let reset_time = match raw.resets_at {
        Some(at) => Utc.timestamp_opt(at, 0).single()?,
        None => {
            let delta = Duration::try_seconds(raw.resets_in_seconds?)?;
            event_time.checked_add_signed(delta)?
        }
    };

    let minutes = raw.window_minutes.unwrap_or(default_minutes);
    let time_percent = if minutes == 0 {
        0.0
    } else {
        let window_secs = minutes.checked_mul(60)? as f64;
        let remaining_secs = (reset_time - now).num_seconds() as f64;
        (window_secs - remaining_secs) / window_secs * 100.0
    };

    Some(UsageWindow {
        time_percent,
        used_percent: raw.used_percent,
        reset_time,
        window_minutes: raw.window_minutes,
        outdated: reset_time <= now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_relative_reset() {
        let text = r#"{"timestamp":"2025-09-01T10:00:00Z","type":"session_meta","payload":{"type":"session_meta"}}
{"timestamp":"2025-09-01T10:00:00Z","type":"event_msg","payload":{"type":"token_count","info":{"total_token_usage":{"input_tokens":1200,"cached_input_tokens":200,"output_tokens":300,"reasoning_output_tokens":50,"total_tokens":1500},"last_token_usage":{"input_tokens":100,"output_tokens":20,"total_tokens":120}},"rate_limits":{"primary":{"used_percent":42.5,"window_minutes":300,"resets_in_seconds":9000},"secondary":{"used_percent":10.0,"window_minutes":10080,"resets_in_seconds":302400}}}}
"#;
        let now = at("2025-09-01T10:00:00Z");
        let snapshot = parse_session_log(text, now).unwrap();

        let primary = snapshot.primary.unwrap();
        assert_eq!(primary.used_percent, 42.5);
        assert_eq!(primary.reset_time, at("2025-09-01T12:30:00Z"));
        assert_eq!(primary.time_percent, 50.0);
        assert!(!primary.outdated);

        let secondary = snapshot.secondary.unwrap();
        assert_eq!(secondary.time_percent, 50.0);

        assert_eq!(snapshot.total_usage.total_tokens, 1500);
        assert_eq!(snapshot.total_usage.cached_input_tokens, 200);
        assert_eq!(snapshot.last_usage.total_tokens, 120);
        assert_eq!(snapshot.last_usage.cached_input_tokens, 0);
    }

    #[test]
    fn test_parse_absolute_reset_marks_outdated() {
        // resets_at = 2025-09-01T09:00:00Z, an hour before "now"
        let text = r#"{"timestamp":"2025-09-01T08:00:00Z","payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":80.0,"window_minutes":300,"resets_at":1756717200}}}}"#;
        let now = at("2025-09-01T10:00:00Z");
        let snapshot = parse_session_log(text, now).unwrap();

        let primary = snapshot.primary.unwrap();
        assert!(primary.outdated);
        assert_eq!(primary.used_percent, 80.0);
        assert!(snapshot.secondary.is_none());
    }

    #[test]
    fn test_latest_event_wins_and_truncated_line_skipped() {
        let text = r#"{"timestamp":"2025-09-01T10:00:00Z","payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":10.0,"resets_in_seconds":60}}}}
{"timestamp":"2025-09-01T10:05:00Z","payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":20.0,"resets_in_seconds":60}}}}
{"timestamp":"2025-09-01T10:06:00Z","payload":{"type":"token_count","rate_lim"#;
        let snapshot = parse_session_log(text, at("2025-09-01T10:05:00Z")).unwrap();
        assert_eq!(snapshot.primary.unwrap().used_percent, 20.0);
    }

    #[test]
    fn test_token_count_without_rate_limits_is_skipped() {
        let text = r#"{"timestamp":"2025-09-01T10:00:00Z","payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":33.0,"resets_in_seconds":60}}}}
{"timestamp":"2025-09-01T10:01:00Z","payload":{"type":"token_count","info":null}}"#;
        let snapshot = parse_session_log(text, at("2025-09-01T10:01:00Z")).unwrap();
        assert_eq!(snapshot.primary.unwrap().used_percent, 33.0);
    }

    #[test]
    fn test_no_events() {
        let text = r#"{"timestamp":"2025-09-01T10:00:00Z","payload":{"type":"agent_message","message":"hi"}}"#;
        assert!(parse_session_log(text, Utc::now()).is_none());
        assert!(parse_session_log("", Utc::now()).is_none());
    }

    #[test]
    fn test_window_without_reset_is_dropped() {
        let text = r#"{"payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":5.0},"secondary":{"used_percent":1.0,"resets_in_seconds":100}}}}"#;
        let snapshot = parse_session_log(text, Utc::now()).unwrap();
        assert!(snapshot.primary.is_none());
        assert!(snapshot.secondary.is_some());
    }

    #[test]
    fn test_out_of_range_reset_skips_to_older_event() {
        let text = r#"{"timestamp":"2025-09-01T10:00:00Z","payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":15.0,"resets_in_seconds":600}}}}
{"timestamp":"2025-09-01T10:01:00Z","payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":99.0,"resets_in_seconds":9223372036854775807}}}}"#;
        let snapshot = parse_session_log(text, at("2025-09-01T10:01:00Z")).unwrap();
        assert_eq!(snapshot.primary.unwrap().used_percent, 15.0);
    }

    #[test]
    fn test_oversized_window_minutes_skips_event() {
        let text = r#"{"timestamp":"2025-09-01T10:00:00Z","payload":{"type":"token_count","rate_limits":{"primary":{"used_percent":5.0,"window_minutes":18446744073709551615,"resets_in_seconds":60}}}}"#;
        assert!(parse_session_log(text, at("2025-09-01T10:00:00Z")).is_none());

        let text = r#"{"payload":{"type":"token_count","rate_limits":{"secondary":{"used_percent":5.0,"resets_at":9223372036854775807}}}}"#;
        assert!(parse_session_log(text, Utc::now()).is_none());
    }
}
