//! Dashboard document generation.
//!
//! Pure functions of their arguments. All inline CSS and script carry the
//! panel nonce, and the only per-render numbers (bar widths) live inside the
//! nonce-scoped `<style>` block, bound to fixed element ids.

use chrono::{DateTime, Local, Utc};

use super::markup::Markup;
use super::meter::{classify_usage, Percent, UsageTier};
use super::nonce::Nonce;
use crate::config::DashboardStyle;
use crate::usage::{format_tokens, RateLimitSnapshot, UsageWindow};

/// Page title shared by the dashboard and the error page
const TITLE: &str = "Rate Limits";

/// Shown instead of numbers for stale windows
const NOT_AVAILABLE: &str = "N/A";

const BASE_CSS: &str = r#"
:root { color-scheme: light dark; }
body { font-family: system-ui, sans-serif; margin: 0; padding: 16px; }
main { max-width: 560px; }
header { display: flex; align-items: center; justify-content: space-between; }
h1 { font-size: 1.2em; margin: 0 0 12px; }
h2 { font-size: 1em; margin: 16px 0 8px; }
.row, .token-row { display: flex; align-items: center; gap: 8px; margin: 4px 0; }
.label { width: 4em; opacity: 0.8; }
.value { width: 4.5em; text-align: right; font-variant-numeric: tabular-nums; }
.bar { flex: 1; height: 10px; border-radius: 5px; background: rgba(128, 128, 128, 0.25); overflow: hidden; }
.fill { height: 100%; width: 0; border-radius: 5px; }
.fill.time { background: #9ab4d8; }
.fill.low { background: #a8d5a2; }
.fill.outdated { background: #9e9e9e; }
.reset, footer { font-size: 0.85em; opacity: 0.7; }
.token-row .value { width: auto; text-align: left; }
.error { border-left: 3px solid #eca7a7; padding-left: 12px; }
button { cursor: pointer; }
"#;

/// Host-provided page parameters
#[derive(Debug, Clone, Copy)]
pub struct PageContext<'a> {
    /// Nonce of the live panel instance
    pub nonce: &'a Nonce,
    /// CSP source expression for the surface's own resources (e.g. `'self'`)
    pub csp_source: &'static str,
    /// Where the page posts `{ "command": ... }` messages
    pub message_endpoint: &'static str,
    /// Page reload period in seconds (0 disables)
    pub auto_refresh_secs: u64,
}

/// Content security policy for a panel document.
///
/// Nothing loads by default; images and styles only from the surface itself,
/// styles and scripts additionally (scripts exclusively) via the nonce.
pub fn content_security_policy(page: &PageContext<'_>) -> String {
    let source = Markup::value(&page.csp_source);
    let nonce = Markup::value(page.nonce);
    format!(
        "default-src 'none'; img-src {source}; style-src {source} 'nonce-{nonce}'; \
         script-src 'nonce-{nonce}'; connect-src {source};"
    )
}

/// Render the dashboard for a snapshot
pub fn render_dashboard(
    snapshot: &RateLimitSnapshot,
    style: &DashboardStyle,
    page: &PageContext<'_>,
) -> String {
    let windows = [
        ("primary", "5-Hour Session", snapshot.primary.as_ref()),
        ("secondary", "Weekly", snapshot.secondary.as_ref()),
    ];

    let mut width_rules = String::new();
    let mut sections = String::new();
    for (id, heading, window) in windows {
        let Some(window) = window else {
            continue;
        };
        let view = WindowView::new(window, snapshot.current_time, style);
        width_rules.push_str(&view.width_rules(id));
        sections.push_str(&view.section(id, heading));
    }

    let css = format!(
        "{base}.fill.medium {{ background: {warning}; }}\n.fill.high {{ background: {critical}; }}\n{width_rules}",
        base = BASE_CSS,
        warning = Markup::value(&style.warning_color),
        critical = Markup::value(&style.critical_color),
    );

    let body = format!(
        r#"<header><h1>{title}</h1><button id="refresh" type="button">Refresh</button></header>
{sections}<section class="tokens" id="tokens">
  <h2>Token Usage</h2>
  <div class="token-row"><span class="label">Total</span><span class="value">{total}</span></div>
  <div class="token-row"><span class="label">Last</span><span class="value">{last}</span></div>
</section>
<footer>Updated {updated}</footer>"#,
        title = Markup::value(&TITLE),
        total = Markup::pre_safe(format_tokens(&snapshot.total_usage)),
        last = Markup::pre_safe(format_tokens(&snapshot.last_usage)),
        updated = Markup::text(
            &snapshot
                .current_time
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        ),
    );

    document(page, &css, &body)
}

/// Render the error page; `message` is arbitrary text and is escaped
pub fn render_error(message: &str, page: &PageContext<'_>) -> String {
    let body = format!(
        r#"<header><h1>{title}</h1></header>
<div class="error">
  <h2>Unable to load rate limits</h2>
  <p id="error-message">{message}</p>
  <button id="refresh" type="button">Retry</button>
</div>"#,
        title = Markup::value(&TITLE),
        message = Markup::text(message),
    );
    document(page, BASE_CSS, &body)
}

/// Display state of one window, derived once per render
struct WindowView {
    /// `None` when the window is outdated
    time: Option<Percent>,
    usage: Option<Percent>,
    tier: UsageTier,
    reset: Markup,
}

impl WindowView {
    fn new(window: &UsageWindow, now: DateTime<Utc>, style: &DashboardStyle) -> Self {
        if window.outdated {
            return Self {
                time: None,
                usage: None,
                tier: UsageTier::Outdated,
                reset: Markup::value(&NOT_AVAILABLE),
            };
        }

        let usage = Percent::new(window.used_percent);
        Self {
            time: Some(Percent::new(window.time_percent)),
            usage: Some(usage),
            tier: classify_usage(usage.value(), false, &style.thresholds),
            reset: Markup::text(&format_reset(window.reset_time, now)),
        }
    }

    fn width_rules(&self, id: &'static str) -> String {
        let time = Markup::value(&self.time.unwrap_or(Percent::ZERO));
        let usage = Markup::value(&self.usage.unwrap_or(Percent::ZERO));
        format!("#{id}-time-fill {{ width: {time}%; }}\n#{id}-usage-fill {{ width: {usage}%; }}\n")
    }

    fn section(&self, id: &'static str, heading: &'static str) -> String {
        format!(
            r#"<section class="window" id="{id}">
  <h2>{heading}</h2>
  <div class="row"><span class="label">Time</span><div class="bar"><div class="fill time" id="{id}-time-fill"></div></div><span class="value">{time}</span></div>
  <div class="row"><span class="label">Usage</span><div class="bar"><div class="fill {tier}" id="{id}-usage-fill"></div></div><span class="value">{usage}</span></div>
  <p class="reset">Resets {reset}</p>
</section>
"#,
            time = percent_label(self.time),
            usage = percent_label(self.usage),
            tier = Markup::value(&self.tier),
            reset = self.reset,
        )
    }
}

fn percent_label(value: Option<Percent>) -> String {
    match value {
        Some(p) => format!("{}%", Markup::value(&p)),
        None => NOT_AVAILABLE.to_string(),
    }
}

/// "in 2h 30m (Mon 14:30)" relative to the snapshot time
fn format_reset(reset: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = reset.signed_duration_since(now);
    let local = reset.with_timezone(&Local).format("%a %H:%M");

    let relative = if diff.num_minutes() <= 0 {
        "any moment".to_string()
    } else if diff.num_days() > 0 {
        format!("in {}d {}h", diff.num_days(), diff.num_hours() % 24)
    } else if diff.num_hours() > 0 {
        format!("in {}h {}m", diff.num_hours(), diff.num_minutes() % 60)
    } else {
        format!("in {}m", diff.num_minutes())
    };
    format!("{} ({})", relative, local)
}

/// Wrap body markup in the shared document shell
fn document(page: &PageContext<'_>, css: &str, body: &str) -> String {
    let nonce = Markup::value(page.nonce);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta http-equiv="Content-Security-Policy" content="{csp}">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style nonce="{nonce}">{css}</style>
</head>
<body>
<main>
{body}
</main>
<script nonce="{nonce}">
(() => {{
  const post = (message) => fetch("{endpoint}", {{
    method: "POST",
    headers: {{ "Content-Type": "application/json" }},
    body: JSON.stringify(message),
  }}).finally(() => location.reload());
  const refresh = document.getElementById("refresh");
  if (refresh) refresh.addEventListener("click", () => post({{ command: "refresh" }}));
  const period = {period_ms};
  if (period > 0) setTimeout(() => location.reload(), period);
}})();
</script>
</body>
</html>
"#,
        csp = content_security_policy(page),
        title = Markup::value(&TITLE),
        endpoint = Markup::value(&page.message_endpoint),
        period_ms = Markup::value(&page.auto_refresh_secs.saturating_mul(1000)),
    )
}
