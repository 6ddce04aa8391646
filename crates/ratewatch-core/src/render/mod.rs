//! Safe rendering of the dashboard document.
//!
//! Untrusted inputs enter through two doors only: configured colors
//! ([`sanitize_color`]) and free text ([`Markup::text`]). Everything else that
//! reaches the page is a clamped number, an enum class name, or the nonce.

pub mod html;
pub mod markup;
pub mod meter;
pub mod nonce;
pub mod sanitize;

pub use html::{content_security_policy, render_dashboard, render_error, PageContext};
pub use markup::{escape_html, Markup, PreValidated};
pub use meter::{clamp_percent, classify_usage, Percent, UsageTier};
pub use nonce::Nonce;
pub use sanitize::{sanitize_color, SanitizedColor, MAX_COLOR_LEN};
