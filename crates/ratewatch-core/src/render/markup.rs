//! Interpolation discipline for generated HTML.
//!
//! Every value spliced into a template goes through [`Markup`], built one of
//! two ways:
//! - [`Markup::text`] escapes arbitrary text (error messages, timestamps);
//! - [`Markup::value`] accepts only [`PreValidated`] types whose construction
//!   already guarantees a markup-safe rendering (sanitized colors, clamped
//!   percentages, tier class names, nonces, integers).

use std::fmt;

use super::meter::{Percent, UsageTier};
use super::nonce::Nonce;
use super::sanitize::SanitizedColor;

/// Escape `& < > " '` for use in element content or quoted attributes.
///
/// There is no unescape path: escaping twice double-escapes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

mod private {
    pub trait Sealed {}
}

/// Types whose `Display` output is safe to place in markup, CSS or script verbatim.
///
/// `&'static str` covers literals written into the binary (host endpoints, CSP sources).
pub trait PreValidated: fmt::Display + private::Sealed {}

macro_rules! pre_validated {
    ($($ty:ty),* $(,)?) => {
        $(
            impl private::Sealed for $ty {}
            impl PreValidated for $ty {}
        )*
    };
}

pre_validated!(SanitizedColor, Percent, UsageTier, Nonce, u64, &'static str);

/// A fragment that may be spliced into the generated document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Arbitrary text, escaped
    pub fn text(raw: &str) -> Self {
        Self(escape_html(raw))
    }

    /// A pre-validated value, rendered as-is
    pub fn value<T: PreValidated>(value: &T) -> Self {
        Self(value.to_string())
    }

    /// Output of a formatting collaborator whose contract excludes
    /// markup-significant characters (token counters).
    pub fn pre_safe(text: String) -> Self {
        debug_assert!(
            !text.contains(['<', '>', '&', '"', '\'']),
            "pre-safe text contains markup characters"
        );
        Self(text)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
