//! Allow-list validation for user-configured colors.
//!
//! Colors are the only free-form configuration values that reach generated
//! CSS. A value is accepted only if it matches one of three fixed grammars
//! (hex, `rgb()/rgba()`, `hsl()/hsla()`); numeric ranges are part of the
//! grammar, so an out-of-range channel never matches.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

/// Inputs longer than this (after trimming) are rejected outright
pub const MAX_COLOR_LEN: usize = 50;

/// 0-255, leading zeros allowed
const CHANNEL: &str = r"(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|0?[0-9]?[0-9])";
/// 0, a fraction below 1, or 1 / 1.0+
const ALPHA: &str = r"(?:0|0?\.[0-9]+|1(?:\.0+)?)";
/// 0-360, integer or decimal
const HUE: &str = r"(?:360(?:\.0+)?|3[0-5][0-9](?:\.[0-9]+)?|[12]?[0-9]?[0-9](?:\.[0-9]+)?)";
/// 0-100%, integer or decimal
const PERCENT: &str = r"(?:100(?:\.0+)?|[0-9]?[0-9](?:\.[0-9]+)?)%";

static HEX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap()
});

static RGB_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^rgba?\( *{c} *, *{c} *, *{c} *(?:, *{a} *)?\)$",
        c = CHANNEL,
        a = ALPHA
    ))
    .unwrap()
});

static HSL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^hsla?\( *{h} *, *{p} *, *{p} *(?:, *{a} *)?\)$",
        h = HUE,
        p = PERCENT,
        a = ALPHA
    ))
    .unwrap()
});

/// A color string that matched the allow-list, or a built-in fallback.
///
/// The only ways to obtain one are [`sanitize_color`] and [`SanitizedColor::fallback`],
/// so holding a `SanitizedColor` means the value is safe inside a CSS declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedColor(String);

impl SanitizedColor {
    /// Wrap a compile-time constant color
    pub fn fallback(color: &'static str) -> Self {
        Self(color.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a configured color, returning `fallback` on any mismatch.
///
/// Absent, empty, or over-long (> [`MAX_COLOR_LEN`] after trimming) inputs fall
/// back. Accepted values are returned trimmed but otherwise unchanged.
pub fn sanitize_color(input: Option<&str>, fallback: &'static str) -> SanitizedColor {
    let Some(trimmed) = input.map(str::trim) else {
        return SanitizedColor::fallback(fallback);
    };
    if trimmed.is_empty() || trimmed.len() > MAX_COLOR_LEN {
        return SanitizedColor::fallback(fallback);
    }

    if HEX_RE.is_match(trimmed) || RGB_RE.is_match(trimmed) || HSL_RE.is_match(trimmed) {
        SanitizedColor(trimmed.to_string())
    } else {
        tracing::debug!("Rejected color value, using fallback {}", fallback);
        SanitizedColor::fallback(fallback)
    }
}
