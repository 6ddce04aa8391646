//! Percentage normalization and severity tiers for usage meters.

use std::fmt;

use serde::Serialize;

use crate::config::Thresholds;

/// Clamp a percentage into `[0, 100]`; NaN and infinities become 0.
pub fn clamp_percent(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 100.0)
}

/// A percentage already clamped into `[0, 100]`; displays with one decimal
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percent(f64);

impl Percent {
    pub const ZERO: Percent = Percent(0.0);

    pub fn new(value: f64) -> Self {
        Self(clamp_percent(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Severity tier of a usage meter, used as its CSS class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageTier {
    Low,
    Medium,
    High,
    /// Data is stale; rendered neutral
    Outdated,
}

impl UsageTier {
    /// CSS class name for the tier
    pub fn class_name(self) -> &'static str {
        match self {
            UsageTier::Low => "low",
            UsageTier::Medium => "medium",
            UsageTier::High => "high",
            UsageTier::Outdated => "outdated",
        }
    }
}

impl fmt::Display for UsageTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// Map a clamped percentage to a tier.
///
/// `outdated` always wins. The critical check runs before the warning check,
/// so with `warning > critical` any value at or above `critical` is `High`.
/// The relative order of the two thresholds is not validated.
pub fn classify_usage(percent: f64, outdated: bool, thresholds: &Thresholds) -> UsageTier {
    if outdated {
        UsageTier::Outdated
    } else if percent >= f64::from(thresholds.critical) {
        UsageTier::High
    } else if percent >= f64::from(thresholds.warning) {
        UsageTier::Medium
    } else {
        UsageTier::Low
    }
}
