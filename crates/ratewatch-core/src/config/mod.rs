//! Dashboard configuration surface.
//!
//! Raw values come from the user's settings file; [`ColorSettings::resolve`]
//! is the single point where they are sanitized before reaching the renderer.

use serde::{Deserialize, Serialize};

use crate::render::{sanitize_color, SanitizedColor};

/// Default fill color for the warning tier
pub const DEFAULT_WARNING_COLOR: &str = "#f3d898";
/// Default fill color for the critical tier
pub const DEFAULT_CRITICAL_COLOR: &str = "#eca7a7";
/// Default warning threshold (percent)
pub const DEFAULT_WARNING_THRESHOLD: u8 = 70;
/// Default critical threshold (percent)
pub const DEFAULT_CRITICAL_THRESHOLD: u8 = 90;
/// Default auto-refresh period in seconds
pub const DEFAULT_AUTO_REFRESH_SECS: u64 = 60;

/// `[color]` table of the settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSettings {
    /// Fill color for usage at or above the warning threshold (unsanitized)
    #[serde(default)]
    pub warning_color: Option<String>,

    /// Fill color for usage at or above the critical threshold (unsanitized)
    #[serde(default)]
    pub critical_color: Option<String>,

    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: u8,

    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: u8,
}

fn default_warning_threshold() -> u8 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_critical_threshold() -> u8 {
    DEFAULT_CRITICAL_THRESHOLD
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            warning_color: None,
            critical_color: None,
            warning_threshold: default_warning_threshold(),
            critical_threshold: default_critical_threshold(),
        }
    }
}

impl ColorSettings {
    /// Sanitize colors and normalize thresholds for one render cycle
    pub fn resolve(&self) -> DashboardStyle {
        DashboardStyle {
            warning_color: sanitize_color(self.warning_color.as_deref(), DEFAULT_WARNING_COLOR),
            critical_color: sanitize_color(
                self.critical_color.as_deref(),
                DEFAULT_CRITICAL_COLOR,
            ),
            thresholds: Thresholds::new(self.warning_threshold, self.critical_threshold),
        }
    }
}

/// Usage percentages at which a meter changes tier.
///
/// Both values are capped at 100; their relative order is passed through as
/// configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Thresholds {
    pub warning: u8,
    pub critical: u8,
}

impl Thresholds {
    pub fn new(warning: u8, critical: u8) -> Self {
        Self {
            warning: warning.min(100),
            critical: critical.min(100),
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(DEFAULT_WARNING_THRESHOLD, DEFAULT_CRITICAL_THRESHOLD)
    }
}

/// Validated styling inputs for the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardStyle {
    pub warning_color: SanitizedColor,
    pub critical_color: SanitizedColor,
    pub thresholds: Thresholds,
}

impl Default for DashboardStyle {
    fn default() -> Self {
        ColorSettings::default().resolve()
    }
}

/// Everything the panel reads from configuration on an update cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub color: ColorSettings,

    /// Seconds between automatic refreshes (0 disables)
    #[serde(default = "default_auto_refresh_secs")]
    pub auto_refresh_secs: u64,
}

fn default_auto_refresh_secs() -> u64 {
    DEFAULT_AUTO_REFRESH_SECS
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            color: ColorSettings::default(),
            auto_refresh_secs: default_auto_refresh_secs(),
        }
    }
}

/// Source of the current [`PanelConfig`], polled at the start of every update
pub trait ConfigProvider: Send + Sync {
    fn panel_config(&self) -> PanelConfig;
}

/// Fixed configuration (tests, embedding)
#[derive(Debug, Clone, Default)]
pub struct StaticConfig(pub PanelConfig);

impl ConfigProvider for StaticConfig {
    fn panel_config(&self) -> PanelConfig {
        self.0.clone()
    }
}
