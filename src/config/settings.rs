use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use ratewatch_core::config::{
    ColorSettings, ConfigProvider, PanelConfig, DEFAULT_AUTO_REFRESH_SECS,
};

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Rate-limit dashboard for AI coding agent sessions")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Port for the dashboard server
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory containing agent session logs
    #[arg(short, long)]
    pub sessions_dir: Option<PathBuf>,

    /// Do not reopen a panel that was live before the last shutdown
    #[arg(long)]
    pub no_restore: bool,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Session log directory (default: ~/.codex/sessions)
    #[serde(default)]
    pub sessions_dir: Option<PathBuf>,

    /// Number of newest session logs searched for rate-limit events
    #[serde(default = "default_max_session_files")]
    pub max_session_files: usize,

    /// Dashboard colors and thresholds
    #[serde(default)]
    pub color: ColorSettings,

    /// Panel behavior
    #[serde(default)]
    pub panel: PanelSettings,

    /// Web server settings
    #[serde(default)]
    pub web: WebSettings,
}

fn default_max_session_files() -> usize {
    5
}

/// Panel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelSettings {
    /// Seconds between automatic refreshes (0 disables)
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh_secs: u64,

    /// Reopen the panel on startup if it was live at shutdown
    #[serde(default = "default_restore_on_start")]
    pub restore_on_start: bool,
}

fn default_auto_refresh() -> u64 {
    DEFAULT_AUTO_REFRESH_SECS
}

fn default_restore_on_start() -> bool {
    true
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            auto_refresh_secs: default_auto_refresh(),
            restore_on_start: default_restore_on_start(),
        }
    }
}

/// Web server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSettings {
    /// Bind address
    #[serde(default = "default_web_host")]
    pub host: String,

    /// Web server port
    #[serde(default = "default_web_port")]
    pub port: u16,
}

fn default_web_host() -> String {
    "127.0.0.1".to_string()
}

fn default_web_port() -> u16 {
    9877
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sessions_dir: None,
            max_session_files: default_max_session_files(),
            color: ColorSettings::default(),
            panel: PanelSettings::default(),
            web: WebSettings::default(),
        }
    }
}

impl Settings {
    /// Find the config file: the custom path if it exists, else the default locations
    pub fn locate(path: Option<&PathBuf>) -> Option<PathBuf> {
        if let Some(p) = path {
            if p.exists() {
                return Some(p.clone());
            }
        }

        let default_paths = [
            dirs::config_dir().map(|p| p.join("ratewatch/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/ratewatch/config.toml")),
            dirs::home_dir().map(|p| p.join(".ratewatch.toml")),
        ];

        default_paths.into_iter().flatten().find(|p| p.exists())
    }

    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        match Self::locate(path) {
            Some(p) => Self::load_file(&p),
            None => Ok(Self::default()),
        }
    }

    /// Load and validate one config file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let mut settings: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        settings.validate();
        Ok(settings)
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(port) = cli.port {
            self.web.port = port;
        }
        if let Some(dir) = &cli.sessions_dir {
            self.sessions_dir = Some(dir.clone());
        }
        if cli.no_restore {
            self.panel.restore_on_start = false;
        }
    }

    /// Validate and normalize settings values
    ///
    /// Keeps thresholds within 0-100 and auto-refresh from hammering the logs.
    pub fn validate(&mut self) {
        const MIN_AUTO_REFRESH_SECS: u64 = 5;
        const MAX_PERCENT: u8 = 100;

        if self.panel.auto_refresh_secs != 0 && self.panel.auto_refresh_secs < MIN_AUTO_REFRESH_SECS
        {
            self.panel.auto_refresh_secs = MIN_AUTO_REFRESH_SECS;
        }
        self.color.warning_threshold = self.color.warning_threshold.min(MAX_PERCENT);
        self.color.critical_threshold = self.color.critical_threshold.min(MAX_PERCENT);
        if self.max_session_files == 0 {
            self.max_session_files = default_max_session_files();
        }
    }

    /// The slice of settings the panel reads on each update
    pub fn panel_config(&self) -> PanelConfig {
        PanelConfig {
            color: self.color.clone(),
            auto_refresh_secs: self.panel.auto_refresh_secs,
        }
    }
}

/// Re-reads the config file on every poll so edits apply on the next refresh.
///
/// Falls back to the startup settings when the file is missing or invalid.
pub struct FileConfigProvider {
    path: Option<PathBuf>,
    fallback: Settings,
}

impl FileConfigProvider {
    pub fn new(path: Option<PathBuf>, fallback: Settings) -> Self {
        Self { path, fallback }
    }
}

impl ConfigProvider for FileConfigProvider {
    fn panel_config(&self) -> PanelConfig {
        let Some(path) = &self.path else {
            return self.fallback.panel_config();
        };
        match Settings::load_file(path) {
            Ok(settings) => settings.panel_config(),
            Err(e) => {
                warn!("Using startup settings: {:#}", e);
                self.fallback.panel_config()
            }
        }
    }
}
