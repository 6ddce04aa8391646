//! Marker file recording that a panel was live at shutdown

use anyhow::{Context, Result};
use std::path::PathBuf;

const MARKER_FILE: &str = "panel-open";

/// Presence of the file means the next start should revive the panel
#[derive(Debug, Clone)]
pub struct RevivalMarker {
    path: PathBuf,
}

impl RevivalMarker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Marker under the user's state directory (cache directory as fallback)
    pub fn in_state_dir() -> Option<Self> {
        dirs::state_dir()
            .or_else(dirs::cache_dir)
            .map(|dir| Self::new(dir.join("ratewatch").join(MARKER_FILE)))
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Write the marker, creating its directory if needed
    pub fn record(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create state directory: {:?}", parent))?;
        }
        let stamp = chrono::Utc::now().to_rfc3339();
        std::fs::write(&self.path, stamp)
            .with_context(|| format!("Failed to write revival marker: {:?}", self.path))
    }

    /// Remove the marker; a missing file is not an error
    pub fn clear(&self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("Failed to remove revival marker {:?}: {}", self.path, e),
        }
    }
}
