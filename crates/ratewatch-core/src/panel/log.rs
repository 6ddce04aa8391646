//! Logging collaborator used by the panel manager.

use tracing::{info, warn};

/// Fire-and-forget log sink; implementations must not panic.
///
/// `force_flush` marks entries that should surface immediately (failures).
pub trait PanelLog: Send + Sync {
    fn log(&self, message: &str, force_flush: bool);
}

/// Forwards entries to `tracing`: `info` normally, `warn` when flushed
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl PanelLog for TracingLog {
    fn log(&self, message: &str, force_flush: bool) {
        if force_flush {
            warn!("{}", message);
        } else {
            info!("{}", message);
        }
    }
}
