//! Glue between HTTP events and the panel manager

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::warn;

use ratewatch_core::config::ConfigProvider;
use ratewatch_core::panel::{PanelLog, PanelManager, ShowOutcome, SurfaceMessage};
use ratewatch_core::usage::SnapshotSource;

use super::revival::RevivalMarker;
use super::surface::{SharedView, WebSurface};

type SharedManager = Arc<Mutex<PanelManager<WebSurface>>>;

/// Owns the panel manager and the per-panel resources the server attaches
/// to it (refresh ticker, revival marker).
pub struct PanelHost {
    manager: SharedManager,
    view: SharedView,
    config: Arc<dyn ConfigProvider>,
    marker: Option<RevivalMarker>,
}

impl PanelHost {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        config: Arc<dyn ConfigProvider>,
        log: Arc<dyn PanelLog>,
        marker: Option<RevivalMarker>,
    ) -> Self {
        let manager = PanelManager::new(source, Arc::clone(&config), log);
        Self {
            manager: Arc::new(Mutex::new(manager)),
            view: SharedView::default(),
            config,
            marker,
        }
    }

    /// Whether the previous run left a live panel behind
    pub fn should_revive(&self) -> bool {
        self.marker.as_ref().is_some_and(RevivalMarker::exists)
    }

    /// Open command: create the panel or bring the live one forward
    pub async fn open(&self) -> ShowOutcome {
        let mut manager = self.manager.lock().await;
        let view = self.view.clone();
        let outcome = manager.request_show(|| WebSurface::new(view)).await;
        if outcome == ShowOutcome::Created {
            self.attach_resources(&mut manager);
        }
        outcome
    }

    /// Restore the panel that was live before the last shutdown
    pub async fn revive(&self) {
        let mut manager = self.manager.lock().await;
        manager
            .on_host_revival(WebSurface::new(self.view.clone()))
            .await;
        self.attach_resources(&mut manager);
    }

    pub async fn message(&self, message: SurfaceMessage) {
        self.manager.lock().await.on_message(message).await;
    }

    pub async fn visibility_changed(&self, visible: bool) {
        self.manager
            .lock()
            .await
            .on_visibility_changed(visible)
            .await;
    }

    /// Host close; `false` if nothing was live
    pub async fn close(&self) -> bool {
        self.manager.lock().await.dispose()
    }

    pub async fn is_live(&self) -> bool {
        self.manager.lock().await.is_live()
    }

    /// Document currently shown, if a panel has rendered one
    pub fn document(&self) -> Option<String> {
        self.view.read().html.clone()
    }

    fn attach_resources(&self, manager: &mut PanelManager<WebSurface>) {
        if let Some(marker) = &self.marker {
            match marker.record() {
                Ok(()) => {
                    let marker = marker.clone();
                    manager.register_cleanup(move || marker.clear());
                }
                Err(e) => warn!("Panel will not be revived after restart: {:#}", e),
            }
        }

        let view = self.view.clone();
        manager.register_cleanup(move || view.write().html = None);

        let ticker = tokio::spawn(run_ticker(
            Arc::clone(&self.manager),
            Arc::clone(&self.config),
        ));
        let abort = ticker.abort_handle();
        manager.register_cleanup(move || abort.abort());
    }
}

/// How often a disabled ticker checks whether auto refresh was turned on
const IDLE_RECHECK: Duration = Duration::from_secs(5);

/// Runs `update` every `auto_refresh_secs`, re-reading the period each cycle
/// so settings edits start, stop or retime it.
async fn run_ticker(manager: SharedManager, config: Arc<dyn ConfigProvider>) {
    loop {
        let secs = config.panel_config().auto_refresh_secs;
        if secs == 0 {
            tokio::time::sleep(IDLE_RECHECK).await;
            continue;
        }
        tokio::time::sleep(Duration::from_secs(secs)).await;
        manager.lock().await.update().await;
    }
}
