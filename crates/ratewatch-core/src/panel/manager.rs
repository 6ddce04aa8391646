//! Owner of the single live panel.
//!
//! All transitions go through named operations: [`PanelManager::request_show`],
//! [`PanelManager::on_host_revival`] and [`PanelManager::dispose`] replace or
//! clear the slot; everything else only re-renders the current instance.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;

use crate::config::ConfigProvider;
use crate::render::{render_dashboard, render_error, Nonce, PageContext};
use crate::usage::SnapshotSource;

use super::log::PanelLog;
use super::surface::{DisplaySurface, SurfaceMessage};

/// Rendered when the source reports no data and gives no reason
pub const DEFAULT_ERROR_MESSAGE: &str = "No rate limit data available";

/// Cleanup handles released when a panel is disposed
#[derive(Default)]
pub struct Disposables {
    handles: Vec<Box<dyn FnOnce() + Send>>,
}

impl Disposables {
    pub fn push(&mut self, handle: impl FnOnce() + Send + 'static) {
        self.handles.push(Box::new(handle));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Run every handle, most recently registered first
    fn release(self) {
        for handle in self.handles.into_iter().rev() {
            handle();
        }
    }
}

/// The live instance held in the slot
struct PanelInstance<S> {
    surface: S,
    nonce: Nonce,
    disposables: Disposables,
}

/// What [`PanelManager::request_show`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowOutcome {
    /// A new instance was constructed
    Created,
    /// The existing instance was re-focused
    Revealed,
}

/// Manages the one dashboard surface and its refresh cycle.
///
/// Operations take `&mut self`; hosts share the manager behind an async mutex,
/// which serializes message delivery per panel.
pub struct PanelManager<S: DisplaySurface> {
    slot: Option<PanelInstance<S>>,
    source: Arc<dyn SnapshotSource>,
    config: Arc<dyn ConfigProvider>,
    log: Arc<dyn PanelLog>,
}

impl<S: DisplaySurface> PanelManager<S> {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        config: Arc<dyn ConfigProvider>,
        log: Arc<dyn PanelLog>,
    ) -> Self {
        Self {
            slot: None,
            source,
            config,
            log,
        }
    }

    /// Whether a panel is currently live
    pub fn is_live(&self) -> bool {
        self.slot.is_some()
    }

    /// The live surface, if any
    pub fn surface(&self) -> Option<&S> {
        self.slot.as_ref().map(|instance| &instance.surface)
    }

    /// Nonce of the live panel, if any
    pub fn nonce(&self) -> Option<&Nonce> {
        self.slot.as_ref().map(|instance| &instance.nonce)
    }

    /// Open the panel: re-focus and refresh the live one, or construct it
    pub async fn request_show(&mut self, create: impl FnOnce() -> S) -> ShowOutcome {
        let outcome = match self.slot.as_mut() {
            Some(instance) => {
                instance.surface.reveal();
                ShowOutcome::Revealed
            }
            None => {
                self.attach(create());
                self.log.log("Rate limit panel created", false);
                ShowOutcome::Created
            }
        };
        self.update().await;
        outcome
    }

    /// Re-attach to a surface the host restored after a restart
    pub async fn on_host_revival(&mut self, surface: S) {
        if self.dispose() {
            self.log.log("Replacing live panel with revived surface", false);
        }
        self.attach(surface);
        self.log.log("Rate limit panel revived", false);
        self.update().await;
    }

    /// Handle a message posted by the page
    pub async fn on_message(&mut self, message: SurfaceMessage) {
        match message {
            SurfaceMessage::Refresh => self.update().await,
            SurfaceMessage::Unknown => tracing::debug!("Ignoring unknown panel command"),
        }
    }

    /// Refresh when the surface becomes visible again
    pub async fn on_visibility_changed(&mut self, visible: bool) {
        if visible {
            self.update().await;
        }
    }

    /// Fetch a snapshot and render it (or the error page) into the live surface.
    ///
    /// Never fails: acquisition errors and panics in the source are logged and
    /// rendered. No-op without a live panel.
    pub async fn update(&mut self) {
        if self.slot.is_none() {
            tracing::debug!("Update requested with no live panel");
            return;
        }

        let config = self.config.panel_config();
        let source = Arc::clone(&self.source);
        let fetched = match AssertUnwindSafe(async { source.fetch_snapshot().await })
            .catch_unwind()
            .await
        {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(panic) => Err(format!(
                "Rate limit source panicked: {}",
                panic_message(&*panic)
            )),
        };

        let Some(instance) = self.slot.as_mut() else {
            return;
        };
        let page = PageContext {
            nonce: &instance.nonce,
            csp_source: instance.surface.csp_source(),
            message_endpoint: instance.surface.message_endpoint(),
            auto_refresh_secs: config.auto_refresh_secs,
        };

        let html = match fetched {
            Ok(result) => match result.into_snapshot() {
                Ok(snapshot) => render_dashboard(&snapshot, &config.color.resolve(), &page),
                Err(reason) => {
                    render_error(reason.as_deref().unwrap_or(DEFAULT_ERROR_MESSAGE), &page)
                }
            },
            Err(message) => {
                self.log
                    .log(&format!("Failed to update rate limits: {}", message), true);
                render_error(&message, &page)
            }
        };
        instance.surface.set_html(html);
    }

    /// Register a cleanup handle on the live panel.
    ///
    /// Returns `false` (and drops the handle unrun) when no panel is live.
    pub fn register_cleanup(&mut self, handle: impl FnOnce() + Send + 'static) -> bool {
        match self.slot.as_mut() {
            Some(instance) => {
                instance.disposables.push(handle);
                true
            }
            None => false,
        }
    }

    /// Close the live panel and release its cleanup handles in reverse order.
    ///
    /// Returns `false` if nothing was live.
    pub fn dispose(&mut self) -> bool {
        let Some(instance) = self.slot.take() else {
            return false;
        };
        instance.disposables.release();
        self.log.log("Rate limit panel disposed", false);
        true
    }

    fn attach(&mut self, surface: S) {
        self.slot = Some(PanelInstance {
            surface,
            nonce: Nonce::issue(),
            disposables: Disposables::default(),
        });
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
