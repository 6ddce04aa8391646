//! Browser-backed display surface

use parking_lot::RwLock;
use std::sync::Arc;

use ratewatch_core::panel::DisplaySurface;

/// Path the page posts messages to
pub const MESSAGE_ENDPOINT: &str = "/api/message";

/// What the browser is currently shown
#[derive(Debug, Default)]
pub struct SurfaceView {
    /// Last document assigned by the panel
    pub html: Option<String>,
    /// Number of times the panel asked to be brought forward
    pub reveals: u64,
}

/// Shared view, read by the HTTP handlers and written by the surface
pub type SharedView = Arc<RwLock<SurfaceView>>;

/// Surface that stores documents for the `/` handler to serve
pub struct WebSurface {
    view: SharedView,
}

impl WebSurface {
    pub fn new(view: SharedView) -> Self {
        Self { view }
    }
}

impl DisplaySurface for WebSurface {
    fn csp_source(&self) -> &'static str {
        "'self'"
    }

    fn message_endpoint(&self) -> &'static str {
        MESSAGE_ENDPOINT
    }

    fn set_html(&mut self, html: String) {
        self.view.write().html = Some(html);
    }

    fn reveal(&mut self) {
        let mut view = self.view.write();
        view.reveals += 1;
        tracing::debug!("Panel revealed ({} times)", view.reveals);
    }
}
