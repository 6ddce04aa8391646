//! The display surface a panel renders into, and the messages it sends back.

use serde::Deserialize;

/// A host-owned view that shows one HTML document at a time.
///
/// Documents are assigned wholesale; there is no partial patching.
pub trait DisplaySurface: Send {
    /// CSP source expression matching the surface's own resources
    fn csp_source(&self) -> &'static str;

    /// Endpoint the page posts [`SurfaceMessage`]s to
    fn message_endpoint(&self) -> &'static str;

    /// Replace the displayed document
    fn set_html(&mut self, html: String);

    /// Bring the surface to the front
    fn reveal(&mut self);
}

/// Inbound message from the page: `{ "command": "refresh" }`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum SurfaceMessage {
    /// Re-run the update cycle
    Refresh,
    /// Any other command; ignored
    #[serde(other)]
    Unknown,
}

impl SurfaceMessage {
    /// Parse a JSON message body; malformed bodies yield `None`
    pub fn from_json(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}
