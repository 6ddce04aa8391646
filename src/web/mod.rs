//! Local web host for the rate-limit panel
//!
//! The browser tab is the display surface: `/` opens the panel and serves the
//! rendered document, `/api/*` carries page messages and host events.

mod api;
mod host;
mod revival;
mod server;
mod surface;

pub use host::PanelHost;
pub use revival::RevivalMarker;
pub use server::{router, WebServer};
pub use surface::{SharedView, SurfaceView, WebSurface, MESSAGE_ENDPOINT};
