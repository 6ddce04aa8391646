//! ratewatch-core: rate-limit snapshots, safe dashboard rendering and the
//! lifecycle of the single dashboard panel.
//!
//! Data flows one way: a [`usage::SnapshotSource`] produces a snapshot, the
//! [`panel::PanelManager`] resolves configuration for the cycle, and the
//! [`render`] functions turn both into a complete HTML document for the
//! host's [`panel::DisplaySurface`].

pub mod config;
pub mod panel;
pub mod render;
pub mod usage;
