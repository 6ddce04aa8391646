//! ratewatch - local dashboard for AI coding agent rate limits
//!
//! The panel logic lives in `ratewatch-core`; this crate hosts it behind a
//! small axum server and wires it to the user's settings file.

pub mod config;
pub mod web;
