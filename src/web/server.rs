//! Web server implementation using axum

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue};
use axum::{
    routing::{get, post},
    Router,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::Settings;

use super::api;
use super::host::PanelHost;

/// Build the application router
pub fn router(host: Arc<PanelHost>) -> Router {
    let api_routes = Router::new()
        .route("/message", post(api::post_message))
        .route("/panel", get(api::panel_status))
        .route("/panel/close", post(api::close_panel))
        .route("/panel/visibility", post(api::visibility));

    Router::new()
        .route("/", get(api::index))
        .nest("/api", api_routes)
        .with_state(host)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// Local dashboard server
pub struct WebServer {
    settings: Settings,
    host: Arc<PanelHost>,
}

impl WebServer {
    /// Create a new web server
    pub fn new(settings: Settings, host: Arc<PanelHost>) -> Self {
        Self { settings, host }
    }

    /// Run the web server until Ctrl-C
    pub async fn run(self) -> Result<()> {
        let ip: IpAddr = self
            .settings
            .web
            .host
            .parse()
            .with_context(|| format!("Invalid bind address: {}", self.settings.web.host))?;
        let addr = SocketAddr::new(ip, self.settings.web.port);

        let app = router(self.host);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {}", addr))?;
        tracing::info!("Dashboard available at http://{}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Web server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
