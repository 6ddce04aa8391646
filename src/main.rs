use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ratewatch::config::{Config, FileConfigProvider, Settings};
use ratewatch::web::{PanelHost, RevivalMarker, WebServer};
use ratewatch_core::panel::TracingLog;
use ratewatch_core::usage::SessionLogSource;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging
    setup_logging(cli.debug);

    // Load settings
    let config_path = Settings::locate(cli.config.as_ref());
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    let source = match &settings.sessions_dir {
        Some(dir) => SessionLogSource::new(dir),
        None => SessionLogSource::from_home()?,
    }
    .with_max_files(settings.max_session_files);
    tracing::info!("Reading session logs from {:?}", source.sessions_dir());

    let config = FileConfigProvider::new(config_path, settings.clone());
    let host = Arc::new(PanelHost::new(
        Arc::new(source),
        Arc::new(config),
        Arc::new(TracingLog),
        RevivalMarker::in_state_dir(),
    ));

    if settings.panel.restore_on_start && host.should_revive() {
        host.revive().await;
    }

    WebServer::new(settings, host).run().await
}

fn setup_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("ratewatch=debug,ratewatch_core=debug")
    } else {
        EnvFilter::new("ratewatch=info,ratewatch_core=info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
