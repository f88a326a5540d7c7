use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use bisca_core::AppInfo;
use bisca_server::config::ServerConfig;
use bisca_server::{AppState, app, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();
    let config = ServerConfig::parse();
    let settings = config.room_settings();

    let app = app(AppState::new(settings));
    info!(
        engine = AppInfo::name(),
        version = AppInfo::version(),
        addr = %config.addr,
        hands_per_match = settings.hands_per_match,
        trick_pause_ms = config.trick_pause_ms,
        "listening"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
