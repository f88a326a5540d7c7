pub mod config;
pub mod protocol;
pub mod room;
pub mod session;
pub mod telemetry;
pub mod ws;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::config::RoomSettings;
use crate::room::RoomManager;

#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RoomManager>,
}

impl AppState {
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            rooms: Arc::new(RoomManager::new(settings)),
        }
    }
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ws", get(ws::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
