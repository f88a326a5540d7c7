//! Runtime settings. Every flag falls back to an environment variable.

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "bisca-server", version, about = "Bisca rooms over WebSocket")]
pub struct ServerConfig {
    /// Socket address to bind.
    #[arg(long, env = "BISCA_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: SocketAddr,

    /// Pause between the last card of a trick and its resolution.
    #[arg(long, env = "BISCA_TRICK_PAUSE_MS", default_value_t = 1_500)]
    pub trick_pause_ms: u64,

    /// Hands dealt before a match ends and chips decide the winner.
    #[arg(long, env = "BISCA_HANDS_PER_MATCH", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub hands_per_match: u32,
}

impl ServerConfig {
    pub fn room_settings(&self) -> RoomSettings {
        RoomSettings {
            hands_per_match: self.hands_per_match,
            trick_pause: Duration::from_millis(self.trick_pause_ms),
        }
    }
}

/// The subset of configuration every room is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    pub hands_per_match: u32,
    pub trick_pause: Duration,
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            hands_per_match: 3,
            trick_pause: Duration::from_millis(1_500),
        }
    }
}
