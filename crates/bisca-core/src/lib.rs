pub mod game;
pub mod model;

pub use game::engine::{GameState, Phase, Rejection};
pub use game::match_state::MatchState;
pub use model::card::Card;
pub use model::player::PlayerId;

pub struct AppInfo;

impl AppInfo {
    pub const fn name() -> &'static str {
        "bisca"
    }

    pub const fn version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }
}
