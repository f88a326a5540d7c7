mod greedy;
mod random;

pub use greedy::GreedyPolicy;
pub use random::RandomPolicy;

use bisca_core::model::card::Card;
use bisca_core::{GameState, PlayerId};
use std::fmt;
use std::str::FromStr;
use tracing::{Level, event};

/// What a policy gets to look at when it is asked for a card.
pub struct PolicyContext<'a> {
    pub seat: usize,
    pub player_id: &'a PlayerId,
    pub state: &'a GameState,
}

impl<'a> PolicyContext<'a> {
    /// Context for whoever holds the turn, if a card can be played right now.
    pub fn for_current(state: &'a GameState) -> Option<Self> {
        if state.is_trick_full() {
            return None;
        }
        let player = state.current_player()?;
        Some(Self {
            seat: state.turn(),
            player_id: &player.id,
            state,
        })
    }

    pub fn legal_cards(&self) -> Vec<Card> {
        self.state.legal_cards(self.player_id)
    }
}

/// Seat-level decision maker driven by the bench harness.
pub trait Policy: Send {
    fn name(&self) -> &'static str;

    /// Returns `None` only when the context offers no legal card.
    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Card>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Random,
    Greedy,
}

impl PolicyKind {
    pub fn build(self, seed: u64) -> Box<dyn Policy> {
        match self {
            PolicyKind::Random => Box::new(RandomPolicy::new(seed)),
            PolicyKind::Greedy => Box::new(GreedyPolicy::new()),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Random => "random",
            PolicyKind::Greedy => "greedy",
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown policy '{}' (expected random or greedy)", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(PolicyKind::Random),
            "greedy" | "heuristic" => Ok(PolicyKind::Greedy),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

fn log_play_decision(
    ctx: &PolicyContext,
    policy: &'static str,
    legal_moves: &[Card],
    chosen: Card,
    reason: &str,
) {
    if !tracing::enabled!(Level::DEBUG) {
        return;
    }

    let legal_preview = if legal_moves.len() <= 6 {
        legal_moves
            .iter()
            .map(Card::to_string)
            .collect::<Vec<_>>()
            .join(",")
    } else {
        format!("{} moves", legal_moves.len())
    };

    event!(
        target: "bisca_bot::play",
        Level::DEBUG,
        seat = ctx.seat,
        player = %ctx.player_id,
        policy,
        legal_count = legal_moves.len(),
        legal_moves = %legal_preview,
        chosen = %chosen,
        table_cards = ctx.state.table().len(),
        table_points = ctx.state.table().points_total(),
        reason,
    );
}
