use crate::game::chips::{self, ChipAward};
use crate::game::engine::{GameState, Rejection};
use crate::model::player::PlayerId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Outcome of one finished hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandSummary {
    pub hand_number: u32,
    pub scores: Vec<(PlayerId, u32)>,
    pub awards: Vec<ChipAward>,
}

/// A sequence of hands at one table. Chips carry over; everything else is
/// dealt fresh each hand.
#[derive(Debug, Clone)]
pub struct MatchState {
    game: GameState,
    total_hands: u32,
    hands_played: u32,
    history: Vec<HandSummary>,
    seed: u64,
}

impl MatchState {
    pub fn new(game: GameState, total_hands: u32) -> Self {
        Self::with_seed(game, total_hands, rand::random())
    }

    pub fn with_seed(game: GameState, total_hands: u32, seed: u64) -> Self {
        Self {
            game,
            total_hands: total_hands.max(1),
            hands_played: 0,
            history: Vec::new(),
            seed,
        }
    }

    pub(crate) fn from_parts(
        game: GameState,
        total_hands: u32,
        hands_played: u32,
        history: Vec<HandSummary>,
        seed: u64,
    ) -> Self {
        Self {
            game,
            total_hands: total_hands.max(1),
            hands_played,
            history,
            seed,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn total_hands(&self) -> u32 {
        self.total_hands
    }

    pub fn hands_played(&self) -> u32 {
        self.hands_played
    }

    /// 1-based number of the hand being (or about to be) played.
    pub fn current_hand_number(&self) -> u32 {
        self.hands_played + 1
    }

    pub fn history(&self) -> &[HandSummary] {
        &self.history
    }

    pub fn is_over(&self) -> bool {
        self.hands_played >= self.total_hands
    }

    /// Applies one engine step; the stored state only changes on success.
    pub fn apply<F>(&mut self, step: F) -> Result<&GameState, Rejection>
    where
        F: FnOnce(&GameState) -> Result<GameState, Rejection>,
    {
        self.game = step(&self.game)?;
        Ok(&self.game)
    }

    /// Deals the next hand. Each hand draws from its own seeded stream, so a
    /// restored match deals the same cards it would have dealt.
    pub fn start_next_hand(&mut self) -> Result<&GameState, Rejection> {
        if self.is_over() {
            return Err(Rejection::MatchOver);
        }
        let mut rng = self.hand_rng();
        self.game = self.game.start(&mut rng)?;
        Ok(&self.game)
    }

    /// Awards the end-of-hand chips and records the hand.
    pub fn finish_hand(&mut self) -> Result<&HandSummary, Rejection> {
        let (settled, mut awards) = chips::settle_hand(&self.game)?;
        let scores = settled
            .players()
            .iter()
            .map(|p| (p.id.clone(), p.score))
            .collect();
        let mut all_awards = settled.deal_awards().to_vec();
        all_awards.append(&mut awards);

        self.game = settled;
        self.hands_played += 1;
        self.history.push(HandSummary {
            hand_number: self.hands_played,
            scores,
            awards: all_awards,
        });
        Ok(&self.history[self.history.len() - 1])
    }

    pub fn winners(&self) -> Vec<PlayerId> {
        chips::match_winners(self.game.players())
    }

    /// Back to the lobby with chips cleared, ready for a new match.
    pub fn reset(&mut self) {
        let mut game = self.game.reset_to_lobby();
        for player in game.players_mut() {
            player.chips = 0;
        }
        self.game = game;
        self.hands_played = 0;
        self.history.clear();
    }

    fn hand_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed.wrapping_add(u64::from(self.hands_played)))
    }
}
