//! Chip bonuses. Each bonus is worth one chip; a player may collect several
//! in the same hand.

use crate::game::engine::{GameState, Rejection};
use crate::model::hand::Hand;
use crate::model::player::{Player, PlayerId};
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use crate::model::trick::TablePlay;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChipBonus {
    /// Dealt the two of trumps.
    TrumpTwoDealt,
    /// Dealt both the ace and the seven of trumps.
    TrumpMarriageDealt,
    /// Played the trump ace and took a trick holding an opponent's trump seven.
    AceAndCapturedSeven,
    /// Sole highest card-point score of the hand.
    HighestScore,
    /// Took the last trick with the trump king.
    TrumpKingLastTrick,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipAward {
    pub player_id: PlayerId,
    pub bonus: ChipBonus,
}

impl ChipAward {
    fn new(player_id: &PlayerId, bonus: ChipBonus) -> Self {
        Self {
            player_id: player_id.clone(),
            bonus,
        }
    }
}

/// Bonuses read off the freshly dealt hands.
pub fn deal_awards(state: &GameState) -> Vec<ChipAward> {
    let Some(trump) = state.trump_suit() else {
        return Vec::new();
    };
    let mut awards = Vec::new();
    for player in state.players() {
        if holds_trump(&player.hand, Rank::Two, trump) {
            awards.push(ChipAward::new(&player.id, ChipBonus::TrumpTwoDealt));
        }
        if holds_trump(&player.hand, Rank::Ace, trump) && holds_trump(&player.hand, Rank::Seven, trump)
        {
            awards.push(ChipAward::new(&player.id, ChipBonus::TrumpMarriageDealt));
        }
    }
    awards
}

/// Bonuses earned over a finished hand. Empty while the hand is running.
pub fn hand_end_awards(state: &GameState) -> Vec<ChipAward> {
    if !state.is_hand_complete() {
        return Vec::new();
    }
    let Some(trump) = state.trump_suit() else {
        return Vec::new();
    };

    let mut awards = Vec::new();
    for player in state.players() {
        if state.played_trump_ace(&player.id) && state.captured_opponent_trump_seven(&player.id) {
            awards.push(ChipAward::new(&player.id, ChipBonus::AceAndCapturedSeven));
        }
    }
    if let Some(leader) = highest_scorer(state.players()) {
        awards.push(ChipAward::new(&leader, ChipBonus::HighestScore));
    }
    if let Some(winner) = state.last_trick_winner_id() {
        if king_took_last_trick(winner, state.last_trick_cards(), trump) {
            awards.push(ChipAward::new(winner, ChipBonus::TrumpKingLastTrick));
        }
    }
    awards
}

/// Credits the hand-end bonuses once per hand.
pub fn settle_hand(state: &GameState) -> Result<(GameState, Vec<ChipAward>), Rejection> {
    if !state.is_hand_complete() {
        return Err(Rejection::HandNotComplete);
    }
    if state.is_hand_settled() {
        return Err(Rejection::HandAlreadySettled);
    }
    let awards = hand_end_awards(state);
    let mut next = state.clone();
    credit(next.players_mut(), &awards);
    next.mark_hand_settled();
    Ok((next, awards))
}

pub fn credit(players: &mut [Player], awards: &[ChipAward]) {
    for award in awards {
        if let Some(player) = players.iter_mut().find(|p| p.id == award.player_id) {
            player.chips += 1;
        }
    }
}

pub fn chips_by_player(awards: &[ChipAward]) -> BTreeMap<PlayerId, u32> {
    let mut totals = BTreeMap::new();
    for award in awards {
        *totals.entry(award.player_id.clone()).or_insert(0) += 1;
    }
    totals
}

/// The player with the strictly highest positive score, if there is one.
pub fn highest_scorer(players: &[Player]) -> Option<PlayerId> {
    let best = players.iter().map(|p| p.score).max()?;
    if best == 0 {
        return None;
    }
    let mut leaders = players.iter().filter(|p| p.score == best);
    let leader = leaders.next()?;
    if leaders.next().is_some() {
        return None;
    }
    Some(leader.id.clone())
}

/// Whether `winner` took the final trick with the trump king while no
/// opponent put the trump ace or seven on it.
pub fn king_took_last_trick(winner: &PlayerId, last_trick: &[TablePlay], trump: Suit) -> bool {
    let won_with_king = last_trick
        .iter()
        .any(|p| &p.player_id == winner && p.card.is_trump_rank(Rank::King, trump));
    let opponent_high_trump = last_trick.iter().any(|p| {
        &p.player_id != winner
            && (p.card.is_trump_rank(Rank::Ace, trump) || p.card.is_trump_rank(Rank::Seven, trump))
    });
    won_with_king && !opponent_high_trump
}

/// Everyone tied on the most chips.
pub fn match_winners(players: &[Player]) -> Vec<PlayerId> {
    let Some(best) = players.iter().map(|p| p.chips).max() else {
        return Vec::new();
    };
    players
        .iter()
        .filter(|p| p.chips == best)
        .map(|p| p.id.clone())
        .collect()
}

fn holds_trump(hand: &Hand, rank: Rank, trump: Suit) -> bool {
    hand.iter().any(|card| card.is_trump_rank(rank, trump))
}
