use crate::game::chips::{self, ChipAward};
use crate::model::card::Card;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{Player, PlayerId};
use crate::model::rank::Rank;
use crate::model::seat::{next_seat, seat_of_play, trick_leader_seat};
use crate::model::suit::Suit;
use crate::model::trick::{TablePlay, Trick};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;
pub const HAND_SIZE: usize = 10;

/// Snapshot of one table. Every operation takes `&self` and hands back a new
/// snapshot, so a rejected action leaves the caller's state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    players: Vec<Player>,
    table: Trick,
    turn: usize,
    trump_card: Option<Card>,
    deck: Vec<Card>,
    round_number: u32,
    is_game_started: bool,
    last_trick_winner_id: Option<PlayerId>,
    last_trick_cards: Vec<TablePlay>,
    played_trump_ace_by: BTreeMap<PlayerId, bool>,
    captured_opp_trump_seven_by: BTreeMap<PlayerId, bool>,
    deal_awards: Vec<ChipAward>,
    hand_settled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    InProgress,
    HandComplete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    WrongPlayerCount { found: usize },
    AlreadyStarted,
    HandInProgress,
    NotStarted,
    TableFull,
    DuplicatePlayer(PlayerId),
    UnknownPlayer(PlayerId),
    NotYourTurn { expected: PlayerId, actual: PlayerId },
    CardNotInHand(Card),
    MustLeadTrump(Suit),
    MustFollowSuit(Suit),
    TrickAwaitingResolution,
    TrickIncomplete { played: usize, needed: usize },
    TrumpNotDealt(Card),
    HandNotComplete,
    HandAlreadySettled,
    MatchOver,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::WrongPlayerCount { found } => write!(
                f,
                "a hand needs {MIN_PLAYERS} to {MAX_PLAYERS} players, found {found}"
            ),
            Rejection::AlreadyStarted => write!(f, "game already started"),
            Rejection::HandInProgress => write!(f, "a hand is still being played"),
            Rejection::NotStarted => write!(f, "game has not started"),
            Rejection::TableFull => write!(f, "table already seats {MAX_PLAYERS} players"),
            Rejection::DuplicatePlayer(id) => write!(f, "{id} is already seated"),
            Rejection::UnknownPlayer(id) => write!(f, "{id} is not seated at this table"),
            Rejection::NotYourTurn { expected, actual } => {
                write!(f, "expected {expected} to play next but got {actual}")
            }
            Rejection::CardNotInHand(card) => write!(f, "{card} is not in hand"),
            Rejection::MustLeadTrump(suit) => {
                write!(f, "first lead of the hand must be a trump ({suit})")
            }
            Rejection::MustFollowSuit(suit) => write!(f, "must follow suit {suit}"),
            Rejection::TrickAwaitingResolution => write!(f, "trick is full and awaits resolution"),
            Rejection::TrickIncomplete { played, needed } => {
                write!(f, "trick has {played} of {needed} cards")
            }
            Rejection::TrumpNotDealt(card) => write!(f, "trump card {card} was not dealt"),
            Rejection::HandNotComplete => write!(f, "hand is not complete"),
            Rejection::HandAlreadySettled => write!(f, "hand chips were already awarded"),
            Rejection::MatchOver => write!(f, "match is over"),
        }
    }
}

impl std::error::Error for Rejection {}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            table: Trick::new(),
            turn: 0,
            trump_card: None,
            deck: Vec::new(),
            round_number: 0,
            is_game_started: false,
            last_trick_winner_id: None,
            last_trick_cards: Vec::new(),
            played_trump_ace_by: BTreeMap::new(),
            captured_opp_trump_seven_by: BTreeMap::new(),
            deal_awards: Vec::new(),
            hand_settled: false,
        }
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn seat_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    pub fn table(&self) -> &Trick {
        &self.table
    }

    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn current_player(&self) -> Option<&Player> {
        if self.phase() == Phase::InProgress {
            self.players.get(self.turn)
        } else {
            None
        }
    }

    pub fn trump_card(&self) -> Option<Card> {
        self.trump_card
    }

    pub fn trump_suit(&self) -> Option<Suit> {
        self.trump_card.map(|card| card.suit)
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn round_number(&self) -> u32 {
        self.round_number
    }

    pub fn is_started(&self) -> bool {
        self.is_game_started
    }

    pub fn last_trick_winner_id(&self) -> Option<&PlayerId> {
        self.last_trick_winner_id.as_ref()
    }

    pub fn last_trick_cards(&self) -> &[TablePlay] {
        &self.last_trick_cards
    }

    pub fn played_trump_ace(&self, id: &PlayerId) -> bool {
        self.played_trump_ace_by.get(id).copied().unwrap_or(false)
    }

    pub fn captured_opponent_trump_seven(&self, id: &PlayerId) -> bool {
        self.captured_opp_trump_seven_by
            .get(id)
            .copied()
            .unwrap_or(false)
    }

    /// Chips credited from the dealt hands when this hand started.
    pub fn deal_awards(&self) -> &[ChipAward] {
        &self.deal_awards
    }

    pub fn is_hand_settled(&self) -> bool {
        self.hand_settled
    }

    pub fn phase(&self) -> Phase {
        if !self.is_game_started {
            Phase::Lobby
        } else if self.table.is_empty() && self.players.iter().all(|p| p.hand.is_empty()) {
            Phase::HandComplete
        } else {
            Phase::InProgress
        }
    }

    pub fn is_hand_complete(&self) -> bool {
        self.phase() == Phase::HandComplete
    }

    pub fn is_trick_full(&self) -> bool {
        !self.players.is_empty() && self.table.len() == self.players.len()
    }

    /// Seats a player in the lobby.
    pub fn with_player(
        &self,
        id: PlayerId,
        nickname: impl Into<String>,
    ) -> Result<GameState, Rejection> {
        if self.is_game_started {
            return Err(Rejection::AlreadyStarted);
        }
        if self.seat_of(&id).is_some() {
            return Err(Rejection::DuplicatePlayer(id));
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(Rejection::TableFull);
        }
        let mut next = self.clone();
        next.players.push(Player::new(id, nickname));
        Ok(next)
    }

    /// Unseats a player. Leaving a started game sends the table back to the
    /// lobby; the remaining players keep their chips.
    pub fn without_player(&self, id: &PlayerId) -> Result<GameState, Rejection> {
        let seat = self
            .seat_of(id)
            .ok_or_else(|| Rejection::UnknownPlayer(id.clone()))?;
        let mut next = if self.is_game_started {
            self.reset_to_lobby()
        } else {
            self.clone()
        };
        next.players.remove(seat);
        Ok(next)
    }

    /// Same players (ids, nicknames, chips), nothing dealt.
    pub fn reset_to_lobby(&self) -> GameState {
        let mut next = GameState::new();
        next.players = self
            .players
            .iter()
            .map(|p| {
                let mut player = p.clone();
                player.reset_for_hand();
                player
            })
            .collect();
        next
    }

    /// Deals a fresh hand from a shuffled deck. The trump card is drawn
    /// uniformly from the dealt cards, so some player always holds it.
    pub fn start<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<GameState, Rejection> {
        self.check_can_deal()?;
        let deck = Deck::standard().shuffled(rng);
        let dealt = self.players.len() * HAND_SIZE;
        let trump = deck.cards()[rng.gen_range(0..dealt)];
        self.start_with_deck(&deck, trump)
    }

    /// Deals `deck` round-robin, ten cards each, with `trump` as the trump
    /// card. `trump` must land in a dealt hand.
    pub fn start_with_deck(&self, deck: &Deck, trump: Card) -> Result<GameState, Rejection> {
        self.check_can_deal()?;
        let count = self.players.len();
        let dealt = count * HAND_SIZE;

        let mut next = self.reset_to_lobby();
        let mut hands = vec![Vec::with_capacity(HAND_SIZE); count];
        for (index, card) in deck.cards()[..dealt].iter().enumerate() {
            hands[index % count].push(*card);
        }
        for (player, cards) in next.players.iter_mut().zip(hands) {
            player.hand = Hand::with_cards(cards);
        }
        if !next.players.iter().any(|p| p.hand.contains(trump)) {
            return Err(Rejection::TrumpNotDealt(trump));
        }

        next.deck = deck.cards()[dealt..].to_vec();
        next.trump_card = Some(trump);
        next.turn = 0;
        next.round_number = 1;
        next.is_game_started = true;
        for player in &next.players {
            next.played_trump_ace_by.insert(player.id.clone(), false);
            next.captured_opp_trump_seven_by
                .insert(player.id.clone(), false);
        }

        let awards = chips::deal_awards(&next);
        chips::credit(&mut next.players, &awards);
        next.deal_awards = awards;
        Ok(next)
    }

    pub fn play_card(&self, player_id: &PlayerId, card: Card) -> Result<GameState, Rejection> {
        let seat = self.validate_play(player_id, card)?;
        let trump = self.trump_suit().ok_or(Rejection::NotStarted)?;

        let mut next = self.clone();
        let player = &mut next.players[seat];
        player.hand.remove(card);
        next.table.push(TablePlay {
            player_id: player.id.clone(),
            nickname: player.nickname.clone(),
            card,
        });
        if card.is_trump_rank(Rank::Ace, trump) {
            next.played_trump_ace_by.insert(player_id.clone(), true);
        }
        next.turn = next_seat(seat, next.players.len());
        Ok(next)
    }

    /// Resolves a full table: the winner takes the cards and leads next.
    pub fn resolve_trick(&self) -> Result<GameState, Rejection> {
        if !self.is_game_started {
            return Err(Rejection::NotStarted);
        }
        let count = self.players.len();
        let incomplete = Rejection::TrickIncomplete {
            played: self.table.len(),
            needed: count,
        };
        if !self.is_trick_full() {
            return Err(incomplete);
        }
        let trump = self.trump_suit().ok_or(Rejection::NotStarted)?;
        let winning = self.table.winning_index(trump).ok_or(incomplete)?;
        let leader = trick_leader_seat(self.turn, self.table.len(), count);
        let winner_seat = seat_of_play(leader, winning, count);

        let mut next = self.clone();
        let plays = next.table.take();
        let winner_id = next.players[winner_seat].id.clone();
        let took_opponent_seven = plays
            .iter()
            .any(|p| p.card.is_trump_rank(Rank::Seven, trump) && p.player_id != winner_id);
        if took_opponent_seven {
            next.captured_opp_trump_seven_by
                .insert(winner_id.clone(), true);
        }

        next.players[winner_seat].capture(plays.iter().map(|p| p.card));
        next.turn = winner_seat;
        next.round_number += 1;
        next.last_trick_winner_id = Some(winner_id);
        next.last_trick_cards = plays;
        Ok(next)
    }

    /// Cards `player_id` may play right now; empty when it is not their turn.
    pub fn legal_cards(&self, player_id: &PlayerId) -> Vec<Card> {
        let Some(player) = self.player(player_id) else {
            return Vec::new();
        };
        player
            .hand
            .iter()
            .copied()
            .filter(|&card| self.validate_play(player_id, card).is_ok())
            .collect()
    }

    pub(crate) fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }

    pub(crate) fn mark_hand_settled(&mut self) {
        self.hand_settled = true;
    }

    fn check_can_deal(&self) -> Result<(), Rejection> {
        let found = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&found) {
            return Err(Rejection::WrongPlayerCount { found });
        }
        if self.phase() == Phase::InProgress {
            return Err(Rejection::HandInProgress);
        }
        Ok(())
    }

    fn validate_play(&self, player_id: &PlayerId, card: Card) -> Result<usize, Rejection> {
        if !self.is_game_started {
            return Err(Rejection::NotStarted);
        }
        if self.is_trick_full() {
            return Err(Rejection::TrickAwaitingResolution);
        }
        let current = self.players.get(self.turn).ok_or(Rejection::NotStarted)?;
        if &current.id != player_id {
            if self.seat_of(player_id).is_none() {
                return Err(Rejection::UnknownPlayer(player_id.clone()));
            }
            return Err(Rejection::NotYourTurn {
                expected: current.id.clone(),
                actual: player_id.clone(),
            });
        }
        if !current.hand.contains(card) {
            return Err(Rejection::CardNotInHand(card));
        }

        let trump = self.trump_suit().ok_or(Rejection::NotStarted)?;
        match self.table.lead_suit() {
            None => {
                if self.round_number == 1 && card.suit != trump && current.hand.has_suit(trump) {
                    return Err(Rejection::MustLeadTrump(trump));
                }
            }
            Some(lead) => {
                if card.suit != lead && current.hand.has_suit(lead) {
                    return Err(Rejection::MustFollowSuit(lead));
                }
            }
        }
        Ok(self.turn)
    }
}

#[cfg(test)]
mod tests {
    use super::{GameState, HAND_SIZE, Phase, Rejection};
    use crate::model::card::Card;
    use crate::model::deck::{DECK_SIZE, Deck};
    use crate::model::hand::Hand;
    use crate::model::player::PlayerId;
    use crate::model::suit::Suit;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn card(token: &str) -> Card {
        token.parse().unwrap()
    }

    fn id(raw: &str) -> PlayerId {
        PlayerId::new(raw)
    }

    fn lobby(count: usize) -> GameState {
        ["a", "b", "c", "d"][..count]
            .iter()
            .fold(GameState::new(), |state, raw| {
                state.with_player(id(raw), raw.to_uppercase()).unwrap()
            })
    }

    fn card_count(state: &GameState) -> usize {
        state.players().iter().map(|p| p.hand.len()).sum::<usize>()
            + state.table().len()
            + state.deck().len()
            + state
                .players()
                .iter()
                .map(|p| p.captured_cards.len())
                .sum::<usize>()
    }

    #[test]
    fn new_game_is_an_empty_lobby() {
        let state = GameState::new();
        assert!(state.players().is_empty());
        assert!(state.table().is_empty());
        assert_eq!(state.round_number(), 0);
        assert!(!state.is_started());
        assert_eq!(state.phase(), Phase::Lobby);
        assert_eq!(state, GameState::default());
    }

    #[test]
    fn scripted_deal_goes_round_robin() {
        let deck = Deck::standard();
        for count in 2..=4 {
            let trump = deck.cards()[0];
            let state = lobby(count).start_with_deck(&deck, trump).unwrap();
            for (seat, player) in state.players().iter().enumerate() {
                let expected: Vec<Card> = deck.cards()[..count * HAND_SIZE]
                    .iter()
                    .copied()
                    .skip(seat)
                    .step_by(count)
                    .collect();
                assert_eq!(player.hand, Hand::with_cards(expected));
            }
        }
    }

    #[test]
    fn deal_gives_ten_disjoint_cards_and_a_held_trump() {
        for count in 2..=4 {
            let mut rng = StdRng::seed_from_u64(count as u64);
            let state = lobby(count).start(&mut rng).unwrap();

            let mut seen = HashSet::new();
            for player in state.players() {
                assert_eq!(player.hand.len(), HAND_SIZE);
                for c in player.hand.iter() {
                    assert!(seen.insert(*c), "{c} dealt twice");
                }
            }
            for c in state.deck() {
                assert!(seen.insert(*c), "{c} both dealt and undealt");
            }
            assert_eq!(seen.len(), DECK_SIZE);
            assert_eq!(state.deck().len(), DECK_SIZE - count * HAND_SIZE);

            let trump = state.trump_card().unwrap();
            let holders = state
                .players()
                .iter()
                .filter(|p| p.hand.contains(trump))
                .count();
            assert_eq!(holders, 1);
            assert_eq!(state.turn(), 0);
            assert_eq!(state.round_number(), 1);
            assert_eq!(state.phase(), Phase::InProgress);
        }
    }

    #[test]
    fn start_requires_two_to_four_players() {
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            GameState::new().start(&mut rng).unwrap_err(),
            Rejection::WrongPlayerCount { found: 0 }
        );
        assert_eq!(
            lobby(1).start(&mut rng).unwrap_err(),
            Rejection::WrongPlayerCount { found: 1 }
        );
    }

    #[test]
    fn lobby_rejects_duplicates_and_a_fifth_seat() {
        let full = lobby(4);
        assert_eq!(
            full.with_player(id("e"), "E").unwrap_err(),
            Rejection::TableFull
        );
        assert_eq!(
            lobby(2).with_player(id("a"), "again").unwrap_err(),
            Rejection::DuplicatePlayer(id("a"))
        );
        let started = lobby(2)
            .start_with_deck(&Deck::standard(), card("AS"))
            .unwrap();
        assert_eq!(
            started.with_player(id("c"), "C").unwrap_err(),
            Rejection::AlreadyStarted
        );
    }

    #[test]
    fn trump_must_come_from_a_dealt_hand() {
        assert_eq!(
            lobby(2)
                .start_with_deck(&Deck::standard(), card("AD"))
                .unwrap_err(),
            Rejection::TrumpNotDealt(card("AD"))
        );
    }

    #[test]
    fn cannot_redeal_a_running_hand() {
        let started = lobby(2)
            .start_with_deck(&Deck::standard(), card("AS"))
            .unwrap();
        assert_eq!(
            started
                .start_with_deck(&Deck::standard(), card("AS"))
                .unwrap_err(),
            Rejection::HandInProgress
        );
    }

    #[test]
    fn first_lead_must_be_trump_when_held() {
        // Seat 0 holds A,3,5,7,Q of spades and hearts.
        let state = lobby(2)
            .start_with_deck(&Deck::standard(), card("AS"))
            .unwrap();
        assert_eq!(
            state.play_card(&id("a"), card("3H")).unwrap_err(),
            Rejection::MustLeadTrump(Suit::Spades)
        );
        let next = state.play_card(&id("a"), card("3S")).unwrap();
        assert_eq!(next.table().len(), 1);
        assert_eq!(next.turn(), 1);
        assert!(!next.player(&id("a")).unwrap().hand.contains(card("3S")));
    }

    #[test]
    fn follow_suit_and_turn_order_are_enforced() {
        let state = lobby(2)
            .start_with_deck(&Deck::standard(), card("2H"))
            .unwrap();
        assert_eq!(
            state.play_card(&id("b"), card("2S")).unwrap_err(),
            Rejection::NotYourTurn {
                expected: id("a"),
                actual: id("b")
            }
        );
        assert_eq!(
            state.play_card(&id("z"), card("2S")).unwrap_err(),
            Rejection::UnknownPlayer(id("z"))
        );
        assert_eq!(
            state.play_card(&id("a"), card("2S")).unwrap_err(),
            Rejection::CardNotInHand(card("2S"))
        );

        let state = state.play_card(&id("a"), card("3H")).unwrap();
        assert_eq!(
            state.play_card(&id("b"), card("2S")).unwrap_err(),
            Rejection::MustFollowSuit(Suit::Hearts)
        );
        assert_eq!(state.legal_cards(&id("b")).len(), 5);
        assert!(state.legal_cards(&id("a")).is_empty());

        let state = state.play_card(&id("b"), card("4H")).unwrap();
        assert!(state.is_trick_full());
        assert_eq!(
            state.play_card(&id("a"), card("5H")).unwrap_err(),
            Rejection::TrickAwaitingResolution
        );

        let resolved = state.resolve_trick().unwrap();
        assert_eq!(resolved.turn(), 1);
        assert_eq!(resolved.round_number(), 2);
        assert!(resolved.table().is_empty());
        assert_eq!(resolved.last_trick_winner_id(), Some(&id("b")));
        assert_eq!(resolved.last_trick_cards().len(), 2);
        assert_eq!(resolved.player(&id("b")).unwrap().captured_cards.len(), 2);

        // Later leads are free, but following still binds.
        let led = resolved.play_card(&id("b"), card("KS")).unwrap();
        assert_eq!(
            led.play_card(&id("a"), card("AH")).unwrap_err(),
            Rejection::MustFollowSuit(Suit::Spades)
        );
        let taken = led
            .play_card(&id("a"), card("7S"))
            .unwrap()
            .resolve_trick()
            .unwrap();
        assert_eq!(taken.turn(), 0);
        assert_eq!(taken.player(&id("a")).unwrap().score, 15);
    }

    #[test]
    fn resolve_waits_for_a_full_table() {
        let state = lobby(3)
            .start_with_deck(&Deck::standard(), card("2H"))
            .unwrap();
        assert_eq!(
            state.resolve_trick().unwrap_err(),
            Rejection::TrickIncomplete {
                played: 0,
                needed: 3
            }
        );
        assert_eq!(
            GameState::new().resolve_trick().unwrap_err(),
            Rejection::NotStarted
        );
    }

    #[test]
    fn winner_seat_is_mapped_from_the_leader() {
        // Three seats, hearts trump: seat 1 holds 7H and AH.
        let state = lobby(3)
            .start_with_deck(&Deck::standard(), card("2H"))
            .unwrap();
        let state = state.play_card(&id("a"), card("3H")).unwrap();
        let state = state.play_card(&id("b"), card("7H")).unwrap();
        let state = state.play_card(&id("c"), card("5H")).unwrap();
        assert_eq!(state.turn(), 0);
        let state = state.resolve_trick().unwrap();
        assert_eq!(state.turn(), 1);
        assert_eq!(state.player(&id("b")).unwrap().score, 11);
        assert!(!state.captured_opponent_trump_seven(&id("b")));

        let state = state.play_card(&id("b"), card("AH")).unwrap();
        assert!(state.played_trump_ace(&id("b")));
        let state = state.play_card(&id("c"), card("JH")).unwrap();
        let state = state.play_card(&id("a"), card("QH")).unwrap();
        let state = state.resolve_trick().unwrap();
        assert_eq!(state.turn(), 1);
        assert_eq!(state.player(&id("b")).unwrap().score, 11 + 10 + 3 + 2);
    }

    #[test]
    fn playing_out_a_hand_keeps_card_invariants() {
        for count in 2..=4 {
            let mut rng = StdRng::seed_from_u64(100 + count as u64);
            let mut state = lobby(count).start(&mut rng).unwrap();
            let dealt_points: u32 = state
                .players()
                .iter()
                .flat_map(|p| p.hand.iter())
                .map(|c| c.points())
                .sum();

            for _ in 0..HAND_SIZE {
                for _ in 0..count {
                    assert_eq!(card_count(&state), DECK_SIZE);
                    let current = state.current_player().unwrap().id.clone();
                    let legal = state.legal_cards(&current);
                    assert!(!legal.is_empty());
                    state = state.play_card(&current, legal[0]).unwrap();
                }
                state = state.resolve_trick().unwrap();
                assert_eq!(card_count(&state), DECK_SIZE);
                let winner = state.last_trick_winner_id().unwrap();
                assert_eq!(state.seat_of(winner), Some(state.turn()));
            }

            assert_eq!(state.phase(), Phase::HandComplete);
            assert_eq!(state.round_number(), HAND_SIZE as u32 + 1);
            assert!(state.current_player().is_none());
            let total: u32 = state.players().iter().map(|p| p.score).sum();
            assert_eq!(total, dealt_points);
        }
    }

    #[test]
    fn leaving_a_started_game_resets_to_lobby() {
        let mut rng = StdRng::seed_from_u64(9);
        let started = lobby(3).start(&mut rng).unwrap();
        let chips_before = started.player(&id("b")).unwrap().chips;

        let left = started.without_player(&id("a")).unwrap();
        assert_eq!(left.phase(), Phase::Lobby);
        assert_eq!(left.players().len(), 2);
        assert!(left.players().iter().all(|p| p.hand.is_empty()));
        assert_eq!(left.player(&id("b")).unwrap().chips, chips_before);
        assert!(left.trump_card().is_none());

        assert_eq!(
            left.without_player(&id("a")).unwrap_err(),
            Rejection::UnknownPlayer(id("a"))
        );
    }

    #[test]
    fn state_round_trips_through_json() {
        let state = lobby(2)
            .start_with_deck(&Deck::standard(), card("AS"))
            .unwrap()
            .play_card(&id("a"), card("AS"))
            .unwrap();
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"trump_card\":\"AS\""));
        let restored: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }
}
