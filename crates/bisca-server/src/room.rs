//! Rooms and the registry that owns them.
//!
//! Each room keeps one `MatchState` behind a mutex. Every event takes the
//! lock, applies one engine step, queues outbound messages on the members'
//! channels and releases the lock, so two events against one room are always
//! applied in order. Nothing awaits while the lock is held.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bisca_core::game::match_state::MatchState;
use bisca_core::{Card, GameState, PlayerId, Rejection};
use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use ulid::Ulid;

use crate::config::RoomSettings;
use crate::protocol::{ChipCount, GameView, RoomView, SeatView, ServerMessage};
use bisca_core::game::engine::{MAX_PLAYERS, MIN_PLAYERS};

pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("room not found")]
    NotFound,
    #[error("room is full")]
    Full,
    #[error("capacity must be between 2 and 4, got {0}")]
    InvalidCapacity(usize),
    #[error("match already in progress")]
    AlreadyStarted,
    #[error("no match in progress")]
    NotStarted,
    #[error("only the room owner can start the match")]
    NotOwner,
    #[error("need at least 2 players, have {found}")]
    NotEnoughPlayers { found: usize },
    #[error("already in a room")]
    AlreadyInRoom,
    #[error("not in a room")]
    NotInRoom,
    #[error("{0}")]
    Rejected(#[from] Rejection),
}

struct Member {
    id: PlayerId,
    tx: Outbox,
}

struct RoomState {
    owner: Option<PlayerId>,
    members: Vec<Member>,
    game: MatchState,
    started: bool,
    trick_seq: u64,
    closed: bool,
}

pub struct Room {
    id: String,
    capacity: usize,
    settings: RoomSettings,
    state: Mutex<RoomState>,
}

/// A trick that filled up and is waiting out the presentation pause.
#[derive(Clone)]
pub struct PendingTrick {
    room: Arc<Room>,
    seq: u64,
}

impl fmt::Debug for PendingTrick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTrick")
            .field("room_id", &self.room.id)
            .field("seq", &self.seq)
            .finish()
    }
}

impl PendingTrick {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub async fn resolve_after(self, pause: Duration) -> bool {
        tokio::time::sleep(pause).await;
        self.room.resolve_trick(self.seq)
    }

    pub fn resolve_now(&self) -> bool {
        self.room.resolve_trick(self.seq)
    }
}

impl fmt::Debug for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Room")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl Room {
    fn new(capacity: usize, settings: RoomSettings) -> Self {
        Self {
            id: Ulid::new().to_string(),
            capacity,
            settings,
            state: Mutex::new(RoomState {
                owner: None,
                members: Vec::new(),
                game: MatchState::new(GameState::new(), settings.hands_per_match),
                started: false,
                trick_seq: 0,
                closed: false,
            }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> RoomSettings {
        self.settings
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().members.len()
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    pub fn owner(&self) -> Option<PlayerId> {
        self.state.lock().owner.clone()
    }

    pub fn game(&self) -> GameState {
        self.state.lock().game.game().clone()
    }

    pub fn view(&self) -> RoomView {
        self.compose_view(&self.state.lock())
    }

    fn join(&self, id: PlayerId, nickname: String, tx: Outbox) -> Result<(), RoomError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(RoomError::NotFound);
        }
        if state.started {
            return Err(RoomError::AlreadyStarted);
        }
        if state.members.len() >= self.capacity {
            return Err(RoomError::Full);
        }
        state
            .game
            .apply(|game| game.with_player(id.clone(), nickname))?;
        if state.owner.is_none() {
            state.owner = Some(id.clone());
        }
        info!(room_id = %self.id, player = %id, seats = state.members.len() + 1, "player joined");
        state.members.push(Member { id, tx });
        self.broadcast_room(&state);
        Ok(())
    }

    /// Deals the first hand of a fresh match. Chips start from zero.
    pub fn start(&self, by: &PlayerId) -> Result<(), RoomError> {
        let mut state = self.state.lock();
        if state.owner.as_ref() != Some(by) {
            return Err(RoomError::NotOwner);
        }
        if state.started {
            return Err(RoomError::AlreadyStarted);
        }
        let found = state.members.len();
        if found < MIN_PLAYERS {
            return Err(RoomError::NotEnoughPlayers { found });
        }

        let mut fresh = state.game.clone();
        fresh.reset();
        let mut game = MatchState::new(fresh.game().clone(), self.settings.hands_per_match);
        game.start_next_hand()?;
        state.game = game;
        state.started = true;
        state.trick_seq += 1;

        info!(room_id = %self.id, players = found, hands = self.settings.hands_per_match, "match started");
        self.broadcast_room(&state);
        self.broadcast_game(&state);
        Ok(())
    }

    /// Plays a card. Returns the pending trick when this card filled the table.
    pub fn play_card(
        self: &Arc<Self>,
        by: &PlayerId,
        card: Card,
    ) -> Result<Option<PendingTrick>, RoomError> {
        let mut state = self.state.lock();
        if !state.started {
            return Err(RoomError::NotStarted);
        }
        state.game.apply(|game| game.play_card(by, card))?;
        debug!(room_id = %self.id, player = %by, %card, "card played");
        self.broadcast_game(&state);

        if !state.game.game().is_trick_full() {
            return Ok(None);
        }
        state.trick_seq += 1;
        Ok(Some(PendingTrick {
            room: Arc::clone(self),
            seq: state.trick_seq,
        }))
    }

    /// Resolves the full trick if nothing has changed since it filled.
    /// Returns whether a resolution happened.
    fn resolve_trick(&self, seq: u64) -> bool {
        let mut state = self.state.lock();
        if !state.started || state.trick_seq != seq {
            debug!(room_id = %self.id, seq, current = state.trick_seq, "stale trick resolution skipped");
            return false;
        }

        let points = state.game.game().table().points_total();
        let cards = state.game.game().table().plays().to_vec();
        if let Err(err) = state.game.apply(GameState::resolve_trick) {
            warn!(room_id = %self.id, error = %err, "trick resolution rejected");
            return false;
        }
        if let Some(winner) = state.game.game().last_trick_winner_id().cloned() {
            self.broadcast(
                &state,
                &ServerMessage::TrickResolved {
                    winner,
                    cards,
                    points,
                },
            );
        }

        if state.game.game().is_hand_complete() {
            self.finish_hand(&mut state);
        } else {
            self.broadcast_game(&state);
        }
        true
    }

    fn finish_hand(&self, state: &mut RoomState) {
        let summary = match state.game.finish_hand() {
            Ok(summary) => summary.clone(),
            Err(err) => {
                warn!(room_id = %self.id, error = %err, "hand settlement rejected");
                return;
            }
        };
        info!(room_id = %self.id, hand = summary.hand_number, awards = summary.awards.len(), "hand over");
        self.broadcast(state, &ServerMessage::hand_over(&summary, state.game.game()));

        if state.game.is_over() {
            let winners = state.game.winners();
            let chips = ChipCount::all(state.game.game());
            info!(room_id = %self.id, winners = winners.len(), "match over");
            self.broadcast(state, &ServerMessage::MatchOver { winners, chips });
            let lobby = state.game.game().reset_to_lobby();
            let _ = state.game.apply(|_| Ok(lobby));
            state.started = false;
            self.broadcast_room(state);
            return;
        }

        match state.game.start_next_hand() {
            Ok(_) => self.broadcast_game(state),
            Err(err) => {
                warn!(room_id = %self.id, error = %err, "next hand could not be dealt");
                self.abandon_match(state);
            }
        }
    }

    /// Unseats a player. A match in progress is abandoned and the room goes
    /// back to the lobby. Returns the number of players left.
    fn leave(&self, id: &PlayerId) -> Result<usize, RoomError> {
        let mut state = self.state.lock();
        let seat = state
            .members
            .iter()
            .position(|m| &m.id == id)
            .ok_or(RoomError::NotInRoom)?;

        state.game.apply(|game| game.without_player(id))?;
        state.members.remove(seat);
        if state.started {
            self.abandon_match(&mut state);
        }

        if state.owner.as_ref() == Some(id) {
            state.owner = if state.members.is_empty() {
                None
            } else {
                Some(state.members[seat % state.members.len()].id.clone())
            };
        }

        let left = state.members.len();
        if left == 0 {
            state.closed = true;
        }
        info!(room_id = %self.id, player = %id, left, "player left");
        self.broadcast_room(&state);
        Ok(left)
    }

    fn abandon_match(&self, state: &mut RoomState) {
        state.started = false;
        // Invalidates any resolution still waiting out its pause.
        state.trick_seq += 1;
        let lobby = state.game.game().reset_to_lobby();
        let _ = state.game.apply(|_| Ok(lobby));
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    fn compose_view(&self, state: &RoomState) -> RoomView {
        RoomView {
            room_id: self.id.clone(),
            owner: state.owner.clone(),
            capacity: self.capacity,
            started: state.started,
            hands_per_match: self.settings.hands_per_match,
            hand_number: if state.started {
                state.game.current_hand_number()
            } else {
                0
            },
            players: state
                .game
                .game()
                .players()
                .iter()
                .map(|p| SeatView {
                    player_id: p.id.clone(),
                    nickname: p.nickname.clone(),
                    chips: p.chips,
                })
                .collect(),
        }
    }

    fn broadcast(&self, state: &RoomState, msg: &ServerMessage) {
        for member in &state.members {
            let _ = member.tx.send(msg.clone());
        }
    }

    fn broadcast_room(&self, state: &RoomState) {
        let room = self.compose_view(state);
        self.broadcast(state, &ServerMessage::RoomUpdate { room });
    }

    fn broadcast_game(&self, state: &RoomState) {
        let game = state.game.game();
        for member in &state.members {
            let view = GameView::for_player(game, &member.id);
            let _ = member.tx.send(ServerMessage::GameUpdate { game: view });
        }
    }
}

/// Registry of live rooms keyed by ULID.
#[derive(Default)]
pub struct RoomManager {
    rooms: DashMap<String, Arc<Room>>,
    settings: RoomSettings,
}

impl RoomManager {
    pub fn new(settings: RoomSettings) -> Self {
        Self {
            rooms: DashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> RoomSettings {
        self.settings
    }

    /// Opens a room with the creator seated as owner.
    pub fn create_room(
        &self,
        owner: PlayerId,
        nickname: String,
        capacity: usize,
        tx: Outbox,
    ) -> Result<Arc<Room>, RoomError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&capacity) {
            return Err(RoomError::InvalidCapacity(capacity));
        }
        let room = Arc::new(Room::new(capacity, self.settings));
        room.join(owner, nickname, tx)?;
        self.rooms.insert(room.id().to_string(), Arc::clone(&room));
        info!(room_id = %room.id(), capacity, "room created");
        Ok(room)
    }

    pub fn join_room(
        &self,
        room_id: &str,
        player: PlayerId,
        nickname: String,
        tx: Outbox,
    ) -> Result<Arc<Room>, RoomError> {
        let room = self.get(room_id).ok_or(RoomError::NotFound)?;
        room.join(player, nickname, tx)?;
        Ok(room)
    }

    /// Unseats a player and drops the room once nobody is left in it.
    pub fn leave_room(&self, room: &Room, player: &PlayerId) -> Result<(), RoomError> {
        if room.leave(player)? == 0 {
            self.rooms.remove_if(room.id(), |_, r| r.is_closed());
            info!(room_id = %room.id(), "room dropped");
        }
        Ok(())
    }

    pub fn get(&self, room_id: &str) -> Option<Arc<Room>> {
        self.rooms.get(room_id).map(|r| Arc::clone(r.value()))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
