//! One connected player: which room they sit in and how their messages map
//! onto room operations.

use std::sync::Arc;

use bisca_core::PlayerId;
use tracing::debug;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::{Outbox, Room, RoomError, RoomManager};

pub struct Session {
    player_id: PlayerId,
    tx: Outbox,
    rooms: Arc<RoomManager>,
    room: Option<Arc<Room>>,
}

impl Session {
    pub fn new(player_id: PlayerId, tx: Outbox, rooms: Arc<RoomManager>) -> Self {
        Self {
            player_id,
            tx,
            rooms,
            room: None,
        }
    }

    pub fn player_id(&self) -> &PlayerId {
        &self.player_id
    }

    pub fn room(&self) -> Option<&Arc<Room>> {
        self.room.as_ref()
    }

    pub fn send(&self, msg: ServerMessage) {
        let _ = self.tx.send(msg);
    }

    /// Applies one client message. Failures are reported back to this
    /// player only.
    pub fn handle(&mut self, msg: ClientMessage) {
        if let Err(err) = self.dispatch(msg) {
            debug!(player = %self.player_id, error = %err, "request rejected");
            self.send(ServerMessage::error(err));
        }
    }

    fn dispatch(&mut self, msg: ClientMessage) -> Result<(), RoomError> {
        match msg {
            ClientMessage::Ping => {
                self.send(ServerMessage::Pong);
                Ok(())
            }
            ClientMessage::CreateRoom { nickname, capacity } => {
                self.ensure_no_room()?;
                let room = self.rooms.create_room(
                    self.player_id.clone(),
                    nickname,
                    capacity,
                    self.tx.clone(),
                )?;
                self.room = Some(room);
                Ok(())
            }
            ClientMessage::JoinRoom { room_id, nickname } => {
                self.ensure_no_room()?;
                let room = self.rooms.join_room(
                    &room_id,
                    self.player_id.clone(),
                    nickname,
                    self.tx.clone(),
                )?;
                self.room = Some(room);
                Ok(())
            }
            ClientMessage::StartGame => self.current_room()?.start(&self.player_id),
            ClientMessage::PlayCard { card } => {
                let room = self.current_room()?;
                if let Some(pending) = room.play_card(&self.player_id, card)? {
                    let pause = room.settings().trick_pause;
                    debug!(
                        room_id = %room.id(),
                        seq = pending.seq(),
                        ?pause,
                        "trick full, resolution scheduled"
                    );
                    tokio::spawn(pending.resolve_after(pause));
                }
                Ok(())
            }
            ClientMessage::LeaveRoom => {
                let room = self.room.take().ok_or(RoomError::NotInRoom)?;
                self.rooms.leave_room(&room, &self.player_id)
            }
        }
    }

    /// Leaves whatever room the player is in. Called when the socket closes.
    pub fn disconnect(&mut self) {
        if let Some(room) = self.room.take() {
            let _ = self.rooms.leave_room(&room, &self.player_id);
        }
    }

    fn ensure_no_room(&self) -> Result<(), RoomError> {
        if self.room.is_some() {
            return Err(RoomError::AlreadyInRoom);
        }
        Ok(())
    }

    fn current_room(&self) -> Result<Arc<Room>, RoomError> {
        self.room.clone().ok_or(RoomError::NotInRoom)
    }
}
