//! JSON messages exchanged over the socket, tagged by `type`.

use bisca_core::game::chips::ChipAward;
use bisca_core::game::match_state::HandSummary;
use bisca_core::model::trick::TablePlay;
use bisca_core::{Card, GameState, Phase, PlayerId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CAPACITY: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    CreateRoom {
        nickname: String,
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
    JoinRoom {
        room_id: String,
        nickname: String,
    },
    StartGame,
    PlayCard {
        card: Card,
    },
    LeaveRoom,
    Ping,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        player_id: PlayerId,
    },
    RoomUpdate {
        room: RoomView,
    },
    GameUpdate {
        game: GameView,
    },
    TrickResolved {
        winner: PlayerId,
        cards: Vec<TablePlay>,
        points: u32,
    },
    HandOver {
        hand_number: u32,
        scores: Vec<(PlayerId, u32)>,
        awards: Vec<ChipAward>,
        chips: Vec<ChipCount>,
    },
    MatchOver {
        winners: Vec<PlayerId>,
        chips: Vec<ChipCount>,
    },
    Error {
        message: String,
    },
    Pong,
}

impl ServerMessage {
    pub fn error(message: impl ToString) -> Self {
        ServerMessage::Error {
            message: message.to_string(),
        }
    }

    pub fn hand_over(summary: &HandSummary, game: &GameState) -> Self {
        ServerMessage::HandOver {
            hand_number: summary.hand_number,
            scores: summary.scores.clone(),
            awards: summary.awards.clone(),
            chips: ChipCount::all(game),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChipCount {
    pub player_id: PlayerId,
    pub chips: u32,
}

impl ChipCount {
    pub fn all(game: &GameState) -> Vec<ChipCount> {
        game.players()
            .iter()
            .map(|p| ChipCount {
                player_id: p.id.clone(),
                chips: p.chips,
            })
            .collect()
    }
}

/// Lobby-level view of a room, identical for every member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    pub room_id: String,
    pub owner: Option<PlayerId>,
    pub capacity: usize,
    pub started: bool,
    pub hands_per_match: u32,
    pub hand_number: u32,
    pub players: Vec<SeatView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatView {
    pub player_id: PlayerId,
    pub nickname: String,
    pub chips: u32,
}

/// What one player is allowed to see: their own cards and only the sizes of
/// everyone else's hands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub phase: Phase,
    pub trump_card: Option<Card>,
    pub round_number: u32,
    pub turn: Option<PlayerId>,
    pub table: Vec<TablePlay>,
    pub hand: Vec<Card>,
    pub players: Vec<PlayerView>,
    pub last_trick_winner: Option<PlayerId>,
    pub undealt: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub player_id: PlayerId,
    pub nickname: String,
    pub hand_size: usize,
    pub score: u32,
    pub chips: u32,
    pub captured: usize,
}

impl GameView {
    pub fn for_player(game: &GameState, viewer: &PlayerId) -> Self {
        let hand = game
            .player(viewer)
            .map(|p| p.hand.cards().to_vec())
            .unwrap_or_default();
        let turn = if game.is_trick_full() {
            None
        } else {
            game.current_player().map(|p| p.id.clone())
        };
        GameView {
            phase: game.phase(),
            trump_card: game.trump_card(),
            round_number: game.round_number(),
            turn,
            table: game.table().plays().to_vec(),
            hand,
            players: game
                .players()
                .iter()
                .map(|p| PlayerView {
                    player_id: p.id.clone(),
                    nickname: p.nickname.clone(),
                    hand_size: p.hand.len(),
                    score: p.score,
                    chips: p.chips,
                    captured: p.captured_cards.len(),
                })
                .collect(),
            last_trick_winner: game.last_trick_winner_id().cloned(),
            undealt: game.deck().len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bisca_core::model::deck::Deck;

    #[test]
    fn client_messages_use_snake_case_tags() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"play_card","card":"7S"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::PlayCard {
                card: "7S".parse().unwrap()
            }
        );

        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"create_room","nickname":"Ana"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::CreateRoom {
                nickname: "Ana".to_string(),
                capacity: DEFAULT_CAPACITY
            }
        );

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"play_card","card":"1S"}"#).is_err());
    }

    #[test]
    fn pong_serializes_as_bare_tag() {
        let text = serde_json::to_string(&ServerMessage::Pong).unwrap();
        assert_eq!(text, r#"{"type":"pong"}"#);
    }

    #[test]
    fn game_view_hides_other_hands() {
        let game = GameState::new()
            .with_player(PlayerId::new("a"), "Ana")
            .unwrap()
            .with_player(PlayerId::new("b"), "Bea")
            .unwrap()
            .start_with_deck(&Deck::standard(), "2H".parse().unwrap())
            .unwrap();
        let view = GameView::for_player(&game, &PlayerId::new("b"));

        assert_eq!(view.hand.len(), 10);
        assert!(view.hand.contains(&"2H".parse().unwrap()));
        assert_eq!(view.turn, Some(PlayerId::new("a")));
        assert_eq!(view.undealt, 20);
        assert!(view.players.iter().all(|p| p.hand_size == 10));

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["phase"], "in_progress");
        assert_eq!(json["trump_card"], "2H");
        // Seat a's cards never appear in b's view.
        assert!(!json.to_string().contains("\"AS\""));
    }
}
