use super::engine::GameState;
use super::match_state::{HandSummary, MatchState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSnapshot {
    pub seed: u64,
    pub total_hands: u32,
    pub hands_played: u32,
    #[serde(default)]
    pub history: Vec<HandSummary>,
    pub game: GameState,
}

impl MatchSnapshot {
    pub fn capture(state: &MatchState) -> Self {
        MatchSnapshot {
            seed: state.seed(),
            total_hands: state.total_hands(),
            hands_played: state.hands_played(),
            history: state.history().to_vec(),
            game: state.game().clone(),
        }
    }

    pub fn restore(self) -> MatchState {
        MatchState::from_parts(
            self.game,
            self.total_hands,
            self.hands_played,
            self.history,
            self.seed,
        )
    }

    pub fn to_json(state: &MatchState) -> serde_json::Result<String> {
        let snapshot = Self::capture(state);
        serde_json::to_string_pretty(&snapshot)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::MatchSnapshot;
    use crate::game::engine::GameState;
    use crate::game::match_state::MatchState;
    use crate::model::player::PlayerId;

    fn started_match(seed: u64) -> MatchState {
        let lobby = GameState::new()
            .with_player(PlayerId::new("a"), "A")
            .unwrap()
            .with_player(PlayerId::new("b"), "B")
            .unwrap();
        let mut state = MatchState::with_seed(lobby, 3, seed);
        state.start_next_hand().unwrap();
        state
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let state = started_match(99);
        let json = MatchSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"seed\": 99"));
        assert!(json.contains("\"total_hands\": 3"));
        assert!(json.contains("\"trump_card\""));
    }

    #[test]
    fn snapshot_roundtrip_restores_game_and_progress() {
        let state = started_match(123);
        let json = MatchSnapshot::to_json(&state).unwrap();
        let restored = MatchSnapshot::from_json(&json).unwrap().restore();
        assert_eq!(restored.seed(), 123);
        assert_eq!(restored.hands_played(), 0);
        assert_eq!(restored.total_hands(), 3);
        assert_eq!(restored.game(), state.game());
    }

    #[test]
    fn snapshot_without_history_defaults_to_empty() {
        let state = started_match(5);
        let mut value: serde_json::Value =
            serde_json::from_str(&MatchSnapshot::to_json(&state).unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("history");
        let snapshot: MatchSnapshot = serde_json::from_value(value).unwrap();
        assert!(snapshot.history.is_empty());
    }
}
