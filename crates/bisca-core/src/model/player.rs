use crate::model::card::Card;
use crate::model::hand::Hand;
use core::fmt;
use serde::{Deserialize, Serialize};

/// Opaque per-connection identifier, unique within a game.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    pub hand: Hand,
    /// Card points won during the current hand.
    pub score: u32,
    pub captured_cards: Vec<Card>,
    /// Match-level bonus points, kept across hands.
    pub chips: u32,
}

impl Player {
    pub fn new(id: PlayerId, nickname: impl Into<String>) -> Self {
        Self {
            id,
            nickname: nickname.into(),
            hand: Hand::new(),
            score: 0,
            captured_cards: Vec::new(),
            chips: 0,
        }
    }

    /// Clears everything tied to a single hand; chips survive.
    pub fn reset_for_hand(&mut self) {
        self.hand = Hand::new();
        self.score = 0;
        self.captured_cards.clear();
    }

    pub fn capture(&mut self, cards: impl IntoIterator<Item = Card>) {
        for card in cards {
            self.score += card.points();
            self.captured_cards.push(card);
        }
    }
}
