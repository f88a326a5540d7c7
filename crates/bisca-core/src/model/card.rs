use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A card, written on the wire as its two-character token (`7S`, `AH`, `QD`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    pub const fn points(self) -> u32 {
        self.rank.points()
    }

    pub fn is_trump(self, trump: Suit) -> bool {
        self.suit == trump
    }

    pub fn is_trump_rank(self, rank: Rank, trump: Suit) -> bool {
        self.rank == rank && self.suit == trump
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCardError {
    Length(usize),
    Rank(char),
    Suit(char),
}

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCardError::Length(len) => {
                write!(f, "card token must be two characters, got {len}")
            }
            ParseCardError::Rank(symbol) => write!(f, "unknown rank '{symbol}'"),
            ParseCardError::Suit(symbol) => write!(f, "unknown suit '{symbol}'"),
        }
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = token.trim().chars().collect();
        let [rank, suit] = symbols[..] else {
            return Err(ParseCardError::Length(symbols.len()));
        };
        let rank = Rank::from_symbol(rank).ok_or(ParseCardError::Rank(rank))?;
        let suit = Suit::from_symbol(suit).ok_or(ParseCardError::Suit(suit))?;
        Ok(Card::new(rank, suit))
    }
}

impl TryFrom<String> for Card {
    type Error = ParseCardError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        token.parse()
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}
