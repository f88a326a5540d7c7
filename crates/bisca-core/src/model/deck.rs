use crate::model::card::Card;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

pub const DECK_SIZE: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    cards: Vec<Card>,
}

impl Deck {
    /// All 40 cards, suit-major then rank-minor.
    pub fn standard() -> Self {
        let mut cards = Vec::with_capacity(DECK_SIZE);
        for suit in Suit::ALL.iter().copied() {
            for rank in Rank::ORDERED.iter().copied() {
                cards.push(Card::new(rank, suit));
            }
        }
        Self { cards }
    }

    /// A scripted deck; `None` unless it holds each of the 40 cards exactly once.
    pub fn from_cards(cards: Vec<Card>) -> Option<Self> {
        let distinct: HashSet<Card> = cards.iter().copied().collect();
        if cards.len() != DECK_SIZE || distinct.len() != DECK_SIZE {
            return None;
        }
        Some(Self { cards })
    }

    /// Returns a shuffled copy; `self` keeps its order.
    pub fn shuffled<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let mut cards = self.cards.clone();
        cards.shuffle(rng);
        Self { cards }
    }

    pub fn shuffled_with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::standard().shuffled(&mut rng)
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn into_cards(self) -> Vec<Card> {
        self.cards
    }
}
