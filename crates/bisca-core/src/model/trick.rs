use crate::model::card::Card;
use crate::model::player::PlayerId;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use serde::{Deserialize, Serialize};

/// One card on the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TablePlay {
    pub player_id: PlayerId,
    pub nickname: String,
    pub card: Card,
}

/// The trick being played, in play order. Empty between tricks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trick {
    plays: Vec<TablePlay>,
}

impl Trick {
    pub fn new() -> Self {
        Self {
            plays: Vec::with_capacity(4),
        }
    }

    pub fn plays(&self) -> &[TablePlay] {
        &self.plays
    }

    pub fn len(&self) -> usize {
        self.plays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    pub fn lead_suit(&self) -> Option<Suit> {
        self.plays.first().map(|play| play.card.suit)
    }

    pub fn push(&mut self, play: TablePlay) {
        self.plays.push(play);
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.plays.iter().map(|play| play.card)
    }

    pub fn points_total(&self) -> u32 {
        self.cards().map(Card::points).sum()
    }

    pub fn winning_index(&self, trump: Suit) -> Option<usize> {
        let cards: Vec<Card> = self.cards().collect();
        winning_index(&cards, trump)
    }

    pub fn take(&mut self) -> Vec<TablePlay> {
        std::mem::take(&mut self.plays)
    }
}

/// Index of the winning card of a trick, in play order.
///
/// The first card starts as best and each later card challenges it. Two
/// off-suit discards never displace one another.
pub fn winning_index(cards: &[Card], trump: Suit) -> Option<usize> {
    let lead = cards.first()?.suit;
    let mut best = 0;
    for (index, &challenger) in cards.iter().enumerate().skip(1) {
        if beats(challenger, cards[best], lead, trump) {
            best = index;
        }
    }
    Some(best)
}

/// Whether `challenger` takes the trick from `best`.
pub fn beats(challenger: Card, best: Card, lead: Suit, trump: Suit) -> bool {
    // Marriage: the trump ace always takes the trump seven.
    if best.is_trump_rank(Rank::Seven, trump) && challenger.is_trump_rank(Rank::Ace, trump) {
        return true;
    }
    if best.is_trump_rank(Rank::Ace, trump) && challenger.is_trump_rank(Rank::Seven, trump) {
        return false;
    }

    match (challenger.is_trump(trump), best.is_trump(trump)) {
        (true, false) => true,
        (false, true) => false,
        (true, true) => challenger.rank.strength() > best.rank.strength(),
        (false, false) => {
            let challenger_follows = challenger.suit == lead;
            let best_follows = best.suit == lead;
            match (challenger_follows, best_follows) {
                (true, false) => true,
                (true, true) => challenger.rank.strength() > best.rank.strength(),
                (false, _) => false,
            }
        }
    }
}
