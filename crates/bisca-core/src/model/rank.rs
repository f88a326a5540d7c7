use core::fmt;
use serde::{Deserialize, Serialize};

/// The ten ranks of the Italian-suited deck; there is no 8, 9 or 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    Ace,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Jack,
    Queen,
    King,
}

impl Rank {
    /// Token order, used when generating the deck.
    pub const ORDERED: [Rank; 10] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol.to_ascii_uppercase() {
            'A' => Some(Rank::Ace),
            '2' => Some(Rank::Two),
            '3' => Some(Rank::Three),
            '4' => Some(Rank::Four),
            '5' => Some(Rank::Five),
            '6' => Some(Rank::Six),
            '7' => Some(Rank::Seven),
            'J' => Some(Rank::Jack),
            'Q' => Some(Rank::Queen),
            'K' => Some(Rank::King),
            _ => None,
        }
    }

    pub const fn symbol(self) -> char {
        match self {
            Rank::Ace => 'A',
            Rank::Two => '2',
            Rank::Three => '3',
            Rank::Four => '4',
            Rank::Five => '5',
            Rank::Six => '6',
            Rank::Seven => '7',
            Rank::Jack => 'J',
            Rank::Queen => 'Q',
            Rank::King => 'K',
        }
    }

    /// Trick-taking strength: A > 7 > K > J > Q > 6 > 5 > 4 > 3 > 2.
    pub const fn strength(self) -> u8 {
        match self {
            Rank::Ace => 9,
            Rank::Seven => 8,
            Rank::King => 7,
            Rank::Jack => 6,
            Rank::Queen => 5,
            Rank::Six => 4,
            Rank::Five => 3,
            Rank::Four => 2,
            Rank::Three => 1,
            Rank::Two => 0,
        }
    }

    pub const fn points(self) -> u32 {
        match self {
            Rank::Seven => 11,
            Rank::Ace => 10,
            Rank::King => 4,
            Rank::Jack => 3,
            Rank::Queen => 2,
            Rank::Two | Rank::Three | Rank::Four | Rank::Five | Rank::Six => 0,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
