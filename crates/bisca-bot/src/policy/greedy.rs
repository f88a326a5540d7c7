use super::{Policy, PolicyContext, log_play_decision};
use bisca_core::model::card::Card;
use bisca_core::model::suit::Suit;
use bisca_core::model::trick::winning_index;

/// Takes tricks that carry points with the cheapest winning card and
/// otherwise throws away the least valuable card it may legally play.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyPolicy;

impl GreedyPolicy {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for GreedyPolicy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Card> {
        let legal = ctx.legal_cards();
        let trump = ctx.state.trump_suit()?;
        let table = ctx.state.table();

        let (chosen, reason) = if table.is_empty() {
            (cheapest(&legal, trump)?, "lead_cheapest")
        } else if table.points_total() > 0 {
            let on_table: Vec<Card> = table.cards().collect();
            let winners: Vec<Card> = legal
                .iter()
                .copied()
                .filter(|&card| wins_with(&on_table, card, trump))
                .collect();
            match cheapest(&winners, trump) {
                Some(card) => (card, "take_points"),
                None => (cheapest(&legal, trump)?, "shed_cannot_win"),
            }
        } else {
            (cheapest(&legal, trump)?, "shed_empty_table")
        };

        log_play_decision(ctx, self.name(), &legal, chosen, reason);
        Some(chosen)
    }
}

fn wins_with(on_table: &[Card], card: Card, trump: Suit) -> bool {
    let mut cards = on_table.to_vec();
    cards.push(card);
    winning_index(&cards, trump) == Some(on_table.len())
}

/// Lowest point value first, then non-trump before trump, then weakest.
fn cheapest(cards: &[Card], trump: Suit) -> Option<Card> {
    cards
        .iter()
        .copied()
        .min_by_key(|card| (card.points(), card.is_trump(trump), card.rank.strength()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bisca_core::model::deck::Deck;
    use bisca_core::{GameState, PlayerId};

    fn card(token: &str) -> Card {
        token.parse().unwrap()
    }

    fn scripted(a: [&str; 10], b: [&str; 10], trump: &str) -> GameState {
        let mut cards = Vec::new();
        for (x, y) in a.iter().zip(b.iter()) {
            cards.push(card(x));
            cards.push(card(y));
        }
        for c in Deck::standard().into_cards() {
            if !cards.contains(&c) {
                cards.push(c);
            }
        }
        let deck = Deck::from_cards(cards).unwrap();
        GameState::new()
            .with_player(PlayerId::new("a"), "Ana")
            .unwrap()
            .with_player(PlayerId::new("b"), "Bea")
            .unwrap()
            .start_with_deck(&deck, card(trump))
            .unwrap()
    }

    const A_HAND: [&str; 10] = ["AS", "2S", "3S", "4S", "5S", "6S", "7S", "JS", "QS", "KS"];

    #[test]
    fn leads_its_cheapest_card() {
        // Trump hearts; seat 0 holds none so any spade may open.
        let b = ["2H", "3H", "4H", "5H", "6H", "7H", "JH", "AH", "KH", "QH"];
        let state = scripted(A_HAND, b, "2H");
        let ctx = PolicyContext::for_current(&state).unwrap();
        assert_eq!(GreedyPolicy::new().choose_play(&ctx), Some(card("2S")));
    }

    #[test]
    fn takes_points_with_the_cheapest_winner() {
        let b = ["2H", "3H", "4H", "5H", "6H", "7H", "JH", "AH", "KH", "QH"];
        let state = scripted(A_HAND, b, "2H")
            .play_card(&PlayerId::new("a"), card("KS"))
            .unwrap();
        let ctx = PolicyContext::for_current(&state).unwrap();
        // No spades in hand, so every trump wins; the two is cheapest.
        assert_eq!(GreedyPolicy::new().choose_play(&ctx), Some(card("2H")));
    }

    #[test]
    fn sheds_when_the_table_is_worthless() {
        let b = ["2H", "3H", "4H", "5H", "6H", "7H", "JH", "AH", "KH", "QH"];
        let state = scripted(A_HAND, b, "2H")
            .play_card(&PlayerId::new("a"), card("2S"))
            .unwrap();
        let ctx = PolicyContext::for_current(&state).unwrap();
        // Nothing worth taking; the two of trumps is still the lowest value.
        assert_eq!(GreedyPolicy::new().choose_play(&ctx), Some(card("2H")));
    }

    #[test]
    fn follows_suit_with_the_cheapest_winner() {
        let a = ["KD", "2S", "3S", "4S", "5S", "6S", "7S", "JS", "QS", "KS"];
        let b = ["AD", "7D", "2H", "3H", "4H", "5H", "6H", "2D", "3D", "JH"];
        let state = scripted(a, b, "2H")
            .play_card(&PlayerId::new("a"), card("KD"))
            .unwrap();
        let ctx = PolicyContext::for_current(&state).unwrap();
        // Must follow diamonds; A and 7 both beat the king, the ace is worth less.
        assert_eq!(GreedyPolicy::new().choose_play(&ctx), Some(card("AD")));
    }
}
