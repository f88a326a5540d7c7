use super::{Policy, PolicyContext, log_play_decision};
use bisca_core::model::card::Card;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Plays a uniformly random legal card. Seeded so bench runs repeat.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn name(&self) -> &'static str {
        "random"
    }

    fn choose_play(&mut self, ctx: &PolicyContext) -> Option<Card> {
        let legal = ctx.legal_cards();
        let chosen = *legal.choose(&mut self.rng)?;
        log_play_decision(ctx, self.name(), &legal, chosen, "uniform");
        Some(chosen)
    }
}
