//! Duel construction.

use tracing::info;

use super::Duel;
use crate::cards::Catalog;
use crate::core::{DuelConfig, DuelError, DuelResult, DuelState, Side, SideMap};
use crate::prompt::{DeclinePrompt, NullPresenter, Presenter, Prompt};

/// Builder for a ready-to-play [`Duel`].
///
/// `build` instantiates both recipes from the catalog, shuffles, flips for
/// the first turn, deals opening hands and enters the first DRAW phase.
/// Catalog problems surface here as `DuelError`s and never mid-duel.
pub struct DuelBuilder {
    catalog: Catalog,
    config: DuelConfig,
    recipes: SideMap<Option<String>>,
    seed: u64,
    first: Option<Side>,
    shuffle: bool,
    prompt: Option<Box<dyn Prompt>>,
    presenter: Option<Box<dyn Presenter>>,
}

impl DuelBuilder {
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            config: DuelConfig::default(),
            recipes: SideMap::with_default(),
            seed: 0,
            first: None,
            shuffle: true,
            prompt: None,
            presenter: None,
        }
    }

    #[must_use]
    pub fn config(mut self, config: DuelConfig) -> Self {
        self.config = config;
        self
    }

    /// Deck recipe key for one side.
    #[must_use]
    pub fn recipe(mut self, side: Side, key: impl Into<String>) -> Self {
        self.recipes[side] = Some(key.into());
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Skip the coin flip.
    #[must_use]
    pub fn first_side(mut self, side: Side) -> Self {
        self.first = Some(side);
        self
    }

    /// Keep decks in recipe order; the last recipe card is drawn first.
    #[must_use]
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }

    #[must_use]
    pub fn prompt(mut self, prompt: impl Prompt + 'static) -> Self {
        self.prompt = Some(Box::new(prompt));
        self
    }

    #[must_use]
    pub fn presenter(mut self, presenter: impl Presenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    /// Build the duel and run it up to the first DRAW phase.
    pub fn build(self) -> DuelResult<Duel> {
        let mut state = DuelState::new(self.config, self.seed);

        for side in Side::BOTH {
            let key = self.recipes[side]
                .as_deref()
                .ok_or(DuelError::MissingRecipe(side))?;
            let deck = self.catalog.build_deck(key, side, || state.next_instance_id())?;
            state.side_mut(side).deck = deck.into_iter().collect();
            if self.shuffle {
                state.shuffle_deck(side);
            }
        }

        let first = match self.first {
            Some(side) => side,
            None if state.rng.coin_flip() => Side::Player,
            None => Side::Opponent,
        };
        state.first = first;
        state.active = first;
        info!(first = %first, seed = self.seed, "duel created");

        let prompt = self.prompt.unwrap_or_else(|| Box::new(DeclinePrompt));
        let presenter = self.presenter.unwrap_or_else(|| Box::new(NullPresenter));
        let mut duel = Duel::new(state, prompt, presenter);
        duel.deal_opening_hands();
        duel.start();
        Ok(duel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Phase;

    fn builder() -> DuelBuilder {
        DuelBuilder::new(Catalog::starter().unwrap())
            .recipe(Side::Player, "starter_fire")
            .recipe(Side::Opponent, "starter_fire")
    }

    #[test]
    fn test_build_deals_opening_hands() {
        let duel = builder().seed(42).build().unwrap();
        let state = duel.state();

        for side in Side::BOTH {
            assert_eq!(state.side(side).hand.len(), 5);
            assert_eq!(state.side(side).deck.len(), 15);
            assert_eq!(state.side(side).life, 4000);
        }
        assert_eq!(state.phase, Phase::Draw);
        assert_eq!(state.turn, 1);
        assert_eq!(state.active, state.first);
    }

    #[test]
    fn test_first_side_override() {
        let duel = builder().first_side(Side::Opponent).build().unwrap();
        assert_eq!(duel.state().active, Side::Opponent);
        assert_eq!(duel.state().first, Side::Opponent);
    }

    #[test]
    fn test_same_seed_same_duel() {
        let hand = |seed| {
            let duel = builder().seed(seed).build().unwrap();
            duel.state()
                .side(Side::Player)
                .hand
                .iter()
                .map(|c| c.code().to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(hand(5), hand(5));
    }

    #[test]
    fn test_missing_recipe_is_an_error() {
        let err = DuelBuilder::new(Catalog::starter().unwrap())
            .recipe(Side::Player, "starter_fire")
            .build()
            .unwrap_err();
        assert!(matches!(err, DuelError::MissingRecipe(Side::Opponent)));
    }

    #[test]
    fn test_unknown_recipe_is_an_error() {
        let err = builder().recipe(Side::Opponent, "nope").build().unwrap_err();
        assert!(matches!(err, DuelError::UnknownRecipe(key) if key == "nope"));
    }

    #[test]
    fn test_unshuffled_deck_draws_from_recipe_end() {
        let duel = builder().without_shuffle().first_side(Side::Player).build().unwrap();
        let hand: Vec<_> = duel
            .state()
            .side(Side::Player)
            .hand
            .iter()
            .map(|c| c.code().to_string())
            .collect();
        // Recipe ends with m005, m005, s003, s003, s003.
        assert_eq!(hand, vec!["m005", "m005", "s003", "s003", "s003"]);
    }
}
