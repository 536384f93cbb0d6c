//! The duel driver.
//!
//! `Duel` owns a `DuelState` plus the two boundaries the rules need: a
//! [`Prompt`] for the prompt-driven side and a [`Presenter`] for every
//! board change. Rule operations are implemented as `impl Duel` blocks in
//! the modules they belong to (`rules`, `effects`, `triggers`, `cpu`).
//!
//! ## Example
//!
//! ```
//! use card_duel::cards::Catalog;
//! use card_duel::core::{DuelConfig, Side};
//! use card_duel::duel::DuelBuilder;
//! use futures::executor::block_on;
//!
//! let mut duel = DuelBuilder::new(Catalog::starter().unwrap())
//!     .config(DuelConfig::default().with_human_side(None).with_cpu_pacing(0, 0))
//!     .recipe(Side::Player, "starter_fire")
//!     .recipe(Side::Opponent, "starter_fire")
//!     .seed(7)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(duel.state().side(Side::Player).hand.len(), 5);
//! block_on(duel.run_until_input(20));
//! ```

mod builder;

pub use builder::DuelBuilder;

use tracing::info;

use crate::core::{DuelOutcome, DuelState, Side};
use crate::prompt::{Presenter, Prompt};
use crate::triggers::DuelEvent;

/// A running duel.
pub struct Duel {
    pub(crate) state: DuelState,
    pub(crate) prompt: Box<dyn Prompt>,
    pub(crate) presenter: Box<dyn Presenter>,
    /// Current trigger cascade depth.
    pub(crate) depth: usize,
    pub(crate) cancel: CancelState,
}

/// Whether a human selection abandoned the spell or ignition in progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum CancelState {
    /// No cancellable action is resolving.
    #[default]
    Idle,
    Armed,
    Cancelled,
}

impl Duel {
    /// Wrap an existing state. No phase logic runs; see [`Duel::start`].
    #[must_use]
    pub fn new(state: DuelState, prompt: Box<dyn Prompt>, presenter: Box<dyn Presenter>) -> Self {
        Self {
            state,
            prompt,
            presenter,
            depth: 0,
            cancel: CancelState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> &DuelState {
        &self.state
    }

    /// Direct state access, for board setup and puzzles.
    pub fn state_mut(&mut self) -> &mut DuelState {
        &mut self.state
    }

    #[must_use]
    pub fn into_state(self) -> DuelState {
        self.state
    }

    /// Whether `side` is driven by the decision heuristic.
    #[must_use]
    pub fn is_automated(&self, side: Side) -> bool {
        self.state.config.is_automated(side)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.state.winner()
    }

    pub(crate) fn emit(&mut self, event: DuelEvent) {
        self.presenter.on_event(&event, &self.state);
    }

    pub(crate) async fn pause(&mut self, millis: u64) {
        if millis > 0 {
            self.presenter.pause(millis).await;
        }
    }

    /// Record a cancelled selection.
    ///
    /// Only the action's own instructions can abandon it; a cancelled
    /// selection inside a cascaded reaction just skips that reaction.
    pub(crate) fn note_cancel(&mut self) {
        if self.depth <= 1 && self.cancel == CancelState::Armed {
            self.cancel = CancelState::Cancelled;
        }
    }

    #[must_use]
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel == CancelState::Cancelled
    }

    /// Record the winner and lock the duel.
    pub(crate) fn finish(&mut self, winner: Side) {
        if self.state.is_over() {
            return;
        }
        self.state.outcome = Some(DuelOutcome {
            winner,
            turn: self.state.turn,
        });
        info!(winner = %winner, turn = self.state.turn, "duel ended");
        self.emit(DuelEvent::DuelEnded { winner });
    }
}

impl std::fmt::Debug for Duel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Duel")
            .field("turn", &self.state.turn)
            .field("active", &self.state.active)
            .field("phase", &self.state.phase)
            .field("outcome", &self.state.outcome)
            .finish_non_exhaustive()
    }
}
