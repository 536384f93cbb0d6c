//! Duel rules: phases, turn flow, combat and player actions.
//!
//! - `phase`: The five phases and their order
//! - `turn`: Phase advancement, end of turn and the draw phase
//! - `combat`: Attacks, destruction and damage
//! - `actions`: Legality checks and the summon/activation entry points
//!
//! Every entry point returns an [`ActionOutcome`]. Illegal requests are
//! rejected before anything on the board changes.

mod actions;
mod combat;
mod phase;
mod turn;

pub use actions::{
    check_attack, check_ignition, check_normal_summon, check_spell, cost_candidates, is_activatable,
    legal_attackers, legal_ignitions, legal_spells, legal_summons, ActionOutcome, IllegalAction, SummonPlan,
};
pub use phase::Phase;
