//! Effect system: instructions, targeting, aggregation and interpretation.
//!
//! - `EffectInstruction`: One trigger-gated step of a card's behaviour
//! - `TargetSpec`: Which board monsters an instruction may touch
//! - `aura`: Standing power, protection and damage reduction, recomputed
//!   from the board on every query
//! - `resolver`: The interpreter that runs a card's instructions for a
//!   trigger, recursing into cascades
//! - `movement`: Pile handlers (draw, refresh, mill, search, special
//!   summon, discard)
//!
//! ## Design Philosophy
//!
//! Instructions are data. Handlers never see card-specific code; a new
//! card is a new catalog entry built from the existing kinds.

mod aura;
mod effect;
mod movement;
mod resolver;
mod targeting;

pub use aura::{
    aura_bonus, condition_holds, consume_protection, damage_reduction, effective_power, final_damage,
    is_battle_protected, is_protected,
};
pub use effect::{
    BuffDuration, CombatEffect, Condition, CountLimit, DestroyCause, EffectAction, EffectInstruction, Origin,
    ProtectionKind,
};
pub use movement::summon_candidates;
pub use resolver::instruction_actionable;
pub use targeting::{
    candidates, cpu_preference, has_trash_payoff, Candidate, CardFilter, Intent, SelectMode, TargetCondition,
    TargetScope, TargetSpec,
};
