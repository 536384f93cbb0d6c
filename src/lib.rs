//! # card-duel
//!
//! Rules engine for a two-player trading-card duel.
//!
//! ## Design Principles
//!
//! 1. **Cards Are Data**: Every card behaviour is a list of effect
//!    instructions from a closed set of kinds. The interpreter dispatches
//!    each kind to exactly one handler.
//!
//! 2. **Derived, Never Cached**: Effective power, protection and damage
//!    reduction are recomputed from the board on every query.
//!
//! 3. **Decisions Behind Futures**: The prompt-driven side answers through
//!    the `Prompt` trait; the engine awaits the answer and never blocks on
//!    a user interface.
//!
//! ## Architecture
//!
//! - **Depth-First Cascades**: A summoned or destroyed card's reactions run
//!   to completion before the instruction that caused them continues.
//!
//! - **Persistent Data Structures**: Cheap state clones via `im-rs`, and
//!   whole-state snapshots via `bincode`.
//!
//! - **Seeded RNG**: Shuffles, coin flips and random target picks come
//!   from one ChaCha stream, so a seed replays a duel exactly.
//!
//! ## Modules
//!
//! - `core`: Sides, duel state, RNG, configuration and errors
//! - `zones`: Piles and slots of one side
//! - `cards`: Card definitions, instances and the catalog
//! - `effects`: Instructions, targeting, the aggregator and the interpreter
//! - `triggers`: Triggers, cascades and duel events
//! - `rules`: Phases, turn flow, combat and player actions
//! - `prompt`: Input and presentation boundaries
//! - `duel`: The duel driver and its builder
//! - `cpu`: The automated side's heuristic

pub mod core;
pub mod zones;
pub mod cards;
pub mod effects;
pub mod triggers;
pub mod rules;
pub mod prompt;
pub mod duel;
pub mod cpu;

// Re-export commonly used types
pub use crate::core::{DuelConfig, DuelError, DuelOutcome, DuelResult, DuelState, GameRng, GameRngState, Side, SideMap};

pub use crate::zones::{Location, SideState, Zone};

pub use crate::cards::{
    CardCode, CardDefinition, CardInstance, CardKind, Catalog, DeckRecipe, DeckRules, InstanceId, PowerModifier,
    SubType, SummonRequirement,
};

pub use crate::effects::{
    effective_power, final_damage, is_protected, CardFilter, CombatEffect, Condition, DestroyCause, EffectAction,
    EffectInstruction, Origin, SelectMode, TargetScope, TargetSpec,
};

pub use crate::triggers::{DuelEvent, Trigger};

pub use crate::rules::{ActionOutcome, IllegalAction, Phase};

pub use crate::prompt::{
    Answer, DeclinePrompt, NullPresenter, Presenter, Prompt, RecordingPresenter, ScriptedPrompt, SlotRef,
};

pub use crate::duel::{Duel, DuelBuilder};
