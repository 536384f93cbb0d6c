//! Triggers, cascades and duel events.
//!
//! ## Key Components
//!
//! - [`Trigger`]: When an instruction runs
//! - [`DuelEvent`]: What the presentation sink is told after each board
//!   mutation
//! - `cascade`: Fan-out of trash and life-gain reactions to every card
//!   that answers them
//!
//! ## Cascades
//!
//! Reactions are not queued. A card that summons another card runs the new
//! card's `on_summon` instructions before it moves on to its own next
//! instruction, so cascades nest and finish last-in first-out.

mod cascade;
mod event;

pub use event::DuelEvent;

use serde::{Deserialize, Serialize};

/// When an instruction runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// Standing effect, read by the aggregator and never executed.
    Always,
    /// This card was normal or special summoned.
    OnSummon,
    /// This spell was activated.
    OnActivate,
    /// The controller chose to activate it during their main phase.
    Ignition,
    /// This card was sent to the trash (destroyed, milled, discarded or
    /// released).
    #[serde(alias = "on_destroyed_by_battle")]
    OnSentToTrash,
    /// Some side gained life.
    OnLpGain,
    /// Another card was destroyed.
    OnOtherSentToTrash,
}

impl std::fmt::Display for Trigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Trigger::Always => "always",
            Trigger::OnSummon => "on_summon",
            Trigger::OnActivate => "on_activate",
            Trigger::Ignition => "ignition",
            Trigger::OnSentToTrash => "on_sent_to_trash",
            Trigger::OnLpGain => "on_lp_gain",
            Trigger::OnOtherSentToTrash => "on_other_sent_to_trash",
        };
        f.write_str(name)
    }
}
