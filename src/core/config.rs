//! Duel configuration.
//!
//! `DuelConfig` carries the numeric rules of a duel (life totals, hand and
//! board sizes, refresh allowance) together with the controller setup and
//! CPU pacing. Every field has a default, so a partial JSON document is a
//! valid configuration:
//!
//! ```
//! use card_duel::core::{DuelConfig, Side};
//!
//! let config = DuelConfig::from_json(r#"{ "starting_life": 8000, "human_side": null }"#).unwrap();
//! assert_eq!(config.starting_life, 8000);
//! assert_eq!(config.hand_limit, 10);
//! assert_eq!(config.human_side, None);
//! assert!(config.is_automated(Side::Player));
//! ```

use serde::{Deserialize, Serialize};

use super::error::DuelResult;
use super::Side;

/// Rules and controller configuration for one duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Life each side starts with.
    pub starting_life: i64,

    /// Cards drawn by each side before the first turn.
    pub opening_hand: usize,

    /// Hand size enforced at end of turn.
    pub hand_limit: usize,

    /// Monster slots per side.
    pub monster_slots: usize,

    /// Spell slots per side.
    pub spell_slots: usize,

    /// Deck refreshes allowed per side per turn.
    pub refreshes_per_turn: u32,

    /// Deepest allowed trigger cascade before interpretation stops.
    pub max_cascade_depth: usize,

    /// Pause before the automated side starts a phase, in milliseconds.
    pub cpu_think_ms: u64,

    /// Pause after each automated action, in milliseconds.
    pub cpu_action_ms: u64,

    /// Side driven through the prompt. `None` means both sides are automated.
    pub human_side: Option<Side>,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            starting_life: 4000,
            opening_hand: 5,
            hand_limit: 10,
            monster_slots: 3,
            spell_slots: 3,
            refreshes_per_turn: 1,
            max_cascade_depth: 32,
            cpu_think_ms: 1000,
            cpu_action_ms: 800,
            human_side: Some(Side::Player),
        }
    }
}

impl DuelConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> DuelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    #[must_use]
    pub fn with_starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    #[must_use]
    pub fn with_opening_hand(mut self, cards: usize) -> Self {
        self.opening_hand = cards;
        self
    }

    #[must_use]
    pub fn with_hand_limit(mut self, limit: usize) -> Self {
        self.hand_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_cascade_depth(mut self, depth: usize) -> Self {
        self.max_cascade_depth = depth;
        self
    }

    /// Set both CPU pauses at once.
    #[must_use]
    pub fn with_cpu_pacing(mut self, think_ms: u64, action_ms: u64) -> Self {
        self.cpu_think_ms = think_ms;
        self.cpu_action_ms = action_ms;
        self
    }

    /// Choose the prompt-driven side, or `None` for CPU against CPU.
    #[must_use]
    pub fn with_human_side(mut self, side: Option<Side>) -> Self {
        self.human_side = side;
        self
    }

    /// Whether `side` is driven by the decision heuristic.
    #[must_use]
    pub fn is_automated(&self, side: Side) -> bool {
        self.human_side != Some(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DuelConfig::default();
        assert_eq!(config.starting_life, 4000);
        assert_eq!(config.opening_hand, 5);
        assert_eq!(config.hand_limit, 10);
        assert_eq!(config.monster_slots, 3);
        assert_eq!(config.spell_slots, 3);
        assert_eq!(config.refreshes_per_turn, 1);
        assert!(!config.is_automated(Side::Player));
        assert!(config.is_automated(Side::Opponent));
    }

    #[test]
    fn test_builder() {
        let config = DuelConfig::new()
            .with_starting_life(100)
            .with_hand_limit(3)
            .with_cpu_pacing(0, 0)
            .with_human_side(None);

        assert_eq!(config.starting_life, 100);
        assert_eq!(config.hand_limit, 3);
        assert_eq!(config.cpu_think_ms, 0);
        assert!(config.is_automated(Side::Player));
        assert!(config.is_automated(Side::Opponent));
    }

    #[test]
    fn test_from_json_partial() {
        let config = DuelConfig::from_json(r#"{ "hand_limit": 7, "human_side": "opponent" }"#).unwrap();
        assert_eq!(config.hand_limit, 7);
        assert_eq!(config.starting_life, 4000);
        assert_eq!(config.human_side, Some(Side::Opponent));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(DuelConfig::from_json("{ \"hand_limit\": \"ten\" }").is_err());
    }
}
