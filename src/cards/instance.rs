//! Card instances - runtime card state.
//!
//! A `CardInstance` is one physical card in a duel: a deep copy of its
//! catalog definition plus the annotations the rules attach while it is in
//! play. Leaving the board wipes the board-only annotations.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::{CardCode, CardDefinition};
use crate::core::Side;
use crate::effects::{CombatEffect, ProtectionKind};

/// Unique identifier of a card instance within one duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A power modifier attached to a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerModifier {
    pub value: i64,
    /// Turn starts left before expiry; `None` never expires.
    pub remaining: Option<u32>,
}

impl PowerModifier {
    #[must_use]
    pub const fn permanent(value: i64) -> Self {
        Self { value, remaining: None }
    }

    #[must_use]
    pub const fn for_turns(value: i64, turns: u32) -> Self {
        Self {
            value,
            remaining: Some(turns),
        }
    }
}

/// A card in a duel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub id: InstanceId,

    /// Side whose piles and slots this card belongs to.
    pub owner: Side,

    /// Independent copy of the catalog entry.
    pub definition: CardDefinition,

    /// Temporary and permanent power modifiers.
    pub modifiers: Vec<PowerModifier>,

    /// Effects waiting for this card's next battle.
    pub combat_effects: SmallVec<[CombatEffect; 2]>,

    /// Instruction index -> `turns_passed` value it was last used on.
    pub effect_usage: FxHashMap<usize, u32>,

    /// Once-per-turn protection grants already spent saving this card.
    pub protection_usage: FxHashSet<(InstanceId, ProtectionKind)>,

    pub attacked: bool,

    /// Set on draw, cleared on the next phase change. Presentation only.
    pub fresh: bool,
}

impl CardInstance {
    #[must_use]
    pub fn new(id: InstanceId, owner: Side, definition: CardDefinition) -> Self {
        Self {
            id,
            owner,
            definition,
            modifiers: Vec::new(),
            combat_effects: SmallVec::new(),
            effect_usage: FxHashMap::default(),
            protection_usage: FxHashSet::default(),
            attacked: false,
            fresh: false,
        }
    }

    #[must_use]
    pub fn code(&self) -> &CardCode {
        &self.definition.code
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn level(&self) -> u8 {
        self.definition.level
    }

    #[must_use]
    pub fn base_power(&self) -> i64 {
        self.definition.power
    }

    /// Sum of attached modifiers.
    #[must_use]
    pub fn modifier_total(&self) -> i64 {
        self.modifiers.iter().map(|m| m.value).sum()
    }

    pub fn add_modifier(&mut self, modifier: PowerModifier) {
        self.modifiers.push(modifier);
    }

    /// Whether instruction `index` was used during `turn`, counted in
    /// turns passed so that each side's turn gets its own key.
    #[must_use]
    pub fn used_on_turn(&self, index: usize, turn: u32) -> bool {
        self.effect_usage.get(&index) == Some(&turn)
    }

    pub fn mark_used(&mut self, index: usize, turn: u32) {
        self.effect_usage.insert(index, turn);
    }

    /// Turn-start bookkeeping: age modifiers and clear per-turn state.
    pub fn start_turn(&mut self) {
        self.attacked = false;
        self.effect_usage.clear();
        self.protection_usage.clear();
        self.combat_effects.clear();
        self.modifiers.retain_mut(|m| match m.remaining.as_mut() {
            None => true,
            Some(left) => {
                *left = left.saturating_sub(1);
                *left > 0
            }
        });
    }

    /// Drop everything that only makes sense on the board.
    pub fn leave_board(&mut self) {
        self.modifiers.clear();
        self.combat_effects.clear();
        self.attacked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> CardInstance {
        CardInstance::new(
            InstanceId::new(1),
            Side::Player,
            CardDefinition::monster("m001", "Flame Tiger", 1, 300),
        )
    }

    #[test]
    fn test_accessors() {
        let card = instance();
        assert_eq!(card.code().as_str(), "m001");
        assert_eq!(card.name(), "Flame Tiger");
        assert_eq!(card.level(), 1);
        assert_eq!(card.base_power(), 300);
        assert_eq!(format!("{}", card.id), "#1");
    }

    #[test]
    fn test_modifier_expiry() {
        let mut card = instance();
        card.add_modifier(PowerModifier::for_turns(500, 2));
        card.add_modifier(PowerModifier::for_turns(100, 1));
        card.add_modifier(PowerModifier::permanent(-50));
        assert_eq!(card.modifier_total(), 550);

        card.start_turn();
        assert_eq!(card.modifier_total(), 450);

        card.start_turn();
        assert_eq!(card.modifier_total(), -50);

        card.start_turn();
        assert_eq!(card.modifier_total(), -50);
    }

    #[test]
    fn test_usage_tracking() {
        let mut card = instance();
        assert!(!card.used_on_turn(0, 3));

        card.mark_used(0, 3);
        assert!(card.used_on_turn(0, 3));
        assert!(!card.used_on_turn(0, 4));
        assert!(!card.used_on_turn(1, 3));

        card.start_turn();
        assert!(!card.used_on_turn(0, 3));
    }

    #[test]
    fn test_leave_board_clears_annotations() {
        let mut card = instance();
        card.add_modifier(PowerModifier::permanent(200));
        card.combat_effects.push(CombatEffect::DestroyTarget);
        card.attacked = true;

        card.leave_board();
        assert_eq!(card.modifier_total(), 0);
        assert!(card.combat_effects.is_empty());
        assert!(!card.attacked);
    }
}
