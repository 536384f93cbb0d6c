//! Effect instructions.
//!
//! A card's behaviour is an ordered list of `EffectInstruction`s. Each
//! instruction names the trigger it answers to, optional gating (count
//! limit, condition, optional "may" flag) and one `EffectAction` from a
//! closed set of kinds. The interpreter dispatches each kind to exactly one
//! handler; `always` instructions are declarative and only read by the
//! aggregator in `effects::aura`.
//!
//! Instructions are plain data and deserialize from the catalog format:
//!
//! ```
//! use card_duel::effects::{EffectAction, EffectInstruction, Origin};
//! use card_duel::triggers::Trigger;
//!
//! let json = r#"{
//!     "trigger": "on_summon",
//!     "optional": true,
//!     "action": { "special_summon": { "origin": "deck", "count": 2, "filter": { "level": 1 } } }
//! }"#;
//! let instruction: EffectInstruction = serde_json::from_str(json).unwrap();
//!
//! assert_eq!(instruction.trigger, Trigger::OnSummon);
//! assert!(matches!(
//!     instruction.action,
//!     EffectAction::SpecialSummon { origin: Origin::Deck, count: 2, .. }
//! ));
//! ```

use serde::{Deserialize, Serialize};

use super::targeting::{CardFilter, SelectMode, TargetScope, TargetSpec};
use crate::triggers::Trigger;

/// Usage limit on an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountLimit {
    OncePerTurn,
}

/// Board condition gating an instruction, evaluated from the point of view
/// of the side controlling the instruction's card.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// It is the other side's turn.
    IsOpponentTurn,
    /// The controller has a monster with this category on the board.
    HasCategoryOnField(String),
}

/// Lifetime of a buff.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuffDuration {
    /// Expires at the next turn start.
    UntilEndTurn,
    /// Survives the opponent's following turn.
    UntilOpponentEnd,
}

impl BuffDuration {
    /// Number of turn starts before expiry.
    #[must_use]
    pub const fn turns(self) -> u32 {
        match self {
            BuffDuration::UntilEndTurn => 1,
            BuffDuration::UntilOpponentEnd => 2,
        }
    }
}

/// Where special-summon candidates come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Deck,
    Trash,
    /// Pool of both piles.
    Both,
    /// The controller picks one pile, then candidates come from it.
    #[serde(alias = "choice_deck_or_trash")]
    Choice,
}

/// Modifier that only acts during the holder's next battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatEffect {
    /// Destroy the defender after combat, whatever the outcome.
    DestroyTarget,
    /// Extra power for the battle only.
    Boost(i64),
}

/// Kind of destruction immunity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionKind {
    /// Battle destruction only.
    Battle,
    /// Battle and effect destruction.
    Global,
}

/// Why a card is being destroyed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DestroyCause {
    Battle,
    Effect,
}

impl ProtectionKind {
    /// Whether this immunity stops destruction by `cause`.
    #[must_use]
    pub const fn covers(self, cause: DestroyCause) -> bool {
        match self {
            ProtectionKind::Global => true,
            ProtectionKind::Battle => matches!(cause, DestroyCause::Battle),
        }
    }
}

/// What an instruction does.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectAction {
    /// Power bonus for the card itself.
    PassiveBuff { value: i64 },

    /// Power bonus for every board monster matching `target`.
    GlobalBuff {
        #[serde(default = "TargetSpec::everything")]
        target: TargetSpec,
        value: i64,
        #[serde(default)]
        duration: Option<BuffDuration>,
    },

    SpecialSummon {
        origin: Origin,
        count: usize,
        #[serde(default)]
        filter: CardFilter,
        #[serde(default)]
        select: SelectMode,
    },

    Draw { count: usize },

    /// Top of a draw pile to its trash.
    Mill {
        count: usize,
        #[serde(default)]
        side: TargetScope,
    },

    /// Random filtered cards from the draw pile to hand.
    Search {
        count: usize,
        #[serde(default)]
        filter: CardFilter,
    },

    /// Random filtered cards from the trash to hand.
    Salvage {
        count: usize,
        #[serde(default)]
        filter: CardFilter,
    },

    Heal { value: i64 },

    /// Power change for the targets. Under an `always` trigger it is read
    /// as a standing bonus, like a global buff.
    Buff {
        #[serde(default)]
        target: TargetSpec,
        value: i64,
        #[serde(default)]
        duration: Option<BuffDuration>,
    },

    GlobalProtection {
        #[serde(default)]
        target: TargetSpec,
    },

    BattleProtection {
        #[serde(default)]
        target: TargetSpec,
    },

    /// Subtracted from damage dealt to the covered side(s).
    DamageReduction {
        value: i64,
        #[serde(default)]
        side: TargetScope,
    },

    Destroy { target: TargetSpec },

    DrawAndDiscard { draw: usize, discard: usize },

    ApplyCombatEffect {
        #[serde(default)]
        target: TargetSpec,
        effect: CombatEffect,
    },
}

impl EffectAction {
    /// Snake-case kind name, for logs.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            EffectAction::PassiveBuff { .. } => "passive_buff",
            EffectAction::GlobalBuff { .. } => "global_buff",
            EffectAction::SpecialSummon { .. } => "special_summon",
            EffectAction::Draw { .. } => "draw",
            EffectAction::Mill { .. } => "mill",
            EffectAction::Search { .. } => "search",
            EffectAction::Salvage { .. } => "salvage",
            EffectAction::Heal { .. } => "heal",
            EffectAction::Buff { .. } => "buff",
            EffectAction::GlobalProtection { .. } => "global_protection",
            EffectAction::BattleProtection { .. } => "battle_protection",
            EffectAction::DamageReduction { .. } => "damage_reduction",
            EffectAction::Destroy { .. } => "destroy",
            EffectAction::DrawAndDiscard { .. } => "draw_and_discard",
            EffectAction::ApplyCombatEffect { .. } => "apply_combat_effect",
        }
    }

    /// Kinds that only describe a standing property of the board.
    #[must_use]
    pub const fn is_declarative(&self) -> bool {
        matches!(
            self,
            EffectAction::PassiveBuff { .. }
                | EffectAction::GlobalProtection { .. }
                | EffectAction::BattleProtection { .. }
                | EffectAction::DamageReduction { .. }
        )
    }

    /// The protection this action grants, if any.
    #[must_use]
    pub fn protection(&self) -> Option<(ProtectionKind, &TargetSpec)> {
        match self {
            EffectAction::BattleProtection { target } => Some((ProtectionKind::Battle, target)),
            EffectAction::GlobalProtection { target } => Some((ProtectionKind::Global, target)),
            _ => None,
        }
    }
}

/// One step of a card's behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectInstruction {
    pub trigger: Trigger,
    #[serde(default)]
    pub limit: Option<CountLimit>,
    #[serde(default)]
    pub condition: Option<Condition>,
    /// A "may" effect: the controller can decline it.
    #[serde(default)]
    pub optional: bool,
    pub action: EffectAction,
}

impl EffectInstruction {
    #[must_use]
    pub fn new(trigger: Trigger, action: EffectAction) -> Self {
        Self {
            trigger,
            limit: None,
            condition: None,
            optional: false,
            action,
        }
    }

    /// A standing `always` instruction.
    #[must_use]
    pub fn always(action: EffectAction) -> Self {
        Self::new(Trigger::Always, action)
    }

    #[must_use]
    pub fn once_per_turn(mut self) -> Self {
        self.limit = Some(CountLimit::OncePerTurn);
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn is_once_per_turn(&self) -> bool {
        self.limit == Some(CountLimit::OncePerTurn)
    }
}
