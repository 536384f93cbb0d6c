//! Card definitions - static card data.
//!
//! `CardDefinition` holds the authored properties of a card: its kind,
//! attribute, categories, level, base power, summon requirement and the
//! ordered list of effect instructions. Definitions are catalog data and
//! never change during a duel.
//!
//! Runtime data (modifiers, usage counters, flags) lives in `CardInstance`.

use serde::{Deserialize, Serialize};

use crate::effects::EffectInstruction;
use crate::triggers::Trigger;

/// Catalog key of a card definition (e.g. `"m001"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardCode(String);

impl CardCode {
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::borrow::Borrow<str> for CardCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CardCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// Top-level card kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    Monster,
    #[serde(alias = "magic")]
    Spell,
}

/// Card sub-type.
///
/// For spells, `Normal` spells go to the trash after resolving and
/// `Permanent` spells stay on their slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubType {
    #[default]
    Normal,
    Effect,
    Permanent,
}

/// How a card reaches the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummonRequirement {
    /// Normal summon, releasing `cost_count` own monsters of at least
    /// `min_level` each.
    Normal {
        #[serde(default)]
        cost_count: usize,
        #[serde(default)]
        min_level: u8,
    },
    /// Put on the board only by activation (spells) or by effects.
    SpellActivation,
}

impl Default for SummonRequirement {
    fn default() -> Self {
        SummonRequirement::Normal {
            cost_count: 0,
            min_level: 0,
        }
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use card_duel::cards::{CardDefinition, CardKind};
///
/// let tiger = CardDefinition::monster("m001", "Flame Tiger", 1, 300)
///     .with_attribute("fire")
///     .with_category("beast");
///
/// assert_eq!(tiger.kind, CardKind::Monster);
/// assert!(tiger.has_category("beast"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub code: CardCode,
    pub name: String,
    pub kind: CardKind,
    #[serde(default)]
    pub sub_type: SubType,
    #[serde(default)]
    pub attribute: String,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Monsters only; zero for spells.
    #[serde(default)]
    pub level: u8,
    /// Monsters only; zero for spells.
    #[serde(default)]
    pub power: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub summon: SummonRequirement,
    #[serde(default)]
    pub effects: Vec<EffectInstruction>,
}

impl CardDefinition {
    /// A vanilla monster with a free normal summon.
    #[must_use]
    pub fn monster(code: impl Into<CardCode>, name: impl Into<String>, level: u8, power: i64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind: CardKind::Monster,
            sub_type: SubType::Normal,
            attribute: String::new(),
            categories: Vec::new(),
            level,
            power,
            text: String::new(),
            summon: SummonRequirement::default(),
            effects: Vec::new(),
        }
    }

    /// A normal (single-use) spell.
    #[must_use]
    pub fn spell(code: impl Into<CardCode>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind: CardKind::Spell,
            sub_type: SubType::Normal,
            attribute: String::new(),
            categories: Vec::new(),
            level: 0,
            power: 0,
            text: String::new(),
            summon: SummonRequirement::SpellActivation,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = attribute.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    #[must_use]
    pub fn with_sub_type(mut self, sub_type: SubType) -> Self {
        self.sub_type = sub_type;
        self
    }

    /// Require releasing `cost_count` monsters of at least `min_level`.
    #[must_use]
    pub fn with_cost(mut self, cost_count: usize, min_level: u8) -> Self {
        self.summon = SummonRequirement::Normal { cost_count, min_level };
        self
    }

    #[must_use]
    pub fn with_summon(mut self, summon: SummonRequirement) -> Self {
        self.summon = summon;
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append an instruction. Monsters with instructions become effect
    /// monsters unless a sub-type was chosen explicitly.
    #[must_use]
    pub fn with_effect(mut self, instruction: EffectInstruction) -> Self {
        if self.kind == CardKind::Monster && self.sub_type == SubType::Normal {
            self.sub_type = SubType::Effect;
        }
        self.effects.push(instruction);
        self
    }

    #[must_use]
    pub fn is_monster(&self) -> bool {
        self.kind == CardKind::Monster
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.kind == CardKind::Spell
    }

    #[must_use]
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// Whether any instruction fires on `trigger`.
    #[must_use]
    pub fn has_trigger(&self, trigger: Trigger) -> bool {
        self.effects.iter().any(|e| e.trigger == trigger)
    }

    /// Instructions firing on `trigger`, with their list positions.
    pub fn instructions_for(&self, trigger: Trigger) -> impl Iterator<Item = (usize, &EffectInstruction)> {
        self.effects
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.trigger == trigger)
    }
}
