//! Target selectors and acquisition.
//!
//! A `TargetSpec` describes which board monsters an instruction may touch:
//! a side scope relative to the acting side, a `CardFilter`, an optional
//! extra `TargetCondition`, and how to choose among the candidates.
//!
//! ## Selection modes
//!
//! - `All`: every candidate
//! - `Manual`: the human picks through the prompt, the automated side uses
//!   a fixed preference order
//! - `Auto`: uniform random without replacement

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::aura::effective_power;
use crate::cards::{CardDefinition, CardKind, InstanceId};
use crate::core::{DuelState, Side};
use crate::duel::Duel;
use crate::prompt::{SlotReason, SlotRef, SlotRequest, SlotZone};
use crate::triggers::Trigger;
use crate::zones::Zone;

/// Static card-property filter. Empty fields match anything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct CardFilter {
    pub level: Option<u8>,
    pub min_level: Option<u8>,
    pub max_level: Option<u8>,
    pub attribute: Option<String>,
    pub category: Option<String>,
    pub kind: Option<CardKind>,
}

impl CardFilter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_level(mut self, level: u8) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_min_level(mut self, level: u8) -> Self {
        self.min_level = Some(level);
        self
    }

    #[must_use]
    pub fn with_max_level(mut self, level: u8) -> Self {
        self.max_level = Some(level);
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_kind(mut self, kind: CardKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn matches(&self, card: &CardDefinition) -> bool {
        self.level.map_or(true, |l| card.level == l)
            && self.min_level.map_or(true, |l| card.level >= l)
            && self.max_level.map_or(true, |l| card.level <= l)
            && self.attribute.as_ref().map_or(true, |a| &card.attribute == a)
            && self.category.as_ref().map_or(true, |c| card.has_category(c))
            && self.kind.map_or(true, |k| card.kind == k)
    }
}

/// Which side(s) an instruction reaches, relative to its controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetScope {
    /// The instruction's own card.
    #[serde(rename = "self")]
    SelfCard,
    #[default]
    Own,
    Opponent,
    Both,
}

impl TargetScope {
    /// Sides covered when `acting` controls the instruction. `SelfCard`
    /// counts as the acting side.
    #[must_use]
    pub fn sides(self, acting: Side) -> SmallVec<[Side; 2]> {
        match self {
            TargetScope::SelfCard | TargetScope::Own => smallvec::smallvec![acting],
            TargetScope::Opponent => smallvec::smallvec![acting.opponent()],
            TargetScope::Both => smallvec::smallvec![acting, acting.opponent()],
        }
    }

    #[must_use]
    pub fn covers(self, acting: Side, side: Side) -> bool {
        match self {
            TargetScope::SelfCard | TargetScope::Own => side == acting,
            TargetScope::Opponent => side != acting,
            TargetScope::Both => true,
        }
    }
}

/// How to choose among candidates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectMode {
    Manual,
    #[default]
    Auto,
    All,
}

/// Extra, board-dependent candidate condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCondition {
    /// Effective power below base power.
    Weakened,
}

/// Whether an action helps or hurts the monsters it lands on. Only the
/// automated side's preference order depends on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Harmful,
    Beneficial,
}

/// Full target description of an instruction.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetSpec {
    pub scope: TargetScope,
    pub select: SelectMode,
    pub count: usize,
    pub filter: CardFilter,
    pub condition: Option<TargetCondition>,
}

impl Default for TargetSpec {
    /// The instruction's own card.
    fn default() -> Self {
        Self {
            scope: TargetScope::SelfCard,
            select: SelectMode::Auto,
            count: 1,
            filter: CardFilter::default(),
            condition: None,
        }
    }
}

impl TargetSpec {
    /// Every monster on both sides.
    #[must_use]
    pub fn everything() -> Self {
        Self {
            scope: TargetScope::Both,
            select: SelectMode::All,
            ..Self::default()
        }
    }

    /// `count` of the controller's monsters.
    #[must_use]
    pub fn own(count: usize) -> Self {
        Self {
            scope: TargetScope::Own,
            count,
            ..Self::default()
        }
    }

    /// `count` of the other side's monsters.
    #[must_use]
    pub fn opponent(count: usize) -> Self {
        Self {
            scope: TargetScope::Opponent,
            count,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_scope(mut self, scope: TargetScope) -> Self {
        self.scope = scope;
        self
    }

    #[must_use]
    pub fn with_select(mut self, select: SelectMode) -> Self {
        self.select = select;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: CardFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn with_condition(mut self, condition: TargetCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether a board monster at (`side`, `id`) is covered, for auras
    /// controlled by `controller` and sourced from `source`.
    #[must_use]
    pub fn reaches(&self, state: &DuelState, source: InstanceId, controller: Side, side: Side, id: InstanceId) -> bool {
        let in_scope = match self.scope {
            TargetScope::SelfCard => id == source,
            scope => scope.covers(controller, side),
        };
        in_scope
            && state.card(id).is_some_and(|card| self.filter.matches(&card.definition))
            && self.condition.map_or(true, |c| condition_met(state, id, c))
    }
}

/// A candidate board monster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub id: InstanceId,
    pub side: Side,
    pub slot: usize,
}

fn condition_met(state: &DuelState, id: InstanceId, condition: TargetCondition) -> bool {
    match condition {
        TargetCondition::Weakened => state
            .card(id)
            .is_some_and(|card| effective_power(state, id) < card.base_power()),
    }
}

/// Monsters an instruction controlled by `acting` could target, in side
/// order (acting side first) then slot order.
#[must_use]
pub fn candidates(state: &DuelState, spec: &TargetSpec, source: InstanceId, acting: Side) -> SmallVec<[Candidate; 6]> {
    if spec.scope == TargetScope::SelfCard {
        return match state.locate(source) {
            Some(loc) => match loc.zone {
                Zone::Monster(slot) => smallvec::smallvec![Candidate { id: source, side: loc.side, slot }],
                _ => SmallVec::new(),
            },
            None => SmallVec::new(),
        };
    }

    let mut found = SmallVec::new();
    for side in spec.scope.sides(acting) {
        for (slot, card) in state.side(side).monsters() {
            if spec.filter.matches(&card.definition)
                && spec.condition.map_or(true, |c| condition_met(state, card.id, c))
            {
                found.push(Candidate { id: card.id, side, slot });
            }
        }
    }
    found
}

/// Whether a card rewards being sent to the trash.
#[must_use]
pub fn has_trash_payoff(card: &CardDefinition) -> bool {
    card.has_trigger(Trigger::OnSentToTrash)
}

/// Order candidates the way the automated side prefers them, best first.
///
/// Own monsters hit by a harmful action: trash payoff first, then lowest
/// effective power. Own monsters receiving a beneficial action: highest
/// effective power. Opposing monsters: highest effective power.
pub fn cpu_preference(state: &DuelState, pool: &mut [Candidate], acting: Side, intent: Intent) {
    pool.sort_by_cached_key(|c| {
        let power = effective_power(state, c.id);
        let own = c.side == acting;
        let payoff = state.card(c.id).is_some_and(|card| has_trash_payoff(&card.definition));
        match (own, intent) {
            // Opposing monsters come before own ones for harmful actions.
            (false, Intent::Harmful) => (0, 0, -power),
            (true, Intent::Harmful) => (1, i64::from(!payoff), power),
            (true, Intent::Beneficial) => (0, 0, -power),
            (false, Intent::Beneficial) => (1, 0, power),
        }
    });
}

impl Duel {
    /// Resolve a target spec to concrete instance ids.
    ///
    /// Returns nothing when there are no candidates or when the human
    /// cancels; a cancelled selection never yields a partial list.
    pub(crate) async fn acquire_targets(
        &mut self,
        spec: &TargetSpec,
        source: InstanceId,
        acting: Side,
        intent: Intent,
    ) -> SmallVec<[InstanceId; 6]> {
        let mut pool = candidates(&self.state, spec, source, acting);
        if pool.is_empty() || spec.scope == TargetScope::SelfCard {
            return pool.iter().map(|c| c.id).collect();
        }

        let picked: SmallVec<[InstanceId; 6]> = match spec.select {
            SelectMode::All => pool.iter().map(|c| c.id).collect(),
            SelectMode::Manual if !self.is_automated(acting) => {
                self.prompt_targets(pool, spec.count, acting).await
            }
            SelectMode::Manual => {
                cpu_preference(&self.state, &mut pool, acting, intent);
                pool.iter().take(spec.count).map(|c| c.id).collect()
            }
            SelectMode::Auto => self
                .state
                .rng
                .sample(pool.len(), spec.count)
                .into_iter()
                .map(|i| pool[i].id)
                .collect(),
        };
        debug!(source = %source, side = %acting, targets = picked.len(), "targets acquired");
        picked
    }

    async fn prompt_targets(
        &mut self,
        mut pool: SmallVec<[Candidate; 6]>,
        count: usize,
        acting: Side,
    ) -> SmallVec<[InstanceId; 6]> {
        let mut picked = SmallVec::new();
        while picked.len() < count && !pool.is_empty() {
            let request = SlotRequest {
                side: acting,
                zone: SlotZone::Monster,
                eligible: pool.iter().map(|c| SlotRef::new(c.side, c.slot)).collect(),
                reason: SlotReason::EffectTarget,
            };
            let Some(answer) = self.prompt.select_slot(request).await else {
                debug!(side = %acting, "target selection cancelled");
                self.note_cancel();
                return SmallVec::new();
            };
            let Some(index) = pool.iter().position(|c| c.side == answer.side && c.slot == answer.slot) else {
                warn!(side = %acting, ?answer, "prompt answered an ineligible slot");
                self.note_cancel();
                return SmallVec::new();
            };
            picked.push(pool.remove(index).id);
        }
        picked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::PowerModifier;
    use crate::core::DuelConfig;

    fn board() -> (DuelState, Vec<InstanceId>) {
        let mut state = DuelState::new(DuelConfig::default(), 1);
        let a = state.spawn(
            Side::Player,
            Zone::Monster(0),
            CardDefinition::monster("a", "A", 1, 300).with_attribute("fire"),
        );
        let b = state.spawn(
            Side::Player,
            Zone::Monster(2),
            CardDefinition::monster("b", "B", 3, 1000).with_attribute("water"),
        );
        let c = state.spawn(
            Side::Opponent,
            Zone::Monster(1),
            CardDefinition::monster("c", "C", 2, 800).with_attribute("fire"),
        );
        (state, vec![a, b, c])
    }

    #[test]
    fn test_filter_matching() {
        let card = CardDefinition::monster("x", "X", 2, 100)
            .with_attribute("fire")
            .with_category("flame_realm");

        assert!(CardFilter::new().matches(&card));
        assert!(CardFilter::new().with_level(2).with_attribute("fire").matches(&card));
        assert!(CardFilter::new().with_min_level(1).with_max_level(3).matches(&card));
        assert!(!CardFilter::new().with_max_level(1).matches(&card));
        assert!(!CardFilter::new().with_category("king").matches(&card));
        assert!(!CardFilter::new().with_kind(CardKind::Spell).matches(&card));
    }

    #[test]
    fn test_scope_sides() {
        assert_eq!(TargetScope::Own.sides(Side::Opponent).as_slice(), &[Side::Opponent]);
        assert_eq!(TargetScope::Opponent.sides(Side::Opponent).as_slice(), &[Side::Player]);
        assert_eq!(TargetScope::Both.sides(Side::Player).len(), 2);
        assert!(TargetScope::Opponent.covers(Side::Player, Side::Opponent));
        assert!(!TargetScope::Own.covers(Side::Player, Side::Opponent));
    }

    #[test]
    fn test_candidates_respect_scope_and_filter() {
        let (state, ids) = board();

        let own = candidates(&state, &TargetSpec::own(1), ids[0], Side::Player);
        assert_eq!(own.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ids[0], ids[1]]);

        let fire = TargetSpec::everything().with_filter(CardFilter::new().with_attribute("fire"));
        let hits = candidates(&state, &fire, ids[0], Side::Player);
        assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ids[0], ids[2]]);

        let theirs = candidates(&state, &TargetSpec::opponent(1), ids[0], Side::Player);
        assert_eq!(theirs.len(), 1);
        assert_eq!(theirs[0].slot, 1);
    }

    #[test]
    fn test_self_candidate_requires_board() {
        let (mut state, ids) = board();
        let self_spec = TargetSpec::default();
        assert_eq!(candidates(&state, &self_spec, ids[1], Side::Player).len(), 1);

        let in_hand = state.spawn(Side::Player, Zone::Hand, CardDefinition::monster("h", "H", 1, 1));
        assert!(candidates(&state, &self_spec, in_hand, Side::Player).is_empty());
    }

    #[test]
    fn test_weakened_condition() {
        let (mut state, ids) = board();
        state.card_mut(ids[2]).unwrap().add_modifier(PowerModifier::permanent(-100));

        let spec = TargetSpec::everything().with_condition(TargetCondition::Weakened);
        let hits = candidates(&state, &spec, ids[0], Side::Player);
        assert_eq!(hits.iter().map(|c| c.id).collect::<Vec<_>>(), vec![ids[2]]);
    }

    #[test]
    fn test_cpu_preference_orders() {
        let (mut state, ids) = board();
        // Give the strong own monster a trash payoff.
        state.card_mut(ids[1]).unwrap().definition = CardDefinition::monster("b", "B", 3, 1000).with_effect(
            crate::effects::EffectInstruction::new(
                Trigger::OnSentToTrash,
                crate::effects::EffectAction::Draw { count: 1 },
            ),
        );

        let mut own: Vec<_> = candidates(&state, &TargetSpec::own(1), ids[0], Side::Player).into_vec();
        cpu_preference(&state, &mut own, Side::Player, Intent::Harmful);
        assert_eq!(own[0].id, ids[1], "payoff first");

        cpu_preference(&state, &mut own, Side::Player, Intent::Beneficial);
        assert_eq!(own[0].id, ids[1], "strongest first");

        state.card_mut(ids[1]).unwrap().definition.effects.clear();
        cpu_preference(&state, &mut own, Side::Player, Intent::Harmful);
        assert_eq!(own[0].id, ids[0], "weakest first without payoff");
    }
}
