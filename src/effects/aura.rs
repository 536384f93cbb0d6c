//! Power and protection aggregation.
//!
//! Nothing here is cached. Every query rescans both sides' monster and
//! spell slots for `always` instructions, so the answer always reflects the
//! board as it is right now:
//!
//! - `effective_power`: base power, the card's own modifiers and every
//!   standing buff that reaches it, floored at zero
//! - `is_protected`: whether any standing protection would stop a
//!   destruction, without spending once-per-turn grants
//! - `consume_protection`: the same check at destruction time, recording
//!   once-per-turn grants as spent
//! - `final_damage`: raw damage minus standing damage reduction

use smallvec::SmallVec;
use tracing::debug;

use super::effect::{Condition, DestroyCause, EffectAction, EffectInstruction, ProtectionKind};
use crate::cards::InstanceId;
use crate::core::{DuelState, Side};
use crate::triggers::Trigger;

/// Whether `condition` holds for instructions controlled by `controller`.
#[must_use]
pub fn condition_holds(state: &DuelState, controller: Side, condition: &Condition) -> bool {
    match condition {
        Condition::IsOpponentTurn => state.active != controller,
        Condition::HasCategoryOnField(category) => state
            .side(controller)
            .monsters()
            .any(|(_, card)| card.definition.has_category(category)),
    }
}

fn gate_open(state: &DuelState, controller: Side, instruction: &EffectInstruction) -> bool {
    instruction
        .condition
        .as_ref()
        .map_or(true, |c| condition_holds(state, controller, c))
}

/// Standing instructions on the board: (controller, source card, index,
/// instruction), player side first then slot order.
fn standing(state: &DuelState) -> impl Iterator<Item = (Side, InstanceId, usize, &EffectInstruction)> {
    state.sides.iter().flat_map(|(side, board)| {
        board.board().flat_map(move |(_, card)| {
            card.definition
                .instructions_for(Trigger::Always)
                .map(move |(index, instruction)| (side, card.id, index, instruction))
        })
    })
}

/// Bonus from standing buffs reaching the monster `id`.
#[must_use]
pub fn aura_bonus(state: &DuelState, id: InstanceId) -> i64 {
    let Some(location) = state.locate(id).filter(|l| l.is_monster()) else {
        return 0;
    };

    standing(state)
        .filter(|(controller, _, _, instruction)| gate_open(state, *controller, instruction))
        .map(|(controller, source, _, instruction)| match &instruction.action {
            EffectAction::PassiveBuff { value } if source == id => *value,
            EffectAction::GlobalBuff { target, value, .. } | EffectAction::Buff { target, value, .. }
                if target.reaches(state, source, controller, location.side, id) =>
            {
                *value
            }
            _ => 0,
        })
        .sum()
}

/// Current power of a card, never negative.
///
/// Cards off the monster slots only count base power and modifiers.
#[must_use]
pub fn effective_power(state: &DuelState, id: InstanceId) -> i64 {
    let Some(card) = state.card(id) else {
        return 0;
    };
    (card.base_power() + card.modifier_total() + aura_bonus(state, id)).max(0)
}

/// A protection grant reaching a card: (source, kind, once per turn).
type Grant = (InstanceId, ProtectionKind, bool);

fn grants(state: &DuelState, id: InstanceId, cause: DestroyCause) -> SmallVec<[Grant; 4]> {
    let Some(location) = state.locate(id).filter(|l| l.is_monster()) else {
        return SmallVec::new();
    };

    standing(state)
        .filter(|(controller, _, _, instruction)| gate_open(state, *controller, instruction))
        .filter_map(|(controller, source, _, instruction)| {
            let (kind, target) = instruction.action.protection()?;
            (kind.covers(cause) && target.reaches(state, source, controller, location.side, id))
                .then_some((source, kind, instruction.is_once_per_turn()))
        })
        .collect()
}

/// Whether destruction of `id` by `cause` would currently be prevented.
///
/// Pure: repeated calls without a board change return the same answer.
#[must_use]
pub fn is_protected(state: &DuelState, id: InstanceId, cause: DestroyCause) -> bool {
    let Some(card) = state.card(id) else {
        return false;
    };
    grants(state, id, cause)
        .iter()
        .any(|&(source, kind, once)| !once || !card.protection_usage.contains(&(source, kind)))
}

/// Shorthand for battle protection.
#[must_use]
pub fn is_battle_protected(state: &DuelState, id: InstanceId) -> bool {
    is_protected(state, id, DestroyCause::Battle)
}

/// Check protection at destruction time.
///
/// Unlimited grants save the card for free. Otherwise the first unspent
/// once-per-turn grant is recorded against the card for this turn.
pub fn consume_protection(state: &mut DuelState, id: InstanceId, cause: DestroyCause) -> bool {
    let available = grants(state, id, cause);
    let Some(card) = state.card_mut(id) else {
        return false;
    };

    if available.iter().any(|&(_, _, once)| !once) {
        debug!(card = %id, "unlimited protection applies");
        return true;
    }
    let unspent = available
        .iter()
        .find(|&&(source, kind, _)| !card.protection_usage.contains(&(source, kind)));
    match unspent {
        Some(&(source, kind, _)) => {
            card.protection_usage.insert((source, kind));
            debug!(card = %id, source = %source, ?kind, "once-per-turn protection spent");
            true
        }
        None => false,
    }
}

/// Total standing damage reduction for damage dealt to `side`.
#[must_use]
pub fn damage_reduction(state: &DuelState, side: Side) -> i64 {
    standing(state)
        .filter(|(controller, _, _, instruction)| gate_open(state, *controller, instruction))
        .map(|(controller, _, _, instruction)| match &instruction.action {
            EffectAction::DamageReduction { value, side: scope } if scope.covers(controller, side) => *value,
            _ => 0,
        })
        .sum()
}

/// Damage `side` actually takes from `raw`.
#[must_use]
pub fn final_damage(state: &DuelState, side: Side, raw: i64) -> i64 {
    (raw - damage_reduction(state, side)).max(0)
}
