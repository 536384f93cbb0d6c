//! Heuristic scores for the automated side.
//!
//! Everything here is pure: it reads a `DuelState` and proposes a move.
//! The weights are tuning values, not rules.

use smallvec::SmallVec;

use crate::cards::{CardDefinition, CardInstance, CardKind, InstanceId, SubType};
use crate::core::{DuelState, Side};
use crate::effects::{
    candidates, effective_power, final_damage, is_battle_protected, EffectAction, Origin, TargetScope,
};
use crate::rules::{check_normal_summon, check_spell, is_activatable, Phase};
use crate::triggers::Trigger;

/// Broad purpose of a spell, in play order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpellRole {
    /// Card flow and board development.
    Setup,
    /// Removing or weakening opposing monsters.
    Removal,
    /// Bringing cards back from the trash.
    Revival,
    /// Strengthening own monsters before battle.
    Support,
}

/// Classify a spell by its first `on_activate` instruction.
#[must_use]
pub fn spell_role(card: &CardDefinition) -> SpellRole {
    let Some((_, instruction)) = card.instructions_for(Trigger::OnActivate).next() else {
        return SpellRole::Setup;
    };
    match &instruction.action {
        EffectAction::Destroy { .. } => SpellRole::Removal,
        EffectAction::Buff { target, value, .. } if *value < 0 && target.scope == TargetScope::Opponent => {
            SpellRole::Removal
        }
        EffectAction::SpecialSummon {
            origin: Origin::Trash, ..
        }
        | EffectAction::Salvage { .. } => SpellRole::Revival,
        EffectAction::Buff { .. } | EffectAction::GlobalBuff { .. } | EffectAction::ApplyCombatEffect { .. } => {
            SpellRole::Support
        }
        _ => SpellRole::Setup,
    }
}

/// Rough worth of a monster, for trades.
#[must_use]
pub fn card_value(card: &CardInstance) -> i64 {
    i64::from(card.level()) * 1000 + card.base_power()
}

/// Hand index of the monster to normal summon, if any.
///
/// Highest level first, then highest base power.
#[must_use]
pub fn summon_choice(state: &DuelState, side: Side) -> Option<usize> {
    let hand = &state.side(side).hand;
    (0..hand.len())
        .filter(|&i| check_normal_summon(state, side, i).is_ok())
        .max_by_key(|&i| (hand[i].level(), hand[i].base_power(), std::cmp::Reverse(i)))
}

/// Order release candidates cheapest first.
pub fn order_costs(state: &DuelState, pool: &mut [(usize, InstanceId)]) {
    pool.sort_by_cached_key(|&(slot, id)| {
        let modifiers = state.card(id).map_or(0, |c| c.modifier_total());
        (effective_power(state, id), modifiers, slot)
    });
}

/// Hand index of the next spell to activate, if any is worth it.
#[must_use]
pub fn spell_choice(state: &DuelState, side: Side) -> Option<usize> {
    let hand = &state.side(side).hand;
    (0..hand.len())
        .filter(|&i| check_spell(state, side, i).is_ok())
        .filter(|&i| worth_casting(state, side, &hand[i]))
        .min_by_key(|&i| (spell_role(&hand[i].definition), i))
}

fn worth_casting(state: &DuelState, side: Side, card: &CardInstance) -> bool {
    let Some((_, instruction)) = card.definition.instructions_for(Trigger::OnActivate).next() else {
        return true;
    };
    match &instruction.action {
        EffectAction::SpecialSummon {
            origin: Origin::Trash,
            filter,
            ..
        } => {
            state.side(side).monster_count() == 0
                || state.side(side).trash.iter().any(|c| {
                    c.definition.is_monster()
                        && filter.matches(&c.definition)
                        && (c.level() >= 3 || c.base_power() >= 1000)
                })
        }
        EffectAction::Salvage { .. } => true,
        EffectAction::Buff { target, value, .. } if *value < 0 => candidates(state, target, card.id, side)
            .iter()
            .filter(|t| t.side != side)
            .any(|t| {
                let before = effective_power(state, t.id);
                let after = (before + value).max(0);
                state.side(side).monsters().any(|(_, mine)| {
                    let power = effective_power(state, mine.id);
                    power <= before && power > after
                })
            }),
        EffectAction::Buff { target, value, .. } => {
            if state.phase != Phase::Main1 {
                return false;
            }
            let foe = side.opponent();
            let foe_empty = state.side(foe).monster_count() == 0;
            candidates(state, target, card.id, side)
                .iter()
                .filter(|t| t.side == side)
                .any(|t| {
                    let before = effective_power(state, t.id);
                    let after = before + value;
                    foe_empty
                        || state.side(foe).monsters().any(|(_, theirs)| {
                            let power = effective_power(state, theirs.id);
                            before <= power && after > power
                        })
                })
        }
        EffectAction::GlobalBuff { .. } | EffectAction::ApplyCombatEffect { .. } => {
            state.phase == Phase::Main1 && state.side(side).monster_count() > 0
        }
        _ => true,
    }
}

/// How willing the automated side is to discard a card; higher goes first.
#[must_use]
pub fn discard_score(state: &DuelState, side: Side, card: &CardInstance) -> i32 {
    let mut score = 0;
    if card.definition.has_trigger(Trigger::OnSentToTrash) {
        score += 50;
    }
    match card.definition.kind {
        CardKind::Monster => {
            let level = i32::from(card.level());
            if level >= 3 {
                score += 20 + 5 * level;
            } else if level <= 1 {
                score -= 30;
            }
        }
        CardKind::Spell => {
            let playable = card.definition.sub_type == SubType::Permanent
                || is_activatable(state, card.id, side, Trigger::OnActivate);
            score += if playable { 5 } else { 30 };
        }
    }
    score
}

/// Hand indices to discard, best candidates first.
#[must_use]
pub fn discard_choice(state: &DuelState, side: Side, count: usize) -> Vec<usize> {
    let hand = &state.side(side).hand;
    let mut scored: Vec<(i32, usize)> = hand
        .iter()
        .enumerate()
        .map(|(i, card)| (discard_score(state, side, card), i))
        .collect();
    scored.sort_by_key(|&(score, i)| (std::cmp::Reverse(score), i));
    scored.into_iter().take(count).map(|(_, i)| i).collect()
}

struct Fighter {
    slot: usize,
    id: InstanceId,
    power: i64,
    value: i64,
}

fn fighters(state: &DuelState, side: Side, ready_only: bool) -> SmallVec<[Fighter; 4]> {
    state
        .side(side)
        .monsters()
        .filter(|(_, card)| !ready_only || !card.attacked)
        .map(|(slot, card)| Fighter {
            slot,
            id: card.id,
            power: effective_power(state, card.id),
            value: card_value(card),
        })
        .collect()
}

/// The next attack as `(attacker slot, defender slot)`, or `None` to stop.
///
/// Direct attacks with the strongest monster when the way is clear. When
/// total ready power is lethal, clears the weakest blocker. Otherwise takes
/// the best clean kill, then an even trade of equal or greater value.
#[must_use]
pub fn plan_attack(state: &DuelState, side: Side) -> Option<(usize, Option<usize>)> {
    if state.phase != Phase::Battle || state.active != side || state.is_over() {
        return None;
    }
    let foe = side.opponent();
    let mut ready = fighters(state, side, true);
    if ready.is_empty() {
        return None;
    }
    ready.sort_by_key(|f| std::cmp::Reverse(f.power));
    let blockers = fighters(state, foe, false);

    if blockers.is_empty() {
        return Some((ready[0].slot, None));
    }

    let total: i64 = ready.iter().map(|f| f.power).sum();
    if final_damage(state, foe, total) >= state.side(foe).life {
        if let Some(weakest) = blockers.iter().min_by_key(|b| b.power) {
            if !is_battle_protected(state, weakest.id) {
                if let Some(attacker) = ready.iter().rev().find(|a| a.power > weakest.power) {
                    return Some((attacker.slot, Some(weakest.slot)));
                }
            }
        }
    }

    for attacker in &ready {
        let target = blockers
            .iter()
            .filter(|b| b.power < attacker.power && !is_battle_protected(state, b.id))
            .max_by_key(|b| b.power);
        if let Some(target) = target {
            return Some((attacker.slot, Some(target.slot)));
        }
    }

    for attacker in &ready {
        let target = blockers.iter().find(|b| {
            b.power == attacker.power && b.value >= attacker.value && !is_battle_protected(state, b.id)
        });
        if let Some(target) = target {
            return Some((attacker.slot, Some(target.slot)));
        }
    }
    None
}

/// Defender slot for a declared attack by `attacker`.
///
/// The strongest monster it beats, else an equal one, else the weakest.
#[must_use]
pub fn choose_defender(state: &DuelState, side: Side, attacker: InstanceId) -> Option<usize> {
    let power = effective_power(state, attacker);
    let blockers = fighters(state, side.opponent(), false);
    blockers
        .iter()
        .filter(|b| b.power < power && !is_battle_protected(state, b.id))
        .max_by_key(|b| b.power)
        .or_else(|| blockers.iter().find(|b| b.power == power))
        .or_else(|| blockers.iter().min_by_key(|b| b.power))
        .map(|b| b.slot)
}
