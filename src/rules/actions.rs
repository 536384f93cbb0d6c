//! Player actions: legality and the summon/activation entry points.
//!
//! Every `check_*` function is pure and reports why an action is illegal.
//! The matching `Duel` method runs the check first, so a rejected action
//! never touches the board.

use smallvec::SmallVec;
use thiserror::Error;
use tracing::{debug, info};

use super::Phase;
use crate::cards::{CardKind, InstanceId, SubType, SummonRequirement};
use crate::core::{DuelState, Side};
use crate::cpu::scoring;
use crate::duel::{CancelState, Duel};
use crate::effects::{condition_holds, instruction_actionable};
use crate::prompt::{SlotReason, SlotRef, SlotRequest, SlotZone};
use crate::triggers::{DuelEvent, Trigger};
use crate::zones::{Location, Zone};

/// Why an action was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalAction {
    #[error("the duel is over")]
    DuelOver,

    #[error("it is not {0}'s turn")]
    NotYourTurn(Side),

    #[error("not allowed during {0}")]
    WrongPhase(Phase),

    #[error("no such card")]
    NoSuchCard,

    #[error("already normal summoned this turn")]
    AlreadySummoned,

    #[error("not a monster")]
    NotAMonster,

    #[error("not a spell")]
    NotASpell,

    #[error("reaches the board only by activation")]
    RequiresSpell,

    #[error("needs {needed} eligible monsters to release")]
    InsufficientCost { needed: usize },

    #[error("no free slot")]
    NoFreeSlot,

    #[error("nothing to activate")]
    NotActivatable,

    #[error("already attacked this turn")]
    AlreadyAttacked,

    #[error("no monster in that slot")]
    NoSuchDefender,

    #[error("a defender must be chosen")]
    DefenderRequired,
}

/// Result of a player action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Resolved,
    /// The prompt-driven side backed out; nothing changed.
    Cancelled,
    Illegal(IllegalAction),
}

impl ActionOutcome {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, ActionOutcome::Resolved)
    }
}

impl From<IllegalAction> for ActionOutcome {
    fn from(reason: IllegalAction) -> Self {
        ActionOutcome::Illegal(reason)
    }
}

/// A legal normal summon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SummonPlan {
    pub card: InstanceId,
    pub cost_count: usize,
    pub min_level: u8,
}

fn check_turn(state: &DuelState, side: Side) -> Result<(), IllegalAction> {
    if state.is_over() {
        return Err(IllegalAction::DuelOver);
    }
    if !state.is_turn_of(side) {
        return Err(IllegalAction::NotYourTurn(side));
    }
    Ok(())
}

fn check_main_phase(state: &DuelState, side: Side) -> Result<(), IllegalAction> {
    check_turn(state, side)?;
    if !state.phase.is_main() {
        return Err(IllegalAction::WrongPhase(state.phase));
    }
    Ok(())
}

/// Own monsters that may be released for a summon needing `min_level`.
#[must_use]
pub fn cost_candidates(state: &DuelState, side: Side, min_level: u8) -> SmallVec<[(usize, InstanceId); 4]> {
    state
        .side(side)
        .monsters()
        .filter(|(_, card)| card.level() >= min_level)
        .map(|(slot, card)| (slot, card.id))
        .collect()
}

/// Whether `card` has a `trigger` instruction that would do something now.
///
/// An instruction counts when it is unused this turn, its condition holds
/// and its handler has something to act on.
#[must_use]
pub fn is_activatable(state: &DuelState, card: InstanceId, side: Side, trigger: Trigger) -> bool {
    let Some(instance) = state.card(card) else {
        return false;
    };
    instance.definition.instructions_for(trigger).any(|(index, instruction)| {
        !(instruction.is_once_per_turn() && instance.used_on_turn(index, state.turns_passed))
            && instruction
                .condition
                .as_ref()
                .map_or(true, |c| condition_holds(state, side, c))
            && instruction_actionable(state, card, side, instruction)
    })
}

/// Check a normal summon of the hand card at `hand_index`.
pub fn check_normal_summon(state: &DuelState, side: Side, hand_index: usize) -> Result<SummonPlan, IllegalAction> {
    check_main_phase(state, side)?;
    let board = state.side(side);
    if board.normal_summoned {
        return Err(IllegalAction::AlreadySummoned);
    }
    let card = board.hand.get(hand_index).ok_or(IllegalAction::NoSuchCard)?;
    if card.definition.kind != CardKind::Monster {
        return Err(IllegalAction::NotAMonster);
    }
    let (cost_count, min_level) = match card.definition.summon {
        SummonRequirement::Normal { cost_count, min_level } => (cost_count, min_level),
        SummonRequirement::SpellActivation => return Err(IllegalAction::RequiresSpell),
    };
    if cost_candidates(state, side, min_level).len() < cost_count {
        return Err(IllegalAction::InsufficientCost { needed: cost_count });
    }
    if cost_count == 0 && board.first_empty_monster_slot().is_none() {
        return Err(IllegalAction::NoFreeSlot);
    }
    Ok(SummonPlan {
        card: card.id,
        cost_count,
        min_level,
    })
}

/// Check activating the hand spell at `hand_index`.
pub fn check_spell(state: &DuelState, side: Side, hand_index: usize) -> Result<InstanceId, IllegalAction> {
    check_main_phase(state, side)?;
    let board = state.side(side);
    let card = board.hand.get(hand_index).ok_or(IllegalAction::NoSuchCard)?;
    if card.definition.kind != CardKind::Spell {
        return Err(IllegalAction::NotASpell);
    }
    if board.first_empty_spell_slot().is_none() {
        return Err(IllegalAction::NoFreeSlot);
    }
    if card.definition.has_trigger(Trigger::OnActivate) && !is_activatable(state, card.id, side, Trigger::OnActivate)
    {
        return Err(IllegalAction::NotActivatable);
    }
    Ok(card.id)
}

/// Check activating the ignition instructions of the card on `zone`.
pub fn check_ignition(state: &DuelState, side: Side, zone: Zone) -> Result<InstanceId, IllegalAction> {
    check_main_phase(state, side)?;
    let card = state.side(side).slot(zone).ok_or(IllegalAction::NoSuchCard)?;
    if !is_activatable(state, card.id, side, Trigger::Ignition) {
        return Err(IllegalAction::NotActivatable);
    }
    Ok(card.id)
}

/// Check that the monster on `slot` may declare an attack.
pub fn check_attack(state: &DuelState, side: Side, slot: usize) -> Result<InstanceId, IllegalAction> {
    check_turn(state, side)?;
    if state.phase != Phase::Battle {
        return Err(IllegalAction::WrongPhase(state.phase));
    }
    let card = state.side(side).monster_at(slot).ok_or(IllegalAction::NoSuchCard)?;
    if card.attacked {
        return Err(IllegalAction::AlreadyAttacked);
    }
    Ok(card.id)
}

/// Hand indices that could be normal summoned now.
#[must_use]
pub fn legal_summons(state: &DuelState, side: Side) -> Vec<usize> {
    (0..state.side(side).hand.len())
        .filter(|&i| check_normal_summon(state, side, i).is_ok())
        .collect()
}

/// Hand indices of spells that could be activated now.
#[must_use]
pub fn legal_spells(state: &DuelState, side: Side) -> Vec<usize> {
    (0..state.side(side).hand.len())
        .filter(|&i| check_spell(state, side, i).is_ok())
        .collect()
}

/// Board zones whose ignition instructions could be activated now.
#[must_use]
pub fn legal_ignitions(state: &DuelState, side: Side) -> Vec<Zone> {
    state
        .side(side)
        .board()
        .map(|(zone, _)| zone)
        .filter(|&zone| check_ignition(state, side, zone).is_ok())
        .collect()
}

/// Monster slots that could attack now.
#[must_use]
pub fn legal_attackers(state: &DuelState, side: Side) -> Vec<usize> {
    state
        .side(side)
        .monsters()
        .map(|(slot, _)| slot)
        .filter(|&slot| check_attack(state, side, slot).is_ok())
        .collect()
}

impl Duel {
    /// Normal summon the hand monster at `hand_index`.
    ///
    /// Costs are released to the trash before the monster is placed. The
    /// prompt-driven side chooses costs and the slot; cancelling either
    /// choice abandons the summon with nothing changed.
    pub async fn normal_summon(&mut self, side: Side, hand_index: usize) -> ActionOutcome {
        let plan = match check_normal_summon(&self.state, side, hand_index) {
            Ok(plan) => plan,
            Err(reason) => return reason.into(),
        };
        let automated = self.is_automated(side);

        let mut pool = cost_candidates(&self.state, side, plan.min_level);
        let mut costs: SmallVec<[(usize, InstanceId); 4]> = SmallVec::new();
        if automated {
            scoring::order_costs(&self.state, &mut pool);
            costs.extend(pool.into_iter().take(plan.cost_count));
        } else {
            while costs.len() < plan.cost_count {
                let request = SlotRequest {
                    side,
                    zone: SlotZone::Monster,
                    eligible: pool.iter().map(|&(slot, _)| SlotRef::new(side, slot)).collect(),
                    reason: SlotReason::SummonCost,
                };
                let answer = self.prompt.select_slot(request).await;
                let Some(index) = answer.and_then(|a| pool.iter().position(|&(slot, _)| a == SlotRef::new(side, slot)))
                else {
                    debug!(side = %side, "summon cost selection cancelled");
                    return ActionOutcome::Cancelled;
                };
                costs.push(pool.remove(index));
            }
        }

        let mut free = self.state.side(side).empty_monster_slots();
        free.extend(costs.iter().map(|&(slot, _)| slot));
        free.sort_unstable();
        let slot = if automated || free.len() == 1 {
            free[0]
        } else {
            let request = SlotRequest {
                side,
                zone: SlotZone::Monster,
                eligible: free.iter().map(|&slot| SlotRef::new(side, slot)).collect(),
                reason: SlotReason::SummonSlot,
            };
            match self.prompt.select_slot(request).await {
                Some(answer) if answer.side == side && free.contains(&answer.slot) => answer.slot,
                _ => {
                    debug!(side = %side, "summon slot selection cancelled");
                    return ActionOutcome::Cancelled;
                }
            }
        };

        for &(cost_slot, id) in &costs {
            let board = self.state.side_mut(side);
            let Some((_, mut card)) = board.take(id) else {
                continue;
            };
            card.leave_board();
            board.trash.push_back(card);
            info!(side = %side, card = %id, "released as summon cost");
            self.emit(DuelEvent::SentToTrash {
                side,
                card: id,
                from: Zone::Monster(cost_slot),
            });
        }

        let board = self.state.side_mut(side);
        let Some((_, card)) = board.take(plan.card) else {
            return IllegalAction::NoSuchCard.into();
        };
        if let Err(card) = board.put(Zone::Monster(slot), card) {
            board.hand.push_back(card);
            return IllegalAction::NoFreeSlot.into();
        }
        board.normal_summoned = true;
        info!(side = %side, card = %plan.card, slot, costs = costs.len(), "normal summoned");
        self.emit(DuelEvent::Summoned {
            side,
            card: plan.card,
            slot,
            special: false,
        });

        for &(_, id) in &costs {
            self.resolve_effects(id, side, Some(Trigger::OnSentToTrash)).await;
        }
        self.resolve_effects(plan.card, side, Some(Trigger::OnSummon)).await;
        ActionOutcome::Resolved
    }

    /// Activate the hand spell at `hand_index`.
    ///
    /// The spell takes the first free spell slot while it resolves; a
    /// non-permanent spell then goes to the trash. If the prompt-driven
    /// side cancels one of the spell's own selections, the board goes back
    /// to how it was before activation and the spell returns to hand.
    pub async fn activate_spell(&mut self, side: Side, hand_index: usize) -> ActionOutcome {
        let id = match check_spell(&self.state, side, hand_index) {
            Ok(id) => id,
            Err(reason) => return reason.into(),
        };
        let Some(slot) = self.state.side(side).first_empty_spell_slot() else {
            return IllegalAction::NoFreeSlot.into();
        };
        let zone = Zone::Spell(slot);
        let before = self.state.clone();

        let Some((_, card)) = self.state.side_mut(side).take(id) else {
            return IllegalAction::NoSuchCard.into();
        };
        let permanent = card.definition.sub_type == SubType::Permanent;
        if let Err(card) = self.state.side_mut(side).put(zone, card) {
            self.state.side_mut(side).hand.push_back(card);
            return IllegalAction::NoFreeSlot.into();
        }
        info!(side = %side, card = %id, slot, permanent, "spell activated");
        self.emit(DuelEvent::SpellActivated { side, card: id, slot });

        if !self.resolve_action(id, side, Trigger::OnActivate).await {
            return self.roll_back(before, side, id);
        }

        if !permanent && self.state.locate(id) == Some(Location::new(side, zone)) {
            let board = self.state.side_mut(side);
            if let Some((_, card)) = board.take(id) {
                board.trash.push_back(card);
                self.emit(DuelEvent::SentToTrash { side, card: id, from: zone });
            }
        }
        ActionOutcome::Resolved
    }

    /// Activate the ignition instructions of the card on `zone`.
    ///
    /// Cancelling one of its selections rolls the board back, including the
    /// once-per-turn usage.
    pub async fn activate_ignition(&mut self, side: Side, zone: Zone) -> ActionOutcome {
        let id = match check_ignition(&self.state, side, zone) {
            Ok(id) => id,
            Err(reason) => return reason.into(),
        };
        let before = self.state.clone();
        info!(side = %side, card = %id, zone = %zone, "ignition activated");
        if !self.resolve_action(id, side, Trigger::Ignition).await {
            return self.roll_back(before, side, id);
        }
        ActionOutcome::Resolved
    }

    /// Resolve `card`'s `trigger` instructions as one cancellable action.
    ///
    /// Returns `false` when a selection was cancelled.
    async fn resolve_action(&mut self, card: InstanceId, side: Side, trigger: Trigger) -> bool {
        self.cancel = CancelState::Armed;
        self.resolve_effects(card, side, Some(trigger)).await;
        std::mem::take(&mut self.cancel) != CancelState::Cancelled
    }

    fn roll_back(&mut self, before: DuelState, side: Side, card: InstanceId) -> ActionOutcome {
        self.state = before;
        info!(side = %side, card = %card, "action cancelled, board restored");
        self.emit(DuelEvent::ActionCancelled { side, card });
        ActionOutcome::Cancelled
    }
}
