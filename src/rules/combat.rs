//! Combat, destruction and damage.
//!
//! ## Battle resolution
//!
//! With attacker power `a` and defender power `d` (effective powers, plus
//! any `Boost` combat effects on the attacker):
//!
//! - `a > d`: the defender is destroyed and its side takes `a - d`
//! - `a == d`: both are destroyed, no damage
//! - `a < d`: the attacker is destroyed and its side takes `d - a`
//!
//! A direct attack deals `a`. Battle protection and global protection both
//! stop battle destruction; effect destruction only respects global
//! protection.

use smallvec::SmallVec;
use tracing::{debug, info};

use super::actions::{check_attack, ActionOutcome, IllegalAction};
use crate::cards::InstanceId;
use crate::core::Side;
use crate::cpu::scoring;
use crate::duel::Duel;
use crate::effects::{consume_protection, effective_power, final_damage, CombatEffect, DestroyCause};
use crate::prompt::{SlotReason, SlotRef, SlotRequest, SlotZone};
use crate::triggers::DuelEvent;

impl Duel {
    /// Deal `raw` damage to `side` after standing reductions.
    ///
    /// Life never drops below zero; reaching zero ends the duel. Returns
    /// the damage actually dealt.
    pub(crate) fn deal_damage(&mut self, side: Side, raw: i64) -> i64 {
        if self.state.is_over() || raw <= 0 {
            return 0;
        }
        let damage = final_damage(&self.state, side, raw);
        if damage == 0 {
            debug!(side = %side, raw, "damage fully reduced");
            return 0;
        }

        let board = self.state.side_mut(side);
        board.life = (board.life - damage).max(0);
        let life = board.life;
        info!(side = %side, damage, life, "damage dealt");
        self.emit(DuelEvent::LifeChanged {
            side,
            delta: -damage,
            life,
        });
        if life == 0 {
            self.finish(side.opponent());
        }
        damage
    }

    /// Destroy a board card.
    ///
    /// Returns `false` when the card is not on the board or a protection
    /// saved it. On success the card reaches its owner's trash and the
    /// destruction reactions run.
    pub async fn destroy(&mut self, id: InstanceId, cause: DestroyCause) -> bool {
        if !self.state.locate(id).is_some_and(|loc| loc.zone.is_board()) {
            return false;
        }
        if consume_protection(&mut self.state, id, cause) {
            let side = self.state.locate(id).map_or(Side::Player, |loc| loc.side);
            info!(card = %id, ?cause, "destruction prevented");
            self.emit(DuelEvent::DestructionPrevented { side, card: id });
            return false;
        }

        let Some((from, mut card)) = self.state.take(id) else {
            return false;
        };
        card.leave_board();
        let owner = card.owner;
        self.state.side_mut(owner).trash.push_back(card);
        info!(card = %id, side = %from.side, ?cause, "destroyed");
        self.emit(DuelEvent::Destroyed {
            side: from.side,
            card: id,
            cause,
        });
        self.emit(DuelEvent::SentToTrash {
            side: owner,
            card: id,
            from: from.zone,
        });
        self.fire_destruction_reactions(id, from.side).await;
        true
    }

    /// Attack with the monster on `attacker_slot`.
    ///
    /// `defender_slot` is required when the opponent controls a monster
    /// and ignored otherwise (direct attack).
    pub async fn attack(&mut self, side: Side, attacker_slot: usize, defender_slot: Option<usize>) -> ActionOutcome {
        let attacker = match check_attack(&self.state, side, attacker_slot) {
            Ok(id) => id,
            Err(reason) => return reason.into(),
        };
        let foe = self.state.side(side.opponent());
        let defender = if foe.monster_count() == 0 {
            None
        } else {
            let Some(slot) = defender_slot else {
                return IllegalAction::DefenderRequired.into();
            };
            match foe.monster_at(slot) {
                Some(card) => Some(card.id),
                None => return IllegalAction::NoSuchDefender.into(),
            }
        };
        self.resolve_attack(side, attacker, defender).await;
        ActionOutcome::Resolved
    }

    /// Attack with `attacker_slot`, asking for the defender.
    ///
    /// The prompt-driven side picks through the prompt; cancelling leaves
    /// the attacker ready. The automated side picks by heuristic.
    pub async fn declare_attack(&mut self, side: Side, attacker_slot: usize) -> ActionOutcome {
        let attacker = match check_attack(&self.state, side, attacker_slot) {
            Ok(id) => id,
            Err(reason) => return reason.into(),
        };
        let foe = side.opponent();
        let eligible: Vec<SlotRef> = self
            .state
            .side(foe)
            .monsters()
            .map(|(slot, _)| SlotRef::new(foe, slot))
            .collect();
        if eligible.is_empty() {
            return self.attack(side, attacker_slot, None).await;
        }

        let defender_slot = if self.is_automated(side) {
            scoring::choose_defender(&self.state, side, attacker)
        } else {
            let request = SlotRequest {
                side,
                zone: SlotZone::Monster,
                eligible: eligible.clone(),
                reason: SlotReason::AttackTarget,
            };
            match self.prompt.select_slot(request).await {
                Some(answer) if eligible.contains(&answer) => Some(answer.slot),
                _ => {
                    debug!(side = %side, "attack target selection cancelled");
                    return ActionOutcome::Cancelled;
                }
            }
        };
        self.attack(side, attacker_slot, defender_slot).await
    }

    async fn resolve_attack(&mut self, side: Side, attacker: InstanceId, defender: Option<InstanceId>) {
        let pending: SmallVec<[CombatEffect; 2]> = match self.state.card_mut(attacker) {
            Some(card) => {
                card.attacked = true;
                std::mem::take(&mut card.combat_effects)
            }
            None => SmallVec::new(),
        };
        let boost: i64 = pending
            .iter()
            .map(|effect| match effect {
                CombatEffect::Boost(value) => *value,
                CombatEffect::DestroyTarget => 0,
            })
            .sum();
        self.emit(DuelEvent::AttackDeclared {
            side,
            attacker,
            defender,
        });

        let foe = side.opponent();
        let attack = (effective_power(&self.state, attacker) + boost).max(0);
        let Some(defender) = defender else {
            info!(side = %side, attacker = %attacker, power = attack, "direct attack");
            self.deal_damage(foe, attack);
            return;
        };

        let defense = effective_power(&self.state, defender);
        info!(side = %side, attacker = %attacker, defender = %defender, attack, defense, "battle");
        match attack.cmp(&defense) {
            std::cmp::Ordering::Greater => {
                self.destroy(defender, DestroyCause::Battle).await;
                self.deal_damage(foe, attack - defense);
            }
            std::cmp::Ordering::Equal => {
                self.destroy(defender, DestroyCause::Battle).await;
                self.destroy(attacker, DestroyCause::Battle).await;
            }
            std::cmp::Ordering::Less => {
                self.destroy(attacker, DestroyCause::Battle).await;
                self.deal_damage(side, defense - attack);
            }
        }

        if pending.contains(&CombatEffect::DestroyTarget)
            && !self.state.is_over()
            && self
                .state
                .locate(defender)
                .is_some_and(|loc| loc.side == foe && loc.is_monster())
        {
            debug!(defender = %defender, "combat effect destroys the defender");
            self.destroy(defender, DestroyCause::Effect).await;
        }
    }
}
