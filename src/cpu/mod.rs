//! The automated side.
//!
//! The decision heuristic plays whole phases: in a main phase it activates
//! ignitions, normal summons its best monster and then casts spells in role
//! order until nothing worthwhile is left; in BATTLE it keeps attacking
//! while [`scoring::plan_attack`] proposes something. Every action goes
//! through the same entry points the prompt-driven side uses, so the
//! automated side can never make an illegal move.
//!
//! ## Driving a duel
//!
//! - [`Duel::step`]: play one phase for the automated active side, or
//!   report that the prompt-driven side must act
//! - [`Duel::run_until_input`]: step until input is needed or the duel ends

pub mod scoring;

use tracing::{debug, trace};

use crate::core::Side;
use crate::duel::Duel;
use crate::rules::Phase;
use crate::triggers::Trigger;

impl Duel {
    /// Play the current phase if the active side is automated, then
    /// advance. Returns `false` when the duel is over or waiting on the
    /// prompt-driven side.
    pub async fn step(&mut self) -> bool {
        if self.state.is_over() {
            return false;
        }
        let side = self.state.active;
        if !self.is_automated(side) {
            return false;
        }
        self.run_cpu_phase().await;
        if !self.state.is_over() {
            self.advance_phase().await;
        }
        !self.state.is_over()
    }

    /// Step up to `max_steps` times. Returns the number of steps taken.
    pub async fn run_until_input(&mut self, max_steps: usize) -> usize {
        let mut steps = 0;
        while steps < max_steps && self.step().await {
            steps += 1;
        }
        debug!(steps, over = self.state.is_over(), "run paused");
        steps
    }

    /// Play the current phase for the active side using the heuristic.
    pub async fn run_cpu_phase(&mut self) {
        let side = self.state.active;
        match self.state.phase {
            Phase::Main1 | Phase::Main2 => self.cpu_main(side).await,
            Phase::Battle => self.cpu_battle(side).await,
            Phase::Draw | Phase::End => trace!(side = %side, phase = %self.state.phase, "nothing to decide"),
        }
    }

    async fn cpu_main(&mut self, side: Side) {
        self.pause(self.state.config.cpu_think_ms).await;
        let action_ms = self.state.config.cpu_action_ms;

        let ignitions: Vec<_> = self
            .state
            .board_ids(side)
            .into_iter()
            .filter(|&(owner, id)| {
                owner == side && self.state.card(id).is_some_and(|c| c.definition.has_trigger(Trigger::Ignition))
            })
            .map(|(_, id)| id)
            .collect();
        for id in ignitions {
            if self.state.is_over() {
                return;
            }
            let Some(location) = self.state.locate(id).filter(|l| l.side == side && l.zone.is_board()) else {
                continue;
            };
            if self.activate_ignition(side, location.zone).await.is_resolved() {
                self.pause(action_ms).await;
            }
        }

        if let Some(index) = scoring::summon_choice(&self.state, side) {
            if self.normal_summon(side, index).await.is_resolved() {
                self.pause(action_ms).await;
            }
        }

        while !self.state.is_over() {
            let Some(index) = scoring::spell_choice(&self.state, side) else {
                break;
            };
            if !self.activate_spell(side, index).await.is_resolved() {
                break;
            }
            self.pause(action_ms).await;
        }
    }

    async fn cpu_battle(&mut self, side: Side) {
        self.pause(self.state.config.cpu_think_ms).await;
        while !self.state.is_over() {
            let Some((attacker, defender)) = scoring::plan_attack(&self.state, side) else {
                break;
            };
            if !self.attack(side, attacker, defender).await.is_resolved() {
                break;
            }
            self.pause(self.state.config.cpu_action_ms).await;
        }
    }
}
