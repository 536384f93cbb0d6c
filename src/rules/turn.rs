//! Turn flow: phase advancement, end of turn and the draw phase.
//!
//! The very first turn of the duel skips its draw and its BATTLE phase.
//! Advancing from MAIN2 (or END) runs end-of-turn processing: the active
//! side discards down to the hand limit, control passes, and the next
//! side's DRAW phase starts immediately.

use tracing::{debug, info};

use super::actions::{ActionOutcome, IllegalAction};
use super::Phase;
use crate::duel::Duel;
use crate::prompt::HandReason;
use crate::triggers::DuelEvent;

impl Duel {
    /// Announce the duel and run the first DRAW phase.
    pub fn start(&mut self) {
        let first = self.state.first;
        info!(first = %first, "duel started");
        self.emit(DuelEvent::DuelStarted { first });
        self.enter_phase(Phase::Draw);
        self.draw_phase();
    }

    /// Deal opening hands, first side first.
    pub(crate) fn deal_opening_hands(&mut self) {
        let count = self.state.config.opening_hand;
        for side in self.state.first.starting_with() {
            let drawn = self.draw(side, count);
            debug!(side = %side, drawn, "opening hand dealt");
        }
    }

    /// Move the active side to its next phase.
    pub async fn advance_phase(&mut self) -> ActionOutcome {
        if self.state.is_over() {
            return IllegalAction::DuelOver.into();
        }
        let phase = self.state.phase;
        if phase.ends_turn() {
            self.end_turn().await;
            return ActionOutcome::Resolved;
        }
        let next = match phase {
            Phase::Main1 if self.state.is_first_turn() => Phase::Main2,
            other => other.next(),
        };
        self.enter_phase(next);
        ActionOutcome::Resolved
    }

    fn enter_phase(&mut self, phase: Phase) {
        for (_, board) in self.state.sides.iter_mut() {
            for card in board.hand.iter_mut() {
                card.fresh = false;
            }
        }
        self.state.phase = phase;
        let side = self.state.active;
        let turn = self.state.turn;
        debug!(side = %side, %phase, turn, "phase changed");
        self.emit(DuelEvent::PhaseChanged { side, phase, turn });
    }

    async fn end_turn(&mut self) {
        if self.state.phase != Phase::End {
            self.enter_phase(Phase::End);
        }
        let side = self.state.active;
        let excess = self
            .state
            .side(side)
            .hand
            .len()
            .saturating_sub(self.state.config.hand_limit);
        if excess > 0 {
            debug!(side = %side, excess, "discarding down to the hand limit");
            self.discard(side, excess, HandReason::EndPhaseDiscard).await;
        }
        if self.state.is_over() {
            return;
        }

        let next = side.opponent();
        self.state.active = next;
        self.state.turns_passed += 1;
        if next != self.state.first {
            self.state.turn += 1;
        }
        let turn = self.state.turn;
        info!(to = %next, turn, "turn passed");
        self.emit(DuelEvent::TurnPassed { to: next, turn });
        self.begin_turn();
    }

    fn begin_turn(&mut self) {
        for (_, board) in self.state.sides.iter_mut() {
            board.refreshes_used = 0;
            board.normal_summoned = false;
            for card in board.board_mut() {
                card.start_turn();
            }
        }
        self.enter_phase(Phase::Draw);
        self.draw_phase();
    }

    fn draw_phase(&mut self) {
        if self.state.is_first_turn() {
            debug!("first turn, no draw");
            return;
        }
        let side = self.state.active;
        if self.draw(side, 1) == 0 {
            debug!(side = %side, "nothing to draw this turn");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;
    use crate::core::{DuelConfig, DuelState, Side};
    use crate::effects::{EffectAction, EffectInstruction};
    use crate::triggers::Trigger;
    use crate::prompt::{DeclinePrompt, NullPresenter};
    use crate::zones::Zone;
    use futures::executor::block_on;

    fn duel() -> Duel {
        let config = DuelConfig::default().with_human_side(None).with_cpu_pacing(0, 0);
        let mut duel = Duel::new(DuelState::new(config, 4), Box::new(DeclinePrompt), Box::new(NullPresenter));
        for side in Side::BOTH {
            for i in 0..10 {
                duel.state
                    .spawn(side, Zone::Deck, CardDefinition::monster(format!("c{}", i).as_str(), "C", 1, 100));
            }
        }
        duel
    }

    #[test]
    fn test_first_turn_skips_draw_and_battle() {
        let mut duel = duel();
        duel.start();
        assert!(duel.state.side(Side::Player).hand.is_empty());

        block_on(duel.advance_phase());
        assert_eq!(duel.state.phase, Phase::Main1);
        block_on(duel.advance_phase());
        assert_eq!(duel.state.phase, Phase::Main2);
    }

    #[test]
    fn test_turn_passes_and_next_side_draws() {
        let mut duel = duel();
        duel.start();
        for _ in 0..3 {
            block_on(duel.advance_phase());
        }

        assert_eq!(duel.state.active, Side::Opponent);
        assert_eq!(duel.state.phase, Phase::Draw);
        assert_eq!(duel.state.turn, 2);
        assert_eq!(duel.state.side(Side::Opponent).hand.len(), 1);

        // Second turn keeps its BATTLE phase.
        block_on(duel.advance_phase());
        block_on(duel.advance_phase());
        assert_eq!(duel.state.phase, Phase::Battle);
    }

    #[test]
    fn test_turn_counter_advances_only_for_second_side() {
        let mut duel = duel();
        duel.start();
        let mut turns = Vec::new();
        while duel.state.turns_passed < 4 {
            block_on(duel.advance_phase());
            if duel.state.phase == Phase::Draw {
                turns.push(duel.state.turn);
            }
        }
        assert_eq!(turns, vec![2, 2, 3, 3]);
    }

    #[test]
    fn test_end_turn_discards_to_limit() {
        let mut duel = duel();
        duel.start();
        for i in 0..11 {
            duel.state
                .spawn(Side::Player, Zone::Hand, CardDefinition::monster(format!("h{}", i).as_str(), "H", 2, 100));
        }
        duel.state.phase = Phase::Main2;

        block_on(duel.advance_phase());

        assert_eq!(duel.state.side(Side::Player).hand.len(), 10);
        assert_eq!(duel.state.side(Side::Player).trash.len(), 1);
        assert_eq!(duel.state.active, Side::Opponent);
    }

    #[test]
    fn test_begin_turn_resets_flags() {
        let mut duel = duel();
        duel.start();
        let id = duel
            .state
            .spawn(Side::Player, Zone::Monster(0), CardDefinition::monster("a", "A", 1, 100));
        duel.state.card_mut(id).unwrap().attacked = true;
        duel.state.side_mut(Side::Player).normal_summoned = true;
        duel.state.phase = Phase::End;

        block_on(duel.advance_phase());

        assert!(!duel.state.card(id).unwrap().attacked);
        assert!(!duel.state.side(Side::Player).normal_summoned);
    }

    #[test]
    fn test_once_per_turn_usage_is_per_side_turn() {
        let config = DuelConfig::default().with_human_side(None).with_cpu_pacing(0, 0);
        let mut duel = Duel::new(DuelState::new(config, 4), Box::new(DeclinePrompt), Box::new(NullPresenter));
        duel.state.turns_passed = 2;
        duel.state.turn = 2;
        duel.state.active = Side::Opponent;
        duel.state.phase = Phase::Main2;
        let mender = CardDefinition::monster("mender", "Mender", 2, 400).with_effect(
            EffectInstruction::new(Trigger::OnSentToTrash, EffectAction::Heal { value: 100 }).once_per_turn(),
        );
        let id = duel.state.spawn(Side::Opponent, Zone::Hand, mender);

        block_on(duel.discard(Side::Opponent, 1, HandReason::EffectDiscard));
        assert_eq!(duel.state.side(Side::Opponent).life, 4100);

        let board = duel.state.side_mut(Side::Opponent);
        let (_, card) = board.take(id).unwrap();
        board.hand.push_back(card);
        block_on(duel.advance_phase());
        assert_eq!(duel.state.active, Side::Player);
        assert_eq!(duel.state.turn, 2);

        block_on(duel.discard(Side::Opponent, 1, HandReason::EffectDiscard));
        assert_eq!(duel.state.side(Side::Opponent).life, 4200);
    }

    #[test]
    fn test_advance_after_duel_over() {
        let mut duel = duel();
        duel.finish(Side::Player);
        assert_eq!(
            block_on(duel.advance_phase()),
            ActionOutcome::Illegal(IllegalAction::DuelOver)
        );
    }
}
