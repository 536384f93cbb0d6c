//! Property tests for the aggregator and whole duels.

use card_duel::cards::{CardDefinition, Catalog, InstanceId, PowerModifier};
use card_duel::core::{DuelConfig, DuelState, Side};
use card_duel::duel::{Duel, DuelBuilder};
use card_duel::effects::{effective_power, final_damage, is_protected, DestroyCause};
use card_duel::prompt::{DeclinePrompt, NullPresenter};
use card_duel::rules::Phase;
use card_duel::zones::Zone;
use futures::executor::block_on;
use proptest::prelude::*;

fn starter(code: &str) -> CardDefinition {
    Catalog::starter().unwrap().get_card(code).unwrap()
}

fn cause() -> impl Strategy<Value = DestroyCause> {
    prop_oneof![Just(DestroyCause::Battle), Just(DestroyCause::Effect)]
}

proptest! {
    /// Power never goes negative, whatever modifiers pile up.
    #[test]
    fn prop_power_never_negative(
        base in 0i64..3000,
        modifiers in prop::collection::vec(-3000i64..3000, 0..6),
        opponent_turn in any::<bool>(),
    ) {
        let mut state = DuelState::new(DuelConfig::default(), 1);
        let id = state.spawn(Side::Player, Zone::Monster(0), CardDefinition::monster("x", "X", 1, base));
        state.spawn(Side::Player, Zone::Monster(1), starter("m001"));
        if opponent_turn {
            state.active = Side::Opponent;
        }
        for value in modifiers {
            state.card_mut(id).unwrap().add_modifier(PowerModifier::permanent(value));
        }

        prop_assert!(effective_power(&state, id) >= 0);
    }

    /// Asking about protection does not spend it.
    #[test]
    fn prop_protection_query_is_pure(ward in any::<bool>(), sentinel in any::<bool>(), cause in cause()) {
        let mut state = DuelState::new(DuelConfig::default(), 2);
        if ward {
            state.spawn(Side::Player, Zone::Spell(0), starter("s005"));
        }
        let code = if sentinel { "m006" } else { "m003" };
        let id = state.spawn(Side::Player, Zone::Monster(0), starter(code));

        let first = is_protected(&state, id, cause);
        let second = is_protected(&state, id, cause);

        prop_assert_eq!(first, second);
        prop_assert!(state.card(id).unwrap().protection_usage.is_empty());
        if first {
            prop_assert!(ward || (sentinel && cause == DestroyCause::Battle));
        }
    }

    /// Reduced damage stays between zero and the raw amount.
    #[test]
    fn prop_final_damage_bounded(raw in 0i64..5000, wardens in 0usize..=3) {
        let mut state = DuelState::new(DuelConfig::default(), 3);
        for slot in 0..wardens {
            state.spawn(Side::Opponent, Zone::Monster(slot), starter("m009"));
        }

        let damage = final_damage(&state, Side::Opponent, raw);

        prop_assert!(damage >= 0);
        prop_assert!(damage <= raw);
        prop_assert_eq!(damage, (raw - 200 * wardens as i64).max(0));
    }

    /// Once-per-turn battle protection saves exactly the first battle.
    #[test]
    fn prop_once_per_turn_protection(attackers in 1usize..=3) {
        let config = DuelConfig::default().with_human_side(None).with_cpu_pacing(0, 0);
        let mut state = DuelState::new(config, 4);
        state.turns_passed = 1;
        state.phase = Phase::Battle;
        let sentinel = state.spawn(Side::Opponent, Zone::Monster(0), starter("m006"));
        for slot in 0..attackers {
            state.spawn(Side::Player, Zone::Monster(slot), CardDefinition::monster("a", "A", 4, 2000));
        }
        let mut duel = Duel::new(state, Box::new(DeclinePrompt), Box::new(NullPresenter));

        block_on(duel.attack(Side::Player, 0, Some(0)));
        prop_assert!(duel.state().locate(sentinel).unwrap().zone.is_board());

        for slot in 1..attackers {
            block_on(duel.attack(Side::Player, slot, Some(0)));
        }
        let survived = duel.state().locate(sentinel).unwrap().zone.is_board();
        prop_assert_eq!(survived, attackers == 1);
    }
}

proptest! {
    /// A draw-phase refresh turns the old trash into the new deck, less the
    /// bonus card and the normal draw.
    #[test]
    fn prop_refresh_permutes_trash(seed in any::<u64>(), size in 1usize..25) {
        let config = DuelConfig::default().with_human_side(None).with_cpu_pacing(0, 0);
        let mut state = DuelState::new(config, seed);
        state.turns_passed = 1;
        state.phase = Phase::Main2;
        let mut trash: Vec<InstanceId> = (0..size)
            .map(|i| {
                let level = 1 + (i % 4) as u8;
                state.spawn(Side::Opponent, Zone::Trash, CardDefinition::monster("t", "T", level, 100 * i as i64))
            })
            .collect();
        let mut duel = Duel::new(state, Box::new(DeclinePrompt), Box::new(NullPresenter));

        block_on(duel.advance_phase());

        let board = duel.state().side(Side::Opponent);
        prop_assert_eq!(duel.state().active, Side::Opponent);
        prop_assert!(board.trash.is_empty());
        prop_assert_eq!(board.hand.len(), size.min(2));
        let mut seen: Vec<InstanceId> = board.deck.iter().chain(board.hand.iter()).map(|c| c.id).collect();
        seen.sort();
        trash.sort();
        prop_assert_eq!(seen, trash);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    /// Automated duels keep life non-negative and never lose a card.
    #[test]
    fn prop_cpu_duels_keep_invariants(seed in any::<u64>()) {
        let mut duel = DuelBuilder::new(Catalog::starter().unwrap())
            .config(DuelConfig::default().with_human_side(None).with_cpu_pacing(0, 0))
            .recipe(Side::Player, "ember_control")
            .recipe(Side::Opponent, "starter_fire")
            .seed(seed)
            .build()
            .unwrap();

        block_on(duel.run_until_input(120));

        let state = duel.state();
        let sizes = [(Side::Player, 30), (Side::Opponent, 20)];
        for (side, size) in sizes {
            let board = state.side(side);
            prop_assert!(board.life >= 0);
            prop_assert_eq!(
                board.deck.len() + board.hand.len() + board.trash.len() + board.board().count(),
                size
            );
        }
        if let Some(winner) = state.winner() {
            prop_assert_eq!(state.side(winner.opponent()).life, 0);
        }
    }
}
