//! The effect interpreter.
//!
//! `Duel::resolve_effects` walks a card's instruction list in order and
//! runs every instruction whose trigger matches. Each instruction goes
//! through the same gates before its handler runs:
//!
//! 1. once-per-turn usage
//! 2. condition
//! 3. actionability (a handler with nothing to act on is a silent no-op)
//! 4. the optional "may" confirmation
//!
//! Handlers that move or summon cards call back into `resolve_effects` for
//! the moved card, so cascades nest depth-first. The duel's cascade depth is
//! bounded by `DuelConfig::max_cascade_depth`.

use futures::future::{FutureExt, LocalBoxFuture};
use tracing::{debug, info, warn};

use super::aura::condition_holds;
use super::effect::{BuffDuration, CombatEffect, DestroyCause, EffectAction, EffectInstruction};
use super::movement::summon_candidates;
use super::targeting::{candidates, Intent, SelectMode, TargetSpec};
use crate::cards::{InstanceId, PowerModifier};
use crate::core::{DuelState, Side};
use crate::duel::Duel;
use crate::prompt::HandReason;
use crate::triggers::{DuelEvent, Trigger};
use crate::zones::Zone;

/// Whether executing `instruction` for `card` now would do anything.
///
/// Declarative kinds are never actionable; draw, mill, heal and
/// draw-and-discard always are.
#[must_use]
pub fn instruction_actionable(state: &DuelState, card: InstanceId, side: Side, instruction: &EffectInstruction) -> bool {
    match &instruction.action {
        EffectAction::PassiveBuff { .. }
        | EffectAction::GlobalProtection { .. }
        | EffectAction::BattleProtection { .. }
        | EffectAction::DamageReduction { .. } => false,
        EffectAction::GlobalBuff { target, .. }
        | EffectAction::Buff { target, .. }
        | EffectAction::Destroy { target }
        | EffectAction::ApplyCombatEffect { target, .. } => !candidates(state, target, card, side).is_empty(),
        EffectAction::SpecialSummon { origin, filter, .. } => {
            state.side(side).first_empty_monster_slot().is_some()
                && !summon_candidates(state, side, *origin, filter).is_empty()
        }
        EffectAction::Search { filter, .. } => state
            .side(side)
            .deck
            .iter()
            .any(|c| filter.matches(&c.definition)),
        EffectAction::Salvage { filter, .. } => state
            .side(side)
            .trash
            .iter()
            .any(|c| filter.matches(&c.definition)),
        EffectAction::Draw { .. }
        | EffectAction::Mill { .. }
        | EffectAction::Heal { .. }
        | EffectAction::DrawAndDiscard { .. } => true,
    }
}

impl Duel {
    /// Run `card`'s instructions, controlled by `side`.
    ///
    /// With `Some(trigger)` only instructions for that trigger run; with
    /// `None` every executable instruction does. `always` instructions never
    /// execute. Returns immediately once the duel is over.
    pub fn resolve_effects(
        &mut self,
        card: InstanceId,
        side: Side,
        trigger: Option<Trigger>,
    ) -> LocalBoxFuture<'_, ()> {
        async move {
            if self.state.is_over() {
                return;
            }
            let Some(definition) = self.state.card(card).map(|c| c.definition.clone()) else {
                debug!(card = %card, "card vanished before its effects resolved");
                return;
            };
            if self.depth >= self.state.config.max_cascade_depth {
                warn!(
                    card = %card,
                    depth = self.depth,
                    "cascade depth limit reached, skipping further effects"
                );
                return;
            }

            self.depth += 1;
            for (index, instruction) in definition.effects.iter().enumerate() {
                if trigger.is_some_and(|t| t != instruction.trigger) {
                    continue;
                }
                if self.state.is_over() || self.is_cancelled() {
                    break;
                }
                self.run_instruction(card, side, index, instruction).await;
            }
            self.depth -= 1;
        }
        .boxed_local()
    }

    async fn run_instruction(&mut self, card: InstanceId, side: Side, index: usize, instruction: &EffectInstruction) {
        if instruction.trigger == Trigger::Always || instruction.action.is_declarative() {
            debug!(card = %card, kind = instruction.action.kind_name(), "declarative instruction skipped");
            return;
        }

        let turn = self.state.turns_passed;
        if instruction.is_once_per_turn()
            && self.state.card(card).is_some_and(|c| c.used_on_turn(index, turn))
        {
            debug!(card = %card, index, "already used this turn");
            return;
        }
        if let Some(condition) = &instruction.condition {
            if !condition_holds(&self.state, side, condition) {
                debug!(card = %card, index, ?condition, "condition not met");
                return;
            }
        }
        if !instruction_actionable(&self.state, card, side, instruction) {
            debug!(card = %card, kind = instruction.action.kind_name(), "nothing to act on");
            return;
        }
        if instruction.optional && !self.accept_optional(card, side, instruction).await {
            debug!(card = %card, index, "optional effect declined");
            return;
        }

        if instruction.is_once_per_turn() {
            if let Some(instance) = self.state.card_mut(card) {
                instance.mark_used(index, turn);
            }
        }
        self.emit(DuelEvent::EffectResolving {
            side,
            card,
            instruction: index,
        });
        self.execute(card, side, &instruction.action).await;
    }

    async fn accept_optional(&mut self, card: InstanceId, side: Side, instruction: &EffectInstruction) -> bool {
        if self.is_automated(side) {
            return true;
        }
        let name = self.state.card(card).map(|c| c.name().to_string()).unwrap_or_default();
        let message = format!("Use {} ({})?", name, instruction.action.kind_name());
        self.prompt.confirm(side, message).await
    }

    /// Dispatch one action to its handler.
    async fn execute(&mut self, card: InstanceId, side: Side, action: &EffectAction) {
        match action {
            EffectAction::PassiveBuff { .. }
            | EffectAction::GlobalProtection { .. }
            | EffectAction::BattleProtection { .. }
            | EffectAction::DamageReduction { .. } => {}
            EffectAction::GlobalBuff { target, value, duration } => {
                let spec = TargetSpec {
                    select: SelectMode::All,
                    ..target.clone()
                };
                self.apply_buff(&spec, card, side, *value, *duration).await;
            }
            EffectAction::Buff { target, value, duration } => {
                self.apply_buff(target, card, side, *value, *duration).await;
            }
            EffectAction::SpecialSummon {
                origin,
                count,
                filter,
                select,
            } => {
                self.special_summon(side, *origin, *count, filter, *select).await;
            }
            EffectAction::Draw { count } => {
                self.draw(side, *count);
            }
            EffectAction::Mill { count, side: scope } => {
                for target_side in scope.sides(side) {
                    self.mill(target_side, *count).await;
                }
            }
            EffectAction::Search { count, filter } => {
                self.add_to_hand(side, Zone::Deck, *count, filter);
            }
            EffectAction::Salvage { count, filter } => {
                self.add_to_hand(side, Zone::Trash, *count, filter);
            }
            EffectAction::Heal { value } => self.heal(side, *value).await,
            EffectAction::Destroy { target } => {
                let targets = self.acquire_targets(target, card, side, Intent::Harmful).await;
                for id in targets {
                    if self.state.is_over() {
                        break;
                    }
                    self.destroy(id, DestroyCause::Effect).await;
                }
            }
            EffectAction::DrawAndDiscard { draw, discard } => {
                self.draw(side, *draw);
                self.discard(side, *discard, HandReason::EffectDiscard).await;
            }
            EffectAction::ApplyCombatEffect { target, effect } => {
                self.apply_combat_effect(target, card, side, *effect).await;
            }
        }
    }

    async fn apply_buff(
        &mut self,
        spec: &TargetSpec,
        source: InstanceId,
        side: Side,
        value: i64,
        duration: Option<BuffDuration>,
    ) {
        let intent = if value >= 0 { Intent::Beneficial } else { Intent::Harmful };
        let modifier = match duration {
            Some(duration) => PowerModifier::for_turns(value, duration.turns()),
            None => PowerModifier::permanent(value),
        };

        for id in self.acquire_targets(spec, source, side, intent).await {
            if let Some(card) = self.state.card_mut(id) {
                card.add_modifier(modifier);
                info!(card = %id, value, ?duration, "power modified");
                self.emit(DuelEvent::PowerModified { card: id, value });
            }
        }
    }

    async fn apply_combat_effect(&mut self, spec: &TargetSpec, source: InstanceId, side: Side, effect: CombatEffect) {
        for id in self.acquire_targets(spec, source, side, Intent::Beneficial).await {
            if let Some(card) = self.state.card_mut(id) {
                card.combat_effects.push(effect);
                debug!(card = %id, ?effect, "combat effect attached");
                self.emit(DuelEvent::CombatEffectAttached { card: id });
            }
        }
    }

    async fn heal(&mut self, side: Side, value: i64) {
        let board = self.state.side_mut(side);
        board.life += value;
        let life = board.life;
        info!(side = %side, value, life, "life gained");
        self.emit(DuelEvent::LifeChanged {
            side,
            delta: value,
            life,
        });
        self.fire_life_gain(side).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;
    use crate::core::DuelConfig;
    use crate::effects::{CardFilter, Origin, TargetScope};
    use crate::prompt::{DeclinePrompt, NullPresenter};
    use futures::executor::block_on;

    fn duel() -> Duel {
        let config = DuelConfig::default().with_human_side(None).with_cpu_pacing(0, 0);
        Duel::new(DuelState::new(config, 3), Box::new(DeclinePrompt), Box::new(NullPresenter))
    }

    fn filler(state: &mut DuelState, side: Side, zone: Zone, n: usize) {
        for i in 0..n {
            state.spawn(side, zone, CardDefinition::monster(format!("f{}", i).as_str(), "Filler", 1, 100));
        }
    }

    #[test]
    fn test_actionable_predicates() {
        let mut duel = duel();
        let state = &mut duel.state;
        let card = state.spawn(Side::Player, Zone::Hand, CardDefinition::spell("s", "S"));

        let draw = EffectInstruction::new(Trigger::OnActivate, EffectAction::Draw { count: 1 });
        let passive = EffectInstruction::always(EffectAction::PassiveBuff { value: 100 });
        let salvage = EffectInstruction::new(
            Trigger::OnActivate,
            EffectAction::Salvage {
                count: 1,
                filter: CardFilter::new(),
            },
        );
        let destroy = EffectInstruction::new(
            Trigger::OnActivate,
            EffectAction::Destroy {
                target: TargetSpec::opponent(1),
            },
        );

        assert!(instruction_actionable(state, card, Side::Player, &draw));
        assert!(!instruction_actionable(state, card, Side::Player, &passive));
        assert!(!instruction_actionable(state, card, Side::Player, &salvage));
        assert!(!instruction_actionable(state, card, Side::Player, &destroy));

        filler(state, Side::Player, Zone::Trash, 1);
        filler(state, Side::Opponent, Zone::Monster(0), 1);
        assert!(instruction_actionable(state, card, Side::Player, &salvage));
        assert!(instruction_actionable(state, card, Side::Player, &destroy));
    }

    #[test]
    fn test_special_summon_needs_slot_and_candidate() {
        let mut duel = duel();
        let state = &mut duel.state;
        let card = state.spawn(Side::Player, Zone::Hand, CardDefinition::spell("s", "S"));
        let summon = EffectInstruction::new(
            Trigger::OnActivate,
            EffectAction::SpecialSummon {
                origin: Origin::Trash,
                count: 1,
                filter: CardFilter::new(),
                select: SelectMode::Auto,
            },
        );
        assert!(!instruction_actionable(state, card, Side::Player, &summon));

        filler(state, Side::Player, Zone::Trash, 1);
        assert!(instruction_actionable(state, card, Side::Player, &summon));

        for slot in 0..3 {
            filler(state, Side::Player, Zone::Monster(slot), 1);
        }
        assert!(!instruction_actionable(state, card, Side::Player, &summon));
    }

    #[test]
    fn test_once_per_turn_runs_once() {
        let mut duel = duel();
        let card = duel.state.spawn(
            Side::Player,
            Zone::Monster(0),
            CardDefinition::monster("m", "M", 2, 800).with_effect(
                EffectInstruction::new(
                    Trigger::Ignition,
                    EffectAction::Buff {
                        target: TargetSpec::default(),
                        value: 100,
                        duration: None,
                    },
                )
                .once_per_turn(),
            ),
        );

        block_on(duel.resolve_effects(card, Side::Player, Some(Trigger::Ignition)));
        block_on(duel.resolve_effects(card, Side::Player, Some(Trigger::Ignition)));

        assert_eq!(duel.state.card(card).unwrap().modifier_total(), 100);
    }

    #[test]
    fn test_trigger_filter() {
        let mut duel = duel();
        filler(&mut duel.state, Side::Player, Zone::Deck, 5);
        let card = duel.state.spawn(
            Side::Player,
            Zone::Monster(0),
            CardDefinition::monster("m", "M", 2, 800)
                .with_effect(EffectInstruction::new(Trigger::OnSummon, EffectAction::Draw { count: 1 }))
                .with_effect(EffectInstruction::new(
                    Trigger::OnSentToTrash,
                    EffectAction::Draw { count: 2 },
                )),
        );

        block_on(duel.resolve_effects(card, Side::Player, Some(Trigger::OnSummon)));
        assert_eq!(duel.state.side(Side::Player).hand.len(), 1);

        block_on(duel.resolve_effects(card, Side::Player, None));
        assert_eq!(duel.state.side(Side::Player).hand.len(), 4);
    }

    #[test]
    fn test_condition_gates_instruction() {
        let mut duel = duel();
        filler(&mut duel.state, Side::Player, Zone::Deck, 3);
        let card = duel.state.spawn(
            Side::Player,
            Zone::Monster(0),
            CardDefinition::monster("m", "M", 2, 800).with_effect(
                EffectInstruction::new(Trigger::Ignition, EffectAction::Draw { count: 1 })
                    .with_condition(crate::effects::Condition::IsOpponentTurn),
            ),
        );

        block_on(duel.resolve_effects(card, Side::Player, Some(Trigger::Ignition)));
        assert!(duel.state.side(Side::Player).hand.is_empty());

        duel.state.active = Side::Opponent;
        block_on(duel.resolve_effects(card, Side::Player, Some(Trigger::Ignition)));
        assert_eq!(duel.state.side(Side::Player).hand.len(), 1);
    }

    #[test]
    fn test_cascade_depth_is_bounded() {
        let mut duel = duel();
        duel.state.config.max_cascade_depth = 4;
        // Each milled copy mills one more card when it reaches the trash.
        let looping = CardDefinition::monster("loop", "Loop", 1, 0).with_effect(EffectInstruction::new(
            Trigger::OnSentToTrash,
            EffectAction::Mill {
                count: 1,
                side: TargetScope::Own,
            },
        ));
        for _ in 0..10 {
            duel.state.spawn(Side::Player, Zone::Deck, looping.clone());
        }
        let first = duel.state.spawn(Side::Player, Zone::Trash, looping);

        block_on(duel.resolve_effects(first, Side::Player, Some(Trigger::OnSentToTrash)));

        assert_eq!(duel.depth, 0);
        assert_eq!(duel.state.side(Side::Player).deck.len(), 6);
    }

    #[test]
    fn test_heal_fans_out_to_lp_gain_watchers() {
        let mut duel = duel();
        let watcher = duel.state.spawn(
            Side::Opponent,
            Zone::Monster(0),
            CardDefinition::monster("w", "Watcher", 2, 500).with_effect(EffectInstruction::new(
                Trigger::OnLpGain,
                EffectAction::Buff {
                    target: TargetSpec::default(),
                    value: 300,
                    duration: None,
                },
            )),
        );
        let spell = duel.state.spawn(
            Side::Player,
            Zone::Spell(0),
            CardDefinition::spell("h", "Heal")
                .with_effect(EffectInstruction::new(Trigger::OnActivate, EffectAction::Heal { value: 500 })),
        );

        block_on(duel.resolve_effects(spell, Side::Player, Some(Trigger::OnActivate)));

        assert_eq!(duel.state.side(Side::Player).life, 4500);
        assert_eq!(duel.state.card(watcher).unwrap().modifier_total(), 300);
    }
}
