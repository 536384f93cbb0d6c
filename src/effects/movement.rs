//! Pile handlers: draw, refresh, mill, search, salvage, special summon and
//! discard.
//!
//! ## Refresh
//!
//! When a side needs a card from an empty deck, its trash is shuffled back
//! in (at most `refreshes_per_turn` times per turn) and one bonus card is
//! drawn. Without a trash or a remaining refresh the draw simply stops.

use smallvec::SmallVec;
use tracing::{debug, info};

use super::effect::Origin;
use super::targeting::{CardFilter, SelectMode};
use crate::cards::InstanceId;
use crate::core::{DuelState, Side};
use crate::cpu::scoring;
use crate::duel::Duel;
use crate::prompt::{CardChoice, CardSummary, HandReason, HandRequest};
use crate::triggers::{DuelEvent, Trigger};
use crate::zones::{Location, Zone};

/// Monsters `side` could special summon from `origin`, deck first.
///
/// `Both` and `Choice` list both piles.
#[must_use]
pub fn summon_candidates(
    state: &DuelState,
    side: Side,
    origin: Origin,
    filter: &CardFilter,
) -> SmallVec<[(Zone, InstanceId); 8]> {
    let zones: &[Zone] = match origin {
        Origin::Deck => &[Zone::Deck],
        Origin::Trash => &[Zone::Trash],
        Origin::Both | Origin::Choice => &[Zone::Deck, Zone::Trash],
    };
    let board = state.side(side);
    zones
        .iter()
        .flat_map(|&zone| {
            board
                .pile(zone)
                .into_iter()
                .flatten()
                .filter(|card| card.definition.is_monster() && filter.matches(&card.definition))
                .map(move |card| (zone, card.id))
        })
        .collect()
}

fn summary(state: &DuelState, id: InstanceId) -> Option<CardSummary> {
    state.card(id).map(|card| CardSummary {
        id,
        code: card.code().clone(),
        name: card.name().to_string(),
        level: card.level(),
        power: card.base_power(),
    })
}

impl Duel {
    /// Draw up to `count` cards, refreshing the deck when allowed.
    ///
    /// Returns the number of cards drawn, not counting refresh bonuses.
    pub(crate) fn draw(&mut self, side: Side, count: usize) -> usize {
        let mut drawn = 0;
        for _ in 0..count {
            if self.state.side(side).deck.is_empty() && !self.refresh_deck(side) {
                debug!(side = %side, "deck empty, nothing to draw");
                break;
            }
            if self.draw_top(side) {
                drawn += 1;
            }
        }
        drawn
    }

    fn draw_top(&mut self, side: Side) -> bool {
        let board = self.state.side_mut(side);
        let Some(mut card) = board.deck.pop_back() else {
            return false;
        };
        card.fresh = true;
        let id = card.id;
        board.hand.push_back(card);
        debug!(side = %side, card = %id, "card drawn");
        self.emit(DuelEvent::CardDrawn { side, card: id });
        true
    }

    /// Shuffle the trash back into an empty deck and draw the bonus card.
    fn refresh_deck(&mut self, side: Side) -> bool {
        let limit = self.state.config.refreshes_per_turn;
        let board = self.state.side_mut(side);
        if board.trash.is_empty() || board.refreshes_used >= limit {
            return false;
        }

        let cards = std::mem::take(&mut board.trash);
        let count = cards.len();
        board.deck.append(cards);
        board.refreshes_used += 1;
        self.state.shuffle_deck(side);

        info!(side = %side, cards = count, "deck refreshed from trash");
        self.emit(DuelEvent::DeckRefreshed { side, cards: count });
        self.draw_top(side);
        true
    }

    /// Send the top `count` deck cards to the trash, one reaction each.
    pub(crate) async fn mill(&mut self, side: Side, count: usize) {
        for _ in 0..count {
            if self.state.is_over() {
                break;
            }
            if self.state.side(side).deck.is_empty() && !self.refresh_deck(side) {
                break;
            }
            let board = self.state.side_mut(side);
            let Some(card) = board.deck.pop_back() else {
                break;
            };
            let id = card.id;
            board.trash.push_back(card);
            debug!(side = %side, card = %id, "card milled");
            self.emit(DuelEvent::SentToTrash {
                side,
                card: id,
                from: Zone::Deck,
            });
            self.resolve_effects(id, side, Some(Trigger::OnSentToTrash)).await;
        }
    }

    /// Move up to `count` random filtered cards from a pile to the hand.
    pub(crate) fn add_to_hand(&mut self, side: Side, from: Zone, count: usize, filter: &CardFilter) -> usize {
        let pool: SmallVec<[InstanceId; 8]> = self
            .state
            .side(side)
            .pile(from)
            .into_iter()
            .flatten()
            .filter(|card| filter.matches(&card.definition))
            .map(|card| card.id)
            .collect();

        let mut moved = 0;
        for index in self.state.rng.sample(pool.len(), count) {
            let id = pool[index];
            if self.state.locate(id) != Some(Location::new(side, from)) {
                continue;
            }
            let board = self.state.side_mut(side);
            let Some((_, card)) = board.take(id) else {
                continue;
            };
            board.hand.push_back(card);
            moved += 1;
            info!(side = %side, card = %id, from = %from, "card added to hand");
            self.emit(DuelEvent::AddedToHand { side, card: id, from });
        }
        moved
    }

    /// Special summon up to `count` monsters from `origin` into free slots.
    ///
    /// Each summoned monster's `on_summon` instructions resolve before the
    /// next one is placed.
    pub(crate) async fn special_summon(
        &mut self,
        side: Side,
        origin: Origin,
        count: usize,
        filter: &CardFilter,
        select: SelectMode,
    ) {
        let origin = match origin {
            Origin::Choice => match self.choose_pile(side, filter).await {
                Some(origin) => origin,
                None => return,
            },
            other => other,
        };
        let pool = summon_candidates(&self.state, side, origin, filter);
        let free = self.state.side(side).empty_monster_slots().len();
        let n = count.min(free).min(pool.len());
        if n == 0 {
            return;
        }

        let picks: SmallVec<[(Zone, InstanceId); 8]> = match select {
            SelectMode::Manual if !self.is_automated(side) => self.prompt_summons(side, pool, n).await,
            SelectMode::Manual => {
                let mut ranked = pool;
                ranked.sort_by_cached_key(|&(_, id)| {
                    let card = self.state.card(id);
                    let level = card.map_or(0, |c| c.level());
                    let power = card.map_or(0, |c| c.base_power());
                    (std::cmp::Reverse(level), std::cmp::Reverse(power))
                });
                ranked.into_iter().take(n).collect()
            }
            SelectMode::All => pool.into_iter().take(n).collect(),
            SelectMode::Auto => self
                .state
                .rng
                .sample(pool.len(), n)
                .into_iter()
                .map(|i| pool[i])
                .collect(),
        };

        for (zone, id) in picks {
            if self.state.is_over() {
                break;
            }
            if self.state.locate(id) != Some(Location::new(side, zone)) {
                debug!(card = %id, "summon pick left its pile, skipping");
                continue;
            }
            let Some(slot) = self.state.side(side).first_empty_monster_slot() else {
                break;
            };
            let Some((_, card)) = self.state.take(id) else {
                continue;
            };
            if self.state.put(Location::new(side, Zone::Monster(slot)), card).is_err() {
                continue;
            }
            info!(side = %side, card = %id, slot, from = %zone, "special summoned");
            self.emit(DuelEvent::Summoned {
                side,
                card: id,
                slot,
                special: true,
            });
            self.resolve_effects(id, side, Some(Trigger::OnSummon)).await;
        }
    }

    /// Resolve a deck-or-trash choice to one pile.
    async fn choose_pile(&mut self, side: Side, filter: &CardFilter) -> Option<Origin> {
        let best = |origin| {
            summon_candidates(&self.state, side, origin, filter)
                .iter()
                .filter_map(|&(_, id)| self.state.card(id).map(|c| c.base_power()))
                .max()
        };
        match (best(Origin::Deck), best(Origin::Trash)) {
            (None, None) => None,
            (Some(_), None) => Some(Origin::Deck),
            (None, Some(_)) => Some(Origin::Trash),
            (Some(deck), Some(trash)) if self.is_automated(side) => {
                Some(if deck >= trash { Origin::Deck } else { Origin::Trash })
            }
            (Some(_), Some(_)) => {
                let message = "Special summon from the deck? Decline to use the trash.".to_string();
                Some(if self.prompt.confirm(side, message).await {
                    Origin::Deck
                } else {
                    Origin::Trash
                })
            }
        }
    }

    async fn prompt_summons(
        &mut self,
        side: Side,
        mut pool: SmallVec<[(Zone, InstanceId); 8]>,
        n: usize,
    ) -> SmallVec<[(Zone, InstanceId); 8]> {
        let mut picks = SmallVec::new();
        while picks.len() < n && !pool.is_empty() {
            let candidates = pool.iter().filter_map(|&(_, id)| summary(&self.state, id)).collect();
            match self.prompt.select_card(CardChoice { side, candidates }).await {
                Some(index) if index < pool.len() => picks.push(pool.remove(index)),
                _ => {
                    debug!(side = %side, picked = picks.len(), "summon selection cancelled");
                    self.note_cancel();
                    return SmallVec::new();
                }
            }
        }
        picks
    }

    /// Discard `count` cards from hand.
    ///
    /// The prompt-driven side chooses; an invalid or cancelled answer falls
    /// back to the heuristic choice. Each discarded card's `on_sent_to_trash`
    /// instructions resolve after all of them reach the trash.
    pub(crate) async fn discard(&mut self, side: Side, count: usize, reason: HandReason) {
        let hand_len = self.state.side(side).hand.len();
        let count = count.min(hand_len);
        if count == 0 {
            return;
        }

        let indices = if self.is_automated(side) {
            scoring::discard_choice(&self.state, side, count)
        } else {
            let request = HandRequest { side, count, reason };
            match self.prompt.select_hand_cards(request).await {
                Some(indices) if valid_hand_choice(&indices, count, hand_len) => indices,
                _ => {
                    debug!(side = %side, count, "discard choice invalid, using heuristic");
                    scoring::discard_choice(&self.state, side, count)
                }
            }
        };

        let ids: SmallVec<[InstanceId; 4]> = indices
            .iter()
            .filter_map(|&i| self.state.side(side).hand.get(i).map(|c| c.id))
            .collect();
        for &id in &ids {
            let board = self.state.side_mut(side);
            let Some((_, card)) = board.take(id) else {
                continue;
            };
            board.trash.push_back(card);
            info!(side = %side, card = %id, ?reason, "card discarded");
            self.emit(DuelEvent::SentToTrash {
                side,
                card: id,
                from: Zone::Hand,
            });
        }
        for id in ids {
            self.resolve_effects(id, side, Some(Trigger::OnSentToTrash)).await;
        }
    }
}

fn valid_hand_choice(indices: &[usize], count: usize, hand_len: usize) -> bool {
    let mut seen: SmallVec<[usize; 8]> = SmallVec::new();
    indices.len() == count
        && indices.iter().all(|&i| {
            let fresh = i < hand_len && !seen.contains(&i);
            seen.push(i);
            fresh
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardDefinition;
    use crate::core::DuelConfig;
    use crate::prompt::{Answer, DeclinePrompt, NullPresenter, ScriptedPrompt};
    use futures::executor::block_on;

    fn duel() -> Duel {
        let config = DuelConfig::default().with_human_side(None).with_cpu_pacing(0, 0);
        Duel::new(DuelState::new(config, 11), Box::new(DeclinePrompt), Box::new(NullPresenter))
    }

    fn monster(code: &str, level: u8, power: i64) -> CardDefinition {
        CardDefinition::monster(code, code, level, power)
    }

    #[test]
    fn test_draw_stops_on_empty_deck_and_trash() {
        let mut duel = duel();
        duel.state.spawn(Side::Player, Zone::Deck, monster("a", 1, 100));

        assert_eq!(duel.draw(Side::Player, 3), 1);
        assert_eq!(duel.state.side(Side::Player).hand.len(), 1);
        assert!(duel.state.side(Side::Player).hand[0].fresh);
    }

    #[test]
    fn test_refresh_once_per_turn() {
        let mut duel = duel();
        for code in ["a", "b", "c"] {
            duel.state.spawn(Side::Player, Zone::Trash, monster(code, 1, 100));
        }

        // Refresh moves 3 cards, draws the bonus, then draws normally.
        assert_eq!(duel.draw(Side::Player, 1), 1);
        let board = duel.state.side(Side::Player);
        assert_eq!(board.hand.len(), 2);
        assert_eq!(board.deck.len(), 1);
        assert!(board.trash.is_empty());
        assert_eq!(board.refreshes_used, 1);

        duel.draw(Side::Player, 1);
        duel.state.spawn(Side::Player, Zone::Trash, monster("d", 1, 100));
        assert_eq!(duel.draw(Side::Player, 1), 0);
        assert_eq!(duel.state.side(Side::Player).trash.len(), 1);
    }

    #[test]
    fn test_search_and_salvage_respect_filter() {
        let mut duel = duel();
        duel.state.spawn(Side::Player, Zone::Deck, monster("low", 1, 100));
        let high = duel.state.spawn(Side::Player, Zone::Deck, monster("high", 4, 1500));
        duel.state.spawn(Side::Player, Zone::Trash, monster("t", 2, 700));

        let moved = duel.add_to_hand(Side::Player, Zone::Deck, 2, &CardFilter::new().with_min_level(3));
        assert_eq!(moved, 1);
        assert_eq!(duel.state.side(Side::Player).hand[0].id, high);

        assert_eq!(duel.add_to_hand(Side::Player, Zone::Trash, 1, &CardFilter::new()), 1);
        assert!(duel.state.side(Side::Player).trash.is_empty());
    }

    #[test]
    fn test_special_summon_manual_cpu_prefers_level_then_power() {
        let mut duel = duel();
        duel.state.spawn(Side::Player, Zone::Trash, monster("a", 2, 900));
        let b = duel.state.spawn(Side::Player, Zone::Trash, monster("b", 3, 600));
        let c = duel.state.spawn(Side::Player, Zone::Trash, monster("c", 3, 1200));

        block_on(duel.special_summon(Side::Player, Origin::Trash, 2, &CardFilter::new(), SelectMode::Manual));

        let board = duel.state.side(Side::Player);
        assert_eq!(board.monster_at(0).map(|m| m.id), Some(c));
        assert_eq!(board.monster_at(1).map(|m| m.id), Some(b));
        assert_eq!(board.trash.len(), 1);
    }

    #[test]
    fn test_special_summon_limited_by_free_slots() {
        let mut duel = duel();
        duel.state.spawn(Side::Player, Zone::Monster(0), monster("x", 1, 100));
        duel.state.spawn(Side::Player, Zone::Monster(2), monster("y", 1, 100));
        for code in ["a", "b", "c"] {
            duel.state.spawn(Side::Player, Zone::Deck, monster(code, 1, 200));
        }

        block_on(duel.special_summon(Side::Player, Origin::Deck, 3, &CardFilter::new(), SelectMode::All));

        assert_eq!(duel.state.side(Side::Player).monster_count(), 3);
        assert_eq!(duel.state.side(Side::Player).deck.len(), 2);
    }

    #[test]
    fn test_choice_origin_cpu_takes_stronger_pile() {
        let mut duel = duel();
        duel.state.spawn(Side::Player, Zone::Deck, monster("weak", 1, 300));
        let strong = duel.state.spawn(Side::Player, Zone::Trash, monster("strong", 4, 1500));

        block_on(duel.special_summon(Side::Player, Origin::Choice, 1, &CardFilter::new(), SelectMode::Auto));

        assert_eq!(duel.state.side(Side::Player).monster_at(0).map(|m| m.id), Some(strong));
    }

    #[test]
    fn test_human_cancel_summons_nothing() {
        let config = DuelConfig::default().with_cpu_pacing(0, 0);
        let mut duel = Duel::new(
            DuelState::new(config, 1),
            Box::new(ScriptedPrompt::new([Answer::Card(None)])),
            Box::new(NullPresenter),
        );
        duel.state.spawn(Side::Player, Zone::Deck, monster("a", 1, 300));

        block_on(duel.special_summon(Side::Player, Origin::Deck, 1, &CardFilter::new(), SelectMode::Manual));

        assert_eq!(duel.state.side(Side::Player).monster_count(), 0);
        assert_eq!(duel.state.side(Side::Player).deck.len(), 1);
    }

    #[test]
    fn test_invalid_discard_answer_falls_back() {
        let config = DuelConfig::default().with_cpu_pacing(0, 0);
        let mut duel = Duel::new(
            DuelState::new(config, 1),
            Box::new(ScriptedPrompt::new([Answer::Hand(Some(vec![0, 0]))])),
            Box::new(NullPresenter),
        );
        for code in ["a", "b", "c"] {
            duel.state.spawn(Side::Player, Zone::Hand, monster(code, 2, 500));
        }

        block_on(duel.discard(Side::Player, 2, HandReason::EffectDiscard));

        assert_eq!(duel.state.side(Side::Player).hand.len(), 1);
        assert_eq!(duel.state.side(Side::Player).trash.len(), 2);
    }

    #[test]
    fn test_valid_hand_choice() {
        assert!(valid_hand_choice(&[2, 0], 2, 3));
        assert!(!valid_hand_choice(&[1, 1], 2, 3));
        assert!(!valid_hand_choice(&[3], 1, 3));
        assert!(!valid_hand_choice(&[0], 2, 3));
    }
}
