//! Reaction fan-out.
//!
//! Some triggers are answered by cards other than the one that moved:
//! every board card watching `on_other_sent_to_trash` reacts to a
//! destruction, and every monster watching `on_lp_gain` reacts to a heal.
//! Watchers are snapshotted before the first one runs; a watcher that has
//! left its slot by the time its turn comes is skipped.

use smallvec::SmallVec;
use tracing::debug;

use super::Trigger;
use crate::cards::InstanceId;
use crate::core::Side;
use crate::duel::Duel;

impl Duel {
    /// Reactions to `card`, controlled by `side`, being destroyed.
    ///
    /// Watchers on the board react first (the destroyed card's side first),
    /// then the destroyed card's own `on_sent_to_trash` instructions run.
    pub(crate) async fn fire_destruction_reactions(&mut self, card: InstanceId, side: Side) {
        let watchers: SmallVec<[(Side, InstanceId); 12]> = self
            .state
            .board_ids(side)
            .into_iter()
            .filter(|&(_, id)| {
                id != card
                    && self
                        .state
                        .card(id)
                        .is_some_and(|c| c.definition.has_trigger(Trigger::OnOtherSentToTrash))
            })
            .collect();

        for (controller, id) in watchers {
            if self.state.is_over() {
                return;
            }
            if !self.still_on_board(controller, id) {
                debug!(card = %id, "watcher left the board");
                continue;
            }
            self.resolve_effects(id, controller, Some(Trigger::OnOtherSentToTrash)).await;
        }
        self.resolve_effects(card, side, Some(Trigger::OnSentToTrash)).await;
    }

    /// Every monster's `on_lp_gain` reaction, `gained` side first.
    pub(crate) async fn fire_life_gain(&mut self, gained: Side) {
        let watchers: SmallVec<[(Side, InstanceId); 8]> = gained
            .starting_with()
            .into_iter()
            .flat_map(|side| self.state.monster_ids(side).into_iter().map(move |id| (side, id)))
            .filter(|&(_, id)| {
                self.state
                    .card(id)
                    .is_some_and(|c| c.definition.has_trigger(Trigger::OnLpGain))
            })
            .collect();

        for (controller, id) in watchers {
            if self.state.is_over() {
                return;
            }
            if self.still_on_board(controller, id) {
                self.resolve_effects(id, controller, Some(Trigger::OnLpGain)).await;
            }
        }
    }

    fn still_on_board(&self, side: Side, id: InstanceId) -> bool {
        self.state
            .locate(id)
            .is_some_and(|loc| loc.side == side && loc.zone.is_board())
    }
}
