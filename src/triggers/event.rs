//! Duel events.
//!
//! Events describe board mutations after they happen. The engine hands
//! each one to the presentation sink together with the current state; no
//! rule ever reads them back.

use serde::{Deserialize, Serialize};

use crate::cards::InstanceId;
use crate::core::Side;
use crate::effects::DestroyCause;
use crate::rules::Phase;
use crate::zones::Zone;

/// Something that changed on the board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuelEvent {
    /// Opening hands are dealt and `first` takes turn one.
    DuelStarted { first: Side },

    PhaseChanged { side: Side, phase: Phase, turn: u32 },

    /// Control moved to `to`.
    TurnPassed { to: Side, turn: u32 },

    CardDrawn { side: Side, card: InstanceId },

    /// The trash was shuffled back into the draw pile.
    DeckRefreshed { side: Side, cards: usize },

    Summoned {
        side: Side,
        card: InstanceId,
        slot: usize,
        special: bool,
    },

    SpellActivated { side: Side, card: InstanceId, slot: usize },

    /// An instruction started executing.
    EffectResolving {
        side: Side,
        card: InstanceId,
        instruction: usize,
    },

    SentToTrash { side: Side, card: InstanceId, from: Zone },

    AddedToHand { side: Side, card: InstanceId, from: Zone },

    Destroyed {
        side: Side,
        card: InstanceId,
        cause: DestroyCause,
    },

    DestructionPrevented { side: Side, card: InstanceId },

    PowerModified { card: InstanceId, value: i64 },

    CombatEffectAttached { card: InstanceId },

    LifeChanged { side: Side, delta: i64, life: i64 },

    AttackDeclared {
        side: Side,
        attacker: InstanceId,
        defender: Option<InstanceId>,
    },

    /// A spell or ignition was abandoned and the board restored to how it
    /// was before `card` was activated.
    ActionCancelled { side: Side, card: InstanceId },

    DuelEnded { winner: Side },
}

impl DuelEvent {
    /// The side the event happened to, when there is one.
    #[must_use]
    pub fn side(&self) -> Option<Side> {
        match self {
            DuelEvent::DuelStarted { first } => Some(*first),
            DuelEvent::PhaseChanged { side, .. }
            | DuelEvent::CardDrawn { side, .. }
            | DuelEvent::DeckRefreshed { side, .. }
            | DuelEvent::Summoned { side, .. }
            | DuelEvent::SpellActivated { side, .. }
            | DuelEvent::EffectResolving { side, .. }
            | DuelEvent::SentToTrash { side, .. }
            | DuelEvent::AddedToHand { side, .. }
            | DuelEvent::Destroyed { side, .. }
            | DuelEvent::DestructionPrevented { side, .. }
            | DuelEvent::LifeChanged { side, .. }
            | DuelEvent::AttackDeclared { side, .. }
            | DuelEvent::ActionCancelled { side, .. } => Some(*side),
            DuelEvent::TurnPassed { to, .. } => Some(*to),
            DuelEvent::DuelEnded { winner } => Some(*winner),
            DuelEvent::PowerModified { .. } | DuelEvent::CombatEffectAttached { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_side() {
        let drawn = DuelEvent::CardDrawn {
            side: Side::Opponent,
            card: InstanceId::new(3),
        };
        assert_eq!(drawn.side(), Some(Side::Opponent));

        let buffed = DuelEvent::PowerModified {
            card: InstanceId::new(3),
            value: 500,
        };
        assert_eq!(buffed.side(), None);
    }

    #[test]
    fn test_event_serde() {
        let event = DuelEvent::PhaseChanged {
            side: Side::Player,
            phase: Phase::Battle,
            turn: 2,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: DuelEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }
}
