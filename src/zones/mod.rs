//! Card zones and per-side board storage.
//!
//! Each side owns five kinds of zone: an ordered draw pile, a hand, an
//! ordered discard pile ("trash"), and fixed rows of monster and spell
//! slots. A card instance lives in exactly one zone; moving it is a
//! remove-then-insert.
//!
//! ## Key Types
//!
//! - `Zone`: Which zone, with the slot index for board zones
//! - `Location`: A zone on a specific side
//! - `SideState`: Life, piles, slots and per-turn counters for one side

pub mod side;

pub use side::SideState;

use serde::{Deserialize, Serialize};

use crate::core::Side;

/// A zone on one side of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    /// Draw pile. The top is the back of the vector.
    Deck,
    Hand,
    /// Discard pile. The most recent card is the back of the vector.
    Trash,
    Monster(usize),
    Spell(usize),
}

impl Zone {
    /// Monster or spell slot.
    #[must_use]
    pub const fn is_board(self) -> bool {
        matches!(self, Zone::Monster(_) | Zone::Spell(_))
    }

    /// Draw pile, hand or discard pile.
    #[must_use]
    pub const fn is_pile(self) -> bool {
        !self.is_board()
    }

    /// The pile or slot row without a slot index, for comparisons.
    #[must_use]
    pub const fn kind(self) -> ZoneKind {
        match self {
            Zone::Deck => ZoneKind::Deck,
            Zone::Hand => ZoneKind::Hand,
            Zone::Trash => ZoneKind::Trash,
            Zone::Monster(_) => ZoneKind::Monster,
            Zone::Spell(_) => ZoneKind::Spell,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Zone::Deck => write!(f, "deck"),
            Zone::Hand => write!(f, "hand"),
            Zone::Trash => write!(f, "trash"),
            Zone::Monster(slot) => write!(f, "monster slot {}", slot),
            Zone::Spell(slot) => write!(f, "spell slot {}", slot),
        }
    }
}

/// Zone category without slot index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Deck,
    Hand,
    Trash,
    Monster,
    Spell,
}

/// Where a card instance currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub side: Side,
    pub zone: Zone,
}

impl Location {
    #[must_use]
    pub const fn new(side: Side, zone: Zone) -> Self {
        Self { side, zone }
    }

    /// On a monster slot.
    #[must_use]
    pub const fn is_monster(self) -> bool {
        matches!(self.zone, Zone::Monster(_))
    }
}
