//! Board storage for one side of the duel.
//!
//! Piles are `im::Vector`s so cloning a whole duel state stays cheap;
//! slots are plain `Option`s indexed by slot number.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::Zone;
use crate::cards::{CardInstance, InstanceId};

/// Everything one side owns: life, piles, slots and per-turn counters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SideState {
    /// Never negative; reaching zero ends the duel.
    pub life: i64,

    /// Draw pile, top at the back.
    pub deck: Vector<CardInstance>,

    /// Hand in insertion order.
    pub hand: Vector<CardInstance>,

    /// Discard pile, most recent at the back.
    pub trash: Vector<CardInstance>,

    pub monsters: Vec<Option<CardInstance>>,
    pub spells: Vec<Option<CardInstance>>,

    /// Deck refreshes used this turn.
    pub refreshes_used: u32,

    /// Whether the once-per-turn normal summon was spent.
    pub normal_summoned: bool,
}

impl SideState {
    #[must_use]
    pub fn new(life: i64, monster_slots: usize, spell_slots: usize) -> Self {
        Self {
            life,
            deck: Vector::new(),
            hand: Vector::new(),
            trash: Vector::new(),
            monsters: vec![None; monster_slots],
            spells: vec![None; spell_slots],
            refreshes_used: 0,
            normal_summoned: false,
        }
    }

    /// The pile for a pile zone; `None` for slot zones.
    #[must_use]
    pub fn pile(&self, zone: Zone) -> Option<&Vector<CardInstance>> {
        match zone {
            Zone::Deck => Some(&self.deck),
            Zone::Hand => Some(&self.hand),
            Zone::Trash => Some(&self.trash),
            Zone::Monster(_) | Zone::Spell(_) => None,
        }
    }

    fn pile_mut(&mut self, zone: Zone) -> Option<&mut Vector<CardInstance>> {
        match zone {
            Zone::Deck => Some(&mut self.deck),
            Zone::Hand => Some(&mut self.hand),
            Zone::Trash => Some(&mut self.trash),
            Zone::Monster(_) | Zone::Spell(_) => None,
        }
    }

    fn slot_mut(&mut self, zone: Zone) -> Option<&mut Option<CardInstance>> {
        match zone {
            Zone::Monster(slot) => self.monsters.get_mut(slot),
            Zone::Spell(slot) => self.spells.get_mut(slot),
            _ => None,
        }
    }

    /// Card occupying a slot zone.
    #[must_use]
    pub fn slot(&self, zone: Zone) -> Option<&CardInstance> {
        match zone {
            Zone::Monster(slot) => self.monsters.get(slot)?.as_ref(),
            Zone::Spell(slot) => self.spells.get(slot)?.as_ref(),
            _ => None,
        }
    }

    /// Monster in the given slot.
    #[must_use]
    pub fn monster_at(&self, slot: usize) -> Option<&CardInstance> {
        self.slot(Zone::Monster(slot))
    }

    /// Find which zone holds `id`.
    #[must_use]
    pub fn find(&self, id: InstanceId) -> Option<Zone> {
        if let Some(slot) = self.monsters.iter().position(|c| c.as_ref().is_some_and(|c| c.id == id)) {
            return Some(Zone::Monster(slot));
        }
        if let Some(slot) = self.spells.iter().position(|c| c.as_ref().is_some_and(|c| c.id == id)) {
            return Some(Zone::Spell(slot));
        }
        [Zone::Hand, Zone::Trash, Zone::Deck]
            .into_iter()
            .find(|&zone| self.pile(zone).is_some_and(|p| p.iter().any(|c| c.id == id)))
    }

    #[must_use]
    pub fn card(&self, id: InstanceId) -> Option<&CardInstance> {
        match self.find(id)? {
            zone @ (Zone::Monster(_) | Zone::Spell(_)) => self.slot(zone),
            zone => self.pile(zone)?.iter().find(|c| c.id == id),
        }
    }

    pub fn card_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        match self.find(id)? {
            zone @ (Zone::Monster(_) | Zone::Spell(_)) => self.slot_mut(zone)?.as_mut(),
            zone => {
                let pile = self.pile_mut(zone)?;
                let index = pile.iter().position(|c| c.id == id)?;
                pile.get_mut(index)
            }
        }
    }

    /// Remove `id` from whichever zone holds it.
    pub fn take(&mut self, id: InstanceId) -> Option<(Zone, CardInstance)> {
        let zone = self.find(id)?;
        let card = match zone {
            Zone::Monster(_) | Zone::Spell(_) => self.slot_mut(zone)?.take()?,
            _ => {
                let pile = self.pile_mut(zone)?;
                let index = pile.iter().position(|c| c.id == id)?;
                pile.remove(index)
            }
        };
        Some((zone, card))
    }

    /// Insert a card into a zone.
    ///
    /// Piles accept the card on top. A slot accepts it only when it exists
    /// and is empty; otherwise the card is handed back.
    pub fn put(&mut self, zone: Zone, card: CardInstance) -> Result<(), CardInstance> {
        if let Some(pile) = self.pile_mut(zone) {
            pile.push_back(card);
            return Ok(());
        }
        match self.slot_mut(zone) {
            Some(slot @ None) => {
                *slot = Some(card);
                Ok(())
            }
            _ => Err(card),
        }
    }

    /// Occupied monster slots with their index.
    pub fn monsters(&self) -> impl Iterator<Item = (usize, &CardInstance)> {
        self.monsters
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| c.as_ref().map(|c| (slot, c)))
    }

    /// Occupied spell slots with their index.
    pub fn spells(&self) -> impl Iterator<Item = (usize, &CardInstance)> {
        self.spells
            .iter()
            .enumerate()
            .filter_map(|(slot, c)| c.as_ref().map(|c| (slot, c)))
    }

    /// Every card on a monster or spell slot, monsters first.
    pub fn board(&self) -> impl Iterator<Item = (Zone, &CardInstance)> {
        self.monsters()
            .map(|(slot, c)| (Zone::Monster(slot), c))
            .chain(self.spells().map(|(slot, c)| (Zone::Spell(slot), c)))
    }

    /// Mutable access to every card on a slot.
    pub fn board_mut(&mut self) -> impl Iterator<Item = &mut CardInstance> {
        self.monsters
            .iter_mut()
            .chain(self.spells.iter_mut())
            .filter_map(Option::as_mut)
    }

    #[must_use]
    pub fn monster_count(&self) -> usize {
        self.monsters.iter().filter(|c| c.is_some()).count()
    }

    /// Empty monster slots in ascending order.
    #[must_use]
    pub fn empty_monster_slots(&self) -> SmallVec<[usize; 4]> {
        self.monsters
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(slot, _)| slot)
            .collect()
    }

    #[must_use]
    pub fn first_empty_monster_slot(&self) -> Option<usize> {
        self.monsters.iter().position(Option::is_none)
    }

    #[must_use]
    pub fn first_empty_spell_slot(&self) -> Option<usize> {
        self.spells.iter().position(Option::is_none)
    }
}
