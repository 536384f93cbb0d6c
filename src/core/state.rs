//! Duel state.
//!
//! `DuelState` is the single source of truth for a duel: both sides'
//! boards, the phase machine position, the RNG and the outcome. It is plain
//! data. Rules that need prompts or presentation live on `Duel`, which owns
//! a `DuelState`.
//!
//! ## Snapshots
//!
//! The whole state, RNG position included, round-trips through `bincode`:
//!
//! ```
//! use card_duel::core::{DuelConfig, DuelState};
//!
//! let state = DuelState::new(DuelConfig::default(), 42);
//! let bytes = state.snapshot().unwrap();
//! let restored = DuelState::restore(&bytes).unwrap();
//! assert_eq!(restored.turn, state.turn);
//! ```

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::error::DuelResult;
use super::{DuelConfig, GameRng, Side, SideMap};
use crate::cards::{CardDefinition, CardInstance, InstanceId};
use crate::rules::Phase;
use crate::zones::{Location, SideState, Zone};

/// How a finished duel ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelOutcome {
    pub winner: Side,
    /// Turn counter value when the last point of life was lost.
    pub turn: u32,
}

/// Complete duel state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuelState {
    pub config: DuelConfig,
    pub sides: SideMap<SideState>,
    pub phase: Phase,

    /// Global turn counter, starting at 1.
    pub turn: u32,

    /// Side whose turn it is.
    pub active: Side,

    /// Side that took the first turn.
    pub first: Side,

    /// Number of times control has passed.
    pub turns_passed: u32,

    pub outcome: Option<DuelOutcome>,
    pub rng: GameRng,
    next_instance: u32,
}

impl DuelState {
    /// Empty boards at full life, DRAW phase of turn 1, player first.
    #[must_use]
    pub fn new(config: DuelConfig, seed: u64) -> Self {
        let sides = SideMap::new(|_| {
            SideState::new(config.starting_life, config.monster_slots, config.spell_slots)
        });
        Self {
            config,
            sides,
            phase: Phase::Draw,
            turn: 1,
            active: Side::Player,
            first: Side::Player,
            turns_passed: 0,
            outcome: None,
            rng: GameRng::new(seed),
            next_instance: 0,
        }
    }

    #[must_use]
    pub fn side(&self, side: Side) -> &SideState {
        &self.sides[side]
    }

    pub fn side_mut(&mut self, side: Side) -> &mut SideState {
        &mut self.sides[side]
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.outcome.map(|o| o.winner)
    }

    /// The very first turn of the duel, before control ever passed.
    #[must_use]
    pub fn is_first_turn(&self) -> bool {
        self.turns_passed == 0
    }

    /// Whether it is currently `side`'s turn.
    #[must_use]
    pub fn is_turn_of(&self, side: Side) -> bool {
        self.active == side
    }

    #[must_use]
    pub fn locate(&self, id: InstanceId) -> Option<Location> {
        self.sides
            .iter()
            .find_map(|(side, board)| board.find(id).map(|zone| Location::new(side, zone)))
    }

    #[must_use]
    pub fn card(&self, id: InstanceId) -> Option<&CardInstance> {
        let location = self.locate(id)?;
        self.sides[location.side].card(id)
    }

    pub fn card_mut(&mut self, id: InstanceId) -> Option<&mut CardInstance> {
        let location = self.locate(id)?;
        self.sides[location.side].card_mut(id)
    }

    /// Remove a card from wherever it is.
    pub fn take(&mut self, id: InstanceId) -> Option<(Location, CardInstance)> {
        let location = self.locate(id)?;
        let (zone, card) = self.sides[location.side].take(id)?;
        Some((Location::new(location.side, zone), card))
    }

    /// Insert a card; occupied or missing slots hand it back.
    pub fn put(&mut self, location: Location, card: CardInstance) -> Result<(), CardInstance> {
        self.sides[location.side].put(location.zone, card)
    }

    /// Allocate a fresh instance id.
    pub fn next_instance_id(&mut self) -> InstanceId {
        let id = InstanceId::new(self.next_instance);
        self.next_instance += 1;
        id
    }

    /// Create a card straight into a zone. Intended for setting up boards
    /// and puzzles; an occupied slot sends the card to the trash instead.
    pub fn spawn(&mut self, side: Side, zone: Zone, definition: CardDefinition) -> InstanceId {
        let id = self.next_instance_id();
        let card = CardInstance::new(id, side, definition);
        if let Err(card) = self.sides[side].put(zone, card) {
            self.sides[side].trash.push_back(card);
        }
        id
    }

    /// Board monsters of `side` in slot order.
    #[must_use]
    pub fn monster_ids(&self, side: Side) -> SmallVec<[InstanceId; 4]> {
        self.sides[side].monsters().map(|(_, c)| c.id).collect()
    }

    /// Every card on a slot, `first` side first, monsters before spells.
    #[must_use]
    pub fn board_ids(&self, first: Side) -> SmallVec<[(Side, InstanceId); 12]> {
        first
            .starting_with()
            .into_iter()
            .flat_map(|side| self.sides[side].board().map(move |(_, c)| (side, c.id)))
            .collect()
    }

    /// Shuffle a side's draw pile.
    pub fn shuffle_deck(&mut self, side: Side) {
        let mut cards: Vec<_> = self.sides[side].deck.iter().cloned().collect();
        self.rng.shuffle(&mut cards);
        self.sides[side].deck = Vector::from(cards);
    }

    /// Encode the full state.
    pub fn snapshot(&self) -> DuelResult<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Decode a state produced by [`DuelState::snapshot`].
    pub fn restore(bytes: &[u8]) -> DuelResult<Self> {
        Ok(bincode::deserialize(bytes)?)
    }
}
