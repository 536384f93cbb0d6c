//! Human input and presentation boundaries.
//!
//! The engine never blocks on a user interface directly. Whenever the
//! prompt-driven side has to choose something it awaits a [`Prompt`]
//! future; every board mutation is reported to a [`Presenter`]. Both are
//! object-safe and return `!Send` boxed futures, so a front-end can answer
//! from an event loop, a test can answer from a queue, and nothing needs a
//! runtime.
//!
//! A `None` answer cancels the selection in progress. The engine then
//! abandons the action without committing any part of it.

mod scripted;

pub use scripted::{Answer, EventLog, RecordingPresenter, ScriptedPrompt};

use futures::future::{self, FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::cards::{CardCode, InstanceId};
use crate::core::{DuelState, Side};
use crate::triggers::DuelEvent;

/// Row of slots a selection refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotZone {
    Monster,
    Spell,
}

/// One slot on one side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub side: Side,
    pub slot: usize,
}

impl SlotRef {
    #[must_use]
    pub const fn new(side: Side, slot: usize) -> Self {
        Self { side, slot }
    }
}

/// Why a slot is being requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotReason {
    EffectTarget,
    SummonCost,
    SummonSlot,
    AttackTarget,
}

/// Ask the deciding side to pick one of `eligible`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotRequest {
    /// Side making the choice.
    pub side: Side,
    pub zone: SlotZone,
    pub eligible: Vec<SlotRef>,
    pub reason: SlotReason,
}

/// Why hand cards are being requested.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandReason {
    EndPhaseDiscard,
    EffectDiscard,
}

/// Ask for exactly `count` distinct hand indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandRequest {
    pub side: Side,
    pub count: usize,
    pub reason: HandReason,
}

/// A card offered in a [`CardChoice`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardSummary {
    pub id: InstanceId,
    pub code: CardCode,
    pub name: String,
    pub level: u8,
    pub power: i64,
}

/// Ask for one card out of a pile-derived list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardChoice {
    pub side: Side,
    pub candidates: Vec<CardSummary>,
}

/// Input from the prompt-driven side.
pub trait Prompt {
    /// Pick one slot from `request.eligible`, or `None` to cancel.
    fn select_slot(&mut self, request: SlotRequest) -> LocalBoxFuture<'_, Option<SlotRef>>;

    /// Pick `request.count` hand indices, or `None` to cancel.
    fn select_hand_cards(&mut self, request: HandRequest) -> LocalBoxFuture<'_, Option<Vec<usize>>>;

    /// Pick an index into `request.candidates`, or `None` to cancel.
    fn select_card(&mut self, request: CardChoice) -> LocalBoxFuture<'_, Option<usize>>;

    /// Yes/no question, for optional effects and pile choices.
    fn confirm(&mut self, side: Side, message: String) -> LocalBoxFuture<'_, bool>;
}

/// Output sink for the board.
pub trait Presenter {
    /// Called after every board mutation.
    fn on_event(&mut self, event: &DuelEvent, state: &DuelState);

    /// Pacing delay requested by the automated side.
    fn pause(&mut self, _millis: u64) -> LocalBoxFuture<'_, ()> {
        future::ready(()).boxed_local()
    }
}

/// Presenter that ignores everything and never waits.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_event(&mut self, _event: &DuelEvent, _state: &DuelState) {}
}

/// Prompt that cancels every selection and declines every question.
///
/// Suitable when no side is prompt-driven.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclinePrompt;

impl Prompt for DeclinePrompt {
    fn select_slot(&mut self, _request: SlotRequest) -> LocalBoxFuture<'_, Option<SlotRef>> {
        future::ready(None).boxed_local()
    }

    fn select_hand_cards(&mut self, _request: HandRequest) -> LocalBoxFuture<'_, Option<Vec<usize>>> {
        future::ready(None).boxed_local()
    }

    fn select_card(&mut self, _request: CardChoice) -> LocalBoxFuture<'_, Option<usize>> {
        future::ready(None).boxed_local()
    }

    fn confirm(&mut self, _side: Side, _message: String) -> LocalBoxFuture<'_, bool> {
        future::ready(false).boxed_local()
    }
}
