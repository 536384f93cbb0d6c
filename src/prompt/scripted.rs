//! Queue-driven prompt and recording presenter.
//!
//! `ScriptedPrompt` answers from a queue of pre-recorded [`Answer`]s, which
//! is how replays and tests drive the prompt-driven side. An exhausted
//! queue or an answer of the wrong kind cancels the request.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};
use tracing::warn;

use super::{CardChoice, HandRequest, Presenter, Prompt, SlotRef, SlotRequest};
use crate::core::{DuelState, Side};
use crate::triggers::DuelEvent;

/// One recorded answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    Slot(Option<SlotRef>),
    Hand(Option<Vec<usize>>),
    Card(Option<usize>),
    Confirm(bool),
}

/// Prompt answering from a queue.
#[derive(Clone, Debug, Default)]
pub struct ScriptedPrompt {
    answers: VecDeque<Answer>,
    /// Slot requests received, for inspection.
    pub slot_requests: Vec<SlotRequest>,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            slot_requests: Vec::new(),
        }
    }

    /// Answers not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, wanted: &'static str) -> Option<Answer> {
        let answer = self.answers.pop_front();
        if answer.is_none() {
            warn!(wanted, "scripted prompt ran out of answers");
        }
        answer
    }
}

impl Prompt for ScriptedPrompt {
    fn select_slot(&mut self, request: SlotRequest) -> LocalBoxFuture<'_, Option<SlotRef>> {
        self.slot_requests.push(request);
        let answer = match self.next("slot") {
            Some(Answer::Slot(slot)) => slot,
            _ => None,
        };
        future::ready(answer).boxed_local()
    }

    fn select_hand_cards(&mut self, _request: HandRequest) -> LocalBoxFuture<'_, Option<Vec<usize>>> {
        let answer = match self.next("hand") {
            Some(Answer::Hand(indices)) => indices,
            _ => None,
        };
        future::ready(answer).boxed_local()
    }

    fn select_card(&mut self, _request: CardChoice) -> LocalBoxFuture<'_, Option<usize>> {
        let answer = match self.next("card") {
            Some(Answer::Card(index)) => index,
            _ => None,
        };
        future::ready(answer).boxed_local()
    }

    fn confirm(&mut self, _side: Side, _message: String) -> LocalBoxFuture<'_, bool> {
        let answer = matches!(self.next("confirm"), Some(Answer::Confirm(true)));
        future::ready(answer).boxed_local()
    }
}

/// Shared handle to the events a [`RecordingPresenter`] saw.
pub type EventLog = Rc<RefCell<Vec<DuelEvent>>>;

/// Presenter that appends every event to a shared log.
#[derive(Clone, Debug, Default)]
pub struct RecordingPresenter {
    log: EventLog,
}

impl RecordingPresenter {
    /// A presenter and a handle to read its log after it is boxed away.
    #[must_use]
    pub fn new() -> (Self, EventLog) {
        let presenter = Self::default();
        let log = Rc::clone(&presenter.log);
        (presenter, log)
    }
}

impl Presenter for RecordingPresenter {
    fn on_event(&mut self, event: &DuelEvent, _state: &DuelState) {
        self.log.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{HandReason, SlotReason, SlotZone};
    use futures::executor::block_on;

    fn slot_request() -> SlotRequest {
        SlotRequest {
            side: Side::Player,
            zone: SlotZone::Monster,
            eligible: vec![SlotRef::new(Side::Opponent, 1)],
            reason: SlotReason::AttackTarget,
        }
    }

    #[test]
    fn test_answers_in_order() {
        let mut prompt = ScriptedPrompt::new([
            Answer::Slot(Some(SlotRef::new(Side::Opponent, 1))),
            Answer::Confirm(true),
        ]);

        assert_eq!(
            block_on(prompt.select_slot(slot_request())),
            Some(SlotRef::new(Side::Opponent, 1))
        );
        assert!(block_on(prompt.confirm(Side::Player, "?".into())));
        assert_eq!(prompt.remaining(), 0);
        assert_eq!(prompt.slot_requests.len(), 1);
    }

    #[test]
    fn test_mismatched_or_missing_answer_cancels() {
        let mut prompt = ScriptedPrompt::new([Answer::Confirm(true)]);
        let request = HandRequest {
            side: Side::Player,
            count: 1,
            reason: HandReason::EndPhaseDiscard,
        };
        assert_eq!(block_on(prompt.select_hand_cards(request)), None);
        assert_eq!(block_on(prompt.select_slot(slot_request())), None);
    }

    #[test]
    fn test_recording_presenter_shares_log() {
        let (mut presenter, log) = RecordingPresenter::new();
        let state = DuelState::new(crate::core::DuelConfig::default(), 0);
        presenter.on_event(&DuelEvent::DuelStarted { first: Side::Opponent }, &state);

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0], DuelEvent::DuelStarted { first: Side::Opponent });
    }
}
