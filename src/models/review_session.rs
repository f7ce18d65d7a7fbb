//! Review session management.
//! Walks a fixed snapshot of cards through flip / answer / advance and records
//! each answer through the SM-2 scheduler and the persistence collaborator.

use super::due::{select_due_cards, select_random_set};
use super::sm2::{ScheduleUpdate, compute_next_review};
use super::{Card, ReviewOutcome, ScheduleState};
use crate::config::EngineConfig;
use crate::database::{ReviewStore, StoreError};
use crate::error::{Result, ReviewError};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::Rng;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Presenting { index: usize, flipped: bool },
    /// An answer was submitted and its writes have not all succeeded yet.
    Processing { index: usize },
    Complete,
}

/// What a call did to the session.
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
    Flipped,
    Moved { index: usize },
    /// Answer recorded; the session now presents `next`.
    Recorded { next: usize },
    /// Answer recorded on the last card; the session is finished.
    Completed,
    /// Answer accepted and waiting for [`ReviewSession::finish_submission`].
    Pending,
    /// Not permitted in the current state. Nothing changed.
    Ignored,
}

/// Writes owed to the store for one submitted answer.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingReview {
    pub index: usize,
    pub card_id: String,
    pub update: ScheduleUpdate,
    pub outcome: ReviewOutcome,
    schedule_saved: bool,
}

impl PendingReview {
    pub fn schedule_saved(&self) -> bool {
        self.schedule_saved
    }

    /// Saves the card schedule, then appends the outcome. A schedule that was
    /// already saved by an earlier attempt is not written again.
    pub fn persist<S: ReviewStore + ?Sized>(&mut self, store: &S) -> std::result::Result<(), StoreError> {
        if !self.schedule_saved {
            store.save_card_schedule(&self.card_id, &ScheduleState::from(&self.update))?;
            self.schedule_saved = true;
        }
        store.append_outcome(&self.outcome)
    }
}

/// What the presentation layer needs to draw the current card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardView<'a> {
    pub card: &'a Card,
    pub flipped: bool,
    /// 1-based
    pub position: usize,
    pub total: usize,
    pub processing: bool,
}

/// One pass over a fixed list of cards. Owned by a single caller.
pub struct ReviewSession {
    cards: Vec<Card>,
    state: SessionState,
    reviewed: HashSet<String>,
    pending: Option<PendingReview>,
    last_error: Option<StoreError>,
}

impl ReviewSession {
    /// Starts a session over `cards`. An empty list starts complete.
    pub fn new(cards: Vec<Card>) -> Self {
        let state = if cards.is_empty() {
            SessionState::Complete
        } else {
            SessionState::Presenting {
                index: 0,
                flipped: false,
            }
        };
        tracing::debug!(total = cards.len(), "review session started");

        Self {
            cards,
            state,
            reviewed: HashSet::new(),
            pending: None,
            last_error: None,
        }
    }

    /// Session over the cards due on `today`.
    pub fn due<Tz: TimeZone>(cards: &[Card], today: NaiveDate, zone: &Tz) -> Self {
        Self::new(select_due_cards(cards, today, zone))
    }

    /// Extra-practice session over a random subset of `cards`.
    pub fn random<R: Rng + ?Sized>(cards: &[Card], config: &EngineConfig, rng: &mut R) -> Self {
        Self::new(select_random_set(cards, config.random_set_size, rng))
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn total_count(&self) -> usize {
        self.cards.len()
    }

    pub fn reviewed_count(&self) -> usize {
        self.reviewed.len()
    }

    pub fn is_reviewed(&self, card_id: &str) -> bool {
        self.reviewed.contains(card_id)
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    pub fn is_processing(&self) -> bool {
        matches!(self.state, SessionState::Processing { .. })
    }

    pub fn pending(&self) -> Option<&PendingReview> {
        self.pending.as_ref()
    }

    /// Failure of the most recent persistence attempt, cleared once it succeeds.
    pub fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }

    pub fn current(&self) -> Option<CardView<'_>> {
        let (index, flipped, processing) = match self.state {
            SessionState::Presenting { index, flipped } => (index, flipped, false),
            SessionState::Processing { index } => (index, true, true),
            SessionState::Complete => return None,
        };
        self.cards.get(index).map(|card| CardView {
            card,
            flipped,
            position: index + 1,
            total: self.cards.len(),
            processing,
        })
    }

    pub fn progress_label(&self) -> String {
        match self.current() {
            Some(view) => format!("Card {} of {}", view.position, view.total),
            None => format!("Finished {} of {} cards", self.reviewed_count(), self.total_count()),
        }
    }

    pub fn flip(&mut self) -> Transition {
        match self.state {
            SessionState::Presenting {
                index,
                flipped: false,
            } => {
                self.state = SessionState::Presenting {
                    index,
                    flipped: true,
                };
                Transition::Flipped
            }
            _ => Transition::Ignored,
        }
    }

    pub fn next(&mut self) -> Transition {
        match self.state {
            SessionState::Presenting { index, .. } if index + 1 < self.cards.len() => {
                self.move_to(index + 1)
            }
            _ => Transition::Ignored,
        }
    }

    pub fn previous(&mut self) -> Transition {
        match self.state {
            SessionState::Presenting { index, .. } if index > 0 => self.move_to(index - 1),
            _ => Transition::Ignored,
        }
    }

    fn move_to(&mut self, index: usize) -> Transition {
        self.state = SessionState::Presenting {
            index,
            flipped: false,
        };
        Transition::Moved { index }
    }

    /// Records an answer for the current card.
    ///
    /// On an unflipped card the first call only flips it and records nothing;
    /// call again to record. While a previous answer is processing the call is
    /// ignored. If the store fails the session stays in `Processing` and the
    /// error is returned; use [`ReviewSession::retry`] to try the writes again.
    pub fn submit_outcome<S: ReviewStore + ?Sized>(
        &mut self,
        known: bool,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        match self.begin_submission(known, now) {
            Transition::Pending => self.persist_pending(store),
            other => Ok(other),
        }
    }

    /// Flips the current card if needed and records the answer in one call.
    pub fn answer_and_flip<S: ReviewStore + ?Sized>(
        &mut self,
        known: bool,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<Transition> {
        self.flip();
        self.submit_outcome(known, store, now)
    }

    /// First half of a submission, for hosts that write to storage themselves.
    ///
    /// Returns `Pending` after computing the new schedule; the host writes
    /// [`ReviewSession::pending`] and reports back with `finish_submission`.
    pub fn begin_submission(&mut self, known: bool, now: DateTime<Utc>) -> Transition {
        let index = match self.state {
            SessionState::Presenting {
                flipped: false, ..
            } => return self.flip(),
            SessionState::Presenting {
                index,
                flipped: true,
            } => index,
            SessionState::Processing { index } => {
                tracing::debug!(index, "submission already in flight, ignoring");
                return Transition::Ignored;
            }
            SessionState::Complete => return Transition::Ignored,
        };

        let Some(card) = self.cards.get(index) else {
            return Transition::Ignored;
        };

        let s = &card.schedule;
        let update = compute_next_review(known, s.repetitions, s.easiness, s.interval, now);
        self.pending = Some(PendingReview {
            index,
            card_id: card.id.clone(),
            outcome: ReviewOutcome::new(card.id.clone(), known, now),
            update,
            schedule_saved: false,
        });
        self.state = SessionState::Processing { index };
        tracing::debug!(index, card_id = %card.id, known, "answer submitted");

        Transition::Pending
    }

    /// Second half of a submission. An error keeps the session in `Processing`.
    pub fn finish_submission(&mut self, result: std::result::Result<(), StoreError>) -> Result<Transition> {
        let SessionState::Processing { index } = self.state else {
            return Ok(Transition::Ignored);
        };

        if let Err(err) = result {
            tracing::warn!(index, error = %err, "failed to persist review, session not advanced");
            self.last_error = Some(err.clone());
            return Err(ReviewError::Persistence(err));
        }

        let Some(pending) = self.pending.take() else {
            return Ok(Transition::Ignored);
        };
        if let Some(card) = self.cards.get_mut(index) {
            card.apply(&pending.update);
        }
        self.reviewed.insert(pending.card_id);
        self.last_error = None;

        if index + 1 >= self.cards.len() {
            self.state = SessionState::Complete;
            tracing::info!(
                reviewed = self.reviewed.len(),
                total = self.cards.len(),
                "review session complete"
            );
            Ok(Transition::Completed)
        } else {
            self.state = SessionState::Presenting {
                index: index + 1,
                flipped: false,
            };
            Ok(Transition::Recorded { next: index + 1 })
        }
    }

    /// Tries the pending writes again after a failure.
    ///
    /// `StoreError::CardNotFound` is not retryable: the card was removed from
    /// the store and every attempt fails the same way. Drop the session and
    /// start a new one from freshly loaded cards instead.
    pub fn retry<S: ReviewStore + ?Sized>(&mut self, store: &S) -> Result<Transition> {
        if !self.is_processing() {
            return Ok(Transition::Ignored);
        }
        self.persist_pending(store)
    }

    fn persist_pending<S: ReviewStore + ?Sized>(&mut self, store: &S) -> Result<Transition> {
        let result = match self.pending.as_mut() {
            Some(pending) => pending.persist(store),
            None => return Ok(Transition::Ignored),
        };
        self.finish_submission(result)
    }
}
