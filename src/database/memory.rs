//! In-memory card and outcome store.
//!
//! Holds the authoritative copy of records for hosts that keep everything in
//! process, and merges schedule updates back into it. Failures can be injected
//! to exercise the session's retry path.

use super::{ReviewStore, StoreError};
use crate::models::{Card, ReviewOutcome, ScheduleState};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Inner {
    /// (owner id, card), kept in insertion order
    cards: Vec<(String, Card)>,
    outcomes: Vec<(String, ReviewOutcome)>,
    failing_saves: u32,
    failing_appends: u32,
    save_calls: usize,
    append_calls: usize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }

    pub fn insert_card(&self, owner_id: &str, card: Card) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.cards.push((owner_id.to_string(), card));
        Ok(())
    }

    /// Removes a card. Its logged outcomes are kept.
    pub fn remove_card(&self, card_id: &str) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let before = inner.cards.len();
        inner.cards.retain(|(_, card)| card.id != card_id);
        Ok(inner.cards.len() != before)
    }

    pub fn card(&self, card_id: &str) -> Result<Option<Card>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .cards
            .iter()
            .find(|(_, card)| card.id == card_id)
            .map(|(_, card)| card.clone()))
    }

    /// Makes the next `count` calls to `save_card_schedule` fail with a timeout.
    pub fn fail_next_saves(&self, count: u32) -> Result<(), StoreError> {
        self.lock()?.failing_saves = count;
        Ok(())
    }

    /// Makes the next `count` calls to `append_outcome` fail with a timeout.
    pub fn fail_next_appends(&self, count: u32) -> Result<(), StoreError> {
        self.lock()?.failing_appends = count;
        Ok(())
    }

    pub fn save_calls(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.save_calls)
    }

    pub fn append_calls(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.append_calls)
    }
}

impl ReviewStore for MemoryStore {
    fn load_cards(&self, owner_id: &str) -> Result<Vec<Card>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .cards
            .iter()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, card)| card.clone())
            .collect())
    }

    fn save_card_schedule(&self, card_id: &str, schedule: &ScheduleState) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.save_calls += 1;

        if inner.failing_saves > 0 {
            inner.failing_saves -= 1;
            return Err(StoreError::Timeout);
        }

        let (_, card) = inner
            .cards
            .iter_mut()
            .find(|(_, card)| card.id == card_id)
            .ok_or_else(|| StoreError::CardNotFound(card_id.to_string()))?;
        card.schedule = schedule.clone();
        Ok(())
    }

    fn append_outcome(&self, outcome: &ReviewOutcome) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.append_calls += 1;

        if inner.failing_appends > 0 {
            inner.failing_appends -= 1;
            return Err(StoreError::Timeout);
        }

        let owner = inner
            .cards
            .iter()
            .find(|(_, card)| card.id == outcome.card_id)
            .map(|(owner, _)| owner.clone())
            .ok_or_else(|| StoreError::CardNotFound(outcome.card_id.clone()))?;
        inner.outcomes.push((owner, outcome.clone()));
        Ok(())
    }

    fn load_outcomes(&self, owner_id: &str) -> Result<Vec<ReviewOutcome>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .outcomes
            .iter()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, outcome)| outcome.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn store_with_cards() -> (MemoryStore, Card, Card) {
        let store = MemoryStore::new();
        let mine = Card::new("hello", "cześć").unwrap();
        let theirs = Card::new("thank you", "dziękuję").unwrap();
        store.insert_card("alice", mine.clone()).unwrap();
        store.insert_card("bob", theirs.clone()).unwrap();
        (store, mine, theirs)
    }

    #[test]
    fn test_load_cards_by_owner() {
        let (store, mine, _) = store_with_cards();

        let cards = store.load_cards("alice").unwrap();
        assert_eq!(cards, vec![mine]);
        assert!(store.load_cards("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_save_schedule() {
        let (store, mine, _) = store_with_cards();
        let schedule = ScheduleState {
            repetitions: 2,
            easiness: 2.7,
            interval: 6,
            last_reviewed_at: Some(Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()),
            next_review_date: Some(Utc.with_ymd_and_hms(2024, 3, 16, 9, 0, 0).unwrap()),
        };

        store.save_card_schedule(&mine.id, &schedule).unwrap();
        let saved = store.card(&mine.id).unwrap().unwrap();
        assert_eq!(saved.schedule, schedule);
        assert_eq!(saved.front, "hello");
    }

    #[test]
    fn test_save_unknown_card() {
        let store = MemoryStore::new();
        let result = store.save_card_schedule("missing", &ScheduleState::default());
        assert_eq!(result, Err(StoreError::CardNotFound("missing".to_string())));
    }

    #[test]
    fn test_outcomes_follow_card_owner() {
        let (store, mine, theirs) = store_with_cards();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();

        store.append_outcome(&ReviewOutcome::new(&mine.id, true, at)).unwrap();
        store.append_outcome(&ReviewOutcome::new(&theirs.id, false, at)).unwrap();

        let outcomes = store.load_outcomes("alice").unwrap();
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].known);
    }

    #[test]
    fn test_injected_failures() {
        let (store, mine, _) = store_with_cards();
        store.fail_next_saves(1).unwrap();

        assert_eq!(
            store.save_card_schedule(&mine.id, &ScheduleState::default()),
            Err(StoreError::Timeout)
        );
        assert!(store.save_card_schedule(&mine.id, &ScheduleState::default()).is_ok());
        assert_eq!(store.save_calls().unwrap(), 2);
    }

    #[test]
    fn test_remove_card_keeps_log() {
        let (store, mine, _) = store_with_cards();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        store.append_outcome(&ReviewOutcome::new(&mine.id, true, at)).unwrap();

        assert!(store.remove_card(&mine.id).unwrap());
        assert!(!store.remove_card(&mine.id).unwrap());
        assert!(store.load_cards("alice").unwrap().is_empty());
        assert_eq!(store.load_outcomes("alice").unwrap().len(), 1);
    }
}
