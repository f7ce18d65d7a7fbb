//! Persistence collaborator contract.
//!
//! The engine never owns storage. It reads plain records through [`ReviewStore`]
//! and hands back new scheduling values and outcome entries to be written.

pub mod memory;

pub use memory::MemoryStore;

use crate::models::{Card, ReviewOutcome, ScheduleState};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("card {0} not found")]
    CardNotFound(String),

    #[error("storage request timed out")]
    Timeout,

    #[error("storage backend error: {0}")]
    Backend(String),
}

pub trait ReviewStore {
    fn load_cards(&self, owner_id: &str) -> Result<Vec<Card>, StoreError>;

    /// Overwrites the scheduling fields of one card.
    fn save_card_schedule(&self, card_id: &str, schedule: &ScheduleState) -> Result<(), StoreError>;

    fn append_outcome(&self, outcome: &ReviewOutcome) -> Result<(), StoreError>;

    fn load_outcomes(&self, owner_id: &str) -> Result<Vec<ReviewOutcome>, StoreError>;
}
