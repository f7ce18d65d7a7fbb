//! Card is a pair <front, back> plus the SM-2 state that decides when it is shown again.
use super::sm2::{DEFAULT_EASINESS, MIN_EASINESS, ScheduleUpdate};
use crate::error::{Result, ReviewError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scheduling fields of a card, as stored by the persistence collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    pub repetitions: u32,
    pub easiness: f64,
    pub interval: u32,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    /// `None` means the card was never reviewed and is due immediately.
    pub next_review_date: Option<DateTime<Utc>>,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            repetitions: 0,
            easiness: DEFAULT_EASINESS,
            interval: 0,
            last_reviewed_at: None,
            next_review_date: None,
        }
    }
}

impl ScheduleState {
    /// Builds a schedule from untrusted storage values, clamping anything out of range.
    pub fn from_raw(
        repetitions: i64,
        easiness: f64,
        interval: i64,
        last_reviewed_at: Option<DateTime<Utc>>,
        next_review_date: Option<DateTime<Utc>>,
    ) -> Self {
        let clamp_count = |field: &str, value: i64| -> u32 {
            match u32::try_from(value) {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!("clamping out-of-range {field} value {value}");
                    if value < 0 { 0 } else { u32::MAX }
                }
            }
        };

        let easiness = if !easiness.is_finite() {
            tracing::warn!("replacing non-finite easiness with default");
            DEFAULT_EASINESS
        } else if easiness < MIN_EASINESS {
            tracing::warn!("clamping easiness {easiness} to {MIN_EASINESS}");
            MIN_EASINESS
        } else {
            easiness
        };

        Self {
            repetitions: clamp_count("repetitions", repetitions),
            easiness,
            interval: clamp_count("interval", interval),
            last_reviewed_at,
            next_review_date,
        }
    }

    pub fn is_new(&self) -> bool {
        self.next_review_date.is_none()
    }
}

impl From<&ScheduleUpdate> for ScheduleState {
    fn from(update: &ScheduleUpdate) -> Self {
        Self {
            repetitions: update.repetitions,
            easiness: update.easiness,
            interval: update.interval,
            last_reviewed_at: Some(update.reviewed_at),
            next_review_date: Some(update.next_review_date),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(flatten)]
    pub schedule: ScheduleState,
}

impl Card {
    /// Creates a never-reviewed card with a fresh id.
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Result<Self> {
        let front = front.into();
        let back = back.into();
        validate_content(&front, &back)?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            front,
            back,
            schedule: ScheduleState::default(),
        })
    }

    /// Replaces the content. Scheduling state is left untouched.
    pub fn edit(&mut self, front: impl Into<String>, back: impl Into<String>) -> Result<()> {
        let front = front.into();
        let back = back.into();
        validate_content(&front, &back)?;
        self.front = front;
        self.back = back;
        Ok(())
    }

    pub fn apply(&mut self, update: &ScheduleUpdate) {
        self.schedule = ScheduleState::from(update);
    }
}

fn validate_content(front: &str, back: &str) -> Result<()> {
    if front.trim().is_empty() {
        return Err(ReviewError::Validation("card front is required".to_string()));
    }
    if back.trim().is_empty() {
        return Err(ReviewError::Validation("card back is required".to_string()));
    }
    Ok(())
}
