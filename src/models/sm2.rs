//! SM-2 (SuperMemo 2) spaced repetition algorithm implementation.
//!
//! The SM-2 algorithm calculates review intervals based on recall quality:
//! - Each card has an easiness factor (EF) that adjusts based on performance
//! - Quality grades 0-2: a lapse; repetitions reset and the card comes back tomorrow
//! - Quality grades 3-5: interval grows progressively (1 day → 6 days → EF multiplier)
//! - EF is adjusted after each review and has a minimum value of 1.3
//!
//! Callers currently drive only two grades, "Know" (5) and "Don't Know" (0).

use crate::error::{Result, ReviewError};
use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_EASINESS: f64 = 2.5;
pub const MIN_EASINESS: f64 = 1.3;

/// Recall quality on the classical 0-5 scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quality(u8);

impl Quality {
    /// Complete blackout, failure to recall.
    pub const DONT_KNOW: Quality = Quality(0);
    /// Perfect response.
    pub const KNOW: Quality = Quality(5);

    pub fn new(value: u8) -> Result<Self> {
        if value > 5 {
            return Err(ReviewError::Validation(format!(
                "quality must be between 0 and 5, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn from_known(known: bool) -> Self {
        if known { Self::KNOW } else { Self::DONT_KNOW }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn is_lapse(self) -> bool {
        self.0 < 3
    }
}

/// New scheduling values produced by one review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub repetitions: u32,
    pub easiness: f64,
    pub interval: u32,
    pub reviewed_at: DateTime<Utc>,
    pub next_review_date: DateTime<Utc>,
}

/// Binary form used by the "Know" / "Don't Know" buttons.
pub fn compute_next_review(
    known: bool,
    repetitions: u32,
    easiness: f64,
    interval: u32,
    now: DateTime<Utc>,
) -> ScheduleUpdate {
    calculate_next_review(Quality::from_known(known), repetitions, easiness, interval, now)
}

/// Calculates new review data according to the SM-2 algorithm.
///
/// The interval itself is never capped. When `now + interval` days lies past
/// the last representable date, `next_review_date` saturates to
/// `DateTime::<Utc>::MAX_UTC`.
pub fn calculate_next_review(
    quality: Quality,
    repetitions: u32,
    easiness: f64,
    interval: u32,
    now: DateTime<Utc>,
) -> ScheduleUpdate {
    let q = quality.value() as f64;
    let new_easiness = (easiness + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASINESS);

    let (new_repetitions, new_interval) = if quality.is_lapse() {
        (0, 1)
    } else {
        let new_reps = repetitions.saturating_add(1);
        let new_int = match new_reps {
            1 => 1,
            2 => 6,
            // Previous interval times the new EF
            _ => (interval as f64 * new_easiness).round().min(u32::MAX as f64) as u32,
        };
        (new_reps, new_int)
    };

    let next_review_date = now
        .checked_add_days(Days::new(new_interval as u64))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    tracing::debug!(
        quality = quality.value(),
        repetitions = new_repetitions,
        easiness = new_easiness,
        interval = new_interval,
        "computed next review"
    );

    ScheduleUpdate {
        repetitions: new_repetitions,
        easiness: new_easiness,
        interval: new_interval,
        reviewed_at: now,
        next_review_date,
    }
}
