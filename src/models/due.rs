//! Picks the cards a session should review.
//!
//! Day boundaries are taken in a caller-chosen time zone so the result does not
//! depend on where the process happens to run.

use super::Card;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::Rng;
use rand::seq::SliceRandom;

/// A card is due when it was never reviewed, or when its scheduled calendar
/// date (time of day ignored) is today or earlier.
pub fn is_due<Tz: TimeZone>(
    next_review_date: Option<&DateTime<Utc>>,
    today: NaiveDate,
    zone: &Tz,
) -> bool {
    match next_review_date {
        None => true,
        Some(date) => date.with_timezone(zone).date_naive() <= today,
    }
}

pub fn is_card_due<Tz: TimeZone>(card: &Card, today: NaiveDate, zone: &Tz) -> bool {
    is_due(card.schedule.next_review_date.as_ref(), today, zone)
}

/// Due cards in their input order.
pub fn select_due_cards<Tz: TimeZone>(cards: &[Card], today: NaiveDate, zone: &Tz) -> Vec<Card> {
    cards
        .iter()
        .filter(|card| is_card_due(card, today, zone))
        .cloned()
        .collect()
}

pub fn count_due<Tz: TimeZone>(cards: &[Card], today: NaiveDate, zone: &Tz) -> usize {
    cards.iter().filter(|card| is_card_due(card, today, zone)).count()
}

/// Shuffles the whole collection and keeps at most `max_count` cards.
/// Used for extra practice once nothing is due.
pub fn select_random_set<R: Rng + ?Sized>(cards: &[Card], max_count: usize, rng: &mut R) -> Vec<Card> {
    let mut shuffled = cards.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(max_count.min(cards.len()));
    shuffled
}
