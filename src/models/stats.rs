//! Review statistics: lifetime totals plus a per-day histogram of the last week.

use super::ReviewOutcome;
use chrono::{Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

pub const HISTORY_DAYS: usize = 7;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBucket {
    /// Serialized as `YYYY-MM-DD`
    pub date: NaiveDate,
    pub known: u64,
    pub unknown: u64,
}

impl DailyBucket {
    fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            known: 0,
            unknown: 0,
        }
    }

    pub fn total(&self) -> u64 {
        self.known + self.unknown
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewStats {
    pub known: u64,
    pub unknown: u64,
    /// Oldest day first, ending with today.
    pub daily: Vec<DailyBucket>,
}

impl ReviewStats {
    pub fn total(&self) -> u64 {
        self.known + self.unknown
    }

    /// Share of correct answers, rounded to a whole percent.
    pub fn known_percent(&self) -> u64 {
        percent(self.known, self.total())
    }

    pub fn unknown_percent(&self) -> u64 {
        percent(self.unknown, self.total())
    }

    pub fn has_recent_activity(&self) -> bool {
        self.daily.iter().any(|bucket| bucket.total() > 0)
    }
}

fn percent(part: u64, total: u64) -> u64 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u64
}

/// Reduces an outcome log to totals and a 7-day histogram ending on `today`.
///
/// A day is the `[00:00, 24:00)` window of `zone`. Totals cover the whole log,
/// buckets only the window; outcomes outside it are counted in totals alone.
pub fn aggregate<Tz: TimeZone>(outcomes: &[ReviewOutcome], today: NaiveDate, zone: &Tz) -> ReviewStats {
    let first_day = today
        .checked_sub_days(Days::new(HISTORY_DAYS as u64 - 1))
        .unwrap_or(NaiveDate::MIN);

    let mut daily: Vec<DailyBucket> = first_day
        .iter_days()
        .take(HISTORY_DAYS)
        .map(DailyBucket::empty)
        .collect();

    let mut known = 0;
    let mut unknown = 0;

    for outcome in outcomes {
        if outcome.known {
            known += 1;
        } else {
            unknown += 1;
        }

        let day = outcome.reviewed_at.with_timezone(zone).date_naive();
        if day < first_day || day > today {
            continue;
        }
        let offset = (day - first_day).num_days() as usize;
        if let Some(bucket) = daily.get_mut(offset) {
            if outcome.known {
                bucket.known += 1;
            } else {
                bucket.unknown += 1;
            }
        }
    }

    ReviewStats {
        known,
        unknown,
        daily,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn outcome(known: bool, at: DateTime<Utc>) -> ReviewOutcome {
        ReviewOutcome::new("card", known, at)
    }

    #[test]
    fn test_empty_log() {
        let stats = aggregate(&[], today(), &Utc);

        assert_eq!(stats.known, 0);
        assert_eq!(stats.unknown, 0);
        assert_eq!(stats.daily.len(), 7);
        assert_eq!(stats.daily[0].date, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert_eq!(stats.daily[6].date, today());
        assert!(stats.daily.iter().all(|b| b.known == 0 && b.unknown == 0));
        assert!(!stats.has_recent_activity());
        assert_eq!(stats.known_percent(), 0);
    }

    #[test]
    fn test_buckets_and_totals() {
        let outcomes = vec![
            outcome(true, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()),
            outcome(false, Utc.with_ymd_and_hms(2024, 3, 10, 23, 59, 59).unwrap()),
            outcome(true, Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()),
            outcome(true, Utc.with_ymd_and_hms(2024, 3, 7, 12, 0, 0).unwrap()),
            // outside the window, totals only
            outcome(false, Utc.with_ymd_and_hms(2024, 3, 3, 23, 59, 59).unwrap()),
            outcome(true, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()),
        ];

        let stats = aggregate(&outcomes, today(), &Utc);
        assert_eq!(stats.known, 4);
        assert_eq!(stats.unknown, 2);
        assert_eq!(stats.total(), 6);

        let counts: Vec<(u64, u64)> = stats.daily.iter().map(|b| (b.known, b.unknown)).collect();
        assert_eq!(
            counts,
            vec![(1, 0), (0, 0), (0, 0), (1, 0), (0, 0), (0, 0), (1, 1)]
        );
        assert!(stats.has_recent_activity());
    }

    #[test]
    fn test_day_boundary_follows_zone() {
        // 23:30 UTC on the 9th is 01:30 on the 10th in UTC+2
        let outcomes = vec![outcome(true, Utc.with_ymd_and_hms(2024, 3, 9, 23, 30, 0).unwrap())];
        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();

        let utc = aggregate(&outcomes, today(), &Utc);
        assert_eq!(utc.daily[5].known, 1);

        let shifted = aggregate(&outcomes, today(), &plus_two);
        assert_eq!(shifted.daily[6].known, 1);
        assert_eq!(shifted.daily[5].known, 0);
    }

    #[test]
    fn test_aggregate_is_repeatable() {
        let outcomes = vec![
            outcome(true, Utc.with_ymd_and_hms(2024, 3, 8, 10, 0, 0).unwrap()),
            outcome(false, Utc.with_ymd_and_hms(2024, 3, 9, 10, 0, 0).unwrap()),
        ];
        assert_eq!(aggregate(&outcomes, today(), &Utc), aggregate(&outcomes, today(), &Utc));
    }

    #[test]
    fn test_percentages() {
        let outcomes = vec![
            outcome(true, Utc.with_ymd_and_hms(2024, 3, 8, 10, 0, 0).unwrap()),
            outcome(true, Utc.with_ymd_and_hms(2024, 3, 8, 11, 0, 0).unwrap()),
            outcome(false, Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap()),
        ];
        let stats = aggregate(&outcomes, today(), &Utc);
        assert_eq!(stats.known_percent(), 67);
        assert_eq!(stats.unknown_percent(), 33);
    }

    #[test]
    fn test_bucket_dates_serialize_as_plain_dates() {
        let stats = aggregate(&[], today(), &Utc);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["daily"][6]["date"], "2024-03-10");
        assert_eq!(json["daily"][0]["date"], "2024-03-04");
    }
}
