//! Time types for the agenda pipeline.
//!
//! This module provides [`VisibleRange`], the half-open window entries must
//! overlap to be shown, together with the zone-aware day helpers every
//! pipeline stage uses to bucket instants into local calendar days.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Returns the instant the given local date starts in `tz`.
///
/// Midnight can be skipped by a DST transition (e.g. `America/Sao_Paulo`
/// before 2019); the day then starts at the first valid local minute.
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    if let Some(dt) = tz.from_local_datetime(&midnight).earliest() {
        return dt.with_timezone(&Utc);
    }
    (1..=180)
        .find_map(|minutes| {
            tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Returns the local calendar date of an instant in `tz`.
pub fn local_date<Tz: TimeZone>(instant: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// Returns the date `days` after `date`, saturating at the calendar bounds.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Returns the most recent `first_day` on or before `date`.
pub fn start_of_week(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let back = (7 + date.weekday().num_days_from_monday() as i64
        - first_day.num_days_from_monday() as i64)
        % 7;
    add_days(date, -back)
}

/// The configured time window entries must fall within to be shown.
///
/// Represents a half-open interval `[start, end)` in UTC. A range is resolved
/// once per pipeline run against the current wall-clock time and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleRange {
    /// Start of the range (inclusive).
    pub start: DateTime<Utc>,
    /// End of the range (exclusive).
    pub end: DateTime<Utc>,
}

impl VisibleRange {
    /// Creates a new range.
    ///
    /// An `end` before `start` collapses the range to the empty range at `start`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Creates a range from a start instant and a duration.
    ///
    /// The end saturates at the last representable instant.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        let end = start
            .checked_add_signed(duration)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(start, end)
    }

    /// Creates a range covering `days` whole local days starting at `first`.
    ///
    /// Zero days yields the empty range at the start of `first`.
    pub fn for_days<Tz: TimeZone>(first: NaiveDate, days: u32, tz: &Tz) -> Self {
        let start = start_of_day(first, tz);
        let end = start_of_day(add_days(first, i64::from(days)), tz);
        Self::new(start, end)
    }

    /// Creates a range for a single local day.
    pub fn for_date<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Self {
        Self::for_days(date, 1, tz)
    }

    /// Returns the duration of this range.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns `true` if the range contains no instant.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Checks if an instant falls within this range.
    ///
    /// Uses half-open interval semantics: `[start, end)`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if an interval overlaps this range.
    ///
    /// An interval without an end, or with zero length, is treated as the
    /// single instant `start`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> bool {
        match end {
            Some(end) if end > start => start < self.end && end > self.start,
            _ => self.contains(start),
        }
    }

    /// Returns `true` if `other` lies entirely within this range.
    pub fn covers(&self, other: &VisibleRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns the local date of the first day of the range.
    pub fn first_day<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        local_date(self.start, tz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod day_helpers {
        use super::*;

        #[test]
        fn start_of_day_in_utc() {
            assert_eq!(start_of_day(date(2025, 2, 5), &Utc), utc(2025, 2, 5, 0, 0, 0));
        }

        #[test]
        fn start_of_day_in_zone() {
            let berlin = chrono_tz::Europe::Berlin;
            // CET is UTC+1 in February
            assert_eq!(
                start_of_day(date(2025, 2, 5), &berlin),
                utc(2025, 2, 4, 23, 0, 0)
            );
        }

        #[test]
        fn start_of_day_when_midnight_is_skipped() {
            // Clocks jumped from 00:00 to 01:00 on 2018-11-04 in Sao Paulo
            let sao_paulo = chrono_tz::America::Sao_Paulo;
            let start = start_of_day(date(2018, 11, 4), &sao_paulo);
            assert_eq!(start, utc(2018, 11, 4, 3, 0, 0));
            assert_eq!(local_date(start, &sao_paulo), date(2018, 11, 4));
        }

        #[test]
        fn local_date_crosses_midnight() {
            let tokyo = chrono_tz::Asia::Tokyo;
            assert_eq!(local_date(utc(2025, 2, 5, 16, 0, 0), &tokyo), date(2025, 2, 6));
            assert_eq!(local_date(utc(2025, 2, 5, 14, 59, 0), &tokyo), date(2025, 2, 5));
        }

        #[test]
        fn week_start() {
            // 2025-02-05 is a Wednesday
            assert_eq!(start_of_week(date(2025, 2, 5), Weekday::Mon), date(2025, 2, 3));
            assert_eq!(start_of_week(date(2025, 2, 5), Weekday::Sun), date(2025, 2, 2));
            assert_eq!(start_of_week(date(2025, 2, 5), Weekday::Wed), date(2025, 2, 5));
        }
    }

    mod visible_range {
        use super::*;

        #[test]
        fn creation() {
            let range = VisibleRange::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
            assert_eq!(range.duration(), Duration::hours(8));
            assert!(!range.is_empty());
        }

        #[test]
        fn from_duration_saturates() {
            let start = utc(9999, 12, 31, 0, 0, 0);
            let range = VisibleRange::from_duration(start, Duration::hours(4));
            assert_eq!(range.end, utc(9999, 12, 31, 4, 0, 0));

            let range = VisibleRange::from_duration(DateTime::<Utc>::MAX_UTC, Duration::days(1));
            assert_eq!(range.end, DateTime::<Utc>::MAX_UTC);
            assert!(range.is_empty());
        }

        #[test]
        fn inverted_bounds_collapse() {
            let range = VisibleRange::new(utc(2025, 2, 5, 17, 0, 0), utc(2025, 2, 5, 9, 0, 0));
            assert!(range.is_empty());
            assert_eq!(range.end, range.start);
        }

        #[test]
        fn contains_is_half_open() {
            let range = VisibleRange::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
            assert!(range.contains(utc(2025, 2, 5, 9, 0, 0)));
            assert!(range.contains(utc(2025, 2, 5, 16, 59, 59)));
            assert!(!range.contains(utc(2025, 2, 5, 17, 0, 0)));
            assert!(!range.contains(utc(2025, 2, 5, 8, 59, 59)));
        }

        #[test]
        fn overlaps_intervals() {
            let range = VisibleRange::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));

            // Starts before, ends inside
            assert!(range.overlaps(utc(2025, 2, 5, 8, 0, 0), Some(utc(2025, 2, 5, 10, 0, 0))));
            // Completely contains the range
            assert!(range.overlaps(utc(2025, 2, 4, 0, 0, 0), Some(utc(2025, 2, 6, 0, 0, 0))));
            // Ends at range start
            assert!(!range.overlaps(utc(2025, 2, 5, 8, 0, 0), Some(utc(2025, 2, 5, 9, 0, 0))));
            // Starts at range end
            assert!(!range.overlaps(utc(2025, 2, 5, 17, 0, 0), Some(utc(2025, 2, 5, 18, 0, 0))));
        }

        #[test]
        fn overlaps_single_instants() {
            let range = VisibleRange::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
            assert!(range.overlaps(utc(2025, 2, 5, 9, 0, 0), None));
            assert!(!range.overlaps(utc(2025, 2, 5, 17, 0, 0), None));
            // Zero-length interval behaves like a single instant
            let at = utc(2025, 2, 5, 9, 0, 0);
            assert!(range.overlaps(at, Some(at)));
        }

        #[test]
        fn for_days_in_utc() {
            let range = VisibleRange::for_days(date(2025, 2, 5), 2, &Utc);
            assert_eq!(range.start, utc(2025, 2, 5, 0, 0, 0));
            assert_eq!(range.end, utc(2025, 2, 7, 0, 0, 0));
            assert_eq!(range.first_day(&Utc), date(2025, 2, 5));
        }

        #[test]
        fn for_date_across_dst_change() {
            // Europe/Berlin switched to CEST on 2025-03-30, that day is 23 hours long
            let berlin = chrono_tz::Europe::Berlin;
            let range = VisibleRange::for_date(date(2025, 3, 30), &berlin);
            assert_eq!(range.duration(), Duration::hours(23));
        }

        #[test]
        fn covers() {
            let today = VisibleRange::for_days(date(2025, 2, 5), 1, &Utc);
            let two_days = VisibleRange::for_days(date(2025, 2, 5), 2, &Utc);
            assert!(two_days.covers(&today));
            assert!(!today.covers(&two_days));
        }

        #[test]
        fn serde_roundtrip() {
            let range = VisibleRange::new(utc(2025, 2, 5, 9, 0, 0), utc(2025, 2, 5, 17, 0, 0));
            let json = serde_json::to_string(&range).unwrap();
            let parsed: VisibleRange = serde_json::from_str(&json).unwrap();
            assert_eq!(range, parsed);
        }
    }
}
