//! Recurrence expansion.
//!
//! Rules are handed to the `rrule` crate as an iCalendar snippet
//! (`DTSTART` + `RRULE`). Timed rules expand in the widget's zone so a weekly
//! 09:00 meeting stays at 09:00 local across DST changes; all-day rules expand
//! on plain dates.
//!
//! Expansion is bounded three ways. Rules without `COUNT` and with a fixed
//! period start from the last period before the window instead of their
//! original anchor. Occurrences are kept only while they overlap the window,
//! never more than [`MAX_OCCURRENCES`] per rule, and iteration stops after
//! [`MAX_SCANNED`] occurrences whatever was kept.

use std::str::FromStr;

use agenda_core::time::{VisibleRange, local_date};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use rrule::{Frequency, RRule, RRuleSet, Unvalidated};
use tracing::{debug, trace};

use crate::error::{RecurrenceError, RecurrenceResult};

/// Upper bound of occurrences produced for a single rule.
pub const MAX_OCCURRENCES: usize = 1000;

/// Upper bound of occurrences looked at for a single rule.
pub const MAX_SCANNED: usize = 100_000;

/// Returns the look-ahead window recurring records are expanded in:
/// `days` days from the start of today.
pub fn horizon(now: DateTime<Utc>, tz: &Tz, days: u32) -> VisibleRange {
    VisibleRange::for_days(local_date(now, tz), days.max(1), tz)
}

/// Expands a timed rule anchored at `anchor`, evaluated in `tz`.
///
/// Every occurrence lasts `span`; it is kept when `[start, start + span)`
/// overlaps `window`.
pub fn expand_instants(
    rule: &str,
    anchor: DateTime<Utc>,
    span: Duration,
    tz: &Tz,
    window: &VisibleRange,
) -> RecurrenceResult<Vec<DateTime<Utc>>> {
    let local = anchor.with_timezone(tz).naive_local();
    let target = window
        .start
        .checked_sub_signed(span)
        .map(|start| start.with_timezone(tz).naive_local());
    collect(rule, local, target, tz, window, span)
}

/// Expands an all-day rule anchored on `anchor`, keeping dates whose
/// `span_days` long occurrence overlaps `[first, end)`.
pub fn expand_dates(
    rule: &str,
    anchor: NaiveDate,
    span_days: i64,
    first: NaiveDate,
    end: NaiveDate,
) -> RecurrenceResult<Vec<NaiveDate>> {
    let span = Duration::days(span_days.max(0));
    let window = VisibleRange::new(utc_midnight(first), utc_midnight(end));
    let target = window.start.checked_sub_signed(span).map(|start| start.naive_utc());
    let anchor = anchor.and_time(NaiveTime::MIN);
    let occurrences = collect(rule, anchor, target, &Tz::UTC, &window, span)?;
    Ok(occurrences.into_iter().map(|dt| dt.date_naive()).collect())
}

fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn collect(
    rule: &str,
    anchor: NaiveDateTime,
    target: Option<NaiveDateTime>,
    tz: &Tz,
    window: &VisibleRange,
    span: Duration,
) -> RecurrenceResult<Vec<DateTime<Utc>>> {
    let rule = clean_rule(rule).ok_or(RecurrenceError::EmptyRule)?;
    let parsed = RRule::<Unvalidated>::from_str(&rule)?;

    let start = target
        .and_then(|target| fast_forward(&parsed, anchor, target))
        .filter(|start| is_representable(*start, tz))
        .unwrap_or(anchor);
    if start != anchor {
        trace!(rule = %rule, %anchor, %start, "Moved recurrence anchor forward");
    }

    let set = RRuleSet::from_str(&format!("{}\nRRULE:{}", dtstart(start, tz), rule))?;

    let mut occurrences = Vec::new();
    for (scanned, occurrence) in set.into_iter().enumerate() {
        if scanned == MAX_SCANNED {
            debug!(rule = %rule, "Scan limit reached");
            break;
        }
        let occurrence = occurrence.with_timezone(&Utc);
        if occurrence >= window.end {
            break;
        }
        let ends = occurrence
            .checked_add_signed(span)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        if occurrence < window.start && ends <= window.start {
            continue;
        }
        occurrences.push(occurrence);
        if occurrences.len() == MAX_OCCURRENCES {
            trace!(rule = %rule, "Occurrence limit reached");
            break;
        }
    }
    Ok(occurrences)
}

fn dtstart(local: NaiveDateTime, tz: &Tz) -> String {
    if *tz == Tz::UTC {
        format!("DTSTART:{}", local.format("%Y%m%dT%H%M%SZ"))
    } else {
        format!("DTSTART;TZID={}:{}", tz.name(), local.format("%Y%m%dT%H%M%S"))
    }
}

fn is_representable(local: NaiveDateTime, tz: &Tz) -> bool {
    tz.from_local_datetime(&local).earliest().is_some()
}

/// Returns the length of one period of a rule whose periods all have the
/// same length in local time.
fn fixed_period(rule: &RRule<Unvalidated>) -> Option<Duration> {
    let interval = i64::from(rule.get_interval().max(1));
    match rule.get_freq() {
        Frequency::Secondly => Some(Duration::seconds(interval)),
        Frequency::Minutely => Some(Duration::minutes(interval)),
        Frequency::Hourly => Some(Duration::hours(interval)),
        Frequency::Daily => Some(Duration::days(interval)),
        Frequency::Weekly => Some(Duration::weeks(interval)),
        Frequency::Monthly | Frequency::Yearly => None,
    }
}

/// Moves `anchor` forward by whole periods, stopping at least one period
/// before `target`.
///
/// Rules with `COUNT` are never moved. `UNTIL` keeps the new anchor a day
/// before it so the rule stays valid whatever zone `UNTIL` is written in.
fn fast_forward(
    rule: &RRule<Unvalidated>,
    anchor: NaiveDateTime,
    target: NaiveDateTime,
) -> Option<NaiveDateTime> {
    if rule.get_count().is_some() {
        return None;
    }
    let period = fixed_period(rule)?;
    let target = match rule.get_until() {
        Some(until) => target.min(until.naive_utc() - Duration::days(1)),
        None => target,
    };

    let periods = (target - anchor).num_seconds() / period.num_seconds();
    if periods < 2 {
        return None;
    }
    let skipped = period.checked_mul(i32::try_from(periods - 1).ok()?)?;
    anchor.checked_add_signed(skipped)
}

/// Strips the `RRULE:` prefix and widens a date-only `UNTIL` to the end of
/// that day, since `DTSTART` is always a date-time here.
fn clean_rule(rule: &str) -> Option<String> {
    let rule = rule.trim();
    let rule = match rule.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => rule[6..].trim(),
        _ => rule,
    };
    if rule.is_empty() {
        return None;
    }

    let parts: Vec<String> = rule
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value))
                if key.eq_ignore_ascii_case("UNTIL")
                    && value.len() == 8
                    && value.bytes().all(|b| b.is_ascii_digit()) =>
            {
                format!("UNTIL={}T235959Z", value)
            }
            _ => part.to_string(),
        })
        .collect();
    Some(parts.join(";"))
}
