//! RawRecord to NormalizedRecord conversion.
//!
//! This module turns provider records into concrete occurrences:
//! 1. Resolves start/end (or due) values into UTC instants in the widget zone
//! 2. Anchors all-day values to local midnight of their calendar date
//! 3. Schedules tasks on their due or start date, carrying started tasks to today
//! 4. Expands recurrence rules within the look-ahead horizon
//! 5. Drops records that cannot be placed on the timeline
//!
//! Normalization never fails. Malformed input is logged and either repaired
//! (inverted intervals, unparseable rules) or dropped (events without start).

use agenda_core::raw::{RawRecord, RawTime};
use agenda_core::record::NormalizedRecord;
use agenda_core::settings::{MAX_RANGE_DAYS, TaskScheduling, WidgetSettings};
use agenda_core::time::{VisibleRange, add_days, local_date, start_of_day};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::recurrence::{expand_dates, expand_instants, horizon};

/// Run-specific inputs of the normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// The local date of "now".
    pub today: NaiveDate,
    /// Window recurring records are expanded in.
    pub horizon: VisibleRange,
    /// Whether tasks without start and due are kept (anchored on today).
    pub include_undated_tasks: bool,
    /// Which task date decides the day a task is listed on.
    pub task_scheduling: TaskScheduling,
}

impl NormalizeOptions {
    /// Creates options for a run at `now` with the default horizon.
    pub fn new(now: DateTime<Utc>, tz: &Tz) -> Self {
        Self::with_horizon_days(now, tz, MAX_RANGE_DAYS)
    }

    /// Creates options for a run at `now` expanding `days` days ahead.
    pub fn with_horizon_days(now: DateTime<Utc>, tz: &Tz, days: u32) -> Self {
        Self {
            today: local_date(now, tz),
            horizon: horizon(now, tz, days),
            include_undated_tasks: false,
            task_scheduling: TaskScheduling::default(),
        }
    }

    /// Creates options from widget settings.
    pub fn from_settings(now: DateTime<Utc>, tz: &Tz, settings: &WidgetSettings) -> Self {
        Self::with_horizon_days(now, tz, settings.recurrence_horizon_days)
            .with_include_undated_tasks(settings.tasks_without_dates.is_shown())
            .with_task_scheduling(settings.task_scheduling)
    }

    /// Builder method to keep undated tasks.
    #[must_use]
    pub fn with_include_undated_tasks(mut self, include: bool) -> Self {
        self.include_undated_tasks = include;
        self
    }

    /// Builder method to set the task scheduling date.
    #[must_use]
    pub fn with_task_scheduling(mut self, scheduling: TaskScheduling) -> Self {
        self.task_scheduling = scheduling;
        self
    }

    /// Builder method to widen the horizon so it covers `range`.
    #[must_use]
    pub fn covering(mut self, range: &VisibleRange) -> Self {
        self.horizon = VisibleRange::new(
            self.horizon.start.min(range.start),
            self.horizon.end.max(range.end),
        );
        self
    }
}

/// Where a task is placed on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskAnchor {
    /// On its own due or start value.
    Dated(RawTime),
    /// On today, carried forward from an earlier start.
    Today,
    /// Neither start nor due is set.
    Undated,
}

/// Normalizes every record, preserving input order.
pub fn normalize_records(
    raws: &[RawRecord],
    tz: &Tz,
    options: &NormalizeOptions,
) -> Vec<NormalizedRecord> {
    let records: Vec<_> = raws
        .iter()
        .flat_map(|raw| normalize(raw, tz, options))
        .collect();
    debug!(raw = raws.len(), occurrences = records.len(), "Normalized records");
    records
}

/// Converts a [`RawRecord`] into zero or more [`NormalizedRecord`]s.
///
/// Non-recurring records yield at most one occurrence. Recurring records
/// yield one per occurrence overlapping the horizon.
pub fn normalize(raw: &RawRecord, tz: &Tz, options: &NormalizeOptions) -> Vec<NormalizedRecord> {
    if raw.is_task() {
        normalize_task(raw, tz, options)
    } else {
        normalize_event(raw, tz, options)
    }
}

fn normalize_event(raw: &RawRecord, tz: &Tz, options: &NormalizeOptions) -> Vec<NormalizedRecord> {
    let Some(start) = raw.start else {
        warn!(id = %raw.id, "Dropping event without start");
        return Vec::new();
    };

    if raw.is_all_day() {
        let first = start.utc_date();
        let days = match raw.end.map(|end| end.utc_date()) {
            Some(last) if last > first => (last - first).num_days(),
            _ => 1,
        };
        return occurrence_dates(raw, first, days, tz, options)
            .into_iter()
            .map(|date| {
                let start = start_of_day(date, tz);
                let end = start_of_day(add_days(date, days), tz);
                base_event(raw, start, Some(end)).with_all_day(true)
            })
            .collect();
    }

    let start = instant(start, tz);
    let end = raw.end.map(|end| instant(end, tz)).map(|end| {
        if end < start {
            warn!(id = %raw.id, %start, %end, "Event ends before it starts, clamping");
        }
        end.max(start)
    });
    let duration = end.map(|end| end - start);

    occurrence_instants(raw, start, duration.unwrap_or_else(Duration::zero), tz, options)
        .into_iter()
        .map(|start| base_event(raw, start, duration.map(|d| start + d)))
        .collect()
}

fn normalize_task(raw: &RawRecord, tz: &Tz, options: &NormalizeOptions) -> Vec<NormalizedRecord> {
    let anchor = match task_anchor(raw, tz, options) {
        TaskAnchor::Dated(anchor) => anchor,
        TaskAnchor::Today => {
            let today = options.today;
            return vec![base_task(raw, start_of_day(today, tz), today).with_all_day(true)];
        }
        TaskAnchor::Undated if options.include_undated_tasks => {
            let today = options.today;
            let task = base_task(raw, start_of_day(today, tz), today);
            return vec![task.with_all_day(true).with_undated(true)];
        }
        TaskAnchor::Undated => {
            debug!(id = %raw.id, "Dropping undated task");
            return Vec::new();
        }
    };

    if raw.all_day || anchor.is_date() {
        return occurrence_dates(raw, anchor.utc_date(), 1, tz, options)
            .into_iter()
            .map(|date| base_task(raw, start_of_day(date, tz), date).with_all_day(true))
            .collect();
    }

    let due = instant(anchor, tz);
    occurrence_instants(raw, due, Duration::zero(), tz, options)
        .into_iter()
        .map(|due| base_task(raw, due, local_date(due, tz)))
        .collect()
}

/// Picks the value a task is listed on.
///
/// With [`TaskScheduling::DateDue`] the due value wins; a task with only a
/// start before today is carried to today. With
/// [`TaskScheduling::DateStarted`] the start value wins; a task that has not
/// started yet or started before today is carried to today unless it is
/// already overdue.
fn task_anchor(raw: &RawRecord, tz: &Tz, options: &NormalizeOptions) -> TaskAnchor {
    let is_past = |time: RawTime| day_of(time, tz) < options.today;
    match (options.task_scheduling, raw.start, raw.end) {
        (_, None, None) => TaskAnchor::Undated,
        (TaskScheduling::DateDue, _, Some(due)) => TaskAnchor::Dated(due),
        (TaskScheduling::DateDue, Some(start), None) if is_past(start) => TaskAnchor::Today,
        (TaskScheduling::DateDue, Some(start), None) => TaskAnchor::Dated(start),
        (TaskScheduling::DateStarted, Some(start), _) if !is_past(start) => {
            TaskAnchor::Dated(start)
        }
        (TaskScheduling::DateStarted, _, Some(due)) if is_past(due) => TaskAnchor::Dated(due),
        (TaskScheduling::DateStarted, _, _) => TaskAnchor::Today,
    }
}

fn day_of(time: RawTime, tz: &Tz) -> NaiveDate {
    match time {
        RawTime::DateTime(dt) => local_date(dt, tz),
        RawTime::Date(date) => date,
    }
}

fn instant(time: RawTime, tz: &Tz) -> DateTime<Utc> {
    match time {
        RawTime::DateTime(dt) => dt,
        RawTime::Date(date) => start_of_day(date, tz),
    }
}

fn occurrence_instants(
    raw: &RawRecord,
    anchor: DateTime<Utc>,
    span: Duration,
    tz: &Tz,
    options: &NormalizeOptions,
) -> Vec<DateTime<Utc>> {
    let Some(rule) = raw.rule() else {
        return vec![anchor];
    };
    expand_instants(rule, anchor, span, tz, &options.horizon).unwrap_or_else(|err| {
        warn!(
            id = %raw.id,
            rule,
            error = %err,
            "Unusable recurrence rule, keeping the first occurrence"
        );
        vec![anchor]
    })
}

fn occurrence_dates(
    raw: &RawRecord,
    anchor: NaiveDate,
    span_days: i64,
    tz: &Tz,
    options: &NormalizeOptions,
) -> Vec<NaiveDate> {
    let Some(rule) = raw.rule() else {
        return vec![anchor];
    };
    let first = options.horizon.first_day(tz);
    let end = local_date(options.horizon.end, tz);
    expand_dates(rule, anchor, span_days, first, end).unwrap_or_else(|err| {
        warn!(
            id = %raw.id,
            rule,
            error = %err,
            "Unusable recurrence rule, keeping the first occurrence"
        );
        vec![anchor]
    })
}

fn base_event(
    raw: &RawRecord,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> NormalizedRecord {
    NormalizedRecord::event(
        &raw.id,
        raw.effective_title(),
        start,
        end.unwrap_or(start),
        &raw.source_id,
    )
    .with_end(end)
    .with_color(raw.color)
    .with_recurring(raw.rule().is_some())
}

fn base_task(raw: &RawRecord, due: DateTime<Utc>, due_date: NaiveDate) -> NormalizedRecord {
    NormalizedRecord::task(&raw.id, raw.effective_title(), due, due_date, &raw.source_id)
        .with_completed(raw.completed)
        .with_depth(raw.depth)
        .with_color(raw.color)
        .with_recurring(raw.rule().is_some())
}
