//! Normalized record types.
//!
//! A [`NormalizedRecord`] is one concrete occurrence of a provider record,
//! resolved into a UTC instant range with the all-day anchoring, recurrence
//! expansion and task fields already applied. Every filter stage consumes and
//! produces sequences of these.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::time::local_date;

/// The kind of a provider record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// A calendar event.
    #[default]
    Event,
    /// A task (to-do item).
    Task,
}

impl RecordKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Task => "task",
        }
    }
}

/// A provider record resolved into a single concrete occurrence.
///
/// Invariant: `start <= end` whenever `end` is defined. Tasks without a due
/// time have no `end` and are all-day items anchored at local midnight of
/// their due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Identifier of the provider record this occurrence came from.
    pub id: String,
    /// Event or task.
    pub kind: RecordKind,
    /// The effective title.
    pub title: String,
    /// Start of the occurrence (due instant for tasks).
    pub start: DateTime<Utc>,
    /// End of the occurrence (exclusive), if any.
    pub end: Option<DateTime<Utc>>,
    /// Whether this occurrence spans whole local days.
    pub all_day: bool,
    /// Local due date, for tasks.
    pub due_date: Option<NaiveDate>,
    /// Completion state, for tasks.
    pub completed: bool,
    /// Hierarchy depth: 0 is a top-level task, anything above is a subtask.
    pub depth: u32,
    /// The calendar or task list this record belongs to.
    pub source_id: String,
    /// Display color (ARGB).
    pub color: u32,
    /// Whether this is an occurrence of a recurring record.
    pub recurring: bool,
    /// Task without start or due date, anchored on the day it was read.
    #[serde(default)]
    pub undated: bool,
}

impl NormalizedRecord {
    /// Creates a new timed event occurrence.
    pub fn event(
        id: impl Into<String>,
        title: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: RecordKind::Event,
            title: title.into(),
            start,
            end: Some(end.max(start)),
            all_day: false,
            due_date: None,
            completed: false,
            depth: 0,
            source_id: source_id.into(),
            color: 0,
            recurring: false,
            undated: false,
        }
    }

    /// Creates a new task occurrence due at `due`.
    pub fn task(
        id: impl Into<String>,
        title: impl Into<String>,
        due: DateTime<Utc>,
        due_date: NaiveDate,
        source_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: RecordKind::Task,
            title: title.into(),
            start: due,
            end: None,
            all_day: false,
            due_date: Some(due_date),
            completed: false,
            depth: 0,
            source_id: source_id.into(),
            color: 0,
            recurring: false,
            undated: false,
        }
    }

    /// Returns true if this is a task.
    pub fn is_task(&self) -> bool {
        self.kind == RecordKind::Task
    }

    /// Returns true if this is a subtask (depth above top level).
    pub fn is_subtask(&self) -> bool {
        self.is_task() && self.depth > 0
    }

    /// Returns the local date this record belongs to: the due date for
    /// tasks, otherwise the day of the start instant in `tz`.
    pub fn date<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        match self.due_date {
            Some(date) if self.is_task() => date,
            _ => local_date(self.start, tz),
        }
    }

    /// Returns the end instant, or the start for records without one.
    pub fn effective_end(&self) -> DateTime<Utc> {
        self.end.unwrap_or(self.start)
    }

    /// Checks if the record has not ended yet at `now`.
    pub fn is_pending_at(&self, now: DateTime<Utc>) -> bool {
        self.effective_end() >= now
    }

    /// Builder method to mark as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Builder method to set the end instant.
    pub fn with_end(mut self, end: Option<DateTime<Utc>>) -> Self {
        self.end = end.map(|end| end.max(self.start));
        self
    }

    /// Builder method to set completion state.
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    /// Builder method to set the hierarchy depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Builder method to set the color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    /// Builder method to mark as recurring occurrence.
    pub fn with_recurring(mut self, recurring: bool) -> Self {
        self.recurring = recurring;
        self
    }

    /// Builder method to mark a task without dates.
    pub fn with_undated(mut self, undated: bool) -> Self {
        self.undated = undated;
        self
    }

    /// Returns true for an incomplete task dated before `today_start`.
    pub fn is_overdue_at(&self, today_start: DateTime<Utc>) -> bool {
        self.is_task() && !self.completed && !self.undated && self.start < today_start
    }
}
