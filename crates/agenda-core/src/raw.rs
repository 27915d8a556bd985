//! Raw provider records.
//!
//! [`RawRecord`] is the provider-agnostic shape of a calendar event or task as
//! it comes out of the provider query, before any zone resolution, recurrence
//! expansion or filtering. The pipeline only ever reads these; they are never
//! mutated downstream.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::record::RecordKind;

/// Title used when a provider record has none.
pub const NO_TITLE: &str = "(No title)";

/// A start, end or due value as reported by the provider.
///
/// Serialized untagged: an RFC 3339 string is a [`RawTime::DateTime`], a bare
/// `YYYY-MM-DD` string is a [`RawTime::Date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    /// A specific instant.
    DateTime(DateTime<Utc>),
    /// A calendar date without time of day.
    Date(NaiveDate),
}

impl RawTime {
    /// Returns true if this value carries no time of day.
    pub fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Returns the calendar date of this value.
    ///
    /// For instants this is the UTC date, which is the date all-day values
    /// authored as UTC midnight refer to.
    pub fn utc_date(&self) -> NaiveDate {
        match self {
            Self::DateTime(dt) => dt.date_naive(),
            Self::Date(date) => *date,
        }
    }
}

impl From<DateTime<Utc>> for RawTime {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::DateTime(dt)
    }
}

impl From<NaiveDate> for RawTime {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

/// A raw calendar event or task from a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Unique identifier within the provider.
    pub id: String,

    /// Event or task.
    #[serde(default)]
    pub kind: RecordKind,

    /// The title, if any.
    #[serde(default)]
    pub title: Option<String>,

    /// When the record starts.
    #[serde(default)]
    pub start: Option<RawTime>,

    /// When the record ends. For tasks this is the due value.
    #[serde(default)]
    pub end: Option<RawTime>,

    /// Whether the provider flagged the record as all-day.
    #[serde(default)]
    pub all_day: bool,

    /// Recurrence rule text (`FREQ=...`, optionally prefixed with `RRULE:`).
    #[serde(default)]
    pub recurrence: Option<String>,

    /// Completion state (tasks only).
    #[serde(default)]
    pub completed: bool,

    /// Hierarchy depth: 0 is top level, anything above is a subtask.
    #[serde(default)]
    pub depth: u32,

    /// The calendar or task list this record belongs to.
    #[serde(default)]
    pub source_id: String,

    /// Display color (ARGB).
    #[serde(default)]
    pub color: u32,
}

impl RawRecord {
    /// Creates a raw event with the given start.
    pub fn event(id: impl Into<String>, start: impl Into<RawTime>) -> Self {
        Self::new(id, RecordKind::Event).with_start(start)
    }

    /// Creates a raw task without dates.
    pub fn task(id: impl Into<String>) -> Self {
        Self::new(id, RecordKind::Task)
    }

    fn new(id: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            id: id.into(),
            kind,
            title: None,
            start: None,
            end: None,
            all_day: false,
            recurrence: None,
            completed: false,
            depth: 0,
            source_id: String::new(),
            color: 0,
        }
    }

    /// Returns the effective title, falling back to "(No title)" if empty.
    pub fn effective_title(&self) -> &str {
        self.title
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.as_str())
            .unwrap_or(NO_TITLE)
    }

    /// Returns true if this is a task.
    pub fn is_task(&self) -> bool {
        self.kind == RecordKind::Task
    }

    /// Returns true if the record spans whole days, either because it is
    /// flagged so or because its start carries no time of day.
    pub fn is_all_day(&self) -> bool {
        self.all_day || self.start.is_some_and(|start| start.is_date())
    }

    /// Returns the recurrence rule without `RRULE:` prefix, if non-empty.
    pub fn rule(&self) -> Option<&str> {
        let rule = self.recurrence.as_deref()?.trim();
        let rule = rule.strip_prefix("RRULE:").unwrap_or(rule).trim();
        (!rule.is_empty()).then_some(rule)
    }

    /// Builder method to set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder method to set the start.
    pub fn with_start(mut self, start: impl Into<RawTime>) -> Self {
        self.start = Some(start.into());
        self
    }

    /// Builder method to set the end.
    pub fn with_end(mut self, end: impl Into<RawTime>) -> Self {
        self.end = Some(end.into());
        self
    }

    /// Builder method to set the due value of a task.
    pub fn with_due(self, due: impl Into<RawTime>) -> Self {
        self.with_end(due)
    }

    /// Builder method to flag as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Builder method to set the recurrence rule.
    pub fn with_recurrence(mut self, rule: impl Into<String>) -> Self {
        self.recurrence = Some(rule.into());
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

    /// Builder method to set the source.
    pub fn with_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = source_id.into();
        self
    }

    /// Builder method to set the color.
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }
}
