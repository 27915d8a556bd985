//! Widget entry types.
//!
//! This module provides the externally visible output of the pipeline:
//! - [`WidgetEntry`]: One row of the widget (records, section headers, current-time marker, footer)
//! - [`EntryPosition`]: The coarse positional tag the rendering surface consumes
//! - [`PositionedEntry`]: An entry together with its list index and position

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::record::NormalizedRecord;
use crate::time::local_date;

/// An event row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    /// Identifier of the originating provider record.
    pub id: String,
    /// The event title.
    pub title: String,
    /// Start of the occurrence.
    pub start: DateTime<Utc>,
    /// End of the occurrence (exclusive).
    pub end: Option<DateTime<Utc>>,
    /// Whether the event spans whole days.
    pub all_day: bool,
    /// Display color (ARGB).
    pub color: u32,
    /// The calendar the event belongs to.
    pub source_id: String,
    /// Whether this is an occurrence of a recurring event.
    pub recurring: bool,
}

/// A task row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Identifier of the originating provider record.
    pub id: String,
    /// The task title.
    pub title: String,
    /// Local due date.
    pub due_date: NaiveDate,
    /// Due instant (local midnight of the due date for tasks without due time).
    pub due: DateTime<Utc>,
    /// Whether the due value carried no time of day.
    pub all_day: bool,
    /// Completion state, carried through for visual treatment.
    pub completed: bool,
    /// Hierarchy depth.
    pub depth: u32,
    /// Display color (ARGB).
    pub color: u32,
    /// The task list the task belongs to.
    pub source_id: String,
    /// The task has neither start nor due date.
    #[serde(default)]
    pub undated: bool,
}

/// What the footer tells the rendering surface about the list above it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterKind {
    /// Nothing precedes the footer: render the "no events" message.
    NoEvents,
    /// The footer terminates a non-empty list.
    #[default]
    EndOfList,
}

/// One unit of the rendered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WidgetEntry {
    /// Opens the section of past events and overdue tasks.
    PastDueHeader,
    /// Marks the start of a day's section.
    DayHeader {
        /// The local date of the section.
        date: NaiveDate,
    },
    /// Opens the section of tasks without dates after the last day.
    EndOfListHeader,
    /// A calendar event.
    Event(EventEntry),
    /// A task.
    Task(TaskEntry),
    /// The current-time indicator.
    CurrentTime {
        /// The "now" of the pipeline run.
        instant: DateTime<Utc>,
    },
    /// The terminal entry of every sequence.
    ListFooter {
        /// Whether the list above is empty.
        kind: FooterKind,
    },
}

impl WidgetEntry {
    /// Creates an event or task entry from a normalized record.
    pub fn from_record(record: &NormalizedRecord) -> Self {
        match (record.is_task(), record.due_date) {
            (true, Some(due_date)) => Self::Task(TaskEntry {
                id: record.id.clone(),
                title: record.title.clone(),
                due_date,
                due: record.start,
                all_day: record.all_day,
                completed: record.completed,
                depth: record.depth,
                color: record.color,
                source_id: record.source_id.clone(),
                undated: record.undated,
            }),
            _ => Self::Event(EventEntry {
                id: record.id.clone(),
                title: record.title.clone(),
                start: record.start,
                end: record.end,
                all_day: record.all_day,
                color: record.color,
                source_id: record.source_id.clone(),
                recurring: record.recurring,
            }),
        }
    }

    /// Returns true for event and task entries.
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Event(_) | Self::Task(_))
    }

    /// Returns true for the footer.
    pub fn is_footer(&self) -> bool {
        matches!(self, Self::ListFooter { .. })
    }

    /// Returns true for day headers.
    pub fn is_day_header(&self) -> bool {
        matches!(self, Self::DayHeader { .. })
    }

    /// Returns true for any header opening a section.
    pub fn is_section_header(&self) -> bool {
        matches!(
            self,
            Self::PastDueHeader | Self::DayHeader { .. } | Self::EndOfListHeader
        )
    }

    /// Returns true for the current-time indicator.
    pub fn is_current_time(&self) -> bool {
        matches!(self, Self::CurrentTime { .. })
    }

    /// Returns true for all-day events and for tasks.
    pub fn is_all_day_like(&self) -> bool {
        match self {
            Self::Event(event) => event.all_day,
            Self::Task(_) => true,
            _ => false,
        }
    }

    /// Returns the instant this entry starts at, if it has one.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Event(event) => Some(event.start),
            Self::Task(task) => Some(task.due),
            Self::CurrentTime { instant } => Some(*instant),
            Self::PastDueHeader
            | Self::DayHeader { .. }
            | Self::EndOfListHeader
            | Self::ListFooter { .. } => None,
        }
    }

    /// Returns the local date of this entry, if it has one.
    pub fn date<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        match self {
            Self::DayHeader { date } => Some(*date),
            Self::Task(task) => Some(task.due_date),
            Self::Event(event) => Some(local_date(event.start, tz)),
            Self::CurrentTime { instant } => Some(local_date(*instant, tz)),
            Self::PastDueHeader | Self::EndOfListHeader | Self::ListFooter { .. } => None,
        }
    }

    /// Returns the title of event and task entries.
    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Event(event) => Some(&event.title),
            Self::Task(task) => Some(&task.title),
            _ => None,
        }
    }

    /// Returns the source id of event and task entries.
    pub fn source_id(&self) -> Option<&str> {
        match self {
            Self::Event(event) => Some(&event.source_id),
            Self::Task(task) => Some(&task.source_id),
            _ => None,
        }
    }

    /// Returns the record id of event and task entries.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::Event(event) => Some(&event.id),
            Self::Task(task) => Some(&task.id),
            _ => None,
        }
    }

    /// Returns a short name for the entry variant.
    pub fn variant_name(&self) -> &'static str {
        match self {
            Self::PastDueHeader => "past_due_header",
            Self::DayHeader { .. } => "day_header",
            Self::EndOfListHeader => "end_of_list_header",
            Self::Event(_) => "event",
            Self::Task(_) => "task",
            Self::CurrentTime { .. } => "current_time",
            Self::ListFooter { .. } => "list_footer",
        }
    }
}

/// The positional tag of an entry in the final sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryPosition {
    /// The first entry of a non-empty list.
    ListHeader,
    /// Any entry in the middle of the list.
    ListEntry,
    /// The terminal footer.
    ListFooter,
    /// The current-time indicator.
    CurrentTime,
}

impl EntryPosition {
    /// Returns the persisted name of this position.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ListHeader => "LIST_HEADER",
            Self::ListEntry => "LIST_ENTRY",
            Self::ListFooter => "LIST_FOOTER",
            Self::CurrentTime => "CURRENT_TIME",
        }
    }
}

impl std::fmt::Display for EntryPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry of the final sequence with its index and positional tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedEntry {
    /// Index of the entry in the sequence.
    pub index: usize,
    /// Positional tag.
    pub position: EntryPosition,
    /// The entry itself.
    pub entry: WidgetEntry,
}
