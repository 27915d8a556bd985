//! Output formatting for positioned widget entries.
//!
//! This module turns the pipeline's output into something a terminal or
//! another process can consume:
//! - **Text**: one line per entry, `index position description`
//! - **JSON**: the positioned entries with the resolved range and a count
//!
//! # Example
//!
//! ```rust
//! use agenda_core::format::{FormatOptions, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(FormatOptions::default(), chrono_tz::Tz::UTC);
//! let lines = formatter.format_text(&[]);
//! assert!(lines.is_empty());
//! ```

use std::borrow::Cow;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::entry::{EventEntry, FooterKind, PositionedEntry, TaskEntry, WidgetEntry};
use crate::time::VisibleRange;

/// The output format for rendered entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One human-readable line per entry.
    #[default]
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Time format preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFormat {
    /// 24-hour format (e.g., "14:30").
    #[default]
    H24,
    /// 12-hour format with AM/PM (e.g., "02:30 PM").
    H12,
}

/// Configuration options for output formatting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Maximum length for titles (truncated with ellipsis).
    pub max_title_length: Option<usize>,
    /// Hour separator character (e.g., ":", "h").
    pub hour_separator: String,
    /// Time format preference.
    pub time_format: TimeFormat,
    /// Indentation per subtask level, in spaces.
    pub subtask_indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            max_title_length: None,
            hour_separator: ":".to_string(),
            time_format: TimeFormat::H24,
            subtask_indent: 2,
        }
    }
}

/// JSON output format for machine consumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonOutput {
    /// The "now" the entries were computed for.
    pub generated_at: DateTime<Utc>,
    /// The resolved visible range.
    pub range: VisibleRange,
    /// Number of entries, footer included.
    pub count: usize,
    /// The positioned entries.
    pub entries: Vec<PositionedEntry>,
}

/// Output formatter for positioned entries.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    options: FormatOptions,
    tz: Tz,
}

impl OutputFormatter {
    /// Creates a formatter rendering local times in `tz`.
    pub fn new(options: FormatOptions, tz: Tz) -> Self {
        Self { options, tz }
    }

    /// Creates a formatter with default options rendering in UTC.
    pub fn with_defaults() -> Self {
        Self::new(FormatOptions::default(), Tz::UTC)
    }

    /// Formats entries as text lines.
    pub fn format_text(&self, entries: &[PositionedEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|positioned| {
                format!(
                    "{:<4}{:<13}{}",
                    positioned.index,
                    positioned.position.as_str(),
                    self.describe(&positioned.entry)
                )
            })
            .collect()
    }

    /// Formats entries as a JSON document.
    pub fn format_json(
        &self,
        entries: &[PositionedEntry],
        range: VisibleRange,
        now: DateTime<Utc>,
    ) -> JsonOutput {
        JsonOutput {
            generated_at: now,
            range,
            count: entries.len(),
            entries: entries.to_vec(),
        }
    }

    /// Returns the human-readable description of a single entry.
    pub fn describe(&self, entry: &WidgetEntry) -> String {
        match entry {
            WidgetEntry::PastDueHeader => "== Past and due ==".to_string(),
            WidgetEntry::DayHeader { date } => format!("== {} ==", date.format("%a %Y-%m-%d")),
            WidgetEntry::EndOfListHeader => "== No date ==".to_string(),
            WidgetEntry::Event(event) => self.describe_event(event),
            WidgetEntry::Task(task) => self.describe_task(task),
            WidgetEntry::CurrentTime { instant } => format!("-- now {} --", self.clock(*instant)),
            WidgetEntry::ListFooter {
                kind: FooterKind::NoEvents,
            } => "(no events)".to_string(),
            WidgetEntry::ListFooter {
                kind: FooterKind::EndOfList,
            } => "(end of list)".to_string(),
        }
    }

    fn describe_event(&self, event: &EventEntry) -> String {
        let title = self.truncate_title(&event.title);
        let recurring = if event.recurring { " (recurring)" } else { "" };
        if event.all_day {
            return format!("All day {}{}", title, recurring);
        }
        match event.end {
            Some(end) if end > event.start => format!(
                "{}-{} {}{}",
                self.clock(event.start),
                self.clock(end),
                title,
                recurring
            ),
            _ => format!("{} {}{}", self.clock(event.start), title, recurring),
        }
    }

    fn describe_task(&self, task: &TaskEntry) -> String {
        let indent = " ".repeat(self.options.subtask_indent * task.depth as usize);
        let check = if task.completed { "[x]" } else { "[ ]" };
        let title = self.truncate_title(&task.title);
        if task.all_day {
            format!("{}{} {}", indent, check, title)
        } else {
            format!("{}{} {} (due {})", indent, check, title, self.clock(task.due))
        }
    }

    fn clock(&self, instant: DateTime<Utc>) -> String {
        let local = instant.with_timezone(&self.tz);
        let sep = &self.options.hour_separator;
        match self.options.time_format {
            TimeFormat::H24 => local.format(&format!("%H{}%M", sep)).to_string(),
            TimeFormat::H12 => local.format(&format!("%I{}%M %p", sep)).to_string(),
        }
    }

    fn truncate_title<'a>(&self, title: &'a str) -> Cow<'a, str> {
        match self.options.max_title_length {
            Some(max) => ellipsis(title, max),
            None => Cow::Borrowed(title),
        }
    }
}

/// Truncates a string with ellipsis if it exceeds the given length in characters.
pub fn ellipsis(s: &str, max_len: usize) -> Cow<'_, str> {
    if max_len == 0 {
        return Cow::Borrowed("");
    }

    if s.chars().count() <= max_len {
        return Cow::Borrowed(s);
    }

    let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
    Cow::Owned(format!("{}...", truncated))
}
