//! Core types for the agenda widget: time helpers, records, entries,
//! per-widget settings, output formatting and tracing setup.

pub mod entry;
pub mod format;
pub mod raw;
pub mod record;
pub mod settings;
pub mod time;
pub mod tracing;

pub use entry::{EntryPosition, EventEntry, FooterKind, PositionedEntry, TaskEntry, WidgetEntry};
pub use format::{FormatOptions, JsonOutput, OutputFormat, OutputFormatter, TimeFormat, ellipsis};
pub use raw::{NO_TITLE, RawRecord, RawTime};
pub use record::{NormalizedRecord, RecordKind};
pub use settings::{
    AllDayPlacement, EventRange, EventsEnded, HideSubtasks, InMemorySettingsRepository,
    MAX_RANGE_DAYS, MAX_RANGE_HOURS, SettingsError, SettingsRepository, TaskScheduling,
    TasksWithoutDates, WeekStart, WidgetId, WidgetSettings,
};
pub use time::{VisibleRange, add_days, local_date, start_of_day, start_of_week};

pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
