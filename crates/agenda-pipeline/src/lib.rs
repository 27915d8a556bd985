//! Entry construction pipeline for the agenda widget.
//!
//! This crate turns raw provider records into the positioned entry list a
//! widget renders:
//!
//! ```text
//!   RawRecord ──normalize──▶ NormalizedRecord (one per occurrence)
//!                                │
//!              filter_by_range ◀─┘  (keeping overdue tasks for the past section)
//!              filter_subtasks
//!              filter_completed
//!              filter_by_keywords
//!              filter_closest_instances
//!              filter_duplicates
//!                                │
//!                build_entries ◀─┘
//!                     sequence     (sections, headers, current time, footer)
//!             assign_positions ──▶ PositionedEntry
//! ```
//!
//! Every stage is a pure function over an ordered sequence. A run never fails:
//! malformed input is repaired or dropped with a log event, and an empty or
//! failed provider result still renders a footer-only list.
//!
//! # Example
//!
//! ```
//! use agenda_core::{EventRange, WidgetSettings};
//! use agenda_pipeline::run_pipeline;
//! use chrono::Utc;
//!
//! let settings = WidgetSettings::default().with_event_range(EventRange::Today);
//! let entries = run_pipeline(&[], Utc::now(), &settings);
//! assert_eq!(entries.len(), 1);
//! assert!(entries[0].entry.is_footer());
//! ```

pub mod build;
pub mod error;
pub mod filter;
pub mod keywords;
pub mod normalize;
pub mod position;
pub mod recurrence;
pub mod sequence;

use agenda_core::entry::PositionedEntry;
use agenda_core::raw::RawRecord;
use agenda_core::settings::{SettingsRepository, WidgetId, WidgetSettings};
use agenda_core::time::{local_date, start_of_day};
use chrono::{DateTime, Utc};
use tracing::debug;

pub use build::build_entries;
pub use error::{RecurrenceError, RecurrenceResult};
pub use filter::{
    filter_by_keywords, filter_by_range, filter_by_range_keeping_overdue,
    filter_closest_instances, filter_completed, filter_duplicates, filter_subtasks,
};
pub use keywords::KeywordsFilter;
pub use normalize::{NormalizeOptions, normalize, normalize_records};
pub use position::{assign_positions, position_of};
pub use recurrence::{MAX_OCCURRENCES, MAX_SCANNED};
pub use sequence::{SequenceOptions, sequence};

/// Runs every stage for one widget at `now`.
pub fn run_pipeline(
    records: &[RawRecord],
    now: DateTime<Utc>,
    settings: &WidgetSettings,
) -> Vec<PositionedEntry> {
    let tz = settings.zone();
    let range = settings.resolve_range(now, &tz);

    let options = NormalizeOptions::from_settings(now, &tz, settings).covering(&range);
    let normalized = normalize_records(records, &tz, &options);
    let kept = if settings.show_past_events_under_one_header {
        let today_start = start_of_day(local_date(now, &tz), &tz);
        filter_by_range_keeping_overdue(normalized, &range, today_start)
    } else {
        filter_by_range(normalized, &range)
    };
    let kept = filter_subtasks(kept, settings.hide_subtasks);
    let kept = filter_completed(kept, settings.show_completed_tasks);
    let kept = filter_by_keywords(
        kept,
        &KeywordsFilter::parse(&settings.hide_keywords),
        &KeywordsFilter::parse(&settings.show_keywords),
    );
    let kept = if settings.show_only_closest_instance {
        filter_closest_instances(kept, now)
    } else {
        kept
    };
    let kept = if settings.hide_duplicates {
        filter_duplicates(kept)
    } else {
        kept
    };

    let entries = build_entries(&kept);
    let sequenced = sequence(entries, now, &range, &tz, &SequenceOptions::from(settings));
    let positioned = assign_positions(sequenced);
    debug!(
        records = records.len(),
        entries = positioned.len(),
        time_zone = tz.name(),
        "Pipeline run complete"
    );
    positioned
}

/// The pipeline bound to one widget instance.
///
/// Settings are looked up in the repository on every run, so a change made
/// between two runs is picked up without rebuilding the pipeline.
#[derive(Debug)]
pub struct AgendaPipeline<'a, R: SettingsRepository + ?Sized> {
    repository: &'a R,
    widget_id: WidgetId,
}

impl<'a, R: SettingsRepository + ?Sized> AgendaPipeline<'a, R> {
    /// Creates a pipeline for `widget_id`.
    pub fn new(repository: &'a R, widget_id: WidgetId) -> Self {
        Self {
            repository,
            widget_id,
        }
    }

    /// Returns the widget this pipeline renders.
    pub fn widget_id(&self) -> WidgetId {
        self.widget_id
    }

    /// Returns the current settings of the widget.
    pub fn settings(&self) -> WidgetSettings {
        self.repository.settings_for(self.widget_id)
    }

    /// Runs the pipeline with the widget's current settings.
    pub fn run(&self, records: &[RawRecord], now: DateTime<Utc>) -> Vec<PositionedEntry> {
        run_pipeline(records, now, &self.settings())
    }
}
