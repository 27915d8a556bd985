//! Sequencer: ordering and structural markers.
//!
//! Turns the built entries into the final sequence:
//! 1. Splits entries into sections: past and due, one per local day, and the
//!    end-of-list section for tasks without dates
//! 2. Orders each section by all-day before timed (or after, per
//!    [`AllDayPlacement`]), then start, then title
//! 3. Opens every section with its header ([`WidgetEntry::PastDueHeader`],
//!    [`WidgetEntry::DayHeader`] or [`WidgetEntry::EndOfListHeader`])
//! 4. Places the [`WidgetEntry::CurrentTime`] marker inside today's section
//! 5. Terminates the sequence with exactly one [`WidgetEntry::ListFooter`]

use std::collections::BTreeMap;

use agenda_core::entry::{FooterKind, WidgetEntry};
use agenda_core::settings::{AllDayPlacement, MAX_RANGE_DAYS, TasksWithoutDates, WidgetSettings};
use agenda_core::time::{VisibleRange, add_days, local_date, start_of_day};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Options controlling sections and structural markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceOptions {
    /// Insert section headers.
    pub show_day_headers: bool,
    /// Insert the current-time marker.
    pub show_current_time: bool,
    /// Placement of all-day items within a day.
    pub all_day_placement: AllDayPlacement,
    /// Collect ended events and overdue tasks in a leading section.
    pub past_due_header: bool,
    /// Section tasks without dates go to.
    pub tasks_without_dates: TasksWithoutDates,
    /// Open a section for every day of the range, even an empty one.
    pub show_days_without_events: bool,
}

impl Default for SequenceOptions {
    fn default() -> Self {
        Self {
            show_day_headers: true,
            show_current_time: true,
            all_day_placement: AllDayPlacement::TopOfDay,
            past_due_header: false,
            tasks_without_dates: TasksWithoutDates::EndOfList,
            show_days_without_events: false,
        }
    }
}

impl From<&WidgetSettings> for SequenceOptions {
    fn from(settings: &WidgetSettings) -> Self {
        Self {
            show_day_headers: settings.show_day_headers,
            show_current_time: settings.show_current_time,
            all_day_placement: settings.all_day_placement,
            past_due_header: settings.show_past_events_under_one_header,
            tasks_without_dates: settings.tasks_without_dates,
            show_days_without_events: settings.show_days_without_events,
        }
    }
}

impl SequenceOptions {
    /// Options without any marker besides the footer.
    pub fn bare() -> Self {
        Self {
            show_day_headers: false,
            show_current_time: false,
            ..Self::default()
        }
    }

    /// Builder method to toggle day headers.
    #[must_use]
    pub fn with_day_headers(mut self, show: bool) -> Self {
        self.show_day_headers = show;
        self
    }

    /// Builder method to toggle the current-time marker.
    #[must_use]
    pub fn with_current_time(mut self, show: bool) -> Self {
        self.show_current_time = show;
        self
    }

    /// Builder method to set the all-day placement.
    #[must_use]
    pub fn with_all_day_placement(mut self, placement: AllDayPlacement) -> Self {
        self.all_day_placement = placement;
        self
    }

    /// Builder method to toggle the past and due section.
    #[must_use]
    pub fn with_past_due_header(mut self, show: bool) -> Self {
        self.past_due_header = show;
        self
    }

    /// Builder method to set the section of tasks without dates.
    #[must_use]
    pub fn with_tasks_without_dates(mut self, placement: TasksWithoutDates) -> Self {
        self.tasks_without_dates = placement;
        self
    }

    /// Builder method to toggle sections for days without entries.
    #[must_use]
    pub fn with_days_without_events(mut self, show: bool) -> Self {
        self.show_days_without_events = show;
        self
    }
}

/// Sections of the sequence, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    PastAndDue,
    Day(NaiveDate),
    EndOfList,
}

/// Within-section priority of entries at the end of today.
const END_OF_DAY: u8 = 2;

/// Total order of record entries within a section. Field order is the sort
/// order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey {
    priority: u8,
    start: DateTime<Utc>,
    title: String,
    source_id: String,
    id: String,
    end: Option<DateTime<Utc>>,
}

/// Run-wide facts needed to place an entry.
struct Layout<'a> {
    tz: &'a Tz,
    options: &'a SequenceOptions,
    first_day: NaiveDate,
    today: NaiveDate,
    today_start: DateTime<Utc>,
}

impl Layout<'_> {
    fn place(&self, entry: &WidgetEntry) -> Option<(Section, SortKey)> {
        let mut priority = match (entry.is_all_day_like(), self.options.all_day_placement) {
            (true, AllDayPlacement::TopOfDay) | (false, AllDayPlacement::BottomOfDay) => 0,
            _ => 1,
        };
        let past = self.options.past_due_header;
        let section = match entry {
            WidgetEntry::Task(task) if task.undated => match self.options.tasks_without_dates {
                TasksWithoutDates::EndOfToday => {
                    priority = END_OF_DAY;
                    Section::Day(self.today)
                }
                TasksWithoutDates::EndOfList | TasksWithoutDates::Hide => Section::EndOfList,
            },
            WidgetEntry::Task(task) if past && task.due_date < self.today => Section::PastAndDue,
            WidgetEntry::Event(event)
                if past
                    && event.start < self.today_start
                    && event.end.unwrap_or(event.start) <= self.today_start =>
            {
                Section::PastAndDue
            }
            _ => Section::Day(entry.date(self.tz)?.max(self.first_day)),
        };
        let end = match entry {
            WidgetEntry::Event(event) => event.end,
            _ => None,
        };
        let key = SortKey {
            priority,
            start: entry.start()?,
            title: entry.title()?.to_string(),
            source_id: entry.source_id()?.to_string(),
            id: entry.record_id()?.to_string(),
            end,
        };
        Some((section, key))
    }
}

/// Orders entries and inserts section headers, the current-time marker and
/// the footer.
///
/// Only event and task entries are taken from `entries`; structural entries
/// in the input are discarded and regenerated.
pub fn sequence(
    entries: Vec<WidgetEntry>,
    now: DateTime<Utc>,
    range: &VisibleRange,
    tz: &Tz,
    options: &SequenceOptions,
) -> Vec<WidgetEntry> {
    let today = local_date(now, tz);
    let layout = Layout {
        tz,
        options,
        first_day: range.first_day(tz),
        today,
        today_start: start_of_day(today, tz),
    };

    let mut sections: BTreeMap<Section, Vec<(SortKey, WidgetEntry)>> = BTreeMap::new();
    let mut record_count = 0;
    for entry in entries {
        if let Some((section, key)) = layout.place(&entry) {
            sections.entry(section).or_default().push((key, entry));
            record_count += 1;
        }
    }

    if record_count > 0 && options.show_day_headers && options.show_days_without_events {
        let mut day = layout.first_day;
        for _ in 0..MAX_RANGE_DAYS {
            if start_of_day(day, tz) >= range.end {
                break;
            }
            sections.entry(Section::Day(day)).or_default();
            day = add_days(day, 1);
        }
    }

    let mut marker_pending = options.show_current_time && record_count > 0 && range.contains(now);
    if marker_pending {
        sections.entry(Section::Day(today)).or_default();
    }

    let mut output = Vec::with_capacity(record_count + sections.len() + 2);
    for (section, mut items) in sections {
        if options.show_day_headers {
            output.push(match section {
                Section::PastAndDue => WidgetEntry::PastDueHeader,
                Section::Day(date) => WidgetEntry::DayHeader { date },
                Section::EndOfList => WidgetEntry::EndOfListHeader,
            });
        }
        items.sort_by(|(a, _), (b, _)| a.cmp(b));
        let is_today = section == Section::Day(today);
        for (key, entry) in items {
            if marker_pending && is_today && (key.start >= now || key.priority == END_OF_DAY) {
                output.push(WidgetEntry::CurrentTime { instant: now });
                marker_pending = false;
            }
            output.push(entry);
        }
        if marker_pending && is_today {
            output.push(WidgetEntry::CurrentTime { instant: now });
            marker_pending = false;
        }
    }

    let kind = if output.is_empty() {
        FooterKind::NoEvents
    } else {
        FooterKind::EndOfList
    };
    output.push(WidgetEntry::ListFooter { kind });

    debug!(records = record_count, entries = output.len(), "Sequenced entries");
    output
}
