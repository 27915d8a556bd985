//! Per-widget settings.
//!
//! Every widget instance owns a [`WidgetSettings`] value. The pipeline never
//! reads settings from global state: callers hand it a [`SettingsRepository`]
//! (or the settings themselves) on every run.
//!
//! Enumerated settings are persisted as strings. Parsing is total: an unknown
//! or malformed value falls back to the documented default instead of failing,
//! so a stale or hand-edited settings file can never stop a widget from
//! rendering.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Months, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::time::{VisibleRange, add_days, local_date, start_of_day, start_of_week};

/// Identifier of a widget instance.
pub type WidgetId = u32;

/// Longest day-count range a user can configure.
pub const MAX_RANGE_DAYS: u32 = 366;

/// Longest custom range, in hours.
pub const MAX_RANGE_HOURS: u32 = MAX_RANGE_DAYS * 24;

/// Errors that can occur while reading persisted settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings document is not valid JSON or has the wrong shape.
    #[error("failed to parse widget settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The configured visible range selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventRange {
    /// Today only.
    Today,
    /// Today and tomorrow.
    TodayAndTomorrow,
    /// `N` whole days starting today.
    Days(u32),
    /// The current calendar week.
    CurrentWeek,
    /// A fixed start instant and a duration in hours.
    Custom {
        /// Start of the range.
        start: DateTime<Utc>,
        /// Length of the range in hours.
        hours: u32,
    },
}

impl Default for EventRange {
    fn default() -> Self {
        Self::Days(30)
    }
}

impl EventRange {
    /// Parses a persisted value, falling back to the default.
    ///
    /// Accepted values: `today` (or `0`), `today_and_tomorrow` (or `-1`),
    /// `week`, a positive day count, and `custom:<rfc3339 start>/<hours>`.
    pub fn from_value(value: &str) -> Self {
        let value = value.trim();
        match value {
            "today" | "0" => return Self::Today,
            "today_and_tomorrow" | "-1" => return Self::TodayAndTomorrow,
            "week" | "current_week" => return Self::CurrentWeek,
            _ => {}
        }
        if let Some(custom) = value.strip_prefix("custom:") {
            return Self::parse_custom(custom).unwrap_or_default();
        }
        match value.parse::<u32>() {
            Ok(days) if days > 0 => Self::Days(days.min(MAX_RANGE_DAYS)),
            _ => Self::default(),
        }
    }

    fn parse_custom(value: &str) -> Option<Self> {
        let (start, hours) = value.rsplit_once('/')?;
        let start = DateTime::parse_from_rfc3339(start).ok()?.with_timezone(&Utc);
        let hours = hours.trim_end_matches('h').parse::<u32>().ok()?;
        Some(Self::Custom {
            start,
            hours: hours.min(MAX_RANGE_HOURS),
        })
    }

    /// Returns the persisted value of this selection.
    pub fn value(&self) -> String {
        match self {
            Self::Today => "today".to_string(),
            Self::TodayAndTomorrow => "today_and_tomorrow".to_string(),
            Self::Days(days) => days.to_string(),
            Self::CurrentWeek => "week".to_string(),
            Self::Custom { start, hours } => format!("custom:{}/{}", start.to_rfc3339(), hours),
        }
    }

    /// Resolves the selection against `now` in `tz`.
    pub fn resolve(&self, now: DateTime<Utc>, tz: &Tz, week_start: Weekday) -> VisibleRange {
        let today = local_date(now, tz);
        match *self {
            Self::Today => VisibleRange::for_days(today, 1, tz),
            Self::TodayAndTomorrow => VisibleRange::for_days(today, 2, tz),
            Self::Days(days) => VisibleRange::for_days(today, days.clamp(1, MAX_RANGE_DAYS), tz),
            Self::CurrentWeek => VisibleRange::for_days(start_of_week(today, week_start), 7, tz),
            Self::Custom { start, hours } => VisibleRange::from_duration(
                start,
                Duration::hours(i64::from(hours.min(MAX_RANGE_HOURS))),
            ),
        }
    }
}

impl From<String> for EventRange {
    fn from(value: String) -> Self {
        Self::from_value(&value)
    }
}

impl From<EventRange> for String {
    fn from(range: EventRange) -> Self {
        range.value()
    }
}

/// Subtask visibility policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HideSubtasks {
    /// Show tasks at every depth.
    #[default]
    ShowAll,
    /// Show top-level tasks only.
    HideAll,
}

impl HideSubtasks {
    /// Parses a persisted value, falling back to [`HideSubtasks::ShowAll`].
    pub fn from_value(value: &str) -> Self {
        match value.trim() {
            "hide_all" => Self::HideAll,
            "show_all" => Self::ShowAll,
            _ => Self::default(),
        }
    }

    /// Returns the persisted value.
    pub fn value(&self) -> &'static str {
        match self {
            Self::ShowAll => "show_all",
            Self::HideAll => "hide_all",
        }
    }
}

impl From<String> for HideSubtasks {
    fn from(value: String) -> Self {
        Self::from_value(&value)
    }
}

impl From<HideSubtasks> for String {
    fn from(policy: HideSubtasks) -> Self {
        policy.value().to_string()
    }
}

/// Where all-day events and tasks go within a day's section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AllDayPlacement {
    /// Before the day's timed events.
    #[default]
    TopOfDay,
    /// After the day's timed events.
    BottomOfDay,
}

impl AllDayPlacement {
    /// Parses a persisted value, falling back to [`AllDayPlacement::TopOfDay`].
    pub fn from_value(value: &str) -> Self {
        match value.trim() {
            "bottom_day" => Self::BottomOfDay,
            "top_day" => Self::TopOfDay,
            _ => Self::default(),
        }
    }

    /// Returns the persisted value.
    pub fn value(&self) -> &'static str {
        match self {
            Self::TopOfDay => "top_day",
            Self::BottomOfDay => "bottom_day",
        }
    }
}

impl From<String> for AllDayPlacement {
    fn from(value: String) -> Self {
        Self::from_value(&value)
    }
}

impl From<AllDayPlacement> for String {
    fn from(placement: AllDayPlacement) -> Self {
        placement.value().to_string()
    }
}

/// First day of the week, used by [`EventRange::CurrentWeek`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WeekStart {
    /// Monday (ISO 8601).
    #[default]
    Monday,
    /// Sunday.
    Sunday,
    /// Saturday.
    Saturday,
}

impl WeekStart {
    /// Parses a persisted value, falling back to [`WeekStart::Monday`].
    pub fn from_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "sunday" => Self::Sunday,
            "saturday" => Self::Saturday,
            _ => Self::default(),
        }
    }

    /// Returns the persisted value.
    pub fn value(&self) -> &'static str {
        match self {
            Self::Monday => "monday",
            Self::Sunday => "sunday",
            Self::Saturday => "saturday",
        }
    }

    /// Returns the corresponding weekday.
    pub fn weekday(&self) -> Weekday {
        match self {
            Self::Monday => Weekday::Mon,
            Self::Sunday => Weekday::Sun,
            Self::Saturday => Weekday::Sat,
        }
    }
}

impl From<String> for WeekStart {
    fn from(value: String) -> Self {
        Self::from_value(&value)
    }
}

impl From<WeekStart> for String {
    fn from(start: WeekStart) -> Self {
        start.value().to_string()
    }
}

/// Where tasks without start and due dates are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TasksWithoutDates {
    /// In a section of their own after the last day.
    #[default]
    EndOfList,
    /// At the end of today's section.
    EndOfToday,
    /// Not at all.
    Hide,
}

impl TasksWithoutDates {
    /// Parses a persisted value, falling back to [`TasksWithoutDates::EndOfList`].
    pub fn from_value(value: &str) -> Self {
        match value.trim() {
            "end_of_today" => Self::EndOfToday,
            "hide" => Self::Hide,
            _ => Self::default(),
        }
    }

    /// Returns the persisted value.
    pub fn value(&self) -> &'static str {
        match self {
            Self::EndOfList => "end_of_list",
            Self::EndOfToday => "end_of_today",
            Self::Hide => "hide",
        }
    }

    /// Returns true unless undated tasks are hidden.
    pub fn is_shown(&self) -> bool {
        *self != Self::Hide
    }
}

impl From<String> for TasksWithoutDates {
    fn from(value: String) -> Self {
        Self::from_value(&value)
    }
}

impl From<TasksWithoutDates> for String {
    fn from(placement: TasksWithoutDates) -> Self {
        placement.value().to_string()
    }
}

/// Which task date decides the day a task is listed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskScheduling {
    /// The due date, falling back to the start date.
    #[default]
    DateDue,
    /// The start date, falling back to the due date.
    DateStarted,
}

impl TaskScheduling {
    /// Parses a persisted value, falling back to [`TaskScheduling::DateDue`].
    pub fn from_value(value: &str) -> Self {
        match value.trim() {
            "date_started" => Self::DateStarted,
            _ => Self::default(),
        }
    }

    /// Returns the persisted value.
    pub fn value(&self) -> &'static str {
        match self {
            Self::DateDue => "date_due",
            Self::DateStarted => "date_started",
        }
    }
}

impl From<String> for TaskScheduling {
    fn from(value: String) -> Self {
        Self::from_value(&value)
    }
}

impl From<TaskScheduling> for String {
    fn from(scheduling: TaskScheduling) -> Self {
        scheduling.value().to_string()
    }
}

/// How long ago an event may have ended and still be listed.
///
/// A threshold earlier than the start of the visible range moves the range
/// start back to it. A later threshold has no effect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EventsEnded {
    #[default]
    None,
    OneHour,
    TwoHours,
    FourHours,
    Today,
    Yesterday,
    OneWeek,
    TwoWeeks,
    OneMonth,
    TwoMonths,
    ThreeMonths,
    SixMonths,
    OneYear,
}

impl EventsEnded {
    const ALL: [Self; 13] = [
        Self::None,
        Self::OneHour,
        Self::TwoHours,
        Self::FourHours,
        Self::Today,
        Self::Yesterday,
        Self::OneWeek,
        Self::TwoWeeks,
        Self::OneMonth,
        Self::TwoMonths,
        Self::ThreeMonths,
        Self::SixMonths,
        Self::OneYear,
    ];

    /// Parses a persisted value (case-insensitive), falling back to
    /// [`EventsEnded::None`].
    pub fn from_value(value: &str) -> Self {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|item| item.value().eq_ignore_ascii_case(value))
            .unwrap_or_default()
    }

    /// Returns the persisted value.
    pub fn value(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OneHour => "one_hour",
            Self::TwoHours => "two_hours",
            Self::FourHours => "four_hours",
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::OneWeek => "one_week",
            Self::TwoWeeks => "two_weeks",
            Self::OneMonth => "one_month",
            Self::TwoMonths => "two_months",
            Self::ThreeMonths => "three_months",
            Self::SixMonths => "six_months",
            Self::OneYear => "one_year",
        }
    }

    /// Returns the earliest end instant an event may have, or `None` when
    /// ended events are not kept.
    pub fn ended_at(&self, now: DateTime<Utc>, tz: &Tz) -> Option<DateTime<Utc>> {
        let today = local_date(now, tz);
        let hours_ago = |hours: i64| now.checked_sub_signed(Duration::hours(hours));
        let days_ago = |days: i64| Some(start_of_day(add_days(today, -days), tz));
        let months_ago = |months: u32| {
            today
                .checked_sub_months(Months::new(months))
                .map(|date| start_of_day(date, tz))
        };
        match self {
            Self::None => None,
            Self::OneHour => hours_ago(1),
            Self::TwoHours => hours_ago(2),
            Self::FourHours => hours_ago(4),
            Self::Today => days_ago(0),
            Self::Yesterday => days_ago(1),
            Self::OneWeek => days_ago(7),
            Self::TwoWeeks => days_ago(14),
            Self::OneMonth => months_ago(1),
            Self::TwoMonths => months_ago(2),
            Self::ThreeMonths => months_ago(3),
            Self::SixMonths => months_ago(6),
            Self::OneYear => months_ago(12),
        }
    }
}

impl From<String> for EventsEnded {
    fn from(value: String) -> Self {
        Self::from_value(&value)
    }
}

impl From<EventsEnded> for String {
    fn from(ended: EventsEnded) -> Self {
        ended.value().to_string()
    }
}

/// Settings of one widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    /// IANA time zone the widget renders in (UTC when unset or unknown).
    pub time_zone: Option<String>,
    /// Visible range selection.
    pub event_range: EventRange,
    /// First day of the week.
    pub first_day_of_week: WeekStart,
    /// Subtask visibility.
    pub hide_subtasks: HideSubtasks,
    /// Whether completed tasks are shown.
    pub show_completed_tasks: bool,
    /// Where tasks without start or due date are shown.
    pub tasks_without_dates: TasksWithoutDates,
    /// Which task date decides the day a task is listed on.
    pub task_scheduling: TaskScheduling,
    /// Whether day headers are inserted.
    pub show_day_headers: bool,
    /// Whether the current-time indicator is inserted.
    pub show_current_time: bool,
    /// Placement of all-day events and tasks within a day.
    pub all_day_placement: AllDayPlacement,
    /// Records whose title contains any of these keywords are hidden.
    pub hide_keywords: String,
    /// When non-empty, only records whose title contains one of these keywords are shown.
    pub show_keywords: String,
    /// Show only the closest occurrence of each recurring record.
    pub show_only_closest_instance: bool,
    /// Hide records repeating the kind, title and time of an earlier one.
    pub hide_duplicates: bool,
    /// Keep events that ended up to this long ago.
    pub events_ended: EventsEnded,
    /// Collect past events and overdue tasks under one leading header.
    pub show_past_events_under_one_header: bool,
    /// Insert a header for every day of the range, even days without entries.
    pub show_days_without_events: bool,
    /// Recurrence look-ahead in days.
    pub recurrence_horizon_days: u32,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            time_zone: None,
            event_range: EventRange::default(),
            first_day_of_week: WeekStart::default(),
            hide_subtasks: HideSubtasks::default(),
            show_completed_tasks: true,
            tasks_without_dates: TasksWithoutDates::default(),
            task_scheduling: TaskScheduling::default(),
            show_day_headers: true,
            show_current_time: true,
            all_day_placement: AllDayPlacement::default(),
            hide_keywords: String::new(),
            show_keywords: String::new(),
            show_only_closest_instance: false,
            hide_duplicates: false,
            events_ended: EventsEnded::default(),
            show_past_events_under_one_header: false,
            show_days_without_events: false,
            recurrence_horizon_days: MAX_RANGE_DAYS,
        }
    }
}

impl WidgetSettings {
    /// Parses settings persisted as JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the settings to JSON.
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolves the configured time zone, falling back to UTC.
    pub fn zone(&self) -> Tz {
        match self.time_zone.as_deref().map(str::trim) {
            None | Some("") => Tz::UTC,
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(time_zone = %name, "Unknown time zone, using UTC");
                Tz::UTC
            }),
        }
    }

    /// Resolves the visible range for a run at `now`.
    pub fn visible_range(&self, now: DateTime<Utc>) -> VisibleRange {
        self.resolve_range(now, &self.zone())
    }

    /// Resolves the visible range in an already resolved zone.
    ///
    /// The configured [`EventRange`] is moved back to the
    /// [`EventsEnded`] threshold when that lies earlier.
    pub fn resolve_range(&self, now: DateTime<Utc>, tz: &Tz) -> VisibleRange {
        let range = self
            .event_range
            .resolve(now, tz, self.first_day_of_week.weekday());
        match self.events_ended.ended_at(now, tz) {
            Some(since) if since < range.start => VisibleRange::new(since, range.end),
            _ => range,
        }
    }

    /// Builder: set the time zone.
    #[must_use]
    pub fn with_time_zone(mut self, tz: impl Into<String>) -> Self {
        self.time_zone = Some(tz.into());
        self
    }

    /// Builder: set the event range.
    #[must_use]
    pub fn with_event_range(mut self, range: EventRange) -> Self {
        self.event_range = range;
        self
    }

    /// Builder: set the subtask policy.
    #[must_use]
    pub fn with_hide_subtasks(mut self, policy: HideSubtasks) -> Self {
        self.hide_subtasks = policy;
        self
    }

    /// Builder: show or hide completed tasks.
    #[must_use]
    pub fn with_show_completed_tasks(mut self, show: bool) -> Self {
        self.show_completed_tasks = show;
        self
    }

    /// Builder: set where tasks without dates go.
    #[must_use]
    pub fn with_tasks_without_dates(mut self, placement: TasksWithoutDates) -> Self {
        self.tasks_without_dates = placement;
        self
    }

    /// Builder: set the task scheduling date.
    #[must_use]
    pub fn with_task_scheduling(mut self, scheduling: TaskScheduling) -> Self {
        self.task_scheduling = scheduling;
        self
    }

    /// Builder: show or hide day headers.
    #[must_use]
    pub fn with_day_headers(mut self, show: bool) -> Self {
        self.show_day_headers = show;
        self
    }

    /// Builder: show or hide the current-time indicator.
    #[must_use]
    pub fn with_current_time(mut self, show: bool) -> Self {
        self.show_current_time = show;
        self
    }

    /// Builder: set the all-day placement.
    #[must_use]
    pub fn with_all_day_placement(mut self, placement: AllDayPlacement) -> Self {
        self.all_day_placement = placement;
        self
    }

    /// Builder: set the keyword filters.
    #[must_use]
    pub fn with_keywords(mut self, hide: impl Into<String>, show: impl Into<String>) -> Self {
        self.hide_keywords = hide.into();
        self.show_keywords = show.into();
        self
    }

    /// Builder: show only the closest occurrence of recurring records.
    #[must_use]
    pub fn with_only_closest_instance(mut self, only: bool) -> Self {
        self.show_only_closest_instance = only;
        self
    }

    #[must_use]
    pub fn with_hide_duplicates(mut self, hide: bool) -> Self {
        self.hide_duplicates = hide;
        self
    }

    #[must_use]
    pub fn with_events_ended(mut self, ended: EventsEnded) -> Self {
        self.events_ended = ended;
        self
    }

    #[must_use]
    pub fn with_past_events_under_one_header(mut self, show: bool) -> Self {
        self.show_past_events_under_one_header = show;
        self
    }

    #[must_use]
    pub fn with_days_without_events(mut self, show: bool) -> Self {
        self.show_days_without_events = show;
        self
    }
}

/// Source of per-widget settings.
pub trait SettingsRepository {
    /// Returns the settings of a widget, or the defaults for an unknown widget.
    fn settings_for(&self, widget_id: WidgetId) -> WidgetSettings;
}

/// A [`SettingsRepository`] backed by a map.
#[derive(Debug, Clone, Default)]
pub struct InMemorySettingsRepository {
    widgets: HashMap<WidgetId, WidgetSettings>,
}

impl InMemorySettingsRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the settings of a widget, replacing previous ones.
    pub fn insert(&mut self, widget_id: WidgetId, settings: WidgetSettings) {
        self.widgets.insert(widget_id, settings);
    }

    /// Builder: store the settings of a widget.
    #[must_use]
    pub fn with_widget(mut self, widget_id: WidgetId, settings: WidgetSettings) -> Self {
        self.insert(widget_id, settings);
        self
    }

    /// Returns the ids of all configured widgets, sorted.
    pub fn widget_ids(&self) -> Vec<WidgetId> {
        let mut ids: Vec<_> = self.widgets.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl SettingsRepository for InMemorySettingsRepository {
    fn settings_for(&self, widget_id: WidgetId) -> WidgetSettings {
        self.widgets.get(&widget_id).cloned().unwrap_or_default()
    }
}
