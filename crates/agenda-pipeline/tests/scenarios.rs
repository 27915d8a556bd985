//! End-to-end agenda runs for a fixed set of provider results.

use agenda_core::entry::{EntryPosition, FooterKind, PositionedEntry, WidgetEntry};
use agenda_core::raw::RawRecord;
use agenda_core::settings::{EventRange, WidgetSettings};
use agenda_pipeline::run_pipeline;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Settings with only the footer as structural marker.
fn bare(range: EventRange) -> WidgetSettings {
    WidgetSettings::default()
        .with_time_zone("UTC")
        .with_event_range(range)
        .with_day_headers(false)
        .with_current_time(false)
}

fn records_from_json(json: &str) -> Vec<RawRecord> {
    serde_json::from_str(json).unwrap()
}

fn footer_index(entries: &[PositionedEntry]) -> usize {
    let footers: Vec<_> = entries.iter().filter(|p| p.entry.is_footer()).collect();
    assert_eq!(footers.len(), 1, "exactly one footer");
    let footer = footers[0];
    assert_eq!(footer.index, entries.len() - 1, "footer is last");
    assert_eq!(footer.position, EntryPosition::ListFooter);
    footer.index
}

fn summary(entries: &[PositionedEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|p| match &p.entry {
            WidgetEntry::PastDueHeader => "past and due".to_string(),
            WidgetEntry::DayHeader { date } => format!("header {date}"),
            WidgetEntry::EndOfListHeader => "no date".to_string(),
            WidgetEntry::CurrentTime { .. } => "now".to_string(),
            WidgetEntry::ListFooter { .. } => "footer".to_string(),
            other => other.title().unwrap_or_default().to_string(),
        })
        .collect()
}

fn task_ids(entries: &[PositionedEntry]) -> Vec<&str> {
    entries
        .iter()
        .filter_map(|p| match &p.entry {
            WidgetEntry::Task(task) => Some(task.id.as_str()),
            _ => None,
        })
        .collect()
}

mod two_tasks {
    use super::*;

    const RECORDS: &str = r#"[
        {"id": "today", "kind": "task", "title": "Send report", "end": "2025-02-05", "source_id": "todo"},
        {"id": "tomorrow", "kind": "task", "title": "Water plants", "end": "2025-02-06", "source_id": "todo"}
    ]"#;

    fn now() -> DateTime<Utc> {
        utc(2025, 2, 5, 10, 0, 0)
    }

    #[test]
    fn today_only() {
        let records = records_from_json(RECORDS);
        let entries = run_pipeline(&records, now(), &bare(EventRange::Today));

        assert_eq!(task_ids(&entries), vec!["today"]);
        assert_eq!(footer_index(&entries), 1);
        assert_eq!(entries[0].position, EntryPosition::ListHeader);
        assert_eq!(
            entries[1].entry,
            WidgetEntry::ListFooter {
                kind: FooterKind::EndOfList
            }
        );
    }

    #[test]
    fn today_and_tomorrow() {
        let entries = run_pipeline(
            &records_from_json(RECORDS),
            now(),
            &bare(EventRange::TodayAndTomorrow),
        );

        assert_eq!(task_ids(&entries), vec!["today", "tomorrow"]);
        assert_eq!(footer_index(&entries), 2);
        assert_eq!(entries[1].position, EntryPosition::ListEntry);
    }

    #[test]
    fn switching_range_moves_footer() {
        let records = records_from_json(RECORDS);
        let before = run_pipeline(&records, now(), &bare(EventRange::Today));
        let after = run_pipeline(&records, now(), &bare(EventRange::TodayAndTomorrow));
        assert_eq!(footer_index(&before) + 1, footer_index(&after));
    }
}

mod week_of_tasks {
    use super::*;

    // Feb 4 is "today"; the seven-day window covers Feb 4 up to Feb 11.
    fn records() -> Vec<RawRecord> {
        let due_days = [5, 5, 6, 6, 7, 7, 8, 9, 9, 10, 12];
        due_days
            .iter()
            .enumerate()
            .map(|(i, day)| {
                RawRecord::task(format!("task-{i:02}"))
                    .with_title(format!("Task {i}"))
                    .with_due(date(2025, 2, *day))
            })
            .collect()
    }

    fn now() -> DateTime<Utc> {
        utc(2025, 2, 4, 9, 0, 0)
    }

    #[test]
    fn week_window() {
        let entries = run_pipeline(&records(), now(), &bare(EventRange::Days(7)));

        assert_eq!(footer_index(&entries), 10);
        assert!(entries[..10].iter().all(|p| p.entry.is_record()));
        assert!(!task_ids(&entries).contains(&"task-10"));
    }

    #[test]
    fn today_only_with_nothing_due() {
        let entries = run_pipeline(&records(), now(), &bare(EventRange::Today));

        assert_eq!(footer_index(&entries), 0);
        assert_eq!(
            entries[0].entry,
            WidgetEntry::ListFooter {
                kind: FooterKind::NoEvents
            }
        );
    }

    #[test]
    fn tasks_follow_due_dates() {
        let entries = run_pipeline(&records(), now(), &bare(EventRange::Days(7)));
        let dates: Vec<_> = entries
            .iter()
            .filter_map(|p| match &p.entry {
                WidgetEntry::Task(task) => Some(task.due_date),
                _ => None,
            })
            .collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted);
    }
}

mod empty_input {
    use super::*;

    #[test]
    fn footer_only_for_every_range() {
        let ranges = [
            EventRange::Today,
            EventRange::TodayAndTomorrow,
            EventRange::Days(30),
            EventRange::CurrentWeek,
            EventRange::Custom {
                start: utc(2025, 2, 5, 8, 0, 0),
                hours: 4,
            },
        ];
        for range in ranges {
            let settings = WidgetSettings::default().with_event_range(range);
            let entries = run_pipeline(&[], utc(2025, 2, 5, 10, 0, 0), &settings);
            assert_eq!(entries.len(), 1, "range {:?}", range);
            assert_eq!(entries[0].index, 0);
            assert_eq!(entries[0].position, EntryPosition::ListFooter);
            assert_eq!(
                entries[0].entry,
                WidgetEntry::ListFooter {
                    kind: FooterKind::NoEvents
                }
            );
        }
    }

    #[test]
    fn empty_json_array() {
        let entries = run_pipeline(
            &records_from_json("[]"),
            utc(2025, 2, 5, 10, 0, 0),
            &bare(EventRange::Today),
        );
        assert_eq!(footer_index(&entries), 0);
    }
}

mod mixed_day {
    use super::*;

    const RECORDS: &str = r#"[
        {"id": "lunch", "title": "Lunch", "start": "2025-02-05T12:00:00Z", "end": "2025-02-05T13:00:00Z", "source_id": "home"},
        {"id": "standup", "title": "Standup", "start": "2025-02-03T09:00:00Z", "end": "2025-02-03T09:15:00Z", "recurrence": "RRULE:FREQ=DAILY;COUNT=10", "source_id": "work"},
        {"id": "holiday", "title": "Holiday", "start": "2025-02-05", "end": "2025-02-06", "all_day": true, "source_id": "home"},
        {"id": "untitled", "start": "2025-02-05T16:00:00Z", "source_id": "work"},
        {"id": "no-start", "title": "Broken", "source_id": "work"}
    ]"#;

    fn now() -> DateTime<Utc> {
        utc(2025, 2, 5, 10, 0, 0)
    }

    #[test]
    fn ordering_and_markers() {
        let settings = WidgetSettings::default()
            .with_time_zone("UTC")
            .with_event_range(EventRange::Today);
        let entries = run_pipeline(&records_from_json(RECORDS), now(), &settings);

        assert_eq!(
            summary(&entries),
            vec![
                "header 2025-02-05",
                "Holiday",
                "Standup",
                "now",
                "Lunch",
                "(No title)",
                "footer",
            ]
        );
        assert_eq!(entries[3].position, EntryPosition::CurrentTime);
    }

    #[test]
    fn bottom_of_day_placement() {
        let settings = bare(EventRange::Today)
            .with_all_day_placement(agenda_core::settings::AllDayPlacement::BottomOfDay);
        let entries = run_pipeline(&records_from_json(RECORDS), now(), &settings);
        let titles: Vec<_> = entries.iter().filter_map(|p| p.entry.title()).collect();
        assert_eq!(titles, vec!["Standup", "Lunch", "(No title)", "Holiday"]);
    }
}

mod past_and_due {
    use super::*;
    use agenda_core::settings::TasksWithoutDates;

    const RECORDS: &str = r#"[
        {"id": "overdue", "kind": "task", "title": "Call plumber", "end": "2025-02-03", "source_id": "todo"},
        {"id": "finished", "kind": "task", "title": "Pay rent", "end": "2025-02-01", "completed": true, "source_id": "todo"},
        {"id": "someday", "kind": "task", "title": "Learn the cello", "source_id": "todo"},
        {"id": "review", "title": "Review", "start": "2025-02-05T14:00:00Z", "end": "2025-02-05T15:00:00Z", "source_id": "work"}
    ]"#;

    fn now() -> DateTime<Utc> {
        utc(2025, 2, 5, 10, 0, 0)
    }

    #[test]
    fn overdue_and_undated_sections() {
        let settings = WidgetSettings::default()
            .with_time_zone("UTC")
            .with_event_range(EventRange::Today)
            .with_past_events_under_one_header(true);
        let entries = run_pipeline(&records_from_json(RECORDS), now(), &settings);

        assert_eq!(
            summary(&entries),
            vec![
                "past and due",
                "Call plumber",
                "header 2025-02-05",
                "now",
                "Review",
                "no date",
                "Learn the cello",
                "footer",
            ]
        );
        assert_eq!(entries[0].position, EntryPosition::ListHeader);
        assert_eq!(footer_index(&entries), 7);
    }

    #[test]
    fn overdue_tasks_are_dropped_without_the_header() {
        let entries = run_pipeline(&records_from_json(RECORDS), now(), &bare(EventRange::Today));

        assert_eq!(task_ids(&entries), vec!["someday"]);
    }

    #[test]
    fn undated_tasks_can_close_today() {
        let settings = bare(EventRange::TodayAndTomorrow)
            .with_tasks_without_dates(TasksWithoutDates::EndOfToday);
        let records = vec![
            RawRecord::task("someday").with_title("Learn the cello"),
            RawRecord::event("review", utc(2025, 2, 5, 14, 0, 0)).with_title("Review"),
            RawRecord::event("retro", utc(2025, 2, 6, 9, 0, 0)).with_title("Retro"),
        ];
        let entries = run_pipeline(&records, now(), &settings);

        assert_eq!(summary(&entries), vec!["Review", "Learn the cello", "Retro", "footer"]);
    }
}
