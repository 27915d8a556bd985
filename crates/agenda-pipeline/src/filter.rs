//! Record filters.
//!
//! Every filter takes an ordered sequence of normalized records and returns
//! the kept ones in their original relative order. None of them reorders,
//! duplicates or modifies records.

use std::collections::HashMap;

use agenda_core::record::{NormalizedRecord, RecordKind};
use agenda_core::settings::HideSubtasks;
use agenda_core::time::VisibleRange;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::keywords::KeywordsFilter;

/// Keeps records overlapping the visible range.
///
/// A record `[start, end)` is kept iff it overlaps `[range.start, range.end)`;
/// a record without end (or with zero length) is kept iff its start lies in
/// the range. Multi-day records are kept whole. Undated tasks have no place
/// on the timeline and are always kept.
pub fn filter_by_range(
    records: Vec<NormalizedRecord>,
    range: &VisibleRange,
) -> Vec<NormalizedRecord> {
    retain_in_range(records, range, None)
}

/// Like [`filter_by_range`], but also keeps incomplete tasks dated before
/// `today_start`.
pub fn filter_by_range_keeping_overdue(
    records: Vec<NormalizedRecord>,
    range: &VisibleRange,
    today_start: DateTime<Utc>,
) -> Vec<NormalizedRecord> {
    retain_in_range(records, range, Some(today_start))
}

fn retain_in_range(
    records: Vec<NormalizedRecord>,
    range: &VisibleRange,
    overdue_before: Option<DateTime<Utc>>,
) -> Vec<NormalizedRecord> {
    let before = records.len();
    let kept: Vec<_> = records
        .into_iter()
        .filter(|record| {
            record.undated
                || range.overlaps(record.start, record.end)
                || overdue_before.is_some_and(|today_start| record.is_overdue_at(today_start))
        })
        .collect();
    debug!(
        before,
        after = kept.len(),
        range_start = %range.start,
        range_end = %range.end,
        "Range filter"
    );
    kept
}

/// Applies the subtask visibility policy.
///
/// [`HideSubtasks::HideAll`] removes tasks deeper than the top level;
/// [`HideSubtasks::ShowAll`] keeps everything.
pub fn filter_subtasks(
    records: Vec<NormalizedRecord>,
    policy: HideSubtasks,
) -> Vec<NormalizedRecord> {
    match policy {
        HideSubtasks::ShowAll => records,
        HideSubtasks::HideAll => {
            let before = records.len();
            let kept: Vec<_> = records.into_iter().filter(|r| !r.is_subtask()).collect();
            debug!(before, after = kept.len(), "Subtask filter");
            kept
        }
    }
}

/// Removes completed tasks unless `show_completed` is set.
pub fn filter_completed(
    records: Vec<NormalizedRecord>,
    show_completed: bool,
) -> Vec<NormalizedRecord> {
    if show_completed {
        return records;
    }
    records
        .into_iter()
        .filter(|r| !(r.is_task() && r.completed))
        .collect()
}

/// Applies the hide and show keyword lists to record titles.
///
/// A record is removed when its title contains any hide keyword. When show
/// keywords exist, only records whose title contains one of them are kept.
pub fn filter_by_keywords(
    records: Vec<NormalizedRecord>,
    hide: &KeywordsFilter,
    show: &KeywordsFilter,
) -> Vec<NormalizedRecord> {
    if hide.is_empty() && show.is_empty() {
        return records;
    }
    let before = records.len();
    let kept: Vec<_> = records
        .into_iter()
        .filter(|r| !hide.matched(&r.title, false) && show.matched(&r.title, true))
        .collect();
    debug!(before, after = kept.len(), %hide, %show, "Keyword filter");
    kept
}

/// Keeps only the closest occurrence of every recurring record.
///
/// For each recurring id the first occurrence that has not ended at `now` is
/// kept; if every occurrence has ended, the latest one is kept instead.
/// Non-recurring records pass through.
pub fn filter_closest_instances(
    records: Vec<NormalizedRecord>,
    now: DateTime<Utc>,
) -> Vec<NormalizedRecord> {
    // index of the chosen occurrence per recurring id
    let mut chosen: HashMap<&str, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate().filter(|(_, r)| r.recurring) {
        match chosen.get(record.id.as_str()).copied() {
            None => {
                chosen.insert(&record.id, index);
            }
            Some(current) => {
                let current_record = &records[current];
                if is_closer(record, current_record, now) {
                    chosen.insert(&record.id, index);
                }
            }
        }
    }

    let keep: Vec<bool> = records
        .iter()
        .enumerate()
        .map(|(index, r)| !r.recurring || chosen.get(r.id.as_str()) == Some(&index))
        .collect();

    let before = records.len();
    let kept: Vec<_> = records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect();
    debug!(before, after = kept.len(), "Closest instance filter");
    kept
}

type DuplicateKey<'a> = (RecordKind, DateTime<Utc>, Option<DateTime<Utc>>, bool, &'a str);

/// Removes records repeating the kind, start, end, all-day flag and title of
/// another record.
///
/// Of each group of duplicates the record with the smallest
/// `(source_id, id)` is kept, so the outcome does not depend on the order
/// providers returned them in. Kept records stay in their original order.
pub fn filter_duplicates(records: Vec<NormalizedRecord>) -> Vec<NormalizedRecord> {
    let mut chosen: HashMap<DuplicateKey<'_>, usize> = HashMap::new();
    for (index, record) in records.iter().enumerate() {
        let key = (
            record.kind,
            record.start,
            record.end,
            record.all_day,
            record.title.as_str(),
        );
        chosen
            .entry(key)
            .and_modify(|current| {
                let kept = &records[*current];
                if (&record.source_id, &record.id) < (&kept.source_id, &kept.id) {
                    *current = index;
                }
            })
            .or_insert(index);
    }

    let mut keep = vec![false; records.len()];
    for index in chosen.into_values() {
        keep[index] = true;
    }

    let before = records.len();
    let kept: Vec<_> = records
        .into_iter()
        .zip(keep)
        .filter_map(|(record, keep)| keep.then_some(record))
        .collect();
    debug!(before, after = kept.len(), "Duplicate filter");
    kept
}

fn is_closer(candidate: &NormalizedRecord, current: &NormalizedRecord, now: DateTime<Utc>) -> bool {
    match (candidate.is_pending_at(now), current.is_pending_at(now)) {
        (true, true) => candidate.start < current.start,
        (true, false) => true,
        (false, true) => false,
        (false, false) => candidate.start > current.start,
    }
}
