//! Position assigner: tags every entry of the final sequence.

use agenda_core::entry::{EntryPosition, PositionedEntry, WidgetEntry};

/// Returns the position of the entry at `index`.
///
/// The footer is always [`EntryPosition::ListFooter`], even at index 0. Any
/// other entry at index 0 is the [`EntryPosition::ListHeader`], which takes
/// precedence over [`EntryPosition::CurrentTime`].
pub fn position_of(index: usize, entry: &WidgetEntry) -> EntryPosition {
    if entry.is_footer() {
        EntryPosition::ListFooter
    } else if index == 0 {
        EntryPosition::ListHeader
    } else if entry.is_current_time() {
        EntryPosition::CurrentTime
    } else {
        EntryPosition::ListEntry
    }
}

/// Pairs each entry with its index and position. Order and count are kept.
pub fn assign_positions(entries: Vec<WidgetEntry>) -> Vec<PositionedEntry> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| PositionedEntry {
            index,
            position: position_of(index, &entry),
            entry,
        })
        .collect()
}
