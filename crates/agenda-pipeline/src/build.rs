//! Entry builder: one widget entry per normalized record.

use agenda_core::entry::WidgetEntry;
use agenda_core::record::NormalizedRecord;

/// Maps each record to an event or task entry.
///
/// The mapping is one-to-one and order-preserving; nothing is filtered here.
pub fn build_entries(records: &[NormalizedRecord]) -> Vec<WidgetEntry> {
    records.iter().map(WidgetEntry::from_record).collect()
}
