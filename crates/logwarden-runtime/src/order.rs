//! Chronological ordering of fetched entries.

use logwarden_core::LogEntry;

/// Sort entries by timestamp, earliest first.
///
/// The sort is stable: entries sharing a timestamp keep their retrieval order.
pub fn order_entries(mut entries: Vec<LogEntry>) -> Vec<LogEntry> {
    entries.sort_by_key(|entry| entry.timestamp);
    entries
}
