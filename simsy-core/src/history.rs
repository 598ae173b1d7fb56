use std::collections::HashSet;

use simsy_model::{HistoryEntry, ShowID};

pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Most recently watched shows, newest first, each show listed once.
pub fn latest_unique(entries: &[HistoryEntry], limit: usize) -> Vec<ShowID> {
    let mut sorted: Vec<&HistoryEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.watched_at.cmp(&a.watched_at));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|entry| seen.insert(entry.show_id))
        .map(|entry| entry.show_id)
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn entry(show: i64, minutes: i64) -> HistoryEntry {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        HistoryEntry::new(ShowID(show), base + Duration::minutes(minutes))
    }

    #[test]
    fn newest_first_without_duplicates() {
        let entries = vec![entry(1, 0), entry(2, 5), entry(1, 10), entry(3, 7)];
        assert_eq!(
            latest_unique(&entries, 10),
            vec![ShowID(1), ShowID(3), ShowID(2)]
        );
    }

    #[test]
    fn truncates_after_deduplication() {
        let entries: Vec<_> = (0..15)
            .flat_map(|i| [entry(i, i * 2), entry(i, i * 2 + 1)])
            .collect();
        let latest = latest_unique(&entries, DEFAULT_HISTORY_LIMIT);
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0], ShowID(14));
        assert_eq!(latest[9], ShowID(5));
    }

    #[test]
    fn empty_history() {
        assert!(latest_unique(&[], 10).is_empty());
    }
}
