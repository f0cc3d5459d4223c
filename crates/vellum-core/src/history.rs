//! Version history
//!
//! The ledger holds up to [`HISTORY_LIMIT`] saved snapshots, newest first.
//! Each entry carries the [`VersionMeta`](crate::models::VersionMeta) it was
//! saved with.
//!
//! ## Version allocation
//!
//! The next version is one more than the highest version in the ledger.
//! Versions are parsed like `parseInt` would: leading digits, entries without
//! metadata or without digits count as `1`. Numbers too large for a `u64`
//! count as `u64::MAX`, and allocation saturates there.
//!
//! Deleting the entry that holds the maximum would let that number come back,
//! so the ledger also remembers the highest version it has seen this session
//! and never allocates at or below it. Only [`HistoryLedger::reset`] (clearing
//! history) restarts numbering.

use crate::models::{SiteContent, VersionMeta};

/// Maximum number of snapshots kept
pub const HISTORY_LIMIT: usize = 20;

/// Version of the first save, and of content that was never saved
pub const INITIAL_VERSION: &str = "1";

/// Parse a version string, `1` when it has no leading digits
pub fn parse_version(version: &str) -> u64 {
    let digits: String = version
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 1;
    }
    digits.parse().unwrap_or(u64::MAX)
}

/// Version number of a ledger entry
pub fn entry_version(entry: &SiteContent) -> u64 {
    entry.version().map(parse_version).unwrap_or(1)
}

/// Next version for a list of entries: `max + 1`, or `"1"` when empty
pub fn next_version(entries: &[SiteContent]) -> String {
    entries
        .iter()
        .map(entry_version)
        .max()
        .map(|max| max.saturating_add(1).to_string())
        .unwrap_or_else(|| INITIAL_VERSION.to_string())
}

/// Bounded list of saved snapshots, newest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLedger {
    entries: Vec<SiteContent>,
    /// Highest version observed this session
    high_water: u64,
}

impl HistoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from stored entries (newest first)
    ///
    /// Anything past [`HISTORY_LIMIT`] is dropped.
    pub fn from_entries(mut entries: Vec<SiteContent>) -> Self {
        entries.truncate(HISTORY_LIMIT);
        let high_water = entries.iter().map(entry_version).max().unwrap_or(0);
        Self {
            entries,
            high_water,
        }
    }

    pub fn entries(&self) -> &[SiteContent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SiteContent> {
        self.entries.get(index)
    }

    /// Newest entry
    pub fn head(&self) -> Option<&SiteContent> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SiteContent> {
        self.entries.iter()
    }

    /// Index of the entry saved as `version`
    pub fn position_of(&self, version: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.version() == Some(version))
    }

    /// Version the next save gets
    pub fn next_version(&self) -> String {
        let derived = self.entries.iter().map(entry_version).max();
        match derived {
            None if self.high_water == 0 => INITIAL_VERSION.to_string(),
            _ => derived
                .unwrap_or(0)
                .max(self.high_water)
                .saturating_add(1)
                .to_string(),
        }
    }

    /// Add a snapshot as the newest entry, evicting the oldest past the limit
    pub fn push(&mut self, entry: SiteContent) {
        self.high_water = self.high_water.max(entry_version(&entry));
        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_LIMIT);
    }

    /// Remove the entry at `index`
    pub fn remove(&mut self, index: usize) -> Option<SiteContent> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Replace all history with a single entry and restart numbering from it
    pub fn reset(&mut self, entry: SiteContent) {
        self.high_water = entry_version(&entry);
        self.entries = vec![entry];
    }

    /// Change the name and note of an entry, keeping version and timestamp
    ///
    /// Returns `false` if there is no entry at `index`.
    pub fn annotate(&mut self, index: usize, name: Option<String>, note: Option<String>) -> bool {
        let Some(entry) = self.entries.get_mut(index) else {
            return false;
        };

        let meta = entry.version_meta.get_or_insert_with(|| VersionMeta {
            version: INITIAL_VERSION.to_string(),
            timestamp: 0,
            name: None,
            note: None,
        });
        meta.name = name.filter(|n| !n.is_empty());
        meta.note = note.filter(|n| !n.is_empty());
        true
    }

    /// Copy of the entries for persisting
    pub fn to_vec(&self) -> Vec<SiteContent> {
        self.entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str) -> SiteContent {
        SiteContent::default().with_version_meta(VersionMeta::new(version, None, None))
    }

    fn versions(ledger: &HistoryLedger) -> Vec<&str> {
        ledger.iter().filter_map(|e| e.version()).collect()
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("7"), 7);
        assert_eq!(parse_version("2.1"), 2);
        assert_eq!(parse_version(" 12"), 12);
        assert_eq!(parse_version("draft"), 1);
        assert_eq!(parse_version(""), 1);
    }

    #[test]
    fn test_next_version_empty() {
        assert_eq!(next_version(&[]), "1");
        assert_eq!(HistoryLedger::new().next_version(), "1");
    }

    #[test]
    fn test_parse_version_too_large_for_u64() {
        assert_eq!(parse_version("18446744073709551615"), u64::MAX);
        assert_eq!(parse_version("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_next_version_saturates_at_max() {
        let entries = vec![entry("18446744073709551615"), entry("4")];
        assert_eq!(next_version(&entries), u64::MAX.to_string());

        let ledger = HistoryLedger::from_entries(entries);
        assert_eq!(ledger.next_version(), u64::MAX.to_string());
    }

    #[test]
    fn test_oversized_version_is_not_counted_as_one() {
        let ledger = HistoryLedger::from_entries(vec![entry("99999999999999999999999")]);
        assert_eq!(ledger.next_version(), u64::MAX.to_string());
    }

    #[test]
    fn test_next_version_uses_max() {
        let entries = vec![entry("3"), entry("10"), entry("2")];
        assert_eq!(next_version(&entries), "11");
    }

    #[test]
    fn test_entries_without_meta_count_as_one() {
        let entries = vec![SiteContent::default(), SiteContent::default()];
        assert_eq!(next_version(&entries), "2");
    }

    #[test]
    fn test_push_is_newest_first_and_bounded() {
        let mut ledger = HistoryLedger::new();
        for _ in 0..(HISTORY_LIMIT + 5) {
            let version = ledger.next_version();
            ledger.push(entry(&version));
            assert!(ledger.len() <= HISTORY_LIMIT);
        }

        assert_eq!(ledger.len(), HISTORY_LIMIT);
        assert_eq!(ledger.head().unwrap().version(), Some("25"));
        assert_eq!(ledger.entries().last().unwrap().version(), Some("6"));
    }

    #[test]
    fn test_versions_strictly_increase_after_deletes() {
        let mut ledger = HistoryLedger::new();
        let mut seen = Vec::new();
        for round in 0..8 {
            let version = ledger.next_version();
            seen.push(parse_version(&version));
            ledger.push(entry(&version));
            if round % 3 == 2 {
                ledger.remove(1);
            }
        }
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_deleting_max_does_not_reuse_version() {
        let mut ledger = HistoryLedger::from_entries(vec![entry("3"), entry("2"), entry("1")]);
        ledger.remove(0);
        assert_eq!(versions(&ledger), vec!["2", "1"]);
        assert_eq!(next_version(ledger.entries()), "3");
        assert_eq!(ledger.next_version(), "4");

        ledger.remove(0);
        ledger.remove(0);
        assert!(ledger.is_empty());
        assert_eq!(ledger.next_version(), "4");
    }

    #[test]
    fn test_from_entries_truncates() {
        let entries = (1..=30).rev().map(|v| entry(&v.to_string())).collect();
        let ledger = HistoryLedger::from_entries(entries);
        assert_eq!(ledger.len(), HISTORY_LIMIT);
        assert_eq!(ledger.next_version(), "31");
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut ledger = HistoryLedger::from_entries(vec![entry("1")]);
        assert!(ledger.remove(3).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_reset_restarts_numbering() {
        let mut ledger = HistoryLedger::from_entries(vec![entry("5"), entry("4")]);
        ledger.reset(entry("1"));
        assert_eq!(versions(&ledger), vec!["1"]);
        assert_eq!(ledger.next_version(), "2");
    }

    #[test]
    fn test_annotate() {
        let mut ledger = HistoryLedger::from_entries(vec![entry("2"), entry("1")]);
        let timestamp = ledger.get(1).unwrap().version_meta.as_ref().unwrap().timestamp;

        assert!(ledger.annotate(1, Some("Launch".to_string()), Some("first public".to_string())));
        let meta = ledger.get(1).unwrap().version_meta.as_ref().unwrap();
        assert_eq!(meta.version, "1");
        assert_eq!(meta.timestamp, timestamp);
        assert_eq!(meta.name.as_deref(), Some("Launch"));
        assert_eq!(meta.note.as_deref(), Some("first public"));

        assert!(!ledger.annotate(5, None, None));
    }

    #[test]
    fn test_position_of() {
        let ledger = HistoryLedger::from_entries(vec![entry("3"), entry("1")]);
        assert_eq!(ledger.position_of("1"), Some(1));
        assert_eq!(ledger.position_of("2"), None);
    }
}
