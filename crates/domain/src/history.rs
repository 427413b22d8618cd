//! Request History Domain Model
//!
//! Tracks dispatched requests, newest first, under a strict size cap.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::request::{RequestSnapshot, ResolvedRequest};

/// Maximum number of history entries kept.
pub const MAX_HISTORY_ENTRIES: usize = 20;

/// A single dispatched request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: String,
    /// When the request was dispatched.
    pub timestamp: DateTime<Utc>,
    /// Name of the environment the request was resolved against.
    pub environment: String,
    /// The raw fields, kept so the request can be rebuilt.
    pub snapshot: RequestSnapshot,
    /// What was actually sent.
    pub request: ResolvedRequest,
}

impl HistoryEntry {
    /// Creates a new history entry.
    #[must_use]
    pub fn new(
        snapshot: RequestSnapshot,
        request: ResolvedRequest,
        environment: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: crate::generate_id(),
            timestamp,
            environment: environment.into(),
            snapshot,
            request,
        }
    }
}

/// Request history with a maximum size limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHistory {
    /// History entries (newest first).
    entries: VecDeque<HistoryEntry>,
    /// Maximum number of entries to keep.
    max_entries: usize,
}

impl Default for RequestHistory {
    fn default() -> Self {
        Self::new(MAX_HISTORY_ENTRIES)
    }
}

impl RequestHistory {
    /// Creates a new empty history.
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_entries + 1),
            max_entries,
        }
    }

    /// Restores history from persisted entries (newest first), trimming to
    /// the cap.
    #[must_use]
    pub fn from_entries(entries: Vec<HistoryEntry>, max_entries: usize) -> Self {
        let mut entries = VecDeque::from(entries);
        entries.truncate(max_entries);
        Self {
            entries,
            max_entries,
        }
    }

    /// Adds an entry at the front, evicting the oldest past the cap.
    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);

        while self.entries.len() > self.max_entries {
            self.entries.pop_back();
        }
    }

    /// Returns all entries (newest first).
    #[must_use]
    pub const fn entries(&self) -> &VecDeque<HistoryEntry> {
        &self.entries
    }

    /// Returns the entries as an owned list (newest first).
    #[must_use]
    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Returns an entry by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Clears all history entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the size cap.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{BodyType, Headers, HttpMethod, ResolvedBody};
    use pretty_assertions::assert_eq;

    fn entry(url: &str) -> HistoryEntry {
        HistoryEntry::new(
            RequestSnapshot::new(HttpMethod::Get, url),
            ResolvedRequest {
                method: HttpMethod::Get,
                url: url.to_string(),
                headers: Headers::new(),
                body: ResolvedBody::Empty,
                body_type: BodyType::None,
            },
            "default",
            Utc::now(),
        )
    }

    #[test]
    fn test_history_caps_at_twenty() {
        let mut history = RequestHistory::default();

        for i in 0..21 {
            history.add(entry(&format!("https://example.com/{i}")));
        }

        assert_eq!(history.len(), MAX_HISTORY_ENTRIES);
        assert_eq!(history.entries()[0].url_for_test(), "https://example.com/20");
        // The first request was evicted; the second is now the oldest.
        assert_eq!(history.entries()[19].url_for_test(), "https://example.com/1");
    }

    #[test]
    fn test_no_dedup() {
        let mut history = RequestHistory::new(5);
        history.add(entry("https://example.com"));
        history.add(entry("https://example.com"));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_from_entries_trims() {
        let entries: Vec<_> = (0..30).map(|i| entry(&format!("/{i}"))).collect();
        let history = RequestHistory::from_entries(entries, MAX_HISTORY_ENTRIES);
        assert_eq!(history.len(), 20);
        assert_eq!(history.entries()[0].url_for_test(), "/0");
    }

    #[test]
    fn test_get_by_id() {
        let mut history = RequestHistory::default();
        let e = entry("https://example.com/x");
        let id = e.id.clone();
        history.add(e);
        assert!(history.get(&id).is_some());
        assert!(history.get("missing").is_none());
    }

    impl HistoryEntry {
        fn url_for_test(&self) -> &str {
            &self.request.url
        }
    }
}
