//! Unit tests for the snapshotter.

use std::io::{self, Cursor, Read, Seek, SeekFrom};

use sessionstore::managers::session_history::{SessionHistory, SessionHistoryEntry};
use sessionstore::managers::snapshotter::Snapshotter;
use sessionstore::services::privacy_filter::PrivacyFilter;
use sessionstore::types::errors::NavigationError;
use sessionstore::types::history::{ScrollPosition, BLANK_LOCATION};
use sessionstore::types::navigation::{HistoryEntry, NavigationHistory, PayloadStream, RestoredEntry};
use sessionstore::types::settings::SessionStoreSettings;

fn permissive_filter() -> PrivacyFilter {
    PrivacyFilter::new(&SessionStoreSettings {
        privacy_level: 0,
        ..SessionStoreSettings::default()
    })
}

/// Payload stream whose reads always fail.
struct FailingStream;

impl Read for FailingStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "stream closed"))
    }
}

impl Seek for FailingStream {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

/// Host entry whose payload can be made unreadable.
struct FlakyEntry {
    location: String,
    payload: Option<Vec<u8>>,
    broken_stream: bool,
}

impl FlakyEntry {
    fn new(location: &str, payload: &[u8], broken_stream: bool) -> Self {
        Self {
            location: location.to_string(),
            payload: Some(payload.to_vec()),
            broken_stream,
        }
    }
}

impl HistoryEntry for FlakyEntry {
    fn location(&self) -> &str {
        &self.location
    }

    fn title(&self) -> Option<&str> {
        None
    }

    fn is_subframe(&self) -> bool {
        false
    }

    fn cache_key(&self) -> Option<u32> {
        Some(0)
    }

    fn identity(&self) -> Option<u64> {
        Some(0)
    }

    fn scroll_position(&self) -> (i64, i64) {
        (-3, i64::MAX)
    }

    fn is_encrypted_origin(&self) -> bool {
        false
    }

    fn payload_stream(&self) -> Option<Box<dyn PayloadStream + '_>> {
        if self.broken_stream {
            return Some(Box::new(FailingStream));
        }
        self.payload
            .as_deref()
            .map(|bytes| Box::new(Cursor::new(bytes)) as Box<dyn PayloadStream + '_>)
    }

    fn child_count(&self) -> usize {
        0
    }

    fn child_at(&self, _index: usize) -> Option<&Self> {
        None
    }
}

struct FlakyHistory(Vec<FlakyEntry>);

impl NavigationHistory for FlakyHistory {
    type Entry = FlakyEntry;

    fn entry_count(&self) -> usize {
        self.0.len()
    }

    fn entry_at(&self, index: usize) -> Option<&FlakyEntry> {
        self.0.get(index)
    }

    fn purge(&mut self) {
        self.0.clear();
    }

    fn append_entry(&mut self, _entry: RestoredEntry) -> Result<(), NavigationError> {
        Err(NavigationError::Rejected("read-only".to_string()))
    }

    fn go_to_index(&mut self, index: usize) -> Result<(), NavigationError> {
        Err(NavigationError::IndexOutOfRange(index))
    }
}

#[test]
fn test_captures_entries_in_order() {
    let mut history = SessionHistory::new();
    history.push(SessionHistoryEntry::new("https://example.org/1"));
    history.push(SessionHistoryEntry::new("https://example.org/2").with_title("Second"));

    let filter = permissive_filter();
    let snapshot = Snapshotter::new(&filter).snapshot(&history);
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.entries[0].location, "https://example.org/1");
    assert_eq!(snapshot.entries[0].title, "https://example.org/1");
    assert_eq!(snapshot.entries[1].title, "Second");
    assert_eq!(snapshot.current_index(), Some(1));
}

#[test]
fn test_empty_history_yields_empty_snapshot() {
    let filter = permissive_filter();
    let snapshot = Snapshotter::new(&filter).snapshot(&SessionHistory::new());
    assert!(snapshot.is_empty());
}

#[test]
fn test_empty_frame_slot_keeps_alignment() {
    let entry = SessionHistoryEntry::new("https://example.org/")
        .with_child(SessionHistoryEntry::new("https://example.org/left"))
        .with_empty_slot()
        .with_child(SessionHistoryEntry::new("https://example.org/right"));

    let filter = permissive_filter();
    let node = Snapshotter::new(&filter).serialize_entry(&entry);
    assert_eq!(node.children.len(), 3);
    assert_eq!(node.children[0].location, "https://example.org/left");
    assert!(node.children[0].is_subframe);
    assert!(node.children[1].is_placeholder());
    assert_eq!(node.children[1].location, BLANK_LOCATION);
    assert_eq!(node.children[2].location, "https://example.org/right");
}

#[test]
fn test_failing_stream_omits_only_that_payload() {
    let history = FlakyHistory(vec![
        FlakyEntry::new("http://example.org/ok", b"a=1", false),
        FlakyEntry::new("http://example.org/broken", b"b=2", true),
    ]);

    let filter = permissive_filter();
    let snapshot = Snapshotter::new(&filter).snapshot(&history);
    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.entries[0].payload.as_deref(), Some(&b"a=1"[..]));
    assert_eq!(snapshot.entries[1].location, "http://example.org/broken");
    assert_eq!(snapshot.entries[1].payload, None);
}

#[test]
fn test_zero_keys_and_out_of_range_scroll() {
    let filter = permissive_filter();
    let node = Snapshotter::new(&filter).serialize_entry(&FlakyEntry::new("http://example.org/", b"x", false));
    assert_eq!(node.cache_token, None);
    assert_eq!(node.identity, None);
    assert_eq!(node.scroll, ScrollPosition::new(0, u32::MAX));
}

#[test]
fn test_privacy_level_gates_payloads() {
    let mut history = SessionHistory::new();
    history.push(SessionHistoryEntry::new("http://example.org/form").with_payload("q=1"));
    history.push(SessionHistoryEntry::new("https://example.org/form").with_payload("q=2"));

    let default_filter = PrivacyFilter::default();
    let snapshot = Snapshotter::new(&default_filter).snapshot(&history);
    assert_eq!(snapshot.entries[0].payload, None);
    assert_eq!(snapshot.entries[1].payload.as_deref(), Some(&b"q=2"[..]));

    let open = permissive_filter();
    let snapshot = Snapshotter::new(&open).snapshot(&history);
    assert!(snapshot.entries.iter().all(|node| node.payload.is_some()));
}

#[test]
fn test_capture_leaves_history_untouched() {
    let mut history = SessionHistory::new();
    history.push(SessionHistoryEntry::new("https://example.org/").with_payload("q=1").with_scroll(4, 5));
    let before = history.clone();

    let filter = permissive_filter();
    let _ = Snapshotter::new(&filter).snapshot(&history);
    assert_eq!(history, before);
}
