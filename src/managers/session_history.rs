//! In-memory navigation history.
//!
//! A self-contained implementation of the live-history interface, used by
//! hosts without a native history object, by the demo binary and by tests.

use std::io::Cursor;

use crate::types::errors::NavigationError;
use crate::types::navigation::{HistoryEntry, LoadType, NavigationHistory, PayloadStream, RestoredEntry};

/// One back/forward entry with its frame slots.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHistoryEntry {
    pub location: String,
    pub title: Option<String>,
    pub is_subframe: bool,
    pub load_type: LoadType,
    pub cache_key: Option<u32>,
    pub identity: Option<u64>,
    pub scroll: (i64, i64),
    pub payload: Option<Vec<u8>>,
    /// Frame slots in layout order. `None` marks a slot with no entry.
    pub children: Vec<Option<SessionHistoryEntry>>,
}

impl SessionHistoryEntry {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            title: None,
            is_subframe: false,
            load_type: LoadType::Normal,
            cache_key: None,
            identity: None,
            scroll: (0, 0),
            payload: None,
            children: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_scroll(mut self, x: i64, y: i64) -> Self {
        self.scroll = (x, y);
        self
    }

    pub fn with_payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    pub fn with_cache_key(mut self, key: u32) -> Self {
        self.cache_key = Some(key);
        self
    }

    pub fn with_identity(mut self, id: u64) -> Self {
        self.identity = Some(id);
        self
    }

    /// Adds a frame, marking it as a subframe.
    pub fn with_child(mut self, mut child: SessionHistoryEntry) -> Self {
        child.is_subframe = true;
        self.children.push(Some(child));
        self
    }

    /// Adds a frame slot the host could not fill.
    pub fn with_empty_slot(mut self) -> Self {
        self.children.push(None);
        self
    }

    fn from_restored(entry: RestoredEntry) -> Self {
        Self {
            location: entry.location,
            title: Some(entry.title),
            is_subframe: entry.is_subframe,
            load_type: entry.load_type,
            cache_key: entry.cache_key,
            identity: entry.identity,
            scroll: (i64::from(entry.scroll.x), i64::from(entry.scroll.y)),
            payload: entry.payload.map(Cursor::into_inner),
            children: entry
                .children
                .into_iter()
                .map(|child| Some(Self::from_restored(child)))
                .collect(),
        }
    }
}

impl HistoryEntry for SessionHistoryEntry {
    fn location(&self) -> &str {
        &self.location
    }

    fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn is_subframe(&self) -> bool {
        self.is_subframe
    }

    fn cache_key(&self) -> Option<u32> {
        self.cache_key
    }

    fn identity(&self) -> Option<u64> {
        self.identity
    }

    fn scroll_position(&self) -> (i64, i64) {
        self.scroll
    }

    fn is_encrypted_origin(&self) -> bool {
        self.location
            .get(..6)
            .is_some_and(|scheme| scheme.eq_ignore_ascii_case("https:"))
    }

    fn payload_stream(&self) -> Option<Box<dyn PayloadStream + '_>> {
        self.payload
            .as_deref()
            .map(|bytes| Box::new(Cursor::new(bytes)) as Box<dyn PayloadStream + '_>)
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child_at(&self, index: usize) -> Option<&Self> {
        self.children.get(index).and_then(Option::as_ref)
    }
}

/// Back/forward list of one browsing context.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionHistory {
    entries: Vec<SessionHistoryEntry>,
    current: Option<usize>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a visited entry and makes it current.
    pub fn push(&mut self, entry: SessionHistoryEntry) {
        self.entries.push(entry);
        self.current = Some(self.entries.len() - 1);
    }

    pub fn entries(&self) -> &[SessionHistoryEntry] {
        &self.entries
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_entry(&self) -> Option<&SessionHistoryEntry> {
        self.current.and_then(|index| self.entries.get(index))
    }
}

impl NavigationHistory for SessionHistory {
    type Entry = SessionHistoryEntry;

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn entry_at(&self, index: usize) -> Option<&SessionHistoryEntry> {
        self.entries.get(index)
    }

    fn purge(&mut self) {
        self.entries.clear();
        self.current = None;
    }

    fn append_entry(&mut self, entry: RestoredEntry) -> Result<(), NavigationError> {
        if entry.location.is_empty() {
            return Err(NavigationError::Rejected("entry without a location".to_string()));
        }
        self.entries.push(SessionHistoryEntry::from_restored(entry));
        Ok(())
    }

    fn go_to_index(&mut self, index: usize) -> Result<(), NavigationError> {
        if self.entries.is_empty() {
            return Err(NavigationError::EmptyHistory);
        }
        if index >= self.entries.len() {
            return Err(NavigationError::IndexOutOfRange(index));
        }
        self.current = Some(index);
        Ok(())
    }
}
