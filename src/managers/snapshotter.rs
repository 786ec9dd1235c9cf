//! Snapshotter for the session store.
//!
//! Walks a live navigation history depth-first, pre-order, and produces a fresh
//! [`SessionSnapshot`]. The live history is only read, never changed.

use tracing::{debug, warn};

use crate::services::privacy_filter::PrivacyFilterTrait;
use crate::types::history::{HistoryNode, ScrollPosition, SessionSnapshot, BLANK_LOCATION, MAX_SNAPSHOT_IDENTITY};
use crate::types::navigation::{HistoryEntry, NavigationHistory};

/// Captures live histories, consulting a privacy filter for submitted payloads.
pub struct Snapshotter<'f, F: PrivacyFilterTrait> {
    filter: &'f F,
}

impl<'f, F: PrivacyFilterTrait> Snapshotter<'f, F> {
    pub fn new(filter: &'f F) -> Self {
        Self { filter }
    }

    /// Captures every entry of `history`, in back/forward order.
    pub fn snapshot<H: NavigationHistory>(&self, history: &H) -> SessionSnapshot {
        let count = history.entry_count();
        let mut entries = Vec::with_capacity(count);
        for index in 0..count {
            match history.entry_at(index) {
                Some(entry) => entries.push(self.serialize_entry(entry)),
                None => warn!(index, count, "history reported an entry it could not return"),
            }
        }
        debug!(entries = entries.len(), "captured session history");
        SessionSnapshot::new(entries)
    }

    /// Captures one entry and, recursively, its frames.
    ///
    /// Empty frame slots become blank placeholders so later frames keep their index.
    pub fn serialize_entry<E: HistoryEntry>(&self, entry: &E) -> HistoryNode {
        let location = match entry.location() {
            "" => {
                warn!("live entry without a location, capturing it as blank");
                BLANK_LOCATION.to_string()
            }
            url => url.to_string(),
        };
        let title = entry
            .title()
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| location.clone());
        let (x, y) = entry.scroll_position();
        let identity = match entry.identity() {
            Some(id) if id > MAX_SNAPSHOT_IDENTITY => {
                warn!(url = %location, id, "frame identity too large to capture, dropping it");
                None
            }
            id => id.filter(|&id| id != 0),
        };

        let children = (0..entry.child_count())
            .map(|index| match entry.child_at(index) {
                Some(child) => self.serialize_entry(child),
                None => HistoryNode::placeholder(),
            })
            .collect();

        HistoryNode {
            payload: self.capture_payload(entry, &location),
            title,
            is_subframe: entry.is_subframe(),
            cache_token: entry.cache_key().filter(|&key| key != 0),
            identity,
            scroll: ScrollPosition::clamped(x, y),
            children,
            location,
        }
    }

    /// Reads the entry's submitted payload if policy allows it.
    ///
    /// Stream failures only cost this entry its payload.
    fn capture_payload<E: HistoryEntry>(&self, entry: &E, location: &str) -> Option<Vec<u8>> {
        if !self.filter.allows_capture(entry.is_encrypted_origin()) {
            return None;
        }
        let mut stream = entry.payload_stream()?;
        match self.filter.capture_payload(&mut *stream) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(url = %location, error = %err, "omitting payload");
                None
            }
        }
    }
}
