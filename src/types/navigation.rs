//! Capability interface over a host's live navigation history.
//!
//! The snapshotter reads through [`HistoryEntry`] and [`NavigationHistory`]; the
//! restorer writes through [`NavigationHistory`] using [`RestoredEntry`] values.
//! Neither ever sees the concrete host object graph.

use std::io::{Cursor, Read, Seek};

use super::errors::NavigationError;
use super::history::ScrollPosition;

/// A readable, rewindable stream over a submitted request body.
pub trait PayloadStream: Read + Seek {}

impl<T: Read + Seek> PayloadStream for T {}

/// Read-only view of one live navigation entry.
pub trait HistoryEntry {
    fn location(&self) -> &str;
    fn title(&self) -> Option<&str>;
    fn is_subframe(&self) -> bool;
    /// Page-cache key, when the host kept one.
    fn cache_key(&self) -> Option<u32>;
    /// Frame identity within the running session.
    fn identity(&self) -> Option<u64>;
    /// Raw scroll offsets as the host reports them.
    fn scroll_position(&self) -> (i64, i64);
    /// Whether the entry's document was delivered over an encrypted transport.
    fn is_encrypted_origin(&self) -> bool;
    /// Opens the submitted body, if the entry was produced by a form submission.
    fn payload_stream(&self) -> Option<Box<dyn PayloadStream + '_>>;
    /// Number of nested frame slots. Zero for entries that cannot hold frames.
    fn child_count(&self) -> usize;
    /// Frame at `index`, or `None` for a slot the host left empty.
    fn child_at(&self, index: usize) -> Option<&Self>;
}

/// How a restored entry is to be loaded by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    Normal,
    /// Load from session history, preferring cached content.
    RestoredFromHistory,
}

/// Fields of an entry to append to a live history, with its nested frames.
#[derive(Debug, Clone)]
pub struct RestoredEntry {
    pub location: String,
    pub title: String,
    pub is_subframe: bool,
    pub load_type: LoadType,
    pub cache_key: Option<u32>,
    pub identity: Option<u64>,
    pub scroll: ScrollPosition,
    /// A fresh seekable input over the captured body.
    pub payload: Option<Cursor<Vec<u8>>>,
    /// Nested frames in slot order; each belongs at its own index.
    pub children: Vec<RestoredEntry>,
}

/// Mutable handle over one browsing context's back/forward list.
pub trait NavigationHistory {
    type Entry: HistoryEntry;

    fn entry_count(&self) -> usize;
    fn entry_at(&self, index: usize) -> Option<&Self::Entry>;
    /// Removes every entry.
    fn purge(&mut self);
    /// Appends a top-level entry built from `entry`.
    fn append_entry(&mut self, entry: RestoredEntry) -> Result<(), NavigationError>;
    /// Makes `index` the current position.
    fn go_to_index(&mut self, index: usize) -> Result<(), NavigationError>;
}
