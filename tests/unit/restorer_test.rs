//! Unit tests for the restorer.

use sessionstore::managers::restorer::Restorer;
use sessionstore::managers::session_history::{SessionHistory, SessionHistoryEntry};
use sessionstore::services::identity_pool::{IdentityMap, IdentityPool};
use sessionstore::types::errors::{NavigationError, SessionStoreError};
use sessionstore::types::history::{HistoryNode, ScrollPosition, SessionSnapshot};
use sessionstore::types::navigation::{HistoryEntry, LoadType, NavigationHistory, RestoredEntry};

fn framed_node(shared_id: u64) -> HistoryNode {
    let mut root = HistoryNode::new("https://example.org/");
    root.identity = Some(1);
    for location in ["https://example.org/a", "https://example.org/b"] {
        let mut frame = HistoryNode::new(location);
        frame.is_subframe = true;
        frame.identity = Some(shared_id);
        root.children.push(frame);
    }
    root
}

#[test]
fn test_restores_entries_and_selects_last() {
    let pool = IdentityPool::new();
    let mut first = HistoryNode::new("https://example.org/1");
    first.scroll = ScrollPosition::new(10, 20);
    first.payload = Some(b"q=1".to_vec());
    first.cache_token = Some(5);
    let snapshot = SessionSnapshot::new(vec![first, HistoryNode::new("https://example.org/2")]);

    let mut history = SessionHistory::new();
    let outcome = Restorer::new(&pool).restore(&mut history, &snapshot);

    assert_eq!(outcome.entries_restored, 2);
    assert_eq!(outcome.current_index, Some(1));
    assert_eq!(outcome.index_error, None);
    assert_eq!(history.current_index(), Some(1));

    let restored = &history.entries()[0];
    assert_eq!(restored.load_type, LoadType::RestoredFromHistory);
    assert_eq!(restored.scroll, (10, 20));
    assert_eq!(restored.cache_key, Some(5));
    assert_eq!(restored.payload.as_deref(), Some(&b"q=1"[..]));
    assert_eq!(restored.title(), Some("https://example.org/1"));
}

#[test]
fn test_shared_identity_maps_to_one_fresh_identity() {
    let pool = IdentityPool::new();
    let mut history = SessionHistory::new();
    let outcome = Restorer::new(&pool).restore(&mut history, &SessionSnapshot::new(vec![framed_node(13)]));

    let root = &history.entries()[0];
    let left = root.child_at(0).unwrap();
    let right = root.child_at(1).unwrap();
    assert_eq!(left.identity, right.identity);
    assert_ne!(root.identity, left.identity);
    assert_ne!(left.identity, Some(13));
    assert_eq!(outcome.identities_minted, 2);
    assert!(pool.is_in_use(left.identity.unwrap()));
}

#[test]
fn test_separate_restores_never_share_identities() {
    let pool = IdentityPool::new();
    let snapshot = SessionSnapshot::new(vec![framed_node(13)]);

    let mut first = SessionHistory::new();
    let mut second = SessionHistory::new();
    Restorer::new(&pool).restore(&mut first, &snapshot);
    Restorer::new(&pool).restore(&mut second, &snapshot);

    let ids = |history: &SessionHistory| {
        let root = &history.entries()[0];
        vec![root.identity, root.children[0].as_ref().and_then(|c| c.identity)]
    };
    for id in ids(&first) {
        assert!(!ids(&second).contains(&id));
    }
}

#[test]
fn test_existing_entries_are_purged() {
    let pool = IdentityPool::new();
    let mut history = SessionHistory::new();
    history.push(SessionHistoryEntry::new("https://stale.example/"));
    history.push(SessionHistoryEntry::new("https://stale.example/2"));

    Restorer::new(&pool).restore(&mut history, &SessionSnapshot::new(vec![HistoryNode::new("https://fresh.example/")]));
    assert_eq!(history.entries().len(), 1);
    assert_eq!(history.entries()[0].location, "https://fresh.example/");
}

#[test]
fn test_empty_snapshot_reports_index_failure() {
    let pool = IdentityPool::new();
    let mut history = SessionHistory::new();
    history.push(SessionHistoryEntry::new("https://stale.example/"));

    let outcome = Restorer::new(&pool).restore(&mut history, &SessionSnapshot::default());
    assert!(outcome.is_empty());
    assert!(history.entries().is_empty());
    assert_eq!(outcome.current_index, None);
    assert!(matches!(outcome.index_error, Some(SessionStoreError::RestoreIndexFailure(_))));
}

/// History that accepts entries but refuses to move.
#[derive(Default)]
struct StuckHistory {
    inner: SessionHistory,
}

impl NavigationHistory for StuckHistory {
    type Entry = SessionHistoryEntry;

    fn entry_count(&self) -> usize {
        self.inner.entry_count()
    }

    fn entry_at(&self, index: usize) -> Option<&SessionHistoryEntry> {
        self.inner.entry_at(index)
    }

    fn purge(&mut self) {
        self.inner.purge();
    }

    fn append_entry(&mut self, entry: RestoredEntry) -> Result<(), NavigationError> {
        self.inner.append_entry(entry)
    }

    fn go_to_index(&mut self, _index: usize) -> Result<(), NavigationError> {
        Err(NavigationError::Rejected("navigation locked".to_string()))
    }
}

#[test]
fn test_index_failure_keeps_restored_entries() {
    let pool = IdentityPool::new();
    let mut history = StuckHistory::default();
    let outcome = Restorer::new(&pool).restore(&mut history, &SessionSnapshot::new(vec![HistoryNode::new("https://example.org/")]));

    assert_eq!(outcome.entries_restored, 1);
    assert_eq!(history.entry_count(), 1);
    match outcome.index_error {
        Some(SessionStoreError::RestoreIndexFailure(msg)) => assert!(msg.contains("navigation locked")),
        other => panic!("expected index failure, got {other:?}"),
    }
}

#[test]
fn test_deserialize_entry_preserves_child_order() {
    let pool = IdentityPool::new();
    let mut identities = IdentityMap::new(&pool);
    let mut node = framed_node(4);
    node.children.insert(1, HistoryNode::placeholder());

    let entry = Restorer::deserialize_entry(&node, &mut identities);
    let locations: Vec<_> = entry.children.iter().map(|child| child.location.as_str()).collect();
    assert_eq!(locations, ["https://example.org/a", "about:blank", "https://example.org/b"]);
    assert!(entry.children.iter().all(|child| child.load_type == LoadType::RestoredFromHistory));
    assert_eq!(identities.len(), 2);
}
