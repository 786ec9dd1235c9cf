//! Restorer for the session store.
//!
//! Rebuilds a live navigation history from a [`SessionSnapshot`]. The live
//! history is always purged and rebuilt from scratch, never merged.

use std::io::Cursor;

use tracing::{debug, warn};

use crate::services::identity_pool::{IdentityMap, IdentityPool};
use crate::types::errors::SessionStoreError;
use crate::types::history::{HistoryNode, SessionSnapshot};
use crate::types::navigation::{LoadType, NavigationHistory, RestoredEntry};

/// What a restore did to the live history.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoreOutcome {
    /// Top-level entries the history accepted.
    pub entries_restored: usize,
    /// Position the history was moved to, if navigating succeeded.
    pub current_index: Option<usize>,
    /// Distinct frame identities minted for this restore.
    pub identities_minted: usize,
    /// Recovered failure from the final navigation step.
    pub index_error: Option<SessionStoreError>,
}

impl RestoreOutcome {
    /// True when the restore left the history empty.
    pub fn is_empty(&self) -> bool {
        self.entries_restored == 0
    }
}

/// Restores snapshots, minting live frame identities from a shared pool.
pub struct Restorer<'p> {
    pool: &'p IdentityPool,
}

impl<'p> Restorer<'p> {
    pub fn new(pool: &'p IdentityPool) -> Self {
        Self { pool }
    }

    /// Replaces the contents of `history` with `snapshot` and moves to its last entry.
    ///
    /// Entries the host refuses are skipped; a failed final navigation is
    /// reported in the outcome rather than as an error.
    pub fn restore<H: NavigationHistory>(&self, history: &mut H, snapshot: &SessionSnapshot) -> RestoreOutcome {
        if history.entry_count() > 0 {
            history.purge();
        }

        let mut identities = IdentityMap::new(self.pool);
        let mut entries_restored = 0;
        for (index, node) in snapshot.entries.iter().enumerate() {
            let entry = Self::deserialize_entry(node, &mut identities);
            match history.append_entry(entry) {
                Ok(()) => entries_restored += 1,
                Err(err) => warn!(index, url = %node.location, error = %err, "history refused restored entry"),
            }
        }

        let (current_index, index_error) = match snapshot.current_index() {
            Some(index) => match history.go_to_index(index) {
                Ok(()) => (Some(index), None),
                Err(err) => {
                    warn!(index, error = %err, "could not select restored entry");
                    (None, Some(SessionStoreError::RestoreIndexFailure(err.to_string())))
                }
            },
            None => (
                None,
                Some(SessionStoreError::RestoreIndexFailure(
                    "snapshot holds no entries".to_string(),
                )),
            ),
        };

        debug!(entries_restored, identities = identities.len(), ?current_index, "restored session history");
        RestoreOutcome {
            entries_restored,
            current_index,
            identities_minted: identities.len(),
            index_error,
        }
    }

    /// Expands one node, and its frames, into entry fields for the host.
    pub fn deserialize_entry(node: &HistoryNode, identities: &mut IdentityMap<'_>) -> RestoredEntry {
        let title = if node.title.is_empty() {
            node.location.clone()
        } else {
            node.title.clone()
        };

        RestoredEntry {
            location: node.location.clone(),
            title,
            is_subframe: node.is_subframe,
            load_type: LoadType::RestoredFromHistory,
            cache_key: node.cache_token,
            identity: node.identity.map(|id| identities.remap(id)),
            scroll: node.scroll,
            payload: node.payload.clone().map(Cursor::new),
            children: node
                .children
                .iter()
                .map(|child| Self::deserialize_entry(child, identities))
                .collect(),
        }
    }
}
