//! Frame identity minting for restored sessions.
//!
//! [`IdentityPool`] is the process-wide record of live frame identities handed
//! out by restores. The shared instance is created on first use through
//! [`IdentityPool::global`] and lives, never reset, until the process exits.
//! Minting takes the pool's lock only for the probe-and-insert step.
//!
//! [`IdentityMap`] is scoped to a single restore call: it maps the identities
//! recorded in a snapshot to freshly minted live ones, so frames that shared an
//! identity before the snapshot share one again afterwards.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

static GLOBAL_POOL: OnceLock<IdentityPool> = OnceLock::new();

/// Set of live frame identities in use in this process.
#[derive(Debug, Default)]
pub struct IdentityPool {
    used: Mutex<HashSet<u64>>,
}

impl IdentityPool {
    /// Creates an empty, independent pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// The pool shared by every restore in this process.
    pub fn global() -> &'static IdentityPool {
        GLOBAL_POOL.get_or_init(IdentityPool::new)
    }

    fn now_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    /// Mints an identity no other caller of this pool has received.
    ///
    /// Seeded from the current time in milliseconds and probed upward until free.
    pub fn mint(&self) -> u64 {
        let mut used = self.used.lock().unwrap_or_else(PoisonError::into_inner);
        let mut id = Self::now_millis().max(1);
        while used.contains(&id) {
            id = id.checked_add(1).unwrap_or(1);
        }
        used.insert(id);
        id
    }

    /// Marks an identity the host already uses so it is never minted.
    /// Returns false if it was already recorded.
    pub fn reserve(&self, id: u64) -> bool {
        self.used
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id)
    }

    pub fn is_in_use(&self, id: u64) -> bool {
        self.used
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    pub fn len(&self) -> usize {
        self.used.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-restore mapping from snapshot identities to live identities.
#[derive(Debug)]
pub struct IdentityMap<'p> {
    pool: &'p IdentityPool,
    remapped: HashMap<u64, u64>,
}

impl<'p> IdentityMap<'p> {
    pub fn new(pool: &'p IdentityPool) -> Self {
        Self {
            pool,
            remapped: HashMap::new(),
        }
    }

    /// Live identity for `snapshot_id`, minting one the first time it is seen.
    pub fn remap(&mut self, snapshot_id: u64) -> u64 {
        let pool = self.pool;
        *self
            .remapped
            .entry(snapshot_id)
            .or_insert_with(|| pool.mint())
    }

    /// Number of distinct snapshot identities seen so far.
    pub fn len(&self) -> usize {
        self.remapped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remapped.is_empty()
    }
}
