//! Snapshot Store for the session store.
//!
//! Keeps the last good snapshot text of each browsing context in SQLite. A
//! failed capture never replaces what was stored before.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::connection::Database;
use crate::types::errors::{SessionStoreError, StoreError};

/// A stored snapshot row.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub id: String,
    pub context_id: String,
    pub state: String,
    pub captured_at: i64,
}

/// Trait defining snapshot store operations.
pub trait SnapshotStoreTrait {
    fn save(&self, context_id: &str, state: &str) -> Result<StoredSnapshot, StoreError>;
    fn record_capture(
        &self,
        context_id: &str,
        capture: Result<String, SessionStoreError>,
    ) -> Result<Option<StoredSnapshot>, StoreError>;
    fn latest(&self, context_id: &str) -> Result<Option<StoredSnapshot>, StoreError>;
    fn load_state(&self, context_id: &str) -> Result<String, StoreError>;
    fn has_snapshot(&self, context_id: &str) -> Result<bool, StoreError>;
    fn contexts(&self) -> Result<Vec<String>, StoreError>;
    fn clear(&self, context_id: &str) -> Result<(), StoreError>;
    fn clear_all(&self) -> Result<(), StoreError>;
}

/// Snapshot store backed by SQLite.
pub struct SnapshotStore {
    db: Arc<Database>,
}

impl SnapshotStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }
}

impl SnapshotStoreTrait for SnapshotStore {
    /// Stores `state` as the snapshot of `context_id`, replacing the previous one.
    fn save(&self, context_id: &str, state: &str) -> Result<StoredSnapshot, StoreError> {
        let snapshot = StoredSnapshot {
            id: Uuid::new_v4().to_string(),
            context_id: context_id.to_string(),
            state: state.to_string(),
            captured_at: Self::now(),
        };

        let tx = self
            .db
            .connection()
            .unchecked_transaction()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        tx.execute("DELETE FROM snapshots WHERE context_id = ?1", params![context_id])
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        tx.execute(
            "INSERT INTO snapshots (id, context_id, state, captured_at) VALUES (?1, ?2, ?3, ?4)",
            params![snapshot.id, snapshot.context_id, snapshot.state, snapshot.captured_at],
        )
        .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        tx.commit().map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        debug!(context = context_id, bytes = state.len(), "stored session snapshot");
        Ok(snapshot)
    }

    /// Stores a successful capture; after a failed one keeps the previous snapshot.
    ///
    /// Returns the stored row, or `None` when the capture had failed.
    fn record_capture(
        &self,
        context_id: &str,
        capture: Result<String, SessionStoreError>,
    ) -> Result<Option<StoredSnapshot>, StoreError> {
        match capture {
            Ok(state) => self.save(context_id, &state).map(Some),
            Err(err) => {
                warn!(context = context_id, error = %err, "capture failed, keeping previous snapshot");
                Ok(None)
            }
        }
    }

    fn latest(&self, context_id: &str) -> Result<Option<StoredSnapshot>, StoreError> {
        self.db
            .connection()
            .query_row(
                "SELECT id, context_id, state, captured_at FROM snapshots WHERE context_id = ?1 ORDER BY captured_at DESC, rowid DESC LIMIT 1",
                params![context_id],
                |row| {
                    Ok(StoredSnapshot {
                        id: row.get(0)?,
                        context_id: row.get(1)?,
                        state: row.get(2)?,
                        captured_at: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }

    fn load_state(&self, context_id: &str) -> Result<String, StoreError> {
        self.latest(context_id)?
            .map(|snapshot| snapshot.state)
            .ok_or_else(|| StoreError::NotFound(context_id.to_string()))
    }

    fn has_snapshot(&self, context_id: &str) -> Result<bool, StoreError> {
        let count: i64 = self
            .db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM snapshots WHERE context_id = ?1",
                params![context_id],
                |row| row.get(0),
            )
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(count > 0)
    }

    fn contexts(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare("SELECT DISTINCT context_id FROM snapshots ORDER BY context_id")
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| StoreError::DatabaseError(e.to_string()))?);
        }
        Ok(result)
    }

    fn clear(&self, context_id: &str) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute("DELETE FROM snapshots WHERE context_id = ?1", params![context_id])
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn clear_all(&self) -> Result<(), StoreError> {
        self.db
            .connection()
            .execute("DELETE FROM snapshots", [])
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
