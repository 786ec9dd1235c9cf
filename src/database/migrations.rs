//! Snapshot database schema.
//!
//! Applied versions live in `schema_version`; [`run_all`] applies whatever is
//! missing from [`MIGRATIONS`] in order, inside one transaction per step.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};

/// Latest schema version known to this build.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// `(version, description, statements)`, ascending.
const MIGRATIONS: &[(i32, &str, &str)] = &[(
    1,
    "snapshot text per browsing context",
    "CREATE TABLE IF NOT EXISTS snapshots (
         id TEXT PRIMARY KEY,
         context_id TEXT NOT NULL,
         state TEXT NOT NULL,
         captured_at INTEGER NOT NULL
     );
     CREATE INDEX IF NOT EXISTS idx_snapshots_context ON snapshots(context_id);",
)];

/// Highest applied version, or 0 for a fresh database.
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT IFNULL(MAX(version), 0) FROM schema_version", [], |row| row.get(0))
        .unwrap_or(0)
}

/// Brings `conn` up to [`CURRENT_SCHEMA_VERSION`]. Calling it again is a no-op.
///
/// # Errors
/// Returns `rusqlite::Error` if a statement fails; the failing step is rolled back.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let applied = get_schema_version(conn);
    for &(version, description, statements) in MIGRATIONS.iter().filter(|(v, _, _)| *v > applied) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(statements)?;
        tx.execute(
            "INSERT INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
            params![version, unix_seconds(), description],
        )?;
        tx.commit()?;
    }
    Ok(())
}

fn unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
