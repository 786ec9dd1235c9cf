//! SQLite backing for retained session snapshots.
//!
//! ```no_run
//! use sessionstore::database::Database;
//!
//! let db = Database::open("profile/sessionstore.db").expect("open snapshot database");
//! assert_eq!(db.schema_version(), sessionstore::database::migrations::CURRENT_SCHEMA_VERSION);
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
