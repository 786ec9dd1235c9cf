// Session store managers
// Managers work against live navigation histories and stored state: capture, restore, persistence.

pub mod restorer;
pub mod session_history;
pub mod session_store;
pub mod snapshot_store;
pub mod snapshotter;
