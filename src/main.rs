//! Sessionstore demo.
//!
//! Builds an in-memory navigation history with nested frames, captures it,
//! stores the snapshot, and restores it into a fresh history.
//! Set `SESSIONSTORE_CONFIG` to load settings from a JSON file and `RUST_LOG`
//! to adjust log output.

use std::error::Error;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use sessionstore::database::Database;
use sessionstore::managers::session_history::{SessionHistory, SessionHistoryEntry};
use sessionstore::managers::snapshot_store::{SnapshotStore, SnapshotStoreTrait};
use sessionstore::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use sessionstore::types::settings::SessionStoreSettings;
use sessionstore::{SessionStore, SessionStoreTrait};

const DEMO_CONTEXT: &str = "demo-window";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match std::env::var("SESSIONSTORE_CONFIG") {
        Ok(path) => SettingsEngine::new(path).load()?,
        Err(_) => SessionStoreSettings::default(),
    };
    println!("Privacy level {}, postdata limit {}", settings.privacy_level, settings.postdata_limit);

    let store = SessionStore::new(settings);
    let live = demo_history();

    section("Capture");
    let state = store.capture_state(&live)?;
    println!("  {}", state);

    section("Persist");
    let snapshots = SnapshotStore::new(Arc::new(Database::open_in_memory()?));
    snapshots.record_capture(DEMO_CONTEXT, Ok(state))?;
    let stored = snapshots.load_state(DEMO_CONTEXT)?;
    println!("  Stored {} bytes for {}", stored.len(), DEMO_CONTEXT);

    section("Restore");
    let mut restored = SessionHistory::new();
    let outcome = store.apply_state(&mut restored, &stored)?;
    println!(
        "  Restored {} entries, {} frame identities, current index {:?}",
        outcome.entries_restored, outcome.identities_minted, outcome.current_index
    );
    for (index, entry) in restored.entries().iter().enumerate() {
        println!("  [{}] {} ({} frames)", index, entry.location, entry.children.len());
    }

    section("Malformed state");
    let mut untouched = demo_history();
    match store.apply_state(&mut untouched, "not valid data") {
        Ok(_) => println!("  unexpectedly accepted"),
        Err(err) => println!("  {} -> history now holds {} entries", err, untouched.entries().len()),
    }

    Ok(())
}

fn section(name: &str) {
    println!();
    println!("── {} ──", name);
}

fn demo_history() -> SessionHistory {
    let mut history = SessionHistory::new();
    history.push(SessionHistoryEntry::new("https://example.org/a").with_identity(11));
    history.push(
        SessionHistoryEntry::new("https://example.org/search")
            .with_title("Search results")
            .with_identity(12)
            .with_cache_key(3)
            .with_scroll(0, 480)
            .with_payload("Content-Type: application/x-www-form-urlencoded\r\n\r\nq=rust")
            .with_child(SessionHistoryEntry::new("https://ads.example.net/frame").with_identity(13))
            .with_empty_slot()
            .with_child(SessionHistoryEntry::new("about:blank").with_identity(13)),
    );
    history
}
