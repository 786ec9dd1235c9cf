//! Session Store for a browsing context.
//!
//! Public entry points: [`SessionStoreTrait::capture_state`] turns a live
//! navigation history into snapshot text, [`SessionStoreTrait::apply_state`]
//! rebuilds a live history from such text.

use tracing::{info, warn};

use crate::managers::restorer::{RestoreOutcome, Restorer};
use crate::managers::snapshotter::Snapshotter;
use crate::services::identity_pool::IdentityPool;
use crate::services::literal_encoder;
use crate::services::literal_parser;
use crate::services::privacy_filter::PrivacyFilter;
use crate::types::errors::SessionStoreError;
use crate::types::history::SessionSnapshot;
use crate::types::navigation::NavigationHistory;
use crate::types::settings::SessionStoreSettings;

/// Trait defining session capture and restore operations.
pub trait SessionStoreTrait {
    /// Captures `history` as a snapshot tree.
    fn capture_snapshot<H: NavigationHistory>(&self, history: &H) -> SessionSnapshot;
    /// Captures `history` as snapshot text.
    fn capture_state<H: NavigationHistory>(&self, history: &H) -> Result<String, SessionStoreError>;
    /// Replaces the contents of `history` with `snapshot`.
    fn restore_snapshot<H: NavigationHistory>(&self, history: &mut H, snapshot: &SessionSnapshot) -> RestoreOutcome;
    /// Replaces the contents of `history` with the snapshot in `state`.
    fn apply_state<H: NavigationHistory>(&self, history: &mut H, state: &str) -> Result<RestoreOutcome, SessionStoreError>;
}

/// Session store configured from [`SessionStoreSettings`].
pub struct SessionStore<'p> {
    settings: SessionStoreSettings,
    filter: PrivacyFilter,
    pool: &'p IdentityPool,
}

impl SessionStore<'static> {
    /// Creates a store minting identities from the process-wide pool.
    pub fn new(settings: SessionStoreSettings) -> Self {
        Self::with_identity_pool(settings, IdentityPool::global())
    }
}

impl Default for SessionStore<'static> {
    fn default() -> Self {
        Self::new(SessionStoreSettings::default())
    }
}

impl<'p> SessionStore<'p> {
    /// Creates a store minting identities from `pool`.
    pub fn with_identity_pool(settings: SessionStoreSettings, pool: &'p IdentityPool) -> Self {
        Self {
            filter: PrivacyFilter::new(&settings),
            settings,
            pool,
        }
    }

    pub fn settings(&self) -> &SessionStoreSettings {
        &self.settings
    }

    /// Encodes a snapshot as text.
    pub fn encode_snapshot(snapshot: &SessionSnapshot) -> Result<String, SessionStoreError> {
        literal_encoder::encode(&snapshot.to_literal())
    }

    /// Evaluates snapshot text into a snapshot tree.
    pub fn decode_snapshot(&self, state: &str) -> Result<SessionSnapshot, SessionStoreError> {
        let value = literal_parser::evaluate_with_depth(state, self.settings.max_nesting_depth)?;
        SessionSnapshot::from_literal(&value)
    }
}

impl<'p> SessionStoreTrait for SessionStore<'p> {
    fn capture_snapshot<H: NavigationHistory>(&self, history: &H) -> SessionSnapshot {
        Snapshotter::new(&self.filter).snapshot(history)
    }

    /// Captures and encodes `history`.
    ///
    /// On error the caller should keep whatever snapshot it saved before.
    fn capture_state<H: NavigationHistory>(&self, history: &H) -> Result<String, SessionStoreError> {
        let snapshot = self.capture_snapshot(history);
        Self::encode_snapshot(&snapshot).map_err(|err| {
            warn!(error = %err, "session capture failed");
            err
        })
    }

    fn restore_snapshot<H: NavigationHistory>(&self, history: &mut H, snapshot: &SessionSnapshot) -> RestoreOutcome {
        Restorer::new(self.pool).restore(history, snapshot)
    }

    /// Purges `history`, then restores the snapshot held in `state`.
    ///
    /// If `state` cannot be evaluated the history is left empty and
    /// `InvalidSnapshot` is returned.
    fn apply_state<H: NavigationHistory>(&self, history: &mut H, state: &str) -> Result<RestoreOutcome, SessionStoreError> {
        if history.entry_count() > 0 {
            history.purge();
        }

        let snapshot = self.decode_snapshot(state).map_err(|err| {
            warn!(error = %err, "not restoring unreadable session state");
            err
        })?;

        let outcome = self.restore_snapshot(history, &snapshot);
        info!(entries = outcome.entries_restored, "session state applied");
        Ok(outcome)
    }
}
