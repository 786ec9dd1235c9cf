use std::fmt;

// === SessionStoreError ===

/// Errors raised while capturing, encoding, evaluating or restoring session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStoreError {
    /// The text failed to evaluate, or evaluated to a shape missing required fields.
    InvalidSnapshot(String),
    /// A value with no textual representation (non-finite number) was encoded.
    UnencodableValue(String),
    /// The post-encode structural scan found characters outside the data syntax.
    EncodingIntegrityFailure(String),
    /// Reading a live submitted-payload stream failed. Recovered per node.
    PayloadCaptureFailure(String),
    /// Navigating to the last restored index failed. Recovered per restore.
    RestoreIndexFailure(String),
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStoreError::InvalidSnapshot(msg) => write!(f, "Invalid snapshot: {}", msg),
            SessionStoreError::UnencodableValue(msg) => write!(f, "Unencodable value: {}", msg),
            SessionStoreError::EncodingIntegrityFailure(msg) => {
                write!(f, "Encoding integrity failure: {}", msg)
            }
            SessionStoreError::PayloadCaptureFailure(msg) => {
                write!(f, "Payload capture failed: {}", msg)
            }
            SessionStoreError::RestoreIndexFailure(msg) => {
                write!(f, "Restore index failure: {}", msg)
            }
        }
    }
}

impl std::error::Error for SessionStoreError {}

// === NavigationError ===

/// Errors reported by a live navigation history handle.
#[derive(Debug, Clone, PartialEq)]
pub enum NavigationError {
    /// The requested index does not address an entry.
    IndexOutOfRange(usize),
    /// The history holds no entries.
    EmptyHistory,
    /// The host refused the operation.
    Rejected(String),
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::IndexOutOfRange(index) => {
                write!(f, "History index out of range: {}", index)
            }
            NavigationError::EmptyHistory => write!(f, "History is empty"),
            NavigationError::Rejected(msg) => write!(f, "Navigation rejected: {}", msg),
        }
    }
}

impl std::error::Error for NavigationError {}

// === SettingsError ===

/// Errors related to session store settings.
#[derive(Debug)]
pub enum SettingsError {
    /// The settings file could not be read or written.
    IoError(String),
    /// The settings file is not valid JSON for [`SessionStoreSettings`](crate::types::settings::SessionStoreSettings).
    SerializationError(String),
    /// No top-level setting has this name.
    InvalidKey(String),
    /// The value has the wrong type or is out of range.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === StoreError ===

/// Errors related to the persisted snapshot store.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite rejected a statement.
    DatabaseError(String),
    /// No snapshot is stored for the given browsing context.
    NotFound(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DatabaseError(msg) => write!(f, "Snapshot store database error: {}", msg),
            StoreError::NotFound(context) => {
                write!(f, "No snapshot stored for context: {}", context)
            }
        }
    }
}

impl std::error::Error for StoreError {}
