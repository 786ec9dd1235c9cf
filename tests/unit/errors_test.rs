use sessionstore::types::errors::*;

// === SessionStoreError Tests ===

#[test]
fn session_store_error_display_variants() {
    assert_eq!(
        SessionStoreError::InvalidSnapshot("unexpected identifier `not` at offset 0".to_string()).to_string(),
        "Invalid snapshot: unexpected identifier `not` at offset 0"
    );
    assert_eq!(
        SessionStoreError::UnencodableValue("no literal representation for NaN".to_string()).to_string(),
        "Unencodable value: no literal representation for NaN"
    );
    assert_eq!(
        SessionStoreError::EncodingIntegrityFailure("unexpected \"(\"".to_string()).to_string(),
        "Encoding integrity failure: unexpected \"(\""
    );
    assert_eq!(
        SessionStoreError::PayloadCaptureFailure("read failed: broken pipe".to_string()).to_string(),
        "Payload capture failed: read failed: broken pipe"
    );
    assert_eq!(
        SessionStoreError::RestoreIndexFailure("History is empty".to_string()).to_string(),
        "Restore index failure: History is empty"
    );
}

#[test]
fn session_store_error_implements_error_trait() {
    let err: Box<dyn std::error::Error> =
        Box::new(SessionStoreError::InvalidSnapshot("empty".to_string()));
    assert!(err.source().is_none());
}

// === NavigationError Tests ===

#[test]
fn navigation_error_display_variants() {
    assert_eq!(
        NavigationError::IndexOutOfRange(4).to_string(),
        "History index out of range: 4"
    );
    assert_eq!(NavigationError::EmptyHistory.to_string(), "History is empty");
    assert_eq!(
        NavigationError::Rejected("busy".to_string()).to_string(),
        "Navigation rejected: busy"
    );
}

// === SettingsError Tests ===

#[test]
fn settings_error_display_variants() {
    assert_eq!(
        SettingsError::IoError("disk full".to_string()).to_string(),
        "Settings I/O error: disk full"
    );
    assert_eq!(
        SettingsError::SerializationError("bad json".to_string()).to_string(),
        "Settings serialization error: bad json"
    );
    assert_eq!(
        SettingsError::InvalidKey("nope".to_string()).to_string(),
        "Invalid settings key: nope"
    );
    assert_eq!(
        SettingsError::InvalidValue("-5".to_string()).to_string(),
        "Invalid settings value: -5"
    );
}

// === StoreError Tests ===

#[test]
fn store_error_display_variants() {
    assert_eq!(
        StoreError::DatabaseError("locked".to_string()).to_string(),
        "Snapshot store database error: locked"
    );
    assert_eq!(
        StoreError::NotFound("window-1".to_string()).to_string(),
        "No snapshot stored for context: window-1"
    );
}
