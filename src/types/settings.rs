use serde::{Deserialize, Serialize};

/// Privacy levels at or above this never capture payload from unencrypted origins.
pub const PRIVACY_FULL: i32 = 1;
/// Privacy levels at or above this never capture payload from encrypted origins.
pub const PRIVACY_ENCRYPTED: i32 = 2;

/// Payload limit meaning "no cap".
pub const POSTDATA_UNLIMITED: i64 = -1;

/// Header block stripped from a payload before measuring it against the cap.
pub const DEFAULT_POSTDATA_HEADER_PATTERN: &str = "^(Content-.*\r\n)+(\r\n)*";

/// Tunables of the session store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionStoreSettings {
    /// Ordered privacy level; higher captures less. See [`PRIVACY_FULL`].
    pub privacy_level: i32,
    /// Maximum captured payload length in bytes after header stripping.
    /// `-1` is unlimited and `0` disables payload capture.
    pub postdata_limit: i64,
    /// Regular expression matching the leading header block of a payload.
    pub postdata_header_pattern: String,
    /// Deepest nesting the snapshot evaluator accepts.
    pub max_nesting_depth: usize,
}

impl Default for SessionStoreSettings {
    fn default() -> Self {
        Self {
            privacy_level: PRIVACY_FULL,
            postdata_limit: POSTDATA_UNLIMITED,
            postdata_header_pattern: DEFAULT_POSTDATA_HEADER_PATTERN.to_string(),
            max_nesting_depth: 512,
        }
    }
}
