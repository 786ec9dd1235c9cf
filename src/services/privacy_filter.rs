//! Privacy Filter for the session store.
//!
//! Decides whether submitted form data may be captured with a session, and
//! enforces the configured size cap on what is captured.

use std::io::{Read, Seek, SeekFrom};

use regex::bytes::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::types::errors::SessionStoreError;
use crate::types::navigation::PayloadStream;
use crate::types::settings::{SessionStoreSettings, POSTDATA_UNLIMITED, PRIVACY_ENCRYPTED, PRIVACY_FULL};

/// Returns whether payload capture is allowed at `privacy_level` for an origin.
///
/// Allowed when the level is strictly below the threshold for the origin kind:
/// [`PRIVACY_ENCRYPTED`] for encrypted origins, [`PRIVACY_FULL`] otherwise.
pub fn allow_capture(is_encrypted_origin: bool, privacy_level: i32) -> bool {
    let threshold = if is_encrypted_origin {
        PRIVACY_ENCRYPTED
    } else {
        PRIVACY_FULL
    };
    privacy_level < threshold
}

/// Compiles a header-stripping pattern, rejecting invalid expressions.
///
/// Payloads are raw bytes, so the pattern runs with Unicode mode off: `.`
/// matches any byte but a line feed.
pub fn compile_header_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).unicode(false).build()
}

/// Trait defining privacy filter operations.
pub trait PrivacyFilterTrait {
    /// Whether payload from an origin of this kind may be captured at all.
    fn allows_capture(&self, is_encrypted_origin: bool) -> bool;
    /// Whether `payload`, after header stripping, fits the configured cap.
    fn within_limit(&self, payload: &[u8]) -> bool;
    /// Rewinds and reads `stream`, returning the payload if it fits the cap.
    fn capture_payload(&self, stream: &mut dyn PayloadStream) -> Result<Option<Vec<u8>>, SessionStoreError>;
}

/// Privacy filter configured from [`SessionStoreSettings`].
pub struct PrivacyFilter {
    privacy_level: i32,
    postdata_limit: i64,
    header_pattern: Option<Regex>,
}

impl PrivacyFilter {
    pub fn new(settings: &SessionStoreSettings) -> Self {
        let header_pattern = match compile_header_pattern(&settings.postdata_header_pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(pattern = %settings.postdata_header_pattern, error = %e, "invalid postdata header pattern, measuring payloads unstripped");
                None
            }
        };
        Self {
            privacy_level: settings.privacy_level,
            postdata_limit: settings.postdata_limit,
            header_pattern,
        }
    }

    /// Length of `payload` once its leading header block is stripped.
    pub fn stripped_len(&self, payload: &[u8]) -> usize {
        match &self.header_pattern {
            Some(re) => match re.find(payload) {
                Some(m) if m.start() == 0 => payload.len() - m.end(),
                _ => payload.len(),
            },
            None => payload.len(),
        }
    }
}

impl Default for PrivacyFilter {
    fn default() -> Self {
        Self::new(&SessionStoreSettings::default())
    }
}

impl PrivacyFilterTrait for PrivacyFilter {
    fn allows_capture(&self, is_encrypted_origin: bool) -> bool {
        // A zero cap switches payload capture off entirely.
        self.postdata_limit != 0 && allow_capture(is_encrypted_origin, self.privacy_level)
    }

    fn within_limit(&self, payload: &[u8]) -> bool {
        if self.postdata_limit == POSTDATA_UNLIMITED {
            return true;
        }
        match u64::try_from(self.postdata_limit) {
            Ok(limit) => self.stripped_len(payload) as u64 <= limit,
            // Other negative caps are treated as unlimited.
            Err(_) => true,
        }
    }

    fn capture_payload(&self, stream: &mut dyn PayloadStream) -> Result<Option<Vec<u8>>, SessionStoreError> {
        stream
            .seek(SeekFrom::Start(0))
            .map_err(|e| SessionStoreError::PayloadCaptureFailure(format!("rewind failed: {}", e)))?;

        let mut payload = Vec::new();
        stream
            .read_to_end(&mut payload)
            .map_err(|e| SessionStoreError::PayloadCaptureFailure(format!("read failed: {}", e)))?;

        if payload.is_empty() {
            return Ok(None);
        }
        if !self.within_limit(&payload) {
            debug!(len = payload.len(), limit = self.postdata_limit, "dropping payload over the size cap");
            return Ok(None);
        }
        Ok(Some(payload))
    }
}
