use std::fmt;

use tracing::warn;

use super::errors::SessionStoreError;
use super::literal::LiteralValue;

/// Location given to a frame slot that existed but could not be captured.
pub const BLANK_LOCATION: &str = "about:blank";

/// Largest frame identity the snapshot text carries exactly.
pub const MAX_SNAPSHOT_IDENTITY: u64 = (1 << 53) - 1;

/// Scroll offset of a document, in CSS pixels. Never negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollPosition {
    pub x: u32,
    pub y: u32,
}

impl ScrollPosition {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Builds a position from host-reported offsets, clamping into range.
    pub fn clamped(x: i64, y: i64) -> Self {
        Self {
            x: clamp_offset(x),
            y: clamp_offset(y),
        }
    }

    /// Parses the external `"x,y"` form.
    ///
    /// Each component is read like a decimal `parseInt`: leading whitespace,
    /// an optional sign, then the longest digit prefix. Components that are
    /// missing or unparsable become 0; negatives clamp to 0.
    pub fn parse(text: &str) -> Self {
        let mut parts = text.split(',');
        let x = parts.next().and_then(parse_int_prefix).unwrap_or(0);
        let y = parts.next().and_then(parse_int_prefix).unwrap_or(0);
        Self::clamped(x, y)
    }
}

impl fmt::Display for ScrollPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

fn clamp_offset(value: i64) -> u32 {
    value.clamp(0, i64::from(u32::MAX)) as u32
}

fn parse_int_prefix(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Saturate rather than fail on absurdly long digit runs.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// One navigation frame of a captured session, with its nested frames.
///
/// `title` always holds display text: captures and restores default it to
/// `location` when the host has none.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryNode {
    pub location: String,
    pub title: String,
    pub is_subframe: bool,
    pub cache_token: Option<u32>,
    pub identity: Option<u64>,
    pub scroll: ScrollPosition,
    pub payload: Option<Vec<u8>>,
    pub children: Vec<HistoryNode>,
}

impl HistoryNode {
    /// Creates a top-level node whose title defaults to its location.
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            title: location.clone(),
            location,
            ..Self::default()
        }
    }

    /// Stand-in for a frame slot that could not be captured.
    pub fn placeholder() -> Self {
        Self::new(BLANK_LOCATION)
    }

    pub fn is_placeholder(&self) -> bool {
        self.location == BLANK_LOCATION && self.children.is_empty() && self.payload.is_none()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(HistoryNode::node_count).sum::<usize>()
    }

    /// Converts the node into its external mapping.
    ///
    /// `title` is dropped when it matches `location`, `subframe` when false.
    pub fn to_literal(&self) -> LiteralValue {
        let mut entry = LiteralValue::map();
        entry.insert("url", self.location.as_str().into());
        entry.insert(
            "children",
            LiteralValue::List(self.children.iter().map(HistoryNode::to_literal).collect()),
        );
        if !self.title.is_empty() && self.title != self.location {
            entry.insert("title", self.title.as_str().into());
        }
        if self.is_subframe {
            entry.insert("subframe", true.into());
        }
        if let Some(token) = self.cache_token {
            entry.insert("cacheKey", token.into());
        }
        if let Some(id) = self.identity {
            entry.insert("ID", id.into());
        }
        entry.insert("scroll", self.scroll.to_string().into());
        if let Some(payload) = &self.payload {
            entry.insert("postdata", payload_to_text(payload).into());
        }
        entry
    }

    /// Reads a node from its external mapping.
    ///
    /// A missing or empty `url` is an error. Every other field falls back to its
    /// default when absent or of the wrong kind. Children that cannot be read are
    /// replaced by blank placeholders so sibling positions stay aligned.
    pub fn from_literal(value: &LiteralValue) -> Result<Self, SessionStoreError> {
        if !matches!(value, LiteralValue::Map(_)) {
            return Err(SessionStoreError::InvalidSnapshot(format!(
                "history entry must be a mapping, found {}",
                value.kind()
            )));
        }

        let location = value
            .get("url")
            .and_then(LiteralValue::as_str)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                SessionStoreError::InvalidSnapshot("history entry without url".to_string())
            })?
            .to_string();

        let title = value
            .get("title")
            .and_then(LiteralValue::as_str)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| location.clone());

        let scroll = match value.get("scroll") {
            Some(LiteralValue::Text(text)) => ScrollPosition::parse(text),
            Some(other) if !other.is_null() => {
                warn!(url = %location, kind = other.kind(), "ignoring non-text scroll position");
                ScrollPosition::default()
            }
            _ => ScrollPosition::default(),
        };

        let children = match value.get("children") {
            Some(LiteralValue::List(items)) => items
                .iter()
                .enumerate()
                .map(|(index, child)| {
                    HistoryNode::from_literal(child).unwrap_or_else(|err| {
                        warn!(parent = %location, index, error = %err, "replacing unreadable child frame with a placeholder");
                        HistoryNode::placeholder()
                    })
                })
                .collect(),
            _ => Vec::new(),
        };

        Ok(Self {
            title,
            is_subframe: matches!(value.get("subframe"), Some(LiteralValue::Bool(true))),
            cache_token: value
                .get("cacheKey")
                .and_then(LiteralValue::as_positive_integer)
                .and_then(|token| u32::try_from(token).ok()),
            identity: value
                .get("ID")
                .and_then(LiteralValue::as_positive_integer)
                .filter(|&id| id <= MAX_SNAPSHOT_IDENTITY),
            scroll,
            payload: value
                .get("postdata")
                .and_then(LiteralValue::as_str)
                .filter(|text| !text.is_empty())
                .map(payload_from_text),
            children,
            location,
        })
    }
}

/// The captured back/forward list of one browsing context.
///
/// The current position is the last entry by convention.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSnapshot {
    pub entries: Vec<HistoryNode>,
}

impl SessionSnapshot {
    pub fn new(entries: Vec<HistoryNode>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index the restored history should land on, if there is any entry.
    pub fn current_index(&self) -> Option<usize> {
        self.entries.len().checked_sub(1)
    }

    /// Converts the snapshot into its external `{ history: [...] }` mapping.
    pub fn to_literal(&self) -> LiteralValue {
        let mut state = LiteralValue::map();
        state.insert(
            "history",
            LiteralValue::List(self.entries.iter().map(HistoryNode::to_literal).collect()),
        );
        state
    }

    /// Reads a snapshot from its external mapping.
    ///
    /// An absent or null `history` means an empty session.
    pub fn from_literal(value: &LiteralValue) -> Result<Self, SessionStoreError> {
        if !matches!(value, LiteralValue::Map(_)) {
            return Err(SessionStoreError::InvalidSnapshot(format!(
                "session state must be a mapping, found {}",
                value.kind()
            )));
        }

        let entries = match value.get("history") {
            None | Some(LiteralValue::Null) => Vec::new(),
            Some(LiteralValue::List(items)) => items
                .iter()
                .map(HistoryNode::from_literal)
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(SessionStoreError::InvalidSnapshot(format!(
                    "history must be a sequence, found {}",
                    other.kind()
                )))
            }
        };

        Ok(Self { entries })
    }
}

/// Maps payload bytes to text one char per byte (U+0000..U+00FF).
pub fn payload_to_text(payload: &[u8]) -> String {
    payload.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of [`payload_to_text`]. Text holding chars above U+00FF did not come
/// from a byte stream and is taken as UTF-8 instead.
pub fn payload_from_text(text: &str) -> Vec<u8> {
    if text.chars().all(|c| u32::from(c) <= 0xFF) {
        text.chars().map(|c| u32::from(c) as u8).collect()
    } else {
        text.as_bytes().to_vec()
    }
}
