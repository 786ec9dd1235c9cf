/// An in-memory literal data value: the only shapes the snapshot text can carry.
///
/// Mappings keep their entries in insertion order so encoding is deterministic
/// run-to-run. Lookups are linear; snapshot objects have a handful of keys.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<LiteralValue>),
    Map(Vec<(String, LiteralValue)>),
}

impl LiteralValue {
    /// Creates an empty mapping.
    pub fn map() -> Self {
        LiteralValue::Map(Vec::new())
    }

    /// Inserts or replaces `key` in a mapping. Does nothing for other kinds.
    pub fn insert(&mut self, key: impl Into<String>, value: LiteralValue) {
        if let LiteralValue::Map(entries) = self {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    /// Looks up `key` in a mapping.
    pub fn get(&self, key: &str) -> Option<&LiteralValue> {
        match self {
            LiteralValue::Map(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            LiteralValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[LiteralValue]> {
        match self {
            LiteralValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the number as a positive integer, if it is one.
    pub fn as_positive_integer(&self) -> Option<u64> {
        let n = self.as_f64()?;
        if n.is_finite() && n >= 1.0 && n.fract() == 0.0 && n <= u64::MAX as f64 {
            Some(n as u64)
        } else {
            None
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, LiteralValue::Null)
    }

    /// Short name of the value kind, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            LiteralValue::Null => "null",
            LiteralValue::Bool(_) => "boolean",
            LiteralValue::Number(_) => "number",
            LiteralValue::Text(_) => "text",
            LiteralValue::List(_) => "sequence",
            LiteralValue::Map(_) => "mapping",
        }
    }
}

impl From<bool> for LiteralValue {
    fn from(value: bool) -> Self {
        LiteralValue::Bool(value)
    }
}

impl From<f64> for LiteralValue {
    fn from(value: f64) -> Self {
        LiteralValue::Number(value)
    }
}

impl From<u32> for LiteralValue {
    fn from(value: u32) -> Self {
        LiteralValue::Number(f64::from(value))
    }
}

impl From<u64> for LiteralValue {
    fn from(value: u64) -> Self {
        LiteralValue::Number(value as f64)
    }
}

impl From<&str> for LiteralValue {
    fn from(value: &str) -> Self {
        LiteralValue::Text(value.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(value: String) -> Self {
        LiteralValue::Text(value)
    }
}

impl From<Vec<LiteralValue>> for LiteralValue {
    fn from(value: Vec<LiteralValue>) -> Self {
        LiteralValue::List(value)
    }
}
