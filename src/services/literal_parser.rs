//! Literal Parser for the session store.
//!
//! Reads snapshot text back into a [`LiteralValue`]. This is a recursive-descent
//! parser over literal data only (mappings, sequences, text, numbers, booleans,
//! null), so evaluating a snapshot can never run anything.
//!
//! Accepted beyond strict JSON, because older snapshots were written as script
//! literals: wrapping parentheses, unquoted identifier keys, single-quoted text,
//! trailing commas, a leading `+` on numbers, hexadecimal integers and the
//! `\v`, `\0`, `\xHH`, `\'` and `\/` escapes.

use crate::types::errors::SessionStoreError;
use crate::types::literal::LiteralValue;
use crate::types::settings::SessionStoreSettings;

/// Parses literal text with the default nesting bound.
pub fn evaluate(text: &str) -> Result<LiteralValue, SessionStoreError> {
    evaluate_with_depth(text, SessionStoreSettings::default().max_nesting_depth)
}

/// Parses literal text, rejecting input nested deeper than `max_depth`.
///
/// # Errors
/// Any syntax problem is reported as `InvalidSnapshot` with the byte offset.
pub fn evaluate_with_depth(text: &str, max_depth: usize) -> Result<LiteralValue, SessionStoreError> {
    let mut parser = LiteralParser {
        src: text,
        pos: 0,
        depth: 0,
        max_depth,
    };
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos < parser.src.len() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(value)
}

struct LiteralParser<'a> {
    src: &'a str,
    pos: usize,
    depth: usize,
    max_depth: usize,
}

impl<'a> LiteralParser<'a> {
    fn error(&self, msg: &str) -> SessionStoreError {
        SessionStoreError::InvalidSnapshot(format!("{} at offset {}", msg, self.pos))
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '\u{feff}' {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn enter(&mut self) -> Result<(), SessionStoreError> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(self.error("nesting too deep"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse_value(&mut self) -> Result<LiteralValue, SessionStoreError> {
        self.skip_whitespace();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('(') => {
                self.enter()?;
                self.bump();
                let value = self.parse_value()?;
                self.skip_whitespace();
                if !self.eat(')') {
                    return Err(self.error("expected ')'"));
                }
                self.leave();
                Ok(value)
            }
            Some('{') => self.parse_map(),
            Some('[') => self.parse_list(),
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.parse_text(quote).map(LiteralValue::Text)
            }
            Some(c) if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => {
                self.parse_number().map(LiteralValue::Number)
            }
            Some(c) if is_identifier_start(c) => {
                let start = self.pos;
                let word = self.parse_identifier();
                match word {
                    "true" => Ok(LiteralValue::Bool(true)),
                    "false" => Ok(LiteralValue::Bool(false)),
                    "null" => Ok(LiteralValue::Null),
                    _ => {
                        self.pos = start;
                        Err(self.error(&format!("unexpected identifier `{}`", word)))
                    }
                }
            }
            Some(c) => Err(self.error(&format!("unexpected character {:?}", c))),
        }
    }

    fn parse_list(&mut self) -> Result<LiteralValue, SessionStoreError> {
        self.enter()?;
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_whitespace();
            if self.eat(']') {
                break;
            }
            items.push(self.parse_value()?);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                break;
            }
            return Err(self.error("expected ',' or ']'"));
        }
        self.leave();
        Ok(LiteralValue::List(items))
    }

    fn parse_map(&mut self) -> Result<LiteralValue, SessionStoreError> {
        self.enter()?;
        self.bump();
        let mut map = LiteralValue::map();
        loop {
            self.skip_whitespace();
            if self.eat('}') {
                break;
            }
            let key = self.parse_key()?;
            self.skip_whitespace();
            if !self.eat(':') {
                return Err(self.error("expected ':'"));
            }
            let value = self.parse_value()?;
            // Later duplicates win.
            map.insert(key, value);
            self.skip_whitespace();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                break;
            }
            return Err(self.error("expected ',' or '}'"));
        }
        self.leave();
        Ok(map)
    }

    fn parse_key(&mut self) -> Result<String, SessionStoreError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                self.parse_text(quote)
            }
            Some(c) if is_identifier_start(c) => Ok(self.parse_identifier().to_string()),
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let n = self.parse_number()?;
                crate::services::literal_encoder::format_number(n)
                    .map_err(|_| self.error("invalid numeric key"))
            }
            _ => Err(self.error("expected a key")),
        }
    }

    fn parse_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if is_identifier_part(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    fn parse_number(&mut self) -> Result<f64, SessionStoreError> {
        let negative = match self.peek() {
            Some('-') => {
                self.bump();
                true
            }
            Some('+') => {
                self.bump();
                false
            }
            _ => false,
        };

        let rest = &self.src[self.pos..];
        if rest.starts_with("0x") || rest.starts_with("0X") {
            self.pos += 2;
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            let digits = &self.src[start..self.pos];
            let value = u64::from_str_radix(digits, 16)
                .map(|v| v as f64)
                .map_err(|_| self.error("invalid hexadecimal number"))?;
            return Ok(if negative { -value } else { value });
        }

        let start = self.pos;
        let mut int_digits = 0;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
            int_digits += 1;
        }
        let mut frac_digits = 0;
        if self.eat('.') {
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
                frac_digits += 1;
            }
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(self.error("expected digits"));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some('+' | '-')) {
                self.pos += 1;
            }
            let exp_start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.pos += 1;
            }
            if self.pos == exp_start {
                return Err(self.error("expected exponent digits"));
            }
        }
        if matches!(self.peek(), Some(c) if is_identifier_start(c)) {
            return Err(self.error("identifier directly after number"));
        }

        let value = self.src[start..self.pos]
            .parse::<f64>()
            .map_err(|_| self.error("invalid number"))?;
        Ok(if negative { -value } else { value })
    }

    /// Reads text up to the closing `quote`; the opening quote is consumed.
    fn parse_text(&mut self, quote: char) -> Result<String, SessionStoreError> {
        let mut out = String::new();
        let mut pending_high: Option<u16> = None;

        loop {
            let c = self.bump().ok_or_else(|| self.error("unterminated text"))?;
            if c == quote {
                break;
            }
            match c {
                '\n' | '\r' | '\u{2028}' | '\u{2029}' => {
                    return Err(self.error("line break inside text"));
                }
                '\\' => {
                    let escaped = self.bump().ok_or_else(|| self.error("unterminated escape"))?;
                    let unit = match escaped {
                        'u' => Some(self.parse_hex_unit(4)?),
                        'x' => Some(self.parse_hex_unit(2)?),
                        _ => None,
                    };
                    match unit {
                        Some(unit) => push_utf16_unit(&mut out, &mut pending_high, unit),
                        None => {
                            flush_high(&mut out, &mut pending_high);
                            match escaped {
                                'b' => out.push('\u{8}'),
                                't' => out.push('\t'),
                                'n' => out.push('\n'),
                                'f' => out.push('\u{c}'),
                                'r' => out.push('\r'),
                                'v' => out.push('\u{b}'),
                                '0' if !matches!(self.peek(), Some(d) if d.is_ascii_digit()) => {
                                    out.push('\0')
                                }
                                // Escaped line break continues the text.
                                '\n' | '\u{2028}' | '\u{2029}' => {}
                                '\r' => {
                                    self.eat('\n');
                                }
                                c if c.is_ascii_digit() => {
                                    return Err(self.error("octal escapes are not supported"));
                                }
                                other => out.push(other),
                            }
                        }
                    }
                }
                other => {
                    flush_high(&mut out, &mut pending_high);
                    out.push(other);
                }
            }
        }

        flush_high(&mut out, &mut pending_high);
        Ok(out)
    }

    fn parse_hex_unit(&mut self, len: usize) -> Result<u16, SessionStoreError> {
        let digits = self
            .src
            .get(self.pos..self.pos + len)
            .filter(|d| d.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("malformed hexadecimal escape"))?;
        let unit = u16::from_str_radix(digits, 16).map_err(|_| self.error("malformed hexadecimal escape"))?;
        self.pos += len;
        Ok(unit)
    }
}

/// Appends one UTF-16 code unit, pairing surrogates. Unpaired surrogates
/// become U+FFFD.
fn push_utf16_unit(out: &mut String, pending_high: &mut Option<u16>, unit: u16) {
    match unit {
        0xD800..=0xDBFF => {
            flush_high(out, pending_high);
            *pending_high = Some(unit);
        }
        0xDC00..=0xDFFF => match pending_high.take() {
            Some(high) => {
                let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(unit) - 0xDC00);
                out.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            None => out.push(char::REPLACEMENT_CHARACTER),
        },
        _ => {
            flush_high(out, pending_high);
            out.push(char::from_u32(u32::from(unit)).unwrap_or(char::REPLACEMENT_CHARACTER));
        }
    }
}

fn flush_high(out: &mut String, pending_high: &mut Option<u16>) {
    if pending_high.take().is_some() {
        out.push(char::REPLACEMENT_CHARACTER);
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_identifier_part(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
