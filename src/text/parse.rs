//! The table-literal lexer/cursor driving text decoding.
//!
//! [`TextParser`] is a non-allocating cursor over the input: idents,
//! short strings, and long-bracket strings come back as slices of the
//! source. Parsing is recursive descent; every composite shape brackets
//! its work in [`descend`](TextParser::descend) /
//! [`ascend`](TextParser::ascend) so nesting is bounded by
//! `max_depth`. Sum types backtrack by [`save`](TextParser::save) /
//! [`restore`](TextParser::restore).
//!
//! Whitespace and comments (`--` to end of line, `--[[ ... ]]` long
//! form) are consumed after every token, so the cursor always rests on
//! the next significant byte.

use super::ParseOptions;
use crate::error::{Error, Result};

/// Outcome of looking for a `name =` / `[key] =` entry opener.
#[derive(Debug, Clone, Copy)]
pub enum KeyToken<'a> {
    /// A key and its `=` were consumed.
    Key(&'a str),
    /// The closing `}` was consumed instead.
    End,
    /// The entry is positional; nothing was consumed.
    NotKey,
}

/// Snapshot of the cursor for sum-type backtracking.
#[derive(Debug, Clone, Copy)]
pub struct SavePoint {
    pos: usize,
    depth: u32,
}

#[derive(Debug)]
pub struct TextParser<'a> {
    src: &'a [u8],
    pos: usize,
    depth: u32,
    opts: ParseOptions,
    skip_initial: bool,
}

impl<'a> TextParser<'a> {
    pub fn new(text: &'a str, opts: ParseOptions) -> Self {
        let skip_initial = opts.skip_initial_scope;
        let mut p = Self {
            src: text.as_bytes(),
            pos: 0,
            depth: 0,
            opts,
            skip_initial,
        };
        p.skip_ws();
        p
    }

    #[inline]
    pub fn options(&self) -> &ParseOptions {
        &self.opts
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos == self.src.len()
    }

    #[inline]
    fn bad(&self) -> Error {
        Error::BadFormat { offset: self.pos }
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    /// First significant byte, for sum-type prefix prechecks.
    pub fn peek_significant(&mut self) -> Result<u8> {
        self.skip_ws();
        self.peek().ok_or_else(|| self.bad())
    }

    pub fn save(&self) -> SavePoint {
        SavePoint {
            pos: self.pos,
            depth: self.depth,
        }
    }

    pub fn restore(&mut self, save: SavePoint) {
        self.pos = save.pos;
        self.depth = save.depth;
    }

    /// Consumed-once flag: the first aggregate to ask inherits
    /// `skip_initial_scope` and parses a brace-less field list.
    pub fn take_skip_initial_scope(&mut self) -> bool {
        std::mem::take(&mut self.skip_initial)
    }

    pub fn descend(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.opts.max_depth {
            return Err(Error::StackOverflow {
                max_depth: self.opts.max_depth,
            });
        }
        Ok(())
    }

    pub fn ascend(&mut self) {
        self.depth -= 1;
    }

    pub fn skip_ws(&mut self) {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
                self.pos += 1;
            }
            if self.peek() == Some(b'-') && self.src.get(self.pos + 1) == Some(&b'-') {
                self.pos += 2;
                self.skip_comment();
                continue;
            }
            return;
        }
    }

    fn skip_comment(&mut self) {
        if self.peek() == Some(b'[') {
            let mut level = 0;
            let mut at = self.pos + 1;
            while self.src.get(at) == Some(&b'=') {
                level += 1;
                at += 1;
            }
            if self.src.get(at) == Some(&b'[') {
                self.pos = at + 1;
                // an unterminated long comment swallows the rest
                let _ = self.long_bracket_body(level);
                return;
            }
        }
        while matches!(self.peek(), Some(c) if c != b'\n') {
            self.pos += 1;
        }
    }

    pub fn expect(&mut self, ch: u8) -> Result<()> {
        if self.peek() != Some(ch) {
            return Err(self.bad());
        }
        self.pos += 1;
        self.skip_ws();
        Ok(())
    }

    pub fn maybe(&mut self, ch: u8) -> bool {
        if self.peek() == Some(ch) {
            self.pos += 1;
            self.skip_ws();
            true
        } else {
            false
        }
    }

    fn is_ident_start(c: u8) -> bool {
        c.is_ascii_alphabetic() || c == b'_'
    }

    fn is_ident_continue(c: u8) -> bool {
        c.is_ascii_alphanumeric() || c == b'_'
    }

    pub fn parse_ident(&mut self) -> Result<&'a str> {
        match self.peek() {
            Some(c) if Self::is_ident_start(c) => {}
            _ => return Err(self.bad()),
        }
        let start = self.pos;
        while matches!(self.peek(), Some(c) if Self::is_ident_continue(c)) {
            self.pos += 1;
        }
        let out = &self.src[start..self.pos];
        self.skip_ws();
        Ok(std::str::from_utf8(out).expect("idents are ascii"))
    }

    /// Consumes the literal `nil` if present.
    pub fn maybe_nil(&mut self) -> bool {
        if self.src[self.pos..].starts_with(b"nil")
            && !matches!(self.src.get(self.pos + 3), Some(&c) if Self::is_ident_continue(c))
        {
            self.pos += 3;
            self.skip_ws();
            true
        } else {
            false
        }
    }

    /// Quoted or long-bracket string. Short strings run to the matching
    /// quote with no escape processing; long strings run to the
    /// matching `]=*]` of their opening level.
    pub fn parse_string(&mut self) -> Result<&'a str> {
        match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                let start = self.pos + 1;
                let mut at = start;
                loop {
                    match self.src.get(at) {
                        Some(&c) if c == q => break,
                        Some(_) => at += 1,
                        None => return Err(self.bad()),
                    }
                }
                let out = &self.src[start..at];
                self.pos = at + 1;
                self.skip_ws();
                std::str::from_utf8(out).map_err(|_| self.bad())
            }
            Some(b'[') => self.parse_long_bracket(),
            _ => Err(self.bad()),
        }
    }

    /// Long-bracket string, cursor at the opening `[`.
    pub fn parse_long_bracket(&mut self) -> Result<&'a str> {
        let start_pos = self.pos;
        if self.peek() != Some(b'[') {
            return Err(self.bad());
        }
        self.pos += 1;
        let mut level = 0;
        while self.peek() == Some(b'=') {
            level += 1;
            self.pos += 1;
        }
        if self.peek() != Some(b'[') {
            self.pos = start_pos;
            return Err(self.bad());
        }
        self.pos += 1;
        let body = self.long_bracket_body(level)?;
        self.skip_ws();
        std::str::from_utf8(body).map_err(|_| self.bad())
    }

    fn long_bracket_body(&mut self, level: usize) -> Result<&'a [u8]> {
        let start = self.pos;
        loop {
            let end = self.pos;
            match self.peek() {
                None => return Err(self.bad()),
                Some(b']') => {
                    let tail = &self.src[end + 1..];
                    if tail.len() >= level + 1
                        && tail[..level].iter().all(|&c| c == b'=')
                        && tail[level] == b']'
                    {
                        self.pos = end + level + 2;
                        return Ok(&self.src[start..end]);
                    }
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Decimal or `0x`-hex integer with optional leading minus.
    pub fn parse_integer(&mut self) -> Result<i128> {
        let at = self.pos;
        let neg = self.peek() == Some(b'-');
        if neg {
            self.pos += 1;
        }
        let radix: u32 = if self.src[self.pos..].starts_with(b"0x") {
            self.pos += 2;
            16
        } else {
            10
        };
        let digits_start = self.pos;
        while matches!(self.peek(), Some(c) if (c as char).is_digit(radix)) {
            self.pos += 1;
        }
        if self.pos == digits_start {
            self.pos = at;
            return Err(self.bad());
        }
        let mut v: i128 = 0;
        for &c in &self.src[digits_start..self.pos] {
            let d = (c as char).to_digit(radix).expect("scanned digit") as i128;
            v = match v.checked_mul(radix as i128).and_then(|v| v.checked_add(d)) {
                Some(v) => v,
                None => {
                    self.pos = at;
                    return Err(self.bad());
                }
            };
        }
        self.skip_ws();
        Ok(if neg { -v } else { v })
    }

    /// Raw token for floating-point parsing: the maximal run of
    /// `[-+.0-9eE]` bytes.
    pub fn float_token(&mut self) -> Result<&'a str> {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'-' | b'+' | b'.' | b'e' | b'E' | b'0'..=b'9')
        ) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.bad());
        }
        let out = &self.src[start..self.pos];
        self.skip_ws();
        Ok(std::str::from_utf8(out).expect("float tokens are ascii"))
    }

    pub fn table_begin(&mut self) -> Result<()> {
        self.expect(b'{')
    }

    pub fn table_end(&mut self) -> Result<()> {
        self.expect(b'}')
    }

    /// Consumes an entry separator if one is present.
    pub fn table_next(&mut self) -> bool {
        if matches!(self.peek(), Some(b',' | b';')) {
            self.pos += 1;
            self.skip_ws();
            true
        } else {
            false
        }
    }

    /// True while positional entries remain; consumes the closing brace
    /// otherwise.
    pub fn table_array_entry(&mut self) -> bool {
        !self.maybe(b'}')
    }

    /// Looks for a keyed entry opener: `name =`, `["name"] =`, or
    /// `[==[name]==] =`. Restores the cursor when the entry turns out
    /// to be positional.
    pub fn table_literal_key(&mut self) -> Result<KeyToken<'a>> {
        if self.maybe(b'}') {
            return Ok(KeyToken::End);
        }
        let save = self.pos;
        match self.peek() {
            Some(c) if Self::is_ident_start(c) => {
                let id = self.parse_ident()?;
                if self.peek() == Some(b'=') {
                    self.pos += 1;
                    self.skip_ws();
                    Ok(KeyToken::Key(id))
                } else {
                    self.pos = save;
                    Ok(KeyToken::NotKey)
                }
            }
            Some(b'[') => {
                self.pos += 1;
                self.skip_ws();
                match self.peek() {
                    Some(b'"' | b'\'') => {
                        let key = self.parse_string()?;
                        self.expect(b']')?;
                        self.expect(b'=')?;
                        Ok(KeyToken::Key(key))
                    }
                    _ => {
                        self.pos = save;
                        match self.parse_long_bracket() {
                            Ok(key) if self.peek() == Some(b'=') => {
                                self.pos += 1;
                                self.skip_ws();
                                Ok(KeyToken::Key(key))
                            }
                            _ => {
                                self.pos = save;
                                Ok(KeyToken::NotKey)
                            }
                        }
                    }
                }
            }
            _ => Ok(KeyToken::NotKey),
        }
    }

    /// Skips one value of any shape: a scalar token, a string, or a
    /// whole table with arbitrary nesting. Strings and comments inside
    /// skipped tables are honored, so a brace in a string never
    /// unbalances the scan.
    pub fn skip_value(&mut self) -> Result<()> {
        self.skip_ws();
        match self.peek().ok_or_else(|| self.bad())? {
            b'{' => {
                let mut depth = 0usize;
                loop {
                    self.skip_ws();
                    match self.peek().ok_or_else(|| self.bad())? {
                        b'{' => {
                            depth += 1;
                            self.pos += 1;
                        }
                        b'}' => {
                            depth -= 1;
                            self.pos += 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        b'"' | b'\'' => {
                            self.parse_string()?;
                        }
                        b'[' if self.long_bracket_ahead() => {
                            self.parse_long_bracket()?;
                        }
                        _ => self.pos += 1,
                    }
                }
                self.skip_ws();
                Ok(())
            }
            b'"' | b'\'' => self.parse_string().map(|_| ()),
            b'[' if self.long_bracket_ahead() => self.parse_long_bracket().map(|_| ()),
            _ => {
                let start = self.pos;
                while matches!(
                    self.peek(),
                    Some(c) if !matches!(c, b',' | b';' | b'}' | b']' | b'=' | b'{')
                        && !c.is_ascii_whitespace()
                ) {
                    self.pos += 1;
                }
                if self.pos == start {
                    return Err(self.bad());
                }
                self.skip_ws();
                Ok(())
            }
        }
    }

    fn long_bracket_ahead(&self) -> bool {
        let mut at = self.pos + 1;
        while self.src.get(at) == Some(&b'=') {
            at += 1;
        }
        self.src.get(at) == Some(&b'[')
    }
}
