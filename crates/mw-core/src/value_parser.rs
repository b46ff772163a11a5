//! The core dispatcher: classifies a value by its first non-space
//! character, detects key-value separators, and recurses into lists and
//! maps via the nested-block machinery.

use log::debug;

use crate::datetime::{parse_datetime, parse_timestamp, TemporalError};
use crate::error::{Flow, FlowResult, ParseError};
use crate::escape::find_closing_quote;
use crate::line_source::LineSource;
use crate::number::{parse_number, NumberError};
use crate::parser::Parser;
use crate::strings::{dedent, fold_lines, join_block};
use crate::value::{Map, Value};

const VALUE_NUMBER_TERMINATORS: &[char] = &[':'];

/// Either a fully parsed value, or (when a key was requested) the key text
/// plus where its value begins.
enum ValueOrKey {
    Value(Value),
    Key {
        key: String,
        value_pos: usize,
        convspec: Option<String>,
    },
}

impl<S: LineSource> Parser<S> {
    /// Column of the first non-space character considered at the start of
    /// value parsing: `current_indent` if the line is more indented than
    /// the active block, otherwise the first non-space column at or after
    /// `block_indent`.
    pub(crate) fn start_position(&self) -> usize {
        if self.block_indent < self.current_indent {
            self.current_indent
        } else {
            self.skip_spaces(self.block_indent)
        }
    }

    pub(crate) fn skip_spaces(&self, mut pos: usize) -> usize {
        while self.current_line.get(pos) == Some(&' ') {
            pos += 1;
        }
        pos
    }

    pub(crate) fn is_eol(&self, pos: usize) -> bool {
        pos >= self.current_line.len()
    }

    pub(crate) fn comment_or_eol(&self, pos: usize) -> bool {
        let pos = self.skip_spaces(pos);
        self.is_eol(pos) || self.current_line.get(pos) == Some(&'#')
    }

    fn substring_eq(&self, start: usize, word: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        if start + chars.len() > self.current_line.len() {
            return false;
        }
        self.current_line[start..start + chars.len()] == chars[..]
    }

    fn word_terminated(&self, end: usize) -> bool {
        match self.current_line.get(end) {
            None => true,
            Some(c) => c.is_whitespace() || *c == '#' || *c == ':',
        }
    }

    fn number_error(&self, e: NumberError, pos: usize) -> Flow {
        match e {
            NumberError::BadNumber => Flow::Err(ParseError::BadNumber {
                line: self.line_number,
                position: pos as u32,
            }),
            NumberError::Overflow => Flow::Err(ParseError::NumericOverflow {
                line: self.line_number,
                position: pos as u32,
            }),
        }
    }

    /// Parses a value starting at [`start_position`](Self::start_position).
    pub(crate) fn parse_value(&mut self) -> FlowResult<Value> {
        match self.parse_value_or_key(false)? {
            ValueOrKey::Value(v) => Ok(v),
            ValueOrKey::Key { .. } => unreachable!("parse_value never requests a key"),
        }
    }

    /// Parses a map key: the value classifier, but demanding the value end
    /// in a key-value separator rather than producing a scalar directly.
    fn parse_key(&mut self) -> FlowResult<(String, usize, Option<String>)> {
        match self.parse_value_or_key(true)? {
            ValueOrKey::Key {
                key,
                value_pos,
                convspec,
            } => Ok((key, value_pos, convspec)),
            ValueOrKey::Value(_) => unreachable!("parse_key always requests a key"),
        }
    }

    fn parse_value_or_key(&mut self, expect_key: bool) -> FlowResult<ValueOrKey> {
        let start_pos = self.start_position();
        let chr = self.current_line.get(start_pos).copied();

        match chr {
            Some(':') => self.parse_value_or_key_colon(start_pos, expect_key),
            Some('-') => self.parse_value_or_key_dash(start_pos, expect_key),
            Some(q @ ('"' | '\'')) => self.parse_value_or_key_quoted(start_pos, q, expect_key),
            Some(_) if self.substring_eq(start_pos, "null") && self.word_terminated(start_pos + 4) => {
                self.check_value_end(Value::Null, start_pos + 4, expect_key)
            }
            Some(_) if self.substring_eq(start_pos, "true") && self.word_terminated(start_pos + 4) => {
                self.check_value_end(Value::Bool(true), start_pos + 4, expect_key)
            }
            Some(_) if self.substring_eq(start_pos, "false") && self.word_terminated(start_pos + 5) => {
                self.check_value_end(Value::Bool(false), start_pos + 5, expect_key)
            }
            Some('+') => {
                let next = self.current_line.get(start_pos + 1).copied();
                if matches!(next, Some(c) if c.is_ascii_digit()) {
                    self.parse_number_value(start_pos + 1, 1, expect_key)
                } else {
                    self.parse_literal_string_or_map(start_pos, expect_key)
                }
            }
            Some(c) if c.is_ascii_digit() => self.parse_number_value(start_pos, 1, expect_key),
            _ => self.parse_literal_string_or_map(start_pos, expect_key),
        }
    }

    fn parse_number_value(
        &mut self,
        digits_start: usize,
        sign: i8,
        expect_key: bool,
    ) -> FlowResult<ValueOrKey> {
        let (value, end_pos) =
            parse_number(&self.current_line, digits_start, sign, VALUE_NUMBER_TERMINATORS)
                .map_err(|e| self.number_error(e, digits_start))?;
        self.check_value_end(value, end_pos, expect_key)
    }

    fn parse_value_or_key_colon(
        &mut self,
        start_pos: usize,
        expect_key: bool,
    ) -> FlowResult<ValueOrKey> {
        if expect_key {
            return Err(self.err(
                start_pos,
                "Map key expected and it cannot start with colon",
            ));
        }
        match self.parse_convspec(start_pos)? {
            Some((name, value_pos)) => {
                debug!("dispatching to conversion specifier '{name}'");
                if self.comment_or_eol(value_pos) {
                    let value =
                        self.parse_nested_block_from_next_line(move |p| p.invoke_custom_parser(&name))?;
                    Ok(ValueOrKey::Value(value))
                } else {
                    let value = self.parse_nested_block(value_pos, move |p| p.invoke_custom_parser(&name))?;
                    Ok(ValueOrKey::Value(value))
                }
            }
            None => {
                let s = self.parse_literal_string()?;
                Ok(ValueOrKey::Value(Value::String(s)))
            }
        }
    }

    fn parse_value_or_key_dash(
        &mut self,
        start_pos: usize,
        expect_key: bool,
    ) -> FlowResult<ValueOrKey> {
        let next_pos = start_pos + 1;
        let next_chr = self.current_line.get(next_pos).copied();
        if matches!(next_chr, Some(c) if c.is_ascii_digit()) {
            return self.parse_number_value(next_pos, -1, expect_key);
        }
        if next_chr.is_none() || next_chr.unwrap().is_whitespace() {
            if expect_key {
                return Err(self.err(start_pos, "Map key expected and it cannot be a list"));
            }
            return Ok(ValueOrKey::Value(self.parse_list()?));
        }
        self.parse_literal_string_or_map(start_pos, expect_key)
    }

    fn parse_value_or_key_quoted(
        &mut self,
        start_pos: usize,
        quote: char,
        expect_key: bool,
    ) -> FlowResult<ValueOrKey> {
        let start_line = self.line_number;
        let (s, end_pos) = self.parse_quoted_string(start_pos, quote)?;
        if self.line_number == start_line {
            self.check_value_end(Value::String(s), end_pos, expect_key)
        } else if self.comment_or_eol(end_pos) {
            if expect_key {
                return Err(self.err(end_pos, "Map key expected"));
            }
            Ok(ValueOrKey::Value(Value::String(s)))
        } else {
            Err(self.err(end_pos, "Bad character after quoted string"))
        }
    }

    fn check_value_end(
        &mut self,
        value: Value,
        end_pos: usize,
        expect_key: bool,
    ) -> FlowResult<ValueOrKey> {
        let pos = self.skip_spaces(end_pos);
        if self.is_eol(pos) {
            if expect_key {
                return Err(self.err(pos, "Map key expected"));
            }
            if let Err(e @ Flow::Err(_)) = self.next_block_line() {
                return Err(e);
            }
            return Ok(ValueOrKey::Value(value));
        }

        let chr = self.current_line[pos];
        if chr == ':' {
            return match self.is_kv_separator(pos)? {
                Some((convspec, value_pos)) => {
                    let key = value.to_string();
                    if expect_key {
                        Ok(ValueOrKey::Key {
                            key,
                            value_pos,
                            convspec,
                        })
                    } else {
                        Ok(ValueOrKey::Value(self.parse_map(key, convspec, value_pos)?))
                    }
                }
                None => Err(self.err(pos + 1, "Bad character encountered")),
            };
        }

        if chr != '#' {
            return Err(self.err(pos, "Bad character encountered"));
        }

        if let Err(e @ Flow::Err(_)) = self.next_block_line() {
            return Err(e);
        }
        Ok(ValueOrKey::Value(value))
    }

    fn parse_literal_string_or_map(
        &mut self,
        start_pos: usize,
        expect_key: bool,
    ) -> FlowResult<ValueOrKey> {
        let mut pos = start_pos;
        while let Some(colon_pos) = (pos..self.current_line.len()).find(|&i| self.current_line[i] == ':') {
            match self.is_kv_separator(colon_pos)? {
                Some((convspec, value_pos)) => {
                    let key = self.slice_chars(start_pos, colon_pos).trim_end().to_string();
                    if expect_key {
                        return Ok(ValueOrKey::Key {
                            key,
                            value_pos,
                            convspec,
                        });
                    }
                    return Ok(ValueOrKey::Value(self.parse_map(key, convspec, value_pos)?));
                }
                None => pos = colon_pos + 1,
            }
        }
        if expect_key {
            return Err(self.err(self.current_indent, "Not a key"));
        }
        let s = self.parse_literal_string()?;
        Ok(ValueOrKey::Value(Value::String(s)))
    }

    fn parse_convspec(&mut self, opening_colon_pos: usize) -> FlowResult<Option<(String, usize)>> {
        let start = opening_colon_pos + 1;
        let Some(closing) = (start..self.current_line.len()).find(|&i| self.current_line[i] == ':')
        else {
            return Ok(None);
        };
        if closing == start {
            return Ok(None);
        }
        let after = closing + 1;
        let ok_after = self
            .current_line
            .get(after)
            .map(|c| c.is_whitespace())
            .unwrap_or(true);
        if !ok_after {
            return Ok(None);
        }
        let name = self.slice_chars(start, closing).trim().to_string();
        if !self.custom_parsers.contains_key(&name) {
            return Ok(None);
        }
        Ok(Some((name, after)))
    }

    fn is_kv_separator(
        &mut self,
        colon_pos: usize,
    ) -> FlowResult<Option<(Option<String>, usize)>> {
        let next_pos = colon_pos + 1;
        if self.is_eol(next_pos) {
            return Ok(Some((None, next_pos)));
        }
        let chr = self.current_line[next_pos];
        if chr.is_whitespace() {
            let tentative = next_pos + 1;
            let skipped = self.skip_spaces(next_pos);
            if self.current_line.get(skipped) != Some(&':') {
                return Ok(Some((None, tentative)));
            }
            return match self.parse_convspec(skipped)? {
                Some((name, vp)) => Ok(Some((Some(name), vp))),
                None => Ok(None),
            };
        }
        if chr != ':' {
            return Ok(None);
        }
        match self.parse_convspec(next_pos)? {
            Some((name, vp)) => Ok(Some((Some(name), vp))),
            None => Ok(None),
        }
    }

    /// Parses a list, all of whose items share the column of the leading
    /// `-` that started it.
    fn parse_list(&mut self) -> FlowResult<Value> {
        let item_indent = self.start_position();
        let mut items = Vec::new();
        loop {
            let next_pos = item_indent + 1;
            let item_ok = self
                .current_line
                .get(next_pos)
                .map(|c| c.is_whitespace())
                .unwrap_or(true);
            if !item_ok {
                return Err(self.err(item_indent, "Bad list item"));
            }
            let item = if self.comment_or_eol(next_pos) {
                self.parse_nested_block_from_next_line(|p| p.parse_value())?
            } else {
                self.parse_nested_block(next_pos + 1, |p| p.parse_value())?
            };
            items.push(item);

            match self.next_block_line() {
                Err(Flow::EndOfBlock) | Err(Flow::Eof) => break,
                Err(e) => return Err(e),
                Ok(()) => {}
            }
            if self.current_indent != item_indent {
                return Err(self.err(self.current_indent, "Bad indentation of list item"));
            }
        }
        Ok(Value::List(items))
    }

    /// Parses a map, continuing from an already-classified first key.
    fn parse_map(
        &mut self,
        first_key: String,
        first_convspec: Option<String>,
        first_value_pos: usize,
    ) -> FlowResult<Value> {
        let key_indent = self.start_position();
        let mut map = Map::new();
        let mut key = first_key;
        let mut convspec = first_convspec;
        let mut value_pos = first_value_pos;

        loop {
            let value = self.parse_map_value(value_pos, convspec.as_deref())?;
            map.insert(key, value);

            match self.next_block_line() {
                Err(Flow::EndOfBlock) | Err(Flow::Eof) => break,
                Err(e) => return Err(e),
                Ok(()) => {}
            }
            if self.current_indent != key_indent {
                return Err(self.err(self.current_indent, "Bad indentation of map key"));
            }
            let (next_key, next_value_pos, next_convspec) = self.parse_key()?;
            key = next_key;
            value_pos = next_value_pos;
            convspec = next_convspec;
        }
        Ok(Value::Map(map))
    }

    fn parse_map_value(&mut self, value_pos: usize, convspec: Option<&str>) -> FlowResult<Value> {
        let from_next_line = self.comment_or_eol(value_pos);
        match convspec {
            Some(name) => {
                let name = name.to_string();
                if from_next_line {
                    self.parse_nested_block_from_next_line(move |p| p.invoke_custom_parser(&name))
                } else {
                    self.parse_nested_block(value_pos, move |p| p.invoke_custom_parser(&name))
                }
            }
            None => {
                if from_next_line {
                    self.parse_nested_block_from_next_line(|p| p.parse_value())
                } else {
                    self.parse_nested_block(value_pos, |p| p.parse_value())
                }
            }
        }
    }

    pub(crate) fn parse_raw_string(&mut self) -> FlowResult<String> {
        let lines = self.read_whole_block()?;
        Ok(join_block(lines))
    }

    pub(crate) fn parse_literal_string(&mut self) -> FlowResult<String> {
        let lines = self.read_whole_block()?;
        Ok(join_block(dedent(&lines)))
    }

    pub(crate) fn parse_folded_string(&mut self) -> FlowResult<String> {
        let lines = self.read_whole_block()?;
        Ok(fold_lines(&dedent(&lines), None))
    }

    fn parse_quoted_string(&mut self, opening_quote_pos: usize, quote: char) -> FlowResult<(String, usize)> {
        let line = self.line_string();
        if let Some(closing) = find_closing_quote(&line, quote, opening_quote_pos + 1) {
            let decoded = self.unescape_range(opening_quote_pos + 1, closing, quote);
            return Ok((decoded, closing + 1));
        }

        let block_indent = opening_quote_pos + 1;
        let (lines, closing) =
            self.parse_nested_block(block_indent, move |p| p.read_quoted_block_lines(block_indent, quote))?;

        let end_pos = match closing {
            Some(end_pos) => end_pos,
            None => {
                match self.next_block_line() {
                    Err(Flow::EndOfBlock) | Err(Flow::Eof) => {
                        return Err(self.err(self.current_indent, "String has no closing quote"));
                    }
                    Err(e) => return Err(e),
                    Ok(()) => {}
                }
                if self.current_indent == opening_quote_pos
                    && self.current_line.get(self.current_indent) == Some(&quote)
                {
                    opening_quote_pos + 1
                } else {
                    return Err(self.err(self.current_indent, "String has no closing quote"));
                }
            }
        };
        Ok((fold_lines(&dedent(&lines), Some(quote)), end_pos))
    }

    fn read_quoted_block_lines(
        &mut self,
        block_indent: usize,
        quote: char,
    ) -> FlowResult<(Vec<String>, Option<usize>)> {
        let mut lines = Vec::new();
        loop {
            let line = self.line_string();
            if let Some(closing) = find_closing_quote(&line, quote, block_indent) {
                let final_line = self.slice_chars(block_indent, closing).trim_end().to_string();
                lines.push(final_line);
                return Ok((lines, Some(closing + 1)));
            }
            lines.push(self.slice_chars(block_indent, self.current_line.len()));
            match self.next_block_line() {
                Err(Flow::EndOfBlock) | Err(Flow::Eof) => return Ok((lines, None)),
                Err(e) => return Err(e),
                Ok(()) => {}
            }
        }
    }

    pub(crate) fn parse_datetime_value(&mut self) -> FlowResult<Value> {
        let start_pos = self.start_position();
        let bad = || {
            Flow::Err(ParseError::BadDateTime {
                line: self.line_number,
                position: start_pos as u32,
            })
        };
        match parse_datetime(&self.current_line, start_pos) {
            Ok((value, end_pos)) if self.comment_or_eol(end_pos) => Ok(value),
            Ok(_) => Err(bad()),
            Err(TemporalError::Overflow) => Err(Flow::Err(ParseError::NumericOverflow {
                line: self.line_number,
                position: start_pos as u32,
            })),
            Err(_) => Err(bad()),
        }
    }

    pub(crate) fn parse_timestamp_value(&mut self) -> FlowResult<Value> {
        let start_pos = self.start_position();
        let bad = || {
            Flow::Err(ParseError::BadTimestamp {
                line: self.line_number,
                position: start_pos as u32,
            })
        };
        match parse_timestamp(&self.current_line, start_pos) {
            Ok((value, end_pos)) if self.comment_or_eol(end_pos) => Ok(value),
            Ok(_) => Err(bad()),
            Err(TemporalError::Overflow) => Err(Flow::Err(ParseError::NumericOverflow {
                line: self.line_number,
                position: start_pos as u32,
            })),
            Err(_) => Err(bad()),
        }
    }
}
