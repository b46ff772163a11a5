//! A small self-contained JSON parser (RFC 8259, plus `#` comments and
//! lines spanning a value) used both for the top-level [`Parser::parse_json`]
//! entry point and the `:json:` conversion specifier.

use crate::error::{Flow, FlowResult, ParseError};
use crate::escape::find_closing_quote;
use crate::line_source::LineSource;
use crate::number::{parse_number, NumberError};
use crate::parser::Parser;
use crate::value::{Map, Value};

const JSON_NUMBER_TERMINATORS: &[char] = &[':', ',', '}', ']'];

impl<S: LineSource> Parser<S> {
    fn json_number_error(&self, e: NumberError, pos: usize) -> Flow {
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

    /// Skips spaces, transparently pulling in the next block line (and
    /// skipping comment lines) when the current one is exhausted.
    fn json_skip_spaces(&mut self, mut pos: usize) -> FlowResult<usize> {
        loop {
            pos = self.skip_spaces(pos);
            if !self.is_eol(pos) && self.current_line[pos] != '#' {
                return Ok(pos);
            }
            match self.next_block_line() {
                Err(Flow::EndOfBlock) | Err(Flow::Eof) => {
                    return Err(self.err(pos, "Unexpected end of block"))
                }
                Err(e) => return Err(e),
                Ok(()) => pos = 0,
            }
        }
    }

    fn json_substring_eq(&self, start: usize, word: &str) -> bool {
        let chars: Vec<char> = word.chars().collect();
        if start + chars.len() > self.current_line.len() {
            return false;
        }
        self.current_line[start..start + chars.len()] == chars[..]
    }

    /// Parses a JSON value at `pos`, depth-checked against `json_depth`.
    pub(crate) fn parse_json_value(&mut self, pos: usize) -> FlowResult<(Value, usize)> {
        if self.json_depth >= self.max_json_depth {
            return Err(self.err(pos, "JSON nested too deeply"));
        }
        let pos = self.json_skip_spaces(pos)?;
        match self.current_line[pos] {
            '[' => self.json_parse_array(pos),
            '{' => self.json_parse_object(pos),
            '"' => {
                let (s, end) = self.json_parse_string(pos)?;
                Ok((Value::String(s), end))
            }
            c if c == '+' || c == '-' || c.is_ascii_digit() => self.json_parse_number(pos),
            _ if self.json_substring_eq(pos, "null") => Ok((Value::Null, pos + 4)),
            _ if self.json_substring_eq(pos, "true") => Ok((Value::Bool(true), pos + 4)),
            _ if self.json_substring_eq(pos, "false") => Ok((Value::Bool(false), pos + 5)),
            _ => Err(self.err(pos, "Unexpected character")),
        }
    }

    fn json_parse_number(&mut self, pos: usize) -> FlowResult<(Value, usize)> {
        let (sign, digits_start) = match self.current_line[pos] {
            '+' => (1i8, pos + 1),
            '-' => (-1i8, pos + 1),
            _ => (1i8, pos),
        };
        let (value, end) =
            parse_number(&self.current_line, digits_start, sign, JSON_NUMBER_TERMINATORS)
                .map_err(|e| self.json_number_error(e, digits_start))?;
        Ok((value, end))
    }

    fn json_parse_string(&mut self, pos: usize) -> FlowResult<(String, usize)> {
        if self.current_line.get(pos) != Some(&'"') {
            return Err(self.err(pos, "Unexpected character"));
        }
        let line = self.line_string();
        match find_closing_quote(&line, '"', pos + 1) {
            Some(closing) => {
                let decoded = self.unescape_range(pos + 1, closing, '"');
                Ok((decoded, closing + 1))
            }
            None => Err(self.err(pos, "String has no closing quote")),
        }
    }

    fn json_parse_array(&mut self, open_pos: usize) -> FlowResult<(Value, usize)> {
        self.json_depth += 1;
        let result = self.json_parse_array_inner(open_pos);
        self.json_depth -= 1;
        result
    }

    fn json_parse_array_inner(&mut self, open_pos: usize) -> FlowResult<(Value, usize)> {
        let mut pos = self.json_skip_spaces(open_pos + 1)?;
        let mut items = Vec::new();
        if self.current_line[pos] == ']' {
            return Ok((Value::List(items), pos + 1));
        }
        loop {
            let (item, end) = self.parse_json_value(pos)?;
            items.push(item);
            pos = self.json_skip_spaces(end)?;
            match self.current_line[pos] {
                ',' => pos = self.json_skip_spaces(pos + 1)?,
                ']' => return Ok((Value::List(items), pos + 1)),
                _ => return Err(self.err(pos, "Expected ',' or ']'")),
            }
        }
    }

    fn json_parse_object(&mut self, open_pos: usize) -> FlowResult<(Value, usize)> {
        self.json_depth += 1;
        let result = self.json_parse_object_inner(open_pos);
        self.json_depth -= 1;
        result
    }

    fn json_parse_object_inner(&mut self, open_pos: usize) -> FlowResult<(Value, usize)> {
        let mut pos = self.json_skip_spaces(open_pos + 1)?;
        let mut map = Map::new();
        if self.current_line[pos] == '}' {
            return Ok((Value::Map(map), pos + 1));
        }
        loop {
            let (key, value, end) = self.json_parse_member(pos)?;
            map.insert(key, value);
            pos = self.json_skip_spaces(end)?;
            match self.current_line[pos] {
                ',' => pos = self.json_skip_spaces(pos + 1)?,
                '}' => return Ok((Value::Map(map), pos + 1)),
                _ => return Err(self.err(pos, "Expected ',' or '}'")),
            }
        }
    }

    fn json_parse_member(&mut self, pos: usize) -> FlowResult<(String, Value, usize)> {
        let (key, after_key) = self.json_parse_string(pos)?;
        let colon_pos = self.json_skip_spaces(after_key)?;
        if self.current_line[colon_pos] != ':' {
            return Err(self.err(colon_pos, "Expected ':'"));
        }
        let value_pos = self.json_skip_spaces(colon_pos + 1)?;
        let (value, end) = self.parse_json_value(value_pos)?;
        Ok((key, value, end))
    }

    /// Entry point for the `:json:` conversion specifier: parses one value,
    /// then demands the rest of its block be empty.
    pub(crate) fn parse_json_specifier(&mut self) -> FlowResult<Value> {
        let (value, end) = self.parse_json_value(self.start_position())?;
        if !self.comment_or_eol(end) {
            return Err(self.err(end, "Garbage after JSON value"));
        }
        match self.next_block_line() {
            Err(Flow::EndOfBlock) | Err(Flow::Eof) => Ok(value),
            Err(e) => Err(e),
            Ok(()) => Err(self.err(self.current_indent, "Garbage after JSON value")),
        }
    }

    /// Entry point for [`Parser::parse_json`]: parses one value, then
    /// demands true end-of-input.
    pub(crate) fn parse_json_document(&mut self) -> FlowResult<Value> {
        let (value, end) = self.parse_json_value(self.start_position())?;
        if !self.comment_or_eol(end) {
            return Err(self.err(end, "Extra data after parsed value"));
        }
        match self.next_block_line() {
            Err(Flow::EndOfBlock) | Err(Flow::Eof) => Ok(value),
            Err(e) => Err(e),
            Ok(()) => Err(self.err(self.current_indent, "Extra data after parsed value")),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ParseError;
    use crate::parser::Parser;
    use crate::value::Value;

    #[test]
    fn parses_json_object() {
        let v = Parser::parse_json_str(r#"{"a": 1, "b": [1, 2, 3]}"#).unwrap();
        let map = v.as_map().unwrap();
        assert_eq!(map.get("a"), Some(&Value::Int(1)));
        assert_eq!(
            map.get("b").unwrap().as_list().unwrap(),
            &[Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn rejects_trailing_garbage() {
        let err = Parser::parse_json_str("1 2").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
    }

    #[test]
    fn parses_nested_empty_containers() {
        let v = Parser::parse_json_str("{\"a\": [], \"b\": {}}").unwrap();
        let map = v.as_map().unwrap();
        assert_eq!(map.get("a").unwrap().as_list().unwrap(), &[]);
        assert!(map.get("b").unwrap().as_map().unwrap().is_empty());
    }
}
