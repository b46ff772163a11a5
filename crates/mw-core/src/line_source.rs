//! Line-oriented input sources consumed by [`crate::parser::Parser`].

use std::io::BufRead;

use crate::error::{ParseError, Result};

/// A source of lines, with one-line pushback and a running line counter.
///
/// Mirrors the line-source contract the block reader is written against:
/// `start`, `read_line`, `unread_line`, `line_number`. Implementations are
/// free to back this with anything that can yield lines in order; the two
/// provided here cover the common cases (an in-memory string, and any
/// `BufRead`).
pub trait LineSource {
    /// Prepares the source for reading. Called once, before the first
    /// `read_line`.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Reads the next line, without its trailing newline. Returns `Ok(None)`
    /// at end of input.
    fn read_line(&mut self) -> Result<Option<String>>;

    /// Pushes `line` back so the next `read_line` returns it again, with the
    /// same line number. Only ever called with the line most recently
    /// returned by `read_line`; returns `false` if a line is already pending
    /// (a `LineSource` need only support one level of pushback).
    fn unread_line(&mut self, line: String) -> bool;

    /// The 1-based line number of the most recently read line.
    fn line_number(&self) -> u32;
}

/// A [`LineSource`] over an in-memory string, used by `parse_str` /
/// `parse_json_str` and throughout the test suite.
pub struct StrLineSource<'a> {
    lines: std::str::Lines<'a>,
    pending: Option<String>,
    line_number: u32,
}

impl<'a> StrLineSource<'a> {
    pub fn new(input: &'a str) -> Self {
        StrLineSource {
            lines: input.lines(),
            pending: None,
            line_number: 0,
        }
    }
}

impl LineSource for StrLineSource<'_> {
    fn read_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                Ok(Some(line.to_string()))
            }
            None => Ok(None),
        }
    }

    fn unread_line(&mut self, line: String) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(line);
        true
    }

    fn line_number(&self) -> u32 {
        self.line_number
    }
}

/// A [`LineSource`] over any `BufRead`, used to parse from files and other
/// byte streams without buffering the whole input as one `String`.
pub struct BufReadLineSource<R: BufRead> {
    reader: R,
    pending: Option<String>,
    line_number: u32,
}

impl<R: BufRead> BufReadLineSource<R> {
    pub fn new(reader: R) -> Self {
        BufReadLineSource {
            reader,
            pending: None,
            line_number: 0,
        }
    }
}

impl<R: BufRead> LineSource for BufReadLineSource<R> {
    fn read_line(&mut self) -> Result<Option<String>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        let mut buf = String::new();
        let n = self
            .reader
            .read_line(&mut buf)
            .map_err(ParseError::from)?;
        if n == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }

    fn unread_line(&mut self, line: String) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(line);
        true
    }

    fn line_number(&self) -> u32 {
        self.line_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_source_pushback_returns_same_line_and_number() {
        let mut src = StrLineSource::new("a\nb\nc");
        assert_eq!(src.read_line().unwrap(), Some("a".to_string()));
        assert_eq!(src.line_number(), 1);
        assert_eq!(src.read_line().unwrap(), Some("b".to_string()));
        assert_eq!(src.line_number(), 2);
        assert!(src.unread_line("b".to_string()));
        assert_eq!(src.read_line().unwrap(), Some("b".to_string()));
        assert_eq!(src.line_number(), 2);
        assert_eq!(src.read_line().unwrap(), Some("c".to_string()));
        assert_eq!(src.read_line().unwrap(), None);
    }

    #[test]
    fn bufread_source_strips_newlines() {
        let mut src = BufReadLineSource::new(std::io::Cursor::new("x\r\ny\n"));
        assert_eq!(src.read_line().unwrap(), Some("x".to_string()));
        assert_eq!(src.read_line().unwrap(), Some("y".to_string()));
        assert_eq!(src.read_line().unwrap(), None);
    }
}
