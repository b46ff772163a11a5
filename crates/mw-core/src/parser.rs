//! The parser object: block-reader state, recursion counters, the
//! conversion-specifier registry, and the public entry points.

use std::collections::HashMap;
use std::io::BufRead;
use std::rc::Rc;

use log::{debug, trace};

use crate::error::{Flow, FlowResult, ParseError, Result};
use crate::escape::unescape_line;
use crate::line_source::{BufReadLineSource, LineSource, StrLineSource};
use crate::value::Value;

/// Recursion limit for both indentation-driven nesting and embedded JSON,
/// unless overridden via [`Parser::with_max_blocklevel`] /
/// [`Parser::with_max_json_depth`].
pub const MAX_RECURSION_DEPTH: u32 = 100;

type CustomParser<S> = Rc<dyn Fn(&mut Parser<S>) -> FlowResult<Value>>;

/// Parses MW markup (and, via [`Parser::parse_json`], its JSON subset) from
/// a [`LineSource`].
///
/// A `Parser` is single-use state for one document: construct it, call
/// [`parse`](Parser::parse) or [`parse_json`](Parser::parse_json) once, and
/// discard it. It owns its line source and all bookkeeping; nothing here is
/// shared across threads, so two concurrent parses need two `Parser`s over
/// two independent sources.
pub struct Parser<S: LineSource> {
    source: S,
    pub(crate) current_line: Vec<char>,
    pub(crate) current_indent: usize,
    pub(crate) line_number: u32,
    pub(crate) block_indent: usize,
    pub(crate) blocklevel: u32,
    max_blocklevel: u32,
    pub(crate) json_depth: u32,
    pub(crate) max_json_depth: u32,
    skip_comments: bool,
    eof: bool,
    pub(crate) custom_parsers: HashMap<String, CustomParser<S>>,
}

impl<S: LineSource> Parser<S> {
    pub fn new(source: S) -> Self {
        let mut parser = Parser {
            source,
            current_line: Vec::new(),
            current_indent: 0,
            line_number: 0,
            block_indent: 0,
            blocklevel: 0,
            max_blocklevel: MAX_RECURSION_DEPTH,
            json_depth: 0,
            max_json_depth: MAX_RECURSION_DEPTH,
            skip_comments: true,
            eof: false,
            custom_parsers: HashMap::new(),
        };
        parser.register_default_parsers();
        parser
    }

    pub fn with_max_blocklevel(mut self, max: u32) -> Self {
        self.max_blocklevel = max;
        self
    }

    pub fn with_max_json_depth(mut self, max: u32) -> Self {
        self.max_json_depth = max;
        self
    }

    fn register_default_parsers(&mut self) {
        self.set_custom_parser_internal("raw", |p| p.parse_raw_string().map(Value::String));
        self.set_custom_parser_internal("literal", |p| {
            p.parse_literal_string().map(Value::String)
        });
        self.set_custom_parser_internal("folded", |p| p.parse_folded_string().map(Value::String));
        self.set_custom_parser_internal("datetime", |p| p.parse_datetime_value());
        self.set_custom_parser_internal("timestamp", |p| p.parse_timestamp_value());
        self.set_custom_parser_internal("json", |p| p.parse_json_specifier());
    }

    pub(crate) fn set_custom_parser_internal(
        &mut self,
        name: &str,
        f: impl Fn(&mut Self) -> FlowResult<Value> + 'static,
    ) {
        self.custom_parsers.insert(name.to_string(), Rc::new(f));
    }

    /// Registers (or overwrites) the sub-parser invoked by `:name:`.
    pub fn set_custom_parser(
        &mut self,
        name: impl Into<String>,
        f: impl Fn(&mut Self) -> Result<Value> + 'static,
    ) {
        self.custom_parsers
            .insert(name.into(), Rc::new(move |p| f(p).map_err(Flow::Err)));
    }

    pub(crate) fn invoke_custom_parser(&mut self, name: &str) -> FlowResult<Value> {
        let f = self.custom_parsers.get(name).cloned();
        match f {
            Some(f) => f(self),
            None => Err(self.err(self.current_indent, format!("Unknown conversion specifier '{name}'"))),
        }
    }

    pub(crate) fn err(&self, position: usize, message: impl Into<String>) -> Flow {
        Flow::Err(ParseError::syntax(self.line_number, position as u32, message))
    }

    pub(crate) fn line_string(&self) -> String {
        self.current_line.iter().collect()
    }

    pub(crate) fn slice_chars(&self, a: usize, b: usize) -> String {
        let len = self.current_line.len();
        self.current_line[a.min(len)..b.min(len)].iter().collect()
    }

    pub(crate) fn unescape_range(&self, a: usize, b: usize, quote: char) -> String {
        let line = self.line_string();
        unescape_line(&line, quote, a, b).unwrap_or_else(|_| self.slice_chars(a, b))
    }

    /// Returns the next line belonging to the current block, or signals
    /// `EndOfBlock` when the line read belongs to an outer block (in which
    /// case it has been pushed back onto the source).
    pub(crate) fn next_block_line(&mut self) -> FlowResult<()> {
        loop {
            if self.eof {
                return if self.blocklevel > 0 {
                    Err(Flow::EndOfBlock)
                } else {
                    Err(Flow::Eof)
                };
            }

            let raw = match self.source.read_line().map_err(Flow::Err)? {
                Some(line) => line,
                None => {
                    trace!("end of input reached");
                    self.eof = true;
                    return Err(Flow::EndOfBlock);
                }
            };
            self.line_number = self.source.line_number();

            let trimmed = raw.trim_end().to_string();
            let indent = leading_spaces(&trimmed);

            if self.skip_comments {
                if trimmed.is_empty() || is_comment(&trimmed, indent) {
                    continue;
                }
                self.skip_comments = false;
            }

            if trimmed.is_empty() {
                trace!("blank line at {}", self.line_number);
                self.current_line = Vec::new();
                self.current_indent = 0;
                return Ok(());
            }

            if indent >= self.block_indent {
                trace!("accepted line {} at indent {}", self.line_number, indent);
                self.current_line = trimmed.chars().collect();
                self.current_indent = indent;
                return Ok(());
            }

            if is_comment(&trimmed, indent) {
                continue;
            }

            trace!("unindent at line {}, ending block", self.line_number);
            if !self.source.unread_line(raw) {
                return Err(Flow::Err(ParseError::UnreadFailed));
            }
            self.current_line.clear();
            return Err(Flow::EndOfBlock);
        }
    }

    /// Reads every remaining line of the current block, stripping
    /// `block_indent` columns from each.
    pub(crate) fn read_whole_block(&mut self) -> FlowResult<Vec<String>> {
        let mut lines = Vec::new();
        loop {
            match self.next_block_line() {
                Ok(()) => {
                    let start = self.block_indent.min(self.current_line.len());
                    lines.push(self.current_line[start..].iter().collect());
                }
                Err(Flow::EndOfBlock) | Err(Flow::Eof) => return Ok(lines),
                Err(e) => return Err(e),
            }
        }
    }

    /// Runs `func` as a sub-parser of a block whose content starts at
    /// column `block_pos`, bumping and restoring `blocklevel`/`block_indent`
    /// around the call.
    pub(crate) fn parse_nested_block<F, T>(&mut self, block_pos: usize, func: F) -> FlowResult<T>
    where
        F: FnOnce(&mut Self) -> FlowResult<T>,
    {
        if self.blocklevel >= self.max_blocklevel {
            return Err(self.err(block_pos, "Too many nested blocks"));
        }
        debug!(
            "entering nested block at indent {} (level {})",
            block_pos,
            self.blocklevel + 1
        );
        self.blocklevel += 1;
        let saved_indent = self.block_indent;
        self.block_indent = block_pos;
        let result = func(self);
        self.block_indent = saved_indent;
        self.blocklevel -= 1;
        debug!("left nested block (level {})", self.blocklevel);
        result
    }

    /// Like [`parse_nested_block`](Self::parse_nested_block), but the block's
    /// content starts on the line *after* the current one: reads that line
    /// first to discover its indentation, then delegates.
    pub(crate) fn parse_nested_block_from_next_line<F, T>(&mut self, func: F) -> FlowResult<T>
    where
        F: FnOnce(&mut Self) -> FlowResult<T>,
    {
        let saved_indent = self.block_indent;
        self.block_indent = saved_indent + 1;
        self.skip_comments = true;
        let line_result = self.next_block_line();
        self.block_indent = saved_indent;
        match line_result {
            Err(Flow::EndOfBlock) | Err(Flow::Eof) => {
                Err(self.err(self.current_indent, "Empty block"))
            }
            Err(e) => Err(e),
            Ok(()) => {
                let indent = self.current_indent;
                self.parse_nested_block(indent, func)
            }
        }
    }

    /// Parses a full MW document. The document must consist of a single
    /// value whose block covers the entire input; any trailing non-blank,
    /// non-comment line after that is an error.
    pub fn parse(&mut self) -> Result<Value> {
        match self.next_block_line() {
            Err(Flow::EndOfBlock) if self.eof => return Err(ParseError::Eof),
            Err(e) => return Err(e.into()),
            Ok(()) => {}
        }

        let result = self.parse_value().map_err(ParseError::from)?;

        match self.next_block_line() {
            Err(Flow::EndOfBlock) => Ok(result),
            Err(Flow::Eof) => Ok(result),
            Err(e) => Err(e.into()),
            Ok(()) => Err(ParseError::syntax(
                self.line_number,
                self.current_indent as u32,
                "Extra data after parsed value",
            )),
        }
    }

    /// Parses pure JSON (RFC 8259 plus trailing `#` comments and
    /// line-spanning whitespace).
    pub fn parse_json(&mut self) -> Result<Value> {
        match self.next_block_line() {
            Err(Flow::EndOfBlock) if self.eof => return Err(ParseError::Eof),
            Err(e) => return Err(e.into()),
            Ok(()) => {}
        }
        self.parse_json_document().map_err(ParseError::from)
    }
}

impl<'a> Parser<StrLineSource<'a>> {
    /// Parses `input` as a full MW document.
    pub fn parse_str(input: &'a str) -> Result<Value> {
        Parser::new(StrLineSource::new(input)).parse()
    }

    /// Parses `input` as a pure JSON document.
    pub fn parse_json_str(input: &'a str) -> Result<Value> {
        Parser::new(StrLineSource::new(input)).parse_json()
    }
}

impl<R: BufRead> Parser<BufReadLineSource<R>> {
    /// Parses MW markup read from `reader`.
    pub fn parse_reader(reader: R) -> Result<Value> {
        Parser::new(BufReadLineSource::new(reader)).parse()
    }

    /// Parses JSON read from `reader`.
    pub fn parse_json_reader(reader: R) -> Result<Value> {
        Parser::new(BufReadLineSource::new(reader)).parse_json()
    }
}

fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|&c| c == ' ').count()
}

fn is_comment(line: &str, indent: usize) -> bool {
    line.chars().nth(indent) == Some('#')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bool() {
        assert_eq!(Parser::parse_str("true\n").unwrap(), Value::Bool(true));
    }

    #[test]
    fn parses_flat_map_in_order() {
        let v = Parser::parse_str("a: 1\nb: 2\n").unwrap();
        let map = v.as_map().unwrap();
        let pairs: Vec<(&str, &Value)> = map.iter().collect();
        assert_eq!(pairs[0].0, "a");
        assert_eq!(pairs[1].0, "b");
    }

    #[test]
    fn parses_list() {
        let v = Parser::parse_str("- 1\n- 2\n- 3\n").unwrap();
        assert_eq!(
            v.as_list().unwrap(),
            &[Value::Int(1), Value::Int(2), Value::Int(3)]
        );
    }

    #[test]
    fn empty_input_is_eof() {
        assert_eq!(Parser::parse_str("# just a comment\n\n"), Err(ParseError::Eof));
    }

    #[test]
    fn unterminated_quote_reports_position() {
        let err = Parser::parse_str("\"unterminated\nmore\n").unwrap_err();
        match err {
            ParseError::Syntax { line, position, .. } => {
                assert_eq!(line, 2);
                assert_eq!(position, 0);
            }
            other => panic!("expected Syntax error, got {other:?}"),
        }
    }
}
