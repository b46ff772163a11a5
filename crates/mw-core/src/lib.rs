//! # mw-core
//!
//! Pure-Rust parser for **MW**, an indentation-sensitive markup language in
//! the YAML family: a readable superset of JSON that layers block scalars,
//! conversion specifiers (`:raw:`, `:literal:`, `:folded:`, `:datetime:`,
//! `:timestamp:`, `:json:`), and indentation-delimited lists and maps on top
//! of JSON's value model.
//!
//! ## Quick start
//!
//! ```rust
//! use mw_core::Parser;
//!
//! let text = "name: Alice\nscores:\n  - 95\n  - 87\n  - 92\n";
//! let value = Parser::parse_str(text).unwrap();
//! let map = value.as_map().unwrap();
//! assert_eq!(map.get("name").unwrap().as_str(), Some("Alice"));
//! ```
//!
//! ## Modules
//!
//! - [`value`] — the [`Value`] tree and its insertion-ordered [`Map`]
//! - [`error`] — [`ParseError`] and the crate's `Result` alias
//! - [`line_source`] — the [`LineSource`] trait and its `&str`/`BufRead` implementations
//! - [`parser`] — the [`Parser`] type, block reader, and public entry points
//! - [`number`], [`datetime`], [`escape`], [`strings`] — scalar and string literal grammars
//!
//! `value_parser` and `json` are implementation detail modules reachable
//! only through [`Parser`]'s public methods.

pub mod datetime;
pub mod error;
pub mod escape;
mod json;
pub mod line_source;
pub mod number;
pub mod parser;
pub mod strings;
pub mod value;
mod value_parser;

pub use error::{ParseError, Result};
pub use line_source::{BufReadLineSource, LineSource, StrLineSource};
pub use parser::Parser;
pub use value::{Map, Value};
