//! Turning collected block lines into a single string: raw, literal, folded,
//! and quoted-folded modes.

use crate::escape::unescape_line;

/// Strips the common leading whitespace shared by all non-empty lines.
/// Empty lines are left untouched (and don't participate in computing the
/// common prefix length).
pub fn dedent(lines: &[String]) -> Vec<String> {
    let common = lines
        .iter()
        .filter(|l| !l.is_empty())
        .map(|l| l.len() - l.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    lines
        .iter()
        .map(|l| {
            if l.is_empty() {
                l.clone()
            } else {
                l[common.min(l.len())..].to_string()
            }
        })
        .collect()
}

/// Joins lines with `\n`, dropping trailing empty lines first, and appending
/// a final `\n` if the block spanned more than one line. Shared by the raw
/// and literal string parsers, which differ only in whether `dedent` ran
/// first.
pub fn join_block(mut lines: Vec<String>) -> String {
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let multiline = lines.len() > 1;
    let mut s = lines.join("\n");
    if multiline {
        s.push('\n');
    }
    s
}

/// Folds lines into a single string: leading and trailing empty lines are
/// dropped, and remaining lines are joined with a single space, except that
/// an empty line becomes a bare `\n` with the surrounding separator
/// suppressed, and a line that already starts with whitespace gets no
/// separator before it.
///
/// When `quote` is `Some`, each line is unescaped (with that quote character
/// as the sentinel that would end scanning, which in practice never
/// triggers here since the closing quote line itself is excluded by the
/// caller).
pub fn fold_lines(lines: &[String], quote: Option<char>) -> String {
    let start = lines.iter().position(|l| !l.is_empty());
    let Some(start) = start else {
        return String::new();
    };
    let end = lines.iter().rposition(|l| !l.is_empty()).unwrap() + 1;

    let mut result = String::new();
    let mut prev_lf = false;
    for (i, line) in lines.iter().enumerate().take(end).skip(start) {
        if i > start {
            if line.is_empty() {
                result.push('\n');
                prev_lf = true;
            } else if prev_lf {
                prev_lf = false;
            } else if line.starts_with(' ') || line.starts_with('\t') {
                // no separator
            } else {
                result.push(' ');
            }
        }
        if let Some(q) = quote {
            match unescape_line(line, q, 0, line.chars().count()) {
                Ok(decoded) => result.push_str(&decoded),
                Err(_) => result.push_str(line),
            }
        } else {
            result.push_str(line);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedent_strips_common_prefix() {
        let lines = vec!["  hello".to_string(), "  world".to_string()];
        assert_eq!(dedent(&lines), vec!["hello", "world"]);
    }

    #[test]
    fn dedent_ignores_empty_lines() {
        let lines = vec!["  a".to_string(), "".to_string(), "  b".to_string()];
        assert_eq!(dedent(&lines), vec!["a", "", "b"]);
    }

    #[test]
    fn join_block_appends_final_newline_for_multiline() {
        let lines = vec!["hello".to_string(), "world".to_string()];
        assert_eq!(join_block(lines), "hello\nworld\n");
    }

    #[test]
    fn join_block_single_line_has_no_trailing_newline() {
        assert_eq!(join_block(vec!["hello".to_string()]), "hello");
    }

    #[test]
    fn join_block_drops_trailing_empty_lines() {
        let lines = vec!["a".to_string(), "b".to_string(), "".to_string()];
        assert_eq!(join_block(lines), "a\nb\n");
    }

    #[test]
    fn fold_joins_with_spaces() {
        let lines = vec!["one".to_string(), "two".to_string(), "three".to_string()];
        assert_eq!(fold_lines(&lines, None), "one two three");
    }

    #[test]
    fn fold_blank_line_becomes_newline() {
        let lines = vec!["one".to_string(), "".to_string(), "two".to_string()];
        assert_eq!(fold_lines(&lines, None), "one\ntwo");
    }

    #[test]
    fn fold_indented_continuation_has_no_separator() {
        let lines = vec!["one".to_string(), "  two".to_string()];
        assert_eq!(fold_lines(&lines, None), "one  two");
    }

    #[test]
    fn fold_drops_leading_and_trailing_blanks() {
        let lines = vec!["".to_string(), "mid".to_string(), "".to_string()];
        assert_eq!(fold_lines(&lines, None), "mid");
    }

    #[test]
    fn fold_unescapes_when_quoted() {
        let lines = vec![r"a\nb".to_string()];
        assert_eq!(fold_lines(&lines, Some('"')), "a\nb");
    }
}
