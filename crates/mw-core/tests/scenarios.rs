//! Integration tests for the documented concrete parsing scenarios and
//! boundary behaviors: recursion limits, EOF handling, and bare
//! closing-quote lines.

use mw_core::value::Value;
use mw_core::{error::ParseError, Parser};

#[test]
fn scenario_bare_bool() {
    assert_eq!(Parser::parse_str("true\n").unwrap(), Value::Bool(true));
}

#[test]
fn scenario_flat_map_preserves_order() {
    let v = Parser::parse_str("a: 1\nb: 2\n").unwrap();
    let map = v.as_map().unwrap();
    let pairs: Vec<(&str, &Value)> = map.iter().collect();
    assert_eq!(pairs, vec![("a", &Value::Int(1)), ("b", &Value::Int(2))]);
}

#[test]
fn scenario_flat_list() {
    let v = Parser::parse_str("- 1\n- 2\n- 3\n").unwrap();
    assert_eq!(
        v.as_list().unwrap(),
        &[Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn scenario_json_conversion_specifier() {
    let v = Parser::parse_str("root:\n  :json: [1, 2, {\"k\": true}]\n").unwrap();
    let map = v.as_map().unwrap();
    let root = map.get("root").unwrap().as_list().unwrap();
    assert_eq!(root[0], Value::Int(1));
    assert_eq!(root[1], Value::Int(2));
    assert_eq!(
        root[2].as_map().unwrap().get("k"),
        Some(&Value::Bool(true))
    );
}

#[test]
fn scenario_literal_block_string() {
    let v = Parser::parse_str(":literal:\n  hello\n  world\n").unwrap();
    assert_eq!(v, Value::String("hello\nworld\n".to_string()));
}

#[test]
fn scenario_unterminated_quote_reports_position() {
    let err = Parser::parse_str("\"unterminated\nmore\n").unwrap_err();
    match err {
        ParseError::Syntax {
            line,
            position,
            message,
        } => {
            assert_eq!(line, 2);
            assert_eq!(position, 0);
            assert_eq!(message, "String has no closing quote");
        }
        other => panic!("expected Syntax error, got {other:?}"),
    }
}

#[test]
fn comments_and_blanks_only_yields_eof() {
    assert_eq!(Parser::parse_str("# nothing here\n\n   \n"), Err(ParseError::Eof));
}

#[test]
fn truly_empty_input_yields_eof() {
    assert_eq!(Parser::parse_str(""), Err(ParseError::Eof));
}

#[test]
fn bare_closing_quote_line_is_accepted() {
    // Continuation lines fold with a single space, same as `:folded:` — a
    // literal newline only appears where a blank line separates paragraphs.
    let v = Parser::parse_str("\"hello\n world\n\"\n").unwrap();
    assert_eq!(v.as_str(), Some("hello world"));
}

#[test]
fn recursion_depth_100_succeeds_101_fails() {
    let mut at_limit = String::new();
    for _ in 0..100 {
        at_limit.push_str("- ");
    }
    at_limit.push_str("1\n");
    assert!(Parser::parse_str(&at_limit).is_ok());

    let mut over_limit = String::new();
    for _ in 0..101 {
        over_limit.push_str("- ");
    }
    over_limit.push_str("1\n");
    let err = Parser::parse_str(&over_limit).unwrap_err();
    match err {
        ParseError::Syntax { message, .. } => assert_eq!(message, "Too many nested blocks"),
        other => panic!("expected Syntax error, got {other:?}"),
    }
}

#[test]
fn extra_data_after_top_level_value_is_an_error() {
    let err = Parser::parse_str("1\n2\n").unwrap_err();
    match err {
        ParseError::Syntax { message, .. } => assert_eq!(message, "Extra data after parsed value"),
        other => panic!("expected Syntax error, got {other:?}"),
    }
}

#[test]
fn custom_parser_routes_through_registered_function() {
    let mut parser = Parser::new(mw_core::StrLineSource::new(":shout: hi\n"));
    parser.set_custom_parser("shout", |_p| Ok(Value::String("HI".to_string())));
    assert_eq!(parser.parse().unwrap(), Value::String("HI".to_string()));
}

#[test]
fn nested_map_and_list() {
    let text = "a:\n  b: 1\n  c:\n    - 1\n    - 2\n";
    let v = Parser::parse_str(text).unwrap();
    let a = v.as_map().unwrap().get("a").unwrap().as_map().unwrap();
    assert_eq!(a.get("b"), Some(&Value::Int(1)));
    assert_eq!(
        a.get("c").unwrap().as_list().unwrap(),
        &[Value::Int(1), Value::Int(2)]
    );
}
