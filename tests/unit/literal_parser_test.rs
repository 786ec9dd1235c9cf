//! Unit tests for the literal parser.
//!
//! The parser must accept every literal the encoder produces plus the older
//! script-literal spellings, and refuse anything that is not plain data.

use rstest::rstest;

use sessionstore::services::literal_encoder::encode;
use sessionstore::services::literal_parser::{evaluate, evaluate_with_depth};
use sessionstore::types::errors::SessionStoreError;
use sessionstore::types::literal::LiteralValue;

#[test]
fn test_parses_encoder_output() {
    let mut inner = LiteralValue::map();
    inner.insert("url", "https://example.org/?q=\"x\"".into());
    inner.insert("n", LiteralValue::Number(-0.5));
    let mut state = LiteralValue::map();
    state.insert("history", LiteralValue::List(vec![inner, LiteralValue::Null, false.into()]));

    let text = encode(&state).unwrap();
    assert_eq!(evaluate(&text).unwrap(), state);
}

#[rstest]
#[case("true", LiteralValue::Bool(true))]
#[case("  null  ", LiteralValue::Null)]
#[case("(42)", LiteralValue::Number(42.0))]
#[case("-1.25e2", LiteralValue::Number(-125.0))]
#[case("+.5", LiteralValue::Number(0.5))]
#[case("0x1F", LiteralValue::Number(31.0))]
#[case("'single'", LiteralValue::Text("single".to_string()))]
#[case(r#""tab\tquote\"slash\/""#, LiteralValue::Text("tab\tquote\"slash/".to_string()))]
#[case(r#""\x41é\v\0""#, LiteralValue::Text("A\u{e9}\u{b}\0".to_string()))]
#[case("[1, 2,]", LiteralValue::List(vec![LiteralValue::Number(1.0), LiteralValue::Number(2.0)]))]
fn test_accepts_literal(#[case] text: &str, #[case] expected: LiteralValue) {
    assert_eq!(evaluate(text).unwrap(), expected);
}

#[test]
fn test_unquoted_and_duplicate_keys() {
    let value = evaluate("{history: [], $x: 1, 'y': 2, history: null, 3: 'three'}").unwrap();
    assert_eq!(value.get("history"), Some(&LiteralValue::Null));
    assert_eq!(value.get("$x"), Some(&LiteralValue::Number(1.0)));
    assert_eq!(value.get("y"), Some(&LiteralValue::Number(2.0)));
    assert_eq!(value.get("3"), Some(&LiteralValue::Text("three".to_string())));
}

#[rstest]
#[case("not valid data")]
#[case("")]
#[case("{")]
#[case("[1 2]")]
#[case("{a 1}")]
#[case("undefined")]
#[case("Infinity")]
#[case("(function(){ return 1 })()")]
#[case("{a: 1}; {b: 2}")]
#[case("\"line\nbreak\"")]
#[case("\"unterminated")]
#[case("[1,,2]")]
#[case("12abc")]
#[case(r#""\u12""#)]
#[case(r#""\012""#)]
fn test_rejects_non_literal(#[case] text: &str) {
    assert!(
        matches!(evaluate(text), Err(SessionStoreError::InvalidSnapshot(_))),
        "accepted {text:?}"
    );
}

#[test]
fn test_error_reports_offset() {
    match evaluate("[1, oops]") {
        Err(SessionStoreError::InvalidSnapshot(msg)) => assert!(msg.contains("offset 4"), "{msg}"),
        other => panic!("expected InvalidSnapshot, got {other:?}"),
    }
}

#[test]
fn test_deep_nesting_is_rejected_without_overflow() {
    let hostile = "[".repeat(100_000);
    assert!(matches!(
        evaluate(&hostile),
        Err(SessionStoreError::InvalidSnapshot(_))
    ));
    let nested = format!("{}{}", "{a:".repeat(8), "1}".repeat(8));
    assert!(evaluate_with_depth(&nested, 8).is_ok());
    assert!(evaluate_with_depth(&nested, 7).is_err());
}
