use alloc::string::ToString;

use rstest::rstest;

use super::{element_names, parse};
use crate::{Collector, ParserOptions, StreamingParser, SyntaxError};

#[test]
fn mismatched_close_is_fatal() {
    let err = parse("<a><b></a>").unwrap_err();
    assert_eq!(
        err.kind(),
        &SyntaxError::MismatchedTag {
            expected: Some("b".into()),
            found: "a".into(),
        }
    );
    assert_eq!(err.to_string(), "mismatched end tag </a>, expected </b> at 1:10");
}

#[test]
fn close_without_open() {
    let err = parse("</a>").unwrap_err();
    assert_eq!(
        err.kind(),
        &SyntaxError::MismatchedTag {
            expected: None,
            found: "a".into(),
        }
    );
}

#[test]
fn processing_instruction_must_end_with_question_mark() {
    let err = parse("<?xml version=\"1.0\">").unwrap_err();
    assert!(matches!(err.kind(), SyntaxError::UnexpectedToken { found, .. } if found == ">"));
}

#[rstest]
#[case::element("<a><b>", "element", "a/b")]
#[case::comment("<a><!-- x", "comment", "a")]
#[case::tag("<a", "tag", "")]
#[case::attribute_value("<a k=\"v>", "tag", "")]
#[case::cdata("<a><![CDATA[x", "CDATA section", "a")]
#[case::doctype("<!DOCTYPE r [<!ENTITY a \"b\"", "!ENTITY", "")]
fn unterminated_at_end_of_input(
    #[case] xml: &str,
    #[case] construct: &'static str,
    #[case] path: &str,
) {
    let err = parse(xml).unwrap_err();
    assert_eq!(
        err.kind(),
        &SyntaxError::UnterminatedConstruct {
            construct,
            path: path.into(),
        }
    );
}

#[rstest]
#[case::unquoted("<a k=v>", "attribute value must be quoted")]
#[case::duplicate("<a k=\"1\" k='2'>", "duplicate attribute")]
#[case::no_value("<a k>", "attribute without a value")]
#[case::empty_name("<>", "invalid tag name")]
fn malformed_tags(#[case] xml: &str, #[case] expected: &str) {
    let err = parse(xml).unwrap_err();
    match err.kind() {
        SyntaxError::MalformedTag { reason, .. } => assert_eq!(*reason, expected),
        other => panic!("expected MalformedTag, got {other:?}"),
    }
}

#[test]
fn lt_inside_attribute_value() {
    let err = parse("<a k=\"x<y\"/>").unwrap_err();
    assert!(matches!(err.kind(), SyntaxError::UnexpectedToken { found, .. } if found == "<"));
}

#[test]
fn markup_declaration_outside_doctype() {
    let err = parse("<r><!ELEMENT r ANY></r>").unwrap_err();
    assert!(matches!(err.kind(), SyntaxError::UnexpectedToken { .. }));
}

#[test]
fn unknown_attlist_default() {
    let err = parse("<!DOCTYPE r [<!ATTLIST r a CDATA #BOGUS>]><r/>").unwrap_err();
    assert!(matches!(
        err.kind(),
        SyntaxError::MalformedDeclaration { kind: "!ATTLIST", .. }
    ));
}

#[test]
fn open_angle_inside_tag() {
    let err = parse("<a<b>").unwrap_err();
    assert!(matches!(err.kind(), SyntaxError::UnexpectedToken { found, .. } if found == "<"));
}

#[test]
fn errors_are_sticky() {
    let mut parser = StreamingParser::new(ParserOptions::default());
    let mut events = Collector::default();
    parser.feed("<r><a/><b></r>", &mut events).unwrap_err();
    let emitted = events.events().len();

    let again = parser.feed("<c/>", &mut events).unwrap_err();
    assert!(matches!(again.kind(), SyntaxError::MismatchedTag { .. }));
    assert_eq!(events.events().len(), emitted);
    assert_eq!(parser.finish().unwrap_err(), again);
}

#[test]
fn elements_before_failure_remain_valid() {
    let mut parser = StreamingParser::new(ParserOptions::default());
    let mut events = Collector::default();
    assert!(parser.feed("<r><a>x</a><b></c>", &mut events).is_err());
    assert_eq!(element_names(events.events()), ["a"]);
}
