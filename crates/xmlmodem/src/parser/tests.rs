use alloc::{sync::Arc, vec::Vec};

use super::*;
use crate::{Collector, ParseEvent, element::Node};

fn elements(events: &[ParseEvent]) -> Vec<Arc<Element>> {
    events
        .iter()
        .filter_map(|e| match e {
            ParseEvent::Element(e) => Some(e.clone()),
            _ => None,
        })
        .collect()
}

fn texts(element: &Element) -> Vec<&str> {
    element
        .children
        .iter()
        .filter_map(|n| match n {
            Node::Text(t) => Some(t.as_str()),
            Node::Element(_) => None,
        })
        .collect()
}

#[test]
fn error_carries_position_of_offending_character() {
    let mut parser = StreamingParser::default();
    let mut events = Collector::default();
    parser.feed("<a>\n  <b>\n", &mut events).unwrap();
    let err = parser.feed("</a>", &mut events).unwrap_err();
    assert_eq!((err.line(), err.column()), (3, 4));
    assert_eq!(
        err.kind(),
        &SyntaxError::MismatchedTag {
            expected: Some("b".into()),
            found: "a".into(),
        }
    );
}

#[test]
fn position_advances_per_character() {
    let mut parser = StreamingParser::default();
    let mut events = Collector::default();
    parser.feed("<a>猫\n<b/>", &mut events).unwrap();
    assert_eq!(parser.position(), (2, 5));
}

#[test]
fn cache_holds_only_the_open_path() {
    let mut parser = StreamingParser::default();
    let mut events = Collector::default();
    parser.feed("<r><a><b>", &mut events).unwrap();
    assert_eq!(parser.depth(), 3);
    assert_eq!(parser.cached_elements(), 3);

    parser.feed("</b></a><c/></r>", &mut events).unwrap();
    assert_eq!(parser.depth(), 0);
    assert_eq!(parser.cached_elements(), 0);
    assert_eq!(parser.peak_cached_elements(), 3);
}

#[test]
fn skipped_root_is_never_cached() {
    let mut parser = StreamingParser::new(ParserOptions {
        skip_root: true,
        ..Default::default()
    });
    let mut events = Collector::default();
    parser.feed("<r x=\"1\"><a><b>", &mut events).unwrap();
    assert_eq!(parser.cached_elements(), 2);
    assert!(parser.skipped_root.is_some());

    parser.feed("</b></a></r>", &mut events).unwrap();
    let root = elements(events.events()).pop().unwrap();
    assert_eq!(&*root.name, "r");
    assert_eq!(root.attribute("x"), Some("1"));
    assert!(root.children.is_empty());
}

#[test]
fn text_runs_split_by_markup_keep_order() {
    let mut parser = StreamingParser::default();
    let mut events = Collector::default();
    parser
        .feed("<a>  x <!--c--> y<![CDATA[<z>]]>w <?pi?>\n </a>", &mut events)
        .unwrap();
    let a = elements(events.events()).pop().unwrap();
    assert_eq!(texts(&a), ["x", "y", "<z>w"]);
}

#[test]
fn whitespace_only_text_is_dropped() {
    let mut parser = StreamingParser::default();
    let mut events = Collector::default();
    parser.feed("<a>\n  <b> </b>\n</a>", &mut events).unwrap();
    for element in elements(events.events()) {
        assert!(texts(&element).is_empty(), "<{}> has text", element.name);
    }
}

#[test]
fn comment_window_keeps_tail() {
    let feed = |window| {
        let mut parser = StreamingParser::new(ParserOptions {
            comment_window: window,
            ..Default::default()
        });
        let mut events = Collector::default();
        parser.feed("<!-- abcdef -->", &mut events).unwrap();
        match events.into_events().pop() {
            Some(ParseEvent::Comment(text)) => text,
            other => panic!("expected a comment, got {other:?}"),
        }
    };
    assert_eq!(feed(None), "<!-- abcdef -->");
    assert_eq!(feed(Some(4)), "<!--f -->");
    // Too short to hold the closing `--`; widened so the comment still ends.
    assert_eq!(feed(Some(0)), "<!---->");
}

#[test]
fn doctype_state_resets_after_close() {
    let mut parser = StreamingParser::default();
    let mut events = Collector::default();
    parser.feed("<!DOCTYPE r [<!ENTITY a \"b\">]>", &mut events).unwrap();
    assert!(matches!(parser.doctype, DoctypeState::Idle));
    assert!(parser.tokens.is_empty());
}

#[test]
#[should_panic(expected = "Syntax error")]
fn panic_on_error_panics() {
    let mut parser = StreamingParser::new(ParserOptions {
        panic_on_error: true,
        ..Default::default()
    });
    let _ = parser.feed("<a></b>", &mut Collector::default());
}

#[test]
fn xml_declaration_fields() {
    assert_eq!(
        parse_xml_declaration("version=\"1.0\" encoding='UTF-8' standalone=\"no\"").unwrap(),
        XmlDeclaration {
            version: Some("1.0".into()),
            encoding: Some("UTF-8".into()),
            standalone: Some(false),
        }
    );
    assert!(parse_xml_declaration("standalone=\"maybe\"").is_err());
    assert_eq!(parse_xml_declaration("").unwrap(), XmlDeclaration::default());
}
