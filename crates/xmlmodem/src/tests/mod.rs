use alloc::{string::String, sync::Arc, vec::Vec};

use crate::{Collector, Element, ParseEvent, ParserError, ParserOptions, StreamingParser};

mod parse_bad;

/// Feed `chunks` in order, then finish.
pub(crate) fn parse_chunks<'a>(
    chunks: impl IntoIterator<Item = &'a str>,
    options: ParserOptions,
) -> Result<Vec<ParseEvent>, ParserError> {
    let mut parser = StreamingParser::new(options);
    let mut events = Collector::default();
    for chunk in chunks {
        parser.feed(chunk, &mut events)?;
    }
    parser.finish()?;
    Ok(events.into_events())
}

pub(crate) fn parse(xml: &str) -> Result<Vec<ParseEvent>, ParserError> {
    parse_chunks([xml], ParserOptions::default())
}

pub(crate) fn elements(events: &[ParseEvent]) -> Vec<Arc<Element>> {
    events
        .iter()
        .filter_map(|e| match e {
            ParseEvent::Element(e) => Some(e.clone()),
            _ => None,
        })
        .collect()
}

pub(crate) fn element_names(events: &[ParseEvent]) -> Vec<String> {
    elements(events).iter().map(|e| String::from(&*e.name)).collect()
}
