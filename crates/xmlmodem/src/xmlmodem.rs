use alloc::collections::VecDeque;

use crate::{Collector, ParseEvent, ParserError, ParserOptions, StreamingParser};

/// `XmlModem`: pull-style wrapper over [`StreamingParser`].
///
/// Each chunk is parsed eagerly into an event queue, which the returned
/// iterator drains. Events left unread when the iterator is dropped stay
/// queued and come out first on the next call.
#[derive(Debug)]
pub struct XmlModem {
    parser: StreamingParser,
    collector: Collector,
    queue: VecDeque<ParseEvent>,
}

impl XmlModem {
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self {
            parser: StreamingParser::new(options),
            collector: Collector::default(),
            queue: VecDeque::new(),
        }
    }

    /// Feed a chunk of input and iterate over the events it completed.
    ///
    /// A syntax error is yielded after the events that preceded it.
    pub fn feed(&mut self, chunk: &str) -> XmlModemIter<'_> {
        let error = self.parser.feed(chunk, &mut self.collector).err();
        self.queue.extend(self.collector.drain());
        XmlModemIter {
            queue: &mut self.queue,
            error,
        }
    }

    /// The underlying parser, e.g. for [`StreamingParser::depth`].
    #[must_use]
    pub fn parser(&self) -> &StreamingParser {
        &self.parser
    }

    /// Finish the stream and iterate the events still queued.
    #[must_use]
    pub fn finish(self) -> XmlModemClosed {
        XmlModemClosed {
            error: self.parser.finish().err(),
            queue: self.queue,
        }
    }
}

pub struct XmlModemIter<'a> {
    queue: &'a mut VecDeque<ParseEvent>,
    error: Option<ParserError>,
}

impl Iterator for XmlModemIter<'_> {
    type Item = Result<ParseEvent, ParserError>;
    fn next(&mut self) -> Option<Self::Item> {
        match self.queue.pop_front() {
            Some(event) => Some(Ok(event)),
            None => self.error.take().map(Err),
        }
    }
}

pub struct XmlModemClosed {
    queue: VecDeque<ParseEvent>,
    error: Option<ParserError>,
}

impl Iterator for XmlModemClosed {
    type Item = Result<ParseEvent, ParserError>;
    fn next(&mut self) -> Option<Self::Item> {
        match self.queue.pop_front() {
            Some(event) => Some(Ok(event)),
            None => self.error.take().map(Err),
        }
    }
}
