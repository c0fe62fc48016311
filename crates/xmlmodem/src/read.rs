//! Driving the parser from a byte stream.

use alloc::{vec, vec::Vec};
use std::io::{self, Read};

use bstr::ByteSlice;

use crate::{Handler, ParserError, Status, StreamingParser};

/// Bytes requested from the reader per read.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Longest UTF-8 sequence; a chunk must hold one.
const MIN_CHUNK_SIZE: usize = 4;

#[derive(thiserror::Error, Debug)]
pub enum ReadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Parse(#[from] ParserError),
    #[error("invalid UTF-8 at byte {offset}")]
    InvalidUtf8 { offset: u64 },
}

/// Feeds a [`StreamingParser`] from a [`Read`] source.
///
/// UTF-8 sequences split across reads are reassembled. The reader keeps its
/// state when a handler stops the parse, so a later [`XmlReader::drive`]
/// continues with no bytes lost.
#[derive(Debug)]
pub struct XmlReader<R> {
    reader: R,
    buf: Vec<u8>,
    /// Leading bytes of `buf` holding an incomplete sequence.
    carry: usize,
    /// Stream offset of `buf[0]`.
    offset: u64,
}

impl<R: Read> XmlReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buf: vec![0; chunk_size.max(MIN_CHUNK_SIZE)],
            carry: 0,
            offset: 0,
        }
    }

    /// Read and parse until end of input or until the handler stops.
    ///
    /// Returns [`Status::NeedMore`] at end of input; call
    /// [`StreamingParser::finish`] next.
    ///
    /// # Errors
    ///
    /// I/O failures, syntax errors, and invalid UTF-8. A sequence left
    /// incomplete at end of input counts as invalid.
    pub fn drive<H: Handler + ?Sized>(
        &mut self,
        parser: &mut StreamingParser,
        handler: &mut H,
    ) -> Result<Status, ReadError> {
        if parser.is_stopped() && parser.resume(handler)? == Status::Stopped {
            return Ok(Status::Stopped);
        }

        loop {
            let n = match self.reader.read(&mut self.buf[self.carry..]) {
                Ok(n) => n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            };
            if n == 0 {
                if self.carry > 0 {
                    return Err(ReadError::InvalidUtf8 { offset: self.offset });
                }
                return Ok(Status::NeedMore);
            }

            let filled = self.carry + n;
            let valid = match self.buf[..filled].to_str() {
                Ok(_) => filled,
                Err(err) if err.error_len().is_none() => err.valid_up_to(),
                Err(err) => {
                    return Err(ReadError::InvalidUtf8 {
                        offset: self.offset + err.valid_up_to() as u64,
                    });
                }
            };
            let status = match self.buf[..valid].to_str() {
                Ok(text) => parser.feed(text, handler)?,
                Err(err) => {
                    return Err(ReadError::InvalidUtf8 {
                        offset: self.offset + err.valid_up_to() as u64,
                    });
                }
            };

            self.buf.copy_within(valid..filled, 0);
            self.carry = filled - valid;
            self.offset += valid as u64;
            if status == Status::Stopped {
                return Ok(Status::Stopped);
            }
        }
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Parse everything `reader` yields with default chunking.
///
/// # Errors
///
/// As for [`XmlReader::drive`].
pub fn parse_reader<R: Read, H: Handler + ?Sized>(
    reader: R,
    parser: &mut StreamingParser,
    handler: &mut H,
) -> Result<Status, ReadError> {
    XmlReader::new(reader).drive(parser, handler)
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, sync::Arc, vec::Vec};
    use core::ops::ControlFlow;

    use super::*;
    use crate::{Element, ElementsNamed, ParserOptions, StopAfter};

    /// Hands out at most `step` bytes per read.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(out.len()).min(self.data.len());
            out[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn glosses(xml: &str, chunk: usize, step: usize) -> Vec<String> {
        let mut out = Vec::new();
        let mut handler = ElementsNamed::new("gloss", |e: Arc<Element>| {
            out.push(e.text());
            ControlFlow::Continue(())
        });
        let mut parser = StreamingParser::new(ParserOptions::default());
        let mut reader = XmlReader::with_chunk_size(Trickle { data: xml.as_bytes(), step }, chunk);
        assert_eq!(reader.drive(&mut parser, &mut handler).unwrap(), Status::NeedMore);
        parser.finish().unwrap();
        out
    }

    #[test]
    fn reassembles_split_sequences() {
        let xml = "<s><gloss>猫</gloss><gloss>ねこ😺</gloss></s>";
        for (chunk, step) in [(4, 1), (4, 3), (5, 2), (7, 7), (DEFAULT_CHUNK_SIZE, 1024)] {
            assert_eq!(glosses(xml, chunk, step), ["猫", "ねこ😺"], "chunk {chunk} step {step}");
        }
    }

    #[test]
    fn rejects_invalid_and_truncated_input() {
        let mut parser = StreamingParser::default();
        let mut handler = crate::Collector::default();
        let err = parse_reader(&b"<a>\xff</a>"[..], &mut parser, &mut handler).unwrap_err();
        assert!(matches!(err, ReadError::InvalidUtf8 { offset: 3 }));

        let mut parser = StreamingParser::default();
        let err = parse_reader(&b"<a>\xe7\x8c"[..], &mut parser, &mut handler).unwrap_err();
        assert!(matches!(err, ReadError::InvalidUtf8 { offset: 3 }));
    }

    #[test]
    fn drive_continues_after_stop() {
        let xml = "<r><e>1</e><e>2</e><e>3</e></r>";
        let mut parser = StreamingParser::new(ParserOptions {
            skip_root: true,
            ..Default::default()
        });
        let mut reader = XmlReader::with_chunk_size(xml.as_bytes(), 6);

        let mut first = StopAfter::new(crate::Collector::default(), "e", 1);
        assert_eq!(reader.drive(&mut parser, &mut first).unwrap(), Status::Stopped);

        let mut rest = crate::Collector::default();
        assert_eq!(reader.drive(&mut parser, &mut rest).unwrap(), Status::NeedMore);
        parser.finish().unwrap();

        let count = |events: &[crate::ParseEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, crate::ParseEvent::Element(e) if &*e.name == "e"))
                .count()
        };
        assert_eq!(count(first.into_inner().events()), 1);
        assert_eq!(count(rest.events()), 2);
    }
}
