//! Incremental, callback-driven XML tokenizer and partial-tree builder.
//!
//! Input is fed in arbitrary text chunks. The parser emits structural events
//! (declarations, DOCTYPE with its internal subset, start and end tags,
//! comments) and materializes each element as a small tree the moment its
//! end tag arrives. With [`ParserOptions::skip_root`] the outermost element
//! is never built, so a document holding millions of records parses in
//! memory bounded by one record.
//!
//! ```rust
//! use core::ops::ControlFlow;
//! use xmlmodem::{ElementsNamed, ParserOptions, StreamingParser};
//!
//! let mut seqs = Vec::new();
//! let mut handler = ElementsNamed::new("entry", |entry| {
//!     seqs.push(entry.find("ent_seq").map(|s| s.text()));
//!     ControlFlow::Continue(())
//! });
//! let mut parser = StreamingParser::new(ParserOptions {
//!     skip_root: true,
//!     ..Default::default()
//! });
//! for chunk in ["<JMdict><entry><ent_", "seq>1000</ent_seq></entry>", "</JMdict>"] {
//!     parser.feed(chunk, &mut handler).unwrap();
//! }
//! parser.finish().unwrap();
//! assert_eq!(seqs, [Some("1000".to_string())]);
//! ```

#![no_std]
#![allow(missing_docs)]
extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

mod doctype;
mod element;
mod event;
mod handler;
mod parser;
mod schema;
mod xmlmodem;

#[cfg(feature = "std")]
mod read;

#[cfg(test)]
mod tests;

pub use doctype::{AttributeDef, DeclKind, Declaration, DefaultType, Doctype, DtdDecl, ExternalId};
pub use element::{Attributes, Element, Node, Tag};
pub use event::{ParseEvent, ProcessingInstruction, XmlDeclaration};
pub use handler::{Collector, ElementsNamed, EntityTable, Flow, Handler, StopAfter};
pub use parser::{
    AddSource, ParserError, ParserOptions, Path, REFERENCE_COMMENT_WINDOW, Status, StreamingParser,
    SyntaxError,
};
#[cfg(feature = "std")]
pub use read::{DEFAULT_CHUNK_SIZE, ReadError, XmlReader, parse_reader};
pub use schema::{Schema, SchemaError, Typed, Vocabulary, validate};
pub use xmlmodem::{XmlModem, XmlModemClosed, XmlModemIter};
