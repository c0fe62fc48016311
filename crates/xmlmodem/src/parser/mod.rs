//! Incremental XML tokenizer and partial-tree builder.
//!
//! Overview
//! - Input arrives as arbitrary `&str` chunks. Every character is dispatched
//!   on the top of the [`TokenStack`]; that top is the whole parse state.
//!   Chunk boundaries may fall anywhere, including inside a delimiter, since
//!   all cross-chunk state lives in [`StreamingParser`].
//! - Completed constructs fire [`Handler`] callbacks synchronously. A slow
//!   callback stalls input consumption, so at most one element is in flight
//!   to the consumer at a time.
//!
//! Retention
//! - An element is materialized in the path-keyed [`ElementCache`] from its
//!   start tag to its end tag. On close it is handed to
//!   [`Handler::on_element`] and, if its parent is retained, appended to the
//!   parent's children.
//! - With [`ParserOptions::skip_root`] the outermost element is never
//!   materialized. Its direct children then have no owner besides the
//!   consumer once emitted, which bounds peak memory by the depth of one
//!   record.
//!
//! Stopping
//! - A callback returning `ControlFlow::Break` stops the parser after the
//!   current character. Unread input is kept and processed first by the next
//!   [`StreamingParser::feed`] or [`StreamingParser::resume`].

mod cache;
mod dtd;
mod error;
mod options;
mod rolling_buffer;
mod tag;
mod token;

#[cfg(test)]
mod tests;

use alloc::{format, string::String, sync::Arc, vec::Vec};

use cache::{ElementCache, display_path};
pub use cache::Path;
pub use error::{ParserError, SyntaxError};
pub use options::{AddSource, ParserOptions, REFERENCE_COMMENT_WINDOW};
use rolling_buffer::RollingBuffer;
use tag::TagKind;
use token::{Token, TokenStack};

use crate::{
    doctype::{DeclKind, Declaration, Doctype},
    element::Element,
    event::{ProcessingInstruction, XmlDeclaration},
    handler::{Flow, Handler},
};

/// Longest internal-subset opener, `<!NOTATION`.
const SUBSET_LOOKBACK: usize = 10;

/// Outcome of feeding input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// All input was consumed; feed the next chunk.
    NeedMore,
    /// A handler asked to stop. Unread input is kept for
    /// [`StreamingParser::resume`].
    Stopped,
}

#[derive(Debug, Default)]
enum DoctypeState {
    #[default]
    Idle,
    /// Internal subset open; declarations accumulate here.
    Open(Doctype),
    /// Subset closed and reported; waiting for the final `>`.
    Emitted,
}

/// The streaming XML parser.
///
/// # Examples
///
/// ```rust
/// use xmlmodem::{Collector, ParseEvent, ParserOptions, StreamingParser};
///
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// let mut events = Collector::default();
/// parser.feed("<gloss xml:lang=\"eng\">c", &mut events).unwrap();
/// parser.feed("at</gloss>", &mut events).unwrap();
/// parser.finish().unwrap();
///
/// let element = events.events().iter().find_map(|e| match e {
///     ParseEvent::Element(e) => Some(e.clone()),
///     _ => None,
/// });
/// let element = element.unwrap();
/// assert_eq!(element.attribute("xml:lang"), Some("eng"));
/// assert_eq!(element.text(), "cat");
/// ```
#[derive(Debug)]
pub struct StreamingParser {
    /// Input left unread by a cooperative stop.
    source: RollingBuffer,
    line: usize,
    column: usize,

    tokens: TokenStack,
    /// Raw characters of the tag, PI, DOCTYPE header, CDATA section or
    /// declaration being scanned.
    buffer: RollingBuffer,
    comment: RollingBuffer,
    /// Tail of the internal subset, long enough to spot `<!NOTATION`.
    lookback: RollingBuffer,
    /// Quote character of the literal open inside a tag, DOCTYPE header or
    /// DTD declaration.
    quote: Option<char>,
    /// Text of the current run, up to the next `<`.
    text: String,
    /// Trimmed text waiting to be attached to the open element.
    pending_text: Option<String>,

    elements: ElementCache,
    /// Name and attributes of the root under `skip_root`.
    skipped_root: Option<Element>,
    doctype: DoctypeState,

    options: ParserOptions,
    stopped: bool,
    error: Option<ParserError>,
}

impl StreamingParser {
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        // A window shorter than `--` could never see a comment close.
        let window = options.comment_window.map(|n| n.max(2));
        Self {
            source: RollingBuffer::new(),
            line: 1,
            column: 1,
            tokens: TokenStack::default(),
            buffer: RollingBuffer::new(),
            comment: RollingBuffer::with_limit(window),
            lookback: RollingBuffer::bounded(SUBSET_LOOKBACK),
            quote: None,
            text: String::new(),
            pending_text: None,
            elements: ElementCache::default(),
            skipped_root: None,
            doctype: DoctypeState::Idle,
            options,
            stopped: false,
            error: None,
        }
    }

    /// Feed a chunk of text, invoking `handler` for every construct that
    /// completes inside it.
    ///
    /// Input left over by an earlier stop is processed before `chunk`.
    ///
    /// # Errors
    ///
    /// Returns the first structural violation. The error is sticky: later
    /// calls return it again without consuming input.
    pub fn feed<H: Handler + ?Sized>(
        &mut self,
        chunk: &str,
        handler: &mut H,
    ) -> Result<Status, ParserError> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.stopped = false;

        if !self.source.is_empty() {
            self.source.push_str(chunk);
            while let Some(c) = self.source.pop_front() {
                self.consume(c, handler)?;
                if self.stopped {
                    return Ok(self.stop());
                }
            }
            return Ok(Status::NeedMore);
        }

        for (i, c) in chunk.char_indices() {
            self.consume(c, handler)?;
            if self.stopped {
                self.source.push_str(&chunk[i + c.len_utf8()..]);
                return Ok(self.stop());
            }
        }
        Ok(Status::NeedMore)
    }

    /// Continue after a [`Status::Stopped`] without new input.
    ///
    /// # Errors
    ///
    /// As for [`StreamingParser::feed`].
    pub fn resume<H: Handler + ?Sized>(&mut self, handler: &mut H) -> Result<Status, ParserError> {
        self.feed("", handler)
    }

    /// Declare the end of input.
    ///
    /// A parser that was stopped by its handler finishes successfully
    /// whatever remains open: stopping early is how partial documents are
    /// read.
    ///
    /// # Errors
    ///
    /// The sticky error, if any, or
    /// [`SyntaxError::UnterminatedConstruct`] when input ends inside a tag,
    /// comment, DOCTYPE, or open element.
    pub fn finish(self) -> Result<(), ParserError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.stopped {
            return Ok(());
        }
        match self.tokens.top() {
            None => Ok(()),
            Some(token) => Err(ParserError {
                kind: SyntaxError::UnterminatedConstruct {
                    construct: token.describe(),
                    path: display_path(self.tokens.path()),
                },
                line: self.line,
                column: self.column,
            }),
        }
    }

    /// Number of open elements.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tokens.depth()
    }

    /// Elements currently materialized in the cache.
    #[must_use]
    pub fn cached_elements(&self) -> usize {
        self.elements.len()
    }

    /// High-water mark of [`StreamingParser::cached_elements`].
    #[must_use]
    pub fn peak_cached_elements(&self) -> usize {
        self.elements.peak()
    }

    /// 1-based line and column of the next character.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    fn stop(&self) -> Status {
        log::debug!(
            "stopped by handler at {}:{} with {} characters unread",
            self.line,
            self.column,
            self.source.len()
        );
        Status::Stopped
    }

    fn consume<H: Handler + ?Sized>(&mut self, c: char, handler: &mut H) -> Result<(), ParserError> {
        if let Err(kind) = self.step(c, handler) {
            let err = ParserError {
                kind,
                line: self.line,
                column: self.column,
            };
            #[cfg(any(test, feature = "fuzzing"))]
            assert!(!self.options.panic_on_error, "Syntax error: {err}");
            self.error = Some(err.clone());
            return Err(err);
        }
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Ok(())
    }

    fn observe(&mut self, flow: Flow) {
        if flow.is_break() {
            self.stopped = true;
        }
    }

    // ------------------------------------------------------------------------------------------------
    // Dispatch on the top of the token stack
    // ------------------------------------------------------------------------------------------------

    fn step<H: Handler + ?Sized>(&mut self, c: char, handler: &mut H) -> Result<(), SyntaxError> {
        match self.tokens.top() {
            None | Some(Token::Element(_)) => {
                self.text_char(c)?;
                Ok(())
            }
            Some(Token::OpenAngle) => self.open_angle_char(c, handler),
            Some(Token::Comment) => {
                self.comment_char(c, handler);
                Ok(())
            }
            Some(Token::CData) => {
                self.cdata_char(c);
                Ok(())
            }
            Some(Token::ProcessingInstruction) => self.processing_instruction_char(c, handler),
            Some(Token::Doctype) => self.doctype_char(c, handler),
            Some(Token::DoctypeInternalSubset) => self.subset_char(c, handler),
            Some(&Token::Declaration(kind)) => self.declaration_char(kind, c, handler),
        }
    }

    fn text_char(&mut self, c: char) -> Result<(), SyntaxError> {
        if c == '<' {
            self.stash_text()?;
            self.tokens.push(Token::OpenAngle);
            self.buffer.clear();
            self.quote = None;
        } else if self.tokens.depth() > 0 {
            self.text.push(c);
        }
        Ok(())
    }

    fn open_angle_char<H: Handler + ?Sized>(
        &mut self,
        c: char,
        handler: &mut H,
    ) -> Result<(), SyntaxError> {
        match c {
            '<' => Err(SyntaxError::UnexpectedToken {
                found: String::from("<"),
                context: "inside a tag",
            }),
            _ if self.in_literal(c) => Ok(()),
            '>' => {
                self.tokens.pop();
                let raw = self.buffer.flush();
                self.handle_tag(&raw, handler)
            }
            '"' | '\'' if self.buffer.first() != Some('!') => {
                self.quote = Some(c);
                self.buffer.push(c);
                Ok(())
            }
            _ => {
                self.buffer.push(c);
                if self.buffer.is("!--") {
                    self.tokens.replace_top(Token::Comment);
                    self.buffer.clear();
                    self.comment.clear();
                } else if self.buffer.is("!DOCTYPE") {
                    self.tokens.replace_top(Token::Doctype);
                    self.buffer.clear();
                    self.quote = None;
                } else if self.buffer.is("![CDATA[") {
                    self.tokens.replace_top(Token::CData);
                    self.buffer.clear();
                } else if self.buffer.len() == 1 && self.buffer.first() == Some('?') {
                    self.tokens.replace_top(Token::ProcessingInstruction);
                    self.buffer.clear();
                }
                Ok(())
            }
        }
    }

    fn comment_char<H: Handler + ?Sized>(&mut self, c: char, handler: &mut H) {
        if c == '>' && self.comment.ends_with("--") {
            self.tokens.pop();
            let body = self.comment.flush();
            let text = format!("<!--{body}>");
            let flow = handler.on_comment(&text);
            self.observe(flow);
        } else {
            self.comment.push(c);
        }
    }

    fn cdata_char(&mut self, c: char) {
        if c == '>' && self.buffer.ends_with("]]") {
            self.tokens.pop();
            let mut content = self.buffer.flush();
            content.truncate(content.len() - 2);
            if self.tokens.depth() > 0 {
                self.text.push_str(&content);
            }
        } else {
            self.buffer.push(c);
        }
    }

    fn processing_instruction_char<H: Handler + ?Sized>(
        &mut self,
        c: char,
        handler: &mut H,
    ) -> Result<(), SyntaxError> {
        if c != '>' {
            self.buffer.push(c);
            return Ok(());
        }
        if !self.buffer.ends_with("?") {
            return Err(SyntaxError::UnexpectedToken {
                found: String::from(">"),
                context: "closing a processing instruction without '?'",
            });
        }
        self.tokens.pop();
        let mut body = self.buffer.flush();
        body.pop();

        let body = body.trim();
        let (target, data) = match body.find(char::is_whitespace) {
            Some(i) => (&body[..i], body[i..].trim()),
            None => (body, ""),
        };
        let flow = if target == "xml" {
            let declaration = parse_xml_declaration(data)?;
            handler.on_declaration(&declaration)
        } else if target.is_empty() {
            return Err(SyntaxError::MalformedTag {
                tag: String::from("?"),
                reason: "missing processing instruction target",
            });
        } else {
            handler.on_processing_instruction(&ProcessingInstruction {
                target: String::from(target),
                data: String::from(data),
            })
        };
        self.observe(flow);
        Ok(())
    }

    fn doctype_char<H: Handler + ?Sized>(&mut self, c: char, handler: &mut H) -> Result<(), SyntaxError> {
        if self.in_literal(c) {
            return Ok(());
        }
        match c {
            '"' | '\'' => {
                self.quote = Some(c);
                self.buffer.push(c);
            }
            '[' if matches!(self.doctype, DoctypeState::Idle) => {
                let header = self.buffer.flush();
                let doctype = dtd::parse_doctype_header(&header)?;
                log::debug!("DOCTYPE {} opened an internal subset", doctype.root);
                self.doctype = DoctypeState::Open(Doctype {
                    internal: Some(Vec::new()),
                    ..doctype
                });
                self.lookback.clear();
                self.tokens.push(Token::DoctypeInternalSubset);
            }
            '>' => {
                self.tokens.pop();
                let header = self.buffer.flush();
                match core::mem::take(&mut self.doctype) {
                    DoctypeState::Emitted => {}
                    DoctypeState::Idle => {
                        let doctype = dtd::parse_doctype_header(&header)?;
                        log::debug!("DOCTYPE {} without internal subset", doctype.root);
                        let flow = handler.on_doctype(doctype);
                        self.observe(flow);
                    }
                    DoctypeState::Open(_) => {
                        return Err(SyntaxError::UnexpectedToken {
                            found: String::from(">"),
                            context: "while the DOCTYPE internal subset is open",
                        });
                    }
                }
            }
            _ => self.buffer.push(c),
        }
        Ok(())
    }

    /// Buffer `c` as part of an open quoted literal, closing it on the
    /// matching quote. Returns `false` when no literal is open.
    fn in_literal(&mut self, c: char) -> bool {
        let Some(q) = self.quote else {
            return false;
        };
        if c == q {
            self.quote = None;
        }
        self.buffer.push(c);
        true
    }

    fn subset_char<H: Handler + ?Sized>(&mut self, c: char, handler: &mut H) -> Result<(), SyntaxError> {
        if c == ']' {
            self.tokens.pop();
            self.lookback.clear();
            let DoctypeState::Open(doctype) = core::mem::replace(&mut self.doctype, DoctypeState::Emitted)
            else {
                return Err(SyntaxError::UnexpectedToken {
                    found: String::from("]"),
                    context: "without an open DOCTYPE",
                });
            };
            let flow = handler.on_doctype(doctype);
            self.observe(flow);
            return Ok(());
        }

        self.lookback.push(c);
        for (opener, kind) in DeclKind::OPENERS {
            if self.lookback.ends_with(opener) {
                self.tokens.push(Token::Declaration(kind));
                self.buffer.clear();
                self.quote = None;
                self.lookback.clear();
                return Ok(());
            }
        }
        if self.lookback.ends_with("<!--") {
            self.tokens.push(Token::Comment);
            self.comment.clear();
            self.lookback.clear();
        }
        Ok(())
    }

    fn declaration_char<H: Handler + ?Sized>(
        &mut self,
        kind: DeclKind,
        c: char,
        handler: &mut H,
    ) -> Result<(), SyntaxError> {
        if self.in_literal(c) {
            return Ok(());
        }
        match c {
            '"' | '\'' => {
                self.quote = Some(c);
                self.buffer.push(c);
            }
            '>' => {
                self.tokens.pop();
                let raw = self.buffer.flush();
                let decl = dtd::parse_declaration(kind, raw.trim())?;
                let source = self
                    .options
                    .add_source
                    .wants_declaration(kind)
                    .then(|| format!("<{}{raw}>", kind.keyword()));
                let declaration = Declaration { decl, source };

                let DoctypeState::Open(doctype) = &mut self.doctype else {
                    return Err(SyntaxError::UnexpectedToken {
                        found: String::from(kind.keyword()),
                        context: "without an open DOCTYPE",
                    });
                };
                log::debug!("{} declaration in DOCTYPE {}", kind.keyword(), doctype.root);
                doctype
                    .internal
                    .get_or_insert_with(Vec::new)
                    .push(declaration.clone());

                let flow = handler.on_dtd_decl(&declaration);
                self.observe(flow);
            }
            _ => self.buffer.push(c),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------------------------------
    // Tag dispatcher
    // ------------------------------------------------------------------------------------------------

    /// Whether an element at `depth` (1 = outermost) is materialized.
    fn is_retained(&self, depth: usize) -> bool {
        depth > 0 && !(self.options.skip_root && depth == 1)
    }

    fn missing_entry(path: &[Arc<str>]) -> SyntaxError {
        SyntaxError::MissingCacheEntry {
            path: display_path(path),
        }
    }

    /// Move the current text run into `pending_text`, attaching any text that
    /// was already pending first so runs split by comments keep their order.
    fn stash_text(&mut self) -> Result<(), SyntaxError> {
        let trimmed = self.text.trim();
        if !trimmed.is_empty() {
            let text = String::from(trimmed);
            self.attach_pending_text()?;
            self.pending_text = Some(text);
        }
        self.text.clear();
        Ok(())
    }

    fn attach_pending_text(&mut self) -> Result<(), SyntaxError> {
        let Some(text) = self.pending_text.take() else {
            return Ok(());
        };
        let path = self.tokens.path();
        if self.is_retained(path.len()) {
            match self.elements.get_mut(path) {
                Some(element) => element.push_text(text),
                None => return Err(Self::missing_entry(path)),
            }
        }
        Ok(())
    }

    fn handle_tag<H: Handler + ?Sized>(&mut self, raw: &str, handler: &mut H) -> Result<(), SyntaxError> {
        match tag::classify(raw) {
            TagKind::End(name) => self.close_element(name, handler),
            TagKind::SelfClosing(body) => self.self_close(raw, body, handler),
            TagKind::Start(body) => self.open_element(raw, body, handler),
        }
    }

    fn open_element<H: Handler + ?Sized>(
        &mut self,
        raw: &str,
        body: &str,
        handler: &mut H,
    ) -> Result<(), SyntaxError> {
        let tag = tag::parse_tag(body)?;
        self.attach_pending_text()?;
        self.tokens.push(Token::Element(tag.name.clone()));

        let depth = self.tokens.depth();
        let mut element = Element::new(tag.clone());
        if self.is_retained(depth) {
            if self.options.add_source.wants_tag(&tag.name) {
                element.source = Some(format!("<{raw}>"));
            }
            self.elements.insert(self.tokens.path().to_vec(), element);
        } else {
            self.skipped_root = Some(element);
        }
        log::trace!("opened <{}> at depth {depth}", tag.name);

        let flow = handler.on_open_tag(&tag);
        self.observe(flow);
        Ok(())
    }

    fn close_element<H: Handler + ?Sized>(&mut self, name: &str, handler: &mut H) -> Result<(), SyntaxError> {
        match self.tokens.top() {
            Some(Token::Element(open)) if &**open == name => {}
            Some(Token::Element(open)) => {
                return Err(SyntaxError::MismatchedTag {
                    expected: Some(String::from(&**open)),
                    found: String::from(name),
                });
            }
            _ => {
                return Err(SyntaxError::MismatchedTag {
                    expected: None,
                    found: String::from(name),
                });
            }
        }
        self.attach_pending_text()?;

        let depth = self.tokens.depth();
        let element = if self.is_retained(depth) {
            let path = self.tokens.path();
            self.elements
                .remove(path)
                .ok_or_else(|| Self::missing_entry(path))?
        } else {
            self.skipped_root
                .take()
                .ok_or_else(|| Self::missing_entry(self.tokens.path()))?
        };
        let element = Arc::new(element);

        let parent_depth = depth - 1;
        if self.is_retained(parent_depth) {
            let parent_path = &self.tokens.path()[..parent_depth];
            match self.elements.get_mut(parent_path) {
                Some(parent) => parent.push_element(element.clone()),
                None => return Err(Self::missing_entry(parent_path)),
            }
        }
        log::trace!("closed <{name}> at depth {depth}");

        self.tokens.pop();
        let flow = handler.on_element(element);
        self.observe(flow);
        let flow = handler.on_close_tag(name);
        self.observe(flow);
        Ok(())
    }

    fn self_close<H: Handler + ?Sized>(
        &mut self,
        raw: &str,
        body: &str,
        handler: &mut H,
    ) -> Result<(), SyntaxError> {
        let tag = tag::parse_tag(body)?;
        self.attach_pending_text()?;

        let mut element = Element::new(tag.clone());
        if self.options.add_source.wants_tag(&tag.name) {
            element.source = Some(format!("<{raw}>"));
        }
        let element = Arc::new(element);

        let path = self.tokens.path();
        if self.is_retained(path.len()) {
            match self.elements.get_mut(path) {
                Some(parent) => parent.push_element(element.clone()),
                None => return Err(Self::missing_entry(path)),
            }
        }

        let flow = handler.on_element(element);
        self.observe(flow);
        let flow = handler.on_selfclose_tag(&tag);
        self.observe(flow);
        Ok(())
    }
}

impl Default for StreamingParser {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

fn parse_xml_declaration(data: &str) -> Result<XmlDeclaration, SyntaxError> {
    let malformed = |reason: &'static str| SyntaxError::MalformedTag {
        tag: String::from("?xml"),
        reason,
    };
    let mut attributes = tag::parse_attributes(data).map_err(malformed)?;
    let standalone = match attributes.remove("standalone").as_deref() {
        None => None,
        Some("yes") => Some(true),
        Some("no") => Some(false),
        Some(_) => return Err(malformed("standalone must be \"yes\" or \"no\"")),
    };
    Ok(XmlDeclaration {
        version: attributes.remove("version"),
        encoding: attributes.remove("encoding"),
        standalone,
    })
}
