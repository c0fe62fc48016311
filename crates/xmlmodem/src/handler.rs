//! The consumer-facing callback surface.
//!
//! Callbacks run synchronously, inline with character processing. Every
//! method defaults to a no-op, so a handler implements only what it needs.
//! Returning [`ControlFlow::Break`] asks the parser to stop before the next
//! character; see [`StreamingParser::feed`](crate::StreamingParser::feed).

use alloc::{collections::BTreeMap, string::String, sync::Arc, vec::Vec};
use core::ops::ControlFlow;

use crate::{
    doctype::{Declaration, Doctype, DtdDecl},
    element::{Element, Tag},
    event::{ParseEvent, ProcessingInstruction, XmlDeclaration},
};

/// Result of a callback: keep going or stop.
pub type Flow = ControlFlow<()>;

const CONTINUE: Flow = ControlFlow::Continue(());

pub trait Handler {
    fn on_declaration(&mut self, _declaration: &XmlDeclaration) -> Flow {
        CONTINUE
    }

    fn on_processing_instruction(&mut self, _pi: &ProcessingInstruction) -> Flow {
        CONTINUE
    }

    /// The doctype is handed over by value; the parser keeps no copy.
    fn on_doctype(&mut self, _doctype: Doctype) -> Flow {
        CONTINUE
    }

    /// Fires for every completed element, whether or not it was retained.
    ///
    /// The parser drops its own reference once the element is also stored
    /// in a retained parent, or immediately when the parent is not
    /// retained.
    fn on_element(&mut self, _element: Arc<Element>) -> Flow {
        CONTINUE
    }

    fn on_open_tag(&mut self, _tag: &Tag) -> Flow {
        CONTINUE
    }

    fn on_close_tag(&mut self, _name: &str) -> Flow {
        CONTINUE
    }

    fn on_selfclose_tag(&mut self, _tag: &Tag) -> Flow {
        CONTINUE
    }

    fn on_dtd_decl(&mut self, _decl: &Declaration) -> Flow {
        CONTINUE
    }

    /// `text` includes the `<!--` and `-->` delimiters.
    fn on_comment(&mut self, _text: &str) -> Flow {
        CONTINUE
    }
}

impl<H: Handler + ?Sized> Handler for &mut H {
    fn on_declaration(&mut self, declaration: &XmlDeclaration) -> Flow {
        (**self).on_declaration(declaration)
    }

    fn on_processing_instruction(&mut self, pi: &ProcessingInstruction) -> Flow {
        (**self).on_processing_instruction(pi)
    }

    fn on_doctype(&mut self, doctype: Doctype) -> Flow {
        (**self).on_doctype(doctype)
    }

    fn on_element(&mut self, element: Arc<Element>) -> Flow {
        (**self).on_element(element)
    }

    fn on_open_tag(&mut self, tag: &Tag) -> Flow {
        (**self).on_open_tag(tag)
    }

    fn on_close_tag(&mut self, name: &str) -> Flow {
        (**self).on_close_tag(name)
    }

    fn on_selfclose_tag(&mut self, tag: &Tag) -> Flow {
        (**self).on_selfclose_tag(tag)
    }

    fn on_dtd_decl(&mut self, decl: &Declaration) -> Flow {
        (**self).on_dtd_decl(decl)
    }

    fn on_comment(&mut self, text: &str) -> Flow {
        (**self).on_comment(text)
    }
}

/// Records every callback as a [`ParseEvent`], in document order.
#[derive(Debug, Default, Clone)]
pub struct Collector {
    events: Vec<ParseEvent>,
}

impl Collector {
    #[must_use]
    pub fn events(&self) -> &[ParseEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<ParseEvent> {
        self.events
    }

    pub(crate) fn drain(&mut self) -> alloc::vec::Drain<'_, ParseEvent> {
        self.events.drain(..)
    }

    fn record(&mut self, event: ParseEvent) -> Flow {
        self.events.push(event);
        CONTINUE
    }
}

impl Handler for Collector {
    fn on_declaration(&mut self, declaration: &XmlDeclaration) -> Flow {
        self.record(ParseEvent::Declaration(declaration.clone()))
    }

    fn on_processing_instruction(&mut self, pi: &ProcessingInstruction) -> Flow {
        self.record(ParseEvent::ProcessingInstruction(pi.clone()))
    }

    fn on_doctype(&mut self, doctype: Doctype) -> Flow {
        self.record(ParseEvent::Doctype(doctype))
    }

    fn on_element(&mut self, element: Arc<Element>) -> Flow {
        self.record(ParseEvent::Element(element))
    }

    fn on_open_tag(&mut self, tag: &Tag) -> Flow {
        self.record(ParseEvent::OpenTag(tag.clone()))
    }

    fn on_close_tag(&mut self, name: &str) -> Flow {
        self.record(ParseEvent::CloseTag(Arc::from(name)))
    }

    fn on_selfclose_tag(&mut self, tag: &Tag) -> Flow {
        self.record(ParseEvent::SelfCloseTag(tag.clone()))
    }

    fn on_dtd_decl(&mut self, decl: &Declaration) -> Flow {
        self.record(ParseEvent::DtdDecl(decl.clone()))
    }

    fn on_comment(&mut self, text: &str) -> Flow {
        self.record(ParseEvent::Comment(String::from(text)))
    }
}

/// Forwards completed elements with one tag name to a closure.
///
/// ```rust
/// use core::ops::ControlFlow;
/// use xmlmodem::{ElementsNamed, ParserOptions, StreamingParser};
///
/// let mut glosses = Vec::new();
/// let mut handler = ElementsNamed::new("gloss", |e| {
///     glosses.push(e.text());
///     ControlFlow::Continue(())
/// });
/// let mut parser = StreamingParser::new(ParserOptions::default());
/// parser.feed("<s><gloss>cat</gloss><gloss>feline</gloss></s>", &mut handler).unwrap();
/// parser.finish().unwrap();
/// assert_eq!(glosses, ["cat", "feline"]);
/// ```
pub struct ElementsNamed<'n, F> {
    name: &'n str,
    f: F,
}

impl<'n, F> ElementsNamed<'n, F>
where
    F: FnMut(Arc<Element>) -> Flow,
{
    pub fn new(name: &'n str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Handler for ElementsNamed<'_, F>
where
    F: FnMut(Arc<Element>) -> Flow,
{
    fn on_element(&mut self, element: Arc<Element>) -> Flow {
        if &*element.name == self.name {
            (self.f)(element)
        } else {
            CONTINUE
        }
    }
}

/// Collects general `<!ENTITY>` declarations into an abbreviation table.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EntityTable {
    entries: BTreeMap<String, String>,
}

impl EntityTable {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every `&key;` whose key is in the table; unknown references
    /// are left as written.
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find('&') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            match after.find(';').map(|end| (&after[..end], end)) {
                Some((key, end)) if self.entries.contains_key(key) => {
                    out.push_str(&self.entries[key]);
                    rest = &after[end + 1..];
                }
                _ => {
                    out.push('&');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
    }
}

impl Handler for EntityTable {
    fn on_dtd_decl(&mut self, decl: &Declaration) -> Flow {
        if let DtdDecl::Entity {
            key,
            value,
            parameter: false,
            external: None,
        } = &decl.decl
        {
            // The first declaration of an entity is binding.
            self.entries.entry(key.clone()).or_insert_with(|| value.clone());
        }
        CONTINUE
    }
}

/// Wraps a handler and stops the parse after `limit` elements named `name`
/// have been delivered.
pub struct StopAfter<'n, H> {
    inner: H,
    name: &'n str,
    remaining: usize,
}

impl<'n, H: Handler> StopAfter<'n, H> {
    pub fn new(inner: H, name: &'n str, limit: usize) -> Self {
        Self {
            inner,
            name,
            remaining: limit,
        }
    }

    pub fn into_inner(self) -> H {
        self.inner
    }
}

impl<H: Handler> Handler for StopAfter<'_, H> {
    fn on_declaration(&mut self, declaration: &XmlDeclaration) -> Flow {
        self.inner.on_declaration(declaration)
    }

    fn on_processing_instruction(&mut self, pi: &ProcessingInstruction) -> Flow {
        self.inner.on_processing_instruction(pi)
    }

    fn on_doctype(&mut self, doctype: Doctype) -> Flow {
        self.inner.on_doctype(doctype)
    }

    fn on_element(&mut self, element: Arc<Element>) -> Flow {
        let counted = &*element.name == self.name;
        self.inner.on_element(element)?;
        if counted {
            self.remaining = self.remaining.saturating_sub(1);
            if self.remaining == 0 {
                return ControlFlow::Break(());
            }
        }
        CONTINUE
    }

    fn on_open_tag(&mut self, tag: &Tag) -> Flow {
        self.inner.on_open_tag(tag)
    }

    fn on_close_tag(&mut self, name: &str) -> Flow {
        self.inner.on_close_tag(name)
    }

    fn on_selfclose_tag(&mut self, tag: &Tag) -> Flow {
        self.inner.on_selfclose_tag(tag)
    }

    fn on_dtd_decl(&mut self, decl: &Declaration) -> Flow {
        self.inner.on_dtd_decl(decl)
    }

    fn on_comment(&mut self, text: &str) -> Flow {
        self.inner.on_comment(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctype::ExternalId;

    fn entity(key: &str, value: &str) -> Declaration {
        Declaration {
            decl: DtdDecl::Entity {
                key: key.into(),
                value: value.into(),
                parameter: false,
                external: None,
            },
            source: None,
        }
    }

    #[test]
    fn entity_table_first_declaration_wins() {
        let mut table = EntityTable::default();
        let _ = table.on_dtd_decl(&entity("n", "noun (common) (futsuumeishi)"));
        let _ = table.on_dtd_decl(&entity("n", "ignored"));
        let _ = table.on_dtd_decl(&Declaration {
            decl: DtdDecl::Entity {
                key: "ext".into(),
                value: "x.ent".into(),
                parameter: false,
                external: Some(ExternalId { public_id: None, system_id: Some("x.ent".into()) }),
            },
            source: None,
        });
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("n"), Some("noun (common) (futsuumeishi)"));
    }

    #[test]
    fn entity_table_expands_known_references() {
        let mut table = EntityTable::default();
        let _ = table.on_dtd_decl(&entity("v5k", "Godan verb with 'ku' ending"));
        assert_eq!(table.expand("&v5k;"), "Godan verb with 'ku' ending");
        assert_eq!(table.expand("a &v5k; & b &unknown; &"), "a Godan verb with 'ku' ending & b &unknown; &");
        assert!(!table.is_empty());
    }
}
