//! Optional typed overlay over the untyped element tree.
//!
//! The parser itself never looks at tag or attribute names beyond matching
//! start and end tags. A consumer that expects a fixed vocabulary checks a
//! completed element once with [`validate`] (or [`Typed::new`]) and then
//! navigates it through [`Typed`], which only hands out children that were
//! covered by that check.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::String,
    sync::Arc,
};

use crate::element::Element;

/// Set of tag and attribute names a consumer knows how to interpret.
pub trait Vocabulary {
    fn recognizes_tag(&self, name: &str) -> bool;
    fn recognizes_attribute(&self, tag: &str, attribute: &str) -> bool;
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown tag <{tag}> at {path}")]
    UnknownTag { tag: String, path: String },
    #[error("unknown attribute {attribute:?} on <{tag}> at {path}")]
    UnknownAttribute {
        tag: String,
        attribute: String,
        path: String,
    },
}

/// A [`Vocabulary`] listing each tag with its allowed attribute names.
///
/// ```rust
/// use xmlmodem::{Schema, Vocabulary};
///
/// let schema = Schema::new()
///     .tag("entry", [] as [&str; 0])
///     .tag("gloss", ["xml:lang", "g_type"]);
/// assert!(schema.recognizes_attribute("gloss", "xml:lang"));
/// assert!(!schema.recognizes_tag("sense"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    tags: BTreeMap<String, BTreeSet<String>>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` with the given attributes. Repeated calls for the same tag
    /// merge their attribute sets.
    #[must_use]
    pub fn tag<I>(mut self, name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.tags
            .entry(name.into())
            .or_default()
            .extend(attributes.into_iter().map(Into::into));
        self
    }
}

impl Vocabulary for Schema {
    fn recognizes_tag(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    fn recognizes_attribute(&self, tag: &str, attribute: &str) -> bool {
        self.tags
            .get(tag)
            .is_some_and(|attributes| attributes.contains(attribute))
    }
}

impl<V: Vocabulary + ?Sized> Vocabulary for &V {
    fn recognizes_tag(&self, name: &str) -> bool {
        (**self).recognizes_tag(name)
    }

    fn recognizes_attribute(&self, tag: &str, attribute: &str) -> bool {
        (**self).recognizes_attribute(tag, attribute)
    }
}

/// Check `element` and all its descendants against `vocabulary`.
///
/// # Errors
///
/// The first unknown tag or attribute in document order.
pub fn validate<V: Vocabulary + ?Sized>(element: &Element, vocabulary: &V) -> Result<(), SchemaError> {
    let mut path = String::new();
    validate_at(element, vocabulary, &mut path)
}

fn validate_at<V: Vocabulary + ?Sized>(
    element: &Element,
    vocabulary: &V,
    path: &mut String,
) -> Result<(), SchemaError> {
    let len = path.len();
    if !path.is_empty() {
        path.push('/');
    }
    path.push_str(&element.name);

    if !vocabulary.recognizes_tag(&element.name) {
        return Err(SchemaError::UnknownTag {
            tag: String::from(&*element.name),
            path: path.clone(),
        });
    }
    if let Some(attribute) = element
        .attributes
        .keys()
        .find(|key| !vocabulary.recognizes_attribute(&element.name, key))
    {
        return Err(SchemaError::UnknownAttribute {
            tag: String::from(&*element.name),
            attribute: attribute.clone(),
            path: path.clone(),
        });
    }
    for child in element.elements() {
        validate_at(child, vocabulary, path)?;
    }

    path.truncate(len);
    Ok(())
}

/// An element known to conform to a vocabulary.
#[derive(Debug)]
pub struct Typed<'v, V: ?Sized> {
    element: Arc<Element>,
    vocabulary: &'v V,
}

impl<V: ?Sized> Clone for Typed<'_, V> {
    fn clone(&self) -> Self {
        Self {
            element: self.element.clone(),
            vocabulary: self.vocabulary,
        }
    }
}

impl<'v, V: Vocabulary + ?Sized> Typed<'v, V> {
    /// Validate `element` and wrap it.
    ///
    /// # Errors
    ///
    /// As for [`validate`].
    pub fn new(element: Arc<Element>, vocabulary: &'v V) -> Result<Self, SchemaError> {
        validate(&element, vocabulary)?;
        Ok(Self { element, vocabulary })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.element.name
    }

    /// Attribute value, or `None` when absent. Asking for an attribute the
    /// vocabulary does not list for this tag is a logic error.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        debug_assert!(
            self.vocabulary.recognizes_attribute(&self.element.name, key),
            "attribute {key:?} is not part of <{}>",
            self.element.name
        );
        self.element.attribute(key)
    }

    /// Direct children named `name`, already validated.
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = Typed<'v, V>> + 'a {
        self.element.elements_named(name).map(|element| Typed {
            element: element.clone(),
            vocabulary: self.vocabulary,
        })
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<Typed<'v, V>> {
        self.children(name).next()
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.element.text()
    }

    #[must_use]
    pub fn element(&self) -> &Arc<Element> {
        &self.element
    }

    #[must_use]
    pub fn into_inner(self) -> Arc<Element> {
        self.element
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec::Vec};

    use super::*;
    use crate::{Collector, ParseEvent, ParserOptions, StreamingParser};

    fn parse_last(xml: &str) -> Arc<Element> {
        let mut parser = StreamingParser::new(ParserOptions::default());
        let mut events = Collector::default();
        parser.feed(xml, &mut events).unwrap();
        parser.finish().unwrap();
        events
            .into_events()
            .into_iter()
            .filter_map(|e| match e {
                ParseEvent::Element(e) => Some(e),
                _ => None,
            })
            .last()
            .unwrap()
    }

    fn jmdict() -> Schema {
        Schema::new()
            .tag("entry", [] as [&str; 0])
            .tag("ent_seq", [] as [&str; 0])
            .tag("sense", [] as [&str; 0])
            .tag("gloss", ["xml:lang", "g_type"])
    }

    #[test]
    fn typed_navigation() {
        let entry = parse_last(
            "<entry><ent_seq>1000</ent_seq><sense>\
             <gloss>cat</gloss><gloss xml:lang=\"ger\">Katze</gloss></sense></entry>",
        );
        let schema = jmdict();
        let entry = Typed::new(entry, &schema).unwrap();
        assert_eq!(entry.child("ent_seq").unwrap().text(), "1000");

        let sense = entry.child("sense").unwrap();
        let glosses: Vec<_> = sense
            .children("gloss")
            .map(|g| (g.attribute("xml:lang").map(ToString::to_string), g.text()))
            .collect();
        assert_eq!(
            glosses,
            [(None, "cat".to_string()), (Some("ger".to_string()), "Katze".to_string())]
        );
    }

    #[test]
    fn reports_first_unknown_name() {
        let schema = jmdict();
        let err = validate(&parse_last("<entry><sense><pos/></sense></entry>"), &schema).unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownTag {
                tag: "pos".into(),
                path: "entry/sense/pos".into()
            }
        );

        let err = validate(&parse_last("<entry><sense><gloss lang=\"x\"/></sense></entry>"), &schema)
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownAttribute { ref attribute, .. } if attribute == "lang"));
    }
}
