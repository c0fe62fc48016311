//! Generic element tree produced by the parser.
//!
//! Tag names and attribute values are plain strings; no vocabulary is baked
//! in. See [`crate::schema`] for an optional validating overlay.

use alloc::{collections::BTreeMap, string::String, sync::Arc, vec::Vec};

/// Attribute mapping of a start or self-closing tag.
pub type Attributes = BTreeMap<String, String>;

/// A start or self-closing tag as reported to `on_open_tag` /
/// `on_selfclose_tag`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub name: Arc<str>,
    pub attributes: Attributes,
}

/// A completed element.
///
/// Elements are shared through [`Arc`]: the same allocation is handed to the
/// consumer and, when the parent is retained, stored among the parent's
/// children.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: Arc<str>,
    pub attributes: Attributes,
    pub children: Vec<Node>,
    /// Raw start tag text, present when requested through
    /// [`AddSource`](crate::AddSource).
    pub source: Option<String>,
}

/// A child of an [`Element`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Element(Arc<Element>),
    Text(String),
}

impl Element {
    #[must_use]
    pub fn new(tag: Tag) -> Self {
        Self {
            name: tag.name,
            attributes: tag.attributes,
            children: Vec::new(),
            source: None,
        }
    }

    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Child elements in document order, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Arc<Element>> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Direct children named `name`.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Arc<Element>> {
        self.elements().filter(move |e| &*e.name == name)
    }

    /// First direct child named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Arc<Element>> {
        self.elements().find(|e| &*e.name == name)
    }

    /// Concatenation of the direct text children.
    #[must_use]
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(t) = node {
                out.push_str(t);
            }
        }
        out
    }

    pub(crate) fn push_text(&mut self, text: String) {
        self.children.push(Node::Text(text));
    }

    pub(crate) fn push_element(&mut self, element: Arc<Element>) {
        self.children.push(Node::Element(element));
    }
}

impl From<&Element> for Tag {
    fn from(e: &Element) -> Self {
        Tag {
            name: e.name.clone(),
            attributes: e.attributes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::{string::ToString, vec};

    use super::*;

    fn leaf(name: &str, text: &str) -> Arc<Element> {
        Arc::new(Element {
            name: name.into(),
            attributes: Attributes::new(),
            children: vec![Node::Text(text.to_string())],
            source: None,
        })
    }

    #[test]
    fn accessors() {
        let mut attributes = Attributes::new();
        attributes.insert("xml:lang".into(), "eng".into());
        let entry = Element {
            name: "entry".into(),
            attributes,
            children: vec![
                Node::Element(leaf("keb", "猫")),
                Node::Text("between".into()),
                Node::Element(leaf("gloss", "cat")),
                Node::Element(leaf("gloss", "feline")),
            ],
            source: None,
        };

        assert_eq!(entry.attribute("xml:lang"), Some("eng"));
        assert_eq!(entry.attribute("missing"), None);
        assert_eq!(entry.elements().count(), 3);
        assert_eq!(entry.elements_named("gloss").count(), 2);
        assert_eq!(entry.find("gloss").map(|g| g.text()), Some("cat".to_string()));
        assert!(entry.find("sense").is_none());
        assert_eq!(entry.text(), "between");
    }

    #[test]
    fn found_child_outlives_the_lookup_name() {
        let entry = Element {
            name: "entry".into(),
            attributes: Attributes::new(),
            children: vec![Node::Element(leaf("gloss", "cat"))],
            source: None,
        };
        let found = {
            let name = "gloss".to_string();
            entry.find(&name)
        };
        assert_eq!(found.map(|g| g.text()), Some("cat".to_string()));
    }
}
