use alloc::{collections::BTreeMap, string::String, sync::Arc, vec::Vec};

use crate::element::Element;

/// Ancestor tag names from the outermost open element down to the current
/// one.
pub type Path = Vec<Arc<str>>;

pub(crate) fn display_path(path: &[Arc<str>]) -> String {
    let mut out = String::new();
    for (i, name) in path.iter().enumerate() {
        if i > 0 {
            out.push('/');
        }
        out.push_str(name);
    }
    out
}

/// In-progress elements keyed by their path.
///
/// Well-formed XML never has two siblings open at the same depth under the
/// same ancestor chain, so at most one element per path key is ever present
/// and the map behaves like a depth-indexed stack.
#[derive(Debug, Default)]
pub(crate) struct ElementCache {
    open: BTreeMap<Path, Element>,
    peak: usize,
}

impl ElementCache {
    pub(crate) fn insert(&mut self, path: Path, element: Element) {
        self.open.insert(path, element);
        self.peak = self.peak.max(self.open.len());
    }

    pub(crate) fn get_mut(&mut self, path: &[Arc<str>]) -> Option<&mut Element> {
        self.open.get_mut(path)
    }

    pub(crate) fn remove(&mut self, path: &[Arc<str>]) -> Option<Element> {
        self.open.remove(path)
    }

    pub(crate) fn len(&self) -> usize {
        self.open.len()
    }

    /// Largest number of simultaneously cached elements seen so far.
    pub(crate) fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Tag;

    fn path(names: &[&str]) -> Path {
        names.iter().map(|n| Arc::from(*n)).collect()
    }

    fn element(name: &str) -> Element {
        Element::new(Tag {
            name: name.into(),
            attributes: crate::Attributes::new(),
        })
    }

    #[test]
    fn keyed_by_full_path() {
        let mut cache = ElementCache::default();
        cache.insert(path(&["r", "a"]), element("a"));
        cache.insert(path(&["r", "a", "a"]), element("a"));
        assert_eq!(cache.len(), 2);

        cache.get_mut(&path(&["r", "a"])).unwrap().push_text("x".into());
        let inner = cache.remove(&path(&["r", "a", "a"])).unwrap();
        assert!(inner.children.is_empty());
        let outer = cache.remove(&path(&["r", "a"])).unwrap();
        assert_eq!(outer.text(), "x");
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.peak(), 2);
        assert!(cache.remove(&path(&["r"])).is_none());
    }

    #[test]
    fn displays_path() {
        assert_eq!(display_path(&path(&["JMdict", "entry", "sense"])), "JMdict/entry/sense");
        assert_eq!(display_path(&[]), "");
    }
}
