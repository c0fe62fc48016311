use alloc::{collections::BTreeSet, string::String};

use crate::doctype::DeclKind;

/// Conventional comment look-back length for [`ParserOptions::comment_window`].
pub const REFERENCE_COMMENT_WINDOW: usize = 1024;

/// Configuration options for the streaming XML parser.
///
/// # Examples
///
/// ```rust
/// use xmlmodem::{AddSource, DeclKind, ParserOptions};
///
/// let options = ParserOptions {
///     skip_root: true,
///     add_source: AddSource::default().tag("entry").declaration(DeclKind::Entity),
///     ..Default::default()
/// };
/// assert!(options.add_source.wants_tag("entry"));
/// ```
///
/// # Default
///
/// Every element is retained, no raw source is captured, and comment bodies
/// are kept whole.
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Never materialize the document's outermost element.
    ///
    /// Each direct child of the root is built as a complete subtree, handed
    /// to [`Handler::on_element`](crate::Handler::on_element) and then
    /// dropped by the parser. Peak memory is bounded by the depth of one
    /// record instead of the size of the document.
    ///
    /// # Default
    ///
    /// `false`
    pub skip_root: bool,

    /// Constructs whose emitted records also carry their raw source text.
    pub add_source: AddSource,

    /// Keep only the last `n` characters of a comment body.
    ///
    /// `None` buffers comments whole. `Some(REFERENCE_COMMENT_WINDOW)`
    /// gives the classic bounded look-back, where a
    /// 2000 character comment is reported as its final 1024 characters
    /// between the `<!--` and `-->` delimiters.
    ///
    /// # Default
    ///
    /// `None`
    pub comment_window: Option<usize>,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Panic on syntax errors instead of returning them.
    ///
    /// Enabled only in test builds to produce backtraces on parse failures.
    pub panic_on_error: bool,
}

/// Selects which tags and DTD declaration kinds record their raw source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddSource {
    tags: BTreeSet<String>,
    declarations: BTreeSet<DeclKind>,
}

impl AddSource {
    /// Capture the start tag source of elements named `name`.
    #[must_use]
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tags.insert(name.into());
        self
    }

    /// Capture the full source of DTD declarations of `kind`.
    #[must_use]
    pub fn declaration(mut self, kind: DeclKind) -> Self {
        self.declarations.insert(kind);
        self
    }

    #[must_use]
    pub fn wants_tag(&self, name: &str) -> bool {
        self.tags.contains(name)
    }

    #[must_use]
    pub fn wants_declaration(&self, kind: DeclKind) -> bool {
        self.declarations.contains(&kind)
    }
}
