//! DOCTYPE and DTD declaration records.

use alloc::{string::String, vec::Vec};

/// A document type declaration.
///
/// `internal` is `Some` only when the DOCTYPE carried an internal subset
/// (`<!DOCTYPE root [ ... ]>`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Doctype {
    pub root: String,
    pub external: Option<ExternalId>,
    pub internal: Option<Vec<Declaration>>,
}

/// `PUBLIC "pubid" "system"` or `SYSTEM "system"`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalId {
    pub public_id: Option<String>,
    pub system_id: Option<String>,
}

/// The four declaration kinds that may appear in an internal subset.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclKind {
    Element,
    Attlist,
    Entity,
    Notation,
}

impl DeclKind {
    /// Openers in the order the internal-subset scanner tries them.
    pub(crate) const OPENERS: [(&'static str, DeclKind); 4] = [
        ("<!ENTITY", DeclKind::Entity),
        ("<!ELEMENT", DeclKind::Element),
        ("<!ATTLIST", DeclKind::Attlist),
        ("<!NOTATION", DeclKind::Notation),
    ];

    /// The keyword as written after `<`, e.g. `!ENTITY`.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            DeclKind::Element => "!ELEMENT",
            DeclKind::Attlist => "!ATTLIST",
            DeclKind::Entity => "!ENTITY",
            DeclKind::Notation => "!NOTATION",
        }
    }
}

/// One parsed declaration plus, optionally, its raw source text.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub decl: DtdDecl,
    pub source: Option<String>,
}

impl Declaration {
    #[must_use]
    pub fn kind(&self) -> DeclKind {
        self.decl.kind()
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DtdDecl {
    /// `<!ELEMENT name model>`; the content model is kept verbatim.
    Element {
        name: String,
        content_model: String,
    },
    Attlist {
        element: String,
        attributes: Vec<AttributeDef>,
    },
    /// `<!ENTITY [%] key "value">` or an external entity.
    Entity {
        key: String,
        value: String,
        parameter: bool,
        external: Option<ExternalId>,
    },
    Notation {
        name: String,
        external: ExternalId,
    },
}

impl DtdDecl {
    #[must_use]
    pub fn kind(&self) -> DeclKind {
        match self {
            DtdDecl::Element { .. } => DeclKind::Element,
            DtdDecl::Attlist { .. } => DeclKind::Attlist,
            DtdDecl::Entity { .. } => DeclKind::Entity,
            DtdDecl::Notation { .. } => DeclKind::Notation,
        }
    }
}

/// One attribute definition inside an `<!ATTLIST>`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AttributeDef {
    pub name: String,
    pub data_type: String,
    pub default_type: Option<DefaultType>,
    pub default_value: Option<String>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DefaultType {
    Required,
    Implied,
    Fixed,
}
