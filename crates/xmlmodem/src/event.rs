//! Structural events, as recorded by [`Collector`](crate::Collector) and
//! yielded by [`XmlModem`](crate::XmlModem).

use alloc::{string::String, sync::Arc};

use crate::{
    doctype::{Declaration, Doctype},
    element::{Element, Tag},
};

/// `<?xml version="1.0" encoding="UTF-8" standalone="yes"?>`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlDeclaration {
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

/// A processing instruction other than the XML declaration, e.g.
/// `<?xml-stylesheet href="a.xsl"?>`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessingInstruction {
    pub target: String,
    pub data: String,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "value"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseEvent {
    Declaration(XmlDeclaration),
    ProcessingInstruction(ProcessingInstruction),
    Doctype(Doctype),
    /// A completed element, start-to-end or self-closed.
    Element(Arc<Element>),
    OpenTag(Tag),
    CloseTag(Arc<str>),
    SelfCloseTag(Tag),
    DtdDecl(Declaration),
    /// The full comment text including `<!--` and `-->`.
    Comment(String),
}
