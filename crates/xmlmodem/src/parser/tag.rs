//! Classification and attribute extraction for the raw text between `<`
//! and `>`.

use alloc::{string::String, sync::Arc};

use super::error::SyntaxError;
use crate::element::{Attributes, Tag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TagKind<'a> {
    /// `</name>`; carries the trimmed name.
    End(&'a str),
    /// `<name .../>`; carries the body without the trailing `/`.
    SelfClosing(&'a str),
    Start(&'a str),
}

pub(crate) fn classify(raw: &str) -> TagKind<'_> {
    if let Some(name) = raw.strip_prefix('/') {
        TagKind::End(name.trim())
    } else if let Some(body) = raw.strip_suffix('/') {
        TagKind::SelfClosing(body)
    } else {
        TagKind::Start(raw)
    }
}

fn malformed(body: &str, reason: &'static str) -> SyntaxError {
    SyntaxError::MalformedTag {
        tag: String::from(body.trim()),
        reason,
    }
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '=' | '"' | '\'' | '<' | '>' | '/')
}

/// Split a start or self-closing tag body into its name and attributes.
///
/// Values are delimited by `"` or `'`; whitespace inside a quoted value is
/// kept. Entity references inside values are passed through undecoded.
pub(crate) fn parse_tag(body: &str) -> Result<Tag, SyntaxError> {
    let body_trimmed = body.trim_start();
    let name_end = body_trimmed
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body_trimmed.len());
    let name = &body_trimmed[..name_end];
    if name.is_empty() || !name.chars().all(is_name_char) {
        return Err(malformed(body, "invalid tag name"));
    }
    if name.starts_with('!') || name.starts_with('?') {
        return Err(SyntaxError::UnexpectedToken {
            found: alloc::format!("<{name}"),
            context: "outside of a DOCTYPE internal subset",
        });
    }

    let attributes = parse_attributes(&body_trimmed[name_end..])
        .map_err(|reason| malformed(body, reason))?;

    Ok(Tag {
        name: Arc::from(name),
        attributes,
    })
}

pub(crate) fn parse_attributes(mut rest: &str) -> Result<Attributes, &'static str> {
    let mut attributes = Attributes::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(attributes);
        }

        let key_end = rest.find(|c: char| !is_name_char(c)).unwrap_or(rest.len());
        if key_end == 0 {
            return Err("expected an attribute name");
        }
        let key = &rest[..key_end];
        rest = rest[key_end..].trim_start();

        let Some(after_eq) = rest.strip_prefix('=') else {
            return Err("attribute without a value");
        };
        rest = after_eq.trim_start();

        let quote = match rest.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err("attribute value must be quoted"),
        };
        let value_and_rest = &rest[1..];
        let Some(close) = value_and_rest.find(quote) else {
            return Err("unterminated attribute value");
        };
        let value = &value_and_rest[..close];
        rest = &value_and_rest[close + 1..];

        if attributes.insert(String::from(key), String::from(value)).is_some() {
            return Err("duplicate attribute");
        }
    }
}
