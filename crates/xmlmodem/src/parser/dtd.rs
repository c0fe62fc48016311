//! Internal-subset declaration parsing.
//!
//! A declaration body is split at whitespace, except that a quoted literal
//! or a parenthesized group is one token even when it contains whitespace.

use alloc::{string::String, vec::Vec};

use super::error::SyntaxError;
use crate::doctype::{AttributeDef, DeclKind, DefaultType, Doctype, DtdDecl, ExternalId};

pub(crate) fn tokenize(body: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for (i, c) in body.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    tokens.push(&body[s..i]);
                }
                continue;
            }
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        tokens.push(&body[s..]);
    }
    tokens
}

fn is_quoted(token: &str) -> bool {
    token.len() >= 2
        && ((token.starts_with('"') && token.ends_with('"'))
            || (token.starts_with('\'') && token.ends_with('\'')))
}

/// Strip one layer of surrounding quotes.
pub(crate) fn unquote(token: &str) -> &str {
    if is_quoted(token) {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

fn malformed(kind: DeclKind, reason: &'static str) -> SyntaxError {
    SyntaxError::MalformedDeclaration {
        kind: kind.keyword(),
        reason,
    }
}

/// Parse `SYSTEM "s"` or `PUBLIC "p" ["s"]` from the head of `tokens`.
/// Returns the identifier and the number of tokens consumed.
fn external_id(tokens: &[&str]) -> Option<(ExternalId, usize)> {
    match tokens {
        ["SYSTEM", system, ..] => Some((
            ExternalId {
                public_id: None,
                system_id: Some(unquote(system).into()),
            },
            2,
        )),
        ["PUBLIC", public, system, ..] if is_quoted(system) => Some((
            ExternalId {
                public_id: Some(unquote(public).into()),
                system_id: Some(unquote(system).into()),
            },
            3,
        )),
        ["PUBLIC", public, ..] => Some((
            ExternalId {
                public_id: Some(unquote(public).into()),
                system_id: None,
            },
            2,
        )),
        _ => None,
    }
}

/// Parse the text between `<!DOCTYPE` and `[` (or `>`).
pub(crate) fn parse_doctype_header(header: &str) -> Result<Doctype, SyntaxError> {
    let tokens = tokenize(header.trim());
    let Some((root, rest)) = tokens.split_first() else {
        return Err(SyntaxError::MalformedDeclaration {
            kind: "!DOCTYPE",
            reason: "missing root element name",
        });
    };
    Ok(Doctype {
        root: String::from(*root),
        external: external_id(rest).map(|(id, _)| id),
        internal: None,
    })
}

/// Parse a trimmed declaration body (the text after the keyword).
pub(crate) fn parse_declaration(kind: DeclKind, body: &str) -> Result<DtdDecl, SyntaxError> {
    let tokens = tokenize(body);
    match kind {
        DeclKind::Element => match tokens.as_slice() {
            [name, model, ..] => Ok(DtdDecl::Element {
                name: String::from(*name),
                content_model: String::from(*model),
            }),
            _ => Err(malformed(kind, "expected an element name and a content model")),
        },
        DeclKind::Entity => parse_entity(&tokens),
        DeclKind::Attlist => parse_attlist(&tokens),
        DeclKind::Notation => match tokens.split_first() {
            Some((name, rest)) => match external_id(rest) {
                Some((external, _)) => Ok(DtdDecl::Notation {
                    name: String::from(*name),
                    external,
                }),
                None => Err(malformed(kind, "expected a SYSTEM or PUBLIC identifier")),
            },
            None => Err(malformed(kind, "missing notation name")),
        },
    }
}

fn parse_entity(tokens: &[&str]) -> Result<DtdDecl, SyntaxError> {
    let (parameter, tokens) = match tokens.split_first() {
        Some((&"%", rest)) => (true, rest),
        _ => (false, tokens),
    };
    let Some((key, rest)) = tokens.split_first() else {
        return Err(malformed(DeclKind::Entity, "missing entity name"));
    };
    if let Some((external, _)) = external_id(rest) {
        return Ok(DtdDecl::Entity {
            key: String::from(*key),
            value: external.system_id.clone().unwrap_or_default(),
            parameter,
            external: Some(external),
        });
    }
    match rest.first() {
        Some(value) => Ok(DtdDecl::Entity {
            key: String::from(*key),
            value: String::from(unquote(value)),
            parameter,
            external: None,
        }),
        None => Err(malformed(DeclKind::Entity, "missing entity value")),
    }
}

#[derive(Default)]
struct PendingAttribute {
    name: Option<String>,
    data_type: Option<String>,
    default_type: Option<DefaultType>,
    default_value: Option<String>,
}

impl PendingAttribute {
    fn is_complete(&self) -> bool {
        self.name.is_some() && self.data_type.is_some()
    }

    fn finish(self) -> Option<AttributeDef> {
        Some(AttributeDef {
            name: self.name?,
            data_type: self.data_type?,
            default_type: self.default_type,
            default_value: self.default_value,
        })
    }
}

fn parse_attlist(tokens: &[&str]) -> Result<DtdDecl, SyntaxError> {
    let Some((element, rest)) = tokens.split_first() else {
        return Err(malformed(DeclKind::Attlist, "missing element name"));
    };

    let mut attributes = Vec::new();
    let mut pending = PendingAttribute::default();
    for &token in rest {
        if let Some(default) = token.strip_prefix('#') {
            pending.default_type = Some(match default {
                "REQUIRED" => DefaultType::Required,
                "IMPLIED" => DefaultType::Implied,
                "FIXED" => DefaultType::Fixed,
                _ => return Err(malformed(DeclKind::Attlist, "unknown default declaration")),
            });
        } else if is_quoted(token) {
            pending.default_value = Some(String::from(unquote(token)));
        } else if pending.name.is_none() {
            pending.name = Some(String::from(token));
        } else if pending.data_type.is_none() {
            pending.data_type = Some(String::from(token));
        } else {
            let done = core::mem::take(&mut pending);
            attributes.extend(done.finish());
            pending.name = Some(String::from(token));
        }
    }
    if pending.is_complete() {
        attributes.extend(pending.finish());
    }

    Ok(DtdDecl::Attlist {
        element: String::from(*element),
        attributes,
    })
}
