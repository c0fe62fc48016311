use alloc::string::String;

use thiserror::Error;

/// A fatal parse failure, tagged with the position of the character that
/// triggered it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} at {line}:{column}")]
pub struct ParserError {
    pub(crate) kind: SyntaxError,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

impl ParserError {
    /// The failure category.
    #[must_use]
    pub fn kind(&self) -> &SyntaxError {
        &self.kind
    }

    /// 1-based line of the offending character.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the offending character.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }
}

/// Structural well-formedness violations. Every variant aborts the parse.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// An end tag does not close the innermost open element.
    #[error("mismatched end tag </{found}>, expected {}", expected_close(.expected.as_deref()))]
    MismatchedTag {
        expected: Option<String>,
        found: String,
    },
    /// A closing delimiter or declaration appeared where the open construct
    /// does not allow it.
    #[error("unexpected {found} {context}")]
    UnexpectedToken {
        found: String,
        context: &'static str,
    },
    /// A retained element was expected in the cache but is absent.
    #[error("no open element cached for path '{path}'")]
    MissingCacheEntry { path: String },
    /// Input ended while a construct was still open.
    #[error("unterminated {construct} (open path '{path}')")]
    UnterminatedConstruct {
        construct: &'static str,
        path: String,
    },
    #[error("malformed tag <{tag}>: {reason}")]
    MalformedTag { tag: String, reason: &'static str },
    #[error("malformed {kind} declaration: {reason}")]
    MalformedDeclaration {
        kind: &'static str,
        reason: &'static str,
    },
}

fn expected_close(expected: Option<&str>) -> String {
    match expected {
        Some(name) => alloc::format!("</{name}>"),
        None => String::from("no open element"),
    }
}
