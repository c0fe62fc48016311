use alloc::{sync::Arc, vec::Vec};

use super::cache::Path;
use crate::doctype::DeclKind;

/// One open bracket-like construct. The top of the [`TokenStack`] alone
/// decides how the next character is consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// `<` seen, kind not yet known.
    OpenAngle,
    ProcessingInstruction,
    Comment,
    CData,
    Doctype,
    /// `[` of `<!DOCTYPE root [`.
    DoctypeInternalSubset,
    Declaration(DeclKind),
    /// An open element; the text region of its content.
    Element(Arc<str>),
}

impl Token {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Token::OpenAngle => "tag",
            Token::ProcessingInstruction => "processing instruction",
            Token::Comment => "comment",
            Token::CData => "CDATA section",
            Token::Doctype => "DOCTYPE",
            Token::DoctypeInternalSubset => "DOCTYPE internal subset",
            Token::Declaration(kind) => kind.keyword(),
            Token::Element(_) => "element",
        }
    }
}

/// LIFO record of open constructs. Element names are mirrored into `path` so
/// the cache key of the innermost element is always at hand.
#[derive(Debug, Default)]
pub(crate) struct TokenStack {
    tokens: Vec<Token>,
    path: Path,
}

impl TokenStack {
    pub(crate) fn top(&self) -> Option<&Token> {
        self.tokens.last()
    }

    pub(crate) fn push(&mut self, token: Token) {
        if let Token::Element(name) = &token {
            self.path.push(name.clone());
        }
        self.tokens.push(token);
    }

    pub(crate) fn pop(&mut self) -> Option<Token> {
        let token = self.tokens.pop()?;
        if matches!(token, Token::Element(_)) {
            self.path.pop();
        }
        Some(token)
    }

    /// Swap the top for `token`, e.g. `OpenAngle` → `Comment` once `!--` is
    /// recognised.
    pub(crate) fn replace_top(&mut self, token: Token) {
        self.pop();
        self.push(token);
    }

    pub(crate) fn path(&self) -> &[Arc<str>] {
        &self.path
    }

    pub(crate) fn depth(&self) -> usize {
        self.path.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
