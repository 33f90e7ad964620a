//! Token kinds produced by the [`lexer`](crate::lexer).
//!
//! Tokens carry no text; their [`Span`] indexes the buffer they were lexed
//! from, so a token list can be stored next to its owning source text.

use crate::span::Span;

/// Lexical category of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Identifier or keyword.
    Ident,
    /// Numeric literal.
    Number,
    /// Interpreted string literal, `"..."`.
    Str,
    /// Raw string literal, `` `...` ``.
    RawStr,
    /// Character literal, `'x'`.
    Char,
    /// `// ...` up to (not including) the newline.
    LineComment,
    /// `/* ... */`
    BlockComment,
    /// Any other single character.
    Punct,
    /// Spaces, tabs and carriage returns.
    Whitespace,
    Newline,
}

impl TokenKind {
    /// Whitespace, newlines and comments.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace
                | TokenKind::Newline
                | TokenKind::LineComment
                | TokenKind::BlockComment
        )
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }

    /// String, raw string and character literals.
    pub fn is_literal_text(&self) -> bool {
        matches!(self, TokenKind::Str | TokenKind::RawStr | TokenKind::Char)
    }
}

/// A token with its position in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionedToken {
    pub kind: TokenKind,
    pub span: Span,
}

impl PositionedToken {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The token's text within `source`.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.span.range()]
    }
}
