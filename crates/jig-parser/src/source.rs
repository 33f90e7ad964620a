//! Syntax summary of one source file.
//!
//! jig does not need a full syntax tree: it needs the comments (for
//! pragmas), the package clause, the names declared at top level, and a
//! lossless token stream it can rewrite. [`SourceFile`] owns the text and
//! provides exactly that.

use log::trace;

use crate::{
    error::{Diagnostic, ParseError},
    lexer,
    pragma::{self, Pragma},
    span::{Span, Spanned},
    tokens::{PositionedToken, TokenKind},
};

/// What a top-level declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Type,
    Func,
    Method,
    Var,
    Const,
}

/// A name declared at the top level of a file.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    kind: DeclarationKind,
    name: Spanned<String>,
    receiver: Option<String>,
}

impl Declaration {
    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    pub fn name(&self) -> &Spanned<String> {
        &self.name
    }

    /// Receiver type name for methods.
    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }
}

/// A pragma comment found in a file, with its span in the file.
#[derive(Debug, Clone)]
pub struct PragmaComment {
    pub span: Span,
    pub pragma: Result<Pragma, Diagnostic>,
}

/// A lexed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    text: String,
    tokens: Vec<PositionedToken>,
    line_starts: Vec<usize>,
    package: Option<Spanned<String>>,
    declarations: Vec<Declaration>,
}

impl SourceFile {
    /// Lex `text` and summarise its package clause and declarations.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] listing every unterminated literal or
    /// comment in the file.
    pub fn parse(text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();
        let tokens = lexer::tokenize(&text)?;

        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();

        let mut file = Self {
            text,
            tokens,
            line_starts,
            package: None,
            declarations: Vec::new(),
        };
        file.summarise();
        trace!(
            tokens = file.tokens.len(),
            declarations = file.declarations.len();
            "Summarised source file"
        );
        Ok(file)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tokens(&self) -> &[PositionedToken] {
        &self.tokens
    }

    /// The name in the package clause, if the file has one.
    pub fn package_name(&self) -> Option<&str> {
        self.package.as_ref().map(|p| p.inner().as_str())
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Every identifier token with its span.
    pub fn identifiers(&self) -> impl Iterator<Item = Spanned<&str>> + '_ {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Ident)
            .map(|t| Spanned::new(t.text(&self.text), t.span))
    }

    /// Every `//jig` pragma in the file, in source order.
    ///
    /// Malformed pragmas are returned as errors with spans relative to the
    /// file; callers decide whether to ignore or report them.
    pub fn pragmas(&self) -> impl Iterator<Item = PragmaComment> + '_ {
        self.tokens
            .iter()
            .filter(|t| t.kind == TokenKind::LineComment)
            .filter_map(|t| {
                let offset = t.span.start();
                pragma::parse(t.text(&self.text)).map(|pragma| PragmaComment {
                    span: t.span,
                    pragma: pragma.map_err(|diag| diag.shifted(offset)),
                })
            })
    }

    /// 1-based line and column of a byte offset.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line.saturating_sub(1)];
        let column = self.text[line_start..offset.min(self.text.len())]
            .chars()
            .count();
        (line as u32, column as u32 + 1)
    }

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        self.line_starts[line.saturating_sub(1)]
    }

    /// Find the package clause and top-level declarations.
    fn summarise(&mut self) {
        let significant: Vec<PositionedToken> = self
            .tokens
            .iter()
            .copied()
            .filter(|t| !matches!(t.kind, TokenKind::Whitespace) && !t.kind.is_comment())
            .collect();

        let mut walker = Walker {
            text: &self.text,
            tokens: &significant,
            pos: 0,
        };
        let mut depth = 0usize;

        while let Some(token) = walker.peek() {
            if depth == 0 && token.kind == TokenKind::Ident {
                match token.text(walker.text) {
                    "package" if self.package.is_none() => {
                        walker.bump();
                        if let Some(name) = walker.eat_ident() {
                            self.package = Some(name);
                        }
                        continue;
                    }
                    "type" | "var" | "const" => {
                        let kind = match token.text(walker.text) {
                            "type" => DeclarationKind::Type,
                            "var" => DeclarationKind::Var,
                            _ => DeclarationKind::Const,
                        };
                        walker.bump();
                        walker.skip_newlines();
                        if walker.at_punct("(") {
                            walker.bump();
                            self.declarations.extend(walker.group(kind));
                        } else if let Some(name) = walker.eat_ident() {
                            self.declarations.push(Declaration {
                                kind,
                                name,
                                receiver: None,
                            });
                        }
                        continue;
                    }
                    "func" => {
                        walker.bump();
                        let receiver = if walker.at_punct("(") {
                            walker.bump();
                            Some(walker.receiver())
                        } else {
                            None
                        };
                        if let Some(name) = walker.eat_ident() {
                            let kind = if receiver.is_some() {
                                DeclarationKind::Method
                            } else {
                                DeclarationKind::Func
                            };
                            self.declarations.push(Declaration {
                                kind,
                                name,
                                receiver: receiver.flatten(),
                            });
                        }
                        continue;
                    }
                    _ => {}
                }
            }

            if token.kind == TokenKind::Punct {
                match token.text(walker.text) {
                    "(" | "[" | "{" => depth += 1,
                    ")" | "]" | "}" => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            walker.bump();
        }
    }
}

/// Cursor over the significant tokens of a file.
struct Walker<'a> {
    text: &'a str,
    tokens: &'a [PositionedToken],
    pos: usize,
}

impl Walker<'_> {
    fn peek(&self) -> Option<PositionedToken> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn at_punct(&self, c: &str) -> bool {
        self.peek()
            .is_some_and(|t| t.kind == TokenKind::Punct && t.text(self.text) == c)
    }

    fn skip_newlines(&mut self) {
        while self.peek().is_some_and(|t| t.kind == TokenKind::Newline) {
            self.bump();
        }
    }

    fn eat_ident(&mut self) -> Option<Spanned<String>> {
        let token = self.peek()?;
        if token.kind != TokenKind::Ident {
            return None;
        }
        self.bump();
        Some(Spanned::new(token.text(self.text).to_string(), token.span))
    }

    /// Names in a parenthesised `type (...)`, `var (...)` or `const (...)`
    /// group: the first identifier of every line at group level.
    fn group(&mut self, kind: DeclarationKind) -> Vec<Declaration> {
        let mut names = Vec::new();
        let mut depth = 1usize;
        let mut line_start = true;

        while let Some(token) = self.peek() {
            self.bump();
            match (token.kind, token.text(self.text)) {
                (TokenKind::Newline, _) | (TokenKind::Punct, ";") if depth == 1 => {
                    line_start = true;
                    continue;
                }
                (TokenKind::Punct, "(" | "[" | "{") => depth += 1,
                (TokenKind::Punct, ")" | "]" | "}") => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                (TokenKind::Ident, name) if depth == 1 && line_start => {
                    names.push(Declaration {
                        kind,
                        name: Spanned::new(name.to_string(), token.span),
                        receiver: None,
                    });
                }
                _ => {}
            }
            line_start = false;
        }
        names
    }

    /// Consume a method receiver up to its closing `)` and return the
    /// receiver's type name: the last identifier at receiver level.
    fn receiver(&mut self) -> Option<String> {
        let mut depth = 1usize;
        let mut last = None;

        while let Some(token) = self.peek() {
            self.bump();
            match (token.kind, token.text(self.text)) {
                (TokenKind::Punct, "(" | "[" | "{") => depth += 1,
                (TokenKind::Punct, ")" | "]" | "}") => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                (TokenKind::Ident, name) if depth == 1 => last = Some(name.to_string()),
                _ => {}
            }
        }
        last
    }
}
