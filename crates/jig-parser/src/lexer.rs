//! Lexical analyzer for template and package sources.
//!
//! The lexer splits C-family source text (Go in practice) into the coarse
//! [`TokenKind`]s jig needs: identifiers, literals, comments and trivia.
//! Every byte of the input belongs to exactly one token, so concatenating
//! the token texts reproduces the source. That property is what lets the
//! renderer rewrite identifiers while leaving everything else untouched.
//!
//! The public entry point is [`tokenize`], which recovers from errors and
//! collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, none_of, one_of, take_till, take_until, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, TokenKind},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`; `start` is the offset of the
/// opening delimiter so the reported span covers the whole broken literal.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: &'static str,
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Parse line comment starting with '//'
fn line_comment(input: &mut Input<'_>) -> IResult<TokenKind> {
    preceded("//", take_while(0.., |c: char| c != '\n'))
        .value(TokenKind::LineComment)
        .parse_next(input)
}

/// Parse a `/* ... */` comment. Block comments do not nest.
fn block_comment(input: &mut Input<'_>) -> IResult<TokenKind> {
    let start = input.current_token_start();
    preceded(
        "/*",
        cut_err(terminated(take_until(0.., "*/"), "*/")).context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated block comment",
            help: "close the comment with `*/`",
            start,
        }),
    )
    .value(TokenKind::BlockComment)
    .parse_next(input)
}

/// Body of an interpreted literal: escapes or any character except the
/// closing quote, a backslash or a newline.
fn quoted_body(input: &mut Input<'_>, quote: char) -> IResult<()> {
    repeat(
        0..,
        alt((
            preceded('\\', any).void(),
            none_of([quote, '\\', '\n']).void(),
        )),
    )
    .parse_next(input)
}

fn string_literal(input: &mut Input<'_>) -> IResult<TokenKind> {
    let start = input.current_token_start();
    preceded(
        '"',
        cut_err(terminated(|i: &mut Input<'_>| quoted_body(i, '"'), '"')).context(
            LexerDiagnostic {
                code: ErrorCode::E001,
                message: "unterminated string literal",
                help: "add a closing `\"` before the end of the line",
                start,
            },
        ),
    )
    .value(TokenKind::Str)
    .parse_next(input)
}

fn raw_string_literal(input: &mut Input<'_>) -> IResult<TokenKind> {
    let start = input.current_token_start();
    preceded(
        '`',
        cut_err(terminated(take_till(0.., '`'), '`')).context(LexerDiagnostic {
            code: ErrorCode::E002,
            message: "unterminated raw string literal",
            help: "add a closing backtick",
            start,
        }),
    )
    .value(TokenKind::RawStr)
    .parse_next(input)
}

fn char_literal(input: &mut Input<'_>) -> IResult<TokenKind> {
    let start = input.current_token_start();
    preceded(
        '\'',
        cut_err(terminated(|i: &mut Input<'_>| quoted_body(i, '\''), '\'')).context(
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "unterminated character literal",
                help: "add a closing `'`",
                start,
            },
        ),
    )
    .value(TokenKind::Char)
    .parse_next(input)
}

/// Numbers start with a digit; the rest is taken loosely (hex, exponents,
/// separators) since jig never interprets them.
fn number(input: &mut Input<'_>) -> IResult<TokenKind> {
    (
        one_of(|c: char| c.is_ascii_digit()),
        take_while(0.., |c: char| c.is_alphanumeric() || c == '_' || c == '.'),
    )
        .value(TokenKind::Number)
        .parse_next(input)
}

fn identifier(input: &mut Input<'_>) -> IResult<TokenKind> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
        .verify(|s: &str| s.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_'))
        .value(TokenKind::Ident)
        .parse_next(input)
}

fn newline(input: &mut Input<'_>) -> IResult<TokenKind> {
    '\n'.value(TokenKind::Newline).parse_next(input)
}

/// Parse whitespace (spaces, tabs, carriage returns but not newlines)
fn whitespace(input: &mut Input<'_>) -> IResult<TokenKind> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(TokenKind::Whitespace)
        .parse_next(input)
}

fn punct(input: &mut Input<'_>) -> IResult<TokenKind> {
    any.value(TokenKind::Punct).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token(input: &mut Input<'_>) -> IResult<PositionedToken> {
    let start_pos = input.current_token_start();

    let kind = alt((
        line_comment,  // Must come before punct '/'
        block_comment, // Must come before punct '/'
        string_literal,
        raw_string_literal,
        char_literal,
        number,     // Must come before identifier
        identifier, // Must come before punct
        newline,    // Must come before whitespace
        whitespace,
        punct,
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(kind, Span::new(start_pos..end_pos)))
}

/// Convert a failed token parse into a diagnostic.
fn convert_err_mode(err: ErrMode<ContextError<LexerDiagnostic>>, error_pos: usize) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(LexerDiagnostic {
        code,
        message,
        help,
        start,
    }) = context_error.context().next()
    {
        let span = Span::new(*start..error_pos.max(*start + 1));
        return Diagnostic::error(*message)
            .with_code(*code)
            .with_label(span, code.description())
            .with_help(*help);
    }

    // Every character is accepted by `punct`, so this only triggers on
    // internal inconsistencies.
    Diagnostic::error("unexpected input")
        .with_label(Span::new(error_pos..error_pos.saturating_add(1)), "here")
}

/// Split `source` into positioned tokens, collecting multiple errors.
///
/// After an error the lexer skips one character and continues, so a single
/// call reports every broken literal in the file.
///
/// # Returns
///
/// - `Ok(tokens)` - The whole input was tokenized
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(source: &str) -> Result<Vec<PositionedToken>, ParseError> {
    let mut input = LocatingSlice::new(source);
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();

    while !input.is_empty() {
        match positioned_token(&mut input) {
            Ok(token) => tokens.push(token),
            Err(err) => {
                let error_pos = input.current_token_start();
                diagnostics.push(convert_err_mode(err, error_pos));
                if !input.is_empty() {
                    input.next_token();
                }
            }
        }
    }

    if diagnostics.is_empty() {
        Ok(tokens)
    } else {
        Err(ParseError::new(diagnostics))
    }
}
