//! `//jig` pragma comments.
//!
//! Four comment forms carry jig metadata:
//!
//! | Comment                          | Meaning                                    |
//! |----------------------------------|--------------------------------------------|
//! | `//jig:name StackInt`            | a generated fragment starts here           |
//! | `//jigs: Stack(T) file=stack.go` | a template declaration in a library source |
//! | `//jig:file`                     | regenerate every fragment in this file     |
//! | `//jig:type StackInt`            | regenerate this fragment                   |
//!
//! Any other `//jig:<word>` comment is not a pragma. Spans inside returned
//! values and diagnostics are relative to the start of the comment.

use std::ops::Range;

use winnow::{
    Parser as _,
    ascii::{space0, space1},
    combinator::{alt, cut_err, delimited, eof, peek, preceded, repeat, separated, separated_pair, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::{rest, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode},
    span::{Span, Spanned},
};

/// Provenance marker that starts a generated fragment.
pub const NAME_MARKER: &str = "//jig:name";
/// Template declaration marker.
pub const TEMPLATE_MARKER: &str = "//jigs:";

/// A template declaration: `//jigs: Name(P1, P2) key=value`.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDecl {
    pub name: Spanned<String>,
    pub params: Vec<Spanned<String>>,
    pub attributes: Vec<(Spanned<String>, Spanned<String>)>,
}

impl TemplateDecl {
    /// Value of the attribute named `key`, if present.
    pub fn attribute(&self, key: &str) -> Option<&Spanned<String>> {
        self.attributes
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, v)| v)
    }
}

/// A parsed pragma.
#[derive(Debug, Clone, PartialEq)]
pub enum Pragma {
    /// `//jig:name <fragment>`
    Name(Spanned<String>),
    /// `//jigs: <template>(<params>)`
    Template(TemplateDecl),
    /// `//jig:file`
    ForceFile,
    /// `//jig:type <fragment>`
    ForceType(Spanned<String>),
}

/// What was expected when a pragma failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Expected {
    code: ErrorCode,
    message: &'static str,
    label: &'static str,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<Expected>>;

fn ident(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
        .verify(jig_core::identifier::is_identifier)
        .with_span()
        .map(|(name, range): (&str, Range<usize>)| Spanned::new(name.to_string(), Span::new(range)))
        .parse_next(input)
}

/// A keyword must be followed by whitespace or the end of the comment, so
/// `//jig:names` is not mistaken for `//jig:name`.
fn keyword<'a>(word: &'static str) -> impl FnMut(&mut Input<'a>) -> IResult<&'a str> {
    move |input: &mut Input<'a>| {
        terminated(word, peek(alt((space1.void(), eof.void())))).parse_next(input)
    }
}

fn fragment_argument(input: &mut Input<'_>) -> IResult<Spanned<String>> {
    cut_err(delimited(space1, ident, end_of_comment))
        .context(Expected {
            code: ErrorCode::E100,
            message: "expected a single fragment name",
            label: "fragment name expected",
        })
        .parse_next(input)
}

fn params(input: &mut Input<'_>) -> IResult<Vec<Spanned<String>>> {
    separated(1.., delimited(space0, ident, space0), ',').parse_next(input)
}

fn attribute(input: &mut Input<'_>) -> IResult<(Spanned<String>, Spanned<String>)> {
    separated_pair(
        ident,
        '=',
        take_while(1.., |c: char| !c.is_whitespace())
            .with_span()
            .map(|(value, range): (&str, Range<usize>)| {
                Spanned::new(value.to_string(), Span::new(range))
            }),
    )
    .parse_next(input)
}

fn leading_space(input: &mut Input<'_>) -> IResult<()> {
    space0.void().parse_next(input)
}

fn end_of_comment(input: &mut Input<'_>) -> IResult<()> {
    (space0, eof).void().parse_next(input)
}

fn template_decl(input: &mut Input<'_>) -> IResult<TemplateDecl> {
    leading_space(input)?;

    let name = cut_err(ident)
        .context(Expected {
            code: ErrorCode::E100,
            message: "expected a template name",
            label: "template name expected",
        })
        .parse_next(input)?;

    let params = cut_err(alt((
        delimited('(', params, ')'),
        delimited('<', params, '>'),
    )))
    .context(Expected {
        code: ErrorCode::E101,
        message: "expected a parameter list such as `(T)` or `<K, V>`",
        label: "invalid parameter list",
    })
    .parse_next(input)?;

    let attributes = repeat(0.., preceded(space1, attribute)).parse_next(input)?;

    cut_err(end_of_comment)
        .context(Expected {
            code: ErrorCode::E100,
            message: "unexpected text after template declaration",
            label: "expected `key=value` or end of comment",
        })
        .parse_next(input)?;

    Ok(TemplateDecl {
        name,
        params,
        attributes,
    })
}

fn pragma(input: &mut Input<'_>) -> IResult<Option<Pragma>> {
    alt((
        preceded(TEMPLATE_MARKER, template_decl).map(|decl| Some(Pragma::Template(decl))),
        preceded(
            "//jig:",
            alt((
                preceded(keyword("name"), fragment_argument).map(|n| Some(Pragma::Name(n))),
                preceded(keyword("type"), fragment_argument).map(|n| Some(Pragma::ForceType(n))),
                preceded(keyword("file"), rest).value(Some(Pragma::ForceFile)),
                rest.value(None),
            )),
        ),
        rest.value(None),
    ))
    .parse_next(input)
}

/// Reject parameter lists that name the same parameter twice.
fn check_params(decl: &TemplateDecl) -> Result<(), Diagnostic> {
    for (i, param) in decl.params.iter().enumerate() {
        if let Some(first) = decl.params[..i].iter().find(|p| p.as_str() == param.as_str()) {
            return Err(Diagnostic::error(format!(
                "template `{}` lists parameter `{}` twice",
                decl.name.as_str(),
                param.as_str()
            ))
            .with_code(ErrorCode::E101)
            .with_label(param.span(), "duplicate parameter")
            .with_secondary_label(first.span(), "first listed here")
            .with_help("give every parameter a distinct name"));
        }
    }
    Ok(())
}

/// Parse a line comment (including its leading `//`).
///
/// Returns `None` when the comment is not a jig pragma, and `Some(Err(..))`
/// when it is one but does not follow the syntax of its keyword.
///
/// # Examples
///
/// ```
/// use jig_parser::pragma::{self, Pragma};
///
/// match pragma::parse("//jig:name StackInt") {
///     Some(Ok(Pragma::Name(name))) => assert_eq!(name.as_str(), "StackInt"),
///     other => panic!("{other:?}"),
/// }
/// assert!(pragma::parse("// plain comment").is_none());
/// assert!(pragma::parse("//jigs: Stack(").unwrap().is_err());
/// ```
pub fn parse(comment: &str) -> Option<Result<Pragma, Diagnostic>> {
    let mut input = LocatingSlice::new(comment);
    match pragma.parse_next(&mut input) {
        Ok(Some(Pragma::Template(decl))) => {
            Some(check_params(&decl).map(|()| Pragma::Template(decl)))
        }
        Ok(parsed) => parsed.map(Ok),
        Err(err) => {
            let error_pos = input.current_token_start();
            Some(Err(convert_err_mode(err, error_pos, comment.len())))
        }
    }
}

fn convert_err_mode(err: ErrMode<ContextError<Expected>>, error_pos: usize, len: usize) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };
    let span = Span::new(error_pos.min(len)..len.max(error_pos + 1));

    match context_error.context().next() {
        Some(Expected {
            code,
            message,
            label,
        }) => Diagnostic::error(*message)
            .with_code(*code)
            .with_label(span, *label),
        None => Diagnostic::error("malformed pragma")
            .with_code(ErrorCode::E100)
            .with_label(span, ErrorCode::E100.description()),
    }
}
