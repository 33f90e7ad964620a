//! Output file name templates.
//!
//! A template such as `{package}_jig.go` or `{name}.go` decides which file a
//! rendered fragment is written to. Four placeholders are understood:
//!
//! - `{Package}` / `{package}`: the package name, capitalized or lower-case
//! - `{Name}` / `{name}`: the fragment name, capitalized or lower-case

use std::{fmt, str::FromStr};

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location},
    token::take_till,
};

use jig_core::identifier::capitalize;

use crate::{
    error::{Diagnostic, ErrorCode, ParseError, Result},
    span::{Span, Spanned},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Package { capitalized: bool },
    Name { capitalized: bool },
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Package" => Some(Self::Package { capitalized: true }),
            "package" => Some(Self::Package { capitalized: false }),
            "Name" => Some(Self::Name { capitalized: true }),
            "name" => Some(Self::Name { capitalized: false }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Placeholder(Placeholder),
}

/// Raw pieces before placeholder names are checked.
enum Piece<'a> {
    Literal(&'a str),
    Placeholder(Spanned<&'a str>),
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<usize>>;

fn literal<'a>(input: &mut Input<'a>) -> IResult<Piece<'a>> {
    take_till(1.., '{').map(Piece::Literal).parse_next(input)
}

/// `{` followed by a name and `}`. The context records where the
/// placeholder opened so an unterminated one can be reported in full.
fn placeholder<'a>(input: &mut Input<'a>) -> IResult<Piece<'a>> {
    let start = input.current_token_start();
    preceded(
        '{',
        cut_err(terminated(take_till(0.., ['{', '}']).with_span(), '}')).context(start),
    )
    .map(|(name, range): (&'a str, std::ops::Range<usize>)| {
        Piece::Placeholder(Spanned::new(name, Span::new(range)))
    })
    .parse_next(input)
}

fn pieces<'a>(input: &mut Input<'a>) -> IResult<Vec<Piece<'a>>> {
    repeat(0.., alt((literal, placeholder))).parse_next(input)
}

/// A parsed file name template.
///
/// # Examples
///
/// ```
/// use jig_parser::filename::FilenameTemplate;
///
/// let template: FilenameTemplate = "{package}_{name}.go".parse().unwrap();
/// assert_eq!(template.render("Collections", "OrderedMap"), "collections_orderedmap.go");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTemplate {
    text: String,
    parts: Vec<Part>,
}

impl FilenameTemplate {
    /// Parse a file name template.
    ///
    /// # Errors
    ///
    /// Fails with `E201` when a `{` is never closed and `E200` for every
    /// placeholder name other than the four listed in the module docs.
    pub fn parse(text: &str) -> Result<Self> {
        let mut input = LocatingSlice::new(text);
        let pieces = match pieces.parse_next(&mut input) {
            Ok(pieces) => pieces,
            Err(err) => return Err(unterminated(err, text).into()),
        };

        let mut parts = Vec::with_capacity(pieces.len());
        let mut diagnostics = Vec::new();
        for piece in pieces {
            match piece {
                Piece::Literal(text) => parts.push(Part::Literal(text.to_string())),
                Piece::Placeholder(name) => match Placeholder::from_name(name.inner()) {
                    Some(placeholder) => parts.push(Part::Placeholder(placeholder)),
                    None => diagnostics.push(
                        Diagnostic::error(format!("unknown placeholder `{{{}}}`", name.inner()))
                            .with_code(ErrorCode::E200)
                            .with_label(name.span(), "unknown placeholder")
                            .with_help("use one of {Package}, {package}, {Name} or {name}"),
                    ),
                },
            }
        }

        if diagnostics.is_empty() {
            Ok(Self {
                text: text.to_string(),
                parts,
            })
        } else {
            Err(ParseError::new(diagnostics))
        }
    }

    /// The template text as written.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Substitute `package` and `name` into the template.
    pub fn render(&self, package: &str, name: &str) -> String {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Literal(text) => out.push_str(text),
                Part::Placeholder(Placeholder::Package { capitalized }) => {
                    out.push_str(&cased(package, *capitalized))
                }
                Part::Placeholder(Placeholder::Name { capitalized }) => {
                    out.push_str(&cased(name, *capitalized))
                }
            }
        }
        out
    }
}

fn cased(value: &str, capitalized: bool) -> String {
    if capitalized {
        capitalize(value)
    } else {
        value.to_lowercase()
    }
}

fn unterminated(err: ErrMode<ContextError<usize>>, text: &str) -> Diagnostic {
    let start = match &err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx.context().next().copied(),
        ErrMode::Incomplete(_) => None,
    }
    .unwrap_or(0);

    Diagnostic::error("unterminated placeholder")
        .with_code(ErrorCode::E201)
        .with_label(Span::new(start..text.len().max(start + 1)), "opened here")
        .with_help("close the placeholder with `}`")
}

impl FromStr for FilenameTemplate {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for FilenameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
