//! Typechecker output.
//!
//! Typecheckers print one finding per line as `path:line[:col]: message`.
//! [`diagnostic_line`] turns such a line into a [`Diagnostic`];
//! [`undefined_name`] recognises the messages that report a missing
//! identifier, which are the only ones jig can act on.

use winnow::{
    Parser as _,
    ascii::{dec_uint, space0},
    combinator::{alt, eof, opt, preceded, terminated},
    error::ModalResult,
    token::{rest, take_till, take_while},
};

use jig_core::diagnostic::{Diagnostic, Location};

fn location(input: &mut &str) -> ModalResult<Location> {
    (
        take_till(1.., |c: char| c == ':' || c == '\n'),
        preceded(':', dec_uint),
        opt(preceded(':', dec_uint)),
        ':',
    )
        .map(|(path, line, column, _): (&str, u32, Option<u32>, char)| {
            Location::new(path, line, column)
        })
        .parse_next(input)
}

fn line(input: &mut &str) -> ModalResult<Diagnostic> {
    preceded(opt("vet: "), (location, preceded(space0, rest)))
        .map(|(location, message): (Location, &str)| {
            Diagnostic::new(location, message.trim_end())
        })
        .parse_next(input)
}

/// Parse one line of typechecker output.
///
/// Returns `None` for lines that are not diagnostics, such as package
/// headers (`# example.com/pkg`) or summaries.
///
/// # Examples
///
/// ```
/// use jig_parser::message::diagnostic_line;
///
/// let diag = diagnostic_line("./main.go:7:9: undefined: StackInt").unwrap();
/// assert_eq!(diag.location().line(), 7);
/// assert_eq!(diag.message(), "undefined: StackInt");
/// ```
pub fn diagnostic_line(text: &str) -> Option<Diagnostic> {
    let mut input = text;
    let diag = line.parse_next(&mut input).ok()?;
    (!diag.message().is_empty()).then_some(diag)
}

fn undefined(input: &mut &str) -> ModalResult<()> {
    alt(("undefined: ", "undeclared name: ")).void().parse_next(input)
}

/// The identifier reported missing by an "undefined" message.
///
/// Both the current (`undefined: X`) and the older (`undeclared name: X`)
/// spellings are recognised. Qualified names (`pkg.X`) are not: they refer
/// to another package and cannot be generated here.
///
/// ```
/// use jig_parser::message::undefined_name;
///
/// assert_eq!(undefined_name("undefined: StackInt"), Some("StackInt"));
/// assert_eq!(undefined_name("undefined: fmt.Foo"), None);
/// assert_eq!(undefined_name("missing return"), None);
/// ```
pub fn undefined_name(message: &str) -> Option<&str> {
    let mut input = message;
    undefined_ident.parse_next(&mut input).ok()
}

fn undefined_ident<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    preceded(
        undefined,
        terminated(
            take_while(1.., |c: char| c.is_alphanumeric() || c == '_')
                .verify(jig_core::identifier::is_identifier),
            (space0, eof),
        ),
    )
    .parse_next(input)
}
