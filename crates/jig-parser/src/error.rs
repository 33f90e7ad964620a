//! Error and diagnostic system for the jig parsers.
//!
//! Every parser in this crate reports problems as [`Diagnostic`]s carrying an
//! [`ErrorCode`], a labeled source span and optional help text. Lexing keeps
//! going after an error so that a single [`ParseError`] can report every
//! problem found in a file.
//!
//! # Example
//!
//! ```
//! # use jig_parser::error::{Diagnostic, ErrorCode};
//! # use jig_parser::Span;
//!
//! let diag = Diagnostic::error("unterminated block comment")
//!     .with_code(ErrorCode::E004)
//!     .with_label(Span::new(12..40), "comment starts here")
//!     .with_help("close the comment with `*/`");
//! assert_eq!(diag.to_string(), "error[E004]: unterminated block comment");
//! ```

mod diagnostic;
mod error_code;
mod parse_error;

pub use diagnostic::{Diagnostic, Label};
pub use error_code::ErrorCode;
pub use parse_error::ParseError;

pub(crate) use parse_error::Result;
