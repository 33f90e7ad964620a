//! # jig parser
//!
//! Lexing and small-grammar parsers used by the jig code generator:
//!
//! - [`source`]: a lossless token stream of a source file plus its package
//!   clause and top-level declarations
//! - [`pragma`]: the `//jig:name`, `//jigs:`, `//jig:file` and `//jig:type`
//!   comment forms
//! - [`filename`]: output file name templates such as `{package}_jig.go`
//! - [`message`]: typechecker output lines
//!
//! ## Usage
//!
//! ```
//! use jig_parser::SourceFile;
//!
//! let file = SourceFile::parse("package shapes\n\ntype Point struct{ X, Y int }\n").unwrap();
//! assert_eq!(file.package_name(), Some("shapes"));
//! assert_eq!(file.declarations()[0].name().as_str(), "Point");
//! ```

pub mod error;
pub mod filename;
pub mod lexer;
pub mod message;
pub mod pragma;
pub mod source;
mod span;
pub mod tokens;

pub use error::{Diagnostic, ErrorCode, ParseError};
pub use filename::FilenameTemplate;
pub use pragma::{Pragma, TemplateDecl};
pub use source::{Declaration, DeclarationKind, PragmaComment, SourceFile};
pub use span::{Span, Spanned};
