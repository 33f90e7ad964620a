//! Error types for jig operations.
//!
//! [`JigError`] is the umbrella error returned by the public API. Each
//! collaborator boundary has its own error type ([`LoadError`],
//! [`CheckError`], [`FixError`]) that converts into it.

use std::{io, path::PathBuf};

use thiserror::Error;

use jig_parser::error::ParseError;

pub use crate::{checker::CheckError, imports::FixError, template::LoadError};

/// The main error type for jig operations.
///
/// # Diagnostic Variants
///
/// `Parse` carries the text that failed to parse so the CLI can render
/// labeled snippets. It is raised for package sources that do not lex and
/// for generated buffers that no longer lex after merging.
#[derive(Debug, Error)]
pub enum JigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{}: {err}", path.display())]
    Parse {
        err: ParseError,
        src: String,
        path: PathBuf,
    },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Check(#[from] CheckError),

    #[error(transparent)]
    Fix(#[from] FixError),

    #[error("unknown template `{0}`")]
    UnknownTemplate(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("no fixed point reached after {0} iterations")]
    IterationLimit(usize),
}

impl JigError {
    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::Parse {
            err,
            src: src.into(),
            path: path.into(),
        }
    }
}
