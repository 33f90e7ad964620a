//! Typechecker diagnostics.
//!
//! A [`Diagnostic`] is one finding reported by the external typechecker:
//! a file [`Location`] and a message. Diagnostics are transient; each
//! synthesis iteration consumes a fresh list.

use std::{fmt, path::PathBuf};

/// Where a diagnostic was reported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    path: PathBuf,
    line: u32,
    column: Option<u32>,
}

impl Location {
    /// Create a location. Lines and columns are 1-based.
    pub fn new(path: impl Into<PathBuf>, line: u32, column: Option<u32>) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> Option<u32> {
        self.column
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)?;
        if let Some(column) = self.column {
            write!(f, ":{column}")?;
        }
        Ok(())
    }
}

/// A single typechecker finding.
///
/// Displays in the conventional `path:line:col: message` form, which is the
/// text printed for unresolved diagnostics at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    location: Location,
    message: String,
}

impl Diagnostic {
    /// Create a diagnostic at `location`.
    pub fn new(location: Location, message: impl Into<String>) -> Self {
        Self {
            location,
            message: message.into(),
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
