//! The ParseError type for wrapping parsing diagnostics.

use thiserror::Error;

use crate::error::Diagnostic;

/// A type alias for `Result<T, ParseError>`.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Error type returned by the parsers in this crate.
///
/// Wraps one or more diagnostics. The first diagnostic is the one shown by
/// [`Display`](std::fmt::Display); renderers that want every problem iterate
/// [`ParseError::diagnostics`].
#[derive(Debug, Clone, Error)]
#[error("{}", summary(.diagnostics))]
pub struct ParseError {
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    /// Create a new parse error from diagnostics.
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Get all diagnostics in this error.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

fn summary(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => String::new(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (+{} more)", rest.len()),
    }
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostics: vec![diagnostic],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_counts_extra_diagnostics() {
        let err = ParseError::new(vec![
            Diagnostic::error("first"),
            Diagnostic::error("second"),
        ]);
        assert_eq!(err.to_string(), "error: first (+1 more)");
    }

    #[test]
    fn test_from_single_diagnostic() {
        let err: ParseError = Diagnostic::error("only").into();
        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.to_string(), "error: only");
    }
}
