//! Error codes for the jig diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Pragma errors
//! - `E2xx` - Filename template errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A `"` string was opened but the line ended before it was closed.
    E001,

    /// Unterminated raw string literal.
    ///
    /// A backtick string was opened but never closed.
    E002,

    /// Unterminated character literal.
    E003,

    /// Unterminated block comment.
    ///
    /// A `/*` comment was opened but no `*/` follows.
    E004,

    // =========================================================================
    // Pragma Errors (E1xx)
    // =========================================================================
    /// Malformed pragma.
    ///
    /// A `//jig` comment does not follow the syntax of its keyword.
    E100,

    /// Invalid template parameter list.
    ///
    /// The parameter list is empty, unclosed, or names a parameter twice.
    E101,

    // =========================================================================
    // Filename Template Errors (E2xx)
    // =========================================================================
    /// Unknown placeholder in a filename template.
    E200,

    /// Unterminated placeholder in a filename template.
    E201,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated string literal",
            ErrorCode::E002 => "unterminated raw string literal",
            ErrorCode::E003 => "unterminated character literal",
            ErrorCode::E004 => "unterminated block comment",
            ErrorCode::E100 => "malformed pragma",
            ErrorCode::E101 => "invalid template parameters",
            ErrorCode::E200 => "unknown placeholder",
            ErrorCode::E201 => "unterminated placeholder",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E101.to_string(), "E101");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E004.description(), "unterminated block comment");
        assert_eq!(ErrorCode::E200.description(), "unknown placeholder");
    }
}
