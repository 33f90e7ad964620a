//! Identifier helpers.
//!
//! Template parameters live inside identifiers as camel-case segments
//! (`StackT`, `NewStackT`), so both rendering and name inference work on
//! [`segments`] rather than on raw substrings.

/// Split an identifier into camel-case segments.
///
/// A boundary is placed:
/// - before an upper-case letter that follows a lower-case letter or digit,
/// - before the last capital of an acronym that is followed by a lower-case
///   letter (`HTTPServer` splits into `HTTP` and `Server`),
/// - on both sides of every `_`.
///
/// Concatenating the returned segments always reproduces `ident`.
///
/// # Examples
///
/// ```
/// use jig_core::identifier::segments;
///
/// assert_eq!(segments("StackT"), ["Stack", "T"]);
/// assert_eq!(segments("newStackInt"), ["new", "Stack", "Int"]);
/// assert_eq!(segments("HTTPServer"), ["HTTP", "Server"]);
/// ```
pub fn segments(ident: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = ident.char_indices().collect();
    let mut result = Vec::new();
    let mut start = 0;

    for (i, &(offset, c)) in chars.iter().enumerate().skip(1) {
        let prev = chars[i - 1].1;
        let next = chars.get(i + 1).map(|&(_, c)| c);

        let boundary = if c == '_' || prev == '_' {
            true
        } else if c.is_uppercase() {
            prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next.is_some_and(char::is_lowercase))
        } else {
            false
        };

        if boundary {
            result.push(&ident[start..offset]);
            start = offset;
        }
    }

    if start < ident.len() {
        result.push(&ident[start..]);
    }
    result
}

/// Upper-case the first character, leaving the rest untouched.
///
/// ```
/// use jig_core::identifier::capitalize;
///
/// assert_eq!(capitalize("int"), "Int");
/// assert_eq!(capitalize("stackInt"), "StackInt");
/// ```
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Returns `true` if `s` is a non-empty identifier: a letter or `_` followed
/// by letters, digits or `_`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
}
