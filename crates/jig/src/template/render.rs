//! Substituting type arguments into a template body.
//!
//! Rendering walks the body's tokens. Identifiers and the words of comments
//! are rewritten; string and character literals are copied untouched.

use std::borrow::Cow;

use jig_core::signature::TypeArg;
use jig_parser::tokens::TokenKind;

use super::{Template, param_segments};

impl Template {
    /// Render the body with `args` substituted for the parameters.
    ///
    /// - An identifier equal to a parameter becomes the argument's type
    ///   text: `T` renders as `int`.
    /// - A parameter segment inside a longer identifier becomes the
    ///   argument's identifier form: `NewStackT` renders as `NewStackInt`.
    ///
    /// With `nodoc`, comments that occupy a whole line are dropped, except
    /// directives such as `//go:noinline`.
    pub fn render(&self, args: &[TypeArg], nodoc: bool) -> String {
        let text = self.body.text();
        let tokens = self.body.tokens();
        let mut out = String::with_capacity(text.len());
        let mut line_blank = true;
        let mut skip_newline = false;

        for (i, token) in tokens.iter().enumerate() {
            let piece = token.text(text);
            match token.kind {
                TokenKind::Newline => {
                    if !std::mem::take(&mut skip_newline) {
                        out.push('\n');
                    }
                    line_blank = true;
                    continue;
                }
                TokenKind::Whitespace => out.push_str(piece),
                TokenKind::Ident => out.push_str(&self.substitute(piece, args)),
                TokenKind::LineComment | TokenKind::BlockComment => {
                    let ends_line = tokens
                        .get(i + 1)
                        .is_none_or(|next| next.kind == TokenKind::Newline);
                    if nodoc && line_blank && ends_line && !is_directive(piece) {
                        out.truncate(out.rfind('\n').map_or(0, |nl| nl + 1));
                        skip_newline = true;
                        continue;
                    }
                    out.push_str(&self.substitute_words(piece, args));
                }
                _ => out.push_str(piece),
            }
            if token.kind != TokenKind::Whitespace {
                line_blank = false;
            }
        }
        out
    }

    fn substitute<'a>(&self, ident: &'a str, args: &[TypeArg]) -> Cow<'a, str> {
        if let Some(arg) = self.arg_for(ident, args) {
            return Cow::Owned(arg.ty().to_string());
        }

        let segs = param_segments(ident, &self.params);
        if !segs.iter().any(|seg| self.arg_for(seg, args).is_some()) {
            return Cow::Borrowed(ident);
        }

        let mut renamed = String::with_capacity(ident.len());
        for seg in segs {
            match self.arg_for(seg, args) {
                Some(arg) => renamed.push_str(arg.ident()),
                None => renamed.push_str(seg),
            }
        }
        Cow::Owned(renamed)
    }

    /// Rewrite the identifier-like words of a comment.
    fn substitute_words(&self, comment: &str, args: &[TypeArg]) -> String {
        let mut out = String::with_capacity(comment.len());
        let mut word_start = None;

        for (offset, c) in comment.char_indices() {
            let in_word = c.is_alphanumeric() || c == '_';
            match (in_word, word_start) {
                (true, None) => word_start = Some(offset),
                (false, Some(start)) => {
                    out.push_str(&self.substitute_word(&comment[start..offset], args));
                    out.push(c);
                    word_start = None;
                }
                (false, None) => out.push(c),
                (true, Some(_)) => {}
            }
        }
        if let Some(start) = word_start {
            out.push_str(&self.substitute_word(&comment[start..], args));
        }
        out
    }

    fn substitute_word<'a>(&self, word: &'a str, args: &[TypeArg]) -> Cow<'a, str> {
        if jig_core::identifier::is_identifier(word) {
            self.substitute(word, args)
        } else {
            Cow::Borrowed(word)
        }
    }

    fn arg_for<'a>(&self, name: &str, args: &'a [TypeArg]) -> Option<&'a TypeArg> {
        self.params
            .iter()
            .position(|param| param == name)
            .and_then(|i| args.get(i))
    }
}

/// `//word:` comments are tool directives, not documentation.
fn is_directive(comment: &str) -> bool {
    let Some(rest) = comment.strip_prefix("//") else {
        return false;
    };
    let word_len = rest
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(rest.len());
    word_len > 0 && rest[word_len..].starts_with(':')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack() -> Template {
        Template::new(
            "Stack",
            vec!["T".to_string()],
            "// StackT is a LIFO stack of T.\ntype StackT []T\n\n//go:noinline\nfunc NewStackT() *StackT {\n\t// start empty\n\treturn &StackT{} /* T */\n}\n\nconst nameT = \"StackT of T\"\n",
            None,
            "stack.go",
        )
        .unwrap()
    }

    #[test]
    fn test_render_substitutes_types_and_names() {
        let rendered = stack().render(&[TypeArg::new("Int", "int")], false);
        assert_eq!(
            rendered,
            "// StackInt is a LIFO stack of int.\ntype StackInt []int\n\n//go:noinline\nfunc NewStackInt() *StackInt {\n\t// start empty\n\treturn &StackInt{} /* int */\n}\n\nconst nameInt = \"StackT of T\"\n"
        );
    }

    #[test]
    fn test_render_nodoc_strips_full_line_comments() {
        let rendered = stack().render(&[TypeArg::new("Point", "Point")], true);
        assert_eq!(
            rendered,
            "type StackPoint []Point\n\n//go:noinline\nfunc NewStackPoint() *StackPoint {\n\treturn &StackPoint{} /* Point */\n}\n\nconst namePoint = \"StackT of T\"\n"
        );
    }

    #[test]
    fn test_render_multiple_parameters() {
        let map = Template::new(
            "Map",
            vec!["K".to_string(), "V".to_string()],
            "type MapKV map[K]V\n\nfunc (m MapKV) Get(k K) (V, bool) { v, ok := m[k]; return v, ok }\n",
            None,
            "map.go",
        )
        .unwrap();

        let rendered = map.render(
            &[TypeArg::new("String", "string"), TypeArg::new("Int", "int")],
            false,
        );
        assert_eq!(
            rendered,
            "type MapStringInt map[string]int\n\nfunc (m MapStringInt) Get(k string) (int, bool) { v, ok := m[k]; return v, ok }\n"
        );
    }

    #[test]
    fn test_directives() {
        assert!(is_directive("//go:generate jig"));
        assert!(is_directive("//jig:name StackInt"));
        assert!(!is_directive("// go:generate"));
        assert!(!is_directive("/* go: */"));
    }
}
