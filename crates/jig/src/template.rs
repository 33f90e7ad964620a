//! Templates: parameterized source fragments.
//!
//! A template is declared in a library source with a `//jigs:` comment:
//!
//! ```text
//! //jigs: Stack(T)
//!
//! // StackT is a LIFO stack of T.
//! type StackT []T
//!
//! func NewStackT() *StackT { return &StackT{} }
//! ```
//!
//! The body runs from the line after the declaration to the next
//! declaration or the end of the file. Parameters appear in the body as
//! bare identifiers (`T`) and as camel-case segments of identifiers
//! (`StackT`, `NewStackT`), and [`Template::render`] substitutes both.

mod library;
mod render;

pub use library::{Library, LoadError};

use std::path::{Path, PathBuf};

use jig_core::identifier::segments;
use jig_parser::{DeclarationKind, FilenameTemplate, ParseError, SourceFile};

/// One piece of a [`NamePattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    /// A segment that must match exactly.
    Literal(String),
    /// Index of the parameter bound to one or more segments.
    Param(usize),
}

/// The shape of identifiers a template can produce, such as
/// `NewStack<T>` for a body declaring `NewStackT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePattern {
    pieces: Vec<Piece>,
}

impl NamePattern {
    /// Pattern of the template's own name followed by every parameter.
    fn for_template(name: &str, params: &[String]) -> Self {
        let mut pieces: Vec<Piece> = segments(name)
            .into_iter()
            .map(|s| Piece::Literal(s.to_string()))
            .collect();
        pieces.extend((0..params.len()).map(Piece::Param));
        Self { pieces }
    }

    /// Pattern of a declared identifier, if its segments mention every
    /// parameter.
    fn for_declaration(ident: &str, params: &[String]) -> Option<Self> {
        let pieces: Vec<Piece> = param_segments(ident, params)
            .into_iter()
            .map(|s| match params.iter().position(|p| p == s) {
                Some(i) => Piece::Param(i),
                None => Piece::Literal(s.to_string()),
            })
            .collect();

        let covers_all = (0..params.len()).all(|i| pieces.contains(&Piece::Param(i)));
        covers_all.then_some(Self { pieces })
    }

    /// Every way `ident` fits the pattern, as the identifier form of each
    /// parameter. A parameter takes one or more whole segments and binds
    /// the same text wherever it repeats.
    pub fn matches(&self, ident: &str, arity: usize) -> Vec<Vec<String>> {
        let segs = segments(ident);
        let mut bindings = vec![None; arity];
        let mut out = Vec::new();
        match_pieces(&self.pieces, &segs, &mut bindings, &mut out);
        out
    }
}

/// Camel-case segments of `ident`, with upper-case runs such as `KV` split
/// further when they consist of parameters only.
pub(crate) fn param_segments<'a>(ident: &'a str, params: &[String]) -> Vec<&'a str> {
    let mut out = Vec::new();
    for seg in segments(ident) {
        match split_params(seg, params) {
            Some(parts) if parts.len() > 1 => out.extend(parts),
            _ => out.push(seg),
        }
    }
    out
}

fn split_params<'a>(seg: &'a str, params: &[String]) -> Option<Vec<&'a str>> {
    if seg.is_empty() {
        return Some(Vec::new());
    }
    params
        .iter()
        .filter(|p| seg.starts_with(p.as_str()))
        .find_map(|p| {
            let mut rest = split_params(&seg[p.len()..], params)?;
            rest.insert(0, &seg[..p.len()]);
            Some(rest)
        })
}

fn match_pieces(
    pieces: &[Piece],
    segs: &[&str],
    bindings: &mut Vec<Option<String>>,
    out: &mut Vec<Vec<String>>,
) {
    let Some((piece, rest)) = pieces.split_first() else {
        if segs.is_empty() {
            out.extend(bindings.iter().cloned().collect::<Option<Vec<_>>>());
        }
        return;
    };

    match piece {
        Piece::Literal(lit) => {
            if segs.first() == Some(&lit.as_str()) {
                match_pieces(rest, &segs[1..], bindings, out);
            }
        }
        Piece::Param(i) => {
            for n in 1..=segs.len() {
                let value = segs[..n].concat();
                match bindings[*i].clone() {
                    Some(bound) if bound != value => {}
                    Some(_) => match_pieces(rest, &segs[n..], bindings, out),
                    None => {
                        bindings[*i] = Some(value);
                        match_pieces(rest, &segs[n..], bindings, out);
                        bindings[*i] = None;
                    }
                }
            }
        }
    }
}

/// A parameterized fragment loaded from a library source.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    params: Vec<String>,
    body: SourceFile,
    filename: Option<FilenameTemplate>,
    origin: PathBuf,
    patterns: Vec<NamePattern>,
}

impl Template {
    /// Build a template from its declaration and body text.
    ///
    /// # Errors
    ///
    /// Fails when the body does not lex.
    pub fn new(
        name: impl Into<String>,
        params: Vec<String>,
        body: &str,
        filename: Option<FilenameTemplate>,
        origin: impl Into<PathBuf>,
    ) -> Result<Self, ParseError> {
        let name = name.into();
        let body = SourceFile::parse(body)?;

        let mut patterns = vec![NamePattern::for_template(&name, &params)];
        for decl in body.declarations() {
            if decl.kind() == DeclarationKind::Method {
                continue;
            }
            match NamePattern::for_declaration(decl.name(), &params) {
                Some(pattern) if !patterns.contains(&pattern) => patterns.push(pattern),
                _ => {}
            }
        }

        Ok(Self {
            name,
            params,
            body,
            filename,
            origin: origin.into(),
            patterns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &str {
        self.body.text()
    }

    /// File name template from the `file=` attribute, if any.
    pub fn filename(&self) -> Option<&FilenameTemplate> {
        self.filename.as_ref()
    }

    /// The library source the template was declared in.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    pub fn patterns(&self) -> &[NamePattern] {
        &self.patterns
    }

    /// Every binding of parameters under which this template produces
    /// `ident`, over all name patterns, without duplicates.
    pub fn matches(&self, ident: &str) -> Vec<Vec<String>> {
        let mut found: Vec<Vec<String>> = Vec::new();
        for pattern in &self.patterns {
            for args in pattern.matches(ident, self.params.len()) {
                if !found.contains(&args) {
                    found.push(args);
                }
            }
        }
        found
    }
}
