//! From typechecker diagnostics to instantiation requests.
//!
//! Only "undefined identifier" diagnostics are actionable. The missing
//! identifier is matched against the name patterns of every template; the
//! match decides the template and the identifier form of each argument.

use std::collections::HashSet;

use indexmap::IndexSet;
use log::{debug, trace};

use jig_core::{
    diagnostic::Diagnostic,
    signature::{InstantiationSignature, TypeArg},
};
use jig_parser::message::undefined_name;

use crate::template::Library;

/// Names that count as existing types when an identifier can be split in
/// more than one way.
#[derive(Debug, Default)]
pub struct KnownTypes {
    builtins: HashSet<String>,
    declared: HashSet<String>,
}

impl KnownTypes {
    /// `builtins` are spelled in lower case (`int`); `declared` holds the
    /// package's own type names and generated fragments.
    pub fn new(builtins: &[String], declared: HashSet<String>) -> Self {
        Self {
            builtins: builtins.iter().cloned().collect(),
            declared,
        }
    }

    /// Type text for an argument in identifier form: the builtin spelling
    /// when there is one, the identifier itself otherwise.
    pub fn type_arg(&self, ident: &str) -> TypeArg {
        let lower = ident.to_lowercase();
        if self.builtins.contains(&lower) {
            TypeArg::new(ident, lower)
        } else {
            TypeArg::new(ident, ident)
        }
    }

    pub fn is_known(&self, ident: &str) -> bool {
        self.declared.contains(ident) || self.builtins.contains(&ident.to_lowercase())
    }
}

/// The instantiation that would define `ident`, if any template produces
/// it.
///
/// When several templates or splits match, the first whose arguments are
/// all known types wins; otherwise the first match.
pub fn signature_for(ident: &str, library: &Library, known: &KnownTypes) -> Option<InstantiationSignature> {
    let candidates: Vec<(&str, Vec<String>)> = library
        .iter()
        .flat_map(|template| {
            template
                .matches(ident)
                .into_iter()
                .map(move |args| (template.name(), args))
        })
        .collect();

    if candidates.len() > 1 {
        trace!(ident = ident, candidates = candidates.len(); "Ambiguous instantiation");
    }

    let (template, args) = candidates
        .iter()
        .find(|(_, args)| args.iter().all(|arg| known.is_known(arg)))
        .or_else(|| candidates.first())?;

    let args = args.iter().map(|arg| known.type_arg(arg)).collect();
    Some(InstantiationSignature::new(*template, args))
}

/// Deduplicated signatures for every actionable diagnostic, in the order
/// the diagnostics were reported.
pub fn infer(
    diagnostics: &[Diagnostic],
    library: &Library,
    known: &KnownTypes,
) -> Vec<InstantiationSignature> {
    let mut signatures = IndexSet::new();
    for diag in diagnostics {
        let Some(ident) = undefined_name(diag.message()) else {
            continue;
        };
        match signature_for(ident, library, known) {
            Some(sig) => {
                debug!(ident = ident, signature = sig.to_string(); "Inferred instantiation");
                signatures.insert(sig);
            }
            None => trace!(ident = ident; "No template produces identifier"),
        }
    }
    signatures.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use jig_core::diagnostic::Location;

    use super::*;

    fn library() -> Library {
        let mut library = Library::new();
        library
            .parse_source(
                Path::new("generic.go"),
                "package generic\n\n//jigs: Stack(T)\ntype StackT []T\n\nfunc NewStackT() *StackT { return &StackT{} }\n\n//jigs: Map(K, V)\ntype MapKV map[K]V\n",
            )
            .unwrap();
        library
    }

    fn known(declared: &[&str]) -> KnownTypes {
        KnownTypes::new(
            &["int".to_string(), "string".to_string()],
            declared.iter().map(|d| d.to_string()).collect(),
        )
    }

    fn undefined(ident: &str) -> Diagnostic {
        Diagnostic::new(Location::new("main.go", 3, Some(7)), format!("undefined: {ident}"))
    }

    #[test]
    fn test_builtin_argument() {
        let sig = signature_for("StackInt", &library(), &known(&[])).unwrap();
        assert_eq!(sig.to_string(), "Stack(int)");
        assert_eq!(sig.fragment_name(), "StackInt");
    }

    #[test]
    fn test_constructor_name_selects_template() {
        let sig = signature_for("NewStackPoint", &library(), &known(&["Point"])).unwrap();
        assert_eq!(sig.to_string(), "Stack(Point)");
        assert_eq!(sig.fragment_name(), "StackPoint");
    }

    #[test]
    fn test_known_types_break_ties() {
        let library = library();
        let sig = signature_for("MapStringIntPoint", &library, &known(&["IntPoint"])).unwrap();
        assert_eq!(sig.to_string(), "Map(string, IntPoint)");

        let sig = signature_for("MapStringIntPoint", &library, &known(&["StringInt", "Point"])).unwrap();
        assert_eq!(sig.to_string(), "Map(StringInt, Point)");
    }

    #[test]
    fn test_infer_dedups_and_skips_other_messages() {
        let diagnostics = vec![
            undefined("StackInt"),
            Diagnostic::new(Location::new("main.go", 4, None), "missing return"),
            undefined("NewStackInt"),
            undefined("FooBar"),
        ];
        let signatures = infer(&diagnostics, &library(), &known(&[]));
        assert_eq!(signatures.len(), 1);
        assert_eq!(signatures[0].fragment_name(), "StackInt");
    }
}
