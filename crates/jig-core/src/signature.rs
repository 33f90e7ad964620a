//! Instantiation signatures.
//!
//! An [`InstantiationSignature`] names a template and the ordered concrete
//! type arguments to substitute into it. It is the dedup key the synthesis
//! loop uses to avoid rendering the same instantiation twice in a run, and
//! it determines the name of the fragment the instantiation produces.

use std::fmt;

/// One concrete type argument.
///
/// Every argument has two spellings: the `ident` form that is spliced into
/// identifiers (`Int` in `StackInt`) and the `ty` form that replaces the bare
/// parameter in type positions (`int`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeArg {
    ident: String,
    ty: String,
}

impl TypeArg {
    /// Create a type argument from its identifier and type spellings.
    pub fn new(ident: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            ty: ty.into(),
        }
    }

    /// The spelling used inside identifiers.
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// The spelling used in type positions.
    pub fn ty(&self) -> &str {
        &self.ty
    }
}

/// A requested instantiation: template name plus ordered type arguments.
///
/// # Examples
///
/// ```
/// use jig_core::signature::{InstantiationSignature, TypeArg};
///
/// let sig = InstantiationSignature::new("Stack", vec![TypeArg::new("Int", "int")]);
/// assert_eq!(sig.fragment_name(), "StackInt");
/// assert_eq!(sig.to_string(), "Stack(int)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstantiationSignature {
    template: String,
    args: Vec<TypeArg>,
}

impl InstantiationSignature {
    /// Create a new signature.
    pub fn new(template: impl Into<String>, args: Vec<TypeArg>) -> Self {
        Self {
            template: template.into(),
            args,
        }
    }

    /// Name of the template to instantiate.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Ordered type arguments.
    pub fn args(&self) -> &[TypeArg] {
        &self.args
    }

    /// Name of the fragment this instantiation renders to: the template name
    /// followed by the identifier form of every argument.
    pub fn fragment_name(&self) -> String {
        let mut name = self.template.clone();
        for arg in &self.args {
            name.push_str(&arg.ident);
        }
        name
    }
}

impl fmt::Display for InstantiationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.template)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg.ty)?;
        }
        write!(f, ")")
    }
}
