//! Rendering one instantiation into the package.

use log::{debug, info};

use jig_core::signature::InstantiationSignature;

use crate::{error::JigError, imports::ImportFixer, package::Package, template::Library};

/// Renders instantiations from a [`Library`] and merges them into a
/// package.
#[derive(Debug)]
pub struct Specializer<'a> {
    library: &'a Library,
}

impl<'a> Specializer<'a> {
    pub fn new(library: &'a Library) -> Self {
        Self { library }
    }

    /// Render `sig` and merge it into `pkg`.
    ///
    /// Returns no messages when the fragment already exists and `force` is
    /// not set. Otherwise the fragment is rendered, merged through `fixer`
    /// into the file named by the template's `file=` attribute (or the
    /// package default), and one message describing the result is
    /// returned.
    ///
    /// # Errors
    ///
    /// [`JigError::UnknownTemplate`] when the library has no template of
    /// that name or arity; merge errors are propagated unchanged.
    pub fn generate_code_for_type(
        &self,
        pkg: &mut Package,
        sig: &InstantiationSignature,
        force: bool,
        fixer: &dyn ImportFixer,
    ) -> Result<Vec<String>, JigError> {
        let fragment = sig.fragment_name();
        if !force && pkg.store().contains(&fragment) {
            debug!(fragment = fragment.as_str(); "Fragment already present");
            return Ok(Vec::new());
        }

        let template = self
            .library
            .get(sig.template())
            .filter(|template| template.params().len() == sig.args().len())
            .ok_or_else(|| JigError::UnknownTemplate(sig.template().to_string()))?;

        let rendered = template.render(sig.args(), pkg.nodoc());
        let filename = template.filename().unwrap_or(pkg.filename()).clone();
        let path = pkg.merge(&filename, &fragment, &rendered, fixer)?;

        info!(
            fragment = fragment.as_str(),
            signature = sig.to_string(),
            forced = force;
            "Generated fragment"
        );
        Ok(vec![format!(
            "generated {fragment} from {sig} in {}",
            path.display()
        )])
    }
}
