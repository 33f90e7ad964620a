//! jig - Diagnostic-driven synthesis of generic code.
//!
//! jig resolves "undefined identifier" diagnostics by instantiating
//! templates from a library: `StackInt` is generated from the template
//! `Stack(T)` with `T` bound to `int`. Generation repeats until the package
//! typechecks or nothing more can be generated, and the result is written
//! to disk in a single pass.
//!
//! The [`Jig`] facade runs the whole process; the modules expose each step
//! for callers that want to drive it themselves.

pub mod checker;
pub mod config;
pub mod imports;
pub mod infer;
pub mod package;
pub mod specializer;
pub mod synthesis;
pub mod template;

mod error;

pub use jig_core::{diagnostic, identifier, signature};

pub use error::{CheckError, FixError, JigError, LoadError};
pub use package::Package;
pub use synthesis::{Report, State};

use std::path::Path;

use log::{debug, info};

use checker::{CommandChecker, TypeChecker};
use config::AppConfig;
use imports::ImportFixer;
use synthesis::Synthesizer;

/// What a run does with previously generated files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Drop generated files and generate everything the package needs.
    #[default]
    Regenerate,
    /// Keep generated files and add only what is missing.
    Missing,
    /// Delete generated files and stop.
    Clean,
}

/// Entry point for running jig on a package directory.
///
/// # Examples
///
/// ```rust,no_run
/// use jig::{Jig, Mode, config::AppConfig};
///
/// let jig = Jig::new(AppConfig::default());
/// let report = jig.run("./stack", Mode::Regenerate).expect("jig failed");
/// for diag in report.unresolved() {
///     println!("{diag}");
/// }
/// ```
#[derive(Debug, Default)]
pub struct Jig {
    config: AppConfig,
}

impl Jig {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read and lex the package in `dir`.
    ///
    /// # Errors
    ///
    /// See [`Package::open`].
    pub fn open(&self, dir: impl AsRef<Path>) -> Result<Package, JigError> {
        Package::open(dir.as_ref(), self.config.generate())
    }

    /// Run with the configured typechecker and import-fixer commands.
    ///
    /// # Errors
    ///
    /// Returns [`JigError::Check`] when no typechecker command is
    /// configured, and otherwise fails like [`run_with`](Self::run_with).
    pub fn run(&self, dir: impl AsRef<Path>, mode: Mode) -> Result<Report, JigError> {
        let mut checker = CommandChecker::new(self.config.check().command())?;
        let fixer = imports::from_config(self.config.imports());
        self.run_with(dir, mode, &mut checker, fixer.as_ref())
    }

    /// Run with the given collaborators.
    ///
    /// The package is opened, generated files are dropped unless `mode` is
    /// [`Mode::Missing`], the synthesis loop runs, and every change is
    /// flushed to disk. When the loop fails nothing is written.
    ///
    /// # Errors
    ///
    /// Any fatal error from opening, synthesis or flushing.
    pub fn run_with(
        &self,
        dir: impl AsRef<Path>,
        mode: Mode,
        checker: &mut dyn TypeChecker,
        fixer: &dyn ImportFixer,
    ) -> Result<Report, JigError> {
        let mut pkg = self.open(dir)?;
        info!(package = pkg.name(), mode:? = mode; "Running jig");

        if mode != Mode::Missing {
            let removed = pkg.remove_generated();
            debug!(files = removed.len(); "Dropped generated files");
        }

        if mode == Mode::Clean {
            let mut report = Report::cleaned();
            report.push_messages(pkg.flush()?);
            return Ok(report);
        }

        let mut report = Synthesizer::new(self.config.generate(), checker, fixer).run(&mut pkg)?;
        report.push_messages(pkg.flush()?);
        Ok(report)
    }
}
