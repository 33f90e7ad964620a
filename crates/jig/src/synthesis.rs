//! The synthesis loop.
//!
//! Each iteration typechecks the package, rescans its pragmas, infers the
//! instantiations the diagnostics ask for and specializes them. The loop
//! ends when the package typechecks cleanly (converged), when an iteration
//! generates nothing (stalled), or at the configured iteration cap.

use std::{collections::HashSet, fmt};

use log::{debug, info, warn};

use jig_core::{diagnostic::Diagnostic, signature::InstantiationSignature};

use crate::{
    checker::TypeChecker,
    config::GenerateConfig,
    error::JigError,
    imports::ImportFixer,
    infer::{KnownTypes, infer, signature_for},
    package::Package,
    specializer::Specializer,
    template::Library,
};

/// Where the loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Scanning,
    Checking,
    Generating,
    /// The package typechecks and no forced fragment is pending.
    Converged,
    /// Diagnostics remain that no template resolves.
    Stalled,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Scanning => "scanning",
            State::Checking => "checking",
            State::Generating => "generating",
            State::Converged => "converged",
            State::Stalled => "stalled",
        };
        f.write_str(name)
    }
}

/// Outcome of a run that did not abort.
#[derive(Debug)]
pub struct Report {
    messages: Vec<String>,
    unresolved: Vec<Diagnostic>,
    errors: Vec<JigError>,
    iterations: usize,
    state: State,
}

impl Report {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            unresolved: Vec::new(),
            errors: Vec::new(),
            iterations: 0,
            state: State::Scanning,
        }
    }

    /// Report of a run that only removed generated files.
    pub(crate) fn cleaned() -> Self {
        Self {
            state: State::Converged,
            ..Self::new()
        }
    }

    /// Per-step notes for verbose output.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Diagnostics left when the loop stopped, in reporting order.
    pub fn unresolved(&self) -> &[Diagnostic] {
        &self.unresolved
    }

    /// Non-fatal errors, such as requests for unknown templates.
    pub fn errors(&self) -> &[JigError] {
        &self.errors
    }

    /// Number of typechecks run.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Whether the loop converged with nothing left to report.
    pub fn is_success(&self) -> bool {
        self.state == State::Converged && self.unresolved.is_empty() && self.errors.is_empty()
    }

    pub(crate) fn push_messages(&mut self, messages: impl IntoIterator<Item = String>) {
        self.messages.extend(messages);
    }
}

/// Drives a package to its fixed point.
pub struct Synthesizer<'a> {
    config: &'a GenerateConfig,
    checker: &'a mut dyn TypeChecker,
    fixer: &'a dyn ImportFixer,
    state: State,
}

impl<'a> Synthesizer<'a> {
    pub fn new(
        config: &'a GenerateConfig,
        checker: &'a mut dyn TypeChecker,
        fixer: &'a dyn ImportFixer,
    ) -> Self {
        Self {
            config,
            checker,
            fixer,
            state: State::Scanning,
        }
    }

    fn enter(&mut self, state: State) {
        debug!(from = self.state.to_string(), to = state.to_string(); "Synthesis state");
        self.state = state;
    }

    /// Run the loop on `pkg`. Nothing is written to disk; the caller
    /// flushes the package when this returns `Ok`.
    ///
    /// # Errors
    ///
    /// Typechecker, library, merge and import-fixer failures abort the
    /// run, as does reaching `max_iterations` without a fixed point.
    pub fn run(&mut self, pkg: &mut Package) -> Result<Report, JigError> {
        let mut report = Report::new();
        let mut library: Option<Library> = None;
        let mut attempted: HashSet<InstantiationSignature> = HashSet::new();
        let mut forced_done: HashSet<String> = HashSet::new();
        let max_iterations = self.config.max_iterations();

        for iteration in 1..=max_iterations {
            report.iterations = iteration;

            self.enter(State::Checking);
            let diagnostics = self.checker.check(pkg)?;

            self.enter(State::Scanning);
            let scan = pkg.scan();
            if iteration == 1 {
                report.push_messages(scan.messages().iter().cloned());
            }
            let forced: Vec<String> = scan
                .forced()
                .fragments(pkg.store())
                .into_iter()
                .filter(|name| !forced_done.contains(name))
                .collect();

            if diagnostics.is_empty() && forced.is_empty() {
                self.enter(State::Converged);
                report.state = self.state;
                info!(iterations = iteration; "Package converged");
                return Ok(report);
            }

            let loaded = match library.take() {
                Some(loaded) => loaded,
                None => {
                    let dirs = self.config.library_dirs(pkg.dir());
                    let loaded = Library::load(pkg, &dirs, self.config.extension())?;
                    report.push_messages([format!("loaded {} templates", loaded.len())]);
                    loaded
                }
            };

            self.enter(State::Generating);
            let known = KnownTypes::new(self.config.builtins(), pkg.declared_types());
            let mut requests: Vec<(InstantiationSignature, bool)> = Vec::new();

            for name in forced {
                match signature_for(&name, &loaded, &known) {
                    Some(sig) => requests.push((sig, true)),
                    None => {
                        warn!(fragment = name.as_str(); "No template produces forced fragment");
                        report.errors.push(JigError::UnknownTemplate(name.clone()));
                    }
                }
                forced_done.insert(name);
            }
            for sig in infer(&diagnostics, &loaded, &known) {
                if requests.iter().all(|(requested, _)| *requested != sig) && attempted.insert(sig.clone()) {
                    requests.push((sig, false));
                }
            }

            let progress = self.generate(pkg, &loaded, &requests, &mut report)?;
            library = Some(loaded);

            if !progress {
                self.enter(State::Stalled);
                report.state = self.state;
                report.unresolved = diagnostics;
                info!(
                    iterations = iteration,
                    unresolved = report.unresolved.len();
                    "Synthesis stalled"
                );
                return Ok(report);
            }
        }

        Err(JigError::IterationLimit(max_iterations))
    }

    /// Specialize every request; returns whether any fragment was written.
    fn generate(
        &self,
        pkg: &mut Package,
        library: &Library,
        requests: &[(InstantiationSignature, bool)],
        report: &mut Report,
    ) -> Result<bool, JigError> {
        let specializer = Specializer::new(library);
        let mut progress = false;

        for (sig, force) in requests {
            match specializer.generate_code_for_type(pkg, sig, *force, self.fixer) {
                Ok(messages) => {
                    progress |= !messages.is_empty();
                    report.push_messages(messages);
                }
                Err(err @ JigError::UnknownTemplate(_)) => {
                    warn!(signature = sig.to_string(); "{err}");
                    report.errors.push(err);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(progress)
    }
}
