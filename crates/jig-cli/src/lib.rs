//! CLI logic for the jig code generator.
//!
//! This module contains the core CLI logic: configuration loading, flag
//! overrides, and turning a run [`Report`] into the lines printed for the
//! user.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use log::info;

use jig::{Jig, JigError, Report};

/// Run jig on the package directory named by `args`.
///
/// # Errors
///
/// Returns `JigError` for:
/// - Configuration loading errors
/// - File I/O errors
/// - Source files or template libraries that do not parse
/// - Typechecker or import-fixer failures
/// - Runs that exceed the iteration limit
pub fn run(args: &Args) -> Result<Report, JigError> {
    let mode = args.mode();
    info!(dir = args.dir, mode:? = mode; "Processing package");

    let mut app_config = config::load_config(args.config.as_ref())?;
    if args.nodoc {
        app_config.generate_mut().set_nodoc(true);
    }

    let report = Jig::new(app_config).run(&args.dir, mode)?;

    info!(
        iterations = report.iterations(),
        state = report.state().to_string();
        "Package processed"
    );
    Ok(report)
}

/// Lines to print for a finished run: the step messages when `verbose`,
/// then every unresolved diagnostic and non-fatal error.
pub fn report_lines(report: &Report, verbose: bool) -> Vec<String> {
    let mut lines = Vec::new();
    if verbose {
        lines.extend(report.messages().iter().cloned());
    }
    lines.extend(report.unresolved().iter().map(ToString::to_string));
    lines.extend(report.errors().iter().map(ToString::to_string));
    lines
}
