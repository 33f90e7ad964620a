//! The typechecker boundary.
//!
//! Synthesis needs the diagnostics the toolchain would report for the
//! package as it currently is in memory, not as it is on disk. The
//! [`CommandChecker`] therefore mirrors the package into a scratch
//! directory next to it, overlays every in-memory file, and runs the
//! configured command there. Keeping the scratch directory beside the
//! package leaves an enclosing `go.mod` and sibling packages in reach.

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};

use log::{debug, trace};
use tempfile::TempDir;
use thiserror::Error;

use jig_core::diagnostic::{Diagnostic, Location};
use jig_parser::message::diagnostic_line;

use crate::package::Package;

/// Errors from running the typechecker.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("failed to run typechecker `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("typechecker `{command}` failed with {status} and no diagnostics:\n{output}")]
    Failed {
        command: String,
        status: ExitStatus,
        output: String,
    },

    #[error("I/O error preparing typechecker run: {0}")]
    Io(#[from] io::Error),

    #[error("no typechecker command configured")]
    EmptyCommand,
}

/// Reports diagnostics for the in-memory state of a package.
pub trait TypeChecker {
    /// Typecheck `pkg` and return every diagnostic, in reporting order.
    ///
    /// An empty result means the package compiles.
    ///
    /// # Errors
    ///
    /// Fails when the checker cannot run or exits unsuccessfully without
    /// reporting anything parseable.
    fn check(&mut self, pkg: &Package) -> Result<Vec<Diagnostic>, CheckError>;
}

/// Runs an external command such as `go vet .` on a mirror of the package.
#[derive(Debug, Clone)]
pub struct CommandChecker {
    program: String,
    args: Vec<String>,
}

impl CommandChecker {
    /// # Errors
    ///
    /// Returns [`CheckError::EmptyCommand`] for an empty command.
    pub fn new(command: &[String]) -> Result<Self, CheckError> {
        let (program, args) = command.split_first().ok_or(CheckError::EmptyCommand)?;
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl TypeChecker for CommandChecker {
    fn check(&mut self, pkg: &Package) -> Result<Vec<Diagnostic>, CheckError> {
        let scratch = scratch_dir(pkg.dir())?;
        mirror(pkg, scratch.path())?;

        trace!(command = self.display(), dir = scratch.path().display().to_string(); "Running typechecker");
        let output = Command::new(&self.program)
            .args(&self.args)
            .current_dir(scratch.path())
            .output()
            .map_err(|source| CheckError::Spawn {
                command: self.display(),
                source,
            })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        let diagnostics: Vec<Diagnostic> = text
            .lines()
            .filter_map(diagnostic_line)
            .map(|diag| relocate(diag, scratch.path(), pkg.dir()))
            .collect();

        if diagnostics.is_empty() && !output.status.success() {
            return Err(CheckError::Failed {
                command: self.display(),
                status: output.status,
                output: text.trim_end().to_string(),
            });
        }

        debug!(diagnostics = diagnostics.len(), status = output.status.to_string(); "Typechecked package");
        Ok(diagnostics)
    }
}

/// Create the scratch directory as a sibling of `dir`, falling back to the
/// system temporary directory when the parent is not writable.
fn scratch_dir(dir: &Path) -> io::Result<TempDir> {
    let parent = dir.canonicalize()?.parent().map(Path::to_path_buf);
    let Some(parent) = parent else {
        return tempfile::tempdir();
    };

    // A leading `_` keeps the directory out of `./...` patterns.
    match tempfile::Builder::new().prefix("_jig-check").tempdir_in(&parent) {
        Ok(scratch) => Ok(scratch),
        Err(err) => {
            debug!(parent = parent.display().to_string(), err = err.to_string(); "Falling back to system temp dir");
            tempfile::tempdir()
        }
    }
}

/// Copy the package's top-level files into `scratch`, then write every
/// in-memory file over them. Files removed in memory are left out.
fn mirror(pkg: &Package, scratch: &Path) -> io::Result<()> {
    for entry in fs::read_dir(pkg.dir())? {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type()?.is_file() || pkg.files().is_removed(&path) {
            continue;
        }
        if let Some(name) = path.file_name() {
            fs::copy(&path, scratch.join(name))?;
        }
    }

    for file in pkg.files().iter() {
        if let Some(name) = file.path().file_name() {
            fs::write(scratch.join(name), file.text())?;
        }
    }
    Ok(())
}

/// Point a diagnostic reported inside `scratch` back at `dir`.
fn relocate(diag: Diagnostic, scratch: &Path, dir: &Path) -> Diagnostic {
    let location = diag.location();
    let reported = location.path();
    let relative = reported
        .strip_prefix(scratch)
        .or_else(|_| reported.strip_prefix("."))
        .unwrap_or(reported);

    let path: PathBuf = if relative.is_absolute() {
        relative.to_path_buf()
    } else {
        dir.join(relative)
    };
    Diagnostic::new(
        Location::new(path, location.line(), location.column()),
        diag.message(),
    )
}

#[cfg(test)]
mod tests {
    use crate::config::GenerateConfig;

    use super::*;

    fn package() -> (tempfile::TempDir, Package) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.go"), "package p\n").unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/p\n").unwrap();
        let pkg = Package::open(dir.path(), &GenerateConfig::default()).unwrap();
        (dir, pkg)
    }

    #[test]
    fn test_empty_command() {
        assert!(matches!(CommandChecker::new(&[]), Err(CheckError::EmptyCommand)));
    }

    #[test]
    fn test_relocate_relative_and_scratch_paths() {
        let scratch = Path::new("/tmp/scratch");
        let dir = Path::new("/work/p");

        let diag = Diagnostic::new(Location::new("./main.go", 3, Some(2)), "undefined: StackInt");
        let moved = relocate(diag, scratch, dir);
        assert_eq!(moved.location().path(), &PathBuf::from("/work/p/main.go"));
        assert_eq!(moved.location().column(), Some(2));

        let diag = Diagnostic::new(Location::new("/tmp/scratch/a.go", 1, None), "x");
        let moved = relocate(diag, scratch, dir);
        assert_eq!(moved.location().path(), &PathBuf::from("/work/p/a.go"));
    }

    #[test]
    fn test_mirror_overlays_memory_and_skips_removed() {
        let (dir, _) = package();
        let generated = dir.path().join("p_jig.go");
        fs::write(&generated, format!("{}\n\npackage p\n", crate::package::BANNER)).unwrap();
        let mut pkg = Package::open(dir.path(), &GenerateConfig::default()).unwrap();
        pkg.remove_generated();

        let scratch = tempfile::tempdir().unwrap();
        mirror(&pkg, scratch.path()).unwrap();
        assert!(scratch.path().join("go.mod").exists());
        assert_eq!(fs::read_to_string(scratch.path().join("main.go")).unwrap(), "package p\n");
        assert!(!scratch.path().join("p_jig.go").exists());
        assert!(generated.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_command_output_is_parsed() {
        let (dir, pkg) = package();
        let mut checker = CommandChecker::new(&[
            "sh".to_string(),
            "-c".to_string(),
            "echo '# example.com/p'; echo './main.go:1:9: undefined: StackInt' >&2; exit 1".to_string(),
        ])
        .unwrap();

        let diagnostics = checker.check(&pkg).unwrap();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message(), "undefined: StackInt");
        assert_eq!(diagnostics[0].location().path(), &dir.path().join("main.go"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_without_diagnostics() {
        let (_dir, pkg) = package();
        let mut checker =
            CommandChecker::new(&["sh".to_string(), "-c".to_string(), "echo broken; exit 2".to_string()])
                .unwrap();
        assert!(matches!(checker.check(&pkg), Err(CheckError::Failed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_clean_exit_means_no_diagnostics() {
        let (_dir, pkg) = package();
        let mut checker = CommandChecker::new(&["true".to_string()]).unwrap();
        assert!(checker.check(&pkg).unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_enclosing_module_stays_visible() {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join("go.mod"), "module example.com/m\n").unwrap();
        let dir = root.path().join("stack");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("main.go"), "package stack\n").unwrap();
        let pkg = Package::open(&dir, &GenerateConfig::default()).unwrap();

        let find_module = "d=$(pwd -P); while [ \"$d\" != / ]; do [ -f \"$d/go.mod\" ] && exit 0; d=$(dirname \"$d\"); done; \
             echo 'go: go.mod file not found in current directory or any parent directory'; exit 1";
        let mut checker =
            CommandChecker::new(&["sh".to_string(), "-c".to_string(), find_module.to_string()]).unwrap();
        assert!(checker.check(&pkg).unwrap().is_empty());

        let mut entries: Vec<String> = fs::read_dir(root.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(entries, ["go.mod", "stack"]);
    }
}
