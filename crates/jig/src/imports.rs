//! The import-fixer boundary.
//!
//! After a fragment is appended, the whole file buffer goes through an
//! [`ImportFixer`], which is expected to rewrite the import clause to what
//! the file actually uses and to format the result canonically.

use std::{
    io::{self, Write as _},
    process::{Command, Stdio},
    thread,
};

use log::{debug, trace};
use thiserror::Error;

use crate::config::ImportsConfig;

/// Errors from the import-fixer.
#[derive(Debug, Error)]
pub enum FixError {
    #[error("failed to run import fixer `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error talking to import fixer: {0}")]
    Io(#[from] io::Error),

    #[error("import fixer rejected the generated source: {0}")]
    Rejected(String),

    #[error("import fixer produced invalid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Rewrites a source buffer's imports and formats it.
pub trait ImportFixer {
    /// Return the fixed buffer.
    ///
    /// # Errors
    ///
    /// Fails when the buffer cannot be processed, typically because the
    /// rendered source is not syntactically valid.
    fn fix(&self, source: &str) -> Result<String, FixError>;
}

/// Pipes buffers through an external program such as `goimports`.
#[derive(Debug, Clone)]
pub struct CommandImportFixer {
    program: String,
    args: Vec<String>,
}

impl CommandImportFixer {
    /// Create a fixer from a program and its arguments. Returns `None` for
    /// an empty command.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
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

impl ImportFixer for CommandImportFixer {
    fn fix(&self, source: &str) -> Result<String, FixError> {
        trace!(command = self.display(), bytes = source.len(); "Running import fixer");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| FixError::Spawn {
                command: self.display(),
                source,
            })?;

        // Feed stdin from its own thread while the output pipes drain, so
        // a fixer that streams never blocks on a full pipe. The child is
        // always waited on, even when the write fails.
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("import fixer stdin writer panicked")));
            (written, output)
        });
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            debug!(status = output.status.to_string(); "Import fixer failed");
            return Err(FixError::Rejected(stderr));
        }
        written?;

        Ok(String::from_utf8(output.stdout)?)
    }
}

/// Built-in fixer used when no command is configured.
///
/// Leaves imports alone and normalises whitespace: trailing spaces are
/// trimmed, runs of blank lines collapse to one, and the text ends with a
/// single newline.
#[derive(Debug, Clone, Copy, Default)]
pub struct Canonicalizer;

impl ImportFixer for Canonicalizer {
    fn fix(&self, source: &str) -> Result<String, FixError> {
        let mut out = String::with_capacity(source.len());
        let mut blank_run = false;

        for line in source.lines() {
            let line = line.trim_end();
            if line.is_empty() {
                if !blank_run && !out.is_empty() {
                    out.push('\n');
                }
                blank_run = true;
                continue;
            }
            blank_run = false;
            out.push_str(line);
            out.push('\n');
        }

        while out.ends_with("\n\n") {
            out.pop();
        }
        Ok(out)
    }
}

/// The fixer selected by configuration: the configured command, or the
/// [`Canonicalizer`] when the command is empty.
pub fn from_config(config: &ImportsConfig) -> Box<dyn ImportFixer> {
    match CommandImportFixer::new(config.command()) {
        Some(fixer) => Box::new(fixer),
        None => Box::new(Canonicalizer),
    }
}
