//! Configuration types for jig runs.
//!
//! Every structure implements [`serde::Deserialize`] with all fields
//! defaulted, so a configuration file only needs to name what it changes.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`GenerateConfig`] - Output naming, template sources and loop limits.
//! - [`CheckConfig`] - The typechecker command.
//! - [`ImportsConfig`] - The import-fixer command.
//!
//! # Example
//!
//! ```
//! # use jig::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.generate().filename(), "{package}_jig.go");
//! assert_eq!(config.generate().max_iterations(), 1024);
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    generate: GenerateConfig,

    #[serde(default)]
    check: CheckConfig,

    #[serde(default)]
    imports: ImportsConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(generate: GenerateConfig, check: CheckConfig, imports: ImportsConfig) -> Self {
        Self {
            generate,
            check,
            imports,
        }
    }

    pub fn generate(&self) -> &GenerateConfig {
        &self.generate
    }

    pub fn generate_mut(&mut self) -> &mut GenerateConfig {
        &mut self.generate
    }

    pub fn check(&self) -> &CheckConfig {
        &self.check
    }

    pub fn imports(&self) -> &ImportsConfig {
        &self.imports
    }
}

/// Settings for generating and placing fragments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// File name template for generated files.
    filename: String,

    /// Source file extension, without the dot.
    extension: String,

    /// Directories scanned for template declarations, relative to the
    /// package directory unless absolute.
    library: Vec<PathBuf>,

    /// Type names spelled in lower case when used as arguments.
    builtins: Vec<String>,

    /// Strip documentation comments from generated fragments.
    nodoc: bool,

    /// Comment placed under the banner of new generated files.
    hint: String,

    /// Upper bound on check/generate iterations.
    ///
    /// A typechecker that stops at its first error yields at most one new
    /// fragment per iteration, so this must cover the number of
    /// instantiations the package needs. Exceeding it aborts the run
    /// without writing anything.
    max_iterations: usize,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            filename: "{package}_jig.go".to_string(),
            extension: "go".to_string(),
            library: Vec::new(),
            builtins: [
                "bool",
                "byte",
                "complex64",
                "complex128",
                "error",
                "float32",
                "float64",
                "int",
                "int8",
                "int16",
                "int32",
                "int64",
                "rune",
                "string",
                "uint",
                "uint8",
                "uint16",
                "uint32",
                "uint64",
                "uintptr",
                "any",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            nodoc: false,
            hint: "//go:generate jig --regen".to_string(),
            max_iterations: 1024,
        }
    }
}

impl GenerateConfig {
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn library(&self) -> &[PathBuf] {
        &self.library
    }

    pub fn builtins(&self) -> &[String] {
        &self.builtins
    }

    pub fn nodoc(&self) -> bool {
        self.nodoc
    }

    pub fn hint(&self) -> &str {
        &self.hint
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Library directories resolved against the package directory.
    pub fn library_dirs(&self, package_dir: &Path) -> Vec<PathBuf> {
        self.library.iter().map(|dir| package_dir.join(dir)).collect()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_library(mut self, library: Vec<PathBuf>) -> Self {
        self.library = library;
        self
    }

    pub fn with_nodoc(mut self, nodoc: bool) -> Self {
        self.nodoc = nodoc;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Turn documentation stripping on, for command-line overrides.
    pub fn set_nodoc(&mut self, nodoc: bool) {
        self.nodoc = nodoc;
    }
}

/// The typechecker invocation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Program and arguments, run inside a mirror of the package directory.
    command: Vec<String>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            command: vec!["go".to_string(), "vet".to_string(), ".".to_string()],
        }
    }
}

impl CheckConfig {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }
}

/// The import-fixer invocation.
///
/// An empty command selects the built-in canonicalizer, which formats
/// whitespace but leaves the import clause alone.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImportsConfig {
    command: Vec<String>,
}

impl Default for ImportsConfig {
    fn default() -> Self {
        Self {
            command: vec!["goimports".to_string()],
        }
    }
}

impl ImportsConfig {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [generate]
            nodoc = true
            library = ["../generic"]

            [imports]
            command = []
            "#,
        )
        .unwrap();

        assert!(config.generate().nodoc());
        assert_eq!(config.generate().filename(), "{package}_jig.go");
        assert_eq!(config.generate().library(), [PathBuf::from("../generic")]);
        assert!(config.imports().command().is_empty());
        assert_eq!(config.check().command(), ["go", "vet", "."]);
    }

    #[test]
    fn test_empty_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.generate().hint(), "//go:generate jig --regen");
        assert!(config.generate().builtins().iter().any(|b| b == "int"));
        assert!(config.generate().max_iterations() >= 1024);
    }

    #[test]
    fn test_library_dirs_are_relative_to_package() {
        let generate = GenerateConfig::default().with_library(vec![PathBuf::from("lib")]);
        assert_eq!(
            generate.library_dirs(Path::new("/work/pkg")),
            [PathBuf::from("/work/pkg/lib")]
        );
    }
}
