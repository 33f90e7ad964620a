//! The package being worked on.
//!
//! A [`Package`] is a directory, the parsed representation of each of its
//! source files (the [`FileSet`]), and the [`FragmentStore`] recording which
//! file holds every generated fragment. It is created once per run, mutated
//! only through its own methods, and written back to disk in a single
//! [`flush`](Package::flush).

mod fileset;
mod merge;
mod scan;
mod store;

pub use fileset::{FileId, FileSet};
pub use scan::{Forced, Scan};
pub use store::FragmentStore;

use std::{
    collections::HashSet,
    fs,
    io::{self, Write as _},
    path::{Path, PathBuf},
};

use log::{debug, info, trace};

use jig_parser::{DeclarationKind, FilenameTemplate, SourceFile};

use crate::{config::GenerateConfig, error::JigError};

/// First line of every file written by jig.
pub const BANNER: &str = "// Code generated by jig; DO NOT EDIT.";

/// One source file: its path, lexed text, and whether jig generated it.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    path: PathBuf,
    source: SourceFile,
}

impl ParsedFile {
    /// Lex `text` as the content of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`JigError::Parse`] when the text does not lex.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, JigError> {
        let path = path.into();
        let text = text.into();
        match SourceFile::parse(text.as_str()) {
            Ok(source) => Ok(Self { path, source }),
            Err(err) => Err(JigError::new_parse_error(err, text, path)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &SourceFile {
        &self.source
    }

    pub fn text(&self) -> &str {
        self.source.text()
    }

    /// Whether the file starts with the generated-file banner.
    pub fn is_generated(&self) -> bool {
        self.text().starts_with(BANNER)
    }
}

/// A package directory with its files and fragments.
#[derive(Debug)]
pub struct Package {
    dir: PathBuf,
    name: String,
    files: FileSet,
    store: FragmentStore,
    filename: FilenameTemplate,
    hint: String,
    nodoc: bool,
}

impl Package {
    /// Read and lex the top-level source files of `dir`.
    ///
    /// Only regular files with the configured extension are read; the
    /// package name is taken from the first package clause that does not
    /// end in `_test`, falling back to the directory name.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be read, a file does not lex, or the
    /// configured file name template is invalid.
    pub fn open(dir: impl Into<PathBuf>, config: &GenerateConfig) -> Result<Self, JigError> {
        let dir = dir.into();
        info!(dir = dir.display().to_string(); "Opening package");

        let filename = FilenameTemplate::parse(config.filename()).map_err(|err| {
            JigError::Config(format!("invalid file name template `{}`: {err}", config.filename()))
        })?;

        let mut files = FileSet::new();
        for path in source_files(&dir, config.extension())? {
            let text = fs::read_to_string(&path)?;
            trace!(path = path.display().to_string(); "Read source file");
            files.insert(ParsedFile::parse(path, text)?);
        }

        let name = files
            .iter()
            .filter_map(|file| file.source().package_name())
            .find(|name| !name.ends_with("_test"))
            .map(str::to_string)
            .or_else(|| {
                dir.canonicalize()
                    .ok()
                    .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            })
            .unwrap_or_else(|| "main".to_string());

        debug!(package = name.as_str(), files = files.len(); "Package opened");

        Ok(Self {
            dir,
            name,
            files,
            store: FragmentStore::default(),
            filename,
            hint: config.hint().to_string(),
            nodoc: config.nodoc(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The package name used in package clauses of generated files.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn store(&self) -> &FragmentStore {
        &self.store
    }

    /// The default file name template for generated fragments.
    pub fn filename(&self) -> &FilenameTemplate {
        &self.filename
    }

    pub fn nodoc(&self) -> bool {
        self.nodoc
    }

    /// Names that count as known types when choosing between ambiguous
    /// instantiations: types declared anywhere in the package plus every
    /// generated fragment.
    pub fn declared_types(&self) -> HashSet<String> {
        let mut names: HashSet<String> = self
            .files
            .iter()
            .flat_map(|file| file.source().declarations())
            .filter(|decl| decl.kind() == DeclarationKind::Type)
            .map(|decl| decl.name().to_string())
            .collect();
        names.extend(self.store.names().map(str::to_string));
        names
    }

    /// Drop every generated file from the in-memory fileset.
    ///
    /// The files stay on disk until [`flush`](Self::flush), which deletes
    /// the ones that were not regenerated in the meantime.
    pub fn remove_generated(&mut self) -> Vec<PathBuf> {
        let generated: Vec<PathBuf> = self
            .files
            .iter()
            .filter(|file| file.is_generated())
            .map(|file| file.path().to_path_buf())
            .collect();

        for path in &generated {
            self.files.remove(path);
            self.store.forget_file(path);
            debug!(path = path.display().to_string(); "Removed generated file");
        }
        generated
    }

    /// Write every changed file and delete every removed one.
    ///
    /// Files are written through a temporary file in the package directory
    /// that is then renamed over the target, so a file on disk is either
    /// its old or its new content.
    ///
    /// Returns one message per file written or deleted.
    ///
    /// # Errors
    ///
    /// Returns [`JigError::Io`] for the first file that cannot be written or
    /// deleted.
    pub fn flush(&mut self) -> Result<Vec<String>, JigError> {
        let mut messages = Vec::new();

        for path in self.files.take_dirty() {
            let Some(file) = self.files.get(&path) else {
                continue;
            };
            let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
            tmp.write_all(file.text().as_bytes())?;
            tmp.persist(&path).map_err(|err| err.error)?;
            info!(path = path.display().to_string(); "Wrote file");
            messages.push(format!("wrote {}", path.display()));
        }

        for path in self.files.take_removed() {
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!(path = path.display().to_string(); "Deleted file");
                    messages.push(format!("removed {}", path.display()));
                }
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(err.into()),
            }
        }

        Ok(messages)
    }

    fn header(&self) -> String {
        format!("{BANNER}\n\n{}\n\npackage {}\n", self.hint, self.name)
    }
}

/// Top-level regular files of `dir` with the given extension, sorted.
fn source_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, JigError> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_file()
            && path.extension().is_some_and(|ext| ext == extension)
        {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
