//! Loading templates from library sources.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use log::{debug, info, warn};
use thiserror::Error;

use jig_parser::{
    FilenameTemplate, ParseError, Pragma, SourceFile, TemplateDecl, pragma::TEMPLATE_MARKER,
};

use super::Template;
use crate::package::Package;

/// Errors raised while loading the template library.
///
/// Every variant is fatal: synthesis needs a valid library.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read template source {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {err}", path.display())]
    Parse {
        err: ParseError,
        src: String,
        path: PathBuf,
    },

    #[error("template `{name}` is declared in both {} and {}", first.display(), second.display())]
    Duplicate {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("template `{name}` in {} has an empty body", path.display())]
    EmptyBody { name: String, path: PathBuf },
}

/// Every template available to a run, keyed by name.
#[derive(Debug, Default)]
pub struct Library {
    templates: IndexMap<String, Template>,
}

impl Library {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load templates from the package's own files and from every file with
    /// `extension` directly inside `dirs`.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable directory or file, source that does
    /// not lex, malformed `//jigs:` declaration, duplicated template name or
    /// empty template body.
    pub fn load(package: &Package, dirs: &[PathBuf], extension: &str) -> Result<Self, LoadError> {
        let mut library = Self::new();

        for file in package.files().iter() {
            library.add_source(file.path(), file.source())?;
        }

        let package_dir = package.dir().canonicalize().ok();
        for dir in dirs {
            if dir.canonicalize().ok() == package_dir {
                debug!(dir = dir.display().to_string(); "Library directory is the package itself");
                continue;
            }
            for path in library_files(dir, extension)? {
                let text = fs::read_to_string(&path).map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })?;
                library.parse_source(&path, &text)?;
            }
        }

        info!(templates = library.len(); "Loaded template library");
        Ok(library)
    }

    /// Lex `text` and add the templates it declares.
    ///
    /// Returns the number of templates added.
    pub fn parse_source(&mut self, path: &Path, text: &str) -> Result<usize, LoadError> {
        let source = SourceFile::parse(text).map_err(|err| LoadError::Parse {
            err,
            src: text.to_string(),
            path: path.to_path_buf(),
        })?;
        self.add_source(path, &source)
    }

    /// Add the templates declared in an already lexed source.
    pub fn add_source(&mut self, path: &Path, source: &SourceFile) -> Result<usize, LoadError> {
        let text = source.text();
        let parse_error = |err: ParseError| LoadError::Parse {
            err,
            src: text.to_string(),
            path: path.to_path_buf(),
        };

        let mut decls: Vec<(usize, usize, TemplateDecl)> = Vec::new();
        for comment in source.pragmas() {
            match comment.pragma {
                Ok(Pragma::Template(decl)) => {
                    decls.push((comment.span.start(), comment.span.end(), decl))
                }
                Err(diag) if text[comment.span.range()].starts_with(TEMPLATE_MARKER) => {
                    return Err(parse_error(diag.into()));
                }
                _ => {}
            }
        }

        let mut added = 0;
        for (i, (start, end, decl)) in decls.iter().enumerate() {
            let body_start = text[*end..].find('\n').map_or(text.len(), |nl| end + nl + 1);
            let body_end = decls
                .get(i + 1)
                .map_or(text.len(), |(next, _, _)| source.line_start(*next));
            let body = &text[body_start..body_end];
            let name = decl.name.as_str();

            if body.trim().is_empty() {
                return Err(LoadError::EmptyBody {
                    name: name.to_string(),
                    path: path.to_path_buf(),
                });
            }

            let filename = match decl.attribute("file") {
                Some(value) => {
                    let offset = start + value.span().start();
                    let parsed = FilenameTemplate::parse(value).map_err(|err| {
                        ParseError::new(
                            err.diagnostics()
                                .iter()
                                .map(|d| d.clone().shifted(offset))
                                .collect(),
                        )
                    });
                    Some(parsed.map_err(parse_error)?)
                }
                None => None,
            };
            for (key, _) in &decl.attributes {
                if key.as_str() != "file" {
                    warn!(template = name, attribute = key.as_str(); "Ignoring unknown template attribute");
                }
            }

            let params = decl.params.iter().map(|p| p.to_string()).collect();
            let template =
                Template::new(name, params, body, filename, path).map_err(parse_error)?;

            if let Some(existing) = self.templates.get(name) {
                return Err(LoadError::Duplicate {
                    name: name.to_string(),
                    first: existing.origin().to_path_buf(),
                    second: path.to_path_buf(),
                });
            }
            debug!(template = name, path = path.display().to_string(); "Loaded template");
            self.templates.insert(name.to_string(), template);
            added += 1;
        }

        Ok(added)
    }

    pub fn get(&self, name: &str) -> Option<&Template> {
        self.templates.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Template> + '_ {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn library_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, LoadError> {
    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}
