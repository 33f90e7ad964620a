//! Pragma scanning.
//!
//! Rebuilds the fragment store from the `//jig:name` markers in the
//! package and collects the forced regeneration directives. Malformed
//! markers are skipped: provenance is bookkeeping, and a broken comment in
//! a user file must not stop generation.

use std::path::PathBuf;

use indexmap::IndexSet;
use log::{debug, trace};

use jig_parser::Pragma;

use super::{FragmentStore, Package};

/// Fragments whose regeneration was requested with `//jig:type` or
/// `//jig:file`.
#[derive(Debug, Default, Clone)]
pub struct Forced {
    types: IndexSet<String>,
    files: IndexSet<PathBuf>,
}

impl Forced {
    /// Fragment names named by `//jig:type`.
    pub fn types(&self) -> impl Iterator<Item = &str> + '_ {
        self.types.iter().map(String::as_str)
    }

    /// Files containing a `//jig:file` directive.
    pub fn files(&self) -> impl Iterator<Item = &PathBuf> + '_ {
        self.files.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.files.is_empty()
    }

    /// Every forced fragment: the named ones followed by all fragments held
    /// by forced files, without duplicates.
    pub fn fragments(&self, store: &FragmentStore) -> Vec<String> {
        let mut names: IndexSet<String> = self.types.clone();
        for path in &self.files {
            names.extend(store.fragments_in(path).map(str::to_string));
        }
        names.into_iter().collect()
    }
}

/// Result of one pragma scan.
#[derive(Debug, Default)]
pub struct Scan {
    messages: Vec<String>,
    forced: Forced,
}

impl Scan {
    /// Human-readable notes about forced directives, for verbose output.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn forced(&self) -> &Forced {
        &self.forced
    }
}

impl Package {
    /// Record every `//jig:name` fragment in the store and collect forced
    /// regeneration directives.
    pub fn scan(&mut self) -> Scan {
        let mut scan = Scan::default();

        for file in self.files.iter() {
            let path = file.path();
            for comment in file.source().pragmas() {
                match comment.pragma {
                    Ok(Pragma::Name(name)) => {
                        trace!(fragment = name.as_str(), path = path.display().to_string(); "Found fragment");
                        self.store.record(name.into_inner(), path);
                    }
                    Ok(Pragma::ForceFile) => {
                        if scan.forced.files.insert(path.to_path_buf()) {
                            scan.messages
                                .push(format!("{}: regenerating every fragment", path.display()));
                        }
                    }
                    Ok(Pragma::ForceType(name)) => {
                        scan.messages.push(format!(
                            "{}: regenerating {}",
                            path.display(),
                            name.as_str()
                        ));
                        scan.forced.types.insert(name.into_inner());
                    }
                    Ok(Pragma::Template(_)) => {}
                    Err(diag) => {
                        debug!(
                            path = path.display().to_string(),
                            offset = comment.span.start();
                            "Ignoring malformed pragma: {}", diag.message()
                        );
                    }
                }
            }
        }

        debug!(fragments = self.store.len(); "Scanned pragmas");
        scan
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::config::GenerateConfig;

    use super::*;

    fn package(files: &[(&str, &str)]) -> (tempfile::TempDir, Package) {
        let dir = tempfile::tempdir().unwrap();
        for (name, text) in files {
            fs::write(dir.path().join(name), text).unwrap();
        }
        let pkg = Package::open(dir.path(), &GenerateConfig::default()).unwrap();
        (dir, pkg)
    }

    #[test]
    fn test_scan_records_fragments() {
        let (dir, mut pkg) = package(&[(
            "p_jig.go",
            "package p\n\n//jig:name StackInt\ntype StackInt []int\n\n//jig:name QueueInt\ntype QueueInt []int\n",
        )]);

        let scan = pkg.scan();
        assert!(scan.forced().is_empty());
        assert_eq!(pkg.store().len(), 2);
        assert_eq!(
            pkg.store().get("QueueInt"),
            Some(dir.path().join("p_jig.go").as_path())
        );
    }

    #[test]
    fn test_scan_ignores_malformed_markers() {
        let (_dir, mut pkg) = package(&[(
            "main.go",
            "package p\n\n//jig:name\n//jig:name A B\n//jig:name Good\n",
        )]);

        pkg.scan();
        assert_eq!(pkg.store().names().collect::<Vec<_>>(), ["Good"]);
    }

    #[test]
    fn test_forced_fragments() {
        let (dir, mut pkg) = package(&[
            (
                "a_jig.go",
                "package p\n//jig:file\n\n//jig:name StackInt\ntype StackInt []int\n\n//jig:name QueueInt\ntype QueueInt []int\n",
            ),
            (
                "b_jig.go",
                "package p\n\n//jig:name ListInt\n//jig:type ListInt\ntype ListInt []int\n",
            ),
        ]);

        let scan = pkg.scan();
        assert_eq!(scan.messages().len(), 2);
        assert_eq!(
            scan.forced().files().collect::<Vec<_>>(),
            [&dir.path().join("a_jig.go")]
        );
        assert_eq!(
            scan.forced().fragments(pkg.store()),
            ["ListInt", "StackInt", "QueueInt"]
        );
    }
}
