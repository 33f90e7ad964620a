//! Fragment name to file bookkeeping.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

/// Which file currently holds each generated fragment.
///
/// A fragment name maps to exactly one path. Recording a name again moves
/// it, which is how a forced regeneration into a different file is
/// represented.
#[derive(Debug, Default, Clone)]
pub struct FragmentStore {
    fragments: IndexMap<String, PathBuf>,
}

impl FragmentStore {
    /// Record that `name` lives in `path`, replacing any earlier entry.
    pub fn record(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.fragments.insert(name.into(), path.into());
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.fragments.get(name).map(PathBuf::as_path)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fragments.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fragments.keys().map(String::as_str)
    }

    /// Fragments recorded in `path`, in the order they were recorded.
    pub fn fragments_in<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a str> + 'a {
        self.fragments
            .iter()
            .filter(move |(_, p)| p.as_path() == path)
            .map(|(name, _)| name.as_str())
    }

    /// Forget every fragment held by `path`.
    pub(crate) fn forget_file(&mut self, path: &Path) {
        self.fragments.retain(|_, p| p.as_path() != path);
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
