//! Arena of parsed files keyed by path.

use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};

use super::ParsedFile;

/// Index of a file in the [`FileSet`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileId(usize);

/// Every parsed file of a package.
///
/// Files live in an arena and each path owns one slot.
/// [`replace`](Self::replace) swaps a new version into the slot and drops
/// the old one, so the arena never holds more than one version per path.
///
/// The set also records which paths changed since the last flush and which
/// were removed, so writing back to disk touches only those. A removed
/// path keeps its slot until it is written again.
#[derive(Debug, Default)]
pub struct FileSet {
    arena: Vec<ParsedFile>,
    index: IndexMap<PathBuf, FileId>,
    dirty: IndexSet<PathBuf>,
    removed: IndexMap<PathBuf, FileId>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file read from disk. It is not marked as changed.
    pub fn insert(&mut self, file: ParsedFile) -> FileId {
        let path = file.path().to_path_buf();
        let slot = self
            .index
            .get(&path)
            .copied()
            .or_else(|| self.removed.shift_remove(&path));

        let id = match slot {
            Some(id) => {
                self.arena[id.0] = file;
                id
            }
            None => {
                self.arena.push(file);
                FileId(self.arena.len() - 1)
            }
        };
        self.index.insert(path, id);
        id
    }

    /// Install a new version of a file and mark it for writing.
    pub fn replace(&mut self, file: ParsedFile) -> FileId {
        let path = file.path().to_path_buf();
        let id = self.insert(file);
        self.dirty.insert(path);
        id
    }

    /// Drop a file from the set; it is deleted from disk on flush.
    pub fn remove(&mut self, path: &Path) -> Option<&ParsedFile> {
        let id = self.index.shift_remove(path)?;
        self.dirty.shift_remove(path);
        self.removed.insert(path.to_path_buf(), id);
        self.arena.get(id.0)
    }

    pub fn get(&self, path: &Path) -> Option<&ParsedFile> {
        self.index.get(path).and_then(|id| self.arena.get(id.0))
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.index.contains_key(path)
    }

    /// Whether `path` was dropped and is pending deletion.
    pub fn is_removed(&self, path: &Path) -> bool {
        self.removed.contains_key(path)
    }

    /// Current files in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &ParsedFile> + '_ {
        self.index.values().filter_map(|id| self.arena.get(id.0))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Whether any file changed or was removed since the last flush.
    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty() || !self.removed.is_empty()
    }

    pub(crate) fn take_dirty(&mut self) -> Vec<PathBuf> {
        self.dirty.drain(..).collect()
    }

    pub(crate) fn take_removed(&mut self) -> Vec<PathBuf> {
        self.removed.drain(..).map(|(path, _)| path).collect()
    }
}
