//! File set management — the canonical path ↔ [`FileId`] mapping.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::base::{FileId, Language};

/// Manages the mapping between file paths and FileIds.
///
/// Assigns stable ids to paths and remembers each file's language. Ids are
/// never reused: a removed path that is registered again gets a fresh id.
#[derive(Debug, Default)]
pub struct FileSet {
    inner: RwLock<FileSetInner>,
}

#[derive(Debug, Default)]
struct FileSetInner {
    /// Path → FileId mapping
    path_to_id: IndexMap<PathBuf, FileId>,
    /// FileId → Path mapping (reverse lookup)
    id_to_path: IndexMap<FileId, PathBuf>,
    languages: IndexMap<FileId, Language>,
    /// Next FileId to assign
    next_id: u32,
}

impl FileSet {
    /// Create a new empty file set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a FileId for a path.
    ///
    /// The language is taken from `language` when given, else detected from
    /// the extension.
    pub fn file_id(&self, path: &Path, language: Option<Language>) -> FileId {
        // Fast path: read lock
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.path_to_id.get(path) {
                return id;
            }
        }

        // Slow path: write lock
        let mut inner = self.inner.write();

        // Double-check
        if let Some(&id) = inner.path_to_id.get(path) {
            return id;
        }

        let id = FileId::new(inner.next_id);
        inner.next_id += 1;
        inner.path_to_id.insert(path.to_owned(), id);
        inner.id_to_path.insert(id, path.to_owned());
        if let Some(language) = language.or_else(|| Language::from_path(path)) {
            inner.languages.insert(id, language);
        }
        id
    }

    /// Look up the FileId of a known path without registering it.
    pub fn lookup(&self, path: &Path) -> Option<FileId> {
        self.inner.read().path_to_id.get(path).copied()
    }

    /// Get the path for a FileId.
    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.inner.read().id_to_path.get(&file).cloned()
    }

    /// Get the language of a file.
    pub fn language(&self, file: FileId) -> Option<Language> {
        self.inner.read().languages.get(&file).copied()
    }

    /// Record or correct the language of a registered file.
    pub fn set_language(&self, file: FileId, language: Language) {
        let mut inner = self.inner.write();
        if inner.id_to_path.contains_key(&file) {
            inner.languages.insert(file, language);
        }
    }

    /// Remove a file from the set.
    pub fn remove(&self, file: FileId) {
        let mut inner = self.inner.write();
        if let Some(path) = inner.id_to_path.swap_remove(&file) {
            inner.path_to_id.swap_remove(&path);
        }
        inner.languages.swap_remove(&file);
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.inner.read().path_to_id.len()
    }

    /// Check if the file set is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over all file IDs.
    pub fn files(&self) -> Vec<FileId> {
        self.inner.read().id_to_path.keys().copied().collect()
    }

    /// Find registered files whose path ends with `suffix` (component-wise).
    pub fn find_by_suffix(&self, suffix: &Path) -> Vec<FileId> {
        self.inner
            .read()
            .id_to_path
            .iter()
            .filter(|(_, path)| path.ends_with(suffix))
            .map(|(&id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_set_id_assignment() {
        let files = FileSet::new();

        let id1 = files.file_id(Path::new("/a.ts"), None);
        let id2 = files.file_id(Path::new("/b.ts"), None);
        let id3 = files.file_id(Path::new("/a.ts"), None); // same as id1

        assert_ne!(id1, id2);
        assert_eq!(id1, id3); // stable ID for same path
    }

    #[test]
    fn test_file_set_language_detection() {
        let files = FileSet::new();
        let py = files.file_id(Path::new("/pkg/mod.py"), None);
        let forced = files.file_id(Path::new("/weird.txt"), Some(Language::Rust));
        let unknown = files.file_id(Path::new("/notes.txt"), None);

        assert_eq!(files.language(py), Some(Language::Python));
        assert_eq!(files.language(forced), Some(Language::Rust));
        assert_eq!(files.language(unknown), None);
    }

    #[test]
    fn test_file_set_path_lookup() {
        let files = FileSet::new();
        let path = Path::new("/test.ts");
        let id = files.file_id(path, None);

        assert_eq!(files.path(id).as_deref(), Some(path));
        assert_eq!(files.lookup(path), Some(id));
        assert_eq!(files.lookup(Path::new("/other.ts")), None);
    }

    #[test]
    fn test_file_set_remove() {
        let files = FileSet::new();
        let id = files.file_id(Path::new("/gone.ts"), None);
        files.remove(id);

        assert!(files.is_empty());
        assert_eq!(files.language(id), None);
        // Ids are not reused.
        let fresh = files.file_id(Path::new("/gone.ts"), None);
        assert_ne!(fresh, id);
    }

    #[test]
    fn test_find_by_suffix() {
        let files = FileSet::new();
        let a = files.file_id(Path::new("/proj/pkg/util.py"), None);
        files.file_id(Path::new("/proj/other/helpers.py"), None);

        assert_eq!(files.find_by_suffix(Path::new("pkg/util.py")), vec![a]);
        assert!(files.find_by_suffix(Path::new("kg/util.py")).is_empty());
    }
}
