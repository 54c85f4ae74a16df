//! Import graph — file-level dependency edges in both directions.

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::FileId;

/// Bidirectional who-imports-whom graph, used to plan invalidation.
///
/// Neighbor sets keep insertion order so traversals are deterministic.
#[derive(Clone, Debug, Default)]
pub struct ImportGraph {
    /// file → files it imports
    dependencies: FxHashMap<FileId, IndexSet<FileId>>,
    /// file → files importing it
    dependents: FxHashMap<FileId, IndexSet<FileId>>,
}

impl ImportGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the outgoing edges of `file`, fixing up incoming edges on
    /// both stale and new targets.
    pub fn update_file(&mut self, file: FileId, imports: impl IntoIterator<Item = FileId>) {
        let new: IndexSet<FileId> = imports.into_iter().collect();
        let old = self.dependencies.remove(&file).unwrap_or_default();

        for stale in old.difference(&new) {
            self.unlink_dependent(*stale, file);
        }
        for target in &new {
            self.dependents.entry(*target).or_default().insert(file);
        }

        tracing::trace!(file = %file, edges = new.len(), "import edges updated");
        if !new.is_empty() {
            self.dependencies.insert(file, new);
        }
    }

    /// Drop the outgoing edges of `file`.
    ///
    /// Incoming edges stay: files that import a removed file still depend
    /// on it and must be re-resolved when it disappears or comes back.
    pub fn remove_file(&mut self, file: FileId) {
        if let Some(old) = self.dependencies.remove(&file) {
            for target in old {
                self.unlink_dependent(target, file);
            }
        }
    }

    fn unlink_dependent(&mut self, target: FileId, dependent: FileId) {
        if let Some(set) = self.dependents.get_mut(&target) {
            set.shift_remove(&dependent);
            if set.is_empty() {
                self.dependents.remove(&target);
            }
        }
    }

    /// Files that `file` imports directly.
    pub fn get_dependencies(&self, file: FileId) -> Vec<FileId> {
        self.dependencies
            .get(&file)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Files that import `file` directly.
    pub fn get_dependents(&self, file: FileId) -> Vec<FileId> {
        self.dependents
            .get(&file)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Everything that transitively imports `file`, excluding `file` itself.
    pub fn get_transitive_dependents(&self, file: FileId) -> Vec<FileId> {
        Self::reachable(&self.dependents, file)
    }

    /// Everything `file` transitively imports, excluding `file` itself.
    pub fn get_transitive_dependencies(&self, file: FileId) -> Vec<FileId> {
        Self::reachable(&self.dependencies, file)
    }

    /// Cycle-safe depth-first traversal in discovery order.
    fn reachable(edges: &FxHashMap<FileId, IndexSet<FileId>>, start: FileId) -> Vec<FileId> {
        let mut visited = FxHashSet::default();
        visited.insert(start);
        let mut out = Vec::new();
        let mut stack: Vec<FileId> = edges
            .get(&start)
            .map(|s| s.iter().rev().copied().collect())
            .unwrap_or_default();

        while let Some(file) = stack.pop() {
            if !visited.insert(file) {
                continue;
            }
            out.push(file);
            if let Some(next) = edges.get(&file) {
                stack.extend(next.iter().rev().copied().filter(|f| !visited.contains(f)));
            }
        }
        out
    }

    /// A witness import cycle through `file`, as a closed path
    /// `[file, …, file]`, or empty when `file` is not on a cycle.
    pub fn detect_cycle(&self, file: FileId) -> Vec<FileId> {
        let mut path = vec![file];
        let mut visited = FxHashSet::default();
        visited.insert(file);
        if self.find_path_back(file, file, &mut path, &mut visited) {
            path
        } else {
            Vec::new()
        }
    }

    fn find_path_back(
        &self,
        current: FileId,
        target: FileId,
        path: &mut Vec<FileId>,
        visited: &mut FxHashSet<FileId>,
    ) -> bool {
        let Some(next) = self.dependencies.get(&current) else {
            return false;
        };
        for &dep in next {
            if dep == target {
                path.push(target);
                return true;
            }
            if visited.insert(dep) {
                path.push(dep);
                if self.find_path_back(dep, target, path, visited) {
                    return true;
                }
                path.pop();
            }
        }
        false
    }

    /// Number of files with outgoing edges.
    pub fn len(&self) -> usize {
        self.dependencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn clear(&mut self) {
        self.dependencies.clear();
        self.dependents.clear();
    }
}
