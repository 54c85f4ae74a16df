//! Resolution cache — memoized `(scope, name) → SymbolId` answers.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::base::FileId;
use super::ids::{ScopeId, SymbolId, SymbolName};

type ScopeEntries = FxHashMap<ScopeId, FxHashMap<SymbolName, SymbolId>>;

/// Hit/miss counters and current size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Memoizes successful resolutions, partitioned by the file owning the scope.
///
/// Only found symbols are stored: a name that does not resolve today may
/// resolve once the file it comes from is indexed. Entries are grouped by
/// file so a file update drops exactly its own entries.
///
/// Interior locking lets shared readers memoize through `&self`.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    entries: RwLock<FxHashMap<FileId, ScopeEntries>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a memoized answer, counting the hit or miss.
    pub fn get(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
        let found = self
            .entries
            .read()
            .get(&scope.file)
            .and_then(|scopes| scopes.get(&scope))
            .and_then(|names| names.get(name))
            .copied();
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Whether an entry exists, without touching the counters.
    pub fn contains(&self, scope: ScopeId, name: &str) -> bool {
        self.entries
            .read()
            .get(&scope.file)
            .and_then(|scopes| scopes.get(&scope))
            .is_some_and(|names| names.contains_key(name))
    }

    pub fn insert(&self, scope: ScopeId, name: &SymbolName, symbol: SymbolId) {
        self.entries
            .write()
            .entry(scope.file)
            .or_default()
            .entry(scope)
            .or_default()
            .insert(name.clone(), symbol);
    }

    /// Drop every entry whose scope belongs to `file`. Returns how many went.
    pub fn invalidate_file(&self, file: FileId) -> usize {
        let removed = self
            .entries
            .write()
            .remove(&file)
            .map(|scopes| scopes.values().map(|names| names.len()).sum())
            .unwrap_or(0);
        if removed > 0 {
            tracing::trace!(file = %file, removed, "cache entries invalidated");
        }
        removed
    }

    /// Invalidate several files at once.
    pub fn invalidate_files(&self, files: impl IntoIterator<Item = FileId>) -> usize {
        let mut entries = self.entries.write();
        files
            .into_iter()
            .filter_map(|file| entries.remove(&file))
            .map(|scopes| scopes.values().map(|names| names.len()).sum::<usize>())
            .sum()
    }

    /// Number of entries belonging to `file`.
    pub fn entries_for_file(&self, file: FileId) -> usize {
        self.entries
            .read()
            .get(&file)
            .map(|scopes| scopes.values().map(|names| names.len()).sum())
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .values()
            .flat_map(|scopes| scopes.values())
            .map(|names| names.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Full reset, counters included.
    pub fn clear(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}
