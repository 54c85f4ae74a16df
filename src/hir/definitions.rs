//! Definition registry — the authoritative `SymbolId → Definition` map.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{FileId, LineCol};
use super::ids::{ScopeId, SymbolId, SymbolName};
use super::symbols::Definition;

/// Everything one file contributed, so it can be dropped in one sweep.
#[derive(Clone, Debug, Default)]
struct FileEntry {
    symbols: Vec<SymbolId>,
    scopes: FxHashSet<ScopeId>,
}

/// Owns every registered definition, indexed by identity, by defining
/// scope and by source location.
///
/// Class, interface and enum members are registered as definitions in
/// their own right, so anything with a [`SymbolId`] is an O(1) lookup.
#[derive(Clone, Debug, Default)]
pub struct DefinitionRegistry {
    definitions: FxHashMap<SymbolId, Definition>,
    by_file: FxHashMap<FileId, FileEntry>,
    /// Lexical bindings per scope; the last definition in source order wins.
    scope_members: FxHashMap<ScopeId, IndexMap<SymbolName, SymbolId>>,
    /// Import bindings per scope, in source order.
    scope_imports: FxHashMap<ScopeId, Vec<SymbolId>>,
    by_body_scope: FxHashMap<ScopeId, SymbolId>,
    /// Definition start positions per file. Several definitions may share
    /// a start position.
    by_location: FxHashMap<FileId, BTreeMap<LineCol, Vec<SymbolId>>>,
}

impl DefinitionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every definition owned by `file` with `definitions`.
    ///
    /// Nested members are flattened into the registry. The old symbol set is
    /// dropped before the new one is inserted; callers holding `&self` never
    /// observe the intermediate state.
    pub fn update_file(&mut self, file: FileId, definitions: &[Definition]) {
        self.remove_file(file);

        let mut entry = FileEntry::default();
        let mut pending: Vec<&Definition> = definitions.iter().collect();
        let mut ordered = Vec::with_capacity(definitions.len());
        // Depth-first flattening, keeping owners ahead of their members.
        while let Some(def) = pending.pop() {
            ordered.push(def);
            if let Some(members) = def.kind.type_members() {
                pending.extend(members.members.iter().rev());
            }
        }
        ordered.sort_by_key(|def| def.location.span.start);

        for def in ordered {
            self.insert(file, def, &mut entry);
        }

        tracing::trace!(file = %file, definitions = entry.symbols.len(), "definitions updated");
        self.by_file.insert(file, entry);
    }

    fn insert(&mut self, file: FileId, def: &Definition, entry: &mut FileEntry) {
        let id = def.symbol_id;
        if def.symbol_id.file != file {
            tracing::warn!(file = %file, name = %def.name, "skipping definition owned by another file");
            return;
        }
        if self.definitions.contains_key(&id) {
            tracing::warn!(file = %file, name = %def.name, "duplicate symbol id, keeping the later definition");
        }

        let scope = def.defining_scope;
        entry.scopes.insert(scope);
        if let Some(spec) = def.import() {
            if !def.is_reexport() {
                tracing::trace!(name = %def.name, source = %spec.source, "import binding");
                self.scope_imports.entry(scope).or_default().push(id);
            }
        } else if !def.tag().is_member() {
            self.scope_members
                .entry(scope)
                .or_default()
                .insert(def.name.clone(), id);
        }

        if let Some(body) = def.body_scope {
            entry.scopes.insert(body);
            self.by_body_scope.insert(body, id);
        }

        self.by_location
            .entry(file)
            .or_default()
            .entry(def.location.span.start)
            .or_default()
            .push(id);
        entry.symbols.push(id);
        self.definitions.insert(id, def.clone());
    }

    /// Remove all definitions owned by `file`.
    pub fn remove_file(&mut self, file: FileId) {
        let Some(entry) = self.by_file.remove(&file) else {
            return;
        };
        for id in &entry.symbols {
            self.definitions.remove(id);
        }
        for scope in &entry.scopes {
            self.scope_members.remove(scope);
            self.scope_imports.remove(scope);
            self.by_body_scope.remove(scope);
        }
        self.by_location.remove(&file);
    }

    /// Look up a definition by identity.
    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Definition> {
        self.definitions.get(&id)
    }

    /// The scope that owns a definition.
    ///
    /// A direct field read on the stored definition.
    #[inline]
    pub fn get_symbol_scope(&self, id: SymbolId) -> Option<ScopeId> {
        self.definitions.get(&id).map(|def| def.defining_scope)
    }

    /// Local lexical bindings of one scope (imports and members excluded).
    pub fn get_scope_members(&self, scope: ScopeId) -> Option<&IndexMap<SymbolName, SymbolId>> {
        self.scope_members.get(&scope)
    }

    /// Import bindings declared directly in `scope`.
    pub fn get_scope_imports(&self, scope: ScopeId) -> &[SymbolId] {
        self.scope_imports.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The definition whose body introduces `scope`.
    pub fn get_by_body_scope(&self, scope: ScopeId) -> Option<&Definition> {
        self.by_body_scope
            .get(&scope)
            .and_then(|id| self.definitions.get(id))
    }

    /// The definition whose name span contains `pos`, the narrowest one
    /// when several start at the same position.
    pub fn get_by_location(&self, file: FileId, pos: LineCol) -> Option<&Definition> {
        let (_, ids) = self.by_location.get(&file)?.range(..=pos).next_back()?;
        ids.iter()
            .filter_map(|id| self.definitions.get(id))
            .filter(|def| def.location.span.contains(pos))
            .min_by_key(|def| def.location.span.end)
    }

    /// All definitions owned by a file, in source order.
    pub fn symbols_in_file(&self, file: FileId) -> Vec<&Definition> {
        self.by_file
            .get(&file)
            .map(|entry| {
                entry
                    .symbols
                    .iter()
                    .filter_map(|id| self.definitions.get(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Iterate over every registered definition.
    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    /// Get the total number of definitions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Get number of files registered.
    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
