//! Type registry — symbol→type bindings and type→member tables.
//!
//! This is a feed-in for receiver resolution (`obj.method()`,
//! `new Foo()`), not a type checker: bindings are names resolved lazily in
//! their scope, and member lookup is by name only.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::base::FileId;
use super::ids::{DefKind, ScopeId, SymbolId, SymbolName};
use super::symbols::{Definition, TypeBinding};

/// Declared supertypes of a type, with the scope to resolve them in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Supertypes {
    pub names: Vec<SymbolName>,
    pub scope: ScopeId,
}

#[derive(Clone, Debug, Default)]
struct FileTypes {
    bound: Vec<SymbolId>,
    types: Vec<SymbolId>,
}

#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    bindings: FxHashMap<SymbolId, TypeBinding>,
    members: FxHashMap<SymbolId, IndexMap<SymbolName, SymbolId>>,
    supertypes: FxHashMap<SymbolId, Supertypes>,
    by_file: FxHashMap<FileId, FileTypes>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything `file` contributed: member tables of its
    /// class-like definitions and its type bindings.
    pub fn update_file(&mut self, file: FileId, definitions: &[Definition], bindings: &[TypeBinding]) {
        self.remove_file(file);
        let mut entry = FileTypes::default();

        let mut pending: Vec<&Definition> = definitions.iter().collect();
        while let Some(def) = pending.pop() {
            let Some(table) = def.kind.type_members() else {
                continue;
            };
            let members: IndexMap<SymbolName, SymbolId> = table
                .members
                .iter()
                .map(|m| (m.name.clone(), m.symbol_id))
                .collect();
            self.members.insert(def.symbol_id, members);
            if !table.supertypes.is_empty() {
                self.supertypes.insert(
                    def.symbol_id,
                    Supertypes {
                        names: table.supertypes.clone(),
                        scope: def.defining_scope,
                    },
                );
            }
            entry.types.push(def.symbol_id);
            pending.extend(table.members.iter());
        }

        for binding in bindings {
            if binding.symbol.file != file {
                continue;
            }
            entry.bound.push(binding.symbol);
            self.bindings.insert(binding.symbol, binding.clone());
        }

        tracing::trace!(file = %file, types = entry.types.len(), bindings = entry.bound.len(), "types updated");
        self.by_file.insert(file, entry);
    }

    pub fn remove_file(&mut self, file: FileId) {
        let Some(entry) = self.by_file.remove(&file) else {
            return;
        };
        for id in entry.bound {
            self.bindings.remove(&id);
        }
        for id in entry.types {
            self.members.remove(&id);
            self.supertypes.remove(&id);
        }
    }

    /// The type a symbol is bound to, by name.
    pub fn get_type_binding(&self, symbol: SymbolId) -> Option<&TypeBinding> {
        self.bindings.get(&symbol)
    }

    /// Direct member of a type (no inheritance).
    pub fn get_type_member(&self, type_id: SymbolId, member: &str) -> Option<SymbolId> {
        self.members.get(&type_id)?.get(member).copied()
    }

    /// Full member table of a type.
    pub fn get_type_members(&self, type_id: SymbolId) -> Option<&IndexMap<SymbolName, SymbolId>> {
        self.members.get(&type_id)
    }

    /// The constructor of a type, if it declares one.
    pub fn get_constructor(&self, type_id: SymbolId) -> Option<SymbolId> {
        self.members
            .get(&type_id)?
            .values()
            .copied()
            .find(|id| id.kind == DefKind::Constructor)
    }

    pub fn get_supertypes(&self, type_id: SymbolId) -> Option<&Supertypes> {
        self.supertypes.get(&type_id)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
