//! Input types — the per-file bundle consumed from the external indexer.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::base::{FileId, Language, LineCol, Location, TextSpan};
use super::error::IndexError;
use super::ids::{DefKind, ScopeId, ScopeKind, SymbolId, SymbolName};
use super::symbols::{
    Definition, DefinitionKind, ExportInfo, ImportSpec, Reference, ReferenceKind, Scope,
    TypeBinding, TypeMembers, TypeOrigin,
};

/// The immutable semantic index of one file.
///
/// Produced by the per-file indexer (tree-sitter queries, a hand-written
/// parser, or [`FileIndexBuilder`]); the engine only consumes its shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileIndex {
    pub file: FileId,
    pub language: Language,
    pub root: ScopeId,
    /// All scopes of the file, in discovery order.
    pub scopes: IndexMap<ScopeId, Scope>,
    /// Top-level list; class-like members are nested in their owner.
    pub definitions: Vec<Definition>,
    pub references: Vec<Reference>,
    pub type_bindings: Vec<TypeBinding>,
}

impl FileIndex {
    /// Look up a scope of this file.
    pub fn scope(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(&id)
    }

    /// Import bindings and re-exports declared in this file.
    pub fn imports(&self) -> impl Iterator<Item = (&Definition, &ImportSpec)> {
        self.definitions
            .iter()
            .filter_map(|def| def.import().map(|spec| (def, spec)))
    }

    /// Externally visible definitions of this file.
    pub fn exports(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.iter().filter(|def| def.is_exported())
    }

    /// Every definition including nested members, depth first.
    pub fn all_definitions(&self) -> Vec<&Definition> {
        fn walk<'a>(defs: &'a [Definition], out: &mut Vec<&'a Definition>) {
            for def in defs {
                out.push(def);
                if let Some(members) = def.kind.type_members() {
                    walk(&members.members, out);
                }
            }
        }
        let mut out = Vec::with_capacity(self.definitions.len());
        walk(&self.definitions, &mut out);
        out
    }

    /// Check the scope-tree and ownership invariants.
    ///
    /// Every scope must belong to this file, have exactly one registered
    /// parent (except the root), agree with its parent's child list and be
    /// reachable from the root. Every definition must live in a known scope.
    pub fn validate(&self) -> Result<(), IndexError> {
        let file = self.file;
        let root = self
            .scopes
            .get(&self.root)
            .filter(|s| s.parent.is_none())
            .ok_or(IndexError::MissingRoot { file })?;

        for scope in self.scopes.values() {
            if scope.id.file != file {
                return Err(IndexError::ForeignScope {
                    file,
                    owner: scope.id.file,
                    scope: scope.id,
                });
            }
            if let Some(parent_id) = scope.parent {
                if !self.scopes.contains_key(&parent_id) {
                    return Err(IndexError::UnknownParent {
                        scope: scope.id,
                        parent: parent_id,
                    });
                }
            }
        }

        for scope in self.scopes.values() {
            if let Some(parent) = scope.parent.and_then(|p| self.scopes.get(&p)) {
                if !parent.children.contains(&scope.id) {
                    return Err(IndexError::InconsistentChild {
                        scope: parent.id,
                        child: scope.id,
                    });
                }
            }
            for child in &scope.children {
                let consistent = self
                    .scopes
                    .get(child)
                    .is_some_and(|c| c.parent == Some(scope.id));
                if !consistent {
                    return Err(IndexError::InconsistentChild {
                        scope: scope.id,
                        child: *child,
                    });
                }
            }
        }

        // Single parent per scope plus reachability rules out cycles.
        let mut seen = FxHashSet::default();
        let mut stack = vec![root.id];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            if let Some(scope) = self.scopes.get(&id) {
                stack.extend(scope.children.iter().copied());
            }
        }
        if let Some(orphan) = self.scopes.keys().find(|id| !seen.contains(*id)) {
            return Err(IndexError::Unreachable { scope: *orphan });
        }

        for def in self.all_definitions() {
            if def.symbol_id.file != file {
                return Err(IndexError::ForeignDefinition {
                    file,
                    owner: def.symbol_id.file,
                    name: def.name.clone(),
                });
            }
            if !self.scopes.contains_key(&def.defining_scope) {
                return Err(IndexError::UnknownDefiningScope {
                    name: def.name.clone(),
                    scope: def.defining_scope,
                });
            }
        }

        Ok(())
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Programmatic construction of a [`FileIndex`].
///
/// Every scope, definition and reference gets a fresh source line unless an
/// explicit span is supplied, which keeps generated identifiers unique.
#[derive(Clone, Debug)]
pub struct FileIndexBuilder {
    file: FileId,
    language: Language,
    root: ScopeId,
    scopes: IndexMap<ScopeId, Scope>,
    definitions: Vec<Definition>,
    references: Vec<Reference>,
    type_bindings: Vec<TypeBinding>,
    next_line: u32,
}

impl FileIndexBuilder {
    pub fn new(file: FileId, language: Language) -> Self {
        let root = ScopeId::new(
            file,
            ScopeKind::Module,
            TextSpan::new(LineCol::new(0, 0), LineCol::new(u32::MAX, 0)),
        );
        let mut scopes = IndexMap::new();
        scopes.insert(
            root,
            Scope {
                id: root,
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            file,
            language,
            root,
            scopes,
            definitions: Vec::new(),
            references: Vec::new(),
            type_bindings: Vec::new(),
            next_line: 1,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    /// The module scope of the file.
    pub fn root(&self) -> ScopeId {
        self.root
    }

    fn fresh_span(&mut self, len: usize) -> TextSpan {
        let line = self.next_line;
        self.next_line += 1;
        TextSpan::on_line(line, 0, len.max(1) as u32)
    }

    /// Open a child scope of `parent`.
    pub fn scope(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let span = self.fresh_span(1);
        self.scope_at(parent, kind, span)
    }

    pub fn scope_at(&mut self, parent: ScopeId, kind: ScopeKind, span: TextSpan) -> ScopeId {
        let id = ScopeId::new(self.file, kind, span);
        if let Some(p) = self.scopes.get_mut(&parent) {
            p.children.push(id);
        }
        self.scopes.insert(
            id,
            Scope {
                id,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        id
    }

    /// Add a top-level (non-member) definition.
    pub fn define(&mut self, name: &str, kind: DefinitionKind, scope: ScopeId) -> SymbolId {
        let span = self.fresh_span(name.len());
        self.define_at(name, kind, scope, span)
    }

    pub fn define_at(
        &mut self,
        name: &str,
        kind: DefinitionKind,
        scope: ScopeId,
        span: TextSpan,
    ) -> SymbolId {
        let def = self.make_definition(name, kind, scope, span);
        let id = def.symbol_id;
        self.definitions.push(def);
        id
    }

    fn make_definition(
        &self,
        name: &str,
        kind: DefinitionKind,
        scope: ScopeId,
        span: TextSpan,
    ) -> Definition {
        Definition {
            symbol_id: SymbolId::new(self.file, kind.tag(), span),
            name: SymbolName::new(name),
            location: Location::new(self.file, span),
            defining_scope: scope,
            body_scope: None,
            export: None,
            kind,
        }
    }

    pub fn function(&mut self, name: &str, scope: ScopeId) -> SymbolId {
        self.define(name, DefinitionKind::Function, scope)
    }

    pub fn variable(&mut self, name: &str, scope: ScopeId) -> SymbolId {
        self.define(name, DefinitionKind::Variable, scope)
    }

    pub fn class(&mut self, name: &str, scope: ScopeId) -> SymbolId {
        self.define(name, DefinitionKind::Class(TypeMembers::default()), scope)
    }

    pub fn interface(&mut self, name: &str, scope: ScopeId) -> SymbolId {
        self.define(name, DefinitionKind::Interface(TypeMembers::default()), scope)
    }

    /// Bind `local` in `scope` to an import from another module.
    pub fn import(&mut self, local: &str, spec: ImportSpec, scope: ScopeId) -> SymbolId {
        self.define(local, DefinitionKind::Import(spec), scope)
    }

    /// `export { name } from 'source'` / `export * from 'source'`.
    ///
    /// The re-export is recorded as an exported import binding that does
    /// not bind anything in local scope.
    pub fn reexport(&mut self, name: &str, spec: ImportSpec, alias: Option<&str>) -> SymbolId {
        let root = self.root;
        let id = self.define(name, DefinitionKind::Import(spec), root);
        let mut info = ExportInfo::reexport();
        if let Some(alias) = alias {
            info = info.with_alias(alias);
        }
        self.export(id, info);
        id
    }

    /// Mark a top-level definition as exported.
    pub fn export(&mut self, symbol: SymbolId, info: ExportInfo) -> &mut Self {
        if let Some(def) = self.definitions.iter_mut().find(|d| d.symbol_id == symbol) {
            def.export = Some(info);
        }
        self
    }

    /// Record the scope a definition's body introduces.
    pub fn body(&mut self, symbol: SymbolId, scope: ScopeId) -> &mut Self {
        if let Some(def) = self.definitions.iter_mut().find(|d| d.symbol_id == symbol) {
            def.body_scope = Some(scope);
        }
        self
    }

    /// Add a property, method or constructor to a class-like definition.
    ///
    /// The member's defining scope is the owner's body scope when one has
    /// been recorded, else the owner's own defining scope.
    pub fn member(&mut self, owner: SymbolId, name: &str, kind: DefKind) -> Option<SymbolId> {
        let member_kind = match kind {
            DefKind::Property => DefinitionKind::Property,
            DefKind::Method => DefinitionKind::Method,
            DefKind::Constructor => DefinitionKind::Constructor,
            _ => return None,
        };
        let span = self.fresh_span(name.len());
        let idx = self.definitions.iter().position(|d| d.symbol_id == owner)?;
        let owner_def = &self.definitions[idx];
        let scope = owner_def.body_scope.unwrap_or(owner_def.defining_scope);
        let member = self.make_definition(name, member_kind, scope, span);
        let id = member.symbol_id;
        match &mut self.definitions[idx].kind {
            DefinitionKind::Class(members)
            | DefinitionKind::Interface(members)
            | DefinitionKind::Enum(members) => members.members.push(member),
            _ => return None,
        }
        Some(id)
    }

    /// Declare a supertype of a class-like definition.
    pub fn extends(&mut self, owner: SymbolId, supertype: &str) -> &mut Self {
        if let Some(def) = self.definitions.iter_mut().find(|d| d.symbol_id == owner) {
            match &mut def.kind {
                DefinitionKind::Class(members)
                | DefinitionKind::Interface(members)
                | DefinitionKind::Enum(members) => members.supertypes.push(SymbolName::new(supertype)),
                _ => {}
            }
        }
        self
    }

    /// Record a reference and return its location.
    pub fn reference(&mut self, name: &str, scope: ScopeId, kind: ReferenceKind) -> Location {
        let span = self.fresh_span(name.len());
        let location = Location::new(self.file, span);
        self.references.push(Reference {
            name: SymbolName::new(name),
            scope,
            location,
            kind,
        });
        location
    }

    /// Bind `symbol` to the type named `type_name`, resolved in `scope`.
    pub fn bind_type(
        &mut self,
        symbol: SymbolId,
        type_name: &str,
        scope: ScopeId,
        origin: TypeOrigin,
    ) -> &mut Self {
        self.type_bindings.push(TypeBinding {
            symbol,
            type_name: SymbolName::new(type_name),
            scope,
            origin,
        });
        self
    }

    pub fn build(self) -> FileIndex {
        FileIndex {
            file: self.file,
            language: self.language,
            root: self.root,
            scopes: self.scopes,
            definitions: self.definitions,
            references: self.references,
            type_bindings: self.type_bindings,
        }
    }
}
