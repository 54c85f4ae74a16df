//! Name resolution — resolving a name in a scope to its definition.
//!
//! # Architecture
//!
//! Resolution is split between build time and query time:
//!
//! 1. **Registries** - definitions, exports and the import graph are
//!    registered per file and owned by the host
//! 2. **Resolver tables** - a pass over each file's scope tree gives every
//!    scope a map from visible name to [`SymbolResolver`], with inner
//!    bindings shadowing outer ones
//! 3. **Query-time resolution** - one table lookup, then the resolver is
//!    evaluated against a [`ResolveContext`] and the answer memoized in the
//!    [`ResolutionCache`]
//!
//! Import resolvers are never evaluated during the build, so a file can be
//! indexed before the files it imports.
//!
//! ## Key Data Structures
//!
//! - [`SymbolResolver`] - deferred answer for one name in one scope
//! - [`ScopeResolvers`] - per-scope resolver table plus wildcard imports
//! - [`ScopeResolverIndex`] - resolver tables for every registered scope

use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;
use rustc_hash::FxHashMap;

use crate::base::FileId;
use super::cache::ResolutionCache;
use super::definitions::DefinitionRegistry;
use super::error::ResolveResult;
use super::export_chain::{ExportChainResolver, ResolveContext};
use super::ids::{ScopeId, SymbolId, SymbolName};
use super::input::FileIndex;
use super::symbols::ImportKind;

// ============================================================================
// RESOLVERS
// ============================================================================

/// How a name visible in a scope is turned into a symbol.
///
/// Resolvers hold identities only; evaluation borrows the registries from
/// the [`ResolveContext`] it is given.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolResolver {
    /// A definition in this scope or an enclosing one. Evaluates to itself.
    Local(SymbolId),
    /// An import binding. Evaluation follows the export chain of its source
    /// module; namespace imports evaluate to the binding itself.
    Import(SymbolId),
}

impl SymbolResolver {
    /// The definition this resolver was created from.
    pub fn binding(self) -> SymbolId {
        match self {
            SymbolResolver::Local(id) | SymbolResolver::Import(id) => id,
        }
    }

    /// Evaluate against the current registries.
    pub fn evaluate(self, ctx: ResolveContext<'_>) -> ResolveResult<Option<SymbolId>> {
        match self {
            SymbolResolver::Local(id) => Ok(Some(id)),
            SymbolResolver::Import(binding) => match ctx.definitions.get(binding) {
                Some(def) => ExportChainResolver::new(ctx).resolve_import(def),
                None => Ok(None),
            },
        }
    }
}

/// Resolver table of one scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScopeResolvers {
    parent: Option<ScopeId>,
    names: FxHashMap<SymbolName, SymbolResolver>,
    /// Wildcard import bindings, innermost scope first. Consulted only
    /// when `names` has no entry.
    wildcards: Vec<SymbolId>,
}

impl ScopeResolvers {
    /// The enclosing scope, absent at a file root.
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn get(&self, name: &str) -> Option<SymbolResolver> {
        self.names.get(name).copied()
    }

    pub fn wildcards(&self) -> &[SymbolId] {
        &self.wildcards
    }

    /// Names with an explicit resolver, sorted.
    pub fn names(&self) -> Vec<&SymbolName> {
        let mut names: Vec<_> = self.names.keys().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.wildcards.is_empty()
    }
}

/// Build resolver tables for every scope of one file.
///
/// Walks the scope tree from the root. Each scope starts from a copy of its
/// parent's table, adds its own import bindings (module scopes only) and
/// then its own local definitions, so locals beat imports and inner scopes
/// beat outer ones.
pub fn build_file_resolvers(
    index: &FileIndex,
    definitions: &DefinitionRegistry,
) -> Vec<(ScopeId, ScopeResolvers)> {
    let mut out = Vec::with_capacity(index.scopes.len());
    let mut stack = vec![(index.root, None, ScopeResolvers::default())];

    while let Some((scope_id, parent, inherited)) = stack.pop() {
        let mut table = inherited;
        table.parent = parent;
        let mut wildcards = Vec::new();

        let imports = if scope_id.is_module() {
            definitions.get_scope_imports(scope_id)
        } else {
            &[]
        };
        for &import in imports {
            let Some(def) = definitions.get(import) else {
                continue;
            };
            match def.import().map(|spec| &spec.kind) {
                Some(ImportKind::Wildcard) => wildcards.push(import),
                Some(_) => {
                    table.names.insert(def.name.clone(), SymbolResolver::Import(import));
                }
                None => {}
            }
        }
        if let Some(members) = definitions.get_scope_members(scope_id) {
            for (name, id) in members {
                table.names.insert(name.clone(), SymbolResolver::Local(*id));
            }
        }
        if !wildcards.is_empty() {
            wildcards.extend(table.wildcards.iter().copied());
            table.wildcards = wildcards;
        }

        if let Some(scope) = index.scope(scope_id) {
            for child in scope.children.iter().rev() {
                stack.push((*child, Some(scope_id), table.clone()));
            }
        }
        out.push((scope_id, table));
    }

    tracing::trace!(file = %index.file, scopes = out.len(), "resolver tables built");
    out
}

// ============================================================================
// SCOPE RESOLVER INDEX
// ============================================================================

/// Resolver tables for every registered scope, across all files.
#[derive(Debug, Default)]
pub struct ScopeResolverIndex {
    scopes: FxHashMap<ScopeId, ScopeResolvers>,
    by_file: FxHashMap<FileId, Vec<ScopeId>>,
    /// Resolver evaluations since creation, for observing memoization.
    invocations: AtomicU64,
}

impl ScopeResolverIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build tables for a batch of files, one rayon task per file when
    /// `parallel` is set.
    pub fn build(indices: &[&FileIndex], definitions: &DefinitionRegistry, parallel: bool) -> Self {
        let mut this = Self::new();
        this.update_files(indices, definitions, parallel);
        tracing::debug!(files = indices.len(), scopes = this.scopes.len(), "scope resolver index built");
        this
    }

    /// Rebuild the tables of several files. Per-file builds are independent,
    /// so they run on the rayon pool when `parallel` is set.
    pub fn update_files(&mut self, indices: &[&FileIndex], definitions: &DefinitionRegistry, parallel: bool) {
        let per_file: Vec<(FileId, Vec<(ScopeId, ScopeResolvers)>)> = if parallel {
            indices
                .par_iter()
                .map(|index| (index.file, build_file_resolvers(index, definitions)))
                .collect()
        } else {
            indices
                .iter()
                .map(|index| (index.file, build_file_resolvers(index, definitions)))
                .collect()
        };
        for (file, tables) in per_file {
            self.remove_file(file);
            self.insert_file(file, tables);
        }
    }

    fn insert_file(&mut self, file: FileId, tables: Vec<(ScopeId, ScopeResolvers)>) {
        let mut ids = Vec::with_capacity(tables.len());
        for (scope, table) in tables {
            ids.push(scope);
            self.scopes.insert(scope, table);
        }
        self.by_file.insert(file, ids);
    }

    /// Rebuild the tables of one file.
    pub fn update_file(&mut self, index: &FileIndex, definitions: &DefinitionRegistry) {
        self.remove_file(index.file);
        let tables = build_file_resolvers(index, definitions);
        self.insert_file(index.file, tables);
    }

    pub fn remove_file(&mut self, file: FileId) {
        if let Some(ids) = self.by_file.remove(&file) {
            for id in ids {
                self.scopes.remove(&id);
            }
        }
    }

    /// The resolver table of a scope.
    pub fn resolvers(&self, scope: ScopeId) -> Option<&ScopeResolvers> {
        self.scopes.get(&scope)
    }

    /// The enclosing scope of `scope`.
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(&scope)?.parent
    }

    /// `scope` and its ancestors, innermost first.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |s| self.parent(*s))
    }

    /// The resolver for `name` in `scope`, without evaluating it.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolResolver> {
        self.scopes.get(&scope)?.get(name)
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Total resolver evaluations so far.
    pub fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::Relaxed)
    }

    pub fn clear(&mut self) {
        self.scopes.clear();
        self.by_file.clear();
    }

    fn invoke(&self, resolver: SymbolResolver, ctx: ResolveContext<'_>) -> ResolveResult<Option<SymbolId>> {
        self.invocations.fetch_add(1, Ordering::Relaxed);
        resolver.evaluate(ctx)
    }

    /// Resolve `name` as seen from `scope`.
    ///
    /// Checks the cache, then evaluates the scope's resolver for `name`,
    /// then falls back to the scope's wildcard imports in order. Found
    /// symbols are memoized; misses and errors are not.
    pub fn resolve(
        &self,
        scope: ScopeId,
        name: &str,
        ctx: ResolveContext<'_>,
        cache: &ResolutionCache,
    ) -> ResolveResult<Option<SymbolId>> {
        if let Some(hit) = cache.get(scope, name) {
            return Ok(Some(hit));
        }
        let Some(table) = self.scopes.get(&scope) else {
            tracing::trace!(?scope, name, "unknown scope");
            return Ok(None);
        };

        let result = match table.get(name) {
            Some(resolver) => self.invoke(resolver, ctx)?,
            None => self.resolve_through_wildcards(table, name, ctx)?,
        };

        if let Some(symbol) = result {
            cache.insert(scope, &SymbolName::new(name), symbol);
        } else {
            tracing::trace!(?scope, name, "name not found");
        }
        Ok(result)
    }

    fn resolve_through_wildcards(
        &self,
        table: &ScopeResolvers,
        name: &str,
        ctx: ResolveContext<'_>,
    ) -> ResolveResult<Option<SymbolId>> {
        for &binding in &table.wildcards {
            let Some(def) = ctx.definitions.get(binding) else {
                continue;
            };
            self.invocations.fetch_add(1, Ordering::Relaxed);
            if let Some(found) = ExportChainResolver::new(ctx).resolve_through_wildcard(def, name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    /// Resolve `namespace.member` as seen from `scope`.
    ///
    /// `namespace` must resolve to a namespace import binding; anything else
    /// is [`NotANamespace`](super::error::ResolveError::NotANamespace).
    pub fn resolve_namespace_member(
        &self,
        scope: ScopeId,
        namespace: &str,
        member: &str,
        ctx: ResolveContext<'_>,
        cache: &ResolutionCache,
    ) -> ResolveResult<Option<SymbolId>> {
        let Some(ns) = self.resolve(scope, namespace, ctx, cache)? else {
            return Ok(None);
        };
        let Some(def) = ctx.definitions.get(ns) else {
            return Ok(None);
        };
        ExportChainResolver::new(ctx).resolve_namespace_member(def, member)
    }
}

// ============================================================================
// TESTS
// ============================================================================
