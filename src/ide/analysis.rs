//! Analysis host — the explicitly owned project state and its query view.
//!
//! [`AnalysisHost`] owns every registry. Mutation goes through `&mut self`;
//! queries go through an [`Analysis`] snapshot borrowed from `&self`, so the
//! borrow checker serializes updates against in-flight resolutions.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::base::{FileId, LineCol};
use crate::hir::{
    check_file, CacheStats, Definition, DefinitionRegistry, Diagnostic, ExportChainResolver,
    ExportRegistry, ExportTarget, FileIndex, FileSet, ImportGraph, IndexError, MemberResolver,
    ModuleResolver, PathModuleResolver, Reference, ReferenceKind, ResolutionCache, ResolveContext,
    ResolveResult, ScopeId, ScopeResolverIndex, Severity, SymbolId, SymbolName, TypeRegistry,
    DEFAULT_MAX_CHAIN_DEPTH,
};
use super::goto::{goto_definition, GotoResult};
use super::references::{find_references, ReferenceResult};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tunables for an [`AnalysisHost`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Build per-file resolver tables on the rayon pool in batch updates.
    pub parallel_build: bool,
    /// Re-export hops followed before a chain is abandoned.
    pub max_chain_depth: usize,
    /// Severity of "cannot resolve" diagnostics.
    pub unresolved_severity: Severity,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parallel_build: true,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
            unresolved_severity: Severity::Error,
        }
    }
}

impl AnalysisConfig {
    pub fn with_parallel_build(mut self, parallel: bool) -> Self {
        self.parallel_build = parallel;
        self
    }

    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    pub fn with_unresolved_severity(mut self, severity: Severity) -> Self {
        self.unresolved_severity = severity;
        self
    }
}

// ============================================================================
// HOST
// ============================================================================

/// Owns the file set, the per-file bundles and every registry derived from
/// them.
pub struct AnalysisHost {
    config: AnalysisConfig,
    files: FileSet,
    module_resolver: Box<dyn ModuleResolver>,
    indices: IndexMap<FileId, FileIndex>,
    definitions: DefinitionRegistry,
    exports: ExportRegistry,
    graph: ImportGraph,
    types: TypeRegistry,
    resolvers: ScopeResolverIndex,
    cache: ResolutionCache,
    /// Where each import of each file mapped when it was last linked, in
    /// import order. `None` marks an import whose module did not map.
    links: FxHashMap<FileId, Vec<Option<FileId>>>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AnalysisHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisHost")
            .field("config", &self.config)
            .field("files", &self.indices.len())
            .field("definitions", &self.definitions.len())
            .field("cache", &self.cache.stats())
            .finish_non_exhaustive()
    }
}

impl AnalysisHost {
    /// Create an empty host using [`PathModuleResolver`].
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            files: FileSet::new(),
            module_resolver: Box::new(PathModuleResolver::new()),
            indices: IndexMap::new(),
            definitions: DefinitionRegistry::new(),
            exports: ExportRegistry::new(),
            graph: ImportGraph::new(),
            types: TypeRegistry::new(),
            resolvers: ScopeResolverIndex::new(),
            cache: ResolutionCache::new(),
            links: FxHashMap::default(),
        }
    }

    /// Replace the module-path collaborator.
    pub fn with_module_resolver(mut self, resolver: impl ModuleResolver + 'static) -> Self {
        self.module_resolver = Box::new(resolver);
        self
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Get or assign the id of a path. Registering paths before their
    /// bundles arrive lets imports between them resolve in any order.
    ///
    /// A new path can change where already-linked imports map (`./lib`
    /// moving from `lib/index.ts` to `lib.ts`), so every file is relinked.
    pub fn register_file(&mut self, path: impl AsRef<Path>) -> FileId {
        let path = path.as_ref();
        let known = self.files.lookup(path);
        let file = self.files.file_id(path, None);
        if known.is_none() {
            self.relink_all();
        }
        file
    }

    /// Add or replace the bundle of one file.
    ///
    /// Rejects bundles that break the scope-tree invariants. On success the
    /// file's definitions, exports, types and resolver tables are swapped in
    /// one step and every cache entry that could observe the old version,
    /// the file's own and its transitive dependents', is dropped.
    pub fn set_file(&mut self, index: FileIndex) -> Result<(), IndexError> {
        if let Err(e) = index.validate() {
            tracing::warn!(file = %index.file, error = %e, "rejecting invalid file index");
            return Err(e);
        }
        let file = index.file;
        self.files.set_language(file, index.language);

        self.definitions.update_file(file, &index.definitions);
        self.exports.update_file(file, index.exports());
        self.types.update_file(file, &index.definitions, &index.type_bindings);
        self.resolvers.update_file(&index, &self.definitions);
        self.indices.insert(file, index);

        self.relink(file);
        let dropped = self.invalidate(&[file]);
        tracing::debug!(file = %file, dropped, "file updated");
        Ok(())
    }

    /// Add or replace many bundles at once.
    ///
    /// Invalid bundles are skipped and returned; the rest are applied with
    /// one resolver build (parallel per file when configured).
    pub fn set_files(&mut self, indices: Vec<FileIndex>) -> Vec<IndexError> {
        let mut rejected = Vec::new();
        let mut accepted = Vec::with_capacity(indices.len());
        for index in indices {
            match index.validate() {
                Ok(()) => accepted.push(index),
                Err(e) => {
                    tracing::warn!(file = %index.file, error = %e, "rejecting invalid file index");
                    rejected.push(e);
                }
            }
        }

        let changed: Vec<FileId> = accepted.iter().map(|index| index.file).collect();
        for index in &accepted {
            self.files.set_language(index.file, index.language);
            self.definitions.update_file(index.file, &index.definitions);
            self.exports.update_file(index.file, index.exports());
            self.types.update_file(index.file, &index.definitions, &index.type_bindings);
        }
        {
            let batch: Vec<&FileIndex> = accepted.iter().collect();
            self.resolvers
                .update_files(&batch, &self.definitions, self.config.parallel_build);
        }
        for index in accepted {
            self.indices.insert(index.file, index);
        }

        for file in &changed {
            self.relink(*file);
        }
        let dropped = self.invalidate(&changed);
        tracing::info!(
            files = changed.len(),
            rejected = rejected.len(),
            dropped,
            "batch update applied"
        );
        rejected
    }

    /// Forget a file and its path. Returns whether it was known.
    ///
    /// Importers are relinked afterwards: their imports either map to
    /// another candidate file or stay unresolved until the path returns.
    pub fn remove_file(&mut self, file: FileId) -> bool {
        if self.indices.shift_remove(&file).is_none() {
            return false;
        }
        let mut dropped = self.invalidate(&[file]);

        self.definitions.remove_file(file);
        self.exports.remove_file(file);
        self.types.remove_file(file);
        self.resolvers.remove_file(file);
        self.graph.remove_file(file);
        self.links.remove(&file);
        self.files.remove(file);
        dropped += self.relink_all();
        tracing::debug!(file = %file, dropped, "file removed");
        true
    }

    /// Drop every file and registry. Configuration and the module-path
    /// collaborator are kept.
    pub fn reset(&mut self) {
        self.files = FileSet::new();
        self.indices.clear();
        self.definitions.clear();
        self.exports.clear();
        self.graph.clear();
        self.types.clear();
        self.resolvers.clear();
        self.cache.clear();
        self.links.clear();
        tracing::debug!("analysis host reset");
    }

    /// Recompute the import edges of `file` from its bundle. Returns
    /// whether any import now maps somewhere else.
    fn relink(&mut self, file: FileId) -> bool {
        let Some(index) = self.indices.get(&file) else {
            return false;
        };
        let links: Vec<Option<FileId>> = index
            .imports()
            .map(|(def, spec)| {
                let target = self.module_resolver.resolve_module_path(
                    &spec.source,
                    file,
                    index.language,
                    &self.files,
                );
                if target.is_none() {
                    tracing::trace!(file = %file, import = %def.name, source = %spec.source, "import not linked");
                }
                target
            })
            .collect();
        self.graph.update_file(file, links.iter().flatten().copied());
        let changed = self.links.get(&file) != Some(&links);
        self.links.insert(file, links);
        changed
    }

    /// Relink every file and drop the cache entries of files whose imports
    /// moved, along with their dependents. Returns the entries dropped.
    fn relink_all(&mut self) -> usize {
        let files: Vec<FileId> = self.indices.keys().copied().collect();
        let moved: Vec<FileId> = files.into_iter().filter(|file| self.relink(*file)).collect();
        if moved.is_empty() {
            return 0;
        }
        tracing::debug!(files = moved.len(), "import mappings changed");
        self.invalidate(&moved)
    }

    /// Files with at least one import whose module does not map to a file.
    pub fn unlinked_files(&self) -> Vec<FileId> {
        let mut files: Vec<FileId> = self
            .links
            .iter()
            .filter(|(_, links)| links.iter().any(Option::is_none))
            .map(|(file, _)| *file)
            .collect();
        files.sort();
        files
    }

    /// Drop cache entries of `changed` and everything depending on them.
    fn invalidate(&self, changed: &[FileId]) -> usize {
        let mut affected: FxHashSet<FileId> = changed.iter().copied().collect();
        for file in changed {
            affected.extend(self.graph.get_transitive_dependents(*file));
        }
        self.cache.invalidate_files(affected)
    }

    /// The bundle last set for `file`.
    pub fn file_index(&self, file: FileId) -> Option<&FileIndex> {
        self.indices.get(&file)
    }

    pub fn file_count(&self) -> usize {
        self.indices.len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Resolver evaluations so far; unchanged by cache hits.
    pub fn resolver_invocations(&self) -> u64 {
        self.resolvers.invocation_count()
    }

    /// A read-only query view of the current state.
    pub fn analysis(&self) -> Analysis<'_> {
        Analysis { host: self }
    }
}

// ============================================================================
// ANALYSIS
// ============================================================================

/// Query view over a host. Cheap to create; holds a shared borrow.
#[derive(Clone, Copy, Debug)]
pub struct Analysis<'a> {
    host: &'a AnalysisHost,
}

impl<'a> Analysis<'a> {
    fn ctx(&self) -> ResolveContext<'a> {
        let host = self.host;
        ResolveContext::new(
            &host.definitions,
            &host.exports,
            &host.files,
            host.module_resolver.as_ref(),
        )
        .with_max_chain_depth(host.config.max_chain_depth)
    }

    fn members(&self) -> MemberResolver<'a> {
        MemberResolver::new(&self.host.resolvers, &self.host.types, self.ctx(), &self.host.cache)
    }

    pub fn config(&self) -> &'a AnalysisConfig {
        &self.host.config
    }

    /// Resolve `name` as seen from `scope`.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> ResolveResult<Option<SymbolId>> {
        self.host
            .resolvers
            .resolve(scope, name, self.ctx(), &self.host.cache)
    }

    /// Resolve a reference, dispatching member accesses through their object.
    pub fn resolve_reference(&self, reference: &Reference) -> ResolveResult<Option<SymbolId>> {
        match &reference.kind {
            ReferenceKind::Member { object } => {
                self.resolve_member_access(reference.scope, object, &reference.name)
            }
            _ => self.resolve(reference.scope, &reference.name),
        }
    }

    /// `namespace.member` as seen from `scope`.
    pub fn resolve_namespace_member(
        &self,
        scope: ScopeId,
        namespace: &str,
        member: &str,
    ) -> ResolveResult<Option<SymbolId>> {
        self.host
            .resolvers
            .resolve_namespace_member(scope, namespace, member, self.ctx(), &self.host.cache)
    }

    /// What `file` exports as `name` (`"default"` for the default export),
    /// following re-exports.
    pub fn resolve_export(&self, file: FileId, name: &str) -> ResolveResult<Option<SymbolId>> {
        let target = if name == "default" {
            ExportTarget::Default
        } else {
            ExportTarget::Named(SymbolName::new(name))
        };
        ExportChainResolver::new(self.ctx()).resolve_export_chain(file, &target, 0)
    }

    /// The symbol an import binding denotes, following its export chain.
    pub fn resolve_import(&self, import: &Definition) -> ResolveResult<Option<SymbolId>> {
        ExportChainResolver::new(self.ctx()).resolve_import(import)
    }

    /// `object.member` as seen from `scope`, including `this`/`self`.
    pub fn resolve_member_access(
        &self,
        scope: ScopeId,
        object: &str,
        member: &str,
    ) -> ResolveResult<Option<SymbolId>> {
        self.members().resolve_member_access(scope, object, member)
    }

    /// The type a variable, property or parameter is bound to.
    pub fn symbol_type(&self, symbol: SymbolId) -> ResolveResult<Option<SymbolId>> {
        self.members().symbol_type(symbol)
    }

    /// `member` of a type, including inherited members.
    pub fn type_member(&self, type_id: SymbolId, member: &str) -> Option<SymbolId> {
        self.members().find_member(type_id, member)
    }

    pub fn definition(&self, symbol: SymbolId) -> Option<&'a Definition> {
        self.host.definitions.get(symbol)
    }

    pub fn symbol_scope(&self, symbol: SymbolId) -> Option<ScopeId> {
        self.host.definitions.get_symbol_scope(symbol)
    }

    /// The definition whose name span contains `pos`.
    pub fn definition_at(&self, file: FileId, pos: LineCol) -> Option<&'a Definition> {
        self.host.definitions.get_by_location(file, pos)
    }

    pub fn file_index(&self, file: FileId) -> Option<&'a FileIndex> {
        self.host.indices.get(&file)
    }

    /// Every bundle currently set, in insertion order.
    pub fn file_indices(&self) -> impl Iterator<Item = &'a FileIndex> {
        self.host.indices.values()
    }

    pub fn file_id(&self, path: &Path) -> Option<FileId> {
        self.host.files.lookup(path)
    }

    pub fn path(&self, file: FileId) -> Option<PathBuf> {
        self.host.files.path(file)
    }

    pub fn dependents(&self, file: FileId) -> Vec<FileId> {
        self.host.graph.get_dependents(file)
    }

    pub fn dependencies(&self, file: FileId) -> Vec<FileId> {
        self.host.graph.get_dependencies(file)
    }

    pub fn transitive_dependents(&self, file: FileId) -> Vec<FileId> {
        self.host.graph.get_transitive_dependents(file)
    }

    pub fn transitive_dependencies(&self, file: FileId) -> Vec<FileId> {
        self.host.graph.get_transitive_dependencies(file)
    }

    pub fn detect_cycle(&self, file: FileId) -> Vec<FileId> {
        self.host.graph.detect_cycle(file)
    }

    /// Resolution diagnostics for one file, sorted by location.
    pub fn diagnostics(&self, file: FileId) -> Vec<Diagnostic> {
        let Some(index) = self.host.indices.get(&file) else {
            return Vec::new();
        };
        check_file(
            index,
            &self.host.resolvers,
            self.ctx(),
            &self.host.cache,
            &self.host.graph,
            self.host.config.unresolved_severity,
        )
    }

    pub fn goto_definition(&self, file: FileId, pos: LineCol) -> GotoResult {
        goto_definition(self, file, pos)
    }

    pub fn find_references(&self, symbol: SymbolId, include_declaration: bool) -> ReferenceResult {
        find_references(self, symbol, include_declaration)
    }
}
