//! Export chain resolution — following imports through re-exports to the
//! definition that actually provides a name.
//!
//! ```text
//! import { core } from './middle'     (top)
//!   └─ export { core } from './base'  (middle)
//!        └─ export function core()    (base)   ← answer
//! ```
//!
//! Each hop is keyed by `(file, export)`; revisiting a key means the chain
//! loops and resolution stops with "not found" instead of recursing.

use rustc_hash::FxHashSet;

use crate::base::{FileId, Language};
use super::definitions::DefinitionRegistry;
use super::error::{ResolveError, ResolveResult};
use super::exports::ExportRegistry;
use super::ids::{SymbolId, SymbolName};
use super::module_path::ModuleResolver;
use super::source::FileSet;
use super::symbols::{Definition, ImportKind};

/// Default bound on re-export hops before a chain is abandoned.
pub const DEFAULT_MAX_CHAIN_DEPTH: usize = 64;

/// Read-only view of everything a resolution needs.
///
/// Borrowed from the host for the duration of one query; resolvers capture
/// nothing, they are evaluated against the context they are handed.
#[derive(Clone, Copy)]
pub struct ResolveContext<'a> {
    pub definitions: &'a DefinitionRegistry,
    pub exports: &'a ExportRegistry,
    pub files: &'a FileSet,
    pub module_resolver: &'a dyn ModuleResolver,
    pub max_chain_depth: usize,
}

impl<'a> ResolveContext<'a> {
    pub fn new(
        definitions: &'a DefinitionRegistry,
        exports: &'a ExportRegistry,
        files: &'a FileSet,
        module_resolver: &'a dyn ModuleResolver,
    ) -> Self {
        Self {
            definitions,
            exports,
            files,
            module_resolver,
            max_chain_depth: DEFAULT_MAX_CHAIN_DEPTH,
        }
    }

    pub fn with_max_chain_depth(mut self, depth: usize) -> Self {
        self.max_chain_depth = depth;
        self
    }

    /// The file an import or re-export's module string points at.
    pub fn resolve_source(&self, import: &Definition) -> ResolveResult<FileId> {
        let Some(spec) = import.import() else {
            return Err(ResolveError::NotANamespace {
                name: import.name.clone(),
                symbol: import.symbol_id,
            });
        };
        let importer = import.symbol_id.file;
        let language = self.files.language(importer).unwrap_or(Language::TypeScript);
        self.module_resolver
            .resolve_module_path(&spec.source, importer, language, self.files)
            .ok_or_else(|| ResolveError::UnresolvedModule {
                file: importer,
                specifier: spec.source.clone(),
                site: Some(import.location),
            })
    }
}

impl std::fmt::Debug for ResolveContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveContext")
            .field("definitions", &self.definitions.len())
            .field("exports", &self.exports.file_count())
            .field("files", &self.files.len())
            .field("max_chain_depth", &self.max_chain_depth)
            .finish()
    }
}

/// The export being asked for at one hop of a chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExportTarget {
    Named(SymbolName),
    Default,
}

impl ExportTarget {
    fn name(&self) -> SymbolName {
        match self {
            ExportTarget::Named(name) => name.clone(),
            ExportTarget::Default => SymbolName::new("default"),
        }
    }
}

/// Walks one export chain. Create a fresh resolver per query; the visited
/// set is what makes a query terminate on cyclic re-exports.
#[derive(Debug)]
pub struct ExportChainResolver<'a> {
    ctx: ResolveContext<'a>,
    visited: FxHashSet<(FileId, ExportTarget)>,
    /// Files in first-visit order.
    trail: Vec<FileId>,
}

impl<'a> ExportChainResolver<'a> {
    pub fn new(ctx: ResolveContext<'a>) -> Self {
        Self {
            ctx,
            visited: FxHashSet::default(),
            trail: Vec::new(),
        }
    }

    /// Distinct files consulted so far, in visit order.
    pub fn files_visited(&self) -> &[FileId] {
        &self.trail
    }

    /// Resolve an import binding to the symbol it ultimately denotes.
    ///
    /// Namespace imports denote themselves: members are looked up through
    /// [`Self::resolve_namespace_member`]. A wildcard import has no single
    /// target and yields `None`.
    pub fn resolve_import(&mut self, import: &Definition) -> ResolveResult<Option<SymbolId>> {
        let Some(spec) = import.import() else {
            return Ok(Some(import.symbol_id));
        };
        let target = match &spec.kind {
            ImportKind::Namespace => return Ok(Some(import.symbol_id)),
            ImportKind::Wildcard => return Ok(None),
            ImportKind::Named(name) => ExportTarget::Named(name.clone()),
            ImportKind::Default => ExportTarget::Default,
        };
        let source = self.ctx.resolve_source(import)?;
        tracing::trace!(import = %import.name, source = %source, "following import");
        self.resolve_export_chain(source, &target, 0)
            .map_err(|e| e.or_site(import.location))
    }

    /// Look `name` up through a wildcard import (`from m import *`).
    ///
    /// A module that does not export `name` is a plain miss here, so the
    /// name can fall through to the next wildcard or to "not found".
    pub fn resolve_through_wildcard(
        &mut self,
        import: &Definition,
        name: &str,
    ) -> ResolveResult<Option<SymbolId>> {
        let source = match self.ctx.resolve_source(import) {
            Ok(source) => source,
            Err(e) => {
                tracing::debug!(import = %import.name, error = %e, "wildcard source unresolved");
                return Ok(None);
            }
        };
        let target = ExportTarget::Named(SymbolName::new(name));
        Self::soften_miss(source, self.resolve_export_chain(source, &target, 0))
    }

    /// `ns.member` where `ns` is a namespace import binding.
    ///
    /// The namespace's module missing `member` is "not found"; a broken
    /// re-export behind `member` is still an error.
    pub fn resolve_namespace_member(
        &mut self,
        namespace: &Definition,
        member: &str,
    ) -> ResolveResult<Option<SymbolId>> {
        let is_namespace = namespace
            .import()
            .is_some_and(|spec| matches!(spec.kind, ImportKind::Namespace | ImportKind::Wildcard));
        if !is_namespace {
            return Err(ResolveError::NotANamespace {
                name: namespace.name.clone(),
                symbol: namespace.symbol_id,
            });
        }
        let source = self.ctx.resolve_source(namespace)?;
        let target = ExportTarget::Named(SymbolName::new(member));
        Self::soften_miss(source, self.resolve_export_chain(source, &target, 0))
    }

    /// A miss in the first module asked is not an error for lookups that
    /// probe rather than declare.
    fn soften_miss(
        source: FileId,
        result: ResolveResult<Option<SymbolId>>,
    ) -> ResolveResult<Option<SymbolId>> {
        match result {
            Err(ResolveError::ExportNotFound { file, site: None, .. }) if file == source => Ok(None),
            other => other,
        }
    }

    /// Find the definition `file` exports as `target`, following
    /// re-exports.
    ///
    /// Returns `Ok(None)` on a cycle or when the depth bound is hit, and
    /// `ExportNotFound` when `file` simply lacks the export.
    pub fn resolve_export_chain(
        &mut self,
        file: FileId,
        target: &ExportTarget,
        depth: usize,
    ) -> ResolveResult<Option<SymbolId>> {
        if depth > self.ctx.max_chain_depth {
            tracing::warn!(file = %file, depth, "export chain too deep, giving up");
            return Ok(None);
        }
        if !self.visited.insert((file, target.clone())) {
            tracing::debug!(file = %file, export = %target.name(), "re-export cycle");
            return Ok(None);
        }
        if !self.trail.contains(&file) {
            self.trail.push(file);
        }

        let ctx = self.ctx;
        let found = match target {
            ExportTarget::Named(name) => ctx.exports.get_export_id(file, name),
            ExportTarget::Default => ctx.exports.get_export_id(file, "default"),
        };
        let Some(def) = found.and_then(|id| ctx.definitions.get(id)) else {
            return self.resolve_via_wildcards(file, target, depth);
        };

        let Some(spec) = def.import() else {
            tracing::trace!(file = %file, export = %target.name(), "export resolved locally");
            return Ok(Some(def.symbol_id));
        };
        let next = match &spec.kind {
            ImportKind::Namespace | ImportKind::Wildcard => return Ok(Some(def.symbol_id)),
            ImportKind::Named(name) => ExportTarget::Named(name.clone()),
            ImportKind::Default => ExportTarget::Default,
        };
        let source = ctx.resolve_source(def)?;
        self.resolve_export_chain(source, &next, depth + 1)
            .map_err(|e| e.or_site(def.location))
    }

    /// Fallback through `export * from` declarations, in order. Failures
    /// inside a wildcard branch only mean the branch does not provide the name.
    fn resolve_via_wildcards(
        &mut self,
        file: FileId,
        target: &ExportTarget,
        depth: usize,
    ) -> ResolveResult<Option<SymbolId>> {
        let not_found = || ResolveError::ExportNotFound {
            file,
            name: target.name(),
            site: None,
        };
        // `export *` never forwards the default export.
        if *target == ExportTarget::Default {
            return Err(not_found());
        }

        let ctx = self.ctx;
        for &star in ctx.exports.wildcard_reexports(file) {
            let Some(def) = ctx.definitions.get(star) else {
                continue;
            };
            let source = match ctx.resolve_source(def) {
                Ok(source) => source,
                Err(e) => {
                    tracing::debug!(file = %file, error = %e, "skipping unresolved wildcard re-export");
                    continue;
                }
            };
            match self.resolve_export_chain(source, target, depth + 1) {
                Ok(Some(id)) => return Ok(Some(id)),
                Ok(None) => continue,
                Err(e) => {
                    tracing::trace!(file = %file, error = %e, "wildcard branch does not provide export");
                    continue;
                }
            }
        }
        Err(not_found())
    }
}
