//! Diagnostics — Semantic error reporting.
//!
//! This module provides diagnostic types for resolution errors and
//! warnings. Unresolved references are reported where they are written;
//! broken exports and unresolvable modules at the declaration that names
//! them.

use std::path::Path;
use std::sync::Arc;

use crate::base::{FileId, Location};
use super::cache::ResolutionCache;
use super::error::ResolveError;
use super::export_chain::{ExportChainResolver, ResolveContext};
use super::imports::ImportGraph;
use super::input::FileIndex;
use super::resolve::ScopeResolverIndex;
use super::symbols::{Definition, ImportKind, Reference, ReferenceKind};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub location: Location,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Optional related information.
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub location: Location,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(location: Location, message: impl Into<Arc<str>>) -> Self {
        Self::new(location, Severity::Error, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(location: Location, message: impl Into<Arc<str>>) -> Self {
        Self::new(location, Severity::Warning, message)
    }

    pub fn new(location: Location, severity: Severity, message: impl Into<Arc<str>>) -> Self {
        Self {
            location,
            severity,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, location: Location, message: impl Into<Arc<str>>) -> Self {
        self.related.push(RelatedInfo {
            location,
            message: message.into(),
        });
        self
    }

    #[inline]
    pub fn file(&self) -> FileId {
        self.location.file
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for resolution errors.
pub mod codes {
    /// Reference with no binding in scope.
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    /// Declared export or re-export whose target does not exist.
    pub const BROKEN_EXPORT: &str = "E0002";
    /// Import string that maps to no known file.
    pub const UNRESOLVED_MODULE: &str = "E0003";

    /// Import cycle through the file.
    pub const CIRCULAR_IMPORT: &str = "W0001";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during semantic analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// A name that resolves to nothing.
    pub fn unresolved_reference(&mut self, location: Location, name: &str, severity: Severity) {
        self.add(
            Diagnostic::new(location, severity, format!("cannot resolve '{}'", name))
                .with_code(codes::UNRESOLVED_REFERENCE),
        );
    }

    /// A broken export chain or unresolvable module, at its declaration
    /// site when known, else at `fallback`.
    pub fn resolve_error(&mut self, error: &ResolveError, fallback: Location) {
        let location = error.site().unwrap_or(fallback);
        let code = match error {
            ResolveError::UnresolvedModule { .. } => codes::UNRESOLVED_MODULE,
            _ => codes::BROKEN_EXPORT,
        };
        self.add(Diagnostic::error(location, error.to_string()).with_code(code));
    }

    /// An import cycle, reported on the import that starts it.
    pub fn circular_import(&mut self, location: Location, cycle: &str) {
        self.add(
            Diagnostic::warning(location, format!("circular import: {}", cycle))
                .with_code(codes::CIRCULAR_IMPORT),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific file.
    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file() == file).collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }

    /// Sorted by location, with exact duplicates removed.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics.sort_by(|a, b| {
            (a.location, a.severity, &a.code, &a.message).cmp(&(b.location, b.severity, &b.code, &b.message))
        });
        self.diagnostics.dedup();
        self.diagnostics
    }
}

// ============================================================================
// SEMANTIC CHECKER
// ============================================================================

/// Checks one file's references, imports and re-exports against the
/// current resolver state.
pub struct SemanticChecker<'a> {
    index: &'a ScopeResolverIndex,
    ctx: ResolveContext<'a>,
    cache: &'a ResolutionCache,
    graph: &'a ImportGraph,
    unresolved_severity: Severity,
    collector: DiagnosticCollector,
}

impl<'a> SemanticChecker<'a> {
    /// Create a new semantic checker.
    pub fn new(
        index: &'a ScopeResolverIndex,
        ctx: ResolveContext<'a>,
        cache: &'a ResolutionCache,
        graph: &'a ImportGraph,
    ) -> Self {
        Self {
            index,
            ctx,
            cache,
            graph,
            unresolved_severity: Severity::Error,
            collector: DiagnosticCollector::new(),
        }
    }

    /// Severity used for unresolved references.
    pub fn with_unresolved_severity(mut self, severity: Severity) -> Self {
        self.unresolved_severity = severity;
        self
    }

    /// Check everything declared or referenced in a file.
    pub fn check_file(&mut self, file: &FileIndex) {
        for reference in &file.references {
            self.check_reference(reference);
        }
        for def in file.all_definitions() {
            if def.import().is_some() {
                self.check_import(def);
            } else {
                self.check_supertypes(def);
            }
        }
        self.check_cycle(file);
    }

    fn check_reference(&mut self, reference: &Reference) {
        // Member names are not lexical; the object is checked as its own reference.
        if matches!(reference.kind, ReferenceKind::Member { .. }) {
            return;
        }
        match self.index.resolve(reference.scope, &reference.name, self.ctx, self.cache) {
            Ok(Some(_)) => {}
            Ok(None) => self.collector.unresolved_reference(
                reference.location,
                &reference.name,
                self.unresolved_severity,
            ),
            Err(e) => self.collector.resolve_error(&e, reference.location),
        }
    }

    fn check_import(&mut self, def: &Definition) {
        let Some(spec) = def.import() else {
            return;
        };
        let result = match spec.kind {
            // These never follow a chain; only their module has to exist.
            ImportKind::Namespace | ImportKind::Wildcard => self.ctx.resolve_source(def).map(|_| ()),
            ImportKind::Named(_) | ImportKind::Default => ExportChainResolver::new(self.ctx)
                .resolve_import(def)
                .map(|_| ()),
        };
        if let Err(e) = result {
            tracing::trace!(import = %def.name, error = %e, "broken import");
            self.collector.resolve_error(&e, def.location);
        }
    }

    fn check_supertypes(&mut self, def: &Definition) {
        let Some(table) = def.kind.type_members() else {
            return;
        };
        for name in &table.supertypes {
            match self.index.resolve(def.defining_scope, name, self.ctx, self.cache) {
                Ok(Some(_)) => {}
                Ok(None) => {
                    self.collector
                        .unresolved_reference(def.location, name, self.unresolved_severity)
                }
                Err(e) => self.collector.resolve_error(&e, def.location),
            }
        }
    }

    fn check_cycle(&mut self, file: &FileIndex) {
        let cycle = self.graph.detect_cycle(file.file);
        if cycle.len() < 2 {
            return;
        }
        let next = cycle[1];
        let site = file
            .imports()
            .find(|(def, _)| self.ctx.resolve_source(def).ok() == Some(next))
            .map(|(def, _)| def.location);
        let Some(site) = site else {
            return;
        };
        let rendered: Vec<String> = cycle.iter().map(|f| self.display_file(*f)).collect();
        self.collector.circular_import(site, &rendered.join(" -> "));
    }

    fn display_file(&self, file: FileId) -> String {
        self.ctx
            .files
            .path(file)
            .and_then(|p| p.file_name().map(|n| Path::new(n).display().to_string()))
            .unwrap_or_else(|| file.to_string())
    }

    /// Get the collected diagnostics, sorted and deduplicated.
    pub fn finish(self) -> Vec<Diagnostic> {
        self.collector.finish()
    }
}

/// Check a file and return diagnostics.
pub fn check_file(
    file: &FileIndex,
    index: &ScopeResolverIndex,
    ctx: ResolveContext<'_>,
    cache: &ResolutionCache,
    graph: &ImportGraph,
    unresolved_severity: Severity,
) -> Vec<Diagnostic> {
    let mut checker =
        SemanticChecker::new(index, ctx, cache, graph).with_unresolved_severity(unresolved_severity);
    checker.check_file(file);
    checker.finish()
}
