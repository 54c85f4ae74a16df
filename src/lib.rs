//! # xref-base
//!
//! Core library for scope-aware, cross-file symbol resolution.
//!
//! Per-file semantic indices (scopes, definitions, imports, exports,
//! references) come in from an external indexer; the engine answers which
//! definition a name refers to at a given scope, following imports through
//! re-export chains.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → AnalysisHost, goto-definition, find-references
//!   ↓
//! hir     → Registries, resolver tables, export chains, diagnostics
//!   ↓
//! base    → Primitives (FileId, Language, spans)
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Foundation types: FileId, Language, source positions
pub mod base;

/// High-level IR: registries and the resolution engine
pub mod hir;

/// IDE features: analysis host, goto-definition, find-references
pub mod ide;

// Re-export foundation types
pub use base::{FileId, Language, LineCol, Location, TextSpan};

// Re-export the most used engine types
pub use hir::{
    Diagnostic, FileIndex, FileIndexBuilder, ResolveError, ResolveResult, ScopeId, SymbolId,
    SymbolName,
};
pub use ide::{Analysis, AnalysisConfig, AnalysisHost};
