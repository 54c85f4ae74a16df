//! High-level IR — the resolution engine.
//!
//! Consumes per-file [`FileIndex`] bundles, keeps the cross-file registries
//! and answers "what does this name refer to here".
//!
//! Module map, leaves first:
//!
//! - [`ids`], [`symbols`], [`input`]: the data model handed over by the indexer
//! - [`definitions`], [`exports`], [`imports`], [`types`]: per-file registries
//! - [`export_chain`]: following imports through re-exports
//! - [`resolve`], [`cache`]: per-scope resolver tables and memoization
//! - [`members`]: `obj.member` through type bindings
//! - [`diagnostics`]: reporting what does not resolve

pub mod cache;
pub mod definitions;
pub mod diagnostics;
pub mod error;
pub mod export_chain;
pub mod exports;
pub mod ids;
pub mod imports;
pub mod input;
pub mod members;
pub mod module_path;
pub mod resolve;
pub mod source;
pub mod symbols;
pub mod types;

pub use cache::{CacheStats, ResolutionCache};
pub use definitions::DefinitionRegistry;
pub use diagnostics::{check_file, codes, Diagnostic, DiagnosticCollector, RelatedInfo, SemanticChecker, Severity};
pub use error::{IndexError, ResolveError, ResolveResult};
pub use export_chain::{ExportChainResolver, ExportTarget, ResolveContext, DEFAULT_MAX_CHAIN_DEPTH};
pub use exports::ExportRegistry;
pub use ids::{DefKind, ScopeId, ScopeKind, SymbolId, SymbolName};
pub use imports::ImportGraph;
pub use input::{FileIndex, FileIndexBuilder};
pub use members::MemberResolver;
pub use module_path::{ModuleResolver, PathModuleResolver};
pub use resolve::{build_file_resolvers, ScopeResolverIndex, ScopeResolvers, SymbolResolver};
pub use source::FileSet;
pub use symbols::{
    Definition, DefinitionKind, ExportInfo, ImportKind, ImportSpec, Reference, ReferenceKind, Scope,
    TypeBinding, TypeMembers, TypeOrigin,
};
pub use types::{Supertypes, TypeRegistry};
