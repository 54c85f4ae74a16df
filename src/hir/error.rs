//! Error types for index validation and export resolution.
//!
//! A name with no binding is never an error; resolution returns `Ok(None)`
//! for it. Errors are reserved for declarations that point nowhere.

use smol_str::SmolStr;
use thiserror::Error;

use crate::base::{FileId, Location};
use super::ids::{ScopeId, SymbolId, SymbolName};

/// Errors surfaced while following imports and re-exports.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// `file` was asked for an export it does not advertise.
    #[error("export '{name}' not found in {file}")]
    ExportNotFound {
        file: FileId,
        name: SymbolName,
        /// The import or re-export declaration that asked for it.
        site: Option<Location>,
    },

    /// The module-path collaborator could not map `specifier` to a file.
    #[error("cannot resolve module '{specifier}' imported from {file}")]
    UnresolvedModule {
        file: FileId,
        specifier: SmolStr,
        site: Option<Location>,
    },

    /// Member lookup through something that is not a namespace import.
    #[error("'{name}' is not a namespace")]
    NotANamespace { name: SymbolName, symbol: SymbolId },
}

impl ResolveError {
    /// Broken exports (including unresolvable modules) are reported at
    /// their declaration site.
    pub fn is_broken_export(&self) -> bool {
        matches!(
            self,
            ResolveError::ExportNotFound { .. } | ResolveError::UnresolvedModule { .. }
        )
    }

    /// The declaration site to attach a diagnostic to, if known.
    pub fn site(&self) -> Option<Location> {
        match self {
            ResolveError::ExportNotFound { site, .. } | ResolveError::UnresolvedModule { site, .. } => {
                *site
            }
            ResolveError::NotANamespace { .. } => None,
        }
    }

    /// Attach a declaration site when one is not already recorded.
    pub(crate) fn or_site(self, location: Location) -> Self {
        match self {
            ResolveError::ExportNotFound { file, name, site } => ResolveError::ExportNotFound {
                file,
                name,
                site: site.or(Some(location)),
            },
            ResolveError::UnresolvedModule { file, specifier, site } => {
                ResolveError::UnresolvedModule {
                    file,
                    specifier,
                    site: site.or(Some(location)),
                }
            }
            other => other,
        }
    }
}

/// Result type for resolution queries.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// A per-file bundle that violates the scope-tree invariants.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("{file} has no root scope registered")]
    MissingRoot { file: FileId },

    #[error("scope {scope:?} belongs to {owner}, not {file}")]
    ForeignScope {
        file: FileId,
        owner: FileId,
        scope: ScopeId,
    },

    #[error("scope {scope:?} references unknown parent {parent:?}")]
    UnknownParent { scope: ScopeId, parent: ScopeId },

    #[error("scope {scope:?} lists {child:?} as a child but the child disagrees")]
    InconsistentChild { scope: ScopeId, child: ScopeId },

    #[error("scope {scope:?} is unreachable from the file root")]
    Unreachable { scope: ScopeId },

    #[error("definition '{name}' names unknown scope {scope:?}")]
    UnknownDefiningScope { name: SymbolName, scope: ScopeId },

    #[error("definition '{name}' belongs to {owner}, not {file}")]
    ForeignDefinition {
        file: FileId,
        owner: FileId,
        name: SymbolName,
    },
}
