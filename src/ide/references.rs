//! Find references — every place that resolves to a given symbol.

use rayon::prelude::*;

use crate::base::Location;
use crate::hir::{FileIndex, ImportKind, ReferenceKind, SymbolId};
use super::analysis::Analysis;

/// One use of a symbol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReferenceSite {
    pub location: Location,
    pub kind: SiteKind,
}

/// What kind of site a [`ReferenceSite`] is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SiteKind {
    /// The definition itself.
    Declaration,
    /// An import or re-export that resolves to the symbol.
    Import,
    /// A reference in code.
    Use(ReferenceKind),
}

/// Result of a find-references request, sorted by location.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReferenceResult {
    pub references: Vec<ReferenceSite>,
}

impl ReferenceResult {
    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.references.iter().map(|r| r.location)
    }
}

/// Find every reference and import of `symbol` across all files.
///
/// Files are scanned on the rayon pool when parallel builds are enabled;
/// resolution errors at individual sites are skipped.
pub fn find_references(analysis: &Analysis<'_>, symbol: SymbolId, include_declaration: bool) -> ReferenceResult {
    let files: Vec<&FileIndex> = analysis.file_indices().collect();
    let scan = |index: &&FileIndex| sites_in_file(analysis, index, symbol);
    let mut references: Vec<ReferenceSite> = if analysis.config().parallel_build {
        files.par_iter().flat_map_iter(scan).collect()
    } else {
        files.iter().flat_map(scan).collect()
    };

    if include_declaration {
        if let Some(def) = analysis.definition(symbol) {
            references.push(ReferenceSite {
                location: def.location,
                kind: SiteKind::Declaration,
            });
        }
    }
    references.sort_by_key(|r| r.location);
    references.dedup();
    tracing::trace!(?symbol, found = references.len(), "references collected");
    ReferenceResult { references }
}

fn sites_in_file(analysis: &Analysis<'_>, index: &FileIndex, symbol: SymbolId) -> Vec<ReferenceSite> {
    let mut out = Vec::new();
    for reference in &index.references {
        if let Ok(Some(found)) = analysis.resolve_reference(reference) {
            if found == symbol {
                out.push(ReferenceSite {
                    location: reference.location,
                    kind: SiteKind::Use(reference.kind.clone()),
                });
            }
        }
    }
    for (def, spec) in index.imports() {
        if matches!(spec.kind, ImportKind::Namespace | ImportKind::Wildcard) {
            continue;
        }
        if let Ok(Some(found)) = analysis.resolve_import(def) {
            if found == symbol {
                out.push(ReferenceSite {
                    location: def.location,
                    kind: SiteKind::Import,
                });
            }
        }
    }
    out
}
