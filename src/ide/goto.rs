//! Go to definition — from a position to the definition it denotes.

use crate::base::{FileId, LineCol, Location};
use crate::hir::{DefKind, ImportKind, ResolveError, SymbolId, SymbolName};
use super::analysis::Analysis;

/// A definition to navigate to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub symbol: SymbolId,
    pub name: SymbolName,
    pub kind: DefKind,
    pub location: Location,
}

/// Result of a goto-definition request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GotoResult {
    pub targets: Vec<GotoTarget>,
    /// Set when the name is declared but its export chain is broken.
    pub error: Option<ResolveError>,
}

impl GotoResult {
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    fn found(analysis: &Analysis<'_>, symbol: SymbolId) -> Self {
        let targets = analysis
            .definition(symbol)
            .map(|def| GotoTarget {
                symbol,
                name: def.name.clone(),
                kind: def.tag(),
                location: def.location,
            })
            .into_iter()
            .collect();
        Self {
            targets,
            error: None,
        }
    }

    fn failed(error: ResolveError) -> Self {
        Self {
            targets: Vec::new(),
            error: Some(error),
        }
    }
}

/// Find the definition for whatever is at `pos` in `file`.
///
/// A reference jumps to what it resolves to. An import declaration jumps
/// through its export chain. Any other definition is its own target.
pub fn goto_definition(analysis: &Analysis<'_>, file: FileId, pos: LineCol) -> GotoResult {
    let Some(index) = analysis.file_index(file) else {
        return GotoResult::default();
    };

    if let Some(reference) = index
        .references
        .iter()
        .find(|r| r.location.span.contains(pos))
    {
        return match analysis.resolve_reference(reference) {
            Ok(Some(symbol)) => GotoResult::found(analysis, symbol),
            Ok(None) => GotoResult::default(),
            Err(e) => GotoResult::failed(e),
        };
    }

    let Some(def) = analysis.definition_at(file, pos) else {
        return GotoResult::default();
    };
    match def.import() {
        Some(spec) if spec.kind != ImportKind::Namespace && spec.kind != ImportKind::Wildcard => {
            match analysis.resolve_import(def) {
                Ok(Some(symbol)) => GotoResult::found(analysis, symbol),
                Ok(None) => GotoResult::default(),
                Err(e) => GotoResult::failed(e),
            }
        }
        _ => GotoResult::found(analysis, def.symbol_id),
    }
}
