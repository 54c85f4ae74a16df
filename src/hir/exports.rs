//! Export registry — what each file makes visible to importers.

use rustc_hash::FxHashMap;

use crate::base::FileId;
use super::definitions::DefinitionRegistry;
use super::ids::{SymbolId, SymbolName};
use super::symbols::{Definition, ImportKind};

#[derive(Clone, Debug, Default)]
struct FileExports {
    /// Keyed by effective export name (alias if present, else the definition name).
    named: FxHashMap<SymbolName, SymbolId>,
    default: Option<SymbolId>,
    /// `export * from '…'` re-exports, in declaration order.
    wildcard: Vec<SymbolId>,
}

/// Per-file map from externally visible export name to the exporting
/// definition.
///
/// Aliasing is resolved at registration: `export { internalName as
/// publicName }` is only reachable as `publicName`.
#[derive(Clone, Debug, Default)]
pub struct ExportRegistry {
    files: FxHashMap<FileId, FileExports>,
}

impl ExportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the exported definitions of `file`, replacing earlier ones.
    pub fn update_file<'a>(&mut self, file: FileId, exported: impl IntoIterator<Item = &'a Definition>) {
        let mut exports = FileExports::default();

        for def in exported {
            if def.symbol_id.file != file {
                continue;
            }
            let Some(name) = def.effective_export_name() else {
                continue;
            };
            let is_wildcard = def.is_reexport()
                && def.export.as_ref().is_some_and(|e| e.alias.is_none())
                && def.import().is_some_and(|spec| spec.kind == ImportKind::Wildcard);

            if is_wildcard {
                exports.wildcard.push(def.symbol_id);
            } else if def.is_default_export() {
                exports.default = Some(def.symbol_id);
            } else if let Some(previous) = exports.named.insert(name.clone(), def.symbol_id) {
                tracing::debug!(file = %file, name = %name, ?previous, "export name declared twice, keeping the later one");
            }
        }

        tracing::trace!(
            file = %file,
            named = exports.named.len(),
            wildcard = exports.wildcard.len(),
            has_default = exports.default.is_some(),
            "exports updated"
        );
        self.files.insert(file, exports);
    }

    pub fn remove_file(&mut self, file: FileId) {
        self.files.remove(&file);
    }

    /// Whether `file` has been registered (possibly with no exports).
    pub fn contains_file(&self, file: FileId) -> bool {
        self.files.contains_key(&file)
    }

    /// Symbol exported from `file` under `name`.
    ///
    /// The internal name of an aliased export is never a valid key. The
    /// name `default` addresses the default export.
    pub fn get_export_id(&self, file: FileId, name: &str) -> Option<SymbolId> {
        let exports = self.files.get(&file)?;
        match exports.named.get(name) {
            Some(id) => Some(*id),
            None if name == "default" => exports.default,
            None => None,
        }
    }

    /// Definition exported from `file` under `name`.
    pub fn get_export_by_name<'d>(
        &self,
        file: FileId,
        name: &str,
        definitions: &'d DefinitionRegistry,
    ) -> Option<&'d Definition> {
        self.get_export_id(file, name)
            .and_then(|id| definitions.get(id))
    }

    /// The default export of `file`.
    pub fn get_default_export<'d>(
        &self,
        file: FileId,
        definitions: &'d DefinitionRegistry,
    ) -> Option<&'d Definition> {
        self.files
            .get(&file)?
            .default
            .and_then(|id| definitions.get(id))
    }

    /// `export * from` re-exports of `file`, in declaration order.
    pub fn wildcard_reexports(&self, file: FileId) -> &[SymbolId] {
        self.files
            .get(&file)
            .map(|e| e.wildcard.as_slice())
            .unwrap_or(&[])
    }

    /// Names directly exported by `file`, sorted.
    pub fn exported_names(&self, file: FileId) -> Vec<&SymbolName> {
        let mut names: Vec<_> = self
            .files
            .get(&file)
            .map(|e| e.named.keys().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Language;
    use crate::hir::input::{FileIndex, FileIndexBuilder};
    use crate::hir::symbols::{ExportInfo, ImportSpec};

    fn register(index: &FileIndex) -> (DefinitionRegistry, ExportRegistry) {
        let mut defs = DefinitionRegistry::new();
        defs.update_file(index.file, &index.definitions);
        let mut exports = ExportRegistry::new();
        exports.update_file(index.file, index.exports());
        (defs, exports)
    }

    #[test]
    fn test_alias_hides_original_name() {
        let file = FileId::new(0);
        let mut b = FileIndexBuilder::new(file, Language::TypeScript);
        let root = b.root();
        let internal = b.function("internalName", root);
        b.export(internal, ExportInfo::aliased("publicName"));
        let index = b.build();
        let (defs, exports) = register(&index);

        assert_eq!(
            exports.get_export_by_name(file, "publicName", &defs).map(|d| d.symbol_id),
            Some(internal)
        );
        assert!(exports.get_export_by_name(file, "internalName", &defs).is_none());
    }

    #[test]
    fn test_default_and_wildcard_exports() {
        let file = FileId::new(0);
        let mut b = FileIndexBuilder::new(file, Language::TypeScript);
        let root = b.root();
        let main = b.function("main", root);
        b.export(main, ExportInfo::default_export());
        let star = b.reexport("*", ImportSpec::new("./all", ImportKind::Wildcard), None);
        let index = b.build();
        let (defs, exports) = register(&index);

        assert_eq!(exports.get_default_export(file, &defs).map(|d| d.symbol_id), Some(main));
        assert_eq!(exports.get_export_id(file, "default"), Some(main));
        // A default export is not importable under its own name.
        assert!(exports.get_export_id(file, "main").is_none());
        assert_eq!(exports.wildcard_reexports(file), &[star]);
    }

    #[test]
    fn test_unexported_definitions_are_invisible() {
        let file = FileId::new(0);
        let mut b = FileIndexBuilder::new(file, Language::TypeScript);
        let root = b.root();
        b.function("private", root);
        let public = b.function("public", root);
        b.export(public, ExportInfo::named());
        let index = b.build();
        let (_, exports) = register(&index);

        let names: Vec<_> = exports.exported_names(file).iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["public"]);
        assert!(exports.contains_file(file));
    }

    #[test]
    fn test_namespace_reexport_is_named() {
        let file = FileId::new(0);
        let mut b = FileIndexBuilder::new(file, Language::TypeScript);
        let ns = b.reexport("*", ImportSpec::new("./utils", ImportKind::Namespace), Some("utils"));
        let index = b.build();
        let (_, exports) = register(&index);

        assert_eq!(exports.get_export_id(file, "utils"), Some(ns));
        assert!(exports.wildcard_reexports(file).is_empty());
    }
}
