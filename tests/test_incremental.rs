//! Incremental updates: invalidation scope, removal and batch loading.

use xref::base::{FileId, Language};
use xref::hir::{ExportInfo, FileIndex, FileIndexBuilder, ImportSpec, ResolveError, ScopeId, ScopeKind, SymbolId};
use xref::ide::{AnalysisConfig, AnalysisHost};

fn library(file: FileId, export: &str) -> (FileIndex, SymbolId) {
    let mut b = FileIndexBuilder::new(file, Language::TypeScript);
    let root = b.root();
    let id = b.function(export, root);
    b.export(id, ExportInfo::named());
    (b.build(), id)
}

/// A file importing `name` from `source` and using it in a function.
fn importer(file: FileId, source: &str, name: &str) -> (FileIndex, ScopeId) {
    let mut b = FileIndexBuilder::new(file, Language::TypeScript);
    let root = b.root();
    let id = b.import(name, ImportSpec::named(source, name), root);
    b.export(id, ExportInfo::named());
    let func = b.scope(root, ScopeKind::Function);
    (b.build(), func)
}

#[test]
fn test_unrelated_files_keep_their_cache() {
    let mut host = AnalysisHost::new();
    let lib = host.register_file("/w/lib.ts");
    let main = host.register_file("/w/main.ts");
    let other = host.register_file("/w/other.ts");

    let (index, _) = library(lib, "greet");
    host.set_file(index).expect("valid index");
    let (index, func) = importer(main, "./lib", "greet");
    host.set_file(index).expect("valid index");
    let (index, local) = library(other, "standalone");
    host.set_file(index).expect("valid index");
    let other_root = host.file_index(other).map(|i| i.root).expect("indexed");

    {
        let analysis = host.analysis();
        assert!(analysis.resolve(func, "greet").is_ok_and(|s| s.is_some()));
        assert_eq!(analysis.resolve(other_root, "standalone"), Ok(Some(local)));
    }
    assert_eq!(host.cache_stats().entries, 2);

    let (index, greet) = library(lib, "greet");
    host.set_file(index).expect("valid index");
    assert_eq!(host.cache_stats().entries, 1);
    assert_eq!(host.analysis().resolve(func, "greet"), Ok(Some(greet)));
}

#[test]
fn test_invalidation_is_transitive() {
    let mut host = AnalysisHost::new();
    let a = host.register_file("/w/a.ts");
    let b = host.register_file("/w/b.ts");
    let c = host.register_file("/w/c.ts");

    let (index, _) = library(a, "value");
    host.set_file(index).expect("valid index");
    let (index, b_func) = importer(b, "./a", "value");
    host.set_file(index).expect("valid index");
    let (index, c_func) = importer(c, "./b", "value");
    host.set_file(index).expect("valid index");

    {
        let analysis = host.analysis();
        assert!(analysis.resolve(b_func, "value").is_ok_and(|s| s.is_some()));
        assert!(analysis.resolve(c_func, "value").is_ok_and(|s| s.is_some()));
        assert_eq!(analysis.transitive_dependents(a).len(), 2);
    }
    assert_eq!(host.cache_stats().entries, 2);

    let (index, fresh) = library(a, "value");
    host.set_file(index).expect("valid index");
    assert_eq!(host.cache_stats().entries, 0);
    assert_eq!(host.analysis().resolve(c_func, "value"), Ok(Some(fresh)));
}

#[test]
fn test_removed_file_breaks_and_restores_imports() {
    let mut host = AnalysisHost::new();
    let lib = host.register_file("/w/lib.ts");
    let main = host.register_file("/w/main.ts");

    let (index, _) = library(lib, "greet");
    host.set_file(index).expect("valid index");
    let (index, func) = importer(main, "./lib", "greet");
    host.set_file(index).expect("valid index");
    assert!(host.analysis().resolve(func, "greet").is_ok_and(|s| s.is_some()));

    assert!(host.remove_file(lib));
    assert_eq!(host.cache_stats().entries, 0);
    assert!(matches!(
        host.analysis().resolve(func, "greet"),
        Err(ResolveError::UnresolvedModule { .. })
    ));

    let lib = host.register_file("/w/lib.ts");
    let (index, restored) = library(lib, "greet");
    host.set_file(index).expect("valid index");
    let analysis = host.analysis();
    assert_eq!(analysis.resolve(func, "greet"), Ok(Some(restored)));
    assert_eq!(analysis.dependencies(main), vec![lib]);
}

#[test]
fn test_batch_load_skips_invalid_bundles() {
    let mut host = AnalysisHost::new();
    let lib = host.register_file("/w/lib.ts");
    let main = host.register_file("/w/main.ts");
    let broken = host.register_file("/w/broken.ts");

    let (lib_index, greet) = library(lib, "greet");
    let (main_index, func) = importer(main, "./lib", "greet");
    let mut broken_index = FileIndexBuilder::new(broken, Language::TypeScript).build();
    broken_index.scopes.clear();

    // Importer first: linking does not depend on batch order.
    let rejected = host.set_files(vec![main_index, broken_index, lib_index]);
    assert_eq!(rejected.len(), 1);
    assert_eq!(host.file_count(), 2);
    assert_eq!(host.analysis().resolve(func, "greet"), Ok(Some(greet)));
}

#[test]
fn test_parallel_and_sequential_builds_agree() {
    fn load(parallel: bool) -> (AnalysisHost, Vec<ScopeId>) {
        let mut host = AnalysisHost::new()
            .with_config(AnalysisConfig::default().with_parallel_build(parallel));
        let lib = host.register_file("/w/lib.ts");
        let mut batch = vec![library(lib, "shared").0];
        let mut scopes = Vec::new();
        for i in 0..12 {
            let file = host.register_file(format!("/w/m{i}.ts"));
            let (index, func) = importer(file, "./lib", "shared");
            batch.push(index);
            scopes.push(func);
        }
        assert!(host.set_files(batch).is_empty());
        (host, scopes)
    }

    let (parallel, scopes) = load(true);
    let (sequential, same_scopes) = load(false);
    assert_eq!(scopes, same_scopes);
    for scope in scopes {
        assert_eq!(
            parallel.analysis().resolve(scope, "shared"),
            sequential.analysis().resolve(scope, "shared")
        );
    }
}

// ============================================================================
// MODULE-PATH REMAPPING
// ============================================================================

#[test]
fn test_new_path_takes_over_linked_import() {
    let mut host = AnalysisHost::new();
    let dir_index = host.register_file("/w/lib/index.ts");
    let main = host.register_file("/w/main.ts");

    let (index, from_dir) = library(dir_index, "greet");
    host.set_file(index).expect("valid index");
    let (index, func) = importer(main, "./lib", "greet");
    host.set_file(index).expect("valid index");
    assert_eq!(host.analysis().resolve(func, "greet"), Ok(Some(from_dir)));
    assert_eq!(host.cache_stats().entries, 1);

    // `./lib` now prefers `lib.ts` over `lib/index.ts`.
    let flat = host.register_file("/w/lib.ts");
    assert_eq!(host.cache_stats().entries, 0);
    assert_eq!(host.analysis().dependencies(main), vec![flat]);

    let (index, from_flat) = library(flat, "greet");
    host.set_file(index).expect("valid index");
    assert_ne!(from_flat, from_dir);
    assert_eq!(host.analysis().resolve(func, "greet"), Ok(Some(from_flat)));

    // Removing the preferred file falls back to the directory index.
    assert!(host.remove_file(flat));
    let analysis = host.analysis();
    assert_eq!(analysis.dependencies(main), vec![dir_index]);
    assert_eq!(analysis.resolve(func, "greet"), Ok(Some(from_dir)));
}

#[test]
fn test_shorter_python_module_path_takes_over() {
    fn python_library(file: FileId) -> (FileIndex, SymbolId) {
        let mut b = FileIndexBuilder::new(file, Language::Python);
        let root = b.root();
        let id = b.function("helper", root);
        b.export(id, ExportInfo::named());
        (b.build(), id)
    }

    let mut host = AnalysisHost::new();
    let nested = host.register_file("/app/pkg/vendor/utils.py");
    let main = host.register_file("/app/pkg/main.py");

    let (index, deep_helper) = python_library(nested);
    host.set_file(index).expect("valid index");

    let mut b = FileIndexBuilder::new(main, Language::Python);
    let root = b.root();
    b.import("helper", ImportSpec::named("utils", "helper"), root);
    let func = b.scope(root, ScopeKind::Function);
    host.set_file(b.build()).expect("valid index");
    assert_eq!(host.analysis().resolve(func, "helper"), Ok(Some(deep_helper)));

    // A shallower `utils.py` wins the suffix match once it is known.
    let top = host.register_file("/app/utils.py");
    let (index, top_helper) = python_library(top);
    host.set_file(index).expect("valid index");
    assert_eq!(host.analysis().resolve(func, "helper"), Ok(Some(top_helper)));
    assert_eq!(host.analysis().dependencies(main), vec![top]);

    assert!(host.remove_file(top));
    assert_eq!(host.analysis().resolve(func, "helper"), Ok(Some(deep_helper)));
}
