//! Following imports through exports, aliases and re-exports.

use rstest::rstest;
use xref::base::{FileId, Language};
use xref::hir::{ExportInfo, FileIndexBuilder, ImportKind, ImportSpec, ResolveError, SymbolId};
use xref::ide::AnalysisHost;

/// Index a file exporting one function per name.
fn exporting(host: &mut AnalysisHost, path: &str, names: &[&str]) -> (FileId, Vec<SymbolId>) {
    let file = host.register_file(path);
    let mut b = FileIndexBuilder::new(file, Language::TypeScript);
    let root = b.root();
    let ids = names
        .iter()
        .map(|name| {
            let id = b.function(name, root);
            b.export(id, ExportInfo::named());
            id
        })
        .collect();
    host.set_file(b.build()).expect("valid index");
    (file, ids)
}

#[test]
fn test_alias_hides_original_name() {
    let mut host = AnalysisHost::new();
    let lib = host.register_file("/app/lib.ts");
    let main = host.register_file("/app/main.ts");

    let mut b = FileIndexBuilder::new(lib, Language::TypeScript);
    let root = b.root();
    let helper = b.function("helper", root);
    b.export(helper, ExportInfo::aliased("h"));
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    b.import("h", ImportSpec::named("./lib", "h"), root);
    let stale = b.import("helper", ImportSpec::named("./lib", "helper"), root);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve(root, "h"), Ok(Some(helper)));
    assert_eq!(analysis.resolve_export(lib, "h"), Ok(Some(helper)));

    let err = analysis.resolve(root, "helper").expect_err("original name is hidden");
    assert!(err.is_broken_export());
    assert_eq!(err.site(), analysis.definition(stale).map(|d| d.location));
}

#[test]
fn test_reexport_chain_across_three_files() {
    let mut host = AnalysisHost::new();
    let (_, core) = exporting(&mut host, "/app/core.ts", &["render"]);
    let index = host.register_file("/app/index.ts");
    let main = host.register_file("/app/main.ts");

    let mut b = FileIndexBuilder::new(index, Language::TypeScript);
    b.reexport("render", ImportSpec::named("./core", "render"), Some("draw"));
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    b.import("draw", ImportSpec::named("./index", "draw"), root);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve(root, "draw"), Ok(Some(core[0])));
    // A re-export is not a local binding of the re-exporting file.
    let index_root = analysis.file_index(index).map(|i| i.root).expect("indexed");
    assert_eq!(analysis.resolve(index_root, "render"), Ok(None));
}

#[test]
fn test_cyclic_reexports_resolve_to_nothing() {
    let mut host = AnalysisHost::new();
    let a = host.register_file("/app/a.ts");
    let b_file = host.register_file("/app/b.ts");
    let main = host.register_file("/app/main.ts");

    let mut b = FileIndexBuilder::new(a, Language::TypeScript);
    b.reexport("x", ImportSpec::named("./b", "x"), None);
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(b_file, Language::TypeScript);
    b.reexport("x", ImportSpec::named("./a", "x"), None);
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    b.import("x", ImportSpec::named("./a", "x"), root);
    host.set_file(b.build()).expect("valid index");

    assert_eq!(host.analysis().resolve(root, "x"), Ok(None));
}

#[test]
fn test_default_export_and_default_import() {
    let mut host = AnalysisHost::new();
    let widget = host.register_file("/app/widget.ts");
    let main = host.register_file("/app/main.ts");

    let mut b = FileIndexBuilder::new(widget, Language::TypeScript);
    let root = b.root();
    let class = b.class("Widget", root);
    b.export(class, ExportInfo::default_export());
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    b.import("W", ImportSpec::new("./widget", ImportKind::Default), root);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve(root, "W"), Ok(Some(class)));
    assert_eq!(analysis.resolve_export(widget, "default"), Ok(Some(class)));
}

#[test]
fn test_star_reexport_skips_default() {
    let mut host = AnalysisHost::new();
    let lib = host.register_file("/app/lib.ts");
    let barrel = host.register_file("/app/barrel.ts");

    let mut b = FileIndexBuilder::new(lib, Language::TypeScript);
    let root = b.root();
    let named = b.function("named", root);
    b.export(named, ExportInfo::named());
    let main = b.function("main", root);
    b.export(main, ExportInfo::default_export());
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(barrel, Language::TypeScript);
    b.reexport("*", ImportSpec::new("./lib", ImportKind::Wildcard), None);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve_export(barrel, "named"), Ok(Some(named)));
    assert!(matches!(
        analysis.resolve_export(barrel, "default"),
        Err(ResolveError::ExportNotFound { file, .. }) if file == barrel
    ));
}

#[rstest]
#[case::exported_member("parse", true)]
#[case::missing_member("serialize", false)]
fn test_namespace_import_members(#[case] member: &str, #[case] found: bool) {
    let mut host = AnalysisHost::new();
    let (_, ids) = exporting(&mut host, "/app/json.ts", &["parse", "stringify"]);
    let main = host.register_file("/app/main.ts");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    let ns = b.import("json", ImportSpec::new("./json", ImportKind::Namespace), root);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    // The namespace binding denotes the import itself.
    assert_eq!(analysis.resolve(root, "json"), Ok(Some(ns)));
    let expected = found.then(|| ids[0]);
    assert_eq!(analysis.resolve_namespace_member(root, "json", member), Ok(expected));
}

#[test]
fn test_member_lookup_through_non_namespace_fails() {
    let mut host = AnalysisHost::new();
    let (_, ids) = exporting(&mut host, "/app/lib.ts", &["tool"]);
    let main = host.register_file("/app/main.ts");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    b.import("tool", ImportSpec::named("./lib", "tool"), root);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve(root, "tool"), Ok(Some(ids[0])));
    assert!(matches!(
        analysis.resolve_namespace_member(root, "tool", "run"),
        Err(ResolveError::NotANamespace { .. })
    ));
}

#[test]
fn test_unresolvable_module_is_reported() {
    let mut host = AnalysisHost::new();
    let main = host.register_file("/app/main.ts");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    b.import("x", ImportSpec::named("./nowhere", "x"), root);
    host.set_file(b.build()).expect("valid index");

    let err = host.analysis().resolve(root, "x").expect_err("module is missing");
    assert!(matches!(err, ResolveError::UnresolvedModule { ref specifier, .. } if specifier == "./nowhere"));
}
