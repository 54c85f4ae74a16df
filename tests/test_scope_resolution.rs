//! Lexical scope resolution through the analysis host.
//!
//! Covers shadowing across nested scopes, the precedence of local
//! definitions over imports and memoization of resolved names.

use rstest::{fixture, rstest};
use xref::base::Language;
use xref::hir::{DefKind, ExportInfo, FileIndexBuilder, ImportKind, ImportSpec, ScopeId, ScopeKind, SymbolId};
use xref::ide::AnalysisHost;

// ============================================================================
// FIXTURES
// ============================================================================

/// `x` defined at module level, in a function and in a nested block.
struct Nested {
    host: AnalysisHost,
    scopes: [ScopeId; 4],
    defs: [SymbolId; 3],
}

#[fixture]
fn nested() -> Nested {
    let mut host = AnalysisHost::new();
    let file = host.register_file("/src/main.ts");
    let mut b = FileIndexBuilder::new(file, Language::TypeScript);
    let root = b.root();
    let module_x = b.variable("x", root);
    let func = b.scope(root, ScopeKind::Function);
    let func_x = b.variable("x", func);
    let block = b.scope(func, ScopeKind::Block);
    let block_x = b.variable("x", block);
    let sibling = b.scope(root, ScopeKind::Function);
    host.set_file(b.build()).expect("valid index");

    Nested {
        host,
        scopes: [root, func, block, sibling],
        defs: [module_x, func_x, block_x],
    }
}

// ============================================================================
// SHADOWING
// ============================================================================

#[rstest]
#[case::module(0, 0)]
#[case::function(1, 1)]
#[case::block(2, 2)]
#[case::sibling_sees_module(3, 0)]
fn test_innermost_binding_wins(nested: Nested, #[case] scope: usize, #[case] def: usize) {
    let analysis = nested.host.analysis();
    assert_eq!(
        analysis.resolve(nested.scopes[scope], "x"),
        Ok(Some(nested.defs[def]))
    );
}

#[rstest]
fn test_unknown_name_is_not_an_error(nested: Nested) {
    let analysis = nested.host.analysis();
    assert_eq!(analysis.resolve(nested.scopes[2], "y"), Ok(None));
}

#[test]
fn test_last_definition_in_a_scope_wins() {
    let mut host = AnalysisHost::new();
    let file = host.register_file("/src/main.py");
    let mut b = FileIndexBuilder::new(file, Language::Python);
    let root = b.root();
    b.function("handler", root);
    let redefined = b.function("handler", root);
    host.set_file(b.build()).expect("valid index");

    assert_eq!(host.analysis().resolve(root, "handler"), Ok(Some(redefined)));
}

#[test]
fn test_class_members_are_not_lexical() {
    let mut host = AnalysisHost::new();
    let file = host.register_file("/src/shapes.ts");
    let mut b = FileIndexBuilder::new(file, Language::TypeScript);
    let root = b.root();
    let class = b.class("Circle", root);
    let body = b.scope(root, ScopeKind::Class);
    b.body(class, body);
    let area = b.member(class, "area", DefKind::Method);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve(body, "area"), Ok(None));
    assert_eq!(analysis.resolve(body, "Circle"), Ok(Some(class)));
    assert_eq!(analysis.type_member(class, "area"), area);
}

// ============================================================================
// IMPORTS
// ============================================================================

#[test]
fn test_local_definition_shadows_import() {
    let mut host = AnalysisHost::new();
    let lib = host.register_file("/src/lib.ts");
    let main = host.register_file("/src/main.ts");

    let mut b = FileIndexBuilder::new(lib, Language::TypeScript);
    let root = b.root();
    let imported = b.function("format", root);
    b.export(imported, ExportInfo::named());
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    b.import("format", ImportSpec::named("./lib", "format"), root);
    let func = b.scope(root, ScopeKind::Function);
    let local = b.variable("format", func);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve(root, "format"), Ok(Some(imported)));
    assert_eq!(analysis.resolve(func, "format"), Ok(Some(local)));
}

#[test]
fn test_wildcard_import_has_lowest_precedence() {
    let mut host = AnalysisHost::new();
    let helpers = host.register_file("/pkg/helpers.py");
    let main = host.register_file("/pkg/main.py");

    let mut b = FileIndexBuilder::new(helpers, Language::Python);
    let root = b.root();
    let parse = b.function("parse", root);
    b.export(parse, ExportInfo::named());
    let dump = b.function("dump", root);
    b.export(dump, ExportInfo::named());
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(main, Language::Python);
    let root = b.root();
    b.import("*", ImportSpec::new(".helpers", ImportKind::Wildcard), root);
    let own_parse = b.function("parse", root);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve(root, "parse"), Ok(Some(own_parse)));
    assert_eq!(analysis.resolve(root, "dump"), Ok(Some(dump)));
    assert_eq!(analysis.resolve(root, "load"), Ok(None));
}

#[test]
fn test_resolved_names_are_memoized() {
    let mut host = AnalysisHost::new();
    let lib = host.register_file("/src/lib.ts");
    let main = host.register_file("/src/main.ts");

    let mut b = FileIndexBuilder::new(lib, Language::TypeScript);
    let root = b.root();
    let greet = b.function("greet", root);
    b.export(greet, ExportInfo::named());
    host.set_file(b.build()).expect("valid index");

    let mut b = FileIndexBuilder::new(main, Language::TypeScript);
    let root = b.root();
    b.import("greet", ImportSpec::named("./lib", "greet"), root);
    let func = b.scope(root, ScopeKind::Function);
    host.set_file(b.build()).expect("valid index");

    let analysis = host.analysis();
    assert_eq!(analysis.resolve(func, "greet"), Ok(Some(greet)));
    assert_eq!(analysis.resolve(func, "greet"), Ok(Some(greet)));

    assert_eq!(host.resolver_invocations(), 1);
    assert_eq!(host.cache_stats().hits, 1);
}
