//! IDE features — high-level APIs over the resolution engine.
//!
//! This module is the interface between the registries in [`crate::hir`]
//! and an editor integration. Each function corresponds to one request.
//!
//! ## Design Principles
//!
//! 1. **Explicit ownership**: all state lives in an [`AnalysisHost`]
//! 2. **No protocol types**: results use our own types, converted at the boundary
//! 3. **Composable**: built on top of HIR queries
//!
//! ## Usage
//!
//! ```
//! use xref::base::Language;
//! use xref::hir::{ExportInfo, FileIndexBuilder, ImportSpec};
//! use xref::ide::AnalysisHost;
//!
//! let mut host = AnalysisHost::new();
//! let lib = host.register_file("/app/lib.ts");
//! let main = host.register_file("/app/main.ts");
//!
//! let mut b = FileIndexBuilder::new(lib, Language::TypeScript);
//! let root = b.root();
//! let helper = b.function("helper", root);
//! b.export(helper, ExportInfo::named());
//! host.set_file(b.build()).unwrap();
//!
//! let mut b = FileIndexBuilder::new(main, Language::TypeScript);
//! let root = b.root();
//! b.import("helper", ImportSpec::named("./lib", "helper"), root);
//! host.set_file(b.build()).unwrap();
//!
//! let analysis = host.analysis();
//! assert_eq!(analysis.resolve(root, "helper"), Ok(Some(helper)));
//! ```

mod analysis;
mod goto;
mod references;

pub use analysis::{Analysis, AnalysisConfig, AnalysisHost};
pub use goto::{goto_definition, GotoResult, GotoTarget};
pub use references::{find_references, ReferenceResult, ReferenceSite, SiteKind};
