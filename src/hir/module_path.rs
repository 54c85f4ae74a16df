//! Module-path resolution — mapping raw import strings to files.
//!
//! The engine treats this as a collaborator: anything implementing
//! [`ModuleResolver`] can be plugged into the host. [`PathModuleResolver`] is
//! the default; it resolves purely against the paths already registered in a
//! [`FileSet`] and never touches the file system.

use std::path::{Component, Path, PathBuf};

use crate::base::{FileId, Language};
use super::source::FileSet;

/// Maps an import string, as written in `importing_file`, to a file.
///
/// Returns `None` for external packages, built-in modules and anything that
/// does not correspond to a registered file.
pub trait ModuleResolver: Send + Sync {
    fn resolve_module_path(
        &self,
        raw: &str,
        importing_file: FileId,
        language: Language,
        files: &FileSet,
    ) -> Option<FileId>;
}

impl<F> ModuleResolver for F
where
    F: Fn(&str, FileId, Language, &FileSet) -> Option<FileId> + Send + Sync,
{
    fn resolve_module_path(
        &self,
        raw: &str,
        importing_file: FileId,
        language: Language,
        files: &FileSet,
    ) -> Option<FileId> {
        self(raw, importing_file, language, files)
    }
}

/// Default path-based resolution for the supported languages.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathModuleResolver;

impl PathModuleResolver {
    pub fn new() -> Self {
        Self
    }

    fn resolve_ecmascript(
        &self,
        raw: &str,
        importer: &Path,
        language: Language,
        files: &FileSet,
    ) -> Option<FileId> {
        let base = if raw.starts_with("./") || raw.starts_with("../") || raw == "." || raw == ".." {
            importer.parent()?.join(raw)
        } else if raw.starts_with('/') {
            PathBuf::from(raw)
        } else {
            // Bare specifier: a package, handled outside this engine.
            return None;
        };
        let base = normalize(&base);

        if let Some(id) = files.lookup(&base) {
            return Some(id);
        }

        // `import './x.js'` in TypeScript sources refers to `x.ts`.
        if language == Language::TypeScript {
            if let Some(stem) = base.to_str().and_then(|s| s.strip_suffix(".js")) {
                for ext in ["ts", "tsx"] {
                    if let Some(id) = files.lookup(Path::new(&format!("{stem}.{ext}"))) {
                        return Some(id);
                    }
                }
            }
        }

        let base_str = base.to_str()?;
        for ext in language.module_extensions() {
            if let Some(id) = files.lookup(Path::new(&format!("{base_str}.{ext}"))) {
                return Some(id);
            }
        }
        for ext in language.module_extensions() {
            if let Some(id) = files.lookup(&base.join(format!("index.{ext}"))) {
                return Some(id);
            }
        }
        None
    }

    fn resolve_python(&self, raw: &str, importer: &Path, files: &FileSet) -> Option<FileId> {
        let dots = raw.chars().take_while(|&c| c == '.').count();
        let rest: Vec<&str> = raw[dots..].split('.').filter(|s| !s.is_empty()).collect();

        if dots == 0 {
            // Absolute module: match by path suffix, preferring the shortest path.
            let module: PathBuf = rest.iter().collect();
            let mut candidates = files.find_by_suffix(&module.with_extension("py"));
            candidates.extend(files.find_by_suffix(&module.join("__init__.py")));
            return candidates
                .into_iter()
                .min_by_key(|id| files.path(*id).map(|p| (p.components().count(), p)));
        }

        let mut dir = importer.parent()?.to_path_buf();
        for _ in 1..dots {
            dir = dir.parent()?.to_path_buf();
        }
        let module: PathBuf = rest.iter().fold(dir, |acc, seg| acc.join(seg));
        if rest.is_empty() {
            return files.lookup(&module.join("__init__.py"));
        }
        files
            .lookup(&module.with_extension("py"))
            .or_else(|| files.lookup(&module.join("__init__.py")))
    }

    fn resolve_rust(&self, raw: &str, importer: &Path, files: &FileSet) -> Option<FileId> {
        let segments: Vec<&str> = raw.split("::").filter(|s| !s.is_empty()).collect();
        let (first, rest) = segments.split_first()?;

        let (mut dir, mut file) = match *first {
            "crate" => rust_crate_root(importer, files)?,
            "self" => rust_module_of(importer, files)?,
            "super" => {
                let (dir, _) = rust_module_of(importer, files)?;
                rust_parent_module(&dir, files)?
            }
            _ => {
                // 2018-style path relative to the crate root.
                let (root_dir, _) = rust_crate_root(importer, files)?;
                rust_descend(&root_dir, first, files)?
            }
        };

        let mut remaining = rest.iter().peekable();
        while let Some(&&"super") = remaining.peek() {
            remaining.next();
            let parent = rust_parent_module(&dir, files)?;
            dir = parent.0;
            file = parent.1;
        }
        for segment in remaining {
            match rust_descend(&dir, segment, files) {
                Some((next_dir, next_file)) => {
                    dir = next_dir;
                    file = next_file;
                }
                // The remaining segments name items inside `file`.
                None => break,
            }
        }
        Some(file)
    }
}

impl ModuleResolver for PathModuleResolver {
    fn resolve_module_path(
        &self,
        raw: &str,
        importing_file: FileId,
        language: Language,
        files: &FileSet,
    ) -> Option<FileId> {
        let importer = files.path(importing_file)?;
        match language {
            Language::TypeScript | Language::JavaScript => {
                self.resolve_ecmascript(raw, &importer, language, files)
            }
            Language::Python => self.resolve_python(raw, &importer, files),
            Language::Rust => self.resolve_rust(raw, &importer, files),
        }
    }
}

/// Lexically normalize `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn is_rust_crate_root(path: &Path) -> bool {
    matches!(path.file_name().and_then(|n| n.to_str()), Some("lib.rs" | "main.rs"))
}

/// The nearest ancestor directory holding a registered `lib.rs`/`main.rs`.
fn rust_crate_root(importer: &Path, files: &FileSet) -> Option<(PathBuf, FileId)> {
    let mut dir = importer.parent();
    while let Some(d) = dir {
        for root in ["lib.rs", "main.rs"] {
            if let Some(id) = files.lookup(&d.join(root)) {
                return Some((d.to_path_buf(), id));
            }
        }
        dir = d.parent();
    }
    None
}

/// The directory holding a module's children, and the module's own file.
fn rust_module_of(importer: &Path, files: &FileSet) -> Option<(PathBuf, FileId)> {
    let id = files.lookup(importer)?;
    let parent = importer.parent()?;
    let is_dir_module = is_rust_crate_root(importer)
        || importer.file_name().and_then(|n| n.to_str()) == Some("mod.rs");
    if is_dir_module {
        Some((parent.to_path_buf(), id))
    } else {
        let stem = importer.file_stem()?;
        Some((parent.join(stem), id))
    }
}

/// Step from the module owning `dir/` to its parent module.
fn rust_parent_module(dir: &Path, files: &FileSet) -> Option<(PathBuf, FileId)> {
    let parent = dir.parent()?;
    let parent_file = [
        parent.join("mod.rs"),
        parent.join("lib.rs"),
        parent.join("main.rs"),
        parent.with_extension("rs"),
    ]
    .iter()
    .find_map(|p| files.lookup(p))?;
    Some((parent.to_path_buf(), parent_file))
}

fn rust_descend(dir: &Path, segment: &str, files: &FileSet) -> Option<(PathBuf, FileId)> {
    let next = dir.join(segment);
    files
        .lookup(&next.with_extension("rs"))
        .or_else(|| files.lookup(&next.join("mod.rs")))
        .map(|id| (next, id))
}
