//! File identifiers and source languages.

use std::fmt;
use std::path::Path;

/// An identifier for a source file.
///
/// `FileId` is the canonical file identity used by every registry. It is a
/// plain `u32` handle; the path it stands for lives in the `FileSet`.
/// Comparisons and hashing are O(1), and ids are cheap to copy into the
/// structured symbol and scope identifiers.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FileId(pub u32);

impl FileId {
    /// Create a new FileId from a raw index.
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

impl From<u32> for FileId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A source language understood by the resolution engine.
///
/// The language only influences module-path resolution; scoping and
/// export semantics are expressed uniformly by the per-file index.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Language {
    TypeScript,
    JavaScript,
    Python,
    Rust,
}

impl Language {
    /// Detect the language from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        match ext {
            "ts" | "tsx" | "mts" | "cts" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "py" | "pyi" => Some(Language::Python),
            "rs" => Some(Language::Rust),
            _ => None,
        }
    }

    /// File extensions probed when an import omits one, in priority order.
    pub fn module_extensions(self) -> &'static [&'static str] {
        match self {
            Language::TypeScript => &["ts", "tsx", "d.ts", "js", "jsx", "mjs", "cjs"],
            Language::JavaScript => &["js", "jsx", "mjs", "cjs", "ts", "tsx"],
            Language::Python => &["py", "pyi"],
            Language::Rust => &["rs"],
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Python => "python",
            Language::Rust => "rust",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_equality() {
        let a = FileId::new(1);
        let b = FileId::new(1);
        let c = FileId::new(2);

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_file_id_display() {
        assert_eq!(FileId::new(7).to_string(), "file#7");
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(Language::from_path(Path::new("src/a.ts")), Some(Language::TypeScript));
        assert_eq!(Language::from_path(Path::new("lib/b.mjs")), Some(Language::JavaScript));
        assert_eq!(Language::from_path(Path::new("pkg/__init__.py")), Some(Language::Python));
        assert_eq!(Language::from_path(Path::new("src/main.rs")), Some(Language::Rust));
        assert_eq!(Language::from_path(Path::new("README.md")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_typescript_prefers_ts_sources() {
        let exts = Language::TypeScript.module_extensions();
        assert_eq!(exts.first(), Some(&"ts"));
    }
}
