//! Semantic identifiers for definitions, scopes and names.
//!
//! Identifiers are structured value types. The owning file, the kind and
//! the source span are fields, so nothing ever has to be recovered by
//! parsing an identifier back apart.

use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use smol_str::SmolStr;

use crate::base::{FileId, TextSpan};

/// The closed set of definition kinds.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum DefKind {
    Function,
    Class,
    Interface,
    Enum,
    TypeAlias,
    Variable,
    Import,
    Property,
    Method,
    Constructor,
}

impl DefKind {
    /// Members are only reachable through member access, never lexically.
    pub fn is_member(self) -> bool {
        matches!(self, DefKind::Property | DefKind::Method | DefKind::Constructor)
    }

    /// Kinds that own a member table in the type registry.
    pub fn is_type_like(self) -> bool {
        matches!(self, DefKind::Class | DefKind::Interface | DefKind::Enum)
    }

    /// Human readable name, used in diagnostics.
    pub fn display(self) -> &'static str {
        match self {
            DefKind::Function => "function",
            DefKind::Class => "class",
            DefKind::Interface => "interface",
            DefKind::Enum => "enum",
            DefKind::TypeAlias => "type alias",
            DefKind::Variable => "variable",
            DefKind::Import => "import",
            DefKind::Property => "property",
            DefKind::Method => "method",
            DefKind::Constructor => "constructor",
        }
    }
}

/// The kind of a lexical scope.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ScopeKind {
    Module,
    Function,
    Class,
    Block,
}

/// A globally unique identifier for a definition.
///
/// Stable for the lifetime of the definition; replaced wholesale when its
/// file is reindexed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId {
    /// The file containing this definition
    pub file: FileId,
    pub kind: DefKind,
    /// Span of the defining name
    pub span: TextSpan,
}

impl SymbolId {
    #[inline]
    pub const fn new(file: FileId, kind: DefKind, span: TextSpan) -> Self {
        Self { file, kind, span }
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({}:{:?}@{:?})", self.file.index(), self.kind, self.span)
    }
}

/// A globally unique identifier for a scope instance.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId {
    pub file: FileId,
    pub kind: ScopeKind,
    pub span: TextSpan,
}

impl ScopeId {
    #[inline]
    pub const fn new(file: FileId, kind: ScopeKind, span: TextSpan) -> Self {
        Self { file, kind, span }
    }

    /// Module-level scopes are the only ones that receive imports.
    #[inline]
    pub fn is_module(&self) -> bool {
        self.kind == ScopeKind::Module
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({}:{:?}@{:?})", self.file.index(), self.kind, self.span)
    }
}

/// A bare identifier as it appears in source. Not globally unique.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct SymbolName(SmolStr);

impl SymbolName {
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(SmolStr::new(text))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for SymbolName {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl Deref for SymbolName {
    type Target = str;

    fn deref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for SymbolName {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl fmt::Debug for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0.as_str())
    }
}

impl fmt::Display for SymbolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
