//! The semantic data model produced by the per-file indexer.
//!
//! Everything here is immutable once produced; a reindexed file replaces
//! its definitions and scopes wholesale.

use smol_str::SmolStr;

use crate::base::Location;
use super::ids::{DefKind, ScopeId, ScopeKind, SymbolId, SymbolName};

// ============================================================================
// DEFINITIONS
// ============================================================================

/// A named definition.
///
/// Class, interface and enum members are themselves full definitions
/// nested inside their owner's [`DefinitionKind`]; the definition registry
/// flattens them so each one is retrievable by its own [`SymbolId`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    pub symbol_id: SymbolId,
    pub name: SymbolName,
    pub location: Location,
    /// The scope in which `name` becomes visible to sibling code.
    pub defining_scope: ScopeId,
    /// The scope introduced by this definition's own body, if any.
    pub body_scope: Option<ScopeId>,
    pub export: Option<ExportInfo>,
    pub kind: DefinitionKind,
}

/// Kind-specific payload of a [`Definition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DefinitionKind {
    Function,
    Class(TypeMembers),
    Interface(TypeMembers),
    Enum(TypeMembers),
    TypeAlias,
    Variable,
    Import(ImportSpec),
    Property,
    Method,
    Constructor,
}

impl DefinitionKind {
    /// The plain kind tag.
    pub fn tag(&self) -> DefKind {
        match self {
            DefinitionKind::Function => DefKind::Function,
            DefinitionKind::Class(_) => DefKind::Class,
            DefinitionKind::Interface(_) => DefKind::Interface,
            DefinitionKind::Enum(_) => DefKind::Enum,
            DefinitionKind::TypeAlias => DefKind::TypeAlias,
            DefinitionKind::Variable => DefKind::Variable,
            DefinitionKind::Import(_) => DefKind::Import,
            DefinitionKind::Property => DefKind::Property,
            DefinitionKind::Method => DefKind::Method,
            DefinitionKind::Constructor => DefKind::Constructor,
        }
    }

    /// Member table of a class, interface or enum.
    pub fn type_members(&self) -> Option<&TypeMembers> {
        match self {
            DefinitionKind::Class(members)
            | DefinitionKind::Interface(members)
            | DefinitionKind::Enum(members) => Some(members),
            _ => None,
        }
    }
}

/// Members and declared supertypes of a class-like definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeMembers {
    /// Properties, methods and constructors, as full definitions.
    pub members: Vec<Definition>,
    /// Declared supertypes (`extends`/`implements`/base classes) by name,
    /// resolved in the owner's defining scope.
    pub supertypes: Vec<SymbolName>,
}

impl Definition {
    #[inline]
    pub fn tag(&self) -> DefKind {
        self.kind.tag()
    }

    /// The import specification, if this is an import binding.
    pub fn import(&self) -> Option<&ImportSpec> {
        match &self.kind {
            DefinitionKind::Import(spec) => Some(spec),
            _ => None,
        }
    }

    /// Whether this definition is externally visible.
    pub fn is_exported(&self) -> bool {
        self.export.is_some()
    }

    /// Re-exports are exported import bindings sourced from another module
    /// (`export { x } from './m'`). They bind nothing in local scope.
    pub fn is_reexport(&self) -> bool {
        self.export.as_ref().is_some_and(|e| e.is_reexport)
    }

    /// The name importers must use: the alias if present, else the definition name.
    pub fn effective_export_name(&self) -> Option<&SymbolName> {
        let export = self.export.as_ref()?;
        Some(export.alias.as_ref().unwrap_or(&self.name))
    }

    /// Whether this definition is its file's default export.
    pub fn is_default_export(&self) -> bool {
        self.export
            .as_ref()
            .is_some_and(|e| e.is_default || e.alias.as_ref().is_some_and(|a| a.as_str() == "default"))
    }
}

/// Export metadata attached to a definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportInfo {
    /// Externally visible name, when it differs from the definition name.
    pub alias: Option<SymbolName>,
    pub is_default: bool,
    pub is_reexport: bool,
}

impl ExportInfo {
    /// Exported under its own name.
    pub fn named() -> Self {
        Self::default()
    }

    pub fn aliased(alias: impl Into<SymbolName>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..Self::default()
        }
    }

    pub fn default_export() -> Self {
        Self {
            is_default: true,
            ..Self::default()
        }
    }

    pub fn reexport() -> Self {
        Self {
            is_reexport: true,
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<SymbolName>) -> Self {
        self.alias = Some(alias.into());
        self
    }
}

// ============================================================================
// IMPORTS
// ============================================================================

/// What an import statement asks for from its source module.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImportKind {
    /// `import { name } from 'm'`, `from m import name`, `use m::name`
    Named(SymbolName),
    /// `import x from 'm'`
    Default,
    /// `import * as ns from 'm'`, `import m`
    Namespace,
    /// `from m import *`, `use m::*`, `export * from 'm'`
    Wildcard,
}

impl ImportKind {
    pub fn label(&self) -> &str {
        match self {
            ImportKind::Named(name) => name.as_str(),
            ImportKind::Default => "default",
            ImportKind::Namespace => "*",
            ImportKind::Wildcard => "*",
        }
    }
}

/// An import specification.
///
/// The local name bound by the import is the owning definition's `name`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportSpec {
    /// Raw module string as written in source.
    pub source: SmolStr,
    pub kind: ImportKind,
}

impl ImportSpec {
    pub fn new(source: impl AsRef<str>, kind: ImportKind) -> Self {
        Self {
            source: SmolStr::new(source),
            kind,
        }
    }

    pub fn named(source: impl AsRef<str>, name: impl Into<SymbolName>) -> Self {
        Self::new(source, ImportKind::Named(name.into()))
    }
}

// ============================================================================
// SCOPES & REFERENCES
// ============================================================================

/// A lexical scope. Scopes form a strict tree per file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scope {
    pub id: ScopeId,
    /// Absent only at the file root.
    pub parent: Option<ScopeId>,
    pub children: Vec<ScopeId>,
}

impl Scope {
    #[inline]
    pub fn kind(&self) -> ScopeKind {
        self.id.kind
    }
}

/// How a name is used at a reference site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    Read,
    Write,
    Call,
    Type,
    /// `object.name` - the reference's `name` is the member.
    Member { object: SymbolName },
}

/// A use of a name inside a scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reference {
    pub name: SymbolName,
    /// Innermost scope enclosing the reference.
    pub scope: ScopeId,
    pub location: Location,
    pub kind: ReferenceKind,
}

// ============================================================================
// TYPE BINDINGS
// ============================================================================

/// Where an upstream type binding came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeOrigin {
    /// `let x: Foo`
    Annotation,
    /// `let x = new Foo()`
    Constructor,
    /// `class A { b: Foo }`
    Property,
}

/// Binds a variable, property or parameter to a type by name.
///
/// The name is resolved lazily in `scope`, like any other reference.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeBinding {
    pub symbol: SymbolId,
    pub type_name: SymbolName,
    pub scope: ScopeId,
    pub origin: TypeOrigin,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::{FileId, TextSpan};

    fn def(name: &str, export: Option<ExportInfo>) -> Definition {
        let file = FileId::new(0);
        let span = TextSpan::on_line(0, 0, name.len() as u32);
        Definition {
            symbol_id: SymbolId::new(file, DefKind::Function, span),
            name: SymbolName::new(name),
            location: Location::new(file, span),
            defining_scope: ScopeId::new(file, ScopeKind::Module, TextSpan::on_line(0, 0, 80)),
            body_scope: None,
            export,
            kind: DefinitionKind::Function,
        }
    }

    #[test]
    fn test_effective_export_name_prefers_alias() {
        let d = def("internalName", Some(ExportInfo::aliased("publicName")));
        assert_eq!(d.effective_export_name().map(|n| n.as_str()), Some("publicName"));

        let plain = def("core", Some(ExportInfo::named()));
        assert_eq!(plain.effective_export_name().map(|n| n.as_str()), Some("core"));

        let hidden = def("local", None);
        assert!(hidden.effective_export_name().is_none());
    }

    #[test]
    fn test_alias_default_is_default_export() {
        assert!(def("main", Some(ExportInfo::aliased("default"))).is_default_export());
        assert!(def("main", Some(ExportInfo::default_export())).is_default_export());
        assert!(!def("main", Some(ExportInfo::named())).is_default_export());
    }

    #[test]
    fn test_definition_kind_tag() {
        let kind = DefinitionKind::Import(ImportSpec::named("./m", "x"));
        assert_eq!(kind.tag(), DefKind::Import);
        assert!(kind.type_members().is_none());
        assert!(DefinitionKind::Class(TypeMembers::default()).type_members().is_some());
    }
}
