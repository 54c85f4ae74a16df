//! Member access — `obj.member`, `this.member`, `ns.member`.
//!
//! The receiver is resolved like any other name, mapped to a type through
//! the [`TypeRegistry`], and the member looked up in that type's table and
//! then its declared supertypes.

use rustc_hash::FxHashSet;

use super::cache::ResolutionCache;
use super::error::ResolveResult;
use super::export_chain::{ExportChainResolver, ResolveContext};
use super::ids::{ScopeId, ScopeKind, SymbolId};
use super::resolve::ScopeResolverIndex;
use super::symbols::ImportKind;
use super::types::TypeRegistry;

/// Receiver names that denote the enclosing class instance.
const SELF_RECEIVERS: &[&str] = &["this", "self", "Self"];

/// Resolves member accesses against one consistent snapshot of the host.
#[derive(Clone, Copy, Debug)]
pub struct MemberResolver<'a> {
    pub index: &'a ScopeResolverIndex,
    pub types: &'a TypeRegistry,
    pub ctx: ResolveContext<'a>,
    pub cache: &'a ResolutionCache,
}

impl<'a> MemberResolver<'a> {
    pub fn new(
        index: &'a ScopeResolverIndex,
        types: &'a TypeRegistry,
        ctx: ResolveContext<'a>,
        cache: &'a ResolutionCache,
    ) -> Self {
        Self {
            index,
            types,
            ctx,
            cache,
        }
    }

    /// Resolve `object.member` as written in `scope`.
    pub fn resolve_member_access(
        &self,
        scope: ScopeId,
        object: &str,
        member: &str,
    ) -> ResolveResult<Option<SymbolId>> {
        if SELF_RECEIVERS.contains(&object) {
            return Ok(self
                .enclosing_type(scope)
                .and_then(|class| self.find_member(class, member)));
        }

        let Some(receiver) = self.index.resolve(scope, object, self.ctx, self.cache)? else {
            return Ok(None);
        };
        let Some(def) = self.ctx.definitions.get(receiver) else {
            return Ok(None);
        };

        if def.import().is_some_and(|spec| spec.kind == ImportKind::Namespace) {
            return ExportChainResolver::new(self.ctx).resolve_namespace_member(def, member);
        }
        let type_id = if def.tag().is_type_like() {
            receiver
        } else {
            match self.symbol_type(receiver)? {
                Some(type_id) => type_id,
                None => return Ok(None),
            }
        };
        Ok(self.find_member(type_id, member))
    }

    /// The type symbol bound to `symbol`, resolved in the binding's scope.
    pub fn symbol_type(&self, symbol: SymbolId) -> ResolveResult<Option<SymbolId>> {
        let Some(binding) = self.types.get_type_binding(symbol) else {
            return Ok(None);
        };
        self.index
            .resolve(binding.scope, &binding.type_name, self.ctx, self.cache)
    }

    /// The class-like definition whose body encloses `scope`.
    pub fn enclosing_type(&self, scope: ScopeId) -> Option<SymbolId> {
        self.index
            .ancestors(scope)
            .filter(|s| s.kind == ScopeKind::Class)
            .find_map(|s| self.ctx.definitions.get_by_body_scope(s))
            .map(|def| def.symbol_id)
    }

    /// `member` of `type_id`, searching declared supertypes depth first.
    pub fn find_member(&self, type_id: SymbolId, member: &str) -> Option<SymbolId> {
        let mut visited = FxHashSet::default();
        self.find_member_inner(type_id, member, &mut visited)
    }

    fn find_member_inner(
        &self,
        type_id: SymbolId,
        member: &str,
        visited: &mut FxHashSet<SymbolId>,
    ) -> Option<SymbolId> {
        if !visited.insert(type_id) {
            return None;
        }
        if let Some(found) = self.types.get_type_member(type_id, member) {
            return Some(found);
        }
        let supers = self.types.get_supertypes(type_id)?;
        for name in &supers.names {
            let resolved = match self.index.resolve(supers.scope, name, self.ctx, self.cache) {
                Ok(Some(id)) => id,
                Ok(None) => continue,
                Err(e) => {
                    tracing::debug!(supertype = %name, error = %e, "supertype does not resolve");
                    continue;
                }
            };
            if let Some(found) = self.find_member_inner(resolved, member, visited) {
                return Some(found);
            }
        }
        None
    }
}
