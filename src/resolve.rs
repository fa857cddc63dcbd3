//! Type-argument resolution.
//!
//! A type variable declared on a generic entity may be bound to a concrete
//! argument far from where the variable is used: `StringList` fixes `List`'s
//! `E` to `String` through its `implements` clause, possibly several
//! inheritance hops down. [`TypeArgumentResolver`] is the policy seam for
//! finding that binding; [`DefaultArgumentResolver`] walks the supertype
//! graph from the context's declaration toward the variable's declaration,
//! substituting actual arguments for declared parameters at every hop, and
//! returns the nearest binding along the graph.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::spec::{ParameterizedSpec, TypeKind, TypeSpec, VariableSpec, WildcardSpec};
use crate::store::{DeclId, TypeStore};

/// Outcome of resolving a type variable against a context.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The variable is bound to an actual type by the context's
    /// parameterization chain.
    Bound(TypeSpec),
    /// No enclosing parameterization supplies a binding; the variable's
    /// declared bounds are all that is known.
    Unbound(Vec<TypeSpec>),
}

impl Resolution {
    pub fn is_bound(&self) -> bool {
        matches!(self, Resolution::Bound(_))
    }
}

/// Policy for mapping a type variable to its binding.
///
/// Held per engine instance behind a swappable shared reference, so
/// concurrently running engines may use different policies.
pub trait TypeArgumentResolver: fmt::Debug + Send + Sync {
    fn resolve(&self, store: &TypeStore, context: &TypeSpec, var: &VariableSpec) -> Resolution;
}

/// The stateless default resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultArgumentResolver;

impl DefaultArgumentResolver {
    /// A shared instance, since the resolver carries no state.
    pub fn shared() -> Arc<dyn TypeArgumentResolver> {
        Arc::new(DefaultArgumentResolver)
    }
}

impl TypeArgumentResolver for DefaultArgumentResolver {
    fn resolve(&self, store: &TypeStore, context: &TypeSpec, var: &VariableSpec) -> Resolution {
        let mut visited = FxHashSet::default();
        match walk(store, context, var, &mut visited) {
            Some(actual) => Resolution::Bound(actual),
            None => {
                debug!(
                    decl = var.decl.index(),
                    index = var.index,
                    "type variable unresolved in context, falling back to declared bounds"
                );
                let bounds = store
                    .param(var)
                    .map(|param| param.bounds.clone())
                    .unwrap_or_default();
                Resolution::Unbound(bounds)
            }
        }
    }
}

/// Depth-first search for the nearest binding of `var` reachable from
/// `context`. A parameterized hop substitutes its arguments into its
/// supertype clauses before descending; a raw hop contributes no bindings
/// of its own but its supertype clauses may still fix arguments.
fn walk(
    store: &TypeStore,
    context: &TypeSpec,
    var: &VariableSpec,
    visited: &mut FxHashSet<DeclId>,
) -> Option<TypeSpec> {
    match context.kind() {
        TypeKind::Parameterized(p) => {
            if p.decl == var.decl {
                return p.args.get(var.index).cloned();
            }
            if !visited.insert(p.decl) {
                return None;
            }
            let decl = store.decl(p.decl)?;
            for supertype in &decl.supertypes {
                let supertype = substitute(supertype, p.decl, &p.args);
                if let Some(found) = walk(store, &supertype, var, visited) {
                    return Some(found);
                }
            }
            None
        }
        TypeKind::Class(id) => {
            if !visited.insert(*id) {
                return None;
            }
            let decl = store.decl(*id)?;
            for supertype in &decl.supertypes {
                if let Some(found) = walk(store, supertype, var, visited) {
                    return Some(found);
                }
            }
            None
        }
        _ => None,
    }
}

/// Replace every reference to a parameter of `decl` with the corresponding
/// actual argument, recursively. References to other declarations' variables
/// are left alone.
fn substitute(spec: &TypeSpec, decl: DeclId, args: &[TypeSpec]) -> TypeSpec {
    match spec.kind() {
        TypeKind::Variable(v) if v.decl == decl => {
            args.get(v.index).cloned().unwrap_or_else(|| spec.clone())
        }
        TypeKind::Parameterized(p) => TypeSpec::from_kind(TypeKind::Parameterized(
            ParameterizedSpec {
                decl: p.decl,
                args: p
                    .args
                    .iter()
                    .map(|arg| substitute(arg, decl, args))
                    .collect(),
            },
        )),
        TypeKind::Array(component) => TypeSpec::array(substitute(component, decl, args)),
        TypeKind::Wildcard(w) => TypeSpec::from_kind(TypeKind::Wildcard(WildcardSpec {
            upper: w.upper.iter().map(|b| substitute(b, decl, args)).collect(),
            lower: w.lower.iter().map(|b| substitute(b, decl, args)).collect(),
        })),
        _ => spec.clone(),
    }
}
