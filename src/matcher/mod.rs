//! The compliance-matching engine.
//!
//! A match call asks whether a candidate type specification may be used
//! where a base specification is expected. The fixed algorithm lives in
//! [`Matcher::matches_with`], a provided trait method:
//!
//! 1. **Validate** both specs against the store, before any frame is pushed.
//! 2. **Push** a `(base, strict)` frame on the calling thread's
//!    [`MatchContext`].
//! 3. **Dispatch** the candidate through the visitor supplied by
//!    [`Matcher::visitor`]; the visitor records its verdict via
//!    [`MatchContext::set_matched`]. A verdict never set reads as `false`.
//! 4. **Pop** the frame and, if that restored the stack to the sentinel
//!    alone, fire [`Matcher::cleanup`] exactly once; nested re-entrant
//!    calls never trigger it.
//!
//! [`TypeComplianceEngine`] is the default entry point: its visitor routes
//! each comparison to a delegate matcher selected by the *base* variant, and
//! the delegates re-enter the engine for nested positions (generic
//! arguments re-dispatch strictly, wildcard bound checks leniently).
//!
//! # Module Structure
//!
//! - [`class`] - rules for a raw or non-generic base
//! - [`parameterized`] - rules for a parameterized base, including argument
//!   resolution through the candidate's inheritance chain
//! - [`wildcard`] - wildcard bound checks and wildcard containment
//! - [`array`] - array component rules (covariant lenient, invariant strict)
//! - [`variable`] - type-variable bound conjunction

mod array;
mod class;
mod parameterized;
mod variable;
mod wildcard;


use std::sync::{Arc, RwLock};

use tracing::trace;

use crate::context::MatchContext;
use crate::error::Error;
use crate::resolve::{DefaultArgumentResolver, TypeArgumentResolver};
use crate::spec::{ParameterizedSpec, TypeKind, TypeSpec, VariableSpec, WildcardSpec};
use crate::store::{DeclId, TypeStore};
use crate::visit::{DispatchMode, TypeDispatcher, TypeVisitor};

pub use array::ArrayMatcher;
pub use class::ClassMatcher;
pub use parameterized::ParameterizedMatcher;
pub use variable::VariableMatcher;
pub use wildcard::WildcardMatcher;

/// A compliance matcher: comparison logic for one base-type kind, run
/// through the fixed template algorithm.
///
/// Implementations supply [`visitor`](Matcher::visitor) and may override
/// [`cleanup`](Matcher::cleanup); the entry points are provided.
pub trait Matcher {
    /// The declaration registry specs are interpreted against.
    fn store(&self) -> &TypeStore;

    /// The dispatcher used to route candidates. Delegates share their
    /// engine's dispatcher so fallback semantics stay consistent.
    fn dispatcher(&self) -> &TypeDispatcher;

    /// The visitor holding this matcher's comparison logic for one
    /// dispatch. It reads the base type and strictness from
    /// [`MatchContext`] and records its verdict there.
    fn visitor(&self) -> Box<dyn TypeVisitor + '_>;

    /// Hook fired once per completed outermost call on the current thread.
    /// Must be safe to call with no per-call state present.
    fn cleanup(&self) -> Result<(), Error> {
        Ok(())
    }

    /// Lenient compliance: subtype-compatible candidates are accepted.
    fn matches(&self, base: &TypeSpec, candidate: &TypeSpec) -> Result<bool, Error> {
        self.matches_with(base, candidate, false)
    }

    /// Whether `candidate` may be used where `base` is expected.
    ///
    /// With `strict` set, only exact structural identity complies; this is
    /// the variance applied at generic-argument positions. Lenient mode is
    /// used for top-level queries and wildcard bound checks.
    ///
    /// A `false` verdict is the ordinary "not compliant" answer; errors are
    /// reserved for malformed input and never conflated with it.
    fn matches_with(
        &self,
        base: &TypeSpec,
        candidate: &TypeSpec,
        strict: bool,
    ) -> Result<bool, Error> {
        let store = self.store();
        store.validate_spec(base)?;
        store.validate_spec(candidate)?;

        let guard = MatchContext::push(base.clone(), strict)?;
        let mut visitor = self.visitor();
        let dispatched = self.dispatcher().dispatch(candidate, &mut *visitor);
        drop(visitor);
        let verdict = guard.finish();

        let outermost = MatchContext::depth() == 1;
        let cleaned = if outermost { self.cleanup() } else { Ok(()) };

        // A dispatch error outranks a cleanup error; both outrank the
        // verdict. The frame is already popped either way.
        dispatched?;
        cleaned?;

        trace!(strict, verdict, outermost, "compliance check finished");
        Ok(verdict)
    }
}

/// The default entry point: routes every comparison to the delegate matcher
/// for the base type's variant.
///
/// One engine may be shared freely across threads; all matching state is
/// per-thread. Same-thread reentrancy (delegates calling back in for nested
/// positions) is how nested generic arguments are compared.
#[derive(Debug)]
pub struct TypeComplianceEngine<'s> {
    store: &'s TypeStore,
    dispatcher: TypeDispatcher,
    resolver: RwLock<Arc<dyn TypeArgumentResolver>>,
}

impl<'s> TypeComplianceEngine<'s> {
    pub fn new(store: &'s TypeStore) -> Self {
        Self::with_dispatch_mode(store, DispatchMode::default())
    }

    /// An engine whose dispatcher uses the given fallback semantics.
    pub fn with_dispatch_mode(store: &'s TypeStore, mode: DispatchMode) -> Self {
        Self {
            store,
            dispatcher: TypeDispatcher::with_mode(mode),
            resolver: RwLock::new(DefaultArgumentResolver::shared()),
        }
    }

    /// The resolver used to map type variables to their bindings.
    pub fn resolver(&self) -> Arc<dyn TypeArgumentResolver> {
        let guard = match self.resolver.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        Arc::clone(&guard)
    }

    /// Replace the resolver. The replacement is a swap of a shared
    /// reference, safe even while matches run on other threads; last
    /// writer wins.
    pub fn set_resolver(&self, resolver: Arc<dyn TypeArgumentResolver>) {
        let mut guard = match self.resolver.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = resolver;
    }
}

impl Matcher for TypeComplianceEngine<'_> {
    fn store(&self) -> &TypeStore {
        self.store
    }

    fn dispatcher(&self) -> &TypeDispatcher {
        &self.dispatcher
    }

    fn visitor(&self) -> Box<dyn TypeVisitor + '_> {
        Box::new(RoutingVisitor { engine: self })
    }
}

/// The engine's visitor: every candidate variant routes the same way, to
/// the delegate selected by the base variant read from the context.
struct RoutingVisitor<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl RoutingVisitor<'_, '_> {
    fn route(&self, candidate: &TypeSpec) -> Result<(), Error> {
        let Some(base) = MatchContext::base_type() else {
            return Ok(());
        };
        let strict = MatchContext::is_strict();
        let verdict = match base.kind() {
            TypeKind::Class(_) => {
                ClassMatcher::new(self.engine).matches_with(&base, candidate, strict)?
            }
            TypeKind::Parameterized(_) => {
                ParameterizedMatcher::new(self.engine).matches_with(&base, candidate, strict)?
            }
            TypeKind::Wildcard(_) => {
                WildcardMatcher::new(self.engine).matches_with(&base, candidate, strict)?
            }
            TypeKind::Array(_) => {
                ArrayMatcher::new(self.engine).matches_with(&base, candidate, strict)?
            }
            TypeKind::Variable(_) => {
                VariableMatcher::new(self.engine).matches_with(&base, candidate, strict)?
            }
            // An ununderstood base never matches.
            TypeKind::Opaque(_) => false,
        };
        MatchContext::set_matched(verdict);
        Ok(())
    }
}

impl TypeVisitor for RoutingVisitor<'_, '_> {
    fn visit_class(&mut self, decl: DeclId) -> Result<(), Error> {
        self.route(&TypeSpec::class(decl))
    }

    fn visit_parameterized(&mut self, spec: &ParameterizedSpec) -> Result<(), Error> {
        self.route(&TypeSpec::from_kind(TypeKind::Parameterized(spec.clone())))
    }

    fn visit_wildcard(&mut self, spec: &WildcardSpec) -> Result<(), Error> {
        self.route(&TypeSpec::from_kind(TypeKind::Wildcard(spec.clone())))
    }

    fn visit_array(&mut self, component: &TypeSpec) -> Result<(), Error> {
        self.route(&TypeSpec::array(component.clone()))
    }

    fn visit_variable(&mut self, var: &VariableSpec) -> Result<(), Error> {
        self.route(&TypeSpec::from_kind(TypeKind::Variable(*var)))
    }

    fn visit_other(&mut self, spec: &TypeSpec) -> Result<(), Error> {
        self.route(spec)
    }
}
