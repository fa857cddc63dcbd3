//! Compliance rules for a parameterized base type.
//!
//! Raw compliance first (declaration identity in strict mode, supertype
//! reachability otherwise), then every type argument of the base must be
//! satisfied by the argument the candidate binds at that position. The
//! binding is found through the engine's [`TypeArgumentResolver`], which
//! walks the candidate's inheritance chain; this is what makes a raw
//! `StringList` comply with `List<String>` when its declaration fixes the
//! argument, while a candidate that leaves the argument open fails closed.
//!
//! Argument positions are invariant: nested comparisons re-dispatch with
//! `strict` set. A wildcard base argument still accepts per wildcard rules,
//! because routing hands it to the wildcard matcher, whose bound checks are
//! lenient by protocol.
//!
//! [`TypeArgumentResolver`]: crate::resolve::TypeArgumentResolver

use crate::context::MatchContext;
use crate::error::Error;
use crate::matcher::{Matcher, TypeComplianceEngine};
use crate::resolve::Resolution;
use crate::spec::{ParameterizedSpec, TypeKind, TypeSpec, VariableSpec, WildcardSpec};
use crate::store::{DeclId, TypeStore};
use crate::visit::{TypeDispatcher, TypeVisitor};

/// Matcher used when the base is a [`TypeKind::Parameterized`].
#[derive(Debug, Clone, Copy)]
pub struct ParameterizedMatcher<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl<'e, 's> ParameterizedMatcher<'e, 's> {
    pub fn new(engine: &'e TypeComplianceEngine<'s>) -> Self {
        Self { engine }
    }
}

impl Matcher for ParameterizedMatcher<'_, '_> {
    fn store(&self) -> &TypeStore {
        self.engine.store()
    }

    fn dispatcher(&self) -> &TypeDispatcher {
        self.engine.dispatcher()
    }

    fn visitor(&self) -> Box<dyn TypeVisitor + '_> {
        Box::new(ParameterizedVisitor {
            engine: self.engine,
        })
    }
}

struct ParameterizedVisitor<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl ParameterizedVisitor<'_, '_> {
    fn base(&self) -> Option<(TypeSpec, ParameterizedSpec)> {
        let base = MatchContext::base_type()?;
        let spec = match base.kind() {
            TypeKind::Parameterized(p) => p.clone(),
            _ => return None,
        };
        Some((base, spec))
    }

    /// Resolve each of the base's arguments as seen from the candidate and
    /// compare invariantly. Unresolvable arguments fail closed.
    fn arguments_comply(
        &self,
        base: &ParameterizedSpec,
        candidate: &TypeSpec,
    ) -> Result<bool, Error> {
        let resolver = self.engine.resolver();
        for (index, base_arg) in base.args.iter().enumerate() {
            let var = VariableSpec {
                decl: base.decl,
                index,
            };
            match resolver.resolve(self.engine.store(), candidate, &var) {
                Resolution::Bound(actual) => {
                    if !self.engine.matches_with(base_arg, &actual, true)? {
                        return Ok(false);
                    }
                }
                Resolution::Unbound(_) => return Ok(false),
            }
        }
        Ok(true)
    }
}

impl TypeVisitor for ParameterizedVisitor<'_, '_> {
    fn visit_parameterized(&mut self, candidate: &ParameterizedSpec) -> Result<(), Error> {
        let Some((_, base)) = self.base() else {
            return Ok(());
        };
        let raw_ok = if MatchContext::is_strict() {
            candidate.decl == base.decl
        } else {
            self.engine.store().is_subdecl(candidate.decl, base.decl)
        };
        if !raw_ok {
            return Ok(());
        }
        let candidate = TypeSpec::from_kind(TypeKind::Parameterized(candidate.clone()));
        let matched = self.arguments_comply(&base, &candidate)?;
        MatchContext::set_matched(matched);
        Ok(())
    }

    fn visit_class(&mut self, candidate: DeclId) -> Result<(), Error> {
        let Some((_, base)) = self.base() else {
            return Ok(());
        };
        // A raw candidate is never identical to a parameterization; it
        // complies leniently only when its inheritance chain fixes every
        // argument compliantly.
        if MatchContext::is_strict() {
            return Ok(());
        }
        if !self.engine.store().is_subdecl(candidate, base.decl) {
            return Ok(());
        }
        let candidate = TypeSpec::class(candidate);
        let matched = self.arguments_comply(&base, &candidate)?;
        MatchContext::set_matched(matched);
        Ok(())
    }

    fn visit_variable(&mut self, candidate: &VariableSpec) -> Result<(), Error> {
        let Some((base, _)) = self.base() else {
            return Ok(());
        };
        if MatchContext::is_strict() {
            return Ok(());
        }
        let bounds = self
            .engine
            .store()
            .param(candidate)
            .map(|param| param.bounds.clone())
            .unwrap_or_default();
        for bound in &bounds {
            if self.engine.matches_with(&base, bound, false)? {
                MatchContext::set_matched(true);
                return Ok(());
            }
        }
        Ok(())
    }

    fn visit_wildcard(&mut self, candidate: &WildcardSpec) -> Result<(), Error> {
        let Some((base, _)) = self.base() else {
            return Ok(());
        };
        if MatchContext::is_strict() {
            return Ok(());
        }
        for upper in &candidate.upper {
            if self.engine.matches_with(&base, upper, false)? {
                MatchContext::set_matched(true);
                return Ok(());
            }
        }
        Ok(())
    }
}
