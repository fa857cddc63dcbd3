//! Compliance rules for a wildcard base type.
//!
//! A candidate satisfies `? extends U` when every upper bound accepts it,
//! and `? super L` when it accepts every lower bound; the lower-bound check
//! re-enters the engine with the roles swapped. A wildcard candidate is
//! checked by containment: its bounds must pin the unknown type at least as
//! tightly as the base's.
//!
//! Bound checks run leniently regardless of the inherited strictness; that
//! is the variance protocol that lets `P<? extends Number>` accept
//! `P<Integer>` while `P<Number>` does not.

use crate::context::MatchContext;
use crate::error::Error;
use crate::matcher::{Matcher, TypeComplianceEngine};
use crate::spec::{ParameterizedSpec, TypeKind, TypeSpec, VariableSpec, WildcardSpec};
use crate::store::{DeclId, TypeStore};
use crate::visit::{TypeDispatcher, TypeVisitor};

/// Matcher used when the base is a [`TypeKind::Wildcard`].
#[derive(Debug, Clone, Copy)]
pub struct WildcardMatcher<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl<'e, 's> WildcardMatcher<'e, 's> {
    pub fn new(engine: &'e TypeComplianceEngine<'s>) -> Self {
        Self { engine }
    }
}

impl Matcher for WildcardMatcher<'_, '_> {
    fn store(&self) -> &TypeStore {
        self.engine.store()
    }

    fn dispatcher(&self) -> &TypeDispatcher {
        self.engine.dispatcher()
    }

    fn visitor(&self) -> Box<dyn TypeVisitor + '_> {
        Box::new(WildcardVisitor {
            engine: self.engine,
        })
    }
}

struct WildcardVisitor<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl WildcardVisitor<'_, '_> {
    fn base(&self) -> Option<WildcardSpec> {
        match MatchContext::base_type()?.kind() {
            TypeKind::Wildcard(w) => Some(w.clone()),
            _ => None,
        }
    }

    /// Every upper bound must accept the candidate; the candidate must
    /// accept every lower bound.
    fn bounds_accept(&self, base: &WildcardSpec, candidate: &TypeSpec) -> Result<bool, Error> {
        for upper in &base.upper {
            if !self.engine.matches_with(upper, candidate, false)? {
                return Ok(false);
            }
        }
        for lower in &base.lower {
            if !self.engine.matches_with(candidate, lower, false)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn check(&self, candidate: TypeSpec) -> Result<(), Error> {
        let Some(base) = self.base() else {
            return Ok(());
        };
        let matched = self.bounds_accept(&base, &candidate)?;
        MatchContext::set_matched(matched);
        Ok(())
    }
}

impl TypeVisitor for WildcardVisitor<'_, '_> {
    fn visit_class(&mut self, candidate: DeclId) -> Result<(), Error> {
        self.check(TypeSpec::class(candidate))
    }

    fn visit_parameterized(&mut self, candidate: &ParameterizedSpec) -> Result<(), Error> {
        self.check(TypeSpec::from_kind(TypeKind::Parameterized(
            candidate.clone(),
        )))
    }

    fn visit_array(&mut self, component: &TypeSpec) -> Result<(), Error> {
        self.check(TypeSpec::array(component.clone()))
    }

    fn visit_variable(&mut self, candidate: &VariableSpec) -> Result<(), Error> {
        self.check(TypeSpec::from_kind(TypeKind::Variable(*candidate)))
    }

    fn visit_wildcard(&mut self, candidate: &WildcardSpec) -> Result<(), Error> {
        let Some(base) = self.base() else {
            return Ok(());
        };
        // Containment: every base upper bound must be guaranteed by some
        // candidate upper bound, and every base lower bound must be covered
        // by some candidate lower bound.
        for upper in &base.upper {
            let mut guaranteed = false;
            for cand_upper in &candidate.upper {
                if self.engine.matches_with(upper, cand_upper, false)? {
                    guaranteed = true;
                    break;
                }
            }
            if !guaranteed {
                return Ok(());
            }
        }
        for lower in &base.lower {
            let mut covered = false;
            for cand_lower in &candidate.lower {
                if self.engine.matches_with(cand_lower, lower, false)? {
                    covered = true;
                    break;
                }
            }
            if !covered {
                return Ok(());
            }
        }
        MatchContext::set_matched(true);
        Ok(())
    }
}
