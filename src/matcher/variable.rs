//! Compliance rules for a type-variable base.
//!
//! An identical variable reference complies at any strictness. Otherwise
//! strict mode never matches (two distinct variables are distinct types),
//! and lenient mode requires the candidate to comply with every declared
//! bound of the base variable; an unbounded variable accepts anything.

use crate::context::MatchContext;
use crate::error::Error;
use crate::matcher::{Matcher, TypeComplianceEngine};
use crate::spec::{ParameterizedSpec, TypeKind, TypeSpec, VariableSpec, WildcardSpec};
use crate::store::{DeclId, TypeStore};
use crate::visit::{TypeDispatcher, TypeVisitor};

/// Matcher used when the base is a [`TypeKind::Variable`].
#[derive(Debug, Clone, Copy)]
pub struct VariableMatcher<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl<'e, 's> VariableMatcher<'e, 's> {
    pub fn new(engine: &'e TypeComplianceEngine<'s>) -> Self {
        Self { engine }
    }
}

impl Matcher for VariableMatcher<'_, '_> {
    fn store(&self) -> &TypeStore {
        self.engine.store()
    }

    fn dispatcher(&self) -> &TypeDispatcher {
        self.engine.dispatcher()
    }

    fn visitor(&self) -> Box<dyn TypeVisitor + '_> {
        Box::new(VariableVisitor {
            engine: self.engine,
        })
    }
}

struct VariableVisitor<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl VariableVisitor<'_, '_> {
    fn base(&self) -> Option<VariableSpec> {
        match MatchContext::base_type()?.kind() {
            TypeKind::Variable(v) => Some(*v),
            _ => None,
        }
    }

    /// Lenient rule: the candidate must satisfy every declared bound.
    fn satisfies_bounds(&self, base: VariableSpec, candidate: &TypeSpec) -> Result<(), Error> {
        if MatchContext::is_strict() {
            return Ok(());
        }
        let bounds = self
            .engine
            .store()
            .param(&base)
            .map(|param| param.bounds.clone())
            .unwrap_or_default();
        for bound in &bounds {
            if !self.engine.matches_with(bound, candidate, false)? {
                return Ok(());
            }
        }
        MatchContext::set_matched(true);
        Ok(())
    }
}

impl TypeVisitor for VariableVisitor<'_, '_> {
    fn visit_class(&mut self, candidate: DeclId) -> Result<(), Error> {
        let Some(base) = self.base() else {
            return Ok(());
        };
        self.satisfies_bounds(base, &TypeSpec::class(candidate))
    }

    fn visit_parameterized(&mut self, candidate: &ParameterizedSpec) -> Result<(), Error> {
        let Some(base) = self.base() else {
            return Ok(());
        };
        self.satisfies_bounds(
            base,
            &TypeSpec::from_kind(TypeKind::Parameterized(candidate.clone())),
        )
    }

    fn visit_array(&mut self, component: &TypeSpec) -> Result<(), Error> {
        let Some(base) = self.base() else {
            return Ok(());
        };
        self.satisfies_bounds(base, &TypeSpec::array(component.clone()))
    }

    fn visit_wildcard(&mut self, candidate: &WildcardSpec) -> Result<(), Error> {
        let Some(base) = self.base() else {
            return Ok(());
        };
        self.satisfies_bounds(
            base,
            &TypeSpec::from_kind(TypeKind::Wildcard(candidate.clone())),
        )
    }

    fn visit_variable(&mut self, candidate: &VariableSpec) -> Result<(), Error> {
        let Some(base) = self.base() else {
            return Ok(());
        };
        if *candidate == base {
            MatchContext::set_matched(true);
            return Ok(());
        }
        self.satisfies_bounds(base, &TypeSpec::from_kind(TypeKind::Variable(*candidate)))
    }
}
