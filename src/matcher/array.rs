//! Compliance rules for an array base type.
//!
//! Arrays follow the host system's variance rule: covariant under lenient
//! matching (`Integer[]` may stand in for `Number[]`), component identity
//! under strict matching. The component comparison therefore re-enters the
//! engine at the same strictness as the enclosing call.

use crate::context::MatchContext;
use crate::error::Error;
use crate::matcher::{Matcher, TypeComplianceEngine};
use crate::spec::{TypeKind, TypeSpec, VariableSpec, WildcardSpec};
use crate::store::TypeStore;
use crate::visit::{TypeDispatcher, TypeVisitor};

/// Matcher used when the base is a [`TypeKind::Array`].
#[derive(Debug, Clone, Copy)]
pub struct ArrayMatcher<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl<'e, 's> ArrayMatcher<'e, 's> {
    pub fn new(engine: &'e TypeComplianceEngine<'s>) -> Self {
        Self { engine }
    }
}

impl Matcher for ArrayMatcher<'_, '_> {
    fn store(&self) -> &TypeStore {
        self.engine.store()
    }

    fn dispatcher(&self) -> &TypeDispatcher {
        self.engine.dispatcher()
    }

    fn visitor(&self) -> Box<dyn TypeVisitor + '_> {
        Box::new(ArrayVisitor {
            engine: self.engine,
        })
    }
}

struct ArrayVisitor<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl ArrayVisitor<'_, '_> {
    fn base(&self) -> Option<(TypeSpec, TypeSpec)> {
        let base = MatchContext::base_type()?;
        let component = match base.kind() {
            TypeKind::Array(component) => component.clone(),
            _ => return None,
        };
        Some((base, component))
    }
}

impl TypeVisitor for ArrayVisitor<'_, '_> {
    fn visit_array(&mut self, candidate: &TypeSpec) -> Result<(), Error> {
        let Some((_, component)) = self.base() else {
            return Ok(());
        };
        let strict = MatchContext::is_strict();
        let matched = self.engine.matches_with(&component, candidate, strict)?;
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
