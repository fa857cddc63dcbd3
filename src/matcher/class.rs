//! Compliance rules for a raw or non-generic base type.

use crate::context::MatchContext;
use crate::error::Error;
use crate::matcher::{Matcher, TypeComplianceEngine};
use crate::spec::{ParameterizedSpec, TypeKind, TypeSpec, VariableSpec, WildcardSpec};
use crate::store::{DeclId, TypeStore};
use crate::visit::{TypeDispatcher, TypeVisitor};

/// Matcher used when the base is a [`TypeKind::Class`].
///
/// Strict mode demands declaration identity. Lenient mode accepts any
/// candidate whose declaration reaches the base through the supertype
/// graph; a parameterized candidate is compared by its raw declaration
/// (arguments are erased against a raw base).
#[derive(Debug, Clone, Copy)]
pub struct ClassMatcher<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl<'e, 's> ClassMatcher<'e, 's> {
    pub fn new(engine: &'e TypeComplianceEngine<'s>) -> Self {
        Self { engine }
    }
}

impl Matcher for ClassMatcher<'_, '_> {
    fn store(&self) -> &TypeStore {
        self.engine.store()
    }

    fn dispatcher(&self) -> &TypeDispatcher {
        self.engine.dispatcher()
    }

    fn visitor(&self) -> Box<dyn TypeVisitor + '_> {
        Box::new(ClassVisitor {
            engine: self.engine,
        })
    }
}

struct ClassVisitor<'e, 's> {
    engine: &'e TypeComplianceEngine<'s>,
}

impl ClassVisitor<'_, '_> {
    /// The base frame as (full spec, declaration id), if it is a class base.
    fn base(&self) -> Option<(TypeSpec, DeclId)> {
        let base = MatchContext::base_type()?;
        let decl = match base.kind() {
            TypeKind::Class(decl) => *decl,
            _ => return None,
        };
        Some((base, decl))
    }
}

impl TypeVisitor for ClassVisitor<'_, '_> {
    fn visit_class(&mut self, candidate: DeclId) -> Result<(), Error> {
        let Some((_, base_decl)) = self.base() else {
            return Ok(());
        };
        let matched = if MatchContext::is_strict() {
            candidate == base_decl
        } else {
            self.engine.store().is_subdecl(candidate, base_decl)
        };
        MatchContext::set_matched(matched);
        Ok(())
    }

    fn visit_parameterized(&mut self, candidate: &ParameterizedSpec) -> Result<(), Error> {
        let Some((_, base_decl)) = self.base() else {
            return Ok(());
        };
        let matched = if MatchContext::is_strict() {
            candidate.decl == base_decl
        } else {
            self.engine.store().is_subdecl(candidate.decl, base_decl)
        };
        MatchContext::set_matched(matched);
        Ok(())
    }

    fn visit_variable(&mut self, candidate: &VariableSpec) -> Result<(), Error> {
        let Some((base, _)) = self.base() else {
            return Ok(());
        };
        // A type variable is never identical to a class; leniently it
        // complies when one of its bounds does.
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
        // Only an upper bound can guarantee what the unknown type is; a
        // lower-bounded or unbounded wildcard may stand for anything.
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
