//! Visitor-based dispatch over the type-specification variants.
//!
//! [`TypeDispatcher`] classifies a spec into exactly one variant and invokes
//! the corresponding [`TypeVisitor`] callback. Dispatch is classification
//! plus a single call: it never recurses. Recursion into nested type
//! arguments is the visitor's business, typically by re-entering a matcher.
//!
//! Every visitor method has a default no-op body, so an implementation only
//! overrides the variants it cares about; under the engine's fail-closed
//! verdict policy an untouched method means "no match" for that variant.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::spec::{ParameterizedSpec, TypeKind, TypeSpec, VariableSpec, WildcardSpec};
use crate::store::DeclId;

/// Per-variant callbacks invoked by [`TypeDispatcher::dispatch`].
///
/// Methods return `Result` so that errors raised by nested comparisons
/// propagate; verdicts travel only through
/// [`MatchContext::set_matched`](crate::context::MatchContext::set_matched).
pub trait TypeVisitor {
    fn visit_class(&mut self, _decl: DeclId) -> Result<(), Error> {
        Ok(())
    }

    fn visit_parameterized(&mut self, _spec: &ParameterizedSpec) -> Result<(), Error> {
        Ok(())
    }

    fn visit_wildcard(&mut self, _spec: &WildcardSpec) -> Result<(), Error> {
        Ok(())
    }

    fn visit_array(&mut self, _component: &TypeSpec) -> Result<(), Error> {
        Ok(())
    }

    fn visit_variable(&mut self, _var: &VariableSpec) -> Result<(), Error> {
        Ok(())
    }

    /// Generic fallback for specs outside the understood variants, and, in
    /// [`DispatchMode::CatchAllAfter`], a post-hook after every specific
    /// visit.
    fn visit_other(&mut self, _spec: &TypeSpec) -> Result<(), Error> {
        Ok(())
    }
}

/// When the generic fallback runs.
///
/// Hosts disagree on whether a catch-all hook should fire only for unknown
/// representations or after every visit; making it a knob avoids baking in
/// a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DispatchMode {
    /// `visit_other` runs only for specs no specific variant covers.
    #[default]
    FallbackOnly,
    /// `visit_other` additionally runs after every specific visit.
    CatchAllAfter,
}

/// Classifies a spec and routes it to the matching visitor callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeDispatcher {
    mode: DispatchMode,
}

impl TypeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: DispatchMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Invoke the visitor callback matching `spec`'s variant.
    pub fn dispatch(&self, spec: &TypeSpec, visitor: &mut dyn TypeVisitor) -> Result<(), Error> {
        match spec.kind() {
            TypeKind::Class(decl) => visitor.visit_class(*decl)?,
            TypeKind::Parameterized(p) => visitor.visit_parameterized(p)?,
            TypeKind::Wildcard(w) => visitor.visit_wildcard(w)?,
            TypeKind::Array(component) => visitor.visit_array(component)?,
            TypeKind::Variable(v) => visitor.visit_variable(v)?,
            // Not an error: the fallback exists precisely so callers can
            // handle or reject representations this engine does not model.
            TypeKind::Opaque(_) => return visitor.visit_other(spec),
        }
        if self.mode == DispatchMode::CatchAllAfter {
            visitor.visit_other(spec)?;
        }
        Ok(())
    }
}
