//! The polymorphic type-specification model.
//!
//! A [`TypeSpec`] describes one generic type expression: a raw named type, a
//! parameterization of one, a wildcard, an array, or a reference to a
//! declared type variable. Specs are immutable, structurally comparable, and
//! share their interior, so cloning one (the match engine does this when it
//! records a base type on the context stack) is a reference-count bump.
//!
//! The closed set of understood shapes is extended by one escape hatch,
//! [`TypeKind::Opaque`], for host representations this engine cannot
//! interpret. Opaque specs route to the dispatcher's generic fallback and
//! fail closed under the default matchers.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::store::{DeclId, TypeStore};

/// A generic type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeSpec {
    kind: Arc<TypeKind>,
}

/// The shape of a [`TypeSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// Raw or non-generic use of a named declaration.
    Class(DeclId),
    /// A declaration applied to type arguments, e.g. `List<String>`.
    Parameterized(ParameterizedSpec),
    /// An unknown type constrained from above and/or below.
    Wildcard(WildcardSpec),
    /// An array of a component type; nests arbitrarily.
    Array(TypeSpec),
    /// A reference to a declared type variable.
    Variable(VariableSpec),
    /// A host representation outside the shapes this engine understands.
    Opaque(String),
}

/// A raw declaration plus its ordered type arguments.
///
/// Argument order is positional and significant; the argument count always
/// equals the declaration's parameter count (enforced at construction).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterizedSpec {
    pub decl: DeclId,
    pub args: Vec<TypeSpec>,
}

/// Upper and lower bound sets of a wildcard. Both empty means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WildcardSpec {
    /// Types the unknown type must extend; conjunctive.
    pub upper: Vec<TypeSpec>,
    /// Types the unknown type must be a supertype of; conjunctive.
    pub lower: Vec<TypeSpec>,
}

/// A reference to the `index`-th type parameter of a declaration.
///
/// This is a reference, not ownership: the variable's name and bounds live
/// on the declaration inside the [`TypeStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableSpec {
    pub decl: DeclId,
    pub index: usize,
}

impl TypeSpec {
    pub(crate) fn from_kind(kind: TypeKind) -> Self {
        Self {
            kind: Arc::new(kind),
        }
    }

    /// A raw or non-generic use of a declaration.
    pub fn class(decl: DeclId) -> Self {
        Self::from_kind(TypeKind::Class(decl))
    }

    /// A declaration applied to type arguments. The argument count must
    /// match the declaration's parameter count.
    pub fn parameterized(
        store: &TypeStore,
        decl: DeclId,
        args: Vec<TypeSpec>,
    ) -> Result<Self, Error> {
        let entry = store.decl(decl).ok_or(Error::UnknownDeclaration(decl))?;
        if entry.params.len() != args.len() {
            return Err(Error::ArityMismatch {
                decl: entry.name.clone(),
                expected: entry.params.len(),
                found: args.len(),
            });
        }
        Ok(Self::from_kind(TypeKind::Parameterized(ParameterizedSpec {
            decl,
            args,
        })))
    }

    /// An unbounded wildcard, `?`.
    pub fn wildcard() -> Self {
        Self::wildcard_bounded(Vec::new(), Vec::new())
    }

    /// An upper-bounded wildcard, `? extends T & U`.
    pub fn wildcard_extends(upper: Vec<TypeSpec>) -> Self {
        Self::wildcard_bounded(upper, Vec::new())
    }

    /// A lower-bounded wildcard, `? super T`.
    pub fn wildcard_super(lower: Vec<TypeSpec>) -> Self {
        Self::wildcard_bounded(Vec::new(), lower)
    }

    /// A wildcard with explicit bound sets in both directions.
    pub fn wildcard_bounded(upper: Vec<TypeSpec>, lower: Vec<TypeSpec>) -> Self {
        Self::from_kind(TypeKind::Wildcard(WildcardSpec { upper, lower }))
    }

    /// An array of the given component type.
    pub fn array(component: TypeSpec) -> Self {
        Self::from_kind(TypeKind::Array(component))
    }

    /// A reference to the `index`-th type parameter of `decl`.
    pub fn variable(store: &TypeStore, decl: DeclId, index: usize) -> Result<Self, Error> {
        let entry = store.decl(decl).ok_or(Error::UnknownDeclaration(decl))?;
        if index >= entry.params.len() {
            return Err(Error::ParamIndexOutOfRange {
                decl: entry.name.clone(),
                index,
                count: entry.params.len(),
            });
        }
        Ok(Self::from_kind(TypeKind::Variable(VariableSpec {
            decl,
            index,
        })))
    }

    /// A host representation outside the understood shapes.
    pub fn opaque(description: impl Into<String>) -> Self {
        Self::from_kind(TypeKind::Opaque(description.into()))
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind(), TypeKind::Class(_))
    }

    pub fn is_parameterized(&self) -> bool {
        matches!(self.kind(), TypeKind::Parameterized(_))
    }

    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind(), TypeKind::Wildcard(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind(), TypeKind::Array(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind(), TypeKind::Variable(_))
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.kind(), TypeKind::Opaque(_))
    }

    /// The declaration a nominal spec refers to: the declaration itself for
    /// a raw use, the raw declaration for a parameterization, nothing for
    /// the structural shapes.
    pub fn head_decl(&self) -> Option<DeclId> {
        match self.kind() {
            TypeKind::Class(id) => Some(*id),
            TypeKind::Parameterized(p) => Some(p.decl),
            _ => None,
        }
    }

    /// Render this spec in source-like notation, resolving names through
    /// `store`. Unknown ids render as `?<raw-id>` rather than failing.
    pub fn display<'a>(&'a self, store: &'a TypeStore) -> SpecDisplay<'a> {
        SpecDisplay { spec: self, store }
    }
}

/// Display adapter returned by [`TypeSpec::display`].
pub struct SpecDisplay<'a> {
    spec: &'a TypeSpec,
    store: &'a TypeStore,
}

impl SpecDisplay<'_> {
    fn decl_name(&self, f: &mut fmt::Formatter<'_>, id: DeclId) -> fmt::Result {
        match self.store.name(id) {
            Some(name) => f.write_str(name),
            None => write!(f, "?<{}>", id.index()),
        }
    }

    fn bound_list(&self, f: &mut fmt::Formatter<'_>, bounds: &[TypeSpec]) -> fmt::Result {
        for (i, bound) in bounds.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{}", bound.display(self.store))?;
        }
        Ok(())
    }
}

impl fmt::Display for SpecDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.spec.kind() {
            TypeKind::Class(id) => self.decl_name(f, *id),
            TypeKind::Parameterized(p) => {
                self.decl_name(f, p.decl)?;
                f.write_str("<")?;
                for (i, arg) in p.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg.display(self.store))?;
                }
                f.write_str(">")
            }
            TypeKind::Wildcard(w) => {
                f.write_str("?")?;
                if !w.upper.is_empty() {
                    f.write_str(" extends ")?;
                    self.bound_list(f, &w.upper)?;
                }
                if !w.lower.is_empty() {
                    f.write_str(" super ")?;
                    self.bound_list(f, &w.lower)?;
                }
                Ok(())
            }
            TypeKind::Array(component) => {
                write!(f, "{}[]", component.display(self.store))
            }
            TypeKind::Variable(v) => match self.store.param(v) {
                Some(param) => f.write_str(&param.name),
                None => write!(f, "?<{}#{}>", v.decl.index(), v.index),
            },
            TypeKind::Opaque(description) => write!(f, "<opaque {description}>"),
        }
    }
}
