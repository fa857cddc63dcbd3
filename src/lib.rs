//! Runtime compliance matching for generic type specifications.
//!
//! `typefit` decides whether one generic type specification (the
//! *candidate*) may be used wherever another (the *base*) is expected:
//! a point-in-time subtype-compliance question over types with generic
//! arguments, wildcards, arrays, and type variables. It is meant for
//! frameworks that discover types at runtime (fields, parameters, return
//! types) and must check them against a target generic shape.
//!
//! Declarations live in a [`TypeStore`]; type expressions are [`TypeSpec`]
//! values over it; [`TypeComplianceEngine`] answers the compliance question
//! through the [`Matcher`] entry points.
//!
//! ```
//! use typefit::{Matcher, TypeComplianceEngine, TypeSpec, TypeStore};
//!
//! # fn main() -> Result<(), typefit::Error> {
//! let mut store = TypeStore::new();
//! let number = store.declare("Number", &[])?;
//! let integer = store.declare("Integer", &[])?;
//! store.add_supertype(integer, TypeSpec::class(number))?;
//!
//! let engine = TypeComplianceEngine::new(&store);
//!
//! // `? extends Number` accepts Integer, but not an unknown representation.
//! let base = TypeSpec::wildcard_extends(vec![TypeSpec::class(number)]);
//! assert!(engine.matches(&base, &TypeSpec::class(integer))?);
//! assert!(!engine.matches(&base, &TypeSpec::opaque("raw pointer"))?);
//!
//! // Generic-argument positions are invariant: strict mode demands identity.
//! assert!(engine.matches_with(&TypeSpec::class(number), &TypeSpec::class(integer), false)?);
//! assert!(!engine.matches_with(&TypeSpec::class(number), &TypeSpec::class(integer), true)?);
//! # Ok(()) }
//! ```
//!
//! One engine may be shared across threads; all matching state is
//! per-thread, and nested comparisons re-enter the engine on the same
//! thread through the [`MatchContext`] frame stack.

pub mod context;
pub mod error;
pub mod matcher;
pub mod resolve;
pub mod spec;
pub mod store;
pub mod visit;

pub use context::{MatchContext, MAX_MATCH_DEPTH};
pub use error::Error;
pub use matcher::{
    ArrayMatcher, ClassMatcher, Matcher, ParameterizedMatcher, TypeComplianceEngine,
    VariableMatcher, WildcardMatcher,
};
pub use resolve::{DefaultArgumentResolver, Resolution, TypeArgumentResolver};
pub use spec::{ParameterizedSpec, TypeKind, TypeSpec, VariableSpec, WildcardSpec};
pub use store::{DeclId, DeclKind, TypeDecl, TypeParam, TypeStore};
pub use visit::{DispatchMode, TypeDispatcher, TypeVisitor};
