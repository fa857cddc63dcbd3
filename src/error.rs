//! Error types for compliance matching.
//!
//! Hard failures only: a genuine mismatch between two type specifications is
//! the ordinary `Ok(false)` verdict, never an error. Everything here signals
//! a malformed model or a broken integration contract.

use thiserror::Error;

use crate::store::DeclId;

/// Errors raised while building type specifications or running a match.
#[derive(Debug, Error)]
pub enum Error {
    /// A parameterized spec supplied the wrong number of type arguments.
    #[error("`{decl}` declares {expected} type parameter(s), but {found} argument(s) were supplied")]
    ArityMismatch {
        decl: String,
        expected: usize,
        found: usize,
    },

    /// A declaration with the same name already exists in the store.
    #[error("a declaration named `{0}` already exists")]
    DuplicateDeclaration(String),

    /// A variable reference points past the declaration's parameter list.
    #[error("type parameter index {index} is out of range for `{decl}` ({count} declared)")]
    ParamIndexOutOfRange {
        decl: String,
        index: usize,
        count: usize,
    },

    /// A spec references a declaration the store does not contain.
    ///
    /// Raised at match entry, before any context frame is pushed, so the
    /// context stack invariants survive a bad call.
    #[error("type specification references unknown declaration #{}", .0.index())]
    UnknownDeclaration(DeclId),

    /// A nested comparison exceeded the per-thread recursion limit.
    ///
    /// Indicates a pathological (likely self-referential) type graph rather
    /// than an ordinary mismatch.
    #[error("nested comparison exceeded the depth limit of {limit}")]
    DepthExceeded { limit: usize },
}
