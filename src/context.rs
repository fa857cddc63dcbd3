//! The per-thread match context.
//!
//! Comparing nested generic arguments reuses the same matcher instances
//! across different base types within one outer comparison (matching
//! `Comparable<Collection<Comparable<? extends Number>>>` against
//! `Comparable<Collection<Comparable<Long>>>` runs the parameterized-type
//! logic once per nesting level), so the current base type and strictness
//! must be retrievable without threading them through every call signature.
//!
//! The context is a per-thread stack of frames shared by every matcher
//! instance on that thread. It starts with a sentinel frame that is never
//! popped: stack size 1 means no match is in progress, anything deeper means
//! a (possibly nested) match is active, and a pop that lands back on the
//! sentinel marks the end of the outermost call. Frames are pushed and
//! popped through [`FrameGuard`], so an unbalanced pop that would destroy
//! the sentinel is unrepresentable rather than merely checked for.
//!
//! Each frame carries the verdict slot for its own call. The slot starts
//! unset and an unset slot reads as `false`: comparison logic that never
//! decides has not matched.

use std::cell::RefCell;

use crate::error::Error;
use crate::spec::TypeSpec;

/// Upper bound on nested comparison depth per thread.
///
/// Real generic signatures nest a handful of levels; hitting this limit
/// means a pathological or self-referential type graph.
pub const MAX_MATCH_DEPTH: usize = 128;

struct Frame {
    base: Option<TypeSpec>,
    strict: bool,
    matched: Option<bool>,
}

impl Frame {
    fn sentinel() -> Self {
        Frame {
            base: None,
            strict: false,
            matched: None,
        }
    }
}

thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = RefCell::new(vec![Frame::sentinel()]);
}

/// Accessors for the calling thread's match context.
///
/// These are the facilities comparison logic consumes from inside a
/// dispatch; they read whatever frame the innermost active `matches_with`
/// call pushed.
pub struct MatchContext;

impl MatchContext {
    /// Current stack depth, sentinel included. 1 means no match is active.
    pub fn depth() -> usize {
        FRAMES.with(|frames| frames.borrow().len())
    }

    /// The base type of the innermost active match, or `None` outside any
    /// match.
    pub fn base_type() -> Option<TypeSpec> {
        FRAMES.with(|frames| {
            frames
                .borrow()
                .last()
                .and_then(|frame| frame.base.clone())
        })
    }

    /// The strictness of the innermost active match; lenient outside any
    /// match (the sentinel's flag).
    pub fn is_strict() -> bool {
        FRAMES.with(|frames| frames.borrow().last().is_some_and(|frame| frame.strict))
    }

    /// Record the verdict for the innermost active match. Later writes win.
    /// Ignored outside any match: the sentinel carries no verdict.
    pub fn set_matched(matched: bool) {
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            if frames.len() > 1 {
                if let Some(frame) = frames.last_mut() {
                    frame.matched = Some(matched);
                }
            }
        });
    }

    /// Push a frame for one match call. Fails without pushing when the
    /// depth limit is reached.
    pub(crate) fn push(base: TypeSpec, strict: bool) -> Result<FrameGuard, Error> {
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            if frames.len() >= MAX_MATCH_DEPTH {
                return Err(Error::DepthExceeded {
                    limit: MAX_MATCH_DEPTH,
                });
            }
            frames.push(Frame {
                base: Some(base),
                strict,
                matched: None,
            });
            Ok(FrameGuard { armed: true })
        })
    }
}

/// Owns one pushed frame; popping happens exactly once, on [`finish`] or on
/// drop, whichever comes first.
///
/// [`finish`]: FrameGuard::finish
#[derive(Debug)]
pub(crate) struct FrameGuard {
    armed: bool,
}

impl FrameGuard {
    /// Pop the frame and read its verdict; unset reads as `false`.
    pub(crate) fn finish(mut self) -> bool {
        self.armed = false;
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            if frames.len() > 1 {
                frames.pop().and_then(|frame| frame.matched).unwrap_or(false)
            } else {
                false
            }
        })
    }
}

impl Drop for FrameGuard {
    fn drop(&mut self) {
        if self.armed {
            FRAMES.with(|frames| {
                let mut frames = frames.borrow_mut();
                if frames.len() > 1 {
                    frames.pop();
                }
            });
        }
    }
}
