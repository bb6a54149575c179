//! Stack growth guard for the parser and evaluator.
//!
//! Scripts can nest expressions and calls arbitrarily deep. The parser and
//! the tree-walking interpreter both recurse on that structure, so every
//! recursive entry point runs inside [`ensure_sufficient_stack`], which grows
//! the native stack on demand instead of aborting the process.
//!
//! Call depth is still bounded separately by the evaluator's call stack; this
//! guard only keeps legitimate nesting from overflowing.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new stack segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the red
/// zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// wasm manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
