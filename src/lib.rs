//! A generic self-balancing ordered-set container (red-black tree).
//!
//! The container stores opaque payloads and is parameterized over the two
//! capabilities it needs from them: a total-order comparator and a teardown
//! destructor, both supplied at construction time. Four public operations:
//! insert (with automatic rebalancing), contains, in-order traversal with
//! early termination, and full teardown. No deletion of individual elements.

#![deny(unsafe_op_in_unsafe_fn)]

// the ordered-set container
pub mod tree;

pub use tree::{Iter, RbTree};
