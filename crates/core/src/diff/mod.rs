//! Diff pairing, tree construction, ordering, and overlay classification.
//!
//! The diff subsystem is responsible for:
//! 1. **Pairing** -- combining both sides' change records per reference
//!    ([`DiffResult`]).
//! 2. **Tree building** -- arranging results into the navigable
//!    database / type-bucket / category / leaf hierarchy ([`DiffTree`]).
//! 3. **Ordering** -- the deterministic sibling comparator ([`order`]).
//! 4. **Classification** -- deriving the overlay state per leaf ([`overlay`]).

pub mod order;
pub mod overlay;
pub mod result;
pub mod tree;

pub use overlay::{overlay, Overlay};
pub use result::DiffResult;
pub use tree::{DiffNode, DiffTree, NodeContent, NodeId};
