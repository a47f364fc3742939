//! Conflict resolution and session management.
//!
//! The conflict subsystem is responsible for:
//! 1. **Decisions** -- turning a user or policy choice into a
//!    [`ConflictResolution`], including the document merge algorithm.
//! 2. **Bookkeeping** -- the per-session, last-write-wins
//!    [`ConflictResolutionMap`].
//! 3. **Sessions** -- [`CompareSession`], which owns the tree, the map, the
//!    per-leaf state machine, and the resolution event channel.

pub mod resolution;
pub mod resolver;
pub mod session;

pub use resolution::{ConflictResolution, ConflictResolutionMap};
pub use resolver::{ConflictResolver, ResolutionChoice};
pub use session::{AutoResolvePolicy, CompareSession, LeafState, ResolutionEvent};
