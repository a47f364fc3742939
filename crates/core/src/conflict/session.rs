//! The collaboration compare session.
//!
//! A [`CompareSession`] is built from one atomic snapshot of both sides'
//! diff facts. It owns the comparison tree, the resolution map, and the
//! per-leaf resolution state for exactly one rebuild; a fresh snapshot means
//! a fresh session, and recorded resolutions never migrate across sessions.
//!
//! Observers that need to react to new resolutions subscribe to a channel
//! instead of registering callbacks, which keeps UI types out of the core.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{channel, Receiver, Sender};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conflict::resolution::{ConflictResolution, ConflictResolutionMap};
use crate::conflict::resolver::{ConflictResolver, ResolutionChoice};
use crate::diff::overlay::{self, Overlay};
use crate::diff::result::DiffResult;
use crate::diff::tree::{DiffTree, NodeId};
use crate::document::DocumentStore;
use crate::errors::ConflictError;
use crate::models::{Diff, DiffType, Reference, Side};

// ---------------------------------------------------------------------------
// Leaf states
// ---------------------------------------------------------------------------

/// Per-leaf resolution lifecycle within one session.
///
/// `Resolved` is terminal for the session; a rebuild with new diff facts
/// starts over at `Unresolved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafState {
    /// Not yet shown to the user, no resolution recorded.
    Unresolved,
    /// Shown to the user, still awaiting a decision.
    Presented,
    /// A resolution has been recorded.
    Resolved,
}

/// Batch policy for resolving all open conflicts at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AutoResolvePolicy {
    /// Leave every conflict to an interactive decision.
    #[default]
    Manual,
    /// Keep the local state for every open conflict.
    PreferLocal,
    /// Take the remote state for every open conflict.
    PreferRemote,
}

/// Notification sent to subscribers whenever a resolution is recorded.
#[derive(Debug, Clone)]
pub struct ResolutionEvent {
    pub reference: Reference,
    pub resolution: ConflictResolution,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One collaboration session over a single snapshot of both sides.
pub struct CompareSession {
    id: Uuid,
    database: String,
    tree: DiffTree,
    resolutions: ConflictResolutionMap,
    presented: HashSet<Reference>,
    subscribers: Vec<Sender<ResolutionEvent>>,
}

impl CompareSession {
    /// Build a session from the two sides' diff facts.
    ///
    /// Diffs are paired per unique reference; a reference appearing on
    /// neither side is never materialized, which is what guarantees the
    /// [`DiffResult`] constructor precondition. The snapshot must be
    /// complete: partial delivery is not supported.
    pub fn new(database: impl Into<String>, local: Vec<Diff>, remote: Vec<Diff>) -> Self {
        let database = database.into();
        let id = Uuid::new_v4();
        info!(
            session = %id,
            database = %database,
            local = local.len(),
            remote = remote.len(),
            "building compare session"
        );

        let mut paired: HashMap<Reference, (Option<Diff>, Option<Diff>)> = HashMap::new();
        for diff in local {
            let reference = diff.reference.clone();
            paired.entry(reference).or_default().0 = Some(diff);
        }
        for diff in remote {
            let reference = diff.reference.clone();
            paired.entry(reference).or_default().1 = Some(diff);
        }
        let results: Vec<DiffResult> = paired
            .into_values()
            .map(|(local, remote)| DiffResult::new(local, remote))
            .collect();

        let tree = DiffTree::build(&database, results);
        debug!(session = %id, conflicts = tree.conflict_count(), "session ready");

        Self {
            id,
            database,
            tree,
            resolutions: ConflictResolutionMap::new(),
            presented: HashSet::new(),
            subscribers: Vec::new(),
        }
    }

    /// Session identifier, for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the database being compared.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// The comparison tree for rendering.
    pub fn tree(&self) -> &DiffTree {
        &self.tree
    }

    /// Recorded resolutions so far.
    pub fn resolutions(&self) -> &ConflictResolutionMap {
        &self.resolutions
    }

    /// Overlay state for a node; `None` for non-leaf nodes and for leaves
    /// with no user-visible difference.
    pub fn overlay(&self, node: NodeId) -> Option<Overlay> {
        let result = self.tree.node(node).as_leaf()?;
        overlay::overlay(result, &self.resolutions)
    }

    /// Lifecycle state of the leaf for `reference`.
    pub fn leaf_state(&self, reference: &Reference) -> LeafState {
        if self.resolutions.contains(reference) {
            LeafState::Resolved
        } else if self.presented.contains(reference) {
            LeafState::Presented
        } else {
            LeafState::Unresolved
        }
    }

    /// Record that the leaf was shown to the user. No-op once resolved.
    pub fn mark_presented(&mut self, reference: &Reference) {
        if !self.resolutions.contains(reference) {
            self.presented.insert(reference.clone());
        }
    }

    /// Subscribe to resolution events recorded after this call.
    pub fn subscribe(&mut self) -> Receiver<ResolutionEvent> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Record a resolution computed elsewhere, replacing any earlier one for
    /// the same reference. Returns the replaced resolution, if any.
    pub fn record(
        &mut self,
        reference: Reference,
        resolution: ConflictResolution,
    ) -> Option<ConflictResolution> {
        info!(
            session = %self.id,
            reference = %reference,
            resolution = %resolution,
            "resolution recorded"
        );
        self.notify(&reference, &resolution);
        self.resolutions.insert(reference, resolution)
    }

    /// Resolve a conflicted leaf.
    ///
    /// Fetches the two sides' documents from `store` lazily (a deleted side
    /// has no document), computes the resolution, records it, and notifies
    /// subscribers. Document failures block only this leaf; it stays
    /// unresolved.
    pub fn resolve_leaf(
        &mut self,
        node: NodeId,
        choice: ResolutionChoice,
        edited: Option<&serde_json::Value>,
        store: &dyn DocumentStore,
    ) -> Result<ConflictResolution, ConflictError> {
        let result = self
            .tree
            .node(node)
            .as_leaf()
            .ok_or_else(|| ConflictError::NotAConflict(self.tree.label(node).to_string()))?
            .clone();
        if !result.is_conflict() {
            return Err(ConflictError::NotAConflict(result.reference().to_string()));
        }
        let reference = result.reference().clone();

        let local_doc = self.side_document(store, Side::Local, result.local())?;
        let remote_doc = self.side_document(store, Side::Remote, result.remote())?;

        let resolution = ConflictResolver::resolve(
            &reference,
            choice,
            local_doc.as_ref(),
            remote_doc.as_ref(),
            None,
            edited,
        )?;
        self.record(reference, resolution.clone());
        Ok(resolution)
    }

    /// Apply a batch policy to every open conflict.
    ///
    /// Returns the number of conflicts resolved. `Manual` resolves nothing.
    /// The policy decisions need no document access, so this cannot fail.
    pub fn auto_resolve_all(&mut self, policy: AutoResolvePolicy) -> usize {
        let resolution = match policy {
            AutoResolvePolicy::Manual => return 0,
            AutoResolvePolicy::PreferLocal => ConflictResolution::KeepLocal,
            AutoResolvePolicy::PreferRemote => ConflictResolution::OverwriteLocal,
        };

        let open: Vec<Reference> = self
            .tree
            .leaves()
            .into_iter()
            .filter(|(_, result)| result.is_conflict())
            .map(|(_, result)| result.reference().clone())
            .filter(|reference| !self.resolutions.contains(reference))
            .collect();

        info!(
            session = %self.id,
            policy = ?policy,
            count = open.len(),
            "auto-resolving open conflicts"
        );
        let count = open.len();
        for reference in open {
            self.record(reference, resolution.clone());
        }
        count
    }

    /// Number of conflicted leaves without a recorded resolution.
    pub fn open_conflicts(&self) -> usize {
        self.tree
            .leaves()
            .iter()
            .filter(|(_, result)| result.is_conflict())
            .filter(|(_, result)| !self.resolutions.contains(result.reference()))
            .count()
    }

    /// True once every conflicted leaf has a resolution.
    pub fn is_fully_resolved(&self) -> bool {
        self.open_conflicts() == 0
    }

    /// Complete the session: hand the resolution map to the commit step and
    /// clear all session state. The session holds no resolutions afterwards.
    pub fn finish(&mut self) -> ConflictResolutionMap {
        info!(
            session = %self.id,
            resolutions = self.resolutions.len(),
            "session finished"
        );
        self.presented.clear();
        self.subscribers.clear();
        std::mem::take(&mut self.resolutions)
    }

    /// Fetch the document behind one side of a conflict.
    ///
    /// A deleted (or absent) side legitimately has no document; anything
    /// else missing or undecodable blocks the leaf.
    fn side_document(
        &self,
        store: &dyn DocumentStore,
        side: Side,
        diff: Option<&Diff>,
    ) -> Result<Option<serde_json::Value>, ConflictError> {
        let Some(diff) = diff else {
            return Ok(None);
        };
        if diff.diff_type == DiffType::Deleted {
            return Ok(None);
        }
        store
            .document(side, &diff.reference)
            .map(Some)
            .map_err(|source| ConflictError::ResolutionBlocked {
                reference: diff.reference.to_string(),
                source,
            })
    }

    fn notify(&mut self, reference: &Reference, resolution: &ConflictResolution) {
        let event = ResolutionEvent {
            reference: reference.clone(),
            resolution: resolution.clone(),
        };
        let before = self.subscribers.len();
        self.subscribers
            .retain(|sender| sender.send(event.clone()).is_ok());
        if self.subscribers.len() < before {
            warn!(
                session = %self.id,
                dropped = before - self.subscribers.len(),
                "pruned disconnected resolution subscribers"
            );
        }
    }
}
