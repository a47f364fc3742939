//! The comparison tree.
//!
//! A [`DiffTree`] arranges the session's [`DiffResult`]s into a navigable
//! hierarchy: database root, one bucket per entity type, one level per
//! category path segment, one leaf per changed reference. Trees are built
//! fresh for every comparison request and never persisted.
//!
//! Nodes live in an arena indexed by [`NodeId`]; the parent link is a plain
//! non-owning handle, so there are no ownership cycles to break.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diff::order;
use crate::diff::result::DiffResult;
use crate::models::{EntityType, Reference};

// ---------------------------------------------------------------------------
// Nodes
// ---------------------------------------------------------------------------

/// Handle to a node within its [`DiffTree`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// What a tree node wraps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeContent {
    /// The root: the database being compared, by name.
    Database(String),
    /// A bucket grouping all changes of one entity type.
    TypeBucket(EntityType),
    /// One category path segment.
    Category(String),
    /// A changed reference.
    Leaf(DiffResult),
}

impl NodeContent {
    /// Display label for this content.
    ///
    /// Leaves prefer the remote side's display name, falling back to the
    /// local one, so a rename on the remote shows up in the tree.
    pub fn label(&self) -> &str {
        match self {
            Self::Database(name) => name,
            Self::TypeBucket(entity_type) => entity_type.plural_label(),
            Self::Category(segment) => segment,
            Self::Leaf(result) => result
                .remote()
                .map(|d| d.reference.display_name.as_str())
                .or_else(|| result.local().map(|d| d.reference.display_name.as_str()))
                .unwrap_or_default(),
        }
    }
}

/// One node of the comparison tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffNode {
    /// The wrapped content.
    pub content: NodeContent,
    /// Non-owning back-reference; `None` only for the root.
    parent: Option<NodeId>,
    /// Owned, comparator-ordered child handles.
    children: Vec<NodeId>,
}

impl DiffNode {
    /// The content as a diff result, if this is a leaf.
    pub fn as_leaf(&self) -> Option<&DiffResult> {
        match &self.content {
            NodeContent::Leaf(result) => Some(result),
            _ => None,
        }
    }

    /// True for type-bucket nodes.
    pub fn is_type_bucket(&self) -> bool {
        matches!(self.content, NodeContent::TypeBucket(_))
    }

    /// True for category nodes.
    pub fn is_category(&self) -> bool {
        matches!(self.content, NodeContent::Category(_))
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// The comparison tree for one session snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffTree {
    nodes: Vec<DiffNode>,
}

impl DiffTree {
    /// Build the tree for `database` from the session's diff results.
    ///
    /// Grouping is entity type first, then one level per category path
    /// segment, then one leaf per result. Intermediate levels are synthesized
    /// whenever any descendant exists. Input order is irrelevant: siblings
    /// are stored in comparator order, so the same result set always yields a
    /// structurally identical tree.
    pub fn build(database: &str, results: Vec<DiffResult>) -> Self {
        let mut tree = Self {
            nodes: vec![DiffNode {
                content: NodeContent::Database(database.to_string()),
                parent: None,
                children: Vec::new(),
            }],
        };

        let count = results.len();
        for result in results {
            let reference = result.reference().clone();
            let bucket = tree.ensure_bucket(reference.entity_type);
            let mut cursor = bucket;
            for segment in &reference.category_path {
                cursor = tree.ensure_category(cursor, segment);
            }
            tree.push_child(
                cursor,
                NodeContent::Leaf(result),
            );
        }

        tree.sort_children(NodeId(0));
        debug!(
            database,
            results = count,
            nodes = tree.nodes.len(),
            "diff tree built"
        );
        tree
    }

    /// The root node handle (always the database node).
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &DiffNode {
        &self.nodes[id.0]
    }

    /// The parent handle, `None` for the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Comparator-ordered children of a node.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Display label of a node.
    pub fn label(&self, id: NodeId) -> &str {
        self.node(id).content.label()
    }

    /// Handles from the root down to `id`, inclusive.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.parent(cursor) {
            path.push(parent);
            cursor = parent;
        }
        path.reverse();
        path
    }

    /// All leaves with their handles, in depth-first comparator order.
    pub fn leaves(&self) -> Vec<(NodeId, &DiffResult)> {
        let mut out = Vec::new();
        self.collect_leaves(self.root(), &mut out);
        out
    }

    /// Find the leaf for a reference, if it is part of this tree.
    pub fn find_leaf(&self, reference: &Reference) -> Option<NodeId> {
        self.leaves()
            .into_iter()
            .find(|(_, result)| result.reference() == reference)
            .map(|(id, _)| id)
    }

    /// Number of conflicted leaves.
    pub fn conflict_count(&self) -> usize {
        self.leaves()
            .iter()
            .filter(|(_, result)| result.is_conflict())
            .count()
    }

    /// Total node count, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the tree holds nothing but the root.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    fn collect_leaves<'a>(&'a self, id: NodeId, out: &mut Vec<(NodeId, &'a DiffResult)>) {
        for &child in self.children(id) {
            match self.node(child).content {
                NodeContent::Leaf(ref result) => out.push((child, result)),
                _ => self.collect_leaves(child, out),
            }
        }
    }

    fn ensure_bucket(&mut self, entity_type: EntityType) -> NodeId {
        let root = self.root();
        let existing = self.children(root).iter().copied().find(|&c| {
            matches!(self.node(c).content, NodeContent::TypeBucket(t) if t == entity_type)
        });
        existing.unwrap_or_else(|| self.push_child(root, NodeContent::TypeBucket(entity_type)))
    }

    fn ensure_category(&mut self, parent: NodeId, segment: &str) -> NodeId {
        let existing = self.children(parent).iter().copied().find(|&c| {
            matches!(self.node(c).content, NodeContent::Category(ref s) if s == segment)
        });
        existing
            .unwrap_or_else(|| self.push_child(parent, NodeContent::Category(segment.to_string())))
    }

    fn push_child(&mut self, parent: NodeId, content: NodeContent) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(DiffNode {
            content,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    fn sort_children(&mut self, id: NodeId) {
        let mut children = std::mem::take(&mut self.nodes[id.0].children);
        children.sort_by(|&a, &b| order::compare(&self.nodes[a.0].content, &self.nodes[b.0].content));
        for &child in &children {
            self.sort_children(child);
        }
        self.nodes[id.0].children = children;
    }
}
