//! Deterministic sibling ordering.
//!
//! Type buckets sort by the canonical presentation order of
//! [`EntityType`](crate::models::EntityType); categories and leaves sort by
//! case-sensitive display label. Ties are broken by node kind and then by
//! reference id, which keeps the order total and stable across rebuilds.

use std::cmp::Ordering;

use crate::diff::tree::NodeContent;

/// Compare two sibling node contents.
pub fn compare(a: &NodeContent, b: &NodeContent) -> Ordering {
    match (a, b) {
        (NodeContent::TypeBucket(left), NodeContent::TypeBucket(right)) => {
            left.order_index().cmp(&right.order_index())
        }
        _ => a
            .label()
            .cmp(b.label())
            .then_with(|| kind_rank(a).cmp(&kind_rank(b)))
            .then_with(|| leaf_id(a).cmp(&leaf_id(b))),
    }
}

/// Categories sort before leaves when labels collide.
fn kind_rank(content: &NodeContent) -> u8 {
    match content {
        NodeContent::Database(_) => 0,
        NodeContent::TypeBucket(_) => 1,
        NodeContent::Category(_) => 2,
        NodeContent::Leaf(_) => 3,
    }
}

fn leaf_id(content: &NodeContent) -> Option<&str> {
    match content {
        NodeContent::Leaf(result) => Some(result.reference().id.as_str()),
        _ => None,
    }
}
