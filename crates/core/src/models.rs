//! Domain model types shared across the RefSync core.
//!
//! These types describe *facts* handed to the core by the version-control
//! layer: which entity changed, on which side, and how. They carry no
//! behavior beyond identity and labeling.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entity types
// ---------------------------------------------------------------------------

/// The fixed set of entity kinds in the database.
///
/// The declaration order is the canonical presentation order used by the
/// surrounding application; sibling type buckets in a diff tree sort by it,
/// never alphabetically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Project,
    System,
    Process,
    Flow,
    Quantity,
    Unit,
    Actor,
    Source,
    Location,
}

impl EntityType {
    /// All entity types in canonical presentation order.
    pub const ALL: [EntityType; 9] = [
        Self::Project,
        Self::System,
        Self::Process,
        Self::Flow,
        Self::Quantity,
        Self::Unit,
        Self::Actor,
        Self::Source,
        Self::Location,
    ];

    /// Position within the canonical presentation order.
    pub fn order_index(self) -> usize {
        Self::ALL.iter().position(|t| *t == self).unwrap_or(usize::MAX)
    }

    /// Plural label used for type-bucket nodes.
    pub fn plural_label(self) -> &'static str {
        match self {
            Self::Project => "Projects",
            Self::System => "Systems",
            Self::Process => "Processes",
            Self::Flow => "Flows",
            Self::Quantity => "Quantities",
            Self::Unit => "Units",
            Self::Actor => "Actors",
            Self::Source => "Sources",
            Self::Location => "Locations",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Project => write!(f, "project"),
            Self::System => write!(f, "system"),
            Self::Process => write!(f, "process"),
            Self::Flow => write!(f, "flow"),
            Self::Quantity => write!(f, "quantity"),
            Self::Unit => write!(f, "unit"),
            Self::Actor => write!(f, "actor"),
            Self::Source => write!(f, "source"),
            Self::Location => write!(f, "location"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sides
// ---------------------------------------------------------------------------

/// Which copy of the database a fact refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Local,
    Remote,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// Stable identity of one entity, independent of which side it came from.
///
/// Equality and hashing consider only `(entity_type, id)`; display name and
/// category path are presentation data and may differ between sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    /// The entity kind.
    pub entity_type: EntityType,
    /// Stable UUID string assigned when the entity was created.
    pub id: String,
    /// Human-readable name for labels.
    pub display_name: String,
    /// Category path segments, outermost first.
    pub category_path: Vec<String>,
}

impl Reference {
    /// Create a reference with an explicit category path.
    pub fn new(
        entity_type: EntityType,
        id: impl Into<String>,
        display_name: impl Into<String>,
        category_path: Vec<String>,
    ) -> Self {
        Self {
            entity_type,
            id: id.into(),
            display_name: display_name.into(),
            category_path,
        }
    }

    /// Create a reference from a slash-delimited category path.
    ///
    /// Segments are case-sensitive; an empty string means "no category".
    pub fn with_category(
        entity_type: EntityType,
        id: impl Into<String>,
        display_name: impl Into<String>,
        category: &str,
    ) -> Self {
        let category_path = if category.is_empty() {
            Vec::new()
        } else {
            category.split('/').map(str::to_string).collect()
        };
        Self::new(entity_type, id, display_name, category_path)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type && self.id == other.id
    }
}

impl Eq for Reference {}

impl std::hash::Hash for Reference {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.entity_type.hash(state);
        self.id.hash(state);
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.entity_type, self.id)
    }
}

// ---------------------------------------------------------------------------
// Diffs
// ---------------------------------------------------------------------------

/// Kind of change recorded for one side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiffType {
    Added,
    Modified,
    Deleted,
}

impl std::fmt::Display for DiffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Added => write!(f, "added"),
            Self::Modified => write!(f, "modified"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// One side's recorded change for a reference, relative to the common
/// ancestor. Absence of a `Diff` for a side means "unchanged on that side".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diff {
    /// The entity this change applies to.
    pub reference: Reference,
    /// What happened to it on this side.
    pub diff_type: DiffType,
    /// Content hash of the object after the change, as reported by the
    /// git-backed store. `None` for deletions. Equal digests on both sides
    /// mean the payloads are semantically equal.
    pub digest: Option<String>,
}

impl Diff {
    /// Create a diff without a content digest.
    pub fn new(reference: Reference, diff_type: DiffType) -> Self {
        Self {
            reference,
            diff_type,
            digest: None,
        }
    }

    /// Create a diff carrying the post-change content digest.
    pub fn with_digest(
        reference: Reference,
        diff_type: DiffType,
        digest: impl Into<String>,
    ) -> Self {
        Self {
            reference,
            diff_type,
            digest: Some(digest.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_entity_type_order_is_declaration_order() {
        assert_eq!(EntityType::Project.order_index(), 0);
        assert_eq!(EntityType::Location.order_index(), 8);
        assert!(EntityType::Process.order_index() < EntityType::Flow.order_index());
    }

    #[test]
    fn test_reference_equality_ignores_display_fields() {
        let a = Reference::with_category(EntityType::Flow, "f1", "Steel", "materials/metals");
        let b = Reference::with_category(EntityType::Flow, "f1", "Steel (renamed)", "other");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_reference_distinct_types_not_equal() {
        let a = Reference::new(EntityType::Flow, "x", "X", vec![]);
        let b = Reference::new(EntityType::Process, "x", "X", vec![]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_category_path_splitting() {
        let r = Reference::with_category(EntityType::Process, "p1", "Rolling", "metals/steel");
        assert_eq!(r.category_path, vec!["metals".to_string(), "steel".to_string()]);

        let uncategorized = Reference::with_category(EntityType::Process, "p2", "Casting", "");
        assert!(uncategorized.category_path.is_empty());
    }
}
