//! Resolution decisions and the per-session resolution map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::Reference;

// ---------------------------------------------------------------------------
// Resolutions
// ---------------------------------------------------------------------------

/// The chosen strategy for one conflicted reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "kind", content = "payload")]
pub enum ConflictResolution {
    /// Discard the local change and take the remote state.
    OverwriteLocal,
    /// Keep the local state and ignore the remote change.
    KeepLocal,
    /// Write back the carried document, already version-bumped.
    Merge(Value),
}

impl ConflictResolution {
    /// True for [`ConflictResolution::OverwriteLocal`].
    pub fn is_overwrite_local(&self) -> bool {
        matches!(self, Self::OverwriteLocal)
    }

    /// The merged document, if this is a [`ConflictResolution::Merge`].
    pub fn merged_document(&self) -> Option<&Value> {
        match self {
            Self::Merge(document) => Some(document),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConflictResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverwriteLocal => write!(f, "overwrite_local"),
            Self::KeepLocal => write!(f, "keep_local"),
            Self::Merge(_) => write!(f, "merge"),
        }
    }
}

// ---------------------------------------------------------------------------
// Resolution map
// ---------------------------------------------------------------------------

/// Per-reference resolutions recorded during one collaboration session.
///
/// Grows only by explicit resolve actions; resolving the same reference again
/// overwrites the earlier entry (last-write-wins). The commit step consumes
/// the map when the session completes; it is never carried into the next
/// session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConflictResolutionMap {
    entries: HashMap<Reference, ConflictResolution>,
}

impl ConflictResolutionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a resolution, replacing any earlier one for the reference.
    /// Returns the replaced entry, if any.
    pub fn insert(
        &mut self,
        reference: Reference,
        resolution: ConflictResolution,
    ) -> Option<ConflictResolution> {
        self.entries.insert(reference, resolution)
    }

    /// The recorded resolution for a reference, if any.
    pub fn get(&self, reference: &Reference) -> Option<&ConflictResolution> {
        self.entries.get(reference)
    }

    /// True when a resolution has been recorded for the reference.
    pub fn contains(&self, reference: &Reference) -> bool {
        self.entries.contains_key(reference)
    }

    /// Number of recorded resolutions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been resolved yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all recorded resolutions.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over recorded resolutions.
    pub fn iter(&self) -> impl Iterator<Item = (&Reference, &ConflictResolution)> {
        self.entries.iter()
    }
}

impl IntoIterator for ConflictResolutionMap {
    type Item = (Reference, ConflictResolution);
    type IntoIter = std::collections::hash_map::IntoIter<Reference, ConflictResolution>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;
    use serde_json::json;

    fn reference() -> Reference {
        Reference::new(EntityType::Flow, "f1", "Steel", vec![])
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut map = ConflictResolutionMap::new();
        assert!(!map.contains(&reference()));

        map.insert(reference(), ConflictResolution::KeepLocal);
        assert!(map.contains(&reference()));
        assert_eq!(map.get(&reference()), Some(&ConflictResolution::KeepLocal));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_second_resolution_wins() {
        let mut map = ConflictResolutionMap::new();
        map.insert(reference(), ConflictResolution::KeepLocal);
        let replaced = map.insert(reference(), ConflictResolution::OverwriteLocal);

        assert_eq!(replaced, Some(ConflictResolution::KeepLocal));
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.get(&reference()),
            Some(&ConflictResolution::OverwriteLocal)
        );
    }

    #[test]
    fn test_clear_empties_the_map() {
        let mut map = ConflictResolutionMap::new();
        map.insert(reference(), ConflictResolution::Merge(json!({"v": 1})));
        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn test_merge_carries_its_document() {
        let resolution = ConflictResolution::Merge(json!({"version": "1.0.1"}));
        assert_eq!(
            resolution.merged_document().unwrap()["version"],
            "1.0.1"
        );
        assert!(!resolution.is_overwrite_local());
        assert_eq!(resolution.to_string(), "merge");
    }
}
