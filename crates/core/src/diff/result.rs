//! Combined local + remote view of one reference's changes.

use serde::{Deserialize, Serialize};

use crate::models::{Diff, DiffType, Reference};

/// The paired local/remote change record for a single reference.
///
/// At least one side is always present: a reference with no diff on either
/// side has no business being materialized, and the session builder never
/// constructs one. Fields are private so that invariant holds by
/// construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiffResult {
    local: Option<Diff>,
    remote: Option<Diff>,
}

impl DiffResult {
    /// Pair the two sides' diffs for one reference.
    ///
    /// # Panics
    ///
    /// Panics if both sides are `None`. That is a programming error in the
    /// caller, not a recoverable condition.
    pub fn new(local: Option<Diff>, remote: Option<Diff>) -> Self {
        assert!(
            local.is_some() || remote.is_some(),
            "a DiffResult needs a diff on at least one side"
        );
        Self { local, remote }
    }

    /// The local-side diff, if the reference changed locally.
    pub fn local(&self) -> Option<&Diff> {
        self.local.as_ref()
    }

    /// The remote-side diff, if the reference changed remotely.
    pub fn remote(&self) -> Option<&Diff> {
        self.remote.as_ref()
    }

    /// The reference both sides agree on.
    pub fn reference(&self) -> &Reference {
        self.local
            .as_ref()
            .map(|d| &d.reference)
            .or_else(|| self.remote.as_ref().map(|d| &d.reference))
            .unwrap() // invariant: one side is always present
    }

    /// True when the two sides introduce no user-visible difference.
    ///
    /// That is the case when both sides deleted the reference, or both
    /// recorded the same change kind with equal content digests. Absent
    /// digests are treated as unequal, keeping classification conservative.
    pub fn no_action(&self) -> bool {
        match (&self.local, &self.remote) {
            (Some(local), Some(remote)) => {
                if local.diff_type != remote.diff_type {
                    return false;
                }
                if local.diff_type == DiffType::Deleted {
                    return true;
                }
                matches!((&local.digest, &remote.digest), (Some(a), Some(b)) if a == b)
            }
            _ => false,
        }
    }

    /// True when both sides changed the reference and the changes are not
    /// trivially reconcilable. Such a leaf must be resolved before the merged
    /// state can be committed.
    pub fn is_conflict(&self) -> bool {
        self.local.is_some() && self.remote.is_some() && !self.no_action()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;

    fn reference() -> Reference {
        Reference::new(EntityType::Process, "p1", "Rolling", vec![])
    }

    fn diff(diff_type: DiffType, digest: Option<&str>) -> Diff {
        Diff {
            reference: reference(),
            diff_type,
            digest: digest.map(str::to_string),
        }
    }

    #[test]
    #[should_panic(expected = "at least one side")]
    fn test_both_sides_none_panics() {
        let _ = DiffResult::new(None, None);
    }

    #[test]
    fn test_local_only_is_not_conflict() {
        let result = DiffResult::new(Some(diff(DiffType::Added, Some("a"))), None);
        assert!(!result.no_action());
        assert!(!result.is_conflict());
        assert_eq!(result.reference(), &reference());
    }

    #[test]
    fn test_remote_only_is_not_conflict() {
        let result = DiffResult::new(None, Some(diff(DiffType::Deleted, None)));
        assert!(!result.no_action());
        assert!(!result.is_conflict());
    }

    #[test]
    fn test_both_deleted_is_no_action() {
        let result = DiffResult::new(
            Some(diff(DiffType::Deleted, None)),
            Some(diff(DiffType::Deleted, None)),
        );
        assert!(result.no_action());
        assert!(!result.is_conflict());
    }

    #[test]
    fn test_identical_modifications_are_no_action() {
        let result = DiffResult::new(
            Some(diff(DiffType::Modified, Some("same"))),
            Some(diff(DiffType::Modified, Some("same"))),
        );
        assert!(result.no_action());
        assert!(!result.is_conflict());
    }

    #[test]
    fn test_differing_modifications_conflict() {
        let result = DiffResult::new(
            Some(diff(DiffType::Modified, Some("ours"))),
            Some(diff(DiffType::Modified, Some("theirs"))),
        );
        assert!(result.is_conflict());
    }

    #[test]
    fn test_missing_digests_conflict() {
        // Without digests equality cannot be established, so the pair is
        // treated as conflicting rather than silently dropped.
        let result = DiffResult::new(
            Some(diff(DiffType::Modified, None)),
            Some(diff(DiffType::Modified, None)),
        );
        assert!(result.is_conflict());
    }

    #[test]
    fn test_edit_delete_conflict() {
        let result = DiffResult::new(
            Some(diff(DiffType::Modified, Some("ours"))),
            Some(diff(DiffType::Deleted, None)),
        );
        assert!(result.is_conflict());
    }
}
