//! Overlay classification.
//!
//! The overlay is the derived visual/semantic state used to badge a tree
//! node. Classification is a pure function of the leaf's [`DiffResult`] and
//! the session's recorded resolutions; it performs no I/O and cannot fail.

use serde::{Deserialize, Serialize};

use crate::conflict::resolution::ConflictResolutionMap;
use crate::diff::result::DiffResult;
use crate::models::DiffType;

/// Visual/semantic state of a leaf.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    AddToLocal,
    ModifyInLocal,
    DeleteFromLocal,
    AddToRemote,
    ModifyInRemote,
    DeleteFromRemote,
    Conflict,
    Merged,
}

impl std::fmt::Display for Overlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AddToLocal => write!(f, "add_to_local"),
            Self::ModifyInLocal => write!(f, "modify_in_local"),
            Self::DeleteFromLocal => write!(f, "delete_from_local"),
            Self::AddToRemote => write!(f, "add_to_remote"),
            Self::ModifyInRemote => write!(f, "modify_in_remote"),
            Self::DeleteFromRemote => write!(f, "delete_from_remote"),
            Self::Conflict => write!(f, "conflict"),
            Self::Merged => write!(f, "merged"),
        }
    }
}

/// Classify a leaf against the session's resolutions.
///
/// Returns `None` for leaves with no user-visible difference. The rules
/// apply in order: no-action, already-resolved, one-sided, conflict.
pub fn overlay(result: &DiffResult, resolutions: &ConflictResolutionMap) -> Option<Overlay> {
    if result.no_action() {
        return None;
    }
    if resolutions.contains(result.reference()) {
        return Some(merged_overlay(result, resolutions));
    }
    match (result.local(), result.remote()) {
        (Some(local), None) => Some(local_overlay(local.diff_type)),
        (None, Some(remote)) => Some(remote_overlay(remote.diff_type)),
        (Some(_), Some(_)) => Some(Overlay::Conflict),
        // The DiffResult constructor rules this out.
        (None, None) => None,
    }
}

fn local_overlay(diff_type: DiffType) -> Overlay {
    match diff_type {
        DiffType::Added => Overlay::AddToLocal,
        DiffType::Modified => Overlay::ModifyInLocal,
        DiffType::Deleted => Overlay::DeleteFromLocal,
    }
}

fn remote_overlay(diff_type: DiffType) -> Overlay {
    match diff_type {
        DiffType::Added => Overlay::AddToRemote,
        DiffType::Modified => Overlay::ModifyInRemote,
        DiffType::Deleted => Overlay::DeleteFromRemote,
    }
}

/// Overlay for a leaf whose reference already has a recorded resolution.
///
/// Anything but overwrite-local shows as merged. For overwrite-local the
/// original local diff is being discarded, so the effective local action is
/// recomputed from the remote's prior state.
fn merged_overlay(result: &DiffResult, resolutions: &ConflictResolutionMap) -> Overlay {
    let overwrite = resolutions
        .get(result.reference())
        .map(|r| r.is_overwrite_local())
        .unwrap_or(false);
    if !overwrite {
        return Overlay::Merged;
    }
    if matches!(result.remote(), Some(remote) if remote.diff_type == DiffType::Deleted) {
        return Overlay::DeleteFromLocal;
    }
    let local_deleted_or_absent = match result.local() {
        None => true,
        Some(local) => local.diff_type == DiffType::Deleted,
    };
    if local_deleted_or_absent {
        return Overlay::AddToLocal;
    }
    Overlay::ModifyInLocal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::resolution::ConflictResolution;
    use crate::models::{Diff, EntityType, Reference};
    use serde_json::json;

    fn reference() -> Reference {
        Reference::new(EntityType::Flow, "f1", "Steel", vec![])
    }

    fn diff(diff_type: DiffType, digest: Option<&str>) -> Diff {
        Diff {
            reference: reference(),
            diff_type,
            digest: digest.map(str::to_string),
        }
    }

    fn one_sided_local(diff_type: DiffType) -> DiffResult {
        DiffResult::new(Some(diff(diff_type, Some("d"))), None)
    }

    fn one_sided_remote(diff_type: DiffType) -> DiffResult {
        DiffResult::new(None, Some(diff(diff_type, Some("d"))))
    }

    fn conflicted() -> DiffResult {
        DiffResult::new(
            Some(diff(DiffType::Modified, Some("ours"))),
            Some(diff(DiffType::Modified, Some("theirs"))),
        )
    }

    #[test]
    fn test_no_action_has_no_overlay() {
        let result = DiffResult::new(
            Some(diff(DiffType::Deleted, None)),
            Some(diff(DiffType::Deleted, None)),
        );
        assert_eq!(overlay(&result, &ConflictResolutionMap::new()), None);
    }

    #[test]
    fn test_local_only_changes() {
        let empty = ConflictResolutionMap::new();
        assert_eq!(
            overlay(&one_sided_local(DiffType::Added), &empty),
            Some(Overlay::AddToLocal)
        );
        assert_eq!(
            overlay(&one_sided_local(DiffType::Modified), &empty),
            Some(Overlay::ModifyInLocal)
        );
        assert_eq!(
            overlay(&one_sided_local(DiffType::Deleted), &empty),
            Some(Overlay::DeleteFromLocal)
        );
    }

    #[test]
    fn test_remote_only_changes() {
        let empty = ConflictResolutionMap::new();
        assert_eq!(
            overlay(&one_sided_remote(DiffType::Added), &empty),
            Some(Overlay::AddToRemote)
        );
        assert_eq!(
            overlay(&one_sided_remote(DiffType::Modified), &empty),
            Some(Overlay::ModifyInRemote)
        );
        assert_eq!(
            overlay(&one_sided_remote(DiffType::Deleted), &empty),
            Some(Overlay::DeleteFromRemote)
        );
    }

    #[test]
    fn test_unrelated_resolutions_do_not_leak() {
        let mut resolutions = ConflictResolutionMap::new();
        let other = Reference::new(EntityType::Unit, "u9", "kg", vec![]);
        resolutions.insert(other, ConflictResolution::OverwriteLocal);

        assert_eq!(
            overlay(&one_sided_local(DiffType::Added), &resolutions),
            Some(Overlay::AddToLocal)
        );
    }

    #[test]
    fn test_both_sides_differing_is_conflict() {
        assert_eq!(
            overlay(&conflicted(), &ConflictResolutionMap::new()),
            Some(Overlay::Conflict)
        );
    }

    #[test]
    fn test_non_overwrite_resolution_shows_merged() {
        let mut resolutions = ConflictResolutionMap::new();
        resolutions.insert(reference(), ConflictResolution::KeepLocal);
        assert_eq!(
            overlay(&conflicted(), &resolutions),
            Some(Overlay::Merged)
        );

        resolutions.insert(reference(), ConflictResolution::Merge(json!({})));
        assert_eq!(
            overlay(&conflicted(), &resolutions),
            Some(Overlay::Merged)
        );
    }

    #[test]
    fn test_overwrite_local_recomputes_effective_action() {
        let mut resolutions = ConflictResolutionMap::new();
        resolutions.insert(reference(), ConflictResolution::OverwriteLocal);

        // Remote deleted: taking the remote state deletes locally.
        let remote_deleted = DiffResult::new(
            Some(diff(DiffType::Modified, Some("ours"))),
            Some(diff(DiffType::Deleted, None)),
        );
        assert_eq!(
            overlay(&remote_deleted, &resolutions),
            Some(Overlay::DeleteFromLocal)
        );

        // Local deleted, remote modified: taking the remote re-adds locally.
        let local_deleted = DiffResult::new(
            Some(diff(DiffType::Deleted, None)),
            Some(diff(DiffType::Modified, Some("theirs"))),
        );
        assert_eq!(
            overlay(&local_deleted, &resolutions),
            Some(Overlay::AddToLocal)
        );

        // Both modified: taking the remote modifies locally.
        assert_eq!(
            overlay(&conflicted(), &resolutions),
            Some(Overlay::ModifyInLocal)
        );
    }
}
