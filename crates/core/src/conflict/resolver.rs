//! Conflict resolution decisions and the document merge algorithm.
//!
//! The resolver turns a user (or policy) choice for one conflicted leaf into
//! a [`ConflictResolution`]. It never mutates its inputs; the caller stores
//! the returned resolution in the session map.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::conflict::resolution::ConflictResolution;
use crate::errors::{ConflictError, DocumentError};
use crate::models::Reference;
use crate::version::Version;

/// What the user (or a policy) picked for a conflicted leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionChoice {
    /// Discard the local change, take the remote state.
    OverwriteLocal,
    /// Keep the local state, ignore the remote change.
    KeepLocal,
    /// Merge: keep the (possibly edited) local document, bump the version.
    Merge,
}

impl std::fmt::Display for ResolutionChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OverwriteLocal => write!(f, "overwrite_local"),
            Self::KeepLocal => write!(f, "keep_local"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

/// Stateless conflict resolution operations.
pub struct ConflictResolver;

impl ConflictResolver {
    /// Compute the resolution for one conflicted leaf.
    ///
    /// `local` is the local document as displayed, `remote` the remote one,
    /// `ancestor` the common-ancestor payload if the caller has it, and
    /// `edited` the document after user edits (`None` when nothing was
    /// edited).
    ///
    /// The choice can be overridden by the payloads themselves: structurally
    /// equal sides collapse to overwrite-local, and an unedited local that
    /// matches the ancestor collapses to keep-local. A merge takes the edited
    /// local document, sets its version to the remote version with the update
    /// component incremented, and stamps `lastChange` with the current time.
    pub fn resolve(
        reference: &Reference,
        choice: ResolutionChoice,
        local: Option<&Value>,
        remote: Option<&Value>,
        ancestor: Option<&Value>,
        edited: Option<&Value>,
    ) -> Result<ConflictResolution, ConflictError> {
        Self::resolve_at(reference, choice, local, remote, ancestor, edited, Utc::now())
    }

    /// Like [`ConflictResolver::resolve`] with an explicit merge timestamp.
    pub fn resolve_at(
        reference: &Reference,
        choice: ResolutionChoice,
        local: Option<&Value>,
        remote: Option<&Value>,
        ancestor: Option<&Value>,
        edited: Option<&Value>,
        now: DateTime<Utc>,
    ) -> Result<ConflictResolution, ConflictError> {
        let left = edited.or(local);

        let sides_equal = left.is_some() && left == remote;
        if choice == ResolutionChoice::OverwriteLocal || sides_equal {
            info!(reference = %reference, "resolving conflict: overwrite local");
            return Ok(ConflictResolution::OverwriteLocal);
        }

        // With no local document and nothing edited there is nothing to keep
        // or merge; taking the remote state is the only meaningful outcome.
        let Some(left) = left else {
            info!(reference = %reference, "no local payload, resolving as overwrite local");
            return Ok(ConflictResolution::OverwriteLocal);
        };

        let unchanged_from_ancestor = ancestor.is_some() && ancestor == Some(left);
        let unedited = edited.is_none() || edited == local;
        if choice == ResolutionChoice::KeepLocal || unchanged_from_ancestor || unedited {
            info!(reference = %reference, "resolving conflict: keep local");
            return Ok(ConflictResolution::KeepLocal);
        }

        // A merge against a deleted remote has no version to bump; the
        // document access failure blocks this leaf only.
        let Some(remote) = remote else {
            return Err(ConflictError::ResolutionBlocked {
                reference: reference.to_string(),
                source: DocumentError::Missing {
                    side: "remote".to_string(),
                    reference: reference.to_string(),
                },
            });
        };

        let merged = Self::merge_documents(reference, left, remote, now)?;
        info!(reference = %reference, "resolving conflict: merge");
        Ok(ConflictResolution::Merge(merged))
    }

    /// Build the merge payload: the edited local document with `version` set
    /// to the remote version bumped at the update component and `lastChange`
    /// set to `now`. All other fields are copied verbatim.
    fn merge_documents(
        reference: &Reference,
        edited: &Value,
        remote: &Value,
        now: DateTime<Utc>,
    ) -> Result<Value, ConflictError> {
        let remote_version = remote
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(|| ConflictError::MergedVersion {
                reference: reference.to_string(),
                source: crate::errors::VersionError::MissingField,
            })?;
        let bumped = Version::parse(remote_version)
            .map_err(|source| ConflictError::MergedVersion {
                reference: reference.to_string(),
                source,
            })?
            .inc_update();

        let mut merged = edited.clone();
        let Some(fields) = merged.as_object_mut() else {
            return Err(ConflictError::ResolutionBlocked {
                reference: reference.to_string(),
                source: DocumentError::Corrupt {
                    side: "local".to_string(),
                    reference: reference.to_string(),
                    detail: "edited document is not an object".to_string(),
                },
            });
        };
        fields.insert("version".to_string(), Value::String(bumped.to_string()));
        fields.insert(
            "lastChange".to_string(),
            Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        debug!(reference = %reference, version = %bumped, "merge payload built");
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntityType;
    use chrono::TimeZone;
    use serde_json::json;

    fn reference() -> Reference {
        Reference::new(EntityType::Flow, "f1", "Steel", vec![])
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 12, 30, 0).unwrap()
    }

    fn resolve(
        choice: ResolutionChoice,
        local: Option<&Value>,
        remote: Option<&Value>,
        ancestor: Option<&Value>,
        edited: Option<&Value>,
    ) -> Result<ConflictResolution, ConflictError> {
        ConflictResolver::resolve_at(&reference(), choice, local, remote, ancestor, edited, now())
    }

    #[test]
    fn test_explicit_overwrite_local() {
        let local = json!({"name": "Steel", "version": "1.0.0"});
        let remote = json!({"name": "Steel!", "version": "1.0.1"});
        let resolution = resolve(
            ResolutionChoice::OverwriteLocal,
            Some(&local),
            Some(&remote),
            None,
            None,
        )
        .unwrap();
        assert_eq!(resolution, ConflictResolution::OverwriteLocal);
    }

    #[test]
    fn test_structurally_equal_payloads_collapse_to_overwrite() {
        let doc = json!({"name": "Steel", "version": "1.0.0"});
        let resolution =
            resolve(ResolutionChoice::Merge, Some(&doc), Some(&doc.clone()), None, None).unwrap();
        assert_eq!(resolution, ConflictResolution::OverwriteLocal);
    }

    #[test]
    fn test_explicit_keep_local() {
        let local = json!({"name": "Steel", "version": "1.1.0"});
        let remote = json!({"name": "Iron", "version": "1.0.4"});
        let resolution = resolve(
            ResolutionChoice::KeepLocal,
            Some(&local),
            Some(&remote),
            None,
            None,
        )
        .unwrap();
        assert_eq!(resolution, ConflictResolution::KeepLocal);
    }

    #[test]
    fn test_local_unchanged_from_ancestor_collapses_to_keep() {
        let ancestor = json!({"name": "Steel", "version": "1.0.0"});
        let local = ancestor.clone();
        let edited = json!({"name": "Steel", "version": "1.0.0"});
        let remote = json!({"name": "Iron", "version": "1.0.4"});
        let resolution = resolve(
            ResolutionChoice::Merge,
            Some(&local),
            Some(&remote),
            Some(&ancestor),
            Some(&edited),
        )
        .unwrap();
        assert_eq!(resolution, ConflictResolution::KeepLocal);
    }

    #[test]
    fn test_unedited_document_collapses_to_keep() {
        let local = json!({"name": "Steel", "version": "1.1.0"});
        let remote = json!({"name": "Iron", "version": "1.0.4"});
        let resolution =
            resolve(ResolutionChoice::Merge, Some(&local), Some(&remote), None, None).unwrap();
        assert_eq!(resolution, ConflictResolution::KeepLocal);
    }

    #[test]
    fn test_merge_bumps_remote_update_component() {
        let local = json!({"name": "Steel", "version": "1.2.7"});
        let edited = json!({"name": "Steel (edited)", "version": "1.2.7", "cas": "007"});
        let remote = json!({"name": "Iron", "version": "1.2.9"});
        let resolution = resolve(
            ResolutionChoice::Merge,
            Some(&local),
            Some(&remote),
            None,
            Some(&edited),
        )
        .unwrap();

        let merged = resolution.merged_document().unwrap();
        assert_eq!(merged["version"], "1.2.10");
        assert_eq!(merged["name"], "Steel (edited)");
        assert_eq!(merged["cas"], "007");
        assert_eq!(merged["lastChange"], "2024-05-17T12:30:00.000Z");
    }

    #[test]
    fn test_missing_local_payload_takes_remote() {
        let remote = json!({"name": "Iron", "version": "2.0.0"});
        let resolution = resolve(ResolutionChoice::Merge, None, Some(&remote), None, None).unwrap();
        assert_eq!(resolution, ConflictResolution::OverwriteLocal);
    }

    #[test]
    fn test_malformed_remote_version_fails_the_merge_only() {
        let local = json!({"name": "Steel", "version": "1.0.0"});
        let edited = json!({"name": "Steel (edited)", "version": "1.0.0"});
        let remote = json!({"name": "Iron", "version": "not-a-version"});
        let err = resolve(
            ResolutionChoice::Merge,
            Some(&local),
            Some(&remote),
            None,
            Some(&edited),
        )
        .unwrap_err();
        assert!(matches!(err, ConflictError::MergedVersion { .. }));
    }

    #[test]
    fn test_remote_without_version_field_fails_the_merge() {
        let local = json!({"name": "Steel"});
        let edited = json!({"name": "Steel (edited)"});
        let remote = json!({"name": "Iron"});
        let err = resolve(
            ResolutionChoice::Merge,
            Some(&local),
            Some(&remote),
            None,
            Some(&edited),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConflictError::MergedVersion {
                source: crate::errors::VersionError::MissingField,
                ..
            }
        ));
        assert!(err.to_string().contains("no version field"));
    }
}
