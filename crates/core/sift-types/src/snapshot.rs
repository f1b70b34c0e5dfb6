//! Snapshot and repository metadata records.

use serde::{Deserialize, Deserializer, Serialize};
use sift_error::SiftError;
use std::fmt;
use std::str::FromStr;

/// Completion status of a snapshot as reported by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SnapshotState {
    /// Snapshot completed successfully
    Success,

    /// Snapshot completed but some shards failed
    Partial,

    /// Snapshot failed
    Failed,

    /// Snapshot is still running
    InProgress,
}

impl SnapshotState {
    /// The cluster's wire name for this state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Partial => "PARTIAL",
            Self::Failed => "FAILED",
            Self::InProgress => "IN_PROGRESS",
        }
    }
}

impl fmt::Display for SnapshotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotState {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(Self::Success),
            "PARTIAL" => Ok(Self::Partial),
            "FAILED" => Ok(Self::Failed),
            "IN_PROGRESS" => Ok(Self::InProgress),
            other => Err(SiftError::InvalidValue(format!(
                "'{other}' is not a snapshot state. Expected one of: SUCCESS, PARTIAL, FAILED, IN_PROGRESS"
            ))),
        }
    }
}

/// Metadata record for one cluster-reported snapshot.
///
/// The `name` is the primary key within a registry. All other fields may be
/// absent in the cluster's listing; fields the engine does not interpret are
/// carried opaquely in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotInfo {
    /// Unique snapshot name within its repository
    pub name: String,

    /// Reported completion status. Unrecognized values decode as `None`
    /// and never match a state filter.
    #[serde(default, deserialize_with = "lenient_state")]
    pub state: Option<SnapshotState>,

    /// Cluster-reported start time, seconds since epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_epoch: Option<i64>,

    /// Epoch seconds derived from the name against a timestring pattern.
    /// Written by the age resolver on each name-sourced age filter pass;
    /// `None` when the pattern does not occur in the name.
    #[serde(skip)]
    pub age_by_name: Option<i64>,

    /// Other cluster-reported fields, carried opaquely
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SnapshotInfo {
    /// Create a record with only a name; remaining fields absent.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: None,
            start_time_epoch: None,
            age_by_name: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Set the reported state.
    pub fn with_state(mut self, state: SnapshotState) -> Self {
        self.state = Some(state);
        self
    }

    /// Set the reported start time (epoch seconds).
    pub fn with_start_time(mut self, epoch: i64) -> Self {
        self.start_time_epoch = Some(epoch);
        self
    }
}

/// Decode a state string, mapping unrecognized values to `None` instead of
/// failing the whole listing.
fn lenient_state<'de, D>(deserializer: D) -> Result<Option<SnapshotState>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| SnapshotState::from_str(&s).ok()))
}

/// Repository descriptor.
///
/// The engine only uses this to verify that a named repository exists before
/// listing its snapshots; the contents are otherwise opaque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryInfo {
    /// Repository backend type (e.g. "fs", "s3")
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Backend-specific settings, carried opaquely
    #[serde(flatten)]
    pub settings: serde_json::Map<String, serde_json::Value>,
}

impl RepositoryInfo {
    /// Create a descriptor with the given backend type.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            settings: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for name in ["SUCCESS", "PARTIAL", "FAILED", "IN_PROGRESS"] {
            let state: SnapshotState = name.parse().unwrap();
            assert_eq!(state.as_str(), name);
        }
    }

    #[test]
    fn test_state_rejects_unknown() {
        let result = "invalid".parse::<SnapshotState>();
        assert!(matches!(result, Err(SiftError::InvalidValue(_))));
    }

    #[test]
    fn test_snapshot_info_builder() {
        let info = SnapshotInfo::new("snapshot-2015.03.01")
            .with_state(SnapshotState::Success)
            .with_start_time(1425168002);

        assert_eq!(info.name, "snapshot-2015.03.01");
        assert_eq!(info.state, Some(SnapshotState::Success));
        assert_eq!(info.start_time_epoch, Some(1425168002));
        assert!(info.age_by_name.is_none());
    }

    #[test]
    fn test_snapshot_info_from_listing_json() {
        let json = r#"{
            "name": "snap_name",
            "state": "SUCCESS",
            "start_time_epoch": 1422748800,
            "indices": ["index-2015.01.01"]
        }"#;
        let info: SnapshotInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.state, Some(SnapshotState::Success));
        assert_eq!(info.start_time_epoch, Some(1422748800));
        // Uninterpreted fields survive opaquely
        assert!(info.extra.contains_key("indices"));
    }

    #[test]
    fn test_snapshot_info_unrecognized_state_is_none() {
        let json = r#"{"name": "snap", "state": "SOMETHING_NEW"}"#;
        let info: SnapshotInfo = serde_json::from_str(json).unwrap();
        assert!(info.state.is_none());
    }

    #[test]
    fn test_repository_info_yaml() {
        let yaml = r#"
type: fs
location: /backups
"#;
        let repo: RepositoryInfo = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(repo.kind.as_deref(), Some("fs"));
        assert!(repo.settings.contains_key("location"));
    }
}
