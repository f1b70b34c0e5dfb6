//! Collaborator interfaces for snapsift.
//!
//! The filter engine never talks to a cluster directly; it consumes the
//! [`SnapshotSource`] boundary. Production implementations wrap a cluster
//! client; tests use in-memory stubs.

use sift_types::{RepositoryInfo, SnapshotInfo};
use std::collections::HashMap;

/// The metadata-fetcher boundary.
///
/// Implementations return raw listings as the cluster reports them; the
/// engine performs exactly one `repositories()` and one `snapshots()` call
/// per registry construction and never retries. Retry and backoff policy,
/// if any, belongs behind this trait.
///
/// Errors are untyped (`anyhow`) because they originate outside the engine;
/// the registry wraps them into `SiftError::FailedExecution`.
pub trait SnapshotSource {
    /// List the repositories the cluster knows about, keyed by name.
    fn repositories(&self) -> anyhow::Result<HashMap<String, RepositoryInfo>>;

    /// List every snapshot in the named repository.
    fn snapshots(&self, repository: &str) -> anyhow::Result<Vec<SnapshotInfo>>;
}
