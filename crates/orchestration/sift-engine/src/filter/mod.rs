//! Predicate filters over snapshot records.
//!
//! Each filter family validates its parameters at construction and exposes a
//! pure predicate; polarity (`exclude`) is applied uniformly through
//! [`SnapshotFilter::keep`]. Construction failures surface before any
//! working-set mutation.

mod age;
mod pattern;
mod state;

pub use age::AgeFilter;
pub use pattern::{coerce_pattern_value, PatternFilter, PatternKind};
pub use state::StateFilter;

use sift_types::SnapshotInfo;

/// Trait for filtering snapshots in a registry's working set.
///
/// `matches` answers whether a snapshot satisfies the filter's predicate;
/// `keep` folds in the inclusive/exclusive polarity and is what the registry
/// applies to every surviving record.
pub trait SnapshotFilter {
    /// Check whether a snapshot satisfies the predicate (ignoring polarity).
    fn matches(&self, info: &SnapshotInfo) -> bool;

    /// Whether this filter removes matching snapshots instead of keeping them.
    fn exclude(&self) -> bool {
        false
    }

    /// Whether a snapshot survives this filter.
    fn keep(&self, info: &SnapshotInfo) -> bool {
        self.matches(info) != self.exclude()
    }

    /// Human-readable description, used in logging.
    fn description(&self) -> String;
}
