//! State-based filtering of snapshots.

use sift_error::Result;
use sift_types::{SnapshotInfo, SnapshotState};

use super::SnapshotFilter;

/// A filter matching snapshots by their reported completion state.
///
/// Snapshots with an absent or unrecognized state never match: an inclusive
/// filter removes them, an exclusive one keeps them.
///
/// # Example
///
/// ```
/// use sift_engine::{SnapshotFilter, StateFilter};
/// use sift_types::{SnapshotInfo, SnapshotState};
///
/// let filter = StateFilter::new("SUCCESS", false).unwrap();
///
/// let done = SnapshotInfo::new("a").with_state(SnapshotState::Success);
/// let running = SnapshotInfo::new("b").with_state(SnapshotState::InProgress);
///
/// assert!(filter.keep(&done));
/// assert!(!filter.keep(&running));
/// ```
#[derive(Debug, Clone)]
pub struct StateFilter {
    state: SnapshotState,
    exclude: bool,
}

impl StateFilter {
    /// Create a state filter.
    ///
    /// # Errors
    ///
    /// Returns [`sift_error::SiftError::InvalidValue`] when `state` names no
    /// recognized snapshot state.
    pub fn new(state: &str, exclude: bool) -> Result<Self> {
        Ok(Self {
            state: state.parse()?,
            exclude,
        })
    }

    /// The state this filter compares against.
    pub fn state(&self) -> SnapshotState {
        self.state
    }
}

impl SnapshotFilter for StateFilter {
    fn matches(&self, info: &SnapshotInfo) -> bool {
        info.state == Some(self.state)
    }

    fn exclude(&self) -> bool {
        self.exclude
    }

    fn description(&self) -> String {
        format!("state(state={}, exclude={})", self.state, self.exclude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_error::SiftError;

    #[test]
    fn test_inclusive_keeps_matching_state() {
        let filter = StateFilter::new("SUCCESS", false).unwrap();

        let success = SnapshotInfo::new("a").with_state(SnapshotState::Success);
        let partial = SnapshotInfo::new("b").with_state(SnapshotState::Partial);

        assert!(filter.keep(&success));
        assert!(!filter.keep(&partial));
    }

    #[test]
    fn test_exclusive_inverts() {
        let filter = StateFilter::new("SUCCESS", true).unwrap();

        let success = SnapshotInfo::new("a").with_state(SnapshotState::Success);
        let in_progress = SnapshotInfo::new("b").with_state(SnapshotState::InProgress);

        assert!(!filter.keep(&success));
        assert!(filter.keep(&in_progress));
    }

    #[test]
    fn test_absent_state_never_matches() {
        let inclusive = StateFilter::new("SUCCESS", false).unwrap();
        let exclusive = StateFilter::new("SUCCESS", true).unwrap();
        let stateless = SnapshotInfo::new("a");

        assert!(!inclusive.keep(&stateless));
        assert!(exclusive.keep(&stateless));
    }

    #[test]
    fn test_invalid_state_rejected() {
        let result = StateFilter::new("invalid", false);
        assert!(matches!(result, Err(SiftError::InvalidValue(_))));
    }

    #[test]
    fn test_description() {
        let filter = StateFilter::new("IN_PROGRESS", true).unwrap();
        let desc = filter.description();
        assert!(desc.contains("IN_PROGRESS"));
        assert!(desc.contains("exclude=true"));
    }
}
