//! Age-based filtering of snapshots.

use sift_error::{Result, SiftError};
use sift_types::SnapshotInfo;

use super::SnapshotFilter;
use crate::age::{resolve_age, threshold_epoch, AgeSource, Direction, TimeUnit};
use crate::timestring::Timestring;

/// A filter comparing resolved snapshot ages against a threshold instant.
///
/// The threshold is the reference point (an explicit epoch, or the wall
/// clock at construction) minus `unit_count` units. A snapshot is kept when
/// it is `older` (age ≤ threshold) or `younger` (age ≥ threshold) — boundary
/// equality satisfies both directions. A snapshot whose age cannot be
/// resolved fails the comparison and is removed regardless of direction.
///
/// # Example
///
/// ```
/// use sift_engine::{AgeFilter, SnapshotFilter};
/// use sift_types::SnapshotInfo;
///
/// // Older than the instant 1425168001, judging by the name
/// let filter = AgeFilter::new(
///     Some("name"),
///     Some("older"),
///     Some("%Y.%m.%d"),
///     Some("seconds"),
///     0,
///     Some(1425168001),
/// )
/// .unwrap();
///
/// assert!(filter.keep(&SnapshotInfo::new("snapshot-2015.03.01")));
/// assert!(!filter.keep(&SnapshotInfo::new("snap_name"))); // age unknown
/// ```
#[derive(Debug, Clone)]
pub struct AgeFilter {
    source: AgeSource,
    direction: Direction,
    timestring: Option<Timestring>,
    unit: TimeUnit,
    unit_count: i64,
    threshold: i64,
}

impl AgeFilter {
    /// Create an age filter, validating every parameter.
    ///
    /// # Errors
    ///
    /// - [`SiftError::MissingArgument`] when `direction` is absent, or when
    ///   `source` is `name` without a `timestring`.
    /// - [`SiftError::InvalidValue`] for an unrecognized `direction`,
    ///   `source`, `unit`, or timestring token.
    pub fn new(
        source: Option<&str>,
        direction: Option<&str>,
        timestring: Option<&str>,
        unit: Option<&str>,
        unit_count: i64,
        epoch: Option<i64>,
    ) -> Result<Self> {
        let direction = direction
            .ok_or_else(|| SiftError::MissingArgument("direction".to_string()))?
            .parse::<Direction>()?;

        let source = match source {
            Some(s) => s.parse::<AgeSource>()?,
            None => AgeSource::default(),
        };

        // An empty timestring would derive a match-everything regex;
        // treat it as absent
        let timestring = timestring.filter(|pattern| !pattern.is_empty());
        let timestring = match (source, timestring) {
            (AgeSource::Name, None) => {
                return Err(SiftError::MissingArgument(
                    "timestring is required when source is 'name'".to_string(),
                ))
            }
            (AgeSource::Name, Some(pattern)) => Some(Timestring::new(pattern)?),
            // creation_date ignores any supplied timestring
            (AgeSource::CreationDate, _) => None,
        };

        let unit = match unit {
            Some(u) => u.parse::<TimeUnit>()?,
            None => TimeUnit::default(),
        };

        Ok(Self {
            source,
            direction,
            timestring,
            unit,
            unit_count,
            threshold: threshold_epoch(epoch, unit, unit_count),
        })
    }

    /// Where this filter resolves ages from.
    pub fn source(&self) -> AgeSource {
        self.source
    }

    /// The compiled timestring, when the source is the snapshot name.
    pub fn timestring(&self) -> Option<&Timestring> {
        self.timestring.as_ref()
    }

    /// Resolve a snapshot's age the way this filter will compare it.
    pub fn resolve(&self, info: &SnapshotInfo) -> Option<i64> {
        resolve_age(info, self.source, self.timestring.as_ref())
    }

    /// The computed threshold instant (epoch seconds).
    pub fn threshold(&self) -> i64 {
        self.threshold
    }
}

impl SnapshotFilter for AgeFilter {
    fn matches(&self, info: &SnapshotInfo) -> bool {
        match self.resolve(info) {
            None => false,
            Some(age) => match self.direction {
                Direction::Older => age <= self.threshold,
                Direction::Younger => age >= self.threshold,
            },
        }
    }

    fn description(&self) -> String {
        format!(
            "age(source={}, direction={}, unit={}, unit_count={}, threshold={})",
            self.source, self.direction, self.unit, self.unit_count, self.threshold
        )
    }
}
