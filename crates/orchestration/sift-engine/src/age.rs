//! Age resolution and threshold math.
//!
//! Every age comparison runs over a single resolved `Option<i64>` epoch
//! value, so the comparison logic never branches on where the age came from.
//! An unresolvable age (`None`) fails every comparison.

use chrono::Utc;
use sift_error::SiftError;
use sift_types::SnapshotInfo;
use std::fmt;
use std::str::FromStr;

use crate::timestring::Timestring;

/// Where a snapshot's age comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgeSource {
    /// Parse the snapshot name against a timestring pattern
    Name,

    /// Use the cluster-reported start time
    #[default]
    CreationDate,
}

impl AgeSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::CreationDate => "creation_date",
        }
    }
}

impl fmt::Display for AgeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgeSource {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "creation_date" => Ok(Self::CreationDate),
            other => Err(SiftError::InvalidValue(format!(
                "'{other}' is not an age source. Expected one of: name, creation_date"
            ))),
        }
    }
}

/// Which side of the threshold a kept snapshot falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Keep snapshots at or before the threshold instant
    Older,

    /// Keep snapshots at or after the threshold instant
    Younger,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Older => "older",
            Self::Younger => "younger",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "older" => Ok(Self::Older),
            "younger" => Ok(Self::Younger),
            other => Err(SiftError::InvalidValue(format!(
                "'{other}' is not a direction. Expected one of: older, younger"
            ))),
        }
    }
}

/// Units for relative age thresholds, each with a fixed seconds equivalent.
///
/// Months and years are calendar-free: 30 and 365 days respectively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Minutes,
    Hours,
    #[default]
    Days,
    Weeks,
    Months,
    Years,
}

impl TimeUnit {
    /// Seconds in one unit.
    pub fn seconds(&self) -> i64 {
        match self {
            Self::Seconds => 1,
            Self::Minutes => 60,
            Self::Hours => 3600,
            Self::Days => 86_400,
            Self::Weeks => 7 * 86_400,
            Self::Months => 30 * 86_400,
            Self::Years => 365 * 86_400,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeUnit {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seconds" => Ok(Self::Seconds),
            "minutes" => Ok(Self::Minutes),
            "hours" => Ok(Self::Hours),
            "days" => Ok(Self::Days),
            "weeks" => Ok(Self::Weeks),
            "months" => Ok(Self::Months),
            "years" => Ok(Self::Years),
            other => Err(SiftError::InvalidValue(format!(
                "'{other}' is not a time unit. Expected one of: \
                 seconds, minutes, hours, days, weeks, months, years"
            ))),
        }
    }
}

/// Compute the threshold instant: reference point minus `unit_count` units.
///
/// The reference point is an explicit epoch when the caller supplies one,
/// otherwise the evaluation-time wall clock.
pub fn threshold_epoch(epoch: Option<i64>, unit: TimeUnit, unit_count: i64) -> i64 {
    let reference = epoch.unwrap_or_else(|| Utc::now().timestamp());
    reference - unit_count * unit.seconds()
}

/// Resolve a snapshot's age to epoch seconds, or `None` when unknown.
///
/// `timestring` is only consulted for [`AgeSource::Name`]; callers validate
/// its presence before resolution.
pub fn resolve_age(
    info: &SnapshotInfo,
    source: AgeSource,
    timestring: Option<&Timestring>,
) -> Option<i64> {
    match source {
        AgeSource::Name => timestring.and_then(|ts| ts.parse_epoch(&info.name)),
        AgeSource::CreationDate => info.start_time_epoch,
    }
}
