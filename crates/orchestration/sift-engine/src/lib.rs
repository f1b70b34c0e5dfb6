//! sift-engine - the snapshot filter pipeline for snapsift.
//!
//! This crate narrows a cluster's snapshot listing to the subset a
//! maintenance action should operate on, using declarative, chainable
//! predicates. It provides:
//!
//! - [`SnapshotRegistry`] - the working set, built once from a
//!   [`SnapshotSource`] fetch and reduced in place by every filter
//! - State, pattern, and age predicate filters with inclusive/exclusive
//!   polarity
//! - [`Timestring`] patterns for both name-embedded date extraction and
//!   derived-regex matching
//! - A chain dispatcher driving filters from declarative configuration
//!
//! # Example
//!
//! ```ignore
//! use serde_json::json;
//! use sift_engine::SnapshotRegistry;
//!
//! let mut registry = SnapshotRegistry::from_source(&source, "backups")?;
//!
//! registry.iterate_filters(&json!({
//!     "filters": [
//!         { "filtertype": "pattern", "kind": "prefix", "value": "nightly-" },
//!         { "filtertype": "age", "direction": "older",
//!           "unit": "days", "unit_count": 30 },
//!     ]
//! }))?;
//!
//! registry.assert_nonempty()?;
//! for name in registry.working_identifiers() {
//!     println!("{name}");
//! }
//! ```

pub mod age;
pub mod filter;
pub mod registry;
pub mod timestring;

pub use age::{resolve_age, threshold_epoch, AgeSource, Direction, TimeUnit};
pub use filter::{
    coerce_pattern_value, AgeFilter, PatternFilter, PatternKind, SnapshotFilter, StateFilter,
};
pub use registry::SnapshotRegistry;
pub use timestring::Timestring;

pub use sift_error::{Result, SiftError};
pub use sift_traits::SnapshotSource;
pub use sift_types::{FilterSpec, FilterType, RepositoryInfo, SnapshotInfo, SnapshotState};
